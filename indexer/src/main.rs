use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scribe_engine::persist::{
    save_docs, save_index, save_meta, save_weights, DocMeta, IndexPaths, MetaFile,
};
use scribe_engine::{parse_corpus, Document, SearchConfig, SearchEngine, SimilarityModel};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build a searchable index from a flat title/abstract corpus", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from a corpus file or a directory of corpus files
    Build {
        /// Input path (corpus file, or directory of .all/.txt corpus files)
        #[arg(long)]
        input: String,
        /// Output index directory
        #[arg(long)]
        output: String,
        /// Index terms without stemming
        #[arg(long, default_value_t = false)]
        no_stemming: bool,
        /// Newline-separated stop-word list replacing the built-in one
        #[arg(long)]
        stop_words: Option<String>,
        /// Do not derive the tf-idf weight table
        #[arg(long, default_value_t = false)]
        skip_weights: bool,
        /// Default similarity model recorded for query time
        #[arg(long, default_value = "cos")]
        model: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            input,
            output,
            no_stemming,
            stop_words,
            skip_weights,
            model,
        } => build_index(
            &input,
            &output,
            no_stemming,
            stop_words.as_deref(),
            skip_weights,
            &model,
        ),
    }
}

fn build_index(
    input: &str,
    output: &str,
    no_stemming: bool,
    stop_words: Option<&str>,
    skip_weights: bool,
    model: &str,
) -> Result<()> {
    let model: SimilarityModel = model.parse()?;
    let stop_words = match stop_words {
        Some(path) => Some(read_stop_words(Path::new(path))?),
        None => None,
    };

    let docs = read_corpus(Path::new(input))?;
    tracing::info!(num_docs = docs.len(), "parsed corpus");

    let doc_meta: HashMap<_, _> = docs
        .iter()
        .map(|d| {
            (
                d.id,
                DocMeta {
                    title: d.title.clone(),
                    summary: d.summary.clone(),
                },
            )
        })
        .collect();

    let config = SearchConfig {
        stop_words: stop_words.clone(),
        stemming: !no_stemming,
        model,
        weighting: !skip_weights,
    };
    let engine = SearchEngine::build(docs, config)?;
    tracing::info!(
        num_docs = engine.index().doc_count(),
        num_terms = engine.index().term_count(),
        weighted = engine.weights().is_some(),
        "built index"
    );

    let paths = IndexPaths::new(output);
    save_index(&paths, engine.index())?;
    if let Some(weights) = engine.weights() {
        save_weights(&paths, weights)?;
    }
    save_docs(&paths, &doc_meta)?;
    let meta = MetaFile {
        num_docs: engine.index().doc_count() as u32,
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default(),
        version: 1,
        stemming: !no_stemming,
        stop_words,
        model,
    };
    save_meta(&paths, &meta)?;

    tracing::info!(output, "index build complete");
    Ok(())
}

fn read_corpus(input: &Path) -> Result<Vec<Document>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file()
                && matches!(
                    p.extension().and_then(|s| s.to_str()),
                    Some("all") | Some("txt")
                )
            {
                files.push(p.to_path_buf());
            }
        }
        files.sort();
    } else {
        files.push(input.to_path_buf());
    }

    let mut docs = Vec::new();
    for file in files {
        let text =
            fs::read_to_string(&file).with_context(|| format!("reading {}", file.display()))?;
        let parsed = parse_corpus(&text);
        tracing::debug!(file = %file.display(), records = parsed.len(), "parsed corpus file");
        docs.extend(parsed);
    }
    Ok(docs)
}

fn read_stop_words(path: &Path) -> Result<Vec<String>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(text
        .lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect())
}
