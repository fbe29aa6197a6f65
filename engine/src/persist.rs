//! On-disk persistence for the index and its derivatives.
//!
//! One file per logical value under the index root: `index.bin` and
//! `weights.bin` hold the bincode-encoded mappings, `docs.bin` the display
//! metadata, and `meta.json` the build parameters a reload needs to
//! reconstruct an identically configured engine. Reloading reproduces the
//! saved mappings exactly.

use std::collections::HashMap;
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::{DocId, InvertedIndex};
use crate::search::SimilarityModel;
use crate::weights::TermWeights;
use crate::{SearchConfig, SearchEngine};

/// Build parameters and provenance, stored as pretty JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetaFile {
    pub num_docs: u32,
    pub created_at: String,
    pub version: u32,
    /// Whether index terms were stemmed; queries must match.
    pub stemming: bool,
    /// Replacement stop-word list, if the default was overridden.
    pub stop_words: Option<Vec<String>>,
    /// Similarity model used when a query does not name one.
    pub model: SimilarityModel,
}

/// Display metadata kept alongside the index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocMeta {
    pub title: String,
    pub summary: String,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn index(&self) -> PathBuf {
        self.root.join("index.bin")
    }
    fn weights(&self) -> PathBuf {
        self.root.join("weights.bin")
    }
    fn docs(&self) -> PathBuf {
        self.root.join("docs.bin")
    }
    fn meta(&self) -> PathBuf {
        self.root.join("meta.json")
    }

    /// Whether a weight table was persisted alongside the index.
    pub fn has_weights(&self) -> bool {
        self.weights().is_file()
    }
}

pub fn save_index(paths: &IndexPaths, index: &InvertedIndex) -> Result<()> {
    create_dir_all(&paths.root)?;
    let f = BufWriter::new(File::create(paths.index())?);
    bincode::serialize_into(f, index)?;
    Ok(())
}

pub fn load_index(paths: &IndexPaths) -> Result<InvertedIndex> {
    let f = BufReader::new(File::open(paths.index())?);
    Ok(bincode::deserialize_from(f)?)
}

pub fn save_weights(paths: &IndexPaths, weights: &TermWeights) -> Result<()> {
    create_dir_all(&paths.root)?;
    let f = BufWriter::new(File::create(paths.weights())?);
    bincode::serialize_into(f, weights)?;
    Ok(())
}

pub fn load_weights(paths: &IndexPaths) -> Result<TermWeights> {
    let f = BufReader::new(File::open(paths.weights())?);
    Ok(bincode::deserialize_from(f)?)
}

pub fn save_docs(paths: &IndexPaths, docs: &HashMap<DocId, DocMeta>) -> Result<()> {
    create_dir_all(&paths.root)?;
    let f = BufWriter::new(File::create(paths.docs())?);
    bincode::serialize_into(f, docs)?;
    Ok(())
}

pub fn load_docs(paths: &IndexPaths) -> Result<HashMap<DocId, DocMeta>> {
    let f = BufReader::new(File::open(paths.docs())?);
    Ok(bincode::deserialize_from(f)?)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let json = serde_json::to_string_pretty(meta)?;
    std::fs::write(paths.meta(), json)?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let f = BufReader::new(File::open(paths.meta())?);
    Ok(serde_json::from_reader(f)?)
}

/// Reassemble a query-ready engine from a persisted index directory.
pub fn load_engine(paths: &IndexPaths) -> Result<SearchEngine> {
    let meta = load_meta(paths)?;
    let index = load_index(paths)?;
    let weights = if paths.has_weights() {
        Some(load_weights(paths)?)
    } else {
        None
    };
    let config = SearchConfig {
        stop_words: meta.stop_words,
        stemming: meta.stemming,
        model: meta.model,
        weighting: weights.is_some(),
    };
    Ok(SearchEngine::from_parts(index, weights, config))
}
