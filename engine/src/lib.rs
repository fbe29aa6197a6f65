//! A small multi-model text retrieval engine.
//!
//! Raw corpus records are normalized into terms, accumulated into an
//! inverted index (optionally with a derived tf-idf weight table), and
//! queried three ways: boolean expressions, cumulative term-frequency
//! matching, and vector-space similarity.
//!
//! The library does no I/O of its own beyond [`persist`] and never logs;
//! failures come back as [`EngineError`] values.

pub mod boolean;
pub mod corpus;
pub mod error;
pub mod index;
pub mod persist;
pub mod search;
pub mod tokenizer;
pub mod weights;

pub use boolean::BoolQuery;
pub use corpus::{parse_corpus, Document};
pub use error::{EngineError, Result};
pub use index::{DocId, InvertedIndex};
pub use search::SimilarityModel;
pub use tokenizer::{Analyzer, AnalyzerConfig};
pub use weights::TermWeights;

use std::collections::{BTreeSet, HashMap};

/// Construction-time configuration for a [`SearchEngine`].
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Replacement stop-word list; `None` keeps the built-in English list.
    pub stop_words: Option<Vec<String>>,
    /// Stem index and query terms.
    pub stemming: bool,
    /// Similarity model used when a query does not name one.
    pub model: SimilarityModel,
    /// Derive the tf-idf weight table alongside the index.
    pub weighting: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            stop_words: None,
            stemming: true,
            model: SimilarityModel::Cos,
            weighting: false,
        }
    }
}

/// An immutable index plus the analyzer that built it.
///
/// Every query method takes `&self`, so a built engine can serve concurrent
/// readers without locking. Rebuilding means constructing a new engine and
/// swapping the handle; the old one stays valid for in-flight queries.
pub struct SearchEngine {
    analyzer: Analyzer,
    index: InvertedIndex,
    weights: Option<TermWeights>,
    default_model: SimilarityModel,
}

impl SearchEngine {
    /// Index `docs` under `config` in a single pass.
    pub fn build<I>(docs: I, config: SearchConfig) -> Result<Self>
    where
        I: IntoIterator<Item = Document>,
    {
        let analyzer = Analyzer::new(analyzer_config(&config));
        let index = InvertedIndex::build(docs, &analyzer);
        let weights = if config.weighting {
            Some(TermWeights::derive(&index)?)
        } else {
            None
        };
        Ok(SearchEngine {
            analyzer,
            index,
            weights,
            default_model: config.model,
        })
    }

    /// Reassemble an engine from previously persisted parts. The config must
    /// match the one the index was built with, or query terms will not line
    /// up with indexed terms.
    pub fn from_parts(
        index: InvertedIndex,
        weights: Option<TermWeights>,
        config: SearchConfig,
    ) -> Self {
        let analyzer = Analyzer::new(analyzer_config(&config));
        SearchEngine {
            analyzer,
            index,
            weights,
            default_model: config.model,
        }
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    pub fn weights(&self) -> Option<&TermWeights> {
        self.weights.as_ref()
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    pub fn default_model(&self) -> SimilarityModel {
        self.default_model
    }

    /// Evaluate a boolean query string (`&`, `|`, `~`, parentheses).
    pub fn evaluate_boolean(&self, query: &str) -> Result<BTreeSet<DocId>> {
        let tree = boolean::parse(query, &self.analyzer)?;
        Ok(boolean::evaluate(&tree, &self.index))
    }

    /// Evaluate an already-built query tree. Terms are looked up as given;
    /// callers supply normalized terms.
    pub fn evaluate_boolean_tree(&self, query: &BoolQuery) -> BTreeSet<DocId> {
        boolean::evaluate(query, &self.index)
    }

    /// Cumulative term-frequency score per document.
    pub fn score_by_matching(&self, query: &str) -> HashMap<DocId, u32> {
        search::matching_score(&self.index, &self.query_terms(query))
    }

    /// Matching score over tf-idf weights instead of raw counts. Empty when
    /// the weight table was not built.
    pub fn score_by_weighted_matching(&self, query: &str) -> HashMap<DocId, f32> {
        match &self.weights {
            Some(weights) => {
                search::weighted_matching_score(weights, &self.query_terms(query))
            }
            None => HashMap::new(),
        }
    }

    /// Vector-space similarity per document under `model`.
    pub fn score_by_vector(&self, query: &str, model: SimilarityModel) -> HashMap<DocId, f32> {
        search::vector_score(&self.index, &self.query_terms(query), model)
    }

    /// Terms of one document with their occurrence counts.
    pub fn terms_of(&self, doc_id: DocId) -> HashMap<String, u32> {
        self.index.terms_of(doc_id)
    }

    /// Documents containing `term` with their occurrence counts. Unknown
    /// terms yield an empty map, not an error.
    pub fn documents_of(&self, term: &str) -> HashMap<DocId, u32> {
        self.index.documents_of(term)
    }

    /// Distinct query terms in first-occurrence order.
    fn query_terms(&self, query: &str) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.analyzer
            .analyze(query)
            .into_iter()
            .filter(|t| seen.insert(t.clone()))
            .collect()
    }
}

fn analyzer_config(config: &SearchConfig) -> AnalyzerConfig {
    let mut analyzer_config = AnalyzerConfig::default();
    if let Some(words) = &config.stop_words {
        analyzer_config.stop_words = words.iter().map(|w| w.to_lowercase()).collect();
    }
    analyzer_config.stemming = config.stemming;
    analyzer_config
}
