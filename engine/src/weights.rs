use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::index::{DocId, InvertedIndex};

/// Per-(term, document) tf-idf weights derived from an [`InvertedIndex`].
///
/// `weight(t, d) = count(t,d) / max_d' count(t,d') * log10(N / df(t) + 1)`
///
/// The `+1` sits inside the logarithm argument. That placement is the one
/// tunable constant of the formula and is kept exactly as the original
/// system computed it.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct TermWeights {
    weights: HashMap<String, HashMap<DocId, f32>>,
}

impl TermWeights {
    /// Compute weights for every posting of `index`. Pairs absent from the
    /// index get no entry (their weight is implicitly zero).
    ///
    /// Fails with a configuration error when the index holds no documents,
    /// since the idf would divide by zero.
    pub fn derive(index: &InvertedIndex) -> Result<TermWeights> {
        let total_docs = index.doc_count();
        if total_docs == 0 {
            return Err(EngineError::config(
                "cannot derive weights from an empty index",
            ));
        }
        let n = total_docs as f32;

        let mut weights: HashMap<String, HashMap<DocId, f32>> = HashMap::new();
        for (term, postings) in index.terms() {
            let max_count = postings.values().copied().max().unwrap_or(0);
            if max_count == 0 {
                return Err(EngineError::config(format!(
                    "term {term:?} has no postings"
                )));
            }
            let df = postings.len() as f32;
            let idf = (n / df + 1.0).log10();
            let row = weights.entry(term.clone()).or_default();
            for (doc_id, count) in postings {
                let tf = *count as f32 / max_count as f32;
                row.insert(*doc_id, tf * idf);
            }
        }
        Ok(TermWeights { weights })
    }

    /// Weights of `term` per document. Empty for unknown terms.
    pub fn documents_of(&self, term: &str) -> HashMap<DocId, f32> {
        self.weights.get(term).cloned().unwrap_or_default()
    }

    /// Weight row for `term`, if the term is indexed.
    pub fn row(&self, term: &str) -> Option<&HashMap<DocId, f32>> {
        self.weights.get(term)
    }

    /// Weight of one (term, document) pair, if materialized.
    pub fn weight(&self, term: &str, doc_id: DocId) -> Option<f32> {
        self.weights
            .get(term)
            .and_then(|docs| docs.get(&doc_id))
            .copied()
    }

    pub fn term_count(&self) -> usize {
        self.weights.len()
    }
}
