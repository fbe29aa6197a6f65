use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::corpus::Document;
use crate::tokenizer::Analyzer;

pub type DocId = u32;

/// Sparse term -> document -> occurrence-count index.
///
/// Built in a single pass over the corpus and read-only afterwards. Title
/// and summary terms feed the same counts. Every stored count is strictly
/// positive; a document whose every token was filtered out is still
/// remembered in the id set so negation queries can match it.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvertedIndex {
    postings: HashMap<String, HashMap<DocId, u32>>,
    doc_ids: BTreeSet<DocId>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every document in one pass.
    pub fn build<I>(docs: I, analyzer: &Analyzer) -> Self
    where
        I: IntoIterator<Item = Document>,
    {
        let mut index = InvertedIndex::new();
        for doc in docs {
            index.add_document(&doc, analyzer);
        }
        index
    }

    /// Merge one document into the index. Counts are additive, so seeing
    /// the same document twice for a term adds rather than overwrites.
    pub fn add_document(&mut self, doc: &Document, analyzer: &Analyzer) {
        self.doc_ids.insert(doc.id);
        let mut terms = analyzer.analyze(&doc.title);
        terms.extend(analyzer.analyze(&doc.summary));
        for term in terms {
            *self
                .postings
                .entry(term)
                .or_default()
                .entry(doc.id)
                .or_insert(0) += 1;
        }
    }

    /// Occurrence counts of `term` per document. Empty for unknown terms.
    pub fn documents_of(&self, term: &str) -> HashMap<DocId, u32> {
        self.postings.get(term).cloned().unwrap_or_default()
    }

    /// Postings row for `term`, if the term is indexed.
    pub fn postings(&self, term: &str) -> Option<&HashMap<DocId, u32>> {
        self.postings.get(term)
    }

    /// Per-document view: every term of `doc_id` with its count. Derived on
    /// demand from the per-term map, never stored redundantly.
    pub fn terms_of(&self, doc_id: DocId) -> HashMap<String, u32> {
        let mut terms = HashMap::new();
        for (term, docs) in &self.postings {
            if let Some(count) = docs.get(&doc_id) {
                terms.insert(term.clone(), *count);
            }
        }
        terms
    }

    /// Whether `term` occurs in `doc_id`.
    pub fn contains(&self, term: &str, doc_id: DocId) -> bool {
        self.postings
            .get(term)
            .is_some_and(|docs| docs.contains_key(&doc_id))
    }

    /// All document ids the index has seen, in ascending order.
    pub fn doc_ids(&self) -> &BTreeSet<DocId> {
        &self.doc_ids
    }

    pub fn doc_count(&self) -> usize {
        self.doc_ids.len()
    }

    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_ids.is_empty()
    }

    /// Iterate (term, postings) rows.
    pub fn terms(&self) -> impl Iterator<Item = (&String, &HashMap<DocId, u32>)> {
        self.postings.iter()
    }
}
