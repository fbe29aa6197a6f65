//! Ranked retrieval: cumulative matching and vector-space similarity.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::index::{DocId, InvertedIndex};
use crate::weights::TermWeights;

/// Vector-space similarity functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityModel {
    InnerProduct,
    Dice,
    Cos,
    Jaccard,
}

impl SimilarityModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimilarityModel::InnerProduct => "inner_product",
            SimilarityModel::Dice => "dice",
            SimilarityModel::Cos => "cos",
            SimilarityModel::Jaccard => "jaccard",
        }
    }
}

impl FromStr for SimilarityModel {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "inner_product" => Ok(SimilarityModel::InnerProduct),
            "dice" => Ok(SimilarityModel::Dice),
            "cos" => Ok(SimilarityModel::Cos),
            "jaccard" => Ok(SimilarityModel::Jaccard),
            other => Err(EngineError::config(format!(
                "unrecognized similarity model {other:?}"
            ))),
        }
    }
}

/// Sum of per-document occurrence counts over the query terms.
///
/// Documents with no overlapping term are absent from the result, never
/// present with score zero.
pub fn matching_score(index: &InvertedIndex, terms: &[String]) -> HashMap<DocId, u32> {
    let mut scores = HashMap::new();
    for term in terms {
        if let Some(postings) = index.postings(term) {
            for (doc_id, count) in postings {
                *scores.entry(*doc_id).or_insert(0) += count;
            }
        }
    }
    scores
}

/// Matching score over tf-idf weights instead of raw counts.
pub fn weighted_matching_score(weights: &TermWeights, terms: &[String]) -> HashMap<DocId, f32> {
    let mut scores = HashMap::new();
    for term in terms {
        if let Some(row) = weights.row(term) {
            for (doc_id, weight) in row {
                *scores.entry(*doc_id).or_insert(0.0) += weight;
            }
        }
    }
    scores
}

/// Vector-space similarity between the query and each overlapping document.
///
/// `overlap` is the inner product of the binary query vector with the
/// document's count vector, `q` the distinct query-term count, and `dsq` the
/// squared magnitude of the document's full count vector. Only documents
/// with positive overlap appear in the result.
pub fn vector_score(
    index: &InvertedIndex,
    terms: &[String],
    model: SimilarityModel,
) -> HashMap<DocId, f32> {
    let mut overlaps: HashMap<DocId, u32> = HashMap::new();
    for term in terms {
        if let Some(postings) = index.postings(term) {
            for (doc_id, count) in postings {
                *overlaps.entry(*doc_id).or_insert(0) += count;
            }
        }
    }

    let q = terms.len() as f32;
    overlaps
        .into_iter()
        .map(|(doc_id, overlap)| {
            let overlap = overlap as f32;
            let dsq = squared_magnitude(index, doc_id);
            let score = match model {
                SimilarityModel::InnerProduct => overlap,
                SimilarityModel::Dice => 2.0 * overlap / (q + dsq),
                SimilarityModel::Cos => overlap / (q * dsq).sqrt(),
                SimilarityModel::Jaccard => overlap / (q + dsq - overlap),
            };
            (doc_id, score)
        })
        .collect()
}

/// Σ count² over every term of the document.
fn squared_magnitude(index: &InvertedIndex, doc_id: DocId) -> f32 {
    index
        .terms_of(doc_id)
        .values()
        .map(|c| (*c as f32) * (*c as f32))
        .sum()
}

/// Order scores for display: descending score, ascending id on ties.
pub fn sort_ranked<S: PartialOrd + Copy>(scores: &HashMap<DocId, S>) -> Vec<(DocId, S)> {
    let mut ranked: Vec<(DocId, S)> = scores.iter().map(|(d, s)| (*d, *s)).collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Document;
    use crate::tokenizer::{Analyzer, AnalyzerConfig};

    fn plain_analyzer() -> Analyzer {
        Analyzer::new(AnalyzerConfig {
            stemming: false,
            ..AnalyzerConfig::default()
        })
    }

    fn sample_index(analyzer: &Analyzer) -> InvertedIndex {
        InvertedIndex::build(
            vec![
                Document {
                    id: 1,
                    title: "software design".into(),
                    summary: "design of software systems".into(),
                },
                Document {
                    id: 2,
                    title: "database systems".into(),
                    summary: "relational database design".into(),
                },
            ],
            analyzer,
        )
    }

    fn terms(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn matching_score_sums_counts() {
        let analyzer = plain_analyzer();
        let index = sample_index(&analyzer);
        let scores = matching_score(&index, &terms(&["design"]));
        assert_eq!(scores.get(&1), Some(&2));
        assert_eq!(scores.get(&2), Some(&1));
    }

    #[test]
    fn zero_overlap_documents_are_absent() {
        let analyzer = plain_analyzer();
        let index = sample_index(&analyzer);
        let scores = matching_score(&index, &terms(&["relational"]));
        assert_eq!(scores.len(), 1);
        assert!(!scores.contains_key(&1));
        assert!(scores.values().all(|s| *s > 0));
    }

    #[test]
    fn unknown_terms_score_nothing() {
        let analyzer = plain_analyzer();
        let index = sample_index(&analyzer);
        assert!(matching_score(&index, &terms(&["quantum"])).is_empty());
    }

    #[test]
    fn inner_product_is_the_overlap_sum() {
        let analyzer = plain_analyzer();
        let index = sample_index(&analyzer);
        let scores = vector_score(
            &index,
            &terms(&["design", "software"]),
            SimilarityModel::InnerProduct,
        );
        // Doc 1: design 2 + software 2 = 4; doc 2: design 1.
        assert_eq!(scores.get(&1), Some(&4.0));
        assert_eq!(scores.get(&2), Some(&1.0));
    }

    #[test]
    fn similarity_formulas() {
        let analyzer = plain_analyzer();
        let index = sample_index(&analyzer);
        let query = terms(&["design", "software"]);
        // Doc 1 vector: design 2, software 2, systems 1 -> dsq = 9, overlap = 4, q = 2.
        let dice = vector_score(&index, &query, SimilarityModel::Dice);
        assert!((dice.get(&1).unwrap() - 8.0 / 11.0).abs() < 1e-6);

        let cos = vector_score(&index, &query, SimilarityModel::Cos);
        assert!((cos.get(&1).unwrap() - 4.0 / 18.0_f32.sqrt()).abs() < 1e-6);

        let jaccard = vector_score(&index, &query, SimilarityModel::Jaccard);
        assert!((jaccard.get(&1).unwrap() - 4.0 / 7.0).abs() < 1e-6);
    }

    #[test]
    fn normalized_similarities_stay_in_unit_interval() {
        let analyzer = plain_analyzer();
        let index = sample_index(&analyzer);
        let query = terms(&["design", "software", "database", "systems"]);
        for model in [
            SimilarityModel::Dice,
            SimilarityModel::Cos,
            SimilarityModel::Jaccard,
        ] {
            for (doc_id, score) in vector_score(&index, &query, model) {
                assert!(
                    (0.0..=1.0).contains(&score),
                    "{model:?} score {score} for doc {doc_id}"
                );
            }
        }
    }

    #[test]
    fn weighted_matching_sums_weights() {
        let analyzer = plain_analyzer();
        let index = sample_index(&analyzer);
        let weights = TermWeights::derive(&index).unwrap();
        let scores = weighted_matching_score(&weights, &terms(&["design", "relational"]));
        let expected_2 = weights.weight("design", 2).unwrap() + weights.weight("relational", 2).unwrap();
        assert!((scores.get(&2).unwrap() - expected_2).abs() < 1e-6);
    }

    #[test]
    fn model_names_round_trip() {
        for name in ["inner_product", "dice", "cos", "jaccard"] {
            let model: SimilarityModel = name.parse().unwrap();
            assert_eq!(model.as_str(), name);
        }
    }

    #[test]
    fn unrecognized_model_is_a_config_error() {
        let err = "euclidean".parse::<SimilarityModel>().unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn ranking_breaks_ties_by_ascending_id() {
        let scores: HashMap<DocId, u32> = [(4, 3), (2, 3), (7, 5)].into_iter().collect();
        let ranked = sort_ranked(&scores);
        assert_eq!(ranked, vec![(7, 5), (2, 3), (4, 3)]);
    }
}
