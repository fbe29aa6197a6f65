use scribe_engine::{
    parse_corpus, BoolQuery, DocId, EngineError, SearchConfig, SearchEngine, SimilarityModel,
};

const CORPUS: &str = "\
.I 1
.T
software design
.W
design of software systems
.I 2
.T
database systems
.W
relational database design
";

fn build_engine(weighting: bool) -> SearchEngine {
    let docs = parse_corpus(CORPUS);
    assert_eq!(docs.len(), 2);
    SearchEngine::build(
        docs,
        SearchConfig {
            weighting,
            ..SearchConfig::default()
        },
    )
    .unwrap()
}

#[test]
fn matching_score_scenario() {
    let engine = build_engine(false);
    let scores = engine.score_by_matching("design");
    assert_eq!(scores.get(&1), Some(&2));
    assert_eq!(scores.get(&2), Some(&1));
    assert_eq!(scores.len(), 2);
}

#[test]
fn boolean_scenarios() {
    let engine = build_engine(false);

    let matched = engine.evaluate_boolean("design & software").unwrap();
    assert_eq!(matched.into_iter().collect::<Vec<_>>(), vec![1]);

    let matched = engine.evaluate_boolean("~database").unwrap();
    assert_eq!(matched.into_iter().collect::<Vec<_>>(), vec![1]);
}

#[test]
fn boolean_tree_surface_agrees_with_string_surface() {
    let engine = build_engine(false);
    // "design" and "software" are their own stems, so the normalized terms
    // match what the string surface produces.
    let tree = BoolQuery::And(vec![
        BoolQuery::Term("design".into()),
        BoolQuery::Term("softwar".into()),
    ]);
    assert_eq!(
        engine.evaluate_boolean_tree(&tree),
        engine.evaluate_boolean("design & software").unwrap()
    );
}

#[test]
fn empty_query_scores_nothing() {
    let engine = build_engine(false);
    assert!(engine.score_by_matching("").is_empty());
    assert!(engine
        .score_by_vector("", SimilarityModel::Cos)
        .is_empty());
}

#[test]
fn stopword_only_query_scores_nothing() {
    let engine = build_engine(false);
    assert!(engine.score_by_matching("the of and").is_empty());
}

#[test]
fn unknown_similarity_model_is_rejected() {
    let err = "euclidean".parse::<SimilarityModel>().unwrap_err();
    assert!(matches!(err, EngineError::Config(_)));
}

#[test]
fn malformed_boolean_query_is_rejected() {
    let engine = build_engine(false);
    let err = engine.evaluate_boolean("(design & software").unwrap_err();
    assert!(matches!(err, EngineError::Query(_)));
}

#[test]
fn vector_scores_cover_only_overlapping_documents() {
    let engine = build_engine(false);
    let scores = engine.score_by_vector("relational", SimilarityModel::InnerProduct);
    assert_eq!(scores.len(), 1);
    assert!(scores.contains_key(&2));
}

#[test]
fn similarity_scores_are_bounded() {
    let engine = build_engine(false);
    for model in [
        SimilarityModel::Dice,
        SimilarityModel::Cos,
        SimilarityModel::Jaccard,
    ] {
        for (_, score) in engine.score_by_vector("database design systems", model) {
            assert!((0.0..=1.0).contains(&score));
        }
    }
}

#[test]
fn repeated_query_terms_count_once() {
    let engine = build_engine(false);
    assert_eq!(
        engine.score_by_matching("design design design"),
        engine.score_by_matching("design")
    );
}

#[test]
fn lookup_accessors() {
    let engine = build_engine(false);

    let terms = engine.terms_of(2);
    assert_eq!(terms.get("databas"), Some(&2));

    let docs = engine.documents_of("design");
    assert_eq!(docs.get(&1), Some(&2));

    // Unknown term and unknown document: empty, not an error.
    assert!(engine.documents_of("nonexistent").is_empty());
    assert!(engine.terms_of(99).is_empty());
}

#[test]
fn weighting_is_optional() {
    let engine = build_engine(false);
    assert!(engine.weights().is_none());
    assert!(engine.score_by_weighted_matching("design").is_empty());

    let engine = build_engine(true);
    let weights = engine.weights().expect("weight table built");
    assert!(weights.term_count() > 0);
    let scores = engine.score_by_weighted_matching("design");
    assert!(scores.values().all(|w| *w > 0.0));
}

#[test]
fn de_morgan_through_the_facade() {
    let engine = build_engine(false);
    let all: Vec<DocId> = engine.index().doc_ids().iter().copied().collect();
    let matched = engine.evaluate_boolean("design & software").unwrap();
    let negated = engine.evaluate_boolean("~(design & software)").unwrap();
    let mut union: Vec<DocId> = matched.union(&negated).copied().collect();
    union.sort_unstable();
    assert_eq!(union, all);
    assert!(matched.intersection(&negated).next().is_none());
}
