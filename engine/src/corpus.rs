//! Flat corpus parsing.
//!
//! The corpus format is the classic record layout used by the CACM test
//! collection: each record opens with a `.I <id>` line, `.T` introduces the
//! title, `.W` the summary, and `.B` (with everything after it) ends the
//! fields this engine reads. Newlines inside fields fold to spaces.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::index::DocId;

lazy_static! {
    static ref RECORD_START: Regex = Regex::new(r"(?m)^\.I").expect("valid regex");
}

/// One corpus record: a positive id, a title, and a possibly empty summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: DocId,
    pub title: String,
    pub summary: String,
}

/// Split a corpus file into documents.
///
/// Recovery rules: a record missing `.T` or `.W` gets an empty title or
/// summary; a record whose id does not parse as a positive integer is
/// skipped. Parsing itself never fails.
pub fn parse_corpus(text: &str) -> Vec<Document> {
    RECORD_START
        .split(text)
        .skip(1)
        .filter_map(parse_record)
        .collect()
}

fn parse_record(record: &str) -> Option<Document> {
    let (id_line, rest) = record.split_once('\n').unwrap_or((record, ""));
    let id: DocId = id_line.trim().parse().ok().filter(|id| *id > 0)?;

    // Everything from .B onwards is bibliographic material we ignore.
    let fields = rest.split(".B").next().unwrap_or("");
    let (title_part, summary) = match fields.split_once(".W") {
        Some((before, after)) => (before, fold_lines(after)),
        None => (fields, String::new()),
    };
    let title = match title_part.split_once(".T") {
        Some((_, after)) => fold_lines(after),
        None => String::new(),
    };
    Some(Document { id, title, summary })
}

fn fold_lines(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
.I 1
.T
Software Design
.W
Design of software
systems.
.B
CACM June, 1978
.I 2
.T
Database Systems
.W
Relational database design.
";

    #[test]
    fn parses_well_formed_records() {
        let docs = parse_corpus(SAMPLE);
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, 1);
        assert_eq!(docs[0].title, "Software Design");
        assert_eq!(docs[0].summary, "Design of software systems.");
        assert_eq!(docs[1].id, 2);
        assert_eq!(docs[1].summary, "Relational database design.");
    }

    #[test]
    fn missing_summary_defaults_to_empty() {
        let docs = parse_corpus(".I 7\n.T\nTitle Only\n.B\nignored\n");
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].title, "Title Only");
        assert_eq!(docs[0].summary, "");
    }

    #[test]
    fn missing_title_defaults_to_empty() {
        let docs = parse_corpus(".I 3\n.W\nAbstract without a title.\n");
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].title, "");
        assert_eq!(docs[0].summary, "Abstract without a title.");
    }

    #[test]
    fn unparseable_id_skips_record() {
        let docs = parse_corpus(".I x\n.T\nBad\n.I 4\n.T\nGood\n");
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, 4);
    }

    #[test]
    fn empty_input_yields_no_documents() {
        assert!(parse_corpus("").is_empty());
        assert!(parse_corpus("no records here").is_empty());
    }
}
