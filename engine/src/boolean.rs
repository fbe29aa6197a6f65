//! Boolean retrieval: query tree, recursive-descent parser, and evaluator.

use std::collections::BTreeSet;

use crate::error::{EngineError, Result};
use crate::index::{DocId, InvertedIndex};
use crate::tokenizer::{is_operator, Analyzer};

/// A boolean query over index terms.
///
/// `And` and `Or` take any number of children; `Not` wraps a single subtree.
/// The tree already encodes nesting, so evaluation is plain structural
/// recursion with no precedence decisions left.
#[derive(Debug, Clone, PartialEq)]
pub enum BoolQuery {
    Term(String),
    And(Vec<BoolQuery>),
    Or(Vec<BoolQuery>),
    Not(Box<BoolQuery>),
}

impl BoolQuery {
    /// Whether this query holds for `doc_id`.
    fn matches(&self, index: &InvertedIndex, doc_id: DocId) -> bool {
        match self {
            BoolQuery::Term(word) => index.contains(word, doc_id),
            BoolQuery::And(children) => children.iter().all(|c| c.matches(index, doc_id)),
            BoolQuery::Or(children) => children.iter().any(|c| c.matches(index, doc_id)),
            BoolQuery::Not(inner) => !inner.matches(index, doc_id),
        }
    }
}

/// Evaluate `query` against every document the index knows.
///
/// The scan covers all document ids, so a pure negation matches documents
/// that contain none of the queried terms.
pub fn evaluate(query: &BoolQuery, index: &InvertedIndex) -> BTreeSet<DocId> {
    index
        .doc_ids()
        .iter()
        .copied()
        .filter(|id| query.matches(index, *id))
        .collect()
}

/// Parse a flat query string into a [`BoolQuery`].
///
/// Grammar, loosest binding first:
///
/// ```text
/// or  := and ('|' and)*
/// and := not ('&' not)*
/// not := '~' not | '(' or ')' | TERM
/// ```
///
/// Terms pass through the boolean analyzer variant, so they are normalized
/// exactly like indexed terms. Unbalanced parentheses, dangling operators,
/// trailing tokens, and empty input are invalid queries.
pub fn parse(input: &str, analyzer: &Analyzer) -> Result<BoolQuery> {
    let tokens = analyzer.analyze_boolean(input);
    let mut parser = Parser { tokens, pos: 0 };
    let tree = parser.or_expr()?;
    if let Some(extra) = parser.peek() {
        return Err(EngineError::query(format!(
            "unexpected trailing {extra:?}"
        )));
    }
    Ok(tree)
}

struct Parser {
    tokens: Vec<String>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    fn bump(&mut self) -> Option<String> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &str) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn or_expr(&mut self) -> Result<BoolQuery> {
        let mut children = vec![self.and_expr()?];
        while self.eat("|") {
            children.push(self.and_expr()?);
        }
        Ok(collapse(children, BoolQuery::Or))
    }

    fn and_expr(&mut self) -> Result<BoolQuery> {
        let mut children = vec![self.not_expr()?];
        while self.eat("&") {
            children.push(self.not_expr()?);
        }
        Ok(collapse(children, BoolQuery::And))
    }

    fn not_expr(&mut self) -> Result<BoolQuery> {
        if self.eat("~") {
            return Ok(BoolQuery::Not(Box::new(self.not_expr()?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<BoolQuery> {
        match self.bump() {
            Some(token) if token == "(" => {
                let inner = self.or_expr()?;
                if !self.eat(")") {
                    return Err(EngineError::query("unbalanced parentheses"));
                }
                Ok(inner)
            }
            Some(token) if is_operator(&token) => Err(EngineError::query(format!(
                "operator {token:?} where a term was expected"
            ))),
            Some(term) => Ok(BoolQuery::Term(term)),
            None => Err(EngineError::query("query ended where a term was expected")),
        }
    }
}

fn collapse(mut children: Vec<BoolQuery>, wrap: fn(Vec<BoolQuery>) -> BoolQuery) -> BoolQuery {
    if children.len() == 1 {
        children.swap_remove(0)
    } else {
        wrap(children)
    }
}
