use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use std::fmt;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"(?u)[\w']+").expect("valid regex");
    static ref WORD_OR_OP: Regex = Regex::new(r"(?u)[\w']+|[&|~()]").expect("valid regex");
    static ref DEFAULT_STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// Configuration for an [`Analyzer`], taken once at construction and held
/// immutably for the analyzer's lifetime.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Tokens dropped during analysis. Defaults to a built-in English list.
    pub stop_words: HashSet<String>,
    /// Stem surviving tokens with the English Porter-family stemmer.
    pub stemming: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            stop_words: DEFAULT_STOPWORDS.iter().map(|w| (*w).to_string()).collect(),
            stemming: true,
        }
    }
}

/// Turns raw text into index terms: NFKC normalization, lowercasing, runs of
/// word characters / apostrophes, stop-word removal, optional stemming.
pub struct Analyzer {
    stop_words: HashSet<String>,
    stemmer: Option<Stemmer>,
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer")
            .field("stop_words", &self.stop_words.len())
            .field("stemming", &self.stemmer.is_some())
            .finish()
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Analyzer::new(AnalyzerConfig::default())
    }
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        let stemmer = config
            .stemming
            .then(|| Stemmer::create(Algorithm::English));
        Analyzer {
            stop_words: config.stop_words,
            stemmer,
        }
    }

    /// Normalize free text into index terms. Used for indexing and for
    /// free-text queries, so both sides see identical terms.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        self.tokens(text, &WORD)
    }

    /// Boolean-query variant: `& | ~ ( )` survive as standalone tokens so an
    /// expression can be re-tokenized without losing its operators.
    pub fn analyze_boolean(&self, text: &str) -> Vec<String> {
        self.tokens(text, &WORD_OR_OP)
    }

    fn tokens(&self, text: &str, pattern: &Regex) -> Vec<String> {
        let normalized = text.nfkc().collect::<String>().to_lowercase();
        let mut out = Vec::new();
        for mat in pattern.find_iter(&normalized) {
            let token = mat.as_str();
            if is_operator(token) {
                out.push(token.to_string());
                continue;
            }
            if self.stop_words.contains(token) {
                continue;
            }
            match &self.stemmer {
                Some(stemmer) => out.push(stemmer.stem(token).to_string()),
                None => out.push(token.to_string()),
            }
        }
        out
    }
}

/// Whether `token` is one of the boolean query operators.
pub(crate) fn is_operator(token: &str) -> bool {
    matches!(token, "&" | "|" | "~" | "(" | ")")
}
