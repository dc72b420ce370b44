// WHY: facade tying the pipeline together: tokenize, normalize, candidate
// scan, boundary check, span resolution. Construction does all fallible
// work; matching itself cannot fail.

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;
use tracing::debug;

use crate::dictionary::{Dictionary, DictionaryExport, PhraseMeta};
use crate::error::Result;
use crate::normalization::NormalizeOptions;
use crate::resolver::{has_all_words, normalized_words, resolve, MatchRecord};
use crate::tokenizer::{DocumentTree, WordToken, WordTokenizer};

/// Matcher configuration.
///
/// `phrases` maps each literal phrase to its metadata and is required to be
/// non-empty. When `dictionary` is supplied, the search structure is
/// imported instead of rebuilt; metadata still comes from `phrases`, since
/// exports carry none.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub phrases: BTreeMap<String, PhraseMeta>,
    pub lowercase: bool,
    pub replace_dashes: bool,
    pub replace_accents: bool,
    pub replace_full_stops: bool,
    pub dictionary: Option<DictionaryExport>,
}

impl MatcherConfig {
    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            lowercase: self.lowercase,
            replace_accents: self.replace_accents,
            replace_dashes: self.replace_dashes,
            replace_full_stops: self.replace_full_stops,
        }
    }
}

/// A built phrase matcher: immutable after construction, safe to share
/// across threads, one instance serving any number of documents.
#[derive(Debug)]
pub struct PhraseMatcher {
    dictionary: Dictionary,
    tokenizer: WordTokenizer,
    options: NormalizeOptions,
}

impl PhraseMatcher {
    pub fn new(config: MatcherConfig) -> Result<Self> {
        let options = config.normalize_options();
        let dictionary = match config.dictionary {
            Some(export) => Dictionary::import(export, &config.phrases, &options)?,
            None => Dictionary::build(&config.phrases, &options)?,
        };
        let tokenizer = WordTokenizer::new()?;

        Ok(Self {
            dictionary,
            tokenizer,
            options,
        })
    }

    /// Match every configured phrase against raw text.
    ///
    /// Records are grouped by phrase in candidate order; use
    /// [`crate::merge_matches`] to order one or more result lists by start
    /// offset.
    pub fn match_text(&self, text: &str) -> Vec<MatchRecord> {
        let tokens = self.tokenizer.tokenize(text);
        self.run(&tokens, text)
    }

    /// Match against a caller-supplied pre-tokenized document tree.
    pub fn match_tree(&self, tree: &DocumentTree) -> Vec<MatchRecord> {
        let text = tree.to_text();
        let tokens = tree.word_tokens();
        self.run(&tokens, &text)
    }

    /// Export the dictionary's search structure for reuse across runs.
    pub fn export_dictionary(&self) -> DictionaryExport {
        self.dictionary.export()
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    fn run(&self, tokens: &[WordToken], corpus_text: &str) -> Vec<MatchRecord> {
        let units = normalized_words(tokens, &self.options);
        let joined = units
            .iter()
            .map(|unit| unit.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let candidates = self.dictionary.candidates(&joined);
        let corpus_words: HashSet<&str> = units.iter().map(|unit| unit.text.as_str()).collect();

        let mut records = Vec::new();
        for candidate in candidates {
            if !has_all_words(candidate, &corpus_words, &self.tokenizer, &self.options) {
                continue;
            }
            if let Some(entry) = self.dictionary.lookup(candidate) {
                records.extend(resolve(
                    entry,
                    &units,
                    corpus_text,
                    &self.tokenizer,
                    &self.options,
                ));
            }
        }

        debug!("confirmed {} matches", records.len());
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(phrases: &[(&str, &str)]) -> MatcherConfig {
        MatcherConfig {
            phrases: phrases
                .iter()
                .map(|(key, code)| {
                    (
                        key.to_string(),
                        PhraseMeta {
                            label: None,
                            code: Some(code.to_string()),
                        },
                    )
                })
                .collect(),
            lowercase: true,
            replace_dashes: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_match_text_attaches_metadata() {
        let matcher = PhraseMatcher::new(config(&[("apple", "FRUIT")])).unwrap();
        let records = matcher.match_text("I ate an Apple today");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].matched_text, "Apple");
        assert_eq!(records[0].code.as_deref(), Some("FRUIT"));
    }

    #[test]
    fn test_match_text_no_hits_is_empty() {
        let matcher = PhraseMatcher::new(config(&[("apple", "FRUIT")])).unwrap();
        assert!(matcher.match_text("nothing to see here").is_empty());
    }

    #[test]
    fn test_one_matcher_serves_many_documents() {
        let matcher = PhraseMatcher::new(config(&[("apple", "FRUIT")])).unwrap();
        assert_eq!(matcher.match_text("apple").len(), 1);
        assert_eq!(matcher.match_text("apple apple").len(), 2);
        assert!(matcher.match_text("pear").is_empty());
    }

    #[test]
    fn test_matcher_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PhraseMatcher>();
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: MatcherConfig = serde_json::from_str(
            r#"{"phrases": {"part time": {"label": "employment", "code": "PT"}}, "lowercase": true}"#,
        )
        .unwrap();
        assert!(config.lowercase);
        assert!(!config.replace_dashes);
        assert_eq!(
            config.phrases["part time"].label.as_deref(),
            Some("employment")
        );
    }

    #[test]
    fn test_config_rejects_unknown_metadata_keys() {
        let result: std::result::Result<MatcherConfig, _> = serde_json::from_str(
            r#"{"phrases": {"part time": {"label": "x", "severity": "high"}}}"#,
        );
        assert!(result.is_err());
    }
}
