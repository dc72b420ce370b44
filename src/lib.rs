//! Phrase alignment and span resolution for controlled-vocabulary tagging.
//!
//! Builds a dictionary from a set of phrases, scans text for candidate
//! occurrences with an Aho-Corasick automaton over normalized text, rejects
//! hits that only occur inside larger words, and resolves every surviving
//! phrase to exact character spans in the original corpus.

pub mod dictionary;
pub mod error;
pub mod matcher;
pub mod merge;
pub mod normalization;
pub mod resolver;
pub mod tokenizer;

// Re-export main types for convenient access
pub use dictionary::{Dictionary, DictionaryExport, PhraseEntry, PhraseMeta};
pub use error::{Error, Result};
pub use matcher::{MatcherConfig, PhraseMatcher};
pub use merge::merge_matches;
pub use normalization::{normalize, normalize_all, NormalizeOptions};
pub use resolver::{is_full_word_match, MatchRecord};
pub use tokenizer::{
    DocumentTree, Fragment, FragmentKind, LeafNode, TreeNode, WordNode, WordToken, WordTokenizer,
};
