//! Error types for phrasemark.

use thiserror::Error;

/// Result type for phrasemark operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for phrasemark operations.
///
/// Every variant is raised at dictionary construction or import time.
/// Matching itself is infallible: degraded token position data is absorbed
/// as zero-width spans rather than surfaced as an error.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The `phrases` map was empty; there is nothing to match against.
    #[error("can not find matches without a non-empty `phrases` map")]
    EmptyPhrases,

    /// Two distinct phrase keys reduce to the same normalized value, which
    /// would make metadata lookup by normalized value ambiguous.
    #[error("phrases {first:?} and {second:?} both normalize to {normalized:?}")]
    DuplicateNormalizedValue {
        first: String,
        second: String,
        normalized: String,
    },

    /// An imported dictionary contains a pattern that none of the supplied
    /// phrases normalizes to, so no metadata could ever be attached to it.
    #[error("imported dictionary pattern {pattern:?} has no matching phrase entry")]
    DictionaryMismatch { pattern: String },

    /// The multi-pattern search automaton could not be built.
    #[error("failed to build search automaton: {0}")]
    Automaton(String),

    /// The word scanner regex could not be compiled.
    #[error("failed to compile word scanner: {0}")]
    Tokenizer(String),
}
