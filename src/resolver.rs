// WHY: span resolution is the one place where three coordinate systems meet
// (raw character offsets, normalized text, token indices); everything here
// keeps the mapping explicit so offsets always point into the original
// corpus, never into the normalized view.

use std::collections::HashSet;

use serde::Serialize;

use crate::dictionary::PhraseEntry;
use crate::normalization::{normalize_into, NormalizeOptions};
use crate::tokenizer::{char_slice, WordToken, WordTokenizer};

/// One confirmed, positioned occurrence of a phrase.
///
/// `matched_text` is the exact substring of the original corpus between the
/// first and last matched token, inter-word characters included: a corpus
/// "part-time" matched by the phrase "part time" reports the hyphenated
/// surface form, not the normalized one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    pub matched_text: String,
    /// Half-open character offsets into the original corpus.
    pub start: usize,
    pub end: usize,
    pub label: Option<String>,
    pub code: Option<String>,
}

/// One normalized word unit with the character span it originated from.
///
/// A surface token whose normalized form folds into several words (e.g.
/// "part-time" with dash folding) expands into several units; each unit
/// takes the span of the fragments that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedWord {
    pub text: String,
    pub start: Option<usize>,
    pub end: Option<usize>,
}

/// Derive the ordered normalized word sequence from a token sequence.
///
/// Each fragment is normalized independently; a fragment that folds to
/// whitespace splits the token into separate units at that point. Units
/// never span tokens.
pub fn normalized_words(tokens: &[WordToken], opts: &NormalizeOptions) -> Vec<NormalizedWord> {
    let mut units = Vec::new();
    let mut buffer = String::new();

    for token in tokens {
        let mut text = String::new();
        let mut start: Option<usize> = None;
        let mut end: Option<usize> = None;

        for fragment in &token.fragments {
            normalize_into(&fragment.value, opts, &mut buffer);
            if buffer.is_empty() {
                continue;
            }
            if !buffer.chars().any(char::is_whitespace) {
                if text.is_empty() {
                    start = fragment.start;
                }
                text.push_str(&buffer);
                end = fragment.end.or(end);
                continue;
            }

            // The fragment folded into one or more separators. If a single
            // fragment yields several words, their exact sub-spans are
            // unknowable after folding, so each takes the fragment's span.
            let segments: Vec<&str> = buffer.split(char::is_whitespace).collect();
            let last = segments.len() - 1;
            for (index, segment) in segments.iter().enumerate() {
                if !segment.is_empty() {
                    if text.is_empty() {
                        start = fragment.start;
                    }
                    text.push_str(segment);
                    end = fragment.end.or(end);
                }
                if index < last {
                    flush_unit(&mut units, &mut text, &mut start, &mut end);
                }
            }
        }

        flush_unit(&mut units, &mut text, &mut start, &mut end);
    }

    units
}

fn flush_unit(
    units: &mut Vec<NormalizedWord>,
    text: &mut String,
    start: &mut Option<usize>,
    end: &mut Option<usize>,
) {
    if !text.is_empty() {
        units.push(NormalizedWord {
            text: std::mem::take(text),
            start: *start,
            end: *end,
        });
    }
    *start = None;
    *end = None;
}

/// Coarse word-boundary check: every normalized word of `phrase` must occur
/// somewhere among the normalized words of `corpus`.
///
/// Order-insensitive and intentionally permissive; it only discards
/// candidates with zero chance of a positional alignment. The substring
/// search primitive matches "cat" inside "category", this is what rejects
/// that hit.
pub fn is_full_word_match(
    phrase: &str,
    corpus: &str,
    tokenizer: &WordTokenizer,
    opts: &NormalizeOptions,
) -> bool {
    let corpus_units = normalized_words(&tokenizer.tokenize(corpus), opts);
    let corpus_words: HashSet<&str> = corpus_units.iter().map(|u| u.text.as_str()).collect();
    has_all_words(phrase, &corpus_words, tokenizer, opts)
}

pub(crate) fn has_all_words(
    phrase: &str,
    corpus_words: &HashSet<&str>,
    tokenizer: &WordTokenizer,
    opts: &NormalizeOptions,
) -> bool {
    let phrase_units = normalized_words(&tokenizer.tokenize(phrase), opts);
    !phrase_units.is_empty()
        && phrase_units
            .iter()
            .all(|unit| corpus_words.contains(unit.text.as_str()))
}

/// Find every contiguous, order-preserving run of corpus units that
/// realizes `entry`'s phrase, and emit one record per run.
///
/// The scan resumes at `i + 1` even after a successful multi-word match, so
/// an immediately repeating phrase ("time time" over "time time time")
/// produces one overlapping match per valid start index rather than a
/// non-overlapping tiling. Callers wanting tiling must post-filter.
pub fn resolve(
    entry: &PhraseEntry,
    corpus_units: &[NormalizedWord],
    corpus_text: &str,
    tokenizer: &WordTokenizer,
    opts: &NormalizeOptions,
) -> Vec<MatchRecord> {
    let phrase_units = normalized_words(&tokenizer.tokenize(&entry.key), opts);
    if phrase_units.is_empty() {
        return Vec::new();
    }

    let window_len = phrase_units.len();
    let mut records = Vec::new();

    for index in 0..corpus_units.len() {
        if corpus_units[index].text != phrase_units[0].text {
            continue;
        }
        let window = match corpus_units.get(index..index + window_len) {
            Some(window) => window,
            None => continue, // insufficient tokens remain
        };
        if window
            .iter()
            .zip(&phrase_units)
            .all(|(corpus, phrase)| corpus.text == phrase.text)
        {
            records.push(build_record(window, corpus_text, entry));
        }
    }

    records
}

// Offsets come from the first and last unit of the window. Missing position
// data degrades to a zero-width span instead of failing the match.
fn build_record(window: &[NormalizedWord], corpus_text: &str, entry: &PhraseEntry) -> MatchRecord {
    let start = window.first().and_then(|unit| unit.start).unwrap_or(0);
    let end = window
        .last()
        .and_then(|unit| unit.end)
        .filter(|&end| end >= start)
        .unwrap_or(start);

    MatchRecord {
        matched_text: char_slice(corpus_text, start, end).to_string(),
        start,
        end,
        label: entry.label.clone(),
        code: entry.code.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenizer() -> WordTokenizer {
        WordTokenizer::new().unwrap()
    }

    fn folded() -> NormalizeOptions {
        NormalizeOptions {
            lowercase: true,
            replace_dashes: true,
            ..Default::default()
        }
    }

    fn entry(key: &str, opts: &NormalizeOptions) -> PhraseEntry {
        PhraseEntry {
            key: key.to_string(),
            label: Some("label".to_string()),
            code: Some("code".to_string()),
            normalized_value: crate::normalization::normalize(key, opts),
        }
    }

    fn units(text: &str, opts: &NormalizeOptions) -> Vec<NormalizedWord> {
        normalized_words(&tokenizer().tokenize(text), opts)
    }

    #[test]
    fn test_normalized_words_plain() {
        let opts = folded();
        let units = units("She Works Hard", &opts);
        let texts: Vec<&str> = units.iter().map(|u| u.text.as_str()).collect();
        assert_eq!(texts, vec!["she", "works", "hard"]);
        assert_eq!(units[1].start, Some(4));
        assert_eq!(units[1].end, Some(9));
    }

    #[test]
    fn test_normalized_words_expand_folded_compound() {
        let opts = folded();
        let units = units("part-time", &opts);
        assert_eq!(
            units,
            vec![
                NormalizedWord {
                    text: "part".to_string(),
                    start: Some(0),
                    end: Some(4),
                },
                NormalizedWord {
                    text: "time".to_string(),
                    start: Some(5),
                    end: Some(9),
                },
            ]
        );
    }

    #[test]
    fn test_normalized_words_keep_compound_without_folding() {
        let opts = NormalizeOptions {
            lowercase: true,
            ..Default::default()
        };
        let units = units("part-time", &opts);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].text, "part-time");
    }

    #[test]
    fn test_boundary_validator_rejects_substring_only_hits() {
        let opts = folded();
        let tk = tokenizer();
        assert!(!is_full_word_match("cat", "the category is closed", &tk, &opts));
        assert!(is_full_word_match("cat", "the cat is closed", &tk, &opts));
    }

    #[test]
    fn test_boundary_validator_is_order_insensitive() {
        // Deliberately permissive: only set containment, no positions yet.
        let opts = folded();
        let tk = tokenizer();
        assert!(is_full_word_match("time part", "part of the time", &tk, &opts));
    }

    #[test]
    fn test_resolve_single_word() {
        let opts = folded();
        let corpus = "I ate an apple today";
        let records = resolve(
            &entry("apple", &opts),
            &units(corpus, &opts),
            corpus,
            &tokenizer(),
            &opts,
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].matched_text, "apple");
        assert_eq!(records[0].start, 9);
        assert_eq!(records[0].end, 14);
        assert_eq!(records[0].label.as_deref(), Some("label"));
        assert_eq!(records[0].code.as_deref(), Some("code"));
    }

    #[test]
    fn test_resolve_rejects_non_contiguous_words() {
        let opts = folded();
        let corpus = "part of her time";
        let records = resolve(
            &entry("part time", &opts),
            &units(corpus, &opts),
            corpus,
            &tokenizer(),
            &opts,
        );
        assert!(records.is_empty());
    }

    #[test]
    fn test_resolve_rejects_out_of_order_words() {
        let opts = folded();
        let corpus = "time part";
        let records = resolve(
            &entry("part time", &opts),
            &units(corpus, &opts),
            corpus,
            &tokenizer(),
            &opts,
        );
        assert!(records.is_empty());
    }

    #[test]
    fn test_resolve_overlapping_repeats() {
        let opts = folded();
        let corpus = "time time time";
        let records = resolve(
            &entry("time time", &opts),
            &units(corpus, &opts),
            corpus,
            &tokenizer(),
            &opts,
        );
        assert_eq!(records.len(), 2);
        assert_eq!((records[0].start, records[0].end), (0, 9));
        assert_eq!((records[1].start, records[1].end), (5, 14));
    }

    #[test]
    fn test_resolve_insufficient_tokens_at_end() {
        let opts = folded();
        let corpus = "she works part";
        let records = resolve(
            &entry("part time", &opts),
            &units(corpus, &opts),
            corpus,
            &tokenizer(),
            &opts,
        );
        assert!(records.is_empty());
    }

    #[test]
    fn test_missing_end_offset_degrades_to_zero_width() {
        let opts = folded();
        let corpus_units = vec![NormalizedWord {
            text: "apple".to_string(),
            start: Some(3),
            end: None,
        }];
        let records = resolve(
            &entry("apple", &opts),
            &corpus_units,
            "an apple",
            &tokenizer(),
            &opts,
        );
        assert_eq!(records.len(), 1);
        assert_eq!((records[0].start, records[0].end), (3, 3));
        assert_eq!(records[0].matched_text, "");
    }
}
