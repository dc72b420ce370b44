// WHY: standalone normalization logic shared by the dictionary, the phrase
// side, and the corpus side of matching; both sides must fold text through
// the exact same pipeline or span alignment silently breaks.

use std::iter::once;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Unicode dash-class characters folded to a single space when
/// `replace_dashes` is enabled: hyphen-minus, hyphen, non-breaking hyphen,
/// figure dash, en dash, em dash, horizontal bar, small em dash, small
/// hyphen-minus, fullwidth hyphen-minus.
pub const DASH_CHARS: [char; 10] = [
    '\u{002D}', '\u{2010}', '\u{2011}', '\u{2012}', '\u{2013}', '\u{2014}', '\u{2015}',
    '\u{FE58}', '\u{FE63}', '\u{FF0D}',
];

/// Which folding steps the normalization pipeline applies.
///
/// All flags default to off; the pipeline order is fixed regardless of which
/// flags are set (case fold, then accent strip, then dash fold, then
/// full-stop fold).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Case fold to lowercase.
    pub lowercase: bool,
    /// Strip diacritics down to base letters.
    pub replace_accents: bool,
    /// Fold every [`DASH_CHARS`] character to a space.
    pub replace_dashes: bool,
    /// Fold the full stop to a space (extended matcher variant).
    pub replace_full_stops: bool,
}

/// Normalize `text` through the configured pipeline.
///
/// Pure and total; idempotent for any fixed set of options.
pub fn normalize(text: &str, opts: &NormalizeOptions) -> String {
    let mut result = String::with_capacity(text.len());
    normalize_into(text, opts, &mut result);
    result
}

/// Normalize `text` into a supplied buffer to avoid allocation.
/// WHY: enables buffer reuse when normalizing long token sequences.
pub fn normalize_into(text: &str, opts: &NormalizeOptions, buffer: &mut String) {
    buffer.clear();
    buffer.reserve(text.len());

    for ch in text.chars() {
        if opts.lowercase {
            for folded in ch.to_lowercase() {
                strip_accents(folded, opts, buffer);
            }
        } else {
            strip_accents(ch, opts, buffer);
        }
    }
}

// Accent stripping must run before dash folding so that a decomposed
// accented character adjacent to a dash is still handled.
fn strip_accents(ch: char, opts: &NormalizeOptions, buffer: &mut String) {
    if opts.replace_accents {
        for decomposed in once(ch).nfd() {
            if !is_combining_mark(decomposed) {
                fold_separators(decomposed, opts, buffer);
            }
        }
    } else {
        fold_separators(ch, opts, buffer);
    }
}

fn fold_separators(ch: char, opts: &NormalizeOptions, buffer: &mut String) {
    if opts.replace_dashes && DASH_CHARS.contains(&ch) {
        buffer.push(' ');
    } else if opts.replace_full_stops && ch == '.' {
        buffer.push(' ');
    } else {
        buffer.push(ch);
    }
}

/// Normalize every element of an ordered sequence, preserving order and
/// length.
pub fn normalize_all<S: AsRef<str>>(items: &[S], opts: &NormalizeOptions) -> Vec<String> {
    items
        .iter()
        .map(|item| normalize(item.as_ref(), opts))
        .collect()
}
