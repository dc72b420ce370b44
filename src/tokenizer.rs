// WHY: the matching core only ever consumes an ordered sequence of word
// tokens with character offsets; this module is the single place that knows
// how to produce that sequence, either by scanning a raw string or by
// flattening a caller-supplied pre-tokenized document tree.

use regex_automata::{meta::Regex, Input};

use crate::error::{Error, Result};
use crate::normalization::DASH_CHARS;

// A word is a maximal run of Unicode alphanumerics, optionally joined by a
// single intra-word joiner (apostrophe, dash, full stop) flanked by
// alphanumerics on both sides. "part-time", "don't" and "U.S.A" scan as one
// word each; a dash floating between spaces does not join anything.
const WORD_PATTERN: &str = r"[\p{L}\p{N}]+(?:['’.\-\u{2010}\u{2011}\u{2012}\u{2013}\u{2014}\u{2015}\u{FE58}\u{FE63}\u{FF0D}][\p{L}\p{N}]+)*";

fn is_joiner_char(ch: char) -> bool {
    ch == '\'' || ch == '’' || ch == '.' || DASH_CHARS.contains(&ch)
}

/// What a word-token fragment contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    /// A run of alphanumeric characters.
    Text,
    /// Intra-word punctuation between two text runs (a dash, apostrophe or
    /// full stop).
    Joiner,
}

/// One contiguous piece of a word token, with its own character span.
///
/// Offsets are half-open character offsets into the original corpus text.
/// They are optional because caller-supplied document trees are not trusted
/// to carry complete position data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub value: String,
    pub kind: FragmentKind,
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl Fragment {
    pub fn text(value: impl Into<String>, start: Option<usize>, end: Option<usize>) -> Self {
        Self {
            value: value.into(),
            kind: FragmentKind::Text,
            start,
            end,
        }
    }

    pub fn joiner(value: impl Into<String>, start: Option<usize>, end: Option<usize>) -> Self {
        Self {
            value: value.into(),
            kind: FragmentKind::Joiner,
            start,
            end,
        }
    }
}

/// One word-level token with its surface text, fragments, and character
/// offsets into the original corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordToken {
    pub value: String,
    pub fragments: Vec<Fragment>,
    pub start: Option<usize>,
    pub end: Option<usize>,
}

/// Scans raw text into an ordered sequence of [`WordToken`].
#[derive(Debug)]
pub struct WordTokenizer {
    word_regex: Regex,
}

impl WordTokenizer {
    pub fn new() -> Result<Self> {
        let word_regex =
            Regex::new(WORD_PATTERN).map_err(|e| Error::Tokenizer(e.to_string()))?;
        Ok(Self { word_regex })
    }

    /// Tokenize `text` into word tokens carrying exact character offsets.
    pub fn tokenize(&self, text: &str) -> Vec<WordToken> {
        let mut tokens = Vec::new();
        let mut tracker = PositionTracker::new(text);

        for found in self.word_regex.find_iter(Input::new(text)) {
            let start_char = tracker.advance_to_byte(found.start());
            let word = &text[found.start()..found.end()];
            let end_char = start_char + word.chars().count();

            tokens.push(WordToken {
                value: word.to_string(),
                fragments: split_fragments(word, start_char),
                start: Some(start_char),
                end: Some(end_char),
            });
        }

        tokens
    }
}

// Split a scanned word into alternating text/joiner fragments with exact
// character sub-spans.
fn split_fragments(word: &str, word_start: usize) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    let mut value = String::new();
    let mut kind = FragmentKind::Text;
    let mut fragment_start = word_start;
    let mut pos = word_start;

    for ch in word.chars() {
        let ch_kind = if is_joiner_char(ch) {
            FragmentKind::Joiner
        } else {
            FragmentKind::Text
        };
        if ch_kind != kind && !value.is_empty() {
            fragments.push(Fragment {
                value: std::mem::take(&mut value),
                kind,
                start: Some(fragment_start),
                end: Some(pos),
            });
            fragment_start = pos;
        }
        if value.is_empty() {
            fragment_start = pos;
        }
        kind = ch_kind;
        value.push(ch);
        pos += 1;
    }
    if !value.is_empty() {
        fragments.push(Fragment {
            value,
            kind,
            start: Some(fragment_start),
            end: Some(pos),
        });
    }

    fragments
}

// WHY: incremental byte-to-char conversion; matches arrive in ascending
// byte order, so one forward pass replaces repeated O(N) rescans.
struct PositionTracker<'a> {
    text: &'a str,
    byte_pos: usize,
    char_pos: usize,
}

impl<'a> PositionTracker<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            byte_pos: 0,
            char_pos: 0,
        }
    }

    fn advance_to_byte(&mut self, target: usize) -> usize {
        debug_assert!(target >= self.byte_pos, "position tracker cannot seek backwards");
        self.char_pos += self.text[self.byte_pos..target].chars().count();
        self.byte_pos = target;
        self.char_pos
    }
}

/// Slice `text` by character offsets, clamping out-of-range bounds.
pub(crate) fn char_slice(text: &str, start: usize, end: usize) -> &str {
    if end <= start {
        return "";
    }
    let byte_start = char_to_byte(text, start);
    let byte_end = char_to_byte(text, end);
    &text[byte_start..byte_end]
}

fn char_to_byte(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map(|(byte_idx, _)| byte_idx)
        .unwrap_or(text.len())
}

/// A pre-tokenized document supplied by the caller instead of a raw string.
///
/// Shape mirrors a sentence/word/punctuation tokenization tree; the matcher
/// never inspects structure beyond the ordered word-token sequence and the
/// reconstructed text, so nesting depth is irrelevant.
#[derive(Debug, Clone, Default)]
pub struct DocumentTree {
    pub children: Vec<TreeNode>,
}

#[derive(Debug, Clone)]
pub enum TreeNode {
    /// A sentence (or any other grouping); may nest.
    Sentence(Vec<TreeNode>),
    Word(WordNode),
    Punctuation(LeafNode),
    Whitespace(LeafNode),
}

/// A word node carrying its text and joiner fragments.
#[derive(Debug, Clone)]
pub struct WordNode {
    pub fragments: Vec<Fragment>,
}

/// A non-word leaf (inter-word punctuation or whitespace).
#[derive(Debug, Clone)]
pub struct LeafNode {
    pub value: String,
}

impl LeafNode {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl WordNode {
    pub fn new(fragments: Vec<Fragment>) -> Self {
        Self { fragments }
    }

    fn token(&self) -> WordToken {
        let value: String = self
            .fragments
            .iter()
            .map(|fragment| fragment.value.as_str())
            .collect();
        WordToken {
            value,
            start: self.fragments.first().and_then(|fragment| fragment.start),
            end: self.fragments.last().and_then(|fragment| fragment.end),
            fragments: self.fragments.clone(),
        }
    }
}

impl DocumentTree {
    /// Reconstruct the corpus text by concatenating every leaf value.
    ///
    /// Fragment offsets in the tree are character offsets into this
    /// reconstruction; keeping them consistent is the caller's contract.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        collect_text(&self.children, &mut text);
        text
    }

    /// Flatten the tree into its ordered word-token sequence.
    pub fn word_tokens(&self) -> Vec<WordToken> {
        let mut tokens = Vec::new();
        collect_tokens(&self.children, &mut tokens);
        tokens
    }
}

fn collect_text(nodes: &[TreeNode], text: &mut String) {
    for node in nodes {
        match node {
            TreeNode::Sentence(children) => collect_text(children, text),
            TreeNode::Word(word) => {
                for fragment in &word.fragments {
                    text.push_str(&fragment.value);
                }
            }
            TreeNode::Punctuation(leaf) | TreeNode::Whitespace(leaf) => {
                text.push_str(&leaf.value);
            }
        }
    }
}

fn collect_tokens(nodes: &[TreeNode], tokens: &mut Vec<WordToken>) {
    for node in nodes {
        match node {
            TreeNode::Sentence(children) => collect_tokens(children, tokens),
            TreeNode::Word(word) => tokens.push(word.token()),
            TreeNode::Punctuation(_) | TreeNode::Whitespace(_) => {}
        }
    }
}
