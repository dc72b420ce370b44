// WHY: the dictionary is an owned, immutable value returned from
// construction and passed by reference into every matching call; there is
// deliberately no process-wide automaton handle shared between runs.

use std::collections::{BTreeMap, HashMap};

use aho_corasick::{AhoCorasick, AhoCorasickBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::normalization::{normalize, NormalizeOptions};

/// Caller-supplied metadata for one phrase.
///
/// Unknown keys in deserialized configuration are rejected rather than
/// silently carried along.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhraseMeta {
    pub label: Option<String>,
    pub code: Option<String>,
}

/// One configured phrase: the literal key as supplied, its metadata, and
/// the normalized form computed exactly once at dictionary build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseEntry {
    pub key: String,
    pub label: Option<String>,
    pub code: Option<String>,
    pub normalized_value: String,
}

/// Serializable snapshot of the dictionary's search structure.
///
/// Opaque to callers; carries no phrase metadata, so `phrases` must always
/// be resupplied when a dictionary is imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryExport {
    patterns: Vec<String>,
}

/// The set of configured phrases plus the multi-pattern search automaton
/// built over their normalized forms.
///
/// Built once, immutable afterwards. Invariant: every pattern in the
/// automaton has exactly one entry reachable by normalized-value lookup;
/// duplicate normalized values are rejected at build time.
#[derive(Debug)]
pub struct Dictionary {
    entries: Vec<PhraseEntry>,
    by_normalized: HashMap<String, usize>,
    patterns: Vec<String>,
    automaton: AhoCorasick,
}

impl Dictionary {
    /// Build a dictionary from a phrase map, normalizing every key in map
    /// order (deterministic, so exports are reproducible).
    pub fn build(phrases: &BTreeMap<String, PhraseMeta>, opts: &NormalizeOptions) -> Result<Self> {
        let (entries, by_normalized) = build_entries(phrases, opts)?;
        let patterns: Vec<String> = entries
            .iter()
            .map(|entry| entry.normalized_value.clone())
            .collect();

        info!("building phrase dictionary with {} patterns", patterns.len());
        let automaton = build_automaton(&patterns)?;

        Ok(Self {
            entries,
            by_normalized,
            patterns,
            automaton,
        })
    }

    /// Rebuild a dictionary from an exported search structure.
    ///
    /// The pattern list is taken from the export as-is; phrase metadata is
    /// recomputed locally from `phrases` since exports carry none. Fails if
    /// the supplied phrases do not cover every imported pattern.
    pub fn import(
        export: DictionaryExport,
        phrases: &BTreeMap<String, PhraseMeta>,
        opts: &NormalizeOptions,
    ) -> Result<Self> {
        let (entries, by_normalized) = build_entries(phrases, opts)?;
        for pattern in &export.patterns {
            if !by_normalized.contains_key(pattern) {
                return Err(Error::DictionaryMismatch {
                    pattern: pattern.clone(),
                });
            }
        }

        info!(
            "importing phrase dictionary with {} patterns",
            export.patterns.len()
        );
        let automaton = build_automaton(&export.patterns)?;

        Ok(Self {
            entries,
            by_normalized,
            patterns: export.patterns,
            automaton,
        })
    }

    /// Export the search structure for reuse across runs.
    pub fn export(&self) -> DictionaryExport {
        DictionaryExport {
            patterns: self.patterns.clone(),
        }
    }

    /// Report every configured pattern occurring as a substring of
    /// `normalized_text`, without regard to word boundaries.
    ///
    /// Each pattern is reported once per scan (not once per occurrence), in
    /// first-occurrence order; overlapping occurrences are considered.
    pub fn candidates(&self, normalized_text: &str) -> Vec<&str> {
        let mut seen = vec![false; self.patterns.len()];
        let mut found = Vec::new();
        for hit in self.automaton.find_overlapping_iter(normalized_text) {
            let id = hit.pattern().as_usize();
            if !seen[id] {
                seen[id] = true;
                found.push(self.patterns[id].as_str());
            }
        }
        debug!("candidate scan reported {} distinct patterns", found.len());
        found
    }

    /// Look up the entry whose normalized value equals `normalized_value`.
    pub fn lookup(&self, normalized_value: &str) -> Option<&PhraseEntry> {
        self.by_normalized
            .get(normalized_value)
            .map(|&index| &self.entries[index])
    }

    pub fn entries(&self) -> &[PhraseEntry] {
        &self.entries
    }
}

fn build_entries(
    phrases: &BTreeMap<String, PhraseMeta>,
    opts: &NormalizeOptions,
) -> Result<(Vec<PhraseEntry>, HashMap<String, usize>)> {
    if phrases.is_empty() {
        return Err(Error::EmptyPhrases);
    }

    let mut entries = Vec::with_capacity(phrases.len());
    let mut by_normalized = HashMap::with_capacity(phrases.len());

    for (key, meta) in phrases {
        let normalized_value = normalize(key, opts);
        if let Some(&existing) = by_normalized.get(&normalized_value) {
            let first: &PhraseEntry = &entries[existing];
            return Err(Error::DuplicateNormalizedValue {
                first: first.key.clone(),
                second: key.clone(),
                normalized: normalized_value,
            });
        }
        by_normalized.insert(normalized_value.clone(), entries.len());
        entries.push(PhraseEntry {
            key: key.clone(),
            label: meta.label.clone(),
            code: meta.code.clone(),
            normalized_value,
        });
    }

    Ok((entries, by_normalized))
}

fn build_automaton(patterns: &[String]) -> Result<AhoCorasick> {
    AhoCorasickBuilder::new()
        .build(patterns)
        .map_err(|e| Error::Automaton(e.to_string()))
}
