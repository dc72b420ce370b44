//! Combining results from independently-run matchers into one ordered
//! annotation stream.

use crate::resolver::MatchRecord;

/// Concatenate result lists in the order given, then stably sort by `start`
/// ascending.
///
/// No secondary key: records with equal `start` keep their relative input
/// order, so running several independently configured phrase sets over the
/// same document yields one deterministic stream.
pub fn merge_matches<I>(lists: I) -> Vec<MatchRecord>
where
    I: IntoIterator,
    I::Item: IntoIterator<Item = MatchRecord>,
{
    let mut merged: Vec<MatchRecord> = lists.into_iter().flatten().collect();
    merged.sort_by_key(|record| record.start);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(start: usize, code: &str) -> MatchRecord {
        MatchRecord {
            matched_text: String::new(),
            start,
            end: start,
            label: None,
            code: Some(code.to_string()),
        }
    }

    #[test]
    fn test_merge_sorts_by_start_across_lists() {
        let merged = merge_matches(vec![
            vec![record(19, "alpha")],
            vec![record(0, "beta")],
        ]);
        let codes: Vec<&str> = merged.iter().filter_map(|r| r.code.as_deref()).collect();
        assert_eq!(codes, vec!["beta", "alpha"]);
    }

    #[test]
    fn test_merge_is_stable_for_equal_starts() {
        let merged = merge_matches(vec![
            vec![record(5, "first"), record(2, "early")],
            vec![record(5, "second")],
        ]);
        let codes: Vec<&str> = merged.iter().filter_map(|r| r.code.as_deref()).collect();
        assert_eq!(codes, vec!["early", "first", "second"]);
    }

    #[test]
    fn test_merge_of_nothing_is_empty() {
        let merged = merge_matches(Vec::<Vec<MatchRecord>>::new());
        assert!(merged.is_empty());
    }
}
