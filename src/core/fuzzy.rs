//! Fuzzy matching for prompt choice filtering.

use nucleo_matcher::{
    pattern::{CaseMatching, Normalization, Pattern},
    Config, Matcher, Utf32Str,
};

use crate::metrics;

/// A candidate that matched a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyMatch {
    /// Index of the candidate as supplied by the caller.
    pub index: usize,
    /// Match score (higher is better).
    pub score: u32,
    /// Sorted, deduplicated char positions of the matched characters.
    pub positions: Vec<u32>,
}

/// Fuzzy matcher wrapping nucleo-matcher.
///
/// Queries use the extended pattern syntax: whitespace separates terms that
/// must all match, `!term` excludes, `'term` requires a substring, `^term`
/// anchors at the start and `term$` at the end.
///
/// Reuses internal buffers across calls for efficiency.
pub struct FuzzyMatcher {
    matcher: Matcher,
    buf: Vec<char>,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FuzzyMatcher {
    /// Create a new fuzzy matcher.
    pub fn new() -> Self {
        Self {
            matcher: Matcher::new(Config::DEFAULT),
            buf: Vec::with_capacity(256),
        }
    }

    /// Match candidates against `query` and rank them.
    ///
    /// A blank query matches every candidate, in input order, with no
    /// positions. Otherwise results are sorted by score (highest first); equal
    /// scores prefer the shorter trimmed key, then input order.
    pub fn find<I, S>(&mut self, query: &str, candidates: I) -> Vec<FuzzyMatch>
    where
        I: IntoIterator<Item = (usize, S)>,
        S: AsRef<str>,
    {
        let _timer = metrics::Timer::start("fuzzy_find");

        if query.trim().is_empty() {
            return candidates
                .into_iter()
                .map(|(index, _)| FuzzyMatch {
                    index,
                    score: 0,
                    positions: Vec::new(),
                })
                .collect();
        }

        let pat = Pattern::parse(query, CaseMatching::Smart, Normalization::Smart);

        let mut results: Vec<(FuzzyMatch, usize)> = candidates
            .into_iter()
            .filter_map(|(index, key)| {
                let key = key.as_ref();
                // One slot per char so positions line up with `str::chars`;
                // `Utf32Str::new` would fold grapheme clusters.
                let haystack = if key.is_ascii() {
                    Utf32Str::Ascii(key.as_bytes())
                } else {
                    self.buf.clear();
                    self.buf.extend(key.chars());
                    Utf32Str::Unicode(&self.buf)
                };
                let mut positions = Vec::new();
                let score = pat.indices(haystack, &mut self.matcher, &mut positions)?;
                positions.sort_unstable();
                positions.dedup();
                let key_len = key.trim().chars().count();
                Some((
                    FuzzyMatch {
                        index,
                        score,
                        positions,
                    },
                    key_len,
                ))
            })
            .collect();

        metrics::count("fuzzy_matches", results.len());
        results.sort_by(|(a, a_len), (b, b_len)| {
            b.score
                .cmp(&a.score)
                .then(a_len.cmp(b_len))
                .then(a.index.cmp(&b.index))
        });

        results.into_iter().map(|(m, _)| m).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices(results: &[FuzzyMatch]) -> Vec<usize> {
        results.iter().map(|m| m.index).collect()
    }

    #[test]
    fn test_empty_query_matches_all_in_order() {
        let mut m = FuzzyMatcher::new();
        let results = m.find("", ["b", "a", "c"].into_iter().enumerate());
        assert_eq!(indices(&results), vec![0, 1, 2]);
        assert!(results.iter().all(|r| r.positions.is_empty()));
    }

    #[test]
    fn test_whitespace_query_matches_all() {
        let mut m = FuzzyMatcher::new();
        let results = m.find("   ", ["a", "b"].into_iter().enumerate());
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_no_match() {
        let mut m = FuzzyMatcher::new();
        let results = m.find("xyz", ["main", "develop"].into_iter().enumerate());
        assert!(results.is_empty());
    }

    #[test]
    fn test_fuzzy_match_positions() {
        let mut m = FuzzyMatcher::new();
        let results = m.find("dvl", ["develop", "main"].into_iter().enumerate());
        assert_eq!(indices(&results), vec![0]);
        assert_eq!(results[0].positions, vec![0, 2, 4]);
    }

    #[test]
    fn test_positions_count_combining_marks_as_chars() {
        let mut m = FuzzyMatcher::new();
        let results = m.find("xyz", ["cafe\u{301}-xyz"].into_iter().enumerate());
        assert_eq!(results[0].positions, vec![6, 7, 8]);
    }

    #[test]
    fn test_shorter_key_wins_ties() {
        let mut m = FuzzyMatcher::new();
        let candidates = ["lint:fix extra", "lint:fix"];
        let results = m.find("'lint", candidates.iter().enumerate().map(|(i, s)| (i, *s)));
        assert_eq!(indices(&results), vec![1, 0]);
    }

    #[test]
    fn test_negation_excludes() {
        let mut m = FuzzyMatcher::new();
        let candidates = ["feature/login", "feature/logout", "main"];
        let results = m.find(
            "feature !logout",
            candidates.iter().enumerate().map(|(i, s)| (i, *s)),
        );
        assert_eq!(indices(&results), vec![0]);
    }

    #[test]
    fn test_multi_term_requires_all() {
        let mut m = FuzzyMatcher::new();
        let candidates = ["eslint lint", "prettier format", "eslint fix"];
        let results = m.find(
            "eslint fix",
            candidates.iter().enumerate().map(|(i, s)| (i, *s)),
        );
        assert_eq!(indices(&results), vec![2]);
    }

    #[test]
    fn test_exact_prefix_ranks_first() {
        let mut m = FuzzyMatcher::new();
        let candidates = ["something_app", "app", "zapp"];
        let results = m.find("app", candidates.iter().enumerate().map(|(i, s)| (i, *s)));
        assert_eq!(results[0].index, 1);
    }
}
