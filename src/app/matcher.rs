use std::sync::Arc;

use tracing::debug;

use crate::adapters::EditDistanceSearch;
use crate::domain::matching::match_strict;
use crate::domain::{normalize, Board, Candidate, MatchResult, MatchTier, MatchingConfig};
use crate::ports::ApproximateSearch;

/// A candidate chosen by [`NameMatcher::find_best_match`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matched<'a, C> {
    pub candidate: &'a C,
    /// `result.index` points into the full candidate list, before any
    /// category filtering.
    pub result: MatchResult,
}

/// Maps free-form names onto catalog candidates.
///
/// Tries, in order: equality of normalized names, equality of compact names,
/// and an approximate search whose best hit must reach `min_fuzzy_score`.
#[derive(Clone)]
pub struct NameMatcher {
    search: Arc<dyn ApproximateSearch>,
    min_fuzzy_score: f64,
}

impl Default for NameMatcher {
    fn default() -> Self {
        Self::new(&MatchingConfig::default())
    }
}

impl NameMatcher {
    /// Matcher using the bundled edit-distance search.
    pub fn new(config: &MatchingConfig) -> Self {
        Self::with_search(config, Arc::new(EditDistanceSearch::new()))
    }

    pub fn with_search(config: &MatchingConfig, search: Arc<dyn ApproximateSearch>) -> Self {
        Self {
            search,
            min_fuzzy_score: config.min_fuzzy_score,
        }
    }

    pub fn min_fuzzy_score(&self) -> f64 {
        self.min_fuzzy_score
    }

    /// Best candidate for `target`, optionally restricted to one category
    /// (the platform id for boards).
    pub fn find_best_match<'a, C: Candidate>(
        &self,
        target: &str,
        candidates: &'a [C],
        category: Option<&str>,
    ) -> Option<Matched<'a, C>> {
        if normalize(target).is_empty() {
            return None;
        }

        let pool: Vec<(usize, &C)> = candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| category.map_or(true, |cat| c.category() == cat))
            .collect();
        if pool.is_empty() {
            debug!(name = target, ?category, "No candidates to match against");
            return None;
        }

        let names: Vec<&str> = pool.iter().map(|(_, c)| c.display_name()).collect();
        let result = match_strict(target, names.iter().copied())
            .or_else(|| self.fuzzy_match(target, &names))?;

        let (index, candidate) = *pool.get(result.index)?;
        debug!(
            name = target,
            matched = candidate.display_name(),
            tier = %result.tier,
            score = result.score,
            "Name matched"
        );
        Some(Matched {
            candidate,
            result: MatchResult { index, ..result },
        })
    }

    fn fuzzy_match(&self, target: &str, names: &[&str]) -> Option<MatchResult> {
        let best = self.search.search(target, names).into_iter().next()?;
        let similarity = (1.0 - best.distance).max(0.0);
        if similarity < self.min_fuzzy_score {
            debug!(
                name = target,
                similarity,
                min = self.min_fuzzy_score,
                "Best fuzzy hit below threshold"
            );
            return None;
        }
        Some(MatchResult {
            index: best.index,
            tier: MatchTier::Fuzzy,
            score: similarity,
        })
    }

    /// History entries that are name-only placeholders for `target`.
    ///
    /// Entries already carrying an FQBN are resolved identities and never
    /// returned.
    pub fn match_history<'a>(target: &str, entries: &'a [Board]) -> Vec<&'a Board> {
        let target = normalize(target);
        if target.is_empty() {
            return Vec::new();
        }
        entries
            .iter()
            .filter(|board| !board.has_fqbn() && normalize(&board.name) == target)
            .collect()
    }
}
