/// One result of an approximate search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    /// Position of the matched name in the searched list.
    pub index: usize,
    /// Distance from the query: 0.0 is a perfect match, 1.0 the worst.
    pub distance: f64,
}

/// Port for approximate (typo-tolerant) name search.
///
/// The scoring algorithm is up to the implementation. Callers only rely on
/// hits being ordered best-first with distances in `[0.0, 1.0]`.
pub trait ApproximateSearch: Send + Sync {
    fn search(&self, query: &str, names: &[&str]) -> Vec<SearchHit>;
}
