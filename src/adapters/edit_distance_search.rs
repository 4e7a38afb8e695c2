use std::cmp::Ordering;

use crate::domain::normalize;
use crate::ports::{ApproximateSearch, SearchHit};

/// Edit-distance based approximate search.
///
/// Each name is scored two ways and the better score wins:
/// - substring distance: edits needed to turn the query into some window of
///   the name, so the match may sit anywhere in the name;
/// - token distance: every query word is paired with its closest name word,
///   so word order and extra words do not matter.
///
/// Both are divided by the query length to land in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EditDistanceSearch;

impl EditDistanceSearch {
    pub fn new() -> Self {
        Self
    }

    fn distance(query: &[char], query_tokens: &[Vec<char>], name: &str) -> f64 {
        let name = normalize(name);
        if name.is_empty() {
            return 1.0;
        }
        let name_chars: Vec<char> = name.chars().collect();
        let substring = substring_distance(query, &name_chars) as f64 / query.len() as f64;

        let name_tokens: Vec<Vec<char>> = name.split(' ').map(|t| t.chars().collect()).collect();
        let token = query_tokens
            .iter()
            .map(|q| {
                name_tokens
                    .iter()
                    .map(|n| levenshtein(q, n) as f64 / q.len().max(n.len()) as f64)
                    .fold(1.0, f64::min)
            })
            .sum::<f64>()
            / query_tokens.len() as f64;

        substring.min(token).clamp(0.0, 1.0)
    }
}

impl ApproximateSearch for EditDistanceSearch {
    fn search(&self, query: &str, names: &[&str]) -> Vec<SearchHit> {
        let query = normalize(query);
        if query.is_empty() {
            return Vec::new();
        }
        let query_chars: Vec<char> = query.chars().collect();
        let query_tokens: Vec<Vec<char>> = query.split(' ').map(|t| t.chars().collect()).collect();

        let mut hits: Vec<SearchHit> = names
            .iter()
            .enumerate()
            .map(|(index, name)| SearchHit {
                index,
                distance: Self::distance(&query_chars, &query_tokens, name),
            })
            .filter(|hit| hit.distance < 1.0)
            .collect();

        // Stable sort keeps input order among equal distances.
        hits.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal));
        hits
    }
}

/// Levenshtein distance with two rolling rows.
fn levenshtein(a: &[char], b: &[char]) -> usize {
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        cur[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            cur[j + 1] = (prev[j + 1] + 1).min(cur[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

/// Smallest edit distance between `pattern` and any substring of `text`.
///
/// Same recurrence as Levenshtein except the first row is all zeros (a match
/// may start anywhere) and the answer is the minimum of the last row (it may
/// end anywhere).
fn substring_distance(pattern: &[char], text: &[char]) -> usize {
    let mut prev = vec![0usize; text.len() + 1];
    let mut cur = vec![0usize; text.len() + 1];
    for (i, cp) in pattern.iter().enumerate() {
        cur[0] = i + 1;
        for (j, ct) in text.iter().enumerate() {
            let cost = usize::from(cp != ct);
            cur[j + 1] = (prev[j + 1] + 1).min(cur[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev.into_iter().min().unwrap_or(pattern.len())
}
