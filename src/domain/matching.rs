use serde::{Deserialize, Serialize};

/// Score reported for a match on normalized names.
pub const EXACT_SCORE: f64 = 1.0;

/// Score reported for a match on compact names.
pub const NORMALIZED_SCORE: f64 = 0.95;

/// Lower-case a name and collapse every run of non-alphanumeric characters
/// into a single space, trimmed at both ends.
///
/// `"Arduino  Uno!"` and `"arduino-uno"` both become `"arduino uno"`.
pub fn normalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_space = false;
    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch);
        } else {
            pending_space = true;
        }
    }
    out
}

/// Lower-case a name and drop every non-alphanumeric character.
///
/// Catches variants that only differ in separators: `"ArduinoUno"` and
/// `"Arduino-Uno"` both become `"arduinouno"`.
pub fn compact(name: &str) -> String {
    name.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// How a name match was found, in decreasing strictness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    Exact,
    Normalized,
    Fuzzy,
}

impl std::fmt::Display for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchTier::Exact => write!(f, "exact"),
            MatchTier::Normalized => write!(f, "normalized"),
            MatchTier::Fuzzy => write!(f, "fuzzy"),
        }
    }
}

/// Outcome of matching a target name against a candidate list.
///
/// `index` points into the list that was searched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchResult {
    pub index: usize,
    pub tier: MatchTier,
    pub score: f64,
}

/// Find the first name equal to `target` after normalization, falling back to
/// the first name equal after compaction. Input order decides ties.
///
/// Returns `None` for an empty or punctuation-only target.
pub fn match_strict<'a, I>(target: &str, names: I) -> Option<MatchResult>
where
    I: IntoIterator<Item = &'a str>,
    I::IntoIter: Clone,
{
    let normalized_target = normalize(target);
    if normalized_target.is_empty() {
        return None;
    }

    let mut names = names.into_iter();

    if let Some(index) = names
        .clone()
        .position(|name| normalize(name) == normalized_target)
    {
        return Some(MatchResult {
            index,
            tier: MatchTier::Exact,
            score: EXACT_SCORE,
        });
    }

    let compact_target = compact(target);
    names
        .position(|name| compact(name) == compact_target)
        .map(|index| MatchResult {
            index,
            tier: MatchTier::Normalized,
            score: NORMALIZED_SCORE,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_separators() {
        assert_eq!(normalize("Arduino Uno!"), "arduino uno");
        assert_eq!(normalize("  Arduino---Uno  "), "arduino uno");
        assert_eq!(normalize("ESP32_Dev\tModule"), "esp32 dev module");
        assert_eq!(normalize("!!!"), "");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for name in ["Arduino Uno!", " a--b  c ", "Nano (Every)", "ÄÖü-Board", "İstanbul", "", "  "] {
            let once = normalize(name);
            assert_eq!(normalize(&once), once, "{name:?}");
        }
    }

    #[test]
    fn test_compact_is_stripped_normalize() {
        for name in ["Arduino Uno!", " a--b  c ", "Nano (Every)", "ÄÖü-Board", "İstanbul", ""] {
            let compacted = compact(name);
            assert_eq!(compact(&compacted), compacted);
            assert!(!compacted.contains(' '));
            assert_eq!(compacted, normalize(name).replace(' ', ""));
        }
    }

    #[test]
    fn test_exact_match_wins_over_compact() {
        let result = match_strict("Arduino Uno", ["Arduino Uno", "arduino-uno"]).unwrap();
        assert_eq!(result.index, 0);
        assert_eq!(result.tier, MatchTier::Exact);
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn test_first_normalized_match_wins() {
        let result = match_strict("arduino uno", ["Nano", "Arduino-Uno", "Arduino Uno"]).unwrap();
        assert_eq!(result.index, 1);
        assert_eq!(result.tier, MatchTier::Exact);
    }

    #[test]
    fn test_compact_fallback() {
        let result = match_strict("ArduinoUno", ["Arduino-Uno"]).unwrap();
        assert_eq!(result.index, 0);
        assert_eq!(result.tier, MatchTier::Normalized);
        assert_eq!(result.score, 0.95);
    }

    #[test]
    fn test_blank_target_never_matches() {
        assert!(match_strict("", ["Arduino Uno", ""]).is_none());
        assert!(match_strict("   ", ["Arduino Uno", " "]).is_none());
        assert!(match_strict("--", ["--"]).is_none());
    }
}
