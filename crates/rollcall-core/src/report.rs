//! Projection of match results into display labels and render categories.
//!
//! Pure: touches neither the roster nor the ledger. Actual drawing belongs
//! to the downstream renderer.

use crate::types::MatchResult;

/// Literal shown for any detection that was not accepted.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Render category for one detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Match,
    NoMatch,
}

impl Highlight {
    pub fn of(result: &MatchResult) -> Self {
        if result.accepted {
            Highlight::Match
        } else {
            Highlight::NoMatch
        }
    }

    /// RGB color used by downstream renderers: green for a match, red
    /// otherwise.
    pub fn rgb(self) -> [u8; 3] {
        match self {
            Highlight::Match => [0, 200, 0],
            Highlight::NoMatch => [255, 0, 0],
        }
    }
}

/// Display label: `"{name} ({confidence}%)"` for an accepted match, the
/// [`UNKNOWN_LABEL`] literal otherwise.
pub fn label(result: &MatchResult) -> String {
    match result.identity.as_deref() {
        Some(name) if result.accepted => {
            format!("{name} ({:.1}%)", result.confidence * 100.0)
        }
        _ => UNKNOWN_LABEL.to_string(),
    }
}

/// Distinct accepted identity names for one photo, sorted lexicographically.
pub fn recognized_names(results: &[MatchResult]) -> Vec<String> {
    let mut names: Vec<String> = results
        .iter()
        .filter(|result| result.accepted)
        .filter_map(|result| result.identity.clone())
        .collect();
    names.sort();
    names.dedup();
    names
}
