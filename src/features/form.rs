//! Recent team form
//!
//! Fixed-window summary of a team's most recent matches.

use crate::{MatchRecord, Side};
use serde::{Deserialize, Serialize};

/// Number of recent matches folded into a summary unless configured otherwise
pub const DEFAULT_WINDOW: usize = 5;

/// How team identifiers are compared against match records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TeamMatching {
    /// Byte-for-byte comparison
    Exact,
    /// Unicode lower-case comparison of both sides
    #[default]
    CaseInsensitive,
}

impl TeamMatching {
    pub fn matches(&self, candidate: &str, team: &str) -> bool {
        match self {
            TeamMatching::Exact => candidate == team,
            TeamMatching::CaseInsensitive => candidate.to_lowercase() == team.to_lowercase(),
        }
    }
}

/// Recent-performance summary for one team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSummary {
    /// Matches folded in (at most the window size)
    pub matches_considered: usize,
    /// Matches won outright; draws are not counted
    pub wins: usize,
    /// Goals scored by the team; wider than a single score so sums stay exact
    pub goals_for: u64,
    /// Goals scored by its opponents
    pub goals_against: u64,
    /// Rating from the most recent considered match
    pub rating: f64,
}

/// Summarise `team`'s last `window` matches in `history`.
///
/// Returns `None` when the team has no recorded matches; that is a lookup
/// miss for the caller to report, not a failure. Records are not
/// deduplicated and ties on date keep their input order.
pub fn compute_form(
    history: &[MatchRecord],
    team: &str,
    window: usize,
    matching: TeamMatching,
) -> Option<FormSummary> {
    let mut recent: Vec<(&MatchRecord, Side)> = history
        .iter()
        .filter_map(|record| record.side_of(team, matching).map(|side| (record, side)))
        .collect();

    // sort_by is stable
    recent.sort_by(|(a, _), (b, _)| b.date.cmp(&a.date));
    recent.truncate(window);

    let (latest, latest_side) = *recent.first()?;

    let mut summary = FormSummary {
        matches_considered: recent.len(),
        wins: 0,
        goals_for: 0,
        goals_against: 0,
        rating: latest.rating_for(latest_side),
    };

    for (record, side) in &recent {
        summary.goals_for += u64::from(record.score_for(*side));
        summary.goals_against += u64::from(record.score_against(*side));
        if record.did_win(*side) {
            summary.wins += 1;
        }
    }

    Some(summary)
}

/// Form computation with a configured window and matching mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormAggregator {
    window: usize,
    matching: TeamMatching,
}

impl FormAggregator {
    pub fn new(window: usize, matching: TeamMatching) -> Self {
        FormAggregator { window, matching }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn matching(&self) -> TeamMatching {
        self.matching
    }

    /// Compute form for a team
    pub fn compute(&self, history: &[MatchRecord], team: &str) -> Option<FormSummary> {
        compute_form(history, team, self.window, self.matching)
    }
}

impl Default for FormAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW, TeamMatching::default())
    }
}

impl From<&crate::FormConfig> for FormAggregator {
    fn from(config: &crate::FormConfig) -> Self {
        Self::new(config.window, config.matching)
    }
}
