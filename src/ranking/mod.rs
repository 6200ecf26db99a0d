//! Candidate ranking for the assignment engine.
//!
//! Candidates for one coverage requirement are ordered by a chain of
//! rules. Each rule scores a candidate; the next rule is consulted only
//! when two candidates tie, and staff ID breaks any remaining tie.
//!
//! # Usage
//!
//! ```
//! use u_roster::ranking::{rules, RankingEngine};
//!
//! let engine = RankingEngine::new()
//!     .with_rule(rules::LeastAssignedHours)
//!     .with_rule(rules::LargestWindow);
//! assert_eq!(engine.rule_names(), vec!["LEAST_HOURS", "LARGEST_WINDOW"]);
//! ```

mod engine;
pub mod rules;

pub use engine::RankingEngine;

use std::fmt::Debug;

use crate::models::{Staff, TimeWindow};

/// Score returned by a ranking rule.
///
/// Lower scores = preferred (tried first).
pub type RankScore = f64;

/// A staff member who could fill a coverage requirement.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    /// The staff member.
    pub staff: &'a Staff,
    /// Minutes already assigned this week.
    pub assigned_min: i64,
    /// Free windows on the requirement's date, longest first.
    pub windows: Vec<TimeWindow>,
    /// Rate this candidate would be paid for the role.
    pub pay_rate: f64,
}

impl Candidate<'_> {
    /// Length of the largest free window (minutes).
    pub fn largest_window_min(&self) -> u32 {
        self.windows
            .iter()
            .map(TimeWindow::duration_min)
            .max()
            .unwrap_or(0)
    }
}

/// A rule that scores candidates.
///
/// # Score Convention
/// **Lower score = preferred.**
pub trait CandidateRule: Send + Sync + Debug {
    /// Rule name (e.g., "LEAST_HOURS").
    fn name(&self) -> &'static str;

    /// Scores a candidate.
    fn evaluate(&self, candidate: &Candidate<'_>) -> RankScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
