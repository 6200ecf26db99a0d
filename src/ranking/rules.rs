//! Built-in candidate rules.
//!
//! All rules return lower scores for preferred candidates.

use super::{Candidate, CandidateRule, RankScore};

/// Prefers the candidate with the fewest hours assigned this week.
///
/// Spreads work evenly; the primary fairness lever of the engine.
#[derive(Debug, Clone, Copy)]
pub struct LeastAssignedHours;

impl CandidateRule for LeastAssignedHours {
    fn name(&self) -> &'static str {
        "LEAST_HOURS"
    }

    fn evaluate(&self, candidate: &Candidate<'_>) -> RankScore {
        candidate.assigned_min as f64
    }

    fn description(&self) -> &'static str {
        "Least Assigned Hours"
    }
}

/// Prefers the candidate whose largest free window is longest.
///
/// A long window is most likely to host a full preferred shift.
#[derive(Debug, Clone, Copy)]
pub struct LargestWindow;

impl CandidateRule for LargestWindow {
    fn name(&self) -> &'static str {
        "LARGEST_WINDOW"
    }

    fn evaluate(&self, candidate: &Candidate<'_>) -> RankScore {
        -f64::from(candidate.largest_window_min())
    }

    fn description(&self) -> &'static str {
        "Largest Free Window"
    }
}

/// Prefers the cheaper candidate for the role.
#[derive(Debug, Clone, Copy)]
pub struct LowestPayRate;

impl CandidateRule for LowestPayRate {
    fn name(&self) -> &'static str {
        "LOWEST_RATE"
    }

    fn evaluate(&self, candidate: &Candidate<'_>) -> RankScore {
        candidate.pay_rate
    }

    fn description(&self) -> &'static str {
        "Lowest Pay Rate"
    }
}
