//! Sequential rule chain with a deterministic final tie-break.

use std::cmp::Ordering;
use std::sync::Arc;

use super::rules::{LargestWindow, LeastAssignedHours, LowestPayRate};
use super::{Candidate, CandidateRule, RankScore};

/// Orders candidates by a chain of rules.
///
/// Rules are applied in sequence; a later rule only decides between
/// candidates whose earlier scores differ by at most `epsilon`. Candidates
/// still tied after every rule are ordered by staff ID, so the ranking is
/// total and reproducible.
#[derive(Clone)]
pub struct RankingEngine {
    rules: Vec<Arc<dyn CandidateRule>>,
    epsilon: f64,
}

impl RankingEngine {
    /// Creates an engine with no rules (ranks by staff ID only).
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            epsilon: 1e-9,
        }
    }

    /// The staffing chain: fewest hours, then largest free window.
    pub fn staffing() -> Self {
        Self::new()
            .with_rule(LeastAssignedHours)
            .with_rule(LargestWindow)
    }

    /// The staffing chain with the cheaper candidate preferred on ties.
    pub fn cost_aware() -> Self {
        Self::staffing().with_rule(LowestPayRate)
    }

    /// Appends a rule.
    pub fn with_rule<R: CandidateRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Names of the rules in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Sorts candidates, preferred first.
    pub fn rank(&self, candidates: &mut [Candidate<'_>]) {
        candidates.sort_by(|a, b| self.compare(a, b));
    }

    /// Scores from each rule for one candidate.
    pub fn evaluate(&self, candidate: &Candidate<'_>) -> Vec<RankScore> {
        self.rules.iter().map(|r| r.evaluate(candidate)).collect()
    }

    fn compare(&self, a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
        for rule in &self.rules {
            let score_a = rule.evaluate(a);
            let score_b = rule.evaluate(b);

            if (score_a - score_b).abs() > self.epsilon {
                return score_a.partial_cmp(&score_b).unwrap_or(Ordering::Equal);
            }
        }
        a.staff.id.cmp(&b.staff.id)
    }
}

impl Default for RankingEngine {
    fn default() -> Self {
        Self::staffing()
    }
}

impl std::fmt::Debug for RankingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankingEngine")
            .field("rules", &self.rule_names())
            .finish()
    }
}
