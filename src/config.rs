//! Planner configuration.
//!
//! All fields have defaults, so a partial JSON/TOML document deserializes
//! into a usable configuration:
//!
//! ```
//! use u_roster::config::PlannerConfig;
//!
//! let config: PlannerConfig = serde_json::from_str(r#"{ "labor_budget": 2500.0 }"#).unwrap();
//! assert_eq!(config.labor_budget, Some(2500.0));
//! assert_eq!(config.preferred_shift_hours, vec![8.0, 6.0, 4.0]);
//! ```

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::models::time::hours_to_minutes;
use crate::models::ConstraintOverrides;
use crate::validation::{ValidationError, ValidationErrorKind};

/// Tunables for a planning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// First day of the planning week.
    pub week_starts_on: Weekday,
    /// Shift lengths (hours) the engine tries, longest first.
    pub preferred_shift_hours: Vec<f64>,
    /// Shortest shift worth scheduling (hours).
    pub min_shift_hours: f64,
    /// Upper bound on rebalance moves per repair call.
    pub max_repair_iterations: usize,
    /// Weekly labor budget; enables the budget-relative cost score.
    pub labor_budget: Option<f64>,
    /// Cost at which the budget-less cost score reaches 50.
    pub cost_reference: f64,
    /// Weights of the total score.
    pub weights: ScoreWeights,
    /// Labor limits applied to every staff member.
    pub constraint_overrides: ConstraintOverrides,
    /// Break remaining candidate ties by the lower pay rate.
    pub cost_aware_ranking: bool,
}

/// Weights combining the partial scores into the total score.
///
/// `total = coverage·c + fairness·f·fairness_weight + cost_score·k·cost_weight
/// − violation_penalty·violations`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub coverage: f64,
    pub fairness: f64,
    pub cost: f64,
    /// Business preference multiplier on the fairness term.
    pub fairness_weight: f64,
    /// Business preference multiplier on the cost term.
    pub cost_weight: f64,
    /// Subtracted once per violation.
    pub violation_penalty: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            week_starts_on: Weekday::Mon,
            preferred_shift_hours: vec![8.0, 6.0, 4.0],
            min_shift_hours: 2.0,
            max_repair_iterations: 50,
            labor_budget: None,
            cost_reference: 1000.0,
            weights: ScoreWeights::default(),
            constraint_overrides: ConstraintOverrides::default(),
            cost_aware_ranking: false,
        }
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            coverage: 0.4,
            fairness: 0.3,
            cost: 0.2,
            fairness_weight: 1.0,
            cost_weight: 1.0,
            violation_penalty: 0.1,
        }
    }
}

impl PlannerConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the first day of the planning week.
    pub fn with_week_start(mut self, day: Weekday) -> Self {
        self.week_starts_on = day;
        self
    }

    /// Sets the preferred shift lengths (hours).
    pub fn with_shift_hours(mut self, hours: Vec<f64>) -> Self {
        self.preferred_shift_hours = hours;
        self
    }

    /// Sets the minimum shift length (hours).
    pub fn with_min_shift_hours(mut self, hours: f64) -> Self {
        self.min_shift_hours = hours;
        self
    }

    /// Sets the repair iteration cap.
    pub fn with_max_repair_iterations(mut self, n: usize) -> Self {
        self.max_repair_iterations = n;
        self
    }

    /// Sets the weekly labor budget.
    pub fn with_labor_budget(mut self, budget: f64) -> Self {
        self.labor_budget = Some(budget);
        self
    }

    /// Sets the score weights.
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Sets run-wide labor overrides.
    pub fn with_overrides(mut self, overrides: ConstraintOverrides) -> Self {
        self.constraint_overrides = overrides;
        self
    }

    /// Prefers cheaper candidates once hours and windows tie.
    pub fn with_cost_aware_ranking(mut self, enabled: bool) -> Self {
        self.cost_aware_ranking = enabled;
        self
    }

    /// Preferred lengths in minutes, longest first, deduplicated.
    pub fn preferred_shift_minutes(&self) -> Vec<u32> {
        let mut minutes: Vec<u32> = self
            .preferred_shift_hours
            .iter()
            .map(|&h| hours_to_minutes(h).max(0) as u32)
            .filter(|&m| m > 0)
            .collect();
        minutes.sort_unstable_by(|a, b| b.cmp(a));
        minutes.dedup();
        minutes
    }

    /// Minimum shift length in minutes (at least one minute).
    pub fn min_shift_minutes(&self) -> u32 {
        hours_to_minutes(self.min_shift_hours).max(1) as u32
    }

    /// Checks all values are in range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let invalid = |msg: String| Err(ValidationError::new(ValidationErrorKind::InvalidConfig, msg));

        if self
            .preferred_shift_hours
            .iter()
            .any(|h| !h.is_finite() || *h <= 0.0 || *h > 24.0)
        {
            return invalid(format!(
                "preferred_shift_hours must lie in (0, 24], got {:?}",
                self.preferred_shift_hours
            ));
        }
        if !self.min_shift_hours.is_finite() || self.min_shift_hours < 0.0 || self.min_shift_hours > 24.0 {
            return invalid(format!("min_shift_hours must lie in [0, 24], got {}", self.min_shift_hours));
        }
        if let Some(budget) = self.labor_budget {
            if !budget.is_finite() || budget <= 0.0 {
                return invalid(format!("labor_budget must be > 0, got {budget}"));
            }
        }
        if !self.cost_reference.is_finite() || self.cost_reference <= 0.0 {
            return invalid(format!("cost_reference must be > 0, got {}", self.cost_reference));
        }
        let w = &self.weights;
        let all = [
            w.coverage,
            w.fairness,
            w.cost,
            w.fairness_weight,
            w.cost_weight,
            w.violation_penalty,
        ];
        if all.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return invalid(format!("score weights must be finite and >= 0, got {w:?}"));
        }
        self.constraint_overrides
            .validate()
            .map_err(|e| ValidationError::new(ValidationErrorKind::InvalidConfig, e.message))?;
        Ok(())
    }
}
