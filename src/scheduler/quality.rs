//! Schedule quality metrics.
//!
//! Scores a committed schedule against its coverage requirements and
//! re-checks every shift against the hard constraints.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Coverage | 100 × Σ min(assigned, required) / Σ required (100 if nothing required) |
//! | Fairness | max(0, 100 − 10 × σ(hours per staff)), staff with ≥ 1 shift |
//! | Cost | Σ duration × pay rate |
//! | Cost score | max(0, 100 − 50 × cost / budget), or 100 × ref / (ref + cost) without a budget |
//! | Total | weighted sum of the above minus a penalty per violation |
//!
//! σ is the population standard deviation.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::greedy::CoverageWarning;
use crate::checker::{ConstraintChecker, ConstraintRule};
use crate::config::ScoreWeights;
use crate::coverage::CoverageRequirement;
use crate::models::{Business, Schedule, Shift, Staff, TimeWindow};

/// A committed shift that fails a hard constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Staff holding the shift.
    pub staff_id: String,
    /// Role of the shift.
    pub role_id: String,
    /// Date of the shift.
    pub date: NaiveDate,
    /// Shift window.
    pub window: TimeWindow,
    /// First rule the shift fails.
    pub rule: ConstraintRule,
}

/// Quality report for one schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Coverage percentage (0..=100).
    pub coverage_score: f64,
    /// Workload fairness (0..=100).
    pub fairness_score: f64,
    /// Cost score (0..=100, advisory).
    pub cost_score: f64,
    /// Total labor cost.
    pub total_cost: f64,
    /// Weighted total.
    pub total_score: f64,
    /// Understaffed requirements.
    pub warnings: Vec<CoverageWarning>,
    /// Shifts failing a hard constraint.
    pub violations: Vec<Violation>,
    /// Assigned hours per staff member.
    pub hours_by_staff: BTreeMap<String, f64>,
}

impl QualityReport {
    /// Whether every requirement is met and no shift violates a constraint.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.violations.is_empty()
    }
}

/// Computes quality reports.
#[derive(Debug, Clone)]
pub struct QualityScorer<'a> {
    business: &'a Business,
    staff: BTreeMap<&'a str, &'a Staff>,
    checker: &'a ConstraintChecker<'a>,
    weights: ScoreWeights,
    labor_budget: Option<f64>,
    cost_reference: f64,
}

impl<'a> QualityScorer<'a> {
    /// Creates a scorer with default weights and no budget.
    pub fn new(business: &'a Business, staff: &'a [Staff], checker: &'a ConstraintChecker<'a>) -> Self {
        Self {
            business,
            staff: staff.iter().map(|s| (s.id.as_str(), s)).collect(),
            checker,
            weights: ScoreWeights::default(),
            labor_budget: None,
            cost_reference: 1000.0,
        }
    }

    /// Sets the score weights.
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Sets the weekly labor budget.
    pub fn with_budget(mut self, budget: Option<f64>) -> Self {
        self.labor_budget = budget;
        self
    }

    /// Sets the reference cost used when no budget is given.
    pub fn with_cost_reference(mut self, reference: f64) -> Self {
        self.cost_reference = reference;
        self
    }

    /// Scores `schedule` against `requirements`.
    pub fn score(&self, schedule: &Schedule, requirements: &[CoverageRequirement]) -> QualityReport {
        let coverage_score = coverage_score(schedule, requirements);
        let fairness_score = fairness_score(&schedule.minutes_by_staff());
        let total_cost = schedule.total_cost();
        let cost_score = self.cost_score(total_cost);
        let violations = self.violations(schedule);

        let w = &self.weights;
        let total_score = w.coverage * coverage_score
            + w.fairness * w.fairness_weight * fairness_score
            + w.cost * w.cost_weight * cost_score
            - w.violation_penalty * violations.len() as f64;

        QualityReport {
            coverage_score,
            fairness_score,
            cost_score,
            total_cost,
            total_score,
            warnings: coverage_warnings(schedule, requirements),
            violations,
            hours_by_staff: schedule.hours_by_staff(),
        }
    }

    /// Cost score for a total cost.
    pub fn cost_score(&self, total_cost: f64) -> f64 {
        match self.labor_budget {
            Some(budget) => (100.0 - 50.0 * total_cost / budget).max(0.0),
            None => 100.0 * self.cost_reference / (self.cost_reference + total_cost.max(0.0)),
        }
    }

    /// Re-checks every active shift against the rest of the schedule.
    pub fn violations(&self, schedule: &Schedule) -> Vec<Violation> {
        let mut violations = Vec::new();

        for (i, shift) in schedule.shifts.iter().enumerate() {
            if !shift.is_active() {
                continue;
            }
            if let Some(rule) = self.check_shift(schedule, i, shift) {
                violations.push(Violation {
                    staff_id: shift.staff_id.clone(),
                    role_id: shift.role_id.clone(),
                    date: shift.date,
                    window: shift.window,
                    rule,
                });
            }
        }
        violations
    }

    fn check_shift(&self, schedule: &Schedule, index: usize, shift: &Shift) -> Option<ConstraintRule> {
        let staff = match self.staff.get(shift.staff_id.as_str()) {
            Some(s) if s.is_active => *s,
            _ => return Some(ConstraintRule::UnknownStaff),
        };
        if self.business.role(&shift.role_id).is_none() {
            return Some(ConstraintRule::UnknownRole);
        }

        let others: Vec<&Shift> = schedule
            .shifts
            .iter()
            .enumerate()
            .filter(|(j, s)| *j != index && s.staff_id == shift.staff_id)
            .map(|(_, s)| s)
            .collect();
        self.checker.can_assign(staff, shift, &others).err()
    }
}

/// Coverage percentage of `schedule` over `requirements`.
pub fn coverage_score(schedule: &Schedule, requirements: &[CoverageRequirement]) -> f64 {
    let required: u32 = requirements.iter().map(|r| r.required).sum();
    if required == 0 {
        return 100.0;
    }
    let met: u32 = requirements
        .iter()
        .map(|r| schedule.assigned_count(r.date, &r.role_id).min(r.required))
        .sum();
    100.0 * f64::from(met) / f64::from(required)
}

/// Fairness score from assigned minutes per staff member.
///
/// Staff absent from the map (no shifts) do not count.
pub fn fairness_score(minutes_by_staff: &BTreeMap<String, i64>) -> f64 {
    let hours: Vec<f64> = minutes_by_staff
        .values()
        .filter(|&&m| m > 0)
        .map(|&m| m as f64 / 60.0)
        .collect();
    if hours.is_empty() {
        return 100.0;
    }

    let n = hours.len() as f64;
    let mean = hours.iter().sum::<f64>() / n;
    let variance = hours.iter().map(|h| (h - mean).powi(2)).sum::<f64>() / n;
    (100.0 - 10.0 * variance.sqrt()).max(0.0)
}

/// Shortfall per unmet requirement, in processing order.
pub fn coverage_warnings(schedule: &Schedule, requirements: &[CoverageRequirement]) -> Vec<CoverageWarning> {
    requirements
        .iter()
        .filter_map(|r| {
            let assigned = schedule.assigned_count(r.date, &r.role_id);
            (assigned < r.required).then(|| CoverageWarning {
                date: r.date,
                role_id: r.role_id.clone(),
                required: r.required,
                assigned,
                shortfall: r.required - assigned,
            })
        })
        .collect()
}
