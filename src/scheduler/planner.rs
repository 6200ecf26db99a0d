//! Planning entry points.
//!
//! `ShiftPlanner` wires one run together: validation, availability index,
//! constraint checker, coverage requirements, greedy assignment, optional
//! repair and scoring.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::greedy::AssignmentEngine;
use super::quality::{QualityReport, QualityScorer};
use super::repair::RepairPass;
use crate::availability::AvailabilityIndex;
use crate::checker::ConstraintChecker;
use crate::config::PlannerConfig;
use crate::coverage::CoveragePlanner;
use crate::models::time::week_start_for;
use crate::models::{Business, ConstraintOverrides, Schedule, ScheduleSource, Staff, TimeOff};
use crate::ranking::RankingEngine;
use crate::validation::{validate_input, ValidationError};

/// Errors that stop a run before planning starts.
#[derive(Debug, Error)]
pub enum PlanError {
    /// Domain data failed validation.
    #[error("invalid input: {} problem(s)", .0.len())]
    InvalidInput(Vec<ValidationError>),
    /// Planner configuration is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(ValidationError),
    /// Schedule to repair belongs to another business.
    #[error("schedule belongs to business '{found}', expected '{expected}'")]
    BusinessMismatch { expected: String, found: String },
}

/// A schedule and its quality report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// The planned week.
    pub schedule: Schedule,
    /// Quality of `schedule`.
    pub report: QualityReport,
}

/// Greedy shift planner.
///
/// # Usage
/// ```
/// use chrono::{NaiveDate, Weekday};
/// use u_roster::models::{Availability, Business, Role, Staff, TimeWindow};
/// use u_roster::scheduler::ShiftPlanner;
///
/// let days = [Weekday::Mon, Weekday::Tue];
/// let business = Business::new("cafe")
///     .with_hours_on(&days, TimeWindow::hours(9, 17).unwrap())
///     .with_role(Role::new("barista", "Barista").with_staffing(1, 1).unwrap());
/// let staff = vec![Staff::new("alice").with_role("barista").with_availability(
///     Availability::new().with_window_on(&days, TimeWindow::hours(9, 17).unwrap()).unwrap(),
/// )];
///
/// let week = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let plan = ShiftPlanner::new().generate(&business, &staff, &[], week, None).unwrap();
/// assert_eq!(plan.schedule.shift_count(), 2);
/// assert_eq!(plan.report.coverage_score, 100.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ShiftPlanner {
    config: PlannerConfig,
}

impl ShiftPlanner {
    /// Creates a planner with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a planner with `config`.
    pub fn with_config(config: PlannerConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Builds a schedule for the week containing `week_start`.
    ///
    /// `overrides` replace individual labor limits for every staff member
    /// on top of the configured overrides. Overrides that are out of range,
    /// or that leave someone with a day cap above their week cap, are
    /// invalid input.
    pub fn generate(
        &self,
        business: &Business,
        staff: &[Staff],
        time_off: &[TimeOff],
        week_start: NaiveDate,
        overrides: Option<&ConstraintOverrides>,
    ) -> Result<Plan, PlanError> {
        self.check(business, staff, time_off)?;
        let overrides = match overrides {
            Some(o) => self.config.constraint_overrides.merged(o),
            None => self.config.constraint_overrides,
        };
        check_limits(staff, &overrides)?;

        let week_start = week_start_for(week_start, self.config.week_starts_on);
        info!(
            business = %business.id,
            week = %week_start,
            staff = staff.len(),
            "generating schedule"
        );

        let mut schedule = Schedule::new(
            &business.id,
            week_start,
            self.config.week_starts_on,
            ScheduleSource::Optimizer,
        );
        let report = self.run(business, staff, time_off, overrides, &mut schedule, false);
        self.log_report(&report);

        Ok(Plan { schedule, report })
    }

    /// Gap-fills and rebalances a copy of `existing`.
    ///
    /// Existing shifts are never removed. Shifts that already break a rule
    /// stay in place and show up as violations; a shift with a malformed
    /// window or pay rate rejects the whole run as invalid input.
    pub fn repair(
        &self,
        business: &Business,
        staff: &[Staff],
        time_off: &[TimeOff],
        existing: &Schedule,
    ) -> Result<Plan, PlanError> {
        self.check(business, staff, time_off)?;
        if existing.business_id != business.id {
            return Err(PlanError::BusinessMismatch {
                expected: business.id.clone(),
                found: existing.business_id.clone(),
            });
        }
        let overrides = self.config.constraint_overrides;
        check_limits(staff, &overrides)?;
        check_shifts(existing)?;

        let mut schedule = existing.clone();
        schedule.week_start = week_start_for(existing.week_start, self.config.week_starts_on);
        info!(
            business = %business.id,
            week = %schedule.week_start,
            shifts = schedule.shift_count(),
            "repairing schedule"
        );

        let report = self.run(business, staff, time_off, overrides, &mut schedule, true);
        self.log_report(&report);

        Ok(Plan { schedule, report })
    }

    fn check(&self, business: &Business, staff: &[Staff], time_off: &[TimeOff]) -> Result<(), PlanError> {
        self.config.validate().map_err(PlanError::InvalidConfig)?;
        validate_input(business, staff, time_off).map_err(PlanError::InvalidInput)
    }

    fn run(
        &self,
        business: &Business,
        staff: &[Staff],
        time_off: &[TimeOff],
        overrides: ConstraintOverrides,
        schedule: &mut Schedule,
        repair: bool,
    ) -> QualityReport {
        let config = &self.config;
        let index = AvailabilityIndex::new(staff, time_off, schedule.week_start);
        let checker =
            ConstraintChecker::new(business, &index, config.week_starts_on).with_overrides(overrides);
        let ranking = if config.cost_aware_ranking {
            RankingEngine::cost_aware()
        } else {
            RankingEngine::staffing()
        };
        let engine = AssignmentEngine::new(business, staff, &index, &checker)
            .with_ranking(ranking)
            .with_shift_lengths(config.preferred_shift_minutes())
            .with_min_shift(config.min_shift_minutes());
        let requirements = CoveragePlanner::new(business).requirements(schedule.week_start);
        debug!(requirements = requirements.len(), "coverage planned");

        if repair {
            let summary = RepairPass::new(business, staff, &engine, &checker)
                .with_max_iterations(config.max_repair_iterations)
                .run(schedule, &requirements);
            info!(filled = summary.filled, moved = summary.moved, "repair finished");
        } else {
            let warnings = engine.assign(&requirements, schedule);
            debug!(shifts = schedule.shift_count(), unmet = warnings.len(), "assignment finished");
        }

        QualityScorer::new(business, staff, &checker)
            .with_weights(config.weights)
            .with_budget(config.labor_budget)
            .with_cost_reference(config.cost_reference)
            .score(schedule, &requirements)
    }

    fn log_report(&self, report: &QualityReport) {
        info!(
            coverage = report.coverage_score,
            fairness = report.fairness_score,
            cost = report.total_cost,
            total = report.total_score,
            warnings = report.warnings.len(),
            violations = report.violations.len(),
            "schedule scored"
        );
    }
}

/// Rejects overrides that are out of range on their own or that leave a
/// staff member with inconsistent limits.
fn check_limits(staff: &[Staff], overrides: &ConstraintOverrides) -> Result<(), PlanError> {
    overrides
        .validate()
        .map_err(|e| PlanError::InvalidInput(vec![e]))?;
    if overrides.is_empty() {
        return Ok(());
    }
    let errors: Vec<ValidationError> = staff
        .iter()
        .filter_map(|s| {
            overrides.apply(&s.constraints).validate().err().map(|e| {
                ValidationError::new(e.kind, format!("Staff '{}' with overrides: {}", s.id, e.message))
            })
        })
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(PlanError::InvalidInput(errors))
    }
}

/// Rejects shifts with a malformed window or rate snapshot.
fn check_shifts(schedule: &Schedule) -> Result<(), PlanError> {
    let errors: Vec<ValidationError> = schedule
        .shifts
        .iter()
        .filter_map(|s| {
            s.validate().err().map(|e| {
                ValidationError::new(
                    e.kind,
                    format!("Shift of '{}' on {}: {}", s.staff_id, s.date, e.message),
                )
            })
        })
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(PlanError::InvalidInput(errors))
    }
}
