//! Greedy shift planning, quality scoring and repair.
//!
//! # Algorithm
//!
//! `AssignmentEngine` staffs coverage requirements in priority order with a
//! single greedy pass: candidates are ranked (fewest assigned hours first)
//! and each proposed shift must pass the constraint checker. It is not
//! optimal, but it is fast, explainable and deterministic.
//!
//! `RepairPass` takes an existing schedule, fills coverage gaps with the
//! same engine and moves shifts between the most- and least-loaded staff
//! while fairness strictly improves.
//!
//! # Quality
//!
//! `QualityScorer` reports coverage, fairness, cost, a weighted total, and
//! the shifts that break a hard constraint.
//!
//! # References
//!
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review of
//!   applications, methods and models"
//! - Van den Bergh et al. (2013), "Personnel scheduling: A literature review"

mod greedy;
mod planner;
mod quality;
mod repair;

pub use greedy::{AssignmentEngine, CoverageWarning};
pub use planner::{Plan, PlanError, ShiftPlanner};
pub use quality::{coverage_score, coverage_warnings, fairness_score, QualityReport, QualityScorer, Violation};
pub use repair::{RepairPass, RepairSummary};

#[cfg(test)]
mod properties;
