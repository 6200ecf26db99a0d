//! Workforce shift scheduling for the U-Engine ecosystem.
//!
//! Builds a weekly schedule for one business: which staff member works
//! which role during which window on which date. Hard labor rules are
//! never broken; coverage shortfalls degrade to warnings.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Business`, `Role`, `Staff`, `Availability`,
//!   `LaborConstraints`, `TimeOff`, `Shift`, `Schedule`
//! - **`validation`**: Input integrity checks (duplicate IDs, role refs, windows)
//! - **`availability`**: Effective availability after approved time off
//! - **`checker`**: Hard-constraint checks for a proposed shift
//! - **`coverage`**: Per-day, per-role staffing requirements
//! - **`ranking`**: Candidate ordering rules
//! - **`scheduler`**: Greedy assignment, quality scoring, repair
//! - **`config`**: Planner tunables
//!
//! # Pipeline
//!
//! Domain model → availability index → coverage requirements → greedy
//! assignment → quality report → (optional) repair.
//!
//! # Example
//!
//! ```
//! use chrono::{NaiveDate, Weekday};
//! use u_roster::models::{Availability, Business, LaborConstraints, Role, Staff, TimeWindow};
//!
//! let weekdays = [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri];
//! let business = Business::new("cafe")
//!     .with_hours_on(&weekdays, TimeWindow::hours(9, 17).unwrap())
//!     .with_role(Role::new("barista", "Barista").with_rate(16.0).with_staffing(1, 2).unwrap());
//! let alice = Staff::new("alice")
//!     .with_role("barista")
//!     .with_constraints(LaborConstraints::new(8.0, 40.0, 10.0, 6).unwrap())
//!     .with_availability(
//!         Availability::new()
//!             .with_window_on(&weekdays, TimeWindow::hours(9, 15).unwrap())
//!             .unwrap(),
//!     );
//!
//! let week = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let plan = u_roster::generate_schedule(&business, &[alice], &[], week, None).unwrap();
//! assert_eq!(plan.schedule.shift_count(), 5);
//! assert_eq!(plan.report.total_cost, 480.0);
//! ```
//!
//! # References
//!
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review"
//! - Burke et al. (2004), "The state of the art of nurse rostering"

pub mod availability;
pub mod checker;
pub mod config;
pub mod coverage;
pub mod models;
pub mod ranking;
pub mod scheduler;
pub mod validation;

use chrono::NaiveDate;

use models::{Business, ConstraintOverrides, Schedule, Staff, TimeOff};
use scheduler::{Plan, PlanError, ShiftPlanner};

/// Generates a schedule with the default configuration.
///
/// See [`ShiftPlanner::generate`].
pub fn generate_schedule(
    business: &Business,
    staff: &[Staff],
    time_off: &[TimeOff],
    week_start: NaiveDate,
    overrides: Option<&ConstraintOverrides>,
) -> Result<Plan, PlanError> {
    ShiftPlanner::new().generate(business, staff, time_off, week_start, overrides)
}

/// Repairs a schedule with the default configuration.
///
/// See [`ShiftPlanner::repair`].
pub fn repair_schedule(
    business: &Business,
    staff: &[Staff],
    time_off: &[TimeOff],
    existing: &Schedule,
) -> Result<Plan, PlanError> {
    ShiftPlanner::new().repair(business, staff, time_off, existing)
}
