//! Coverage requirements for a planning week.
//!
//! One requirement per open day per role with a non-zero minimum. Peak
//! rules scale the minimum (largest applicable multiplier, rounded up),
//! never beyond the role's concurrent maximum.
//!
//! # Processing Order
//! Role priority (descending), required count (descending), date
//! (ascending), role ID (ascending). The order is total, which keeps the
//! assignment engine deterministic.

use std::cmp::Reverse;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::models::time::week_dates;
use crate::models::{Business, Role, TimeWindow};

/// A `(date, role, required)` staffing target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageRequirement {
    /// Calendar date.
    pub date: NaiveDate,
    /// Role to staff.
    pub role_id: String,
    /// Opening hours on that date.
    pub window: TimeWindow,
    /// Distinct staff required.
    pub required: u32,
    /// Role priority (copied for ordering).
    pub priority: i32,
}

/// Derives coverage requirements from business rules.
#[derive(Debug, Clone, Copy)]
pub struct CoveragePlanner<'a> {
    business: &'a Business,
}

impl<'a> CoveragePlanner<'a> {
    /// Creates a planner for `business`.
    pub fn new(business: &'a Business) -> Self {
        Self { business }
    }

    /// Ordered requirements for the week starting at `week_start`.
    pub fn requirements(&self, week_start: NaiveDate) -> Vec<CoverageRequirement> {
        let mut reqs = Vec::new();

        for date in week_dates(week_start) {
            let day = date.weekday();
            let Some(open) = self.business.open_window(day) else {
                continue;
            };
            for role in self.business.roles.iter().filter(|r| r.min_staff > 0) {
                reqs.push(CoverageRequirement {
                    date,
                    role_id: role.id.clone(),
                    window: open,
                    required: self.required_for(role, day, &open),
                    priority: role.priority,
                });
            }
        }

        reqs.sort_by(|a, b| {
            (Reverse(a.priority), Reverse(a.required), a.date, &a.role_id).cmp(&(
                Reverse(b.priority),
                Reverse(b.required),
                b.date,
                &b.role_id,
            ))
        });
        reqs
    }

    /// Staff required for `role` on `day`, after peak scaling.
    pub fn required_for(&self, role: &Role, day: Weekday, open: &TimeWindow) -> u32 {
        let multiplier = self
            .business
            .peak_rules
            .iter()
            .filter(|p| p.applies_to(day, open, &role.id))
            .map(|p| p.multiplier)
            .fold(1.0_f64, f64::max);

        if multiplier <= 1.0 {
            return role.min_staff;
        }
        let scaled = (f64::from(role.min_staff) * multiplier).ceil() as u32;
        scaled.min(role.max_staff).max(role.min_staff)
    }
}
