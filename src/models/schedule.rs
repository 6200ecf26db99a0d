//! Schedule (solution) model.
//!
//! A schedule is one business's set of shifts for one planning week.
//! Shifts snapshot their pay rate when created so later rate changes do
//! not alter historical cost.
//!
//! # Lifecycle
//! `Draft → Published → Archived`. Transitions only move forward.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::time::{absolute_minute, week_start_for};
use super::TimeWindow;
use crate::validation::{ValidationError, ValidationErrorKind};

/// A staff member working one role during one window on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    /// Assigned staff member.
    pub staff_id: String,
    /// Role being worked.
    pub role_id: String,
    /// Calendar date.
    pub date: NaiveDate,
    /// Working window on `date`.
    pub window: TimeWindow,
    /// Hourly rate at generation time.
    pub pay_rate: f64,
    /// Shift state.
    pub status: ShiftStatus,
}

/// State of a single shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftStatus {
    #[default]
    Scheduled,
    Confirmed,
    Completed,
    /// Ignored for coverage, hours, cost, and constraint checks.
    Cancelled,
}

/// Who produced a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleSource {
    Manual,
    Optimizer,
}

/// Publication state of a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

/// Rejected lifecycle move.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot move schedule from {from:?} to {to:?}")]
pub struct StatusTransitionError {
    pub from: ScheduleStatus,
    pub to: ScheduleStatus,
}

/// A weekly schedule for one business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Owning business.
    pub business_id: String,
    /// First date of the planning week.
    pub week_start: NaiveDate,
    /// Shifts, in creation order.
    pub shifts: Vec<Shift>,
    /// Producer.
    pub source: ScheduleSource,
    /// Lifecycle state.
    pub status: ScheduleStatus,
}

impl Shift {
    /// Creates a scheduled shift.
    pub fn new(
        staff_id: impl Into<String>,
        role_id: impl Into<String>,
        date: NaiveDate,
        window: TimeWindow,
        pay_rate: f64,
    ) -> Self {
        Self {
            staff_id: staff_id.into(),
            role_id: role_id.into(),
            date,
            window,
            pay_rate,
            status: ShiftStatus::Scheduled,
        }
    }

    /// Sets the status.
    pub fn with_status(mut self, status: ShiftStatus) -> Self {
        self.status = status;
        self
    }

    /// Checks the window and the rate snapshot.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.window.validate()?;
        if !self.pay_rate.is_finite() || self.pay_rate < 0.0 {
            return Err(ValidationError::new(
                ValidationErrorKind::InvalidRate,
                format!("invalid pay rate {}", self.pay_rate),
            ));
        }
        Ok(())
    }

    /// Whether the shift still counts (not cancelled).
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status != ShiftStatus::Cancelled
    }

    /// Duration in minutes.
    #[inline]
    pub fn duration_min(&self) -> u32 {
        self.window.duration_min()
    }

    /// Duration in hours.
    #[inline]
    pub fn duration_hours(&self) -> f64 {
        self.window.duration_hours()
    }

    /// Labor cost: duration × pay rate.
    #[inline]
    pub fn cost(&self) -> f64 {
        self.duration_hours() * self.pay_rate
    }

    /// Start as minutes since a fixed epoch.
    #[inline]
    pub fn start_abs(&self) -> i64 {
        absolute_minute(self.date, self.window.start_min)
    }

    /// End as minutes since a fixed epoch.
    #[inline]
    pub fn end_abs(&self) -> i64 {
        absolute_minute(self.date, self.window.end_min)
    }
}

impl ScheduleStatus {
    /// Whether `self → next` is a legal forward step.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Published) | (Self::Published, Self::Archived)
        )
    }
}

impl Schedule {
    /// Creates an empty draft for the week containing `date`.
    pub fn new(
        business_id: impl Into<String>,
        date: NaiveDate,
        first_day: Weekday,
        source: ScheduleSource,
    ) -> Self {
        Self {
            business_id: business_id.into(),
            week_start: week_start_for(date, first_day),
            shifts: Vec::new(),
            source,
            status: ScheduleStatus::Draft,
        }
    }

    /// Adds a shift.
    pub fn add_shift(&mut self, shift: Shift) {
        self.shifts.push(shift);
    }

    /// Adds a shift (builder form).
    pub fn with_shift(mut self, shift: Shift) -> Self {
        self.shifts.push(shift);
        self
    }

    /// Number of shifts, including cancelled ones.
    pub fn shift_count(&self) -> usize {
        self.shifts.len()
    }

    /// Non-cancelled shifts.
    pub fn active_shifts(&self) -> impl Iterator<Item = &Shift> {
        self.shifts.iter().filter(|s| s.is_active())
    }

    /// Active shifts of one staff member.
    pub fn shifts_for_staff(&self, staff_id: &str) -> Vec<&Shift> {
        self.active_shifts()
            .filter(|s| s.staff_id == staff_id)
            .collect()
    }

    /// Distinct staff holding an active shift for `(date, role)`.
    pub fn staff_on(&self, date: NaiveDate, role_id: &str) -> BTreeSet<&str> {
        self.active_shifts()
            .filter(|s| s.date == date && s.role_id == role_id)
            .map(|s| s.staff_id.as_str())
            .collect()
    }

    /// Number of distinct staff covering `(date, role)`.
    pub fn assigned_count(&self, date: NaiveDate, role_id: &str) -> u32 {
        self.staff_on(date, role_id).len() as u32
    }

    /// Assigned minutes per staff member (staff with active shifts only).
    pub fn minutes_by_staff(&self) -> BTreeMap<String, i64> {
        let mut totals: BTreeMap<String, i64> = BTreeMap::new();
        for s in self.active_shifts() {
            *totals.entry(s.staff_id.clone()).or_insert(0) += i64::from(s.duration_min());
        }
        totals
    }

    /// Assigned hours per staff member.
    pub fn hours_by_staff(&self) -> BTreeMap<String, f64> {
        self.minutes_by_staff()
            .into_iter()
            .map(|(id, min)| (id, min as f64 / 60.0))
            .collect()
    }

    /// Sum of shift costs.
    pub fn total_cost(&self) -> f64 {
        self.active_shifts().map(Shift::cost).sum()
    }

    /// Moves the schedule to `next` if the lifecycle allows it.
    pub fn transition_to(&mut self, next: ScheduleStatus) -> Result<(), StatusTransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(StatusTransitionError {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// `Draft → Published`.
    pub fn publish(&mut self) -> Result<(), StatusTransitionError> {
        self.transition_to(ScheduleStatus::Published)
    }

    /// `Published → Archived`.
    pub fn archive(&mut self) -> Result<(), StatusTransitionError> {
        self.transition_to(ScheduleStatus::Archived)
    }
}
