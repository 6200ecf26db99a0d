//! Staff model.
//!
//! A staff member is a human resource with eligible roles, a recurring
//! weekly availability pattern, and personal labor limits.

use std::collections::BTreeSet;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::time::day_index;
use super::{Role, TimeWindow};
use crate::validation::{ValidationError, ValidationErrorKind};

/// A schedulable staff member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staff {
    /// Unique staff identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Personal hourly rate (used when the role has none).
    pub hourly_rate: f64,
    /// Role IDs this person may work.
    pub roles: BTreeSet<String>,
    /// Recurring weekly availability.
    pub availability: Availability,
    /// Labor limits.
    pub constraints: LaborConstraints,
    /// Inactive staff are never scheduled.
    pub is_active: bool,
}

/// Weekly availability: disjoint, start-ordered windows per weekday.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    /// Indexed Monday = 0 .. Sunday = 6.
    pub days: [Vec<TimeWindow>; 7],
}

/// Per-staff labor limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaborConstraints {
    /// Maximum scheduled hours on one date.
    pub max_hours_per_day: f64,
    /// Maximum scheduled hours in one planning week.
    pub max_hours_per_week: f64,
    /// Minimum rest between the end of one shift and the start of the next.
    pub min_hours_between_shifts: f64,
    /// Maximum run of consecutive dates with at least one shift.
    pub max_consecutive_working_days: u32,
}

/// Run-wide replacements for individual labor limits.
///
/// Fields left `None` keep each staff member's own value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintOverrides {
    pub max_hours_per_day: Option<f64>,
    pub max_hours_per_week: Option<f64>,
    pub min_hours_between_shifts: Option<f64>,
    pub max_consecutive_working_days: Option<u32>,
}

impl Staff {
    /// Creates an active staff member with default constraints and no availability.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            hourly_rate: 0.0,
            roles: BTreeSet::new(),
            availability: Availability::default(),
            constraints: LaborConstraints::default(),
            is_active: true,
        }
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the personal hourly rate.
    pub fn with_rate(mut self, hourly_rate: f64) -> Self {
        self.hourly_rate = hourly_rate;
        self
    }

    /// Adds an eligible role.
    pub fn with_role(mut self, role_id: impl Into<String>) -> Self {
        self.roles.insert(role_id.into());
        self
    }

    /// Sets the weekly availability.
    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = availability;
        self
    }

    /// Sets the labor constraints.
    pub fn with_constraints(mut self, constraints: LaborConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Marks the staff member inactive.
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Whether this person may work `role_id`.
    #[inline]
    pub fn is_eligible(&self, role_id: &str) -> bool {
        self.roles.contains(role_id)
    }

    /// Hourly rate paid when working `role`.
    pub fn pay_rate_for(&self, role: &Role) -> f64 {
        role.hourly_rate.unwrap_or(self.hourly_rate)
    }
}

impl Availability {
    /// Creates an empty availability (never available).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a window on `day`, keeping windows sorted.
    ///
    /// Rejects a window overlapping one already present on that day.
    pub fn with_window(mut self, day: Weekday, window: TimeWindow) -> Result<Self, ValidationError> {
        window.validate()?;
        let slots = &mut self.days[day_index(day)];
        if let Some(existing) = slots.iter().find(|w| w.overlaps(&window)) {
            return Err(ValidationError::new(
                ValidationErrorKind::OverlappingAvailability,
                format!("{day}: window {window} overlaps {existing}"),
            ));
        }
        let pos = slots.partition_point(|w| w.start_min < window.start_min);
        slots.insert(pos, window);
        Ok(self)
    }

    /// Adds the same window on several days.
    pub fn with_window_on(self, days: &[Weekday], window: TimeWindow) -> Result<Self, ValidationError> {
        days.iter()
            .try_fold(self, |availability, &day| availability.with_window(day, window))
    }

    /// Windows on `day`.
    #[inline]
    pub fn windows(&self, day: Weekday) -> &[TimeWindow] {
        &self.days[day_index(day)]
    }

    /// Checks every day for invalid or overlapping windows.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for slots in &self.days {
            for w in slots {
                w.validate()?;
            }
            let mut sorted: Vec<&TimeWindow> = slots.iter().collect();
            sorted.sort_by_key(|w| w.start_min);
            if let Some(pair) = sorted.windows(2).find(|p| p[0].overlaps(p[1])) {
                return Err(ValidationError::new(
                    ValidationErrorKind::OverlappingAvailability,
                    format!("window {} overlaps {}", pair[0], pair[1]),
                ));
            }
        }
        Ok(())
    }
}

impl LaborConstraints {
    /// Creates validated constraints.
    pub fn new(
        max_hours_per_day: f64,
        max_hours_per_week: f64,
        min_hours_between_shifts: f64,
        max_consecutive_working_days: u32,
    ) -> Result<Self, ValidationError> {
        let c = Self {
            max_hours_per_day,
            max_hours_per_week,
            min_hours_between_shifts,
            max_consecutive_working_days,
        };
        c.validate()?;
        Ok(c)
    }

    /// Checks the limits are positive and mutually consistent.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let invalid = |msg: String| {
            Err(ValidationError::new(
                ValidationErrorKind::InvalidConstraints,
                msg,
            ))
        };
        if !(self.max_hours_per_day.is_finite() && self.max_hours_per_day > 0.0) {
            return invalid(format!("max_hours_per_day must be > 0, got {}", self.max_hours_per_day));
        }
        if !(self.max_hours_per_week.is_finite() && self.max_hours_per_week > 0.0) {
            return invalid(format!("max_hours_per_week must be > 0, got {}", self.max_hours_per_week));
        }
        if self.max_hours_per_week < self.max_hours_per_day {
            return invalid(format!(
                "max_hours_per_week ({}) is below max_hours_per_day ({})",
                self.max_hours_per_week, self.max_hours_per_day
            ));
        }
        if !(self.min_hours_between_shifts.is_finite() && self.min_hours_between_shifts >= 0.0) {
            return invalid(format!(
                "min_hours_between_shifts must be >= 0, got {}",
                self.min_hours_between_shifts
            ));
        }
        if self.max_consecutive_working_days < 1 {
            return invalid("max_consecutive_working_days must be >= 1".to_string());
        }
        Ok(())
    }
}

impl Default for LaborConstraints {
    fn default() -> Self {
        Self {
            max_hours_per_day: 8.0,
            max_hours_per_week: 40.0,
            min_hours_between_shifts: 10.0,
            max_consecutive_working_days: 6,
        }
    }
}

impl ConstraintOverrides {
    /// Whether no field is overridden.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Field-wise merge; values set in `other` win.
    pub fn merged(&self, other: &Self) -> Self {
        Self {
            max_hours_per_day: other.max_hours_per_day.or(self.max_hours_per_day),
            max_hours_per_week: other.max_hours_per_week.or(self.max_hours_per_week),
            min_hours_between_shifts: other
                .min_hours_between_shifts
                .or(self.min_hours_between_shifts),
            max_consecutive_working_days: other
                .max_consecutive_working_days
                .or(self.max_consecutive_working_days),
        }
    }

    /// Checks every set field is in range on its own.
    ///
    /// Consistency with a staff member's remaining limits is checked on the
    /// result of [`apply`](Self::apply).
    pub fn validate(&self) -> Result<(), ValidationError> {
        let invalid = |msg: String| {
            Err(ValidationError::new(
                ValidationErrorKind::InvalidConstraints,
                msg,
            ))
        };
        let hours = [
            self.max_hours_per_day,
            self.max_hours_per_week,
            self.min_hours_between_shifts,
        ];
        if hours.iter().flatten().any(|h| !h.is_finite() || *h < 0.0) {
            return invalid(format!("constraint overrides must be finite and >= 0, got {self:?}"));
        }
        if self.max_hours_per_day == Some(0.0) || self.max_hours_per_week == Some(0.0) {
            return invalid("hour caps cannot be overridden to 0".to_string());
        }
        if self.max_consecutive_working_days == Some(0) {
            return invalid("max_consecutive_working_days cannot be overridden to 0".to_string());
        }
        Ok(())
    }

    /// Applies the overrides to one staff member's constraints.
    pub fn apply(&self, base: &LaborConstraints) -> LaborConstraints {
        LaborConstraints {
            max_hours_per_day: self.max_hours_per_day.unwrap_or(base.max_hours_per_day),
            max_hours_per_week: self.max_hours_per_week.unwrap_or(base.max_hours_per_week),
            min_hours_between_shifts: self
                .min_hours_between_shifts
                .unwrap_or(base.min_hours_between_shifts),
            max_consecutive_working_days: self
                .max_consecutive_working_days
                .unwrap_or(base.max_consecutive_working_days),
        }
    }
}
