//! Input validation for planning runs.
//!
//! Invariant-bearing constructors reject bad values on their own, but
//! deserialized inputs bypass them. [`validate_input`] re-checks every
//! entity and the references between them before any planning starts.
//! Detects:
//! - Duplicate IDs (roles, staff)
//! - Invalid time windows and overlapping availability
//! - Staffing bounds, negative rates, inconsistent labor limits
//! - Dangling role and staff references
//! - Inverted time-off ranges and bad peak rules

use std::collections::HashSet;

use thiserror::Error;

use crate::models::{Business, Staff, TimeOff};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A staff member or peak rule references an unknown role.
    InvalidRoleReference,
    /// A time-off entry references an unknown staff member.
    InvalidStaffReference,
    /// Window is empty, inverted, or extends past midnight.
    InvalidTimeWindow,
    /// Two availability windows on the same day overlap.
    OverlappingAvailability,
    /// `min_staff > max_staff`.
    InvalidStaffing,
    /// Negative or non-finite pay rate.
    InvalidRate,
    /// Labor limits out of range.
    InvalidConstraints,
    /// Date range ends before it starts.
    InvalidDateRange,
    /// Peak multiplier below 1 or not finite.
    InvalidPeakRule,
    /// Planner configuration out of range.
    InvalidConfig,
}

impl ValidationError {
    /// Creates an error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a business, its staff, and their time off.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with every detected issue.
pub fn validate_input(business: &Business, staff: &[Staff], time_off: &[TimeOff]) -> ValidationResult {
    let mut errors = Vec::new();

    // Opening hours
    for window in business.hours.days.iter().flatten() {
        if let Err(e) = window.validate() {
            errors.push(ValidationError::new(
                e.kind,
                format!("Business '{}' hours: {}", business.id, e.message),
            ));
        }
    }

    // Roles
    let mut role_ids = HashSet::new();
    for role in &business.roles {
        if !role_ids.insert(role.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate role ID: {}", role.id),
            ));
        }
        if let Err(e) = role.validate() {
            errors.push(e);
        }
    }

    // Peak rules
    for rule in &business.peak_rules {
        if !rule.multiplier.is_finite() || rule.multiplier < 1.0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidPeakRule,
                format!("Peak multiplier must be >= 1.0, got {}", rule.multiplier),
            ));
        }
        if let Err(e) = rule.window.validate() {
            errors.push(e);
        }
        if let Some(role_id) = &rule.role_id {
            if !role_ids.contains(role_id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidRoleReference,
                    format!("Peak rule references unknown role '{role_id}'"),
                ));
            }
        }
    }

    // Staff
    let mut staff_ids = HashSet::new();
    for s in staff {
        if !staff_ids.insert(s.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate staff ID: {}", s.id),
            ));
        }
        if !s.hourly_rate.is_finite() || s.hourly_rate < 0.0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidRate,
                format!("Staff '{}' has invalid hourly rate {}", s.id, s.hourly_rate),
            ));
        }
        for role_id in &s.roles {
            if !role_ids.contains(role_id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidRoleReference,
                    format!("Staff '{}' references unknown role '{}'", s.id, role_id),
                ));
            }
        }
        if let Err(e) = s.availability.validate() {
            errors.push(ValidationError::new(
                e.kind,
                format!("Staff '{}' availability: {}", s.id, e.message),
            ));
        }
        if let Err(e) = s.constraints.validate() {
            errors.push(ValidationError::new(
                e.kind,
                format!("Staff '{}' constraints: {}", s.id, e.message),
            ));
        }
    }

    // Time off
    for t in time_off {
        if !staff_ids.contains(t.staff_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidStaffReference,
                format!("Time off references unknown staff '{}'", t.staff_id),
            ));
        }
        if let Err(e) = t.validate() {
            errors.push(e);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
