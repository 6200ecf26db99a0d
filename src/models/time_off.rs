//! Time-off requests.
//!
//! Only approved requests block scheduling. A request without a partial
//! window blocks every date in its range entirely.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::TimeWindow;
use crate::validation::{ValidationError, ValidationErrorKind};

/// Approval state of a time-off request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeOffStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

/// A staff member's absence over an inclusive date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeOff {
    /// Absent staff member.
    pub staff_id: String,
    /// First absent date (inclusive).
    pub start_date: NaiveDate,
    /// Last absent date (inclusive).
    pub end_date: NaiveDate,
    /// Blocked part of each date; `None` = whole day.
    pub partial: Option<TimeWindow>,
    /// Approval state.
    pub status: TimeOffStatus,
}

impl TimeOff {
    /// Creates a pending full-day request.
    ///
    /// Rejects `end_date < start_date`.
    pub fn new(
        staff_id: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self, ValidationError> {
        let t = Self {
            staff_id: staff_id.into(),
            start_date,
            end_date,
            partial: None,
            status: TimeOffStatus::Pending,
        };
        t.validate()?;
        Ok(t)
    }

    /// Restricts the request to part of each day.
    pub fn with_partial(mut self, window: TimeWindow) -> Self {
        self.partial = Some(window);
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: TimeOffStatus) -> Self {
        self.status = status;
        self
    }

    /// Shorthand for `with_status(TimeOffStatus::Approved)`.
    pub fn approved(self) -> Self {
        self.with_status(TimeOffStatus::Approved)
    }

    /// Whether this request affects planning.
    #[inline]
    pub fn is_approved(&self) -> bool {
        self.status == TimeOffStatus::Approved
    }

    /// Whether `date` falls inside the range.
    #[inline]
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Checks the date range and partial window.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.end_date < self.start_date {
            return Err(ValidationError::new(
                ValidationErrorKind::InvalidDateRange,
                format!(
                    "Time off for '{}' ends {} before it starts {}",
                    self.staff_id, self.end_date, self.start_date
                ),
            ));
        }
        if let Some(w) = &self.partial {
            w.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_time_off_range() {
        let t = TimeOff::new("alice", date(2), date(4)).unwrap();
        assert!(!t.is_approved());
        assert!(t.covers(date(2)));
        assert!(t.covers(date(4)));
        assert!(!t.covers(date(5)));
        assert!(t.approved().is_approved());
    }

    #[test]
    fn test_time_off_inverted_range() {
        let err = TimeOff::new("alice", date(4), date(2)).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::InvalidDateRange);
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&TimeOffStatus::Approved).unwrap();
        assert_eq!(json, "\"APPROVED\"");
    }
}
