//! Time-of-day windows and planning-week helpers.
//!
//! # Time Model
//! Times of day are minutes since midnight (`0..=1440`). A window never
//! crosses midnight. Calendar dates use [`chrono::NaiveDate`].
//!
//! # Interval Semantics
//! Windows are half-open `[start, end)`: two windows that touch
//! (`a.end == b.start`) do not overlap.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::validation::{ValidationError, ValidationErrorKind};

/// Minutes in one calendar day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// A time-of-day interval [start, end) in minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Interval start (minutes, inclusive).
    pub start_min: u32,
    /// Interval end (minutes, exclusive).
    pub end_min: u32,
}

impl TimeWindow {
    /// Creates a window, rejecting empty, inverted, or past-midnight intervals.
    pub fn new(start_min: u32, end_min: u32) -> Result<Self, ValidationError> {
        let window = Self { start_min, end_min };
        window.validate()?;
        Ok(window)
    }

    /// Creates a window from whole hours, e.g. `TimeWindow::hours(9, 17)`.
    pub fn hours(start_hour: u32, end_hour: u32) -> Result<Self, ValidationError> {
        Self::hm((start_hour, 0), (end_hour, 0))
    }

    /// Creates a window from `(hour, minute)` pairs.
    pub fn hm(start: (u32, u32), end: (u32, u32)) -> Result<Self, ValidationError> {
        let to_minutes = |(h, m): (u32, u32)| {
            h.checked_mul(60).and_then(|hm| hm.checked_add(m)).ok_or_else(|| {
                ValidationError::new(
                    ValidationErrorKind::InvalidTimeWindow,
                    format!("time of day {h}:{m:02} is out of range"),
                )
            })
        };
        Self::new(to_minutes(start)?, to_minutes(end)?)
    }

    /// Re-checks the window invariant (for values that bypassed `new`).
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.start_min >= self.end_min || self.end_min > MINUTES_PER_DAY {
            return Err(ValidationError::new(
                ValidationErrorKind::InvalidTimeWindow,
                format!("invalid time window {self}"),
            ));
        }
        Ok(())
    }

    /// Length in minutes.
    #[inline]
    pub fn duration_min(&self) -> u32 {
        self.end_min.saturating_sub(self.start_min)
    }

    /// Length in hours.
    #[inline]
    pub fn duration_hours(&self) -> f64 {
        f64::from(self.duration_min()) / 60.0
    }

    /// Whether `other` lies entirely inside this window.
    #[inline]
    pub fn contains(&self, other: &Self) -> bool {
        self.start_min <= other.start_min && other.end_min <= self.end_min
    }

    /// Whether two windows share at least one minute.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start_min < other.end_min && other.start_min < self.end_min
    }

    /// Common part of two windows.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let start = self.start_min.max(other.start_min);
        let end = self.end_min.min(other.end_min);
        (start < end).then_some(Self {
            start_min: start,
            end_min: end,
        })
    }

    /// Removes `cut` from this window.
    ///
    /// Returns zero, one, or two windows; two when `cut` lies strictly inside.
    pub fn subtract(&self, cut: &Self) -> Vec<Self> {
        if !self.overlaps(cut) {
            return vec![*self];
        }
        let mut rest = Vec::with_capacity(2);
        if self.start_min < cut.start_min {
            rest.push(Self {
                start_min: self.start_min,
                end_min: cut.start_min,
            });
        }
        if cut.end_min < self.end_min {
            rest.push(Self {
                start_min: cut.end_min,
                end_min: self.end_min,
            });
        }
        rest
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            self.start_min / 60,
            self.start_min % 60,
            self.end_min / 60,
            self.end_min % 60
        )
    }
}

/// Index of a weekday in per-day arrays (Monday = 0).
#[inline]
pub fn day_index(day: Weekday) -> usize {
    day.num_days_from_monday() as usize
}

/// First date of the planning week containing `date`.
pub fn week_start_for(date: NaiveDate, first_day: Weekday) -> NaiveDate {
    let offset = (7 + date.weekday().num_days_from_monday() - first_day.num_days_from_monday()) % 7;
    date - Duration::days(i64::from(offset))
}

/// The seven dates of the week starting at `week_start`.
pub fn week_dates(week_start: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    (0..7).map(move |d| week_start + Duration::days(d))
}

/// Minutes between a fixed epoch and `minute` on `date`.
///
/// Used to measure gaps between shifts on different dates.
#[inline]
pub fn absolute_minute(date: NaiveDate, minute: u32) -> i64 {
    i64::from(date.num_days_from_ce()) * i64::from(MINUTES_PER_DAY) + i64::from(minute)
}

/// Converts a (possibly fractional) hour amount to whole minutes.
#[inline]
pub fn hours_to_minutes(hours: f64) -> i64 {
    (hours * 60.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_construction() {
        let w = TimeWindow::hours(9, 17).unwrap();
        assert_eq!(w.start_min, 540);
        assert_eq!(w.end_min, 1020);
        assert_eq!(w.duration_min(), 480);
        assert!((w.duration_hours() - 8.0).abs() < 1e-10);

        assert!(TimeWindow::hours(17, 9).is_err());
        assert!(TimeWindow::hours(9, 9).is_err());
        assert!(TimeWindow::new(0, MINUTES_PER_DAY).is_ok());
        assert!(TimeWindow::new(0, MINUTES_PER_DAY + 1).is_err());
    }

    #[test]
    fn test_window_overlap_and_contains() {
        let a = TimeWindow::hours(9, 12).unwrap();
        let b = TimeWindow::hours(11, 14).unwrap();
        let c = TimeWindow::hours(12, 13).unwrap(); // touching a
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(TimeWindow::hours(8, 18).unwrap().contains(&a));
        assert!(!a.contains(&b));
        assert_eq!(a.intersect(&b), Some(TimeWindow::hours(11, 12).unwrap()));
        assert_eq!(a.intersect(&c), None);
    }

    #[test]
    fn test_window_subtract() {
        let day = TimeWindow::hours(9, 17).unwrap();

        // Strictly inside: split in two
        let parts = day.subtract(&TimeWindow::hours(12, 13).unwrap());
        assert_eq!(
            parts,
            vec![
                TimeWindow::hours(9, 12).unwrap(),
                TimeWindow::hours(13, 17).unwrap()
            ]
        );

        // Covers the head
        let parts = day.subtract(&TimeWindow::hours(6, 10).unwrap());
        assert_eq!(parts, vec![TimeWindow::hours(10, 17).unwrap()]);

        // Covers everything
        assert!(day.subtract(&TimeWindow::hours(0, 24).unwrap()).is_empty());

        // Disjoint
        let parts = day.subtract(&TimeWindow::hours(18, 20).unwrap());
        assert_eq!(parts, vec![day]);
    }

    #[test]
    fn test_oversized_hours_rejected() {
        let err = TimeWindow::hours(9, u32::MAX).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::InvalidTimeWindow);
        assert!(TimeWindow::hm((u32::MAX / 60, 59), (25, 0)).is_err());
        assert!(TimeWindow::hm((9, u32::MAX), (17, 0)).is_err());
        assert!(TimeWindow::hours(9, 25).is_err());
    }

    #[test]
    fn test_display() {
        let w = TimeWindow::hm((9, 30), (17, 5)).unwrap();
        assert_eq!(w.to_string(), "09:30-17:05");
    }

    #[test]
    fn test_week_start_normalization() {
        // 2024-01-03 is a Wednesday
        let wed = date(2024, 1, 3);
        assert_eq!(week_start_for(wed, Weekday::Mon), date(2024, 1, 1));
        assert_eq!(week_start_for(wed, Weekday::Sun), date(2023, 12, 31));
        assert_eq!(week_start_for(date(2024, 1, 1), Weekday::Mon), date(2024, 1, 1));

        let days: Vec<_> = week_dates(date(2024, 1, 1)).collect();
        assert_eq!(days.len(), 7);
        assert_eq!(days[6], date(2024, 1, 7));
    }

    #[test]
    fn test_absolute_minute_gap() {
        let mon = date(2024, 1, 1);
        let tue = date(2024, 1, 2);
        let gap = absolute_minute(tue, 6 * 60) - absolute_minute(mon, 22 * 60);
        assert_eq!(gap, 8 * 60);
        assert_eq!(hours_to_minutes(7.5), 450);
    }
}
