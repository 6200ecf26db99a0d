//! Effective availability per staff member and date.
//!
//! Effective windows are the staff member's weekly windows for the
//! date's weekday, minus approved time off. A full-day absence removes the
//! day; a partial absence is subtracted and may split a window in two.
//!
//! # Precedence
//! Time off overrides availability, mirroring blocked periods overriding
//! working windows in a resource calendar.

use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::models::time::week_dates;
use crate::models::{Staff, TimeOff, TimeWindow};

/// Computes the effective windows of `staff` on `date`.
///
/// `time_off` may contain entries for other staff and unapproved entries;
/// both are ignored.
pub fn effective_windows(staff: &Staff, time_off: &[&TimeOff], date: NaiveDate) -> Vec<TimeWindow> {
    let mut windows: Vec<TimeWindow> = staff.availability.windows(date.weekday()).to_vec();

    for t in time_off
        .iter()
        .filter(|t| t.is_approved() && t.staff_id == staff.id && t.covers(date))
    {
        match &t.partial {
            None => return Vec::new(),
            Some(cut) => {
                windows = windows.iter().flat_map(|w| w.subtract(cut)).collect();
            }
        }
    }

    windows
}

/// Effective availability lookup for one planning run.
///
/// Windows for the planning week are computed once at construction;
/// other dates are computed on demand.
#[derive(Debug, Clone)]
pub struct AvailabilityIndex<'a> {
    staff: BTreeMap<&'a str, &'a Staff>,
    time_off: BTreeMap<&'a str, Vec<&'a TimeOff>>,
    week: BTreeMap<&'a str, BTreeMap<NaiveDate, Vec<TimeWindow>>>,
}

impl<'a> AvailabilityIndex<'a> {
    /// Builds the index and precomputes the week starting at `week_start`.
    pub fn new(staff: &'a [Staff], time_off: &'a [TimeOff], week_start: NaiveDate) -> Self {
        let mut by_staff: BTreeMap<&'a str, Vec<&'a TimeOff>> = BTreeMap::new();
        for t in time_off.iter().filter(|t| t.is_approved()) {
            by_staff.entry(t.staff_id.as_str()).or_default().push(t);
        }

        let mut week = BTreeMap::new();
        for s in staff {
            let absences = by_staff.get(s.id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            let days = week_dates(week_start)
                .map(|d| (d, effective_windows(s, absences, d)))
                .collect();
            week.insert(s.id.as_str(), days);
        }

        Self {
            staff: staff.iter().map(|s| (s.id.as_str(), s)).collect(),
            time_off: by_staff,
            week,
        }
    }

    /// Effective windows of `staff_id` on `date` (empty if unknown).
    pub fn windows(&self, staff_id: &str, date: NaiveDate) -> Cow<'_, [TimeWindow]> {
        if let Some(w) = self.week.get(staff_id).and_then(|days| days.get(&date)) {
            return Cow::Borrowed(w.as_slice());
        }
        match self.staff.get(staff_id) {
            Some(s) => {
                let absences = self.time_off.get(staff_id).map(Vec::as_slice).unwrap_or(&[]);
                Cow::Owned(effective_windows(s, absences, date))
            }
            None => Cow::Borrowed(&[]),
        }
    }

    /// Whether `window` lies inside one effective window.
    pub fn is_available(&self, staff_id: &str, date: NaiveDate, window: &TimeWindow) -> bool {
        self.windows(staff_id, date).iter().any(|w| w.contains(window))
    }
}
