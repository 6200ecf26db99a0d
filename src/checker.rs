//! Hard-constraint checks for a single proposed shift.
//!
//! [`ConstraintChecker::can_assign`] is a pure predicate: it never commits
//! anything. Rules are evaluated in a fixed order and the first failure is
//! returned:
//!
//! 1. Role eligibility
//! 2. Availability containment
//! 3. Business-hours containment
//! 4. No overlap with the staff member's shifts on the same date
//! 5. Rest period to shifts on the previous, same, and next date
//! 6. Daily hour cap
//! 7. Weekly hour cap (planning week of the proposed date)
//! 8. Consecutive working-day cap

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::availability::AvailabilityIndex;
use crate::models::time::{hours_to_minutes, week_start_for};
use crate::models::{Business, ConstraintOverrides, LaborConstraints, Shift, Staff};

/// The rule a shift breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintRule {
    /// Staff member is not eligible for the role.
    RoleEligibility,
    /// Shift is outside the staff member's effective availability.
    Availability,
    /// Shift is outside the business's opening hours.
    BusinessHours,
    /// Shift overlaps another shift of the same staff member.
    Overlap,
    /// Too little rest before or after a neighbouring shift.
    RestPeriod,
    /// Daily hour cap exceeded.
    DailyHours,
    /// Weekly hour cap exceeded.
    WeeklyHours,
    /// Consecutive working-day cap exceeded.
    ConsecutiveDays,
    /// Shift references a staff member that is missing or inactive.
    UnknownStaff,
    /// Shift references a role the business does not have.
    UnknownRole,
}

impl fmt::Display for ConstraintRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::RoleEligibility => "not eligible for role",
            Self::Availability => "outside availability",
            Self::BusinessHours => "outside business hours",
            Self::Overlap => "overlaps another shift",
            Self::RestPeriod => "insufficient rest between shifts",
            Self::DailyHours => "daily hour cap exceeded",
            Self::WeeklyHours => "weekly hour cap exceeded",
            Self::ConsecutiveDays => "too many consecutive working days",
            Self::UnknownStaff => "unknown or inactive staff",
            Self::UnknownRole => "unknown role",
        };
        f.write_str(text)
    }
}

/// Evaluates hard constraints against one run's business and availability.
#[derive(Debug, Clone)]
pub struct ConstraintChecker<'a> {
    business: &'a Business,
    availability: &'a AvailabilityIndex<'a>,
    first_day: Weekday,
    overrides: ConstraintOverrides,
}

impl<'a> ConstraintChecker<'a> {
    /// Creates a checker.
    pub fn new(
        business: &'a Business,
        availability: &'a AvailabilityIndex<'a>,
        first_day: Weekday,
    ) -> Self {
        Self {
            business,
            availability,
            first_day,
            overrides: ConstraintOverrides::default(),
        }
    }

    /// Applies run-wide labor overrides.
    pub fn with_overrides(mut self, overrides: ConstraintOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Labor limits in force for `staff` during this run.
    pub fn limits_for(&self, staff: &Staff) -> LaborConstraints {
        self.overrides.apply(&staff.constraints)
    }

    /// Checks whether `proposed` may be added to `staff`'s schedule.
    ///
    /// `existing` holds the staff member's other shifts; entries for other
    /// staff and cancelled shifts are ignored.
    pub fn can_assign(
        &self,
        staff: &Staff,
        proposed: &Shift,
        existing: &[&Shift],
    ) -> Result<(), ConstraintRule> {
        let others: Vec<&Shift> = existing
            .iter()
            .copied()
            .filter(|s| s.is_active() && s.staff_id == staff.id)
            .collect();
        let limits = self.limits_for(staff);

        if !staff.is_eligible(&proposed.role_id) {
            return Err(ConstraintRule::RoleEligibility);
        }

        if !self
            .availability
            .is_available(&staff.id, proposed.date, &proposed.window)
        {
            return Err(ConstraintRule::Availability);
        }

        match self.business.open_window(proposed.date.weekday()) {
            Some(open) if open.contains(&proposed.window) => {}
            _ => return Err(ConstraintRule::BusinessHours),
        }

        if others
            .iter()
            .any(|s| s.date == proposed.date && s.window.overlaps(&proposed.window))
        {
            return Err(ConstraintRule::Overlap);
        }

        let min_rest = hours_to_minutes(limits.min_hours_between_shifts);
        if min_rest > 0 && others.iter().any(|s| rest_gap(s, proposed).is_some_and(|gap| gap < min_rest)) {
            return Err(ConstraintRule::RestPeriod);
        }

        let day_minutes: i64 = others
            .iter()
            .filter(|s| s.date == proposed.date)
            .map(|s| i64::from(s.duration_min()))
            .sum::<i64>()
            + i64::from(proposed.duration_min());
        if day_minutes > hours_to_minutes(limits.max_hours_per_day) {
            return Err(ConstraintRule::DailyHours);
        }

        let week_start = week_start_for(proposed.date, self.first_day);
        let week_end = week_start + Duration::days(7);
        let week_minutes: i64 = others
            .iter()
            .filter(|s| s.date >= week_start && s.date < week_end)
            .map(|s| i64::from(s.duration_min()))
            .sum::<i64>()
            + i64::from(proposed.duration_min());
        if week_minutes > hours_to_minutes(limits.max_hours_per_week) {
            return Err(ConstraintRule::WeeklyHours);
        }

        let worked: BTreeSet<NaiveDate> = others.iter().map(|s| s.date).collect();
        if consecutive_run(&worked, proposed.date) > limits.max_consecutive_working_days {
            return Err(ConstraintRule::ConsecutiveDays);
        }

        Ok(())
    }
}

/// Rest between two non-overlapping shifts no more than one date apart.
///
/// Returns `None` for shifts further apart or overlapping.
fn rest_gap(existing: &Shift, proposed: &Shift) -> Option<i64> {
    let days_apart = (existing.date - proposed.date).num_days().abs();
    if days_apart > 1 {
        return None;
    }
    if existing.end_abs() <= proposed.start_abs() {
        Some(proposed.start_abs() - existing.end_abs())
    } else if proposed.end_abs() <= existing.start_abs() {
        Some(existing.start_abs() - proposed.end_abs())
    } else {
        None
    }
}

/// Length of the run of consecutive worked dates through `date`.
fn consecutive_run(worked: &BTreeSet<NaiveDate>, date: NaiveDate) -> u32 {
    let mut run = 1;
    let mut d = date - Duration::days(1);
    while worked.contains(&d) {
        run += 1;
        d -= Duration::days(1);
    }
    let mut d = date + Duration::days(1);
    while worked.contains(&d) {
        run += 1;
        d += Duration::days(1);
    }
    run
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Availability, Role, ShiftStatus, TimeOff, TimeWindow};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap() // Monday
    }

    fn window(s: u32, e: u32) -> TimeWindow {
        TimeWindow::hours(s, e).unwrap()
    }

    fn all_week() -> Vec<Weekday> {
        vec![
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ]
    }

    fn business() -> Business {
        Business::new("bar")
            .with_hours_on(&all_week(), TimeWindow::new(0, 24 * 60).unwrap())
            .with_role(Role::new("server", "Server").with_rate(15.0))
    }

    fn staff(constraints: LaborConstraints) -> Staff {
        Staff::new("sam")
            .with_role("server")
            .with_constraints(constraints)
            .with_availability(
                Availability::new()
                    .with_window_on(&all_week(), TimeWindow::new(0, 24 * 60).unwrap())
                    .unwrap(),
            )
    }

    fn shift(d: u32, s: u32, e: u32) -> Shift {
        Shift::new("sam", "server", date(d), window(s, e), 15.0)
    }

    fn relaxed() -> LaborConstraints {
        LaborConstraints::new(24.0, 168.0, 0.0, 7).unwrap()
    }

    #[test]
    fn test_accepts_legal_shift() {
        let b = business();
        let people = vec![staff(LaborConstraints::default())];
        let index = AvailabilityIndex::new(&people, &[], date(1));
        let checker = ConstraintChecker::new(&b, &index, Weekday::Mon);
        assert_eq!(checker.can_assign(&people[0], &shift(1, 9, 17), &[]), Ok(()));
    }

    #[test]
    fn test_role_eligibility_first() {
        let b = business();
        let people = vec![staff(relaxed())];
        let index = AvailabilityIndex::new(&people, &[], date(1));
        let checker = ConstraintChecker::new(&b, &index, Weekday::Mon);
        let cook = Shift::new("sam", "cook", date(1), window(9, 17), 15.0);
        assert_eq!(
            checker.can_assign(&people[0], &cook, &[]),
            Err(ConstraintRule::RoleEligibility)
        );
    }

    #[test]
    fn test_availability_and_time_off() {
        let b = business();
        let people = vec![staff(relaxed())];
        let time_off = vec![TimeOff::new("sam", date(2), date(2))
            .unwrap()
            .with_partial(window(12, 14))
            .approved()];
        let index = AvailabilityIndex::new(&people, &time_off, date(1));
        let checker = ConstraintChecker::new(&b, &index, Weekday::Mon);
        assert_eq!(
            checker.can_assign(&people[0], &shift(2, 10, 16), &[]),
            Err(ConstraintRule::Availability)
        );
        assert_eq!(checker.can_assign(&people[0], &shift(2, 14, 20), &[]), Ok(()));
    }

    #[test]
    fn test_business_hours() {
        let b = business().with_hours(Weekday::Tue, window(10, 18));
        let people = vec![staff(relaxed())];
        let index = AvailabilityIndex::new(&people, &[], date(1));
        let checker = ConstraintChecker::new(&b, &index, Weekday::Mon);
        assert_eq!(
            checker.can_assign(&people[0], &shift(2, 9, 17), &[]),
            Err(ConstraintRule::BusinessHours)
        );
    }

    #[test]
    fn test_overlap() {
        let b = business();
        let people = vec![staff(relaxed())];
        let index = AvailabilityIndex::new(&people, &[], date(1));
        let checker = ConstraintChecker::new(&b, &index, Weekday::Mon);
        let existing = shift(1, 9, 13);
        assert_eq!(
            checker.can_assign(&people[0], &shift(1, 12, 16), &[&existing]),
            Err(ConstraintRule::Overlap)
        );
        // Touching is fine
        assert_eq!(checker.can_assign(&people[0], &shift(1, 13, 16), &[&existing]), Ok(()));
    }

    #[test]
    fn test_rest_period_across_midnight() {
        // 22:00 end, next shift at 06:00 → 8h rest < 12h required
        let b = business();
        let constraints = LaborConstraints::new(10.0, 60.0, 12.0, 7).unwrap();
        let people = vec![staff(constraints)];
        let index = AvailabilityIndex::new(&people, &[], date(1));
        let checker = ConstraintChecker::new(&b, &index, Weekday::Mon);

        let late = shift(1, 14, 22);
        assert_eq!(
            checker.can_assign(&people[0], &shift(2, 6, 14), &[&late]),
            Err(ConstraintRule::RestPeriod)
        );
        // 10:00 start → exactly 12h
        assert_eq!(checker.can_assign(&people[0], &shift(2, 10, 18), &[&late]), Ok(()));
    }

    #[test]
    fn test_rest_period_next_day_shift() {
        // Proposed shift precedes an existing one on the following date
        let b = business();
        let constraints = LaborConstraints::new(10.0, 60.0, 12.0, 7).unwrap();
        let people = vec![staff(constraints)];
        let index = AvailabilityIndex::new(&people, &[], date(1));
        let checker = ConstraintChecker::new(&b, &index, Weekday::Mon);

        let early = shift(2, 6, 14);
        assert_eq!(
            checker.can_assign(&people[0], &shift(1, 14, 22), &[&early]),
            Err(ConstraintRule::RestPeriod)
        );
    }

    #[test]
    fn test_daily_cap() {
        let b = business();
        let people = vec![staff(LaborConstraints::new(8.0, 40.0, 0.0, 6).unwrap())];
        let index = AvailabilityIndex::new(&people, &[], date(1));
        let checker = ConstraintChecker::new(&b, &index, Weekday::Mon);
        let morning = shift(1, 6, 11);
        assert_eq!(
            checker.can_assign(&people[0], &shift(1, 12, 16), &[&morning]),
            Err(ConstraintRule::DailyHours)
        );
        assert_eq!(checker.can_assign(&people[0], &shift(1, 12, 15), &[&morning]), Ok(()));
    }

    #[test]
    fn test_weekly_cap() {
        let b = business();
        let people = vec![staff(LaborConstraints::new(8.0, 20.0, 0.0, 7).unwrap())];
        let index = AvailabilityIndex::new(&people, &[], date(1));
        let checker = ConstraintChecker::new(&b, &index, Weekday::Mon);
        let existing = [shift(1, 9, 17), shift(2, 9, 17)];
        let refs: Vec<&Shift> = existing.iter().collect();
        assert_eq!(
            checker.can_assign(&people[0], &shift(3, 9, 14), &refs),
            Err(ConstraintRule::WeeklyHours)
        );
        assert_eq!(checker.can_assign(&people[0], &shift(3, 9, 13), &refs), Ok(()));
        // Next planning week starts fresh
        assert_eq!(checker.can_assign(&people[0], &shift(8, 9, 17), &refs), Ok(()));
    }

    #[test]
    fn test_consecutive_days() {
        let b = business();
        let people = vec![staff(LaborConstraints::new(8.0, 60.0, 0.0, 3).unwrap())];
        let index = AvailabilityIndex::new(&people, &[], date(1));
        let checker = ConstraintChecker::new(&b, &index, Weekday::Mon);

        // Mon, Tue worked; Thu worked. Wed would join them into a 4-day run.
        let existing = [shift(1, 9, 12), shift(2, 9, 12), shift(4, 9, 12)];
        let refs: Vec<&Shift> = existing.iter().collect();
        assert_eq!(
            checker.can_assign(&people[0], &shift(3, 9, 12), &refs),
            Err(ConstraintRule::ConsecutiveDays)
        );
        assert_eq!(checker.can_assign(&people[0], &shift(6, 9, 12), &refs), Ok(()));
    }

    #[test]
    fn test_overrides_and_cancelled_shifts() {
        let b = business();
        let people = vec![staff(LaborConstraints::default())];
        let index = AvailabilityIndex::new(&people, &[], date(1));
        let overrides = ConstraintOverrides {
            max_hours_per_day: Some(4.0),
            ..Default::default()
        };
        let checker = ConstraintChecker::new(&b, &index, Weekday::Mon).with_overrides(overrides);
        assert_eq!(
            checker.can_assign(&people[0], &shift(1, 9, 14), &[]),
            Err(ConstraintRule::DailyHours)
        );

        let cancelled = shift(1, 9, 12).with_status(ShiftStatus::Cancelled);
        assert_eq!(checker.can_assign(&people[0], &shift(1, 9, 12), &[&cancelled]), Ok(()));
    }
}
