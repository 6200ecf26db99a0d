//! Business model: operating hours, roles, and peak-hour rules.
//!
//! A business is the unit a schedule is planned for. Each open day has
//! exactly one operating window; roles define how many staff must be
//! working concurrently while the business is open.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::time::day_index;
use super::TimeWindow;
use crate::validation::{ValidationError, ValidationErrorKind};

/// A business whose staff are being scheduled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    /// Unique business identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Operating hours per weekday.
    pub hours: WeeklyHours,
    /// Roles that need staffing.
    pub roles: Vec<Role>,
    /// Rules raising the staffing requirement on busy days.
    pub peak_rules: Vec<PeakRule>,
}

/// Operating hours for each weekday (`None` = closed).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyHours {
    /// Indexed Monday = 0 .. Sunday = 6.
    pub days: [Option<TimeWindow>; 7],
}

/// A staffing role (e.g. barista, cashier, cook).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    /// Unique role identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Hourly rate; overrides the staff member's own rate when set.
    pub hourly_rate: Option<f64>,
    /// Staff required concurrently while open.
    pub min_staff: u32,
    /// Staff allowed concurrently.
    pub max_staff: u32,
    /// Processing priority (higher = staffed first).
    pub priority: i32,
}

/// Scales a role's requirement on matching days.
///
/// A rule applies to a day when the weekday is listed, the role matches
/// (or `role_id` is `None`), and `window` overlaps the day's opening hours.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeakRule {
    /// Weekdays the rule is active on.
    pub days: Vec<Weekday>,
    /// High-demand window.
    pub window: TimeWindow,
    /// Requirement multiplier (>= 1.0).
    pub multiplier: f64,
    /// Restricts the rule to one role.
    pub role_id: Option<String>,
}

impl Business {
    /// Creates a business that is closed every day and has no roles.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            hours: WeeklyHours::default(),
            roles: Vec::new(),
            peak_rules: Vec::new(),
        }
    }

    /// Sets the business name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Opens the business on `day` during `window`.
    pub fn with_hours(mut self, day: Weekday, window: TimeWindow) -> Self {
        self.hours.set(day, Some(window));
        self
    }

    /// Opens the business on several days with the same window.
    pub fn with_hours_on(mut self, days: &[Weekday], window: TimeWindow) -> Self {
        for &day in days {
            self.hours.set(day, Some(window));
        }
        self
    }

    /// Adds a role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.push(role);
        self
    }

    /// Adds a peak-hour rule.
    pub fn with_peak_rule(mut self, rule: PeakRule) -> Self {
        self.peak_rules.push(rule);
        self
    }

    /// Opening hours on `day`.
    #[inline]
    pub fn open_window(&self, day: Weekday) -> Option<TimeWindow> {
        self.hours.get(day)
    }

    /// Looks up a role by ID.
    pub fn role(&self, role_id: &str) -> Option<&Role> {
        self.roles.iter().find(|r| r.id == role_id)
    }
}

impl WeeklyHours {
    /// Opening hours on `day`.
    #[inline]
    pub fn get(&self, day: Weekday) -> Option<TimeWindow> {
        self.days[day_index(day)]
    }

    /// Sets or clears the opening hours on `day`.
    pub fn set(&mut self, day: Weekday, window: Option<TimeWindow>) {
        self.days[day_index(day)] = window;
    }

    /// Whether the business is closed on every day.
    pub fn is_closed_all_week(&self) -> bool {
        self.days.iter().all(Option::is_none)
    }
}

impl Role {
    /// Creates a role with no staffing requirement (min 0, max 1).
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            hourly_rate: None,
            min_staff: 0,
            max_staff: 1,
            priority: 0,
        }
    }

    /// Sets the hourly rate.
    pub fn with_rate(mut self, hourly_rate: f64) -> Self {
        self.hourly_rate = Some(hourly_rate);
        self
    }

    /// Sets the concurrent staffing bounds.
    ///
    /// Rejects `min > max`.
    pub fn with_staffing(mut self, min_staff: u32, max_staff: u32) -> Result<Self, ValidationError> {
        self.min_staff = min_staff;
        self.max_staff = max_staff;
        self.validate()?;
        Ok(self)
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Checks the staffing bounds and rate.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.min_staff > self.max_staff {
            return Err(ValidationError::new(
                ValidationErrorKind::InvalidStaffing,
                format!(
                    "Role '{}' requires {} staff but allows only {}",
                    self.id, self.min_staff, self.max_staff
                ),
            ));
        }
        if let Some(rate) = self.hourly_rate {
            if !rate.is_finite() || rate < 0.0 {
                return Err(ValidationError::new(
                    ValidationErrorKind::InvalidRate,
                    format!("Role '{}' has invalid hourly rate {rate}", self.id),
                ));
            }
        }
        Ok(())
    }
}

impl PeakRule {
    /// Creates a rule applying to all roles.
    pub fn new(days: Vec<Weekday>, window: TimeWindow, multiplier: f64) -> Self {
        Self {
            days,
            window,
            multiplier,
            role_id: None,
        }
    }

    /// Restricts the rule to a single role.
    pub fn for_role(mut self, role_id: impl Into<String>) -> Self {
        self.role_id = Some(role_id.into());
        self
    }

    /// Whether the rule raises `role_id`'s requirement on `day`.
    pub fn applies_to(&self, day: Weekday, open: &TimeWindow, role_id: &str) -> bool {
        self.days.contains(&day)
            && self.role_id.as_deref().map_or(true, |r| r == role_id)
            && self.window.overlaps(open)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_builder() {
        let b = Business::new("cafe")
            .with_name("Corner Cafe")
            .with_hours_on(&[Weekday::Mon, Weekday::Tue], TimeWindow::hours(9, 17).unwrap())
            .with_hours(Weekday::Sat, TimeWindow::hours(10, 14).unwrap())
            .with_role(Role::new("barista", "Barista").with_rate(16.0));

        assert_eq!(b.name, "Corner Cafe");
        assert_eq!(b.open_window(Weekday::Mon), Some(TimeWindow::hours(9, 17).unwrap()));
        assert_eq!(b.open_window(Weekday::Sat), Some(TimeWindow::hours(10, 14).unwrap()));
        assert_eq!(b.open_window(Weekday::Sun), None);
        assert!(b.role("barista").is_some());
        assert!(b.role("cook").is_none());
        assert!(!b.hours.is_closed_all_week());
        assert!(Business::new("x").hours.is_closed_all_week());
    }

    #[test]
    fn test_role_staffing_invariant() {
        assert!(Role::new("r", "R").with_staffing(1, 2).is_ok());
        assert!(Role::new("r", "R").with_staffing(0, 0).is_ok());

        let err = Role::new("r", "R").with_staffing(3, 2).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::InvalidStaffing);
    }

    #[test]
    fn test_role_negative_rate() {
        let role = Role::new("r", "R").with_rate(-1.0);
        assert_eq!(
            role.validate().unwrap_err().kind,
            ValidationErrorKind::InvalidRate
        );
    }

    #[test]
    fn test_peak_rule_applies() {
        let open = TimeWindow::hours(9, 17).unwrap();
        let rule = PeakRule::new(vec![Weekday::Sat], TimeWindow::hours(11, 14).unwrap(), 2.0);
        assert!(rule.applies_to(Weekday::Sat, &open, "any"));
        assert!(!rule.applies_to(Weekday::Fri, &open, "any"));

        let evening = PeakRule::new(vec![Weekday::Sat], TimeWindow::hours(18, 22).unwrap(), 2.0);
        assert!(!evening.applies_to(Weekday::Sat, &open, "any"));

        let scoped = rule.clone().for_role("cook");
        assert!(scoped.applies_to(Weekday::Sat, &open, "cook"));
        assert!(!scoped.applies_to(Weekday::Sat, &open, "barista"));
    }
}
