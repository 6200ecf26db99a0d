//! Greedy coverage-driven assignment engine.
//!
//! # Algorithm
//!
//! 1. Walk coverage requirements in their fixed processing order.
//! 2. For each requirement, build the candidate pool: active staff eligible
//!    for the role, not already covering this (date, role), with a free
//!    window at least the minimum shift length.
//! 3. Rank candidates (fewest assigned hours, largest free window, ID).
//! 4. For each candidate, try the preferred shift lengths longest-first
//!    at the start of each free window, then the whole window; commit the
//!    first shift the constraint checker accepts.
//! 5. Record a coverage warning for any shortfall and move on.
//!
//! Single pass, no randomness, no backtracking: identical inputs yield
//! identical schedules.
//!
//! # Complexity
//! O(r · s · (w · l + k)) where r=requirements, s=staff, w=free windows,
//! l=preferred lengths, k=shifts per staff member.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::availability::AvailabilityIndex;
use crate::checker::ConstraintChecker;
use crate::coverage::CoverageRequirement;
use crate::models::{Business, Role, Schedule, Shift, Staff, TimeWindow};
use crate::ranking::{Candidate, RankingEngine};
use chrono::NaiveDate;

/// A requirement the engine could not fully staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageWarning {
    /// Calendar date.
    pub date: NaiveDate,
    /// Understaffed role.
    pub role_id: String,
    /// Staff required.
    pub required: u32,
    /// Staff assigned.
    pub assigned: u32,
    /// `required - assigned`.
    pub shortfall: u32,
}

/// Greedy assignment engine for one planning run.
#[derive(Debug, Clone)]
pub struct AssignmentEngine<'a> {
    business: &'a Business,
    staff: &'a [Staff],
    availability: &'a AvailabilityIndex<'a>,
    checker: &'a ConstraintChecker<'a>,
    ranking: RankingEngine,
    shift_lengths_min: Vec<u32>,
    min_shift_min: u32,
}

impl<'a> AssignmentEngine<'a> {
    /// Creates an engine with 8/6/4 hour preferred shifts and a 2 hour minimum.
    pub fn new(
        business: &'a Business,
        staff: &'a [Staff],
        availability: &'a AvailabilityIndex<'a>,
        checker: &'a ConstraintChecker<'a>,
    ) -> Self {
        Self {
            business,
            staff,
            availability,
            checker,
            ranking: RankingEngine::staffing(),
            shift_lengths_min: vec![480, 360, 240],
            min_shift_min: 120,
        }
    }

    /// Sets the candidate ranking.
    pub fn with_ranking(mut self, ranking: RankingEngine) -> Self {
        self.ranking = ranking;
        self
    }

    /// Sets the preferred shift lengths (minutes).
    pub fn with_shift_lengths(mut self, mut minutes: Vec<u32>) -> Self {
        minutes.sort_unstable_by(|a, b| b.cmp(a));
        minutes.dedup();
        self.shift_lengths_min = minutes;
        self
    }

    /// Sets the minimum shift length (minutes).
    pub fn with_min_shift(mut self, minutes: u32) -> Self {
        self.min_shift_min = minutes.max(1);
        self
    }

    /// Staffs every requirement as far as possible, appending to `schedule`.
    ///
    /// Requirements already partly covered by `schedule` only receive the
    /// missing staff, so the same call fills gaps in an existing schedule.
    pub fn assign(
        &self,
        requirements: &[CoverageRequirement],
        schedule: &mut Schedule,
    ) -> Vec<CoverageWarning> {
        let mut assigned_min = schedule.minutes_by_staff();
        let mut warnings = Vec::new();

        for req in requirements {
            let covered = schedule.assigned_count(req.date, &req.role_id);
            let needed = req.required.saturating_sub(covered);
            if needed == 0 {
                continue;
            }

            let filled = self.fill(req, needed, schedule, &mut assigned_min);
            if filled < needed {
                debug!(
                    date = %req.date,
                    role = %req.role_id,
                    required = req.required,
                    shortfall = needed - filled,
                    "coverage requirement not met"
                );
                warnings.push(CoverageWarning {
                    date: req.date,
                    role_id: req.role_id.clone(),
                    required: req.required,
                    assigned: covered + filled,
                    shortfall: needed - filled,
                });
            }
        }

        warnings
    }

    /// Tries to add `needed` staff to one requirement; returns how many were added.
    fn fill(
        &self,
        req: &CoverageRequirement,
        needed: u32,
        schedule: &mut Schedule,
        assigned_min: &mut BTreeMap<String, i64>,
    ) -> u32 {
        let Some(role) = self.business.role(&req.role_id) else {
            return 0;
        };

        let mut candidates = self.candidates(req, role, schedule, assigned_min);
        self.ranking.rank(&mut candidates);
        debug!(
            date = %req.date,
            role = %req.role_id,
            needed,
            pool = candidates.len(),
            "staffing requirement"
        );

        let mut filled = 0;
        for candidate in &candidates {
            if filled == needed {
                break;
            }
            if let Some(shift) = self.place(candidate, req, schedule) {
                debug!(
                    staff = %shift.staff_id,
                    date = %shift.date,
                    window = %shift.window,
                    "shift committed"
                );
                *assigned_min.entry(shift.staff_id.clone()).or_insert(0) +=
                    i64::from(shift.duration_min());
                schedule.add_shift(shift);
                filled += 1;
            }
        }
        filled
    }

    /// Builds the candidate pool for one requirement.
    fn candidates(
        &self,
        req: &CoverageRequirement,
        role: &Role,
        schedule: &Schedule,
        assigned_min: &BTreeMap<String, i64>,
    ) -> Vec<Candidate<'a>> {
        let on_slot: BTreeSet<&str> = schedule.staff_on(req.date, &req.role_id);

        self.staff
            .iter()
            .filter(|s| s.is_active && s.is_eligible(&req.role_id) && !on_slot.contains(s.id.as_str()))
            .filter_map(|s| {
                let windows = self.free_windows(s, req, schedule);
                if windows.is_empty() {
                    return None;
                }
                Some(Candidate {
                    staff: s,
                    assigned_min: assigned_min.get(&s.id).copied().unwrap_or(0),
                    windows,
                    pay_rate: s.pay_rate_for(role),
                })
            })
            .collect()
    }

    /// Effective availability ∩ opening hours − own shifts that date.
    ///
    /// Only windows of at least the minimum shift length are kept, longest
    /// first (earlier start on ties).
    fn free_windows(&self, staff: &Staff, req: &CoverageRequirement, schedule: &Schedule) -> Vec<TimeWindow> {
        let busy: Vec<TimeWindow> = schedule
            .shifts_for_staff(&staff.id)
            .into_iter()
            .filter(|s| s.date == req.date)
            .map(|s| s.window)
            .collect();

        let mut free: Vec<TimeWindow> = self
            .availability
            .windows(&staff.id, req.date)
            .iter()
            .filter_map(|w| w.intersect(&req.window))
            .collect();
        for b in &busy {
            free = free.iter().flat_map(|w| w.subtract(b)).collect();
        }

        free.retain(|w| w.duration_min() >= self.min_shift_min);
        free.sort_by(|a, b| {
            b.duration_min()
                .cmp(&a.duration_min())
                .then(a.start_min.cmp(&b.start_min))
        });
        free
    }

    /// Finds the first legal shift for a candidate.
    fn place(&self, candidate: &Candidate<'_>, req: &CoverageRequirement, schedule: &Schedule) -> Option<Shift> {
        let staff = candidate.staff;
        let existing = schedule.shifts_for_staff(&staff.id);
        let make = |start: u32, end: u32| {
            Shift::new(
                staff.id.as_str(),
                req.role_id.as_str(),
                req.date,
                TimeWindow {
                    start_min: start,
                    end_min: end,
                },
                candidate.pay_rate,
            )
        };

        for window in &candidate.windows {
            let lengths = self
                .shift_lengths_min
                .iter()
                .copied()
                .filter(|&len| len >= self.min_shift_min && len <= window.duration_min());
            for len in lengths {
                let shift = make(window.start_min, window.start_min + len);
                if self.checker.can_assign(staff, &shift, &existing).is_ok() {
                    return Some(shift);
                }
            }

            let whole = make(window.start_min, window.end_min);
            if !self.shift_lengths_min.contains(&window.duration_min())
                && self.checker.can_assign(staff, &whole, &existing).is_ok()
            {
                return Some(whole);
            }
        }
        None
    }
}
