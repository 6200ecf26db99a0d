//! Repair pass for existing schedules.
//!
//! Two stages, both monotone:
//!
//! 1. **Gap fill**: re-runs the assignment engine over the requirements;
//!    only the missing staff are added, existing shifts are untouched.
//! 2. **Rebalance**: moves one shift at a time from the most-loaded to the
//!    least-loaded staff member. A move is committed only if the receiver
//!    passes the constraint checker, the fairness score strictly rises and
//!    the coverage score does not fall. Stops when no such move exists or
//!    the iteration cap is reached.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::greedy::AssignmentEngine;
use super::quality::{coverage_score, fairness_score};
use crate::checker::ConstraintChecker;
use crate::coverage::CoverageRequirement;
use crate::models::{Business, Schedule, Shift, Staff};

const EPSILON: f64 = 1e-9;

/// What a repair run changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairSummary {
    /// Shifts added by gap fill.
    pub filled: usize,
    /// Shifts moved by rebalancing.
    pub moved: usize,
}

/// Gap fill followed by workload rebalancing.
#[derive(Debug, Clone)]
pub struct RepairPass<'a> {
    business: &'a Business,
    staff: &'a [Staff],
    engine: &'a AssignmentEngine<'a>,
    checker: &'a ConstraintChecker<'a>,
    max_iterations: usize,
}

impl<'a> RepairPass<'a> {
    /// Creates a pass with a cap of 50 rebalance moves.
    pub fn new(
        business: &'a Business,
        staff: &'a [Staff],
        engine: &'a AssignmentEngine<'a>,
        checker: &'a ConstraintChecker<'a>,
    ) -> Self {
        Self {
            business,
            staff,
            engine,
            checker,
            max_iterations: 50,
        }
    }

    /// Sets the rebalance iteration cap.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Repairs `schedule` in place.
    pub fn run(&self, schedule: &mut Schedule, requirements: &[CoverageRequirement]) -> RepairSummary {
        let filled = self.fill_gaps(schedule, requirements);
        let moved = self.rebalance(schedule, requirements);
        RepairSummary { filled, moved }
    }

    /// Adds staff to understaffed requirements; returns shifts added.
    pub fn fill_gaps(&self, schedule: &mut Schedule, requirements: &[CoverageRequirement]) -> usize {
        let before = schedule.shift_count();
        let remaining = self.engine.assign(requirements, schedule);
        let added = schedule.shift_count() - before;
        debug!(added, remaining = remaining.len(), "gap fill finished");
        added
    }

    /// Moves shifts from the most- to the least-loaded staff member; returns moves made.
    pub fn rebalance(&self, schedule: &mut Schedule, requirements: &[CoverageRequirement]) -> usize {
        let mut moved = 0;

        for _ in 0..self.max_iterations {
            let minutes = schedule.minutes_by_staff();
            let Some((donor, receiver)) = extremes(&minutes, |id| self.is_schedulable(id)) else {
                break;
            };
            match self.find_move(schedule, requirements, &minutes, &donor, &receiver) {
                Some((index, shift)) => {
                    debug!(
                        from = %donor,
                        to = %receiver,
                        date = %shift.date,
                        window = %shift.window,
                        "shift moved"
                    );
                    schedule.shifts[index] = shift;
                    moved += 1;
                }
                None => break,
            }
        }
        moved
    }

    fn is_schedulable(&self, staff_id: &str) -> bool {
        self.staff.iter().any(|s| s.id == staff_id && s.is_active)
    }

    /// First donor shift whose move to `receiver_id` is legal and improving.
    fn find_move(
        &self,
        schedule: &Schedule,
        requirements: &[CoverageRequirement],
        minutes: &BTreeMap<String, i64>,
        donor_id: &str,
        receiver_id: &str,
    ) -> Option<(usize, Shift)> {
        let receiver = self.staff.iter().find(|s| s.id == receiver_id && s.is_active)?;
        let fairness_before = fairness_score(minutes);
        let coverage_before = coverage_score(schedule, requirements);
        let receiver_shifts = schedule.shifts_for_staff(receiver_id);

        let mut donor_shifts: Vec<(usize, &Shift)> = schedule
            .shifts
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_active() && s.staff_id == donor_id)
            .collect();
        donor_shifts.sort_by_key(|(i, s)| (s.date, s.window.start_min, *i));

        for (index, shift) in donor_shifts {
            if schedule.staff_on(shift.date, &shift.role_id).contains(receiver_id) {
                continue;
            }
            let Some(role) = self.business.role(&shift.role_id) else {
                continue;
            };

            let mut candidate = shift.clone();
            candidate.staff_id = receiver.id.clone();
            candidate.pay_rate = receiver.pay_rate_for(role);
            if self.checker.can_assign(receiver, &candidate, &receiver_shifts).is_err() {
                continue;
            }

            let duration = i64::from(shift.duration_min());
            let mut after = minutes.clone();
            if let Some(m) = after.get_mut(donor_id) {
                *m -= duration;
            }
            *after.entry(receiver.id.clone()).or_insert(0) += duration;
            if fairness_score(&after) <= fairness_before + EPSILON {
                continue;
            }

            let mut trial = schedule.clone();
            trial.shifts[index] = candidate.clone();
            if coverage_score(&trial, requirements) < coverage_before - EPSILON {
                continue;
            }

            return Some((index, candidate));
        }
        None
    }
}

/// The most- and least-loaded staff among those `eligible` (ties broken by
/// ID), if they differ in load.
///
/// Shifts held by unknown or inactive staff still count toward fairness but
/// never pick the pair.
fn extremes(minutes: &BTreeMap<String, i64>, eligible: impl Fn(&str) -> bool) -> Option<(String, String)> {
    let loaded = minutes.iter().filter(|(id, m)| **m > 0 && eligible(id));
    // BTreeMap iterates by ID, so strict comparisons keep the smallest ID on ties
    let mut max: Option<(&String, i64)> = None;
    let mut min: Option<(&String, i64)> = None;
    for (id, &m) in loaded {
        if max.map_or(true, |(_, best)| m > best) {
            max = Some((id, m));
        }
        if min.map_or(true, |(_, best)| m < best) {
            min = Some((id, m));
        }
    }

    match (max, min) {
        (Some((hi, hi_m)), Some((lo, lo_m))) if hi_m > lo_m => Some((hi.clone(), lo.clone())),
        _ => None,
    }
}
