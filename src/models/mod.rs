//! Workforce scheduling domain models.
//!
//! Inputs (`Business`, `Staff`, `TimeOff`) are read-only for a planning run.
//! Outputs (`Schedule`, `Shift`) are created fresh by the planner.
//!
//! # Mappings
//!
//! | u-roster | Retail | Hospitality | Clinic |
//! |----------|--------|-------------|--------|
//! | Business | Store | Restaurant | Practice |
//! | Role | Cashier | Cook | Receptionist |
//! | Staff | Associate | Server | Nurse |
//! | Schedule | Weekly rota | Weekly rota | Duty roster |

mod business;
mod schedule;
mod staff;
pub mod time;
mod time_off;

pub use business::{Business, PeakRule, Role, WeeklyHours};
pub use schedule::{
    Schedule, ScheduleSource, ScheduleStatus, Shift, ShiftStatus, StatusTransitionError,
};
pub use staff::{Availability, ConstraintOverrides, LaborConstraints, Staff};
pub use time::TimeWindow;
pub use time_off::{TimeOff, TimeOffStatus};
