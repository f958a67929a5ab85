//! Scheduled checkin reset.
//!
//! Once a week (Sunday, 22:00-22:59 local time by default) every persisted
//! checkin is cleared and the date is recorded under the last-reset marker.
//! The guard runs on every page load and fires at most once per date.

pub mod action;
pub mod guard;
pub mod schedule;

pub use action::{reset_checkins, CheckinView, ResetOutcome, LAST_RESET_KEY};
pub use guard::{should_reset, Clock, LocalClock, ResetGuard};
pub use schedule::ResetSchedule;
