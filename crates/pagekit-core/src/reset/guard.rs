use chrono::{Local, NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use super::action::{reset_checkins, CheckinView, ResetOutcome, LAST_RESET_KEY, MARKER_FORMAT};
use super::schedule::ResetSchedule;
use crate::error::ResetError;
use crate::store::KeyValueStore;

/// Source of the current local wall-clock time.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// System clock in the host's local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

impl Clock for NaiveDateTime {
    fn now(&self) -> NaiveDateTime {
        *self
    }
}

/// Whether the default weekly window is open at `now` and has not been serviced today.
pub fn should_reset(now: NaiveDateTime, last_reset: Option<NaiveDate>) -> bool {
    ResetGuard::default().should_reset(now, last_reset)
}

/// Decides once per page load whether the weekly reset is due.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResetGuard {
    schedule: ResetSchedule,
}

impl ResetGuard {
    pub fn new(schedule: ResetSchedule) -> Self {
        Self { schedule }
    }

    pub fn schedule(&self) -> ResetSchedule {
        self.schedule
    }

    pub fn should_reset(&self, now: NaiveDateTime, last_reset: Option<NaiveDate>) -> bool {
        self.schedule.contains(now) && last_reset != Some(now.date())
    }

    /// Read the last-reset marker. A malformed marker counts as no reset.
    pub fn last_reset<S: KeyValueStore + ?Sized>(store: &S) -> Result<Option<NaiveDate>, ResetError> {
        let Some(raw) = store.get(LAST_RESET_KEY)? else {
            return Ok(None);
        };
        match NaiveDate::parse_from_str(&raw, MARKER_FORMAT) {
            Ok(date) => Ok(Some(date)),
            Err(e) => {
                warn!(marker = %raw, error = %e, "Ignoring malformed last reset marker");
                Ok(None)
            }
        }
    }

    /// Evaluate the guard and run the reset when it is due.
    ///
    /// Returns `None` when nothing was done.
    pub fn run_on_load<S, V, C>(&self, store: &mut S, view: &mut V, clock: &C) -> Result<Option<ResetOutcome>, ResetError>
    where
        S: KeyValueStore + ?Sized,
        V: CheckinView + ?Sized,
        C: Clock + ?Sized,
    {
        let now = clock.now();
        let last_reset = Self::last_reset(&*store)?;

        if !self.should_reset(now, last_reset) {
            debug!(now = %now, last_reset = ?last_reset, "Checkin reset not due");
            return Ok(None);
        }

        reset_checkins(store, view, now.date()).map(Some)
    }
}
