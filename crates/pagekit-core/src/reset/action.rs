use chrono::NaiveDate;
use tracing::{debug, info};

use crate::checkin::stored_keys;
use crate::error::ResetError;
use crate::store::KeyValueStore;

/// Store key holding the date (`YYYY-MM-DD`) of the most recent reset.
pub const LAST_RESET_KEY: &str = "last_checkin_reset_date";

/// Date format of the last-reset marker.
pub const MARKER_FORMAT: &str = "%Y-%m-%d";

/// Presentation layer receiving reset commands.
pub trait CheckinView {
    /// Show every checkbox as unchecked.
    fn uncheck_all(&mut self);
}

/// What a completed reset did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetOutcome {
    pub cleared: usize,
    pub date: NaiveDate,
}

/// Clear all checkins and record `today` as the last reset.
///
/// Unrelated keys and the marker itself are never deleted. The marker is
/// written last, so a failure while clearing leaves the previous marker in
/// place and the next page load retries.
pub fn reset_checkins<S, V>(store: &mut S, view: &mut V, today: NaiveDate) -> Result<ResetOutcome, ResetError>
where
    S: KeyValueStore + ?Sized,
    V: CheckinView + ?Sized,
{
    view.uncheck_all();

    let keys = stored_keys(&*store)?;
    for key in &keys {
        let raw = key.encode();
        debug!(key = %raw, "Clearing checkin");
        store.delete(&raw).map_err(|source| ResetError::Clear { key: raw, source })?;
    }

    let date = today.format(MARKER_FORMAT).to_string();
    store.set(LAST_RESET_KEY, &date).map_err(ResetError::Marker)?;

    info!(cleared = keys.len(), date = %date, "All checkins reset");
    Ok(ResetOutcome {
        cleared: keys.len(),
        date: today,
    })
}
