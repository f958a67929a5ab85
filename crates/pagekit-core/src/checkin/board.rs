use tracing::{debug, info};

use super::key::{CheckinKey, KEY_PREFIX};
use crate::error::StoreError;
use crate::store::KeyValueStore;

/// Restored state of one checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckinState {
    pub key: CheckinKey,
    pub checked: bool,
}

/// Layout of the checkboxes on the page: one entry per table holding the
/// number of checkboxes in that table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckinBoard {
    tables: Vec<usize>,
}

impl CheckinBoard {
    pub fn new(tables: Vec<usize>) -> Self {
        Self { tables }
    }

    pub fn keys(&self) -> impl Iterator<Item = CheckinKey> + '_ {
        self.tables
            .iter()
            .enumerate()
            .flat_map(|(table, &count)| (0..count).map(move |item| CheckinKey::new(table, item)))
    }

    /// Read every checkbox's state. Only the stored string `"true"` counts as checked.
    pub fn restore<S: KeyValueStore + ?Sized>(&self, store: &S) -> Result<Vec<CheckinState>, StoreError> {
        let states = self
            .keys()
            .map(|key| {
                let checked = store.get(&key.encode())?.as_deref() == Some("true");
                Ok(CheckinState { key, checked })
            })
            .collect::<Result<Vec<_>, StoreError>>()?;
        info!(
            count = states.len(),
            checked = states.iter().filter(|s| s.checked).count(),
            "Checkin states restored"
        );
        Ok(states)
    }
}

/// Persist a checkbox toggle.
pub fn save<S: KeyValueStore + ?Sized>(store: &mut S, key: CheckinKey, checked: bool) -> Result<(), StoreError> {
    debug!(key = %key, checked, "Saving checkin");
    store.set(&key.encode(), if checked { "true" } else { "false" })
}

/// Every stored key that decodes as a checkin key.
///
/// Keys that merely share the prefix (for example `checkin_notes`) are not
/// checkin entries and are left out.
pub fn stored_keys<S: KeyValueStore + ?Sized>(store: &S) -> Result<Vec<CheckinKey>, StoreError> {
    Ok(store
        .keys_with_prefix(KEY_PREFIX)?
        .iter()
        .filter_map(|raw| CheckinKey::decode(raw).ok())
        .collect())
}
