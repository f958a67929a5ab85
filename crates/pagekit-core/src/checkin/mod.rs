//! Persisted checkin state.
//!
//! Each checkbox on the page is identified by its table and item position
//! and persisted under a `CheckinKey`. The board restores states on page load
//! and writes every toggle straight through to the key-value store.

pub mod board;
pub mod key;

pub use board::{save, stored_keys, CheckinBoard, CheckinState};
pub use key::{CheckinKey, KEY_ENCODING_VERSION, KEY_PREFIX};
