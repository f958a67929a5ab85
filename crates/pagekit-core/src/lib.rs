//! pagekit core: offline asset caching and weekly checkin reset for a small
//! web page.
//!
//! - `assets`: versioned install/activate/serve worker over a named cache store
//! - `checkin`: typed checkbox keys and their persisted state
//! - `reset`: weekly guard and the idempotent reset action
//! - `store`: key-value store abstraction with memory and file backends
//! - `config`: on-disk configuration

pub mod assets;
pub mod checkin;
pub mod config;
pub mod error;
pub mod reset;
pub mod store;

pub use config::Config;
pub use error::{CacheError, FetchError, KeyError, ResetError, StoreError, WorkerError};
