use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KeyError;

/// Prefix shared by every encoded checkin key.
pub const KEY_PREFIX: &str = "checkin_";

/// Encoding version of `CheckinKey`.
///
/// V1 is `checkin_<table>_<item>` with decimal indices and no padding, which
/// is what pages already hold in their stores.
pub const KEY_ENCODING_VERSION: u32 = 1;

/// Identity of one checkbox: its table position and its position within the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CheckinKey {
    pub table: usize,
    pub item: usize,
}

impl CheckinKey {
    pub fn new(table: usize, item: usize) -> Self {
        Self { table, item }
    }

    pub fn encode(&self) -> String {
        format!("{}{}_{}", KEY_PREFIX, self.table, self.item)
    }

    /// Decode a stored key. Only keys produced by `encode` are accepted.
    pub fn decode(raw: &str) -> Result<Self, KeyError> {
        let rest = raw
            .strip_prefix(KEY_PREFIX)
            .ok_or_else(|| KeyError::WrongPrefix(raw.to_string()))?;

        let (table, item) = rest
            .split_once('_')
            .ok_or_else(|| KeyError::BadIndex(raw.to_string()))?;

        let parse = |s: &str| -> Result<usize, KeyError> {
            // Reject signs, padding, and empty parts so decode(encode(k)) is the only spelling
            if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) || (s.len() > 1 && s.starts_with('0')) {
                return Err(KeyError::BadIndex(raw.to_string()));
            }
            s.parse().map_err(|_| KeyError::BadIndex(raw.to_string()))
        };

        Ok(Self {
            table: parse(table)?,
            item: parse(item)?,
        })
    }
}

impl fmt::Display for CheckinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for CheckinKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}
