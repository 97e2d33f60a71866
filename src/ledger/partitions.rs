//! Partition layout and value encoding for the tally store
//!
//! Partition structure:
//! - `catalog`: {partition_name} -> 0x01 (every partition created so far)
//! - `dailycount_{YYYY-MM-DD}`: {screen_name} -> u16 (big-endian)
//! - `lastindexedtweet`: "id" -> u64 (big-endian)

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate};

use super::error::{Result, StoreError};

/// Internal catalog partition
pub const CATALOG_PARTITION: &str = "catalog";

/// Namespace tag shared by every per-day counter partition
pub const DAILY_NAMESPACE: &str = "dailycount";

const DAILY_SEPARATOR: char = '_';

/// Partition and key holding the cursor record
pub const CURSOR_PARTITION: &str = "lastindexedtweet";
pub const CURSOR_KEY: &[u8] = b"id";

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Calendar day used to name a counter partition (`YYYY-MM-DD`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayLabel(NaiveDate);

impl DayLabel {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Current calendar day in the machine's local time zone
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Name of the counter partition for this day: `dailycount_{YYYY-MM-DD}`
    pub fn partition_name(&self) -> String {
        format!("{}{}{}", DAILY_NAMESPACE, DAILY_SEPARATOR, self)
    }

    /// Recover the day from a counter partition name
    pub fn from_partition_name(name: &str) -> Option<Self> {
        name.strip_prefix(DAILY_NAMESPACE)?
            .strip_prefix(DAILY_SEPARATOR)?
            .parse()
            .ok()
    }
}

impl fmt::Display for DayLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_FORMAT))
    }
}

impl FromStr for DayLabel {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(s, DAY_FORMAT)
            .map(Self)
            .map_err(|_| StoreError::InvalidDay(s.to_string()))
    }
}

/// Prefix shared by all counter partition names, for catalog scans
pub fn daily_prefix() -> String {
    format!("{}{}", DAILY_NAMESPACE, DAILY_SEPARATOR)
}

/// Fjall accepts ASCII alphanumerics plus `_`, `-`, `#` and `$`
pub fn validate_partition_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.len() <= 255
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '#' | '$'));

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidPartitionName(name.to_string()))
    }
}

/// Encode a daily count: 2 bytes, big-endian
pub fn encode_count(count: u16) -> [u8; 2] {
    count.to_be_bytes()
}

/// Decode a daily count
///
/// Accepts the 2-byte form and the legacy 8-byte form (count in the first
/// two bytes, zero padding after).
pub fn decode_count(partition: &str, key: &[u8], value: &[u8]) -> Result<u16> {
    match value {
        [hi, lo] => Ok(u16::from_be_bytes([*hi, *lo])),
        [hi, lo, rest @ ..] if rest.len() == 6 && rest.iter().all(|b| *b == 0) => {
            Ok(u16::from_be_bytes([*hi, *lo]))
        }
        _ => Err(corrupt(partition, key, value.len(), "2 or 8 bytes")),
    }
}

/// Encode the cursor: 8 bytes, big-endian
pub fn encode_cursor(id: u64) -> [u8; 8] {
    id.to_be_bytes()
}

pub fn decode_cursor(value: &[u8]) -> Result<u64> {
    let bytes: [u8; 8] = value
        .try_into()
        .map_err(|_| corrupt(CURSOR_PARTITION, CURSOR_KEY, value.len(), "8 bytes"))?;
    Ok(u64::from_be_bytes(bytes))
}

fn corrupt(partition: &str, key: &[u8], len: usize, expected: &str) -> StoreError {
    StoreError::Corrupt {
        partition: partition.to_string(),
        key: String::from_utf8_lossy(key).into_owned(),
        reason: format!("expected {}, found {} bytes", expected, len),
    }
}
