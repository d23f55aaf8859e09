//! Boot-time lookup for the report header.

use chrono::{Local, TimeZone};
use sysinfo::System;
use tokio::task;
use tracesweep_core::{TIMESTAMP_FORMAT, UNKNOWN};

/// Report header metadata. Values are display strings: a timestamp,
/// `Unknown`, or `Error: <message>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootInfo {
    pub last_boot: String,
    pub last_reset: String,
}

impl BootInfo {
    /// The reset time comes from the same boot counter, so both lines agree.
    pub fn from_boot_time(secs: u64) -> Self {
        let formatted = format_boot_time(secs);
        Self {
            last_boot: formatted.clone(),
            last_reset: formatted,
        }
    }

    pub fn failed(message: &str) -> Self {
        let formatted = format!("Error: {}", message);
        Self {
            last_boot: formatted.clone(),
            last_reset: formatted,
        }
    }

    pub fn header_lines(&self) -> [String; 2] {
        [
            format!("Last Boot Time: {}", self.last_boot),
            format!("Last Reset Time: {}", self.last_reset),
        ]
    }
}

pub async fn query() -> BootInfo {
    match task::spawn_blocking(System::boot_time).await {
        Ok(secs) => BootInfo::from_boot_time(secs),
        Err(e) => BootInfo::failed(&e.to_string()),
    }
}

/// Local `yyyy-MM-dd HH:mm:ss` for a Unix timestamp; `Unknown` when the host
/// reports nothing usable.
pub fn format_boot_time(secs: u64) -> String {
    if secs == 0 {
        return UNKNOWN.to_string();
    }
    i64::try_from(secs)
        .ok()
        .and_then(|s| Local.timestamp_opt(s, 0).single())
        .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}
