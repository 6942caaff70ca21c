// ABOUTME: Security scan result entity — append-only per-entity scanner verdicts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SeverityCounts {
    #[serde(default)]
    pub critical: u32,
    #[serde(default)]
    pub high: u32,
    #[serde(default)]
    pub medium: u32,
    #[serde(default)]
    pub low: u32,
}

impl SeverityCounts {
    /// `is_safe = (critical == 0 and high == 0)`.
    #[must_use]
    pub const fn is_safe(self) -> bool {
        self.critical == 0 && self.high == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityScanResult {
    /// The entity's `path`.
    pub entity_path: String,
    pub scanned_at: DateTime<Utc>,
    pub is_safe: bool,
    pub severity: SeverityCounts,
    #[serde(default)]
    pub analyzers: Vec<String>,
    #[serde(default)]
    pub raw_output: Option<serde_json::Value>,
    #[serde(default)]
    pub failed: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl SecurityScanResult {
    #[must_use]
    pub fn failed_scan(entity_path: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            entity_path: entity_path.into(),
            scanned_at: Utc::now(),
            is_safe: false,
            severity: SeverityCounts::default(),
            analyzers: Vec::new(),
            raw_output: None,
            failed: true,
            error: Some(error.into()),
        }
    }
}
