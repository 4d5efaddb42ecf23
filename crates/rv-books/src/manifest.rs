//! Per-mode file manifest

use serde::{Deserialize, Serialize};

/// Files and totals produced for one mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeManifest {
    /// Bullet count
    pub adverse_count: u32,
    /// Mode name (`mode_1_bullet`)
    pub name: String,
    /// Lookup table file name (publish directory)
    pub weights: String,
    /// Compressed book file name (publish directory)
    pub events: String,
    /// Uncompressed book file name (staging directory)
    pub staging_book: String,
    /// Outcomes written
    pub rows: u64,
    /// Win outcomes written
    pub win_rows: u64,
    /// Sum of all row weights
    pub total_weight: u64,
    /// SHA-256 of the lookup table
    pub weights_sha256: String,
    /// SHA-256 of the compressed book
    pub events_sha256: String,
}
