//! Read-back verification of published lookup tables
//!
//! Re-reads each table from disk and checks what the settlement engine will
//! rely on: contiguous ids, weights summing exactly to the weight space, and
//! a survival probability that matches the mode's odds to within one unit of
//! the weight space.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rv_math::{GameConfig, GameMode, ModeTable};

use crate::error::{BookError, Result};
use crate::layout::OutputLayout;
use crate::writer::TableRow;

/// Parse one `id,weight,payout` line
pub fn parse_row(line: &str) -> Option<TableRow> {
    let mut fields = line.trim_end_matches(['\r', '\n']).split(',');
    let row = TableRow {
        id: fields.next()?.trim().parse().ok()?,
        weight: fields.next()?.trim().parse().ok()?,
        payout: fields.next()?.trim().parse().ok()?,
    };
    if fields.next().is_some() {
        return None;
    }
    Some(row)
}

/// Aggregates of a lookup table as read from disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSummary {
    pub rows: u64,
    /// Ids run 1, 2, 3, ... without gaps
    pub contiguous_ids: bool,
    pub total_weight: u128,
    pub win_rows: u64,
    pub win_weight: u128,
    /// Weight mass per payout value
    pub weight_by_payout: BTreeMap<u64, u128>,
    /// Sum of `weight * payout`
    pub weighted_payout: u128,
    pub sha256: String,
}

impl TableSummary {
    /// Summarise a table file, streaming it line by line
    pub fn read(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(BookError::at(path))?;
        let mut reader = BufReader::new(file);
        let mut hasher = Sha256::new();
        let mut summary = TableSummary {
            contiguous_ids: true,
            ..Default::default()
        };

        let mut line = String::new();
        loop {
            line.clear();
            let read = reader.read_line(&mut line).map_err(BookError::at(path))?;
            if read == 0 {
                break;
            }
            hasher.update(line.as_bytes());

            let row = parse_row(&line).ok_or_else(|| BookError::MalformedRow {
                path: path.to_path_buf(),
                line: summary.rows + 1,
                content: line.trim_end().to_string(),
            })?;
            summary.add(&row);
        }

        summary.sha256 = hex::encode(hasher.finalize());
        Ok(summary)
    }

    fn add(&mut self, row: &TableRow) {
        self.rows += 1;
        if row.id != self.rows {
            self.contiguous_ids = false;
        }
        self.total_weight += row.weight as u128;
        *self.weight_by_payout.entry(row.payout).or_insert(0) += row.weight as u128;
        self.weighted_payout += row.weight as u128 * row.payout as u128;
        if row.payout > 0 {
            self.win_rows += 1;
            self.win_weight += row.weight as u128;
        }
    }

    /// Probability mass on paying rows
    pub fn realized_survival(&self) -> f64 {
        if self.total_weight == 0 {
            return 0.0;
        }
        self.win_weight as f64 / self.total_weight as f64
    }

    /// Expected payout per unit bet
    pub fn realized_rtp(&self, precision: u64) -> f64 {
        if self.total_weight == 0 {
            return 0.0;
        }
        self.weighted_payout as f64 / (self.total_weight as f64 * precision as f64)
    }
}

/// Verification of one mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeVerification {
    pub name: String,
    pub bullets: u32,
    pub expected_rows: u64,
    pub weight_space: u64,
    pub expected_survival: f64,
    pub theoretical_rtp: f64,
    pub summary: TableSummary,
    pub realized_survival: f64,
    pub realized_rtp: f64,
    /// Failed checks, empty when the table is sound
    pub failures: Vec<String>,
}

impl ModeVerification {
    /// Check a summary against its mode
    pub fn check(mode: &GameMode, summary: TableSummary, simulations: u64, weight_space: u64) -> Self {
        let mut failures = Vec::new();

        if summary.rows != simulations {
            failures.push(format!("{} rows, expected {}", summary.rows, simulations));
        }
        if !summary.contiguous_ids {
            failures.push("ids are not contiguous from 1".to_string());
        }
        if summary.total_weight != weight_space as u128 {
            failures.push(format!(
                "total weight {}, expected {}",
                summary.total_weight, weight_space
            ));
        }
        if summary
            .weight_by_payout
            .keys()
            .any(|&p| p != 0 && p != mode.multiplier_fixed_point)
        {
            failures.push(format!(
                "payouts other than 0 and {}",
                mode.multiplier_fixed_point
            ));
        }

        // |win_weight / W - s / t| < 1 / W  <=>  |win_weight * t - W * s| < t
        let t = mode.total_slots as u128;
        let scaled_win = summary.win_weight * t;
        let scaled_expected = weight_space as u128 * mode.survival_slots as u128;
        if scaled_win.abs_diff(scaled_expected) >= t {
            failures.push(format!(
                "survival mass {} deviates from {}/{} by a full weight unit or more",
                summary.win_weight, mode.survival_slots, mode.total_slots
            ));
        }

        Self {
            name: mode.name(),
            bullets: mode.adverse_count,
            expected_rows: simulations,
            weight_space,
            expected_survival: mode.survival_rate(),
            theoretical_rtp: mode.rtp(),
            realized_survival: summary.realized_survival(),
            realized_rtp: summary.realized_rtp(mode.precision),
            summary,
            failures,
        }
    }

    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Verification of every mode plus the cross-mode RTP spread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub game: String,
    pub version: String,
    pub precision: u64,
    pub modes: Vec<ModeVerification>,
    pub rtp_spread: f64,
    pub max_rtp_spread: f64,
}

impl VerificationReport {
    /// Read back every mode's table from a layout
    pub fn run(config: &GameConfig, modes: &ModeTable, layout: &OutputLayout) -> Result<Self> {
        let results = modes
            .iter()
            .map(|mode| {
                let summary = TableSummary::read(&layout.table_path(&mode.name()))?;
                let result =
                    ModeVerification::check(mode, summary, modes.simulations(), modes.weight_space());
                if result.passed() {
                    log::info!(
                        "{}: {} rows, survival {:.6}, RTP {:.4}%",
                        result.name,
                        result.summary.rows,
                        result.realized_survival,
                        result.realized_rtp * 100.0
                    );
                } else {
                    log::error!("{}: {}", result.name, result.failures.join("; "));
                }
                Ok(result)
            })
            .collect::<Result<Vec<_>>>()?;

        let (lo, hi) = results
            .iter()
            .map(|m| m.realized_rtp)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), rtp| (lo.min(rtp), hi.max(rtp)));
        let rtp_spread = if results.is_empty() { 0.0 } else { hi - lo };

        if rtp_spread > config.max_rtp_spread {
            log::warn!(
                "RTP spread {:.4}% exceeds tolerance {:.4}%",
                rtp_spread * 100.0,
                config.max_rtp_spread * 100.0
            );
        }

        Ok(Self {
            game: config.game.clone(),
            version: config.version.clone(),
            precision: config.precision,
            modes: results,
            rtp_spread,
            max_rtp_spread: config.max_rtp_spread,
        })
    }

    /// RTP spread within tolerance
    pub fn spread_ok(&self) -> bool {
        self.rtp_spread <= self.max_rtp_spread
    }

    /// Every mode sound and spread within tolerance
    pub fn passed(&self) -> bool {
        self.spread_ok() && self.modes.iter().all(ModeVerification::passed)
    }

    /// Names of failing modes with their failures
    pub fn failures(&self) -> Vec<String> {
        let mut failures: Vec<String> = self
            .modes
            .iter()
            .filter(|m| !m.passed())
            .map(|m| format!("{}: {}", m.name, m.failures.join("; ")))
            .collect();
        if !self.spread_ok() {
            failures.push(format!(
                "RTP spread {:.6} exceeds {:.6}",
                self.rtp_spread, self.max_rtp_spread
            ));
        }
        failures
    }

    /// Write as pretty-printed JSON
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(BookError::at(path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_row() {
        assert_eq!(
            parse_row("7,13194139534,117\r\n"),
            Some(TableRow { id: 7, weight: 13_194_139_534, payout: 117 })
        );
        assert_eq!(parse_row("7,1"), None);
        assert_eq!(parse_row("7,1,2,3"), None);
        assert_eq!(parse_row("x,1,2"), None);
    }

    #[test]
    fn test_check_flags_bad_weight() {
        let config = GameConfig::default();
        let table = ModeTable::build(&config).unwrap();
        let mode = table.get(1).unwrap();

        let mut summary = TableSummary {
            contiguous_ids: true,
            ..Default::default()
        };
        summary.add(&TableRow { id: 1, weight: 5, payout: 117 });
        summary.add(&TableRow { id: 3, weight: 1, payout: 0 });

        let result = ModeVerification::check(mode, summary, 2, 6);
        assert!(result.failures.iter().any(|f| f.contains("contiguous")));
        assert!(!result.failures.iter().any(|f| f.contains("total weight")));
        assert!(!result.failures.iter().any(|f| f.contains("survival")));

        let mut summary = TableSummary {
            contiguous_ids: true,
            ..Default::default()
        };
        summary.add(&TableRow { id: 1, weight: 4, payout: 117 });
        summary.add(&TableRow { id: 2, weight: 1, payout: 0 });

        let result = ModeVerification::check(mode, summary, 2, 6);
        assert!(result.failures.iter().any(|f| f.contains("total weight")));
        assert!(result.failures.iter().any(|f| f.contains("survival")));
    }
}
