//! Index document, the settlement engine's entry point to every mode

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use rv_math::{GameConfig, GameVersion, ModeTable};

use crate::error::{BookError, Result};
use crate::manifest::ModeManifest;

/// Cost of one round in bet units (no bet-size scaling in the math package)
pub const MODE_COST: f64 = 1.0;

/// Display metadata for a mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexMeta {
    pub bullets: u32,
    pub survival_rate: f64,
    pub multiplier: f64,
    pub display_name: String,
}

/// One mode entry in the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMode {
    pub name: String,
    pub cost: f64,
    /// Compressed event book
    pub events: String,
    /// Lookup table
    pub weights: String,
    pub meta: IndexMeta,
}

/// Complete index document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDocument {
    pub game: String,
    pub version: GameVersion,
    pub description: String,
    pub chambers: u32,
    /// Fixed-point scale of every payout in the tables and books
    pub precision: u64,
    pub modes: Vec<IndexMode>,
}

impl IndexDocument {
    /// Build the index; every mode in the table must have a manifest
    pub fn assemble(
        config: &GameConfig,
        modes: &ModeTable,
        manifests: &[ModeManifest],
    ) -> Result<Self> {
        let entries = modes
            .iter()
            .map(|mode| {
                let manifest = manifests
                    .iter()
                    .find(|m| m.adverse_count == mode.adverse_count)
                    .ok_or_else(|| BookError::MissingManifest(mode.name()))?;

                Ok(IndexMode {
                    name: mode.name(),
                    cost: MODE_COST,
                    events: manifest.events.clone(),
                    weights: manifest.weights.clone(),
                    meta: IndexMeta {
                        bullets: mode.adverse_count,
                        survival_rate: mode.survival_rate(),
                        multiplier: mode.multiplier(),
                        display_name: mode.display_name(),
                    },
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            game: config.game.clone(),
            version: GameVersion::parse(&config.version)?,
            description: config.description.clone(),
            chambers: config.total_slots,
            precision: config.precision,
            modes: entries,
        })
    }

    /// Mode entry by name
    pub fn mode(&self, name: &str) -> Option<&IndexMode> {
        self.modes.iter().find(|m| m.name == name)
    }

    /// Write as pretty-printed JSON
    pub fn write(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(BookError::at(path))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush().map_err(BookError::at(path))?;
        Ok(())
    }

    /// Read an index back
    pub fn read(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(BookError::at(path))?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}
