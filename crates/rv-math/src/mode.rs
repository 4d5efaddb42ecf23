//! Game modes, one per bullet count

use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::{GameConfig, RoundingPolicy};
use crate::error::{MathError, Result};
use crate::odds::{HUNDREDTHS, OddsModel};
use crate::partition::{Partition, partition_in};

/// A single game mode
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameMode {
    /// Loaded bullets
    pub adverse_count: u32,
    /// Chambers in the cylinder
    pub total_slots: u32,
    /// Empty chambers
    pub survival_slots: u32,
    /// Rounding policy the multiplier was resolved with
    pub rounding: RoundingPolicy,
    /// Multiplier in hundredths (117 = 1.17x)
    pub multiplier_hundredths: u64,
    /// Multiplier scaled by `precision`
    pub multiplier_fixed_point: u64,
    /// Fixed-point scale
    pub precision: u64,
}

impl GameMode {
    /// Resolve a mode through the odds model
    ///
    /// A surviving pull must pay more than the stake: the rounded multiplier
    /// has to exceed 1.00x and must still exceed it after fixed-point scaling.
    pub fn resolve(model: &OddsModel, adverse: u32) -> Result<Self> {
        let mode = Self {
            adverse_count: adverse,
            total_slots: model.total_slots(),
            survival_slots: model.survival_slots(adverse)?,
            rounding: model.rounding_for(adverse),
            multiplier_hundredths: model.multiplier_hundredths(adverse)?,
            multiplier_fixed_point: model.multiplier(adverse)?,
            precision: model.precision(),
        };

        log::debug!(
            "{}: raw {:.6}x, {:?} -> {:.2}x ({} at precision {})",
            mode.name(),
            model.raw_multiplier(adverse)?,
            mode.rounding,
            mode.multiplier(),
            mode.multiplier_fixed_point,
            mode.precision
        );

        if mode.multiplier_hundredths <= HUNDREDTHS {
            return Err(MathError::validation(
                "house_edge",
                format!("{:.2}x for {}", mode.multiplier(), mode.name()),
                "every multiplier above 1.00x",
            ));
        }
        if mode.multiplier_fixed_point <= mode.precision {
            return Err(MathError::validation(
                "precision",
                mode.precision,
                format!(
                    "a scale that keeps {:.2}x above 1 for {}",
                    mode.multiplier(),
                    mode.name()
                ),
            ));
        }

        Ok(mode)
    }

    /// Mode name used in file names and the index (`mode_2_bullet`)
    pub fn name(&self) -> String {
        format!("mode_{}_bullet", self.adverse_count)
    }

    /// Human label (`1 Bullet`, `3 Bullets`)
    pub fn display_name(&self) -> String {
        let plural = if self.adverse_count > 1 { "s" } else { "" };
        format!("{} Bullet{}", self.adverse_count, plural)
    }

    /// Win side of the reduced odds ratio
    pub fn win_weight_ratio(&self) -> u64 {
        self.survival_slots as u64
    }

    /// Loss side of the reduced odds ratio
    pub fn loss_weight_ratio(&self) -> u64 {
        self.adverse_count as u64
    }

    /// Survival probability
    pub fn survival_rate(&self) -> f64 {
        self.survival_slots as f64 / self.total_slots as f64
    }

    /// Survival probability formatted as a percentage (`83.33%`)
    pub fn survival_percent(&self) -> String {
        format!("{:.2}%", self.survival_rate() * 100.0)
    }

    /// Decimal multiplier (1.17)
    pub fn multiplier(&self) -> f64 {
        self.multiplier_hundredths as f64 / HUNDREDTHS as f64
    }

    /// Theoretical return to player
    pub fn rtp(&self) -> f64 {
        (self.multiplier_hundredths as u128 * self.survival_slots as u128) as f64
            / (HUNDREDTHS as u128 * self.total_slots as u128) as f64
    }

    /// Split a simulation budget for this mode
    pub fn partition(&self, simulations: u64, weight_space: u64) -> Result<Partition> {
        partition_in(
            self.win_weight_ratio(),
            self.loss_weight_ratio(),
            simulations,
            weight_space,
        )
    }
}

/// Immutable table of every configured mode, keyed by bullet count
#[derive(Debug, Clone)]
pub struct ModeTable {
    modes: BTreeMap<u32, GameMode>,
    range: (u32, u32),
    simulations: u64,
    weight_space: u64,
}

impl ModeTable {
    /// Validate the configuration and resolve every mode in its range
    pub fn build(config: &GameConfig) -> Result<Self> {
        let model = OddsModel::from_config(config)?;
        let modes = config
            .adverse_counts()
            .map(|adverse| GameMode::resolve(&model, adverse).map(|mode| (adverse, mode)))
            .collect::<Result<BTreeMap<_, _>>>()?;

        log::debug!("Built {} modes for {}", modes.len(), config.game);

        Ok(Self {
            modes,
            range: config.adverse_range,
            simulations: config.simulations,
            weight_space: config.weight_space,
        })
    }

    /// Mode for a bullet count
    pub fn get(&self, adverse: u32) -> Result<&GameMode> {
        self.modes.get(&adverse).ok_or(MathError::OutOfRange {
            adverse,
            min: self.range.0,
            max: self.range.1,
        })
    }

    /// Modes in ascending bullet order
    pub fn iter(&self) -> impl Iterator<Item = &GameMode> {
        self.modes.values()
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    /// Simulations per mode
    pub fn simulations(&self) -> u64 {
        self.simulations
    }

    /// Total weight per mode
    pub fn weight_space(&self) -> u64 {
        self.weight_space
    }

    /// Partition of a mode's budget
    pub fn partition(&self, adverse: u32) -> Result<Partition> {
        self.get(adverse)?
            .partition(self.simulations, self.weight_space)
    }

    /// Largest RTP difference between any two modes
    pub fn rtp_spread(&self) -> f64 {
        let (min, max) = self
            .iter()
            .map(GameMode::rtp)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), rtp| {
                (lo.min(rtp), hi.max(rtp))
            });
        if self.is_empty() { 0.0 } else { max - min }
    }
}
