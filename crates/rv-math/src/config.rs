//! Game configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use crate::error::{MathError, Result};
use crate::odds::HouseEdge;
use crate::version::GameVersion;

/// Default total weight per mode (2^40)
pub const DEFAULT_WEIGHT_SPACE: u64 = 1 << 40;

/// Default simulation budget per mode
pub const DEFAULT_SIMULATIONS: u64 = 100_000;

/// Largest accepted fixed-point precision
pub const MAX_PRECISION: u64 = 1_000_000_000_000;

/// Rounding applied to the multiplier at two decimal digits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingPolicy {
    /// Round half up
    #[default]
    Nearest,
    /// Round down
    Floor,
}

impl RoundingPolicy {
    /// Divide `numerator / denominator` under this policy
    pub fn divide(self, numerator: u128, denominator: u128) -> u128 {
        match self {
            RoundingPolicy::Nearest => (2 * numerator + denominator) / (2 * denominator),
            RoundingPolicy::Floor => numerator / denominator,
        }
    }
}

/// Compression codec for distributed event books
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Codec {
    /// Zstandard (`.zst`)
    #[default]
    Zstd,
    /// Gzip (`.gz`)
    Gzip,
}

impl Codec {
    /// Accepted compression levels for this codec
    pub fn level_range(self) -> RangeInclusive<i32> {
        match self {
            Codec::Zstd => 1..=22,
            Codec::Gzip => 0..=9,
        }
    }
}

/// Complete game configuration
///
/// `Default` reproduces the published Revolver Survival math: six chambers,
/// one to five bullets, 2.33% house edge, floor rounding for the two bullet
/// mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Game identifier written to the index
    pub game: String,
    /// Semantic version of the math package
    pub version: String,
    /// Human-readable description
    pub description: String,
    /// Chambers in the cylinder
    pub total_slots: u32,
    /// Inclusive range of loaded bullets
    pub adverse_range: (u32, u32),
    /// House edge fraction, identical across modes
    pub house_edge: f64,
    /// Fixed-point scale for payouts (e.g., 100 => 117 = 1.17x)
    pub precision: u64,
    /// Total integer weight per mode
    pub weight_space: u64,
    /// Simulations per mode
    pub simulations: u64,
    /// Rounding for modes without an override
    pub rounding: RoundingPolicy,
    /// Explicit per-mode rounding overrides, keyed by bullet count
    pub rounding_overrides: BTreeMap<u32, RoundingPolicy>,
    /// Book compression codec
    pub codec: Codec,
    /// Codec compression level
    pub compression_level: i32,
    /// Largest tolerated RTP difference between modes
    pub max_rtp_spread: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::revolver_survival()
    }
}

impl GameConfig {
    /// Published Revolver Survival configuration
    pub fn revolver_survival() -> Self {
        Self {
            game: "revolver_survival".into(),
            version: "1.0.0".into(),
            description: "Russian Roulette inspired survival betting game".into(),
            total_slots: 6,
            adverse_range: (1, 5),
            house_edge: 0.0233,
            precision: 100,
            weight_space: DEFAULT_WEIGHT_SPACE,
            simulations: DEFAULT_SIMULATIONS,
            rounding: RoundingPolicy::Nearest,
            // Floor keeps the 2-bullet RTP inside the cross-mode spread
            rounding_overrides: BTreeMap::from([(2, RoundingPolicy::Floor)]),
            codec: Codec::Zstd,
            compression_level: 19,
            max_rtp_spread: 0.005,
        }
    }

    /// Small configuration for fast tests and previews
    pub fn preview() -> Self {
        Self {
            simulations: 1_200,
            compression_level: 3,
            ..Self::revolver_survival()
        }
    }

    /// Builder: set simulation budget
    pub fn with_simulations(mut self, simulations: u64) -> Self {
        self.simulations = simulations;
        self
    }

    /// Builder: set fixed-point precision
    pub fn with_precision(mut self, precision: u64) -> Self {
        self.precision = precision;
        self
    }

    /// Builder: set rounding policy for one mode
    pub fn with_rounding_override(mut self, adverse: u32, policy: RoundingPolicy) -> Self {
        self.rounding_overrides.insert(adverse, policy);
        self
    }

    /// Builder: drop all per-mode overrides
    pub fn without_rounding_overrides(mut self) -> Self {
        self.rounding_overrides.clear();
        self
    }

    /// Parse JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse YAML configuration
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Load configuration from a `.json`, `.yaml` or `.yml` file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let config = match extension.as_str() {
            "json" => Self::from_json_str(&text)?,
            "yaml" | "yml" => Self::from_yaml_str(&text)?,
            _ => return Err(MathError::UnsupportedFormat(path.display().to_string())),
        };

        config.validate()?;
        log::debug!("Loaded config {} from {}", config.game, path.display());
        Ok(config)
    }

    /// Bullet counts covered by this configuration
    pub fn adverse_counts(&self) -> RangeInclusive<u32> {
        self.adverse_range.0..=self.adverse_range.1
    }

    /// Rounding policy for a bullet count
    pub fn rounding_for(&self, adverse: u32) -> RoundingPolicy {
        self.rounding_overrides
            .get(&adverse)
            .copied()
            .unwrap_or(self.rounding)
    }

    /// Validate every parameter against its accepted range
    pub fn validate(&self) -> Result<()> {
        if self.game.trim().is_empty() {
            return Err(MathError::validation("game", "\"\"", "non-empty identifier"));
        }

        GameVersion::parse(&self.version)?;

        if self.total_slots < 2 {
            return Err(MathError::validation("total_slots", self.total_slots, ">= 2"));
        }

        let (min, max) = self.adverse_range;
        let max_adverse = self.total_slots - 1;
        if min < 1 || min > max || max > max_adverse {
            return Err(MathError::validation(
                "adverse_range",
                format!("{}..={}", min, max),
                format!("1 <= min <= max <= {}", max_adverse),
            ));
        }

        HouseEdge::from_f64(self.house_edge)?;

        if !(1..=MAX_PRECISION).contains(&self.precision) {
            return Err(MathError::validation(
                "precision",
                self.precision,
                format!("1..={}", MAX_PRECISION),
            ));
        }

        if self.simulations == 0 {
            return Err(MathError::validation("simulations", self.simulations, ">= 1"));
        }

        if self.weight_space < self.simulations {
            return Err(MathError::validation(
                "weight_space",
                self.weight_space,
                format!(">= simulations ({})", self.simulations),
            ));
        }

        if let Some(adverse) = self
            .rounding_overrides
            .keys()
            .find(|a| !self.adverse_counts().contains(*a))
        {
            return Err(MathError::validation(
                "rounding_overrides",
                adverse,
                format!("bullet count in {}..={}", min, max),
            ));
        }

        let levels = self.codec.level_range();
        if !levels.contains(&self.compression_level) {
            return Err(MathError::validation(
                "compression_level",
                self.compression_level,
                format!("{}..={} for {:?}", levels.start(), levels.end(), self.codec),
            ));
        }

        if !self.max_rtp_spread.is_finite() || self.max_rtp_spread < 0.0 {
            return Err(MathError::validation("max_rtp_spread", self.max_rtp_spread, ">= 0.0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        let config = GameConfig::default();
        config.validate().unwrap();
        assert_eq!(config.adverse_counts().count(), 5);
        assert_eq!(config.weight_space, 1u64 << 40);
    }

    #[test]
    fn test_rounding_override_is_explicit() {
        let config = GameConfig::default();
        assert_eq!(config.rounding_for(2), RoundingPolicy::Floor);
        assert_eq!(config.rounding_for(1), RoundingPolicy::Nearest);

        let config = config.without_rounding_overrides();
        assert_eq!(config.rounding_for(2), RoundingPolicy::Nearest);
    }

    #[test]
    fn test_rounding_divide() {
        assert_eq!(RoundingPolicy::Nearest.divide(146_505, 1_000), 147);
        assert_eq!(RoundingPolicy::Floor.divide(146_505, 1_000), 146);
        assert_eq!(RoundingPolicy::Nearest.divide(1_005, 10), 101);
        assert_eq!(RoundingPolicy::Nearest.divide(1_004, 10), 100);
    }

    #[test]
    fn test_validation_names_parameter() {
        let config = GameConfig {
            adverse_range: (1, 6),
            ..GameConfig::default()
        };
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("adverse_range"));
        assert!(err.contains("<= 5"));

        let config = GameConfig {
            house_edge: 1.5,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(MathError::Validation { parameter: "house_edge", .. })
        ));

        let config = GameConfig::default().with_rounding_override(9, RoundingPolicy::Floor);
        assert!(matches!(
            config.validate(),
            Err(MathError::Validation { parameter: "rounding_overrides", .. })
        ));

        let config = GameConfig {
            codec: Codec::Gzip,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(MathError::Validation { parameter: "compression_level", .. })
        ));
    }

    #[test]
    fn test_invalid_version_rejected() {
        let config = GameConfig {
            version: "latest".into(),
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(MathError::InvalidVersion(_))));
    }

    #[test]
    fn test_json_partial_config_takes_defaults() {
        let config = GameConfig::from_json_str(
            r#"{"simulations": 600, "rounding_overrides": {"2": "floor", "4": "floor"}}"#,
        )
        .unwrap();
        assert_eq!(config.simulations, 600);
        assert_eq!(config.total_slots, 6);
        assert_eq!(config.rounding_for(4), RoundingPolicy::Floor);
        config.validate().unwrap();
    }

    #[test]
    fn test_yaml_config() {
        let yaml = "precision: 1000000\nadverse_range: [1, 3]\ncodec: gzip\ncompression_level: 6\n";
        let config = GameConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.precision, 1_000_000);
        assert_eq!(config.adverse_range, (1, 3));
        assert_eq!(config.codec, Codec::Gzip);
        config.validate().unwrap();
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("game.json");
        let mut file = fs::File::create(&json_path).unwrap();
        write!(file, r#"{{"simulations": 60}}"#).unwrap();
        assert_eq!(GameConfig::load(&json_path).unwrap().simulations, 60);

        let toml_path = dir.path().join("game.toml");
        fs::write(&toml_path, "simulations = 60").unwrap();
        assert!(matches!(
            GameConfig::load(&toml_path),
            Err(MathError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/revolver_survival.yaml");
        let shipped = GameConfig::load(&path).unwrap();
        let defaults = GameConfig::default();

        assert_eq!(shipped.game, defaults.game);
        assert_eq!(shipped.version, defaults.version);
        assert_eq!(shipped.total_slots, defaults.total_slots);
        assert_eq!(shipped.adverse_range, defaults.adverse_range);
        assert_eq!(shipped.house_edge, defaults.house_edge);
        assert_eq!(shipped.weight_space, defaults.weight_space);
        assert_eq!(shipped.simulations, defaults.simulations);
        assert_eq!(shipped.rounding_overrides, defaults.rounding_overrides);
        assert_eq!(shipped.codec, defaults.codec);
    }
}
