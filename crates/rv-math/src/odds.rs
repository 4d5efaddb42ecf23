//! Odds Model — fair odds discounted by a constant house edge
//!
//! ```text
//! multiplier = (total_slots / survival_slots) * (1 - house_edge)
//! ```
//!
//! All arithmetic is exact: the house edge is read as the decimal fraction it
//! was configured with (0.0233 => 233 / 10_000) and the multiplier is resolved
//! in integer hundredths before it is scaled to the published fixed-point
//! precision.

use std::collections::BTreeMap;

use crate::config::{GameConfig, RoundingPolicy};
use crate::error::{MathError, Result};

/// Most decimal places accepted in a house edge
pub const MAX_EDGE_DECIMALS: usize = 18;

/// Decimal digits kept by the rounding step
pub const MULTIPLIER_DIGITS: u32 = 2;

/// Scale of a two-digit multiplier (1.17 => 117)
pub const HUNDREDTHS: u64 = 10u64.pow(MULTIPLIER_DIGITS);

/// House edge as an exact decimal fraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HouseEdge {
    numerator: u128,
    denominator: u128,
}

impl HouseEdge {
    /// Read the shortest decimal form of `edge`, which must lie in `[0, 1)`
    pub fn from_f64(edge: f64) -> Result<Self> {
        let invalid = || {
            MathError::validation(
                "house_edge",
                edge,
                format!("0.0 <= edge < 1.0 with at most {} decimal places", MAX_EDGE_DECIMALS),
            )
        };

        if !edge.is_finite() || !(0.0..1.0).contains(&edge) {
            return Err(invalid());
        }

        // `Display` for f64 never uses exponent notation
        let text = edge.to_string();
        let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
        if whole != "0" || fraction.len() > MAX_EDGE_DECIMALS {
            return Err(invalid());
        }

        let numerator = if fraction.is_empty() {
            0
        } else {
            fraction.parse::<u128>().map_err(|_| invalid())?
        };

        Ok(Self {
            numerator,
            denominator: 10u128.pow(fraction.len() as u32),
        })
    }

    /// `1 - edge` as `(numerator, denominator)`
    pub fn retained(&self) -> (u128, u128) {
        (self.denominator - self.numerator, self.denominator)
    }

    pub fn as_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

/// Odds model for one game configuration
#[derive(Debug, Clone)]
pub struct OddsModel {
    total_slots: u32,
    min_adverse: u32,
    max_adverse: u32,
    house_edge: HouseEdge,
    precision: u64,
    rounding: RoundingPolicy,
    overrides: BTreeMap<u32, RoundingPolicy>,
}

impl OddsModel {
    /// Create a model from a validated configuration
    pub fn from_config(config: &GameConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            total_slots: config.total_slots,
            min_adverse: config.adverse_range.0,
            max_adverse: config.adverse_range.1,
            house_edge: HouseEdge::from_f64(config.house_edge)?,
            precision: config.precision,
            rounding: config.rounding,
            overrides: config.rounding_overrides.clone(),
        })
    }

    /// Total slots (chambers)
    pub fn total_slots(&self) -> u32 {
        self.total_slots
    }

    /// Fixed-point precision
    pub fn precision(&self) -> u64 {
        self.precision
    }

    /// Rounding policy applied to a bullet count
    pub fn rounding_for(&self, adverse: u32) -> RoundingPolicy {
        self.overrides.get(&adverse).copied().unwrap_or(self.rounding)
    }

    /// Reject bullet counts outside the configured range
    pub fn check_range(&self, adverse: u32) -> Result<()> {
        if adverse < self.min_adverse || adverse > self.max_adverse {
            return Err(MathError::OutOfRange {
                adverse,
                min: self.min_adverse,
                max: self.max_adverse,
            });
        }
        Ok(())
    }

    /// Empty chambers left by `adverse` bullets
    pub fn survival_slots(&self, adverse: u32) -> Result<u32> {
        self.check_range(adverse)?;
        match self.total_slots.checked_sub(adverse) {
            Some(empty) if empty > 0 => Ok(empty),
            _ => Err(MathError::UndefinedSurvival {
                adverse,
                total_slots: self.total_slots,
            }),
        }
    }

    /// Multiplier in hundredths (117 = 1.17x) under the mode's rounding policy
    pub fn multiplier_hundredths(&self, adverse: u32) -> Result<u64> {
        let survival = self.survival_slots(adverse)?;
        let policy = self.rounding_for(adverse);

        let (kept, scale) = self.house_edge.retained();
        let numerator = self.total_slots as u128 * kept * HUNDREDTHS as u128;
        let denominator = survival as u128 * scale;

        Ok(policy.divide(numerator, denominator) as u64)
    }

    /// Fixed-point multiplier (`multiplier * precision`, truncated)
    pub fn multiplier(&self, adverse: u32) -> Result<u64> {
        let hundredths = self.multiplier_hundredths(adverse)?;
        Ok(to_fixed_point(hundredths, self.precision))
    }

    /// Unrounded multiplier, for reports only
    pub fn raw_multiplier(&self, adverse: u32) -> Result<f64> {
        let survival = self.survival_slots(adverse)?;
        Ok(self.total_slots as f64 / survival as f64 * (1.0 - self.house_edge.as_f64()))
    }
}

/// Scale a two-digit multiplier to the published precision, truncating
pub fn to_fixed_point(hundredths: u64, precision: u64) -> u64 {
    (hundredths as u128 * precision as u128 / HUNDREDTHS as u128) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn model() -> OddsModel {
        OddsModel::from_config(&GameConfig::default()).unwrap()
    }

    #[test]
    fn test_one_bullet_scenario() {
        let model = model();
        assert_eq!(model.survival_slots(1).unwrap(), 5);
        assert_relative_eq!(model.raw_multiplier(1).unwrap(), 1.17204, epsilon = 1e-12);
        assert_eq!(model.multiplier_hundredths(1).unwrap(), 117);
        assert_eq!(model.multiplier(1).unwrap(), 117);
    }

    #[test]
    fn test_published_multipliers() {
        let model = model();
        let published: Vec<u64> = (1..=5).map(|b| model.multiplier(b).unwrap()).collect();
        assert_eq!(published, vec![117, 146, 195, 293, 586]);
    }

    #[test]
    fn test_rounding_policies_pinned() {
        let floor = model();
        assert_eq!(floor.rounding_for(2), RoundingPolicy::Floor);
        assert_eq!(floor.multiplier_hundredths(2).unwrap(), 146);

        let nearest =
            OddsModel::from_config(&GameConfig::default().without_rounding_overrides()).unwrap();
        assert_eq!(nearest.multiplier_hundredths(2).unwrap(), 147);

        // Third decimal below 5: both policies agree
        let all_floor = OddsModel::from_config(&GameConfig {
            rounding: RoundingPolicy::Floor,
            ..GameConfig::default()
        })
        .unwrap();
        for bullets in [1, 3, 4, 5] {
            assert_eq!(
                all_floor.multiplier_hundredths(bullets).unwrap(),
                nearest.multiplier_hundredths(bullets).unwrap()
            );
        }
    }

    #[test]
    fn test_multiplier_above_one_and_grows_with_bullets() {
        let model = model();
        let values: Vec<u64> = (1..=5).map(|b| model.multiplier(b).unwrap()).collect();
        assert!(values.iter().all(|&m| m > model.precision()));
        assert!(values.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_precision_scaling() {
        let model = OddsModel::from_config(&GameConfig::default().with_precision(1_000_000)).unwrap();
        assert_eq!(model.multiplier(1).unwrap(), 1_170_000);
        assert_eq!(model.multiplier(5).unwrap(), 5_860_000);

        assert_eq!(to_fixed_point(117, 10), 11);
        assert_eq!(to_fixed_point(117, 1), 1);
    }

    #[test]
    fn test_full_cylinder_fails_fast() {
        let model = model();
        assert!(matches!(
            model.multiplier(6),
            Err(MathError::OutOfRange { adverse: 6, min: 1, max: 5 })
        ));
        assert!(matches!(model.multiplier(0), Err(MathError::OutOfRange { .. })));
    }

    #[test]
    fn test_survival_guard_without_range_check() {
        let model = OddsModel {
            max_adverse: 6,
            ..model()
        };
        assert!(matches!(
            model.multiplier(6),
            Err(MathError::UndefinedSurvival { adverse: 6, total_slots: 6 })
        ));
    }

    #[test]
    fn test_house_edge_is_exact_decimal() {
        let edge = HouseEdge::from_f64(0.0233).unwrap();
        assert_eq!(edge.retained(), (9_767, 10_000));
        assert_relative_eq!(edge.as_f64(), 0.0233);

        let zero = HouseEdge::from_f64(0.0).unwrap();
        assert_eq!(zero.retained(), (1, 1));
    }

    #[test]
    fn test_house_edge_finer_than_millionths() {
        // 6/5 * (1 - 0.0208334) = 1.17499992, just under the half-up boundary
        let config = GameConfig {
            house_edge: 0.0208334,
            ..GameConfig::default()
        };
        let model = OddsModel::from_config(&config).unwrap();

        assert_eq!(model.house_edge.retained(), (9_791_666, 10_000_000));
        assert_eq!(model.multiplier_hundredths(1).unwrap(), 117);
        assert_relative_eq!(model.raw_multiplier(1).unwrap(), 1.17499992, epsilon = 1e-12);
    }

    #[test]
    fn test_house_edge_rejected() {
        for edge in [1.0, 1.5, -0.1, f64::NAN, 1e-20] {
            assert!(matches!(
                HouseEdge::from_f64(edge),
                Err(MathError::Validation { parameter: "house_edge", .. })
            ));
        }
    }
}
