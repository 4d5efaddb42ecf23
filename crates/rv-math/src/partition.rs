//! Weight Partitioner: exact integer split of counts and weights
//!
//! A mode's simulation budget is split into a win bucket and a loss bucket
//! in the ratio `win : loss`, and the mode's weight space is split the same
//! way. Both splits floor the win share and hand the remainder to the loss
//! bucket, so counts sum to the budget and weights sum to the weight space.
//!
//! Inside a bucket every outcome receives `weight_total / count` units and
//! the first `weight_total % count` outcomes receive one extra unit.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::DEFAULT_WEIGHT_SPACE;
use crate::error::{MathError, Result};

/// Which side of the ratio a bucket holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketKind {
    Win,
    Loss,
}

impl BucketKind {
    pub fn is_win(self) -> bool {
        matches!(self, BucketKind::Win)
    }
}

impl fmt::Display for BucketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketKind::Win => write!(f, "win"),
            BucketKind::Loss => write!(f, "loss"),
        }
    }
}

/// One bucket of outcomes sharing a weight total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub kind: BucketKind,
    /// Outcomes in the bucket
    pub count: u64,
    /// Weight units shared by the bucket's outcomes
    pub weight_total: u64,
}

impl Bucket {
    /// Create a bucket, rejecting weight that cannot be spread
    pub fn new(kind: BucketKind, count: u64, weight_total: u64) -> Result<Self> {
        if count == 0 && weight_total > 0 {
            return Err(MathError::DegenerateRatio {
                bucket: kind,
                weight: weight_total,
            });
        }
        if count > weight_total {
            return Err(MathError::WeightSpaceTooSmall {
                bucket: kind,
                weight: weight_total,
                count,
            });
        }
        Ok(Self {
            kind,
            count,
            weight_total,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Weight every outcome receives
    pub fn base_weight(&self) -> u64 {
        if self.count == 0 {
            0
        } else {
            self.weight_total / self.count
        }
    }

    /// Outcomes that receive one extra unit
    pub fn remainder(&self) -> u64 {
        if self.count == 0 {
            0
        } else {
            self.weight_total % self.count
        }
    }

    /// Weight of the outcome at `index` (0-based within the bucket)
    pub fn weight_of(&self, index: u64) -> u64 {
        debug_assert!(index < self.count);
        self.base_weight() + u64::from(index < self.remainder())
    }

    /// Per-outcome weights in ascending index order
    pub fn weights(&self) -> impl Iterator<Item = u64> + '_ {
        (0..self.count).map(move |index| self.weight_of(index))
    }
}

/// A single partitioned outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionedOutcome {
    /// 1-based id, wins first
    pub id: u64,
    pub kind: BucketKind,
    pub weight: u64,
}

/// Exact split of a simulation budget and a weight space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub win: Bucket,
    pub loss: Bucket,
    pub weight_space: u64,
}

impl Partition {
    /// Total outcomes (equals the simulation budget)
    pub fn total_count(&self) -> u64 {
        self.win.count + self.loss.count
    }

    /// Total weight (equals the weight space)
    pub fn total_weight(&self) -> u64 {
        self.win.weight_total + self.loss.weight_total
    }

    /// Probability a weighted draw lands in the win bucket
    pub fn realized_win_probability(&self) -> f64 {
        self.win.weight_total as f64 / self.weight_space as f64
    }

    /// Every outcome in ascending id order: wins `1..=win.count`, then losses
    pub fn outcomes(&self) -> impl Iterator<Item = PartitionedOutcome> + '_ {
        let wins = self.win.weights().enumerate().map(|(i, weight)| PartitionedOutcome {
            id: i as u64 + 1,
            kind: BucketKind::Win,
            weight,
        });
        let offset = self.win.count;
        let losses = self.loss.weights().enumerate().map(move |(i, weight)| PartitionedOutcome {
            id: offset + i as u64 + 1,
            kind: BucketKind::Loss,
            weight,
        });
        wins.chain(losses)
    }
}

/// Partition `simulations` outcomes over the default 2^40 weight space
pub fn partition(win_ratio: u64, loss_ratio: u64, simulations: u64) -> Result<Partition> {
    partition_in(win_ratio, loss_ratio, simulations, DEFAULT_WEIGHT_SPACE)
}

/// Partition `simulations` outcomes over an explicit weight space
pub fn partition_in(
    win_ratio: u64,
    loss_ratio: u64,
    simulations: u64,
    weight_space: u64,
) -> Result<Partition> {
    let total = win_ratio as u128 + loss_ratio as u128;
    if total == 0 {
        return Err(MathError::validation("ratio", "0:0", "win + loss > 0"));
    }

    let win_count = (simulations as u128 * win_ratio as u128 / total) as u64;
    let loss_count = simulations - win_count;

    let win_weight = (weight_space as u128 * win_ratio as u128 / total) as u64;
    let loss_weight = weight_space - win_weight;

    Ok(Partition {
        win: Bucket::new(BucketKind::Win, win_count, win_weight)?,
        loss: Bucket::new(BucketKind::Loss, loss_count, loss_weight)?,
        weight_space,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_bullet_split() {
        let p = partition(5, 1, 100_000).unwrap();
        assert_eq!(p.win.count, 83_333);
        assert_eq!(p.loss.count, 16_667);
        assert_eq!(p.total_count(), 100_000);
        assert_eq!(p.win.weight_total, (1u64 << 40) * 5 / 6);
        assert_eq!(p.win.weight_total + p.loss.weight_total, 1u64 << 40);
    }

    #[test]
    fn test_bucket_weights_sum_exactly() {
        for bullets in 1..=5u64 {
            let p = partition(6 - bullets, bullets, 100_000).unwrap();
            assert_eq!(p.win.weights().sum::<u64>(), p.win.weight_total);
            assert_eq!(p.loss.weights().sum::<u64>(), p.loss.weight_total);
            assert_eq!(p.outcomes().map(|o| o.weight).sum::<u64>(), 1u64 << 40);
        }
    }

    #[test]
    fn test_remainder_goes_to_lowest_ids() {
        let bucket = Bucket::new(BucketKind::Win, 4, 10).unwrap();
        let weights: Vec<u64> = bucket.weights().collect();
        assert_eq!(weights, vec![3, 3, 2, 2]);
        assert!(weights.iter().all(|&w| w > 0));
    }

    #[test]
    fn test_outcome_ids_contiguous() {
        let p = partition_in(2, 1, 7, 1_000).unwrap();
        let ids: Vec<u64> = p.outcomes().map(|o| o.id).collect();
        assert_eq!(ids, (1..=7).collect::<Vec<_>>());
        let kinds: Vec<BucketKind> = p.outcomes().map(|o| o.kind).collect();
        assert_eq!(kinds[p.win.count as usize - 1], BucketKind::Win);
        assert_eq!(kinds[p.win.count as usize], BucketKind::Loss);
    }

    #[test]
    fn test_degenerate_ratio() {
        // One simulation at 1:5 puts zero outcomes in the win bucket
        assert!(matches!(
            partition(1, 5, 1),
            Err(MathError::DegenerateRatio {
                bucket: BucketKind::Win,
                ..
            })
        ));
        assert!(matches!(partition(0, 0, 10), Err(MathError::Validation { .. })));
    }

    #[test]
    fn test_weight_space_too_small() {
        assert!(matches!(
            partition_in(1, 1, 10, 4),
            Err(MathError::WeightSpaceTooSmall { .. })
        ));
    }

    #[test]
    fn test_realized_probability_within_bound() {
        let p = partition(4, 2, 100_000).unwrap();
        let error = (p.realized_win_probability() - 4.0 / 6.0).abs();
        assert!(error <= 1.0 / (1u64 << 40) as f64);
    }
}
