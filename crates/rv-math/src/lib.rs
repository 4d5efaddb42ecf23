//! # rv-math — Payout mathematics for Revolver Survival
//!
//! Derives integer payout multipliers from the cylinder odds under a fixed
//! house edge, and partitions each mode's simulation budget into win and
//! loss buckets whose integer weights sum exactly to the weight space.
//!
//! ## Architecture
//!
//! ```text
//! GameConfig ──validate──> OddsModel ──> GameMode (per bullet count)
//!                                            │
//!                                            v
//!                                  ModeTable::partition
//!                                            │
//!                                            v
//!                              Partition { win, loss } buckets
//! ```
//!
//! Nothing in this crate uses floating point on the path to a published
//! integer. Floats appear only in display values (`survival_rate`,
//! `multiplier`, `rtp`).

pub mod config;
pub mod error;
pub mod mode;
pub mod odds;
pub mod partition;
pub mod version;

pub use config::*;
pub use error::{MathError, Result};
pub use mode::*;
pub use odds::*;
pub use partition::*;
pub use version::GameVersion;
