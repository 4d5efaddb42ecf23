//! Book events: deterministic narration of one simulated pull
//!
//! Each outcome is told as a `spin` event (which chamber came up and whether
//! it was loaded) followed by an `outcome` event. The chamber position is
//! derived from the outcome id alone, so regenerating a book reproduces it
//! byte for byte.

use serde::{Deserialize, Serialize};

use rv_math::BucketKind;

/// Message shown when the player survives
pub const SURVIVED_MESSAGE: &str = "Click! You survived!";

/// Message shown when the chamber was loaded
pub const DEATH_MESSAGE: &str = "BANG! Game over.";

/// What the hammer found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChamberResult {
    Empty,
    Live,
}

/// Terminal status of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Survived,
    Death,
}

/// A single book event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BookEvent {
    /// Cylinder spun and stopped on `chamber` (1-based)
    Spin {
        chamber: u32,
        result: ChamberResult,
        bullets_loaded: u32,
    },
    /// Round resolved
    Outcome {
        status: OutcomeStatus,
        message: String,
    },
}

/// Chamber shown for an outcome id: `id mod chambers + 1`
pub fn chamber_position(id: u64, total_slots: u32) -> u32 {
    (id % total_slots as u64) as u32 + 1
}

/// Events for one outcome
pub fn narrate(kind: BucketKind, bullets: u32, id: u64, total_slots: u32) -> Vec<BookEvent> {
    let chamber = chamber_position(id, total_slots);
    let (result, status, message) = match kind {
        BucketKind::Win => (ChamberResult::Empty, OutcomeStatus::Survived, SURVIVED_MESSAGE),
        BucketKind::Loss => (ChamberResult::Live, OutcomeStatus::Death, DEATH_MESSAGE),
    };

    vec![
        BookEvent::Spin {
            chamber,
            result,
            bullets_loaded: bullets,
        },
        BookEvent::Outcome {
            status,
            message: message.to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chamber_cycles() {
        assert_eq!(chamber_position(7, 6), 2);
        assert_eq!(chamber_position(5, 6), 6);
        assert_eq!(chamber_position(6, 6), 1);
        let cycle: Vec<u32> = (1..=6).map(|id| chamber_position(id, 6)).collect();
        assert_eq!(cycle, vec![2, 3, 4, 5, 6, 1]);
    }

    #[test]
    fn test_win_narration() {
        let events = narrate(BucketKind::Win, 1, 7, 6);
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            BookEvent::Spin {
                chamber: 2,
                result: ChamberResult::Empty,
                bullets_loaded: 1
            }
        );
    }

    #[test]
    fn test_wire_format() {
        let events = narrate(BucketKind::Loss, 3, 12, 6);
        let json = serde_json::to_string(&events).unwrap();
        assert_eq!(
            json,
            r#"[{"type":"spin","chamber":1,"result":"live","bullets_loaded":3},{"type":"outcome","status":"death","message":"BANG! Game over."}]"#
        );
    }

    #[test]
    fn test_narration_is_deterministic() {
        assert_eq!(
            narrate(BucketKind::Win, 4, 99, 6),
            narrate(BucketKind::Win, 4, 99, 6)
        );
    }
}
