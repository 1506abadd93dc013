//! Set Progression Matrix
//!
//! Session-to-session set adjustment looked up from soreness (rows) and
//! performance versus last session (columns: 0 worse, 1 same, 2 better,
//! 3 much better). Soreness dominates: at moderate soreness with worse
//! performance, and at high soreness unless performance improved a lot, the
//! answer is a recovery session regardless of how good the stimulus was.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::SessionFeedback;

/// What to do with next session's sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "sets", rename_all = "snake_case")]
pub enum SetAction {
    /// Add this many sets
    Add(u32),
    /// Keep the current set count
    Maintain,
    /// Replace the session with a recovery-volume session
    Recovery,
}

impl SetAction {
    /// Numeric delta for additive actions; `None` for a recovery session
    pub fn set_change(&self) -> Option<i32> {
        match self {
            SetAction::Add(sets) => Some(*sets as i32),
            SetAction::Maintain => Some(0),
            SetAction::Recovery => None,
        }
    }
}

impl fmt::Display for SetAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetAction::Add(sets) => write!(f, "add {}", sets),
            SetAction::Maintain => write!(f, "maintain"),
            SetAction::Recovery => write!(f, "recovery"),
        }
    }
}

/// A single matrix cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SetProgression {
    pub advice: &'static str,
    #[serde(flatten)]
    pub action: SetAction,
}

const fn add(sets: u32, advice: &'static str) -> SetProgression {
    SetProgression {
        advice,
        action: SetAction::Add(sets),
    }
}

const HOLD: SetProgression = SetProgression {
    advice: "Hold sets at current level",
    action: SetAction::Maintain,
};

const RECOVER: SetProgression = SetProgression {
    advice: "Do recovery session",
    action: SetAction::Recovery,
};

/// `PROGRESSION_MATRIX[soreness][performance]`
pub const PROGRESSION_MATRIX: [[SetProgression; 4]; 4] = [
    // No soreness
    [
        add(1, "Add 1 set next session"),
        add(2, "Add 2 sets next session"),
        add(2, "Add 2-3 sets next session"),
        add(3, "Add 2-3 sets next session"),
    ],
    // Mild soreness
    [
        HOLD,
        add(1, "Add 1 set next session"),
        add(2, "Add 2 sets next session"),
        add(2, "Add 2-3 sets next session"),
    ],
    // Moderate soreness
    [RECOVER, HOLD, HOLD, add(1, "Add 1 set next session")],
    // High soreness
    [RECOVER, RECOVER, RECOVER, HOLD],
];

/// Look up the progression for a soreness and performance rating, both clamped to 0-3
pub fn set_progression(soreness: u8, performance: u8) -> SetProgression {
    let row = usize::from(soreness.min(3));
    let column = usize::from(performance.min(3));
    PROGRESSION_MATRIX[row][column]
}

/// Look up the progression for a feedback record
pub fn progression_for_feedback(feedback: &SessionFeedback) -> SetProgression {
    set_progression(feedback.soreness, feedback.performance_column())
}
