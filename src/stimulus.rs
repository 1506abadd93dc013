//! Stimulus Estimator
//!
//! Scores the quality of a session's stimulus from three 0-3 ratings (mind-muscle
//! connection, pump and disruption) into a 0-9 score, and turns that score into
//! a set adjustment for the next session:
//!
//! | score | action        | set change |
//! |-------|---------------|------------|
//! | 0-3   | add sets      | +2         |
//! | 4-6   | maintain      | 0          |
//! | 7-9   | reduce sets   | -1         |
//!
//! Ratings outside 0-3 are clamped rather than rejected.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::SessionFeedback;

/// Highest value accepted for a single rating
pub const MAX_RATING: u8 = 3;

/// Direction the stimulus score pushes next session's volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StimulusAction {
    AddSets,
    Maintain,
    ReduceSets,
}

impl fmt::Display for StimulusAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StimulusAction::AddSets => write!(f, "add_sets"),
            StimulusAction::Maintain => write!(f, "maintain"),
            StimulusAction::ReduceSets => write!(f, "reduce_sets"),
        }
    }
}

/// Clamped ratings that made up the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StimulusBreakdown {
    pub mmc: u8,
    pub pump: u8,
    pub disruption: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StimulusScore {
    /// Sum of the clamped ratings, 0-9
    pub score: u8,
    pub action: StimulusAction,
    pub set_change: i32,
    pub advice: String,
    pub breakdown: StimulusBreakdown,
}

impl StimulusScore {
    /// Score of 3 or less
    pub fn is_low(&self) -> bool {
        self.score <= 3
    }
}

/// Score a session's stimulus
pub fn score_stimulus(mmc: u8, pump: u8, disruption: u8) -> StimulusScore {
    let breakdown = StimulusBreakdown {
        mmc: mmc.min(MAX_RATING),
        pump: pump.min(MAX_RATING),
        disruption: disruption.min(MAX_RATING),
    };
    let score = breakdown.mmc + breakdown.pump + breakdown.disruption;

    let (action, set_change, advice) = match score {
        0..=3 => (
            StimulusAction::AddSets,
            2,
            format!("Stimulus too low ({}/9) → Add 2 sets next session", score),
        ),
        4..=6 => (
            StimulusAction::Maintain,
            0,
            format!("Stimulus adequate ({}/9) → Keep sets the same", score),
        ),
        _ => (
            StimulusAction::ReduceSets,
            -1,
            format!("Stimulus excessive ({}/9) → Remove 1-2 sets next session", score),
        ),
    };

    StimulusScore {
        score,
        action,
        set_change,
        advice,
        breakdown,
    }
}

/// Score the stimulus ratings carried by a feedback record
pub fn score_feedback(feedback: &SessionFeedback) -> StimulusScore {
    score_stimulus(feedback.mmc, feedback.pump, feedback.disruption)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_stimulus_fixture() {
        let result = score_stimulus(1, 1, 1);
        assert_eq!(result.score, 3);
        assert_eq!(result.action, StimulusAction::AddSets);
        assert_eq!(result.set_change, 2);
        assert!(result.is_low());
    }

    #[test]
    fn test_threshold_edges() {
        assert_eq!(score_stimulus(0, 0, 0).action, StimulusAction::AddSets);
        assert_eq!(score_stimulus(2, 1, 1).action, StimulusAction::Maintain);
        assert_eq!(score_stimulus(2, 2, 2).action, StimulusAction::Maintain);

        let high = score_stimulus(3, 2, 2);
        assert_eq!(high.score, 7);
        assert_eq!(high.action, StimulusAction::ReduceSets);
        assert_eq!(high.set_change, -1);
        assert!(!high.is_low());
    }

    #[test]
    fn test_out_of_range_ratings_are_clamped() {
        let result = score_stimulus(9, 200, 3);
        assert_eq!(result.score, 9);
        assert_eq!(
            result.breakdown,
            StimulusBreakdown { mmc: 3, pump: 3, disruption: 3 }
        );
        assert!(result.advice.contains("9/9"));
    }

    #[test]
    fn test_scoring_is_deterministic() {
        for mmc in 0..=3 {
            for pump in 0..=3 {
                for disruption in 0..=3 {
                    assert_eq!(
                        score_stimulus(mmc, pump, disruption),
                        score_stimulus(mmc, pump, disruption)
                    );
                }
            }
        }
    }

    #[test]
    fn test_score_feedback() {
        let feedback = SessionFeedback::with_stimulus(2, 2, 1);
        let result = score_feedback(&feedback);
        assert_eq!(result.score, 5);
        assert_eq!(result.action.to_string(), "maintain");
    }
}
