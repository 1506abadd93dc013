//! Volume zone classification
//!
//! Weekly sets for a muscle fall into one of five ordinal zones bounded by
//! its landmarks, using half-open intervals:
//!
//! - `[0, MV)`: below minimum
//! - `[MV, MEV)`: maintenance
//! - `[MEV, MAV)`: optimal
//! - `[MAV, MRV)`: high
//! - `[MRV, ∞)`: maximum

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::models::VolumeLandmarks;

/// Weekly volume zone relative to a muscle's landmarks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeZone {
    BelowMinimum,
    Maintenance,
    Optimal,
    High,
    Maximum,
}

/// Attention level attached to a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Normal,
    Medium,
    High,
}

impl VolumeZone {
    /// Classify a weekly set count against validated landmarks
    pub fn classify(sets: u32, landmarks: &VolumeLandmarks) -> Result<Self> {
        landmarks.validate("landmarks")?;
        Ok(Self::from_sets(sets, landmarks))
    }

    /// Classification without re-validating landmarks the caller already checked
    pub(crate) fn from_sets(sets: u32, landmarks: &VolumeLandmarks) -> Self {
        if sets < landmarks.mv {
            VolumeZone::BelowMinimum
        } else if sets < landmarks.mev {
            VolumeZone::Maintenance
        } else if sets < landmarks.mav {
            VolumeZone::Optimal
        } else if sets < landmarks.mrv {
            VolumeZone::High
        } else {
            VolumeZone::Maximum
        }
    }

    pub fn urgency(&self) -> Urgency {
        match self {
            VolumeZone::BelowMinimum => Urgency::High,
            VolumeZone::Maintenance => Urgency::Low,
            VolumeZone::Optimal => Urgency::Normal,
            VolumeZone::High => Urgency::Medium,
            VolumeZone::Maximum => Urgency::High,
        }
    }

    /// Guidance for a muscle sitting in this zone
    pub fn recommendation(&self, landmarks: &VolumeLandmarks) -> String {
        match self {
            VolumeZone::BelowMinimum => format!(
                "Below MV ({}). Increase volume significantly.",
                landmarks.mv
            ),
            VolumeZone::Maintenance => format!(
                "In maintenance zone ({}-{}). Consider increasing for growth.",
                landmarks.mv, landmarks.mev
            ),
            VolumeZone::Optimal => format!(
                "In optimal zone ({}-{}). Continue progressive overload.",
                landmarks.mev, landmarks.mav
            ),
            VolumeZone::High => format!(
                "High volume zone ({}-{}). Monitor recovery closely.",
                landmarks.mav, landmarks.mrv
            ),
            VolumeZone::Maximum => format!(
                "At/above MRV ({}). Deload recommended.",
                landmarks.mrv
            ),
        }
    }
}

impl fmt::Display for VolumeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolumeZone::BelowMinimum => write!(f, "below minimum"),
            VolumeZone::Maintenance => write!(f, "maintenance"),
            VolumeZone::Optimal => write!(f, "optimal"),
            VolumeZone::High => write!(f, "high"),
            VolumeZone::Maximum => write!(f, "maximum"),
        }
    }
}

/// Classify `sets` against `landmarks`
pub fn classify(sets: u32, landmarks: &VolumeLandmarks) -> Result<VolumeZone> {
    VolumeZone::classify(sets, landmarks)
}
