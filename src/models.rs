use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{LiftRsError, Result};

/// Weekly set-count boundaries for a muscle group
///
/// Values are hard sets per week. The engine requires
/// `mv <= mev <= mav <= mrv` and rejects anything else with
/// [`LiftRsError::InvalidLandmarks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct VolumeLandmarks {
    /// Maintenance Volume: below this the muscle loses adaptations
    pub mv: u32,

    /// Minimum Effective Volume: least volume that still produces growth
    pub mev: u32,

    /// Maximum Adaptive Volume: upper end of the productive range
    pub mav: u32,

    /// Maximum Recoverable Volume: most volume that can still be recovered from
    pub mrv: u32,
}

impl VolumeLandmarks {
    /// Create landmarks, validating the ordering invariant
    pub fn new(mv: u32, mev: u32, mav: u32, mrv: u32) -> Result<Self> {
        let landmarks = VolumeLandmarks { mv, mev, mav, mrv };
        landmarks.validate("landmarks")?;
        Ok(landmarks)
    }

    /// Check `MV <= MEV <= MAV <= MRV`, naming the muscle in the error
    pub fn validate(&self, muscle: &str) -> Result<()> {
        let pairs = [
            ("MV", self.mv, "MEV", self.mev),
            ("MEV", self.mev, "MAV", self.mav),
            ("MAV", self.mav, "MRV", self.mrv),
        ];

        for (lower_name, lower, upper_name, upper) in pairs {
            if lower > upper {
                return Err(LiftRsError::invalid_landmarks(
                    muscle,
                    format!("{}={} exceeds {}={}", lower_name, lower, upper_name, upper),
                ));
            }
        }

        Ok(())
    }
}

impl fmt::Display for VolumeLandmarks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MV {} / MEV {} / MAV {} / MRV {}",
            self.mv, self.mev, self.mav, self.mrv
        )
    }
}

/// Logged set counts for one muscle group in the current and previous week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyVolumeState {
    pub current_week_sets: u32,
    pub last_week_sets: u32,
}

impl WeeklyVolumeState {
    /// Fresh mesocycle state: both weeks start at MEV
    pub fn at_mev(landmarks: &VolumeLandmarks) -> Self {
        WeeklyVolumeState {
            current_week_sets: landmarks.mev,
            last_week_sets: landmarks.mev,
        }
    }
}

/// Self-reported recovery status of the trained muscle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStatus {
    #[default]
    Unknown,
    Recovered,
    #[serde(alias = "fully recovered")]
    FullyRecovered,
}

impl RecoveryStatus {
    /// Recovered or fully recovered
    pub fn is_good(&self) -> bool {
        matches!(self, RecoveryStatus::Recovered | RecoveryStatus::FullyRecovered)
    }
}

/// Feedback logged for a muscle group after a session
///
/// Ratings outside their documented ranges are clamped by the consumers,
/// never rejected.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionFeedback {
    /// Mind-muscle connection, 0-3
    pub mmc: u8,

    /// Pump, 0-3
    pub pump: u8,

    /// Muscle disruption / workload, 0-3
    pub disruption: u8,

    /// Soreness before the session, 0-3
    pub soreness: u8,

    /// Performance versus last session: -1 worse, 0 same, 1 better, 2 much better
    pub performance_change: i8,

    /// Joint ache, 0-3
    pub joint_ache: u8,

    pub recovery_status: RecoveryStatus,

    /// Top-set load of the session, used for rep strength drop detection
    pub last_load: Option<f64>,

    /// A recovery session has been prescribed for this muscle
    pub recovery_session: bool,

    /// Trainee is ill or injured
    pub has_illness: bool,
}

impl SessionFeedback {
    /// Feedback with only the stimulus ratings set
    pub fn with_stimulus(mmc: u8, pump: u8, disruption: u8) -> Self {
        SessionFeedback {
            mmc,
            pump,
            disruption,
            ..SessionFeedback::default()
        }
    }

    /// Set progression matrix column for the performance change (0 = worse .. 3 = much better)
    pub fn performance_column(&self) -> u8 {
        (i16::from(self.performance_change) + 1).clamp(0, 3) as u8
    }
}

/// Depth of a deload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeloadType {
    Light,
    Standard,
    Deep,
}

impl fmt::Display for DeloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeloadType::Light => write!(f, "light"),
            DeloadType::Standard => write!(f, "standard"),
            DeloadType::Deep => write!(f, "deep"),
        }
    }
}
