//! Volume Landmark Store
//!
//! Holds, per muscle group, the validated volume landmarks together with the
//! current and previous week's logged set counts. Lookups by an unknown name
//! fail with [`LiftRsError::UnknownMuscleGroup`]; landmarks are only changed
//! through [`VolumeLandmarkStore::recalibrate`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{LiftRsError, Result};
use crate::models::{VolumeLandmarks, WeeklyVolumeState};
use crate::zones::{Urgency, VolumeZone};

/// Default reference load (kg) used for rep strength drop detection
pub const DEFAULT_BASELINE_STRENGTH: f64 = 100.0;

/// Default landmarks for the tracked muscle groups
pub const DEFAULT_LANDMARKS: [(&str, VolumeLandmarks); 13] = [
    ("Chest", VolumeLandmarks { mv: 4, mev: 6, mav: 16, mrv: 22 }),
    ("Back", VolumeLandmarks { mv: 6, mev: 10, mav: 20, mrv: 25 }),
    ("Quads", VolumeLandmarks { mv: 6, mev: 10, mav: 16, mrv: 20 }),
    ("Glutes", VolumeLandmarks { mv: 0, mev: 2, mav: 12, mrv: 25 }),
    ("Hamstrings", VolumeLandmarks { mv: 4, mev: 6, mav: 16, mrv: 20 }),
    ("Shoulders", VolumeLandmarks { mv: 4, mev: 8, mav: 16, mrv: 20 }),
    ("Biceps", VolumeLandmarks { mv: 4, mev: 6, mav: 14, mrv: 20 }),
    ("Triceps", VolumeLandmarks { mv: 4, mev: 6, mav: 14, mrv: 18 }),
    ("Calves", VolumeLandmarks { mv: 6, mev: 8, mav: 16, mrv: 22 }),
    ("Abs", VolumeLandmarks { mv: 0, mev: 6, mav: 16, mrv: 25 }),
    ("Forearms", VolumeLandmarks { mv: 2, mev: 4, mav: 10, mrv: 16 }),
    ("Neck", VolumeLandmarks { mv: 0, mev: 2, mav: 8, mrv: 12 }),
    ("Traps", VolumeLandmarks { mv: 2, mev: 4, mav: 12, mrv: 16 }),
];

/// Landmarks and weekly volume of a single muscle group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuscleVolume {
    pub landmarks: VolumeLandmarks,

    #[serde(flatten)]
    pub volume: WeeklyVolumeState,

    /// Reference top-set load for strength drop detection
    #[serde(default = "default_baseline_strength")]
    pub baseline_strength: f64,
}

fn default_baseline_strength() -> f64 {
    DEFAULT_BASELINE_STRENGTH
}

impl MuscleVolume {
    fn new(landmarks: VolumeLandmarks) -> Self {
        MuscleVolume {
            landmarks,
            volume: WeeklyVolumeState::at_mev(&landmarks),
            baseline_strength: DEFAULT_BASELINE_STRENGTH,
        }
    }

    /// Zone of the current week's sets
    pub fn zone(&self) -> VolumeZone {
        VolumeZone::from_sets(self.volume.current_week_sets, &self.landmarks)
    }

    /// Current sets have reached MRV
    pub fn at_mrv(&self) -> bool {
        self.volume.current_week_sets >= self.landmarks.mrv
    }
}

/// Volume status report for one muscle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeAnalysis {
    pub muscle: String,
    pub current_sets: u32,
    pub landmarks: VolumeLandmarks,
    pub zone: VolumeZone,
    /// Current sets as a rounded percentage of MRV
    pub percentage_of_mrv: u32,
    pub recommendation: String,
    pub urgency: Urgency,
}

/// Result of checking a proposed weekly set count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeValidation {
    pub is_valid: bool,
    pub warning: Option<String>,
    pub proposed_sets: i64,
    pub landmarks: VolumeLandmarks,
}

/// Per-muscle landmarks and weekly set counts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeLandmarkStore {
    muscles: BTreeMap<String, MuscleVolume>,
}

impl VolumeLandmarkStore {
    /// Create an empty store
    pub fn new() -> Self {
        VolumeLandmarkStore {
            muscles: BTreeMap::new(),
        }
    }

    /// Create a store seeded with [`DEFAULT_LANDMARKS`], every muscle at MEV
    pub fn with_default_landmarks() -> Self {
        let muscles = DEFAULT_LANDMARKS
            .iter()
            .map(|(name, landmarks)| (name.to_string(), MuscleVolume::new(*landmarks)))
            .collect();

        VolumeLandmarkStore { muscles }
    }

    /// Add or replace a muscle group, starting its weekly volume at MEV
    pub fn insert(&mut self, muscle: impl Into<String>, landmarks: VolumeLandmarks) -> Result<()> {
        let muscle = muscle.into();
        landmarks.validate(&muscle)?;
        self.muscles.insert(muscle, MuscleVolume::new(landmarks));
        Ok(())
    }

    /// Check every stored record, e.g. after deserializing a saved state
    pub fn validate(&self) -> Result<()> {
        for (name, muscle) in &self.muscles {
            muscle.landmarks.validate(name)?;
        }
        Ok(())
    }

    pub fn get(&self, muscle: &str) -> Result<&MuscleVolume> {
        self.muscles
            .get(muscle)
            .ok_or_else(|| LiftRsError::UnknownMuscleGroup(muscle.to_string()))
    }

    fn get_mut(&mut self, muscle: &str) -> Result<&mut MuscleVolume> {
        self.muscles
            .get_mut(muscle)
            .ok_or_else(|| LiftRsError::UnknownMuscleGroup(muscle.to_string()))
    }

    pub fn contains(&self, muscle: &str) -> bool {
        self.muscles.contains_key(muscle)
    }

    pub fn landmarks(&self, muscle: &str) -> Result<VolumeLandmarks> {
        Ok(self.get(muscle)?.landmarks)
    }

    pub fn weekly_sets(&self, muscle: &str) -> Result<u32> {
        Ok(self.get(muscle)?.volume.current_week_sets)
    }

    pub fn last_week_sets(&self, muscle: &str) -> Result<u32> {
        Ok(self.get(muscle)?.volume.last_week_sets)
    }

    /// Overwrite the current week's sets
    pub fn set_weekly_sets(&mut self, muscle: &str, sets: u32) -> Result<()> {
        self.get_mut(muscle)?.volume.current_week_sets = sets;
        Ok(())
    }

    /// Add (or remove, when negative) sets, flooring at zero. Returns the new count.
    pub fn add_sets(&mut self, muscle: &str, delta: i32) -> Result<u32> {
        let entry = self.get_mut(muscle)?;
        let updated = i64::from(entry.volume.current_week_sets) + i64::from(delta);
        entry.volume.current_week_sets = updated.clamp(0, i64::from(u32::MAX)) as u32;
        Ok(entry.volume.current_week_sets)
    }

    /// Replace a muscle's landmarks, keeping its logged volume
    pub fn recalibrate(&mut self, muscle: &str, landmarks: VolumeLandmarks) -> Result<()> {
        landmarks.validate(muscle)?;
        self.get_mut(muscle)?.landmarks = landmarks;
        Ok(())
    }

    pub fn zone(&self, muscle: &str) -> Result<VolumeZone> {
        Ok(self.get(muscle)?.zone())
    }

    /// Move every muscle's current sets into last week
    pub fn roll_week(&mut self) {
        for muscle in self.muscles.values_mut() {
            muscle.volume.last_week_sets = muscle.volume.current_week_sets;
        }
    }

    /// Reset every muscle's current sets to MEV
    pub fn reset_to_mev(&mut self) {
        for muscle in self.muscles.values_mut() {
            muscle.volume.current_week_sets = muscle.landmarks.mev;
        }
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut MuscleVolume)> {
        self.muscles.iter_mut()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MuscleVolume)> {
        self.muscles.iter()
    }

    pub fn muscle_names(&self) -> impl Iterator<Item = &str> {
        self.muscles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.muscles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.muscles.is_empty()
    }

    /// Sum of current week sets over all muscles
    pub fn total_weekly_sets(&self) -> u32 {
        self.muscles.values().map(|m| m.volume.current_week_sets).sum()
    }

    /// Sum of last week's sets over all muscles
    pub fn total_last_week_sets(&self) -> u32 {
        self.muscles.values().map(|m| m.volume.last_week_sets).sum()
    }

    /// Muscles whose current sets have reached MRV
    pub fn mrv_breaches(&self) -> Vec<&str> {
        self.muscles
            .iter()
            .filter(|(_, m)| m.at_mrv())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Set the reference load used for strength drop detection
    pub fn set_baseline_strength(&mut self, muscle: &str, load: f64) -> Result<()> {
        if !load.is_finite() || load <= 0.0 {
            return Err(LiftRsError::OutOfRangeInput {
                field: "baseline_strength".to_string(),
                value: load.to_string(),
                expected: "a positive load".to_string(),
            });
        }
        self.get_mut(muscle)?.baseline_strength = load;
        Ok(())
    }

    /// Last load fell below `threshold` times the muscle's baseline
    pub fn rep_strength_drop(&self, muscle: &str, last_load: f64, threshold: f64) -> Result<bool> {
        let baseline = self.get(muscle)?.baseline_strength;
        if baseline <= 0.0 || last_load <= 0.0 {
            return Ok(false);
        }
        Ok(last_load < baseline * threshold)
    }

    /// Zone, share of MRV and guidance for a muscle's current (or a hypothetical) volume
    pub fn analyze_volume_status(&self, muscle: &str, sets: Option<u32>) -> Result<VolumeAnalysis> {
        let entry = self.get(muscle)?;
        let landmarks = entry.landmarks;
        let current_sets = sets.unwrap_or(entry.volume.current_week_sets);
        let zone = VolumeZone::from_sets(current_sets, &landmarks);

        let percentage_of_mrv = if landmarks.mrv == 0 {
            0
        } else {
            (f64::from(current_sets) / f64::from(landmarks.mrv) * 100.0).round() as u32
        };

        Ok(VolumeAnalysis {
            muscle: muscle.to_string(),
            current_sets,
            landmarks,
            zone,
            percentage_of_mrv,
            recommendation: zone.recommendation(&landmarks),
            urgency: zone.urgency(),
        })
    }

    /// Sets for a recovery session
    ///
    /// `max(round((MEV + MRV) / 2) - adjustment, ceil(MEV / 2))` where the
    /// adjustment is 2 when the trainee is ill and 1 otherwise.
    pub fn recovery_volume(&self, muscle: &str, has_illness: bool) -> Result<u32> {
        let landmarks = self.landmarks(muscle)?;
        let midpoint = (landmarks.mev + landmarks.mrv + 1) / 2;
        let adjustment = if has_illness { 2 } else { 1 };
        let floor = (landmarks.mev + 1) / 2;
        Ok(midpoint.saturating_sub(adjustment).max(floor))
    }

    /// Check a proposed weekly set count, allowing up to 20% over MRV
    pub fn validate_volume_input(&self, muscle: &str, proposed_sets: i64) -> Result<VolumeValidation> {
        let landmarks = self.landmarks(muscle)?;
        let ceiling = f64::from(landmarks.mrv) * 1.2;
        let is_valid = proposed_sets >= 0 && (proposed_sets as f64) <= ceiling;

        let warning = if proposed_sets < 0 {
            Some("Sets cannot be negative".to_string())
        } else if proposed_sets > i64::from(landmarks.mrv) {
            Some(format!("Above MRV ({}). Consider deload.", landmarks.mrv))
        } else if proposed_sets < i64::from(landmarks.mv) {
            Some(format!(
                "Below MV ({}). May not be sufficient for adaptation.",
                landmarks.mv
            ))
        } else {
            None
        };

        Ok(VolumeValidation {
            is_valid,
            warning,
            proposed_sets,
            landmarks,
        })
    }
}
