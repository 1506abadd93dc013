//! Auto Volume Progression
//!
//! Combines zone, stimulus, set progression matrix and fatigue signals to
//! decide how weekly volume moves for each muscle group, and runs the weekly
//! batch that applies those decisions and consults the deload engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};

use crate::cycle::TrainingState;
use crate::deload::{DeloadEvaluation, DeloadPlanner, DeloadStrategy};
use crate::error::Result;
use crate::fatigue::{FatigueDetector, SfrFatigueDetector};
use crate::matrix::{progression_for_feedback, SetAction, SetProgression};
use crate::models::SessionFeedback;
use crate::stimulus::{score_feedback, StimulusScore};
use crate::zones::VolumeZone;

/// How MRV hits are counted within one week
///
/// Under [`MrvHitPolicy::PerEvent`] a muscle flagged for high fatigue that
/// also ends the week at MRV produces two hits, and every hit on a muscle at
/// MRV extends the consecutive-MRV-week streak. Under
/// [`MrvHitPolicy::OncePerMuscle`] each muscle produces at most one hit and
/// the streak grows by at most one per week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MrvHitPolicy {
    #[default]
    PerEvent,
    OncePerMuscle,
}

impl fmt::Display for MrvHitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MrvHitPolicy::PerEvent => write!(f, "per_event"),
            MrvHitPolicy::OncePerMuscle => write!(f, "once_per_muscle"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    pub mrv_hit_policy: MrvHitPolicy,
}

/// Set increment decided for one muscle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoIncrement {
    pub add: bool,
    pub delta: i32,
    pub reason: String,
}

impl AutoIncrement {
    fn hold(reason: impl Into<String>) -> Self {
        Self {
            add: false,
            delta: 0,
            reason: reason.into(),
        }
    }

    fn add_one(reason: impl Into<String>) -> Self {
        Self {
            add: true,
            delta: 1,
            reason: reason.into(),
        }
    }
}

/// Decide whether a muscle gets an extra weekly set
///
/// Nothing is added at or above MRV, when a recovery session is flagged, or in
/// the high and maximum zones. One set is added below MV with low stimulus, or
/// in the maintenance zone with low stimulus and good recovery.
pub fn auto_set_increment(
    muscle: &str,
    feedback: &SessionFeedback,
    state: &TrainingState,
) -> Result<AutoIncrement> {
    let entry = state.volumes.get(muscle)?;
    let zone = entry.zone();
    let low_stimulus = score_feedback(feedback).is_low();

    if entry.at_mrv() {
        return Ok(AutoIncrement::hold("At or above MRV"));
    }
    if feedback.recovery_session {
        return Ok(AutoIncrement::hold("Recovery session prescribed"));
    }

    let increment = match zone {
        VolumeZone::High | VolumeZone::Maximum => {
            AutoIncrement::hold(format!("Volume already in {} zone", zone))
        }
        VolumeZone::BelowMinimum if low_stimulus => {
            AutoIncrement::add_one("Low volume, low stimulus")
        }
        VolumeZone::Maintenance if low_stimulus && feedback.recovery_status.is_good() => {
            AutoIncrement::add_one("Maintenance volume, low stimulus, good recovery")
        }
        _ => AutoIncrement::hold("No progression criteria met"),
    };
    Ok(increment)
}

/// What happened to one muscle during the weekly batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuscleProgression {
    /// Sets before this batch was applied
    pub previous_sets: u32,
    pub current_sets: u32,
    pub increment: i32,
    pub reason: String,
    pub zone: VolumeZone,
    pub stimulus_score: u8,
    pub high_fatigue: bool,
}

/// Result of a weekly progression batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyProgressionReport {
    pub progression_log: BTreeMap<String, MuscleProgression>,
    pub mrv_hits: u32,
    pub evaluation: DeloadEvaluation,
    pub deload_triggered: bool,
    pub strategy: Option<DeloadStrategy>,
    pub recommendation: String,
}

/// Projected sets for a muscle's next session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRecommendation {
    pub muscle: String,
    pub current_sets: u32,
    pub projected_sets: u32,
    pub set_change: i64,
    pub advice: String,
    pub zone: VolumeZone,
    pub stimulus: StimulusScore,
    pub progression: SetProgression,
    pub target_rir: f64,
    pub deload_recommended: bool,
}

/// Runs weekly progression batches over a [`TrainingState`]
pub struct VolumeProgressor {
    config: ProgressionConfig,
    detector: Box<dyn FatigueDetector>,
    planner: DeloadPlanner,
}

impl Default for VolumeProgressor {
    fn default() -> Self {
        Self::new()
    }
}

impl VolumeProgressor {
    pub fn new() -> Self {
        Self::with_config(ProgressionConfig::default())
    }

    pub fn with_config(config: ProgressionConfig) -> Self {
        Self {
            config,
            detector: Box::new(SfrFatigueDetector::new()),
            planner: DeloadPlanner::new(),
        }
    }

    /// Replace the high-fatigue detector
    pub fn with_detector(mut self, detector: impl FatigueDetector + 'static) -> Self {
        self.detector = Box::new(detector);
        self
    }

    /// Replace the deload planner consulted after each batch
    pub fn with_planner(mut self, planner: DeloadPlanner) -> Self {
        self.planner = planner;
        self
    }

    pub fn config(&self) -> &ProgressionConfig {
        &self.config
    }

    pub fn planner(&self) -> &DeloadPlanner {
        &self.planner
    }

    /// Apply a week of feedback
    ///
    /// For each muscle with feedback: a high-fatigue result forces a recovery
    /// session and records an MRV hit; the auto increment is applied; ending
    /// the week at MRV records another hit (subject to [`MrvHitPolicy`]). The
    /// deload trigger is then evaluated and, when it fires, a strategy is
    /// chosen and executed. Every muscle is looked up before anything changes.
    pub fn process_weekly_volume_progression(
        &self,
        state: &mut TrainingState,
        weekly_feedback: &BTreeMap<String, SessionFeedback>,
    ) -> Result<WeeklyProgressionReport> {
        state.validate()?;
        for muscle in weekly_feedback.keys() {
            state.volumes.get(muscle)?;
        }

        let mut progression_log = BTreeMap::new();
        let mut mrv_hits = 0;

        for (muscle, feedback) in weekly_feedback {
            let mut feedback = feedback.clone();
            let previous_sets = state.volumes.weekly_sets(muscle)?;
            let mut muscle_hits = 0;

            let high_fatigue = self.detector.is_high_fatigue(muscle, &feedback, &state.volumes)?;
            if high_fatigue {
                feedback.recovery_session = true;
                self.record_mrv_hit(state, muscle)?;
                muscle_hits += 1;
            }

            let increment = auto_set_increment(muscle, &feedback, state)?;
            if increment.add {
                state.volumes.add_sets(muscle, increment.delta)?;
            }

            let entry = state.volumes.get(muscle)?;
            let current_sets = entry.volume.current_week_sets;
            let zone = entry.zone();
            let count_hit = match self.config.mrv_hit_policy {
                MrvHitPolicy::PerEvent => true,
                MrvHitPolicy::OncePerMuscle => muscle_hits == 0,
            };
            if entry.at_mrv() && count_hit {
                self.record_mrv_hit(state, muscle)?;
                muscle_hits += 1;
            }
            mrv_hits += muscle_hits;

            debug!(
                muscle = muscle.as_str(),
                previous_sets,
                current_sets,
                delta = increment.delta,
                reason = increment.reason.as_str(),
                "Volume progression applied"
            );

            progression_log.insert(
                muscle.clone(),
                MuscleProgression {
                    previous_sets,
                    current_sets,
                    increment: increment.delta,
                    reason: increment.reason,
                    zone,
                    stimulus_score: score_feedback(&feedback).score,
                    high_fatigue,
                },
            );
        }

        let evaluation = self.planner.evaluate_trigger(state);
        let strategy = if evaluation.should_deload {
            let strategy = self.planner.calculate_deload_strategy(state);
            info!(
                deload_type = %strategy.deload_type,
                reasons = evaluation.reasons.len(),
                "Deload triggered by weekly progression"
            );
            self.planner.execute_deload(state, &strategy)?;
            Some(strategy)
        } else {
            None
        };

        let deload_triggered = strategy.is_some();
        Ok(WeeklyProgressionReport {
            progression_log,
            mrv_hits,
            evaluation,
            deload_triggered,
            strategy,
            recommendation: if deload_triggered {
                "Deload phase initiated".to_string()
            } else {
                "Continue progression".to_string()
            },
        })
    }

    fn record_mrv_hit(&self, state: &mut TrainingState, muscle: &str) -> Result<()> {
        match self.config.mrv_hit_policy {
            MrvHitPolicy::PerEvent => state.hit_mrv(muscle),
            MrvHitPolicy::OncePerMuscle => state.hit_mrv_weekly(muscle),
        }
    }

    /// Project next session's sets for one muscle
    ///
    /// Muscles already in the optimal, high or maximum zone hold. Otherwise
    /// the set progression matrix drives the change, forced to +2 below MV
    /// when the matrix would not add, and replaced by the recovery volume when
    /// the matrix calls for a recovery session.
    pub fn recommend_next_session(
        &self,
        muscle: &str,
        feedback: &SessionFeedback,
        state: &TrainingState,
    ) -> Result<SessionRecommendation> {
        let entry = state.volumes.get(muscle)?;
        let current_sets = entry.volume.current_week_sets;
        let zone = entry.zone();
        let stimulus = score_feedback(feedback);
        let progression = progression_for_feedback(feedback);

        let (set_change, advice) = match (zone, progression.action) {
            (VolumeZone::Optimal | VolumeZone::High | VolumeZone::Maximum, _) => {
                (0, "Maintain current sets next session".to_string())
            }
            (_, SetAction::Recovery) => {
                let recovery_sets = state.volumes.recovery_volume(muscle, feedback.has_illness)?;
                (
                    i64::from(recovery_sets) - i64::from(current_sets),
                    format!("Recovery session: {} sets", recovery_sets),
                )
            }
            (VolumeZone::BelowMinimum, action) if action.set_change().unwrap_or(0) <= 0 => {
                (2, "Below minimum volume. Add sets regardless of fatigue.".to_string())
            }
            (_, action) => (
                i64::from(action.set_change().unwrap_or(0)),
                progression.advice.to_string(),
            ),
        };

        let projected_sets = (i64::from(current_sets) + set_change).max(0) as u32;

        Ok(SessionRecommendation {
            muscle: muscle.to_string(),
            current_sets,
            projected_sets,
            set_change,
            advice,
            zone,
            stimulus,
            progression,
            target_rir: state.cycle.target_rir(),
            deload_recommended: self.planner.evaluate_trigger(state).should_deload,
        })
    }
}
