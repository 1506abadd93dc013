//! Training cycle state
//!
//! [`TrainingCycleState`] tracks where the trainee is in the current
//! mesocycle and whether a deload is running. [`TrainingState`] bundles it with
//! the [`VolumeLandmarkStore`] and is the explicit state value threaded
//! through every engine operation. The caller owns its persistence.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LiftRsError, Result};
use crate::landmarks::VolumeLandmarkStore;
use crate::models::DeloadType;

/// Default mesocycle length in weeks
pub const DEFAULT_MESO_LENGTH: u32 = 4;

/// Target reps-in-reserve at the start of a mesocycle
pub const START_RIR: f64 = 3.0;

/// Target reps-in-reserve in the final accumulation week
pub const END_RIR: f64 = 0.5;

/// A deload currently in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveDeload {
    pub deload_type: DeloadType,

    /// Fraction of working loads to use, in (0, 1]
    pub load_reduction: Decimal,

    /// Planned length of the deload in weeks
    pub duration_weeks: u32,

    /// Deload weeks finished so far
    pub weeks_completed: u32,
}

impl ActiveDeload {
    pub fn is_complete(&self) -> bool {
        self.weeks_completed >= self.duration_weeks
    }
}

/// Mesocycle position, MRV streaks and deload phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingCycleState {
    /// Week within the current mesocycle, starting at 1
    pub week_no: u32,

    /// Completed mesocycles + 1
    pub block_no: u32,

    /// Accumulation weeks per mesocycle
    pub meso_len: u32,

    pub consecutive_mrv_weeks: u32,

    pub total_muscles_needing_recovery: u32,

    /// The MRV streak already gained a week during the current week
    #[serde(default)]
    pub mrv_week_counted: bool,

    /// `Some` while a deload is running
    pub deload: Option<ActiveDeload>,
}

impl Default for TrainingCycleState {
    fn default() -> Self {
        Self::new(DEFAULT_MESO_LENGTH)
    }
}

impl TrainingCycleState {
    pub fn new(meso_len: u32) -> Self {
        TrainingCycleState {
            week_no: 1,
            block_no: 1,
            meso_len,
            consecutive_mrv_weeks: 0,
            total_muscles_needing_recovery: 0,
            mrv_week_counted: false,
            deload: None,
        }
    }

    pub fn deload_phase(&self) -> bool {
        self.deload.is_some()
    }

    pub fn deload_type(&self) -> Option<DeloadType> {
        self.deload.map(|d| d.deload_type)
    }

    /// Fraction of working loads to lift this week; 1 outside a deload
    pub fn load_reduction(&self) -> Decimal {
        self.deload
            .map(|d| d.load_reduction)
            .unwrap_or(Decimal::ONE)
    }

    /// Target RIR, tapering linearly from 3 in week 1 to 0.5 in the last week
    pub fn target_rir(&self) -> f64 {
        if self.meso_len <= 1 {
            return START_RIR;
        }
        let rate = (START_RIR - END_RIR) / f64::from(self.meso_len - 1);
        let target = START_RIR - rate * f64::from(self.week_no.saturating_sub(1));
        target.clamp(END_RIR, START_RIR)
    }

    /// Every fourth block calls for a resensitization phase
    pub fn should_resensitize(&self) -> bool {
        self.block_no % 4 == 0
    }

    /// Current phase name
    pub fn phase_name(&self) -> &'static str {
        if self.deload_phase() {
            "deload"
        } else if self.should_resensitize() {
            "resensitization"
        } else {
            "accumulation"
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.meso_len == 0 {
            return Err(LiftRsError::Validation(
                "mesocycle length must be at least one week".to_string(),
            ));
        }
        if self.week_no == 0 || self.block_no == 0 {
            return Err(LiftRsError::Validation(
                "week and block numbers start at 1".to_string(),
            ));
        }
        if let Some(deload) = &self.deload {
            if deload.load_reduction <= Decimal::ZERO || deload.load_reduction > Decimal::ONE {
                return Err(LiftRsError::OutOfRangeInput {
                    field: "load_reduction".to_string(),
                    value: deload.load_reduction.to_string(),
                    expected: "(0, 1]".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Cycle state plus per-muscle volumes
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrainingState {
    pub cycle: TrainingCycleState,
    pub volumes: VolumeLandmarkStore,
}

impl TrainingState {
    pub fn new(cycle: TrainingCycleState, volumes: VolumeLandmarkStore) -> Result<Self> {
        let state = TrainingState { cycle, volumes };
        state.validate()?;
        Ok(state)
    }

    /// Default landmarks, default mesocycle length
    pub fn with_default_landmarks() -> Self {
        TrainingState {
            cycle: TrainingCycleState::default(),
            volumes: VolumeLandmarkStore::with_default_landmarks(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.cycle.validate()?;
        self.volumes.validate()
    }

    /// Record that a muscle needs recovery; extends the MRV streak when it sits at MRV
    ///
    /// Every hit on a muscle at MRV adds to the streak, so several muscles at
    /// MRV in one week count several times. See [`TrainingState::hit_mrv_weekly`].
    pub fn hit_mrv(&mut self, muscle: &str) -> Result<()> {
        let at_mrv = self.volumes.get(muscle)?.at_mrv();
        self.cycle.total_muscles_needing_recovery += 1;
        if at_mrv {
            self.cycle.consecutive_mrv_weeks += 1;
        }
        debug!(muscle, at_mrv, "MRV hit recorded");
        Ok(())
    }

    /// Record that a muscle needs recovery, extending the MRV streak at most once per week
    pub fn hit_mrv_weekly(&mut self, muscle: &str) -> Result<()> {
        let at_mrv = self.volumes.get(muscle)?.at_mrv();
        self.cycle.total_muscles_needing_recovery += 1;
        if at_mrv && !self.cycle.mrv_week_counted {
            self.cycle.consecutive_mrv_weeks += 1;
            self.cycle.mrv_week_counted = true;
        }
        debug!(muscle, at_mrv, "MRV hit recorded");
        Ok(())
    }

    /// Close out the week
    ///
    /// Rolls volumes into last week and clears weekly counters. During a
    /// deload the week counts towards the deload's duration and the mesocycle
    /// week does not move; otherwise the MRV streak is updated and the week
    /// advances, rolling into a new block after `meso_len` weeks.
    pub fn advance_week(&mut self) {
        self.volumes.roll_week();
        self.cycle.total_muscles_needing_recovery = 0;
        let week_counted = std::mem::take(&mut self.cycle.mrv_week_counted);

        if let Some(deload) = self.cycle.deload.as_mut() {
            deload.weeks_completed += 1;
            debug!(
                weeks_completed = deload.weeks_completed,
                duration_weeks = deload.duration_weeks,
                "Deload week completed"
            );
            return;
        }

        if self.volumes.mrv_breaches().is_empty() {
            self.cycle.consecutive_mrv_weeks = 0;
        } else if !week_counted {
            self.cycle.consecutive_mrv_weeks += 1;
        }

        self.cycle.week_no += 1;
        if self.cycle.week_no > self.cycle.meso_len {
            self.cycle.week_no = 1;
            self.cycle.block_no += 1;
            self.cycle.consecutive_mrv_weeks = 0;
            debug!(block_no = self.cycle.block_no, "Mesocycle rolled over");
        }
    }

    /// Put every muscle back at MEV without touching the cycle counters
    pub fn reinitialize_volumes(&mut self) {
        self.volumes.reset_to_mev();
    }
}
