// Library interface for liftrs
// The CLI and the integration tests both go through these modules

pub mod config;
pub mod cycle;
pub mod deload;
pub mod error;
pub mod fatigue;
pub mod landmarks;
pub mod logging;
pub mod matrix;
pub mod models;
pub mod progression;
pub mod readiness;
pub mod stimulus;
pub mod zones;

// Re-export commonly used types for convenience
pub use models::*;
pub use config::EngineConfig;
pub use cycle::{ActiveDeload, TrainingCycleState, TrainingState};
pub use deload::{DeloadEvaluation, DeloadPlanner, DeloadStatus, DeloadStrategy};
pub use fatigue::{
    assess_overall_fatigue, assess_overreaching_risk, assess_volume_pressure, calculate_optimal_frequency,
    generate_recovery_session, FatigueDetector, SfrFatigueDetector,
};
pub use landmarks::VolumeLandmarkStore;
pub use matrix::{set_progression, SetAction, SetProgression};
pub use progression::{auto_set_increment, MrvHitPolicy, VolumeProgressor, WeeklyProgressionReport};
pub use readiness::{analyze_deload_need, DailyLoad, DeloadAdvisory, ReadinessModel, ReadinessSample};
pub use stimulus::{score_stimulus, StimulusAction, StimulusScore};
pub use zones::{classify, VolumeZone};
pub use error::{LiftRsError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
