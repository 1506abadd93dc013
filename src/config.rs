use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cycle::{TrainingCycleState, TrainingState, DEFAULT_MESO_LENGTH};
use crate::deload::{DeloadConfig, DeloadPlanner};
use crate::fatigue::{FatigueConfig, SfrFatigueDetector};
use crate::landmarks::{VolumeLandmarkStore, DEFAULT_LANDMARKS};
use crate::logging::LogConfig;
use crate::models::VolumeLandmarks;
use crate::progression::{ProgressionConfig, VolumeProgressor};
use crate::readiness::{ReadinessConfig, ReadinessModel};

/// Engine configuration, stored as TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Mesocycle settings
    pub cycle: CycleSettings,

    /// Volume landmarks per muscle group
    pub landmarks: BTreeMap<String, VolumeLandmarks>,

    /// MRV hit counting
    pub progression: ProgressionConfig,

    /// High-fatigue detection
    pub fatigue: FatigueConfig,

    /// Deload strategy selection
    pub deload: DeloadConfig,

    /// Fitness-fatigue time constants
    pub readiness: ReadinessConfig,

    pub logging: LogConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleSettings {
    /// Accumulation weeks per mesocycle
    pub meso_len: u32,
}

impl Default for CycleSettings {
    fn default() -> Self {
        Self {
            meso_len: DEFAULT_MESO_LENGTH,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            cycle: CycleSettings::default(),
            landmarks: DEFAULT_LANDMARKS
                .iter()
                .map(|(name, landmarks)| (name.to_string(), *landmarks))
                .collect(),
            progression: ProgressionConfig::default(),
            fatigue: FatigueConfig::default(),
            deload: DeloadConfig::default(),
            readiness: ReadinessConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: EngineConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML configuration: {}", path.as_ref().display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file, creating parent directories
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// `~/.liftrs/config.toml`
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".liftrs")
            .join("config.toml")
    }

    /// Load from `path` (or the default path), falling back to defaults when the file does not exist
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.cycle.meso_len == 0 {
            bail!("cycle.meso_len must be at least 1");
        }
        if self.landmarks.is_empty() {
            bail!("at least one muscle group needs landmarks");
        }
        for (muscle, landmarks) in &self.landmarks {
            landmarks
                .validate(muscle)
                .with_context(|| format!("Invalid landmarks for {}", muscle))?;
        }

        let threshold = self.fatigue.strength_drop_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            bail!(
                "fatigue.strength_drop_threshold must be in (0, 1], got {}",
                threshold
            );
        }

        self.readiness
            .validate()
            .with_context(|| "Invalid readiness configuration")?;
        Ok(())
    }

    /// Fresh training state: week 1, every configured muscle at MEV
    pub fn build_state(&self) -> Result<TrainingState> {
        self.validate()?;

        let mut volumes = VolumeLandmarkStore::new();
        for (muscle, landmarks) in &self.landmarks {
            volumes.insert(muscle.clone(), *landmarks)?;
        }

        Ok(TrainingState::new(
            TrainingCycleState::new(self.cycle.meso_len),
            volumes,
        )?)
    }

    pub fn progressor(&self) -> VolumeProgressor {
        VolumeProgressor::with_config(self.progression)
            .with_detector(SfrFatigueDetector::with_config(self.fatigue))
            .with_planner(self.planner())
    }

    pub fn planner(&self) -> DeloadPlanner {
        DeloadPlanner::with_config(self.deload)
    }

    pub fn readiness_model(&self) -> ReadinessModel {
        ReadinessModel::with_config(self.readiness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::MrvHitPolicy;
    use tempfile::tempdir;

    #[test]
    fn test_config_serialization() {
        let config = EngineConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: EngineConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config, deserialized);
        assert_eq!(deserialized.landmarks.len(), 13);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            [cycle]
            meso_len = 6

            [progression]
            mrv_hit_policy = "once_per_muscle"

            [landmarks.Chest]
            MV = 4
            MEV = 6
            MAV = 16
            MRV = 20
            "#,
        )
        .unwrap();

        assert_eq!(config.cycle.meso_len, 6);
        assert_eq!(config.progression.mrv_hit_policy, MrvHitPolicy::OncePerMuscle);
        assert_eq!(config.landmarks.len(), 1);
        assert_eq!(config.readiness.fitness_time_constant, 45.0);
        assert_eq!(config.deload.advanced_block_threshold, 20);
    }

    #[test]
    fn test_config_file_io() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut original = EngineConfig::default();
        original.cycle.meso_len = 5;
        original.save_to_file(&config_path).unwrap();

        let loaded = EngineConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let temp_dir = tempdir().unwrap();
        let missing = temp_dir.path().join("absent.toml");
        let config = EngineConfig::load_or_default(Some(&missing)).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(
            &config_path,
            "[landmarks.Chest]\nMV = 8\nMEV = 6\nMAV = 16\nMRV = 20\n",
        )
        .unwrap();

        let err = EngineConfig::load_or_default(Some(&config_path)).unwrap_err();
        assert!(format!("{:#}", err).contains("Chest"));

        let mut config = EngineConfig::default();
        config.fatigue.strength_drop_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_build_state() {
        let mut config = EngineConfig::default();
        config.cycle.meso_len = 6;
        let state = config.build_state().unwrap();

        assert_eq!(state.cycle.meso_len, 6);
        assert_eq!(state.cycle.week_no, 1);
        assert_eq!(state.volumes.len(), 13);
        assert_eq!(state.volumes.weekly_sets("Chest").unwrap(), 6);
    }
}
