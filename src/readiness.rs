//! Fitness-Fatigue Readiness Model
//!
//! Impulse-response model: accumulated training load builds "fitness" slowly
//! (time constant 45 days) while recent load produces "fatigue" that decays
//! quickly (15 days). Net readiness is what fitness remains once fatigue is
//! subtracted.
//!
//! Scores are `f64` rather than `Decimal`: the curves are built from `exp()`,
//! and the outputs are indicative scores, not stored money-like quantities.
//!
//! The deload-need advisory also lives here. It reads volumes relative to MRV
//! and is independent of the deload trigger in [`crate::deload`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::cycle::TrainingState;
use crate::error::{LiftRsError, Result};

/// Default fitness time constant in days
pub const DEFAULT_FITNESS_TIME_CONSTANT: f64 = 45.0;

/// Default fatigue time constant in days
pub const DEFAULT_FATIGUE_TIME_CONSTANT: f64 = 15.0;

/// Fitness is capped at this score
pub const MAX_FITNESS: f64 = 100.0;

/// Days in each load window used by [`ReadinessModel::sample_from_history`]
const LOAD_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    pub fitness_time_constant: f64,
    pub fatigue_time_constant: f64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            fitness_time_constant: DEFAULT_FITNESS_TIME_CONSTANT,
            fatigue_time_constant: DEFAULT_FATIGUE_TIME_CONSTANT,
        }
    }
}

impl ReadinessConfig {
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("fitness_time_constant", self.fitness_time_constant),
            ("fatigue_time_constant", self.fatigue_time_constant),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(LiftRsError::OutOfRangeInput {
                    field: field.to_string(),
                    value: value.to_string(),
                    expected: "a positive number of days".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Fitness, fatigue and net readiness at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadinessSample {
    pub fitness_score: f64,
    pub fatigue_score: f64,
    pub net_readiness: f64,
}

/// Training load logged on one day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyLoad {
    pub date: NaiveDate,
    pub load: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ReadinessModel {
    config: ReadinessConfig,
}

impl ReadinessModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ReadinessConfig) -> Self {
        Self { config }
    }

    /// `min(100, training_load * (1 - e^(-days / τ_fitness)))`
    pub fn fitness(&self, days: f64, training_load: f64) -> f64 {
        let days = days.max(0.0);
        (training_load * (1.0 - (-days / self.config.fitness_time_constant).exp())).min(MAX_FITNESS)
    }

    /// `max(0, recent_load * e^(-days_since_session / τ_fatigue))`
    ///
    /// A session on the same day counts as one day ago.
    pub fn fatigue(&self, days_since_session: f64, recent_load: f64) -> f64 {
        let days = if days_since_session <= 0.0 { 1.0 } else { days_since_session };
        (recent_load * (-days / self.config.fatigue_time_constant).exp()).max(0.0)
    }

    pub fn sample(
        &self,
        days: f64,
        training_load: f64,
        days_since_session: f64,
        recent_load: f64,
    ) -> ReadinessSample {
        let fitness_score = self.fitness(days, training_load);
        let fatigue_score = self.fatigue(days_since_session, recent_load);
        ReadinessSample {
            fitness_score,
            fatigue_score,
            net_readiness: (fitness_score - fatigue_score).max(0.0),
        }
    }

    /// Sample using the mesocycle week as elapsed time (`week_no * 7` days)
    pub fn sample_for_cycle(
        &self,
        state: &TrainingState,
        training_load: f64,
        days_since_session: f64,
        recent_load: f64,
    ) -> ReadinessSample {
        let days = f64::from(state.cycle.week_no) * 7.0;
        self.sample(days, training_load, days_since_session, recent_load)
    }

    /// Sample from a dated load history as of a given day
    ///
    /// Training load is the last seven days' total (ending on `as_of`), recent
    /// load the seven days before that. Elapsed days run from the first entry;
    /// days since session from the latest day with a non-zero load. Entries
    /// after `as_of` are ignored.
    pub fn sample_from_history(&self, history: &[DailyLoad], as_of: NaiveDate) -> Result<ReadinessSample> {
        if let Some(bad) = history.iter().find(|day| !day.load.is_finite() || day.load < 0.0) {
            return Err(LiftRsError::OutOfRangeInput {
                field: format!("load on {}", bad.date),
                value: bad.load.to_string(),
                expected: "a non-negative number".to_string(),
            });
        }

        let mut training_load = 0.0;
        let mut recent_load = 0.0;
        let mut first_day: Option<NaiveDate> = None;
        let mut last_session: Option<NaiveDate> = None;

        for day in history.iter().filter(|day| day.date <= as_of) {
            let age = (as_of - day.date).num_days();
            if age < LOAD_WINDOW_DAYS {
                training_load += day.load;
            } else if age < 2 * LOAD_WINDOW_DAYS {
                recent_load += day.load;
            }

            first_day = Some(first_day.map_or(day.date, |first| first.min(day.date)));
            if day.load > 0.0 {
                last_session = Some(last_session.map_or(day.date, |last| last.max(day.date)));
            }
        }

        let days = first_day.map_or(0, |first| (as_of - first).num_days()) as f64;
        let days_since_session = last_session.map_or(0, |last| (as_of - last).num_days()) as f64;

        Ok(self.sample(days, training_load, days_since_session, recent_load))
    }
}

/// When the advisory suggests deloading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryTimeline {
    Immediate,
    ThisWeek,
    NextWeek,
    Monitor,
    Continue,
}

impl fmt::Display for AdvisoryTimeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdvisoryTimeline::Immediate => write!(f, "immediate"),
            AdvisoryTimeline::ThisWeek => write!(f, "this week"),
            AdvisoryTimeline::NextWeek => write!(f, "next week"),
            AdvisoryTimeline::Monitor => write!(f, "monitor closely"),
            AdvisoryTimeline::Continue => write!(f, "continue"),
        }
    }
}

/// Per-muscle sets relative to MRV
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuscleFatigue {
    pub current_sets: u32,
    pub mrv: u32,
    /// `sets / MRV`, 0 when MRV is 0
    pub fatigue_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeloadAdvisory {
    /// Mean of the per-muscle fatigue ratios
    pub fatigue_index: f64,
    pub muscles: BTreeMap<String, MuscleFatigue>,
    /// Muscles individually above 130% of MRV
    pub high_fatigue_muscles: Vec<String>,
    pub timeline: AdvisoryTimeline,
    pub confidence: f64,
    pub needs_deload: bool,
    pub recommendations: Vec<String>,
}

/// Individual ratio above which a muscle counts as highly fatigued
const HIGH_FATIGUE_RATIO: f64 = 1.3;

/// Advise on deload need from volumes relative to MRV
///
/// `weekly_index_history` holds previously recorded weekly fatigue indices,
/// oldest first. "This week" requires at least two of the last three to
/// exceed 1.0.
pub fn analyze_deload_need(state: &TrainingState, weekly_index_history: &[f64]) -> DeloadAdvisory {
    let mut muscles = BTreeMap::new();
    let mut high_fatigue_muscles = Vec::new();
    let mut notes = Vec::new();
    let mut total_ratio = 0.0;

    for (name, muscle) in state.volumes.iter() {
        let current_sets = muscle.volume.current_week_sets;
        let mrv = muscle.landmarks.mrv;
        let fatigue_ratio = if mrv == 0 {
            0.0
        } else {
            f64::from(current_sets) / f64::from(mrv)
        };

        if fatigue_ratio > HIGH_FATIGUE_RATIO {
            high_fatigue_muscles.push(name.clone());
            notes.push(format!("{}: High fatigue ({:.0}% of MRV)", name, fatigue_ratio * 100.0));
        } else if fatigue_ratio > 1.0 {
            notes.push(format!("{}: Approaching MRV ({:.0}% of MRV)", name, fatigue_ratio * 100.0));
        }

        total_ratio += fatigue_ratio;
        muscles.insert(
            name.clone(),
            MuscleFatigue {
                current_sets,
                mrv,
                fatigue_ratio,
            },
        );
    }

    let fatigue_index = if muscles.is_empty() {
        0.0
    } else {
        total_ratio / muscles.len() as f64
    };

    let recent_high_weeks = weekly_index_history
        .iter()
        .rev()
        .take(3)
        .filter(|index| **index > 1.0)
        .count();

    let (timeline, confidence, needs_deload, headline) = if fatigue_index > HIGH_FATIGUE_RATIO {
        (
            AdvisoryTimeline::Immediate,
            0.9,
            true,
            "IMMEDIATE DELOAD NEEDED - Fatigue index critically high",
        )
    } else if fatigue_index > 1.0 && recent_high_weeks >= 2 {
        (
            AdvisoryTimeline::ThisWeek,
            0.8,
            true,
            "DELOAD RECOMMENDED - Two weeks of high fatigue",
        )
    } else if high_fatigue_muscles.len() >= 2 {
        (
            AdvisoryTimeline::NextWeek,
            0.7,
            true,
            "DELOAD SUGGESTED - Multiple muscles at high fatigue",
        )
    } else if fatigue_index > 0.9 {
        (
            AdvisoryTimeline::Monitor,
            0.6,
            false,
            "MONITOR - Approaching deload threshold",
        )
    } else {
        (
            AdvisoryTimeline::Continue,
            0.0,
            false,
            "CONTINUE - Fatigue levels manageable",
        )
    };

    let mut recommendations = vec![headline.to_string()];
    recommendations.extend(notes);

    DeloadAdvisory {
        fatigue_index,
        muscles,
        high_fatigue_muscles,
        timeline,
        confidence,
        needs_deload,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VolumeLandmarks;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn test_fitness_curve() {
        let model = ReadinessModel::new();
        let fitness = model.fitness(45.0, 100.0);
        assert!((fitness - 63.212).abs() < 0.01);
        assert_eq!(model.fitness(0.0, 100.0), 0.0);
        assert_eq!(model.fitness(10_000.0, 500.0), MAX_FITNESS);
    }

    #[test]
    fn test_fatigue_decays_with_rest() {
        let model = ReadinessModel::new();
        let mut previous = f64::MAX;
        for days in 1..30 {
            let fatigue = model.fatigue(f64::from(days), 80.0);
            assert!(fatigue < previous);
            previous = fatigue;
        }
        assert_eq!(model.fatigue(0.0, 80.0), model.fatigue(1.0, 80.0));
        assert_eq!(model.fatigue(3.0, -5.0), 0.0);
    }

    #[test]
    fn test_net_readiness_never_negative() {
        let model = ReadinessModel::new();
        let sample = model.sample(7.0, 50.0, 1.0, 200.0);
        assert!(sample.fatigue_score > sample.fitness_score);
        assert_eq!(sample.net_readiness, 0.0);

        let rested = model.sample(90.0, 100.0, 10.0, 20.0);
        assert!(
            (rested.net_readiness - (rested.fitness_score - rested.fatigue_score)).abs() < 1e-12
        );
    }

    #[test]
    fn test_custom_time_constants() {
        let model = ReadinessModel::with_config(ReadinessConfig {
            fitness_time_constant: 30.0,
            fatigue_time_constant: 10.0,
        });
        assert!((model.fitness(30.0, 100.0) - 63.212).abs() < 0.01);
        assert!(ReadinessConfig {
            fitness_time_constant: 0.0,
            fatigue_time_constant: 10.0,
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_sample_for_cycle_uses_week_number() {
        let model = ReadinessModel::new();
        let mut state = TrainingState::default();
        state.cycle.week_no = 3;
        assert_eq!(
            model.sample_for_cycle(&state, 60.0, 2.0, 30.0),
            model.sample(21.0, 60.0, 2.0, 30.0)
        );
    }

    #[test]
    fn test_sample_from_history() {
        let model = ReadinessModel::new();
        let history = vec![
            DailyLoad { date: date(1), load: 40.0 },
            DailyLoad { date: date(4), load: 30.0 },
            DailyLoad { date: date(10), load: 50.0 },
            DailyLoad { date: date(12), load: 0.0 },
            DailyLoad { date: date(20), load: 99.0 },
        ];

        // Windows: Mar 8-14 for training load, Mar 1-7 for recent load
        let sample = model.sample_from_history(&history, date(14)).unwrap();
        assert_eq!(sample, model.sample(13.0, 50.0, 4.0, 70.0));

        let empty = model.sample_from_history(&[], date(14)).unwrap();
        assert_eq!(empty.net_readiness, 0.0);

        let bad = vec![DailyLoad { date: date(2), load: -1.0 }];
        assert!(model.sample_from_history(&bad, date(14)).is_err());
    }

    fn advisory_state(chest_sets: u32, back_sets: u32) -> TrainingState {
        let mut state = TrainingState::default();
        state
            .volumes
            .insert("Chest", VolumeLandmarks { mv: 4, mev: 6, mav: 16, mrv: 20 })
            .unwrap();
        state
            .volumes
            .insert("Back", VolumeLandmarks { mv: 6, mev: 10, mav: 20, mrv: 20 })
            .unwrap();
        state.volumes.set_weekly_sets("Chest", chest_sets).unwrap();
        state.volumes.set_weekly_sets("Back", back_sets).unwrap();
        state
    }

    #[test]
    fn test_advisory_timelines() {
        let immediate = analyze_deload_need(&advisory_state(28, 28), &[]);
        assert_eq!(immediate.timeline, AdvisoryTimeline::Immediate);
        assert_eq!(immediate.confidence, 0.9);
        assert!(immediate.needs_deload);
        assert_eq!(immediate.high_fatigue_muscles.len(), 2);

        let state = advisory_state(22, 22);
        let this_week = analyze_deload_need(&state, &[1.2, 0.8, 1.1]);
        assert_eq!(this_week.timeline, AdvisoryTimeline::ThisWeek);
        assert_eq!(this_week.confidence, 0.8);

        let monitor = analyze_deload_need(&state, &[1.2, 0.8, 0.9]);
        assert_eq!(monitor.timeline, AdvisoryTimeline::Monitor);
        assert!(!monitor.needs_deload);

        let steady = analyze_deload_need(&advisory_state(10, 10), &[]);
        assert_eq!(steady.timeline, AdvisoryTimeline::Continue);
        assert!(steady.recommendations[0].starts_with("CONTINUE"));
    }

    #[test]
    fn test_advisory_next_week_for_multiple_hot_muscles() {
        let mut state = advisory_state(27, 27);
        for name in ["Quads", "Glutes", "Calves"] {
            state
                .volumes
                .insert(name, VolumeLandmarks { mv: 0, mev: 4, mav: 10, mrv: 20 })
                .unwrap();
            state.volumes.set_weekly_sets(name, 10).unwrap();
        }
        let advisory = analyze_deload_need(&state, &[]);
        assert_eq!(advisory.timeline, AdvisoryTimeline::NextWeek);
        assert_eq!(advisory.confidence, 0.7);
        assert_eq!(advisory.high_fatigue_muscles, vec!["Back", "Chest"]);
    }

    #[test]
    fn test_advisory_empty_store() {
        let advisory = analyze_deload_need(&TrainingState::default(), &[]);
        assert_eq!(advisory.fatigue_index, 0.0);
        assert_eq!(advisory.timeline, AdvisoryTimeline::Continue);
    }
}
