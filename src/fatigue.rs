//! Fatigue Assessment Engine
//!
//! Read-only indices derived from the current [`TrainingState`]:
//!
//! - **Overall fatigue** (0-1): average of each muscle's position between MEV
//!   and MRV, plus a bonus for consecutive weeks at MRV and for the share of
//!   muscles that needed recovery this week.
//! - **Volume pressure** (0-1): share of muscles within two sets of MRV.
//!
//! The per-session high-fatigue check is pluggable through [`FatigueDetector`];
//! [`SfrFatigueDetector`] is the default stimulus-to-fatigue-ratio heuristic.
//!
//! Planning helpers round this out: session frequency from recovery timing or
//! weekly volume, recovery session sizing, weekly fatigue accumulation and
//! overreaching risk.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::cycle::TrainingState;
use crate::error::Result;
use crate::landmarks::VolumeLandmarkStore;
use crate::models::SessionFeedback;
use crate::zones::{Urgency, VolumeZone};

/// Last load below this share of baseline counts as a rep strength drop
pub const DEFAULT_STRENGTH_DROP_THRESHOLD: f64 = 0.97;

/// Fatigue added per consecutive week at MRV
const MRV_STREAK_WEIGHT: f64 = 0.2;
/// Cap on the MRV streak contribution
const MRV_STREAK_CAP: f64 = 0.4;
/// Weight of the share of muscles needing recovery
const RECOVERY_SHARE_WEIGHT: f64 = 0.3;
/// Sets below MRV still counted as pressing against it
const PRESSURE_MARGIN: u32 = 2;

/// Configuration for fatigue detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FatigueConfig {
    /// Share of baseline strength below which the last load signals fatigue
    pub strength_drop_threshold: f64,
}

impl Default for FatigueConfig {
    fn default() -> Self {
        Self {
            strength_drop_threshold: DEFAULT_STRENGTH_DROP_THRESHOLD,
        }
    }
}

/// Decides whether a muscle's latest session shows excessive fatigue
pub trait FatigueDetector {
    fn is_high_fatigue(
        &self,
        muscle: &str,
        feedback: &SessionFeedback,
        volumes: &VolumeLandmarkStore,
    ) -> Result<bool>;
}

/// Stimulus-to-fatigue ratio heuristic with a rep strength drop check
///
/// `fatigue = soreness + joint_ache + 2 (if performance dropped)` and
/// `stimulus = pump + disruption`. Fatigue is high when
/// `stimulus / max(fatigue, 1) <= 1`, or when the session's top-set load fell
/// below the configured share of the muscle's baseline strength.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SfrFatigueDetector {
    strength_drop_threshold: f64,
}

impl Default for SfrFatigueDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl SfrFatigueDetector {
    pub fn new() -> Self {
        Self::with_config(FatigueConfig::default())
    }

    pub fn with_config(config: FatigueConfig) -> Self {
        Self {
            strength_drop_threshold: config.strength_drop_threshold,
        }
    }

    /// Stimulus-to-fatigue ratio of a feedback record
    pub fn stimulus_to_fatigue_ratio(feedback: &SessionFeedback) -> f64 {
        let performance_penalty = if feedback.performance_change < 0 { 2 } else { 0 };
        let fatigue = feedback.soreness.min(3) + feedback.joint_ache.min(3) + performance_penalty;
        let stimulus = feedback.pump.min(3) + feedback.disruption.min(3);
        f64::from(stimulus) / f64::from(fatigue.max(1))
    }
}

impl FatigueDetector for SfrFatigueDetector {
    fn is_high_fatigue(
        &self,
        muscle: &str,
        feedback: &SessionFeedback,
        volumes: &VolumeLandmarkStore,
    ) -> Result<bool> {
        let sfr = Self::stimulus_to_fatigue_ratio(feedback);
        let strength_drop = match feedback.last_load {
            Some(load) => volumes.rep_strength_drop(muscle, load, self.strength_drop_threshold)?,
            None => {
                volumes.get(muscle)?;
                false
            }
        };

        let high = sfr <= 1.0 || strength_drop;
        if high {
            warn!(muscle, sfr, strength_drop, "High fatigue detected");
        }
        Ok(high)
    }
}

/// Overall fatigue index in `[0, 1]`
pub fn assess_overall_fatigue(state: &TrainingState) -> f64 {
    let volumes = &state.volumes;
    if volumes.is_empty() {
        return 0.0;
    }

    let total_ratio: f64 = volumes
        .iter()
        .map(|(_, muscle)| {
            let sets = muscle.volume.current_week_sets;
            let landmarks = muscle.landmarks;
            if landmarks.mrv == landmarks.mev {
                if sets >= landmarks.mrv { 1.0 } else { 0.0 }
            } else {
                let ratio = (f64::from(sets) - f64::from(landmarks.mev))
                    / f64::from(landmarks.mrv - landmarks.mev);
                ratio.clamp(0.0, 1.0)
            }
        })
        .sum();

    let muscle_count = volumes.len() as f64;
    let average = total_ratio / muscle_count;
    let streak = (f64::from(state.cycle.consecutive_mrv_weeks) * MRV_STREAK_WEIGHT).min(MRV_STREAK_CAP);
    let recovery_share = f64::from(state.cycle.total_muscles_needing_recovery) / muscle_count
        * RECOVERY_SHARE_WEIGHT;

    (average + streak + recovery_share).clamp(0.0, 1.0)
}

/// Share of muscles within two sets of their MRV, in `[0, 1]`
pub fn assess_volume_pressure(volumes: &VolumeLandmarkStore) -> f64 {
    if volumes.is_empty() {
        return 0.0;
    }

    let pressed = volumes
        .iter()
        .filter(|(_, muscle)| {
            muscle.volume.current_week_sets >= muscle.landmarks.mrv.saturating_sub(PRESSURE_MARGIN)
        })
        .count();

    pressed as f64 / volumes.len() as f64
}

/// Frequency change suggested by recovery timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyAction {
    IncreaseFrequency,
    DecreaseFrequency,
    Maintain,
    ImproveRecovery,
}

impl fmt::Display for FrequencyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrequencyAction::IncreaseFrequency => write!(f, "increase_frequency"),
            FrequencyAction::DecreaseFrequency => write!(f, "decrease_frequency"),
            FrequencyAction::Maintain => write!(f, "maintain"),
            FrequencyAction::ImproveRecovery => write!(f, "improve_recovery"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyAnalysis {
    pub soreness_recovery_days: f64,
    pub session_gap_days: f64,
    /// Recovery days over session gap, rounded to two decimals
    pub recovery_ratio: f64,
    pub action: FrequencyAction,
    /// Sessions per week to add (+1) or drop (-1)
    pub frequency_adjustment: i32,
    pub urgency: Urgency,
    pub recommendation: String,
}

/// Compare how long soreness lasts against the gap between sessions
///
/// Recovering in under 70% of the gap suggests another weekly session; still
/// being sore at 130% of the gap suggests an extra rest day. A muscle already
/// at MRV never gains frequency, and one below MV is pointed at recovery
/// methods rather than fewer sessions.
pub fn analyze_frequency(
    soreness_recovery_days: f64,
    session_gap_days: f64,
    zone: Option<VolumeZone>,
) -> FrequencyAnalysis {
    let recovery = soreness_recovery_days.max(0.0);
    let gap = session_gap_days.max(1.0);
    let ratio = recovery / gap;

    let (mut action, mut frequency_adjustment, urgency, mut recommendation) = if ratio < 0.7 {
        (
            FrequencyAction::IncreaseFrequency,
            1,
            Urgency::Medium,
            "You heal early → Add one session per week",
        )
    } else if ratio > 1.3 {
        (
            FrequencyAction::DecreaseFrequency,
            -1,
            Urgency::High,
            "Recovery lags → Insert an extra rest day",
        )
    } else {
        (FrequencyAction::Maintain, 0, Urgency::Normal, "Frequency is optimal")
    };

    match (zone, action) {
        (Some(VolumeZone::Maximum), FrequencyAction::IncreaseFrequency) => {
            action = FrequencyAction::Maintain;
            frequency_adjustment = 0;
            recommendation = "At MRV - maintain frequency despite early recovery";
        }
        (Some(VolumeZone::BelowMinimum), FrequencyAction::DecreaseFrequency) => {
            action = FrequencyAction::ImproveRecovery;
            frequency_adjustment = 0;
            recommendation = "Below MV - consider recovery methods instead of reducing frequency";
        }
        _ => {}
    }

    FrequencyAnalysis {
        soreness_recovery_days: recovery,
        session_gap_days: gap,
        recovery_ratio: (ratio * 100.0).round() / 100.0,
        action,
        frequency_adjustment,
        urgency,
        recommendation: recommendation.to_string(),
    }
}

/// Week-level wellbeing inputs for the accumulation score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeeklyFatigueMetrics {
    /// Average soreness across sessions, 0-3
    pub average_soreness: f64,
    /// Sleep quality, 1-10
    pub sleep_quality: f64,
    /// Life stress, 1-10
    pub stress_level: f64,
    pub muscles_needing_recovery: u32,
    pub consecutive_mrv_weeks: u32,
    pub performance_decline: bool,
}

impl Default for WeeklyFatigueMetrics {
    fn default() -> Self {
        Self {
            average_soreness: 1.0,
            sleep_quality: 7.0,
            stress_level: 5.0,
            muscles_needing_recovery: 0,
            consecutive_mrv_weeks: 0,
            performance_decline: false,
        }
    }
}

impl WeeklyFatigueMetrics {
    /// Metrics with the recovery counters taken from the cycle state
    pub fn from_state(state: &TrainingState) -> Self {
        Self {
            muscles_needing_recovery: state.cycle.total_muscles_needing_recovery,
            consecutive_mrv_weeks: state.cycle.consecutive_mrv_weeks,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FatigueLevel {
    Low,
    Moderate,
    High,
    Excessive,
}

impl fmt::Display for FatigueLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatigueLevel::Low => write!(f, "low"),
            FatigueLevel::Moderate => write!(f, "moderate"),
            FatigueLevel::High => write!(f, "high"),
            FatigueLevel::Excessive => write!(f, "excessive"),
        }
    }
}

/// Points contributed by each input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FatigueBreakdown {
    pub soreness: f64,
    pub sleep: f64,
    pub stress: f64,
    pub volume: f64,
    pub consecutive: f64,
    pub performance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FatigueAccumulation {
    /// Rounded 0-100 score
    pub fatigue_score: u32,
    pub fatigue_level: FatigueLevel,
    pub recommendations: Vec<String>,
    pub breakdown: FatigueBreakdown,
}

/// Score accumulated fatigue from weekly wellbeing metrics on a 0-100 scale
pub fn assess_fatigue_accumulation(metrics: &WeeklyFatigueMetrics) -> FatigueAccumulation {
    let breakdown = FatigueBreakdown {
        soreness: (metrics.average_soreness / 3.0 * 30.0).clamp(0.0, 30.0),
        sleep: (20.0 - metrics.sleep_quality / 10.0 * 20.0).clamp(0.0, 20.0),
        stress: (metrics.stress_level / 10.0 * 20.0).clamp(0.0, 20.0),
        volume: (f64::from(metrics.muscles_needing_recovery) / 12.0 * 20.0).min(20.0),
        consecutive: (f64::from(metrics.consecutive_mrv_weeks) * 5.0).min(10.0),
        performance: if metrics.performance_decline { 10.0 } else { 0.0 },
    };

    let score = breakdown.soreness
        + breakdown.sleep
        + breakdown.stress
        + breakdown.volume
        + breakdown.consecutive
        + breakdown.performance;

    let (fatigue_level, recommendations): (FatigueLevel, &[&str]) = if score <= 25.0 {
        (
            FatigueLevel::Low,
            &[
                "Continue current program",
                "Consider volume progression opportunities",
            ],
        )
    } else if score <= 50.0 {
        (
            FatigueLevel::Moderate,
            &[
                "Monitor recovery closely",
                "Ensure adequate sleep and nutrition",
            ],
        )
    } else if score <= 75.0 {
        (
            FatigueLevel::High,
            &[
                "Reduce training stress",
                "Consider recovery week",
                "Prioritize sleep and stress management",
            ],
        )
    } else {
        (
            FatigueLevel::Excessive,
            &[
                "Implement deload immediately",
                "Address sleep and lifestyle factors",
                "Consider extending deload period",
            ],
        )
    };

    FatigueAccumulation {
        fatigue_score: score.round() as u32,
        fatigue_level,
        recommendations: recommendations.iter().map(|r| r.to_string()).collect(),
        breakdown,
    }
}

/// Training experience, which bounds weekly session frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingAge {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl TrainingAge {
    /// Inclusive sessions-per-week range
    pub fn frequency_range(self) -> (u32, u32) {
        match self {
            TrainingAge::Beginner => (2, 3),
            TrainingAge::Intermediate => (2, 4),
            TrainingAge::Advanced => (3, 5),
        }
    }
}

impl fmt::Display for TrainingAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainingAge::Beginner => write!(f, "beginner"),
            TrainingAge::Intermediate => write!(f, "intermediate"),
            TrainingAge::Advanced => write!(f, "advanced"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryCapacity {
    Low,
    #[default]
    Normal,
    High,
}

impl RecoveryCapacity {
    fn multiplier(self) -> f64 {
        match self {
            RecoveryCapacity::Low => 0.8,
            RecoveryCapacity::Normal => 1.0,
            RecoveryCapacity::High => 1.2,
        }
    }
}

impl fmt::Display for RecoveryCapacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryCapacity::Low => write!(f, "low"),
            RecoveryCapacity::Normal => write!(f, "normal"),
            RecoveryCapacity::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrequencyConstraints {
    /// Training days available per week
    pub available_days: u32,
    /// Weekly sets to plan for; the muscle's current sets when `None`
    pub current_volume: Option<u32>,
    pub recovery_capacity: RecoveryCapacity,
    pub training_age: TrainingAge,
}

impl Default for FrequencyConstraints {
    fn default() -> Self {
        Self {
            available_days: 6,
            current_volume: None,
            recovery_capacity: RecoveryCapacity::default(),
            training_age: TrainingAge::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyPlan {
    pub muscle: String,
    /// Sessions per week
    pub recommended_frequency: u32,
    pub sets_per_session: u32,
    pub total_volume: u32,
    pub reasoning: Vec<String>,
    pub conservative: u32,
    pub aggressive: u32,
}

/// Sessions per week for a muscle's weekly volume
///
/// High volumes (at or above MAV) are split into sessions of about six sets,
/// productive volumes into about eight, and low volumes into about ten with at
/// least two sessions. The result is scaled by recovery capacity, capped by the
/// training-age maximum and available days, and never drops below the
/// training-age minimum.
pub fn calculate_optimal_frequency(
    muscle: &str,
    constraints: &FrequencyConstraints,
    volumes: &VolumeLandmarkStore,
) -> Result<FrequencyPlan> {
    let entry = volumes.get(muscle)?;
    let landmarks = entry.landmarks;
    let volume = constraints
        .current_volume
        .unwrap_or(entry.volume.current_week_sets);
    let (min_sessions, max_sessions) = constraints.training_age.frequency_range();

    let volume_frequency = if volume >= landmarks.mav {
        volume.div_ceil(6).min(4)
    } else if volume >= landmarks.mev {
        volume.div_ceil(8).min(3)
    } else {
        volume.div_ceil(10).max(2)
    };

    let adjusted =
        (f64::from(volume_frequency) * constraints.recovery_capacity.multiplier()).round() as u32;
    let recommended_frequency = adjusted
        .min(max_sessions)
        .min(constraints.available_days)
        .max(min_sessions);

    Ok(FrequencyPlan {
        muscle: muscle.to_string(),
        recommended_frequency,
        sets_per_session: volume.div_ceil(recommended_frequency),
        total_volume: volume,
        reasoning: vec![
            format!("{} weekly sets", volume),
            format!("{} recovery capacity", constraints.recovery_capacity),
            format!("{} training age", constraints.training_age),
            format!("{} available days", constraints.available_days),
        ],
        conservative: recommended_frequency.saturating_sub(1).max(2),
        aggressive: (recommended_frequency + 1).min(constraints.available_days),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryType {
    /// Reduced-volume session
    #[default]
    Volume,
    /// Full deload protocol
    Deload,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryOptions {
    pub has_illness: bool,
    /// Soreness 0-3
    pub soreness: u8,
    /// Reps in reserve at the end of the last session
    pub last_session_rir: f64,
    pub recovery_type: RecoveryType,
}

impl Default for RecoveryOptions {
    fn default() -> Self {
        Self {
            has_illness: false,
            soreness: 2,
            last_session_rir: 0.0,
            recovery_type: RecoveryType::Volume,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoverySession {
    pub muscle: String,
    pub recovery_type: RecoveryType,
    pub sets: u32,
    pub intensity: String,
    pub rir_target: String,
    pub duration: String,
    pub notes: Vec<String>,
}

fn scale_sets(sets: u32, factor: f64) -> u32 {
    (f64::from(sets) * factor).round() as u32
}

/// Plan a recovery session starting from the muscle's recovery volume
///
/// Sets shrink to 70% for soreness 3, then by a further 20% each for illness
/// and for a last session finished at 0.5 RIR or less. A deload replaces the
/// result with half of MEV over 3-7 days.
pub fn generate_recovery_session(
    muscle: &str,
    options: &RecoveryOptions,
    volumes: &VolumeLandmarkStore,
) -> Result<RecoverySession> {
    let landmarks = volumes.landmarks(muscle)?;
    let base_sets = volumes.recovery_volume(muscle, options.has_illness)?;

    let mut session = RecoverySession {
        muscle: muscle.to_string(),
        recovery_type: options.recovery_type,
        sets: base_sets,
        intensity: "60-70% of normal".to_string(),
        rir_target: "3-4 RIR".to_string(),
        duration: "1 session".to_string(),
        notes: Vec::new(),
    };

    if options.soreness >= 3 {
        session.sets = scale_sets(base_sets, 0.7);
        session.intensity = "50-60% of normal".to_string();
        session.rir_target = "4-5 RIR".to_string();
        session.notes.push("High soreness - very light session".to_string());
    }

    if options.has_illness {
        session.sets = scale_sets(session.sets, 0.8);
        session.intensity = "40-50% of normal".to_string();
        session.notes.push("Illness present - prioritize rest".to_string());
    }

    if options.last_session_rir <= 0.5 {
        session.sets = scale_sets(session.sets, 0.8);
        session.notes.push("Last session was very intense".to_string());
    }

    if options.recovery_type == RecoveryType::Deload {
        session.sets = scale_sets(landmarks.mev, 0.5);
        session.intensity = "40-50% of normal".to_string();
        session.duration = "3-7 days".to_string();
        session.notes.push("Full deload protocol".to_string());
    }

    Ok(session)
}

/// Multi-week trends for the overreaching check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverreachingMetrics {
    /// Weekly performance scores, oldest first
    pub weekly_performance_trend: Vec<f64>,
    /// Weekly fatigue accumulation scores (0-100), oldest first
    pub weekly_fatigue_trend: Vec<u32>,
    /// Weekly total sets, oldest first
    pub volume_progression: Vec<u32>,
    /// Motivation, 1-10
    pub motivation_level: f64,
    /// Injury risk indicators, 1-10
    pub injury_risk: f64,
}

impl Default for OverreachingMetrics {
    fn default() -> Self {
        Self {
            weekly_performance_trend: Vec::new(),
            weekly_fatigue_trend: Vec::new(),
            volume_progression: Vec::new(),
            motivation_level: 5.0,
            injury_risk: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Moderate => write!(f, "moderate"),
            RiskLevel::High => write!(f, "high"),
            RiskLevel::Critical => write!(f, "critical"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverreachingRisk {
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub requires_immediate_action: bool,
}

/// Score the risk that accumulated fatigue is turning into overreaching
///
/// Points: non-improving performance over the last three weeks (20), mean
/// fatigue score above 60 (25), volume growing by more than two sets per week
/// (15), motivation at 3 or below (15), injury risk at 7 or above (15), two or
/// more consecutive weeks at MRV (10).
pub fn assess_overreaching_risk(metrics: &OverreachingMetrics, state: &TrainingState) -> OverreachingRisk {
    let mut risk_score = 0;
    let mut risk_factors = Vec::new();

    let performance = &metrics.weekly_performance_trend;
    if performance.len() >= 2 {
        let recent = &performance[performance.len().saturating_sub(3)..];
        if recent.windows(2).all(|pair| pair[1] <= pair[0]) {
            risk_score += 20;
            risk_factors.push("Consistent performance decline");
        }
    }

    let fatigue = &metrics.weekly_fatigue_trend;
    if fatigue.len() >= 2 {
        let average = fatigue.iter().map(|score| f64::from(*score)).sum::<f64>() / fatigue.len() as f64;
        if average > 60.0 {
            risk_score += 25;
            risk_factors.push("High average fatigue");
        }
    }

    let volume = &metrics.volume_progression;
    if volume.len() >= 3 {
        let weekly_increase =
            (f64::from(volume[volume.len() - 1]) - f64::from(volume[0])) / volume.len() as f64;
        if weekly_increase > 2.0 {
            risk_score += 15;
            risk_factors.push("Rapid volume progression");
        }
    }

    if metrics.motivation_level <= 3.0 {
        risk_score += 15;
        risk_factors.push("Low motivation/enjoyment");
    }

    if metrics.injury_risk >= 7.0 {
        risk_score += 15;
        risk_factors.push("High injury risk indicators");
    }

    if state.cycle.consecutive_mrv_weeks >= 2 {
        risk_score += 10;
        risk_factors.push("Consecutive weeks at MRV");
    }

    let (risk_level, recommendations): (RiskLevel, &[&str]) = if risk_score <= 20 {
        (
            RiskLevel::Low,
            &["Continue progressive overload", "Monitor for early warning signs"],
        )
    } else if risk_score <= 40 {
        (
            RiskLevel::Moderate,
            &[
                "Slow progression rate",
                "Increase recovery focus",
                "Consider planned deload",
            ],
        )
    } else if risk_score <= 70 {
        (
            RiskLevel::High,
            &[
                "Implement deload week",
                "Address lifestyle stressors",
                "Reduce training frequency",
            ],
        )
    } else {
        (
            RiskLevel::Critical,
            &[
                "Stop training temporarily",
                "Focus on full recovery",
                "Consult with coach/healthcare provider",
            ],
        )
    };

    if risk_score > 60 {
        warn!(risk_score, %risk_level, "Overreaching risk requires action");
    }

    OverreachingRisk {
        risk_score,
        risk_level,
        risk_factors: risk_factors.iter().map(|f| f.to_string()).collect(),
        recommendations: recommendations.iter().map(|r| r.to_string()).collect(),
        requires_immediate_action: risk_score > 60,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VolumeLandmarks;

    fn chest_state(sets: u32) -> TrainingState {
        let mut state = TrainingState::default();
        state
            .volumes
            .insert("Chest", VolumeLandmarks { mv: 4, mev: 6, mav: 16, mrv: 20 })
            .unwrap();
        state.volumes.set_weekly_sets("Chest", sets).unwrap();
        state
    }

    #[test]
    fn test_overall_fatigue_volume_ratio() {
        assert_eq!(assess_overall_fatigue(&chest_state(6)), 0.0);
        assert!((assess_overall_fatigue(&chest_state(13)) - 0.5).abs() < 1e-9);
        assert_eq!(assess_overall_fatigue(&chest_state(30)), 1.0);
        assert_eq!(assess_overall_fatigue(&chest_state(2)), 0.0);
    }

    #[test]
    fn test_overall_fatigue_bonuses_and_clamp() {
        let mut state = chest_state(6);
        state.cycle.consecutive_mrv_weeks = 5;
        // Streak bonus capped at 0.4
        assert!((assess_overall_fatigue(&state) - 0.4).abs() < 1e-9);

        state.cycle.total_muscles_needing_recovery = 1;
        assert!((assess_overall_fatigue(&state) - 0.7).abs() < 1e-9);

        state.volumes.set_weekly_sets("Chest", 20).unwrap();
        assert_eq!(assess_overall_fatigue(&state), 1.0);
    }

    #[test]
    fn test_overall_fatigue_degenerate_landmarks() {
        let mut state = TrainingState::default();
        assert_eq!(assess_overall_fatigue(&state), 0.0);

        state
            .volumes
            .insert("Neck", VolumeLandmarks { mv: 2, mev: 8, mav: 8, mrv: 8 })
            .unwrap();
        state.volumes.set_weekly_sets("Neck", 7).unwrap();
        assert_eq!(assess_overall_fatigue(&state), 0.0);
        state.volumes.set_weekly_sets("Neck", 8).unwrap();
        assert_eq!(assess_overall_fatigue(&state), 1.0);
    }

    #[test]
    fn test_volume_pressure() {
        let mut state = chest_state(17);
        state
            .volumes
            .insert("Back", VolumeLandmarks { mv: 6, mev: 10, mav: 20, mrv: 25 })
            .unwrap();
        assert_eq!(assess_volume_pressure(&state.volumes), 0.0);

        state.volumes.set_weekly_sets("Chest", 18).unwrap();
        assert!((assess_volume_pressure(&state.volumes) - 0.5).abs() < 1e-9);
        assert_eq!(assess_volume_pressure(&VolumeLandmarkStore::new()), 0.0);
    }

    #[test]
    fn test_sfr_detector() {
        let state = chest_state(10);
        let detector = SfrFatigueDetector::new();

        // stimulus 4 vs fatigue 1
        let mut feedback = SessionFeedback::with_stimulus(2, 2, 2);
        feedback.soreness = 1;
        assert!(!detector.is_high_fatigue("Chest", &feedback, &state.volumes).unwrap());

        // stimulus 4 vs fatigue 1 + 1 + 2
        feedback.joint_ache = 1;
        feedback.performance_change = -1;
        assert!(detector.is_high_fatigue("Chest", &feedback, &state.volumes).unwrap());
    }

    #[test]
    fn test_sfr_detector_strength_drop() {
        let state = chest_state(10);
        let detector = SfrFatigueDetector::new();

        let mut feedback = SessionFeedback::with_stimulus(3, 3, 3);
        feedback.last_load = Some(96.0);
        assert!(detector.is_high_fatigue("Chest", &feedback, &state.volumes).unwrap());

        feedback.last_load = Some(98.0);
        assert!(!detector.is_high_fatigue("Chest", &feedback, &state.volumes).unwrap());

        let lenient = SfrFatigueDetector::with_config(FatigueConfig {
            strength_drop_threshold: 0.9,
        });
        feedback.last_load = Some(92.0);
        assert!(!lenient.is_high_fatigue("Chest", &feedback, &state.volumes).unwrap());
    }

    #[test]
    fn test_sfr_detector_unknown_muscle() {
        let state = chest_state(10);
        let feedback = SessionFeedback::with_stimulus(3, 3, 3);
        assert!(SfrFatigueDetector::new()
            .is_high_fatigue("Wings", &feedback, &state.volumes)
            .is_err());
    }

    #[test]
    fn test_analyze_frequency() {
        let early = analyze_frequency(1.0, 3.0, None);
        assert_eq!(early.action, FrequencyAction::IncreaseFrequency);
        assert_eq!(early.frequency_adjustment, 1);
        assert_eq!(early.recovery_ratio, 0.33);

        let late = analyze_frequency(4.0, 2.0, None);
        assert_eq!(late.action, FrequencyAction::DecreaseFrequency);
        assert_eq!(late.urgency, Urgency::High);

        assert_eq!(analyze_frequency(2.0, 2.0, None).action, FrequencyAction::Maintain);
    }

    #[test]
    fn test_analyze_frequency_zone_overrides() {
        let at_mrv = analyze_frequency(1.0, 3.0, Some(VolumeZone::Maximum));
        assert_eq!(at_mrv.action, FrequencyAction::Maintain);
        assert_eq!(at_mrv.frequency_adjustment, 0);

        let below = analyze_frequency(4.0, 2.0, Some(VolumeZone::BelowMinimum));
        assert_eq!(below.action, FrequencyAction::ImproveRecovery);
        assert_eq!(below.frequency_adjustment, 0);

        // Zero gap is treated as one day
        assert_eq!(analyze_frequency(0.5, 0.0, None).session_gap_days, 1.0);
    }

    #[test]
    fn test_fatigue_accumulation_levels() {
        let baseline = assess_fatigue_accumulation(&WeeklyFatigueMetrics::default());
        // 10 soreness + 6 sleep + 10 stress
        assert_eq!(baseline.fatigue_score, 26);
        assert_eq!(baseline.fatigue_level, FatigueLevel::Moderate);

        let rested = assess_fatigue_accumulation(&WeeklyFatigueMetrics {
            average_soreness: 0.0,
            sleep_quality: 10.0,
            stress_level: 2.0,
            ..WeeklyFatigueMetrics::default()
        });
        assert_eq!(rested.fatigue_level, FatigueLevel::Low);

        let wrecked = assess_fatigue_accumulation(&WeeklyFatigueMetrics {
            average_soreness: 3.0,
            sleep_quality: 3.0,
            stress_level: 8.0,
            muscles_needing_recovery: 12,
            consecutive_mrv_weeks: 3,
            performance_decline: true,
        });
        assert_eq!(wrecked.fatigue_level, FatigueLevel::Excessive);
        assert_eq!(wrecked.breakdown.consecutive, 10.0);
        assert_eq!(wrecked.breakdown.volume, 20.0);
        assert_eq!(wrecked.recommendations.len(), 3);
    }

    #[test]
    fn test_optimal_frequency_by_volume() {
        let store = VolumeLandmarkStore::with_default_landmarks();
        let constraints = FrequencyConstraints::default();

        // Chest starts at MEV (6): one session of eight, raised to the minimum of two
        let plan = calculate_optimal_frequency("Chest", &constraints, &store).unwrap();
        assert_eq!(plan.recommended_frequency, 2);
        assert_eq!(plan.sets_per_session, 3);
        assert_eq!(plan.total_volume, 6);
        assert_eq!(plan.reasoning[0], "6 weekly sets");

        let high = FrequencyConstraints {
            current_volume: Some(18),
            ..constraints
        };
        let plan = calculate_optimal_frequency("Chest", &high, &store).unwrap();
        assert_eq!(plan.recommended_frequency, 3);
        assert_eq!(plan.sets_per_session, 6);
        assert_eq!(plan.conservative, 2);
        assert_eq!(plan.aggressive, 4);

        let low = FrequencyConstraints {
            current_volume: Some(3),
            ..constraints
        };
        assert_eq!(calculate_optimal_frequency("Chest", &low, &store).unwrap().recommended_frequency, 2);

        assert!(calculate_optimal_frequency("Wings", &constraints, &store).is_err());
    }

    #[test]
    fn test_optimal_frequency_constraints() {
        let store = VolumeLandmarkStore::with_default_landmarks();

        // 4 sessions * 1.2 rounds to 5, the advanced maximum
        let advanced = FrequencyConstraints {
            current_volume: Some(24),
            recovery_capacity: RecoveryCapacity::High,
            training_age: TrainingAge::Advanced,
            ..FrequencyConstraints::default()
        };
        let plan = calculate_optimal_frequency("Chest", &advanced, &store).unwrap();
        assert_eq!(plan.recommended_frequency, 5);
        assert_eq!(plan.sets_per_session, 5);
        assert_eq!(plan.conservative, 4);
        assert_eq!(plan.aggressive, 6);

        let busy = FrequencyConstraints {
            available_days: 3,
            current_volume: Some(24),
            ..FrequencyConstraints::default()
        };
        let plan = calculate_optimal_frequency("Chest", &busy, &store).unwrap();
        assert_eq!(plan.recommended_frequency, 3);
        assert_eq!(plan.aggressive, 3);

        let tired = FrequencyConstraints {
            current_volume: Some(18),
            recovery_capacity: RecoveryCapacity::Low,
            ..FrequencyConstraints::default()
        };
        // 3 * 0.8 rounds to 2
        assert_eq!(calculate_optimal_frequency("Chest", &tired, &store).unwrap().recommended_frequency, 2);
    }

    #[test]
    fn test_recovery_session_adjustments() {
        let store = VolumeLandmarkStore::with_default_landmarks();

        // Chest recovery volume 13, cut 20% after a near-failure session
        let session = generate_recovery_session("Chest", &RecoveryOptions::default(), &store).unwrap();
        assert_eq!(session.sets, 10);
        assert_eq!(session.rir_target, "3-4 RIR");
        assert_eq!(session.notes, vec!["Last session was very intense"]);

        // Illness volume 12, then 70% for soreness and 80% for illness
        let sick = RecoveryOptions {
            has_illness: true,
            soreness: 3,
            last_session_rir: 2.0,
            ..RecoveryOptions::default()
        };
        let session = generate_recovery_session("Chest", &sick, &store).unwrap();
        assert_eq!(session.sets, 6);
        assert_eq!(session.intensity, "40-50% of normal");
        assert_eq!(session.rir_target, "4-5 RIR");
        assert_eq!(session.notes.len(), 2);
    }

    #[test]
    fn test_recovery_session_deload() {
        let store = VolumeLandmarkStore::with_default_landmarks();
        let options = RecoveryOptions {
            last_session_rir: 3.0,
            recovery_type: RecoveryType::Deload,
            ..RecoveryOptions::default()
        };
        let session = generate_recovery_session("Chest", &options, &store).unwrap();
        assert_eq!(session.sets, 3);
        assert_eq!(session.duration, "3-7 days");
        assert_eq!(session.recovery_type, RecoveryType::Deload);

        assert!(generate_recovery_session("Wings", &options, &store).is_err());
    }

    #[test]
    fn test_overreaching_risk_levels() {
        let fresh = TrainingState::with_default_landmarks();
        let low = assess_overreaching_risk(&OverreachingMetrics::default(), &fresh);
        assert_eq!(low.risk_score, 0);
        assert_eq!(low.risk_level, RiskLevel::Low);
        assert!(low.risk_factors.is_empty());

        // Flat performance counts as non-improving
        let flat = OverreachingMetrics {
            weekly_performance_trend: vec![100.0, 100.0],
            motivation_level: 3.0,
            ..OverreachingMetrics::default()
        };
        let moderate = assess_overreaching_risk(&flat, &fresh);
        assert_eq!(moderate.risk_score, 35);
        assert_eq!(moderate.risk_level, RiskLevel::Moderate);

        let strained = OverreachingMetrics {
            weekly_performance_trend: vec![95.0, 100.0, 99.0, 98.0],
            weekly_fatigue_trend: vec![70, 65],
            volume_progression: vec![10, 13, 18],
            ..OverreachingMetrics::default()
        };
        let high = assess_overreaching_risk(&strained, &fresh);
        assert_eq!(high.risk_score, 60);
        assert_eq!(high.risk_level, RiskLevel::High);
        assert!(!high.requires_immediate_action);

        let mut streaking = fresh.clone();
        streaking.cycle.consecutive_mrv_weeks = 2;
        let worst = OverreachingMetrics {
            motivation_level: 2.0,
            injury_risk: 8.0,
            ..strained
        };
        let critical = assess_overreaching_risk(&worst, &streaking);
        assert_eq!(critical.risk_score, 100);
        assert_eq!(critical.risk_level, RiskLevel::Critical);
        assert!(critical.requires_immediate_action);
        assert_eq!(critical.risk_factors.len(), 6);
    }

    #[test]
    fn test_overreaching_needs_enough_history() {
        let state = TrainingState::with_default_landmarks();
        let short = OverreachingMetrics {
            weekly_performance_trend: vec![90.0],
            weekly_fatigue_trend: vec![90],
            volume_progression: vec![5, 20],
            ..OverreachingMetrics::default()
        };
        assert_eq!(assess_overreaching_risk(&short, &state).risk_score, 0);

        let improving = OverreachingMetrics {
            weekly_performance_trend: vec![98.0, 99.0],
            ..OverreachingMetrics::default()
        };
        assert_eq!(assess_overreaching_risk(&improving, &state).risk_score, 0);
    }
}
