use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use colored::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

use liftrs::config::EngineConfig;
use liftrs::deload::DeloadStatus;
use liftrs::error::{ErrorSeverity, LiftRsError};
use liftrs::fatigue::{analyze_frequency, assess_fatigue_accumulation, WeeklyFatigueMetrics};
use liftrs::logging::init_logging;
use liftrs::matrix::{set_progression, PROGRESSION_MATRIX};
use liftrs::readiness::{analyze_deload_need, DailyLoad, ReadinessSample};
use liftrs::stimulus::score_stimulus;
use liftrs::zones::VolumeZone;
use liftrs::{SessionFeedback, TrainingState, VolumeLandmarks};

/// liftrs - Training Load Management CLI
///
/// Tracks weekly hypertrophy volume against per-muscle landmarks, progresses
/// sets from session feedback, and plans deloads.
#[derive(Parser)]
#[command(name = "liftrs")]
#[command(author = "liftrs Contributors")]
#[command(version)]
#[command(about = "Training Load Management CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a fresh training state with every muscle at MEV
    Init {
        /// State file to create
        #[arg(short, long, default_value = "liftrs-state.json")]
        state: PathBuf,

        /// Overwrite an existing state file
        #[arg(long)]
        force: bool,

        /// Also write the effective configuration to the config path
        #[arg(long)]
        write_config: bool,
    },

    /// Show every muscle's volume, zone and the cycle position
    Show {
        #[arg(short, long, default_value = "liftrs-state.json")]
        state: PathBuf,
    },

    /// Classify a weekly set count into a volume zone
    Classify {
        /// Weekly hard sets
        #[arg(long)]
        sets: u32,

        /// Muscle group to look up in the state file
        #[arg(short, long, conflicts_with = "landmarks")]
        muscle: Option<String>,

        #[arg(short, long, default_value = "liftrs-state.json")]
        state: PathBuf,

        /// Explicit landmarks as MV,MEV,MAV,MRV
        #[arg(short, long, value_delimiter = ',')]
        landmarks: Option<Vec<u32>>,
    },

    /// Score a session's stimulus (each rating 0-3)
    Stimulus {
        #[arg(long)]
        mmc: u8,
        #[arg(long)]
        pump: u8,
        #[arg(long)]
        disruption: u8,
    },

    /// Look up the set progression matrix (whole table without arguments)
    Matrix {
        /// Soreness 0-3
        #[arg(long, requires = "performance")]
        soreness: Option<u8>,

        /// Performance 0 worse, 1 same, 2 better, 3 much better
        #[arg(long, requires = "soreness")]
        performance: Option<u8>,
    },

    /// Apply a week of feedback (JSON object keyed by muscle) to the state
    Week {
        #[arg(short, long, default_value = "liftrs-state.json")]
        state: PathBuf,

        /// Feedback file
        #[arg(short, long)]
        feedback: PathBuf,

        /// Close out the week after applying feedback
        #[arg(long)]
        advance: bool,
    },

    /// Project next session's sets for one muscle
    Next {
        #[arg(short, long, default_value = "liftrs-state.json")]
        state: PathBuf,

        #[arg(short, long)]
        muscle: String,

        /// Feedback file holding a single feedback record
        #[arg(short, long)]
        feedback: PathBuf,
    },

    /// Inspect or control the deload phase
    Deload {
        #[arg(short, long, default_value = "liftrs-state.json")]
        state: PathBuf,

        #[command(subcommand)]
        action: DeloadAction,
    },

    /// Fitness, fatigue and net readiness
    Readiness {
        /// Daily load history (JSON array of {date, load})
        #[arg(long, conflicts_with_all = ["training_load", "recent_load"])]
        history: Option<PathBuf>,

        /// Evaluation date for the history (YYYY-MM-DD, default today)
        #[arg(long, requires = "history")]
        as_of: Option<NaiveDate>,

        #[arg(long)]
        training_load: Option<f64>,

        #[arg(long)]
        recent_load: Option<f64>,

        /// Days of accumulated training
        #[arg(long, default_value = "28")]
        days: f64,

        /// Days since the last session
        #[arg(long, default_value = "1")]
        days_since_session: f64,
    },

    /// Weekly fatigue accumulation score, plus optional frequency check
    Fatigue {
        #[arg(short, long, default_value = "liftrs-state.json")]
        state: PathBuf,

        /// Average soreness across sessions (0-3)
        #[arg(long, default_value = "1")]
        soreness: f64,

        /// Sleep quality (1-10)
        #[arg(long, default_value = "7")]
        sleep: f64,

        /// Life stress (1-10)
        #[arg(long, default_value = "5")]
        stress: f64,

        #[arg(long)]
        performance_decline: bool,

        /// Muscle to check recovery timing for
        #[arg(short, long, requires_all = ["recovery_days", "session_gap"])]
        muscle: Option<String>,

        /// Days until soreness cleared
        #[arg(long)]
        recovery_days: Option<f64>,

        /// Days between sessions for the muscle
        #[arg(long)]
        session_gap: Option<f64>,
    },

    /// Deload-need advisory from volumes relative to MRV
    Advisory {
        #[arg(short, long, default_value = "liftrs-state.json")]
        state: PathBuf,

        /// Previous weekly fatigue indices, oldest first
        #[arg(long, value_delimiter = ',')]
        history: Vec<f64>,
    },
}

#[derive(Subcommand)]
enum DeloadAction {
    /// Show whether a deload is active, recommended or not needed
    Status,
    /// Start the recommended deload now
    Start,
    /// Leave the deload and start a fresh mesocycle
    Exit {
        /// Exit even if the planned deload weeks are not done
        #[arg(long)]
        force: bool,
    },
}

#[derive(Tabled)]
struct VolumeRow {
    #[tabled(rename = "Muscle")]
    muscle: String,
    #[tabled(rename = "Sets")]
    sets: u32,
    #[tabled(rename = "Last week")]
    last_week: u32,
    #[tabled(rename = "MV/MEV/MAV/MRV")]
    landmarks: String,
    #[tabled(rename = "Zone")]
    zone: String,
}

#[derive(Tabled)]
struct ProgressionRow {
    #[tabled(rename = "Muscle")]
    muscle: String,
    #[tabled(rename = "Before")]
    previous: u32,
    #[tabled(rename = "After")]
    current: u32,
    #[tabled(rename = "Stimulus")]
    stimulus: u8,
    #[tabled(rename = "Zone")]
    zone: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

#[derive(Tabled)]
struct MatrixRow {
    #[tabled(rename = "Soreness")]
    soreness: u8,
    #[tabled(rename = "Worse")]
    worse: String,
    #[tabled(rename = "Same")]
    same: String,
    #[tabled(rename = "Better")]
    better: String,
    #[tabled(rename = "Much better")]
    much_better: String,
}

fn load_state(path: &Path) -> Result<TrainingState> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read state file: {} (run `liftrs init` first)", path.display()))?;
    let state: TrainingState = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse state file: {}", path.display()))?;
    state
        .validate()
        .with_context(|| format!("Invalid state in {}", path.display()))?;
    Ok(state)
}

fn save_state(path: &Path, state: &TrainingState) -> Result<()> {
    let json = serde_json::to_string_pretty(state).with_context(|| "Failed to serialize state")?;
    fs::write(path, json).with_context(|| format!("Failed to write state file: {}", path.display()))?;
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse JSON: {}", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn colored_zone(zone: VolumeZone) -> ColoredString {
    let label = zone.to_string();
    match zone {
        VolumeZone::BelowMinimum => label.red(),
        VolumeZone::Maintenance => label.yellow(),
        VolumeZone::Optimal => label.green(),
        VolumeZone::High => label.yellow().bold(),
        VolumeZone::Maximum => label.red().bold(),
    }
}

fn print_volumes(state: &TrainingState) {
    let rows: Vec<VolumeRow> = state
        .volumes
        .iter()
        .map(|(name, muscle)| VolumeRow {
            muscle: name.clone(),
            sets: muscle.volume.current_week_sets,
            last_week: muscle.volume.last_week_sets,
            landmarks: format!(
                "{}/{}/{}/{}",
                muscle.landmarks.mv, muscle.landmarks.mev, muscle.landmarks.mav, muscle.landmarks.mrv
            ),
            zone: muscle.zone().to_string(),
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()));
}

fn print_readiness(sample: &ReadinessSample) {
    println!("{}", "Readiness".cyan().bold());
    println!("  Fitness:        {:.1}", sample.fitness_score);
    println!("  Fatigue:        {:.1}", sample.fatigue_score);
    let net = format!("{:.1}", sample.net_readiness);
    let net = if sample.net_readiness > 0.0 { net.green() } else { net.red() };
    println!("  Net readiness:  {}", net);
}

/// Log an engine error at its severity and print the user-facing message
fn report_engine_error(err: &LiftRsError) {
    let level = err.severity().to_tracing_level();
    if level == tracing::Level::ERROR {
        tracing::error!(error = %err, "Command failed");
    } else if level == tracing::Level::WARN {
        tracing::warn!(error = %err, "Command failed");
    } else {
        tracing::info!(error = %err, "Command failed");
    }

    let label = match err.severity() {
        ErrorSeverity::Critical | ErrorSeverity::Error => "Error:".red().bold(),
        ErrorSeverity::Warning | ErrorSeverity::Info => "Warning:".yellow().bold(),
    };
    eprintln!("{} {}", label, err.user_message());
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        if let Some(engine_err) = err.downcast_ref::<LiftRsError>() {
            report_engine_error(engine_err);
            std::process::exit(1);
        }
        return Err(err);
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = EngineConfig::load_or_default(cli.config.as_deref())?;

    let mut log_config = config.logging.clone();
    log_config.level = log_config.level.raised_by(cli.verbose);
    init_logging(&log_config)?;

    match cli.command {
        Commands::Init {
            state,
            force,
            write_config,
        } => {
            if state.exists() && !force {
                bail!(
                    "State file {} already exists (use --force to overwrite)",
                    state.display()
                );
            }

            let training_state = config.build_state()?;
            save_state(&state, &training_state)?;

            if write_config {
                let path = cli.config.clone().unwrap_or_else(EngineConfig::default_config_path);
                config.save_to_file(&path)?;
                println!("  Config: {}", path.display());
            }

            if cli.json {
                print_json(&training_state)?;
            } else {
                println!("{}", "✓ Training state initialized".green());
                println!("  State: {}", state.display());
                println!(
                    "  Muscles: {}, mesocycle length: {} weeks",
                    training_state.volumes.len(),
                    training_state.cycle.meso_len
                );
            }
        }

        Commands::Show { state } => {
            let training_state = load_state(&state)?;
            if cli.json {
                print_json(&training_state)?;
            } else {
                let cycle = &training_state.cycle;
                println!(
                    "{}",
                    format!(
                        "Block {} - week {} of {} ({})",
                        cycle.block_no,
                        cycle.week_no,
                        cycle.meso_len,
                        cycle.phase_name()
                    )
                    .bold()
                );
                println!("  Target RIR: {:.1}", cycle.target_rir());
                println!("  Consecutive MRV weeks: {}", cycle.consecutive_mrv_weeks);
                print_volumes(&training_state);
            }
        }

        Commands::Classify {
            sets,
            muscle,
            state,
            landmarks,
        } => {
            let landmarks = match (landmarks, muscle) {
                (Some(values), _) => match values.as_slice() {
                    [mv, mev, mav, mrv] => VolumeLandmarks::new(*mv, *mev, *mav, *mrv)?,
                    _ => bail!("--landmarks takes exactly four values: MV,MEV,MAV,MRV"),
                },
                (None, Some(muscle)) => load_state(&state)?.volumes.landmarks(&muscle)?,
                (None, None) => bail!("Provide either --muscle or --landmarks"),
            };

            let zone = VolumeZone::classify(sets, &landmarks)?;
            if cli.json {
                print_json(&serde_json::json!({
                    "sets": sets,
                    "landmarks": landmarks,
                    "zone": zone,
                    "urgency": zone.urgency(),
                    "recommendation": zone.recommendation(&landmarks),
                }))?;
            } else {
                println!("{} sets against {}: {}", sets, landmarks, colored_zone(zone));
                println!("  {}", zone.recommendation(&landmarks));
            }
        }

        Commands::Stimulus {
            mmc,
            pump,
            disruption,
        } => {
            let result = score_stimulus(mmc, pump, disruption);
            if cli.json {
                print_json(&result)?;
            } else {
                println!("{}", format!("Stimulus score: {}/9", result.score).bold());
                println!("  Action: {} ({:+} sets)", result.action, result.set_change);
                println!("  {}", result.advice);
            }
        }

        Commands::Matrix {
            soreness,
            performance,
        } => match (soreness, performance) {
            (Some(soreness), Some(performance)) => {
                let cell = set_progression(soreness, performance);
                if cli.json {
                    print_json(&cell)?;
                } else {
                    println!("{}: {}", cell.action.to_string().bold(), cell.advice);
                }
            }
            _ => {
                if cli.json {
                    print_json(&PROGRESSION_MATRIX)?;
                } else {
                    let rows: Vec<MatrixRow> = PROGRESSION_MATRIX
                        .iter()
                        .enumerate()
                        .map(|(soreness, row)| MatrixRow {
                            soreness: soreness as u8,
                            worse: row[0].action.to_string(),
                            same: row[1].action.to_string(),
                            better: row[2].action.to_string(),
                            much_better: row[3].action.to_string(),
                        })
                        .collect();
                    println!("{}", Table::new(rows).with(Style::rounded()));
                }
            }
        },

        Commands::Week {
            state,
            feedback,
            advance,
        } => {
            let mut training_state = load_state(&state)?;
            let weekly_feedback: BTreeMap<String, SessionFeedback> = read_json(&feedback)?;

            let progressor = config.progressor();
            let report = progressor.process_weekly_volume_progression(&mut training_state, &weekly_feedback)?;
            if advance {
                training_state.advance_week();
            }
            save_state(&state, &training_state)?;

            if cli.json {
                print_json(&report)?;
            } else {
                let rows: Vec<ProgressionRow> = report
                    .progression_log
                    .iter()
                    .map(|(muscle, entry)| ProgressionRow {
                        muscle: muscle.clone(),
                        previous: entry.previous_sets,
                        current: entry.current_sets,
                        stimulus: entry.stimulus_score,
                        zone: entry.zone.to_string(),
                        reason: entry.reason.clone(),
                    })
                    .collect();
                println!("{}", Table::new(rows).with(Style::rounded()));
                println!("  MRV hits: {}", report.mrv_hits);

                if let Some(strategy) = &report.strategy {
                    println!("{}", "⚠ Deload triggered".yellow().bold());
                    for reason in &report.evaluation.reasons {
                        println!("  - {}", reason);
                    }
                    println!("  {}", strategy.recommendation);
                } else {
                    println!("{}", format!("✓ {}", report.recommendation).green());
                }

                if advance && progressor.planner().should_exit_deload(&training_state) {
                    println!("{}", "Deload complete: run `liftrs deload exit`".cyan());
                }
            }
        }

        Commands::Next {
            state,
            muscle,
            feedback,
        } => {
            let training_state = load_state(&state)?;
            let feedback: SessionFeedback = read_json(&feedback)?;
            let recommendation = config
                .progressor()
                .recommend_next_session(&muscle, &feedback, &training_state)?;

            if cli.json {
                print_json(&recommendation)?;
            } else {
                println!(
                    "{}: {} → {} sets ({})",
                    muscle.bold(),
                    recommendation.current_sets,
                    recommendation.projected_sets,
                    colored_zone(recommendation.zone)
                );
                println!("  {}", recommendation.advice);
                println!("  {}", recommendation.stimulus.advice);
                println!("  Target RIR: {:.1}", recommendation.target_rir);
                if recommendation.deload_recommended {
                    println!("{}", "  Deload recommended".yellow());
                }
            }
        }

        Commands::Deload { state, action } => {
            let mut training_state = load_state(&state)?;
            let planner = config.planner();

            match action {
                DeloadAction::Status => {
                    let status = planner.deload_status(&training_state);
                    if cli.json {
                        print_json(&status)?;
                    } else {
                        let message = match &status {
                            DeloadStatus::Active { .. } => status.message().yellow(),
                            DeloadStatus::Recommended { .. } => status.message().red(),
                            DeloadStatus::Normal { .. } => status.message().green(),
                        };
                        println!("{}", message);
                        if let DeloadStatus::Recommended { strategy, reasons, .. } = &status {
                            for reason in reasons {
                                println!("  - {}", reason);
                            }
                            println!("  {}", strategy.recommendation);
                        }
                    }
                }
                DeloadAction::Start => {
                    if training_state.cycle.deload_phase() {
                        bail!("A deload is already in progress");
                    }
                    let strategy = planner.calculate_deload_strategy(&training_state);
                    let adjustments = planner.execute_deload(&mut training_state, &strategy)?;
                    save_state(&state, &training_state)?;

                    if cli.json {
                        print_json(&serde_json::json!({
                            "strategy": strategy,
                            "adjustments": adjustments,
                        }))?;
                    } else {
                        println!("{}", format!("✓ {} deload started", strategy.deload_type).green());
                        println!("  {}", strategy.recommendation);
                        print_volumes(&training_state);
                    }
                }
                DeloadAction::Exit { force } => {
                    if !force && !planner.should_exit_deload(&training_state) {
                        bail!("Deload is not complete yet (use --force to exit early)");
                    }
                    planner.exit_deload(&mut training_state)?;
                    save_state(&state, &training_state)?;

                    if cli.json {
                        print_json(&training_state)?;
                    } else {
                        println!(
                            "{}",
                            format!("✓ Deload finished, block {} begins", training_state.cycle.block_no).green()
                        );
                    }
                }
            }
        }

        Commands::Readiness {
            history,
            as_of,
            training_load,
            recent_load,
            days,
            days_since_session,
        } => {
            let model = config.readiness_model();
            let sample = match history {
                Some(path) => {
                    let loads: Vec<DailyLoad> = read_json(&path)?;
                    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
                    model.sample_from_history(&loads, as_of)?
                }
                None => {
                    let (Some(training_load), Some(recent_load)) = (training_load, recent_load) else {
                        bail!("Provide --history or both --training-load and --recent-load");
                    };
                    model.sample(days, training_load, days_since_session, recent_load)
                }
            };

            if cli.json {
                print_json(&sample)?;
            } else {
                print_readiness(&sample);
            }
        }

        Commands::Fatigue {
            state,
            soreness,
            sleep,
            stress,
            performance_decline,
            muscle,
            recovery_days,
            session_gap,
        } => {
            let training_state = load_state(&state)?;
            let metrics = WeeklyFatigueMetrics {
                average_soreness: soreness,
                sleep_quality: sleep,
                stress_level: stress,
                performance_decline,
                ..WeeklyFatigueMetrics::from_state(&training_state)
            };
            let accumulation = assess_fatigue_accumulation(&metrics);

            let frequency = match (muscle, recovery_days, session_gap) {
                (Some(muscle), Some(recovery_days), Some(session_gap)) => {
                    let zone = training_state.volumes.zone(&muscle)?;
                    Some(analyze_frequency(recovery_days, session_gap, Some(zone)))
                }
                _ => None,
            };

            if cli.json {
                print_json(&serde_json::json!({
                    "accumulation": accumulation,
                    "frequency": frequency,
                }))?;
            } else {
                println!(
                    "{}",
                    format!(
                        "Fatigue score {}/100 ({})",
                        accumulation.fatigue_score, accumulation.fatigue_level
                    )
                    .bold()
                );
                for line in &accumulation.recommendations {
                    println!("  - {}", line);
                }
                if let Some(frequency) = frequency {
                    println!(
                        "  Frequency: {} (recovery ratio {:.2})",
                        frequency.recommendation, frequency.recovery_ratio
                    );
                }
            }
        }

        Commands::Advisory { state, history } => {
            let training_state = load_state(&state)?;
            let advisory = analyze_deload_need(&training_state, &history);

            if cli.json {
                print_json(&advisory)?;
            } else {
                let headline = format!(
                    "Fatigue index {:.2}: {} (confidence {:.0}%)",
                    advisory.fatigue_index,
                    advisory.timeline,
                    advisory.confidence * 100.0
                );
                println!(
                    "{}",
                    if advisory.needs_deload {
                        headline.red().bold()
                    } else {
                        headline.green()
                    }
                );
                for line in &advisory.recommendations {
                    println!("  {}", line);
                }
            }
        }
    }

    Ok(())
}
