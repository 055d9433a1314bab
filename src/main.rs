//! copyrank CLI
//!
//! Scores copy-trading candidates from evaluation files and leaderboard
//! snapshots against conservative, moderate and aggressive risk profiles.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use copyrank::report::{analyze_all_profiles, LeaderboardReport};
use copyrank::{
    AnalyzerConfig, ConsolidatedReport, EvaluationAnalyzer, EvaluationRecord, FilterOverrides, HardFilter,
    LeaderboardAnalyzer, LeaderboardSnapshot, RiskProfile,
};

/// Copy-trading candidate scoring CLI.
#[derive(Parser)]
#[command(name = "copyrank", version)]
#[command(about = "Score and rank copy-trading candidates against risk profiles", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", env = "COPYRANK_LOG_LEVEL")]
    log_level: String,

    /// Risk-free rate (%) subtracted from ROI in the risk-adjusted return
    #[arg(long, default_value_t = 0.0, env = "COPYRANK_RISK_FREE_RATE", global = true)]
    risk_free_rate: f64,

    #[command(subcommand)]
    command: Commands,
}

/// Ad hoc bounds on top of the profile table.
#[derive(Args, Debug, Clone, Default)]
struct OverrideArgs {
    /// Override the profile's minimum ROI (%)
    #[arg(long, env = "COPYRANK_MIN_ROI")]
    min_roi: Option<f64>,

    /// Override the profile's drawdown ceiling (%)
    #[arg(long, env = "COPYRANK_MAX_DRAWDOWN")]
    max_drawdown: Option<f64>,

    /// Override the profile's minimum win rate (%)
    #[arg(long, env = "COPYRANK_MIN_WIN_RATE")]
    min_win_rate: Option<f64>,
}

impl From<OverrideArgs> for FilterOverrides {
    fn from(args: OverrideArgs) -> Self {
        Self {
            min_roi: args.min_roi,
            max_drawdown: args.max_drawdown,
            min_win_rate: args.min_win_rate,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze evaluation files (one file: detailed breakdown; several: ranking)
    Analyze {
        /// Evaluation JSON files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Risk profile to score under (unknown names score as moderate)
        #[arg(short, long, default_value = "moderate", env = "COPYRANK_PROFILE")]
        profile: String,

        /// Drop traders that fail the profile's hard filters before ranking
        #[arg(long)]
        screen: bool,

        /// Write the ranking report to this JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        overrides: OverrideArgs,
    },

    /// Analyze a leaderboard snapshot
    Leaderboard {
        /// Snapshot file (default: newest leaderboard_*.json in --data-dir)
        #[arg(short, long)]
        snapshot: Option<PathBuf>,

        /// Directory holding collected snapshots
        #[arg(long, default_value = "data/leaderboard", env = "COPYRANK_DATA_DIR")]
        data_dir: PathBuf,

        /// Risk profile (conservative, moderate, aggressive)
        #[arg(short, long, default_value = "moderate", env = "COPYRANK_PROFILE")]
        profile: String,

        /// Analyze under all three profiles (ignores --profile)
        #[arg(long)]
        all_profiles: bool,

        /// Export only the best N candidates
        #[arg(short, long)]
        top: Option<usize>,

        /// Write the report to this JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        overrides: OverrideArgs,
    },

    /// Consolidate a directory of evaluation files into one report
    Consolidate {
        /// Directory with evaluation files
        #[arg(short, long, conflicts_with = "month")]
        directory: Option<PathBuf>,

        /// Month to consolidate (YYYY-MM), read from evaluations/<month>
        #[arg(short, long)]
        month: Option<String>,

        /// Only include evaluations for this risk profile
        #[arg(short, long)]
        profile: Option<String>,

        /// Write the consolidated report to this JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the risk profile tables
    Profiles,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Logs go to stderr so reports can be piped
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level.to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let base_config = AnalyzerConfig {
        risk_free_rate: cli.risk_free_rate,
        ..Default::default()
    };

    match cli.command {
        Commands::Analyze {
            files,
            profile,
            screen,
            output,
            overrides,
        } => {
            let config = AnalyzerConfig {
                overrides: overrides.into(),
                ..base_config
            };

            let mut analyzer = EvaluationAnalyzer::new(&profile, &config);
            if screen {
                analyzer = analyzer.with_screen(HardFilter::from_name(&profile)?.with_overrides(&config.overrides));
            }

            if let [file] = files.as_slice() {
                let record: EvaluationRecord = load_json(file)?;
                let analysis = analyzer.analyze_single(&record);
                println!("{analysis}");
                if let Some(path) = output {
                    write_json(&path, &analysis)?;
                }
                return Ok(());
            }

            let records = load_evaluations(&files);
            if records.is_empty() {
                bail!("No valid evaluation files could be loaded");
            }

            let report = analyzer.analyze(&records, Utc::now());
            println!("{report}");

            if let Some(path) = output {
                write_json(&path, &report)?;
            }
        }

        Commands::Leaderboard {
            snapshot,
            data_dir,
            profile,
            all_profiles,
            top,
            output,
            overrides,
        } => {
            let config = AnalyzerConfig {
                top_n: top,
                overrides: overrides.into(),
                ..base_config
            };

            let path = match snapshot {
                Some(path) => path,
                None => latest_snapshot(&data_dir)?,
            };
            info!(path = %path.display(), "Loading snapshot");

            let raw: serde_json::Value = load_json(&path)?;
            let snapshot = LeaderboardSnapshot::parse(&raw)
                .with_context(|| format!("Unusable snapshot {}", path.display()))?;
            if !snapshot.skipped.is_empty() {
                warn!(skipped = snapshot.skipped.len(), "Some leaderboard entries were malformed");
            }

            let now = Utc::now();
            let mut reports = if all_profiles {
                analyze_all_profiles(&snapshot, &config, now)
            } else {
                vec![LeaderboardAnalyzer::new(&profile, &config)?.analyze(&snapshot, now)]
            };

            for report in &mut reports {
                if let Some(n) = config.top_n {
                    report.truncate(n);
                }
                println!("{report}");
            }

            if let Some(path) = output {
                match reports.as_slice() {
                    [single] => write_json(&path, single)?,
                    many => write_profile_reports(&path, many)?,
                }
            }
        }

        Commands::Consolidate {
            directory,
            month,
            profile,
            output,
        } => {
            let directory = match (directory, month) {
                (Some(dir), _) => dir,
                (None, Some(month)) => Path::new("evaluations").join(month),
                (None, None) => bail!("Specify --directory or --month"),
            };
            let filter = profile.as_deref().map(str::parse::<RiskProfile>).transpose()?;

            let files = evaluation_files(&directory)?;
            let records = load_evaluations(&files);
            if records.is_empty() {
                bail!("No evaluations found in {}", directory.display());
            }
            info!(count = records.len(), directory = %directory.display(), "Loaded evaluations");

            let report = ConsolidatedReport::build(&records, filter, &base_config, Utc::now());
            if report.traders_ranking.is_empty() {
                bail!("No evaluations left to consolidate after the profile filter");
            }
            println!("{report}");

            if let Some(path) = output {
                write_json(&path, &report)?;
            }
        }

        Commands::Profiles => {
            println!(
                "\n{:<14} {:>12} {:>8} {:>8} {:>10} {:>10} {:>6}",
                "PROFILE", "ROI", "MAX DD", "MIN WR", "LEVERAGE", "FOLLOWERS", "DAYS"
            );
            println!("{}", "-".repeat(74));
            for profile in RiskProfile::ALL {
                let l = profile.limits();
                println!(
                    "{:<14} {:>12} {:>7}% {:>7}% {:>10} {:>10} {:>6}",
                    profile.as_str(),
                    format!("{}-{}%", l.min_roi, l.max_roi),
                    l.max_drawdown,
                    l.min_win_rate,
                    format!("{}-{}x", l.min_leverage, l.max_leverage),
                    l.min_followers,
                    l.min_days_active,
                );
            }

            println!(
                "\n{:<14} {:>8} {:>8} {:>8} {:>12} {:>8}",
                "WEIGHTS", "DD", "WR", "ROI", "CONSISTENCY", "RAR"
            );
            println!("{}", "-".repeat(64));
            for profile in RiskProfile::ALL {
                let w = profile.weights();
                println!(
                    "{:<14} {:>8.2} {:>8.2} {:>8.2} {:>12.2} {:>8.2}",
                    profile.as_str(),
                    w.max_drawdown,
                    w.win_rate,
                    w.roi,
                    w.consistency,
                    w.rar
                );
            }
            println!();
        }
    }

    Ok(())
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Load every readable evaluation, warning about and skipping the rest.
fn load_evaluations(files: &[PathBuf]) -> Vec<EvaluationRecord> {
    files
        .iter()
        .filter_map(|path| match load_json::<EvaluationRecord>(path) {
            Ok(record) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                Some(record.with_source(name))
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping evaluation file");
                None
            }
        })
        .collect()
}

/// `*.json` files directly inside `dir`, sorted by name.
fn evaluation_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).with_context(|| format!("Directory not found: {}", dir.display()))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    Ok(files)
}

/// Most recently modified `leaderboard_*.json` in `dir`.
fn latest_snapshot(dir: &Path) -> Result<PathBuf> {
    let entries = fs::read_dir(dir).with_context(|| format!("Data directory not found: {}", dir.display()))?;

    entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            let name = e.file_name();
            let name = name.to_string_lossy();
            name.starts_with("leaderboard_") && name.ends_with(".json")
        })
        .filter_map(|e| {
            let modified = e.metadata().and_then(|m| m.modified()).ok()?;
            Some((modified, e.path()))
        })
        .max_by_key(|(modified, _)| *modified)
        .map(|(_, path)| path)
        .with_context(|| format!("No leaderboard snapshots in {}", dir.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, &json).with_context(|| format!("Failed to write {}", path.display()))?;

    info!(path = %path.display(), kb = json.len() / 1024, "Report written");
    Ok(())
}

/// One file per profile: `report.json` becomes `report_moderate.json` etc.
fn write_profile_reports(path: &Path, reports: &[LeaderboardReport]) -> Result<()> {
    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_else(|| "report".to_string());
    for report in reports {
        let file = path.with_file_name(format!("{}_{}.json", stem, report.metadata.profile));
        write_json(&file, report)?;
    }
    Ok(())
}
