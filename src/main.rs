//! Movement analysis CLI
//!
//! Reads one or more sensor export archives, runs the analysis engine on each
//! and prints the results as JSON (one document per line unless `--pretty`).
//!
//! Module structure:
//! - `domain/` - Core types (Sample, Quaternion, AnalysisResult)
//! - `io/` - Archive input, row parsing, JSONL egress
//! - `services/` - Pipeline stages (orientation, joint angle, repetitions, metrics)
//! - `infra/` - Infrastructure (Config, RunStats)

use anyhow::Context;
use clap::Parser;
use movement_engine::domain::types::ExerciseType;
use movement_engine::infra::Config;
use movement_engine::io::Egress;
use movement_engine::services::{Analysis, MovementAnalyzer};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// Movement analysis - joint angles, repetitions and ROM from sensor archives
#[derive(Parser, Debug)]
#[command(name = "movement-analysis", version, about)]
struct Args {
    /// Path to TOML configuration file (default: $CONFIG_FILE or config/dev.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Exercise performed: "Squat" or "Leg Knee Extension"
    #[arg(short, long)]
    exercise: ExerciseType,

    /// Archives are base64-encoded text instead of raw ZIP bytes
    #[arg(long)]
    base64: bool,

    /// Append each analysis to the configured egress file
    #[arg(long)]
    egress: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Sensor export archives
    #[arg(required = true)]
    archives: Vec<PathBuf>,
}

async fn analyze_path(
    analyzer: MovementAnalyzer,
    path: PathBuf,
    exercise: ExerciseType,
    base64: bool,
) -> anyhow::Result<Analysis> {
    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("Failed to read archive {}", path.display()))?;

    let analysis = tokio::task::spawn_blocking(move || {
        if base64 {
            analyzer.analyze_base64(&String::from_utf8_lossy(&bytes), exercise)
        } else {
            analyzer.analyze_archive(&bytes, exercise)
        }
    })
    .await
    .context("Analysis task panicked")?
    .with_context(|| format!("Failed to analyze {}", path.display()))?;

    Ok(analysis)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only JSON results
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("GIT_HASH"),
        "movement_analysis_starting"
    );

    let config = Config::load_from_path(&Config::resolve_config_path(args.config.as_deref()));
    info!(
        config_file = %config.config_file(),
        squat_threshold_deg = %config.squat_threshold_deg(),
        extension_peak_fraction = %config.extension_peak_fraction(),
        min_frame_distance = %config.min_frame_distance(),
        degenerate_policy = ?config.degenerate_policy(),
        angle_method = ?config.angle_method(),
        tie_side = %config.tie_side().as_str(),
        "config_loaded"
    );

    let analyzer = MovementAnalyzer::new(config);
    let egress = args.egress.then(|| Egress::new(analyzer.config().egress_file()));

    // Archives are independent; analyze them concurrently, report in argument order
    let tasks: Vec<_> = args
        .archives
        .iter()
        .map(|path| {
            let task = tokio::spawn(analyze_path(
                analyzer.clone(),
                path.clone(),
                args.exercise,
                args.base64,
            ));
            (path.display().to_string(), task)
        })
        .collect();

    let total = tasks.len();
    let mut failed = 0usize;
    for (archive, task) in tasks {
        match task.await.context("Archive task panicked")? {
            Ok(analysis) => {
                analysis.stats.log();
                let json = if args.pretty {
                    serde_json::to_string_pretty(&analysis.result)?
                } else {
                    analysis.result.to_json()
                };
                println!("{}", json);

                if let Some(egress) = &egress {
                    egress.write_analysis(&archive, &analysis);
                }
            }
            Err(e) => {
                failed += 1;
                error!(archive = %archive, error = %format!("{:#}", e), "analysis_failed");
            }
        }
    }

    anyhow::ensure!(failed == 0, "{} of {} archives failed", failed, total);
    info!(archives = total, "movement_analysis_done");
    Ok(())
}
