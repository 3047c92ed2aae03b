//! feeder-vision CLI: run feature finding and feeder calibration jobs from JSON.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use feeder_vision::io::{load_json, to_json_string, write_json, FeatureJob, TrayJob, TransformJob};
use feeder_vision::{run_features, run_transform, run_tray, Error};
use log::{info, LevelFilter};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "feeder-vision")]
#[command(about = "Feature finding and coordinate calibration for pick-and-place feeders")]
#[command(version)]
struct Cli {
    /// Log level (off, error, warn, info, debug, trace). Defaults to $FEEDER_VISION_LOG, then warn.
    #[arg(long, global = true, value_parser = parse_log_level)]
    log_level: Option<LevelFilter>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify fiducials and pockets and fit the pocket row.
    Features(JobArgs),

    /// Compute or validate tray offsets from three corner points.
    Tray(JobArgs),

    /// Estimate a two-point rigid transform.
    Transform(JobArgs),
}

#[derive(Debug, Clone, Args)]
struct JobArgs {
    /// Path to the JSON job.
    job: PathBuf,

    /// Path to write the JSON report. Printed to stdout when omitted.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn parse_log_level(s: &str) -> Result<LevelFilter, String> {
    feeder_vision::core::parse_level(s).ok_or_else(|| format!("unknown log level `{s}`"))
}

fn init_logging(level: Option<LevelFilter>) {
    #[cfg(feature = "tracing")]
    {
        let _ = level;
        feeder_vision::core::init_tracing(false);
    }
    #[cfg(not(feature = "tracing"))]
    {
        let level = level
            .or_else(feeder_vision::core::level_from_env)
            .unwrap_or(LevelFilter::Warn);
        if let Err(err) = feeder_vision::core::init_with_level(level) {
            eprintln!("failed to install logger: {err}");
        }
    }
}

fn emit<T: Serialize>(report: &T, output: Option<&Path>) -> Result<(), Error> {
    match output {
        Some(path) => {
            write_json(report, path)?;
            info!("report written to {}", path.display());
        }
        None => println!("{}", to_json_string(report)?),
    }
    Ok(())
}

fn run(command: &Commands) -> Result<(), Error> {
    match command {
        Commands::Features(args) => {
            let job: FeatureJob = load_json(&args.job)?;
            emit(&run_features(&job), args.output.as_deref())
        }
        Commands::Tray(args) => {
            let job: TrayJob = load_json(&args.job)?;
            emit(&run_tray(&job), args.output.as_deref())
        }
        Commands::Transform(args) => {
            let job: TransformJob = load_json(&args.job)?;
            emit(&run_transform(&job), args.output.as_deref())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level);
    match run(&cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
