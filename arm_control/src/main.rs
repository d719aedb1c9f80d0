//! # Arm Control Binary
//!
//! Drives the servo arm from a Wii Remote, or from a recorded input script.
//!
//! # Usage
//!
//! ```bash
//! # Hardware run with the default config (/etc/arm/arm.toml)
//! arm_control
//!
//! # Bench run: simulated registers, scripted input
//! arm_control --simulate --script demo/throw.json -v
//!
//! # Explicit config, JSON logs
//! arm_control --config config/arm.toml --json
//! ```
//!
//! Exit status: 0 on Home, 1 input init failure, 2 register window failure,
//! 3 configuration error, 4 control loop failure.

#![deny(warnings)]

use std::path::PathBuf;
use std::process::ExitCode;

use arm_common::config::{ArmConfig, InputSource, LogLevel};
use arm_control::dispatch::{Dispatcher, LoopSummary};
use arm_control::error::ArmError;
use arm_control::throw::ThreadSleeper;
use arm_control::{load_config, open_arm, open_input};
use arm_hal::DriverRegistry;
use clap::Parser;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

/// Arm Control - servo arm driven by a Wii Remote
#[derive(Parser, Debug)]
#[command(name = "arm_control")]
#[command(version)]
#[command(about = "Five-axis servo arm controller with boundary-checked manual motion")]
#[command(long_about = None)]
struct Args {
    /// Path to arm.toml (defaults to /etc/arm/arm.toml, built-in defaults if absent)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Force the simulation register driver
    #[arg(short = 's', long)]
    simulate: bool,

    /// Replay a JSON input script instead of reading the Wii Remote
    #[arg(long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = load_config(args.config.as_deref()).map(|config| apply_overrides(config, &args));
    let log_level = config
        .as_ref()
        .map_or(LogLevel::Info, |config| config.shared.log_level);
    setup_tracing(&args, log_level);

    info!("Arm control v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = config
        .and_then(|config| config.validate().map(|()| config))
        .map_err(ArmError::from)
        .and_then(|config| run(&config));

    match result {
        Ok(summary) => {
            info!(
                "Exiting after {} iterations ({} steps, {} throws, {} accelerometer moves)",
                summary.iterations, summary.steps, summary.throws, summary.absolute_moves
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            e.exit_code()
        }
    }
}

fn apply_overrides(mut config: ArmConfig, args: &Args) -> ArmConfig {
    if args.simulate {
        config.registers.driver = "simulation".to_string();
    }
    if let Some(script) = &args.script {
        config.input.source = InputSource::Script;
        config.input.script = Some(script.clone());
    }
    config
}

fn run(config: &ArmConfig) -> Result<LoopSummary, ArmError> {
    info!("Initializing controller input ({:?})...", config.input.source);
    let input = open_input(&config.input).map_err(ArmError::InputInit)?;

    info!("Initializing servos...");
    let registry = DriverRegistry::with_builtin_drivers();
    info!(
        "Register drivers available: {} (using {})",
        registry.list_drivers().join(", "),
        config.registers.driver
    );
    let motion = open_arm(config, &registry).map_err(ArmError::HardwareInit)?;

    let mut dispatcher = Dispatcher::new(input, motion, ThreadSleeper);
    let result = dispatcher.run();

    info!("Closing connections...");
    let (mut input, motion) = dispatcher.into_parts();
    if let Err(e) = input.close() {
        warn!("Failed to close controller input: {e}");
    }
    if let Err(e) = motion.into_registers().close() {
        warn!("Failed to release servos: {e}");
    }
    info!("Servos released");

    Ok(result?)
}

fn setup_tracing(args: &Args, log_level: LogLevel) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        match log_level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
