//! Powerlog CLI - Command-line interface for the Powerlog engine
//!
//! Commands:
//! - eval: Evaluate a JSON request (file or stdin) and print the JSON response
//! - score: Compute a strength score for a total
//! - phase: Compute the menstrual-cycle training phase for a date
//! - doctor: Diagnose engine version and configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::NaiveDate;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use powerlog_engine::api::{evaluate, Request};
use powerlog_engine::config::RulesConfig;
use powerlog_engine::cycle_phase::compute_cycle_phase_with_config;
use powerlog_engine::formulas::{compute_strength_score, lb_to_kg};
use powerlog_engine::types::Sex;
use powerlog_engine::{EngineError, ENGINE_VERSION, PRODUCER_NAME};

/// Powerlog - training-signal and adjustment rules engine
#[derive(Parser)]
#[command(name = "powerlog")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Evaluate powerlifting training rules", long_about = None)]
struct Cli {
    /// Rules configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a JSON request and print the response
    Eval {
        /// Request file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,
    },

    /// Compute a bodyweight-normalized strength score
    Score {
        /// Competition total
        #[arg(long)]
        total: f64,

        /// Bodyweight
        #[arg(long)]
        bodyweight: f64,

        #[arg(long, value_enum)]
        sex: SexArg,

        /// Unit of total and bodyweight
        #[arg(long, value_enum, default_value = "kg")]
        unit: UnitArg,
    },

    /// Compute the cycle phase for a date
    Phase {
        /// First day of the last period (YYYY-MM-DD)
        #[arg(long)]
        last_period_start: NaiveDate,

        /// Cycle length in days
        #[arg(long)]
        cycle_length: Option<u32>,

        /// Reference date (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Diagnose engine version and configuration
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SexArg {
    Male,
    Female,
}

impl From<SexArg> for Sex {
    fn from(arg: SexArg) -> Self {
        match arg {
            SexArg::Male => Sex::Male,
            SexArg::Female => Sex::Female,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum UnitArg {
    Kg,
    Lb,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), PowerlogCliError> {
    if let Commands::Doctor { json } = cli.command {
        return cmd_doctor(cli.config.as_deref(), json);
    }

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Eval { input } => cmd_eval(&input, &config, cli.pretty),
        Commands::Score {
            total,
            bodyweight,
            sex,
            unit,
        } => cmd_score(total, bodyweight, sex.into(), unit, cli.pretty),
        Commands::Phase {
            last_period_start,
            cycle_length,
            date,
        } => cmd_phase(last_period_start, cycle_length, date, &config, cli.pretty),
        Commands::Doctor { .. } => Ok(()),
    }
}

fn load_config(path: Option<&Path>) -> Result<RulesConfig, PowerlogCliError> {
    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)?;
            let config = RulesConfig::from_json(&raw)?;
            info!(path = %path.display(), "loaded rules config");
            Ok(config)
        }
        None => Ok(RulesConfig::default()),
    }
}

fn read_input(input: &Path) -> Result<String, PowerlogCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<(), PowerlogCliError> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}

fn cmd_eval(input: &Path, config: &RulesConfig, pretty: bool) -> Result<(), PowerlogCliError> {
    let raw = read_input(input)?;
    if raw.trim().is_empty() {
        return Err(PowerlogCliError::EmptyInput);
    }

    let request: Request =
        serde_json::from_str(&raw).map_err(|e| EngineError::InvalidRequest(e.to_string()))?;
    debug!(op = request.op(), "parsed request");

    let response = evaluate(&request, config);
    print_json(&response, pretty)
}

fn cmd_score(
    total: f64,
    bodyweight: f64,
    sex: Sex,
    unit: UnitArg,
    pretty: bool,
) -> Result<(), PowerlogCliError> {
    let (total_kg, bodyweight_kg) = match unit {
        UnitArg::Kg => (total, bodyweight),
        UnitArg::Lb => (lb_to_kg(total), lb_to_kg(bodyweight)),
    };

    let score = compute_strength_score(total_kg, bodyweight_kg, sex);
    print_json(
        &serde_json::json!({
            "total_kg": total_kg,
            "bodyweight_kg": bodyweight_kg,
            "score": score,
        }),
        pretty,
    )
}

fn cmd_phase(
    last_period_start: NaiveDate,
    cycle_length: Option<u32>,
    date: Option<NaiveDate>,
    config: &RulesConfig,
    pretty: bool,
) -> Result<(), PowerlogCliError> {
    let reference = date.unwrap_or_else(|| chrono::Local::now().date_naive());
    let context =
        compute_cycle_phase_with_config(last_period_start, cycle_length, reference, config);
    print_json(&context, pretty)
}

fn cmd_doctor(config_path: Option<&Path>, json: bool) -> Result<(), PowerlogCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "engine_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Powerlog engine {}", ENGINE_VERSION),
    });

    match config_path {
        Some(path) if path.exists() => match fs::read_to_string(path) {
            Ok(content) => match RulesConfig::from_json(&content) {
                Ok(config) => checks.push(DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Ok,
                    message: format!(
                        "Config valid (badge threshold {:.2}, cycle length {} days)",
                        config.badge_threshold, config.default_cycle_length_days
                    ),
                }),
                Err(e) => checks.push(DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: e.to_string(),
                }),
            },
            Err(e) => checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Error,
                message: format!("Cannot read config file: {}", e),
            }),
        },
        Some(_) => checks.push(DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Warning,
            message: "Config file does not exist".to_string(),
        }),
        None => checks.push(DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Ok,
            message: "Using default rule thresholds".to_string(),
        }),
    }

    let stdin_message = if atty::is(atty::Stream::Stdin) {
        "stdin is a TTY (pass a request with --input)"
    } else {
        "stdin is a pipe (eval ready)"
    };
    checks.push(DoctorCheck {
        name: "stdin".to_string(),
        status: CheckStatus::Ok,
        message: stdin_message.to_string(),
    });

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Powerlog Doctor Report");
        println!("======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(PowerlogCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Error types

#[derive(Debug)]
enum PowerlogCliError {
    Io(io::Error),
    Engine(EngineError),
    Json(serde_json::Error),
    EmptyInput,
    DoctorFailed,
}

impl From<io::Error> for PowerlogCliError {
    fn from(e: io::Error) -> Self {
        PowerlogCliError::Io(e)
    }
}

impl From<EngineError> for PowerlogCliError {
    fn from(e: EngineError) -> Self {
        PowerlogCliError::Engine(e)
    }
}

impl From<serde_json::Error> for PowerlogCliError {
    fn from(e: serde_json::Error) -> Self {
        PowerlogCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<PowerlogCliError> for CliError {
    fn from(e: PowerlogCliError) -> Self {
        match e {
            PowerlogCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            PowerlogCliError::Engine(EngineError::InvalidConfig(msg)) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: msg,
                hint: Some("Run 'powerlog doctor --config <path>' for details".to_string()),
            },
            PowerlogCliError::Engine(e) => CliError {
                code: "REQUEST_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Ensure the request has a valid \"op\" and its fields".to_string()),
            },
            PowerlogCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            PowerlogCliError::EmptyInput => CliError {
                code: "EMPTY_INPUT".to_string(),
                message: "No request found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            PowerlogCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
