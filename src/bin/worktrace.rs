//! Worktrace CLI - Command-line interface for Worktrace Flux
//!
//! Commands:
//! - infer: Classify samples into buckets and emit a full report
//! - summary: Totals by state
//! - apps: Per-application / per-site breakdown
//! - daily: Totals by state per local day
//! - validate: Validate sample input
//! - config: Print the resolved configuration

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use worktrace_flux::adapter::{self, SampleIssue};
use worktrace_flux::pipeline::fill_days;
use worktrace_flux::types::{ProductivityState, Sample};
use worktrace_flux::{InferenceConfig, InferenceError, InferencePipeline, WORKTRACE_VERSION};

/// Worktrace - productivity inference over desktop activity samples
#[derive(Parser)]
#[command(name = "worktrace")]
#[command(version = WORKTRACE_VERSION)]
#[command(about = "Turn activity samples into productivity buckets and summaries", long_about = None)]
struct Cli {
    /// Log pipeline decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify samples and emit a full report
    Infer {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "json")]
        output_format: OutputFormat,
    },

    /// Totals by state
    Summary {
        #[command(flatten)]
        source: SourceArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Per-application breakdown (browsers split by site)
    Apps {
        #[command(flatten)]
        source: SourceArgs,

        /// Only list apps with non-productive time
        #[arg(long)]
        non_productive: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Totals by state per local calendar day
    Daily {
        #[command(flatten)]
        source: SourceArgs,

        /// First day of a dense series (YYYY-MM-DD)
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,

        /// Last day of a dense series (YYYY-MM-DD)
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate sample input
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the resolved configuration as JSON
    Config {
        /// Configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Input file path (use - for stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Input format
    #[arg(long, default_value = "ndjson")]
    input_format: InputFormat,

    /// Configuration file (JSON); WORKTRACE_* variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only use samples from this user
    #[arg(long)]
    user: Option<String>,

    /// Re-sort samples by timestamp instead of rejecting unordered input
    #[arg(long)]
    sort: bool,
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one sample per line)
    Ndjson,
    /// JSON array of samples
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON report
    Json,
    /// Pretty-printed JSON report
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), WorktraceCliError> {
    match cli.command {
        Commands::Infer {
            source,
            output,
            output_format,
        } => cmd_infer(&source, &output, output_format),
        Commands::Summary { source, json } => cmd_summary(&source, json),
        Commands::Apps {
            source,
            non_productive,
            json,
        } => cmd_apps(&source, non_productive, json),
        Commands::Daily {
            source,
            from,
            to,
            json,
        } => cmd_daily(&source, from.zip(to), json),
        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),
        Commands::Config { config } => cmd_config(config.as_deref()),
    }
}

fn resolve_config(path: Option<&Path>) -> Result<InferenceConfig, WorktraceCliError> {
    let base = match path {
        Some(path) => InferenceConfig::from_file(path)?,
        None => InferenceConfig::default(),
    };
    Ok(base.with_env_overrides()?)
}

fn read_input(input: &Path) -> Result<String, WorktraceCliError> {
    if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            return Err(WorktraceCliError::NoInput);
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn parse_samples(data: &str, format: &InputFormat) -> Result<Vec<Sample>, WorktraceCliError> {
    let samples = match format {
        InputFormat::Ndjson => adapter::parse_ndjson(data)?,
        InputFormat::Json => adapter::parse_array(data)?,
    };
    Ok(samples)
}

/// Read, filter and prepare samples, returning them with a pipeline
fn load(source: &SourceArgs) -> Result<(InferencePipeline, Vec<Sample>), WorktraceCliError> {
    let pipeline = InferencePipeline::new(resolve_config(source.config.as_deref())?)?;

    let data = read_input(&source.input)?;
    let mut samples = parse_samples(&data, &source.input_format)?;

    if let Some(user) = &source.user {
        samples = adapter::filter_user(samples, user);
    }
    if samples.is_empty() {
        return Err(WorktraceCliError::NoSamples);
    }
    if source.sort {
        adapter::sort_samples(&mut samples);
    }

    let samples = pipeline.prepare(samples)?;
    Ok((pipeline, samples))
}

fn cmd_infer(
    source: &SourceArgs,
    output: &Path,
    output_format: OutputFormat,
) -> Result<(), WorktraceCliError> {
    let (pipeline, samples) = load(source)?;
    let report_json = pipeline.report_json(samples)?;

    let output_data = match output_format {
        OutputFormat::Json => report_json,
        OutputFormat::JsonPretty => {
            let value: serde_json::Value = serde_json::from_str(&report_json)?;
            serde_json::to_string_pretty(&value)?
        }
    };

    if output.to_string_lossy() == "-" {
        println!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_summary(source: &SourceArgs, json: bool) -> Result<(), WorktraceCliError> {
    let (pipeline, samples) = load(source)?;
    let summary = pipeline.summarize(&samples)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Tracked: {}s in {} buckets", summary.total_seconds, summary.total_buckets);
    for state in ProductivityState::ALL {
        println!(
            "  {:<15} {:>8}s  {:>5.1}%",
            state,
            summary.states.get(state),
            summary.percent(state)
        );
    }
    Ok(())
}

fn cmd_apps(source: &SourceArgs, non_productive: bool, json: bool) -> Result<(), WorktraceCliError> {
    let (pipeline, samples) = load(source)?;
    let breakdown = pipeline.app_breakdown(&samples)?;

    if non_productive {
        let apps = worktrace_flux::aggregate::non_productive_apps(&breakdown);
        if json {
            println!("{}", serde_json::to_string_pretty(&apps)?);
        } else {
            for app in apps {
                println!("{:>8}s  {}", app.seconds, app.app_name);
            }
        }
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&breakdown)?);
    } else {
        for entry in breakdown {
            println!(
                "{:>8}s  {:<15} {}",
                entry.total_seconds, entry.category, entry.app_name
            );
        }
    }
    Ok(())
}

fn cmd_daily(
    source: &SourceArgs,
    range: Option<(NaiveDate, NaiveDate)>,
    json: bool,
) -> Result<(), WorktraceCliError> {
    let (pipeline, samples) = load(source)?;
    let mut days = pipeline.daily(&samples)?;
    if let Some((from, to)) = range {
        days = fill_days(&days, from, to);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&days)?);
    } else {
        for day in days {
            println!(
                "{}  productive {:>6}s  non_productive {:>6}s",
                day.date, day.summary.states.productive, day.summary.states.non_productive
            );
        }
    }
    Ok(())
}

fn cmd_validate(input: &Path, input_format: InputFormat, json: bool) -> Result<(), WorktraceCliError> {
    let data = read_input(input)?;
    let samples = parse_samples(&data, &input_format)?;

    let issues = adapter::validate_samples(&samples);
    let unordered_at = match worktrace_flux::bucketizer::ensure_sorted(&samples) {
        Err(InferenceError::UnsortedSamples { index }) => Some(index),
        _ => None,
    };

    let report = ValidationReport {
        total_samples: samples.len(),
        valid_samples: samples.len() - issues.len(),
        invalid_samples: issues.len(),
        unordered_at,
        users: adapter::user_ids(&samples),
        errors: issues,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total samples:   {}", report.total_samples);
        println!("Valid samples:   {}", report.valid_samples);
        println!("Invalid samples: {}", report.invalid_samples);
        println!("Users:           {}", report.users.join(", "));
        if let Some(index) = report.unordered_at {
            println!("Ordering:        sample {} is out of order (re-run with --sort)", index);
        }
        for issue in &report.errors {
            println!("  [{}] {}", issue.index, issue.message);
        }
    }

    report.outcome()
}

fn cmd_config(path: Option<&Path>) -> Result<(), WorktraceCliError> {
    let config = resolve_config(path)?;
    println!("{}", config.to_json()?);
    Ok(())
}

// Error types

#[derive(Debug)]
enum WorktraceCliError {
    Io(io::Error),
    Inference(InferenceError),
    Json(serde_json::Error),
    NoInput,
    NoSamples,
    ValidationFailed(usize),
    Unordered(usize),
}

impl From<io::Error> for WorktraceCliError {
    fn from(e: io::Error) -> Self {
        WorktraceCliError::Io(e)
    }
}

impl From<InferenceError> for WorktraceCliError {
    fn from(e: InferenceError) -> Self {
        WorktraceCliError::Inference(e)
    }
}

impl From<serde_json::Error> for WorktraceCliError {
    fn from(e: serde_json::Error) -> Self {
        WorktraceCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<WorktraceCliError> for CliError {
    fn from(e: WorktraceCliError) -> Self {
        match e {
            WorktraceCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            WorktraceCliError::Inference(e) => {
                let hint = match &e {
                    InferenceError::UnsortedSamples { .. } => "Pass --sort to re-order samples by timestamp",
                    InferenceError::InvalidConfig { .. } | InferenceError::InvalidBucketWidth(_) => {
                        "Run 'worktrace config' to inspect the resolved configuration"
                    }
                    InferenceError::InvalidSample { .. } => "Run 'worktrace validate' for details",
                    _ => "Ensure input samples are well-formed JSON",
                };
                CliError {
                    code: "INFERENCE_ERROR".to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            WorktraceCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            WorktraceCliError::NoInput => CliError {
                code: "NO_INPUT".to_string(),
                message: "Reading from stdin but nothing is piped in".to_string(),
                hint: Some("Pipe samples in or pass --input <file>".to_string()),
            },
            WorktraceCliError::NoSamples => CliError {
                code: "NO_SAMPLES".to_string(),
                message: "No samples found in input".to_string(),
                hint: Some("Ensure input is not empty and --user matches".to_string()),
            },
            WorktraceCliError::Unordered(index) => CliError {
                code: "UNORDERED_SAMPLES".to_string(),
                message: format!("Sample {} is earlier than its predecessor", index),
                hint: Some("Pass --sort to re-order samples by timestamp".to_string()),
            },
            WorktraceCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} samples failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_samples: usize,
    valid_samples: usize,
    invalid_samples: usize,
    unordered_at: Option<usize>,
    users: Vec<String>,
    errors: Vec<SampleIssue>,
}

impl ValidationReport {
    /// Fail on invalid samples first, then on ordering
    fn outcome(&self) -> Result<(), WorktraceCliError> {
        if self.invalid_samples > 0 {
            return Err(WorktraceCliError::ValidationFailed(self.invalid_samples));
        }
        if let Some(index) = self.unordered_at {
            return Err(WorktraceCliError::Unordered(index));
        }
        Ok(())
    }
}
