//! scuba-oscal - SCuBA results to OSCAL converter
//!
//! Reads a ScubaGear results file and writes an OSCAL assessment plan and
//! assessment results, or builds the 800-53 profile from a control mapping.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use scuba_oscal::config::Config;
use scuba_oscal::enums::OutputFormat;
use scuba_oscal::profile::{ControlMapping, build_profile};
use scuba_oscal::serialize;

/// Convert SCuBA M365 assessment results into NIST OSCAL documents
#[derive(Parser)]
#[command(name = "scuba-oscal")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write sap and sar documents for a results file
    Convert {
        /// ScubaGear results JSON
        input: PathBuf,

        /// Directory that receives the documents
        output: PathBuf,

        /// Output format (overrides the config file)
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,
    },

    /// Build the NIST SP 800-53 rev5 profile from a SCuBA control mapping
    Profile {
        /// JSON object mapping SCuBA policy ids to 800-53 control ids
        mapping: PathBuf,

        /// Profile file to write
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Yaml,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Yaml => OutputFormat::Yaml,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Convert {
            input,
            output,
            format,
        } => {
            let mut options = config.convert;
            if let Some(format) = format {
                options.format = format.into();
            }
            let converted = scuba_oscal::convert_file(&input, &output, &options)
                .with_context(|| format!("converting {}", input.display()))?;
            println!(
                "Wrote {} and {} ({} results, {} warnings)",
                output.join(options.plan_file_name()).display(),
                output.join(options.results_file_name()).display(),
                converted.pair.results.results.len(),
                converted.warnings.len()
            );
        }
        Commands::Profile { mapping, output } => {
            let control_mapping = ControlMapping::load(&mapping)?;
            let profile = build_profile(&control_mapping, &config.profile, chrono::Utc::now())
                .with_context(|| format!("building profile from {}", mapping.display()))?;
            serialize::write(&profile, &output, OutputFormat::Json)?;
            println!("Wrote {}", output.display());
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Ok(Config::load(path)?),
        None => Ok(Config::default()),
    }
}
