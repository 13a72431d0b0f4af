//! qscript command-line interface.
//!
//! Three procedures, one subcommand each:
//!
//! | Command | What it does |
//! |---------|--------------|
//! | `qscript vqa` | gradient descent on ⟨Z⟩ of an RX·RY ansatz |
//! | `qscript sample` | counts of `id; h; measure` on the local simulator |
//! | `qscript tomography` | tomography of `h; cx` on Braket (or `--local`) |

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub mod commands;
pub mod config;
pub mod logging;
pub mod output;

use config::{ConfigError, QscriptConfig, SamplingSettings, TomographySettings, VqaSettings};
use output::OutputFormat;

/// qscript - variational optimization, sampling and tomography
#[derive(Debug, Parser)]
#[command(name = "qscript")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (YAML)
    #[arg(short, long, global = true, env = "QSCRIPT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Result format on stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the variational optimizer loop
    Vqa(VqaArgs),

    /// Run the H circuit on the local simulator
    Sample(SampleArgs),

    /// Run tomography of the Bell-preparation circuit
    Tomography(TomographyArgs),

    /// Show version information
    Version,
}

#[derive(Debug, Args)]
pub struct VqaArgs {
    /// Gradient-descent step size
    #[arg(long)]
    pub step_size: Option<f64>,

    /// Number of descent steps
    #[arg(short, long)]
    pub iterations: Option<usize>,

    /// Initial parameters, comma separated (θ0,θ1)
    ///
    /// Defaults to 0.011,0.012 rather than the origin: the gradient of ⟨Z⟩ is zero at 0,0.
    #[arg(long, value_delimiter = ',', num_args = 1.., allow_negative_numbers = true)]
    pub init: Option<Vec<f64>>,

    /// Estimate ⟨Z⟩ from this many shots instead of exactly
    #[arg(short, long)]
    pub shots: Option<u32>,

    /// Gradient method (parameter-shift, finite-difference)
    #[arg(short, long)]
    pub gradient: Option<String>,
}

impl VqaArgs {
    pub fn apply(&self, settings: &mut VqaSettings) -> Result<(), ConfigError> {
        if let Some(step) = self.step_size {
            settings.step_size = step;
        }
        if let Some(iterations) = self.iterations {
            settings.iterations = iterations;
        }
        if let Some(init) = &self.init {
            settings.initial_params.clone_from(init);
        }
        if self.shots.is_some() {
            settings.shots = self.shots;
        }
        if let Some(gradient) = &self.gradient {
            settings.gradient = gradient
                .parse()
                .map_err(|e| ConfigError::Validation(format!("--gradient: {e}")))?;
        }
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct SampleArgs {
    /// Number of shots
    #[arg(short, long)]
    pub shots: Option<u32>,

    /// RNG seed for reproducible counts
    #[arg(long)]
    pub seed: Option<u64>,
}

impl SampleArgs {
    pub fn apply(&self, settings: &mut SamplingSettings) {
        if let Some(shots) = self.shots {
            settings.shots = shots;
        }
        if self.seed.is_some() {
            settings.seed = self.seed;
        }
    }
}

#[derive(Debug, Args)]
pub struct TomographyArgs {
    /// Braket device ARN or name (aspen-9, ankaa-3, aria, sv1, ...)
    #[arg(short, long)]
    pub device: Option<String>,

    /// Shots per measurement setting
    #[arg(short, long)]
    pub shots: Option<u32>,

    /// Reconstruct the prepared state or the whole process (state, process)
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Run on the local simulator instead of Braket
    #[arg(long)]
    pub local: bool,
}

impl TomographyArgs {
    pub fn apply(&self, settings: &mut TomographySettings) -> Result<(), ConfigError> {
        if let Some(device) = &self.device {
            settings.device_arn.clone_from(device);
        }
        if let Some(shots) = self.shots {
            settings.shots = shots;
        }
        if let Some(mode) = &self.mode {
            settings.mode = mode
                .parse()
                .map_err(|e| ConfigError::Validation(format!("--mode: {e}")))?;
        }
        Ok(())
    }
}

/// Load configuration, install logging and run the selected command.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Version = cli.command {
        commands::version::execute();
        return Ok(());
    }

    let mut config = QscriptConfig::load(cli.config.as_deref())?;
    logging::init(cli.verbose, &config.logging)?;

    match &cli.command {
        Commands::Vqa(args) => {
            args.apply(&mut config.vqa)?;
            config.validate()?;
            commands::vqa::execute(&config.vqa, cli.format).await
        }
        Commands::Sample(args) => {
            args.apply(&mut config.sampling);
            config.validate()?;
            commands::sample::execute(&config.sampling, cli.format).await
        }
        Commands::Tomography(args) => {
            args.apply(&mut config.tomography)?;
            config.validate()?;
            commands::tomography::execute(
                &config.tomography,
                &config.braket,
                args.local,
                cli.format,
            )
            .await
        }
        Commands::Version => Ok(()),
    }
}
