//! harmonize - diatonic third harmonies for a monophonic MIDI melody
//!
//! Subcommands:
//! - `harmonize run <input>` - Write an upper and a lower harmony file
//! - `harmonize inspect <input>` - Print the extracted melody as JSON
//! - `harmonize config` - Print the effective configuration

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use harmonyconf::HarmonyConfig;
use tracing::debug;

mod commands;
mod params;
mod telemetry;

#[derive(Parser)]
#[command(name = "harmonize")]
#[command(about = "Diatonic third harmonies for a monophonic MIDI melody")]
#[command(version)]
struct Cli {
    /// Config file (replaces ./harmonize.toml)
    #[arg(long, global = true, env = "HARMONIZE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Harmonize a melody a third above and a third below
    Run(RunArgs),

    /// Print the melody extracted from a track as JSON
    Inspect {
        /// MIDI file holding the melody
        input: PathBuf,

        /// Track index of the melody
        #[arg(short, long)]
        track: Option<usize>,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// MIDI file holding the melody
    pub input: PathBuf,

    /// Scale type: major or minor (anything else means major)
    #[arg(long)]
    pub scale: Option<String>,

    /// Blue note handling: snap or move (anything else means snap)
    #[arg(long = "blue-notes")]
    pub blue_notes: Option<String>,

    /// Scale root as a MIDI note number (C4 = 60)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=127))]
    pub root: Option<u8>,

    /// Track index of the melody
    #[arg(short, long)]
    pub track: Option<usize>,

    /// Output path for the harmony a third above
    #[arg(long)]
    pub upper: Option<PathBuf>,

    /// Output path for the harmony a third below
    #[arg(long)]
    pub lower: Option<PathBuf>,

    /// Clamp output pitches into 0..=127 instead of refusing to write them
    #[arg(long)]
    pub clamp: bool,

    /// Never prompt; fail if the root is not given
    #[arg(long)]
    pub no_prompt: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, sources) = HarmonyConfig::load_with_sources_from(cli.config.as_deref())
        .context("loading configuration")?;

    telemetry::init(&config.telemetry.log_level);
    debug!(files = ?sources.files, env = ?sources.env_overrides, "configuration loaded");

    match cli.command {
        Commands::Run(args) => commands::run(&args, &config),
        Commands::Inspect { input, track } => {
            commands::inspect(&input, track.unwrap_or(config.input.track))
        }
        Commands::Config => {
            commands::print_config(&config, &sources);
            Ok(())
        }
    }
}
