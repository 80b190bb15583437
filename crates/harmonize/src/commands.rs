use std::io::IsTerminal;
use std::path::Path;

use anyhow::{Context, Result};
use harmony::{
    clamp_to_midi_range, extract_melody, harmonize, read_file, write_file, Voicing,
    MelodyPair, Pitch, SourceInfo, WriteOptions,
};
use harmonyconf::{ConfigSources, HarmonyConfig};
use serde::Serialize;
use tracing::{info, warn};

use crate::params::{self, NoPrompt, Prompt, Terminal};
use crate::RunArgs;

/// Harmonize `args.input` a third above and a third below.
pub fn run(args: &RunArgs, config: &HarmonyConfig) -> Result<()> {
    let mut prompt: Box<dyn Prompt> = if !args.no_prompt && std::io::stdin().is_terminal() {
        Box::new(Terminal::default())
    } else {
        Box::new(NoPrompt)
    };

    let scale = params::scale_type(
        args.scale.as_deref(),
        config.defaults.scale.as_deref(),
        prompt.as_mut(),
    )?;
    let mode = params::blue_note_mode(
        args.blue_notes.as_deref(),
        config.defaults.blue_note_mode.as_deref(),
        prompt.as_mut(),
    )?;

    let track = args.track.unwrap_or(config.input.track);
    let (events, source) = read_file(&args.input, track)
        .with_context(|| format!("reading melody from {}", args.input.display()))?;
    let melody = extract_melody(&events);
    info!(
        tempo = melody.tempo,
        notes = melody.pairs.len(),
        ppq = source.ticks_per_quarter,
        track,
        "melody loaded"
    );
    if melody.pairs.is_empty() {
        warn!(track, "no complete notes found, harmonies will be empty");
    }

    let root = params::root(args.root, config.defaults.root, prompt.as_mut())?;
    info!(%scale, blue_notes = %mode, root, "harmonizing");

    let options = WriteOptions {
        ticks_per_quarter: source.ticks_per_quarter,
        tempo: Some(melody.tempo),
    };
    let clamp = args.clamp || config.output.clamp;
    let root = Pitch::from(root);

    let voices = [
        (
            "Upper",
            Voicing::third_above(root, scale.pattern(), mode),
            args.upper.as_deref().unwrap_or(&config.output.upper),
        ),
        (
            "Lower",
            Voicing::third_below(root, scale.pattern(), mode),
            args.lower.as_deref().unwrap_or(&config.output.lower),
        ),
    ];

    for (label, voicing, path) in voices {
        let mut voice = harmonize(&voicing, &melody.pairs)?;
        if clamp {
            voice = clamp_to_midi_range(voice);
        }
        write_file(path, &voice, &options).with_context(|| {
            format!("writing {} harmony to {}", label.to_lowercase(), path.display())
        })?;
        println!("{} harmony: OK", label);
    }

    Ok(())
}

#[derive(Serialize)]
struct InspectReport<'a> {
    source: &'a SourceInfo,
    track: usize,
    tempo: u32,
    pairs: &'a [MelodyPair],
}

/// Print the melody extracted from `input` as JSON.
pub fn inspect(input: &Path, track: usize) -> Result<()> {
    let (events, source) = read_file(input, track)
        .with_context(|| format!("reading melody from {}", input.display()))?;
    let melody = extract_melody(&events);

    let report = InspectReport {
        source: &source,
        track,
        tempo: melody.tempo,
        pairs: &melody.pairs,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub fn print_config(config: &HarmonyConfig, sources: &ConfigSources) {
    for file in &sources.files {
        println!("# loaded: {}", file.display());
    }
    for var in &sources.env_overrides {
        println!("# override: {}", var);
    }
    print!("{}", config.to_toml());
}
