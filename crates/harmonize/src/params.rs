//! Run parameter resolution: flag, then config, then prompt.

use anyhow::{bail, Result};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use harmony::{BlueNoteMode, ScaleType};

/// Source of values the user has not supplied any other way.
pub trait Prompt {
    fn scale(&mut self) -> Result<ScaleType>;
    fn blue_note_mode(&mut self) -> Result<BlueNoteMode>;
    fn root(&mut self) -> Result<u8>;
}

/// Asks on the terminal.
pub struct Terminal {
    theme: ColorfulTheme,
}

impl Default for Terminal {
    fn default() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Prompt for Terminal {
    fn scale(&mut self) -> Result<ScaleType> {
        let labels: Vec<&str> = ScaleType::ALL.iter().map(|s| s.as_str()).collect();
        let selection = Select::with_theme(&self.theme)
            .with_prompt("Choose a scale")
            .items(&labels)
            .default(0)
            .interact()?;
        Ok(ScaleType::ALL[selection])
    }

    fn blue_note_mode(&mut self) -> Result<BlueNoteMode> {
        let labels = [
            "snap - pull blue notes onto the nearest scale tone",
            "move - keep blue notes where they land",
        ];
        let selection = Select::with_theme(&self.theme)
            .with_prompt("Choose blue note handling")
            .items(&labels)
            .default(0)
            .interact()?;
        Ok(BlueNoteMode::ALL[selection])
    }

    fn root(&mut self) -> Result<u8> {
        let root: u8 = Input::with_theme(&self.theme)
            .with_prompt("Scale root as a MIDI note number (C:60 C#:61 D:62 D#:63 E:64 F:65 F#:66 G:67 G#:68 A:69 A#:70 B:71)")
            .validate_with(|v: &u8| {
                if *v <= 127 {
                    Ok(())
                } else {
                    Err("MIDI note numbers run from 0 to 127")
                }
            })
            .interact_text()?;
        Ok(root)
    }
}

/// Never asks: scale and mode fall back to their defaults, the root is required.
pub struct NoPrompt;

impl Prompt for NoPrompt {
    fn scale(&mut self) -> Result<ScaleType> {
        Ok(ScaleType::default())
    }

    fn blue_note_mode(&mut self) -> Result<BlueNoteMode> {
        Ok(BlueNoteMode::default())
    }

    fn root(&mut self) -> Result<u8> {
        bail!("no scale root given; pass --root, set [defaults] root, or run interactively")
    }
}

pub fn scale_type(flag: Option<&str>, config: Option<&str>, prompt: &mut dyn Prompt) -> Result<ScaleType> {
    match flag.or(config) {
        Some(text) => Ok(ScaleType::parse_lenient(text)),
        None => prompt.scale(),
    }
}

pub fn blue_note_mode(
    flag: Option<&str>,
    config: Option<&str>,
    prompt: &mut dyn Prompt,
) -> Result<BlueNoteMode> {
    match flag.or(config) {
        Some(text) => Ok(BlueNoteMode::parse_lenient(text)),
        None => prompt.blue_note_mode(),
    }
}

pub fn root(flag: Option<u8>, config: Option<u8>, prompt: &mut dyn Prompt) -> Result<u8> {
    match flag.or(config) {
        Some(root) => Ok(root),
        None => prompt.root(),
    }
}
