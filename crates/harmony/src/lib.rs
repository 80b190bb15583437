//! Parallel-voice harmonization of monophonic MIDI melodies.
//!
//! A melody track is scanned into matched note-on/note-off pairs, each note is
//! re-read as a degree of a diatonic scale built from a root pitch, and the
//! degree is shifted to produce a parallel voice (a third above or below, by
//! default). Notes that fall outside the scale are resolved by a
//! [`BlueNoteMode`].
//!
//! # Example
//!
//! ```
//! use harmony::{harmonize, Voicing, BlueNoteMode, MelodyPair, NoteEvent, ScaleType};
//!
//! let melody = vec![MelodyPair::new(NoteEvent::on(64, 100, 0), NoteEvent::off(64, 0, 480))];
//! let voicing = Voicing::new(60, ScaleType::Major.pattern(), 2, BlueNoteMode::Snap);
//!
//! let upper = harmonize(&voicing, &melody).unwrap();
//! assert_eq!(upper[0].on.pitch, 67);
//! ```

pub mod blue_note;
pub mod harmonizer;
pub mod melody;
pub mod note;
pub mod scale;
pub mod smf;

pub use blue_note::{resolve, resolve_named, BlueNoteMode};
pub use harmonizer::{
    clamp_to_midi_range, harmonize, Harmony, Voicing, LOWER_THIRD, UPPER_THIRD,
};
pub use melody::{extract_melody, Melody, MelodyExtractor, TrackEvent, DEFAULT_TEMPO};
pub use note::{MelodyPair, NoteEvent, NoteKind, Pitch, MAX_PITCH, MIN_PITCH};
pub use scale::{build_scale, IntervalPattern, Scale, ScaleType};
pub use smf::{
    read_file, read_track, write_file, write_harmony, SourceInfo, WriteOptions,
    DEFAULT_TICKS_PER_QUARTER,
};

use std::path::PathBuf;

/// Errors from scale construction, blue-note resolution and MIDI I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("interval pattern is empty")]
    EmptyPattern,

    #[error("interval pattern step {index} is {step}, steps must be positive")]
    NonPositiveStep { index: usize, step: i32 },

    #[error("unknown blue note mode '{0}' (expected snap or move)")]
    InvalidBlueNoteMode(String),

    #[error("unknown scale type '{0}' (expected major or minor)")]
    InvalidScaleType(String),

    #[error("MIDI parse error: {0}")]
    MidiParse(String),

    #[error("MIDI write error: {0}")]
    MidiWrite(String),

    #[error("track {index} not found, file has {track_count} tracks")]
    TrackNotFound { index: usize, track_count: usize },

    #[error("pitch {pitch} is outside the MIDI range 0..=127")]
    PitchOutOfRange { pitch: Pitch },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Error {
    /// True for errors caused by invalid caller-supplied parameters rather
    /// than by input data or I/O.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::EmptyPattern
                | Error::NonPositiveStep { .. }
                | Error::InvalidBlueNoteMode(_)
                | Error::InvalidScaleType(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
