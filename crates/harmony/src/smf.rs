//! Standard MIDI File input and output.
//!
//! Reading reduces one track to [`TrackEvent`]s for the melody scanner.
//! Writing emits a single-track (format 0) file with each harmonized pair as
//! an adjacent note-on/note-off, deltas copied verbatim.

use crate::melody::TrackEvent;
use crate::note::{MelodyPair, NoteEvent, Pitch};
use crate::{Error, Result};
use midly::num::{u15, u24, u28, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEventKind};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Resolution used when the source has none (timecode timing) and the
/// default for written files.
pub const DEFAULT_TICKS_PER_QUARTER: u16 = 480;

const MAX_DELTA: u32 = 0x0FFF_FFFF;
const MAX_TEMPO: u32 = 0x00FF_FFFF;

/// Facts about the file a melody was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub format: u8,
    pub ticks_per_quarter: u16,
    pub track_count: usize,
}

/// Read one track from SMF bytes.
pub fn read_track(bytes: &[u8], track_index: usize) -> Result<(Vec<TrackEvent>, SourceInfo)> {
    let smf = Smf::parse(bytes).map_err(|e| Error::MidiParse(e.to_string()))?;

    let ticks_per_quarter = match smf.header.timing {
        Timing::Metrical(ticks) => ticks.as_int(),
        Timing::Timecode(_, _) => DEFAULT_TICKS_PER_QUARTER,
    };
    let format = match smf.header.format {
        Format::SingleTrack => 0,
        Format::Parallel => 1,
        Format::Sequential => 2,
    };
    let info = SourceInfo {
        format,
        ticks_per_quarter,
        track_count: smf.tracks.len(),
    };

    let track = smf.tracks.get(track_index).ok_or(Error::TrackNotFound {
        index: track_index,
        track_count: info.track_count,
    })?;

    let events: Vec<TrackEvent> = track
        .iter()
        .map(|event| convert_event(event.delta.as_int(), &event.kind))
        .collect();

    debug!(
        track = track_index,
        events = events.len(),
        ppq = ticks_per_quarter,
        "read melody track"
    );

    Ok((events, info))
}

fn convert_event(delta: u32, kind: &TrackEventKind<'_>) -> TrackEvent {
    match *kind {
        TrackEventKind::Midi { channel, message } => {
            let channel = channel.as_int();
            match message {
                MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => TrackEvent::Note(
                    NoteEvent::on(Pitch::from(key.as_int()), vel.as_int(), delta)
                        .with_channel(channel),
                ),
                // Zero-velocity note-on is a note-off
                MidiMessage::NoteOff { key, vel } | MidiMessage::NoteOn { key, vel } => {
                    TrackEvent::Note(
                        NoteEvent::off(Pitch::from(key.as_int()), vel.as_int(), delta)
                            .with_channel(channel),
                    )
                }
                _ => TrackEvent::Other { delta },
            }
        }
        TrackEventKind::Meta(MetaMessage::Tempo(tempo)) => TrackEvent::Tempo {
            delta,
            micros_per_quarter: tempo.as_int(),
        },
        _ => TrackEvent::Other { delta },
    }
}

/// Read one track from a MIDI file on disk.
pub fn read_file(path: impl AsRef<Path>, track_index: usize) -> Result<(Vec<TrackEvent>, SourceInfo)> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_track(&bytes, track_index)
}

/// Options for writing a harmony.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteOptions {
    pub ticks_per_quarter: u16,
    /// Tempo meta event written at tick 0, microseconds per quarter note.
    pub tempo: Option<u32>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            ticks_per_quarter: DEFAULT_TICKS_PER_QUARTER,
            tempo: None,
        }
    }
}

/// Encode a harmony as SMF format 0 bytes.
///
/// Fails if any pitch lies outside `0..=127`.
pub fn write_harmony(harmony: &[MelodyPair], options: &WriteOptions) -> Result<Vec<u8>> {
    let mut track: Track<'static> = Vec::with_capacity(harmony.len() * 2 + 2);

    if let Some(tempo) = options.tempo {
        track.push(midly::TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo.min(MAX_TEMPO)))),
        });
    }

    for pair in harmony {
        track.push(encode_note(&pair.on)?);
        track.push(encode_note(&pair.off)?);
    }

    track.push(midly::TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    let smf = Smf {
        header: Header::new(
            Format::SingleTrack,
            Timing::Metrical(u15::new(options.ticks_per_quarter.min(0x7FFF))),
        ),
        tracks: vec![track],
    };

    let mut buf = Vec::new();
    smf.write(&mut buf)
        .map_err(|e| Error::MidiWrite(e.to_string()))?;
    Ok(buf)
}

fn encode_note(note: &NoteEvent) -> Result<midly::TrackEvent<'static>> {
    let key = u8::try_from(note.pitch)
        .ok()
        .filter(|&k| k <= 127)
        .map(u7::new)
        .ok_or(Error::PitchOutOfRange { pitch: note.pitch })?;
    let vel = u7::new(note.velocity.min(127));
    let message = if note.is_on() {
        MidiMessage::NoteOn { key, vel }
    } else {
        MidiMessage::NoteOff { key, vel }
    };

    Ok(midly::TrackEvent {
        delta: u28::new(note.delta.min(MAX_DELTA)),
        kind: TrackEventKind::Midi {
            channel: u4::new(note.channel & 0x0F),
            message,
        },
    })
}

/// Encode a harmony and write it to `path`, creating parent directories.
pub fn write_file(
    path: impl AsRef<Path>,
    harmony: &[MelodyPair],
    options: &WriteOptions,
) -> Result<()> {
    let path = path.as_ref();
    let bytes = write_harmony(harmony, options)?;

    let io_err = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, bytes).map_err(io_err)?;

    debug!(path = %path.display(), notes = harmony.len(), "wrote harmony");
    Ok(())
}
