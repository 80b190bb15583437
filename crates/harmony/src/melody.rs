//! Note-on/note-off pairing for a monophonic melody track.
//!
//! The scanner assumes one sounding note at a time. A note-on that arrives
//! while another note is held closes the held note; a note-off whose pitch
//! does not match the held note is dropped; a note still held when the stream
//! ends is discarded.

use crate::note::{MelodyPair, NoteEvent, NoteKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Tempo assumed when a track carries no tempo meta event (120 BPM).
pub const DEFAULT_TEMPO: u32 = 500_000;

/// One event from a melody track, reduced to what the scanner cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrackEvent {
    Note(NoteEvent),
    Tempo { delta: u32, micros_per_quarter: u32 },
    Other { delta: u32 },
}

impl From<NoteEvent> for TrackEvent {
    fn from(note: NoteEvent) -> Self {
        TrackEvent::Note(note)
    }
}

/// Extracted melody: ordered note pairs plus the last tempo seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Melody {
    pub pairs: Vec<MelodyPair>,
    /// Microseconds per quarter note.
    pub tempo: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Idle,
    Holding(NoteEvent),
}

/// Incremental scanner. Feed events in track order, then call [`finish`].
///
/// [`finish`]: MelodyExtractor::finish
#[derive(Debug)]
pub struct MelodyExtractor {
    state: ScanState,
    pairs: Vec<MelodyPair>,
    tempo: Option<u32>,
    repaired: usize,
    dropped: usize,
}

impl Default for MelodyExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MelodyExtractor {
    pub fn new() -> Self {
        Self {
            state: ScanState::Idle,
            pairs: Vec::new(),
            tempo: None,
            repaired: 0,
            dropped: 0,
        }
    }

    pub fn feed(&mut self, event: &TrackEvent) {
        match *event {
            TrackEvent::Tempo {
                micros_per_quarter, ..
            } => self.tempo = Some(micros_per_quarter),
            TrackEvent::Other { .. } => {}
            TrackEvent::Note(note) => self.feed_note(note),
        }
    }

    fn feed_note(&mut self, note: NoteEvent) {
        self.state = match (self.state, note.kind) {
            (ScanState::Idle, NoteKind::On) => ScanState::Holding(note),
            (ScanState::Idle, NoteKind::Off) => ScanState::Idle,
            (ScanState::Holding(pending), NoteKind::On) => {
                // The held note was never released; end it where the new one
                // starts, measured from the held note's own delta.
                let off_delta = note.delta.saturating_sub(pending.delta);
                let off = NoteEvent {
                    kind: NoteKind::Off,
                    delta: off_delta,
                    ..pending
                };
                warn!(
                    pitch = pending.pitch,
                    next_pitch = note.pitch,
                    off_delta,
                    "note-on while a note is held, closing the held note"
                );
                self.pairs.push(MelodyPair::new(pending, off));
                self.repaired += 1;
                ScanState::Holding(note)
            }
            (ScanState::Holding(pending), NoteKind::Off) if note.pitch == pending.pitch => {
                self.pairs.push(MelodyPair::new(pending, note));
                ScanState::Idle
            }
            (ScanState::Holding(pending), NoteKind::Off) => {
                debug!(
                    held = pending.pitch,
                    released = note.pitch,
                    "dropping note-off that does not match the held note"
                );
                self.dropped += 1;
                ScanState::Holding(pending)
            }
        };
    }

    pub fn finish(self) -> Melody {
        if let ScanState::Holding(pending) = self.state {
            warn!(
                pitch = pending.pitch,
                "track ended with a note still held, discarding it"
            );
        }
        debug!(
            pairs = self.pairs.len(),
            repaired = self.repaired,
            dropped = self.dropped,
            "melody extracted"
        );
        Melody {
            pairs: self.pairs,
            tempo: self.tempo.unwrap_or(DEFAULT_TEMPO),
        }
    }
}

/// Scan a whole track into melody pairs.
pub fn extract_melody<'a>(events: impl IntoIterator<Item = &'a TrackEvent>) -> Melody {
    let mut extractor = MelodyExtractor::new();
    for event in events {
        extractor.feed(event);
    }
    extractor.finish()
}
