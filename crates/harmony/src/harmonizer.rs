//! Parallel-voice generation by scale-degree shifting.

use crate::blue_note::{resolve, BlueNoteMode};
use crate::note::{MelodyPair, Pitch, MAX_PITCH, MIN_PITCH};
use crate::scale::{build_scale, IntervalPattern, Scale};
use crate::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Degree offset for a voice a diatonic third above the melody.
pub const UPPER_THIRD: i16 = 2;

/// Degree offset for a voice a diatonic third below the melody.
pub const LOWER_THIRD: i16 = -2;

/// A harmonized voice: one pair per melody pair, same timing.
pub type Harmony = Vec<MelodyPair>;

/// Parameters for one harmonized voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voicing {
    pub root: Pitch,
    pub pattern: IntervalPattern,
    /// Scale degrees for in-scale notes, semitones for blue notes.
    pub degree_offset: i16,
    pub blue_note_mode: BlueNoteMode,
}

impl Voicing {
    pub fn new(
        root: Pitch,
        pattern: IntervalPattern,
        degree_offset: i16,
        blue_note_mode: BlueNoteMode,
    ) -> Self {
        Self {
            root,
            pattern,
            degree_offset,
            blue_note_mode,
        }
    }

    pub fn third_above(root: Pitch, pattern: IntervalPattern, mode: BlueNoteMode) -> Self {
        Self::new(root, pattern, UPPER_THIRD, mode)
    }

    pub fn third_below(root: Pitch, pattern: IntervalPattern, mode: BlueNoteMode) -> Self {
        Self::new(root, pattern, LOWER_THIRD, mode)
    }
}

/// Harmonize a melody under `voicing`.
///
/// In-scale notes move by `degree_offset` scale degrees and keep their
/// original pitch when the shift would leave the built scale. Blue notes move
/// by `degree_offset` semitones and are then resolved by the blue note mode.
pub fn harmonize(voicing: &Voicing, melody: &[MelodyPair]) -> Result<Harmony> {
    let scale = build_scale(voicing.root, &voicing.pattern)?;
    debug!(
        root = voicing.root,
        degrees = scale.len(),
        offset = voicing.degree_offset,
        mode = %voicing.blue_note_mode,
        notes = melody.len(),
        "harmonizing"
    );

    Ok(melody
        .iter()
        .map(|pair| {
            let pitch = harmonize_pitch(
                pair.pitch(),
                &scale,
                voicing.degree_offset,
                voicing.blue_note_mode,
            );
            pair.with_pitch(pitch)
        })
        .collect())
}

fn harmonize_pitch(pitch: Pitch, scale: &Scale, offset: i16, mode: BlueNoteMode) -> Pitch {
    match scale.position(pitch) {
        Some(index) => scale
            .degree(index as i64 + i64::from(offset))
            .unwrap_or(pitch),
        None => resolve(pitch.saturating_add(offset), scale, mode),
    }
}

/// Clamp every pitch into the MIDI range.
///
/// Harmonization leaves out-of-range pitches alone; run this stage when the
/// output has to be encodable no matter what.
pub fn clamp_to_midi_range(harmony: Harmony) -> Harmony {
    harmony
        .into_iter()
        .map(|pair| pair.with_pitch(pair.pitch().clamp(MIN_PITCH, MAX_PITCH)))
        .collect()
}
