use serde::{Deserialize, Serialize};

/// A MIDI note number.
///
/// Input pitches are always in `0..=127`, but harmonization in
/// [`BlueNoteMode::Move`](crate::BlueNoteMode::Move) may shift a note past
/// either end, so the type is signed and wider than a MIDI data byte.
pub type Pitch = i16;

pub const MIN_PITCH: Pitch = 0;
pub const MAX_PITCH: Pitch = 127;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    On,
    Off,
}

/// A single note-on or note-off message with delta timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub kind: NoteKind,
    pub pitch: Pitch,
    pub velocity: u8,
    /// Ticks since the previous event.
    pub delta: u32,
    pub channel: u8,
}

impl NoteEvent {
    pub fn on(pitch: Pitch, velocity: u8, delta: u32) -> Self {
        Self {
            kind: NoteKind::On,
            pitch,
            velocity,
            delta,
            channel: 0,
        }
    }

    pub fn off(pitch: Pitch, velocity: u8, delta: u32) -> Self {
        Self {
            kind: NoteKind::Off,
            pitch,
            velocity,
            delta,
            channel: 0,
        }
    }

    pub fn with_channel(mut self, channel: u8) -> Self {
        self.channel = channel & 0x0F;
        self
    }

    pub fn with_pitch(mut self, pitch: Pitch) -> Self {
        self.pitch = pitch;
        self
    }

    pub fn is_on(&self) -> bool {
        self.kind == NoteKind::On
    }
}

/// A matched note-on/note-off pair for one sounding note.
///
/// The on-event's delta is relative to whatever preceded it, the off-event's
/// delta is relative to the on-event. Both events carry the same pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MelodyPair {
    pub on: NoteEvent,
    pub off: NoteEvent,
}

impl MelodyPair {
    pub fn new(on: NoteEvent, off: NoteEvent) -> Self {
        debug_assert_eq!(on.pitch, off.pitch, "pair pitches must match");
        Self { on, off }
    }

    pub fn pitch(&self) -> Pitch {
        self.on.pitch
    }

    /// Same timing and velocities, new pitch on both events.
    pub fn with_pitch(&self, pitch: Pitch) -> Self {
        Self {
            on: self.on.with_pitch(pitch),
            off: self.off.with_pitch(pitch),
        }
    }

    /// Ticks the note sounds for.
    pub fn duration_ticks(&self) -> u32 {
        self.off.delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_pitch_keeps_timing_and_velocity() {
        let pair = MelodyPair::new(
            NoteEvent::on(60, 90, 120).with_channel(3),
            NoteEvent::off(60, 40, 480).with_channel(3),
        );
        let moved = pair.with_pitch(67);

        assert_eq!(moved.on.pitch, 67);
        assert_eq!(moved.off.pitch, 67);
        assert_eq!(moved.on.delta, 120);
        assert_eq!(moved.off.delta, 480);
        assert_eq!(moved.on.velocity, 90);
        assert_eq!(moved.off.velocity, 40);
        assert_eq!(moved.on.channel, 3);
        assert_eq!(moved.duration_ticks(), 480);
    }

    #[test]
    fn channel_is_masked_to_four_bits() {
        assert_eq!(NoteEvent::on(60, 100, 0).with_channel(0x13).channel, 3);
    }
}
