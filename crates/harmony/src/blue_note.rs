//! Resolution of melody notes that fall outside the scale.

use crate::note::Pitch;
use crate::scale::Scale;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// What to do with a shifted pitch that is not a scale tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlueNoteMode {
    /// Pull the pitch onto the nearest scale tone.
    #[default]
    Snap,
    /// Keep the pitch as is, even outside `0..=127`.
    Move,
}

impl BlueNoteMode {
    pub const ALL: [BlueNoteMode; 2] = [BlueNoteMode::Snap, BlueNoteMode::Move];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlueNoteMode::Snap => "snap",
            BlueNoteMode::Move => "move",
        }
    }

    /// Parse free-form user input, falling back to snap on anything
    /// unrecognized.
    pub fn parse_lenient(input: &str) -> Self {
        input.parse().unwrap_or_else(|_| {
            warn!(input, "unrecognized blue note mode, using snap");
            BlueNoteMode::Snap
        })
    }
}

impl FromStr for BlueNoteMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "snap" => Ok(BlueNoteMode::Snap),
            "move" => Ok(BlueNoteMode::Move),
            _ => Err(Error::InvalidBlueNoteMode(s.to_string())),
        }
    }
}

impl fmt::Display for BlueNoteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve an out-of-scale pitch under `mode`.
pub fn resolve(pitch: Pitch, scale: &Scale, mode: BlueNoteMode) -> Pitch {
    match mode {
        BlueNoteMode::Snap => scale.nearest(pitch).unwrap_or(pitch),
        BlueNoteMode::Move => pitch,
    }
}

/// Like [`resolve`], with the mode given as text. Unknown modes are an error.
pub fn resolve_named(pitch: Pitch, scale: &Scale, mode: &str) -> Result<Pitch> {
    Ok(resolve(pitch, scale, mode.parse()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::{build_scale, IntervalPattern, ScaleType};

    fn c_major() -> Scale {
        build_scale(60, &ScaleType::Major.pattern()).unwrap()
    }

    #[test]
    fn snap_moves_to_nearest_tone() {
        let scale = c_major();
        assert_eq!(resolve(66, &scale, BlueNoteMode::Snap), 65);
        assert_eq!(resolve(68, &scale, BlueNoteMode::Snap), 67);
        assert_eq!(resolve(65, &scale, BlueNoteMode::Snap), 65);
    }

    #[test]
    fn snap_tie_goes_to_lower_tone() {
        // Whole-tone gaps leave the odd pitches equidistant from two tones
        let scale = build_scale(60, &IntervalPattern::new(vec![2, 2, 2, 2, 2, 2])).unwrap();
        assert_eq!(resolve(61, &scale, BlueNoteMode::Snap), 60);
        assert_eq!(resolve(71, &scale, BlueNoteMode::Snap), 70);
    }

    #[test]
    fn snap_pulls_out_of_range_pitches_back_in() {
        let scale = c_major();
        assert_eq!(resolve(140, &scale, BlueNoteMode::Snap), 127);
        assert_eq!(resolve(-3, &scale, BlueNoteMode::Snap), 0);
    }

    #[test]
    fn move_passes_through_without_clamping() {
        let scale = c_major();
        assert_eq!(resolve(66, &scale, BlueNoteMode::Move), 66);
        assert_eq!(resolve(130, &scale, BlueNoteMode::Move), 130);
        assert_eq!(resolve(-1, &scale, BlueNoteMode::Move), -1);
    }

    #[test]
    fn named_modes() {
        let scale = c_major();
        assert_eq!(resolve_named(66, &scale, "SNAP").unwrap(), 65);
        assert_eq!(resolve_named(66, &scale, "move").unwrap(), 66);

        let err = resolve_named(66, &scale, "foo").unwrap_err();
        assert!(matches!(err, Error::InvalidBlueNoteMode(ref m) if m == "foo"));
        assert!(err.is_configuration());
    }

    #[test]
    fn lenient_parse_defaults_to_snap() {
        assert_eq!(BlueNoteMode::parse_lenient("Move"), BlueNoteMode::Move);
        assert_eq!(BlueNoteMode::parse_lenient("bend"), BlueNoteMode::Snap);
        assert_eq!(BlueNoteMode::parse_lenient(""), BlueNoteMode::Snap);
    }
}
