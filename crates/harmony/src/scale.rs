//! Diatonic scale construction over the full MIDI range.

use crate::note::{Pitch, MAX_PITCH, MIN_PITCH};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

const MAJOR_STEPS: [i32; 7] = [2, 2, 1, 2, 2, 2, 1];
const MINOR_STEPS: [i32; 7] = [2, 1, 2, 2, 1, 2, 2];

/// The cyclic sequence of semitone steps that gives a scale its shape.
///
/// Steps are expected to sum to 12 so that the pattern spans exactly one
/// octave. That is not checked; it is the caller's responsibility.
/// Emptiness and non-positive steps are rejected by [`build_scale`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalPattern(Vec<i32>);

impl IntervalPattern {
    pub fn new(steps: impl Into<Vec<i32>>) -> Self {
        Self(steps.into())
    }

    pub fn steps(&self) -> &[i32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total span of one cycle in semitones.
    pub fn span(&self) -> i32 {
        self.0.iter().sum()
    }

    fn validate(&self) -> Result<()> {
        if self.0.is_empty() {
            return Err(Error::EmptyPattern);
        }
        if let Some((index, &step)) = self.0.iter().enumerate().find(|&(_, &s)| s <= 0) {
            return Err(Error::NonPositiveStep { index, step });
        }
        Ok(())
    }
}

impl From<Vec<i32>> for IntervalPattern {
    fn from(steps: Vec<i32>) -> Self {
        Self(steps)
    }
}

/// The scale shapes offered to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleType {
    #[default]
    Major,
    /// Natural minor.
    Minor,
}

impl ScaleType {
    pub const ALL: [ScaleType; 2] = [ScaleType::Major, ScaleType::Minor];

    pub fn pattern(&self) -> IntervalPattern {
        match self {
            ScaleType::Major => IntervalPattern::new(MAJOR_STEPS),
            ScaleType::Minor => IntervalPattern::new(MINOR_STEPS),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScaleType::Major => "major",
            ScaleType::Minor => "minor",
        }
    }

    /// Parse free-form user input, falling back to major on anything
    /// unrecognized.
    pub fn parse_lenient(input: &str) -> Self {
        input.parse().unwrap_or_else(|_| {
            warn!(input, "unrecognized scale type, using major");
            ScaleType::Major
        })
    }
}

impl FromStr for ScaleType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "major" => Ok(ScaleType::Major),
            "minor" => Ok(ScaleType::Minor),
            _ => Err(Error::InvalidScaleType(s.to_string())),
        }
    }
}

impl fmt::Display for ScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ascending run of absolute pitches covering `0..=127`, anchored on a root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scale {
    pitches: Vec<Pitch>,
    pattern_len: usize,
}

impl Scale {
    pub fn pitches(&self) -> &[Pitch] {
        &self.pitches
    }

    pub fn len(&self) -> usize {
        self.pitches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pitches.is_empty()
    }

    pub fn contains(&self, pitch: Pitch) -> bool {
        self.pitches.binary_search(&pitch).is_ok()
    }

    /// Scale degree (index) of `pitch`, if it belongs to the scale.
    ///
    /// Should a pitch ever appear more than once, the occurrence whose index
    /// is closest to the pattern length wins, earliest first on a tie.
    pub fn position(&self, pitch: Pitch) -> Option<usize> {
        self.pitches
            .iter()
            .enumerate()
            .filter(|&(_, &p)| p == pitch)
            .map(|(i, _)| i)
            .min_by_key(|i| i.abs_diff(self.pattern_len))
    }

    /// Pitch at a signed degree, `None` when outside the built range.
    pub fn degree(&self, index: i64) -> Option<Pitch> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.pitches.get(i).copied())
    }

    /// The scale tone closest to `pitch`. The lower tone wins a tie.
    pub fn nearest(&self, pitch: Pitch) -> Option<Pitch> {
        self.pitches
            .iter()
            .copied()
            .min_by_key(|&p| (i32::from(p) - i32::from(pitch)).abs())
    }
}

/// Build the scale rooted at `root` by walking `pattern` upward and its
/// reverse downward until the MIDI range is exhausted in each direction.
pub fn build_scale(root: Pitch, pattern: &IntervalPattern) -> Result<Scale> {
    pattern.validate()?;

    let steps = pattern.steps();
    let max = i32::from(MAX_PITCH);
    let min = i32::from(MIN_PITCH);

    let mut above = Vec::new();
    let mut cursor = i32::from(root);
    for step in steps.iter().cycle() {
        match cursor.checked_add(*step) {
            Some(next) if next <= max => cursor = next,
            _ => break,
        }
        above.push(cursor as Pitch);
    }

    let mut below = Vec::new();
    let mut cursor = i32::from(root);
    for step in steps.iter().rev().cycle() {
        match cursor.checked_sub(*step) {
            Some(next) if next >= min => cursor = next,
            _ => break,
        }
        below.push(cursor as Pitch);
    }

    let mut pitches = Vec::with_capacity(below.len() + 1 + above.len());
    pitches.extend(below.into_iter().rev());
    pitches.push(root);
    pitches.extend(above);

    Ok(Scale {
        pitches,
        pattern_len: steps.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn c_major() -> Scale {
        build_scale(60, &ScaleType::Major.pattern()).unwrap()
    }

    #[test]
    fn c_major_contains_the_middle_octave() {
        let scale = c_major();
        let root = scale.position(60).unwrap();
        assert_eq!(
            &scale.pitches()[root..root + 8],
            &[60, 62, 64, 65, 67, 69, 71, 72]
        );
    }

    #[test]
    fn c_major_spans_the_whole_range() {
        let scale = c_major();
        assert_eq!(scale.pitches().first(), Some(&0));
        assert_eq!(scale.pitches().last(), Some(&127));
        // 7 degrees per octave, 10 full octaves plus C10..G10
        assert_eq!(scale.len(), 75);
    }

    #[test]
    fn every_root_and_pattern_yields_a_well_formed_scale() {
        for scale_type in ScaleType::ALL {
            let pattern = scale_type.pattern();
            let steps = pattern.steps();
            for root in 0..=127 {
                let scale = build_scale(root, &pattern).unwrap();
                let pitches = scale.pitches();

                assert!(pitches.windows(2).all(|w| w[0] < w[1]), "root {root}");
                assert!(pitches.iter().all(|&p| (0..=127).contains(&p)));
                assert_eq!(pitches.iter().filter(|&&p| p == root).count(), 1);

                let root_index = scale.position(root).unwrap();
                for (k, w) in pitches[root_index..].windows(2).enumerate() {
                    assert_eq!(w[1] - w[0], steps[k % steps.len()] as Pitch);
                }
                for (k, w) in pitches[..=root_index].windows(2).rev().enumerate() {
                    assert_eq!(w[1] - w[0], steps[steps.len() - 1 - k % steps.len()] as Pitch);
                }

                // Nothing more fits at either end
                let first_gap = steps[steps.len() - 1 - (root_index % steps.len())];
                assert!(i32::from(pitches[0]) - first_gap < 0);
            }
        }
    }

    #[test]
    fn root_at_the_edges() {
        let top = build_scale(127, &ScaleType::Major.pattern()).unwrap();
        assert_eq!(top.pitches().last(), Some(&127));
        assert_eq!(top.position(127), Some(top.len() - 1));

        let bottom = build_scale(0, &ScaleType::Minor.pattern()).unwrap();
        assert_eq!(bottom.pitches()[..4], [0, 2, 3, 5]);
    }

    #[test]
    fn empty_pattern_is_rejected() {
        let err = build_scale(60, &IntervalPattern::new(Vec::new())).unwrap_err();
        assert!(matches!(err, Error::EmptyPattern));
        assert!(err.is_configuration());
    }

    #[test]
    fn non_positive_step_is_rejected() {
        let err = build_scale(60, &IntervalPattern::new(vec![2, 0, 10])).unwrap_err();
        assert!(matches!(err, Error::NonPositiveStep { index: 1, step: 0 }));

        let err = build_scale(60, &IntervalPattern::new(vec![2, -2, 12])).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn huge_steps_stop_at_the_range_edges() {
        let scale = build_scale(60, &IntervalPattern::new(vec![i32::MAX])).unwrap();
        assert_eq!(scale.pitches(), &[60]);

        let scale = build_scale(60, &IntervalPattern::new(vec![100, i32::MAX])).unwrap();
        assert_eq!(scale.pitches(), &[60]);

        let scale = build_scale(0, &IntervalPattern::new(vec![64, i32::MAX])).unwrap();
        assert_eq!(scale.pitches(), &[0, 64]);
    }

    #[test]
    fn chromatic_pattern_covers_every_pitch() {
        let scale = build_scale(64, &IntervalPattern::new(vec![1])).unwrap();
        assert_eq!(scale.len(), 128);
    }

    #[test]
    fn nearest_prefers_the_lower_tone_on_ties() {
        let scale = c_major();
        assert_eq!(scale.nearest(61), Some(60));
        assert_eq!(scale.nearest(63), Some(62));
        assert_eq!(scale.nearest(66), Some(65));
        assert_eq!(scale.nearest(64), Some(64));
        assert_eq!(scale.nearest(200), Some(127));
        assert_eq!(scale.nearest(-5), Some(0));
    }

    #[test]
    fn degree_lookup_is_bounded() {
        let scale = c_major();
        assert_eq!(scale.degree(-1), None);
        assert_eq!(scale.degree(scale.len() as i64), None);
        assert_eq!(scale.degree(0), Some(0));
    }

    #[test]
    fn scale_type_parsing() {
        assert_eq!("Major".parse::<ScaleType>().unwrap(), ScaleType::Major);
        assert_eq!(" MINOR ".parse::<ScaleType>().unwrap(), ScaleType::Minor);
        assert!(matches!(
            "dorian".parse::<ScaleType>(),
            Err(Error::InvalidScaleType(_))
        ));
        assert_eq!(ScaleType::parse_lenient("dorian"), ScaleType::Major);
        assert_eq!(ScaleType::parse_lenient("minor"), ScaleType::Minor);
    }

    #[test]
    fn builtin_patterns_span_an_octave() {
        for scale_type in ScaleType::ALL {
            assert_eq!(scale_type.pattern().span(), 12);
        }
    }
}
