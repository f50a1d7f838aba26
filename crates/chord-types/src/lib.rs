//! Chord-type classification of 12-bin pitch-class strength vectors.
//!
//! Given the accumulated strength of each pitch class in a sonority, names
//! the harmonic structure the present pitch classes form: dyad, one of the
//! recognized triad or seventh-chord types in any inversion, a catch-all
//! "other" tag for unrecognized 3- and 4-note sets, or complex for anything
//! larger. Stateless; strength magnitudes only matter as presence/absence.

use serde::{Deserialize, Serialize};

/// Number of pitch classes (C = 0 through B = 11).
pub const PITCH_CLASSES: usize = 12;

/// Errors from chord classification.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("expected a {expected}-bin pitch-class vector, got {got}")]
    InvalidInput { expected: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Named harmonic structures, ordered by their stable integer codes.
///
/// Later categories are defined by exclusion of earlier ones: `OtherTriad`
/// is any 3-note set matching no recognized triad, `OtherFourNote` any
/// 4-note set matching no recognized seventh chord, `Complex` any set of 5
/// or more pitch classes regardless of structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChordType {
    Partial,
    MinorTriad,
    MajorTriad,
    DiminishedTriad,
    AugmentedTriad,
    OtherTriad,
    MinorSeventh,
    DominantSeventh,
    MajorSeventh,
    OtherFourNote,
    Complex,
}

impl ChordType {
    /// Stable integer code for downstream feature vectors.
    pub fn code(&self) -> u8 {
        match self {
            ChordType::Partial => 0,
            ChordType::MinorTriad => 1,
            ChordType::MajorTriad => 2,
            ChordType::DiminishedTriad => 3,
            ChordType::AugmentedTriad => 4,
            ChordType::OtherTriad => 5,
            ChordType::MinorSeventh => 6,
            ChordType::DominantSeventh => 7,
            ChordType::MajorSeventh => 8,
            ChordType::OtherFourNote => 9,
            ChordType::Complex => 10,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChordType::Partial => "partial chord",
            ChordType::MinorTriad => "minor triad",
            ChordType::MajorTriad => "major triad",
            ChordType::DiminishedTriad => "diminished triad",
            ChordType::AugmentedTriad => "augmented triad",
            ChordType::OtherTriad => "other triad",
            ChordType::MinorSeventh => "minor seventh chord",
            ChordType::DominantSeventh => "dominant seventh chord",
            ChordType::MajorSeventh => "major seventh chord",
            ChordType::OtherFourNote => "other four-note chord",
            ChordType::Complex => "complex chord",
        }
    }
}

impl std::fmt::Display for ChordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Canonical adjacent-interval patterns of the sorted pitch-class set, one
/// row per inversion (root position, first, second).
const MINOR_TRIAD_INVERSIONS: [[u8; 2]; 3] = [[3, 4], [4, 5], [5, 3]];
const MAJOR_TRIAD_INVERSIONS: [[u8; 2]; 3] = [[4, 3], [3, 5], [5, 4]];
const DIMINISHED_TRIAD_INVERSIONS: [[u8; 2]; 3] = [[3, 3], [3, 6], [6, 3]];
const AUGMENTED_TRIAD_INVERSIONS: [[u8; 2]; 3] = [[4, 4], [4, 4], [4, 4]];

/// One row per inversion (root position, first, second, third).
const MINOR_SEVENTH_INVERSIONS: [[u8; 3]; 4] = [[3, 4, 3], [4, 3, 2], [3, 2, 3], [2, 3, 4]];
const DOMINANT_SEVENTH_INVERSIONS: [[u8; 3]; 4] = [[4, 3, 3], [3, 3, 2], [3, 2, 4], [2, 4, 3]];
const MAJOR_SEVENTH_INVERSIONS: [[u8; 3]; 4] = [[4, 3, 4], [3, 4, 1], [4, 1, 4], [1, 4, 3]];

/// Triad tests in dispatch order. First match wins; `OtherTriad` is what
/// remains when every test fails.
const TRIAD_TESTS: [(ChordType, &[[u8; 2]; 3]); 4] = [
    (ChordType::MinorTriad, &MINOR_TRIAD_INVERSIONS),
    (ChordType::MajorTriad, &MAJOR_TRIAD_INVERSIONS),
    (ChordType::DiminishedTriad, &DIMINISHED_TRIAD_INVERSIONS),
    (ChordType::AugmentedTriad, &AUGMENTED_TRIAD_INVERSIONS),
];

/// Seventh-chord tests in dispatch order.
const SEVENTH_TESTS: [(ChordType, &[[u8; 3]; 4]); 3] = [
    (ChordType::MinorSeventh, &MINOR_SEVENTH_INVERSIONS),
    (ChordType::DominantSeventh, &DOMINANT_SEVENTH_INVERSIONS),
    (ChordType::MajorSeventh, &MAJOR_SEVENTH_INVERSIONS),
];

/// Classify a 12-bin pitch-class strength vector into a chord type.
///
/// A bin is present when its strength is greater than zero; magnitudes are
/// otherwise ignored. `Ok(None)` means fewer than two pitch classes are
/// present — an expected outcome, since the taxonomy has no unison or empty
/// category. A vector of the wrong length is a usage error.
pub fn classify(strengths: &[f64]) -> Result<Option<ChordType>> {
    if strengths.len() != PITCH_CLASSES {
        return Err(Error::InvalidInput {
            expected: PITCH_CLASSES,
            got: strengths.len(),
        });
    }

    let present: Vec<u8> = strengths
        .iter()
        .enumerate()
        .filter(|(_, &s)| s > 0.0)
        .map(|(pc, _)| pc as u8)
        .collect();

    let chord = match present.len() {
        0 | 1 => None,
        2 => Some(ChordType::Partial),
        3 => Some(match_triad(&present).unwrap_or(ChordType::OtherTriad)),
        4 => Some(match_seventh(&present).unwrap_or(ChordType::OtherFourNote)),
        _ => Some(ChordType::Complex),
    };

    Ok(chord)
}

fn match_triad(present: &[u8]) -> Option<ChordType> {
    for (chord, inversions) in TRIAD_TESTS {
        if inversions.iter().any(|row| matches_pattern(present, row)) {
            return Some(chord);
        }
    }
    None
}

fn match_seventh(present: &[u8]) -> Option<ChordType> {
    for (chord, inversions) in SEVENTH_TESTS {
        if inversions.iter().any(|row| matches_pattern(present, row)) {
            return Some(chord);
        }
    }
    None
}

/// Positional comparison of adjacent intervals: every position must match.
/// `present` is sorted ascending and one longer than `pattern`.
fn matches_pattern(present: &[u8], pattern: &[u8]) -> bool {
    debug_assert_eq!(present.len(), pattern.len() + 1);
    pattern
        .iter()
        .enumerate()
        .all(|(i, &interval)| present[i + 1] - present[i] == interval)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Strength vector with the given pitch classes present at strength 1.
    fn strengths(pcs: &[u8]) -> Vec<f64> {
        let mut v = vec![0.0; PITCH_CLASSES];
        for &pc in pcs {
            v[pc as usize] = 1.0;
        }
        v
    }

    fn classify_pcs(pcs: &[u8]) -> Option<ChordType> {
        classify(&strengths(pcs)).unwrap()
    }

    #[test]
    fn wrong_length_is_a_usage_error() {
        assert!(matches!(
            classify(&[0.0; 11]),
            Err(Error::InvalidInput {
                expected: 12,
                got: 11
            })
        ));
        assert!(matches!(
            classify(&[0.0; 13]),
            Err(Error::InvalidInput {
                expected: 12,
                got: 13
            })
        ));
    }

    #[test]
    fn empty_and_unison_have_no_recognized_type() {
        assert_eq!(classify(&[0.0; 12]).unwrap(), None);
        assert_eq!(classify_pcs(&[5]), None);
    }

    #[test]
    fn any_two_note_set_is_partial() {
        assert_eq!(classify_pcs(&[0, 7]), Some(ChordType::Partial));
        assert_eq!(classify_pcs(&[3, 4]), Some(ChordType::Partial));
        assert_eq!(classify_pcs(&[0, 11]), Some(ChordType::Partial));
    }

    #[test]
    fn major_triads_in_every_inversion_pattern() {
        // Concrete transpositions covering each canonical interval row.
        assert_eq!(classify_pcs(&[0, 4, 7]), Some(ChordType::MajorTriad)); // C: (4,3)
        assert_eq!(classify_pcs(&[2, 5, 10]), Some(ChordType::MajorTriad)); // Bb: (3,5)
        assert_eq!(classify_pcs(&[2, 7, 11]), Some(ChordType::MajorTriad)); // G: (5,4)
    }

    #[test]
    fn minor_triads_in_every_inversion_pattern() {
        assert_eq!(classify_pcs(&[0, 3, 7]), Some(ChordType::MinorTriad)); // Cm: (3,4)
        assert_eq!(classify_pcs(&[0, 4, 9]), Some(ChordType::MinorTriad)); // Am: (4,5)
        assert_eq!(classify_pcs(&[0, 5, 8]), Some(ChordType::MinorTriad)); // Fm: (5,3)
    }

    #[test]
    fn diminished_and_augmented_triads() {
        assert_eq!(classify_pcs(&[0, 3, 6]), Some(ChordType::DiminishedTriad)); // (3,3)
        assert_eq!(classify_pcs(&[2, 5, 11]), Some(ChordType::DiminishedTriad)); // Bdim: (3,6)
        assert_eq!(classify_pcs(&[2, 8, 11]), Some(ChordType::DiminishedTriad)); // (6,3)
        assert_eq!(classify_pcs(&[0, 4, 8]), Some(ChordType::AugmentedTriad));
        assert_eq!(classify_pcs(&[1, 5, 9]), Some(ChordType::AugmentedTriad));
    }

    #[test]
    fn unrecognized_three_note_sets_are_other_triad() {
        assert_eq!(classify_pcs(&[0, 5, 7]), Some(ChordType::OtherTriad)); // sus4
        assert_eq!(classify_pcs(&[0, 2, 7]), Some(ChordType::OtherTriad)); // sus2
        assert_eq!(classify_pcs(&[0, 1, 2]), Some(ChordType::OtherTriad)); // cluster
    }

    #[test]
    fn minor_sevenths_in_every_inversion_pattern() {
        assert_eq!(classify_pcs(&[0, 3, 7, 10]), Some(ChordType::MinorSeventh)); // (3,4,3)
        assert_eq!(classify_pcs(&[0, 4, 7, 9]), Some(ChordType::MinorSeventh)); // Am7: (4,3,2)
        assert_eq!(classify_pcs(&[1, 4, 6, 9]), Some(ChordType::MinorSeventh)); // F#m7: (3,2,3)
        assert_eq!(classify_pcs(&[2, 4, 7, 11]), Some(ChordType::MinorSeventh)); // Em7: (2,3,4)
    }

    #[test]
    fn dominant_sevenths_in_every_inversion_pattern() {
        assert_eq!(classify_pcs(&[0, 4, 7, 10]), Some(ChordType::DominantSeventh)); // (4,3,3)
        assert_eq!(classify_pcs(&[3, 6, 9, 11]), Some(ChordType::DominantSeventh)); // B7: (3,3,2)
        assert_eq!(classify_pcs(&[2, 5, 7, 11]), Some(ChordType::DominantSeventh)); // G7: (3,2,4)
        assert_eq!(classify_pcs(&[0, 2, 6, 9]), Some(ChordType::DominantSeventh)); // D7: (2,4,3)
    }

    #[test]
    fn major_sevenths_in_every_inversion_pattern() {
        assert_eq!(classify_pcs(&[0, 4, 7, 11]), Some(ChordType::MajorSeventh)); // (4,3,4)
        assert_eq!(classify_pcs(&[1, 4, 8, 9]), Some(ChordType::MajorSeventh)); // Amaj7: (3,4,1)
        assert_eq!(classify_pcs(&[2, 6, 7, 11]), Some(ChordType::MajorSeventh)); // Gmaj7: (4,1,4)
        assert_eq!(classify_pcs(&[1, 2, 6, 9]), Some(ChordType::MajorSeventh)); // Dmaj7: (1,4,3)
    }

    #[test]
    fn unrecognized_four_note_sets_are_other_four_note() {
        assert_eq!(classify_pcs(&[0, 3, 6, 9]), Some(ChordType::OtherFourNote)); // dim7
        assert_eq!(classify_pcs(&[0, 3, 6, 10]), Some(ChordType::OtherFourNote)); // m7b5
        assert_eq!(classify_pcs(&[0, 1, 2, 3]), Some(ChordType::OtherFourNote)); // cluster
    }

    #[test]
    fn five_or_more_pitch_classes_are_complex() {
        assert_eq!(classify_pcs(&[0, 2, 4, 7, 9]), Some(ChordType::Complex));
        assert_eq!(
            classify_pcs(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]),
            Some(ChordType::Complex)
        );
    }

    #[test]
    fn strength_magnitude_is_ignored() {
        let mut v = vec![0.0; PITCH_CLASSES];
        v[0] = 0.001;
        v[4] = 250.0;
        v[7] = 1.0;
        assert_eq!(classify(&v).unwrap(), Some(ChordType::MajorTriad));
    }

    #[test]
    fn codes_are_stable() {
        let expected: [(ChordType, u8); 11] = [
            (ChordType::Partial, 0),
            (ChordType::MinorTriad, 1),
            (ChordType::MajorTriad, 2),
            (ChordType::DiminishedTriad, 3),
            (ChordType::AugmentedTriad, 4),
            (ChordType::OtherTriad, 5),
            (ChordType::MinorSeventh, 6),
            (ChordType::DominantSeventh, 7),
            (ChordType::MajorSeventh, 8),
            (ChordType::OtherFourNote, 9),
            (ChordType::Complex, 10),
        ];
        for (chord, code) in expected {
            assert_eq!(chord.code(), code);
        }
    }
}
