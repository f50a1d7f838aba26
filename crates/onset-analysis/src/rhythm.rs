use crate::note::NoteRepository;
use crate::{Error, Result};

/// Standard rhythmic values in quarter-note units, shortest first:
/// thirty-second note through dotted double whole note.
const RHYTHMIC_VALUES: [f64; 13] = [
    0.125, 0.25, 0.375, 0.5, 0.75, 1.0, 1.5, 2.0, 3.0, 4.0, 6.0, 8.0, 12.0,
];

/// Quantize each note's duration to the nearest standard rhythmic value,
/// expressed as a fraction of a quarter note.
///
/// Output is index-aligned with `repo.all()`. Durations shorter than a
/// thirty-second note clamp up to a thirty-second note; nothing quantizes
/// to zero.
pub fn quantized_durations(repo: &NoteRepository, ppq: u16) -> Result<Vec<f64>> {
    if ppq == 0 {
        return Err(Error::InvalidResolution);
    }
    let ppq = ppq as f64;

    Ok(repo
        .all()
        .iter()
        .map(|note| nearest_rhythmic_value(note.duration_ticks() as f64 / ppq))
        .collect())
}

/// Snap a quarter-note fraction to the nearest table entry. Ties resolve to
/// the shorter value.
fn nearest_rhythmic_value(fraction: f64) -> f64 {
    let mut best = RHYTHMIC_VALUES[0];
    let mut best_distance = (fraction - best).abs();
    for &value in &RHYTHMIC_VALUES[1..] {
        let distance = (fraction - value).abs();
        if distance < best_distance {
            best = value;
            best_distance = distance;
        }
    }
    best
}
