pub mod ingest;
pub mod note;
pub mod rhythm;
pub mod segment;

pub use ingest::{extract_notes, PieceContext};
pub use note::{Note, NoteRepository};
pub use rhythm::quantized_durations;
pub use segment::{OnsetSlice, OnsetSliceEngine, PERCUSSION_CHANNEL};

/// Errors from onset analysis operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("ticks per quarter note must be positive")]
    InvalidResolution,
    #[error("rhythmic value count {got} does not match note count {expected}")]
    RhythmicValueMismatch { expected: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
