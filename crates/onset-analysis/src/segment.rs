use crate::ingest::PieceContext;
use crate::note::{Note, NoteRepository};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Channel index reserved for percussion. Its notes carry instrument ids,
/// not pitches, and never enter slices.
pub const PERCUSSION_CHANNEL: u8 = 15;

/// Channels per track in the per-slot tables.
const CHANNELS: usize = 16;

/// Pitches considered simultaneous for analysis purposes, sorted ascending.
/// A pitch sounding in two voices at once appears twice.
pub type OnsetSlice = Vec<u8>;

/// Segments a piece's note onsets into an ordered sequence of simultaneities.
///
/// Built once per piece with a single forward pass over ticks, immutable
/// afterwards. Onsets closer together than the lookahead tolerance are folded
/// into one slice, modeling slightly desynchronized attacks of the same
/// musical instant. Four index-aligned views are kept: all sounding pitches
/// vs. freshly attacked pitches, each globally and per (track, channel).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnsetSliceEngine {
    lookahead_ticks: u64,
    slices: Vec<OnsetSlice>,
    slices_new_onsets: Vec<OnsetSlice>,
    /// Indexed [track][channel], each slot aligned 1:1 with `slices`.
    by_slot: Vec<Vec<Vec<OnsetSlice>>>,
    by_slot_new_onsets: Vec<Vec<Vec<OnsetSlice>>>,
}

impl OnsetSliceEngine {
    /// Segment a piece into onset slices.
    ///
    /// `context` supplies the piece's resolution, tick length, and track
    /// count; the per-(track, channel) tables cover every track in the piece,
    /// including trailing tracks that carry only meta events and no notes.
    /// `rhythmic_values` holds one quantized duration per note in `repo`
    /// (index-aligned with `repo.all()`, in quarter-note fractions) and is
    /// used only to derive the lookahead tolerance. A zero resolution or a
    /// length mismatch is a configuration error.
    pub fn segment(
        repo: &NoteRepository,
        context: &PieceContext,
        rhythmic_values: &[f64],
    ) -> Result<Self> {
        if context.ppq == 0 {
            return Err(Error::InvalidResolution);
        }
        if rhythmic_values.len() != repo.len() {
            return Err(Error::RhythmicValueMismatch {
                expected: repo.len(),
                got: rhythmic_values.len(),
            });
        }

        let track_count = repo.track_count().max(context.track_count);
        let mut engine = Self {
            lookahead_ticks: lookahead_ticks(context.ppq, rhythmic_values),
            slices: Vec::new(),
            slices_new_onsets: Vec::new(),
            by_slot: vec![vec![Vec::new(); CHANNELS]; track_count],
            by_slot_new_onsets: vec![vec![Vec::new(); CHANNELS]; track_count],
        };

        let mut sounding: Vec<Note> = Vec::new();
        let mut tick = 0u64;
        while tick < context.tick_length {
            if has_slice_trigger(repo, tick) {
                tick = engine.build_slice(repo, tick, context.tick_length, &mut sounding);
            } else {
                tick += 1;
            }
        }

        debug!(
            slices = engine.slices.len(),
            lookahead_ticks = engine.lookahead_ticks,
            "segmented piece into onset slices"
        );

        Ok(engine)
    }

    /// Build one slice anchored at `start_tick`, returning the tick to resume
    /// scanning from. The lookahead window is anchored to `start_tick` and
    /// does not slide as later onsets merge in.
    fn build_slice(
        &mut self,
        repo: &NoteRepository,
        start_tick: u64,
        tick_length: u64,
        sounding: &mut Vec<Note>,
    ) -> u64 {
        let slice_index = self.slices.len();
        self.slices.push(Vec::new());
        self.slices_new_onsets.push(Vec::new());
        for track in 0..self.by_slot.len() {
            for channel in 0..CHANNELS {
                self.by_slot[track][channel].push(Vec::new());
                self.by_slot_new_onsets[track][channel].push(Vec::new());
            }
        }

        // Sustained notes: still sounding at the anchor tick (ends exclusive)
        sounding.retain(|n| n.end_tick > start_tick);
        for note in sounding.iter() {
            self.slices[slice_index].push(note.pitch);
            self.by_slot[note.track][note.channel as usize][slice_index].push(note.pitch);
        }

        self.merge_onsets_at(repo, start_tick, slice_index, sounding);
        let mut resume = start_tick + 1;

        // Fold onsets within the lookahead window into this same slice,
        // advancing the resume point past each one so it never retriggers.
        let window_end = start_tick.saturating_add(self.lookahead_ticks).min(tick_length);
        let mut tick = start_tick + 1;
        while tick < window_end {
            if self.merge_onsets_at(repo, tick, slice_index, sounding) {
                resume = tick + 1;
            }
            tick += 1;
        }

        // Seal: every view sorted ascending by pitch
        self.slices[slice_index].sort_unstable();
        self.slices_new_onsets[slice_index].sort_unstable();
        for track in 0..self.by_slot.len() {
            for channel in 0..CHANNELS {
                self.by_slot[track][channel][slice_index].sort_unstable();
                self.by_slot_new_onsets[track][channel][slice_index].sort_unstable();
            }
        }

        resume
    }

    /// Add every non-percussion note starting at `tick` to the open slice as
    /// a fresh onset. Returns whether anything was added.
    fn merge_onsets_at(
        &mut self,
        repo: &NoteRepository,
        tick: u64,
        slice_index: usize,
        sounding: &mut Vec<Note>,
    ) -> bool {
        let mut merged = false;
        for note in repo.notes_starting_at(tick) {
            if note.channel == PERCUSSION_CHANNEL {
                continue;
            }
            let (track, channel) = (note.track, note.channel as usize);
            self.slices[slice_index].push(note.pitch);
            self.slices_new_onsets[slice_index].push(note.pitch);
            self.by_slot[track][channel][slice_index].push(note.pitch);
            self.by_slot_new_onsets[track][channel][slice_index].push(note.pitch);
            sounding.push(*note);
            merged = true;
        }
        merged
    }

    /// All sounding pitches per slice (held + freshly attacked).
    pub fn global_slices(&self) -> &[OnsetSlice] {
        &self.slices
    }

    /// Only freshly attacked pitches per slice, index-aligned with
    /// `global_slices`.
    pub fn global_slices_new_onsets_only(&self) -> &[OnsetSlice] {
        &self.slices_new_onsets
    }

    /// Held + freshly attacked pitches, indexed [track][channel][slice].
    pub fn slices_by_track_and_channel(&self) -> &[Vec<Vec<OnsetSlice>>] {
        &self.by_slot
    }

    /// Freshly attacked pitches only, indexed [track][channel][slice].
    pub fn slices_by_track_and_channel_new_onsets_only(&self) -> &[Vec<Vec<OnsetSlice>>] {
        &self.by_slot_new_onsets
    }

    pub fn slice_count(&self) -> usize {
        self.slices.len()
    }

    /// Tick tolerance within which a later onset still joins an open slice.
    pub fn lookahead_ticks(&self) -> u64 {
        self.lookahead_ticks
    }

    /// Whether the highest pitch sounding in the given (slice, track, channel)
    /// slot was attacked within that slice rather than sustained into it.
    /// Out-of-range indices and empty slots report false.
    ///
    /// The check is by pitch value, not note identity: a slot that both
    /// sustains a pitch and re-attacks the same pitch in another voice
    /// reports true for the sustained note as well. Downstream calculators
    /// are defined against this behavior, so it is kept as is.
    pub fn is_new_onset(&self, slice_index: usize, track: usize, channel: u8) -> bool {
        let held = self
            .by_slot
            .get(track)
            .and_then(|t| t.get(channel as usize))
            .and_then(|slot| slot.get(slice_index));

        match held.and_then(|pitches| pitches.last()) {
            Some(highest) => {
                self.by_slot_new_onsets[track][channel as usize][slice_index].contains(highest)
            }
            None => false,
        }
    }
}

fn has_slice_trigger(repo: &NoteRepository, tick: u64) -> bool {
    repo.notes_starting_at(tick)
        .iter()
        .any(|n| n.channel != PERCUSSION_CHANNEL)
}

/// Derive the lookahead tolerance in ticks: the tick duration of the
/// smallest rhythmic value in the piece, clamped up to a thirty-second note
/// when anything shorter appears.
fn lookahead_ticks(ppq: u16, rhythmic_values: &[f64]) -> u64 {
    const THIRTY_SECOND: f64 = 0.125;
    let minimum = rhythmic_values
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min);
    let fraction = if rhythmic_values.is_empty() || minimum < THIRTY_SECOND {
        THIRTY_SECOND
    } else {
        minimum
    };
    (ppq as f64 * fraction) as u64
}
