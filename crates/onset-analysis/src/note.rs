use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single note with absolute tick timing and source location.
///
/// `end_tick` is exclusive: a note ending at tick T no longer sounds at T.
/// On the percussion channel `pitch` is an instrument id rather than a
/// chromatic pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub pitch: u8,
    pub velocity: u8,
    pub start_tick: u64,
    pub end_tick: u64,
    pub track: usize,
    pub channel: u8,
}

impl Note {
    pub fn duration_ticks(&self) -> u64 {
        self.end_tick.saturating_sub(self.start_tick)
    }
}

/// Canonical store of a piece's notes plus a start-tick index.
///
/// Populated once during ingestion, read-only afterwards. Pairing raw
/// note-on/note-off events into valid `start_tick < end_tick` notes happens
/// upstream; this repository accepts what it is given without re-validating.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteRepository {
    notes: Vec<Note>,
    by_start_tick: HashMap<u64, Vec<Note>>,
    track_count: usize,
}

impl NoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a note to the sequence and the start-tick index.
    pub fn add(&mut self, note: Note) {
        self.by_start_tick
            .entry(note.start_tick)
            .or_default()
            .push(note);
        self.track_count = self.track_count.max(note.track + 1);
        self.notes.push(note);
    }

    /// All notes (any track/channel) beginning exactly at `tick`.
    pub fn notes_starting_at(&self, tick: u64) -> &[Note] {
        self.by_start_tick
            .get(&tick)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Notes on a specific track and channel.
    pub fn notes_on(&self, track: usize, channel: u8) -> Vec<Note> {
        self.notes
            .iter()
            .filter(|n| n.track == track && n.channel == channel)
            .copied()
            .collect()
    }

    /// The full note sequence, in insertion order.
    pub fn all(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Number of tracks observed so far (highest track index + 1).
    pub fn track_count(&self) -> usize {
        self.track_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn make_note(pitch: u8, start: u64, end: u64, track: usize, channel: u8) -> Note {
        Note {
            pitch,
            velocity: 100,
            start_tick: start,
            end_tick: end,
            track,
            channel,
        }
    }

    #[test]
    fn duration_is_end_minus_start() {
        let note = make_note(60, 120, 600, 0, 0);
        assert_eq!(note.duration_ticks(), 480);
    }

    #[test]
    fn notes_starting_at_groups_by_tick() {
        let mut repo = NoteRepository::new();
        repo.add(make_note(60, 0, 480, 0, 0));
        repo.add(make_note(64, 0, 480, 1, 0));
        repo.add(make_note(67, 480, 960, 0, 0));

        assert_eq!(repo.notes_starting_at(0).len(), 2);
        assert_eq!(repo.notes_starting_at(480).len(), 1);
        assert!(repo.notes_starting_at(240).is_empty());
    }

    #[test]
    fn notes_on_filters_track_and_channel() {
        let mut repo = NoteRepository::new();
        repo.add(make_note(60, 0, 480, 0, 0));
        repo.add(make_note(64, 0, 480, 0, 1));
        repo.add(make_note(67, 0, 480, 1, 0));

        let filtered = repo.notes_on(0, 0);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].pitch, 60);
    }

    #[test]
    fn track_count_follows_highest_index() {
        let mut repo = NoteRepository::new();
        assert_eq!(repo.track_count(), 0);
        repo.add(make_note(60, 0, 480, 3, 0));
        assert_eq!(repo.track_count(), 4);
        repo.add(make_note(64, 0, 480, 1, 0));
        assert_eq!(repo.track_count(), 4);
    }

    #[test]
    fn every_added_note_is_in_both_views() {
        let mut repo = NoteRepository::new();
        repo.add(make_note(60, 0, 480, 0, 0));
        repo.add(make_note(62, 10, 490, 0, 0));

        assert_eq!(repo.len(), 2);
        let indexed: usize = [0u64, 10]
            .iter()
            .map(|&t| repo.notes_starting_at(t).len())
            .sum();
        assert_eq!(indexed, repo.all().len());
    }
}
