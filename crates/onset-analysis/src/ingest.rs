use crate::note::{Note, NoteRepository};
use midly::{MidiMessage, Smf, TrackEventKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Timing context for a parsed piece.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PieceContext {
    pub ppq: u16,
    /// One past the last tick carrying any event; 0 for an eventless file.
    pub tick_length: u64,
    pub track_count: usize,
}

/// Extract all notes from a parsed MIDI file, pairing note-on/note-off events.
///
/// A note-on with velocity 0 counts as a note-off. Overlapping re-attacks of
/// the same (channel, pitch) are paired last-on/first-off via a stack.
/// Note-ons with no matching note-off are dropped rather than closed at the
/// end of the track; the dropped count is logged because it is silent data
/// loss downstream analysis will never see.
pub fn extract_notes(smf: &Smf) -> (NoteRepository, PieceContext) {
    let ppq = match smf.header.timing {
        midly::Timing::Metrical(ticks) => ticks.as_int(),
        midly::Timing::Timecode(_, _) => 480,
    };

    let mut repo = NoteRepository::new();
    let mut max_tick = 0u64;
    let mut dropped = 0usize;

    for (track, events) in smf.tracks.iter().enumerate() {
        let mut current_tick = 0u64;
        // (channel, pitch) → stack of (onset tick, velocity)
        let mut pending: HashMap<(u8, u8), Vec<(u64, u8)>> = HashMap::new();

        for event in events {
            current_tick += event.delta.as_int() as u64;
            max_tick = max_tick.max(current_tick);

            if let TrackEventKind::Midi { channel, message } = event.kind {
                let ch = channel.as_int();
                match message {
                    MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                        pending
                            .entry((ch, key.as_int()))
                            .or_default()
                            .push((current_tick, vel.as_int()));
                    }
                    MidiMessage::NoteOff { key, .. } | MidiMessage::NoteOn { key, .. } => {
                        if let Some(stack) = pending.get_mut(&(ch, key.as_int())) {
                            if let Some((start_tick, velocity)) = stack.pop() {
                                if current_tick > start_tick {
                                    repo.add(Note {
                                        pitch: key.as_int(),
                                        velocity,
                                        start_tick,
                                        end_tick: current_tick,
                                        track,
                                        channel: ch,
                                    });
                                } else {
                                    // zero-duration pair, nothing to analyze
                                    dropped += 1;
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        dropped += pending.values().map(Vec::len).sum::<usize>();
    }

    if dropped > 0 {
        warn!(count = dropped, "dropped unmatched or zero-length note events");
    }

    let tick_length = if max_tick == 0 { 0 } else { max_tick + 1 };

    let context = PieceContext {
        ppq,
        tick_length,
        track_count: smf.tracks.len(),
    };

    (repo, context)
}
