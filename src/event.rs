//! Normalized timed-event stream
//!
//! Every later stage (chord grouping, encoding, direct code generation)
//! scans this one event shape. MIDI intake flattens all tracks into a
//! single ordered sequence of these, with real note-offs and
//! velocity-zero note-ons collapsed into the same release form.

use serde::Serialize;

use crate::note::PianoKey;

/// What an event does. Anything that is not a note press or release is
/// carried as `Other` so its delay still counts toward the next chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// A note press (velocity > 0) or release (velocity == 0).
    NoteOn { key: PianoKey, velocity: u8 },
    /// Meta or unsupported message; only its timing matters.
    Other,
}

/// One event in the flattened stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimedEvent {
    /// Delay since the previous event in milliseconds.
    pub delta_ms: u32,
    pub kind: EventKind,
}

impl TimedEvent {
    /// A press with audible velocity, the only kind that can open or
    /// join a chord.
    pub fn is_active_note_on(&self) -> bool {
        matches!(self.kind, EventKind::NoteOn { velocity, .. } if velocity > 0)
    }
}
