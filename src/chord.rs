//! # Event Aggregator
//!
//! Groups simultaneous note presses into chords and measures note
//! durations, working over the flattened event stream from MIDI intake.
//!
//! ## Grouping Rules
//! - A chord opens at a press with audible velocity; every zero-delay
//!   press after it joins the same chord.
//! - The first event with a nonzero delay, or one that is not a note
//!   event, closes the chord. Its index and delay come back as the
//!   scan's boundary, and the full pass resumes there so a note on the
//!   boundary opens the next chord.
//! - Zero-delay releases inside a scan carry no time and cannot join a
//!   chord, so they are skipped.
//!
//! ## Onset Delays
//! A chord's onset delay is the time since the previous chord: the
//! accumulated delays of every skipped event plus the opening press's
//! own delay. Delays that do not fit the 8-digit encoded field are
//! rejected, never truncated.
//!
//! ## Entry Point
//! [`collect_chords()`] - run the full pass, returning chords plus a
//! list of notes that were never released.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::SongError;
use crate::event::{EventKind, TimedEvent};
use crate::note::PianoKey;

/// A chord ready for encoding: its onset delay, the velocity most of
/// its notes share, and the pressed keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chord {
    /// Milliseconds since the previous chord's onset.
    pub onset_delay_ms: u32,
    /// Majority velocity across the chord's notes.
    pub velocity: u8,
    pub notes: BTreeSet<PianoKey>,
}

/// One press collected into a chord, with its position in the event
/// stream so callers can measure its duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChordNote {
    pub index: usize,
    pub key: PianoKey,
    pub velocity: u8,
}

/// Result of one forward chord scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordScan {
    pub notes: Vec<ChordNote>,
    /// Index of the event that closed the scan, or `events.len()` if the
    /// stream ran out.
    pub end_index: usize,
    /// Delay of the closing event, 0 if the stream ran out.
    pub boundary_ms: u32,
}

/// How long a note sounds, summed over event delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteSpan {
    pub millis: u64,
    /// False when no matching release exists; the note sounds until the
    /// end of the piece.
    pub terminated: bool,
}

/// Everything the aggregation pass produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregate {
    pub chords: Vec<Chord>,
    /// Keys still pressed when the stream ended, in press order.
    pub unterminated: Vec<PianoKey>,
}

/// Scan forward from `index`, gathering one chord.
///
/// The event at `index` opens the chord if it is a press with audible
/// velocity; its own delay belongs to the caller's onset accounting.
/// Every zero-delay audible press after it joins the chord. The scan
/// stops at the first event with a nonzero delay or a non-note kind,
/// returning that event's index and delay as the boundary. If the event
/// at `index` cannot open a chord, the note list comes back empty with
/// `index` itself as the boundary.
pub fn group_chord(events: &[TimedEvent], index: usize) -> ChordScan {
    let mut notes = Vec::new();

    match events.get(index) {
        Some(event) if event.is_active_note_on() => {
            if let EventKind::NoteOn { key, velocity } = event.kind {
                notes.push(ChordNote { index, key, velocity });
            }
        }
        Some(event) => {
            return ChordScan {
                notes,
                end_index: index,
                boundary_ms: event.delta_ms,
            };
        }
        None => {
            return ChordScan {
                notes,
                end_index: events.len(),
                boundary_ms: 0,
            };
        }
    }

    for (i, event) in events.iter().enumerate().skip(index + 1) {
        if event.delta_ms > 0 || !matches!(event.kind, EventKind::NoteOn { .. }) {
            return ChordScan {
                notes,
                end_index: i,
                boundary_ms: event.delta_ms,
            };
        }
        if event.is_active_note_on() {
            if let EventKind::NoteOn { key, velocity } = event.kind {
                notes.push(ChordNote { index: i, key, velocity });
            }
        }
        // Zero-delay releases neither join nor close the chord.
    }

    ChordScan {
        notes,
        end_index: events.len(),
        boundary_ms: 0,
    }
}

/// Measure how long the note at `index` sounds.
///
/// Sums event delays from `index` forward, inclusive of the matching
/// release's own delay. Without a matching release the sum runs to the
/// end of the stream and `terminated` is false. Returns a zero span if
/// `index` does not hold a note event.
pub fn note_duration(events: &[TimedEvent], index: usize) -> NoteSpan {
    let target = match events.get(index) {
        Some(TimedEvent {
            kind: EventKind::NoteOn { key, .. },
            ..
        }) => *key,
        _ => {
            return NoteSpan {
                millis: 0,
                terminated: false,
            }
        }
    };

    let mut millis: u64 = 0;
    for event in &events[index..] {
        millis += event.delta_ms as u64;
        if let EventKind::NoteOn { key, velocity } = event.kind {
            if velocity == 0 && key == target {
                return NoteSpan {
                    millis,
                    terminated: true,
                };
            }
        }
    }

    NoteSpan {
        millis,
        terminated: false,
    }
}

/// Pick the most frequent velocity, ties broken by first-seen order.
///
/// # Example
/// ```
/// use gridsong::chord::majority_velocity;
///
/// assert_eq!(majority_velocity(&[64, 64, 100]), Some(64));
/// assert_eq!(majority_velocity(&[64, 100]), Some(64)); // tie: first seen wins
/// assert_eq!(majority_velocity(&[]), None);
/// ```
pub fn majority_velocity(velocities: &[u8]) -> Option<u8> {
    let mut counts: Vec<(u8, usize)> = Vec::new();
    for &velocity in velocities {
        match counts.iter_mut().find(|(value, _)| *value == velocity) {
            Some((_, count)) => *count += 1,
            None => counts.push((velocity, 1)),
        }
    }

    let mut best: Option<(u8, usize)> = None;
    for (value, count) in counts {
        let beats_current = match best {
            Some((_, best_count)) => count > best_count,
            None => true,
        };
        if beats_current {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

/// Run the full aggregation pass over an event stream.
///
/// Delays of events between chords accumulate into the next chord's
/// onset delay; the trailing gap after the last chord is dropped. An
/// onset delay above `u32::MAX` ms is a range error.
pub fn collect_chords(events: &[TimedEvent]) -> Result<Aggregate, SongError> {
    let mut chords = Vec::new();
    let mut pending: u64 = 0;
    let mut i = 0;

    while i < events.len() {
        if events[i].is_active_note_on() {
            let scan = group_chord(events, i);
            let onset = pending + events[i].delta_ms as u64;
            let onset_delay_ms = u32::try_from(onset)
                .map_err(|_| SongError::DelayOutOfRange { millis: onset })?;

            let velocities: Vec<u8> = scan.notes.iter().map(|n| n.velocity).collect();
            let velocity = majority_velocity(&velocities).unwrap_or(0);
            let notes: BTreeSet<PianoKey> = scan.notes.iter().map(|n| n.key).collect();

            chords.push(Chord {
                onset_delay_ms,
                velocity,
                notes,
            });
            pending = 0;
            i = scan.end_index;
        } else {
            pending += events[i].delta_ms as u64;
            i += 1;
        }
    }

    Ok(Aggregate {
        chords,
        unterminated: unterminated_notes(events),
    })
}

/// Keys pressed but never released, in press order.
pub fn unterminated_notes(events: &[TimedEvent]) -> Vec<PianoKey> {
    let mut pressed: Vec<PianoKey> = Vec::new();
    for event in events {
        if let EventKind::NoteOn { key, velocity } = event.kind {
            if velocity > 0 {
                pressed.push(key);
            } else if let Some(pos) = pressed.iter().position(|k| *k == key) {
                pressed.remove(pos);
            }
        }
    }
    pressed
}
