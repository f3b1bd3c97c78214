//! The playback driver
//!
//! Mirrors the player loop that runs inside the generated MakeCode
//! code: a sounding-note set mutated by note events, flushed to the
//! sink one batched column at a time.

use crate::grid::DecodedFrame;
use crate::note::PianoKey;

use super::types::{AudioSink, SoundingNote};

/// Drives an [`AudioSink`] from note events or decoded frames.
pub struct Player<S: AudioSink> {
    sink: S,
    sounding: Vec<SoundingNote>,
}

impl<S: AudioSink> Player<S> {
    pub fn new(sink: S) -> Self {
        Player {
            sink,
            sounding: Vec::new(),
        }
    }

    /// Apply one note event to the sounding set.
    ///
    /// Velocity 0 releases the first sounding entry with a matching key
    /// (duplicate unison presses collapse on release); any other
    /// velocity appends a new entry. After the set is updated, a
    /// nonzero `delay_ms` with `play_now` sounds the whole set for
    /// `delay_ms` and suspends for the same time. Frame playback passes
    /// `play_now = false` and flushes once per column instead.
    pub fn note_on(&mut self, key: PianoKey, velocity: u8, delay_ms: u32, play_now: bool) {
        if velocity == 0 {
            if let Some(pos) = self.sounding.iter().position(|note| note.key == key) {
                self.sounding.remove(pos);
            }
        } else {
            self.sounding.push(SoundingNote { key, velocity });
        }

        if delay_ms > 0 && play_now {
            self.play_now(delay_ms);
            self.sink.suspend(delay_ms);
        }
    }

    /// Emit one play instruction per sounding note, each for
    /// `duration_ms`. Does not suspend by itself.
    pub fn play_now(&mut self, duration_ms: u32) {
        for note in &self.sounding {
            self.sink
                .queue_play_instruction(0, note.key.frequency(), note.velocity, duration_ms);
        }
    }

    /// Sound one decoded frame, column by column.
    ///
    /// Every note of a column enters the sounding set before anything
    /// plays, so simultaneous notes start together and the sink is
    /// flushed once per column, not once per note.
    pub fn play_frame(&mut self, frame: &DecodedFrame) {
        for chord in &frame.chords {
            for key in &chord.notes {
                self.note_on(*key, chord.velocity, chord.onset_delay_ms, false);
            }
            self.play_now(chord.onset_delay_ms);
            self.sink.suspend(chord.onset_delay_ms);
        }
    }

    /// Sound frames strictly in order.
    pub fn play_frames(&mut self, frames: &[DecodedFrame]) {
        for frame in frames {
            self.play_frame(frame);
        }
    }

    /// The currently-sounding notes, oldest first.
    pub fn sounding(&self) -> &[SoundingNote] {
        &self.sounding
    }

    /// Give the sink back, e.g. to inspect what a recording sink saw.
    pub fn into_sink(self) -> S {
        self.sink
    }
}
