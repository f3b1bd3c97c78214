//! # Playback Module
//!
//! Turn decoded chords into timed play instructions against an audio
//! sink. This is the executable reference for the player embedded in
//! the generated MakeCode code.
//!
//! ## Purpose
//! The driver owns the one piece of mutable playback state, the set of
//! currently-sounding notes, and feeds an external audio subsystem
//! through the [`AudioSink`] trait:
//! 1. **Frame playback** - sound every decoded column of a frame in order
//! 2. **Direct playback** - drive individual note presses and releases
//!
//! ## Sub-modules
//! - `types` - AudioSink trait and SoundingNote
//! - `engine` - the Player driving a sink
//!
//! ## Timing Model
//! Single-threaded and cooperative: play instructions always queue with
//! zero delay, and the sink's `suspend` is the only thing that spaces
//! sound out in time. Once frame playback starts it runs to completion.
//!
//! ## Example
//! ```rust
//! use gridsong::playback::{AudioSink, Player};
//! use gridsong::PianoKey;
//!
//! struct NullSink;
//! impl AudioSink for NullSink {
//!     fn queue_play_instruction(&mut self, _: u32, _: f64, _: u8, _: u32) {}
//!     fn suspend(&mut self, _: u32) {}
//! }
//!
//! let mut player = Player::new(NullSink);
//! player.note_on(PianoKey::new(39).unwrap(), 80, 0, true);
//! assert_eq!(player.sounding().len(), 1);
//! ```

mod engine;
mod types;

#[cfg(test)]
mod tests;

pub use engine::Player;
pub use types::{AudioSink, SoundingNote};
