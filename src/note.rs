//! # Piano Key Model
//!
//! Notes are identified by their position on an 88-key piano layout,
//! index 0 (A0) through 87 (C8). Raw MIDI note numbers map onto this
//! range by subtracting 21; anything outside 21-108 has no key and is
//! rejected at intake.
//!
//! A key knows its pitch-class name ("C4", "F#2"), whether that name
//! carries an accidental, and its equal-tempered frequency anchored at
//! A4 = 440 Hz.

use serde::Serialize;

use crate::error::SongError;

/// Number of keys on the piano layout.
pub const KEY_COUNT: u8 = 88;

/// Lowest raw MIDI note with a piano key (A0).
pub const LOWEST_MIDI_NOTE: u8 = 21;

/// Highest raw MIDI note with a piano key (C8).
pub const HIGHEST_MIDI_NOTE: u8 = 108;

/// Pitch-class names in key order, rooted at A (key 0 is A0).
const PITCH_NAMES: [&str; 12] = [
    "A", "A#", "B", "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#",
];

/// A position on the 88-key piano layout, 0 (A0) through 87 (C8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PianoKey(u8);

impl PianoKey {
    /// Create a key from a 0-based index, or `None` if the index is past
    /// the top of the keyboard.
    pub fn new(index: u8) -> Option<Self> {
        if index < KEY_COUNT {
            Some(PianoKey(index))
        } else {
            None
        }
    }

    /// Normalize a raw MIDI note number (21-108) to a piano key.
    ///
    /// # Example
    /// ```
    /// use gridsong::PianoKey;
    ///
    /// let key = PianoKey::from_midi(60)?; // middle C
    /// assert_eq!(key.index(), 39);
    /// assert_eq!(key.name(), "C4");
    /// # Ok::<(), gridsong::SongError>(())
    /// ```
    pub fn from_midi(raw: u8) -> Result<Self, SongError> {
        if (LOWEST_MIDI_NOTE..=HIGHEST_MIDI_NOTE).contains(&raw) {
            Ok(PianoKey(raw - LOWEST_MIDI_NOTE))
        } else {
            Err(SongError::NoteOutOfRange { raw })
        }
    }

    /// The 0-based key index.
    pub fn index(&self) -> u8 {
        self.0
    }

    /// The 1-based key number used by the frequency formula (A0 = 1, A4 = 49).
    pub fn key_number(&self) -> u8 {
        self.0 + 1
    }

    /// Whether this key's pitch-class name carries a sharp.
    pub fn is_accidental(&self) -> bool {
        PITCH_NAMES[(self.0 % 12) as usize].contains('#')
    }

    /// Scientific pitch name, e.g. "A0", "C4", "F#6".
    pub fn name(&self) -> String {
        let pitch = PITCH_NAMES[(self.0 % 12) as usize];
        let octave = (self.0 as u16 + 9) / 12;
        format!("{}{}", pitch, octave)
    }

    /// Equal-tempered frequency in Hz, anchored at A4 = 440 Hz:
    /// `440 * 2^((key_number - 49) / 12)`.
    pub fn frequency(&self) -> f64 {
        440.0 * 2f64.powf((self.key_number() as f64 - 49.0) / 12.0)
    }
}
