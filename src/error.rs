//! # Error Types
//!
//! This module defines all error types for the gridsong compiler.
//!
//! Errors fall into three groups: MIDI intake errors (unreadable or unsupported
//! files), range errors (values that do not fit their encoded field), and decode
//! errors (image text that violates the grid layout).
//!
//! ## Error Types
//! - `Midi` - Unreadable or corrupt MIDI data
//! - `UnsupportedFormat` - MIDI file shapes the converter rejects up front
//! - `NoteOutOfRange` - Raw note identifiers outside the 88-key piano range
//! - `DelayOutOfRange` - Delays too large for the 8-digit delay field
//! - `InvalidImage` - Image text that is not a rectangular grid of hex digits
//! - `MalformedFrame` - Frames whose header bands cannot be classified
//! - `Options` - Invalid options file content
//!
//! ## Usage
//! ```rust
//! use gridsong::{convert, SongError};
//!
//! match convert(&[0x00]) {
//!     Ok(code) => println!("{}", code),
//!     Err(SongError::Midi(message)) => eprintln!("bad MIDI data: {}", message),
//!     Err(SongError::UnsupportedFormat(message)) => eprintln!("{}", message),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SongError {
    /// Unreadable or corrupt MIDI data.
    ///
    /// Occurs when the input bytes cannot be parsed as a Standard MIDI File.
    #[error("Invalid MIDI data: {0}")]
    Midi(String),

    /// Unsupported MIDI file shape.
    ///
    /// Occurs for SMF types other than 0 and 1, and for files with SMPTE
    /// timecode timing. The converter aborts before producing any output.
    ///
    /// # Example
    /// ```
    /// # use gridsong::SongError;
    /// let err = SongError::UnsupportedFormat("MIDI file is not type 0 or type 1".to_string());
    /// assert_eq!(err.to_string(), "Unsupported MIDI file: MIDI file is not type 0 or type 1");
    /// ```
    #[error("Unsupported MIDI file: {0}")]
    UnsupportedFormat(String),

    /// Raw note identifier outside the 88-key piano range.
    ///
    /// Notes are stored as piano-key indices 0-87 (raw MIDI note minus 21),
    /// so raw notes below 21 or above 108 have no slot.
    ///
    /// # Example
    /// ```
    /// # use gridsong::SongError;
    /// let err = SongError::NoteOutOfRange { raw: 12 };
    /// assert_eq!(err.to_string(), "Note 12 is outside the 88-key piano range (21-108)");
    /// ```
    #[error("Note {raw} is outside the 88-key piano range (21-108)")]
    NoteOutOfRange { raw: u8 },

    /// Delay too large for the 8-digit delay field.
    ///
    /// Chord onset delays are encoded as 8 hex digits, so anything above
    /// `u32::MAX` milliseconds is rejected instead of being truncated.
    ///
    /// # Example
    /// ```
    /// # use gridsong::SongError;
    /// let err = SongError::DelayOutOfRange { millis: 4294967296 };
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Delay of 4294967296 ms does not fit the 8-digit delay field"
    /// );
    /// ```
    #[error("Delay of {millis} ms does not fit the 8-digit delay field")]
    DelayOutOfRange { millis: u64 },

    /// Image text that is not a rectangular grid of hex digits.
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// Frame whose header bands cannot be fully classified.
    ///
    /// Raised when a frame region found in an image is missing one of its
    /// three header bands, or when a band has the wrong height.
    ///
    /// # Example
    /// ```
    /// # use gridsong::SongError;
    /// let err = SongError::MalformedFrame {
    ///     start_y: 0,
    ///     stop_y: 118,
    ///     message: "missing velocity band".to_string(),
    /// };
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Malformed frame at rows 0-118: missing velocity band"
    /// );
    /// ```
    #[error("Malformed frame at rows {start_y}-{stop_y}: {message}")]
    MalformedFrame {
        start_y: usize,
        stop_y: usize,
        message: String,
    },

    /// Invalid options file content.
    #[error("Invalid options: {0}")]
    Options(String),
}
