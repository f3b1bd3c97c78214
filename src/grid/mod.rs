//! # Pixel-Grid Song Codec
//!
//! Packs chords into grids of single hex digits that a MakeCode Arcade
//! image literal can carry, plus the exact inverse decoder the player
//! runs at playback time.
//!
//! ## Column Layout
//! One chord becomes one column of 120 digits:
//! - 8 hex digits: onset delay in ms, zero-padded, most significant first
//! - 2 hex digits: majority velocity, zero-padded
//! - 109 flag digits: one per note slot, `1` pressed natural, `f` pressed
//!   sharp, `0` empty
//! - 1 terminator digit: always `0`
//!
//! ## Frames and Images
//! Up to 512 data columns form a frame, preceded by two header columns
//! the decoder uses to find its bands: the first is `1` on every payload
//! row, the second marks the delay rows `3`, the velocity rows `2`, and
//! the note rows `1`. Both end with the terminator row, which is what
//! separates frames once up to four of them are stacked into one image.
//!
//! The decoder carries no metadata. It re-derives frame extents from
//! value transitions in an image's first column, classifies the field
//! bands from the second, validates the band heights, and only then
//! reads data columns.
//!
//! ## Sub-modules
//! - `encoder` - chords to columns, frames, and image text
//! - `decoder` - image text back to chords
//!
//! ## Round-Trip Contract
//! For any chord sequence the encoder accepts,
//! `decode_image(compose_image(...))` reproduces the chords exactly.

mod decoder;
mod encoder;


pub use decoder::{decode_image, DecodedFrame, PixelGrid};
pub use encoder::{compose_image, compose_images, encode_column, encode_frames, Frame};

/// Hex digits in the onset-delay field.
pub const DELAY_DIGITS: usize = 8;

/// Hex digits in the velocity field.
pub const VELOCITY_DIGITS: usize = 2;

/// Note-flag slots per column. Only slots 0-87 can ever be pressed; the
/// remainder exist to keep the legacy layout.
pub const NOTE_SLOTS: usize = 109;

/// Rows per column: the three fields plus the terminator row.
pub const COLUMN_HEIGHT: usize = DELAY_DIGITS + VELOCITY_DIGITS + NOTE_SLOTS + 1;

/// Header columns prepended to each frame's data columns.
pub const HEADER_COLUMNS: usize = 2;

/// Data columns a frame can hold before a new frame begins.
pub const MAX_FRAME_COLUMNS: usize = 512;

/// Frames stacked into one image block before a new block begins.
pub const MAX_FRAMES_PER_IMAGE: usize = 4;

/// Marker color for note rows; a frame's extent in the first header
/// column is one contiguous run of this color.
pub(crate) const NOTE_MARKER: u8 = 1;

/// Marker color for the velocity band in the second header column.
pub(crate) const VELOCITY_MARKER: u8 = 2;

/// Marker color for the delay band in the second header column.
pub(crate) const DELAY_MARKER: u8 = 3;
