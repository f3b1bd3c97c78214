//! Chord-to-grid encoding
//!
//! A single linear pass: chords become fixed-height digit columns,
//! columns chunk into frames behind their two header columns, and
//! frames render into space-separated image text.

use crate::chord::Chord;
use crate::note::PianoKey;

use super::{
    COLUMN_HEIGHT, DELAY_DIGITS, HEADER_COLUMNS, MAX_FRAMES_PER_IMAGE, MAX_FRAME_COLUMNS,
    NOTE_SLOTS, VELOCITY_DIGITS,
};

/// One frame: two header columns plus up to 512 data columns, each
/// `COLUMN_HEIGHT` digits tall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    columns: Vec<String>,
}

impl Frame {
    fn new() -> Self {
        Frame {
            columns: vec![note_header_column(), band_header_column()],
        }
    }

    fn push_data_column(&mut self, column: String) {
        self.columns.push(column);
    }

    /// Total width including the header columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of encoded chords in this frame.
    pub fn data_columns(&self) -> usize {
        self.columns.len() - HEADER_COLUMNS
    }

    fn is_full(&self) -> bool {
        self.data_columns() >= MAX_FRAME_COLUMNS
    }
}

/// First header column: the note marker on every payload row, then the
/// terminator row that keeps stacked frames apart.
fn note_header_column() -> String {
    let mut column = "1".repeat(COLUMN_HEIGHT - 1);
    column.push('0');
    column
}

/// Second header column: the three band markers top to bottom, then the
/// terminator row.
fn band_header_column() -> String {
    let mut column = String::with_capacity(COLUMN_HEIGHT);
    column.push_str(&"3".repeat(DELAY_DIGITS));
    column.push_str(&"2".repeat(VELOCITY_DIGITS));
    column.push_str(&"1".repeat(NOTE_SLOTS));
    column.push('0');
    column
}

/// Encode one chord as a column of `COLUMN_HEIGHT` digits.
///
/// Pressed keys whose pitch-class name carries an accidental encode as
/// `f`, naturals as `1`, empty slots as `0`.
///
/// # Example
/// ```
/// use std::collections::BTreeSet;
/// use gridsong::chord::Chord;
/// use gridsong::grid::encode_column;
/// use gridsong::PianoKey;
///
/// let chord = Chord {
///     onset_delay_ms: 0,
///     velocity: 80,
///     notes: BTreeSet::from([PianoKey::new(39).unwrap()]),
/// };
/// let column = encode_column(&chord);
/// assert_eq!(column.len(), 120);
/// assert!(column.starts_with("0000000050"));
/// assert_eq!(column.as_bytes()[10 + 39], b'1');
/// ```
pub fn encode_column(chord: &Chord) -> String {
    let mut column = String::with_capacity(COLUMN_HEIGHT);
    column.push_str(&format!("{:08x}", chord.onset_delay_ms));
    column.push_str(&format!("{:02x}", chord.velocity));

    for slot in 0..NOTE_SLOTS {
        let pressed = PianoKey::new(slot as u8).filter(|key| chord.notes.contains(key));
        match pressed {
            Some(key) if key.is_accidental() => column.push('f'),
            Some(_) => column.push('1'),
            None => column.push('0'),
        }
    }

    column.push('0');
    column
}

/// Encode a chord sequence into frames, starting a new frame every 512
/// data columns. No chords means no frames.
pub fn encode_frames(chords: &[Chord]) -> Vec<Frame> {
    let mut frames: Vec<Frame> = Vec::new();

    for chord in chords {
        let needs_new = match frames.last() {
            Some(frame) => frame.is_full(),
            None => true,
        };
        if needs_new {
            frames.push(Frame::new());
        }
        if let Some(frame) = frames.last_mut() {
            frame.push_data_column(encode_column(chord));
        }
    }

    frames
}

/// Render frames into one image text block: each frame contributes
/// `COLUMN_HEIGHT` rows, each row the frames' columns' digits at that
/// row, space-separated. Callers group frames of equal width.
pub fn compose_image(frames: &[Frame]) -> String {
    let mut text = String::new();

    for frame in frames {
        for y in 0..COLUMN_HEIGHT {
            for (x, column) in frame.columns.iter().enumerate() {
                if x > 0 {
                    text.push(' ');
                }
                text.push(column.as_bytes()[y] as char);
            }
            text.push('\n');
        }
    }

    text
}

/// Render all frames into image blocks, stacking up to four frames per
/// image. A frame narrower than its predecessors (the final short
/// frame) starts a new image so every image stays rectangular.
pub fn compose_images(frames: &[Frame]) -> Vec<String> {
    let mut images = Vec::new();
    let mut start = 0;

    for i in 0..frames.len() {
        let group_len = i - start;
        if group_len >= MAX_FRAMES_PER_IMAGE || frames[i].width() != frames[start].width() {
            images.push(compose_image(&frames[start..i]));
            start = i;
        }
    }
    if start < frames.len() {
        images.push(compose_image(&frames[start..]));
    }

    images
}
