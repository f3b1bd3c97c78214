//! Grid-to-chord decoding
//!
//! Recovers chords from image text using nothing but pixel values: frame
//! extents from value transitions in the first column, field bands from
//! the second, then per-column hex reads. Band heights are validated
//! against the fixed layout before any value is trusted.

use std::collections::BTreeSet;

use crate::chord::Chord;
use crate::error::SongError;
use crate::note::{PianoKey, LOWEST_MIDI_NOTE};

use super::{
    DELAY_DIGITS, DELAY_MARKER, HEADER_COLUMNS, NOTE_MARKER, NOTE_SLOTS, VELOCITY_DIGITS,
    VELOCITY_MARKER,
};

/// A parsed image: a rectangular grid of pixel values 0-15.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    rows: Vec<Vec<u8>>,
}

impl PixelGrid {
    /// Parse image text into a grid. Every row must hold the same number
    /// of single-hex-digit tokens.
    pub fn parse(text: &str) -> Result<Self, SongError> {
        let mut rows: Vec<Vec<u8>> = Vec::new();

        for (line_no, line) in text.lines().enumerate() {
            let mut row = Vec::new();
            for token in line.split_whitespace() {
                if token.len() != 1 {
                    return Err(SongError::InvalidImage(format!(
                        "token '{}' on row {} is not a single hex digit",
                        token, line_no
                    )));
                }
                let value = u8::from_str_radix(token, 16).map_err(|_| {
                    SongError::InvalidImage(format!(
                        "token '{}' on row {} is not a hex digit",
                        token, line_no
                    ))
                })?;
                row.push(value);
            }

            if let Some(first) = rows.first() {
                if row.len() != first.len() {
                    return Err(SongError::InvalidImage(format!(
                        "row {} has {} pixels, expected {}",
                        line_no,
                        row.len(),
                        first.len()
                    )));
                }
            }
            rows.push(row);
        }

        Ok(PixelGrid { rows })
    }

    pub fn width(&self) -> usize {
        self.rows.first().map(|row| row.len()).unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Pixel value at (x, y), or `None` outside the grid. The explicit
    /// no-color sentinel the transition scan compares against at both
    /// ends of a column.
    fn get(&self, x: usize, y: usize) -> Option<u8> {
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }
}

/// A contiguous row range, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Band {
    start_y: usize,
    stop_y: usize,
}

impl Band {
    fn height(&self) -> usize {
        self.stop_y - self.start_y + 1
    }
}

/// One same-colored run found by the transition scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Region {
    color: u8,
    band: Band,
}

/// Walk column `x` from `start_y` to `stop_y`, splitting it into
/// same-colored regions. A value change, or the no-color sentinel at
/// either end, closes the current region.
fn scan_regions(grid: &PixelGrid, x: usize, start_y: usize, stop_y: usize) -> Vec<Region> {
    let mut regions = Vec::new();
    let mut current: Option<Region> = None;

    for y in start_y..=stop_y {
        let color = grid.get(x, y);
        let extends = match (&current, color) {
            (Some(region), Some(c)) => region.color == c,
            _ => false,
        };
        if extends {
            if let Some(region) = current.as_mut() {
                region.band.stop_y = y;
            }
        } else {
            if let Some(done) = current.take() {
                regions.push(done);
            }
            if let Some(c) = color {
                current = Some(Region {
                    color: c,
                    band: Band {
                        start_y: y,
                        stop_y: y,
                    },
                });
            }
        }
    }
    if let Some(done) = current {
        regions.push(done);
    }

    regions
}

/// The three field bands of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrameBands {
    delay: Band,
    velocity: Band,
    note: Band,
}

fn malformed(extent: Band, message: String) -> SongError {
    SongError::MalformedFrame {
        start_y: extent.start_y,
        stop_y: extent.stop_y,
        message,
    }
}

/// Classify the band-marker column of a frame extent and validate every
/// band height before anything is read.
fn classify_bands(grid: &PixelGrid, extent: Band) -> Result<FrameBands, SongError> {
    let mut delay: Option<Band> = None;
    let mut velocity: Option<Band> = None;
    let mut note: Option<Band> = None;

    for region in scan_regions(grid, 1, extent.start_y, extent.stop_y) {
        match region.color {
            DELAY_MARKER if delay.is_none() => delay = Some(region.band),
            VELOCITY_MARKER if velocity.is_none() => velocity = Some(region.band),
            NOTE_MARKER if note.is_none() => note = Some(region.band),
            // Unknown colors are diagnostic only, never fatal.
            _ => {}
        }
    }

    let delay = delay.ok_or_else(|| malformed(extent, "missing delay band".to_string()))?;
    let velocity = velocity.ok_or_else(|| malformed(extent, "missing velocity band".to_string()))?;
    let note = note.ok_or_else(|| malformed(extent, "missing note band".to_string()))?;

    if delay.height() != DELAY_DIGITS {
        return Err(malformed(
            extent,
            format!(
                "delay band spans {} rows, expected {}",
                delay.height(),
                DELAY_DIGITS
            ),
        ));
    }
    if velocity.height() != VELOCITY_DIGITS {
        return Err(malformed(
            extent,
            format!(
                "velocity band spans {} rows, expected {}",
                velocity.height(),
                VELOCITY_DIGITS
            ),
        ));
    }
    if note.height() != NOTE_SLOTS {
        return Err(malformed(
            extent,
            format!(
                "note band spans {} rows, expected {}",
                note.height(),
                NOTE_SLOTS
            ),
        ));
    }
    let expected = DELAY_DIGITS + VELOCITY_DIGITS + NOTE_SLOTS;
    if extent.height() != expected {
        return Err(malformed(
            extent,
            format!("frame spans {} rows, expected {}", extent.height(), expected),
        ));
    }

    Ok(FrameBands {
        delay,
        velocity,
        note,
    })
}

/// Concatenate the pixel values of data column `x` over a band,
/// most significant row first. An empty band reads as 0.
fn read_hex(grid: &PixelGrid, x: usize, band: Band) -> u64 {
    let mut value: u64 = 0;
    for y in band.start_y..=band.stop_y {
        value = value * 16 + grid.get(x, y).unwrap_or(0) as u64;
    }
    value
}

/// The chords recovered from one frame, in column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub chords: Vec<Chord>,
}

fn decode_frame(grid: &PixelGrid, extent: Band) -> Result<DecodedFrame, SongError> {
    let bands = classify_bands(grid, extent)?;
    let mut chords = Vec::new();

    for x in HEADER_COLUMNS..grid.width() {
        // Band heights are validated, so these fit their fields.
        let onset_delay_ms = read_hex(grid, x, bands.delay) as u32;
        let velocity = read_hex(grid, x, bands.velocity) as u8;

        let mut notes = BTreeSet::new();
        for y in bands.note.start_y..=bands.note.stop_y {
            let pixel = grid.get(x, y).unwrap_or(0);
            if pixel != 0 {
                let offset = (y - bands.note.start_y) as u8;
                let key = PianoKey::new(offset).ok_or(SongError::NoteOutOfRange {
                    raw: offset + LOWEST_MIDI_NOTE,
                })?;
                notes.insert(key);
            }
        }

        chords.push(Chord {
            onset_delay_ms,
            velocity,
            notes,
        });
    }

    Ok(DecodedFrame { chords })
}

/// Decode one image text block into its frames' chords.
///
/// Frame extents are the note-marker-colored runs in the image's first
/// column; runs of any other color are ignored. An image with no such
/// run decodes to zero frames.
///
/// # Example
/// ```
/// use std::collections::BTreeSet;
/// use gridsong::chord::Chord;
/// use gridsong::grid::{compose_image, decode_image, encode_frames};
/// use gridsong::PianoKey;
///
/// let chords = vec![Chord {
///     onset_delay_ms: 250,
///     velocity: 100,
///     notes: BTreeSet::from([PianoKey::new(40).unwrap()]),
/// }];
/// let frames = encode_frames(&chords);
/// let decoded = decode_image(&compose_image(&frames))?;
/// assert_eq!(decoded.len(), 1);
/// assert_eq!(decoded[0].chords, chords);
/// # Ok::<(), gridsong::SongError>(())
/// ```
pub fn decode_image(text: &str) -> Result<Vec<DecodedFrame>, SongError> {
    let grid = PixelGrid::parse(text)?;
    if grid.height() == 0 || grid.width() == 0 {
        return Ok(Vec::new());
    }

    let mut frames = Vec::new();
    for region in scan_regions(&grid, 0, 0, grid.height() - 1) {
        if region.color != NOTE_MARKER {
            continue;
        }
        frames.push(decode_frame(&grid, region.band)?);
    }

    Ok(frames)
}
