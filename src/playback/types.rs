//! Playback type definitions
//!
//! The sink trait the driver talks to, and the sounding-note entry it
//! tracks.

use serde::Serialize;

use crate::note::PianoKey;

/// The external audio subsystem the driver feeds.
///
/// The driver always queues play instructions with a zero delay and
/// spaces sound out with `suspend` alone, so a sink only has to honor
/// instruction order and suspension time.
pub trait AudioSink {
    /// Queue one tone: start after `delay_ms`, at `frequency` Hz and
    /// `velocity`, sounding for `duration_ms`.
    fn queue_play_instruction(&mut self, delay_ms: u32, frequency: f64, velocity: u8, duration_ms: u32);

    /// Yield for `duration_ms` before the next instruction.
    fn suspend(&mut self, duration_ms: u32);
}

/// One currently-sounding note.
///
/// Entries keep the piano key itself; frequency is derived only when a
/// play instruction is emitted, so release matching stays exact instead
/// of comparing recomputed floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SoundingNote {
    pub key: PianoKey,
    pub velocity: u8,
}
