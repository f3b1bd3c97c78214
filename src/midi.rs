//! # MIDI Intake
//!
//! Parses a Standard MIDI File and flattens it into the normalized
//! event stream the aggregator scans.
//!
//! ## What Gets Normalized
//! - Only SMF types 0 and 1 with metrical timing are accepted; type 2
//!   files and SMPTE timecode are rejected before any output.
//! - Tempo meta events from every track build one global tempo map, so
//!   a conductor track's tempo changes govern all tracks.
//! - Event times convert tick-by-tick to absolute microseconds through
//!   the tempo map, then round to milliseconds; deltas are differences
//!   of rounded absolute times, so rounding never drifts.
//! - Real note-offs and velocity-zero note-ons collapse into one
//!   release form. Every other message keeps only its timing as
//!   [`EventKind::Other`].
//! - Raw notes outside the 88-key range (21-108) are rejected.
//!
//! Channels are ignored; all tracks merge into one stream ordered by
//! absolute time, ties kept in track order.

use midly::{Format, MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};

use crate::error::SongError;
use crate::event::{EventKind, TimedEvent};
use crate::note::PianoKey;

/// Microseconds per beat before the first tempo event (120 BPM).
const DEFAULT_TEMPO: u32 = 500_000;

/// One tempo in force from `tick` onward.
#[derive(Debug, Clone, Copy)]
struct TempoChange {
    tick: u64,
    micros_per_beat: u32,
}

/// Piecewise tick-to-microsecond conversion over the whole file.
struct TempoMap {
    changes: Vec<TempoChange>,
    ticks_per_beat: u64,
}

impl TempoMap {
    fn build(smf: &Smf, ticks_per_beat: u64) -> Self {
        let mut changes: Vec<TempoChange> = Vec::new();

        for track in &smf.tracks {
            let mut tick: u64 = 0;
            for event in track {
                tick += u64::from(event.delta.as_int());
                if let TrackEventKind::Meta(MetaMessage::Tempo(tempo)) = event.kind {
                    changes.push(TempoChange {
                        tick,
                        micros_per_beat: tempo.as_int(),
                    });
                }
            }
        }

        changes.sort_by_key(|change| change.tick);
        if changes.first().map(|change| change.tick) != Some(0) {
            changes.insert(
                0,
                TempoChange {
                    tick: 0,
                    micros_per_beat: DEFAULT_TEMPO,
                },
            );
        }

        TempoMap {
            changes,
            ticks_per_beat,
        }
    }

    /// Absolute microseconds at an absolute tick.
    fn micros_at(&self, tick: u64) -> u64 {
        let mut micros: u128 = 0;
        for (i, change) in self.changes.iter().enumerate() {
            if change.tick >= tick {
                break;
            }
            let segment_end = match self.changes.get(i + 1) {
                Some(next) => next.tick.min(tick),
                None => tick,
            };
            let ticks = u128::from(segment_end - change.tick);
            micros += ticks * u128::from(change.micros_per_beat) / u128::from(self.ticks_per_beat);
        }
        micros as u64
    }
}

/// Parse MIDI bytes into the flattened, millisecond-timed event stream.
///
/// # Example
/// ```no_run
/// use gridsong::midi::parse_events;
///
/// let bytes = std::fs::read("song.mid").unwrap();
/// let events = parse_events(&bytes)?;
/// for event in &events {
///     println!("+{} ms: {:?}", event.delta_ms, event.kind);
/// }
/// # Ok::<(), gridsong::SongError>(())
/// ```
pub fn parse_events(bytes: &[u8]) -> Result<Vec<TimedEvent>, SongError> {
    let smf = Smf::parse(bytes).map_err(|e| SongError::Midi(e.to_string()))?;

    match smf.header.format {
        Format::SingleTrack | Format::Parallel => {}
        Format::Sequential => {
            return Err(SongError::UnsupportedFormat(
                "MIDI file is not type 0 or type 1".to_string(),
            ));
        }
    }

    let ticks_per_beat = match smf.header.timing {
        // A zero tick division would divide by zero in the tempo map.
        Timing::Metrical(ticks) if ticks.as_int() == 0 => {
            return Err(SongError::Midi(
                "metrical timing declares 0 ticks per beat".to_string(),
            ));
        }
        Timing::Metrical(ticks) => u64::from(ticks.as_int()),
        Timing::Timecode(fps, subframe) => {
            return Err(SongError::UnsupportedFormat(format!(
                "SMPTE timecode timing ({} fps, {} subframes) is not supported",
                fps.as_f32(),
                subframe
            )));
        }
    };

    let tempo_map = TempoMap::build(&smf, ticks_per_beat);

    // (absolute µs, track, sequence, kind): the tail keys keep the sort
    // stable for simultaneous events.
    let mut timeline: Vec<(u64, usize, usize, EventKind)> = Vec::new();
    for (track_index, track) in smf.tracks.iter().enumerate() {
        let mut tick: u64 = 0;
        for (sequence, event) in track.iter().enumerate() {
            tick += u64::from(event.delta.as_int());
            let kind = match event.kind {
                TrackEventKind::Midi { message, .. } => match message {
                    MidiMessage::NoteOn { key, vel } => EventKind::NoteOn {
                        key: PianoKey::from_midi(key.as_int())?,
                        velocity: vel.as_int(),
                    },
                    MidiMessage::NoteOff { key, .. } => EventKind::NoteOn {
                        key: PianoKey::from_midi(key.as_int())?,
                        velocity: 0,
                    },
                    _ => EventKind::Other,
                },
                _ => EventKind::Other,
            };
            timeline.push((tempo_map.micros_at(tick), track_index, sequence, kind));
        }
    }

    timeline.sort_by_key(|(micros, track, sequence, _)| (*micros, *track, *sequence));

    let mut events = Vec::with_capacity(timeline.len());
    let mut previous_ms: u64 = 0;
    for (micros, _, _, kind) in timeline {
        let absolute_ms = (micros + 500) / 1000;
        let delta = absolute_ms - previous_ms;
        let delta_ms = u32::try_from(delta)
            .map_err(|_| SongError::DelayOutOfRange { millis: delta })?;
        events.push(TimedEvent { delta_ms, kind });
        previous_ms = absolute_ms;
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use midly::num::{u15, u24, u28, u4, u7};
    use midly::{Header, Track, TrackEvent};

    use super::*;

    const TICKS_PER_BEAT: u16 = 480;

    fn note_on(delta: u32, key: u8, vel: u8) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::NoteOn {
                    key: u7::new(key),
                    vel: u7::new(vel),
                },
            },
        }
    }

    fn note_off(delta: u32, key: u8) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::NoteOff {
                    key: u7::new(key),
                    vel: u7::new(64),
                },
            },
        }
    }

    fn tempo(delta: u32, micros_per_beat: u32) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(micros_per_beat))),
        }
    }

    fn end_of_track() -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        }
    }

    fn smf_bytes(format: Format, tracks: Vec<Track<'static>>) -> Vec<u8> {
        smf_bytes_with_timing(format, Timing::Metrical(u15::new(TICKS_PER_BEAT)), tracks)
    }

    fn smf_bytes_with_timing(
        format: Format,
        timing: Timing,
        tracks: Vec<Track<'static>>,
    ) -> Vec<u8> {
        let mut smf = Smf::new(Header::new(format, timing));
        smf.tracks = tracks;
        let mut bytes = Vec::new();
        smf.write(&mut bytes).unwrap();
        bytes
    }

    fn presses(events: &[TimedEvent]) -> Vec<(u32, u8, u8)> {
        events
            .iter()
            .filter_map(|event| match event.kind {
                EventKind::NoteOn { key, velocity } => {
                    Some((event.delta_ms, key.index(), velocity))
                }
                EventKind::Other => None,
            })
            .collect()
    }

    #[test]
    fn test_parse_converts_ticks_to_milliseconds() {
        // 480 ticks at the default 500000 µs/beat = 500 ms.
        let bytes = smf_bytes(
            Format::SingleTrack,
            vec![vec![
                note_on(0, 60, 80),
                note_on(TICKS_PER_BEAT as u32, 60, 0),
                end_of_track(),
            ]],
        );
        let events = parse_events(&bytes).unwrap();

        assert_eq!(presses(&events), vec![(0, 39, 80), (500, 39, 0)]);
    }

    #[test]
    fn test_parse_normalizes_note_off_to_zero_velocity() {
        let bytes = smf_bytes(
            Format::SingleTrack,
            vec![vec![
                note_on(0, 60, 80),
                note_off(TICKS_PER_BEAT as u32, 60),
                end_of_track(),
            ]],
        );
        let events = parse_events(&bytes).unwrap();

        assert_eq!(presses(&events), vec![(0, 39, 80), (500, 39, 0)]);
    }

    #[test]
    fn test_parse_applies_tempo_changes_from_the_change_point() {
        // One beat at 500000 µs, then the tempo doubles to 250000 µs:
        // the second beat-long gap is 250 ms.
        let bytes = smf_bytes(
            Format::SingleTrack,
            vec![vec![
                tempo(0, 500_000),
                note_on(0, 60, 80),
                tempo(TICKS_PER_BEAT as u32, 250_000),
                note_on(TICKS_PER_BEAT as u32, 62, 80),
                end_of_track(),
            ]],
        );
        let events = parse_events(&bytes).unwrap();

        assert_eq!(presses(&events), vec![(0, 39, 80), (250, 41, 80)]);
        // The tempo event itself sits 500 ms in.
        let other_deltas: Vec<u32> = events
            .iter()
            .filter(|e| e.kind == EventKind::Other)
            .map(|e| e.delta_ms)
            .collect();
        assert!(other_deltas.contains(&500));
    }

    #[test]
    fn test_parse_tempo_track_governs_other_tracks() {
        // Type 1: conductor track carries the tempo, note track the
        // notes. 960 ticks at 250000 µs/beat = 500 ms.
        let bytes = smf_bytes(
            Format::Parallel,
            vec![
                vec![tempo(0, 250_000), end_of_track()],
                vec![
                    note_on(0, 60, 80),
                    note_on(2 * TICKS_PER_BEAT as u32, 60, 0),
                    end_of_track(),
                ],
            ],
        );
        let events = parse_events(&bytes).unwrap();

        assert_eq!(presses(&events), vec![(0, 39, 80), (500, 39, 0)]);
    }

    #[test]
    fn test_parse_merges_tracks_by_absolute_time() {
        let bytes = smf_bytes(
            Format::Parallel,
            vec![
                vec![note_on(0, 60, 80), end_of_track()],
                vec![note_on(0, 64, 90), end_of_track()],
            ],
        );
        let events = parse_events(&bytes).unwrap();

        assert_eq!(presses(&events), vec![(0, 39, 80), (0, 43, 90)]);
    }

    #[test]
    fn test_parse_rejects_type_2() {
        let bytes = smf_bytes(Format::Sequential, vec![vec![end_of_track()]]);
        let result = parse_events(&bytes);
        assert!(matches!(result, Err(SongError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_parse_rejects_smpte_timecode_timing() {
        let bytes = smf_bytes_with_timing(
            Format::SingleTrack,
            Timing::Timecode(midly::Fps::Fps25, 40),
            vec![vec![note_on(0, 60, 80), end_of_track()]],
        );
        let result = parse_events(&bytes);
        assert!(matches!(
            result,
            Err(SongError::UnsupportedFormat(ref message)) if message.contains("SMPTE")
        ));
    }

    #[test]
    fn test_parse_rejects_zero_ticks_per_beat() {
        // A degenerate but parseable header; events at nonzero ticks
        // must come back as an error, not a division panic.
        let bytes = smf_bytes_with_timing(
            Format::SingleTrack,
            Timing::Metrical(u15::new(0)),
            vec![vec![note_on(0, 60, 80), note_on(1, 60, 0), end_of_track()]],
        );
        let result = parse_events(&bytes);
        assert!(matches!(
            result,
            Err(SongError::Midi(ref message)) if message.contains("0 ticks per beat")
        ));
    }

    #[test]
    fn test_parse_rejects_notes_outside_the_keyboard() {
        let bytes = smf_bytes(
            Format::SingleTrack,
            vec![vec![note_on(0, 12, 80), end_of_track()]],
        );
        let result = parse_events(&bytes);
        assert!(matches!(
            result,
            Err(SongError::NoteOutOfRange { raw: 12 })
        ));
    }

    #[test]
    fn test_parse_rejects_garbage_bytes() {
        assert!(matches!(
            parse_events(&[0x4d, 0x54, 0x00]),
            Err(SongError::Midi(_))
        ));
    }
}
