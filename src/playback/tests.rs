use std::collections::BTreeSet;

use super::*;
use crate::chord::Chord;
use crate::grid::DecodedFrame;
use crate::note::PianoKey;

/// Records every sink call in order.
#[derive(Default)]
struct RecordingSink {
    calls: Vec<SinkCall>,
}

#[derive(Debug, Clone, PartialEq)]
enum SinkCall {
    Play {
        delay_ms: u32,
        frequency: f64,
        velocity: u8,
        duration_ms: u32,
    },
    Suspend {
        duration_ms: u32,
    },
}

impl AudioSink for RecordingSink {
    fn queue_play_instruction(&mut self, delay_ms: u32, frequency: f64, velocity: u8, duration_ms: u32) {
        self.calls.push(SinkCall::Play {
            delay_ms,
            frequency,
            velocity,
            duration_ms,
        });
    }

    fn suspend(&mut self, duration_ms: u32) {
        self.calls.push(SinkCall::Suspend { duration_ms });
    }
}

fn key(index: u8) -> PianoKey {
    PianoKey::new(index).unwrap()
}

fn frame(columns: &[(u32, u8, &[u8])]) -> DecodedFrame {
    DecodedFrame {
        chords: columns
            .iter()
            .map(|(onset_delay_ms, velocity, keys)| Chord {
                onset_delay_ms: *onset_delay_ms,
                velocity: *velocity,
                notes: keys.iter().map(|k| key(*k)).collect::<BTreeSet<_>>(),
            })
            .collect(),
    }
}

#[test]
fn test_note_on_appends_and_release_removes() {
    let mut player = Player::new(RecordingSink::default());

    player.note_on(key(39), 80, 0, true);
    player.note_on(key(43), 90, 0, true);
    assert_eq!(player.sounding().len(), 2);

    player.note_on(key(39), 0, 0, true);
    assert_eq!(player.sounding().len(), 1);
    assert_eq!(player.sounding()[0].key, key(43));

    // Zero delay: nothing was ever played or suspended.
    assert!(player.into_sink().calls.is_empty());
}

#[test]
fn test_release_removes_only_first_matching_entry() {
    let mut player = Player::new(RecordingSink::default());

    // A true unison: the same key pressed twice.
    player.note_on(key(50), 80, 0, false);
    player.note_on(key(50), 100, 0, false);
    player.note_on(key(50), 0, 0, false);

    assert_eq!(player.sounding().len(), 1);
    assert_eq!(player.sounding()[0].velocity, 100);
}

#[test]
fn test_release_of_unknown_key_is_a_no_op() {
    let mut player = Player::new(RecordingSink::default());
    player.note_on(key(30), 80, 0, false);
    player.note_on(key(31), 0, 0, false);
    assert_eq!(player.sounding().len(), 1);
}

#[test]
fn test_note_on_with_delay_plays_whole_set_then_suspends() {
    let mut player = Player::new(RecordingSink::default());

    player.note_on(key(48), 80, 0, true); // A4, no delay yet
    player.note_on(key(60), 64, 250, true); // A5, sounds both for 250 ms

    let calls = player.into_sink().calls;
    assert_eq!(calls.len(), 3);
    assert_eq!(
        calls[0],
        SinkCall::Play {
            delay_ms: 0,
            frequency: 440.0,
            velocity: 80,
            duration_ms: 250
        }
    );
    assert_eq!(
        calls[1],
        SinkCall::Play {
            delay_ms: 0,
            frequency: 880.0,
            velocity: 64,
            duration_ms: 250
        }
    );
    assert_eq!(calls[2], SinkCall::Suspend { duration_ms: 250 });
}

#[test]
fn test_note_on_without_play_now_never_touches_the_sink() {
    let mut player = Player::new(RecordingSink::default());
    player.note_on(key(48), 80, 500, false);
    assert!(player.into_sink().calls.is_empty());
}

#[test]
fn test_play_frame_batches_each_column() {
    let mut player = Player::new(RecordingSink::default());
    player.play_frame(&frame(&[(100, 80, &[39, 43]), (200, 90, &[46])]));

    let calls = player.into_sink().calls;
    // Column 1: two plays then one suspend; column 2: three plays (the
    // sounding set carries over) then one suspend.
    assert_eq!(calls.len(), 7);
    assert!(matches!(calls[0], SinkCall::Play { duration_ms: 100, velocity: 80, .. }));
    assert!(matches!(calls[1], SinkCall::Play { duration_ms: 100, .. }));
    assert_eq!(calls[2], SinkCall::Suspend { duration_ms: 100 });
    assert!(matches!(calls[3], SinkCall::Play { duration_ms: 200, .. }));
    assert!(matches!(calls[6], SinkCall::Suspend { duration_ms: 200 }));
}

#[test]
fn test_play_frame_suspends_even_for_zero_onset() {
    let mut player = Player::new(RecordingSink::default());
    player.play_frame(&frame(&[(0, 80, &[39])]));

    let calls = player.into_sink().calls;
    assert_eq!(
        calls,
        vec![
            SinkCall::Play {
                delay_ms: 0,
                frequency: key(39).frequency(),
                velocity: 80,
                duration_ms: 0
            },
            SinkCall::Suspend { duration_ms: 0 },
        ]
    );
}

#[test]
fn test_play_frames_in_order() {
    let mut player = Player::new(RecordingSink::default());
    let first = frame(&[(10, 80, &[20])]);
    let second = frame(&[(20, 80, &[24])]);
    player.play_frames(&[first, second]);

    let calls = player.into_sink().calls;
    let suspends: Vec<u32> = calls
        .iter()
        .filter_map(|call| match call {
            SinkCall::Suspend { duration_ms } => Some(*duration_ms),
            _ => None,
        })
        .collect();
    assert_eq!(suspends, vec![10, 20]);
}

#[test]
fn test_sounding_set_persists_across_frames() {
    let mut player = Player::new(RecordingSink::default());
    player.play_frames(&[frame(&[(10, 80, &[20])]), frame(&[(20, 80, &[24])])]);
    assert_eq!(player.sounding().len(), 2);
}

#[test]
fn test_frequencies_derived_at_emission() {
    let mut player = Player::new(RecordingSink::default());
    player.play_frame(&frame(&[(50, 80, &[39])]));

    let calls = player.into_sink().calls;
    match &calls[0] {
        SinkCall::Play { frequency, .. } => {
            assert!((frequency - 261.6256).abs() < 0.001); // C4
        }
        other => panic!("expected a play instruction, got {:?}", other),
    }
}
