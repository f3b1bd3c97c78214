pub mod chord;
pub mod error;
pub mod event;
pub mod grid;
pub mod makecode;
pub mod midi;
pub mod note;
pub mod options;
pub mod playback;

pub use chord::{collect_chords, Aggregate, Chord};
pub use error::SongError;
pub use event::{EventKind, TimedEvent};
pub use note::PianoKey;
pub use options::{Options, OutputMode};

/// Convert MIDI bytes into MakeCode song code with default options.
/// This is the main entry point for the library.
pub fn convert(midi: &[u8]) -> Result<String, SongError> {
    convert_with_options(midi, &Options::default())
}

/// Convert MIDI bytes into MakeCode song code shaped by `options`.
pub fn convert_with_options(midi: &[u8], options: &Options) -> Result<String, SongError> {
    let events = midi::parse_events(midi)?;
    generate(&events, options)
}

/// Generate the song-code artifact from an already-parsed event stream.
pub fn generate(events: &[TimedEvent], options: &Options) -> Result<String, SongError> {
    match options.mode {
        OutputMode::Images => {
            let aggregate = collect_chords(events)?;
            let frames = grid::encode_frames(&aggregate.chords);
            let images = grid::compose_images(&frames);
            Ok(makecode::images_artifact(&images, options))
        }
        OutputMode::Direct => makecode::direct_artifact(events, options),
    }
}
