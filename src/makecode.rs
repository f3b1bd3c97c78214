use crate::error::SongError;
use crate::event::{EventKind, TimedEvent};
use crate::options::Options;

/// Wrap encoded image blocks into MakeCode source: an `img` literal
/// array plus one call that hands it to the on-device player.
///
/// No images produce an empty artifact.
pub fn images_artifact(images: &[String], options: &Options) -> String {
    if images.is_empty() {
        return String::new();
    }

    let mut code = String::new();

    if let Some(title) = &options.title {
        code.push_str(&format!("// {}\n", title));
    }

    code.push_str("let song = [");
    for (i, image) in images.iter().enumerate() {
        if i > 0 {
            code.push_str(", ");
        }
        code.push_str("img`\n");
        code.push_str(image);
        code.push('`');
    }
    code.push_str("]\n");
    code.push_str("playSong(song)\n");

    code
}

/// Emit one `playNote` call per note event, presses and releases alike.
///
/// Delays of skipped non-note events fold into the next call, so the
/// generated sequence keeps the stream's absolute timing.
pub fn direct_artifact(events: &[TimedEvent], options: &Options) -> Result<String, SongError> {
    let mut calls = String::new();
    let mut pending: u64 = 0;

    for event in events {
        match event.kind {
            EventKind::NoteOn { key, velocity } => {
                let delay = pending + u64::from(event.delta_ms);
                let delay_ms = u32::try_from(delay)
                    .map_err(|_| SongError::DelayOutOfRange { millis: delay })?;
                calls.push_str(&format!(
                    "playNote({}, {}, {})\n",
                    key.index(),
                    velocity,
                    delay_ms
                ));
                pending = 0;
            }
            EventKind::Other => {
                pending += u64::from(event.delta_ms);
            }
        }
    }

    if calls.is_empty() {
        return Ok(String::new());
    }

    let mut code = String::new();
    if let Some(title) = &options.title {
        code.push_str(&format!("// {}\n", title));
    }
    code.push_str(&calls);
    Ok(code)
}
