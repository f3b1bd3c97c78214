use std::env;
use std::fs;
use std::path::PathBuf;
use std::process;

use gridsong::chord::{group_chord, note_duration, unterminated_notes};
use gridsong::{EventKind, Options, OutputMode, TimedEvent};

fn usage() -> ! {
    eprintln!("Usage: gridsong <input.mid> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -p, --output <path>  Write the song code to this path");
    eprintln!("                       (default: the input path with a .txt extension)");
    eprintln!("  -s, --stdout         Print the song code to standard output");
    eprintln!("  -d, --debug          Log per-chord diagnostics");
    eprintln!("  -c, --config <path>  Read options from a YAML file");
    eprintln!("      --mode <mode>    Output mode: images (default) or direct");
    process::exit(1);
}

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse flags
    let mut input_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut mode_flag: Option<String> = None;
    let mut to_stdout = false;
    let mut debug = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-p" | "--output" => {
                i += 1;
                match args.get(i) {
                    Some(path) => output_path = Some(PathBuf::from(path)),
                    None => usage(),
                }
            }
            "-c" | "--config" => {
                i += 1;
                match args.get(i) {
                    Some(path) => config_path = Some(PathBuf::from(path)),
                    None => usage(),
                }
            }
            "--mode" => {
                i += 1;
                match args.get(i) {
                    Some(name) => mode_flag = Some(name.clone()),
                    None => usage(),
                }
            }
            "-s" | "--stdout" => to_stdout = true,
            "-d" | "--debug" => debug = true,
            arg if arg.starts_with('-') => {
                eprintln!("Unknown option: {}", arg);
                usage();
            }
            _ => {
                if input_path.is_some() {
                    usage();
                }
                input_path = Some(PathBuf::from(&args[i]));
            }
        }
        i += 1;
    }

    let input_path = match input_path {
        Some(path) => path,
        None => usage(),
    };

    // Load options: config file first, then flag overrides
    let mut options = match &config_path {
        Some(path) => {
            let text = match fs::read_to_string(path) {
                Ok(text) => text,
                Err(e) => {
                    eprintln!("Error reading config '{}': {}", path.display(), e);
                    process::exit(1);
                }
            };
            match Options::from_yaml(&text) {
                Ok(options) => options,
                Err(e) => {
                    eprintln!("Error in config '{}': {}", path.display(), e);
                    process::exit(1);
                }
            }
        }
        None => Options::default(),
    };
    if let Some(name) = &mode_flag {
        options.mode = match OutputMode::parse(name) {
            Ok(mode) => mode,
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        };
    }

    // Read input file
    eprintln!("Parsing {}", input_path.display());
    let bytes = match fs::read(&input_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", input_path.display(), e);
            process::exit(1);
        }
    };

    let events = match gridsong::midi::parse_events(&bytes) {
        Ok(events) => events,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    for key in unterminated_notes(&events) {
        eprintln!(
            "Warning: {} is never released and sounds until the end of the piece",
            key.name()
        );
    }

    if debug {
        log_chords(&events);
    }

    // Convert
    let code = match gridsong::generate(&events, &options) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    // Output
    if to_stdout {
        println!("{}", code);
    } else {
        let out_path = output_path.unwrap_or_else(|| input_path.with_extension("txt"));
        if let Err(e) = fs::write(&out_path, &code) {
            eprintln!("Error writing to '{}': {}", out_path.display(), e);
            process::exit(1);
        }
        eprintln!("Wrote song code to {}", out_path.display());
    }
}

/// Walk the stream the way the aggregator does and log every chord.
fn log_chords(events: &[TimedEvent]) {
    let mut i = 0;
    while i < events.len() {
        if events[i].is_active_note_on() {
            let scan = group_chord(events, i);
            eprintln!(
                "Chord of {} sounding for {} ms:",
                scan.notes.len(),
                scan.boundary_ms
            );
            for note in &scan.notes {
                let span = note_duration(events, note.index);
                if span.terminated {
                    eprintln!(
                        "  - {} at velocity {} for {} ms",
                        note.key.name(),
                        note.velocity,
                        span.millis
                    );
                } else {
                    eprintln!(
                        "  - {} at velocity {} until the end of the piece",
                        note.key.name(),
                        note.velocity
                    );
                }
            }
            i = scan.end_index;
        } else {
            if matches!(events[i].kind, EventKind::Other) {
                eprintln!("Meta message at +{} ms", events[i].delta_ms);
            }
            i += 1;
        }
    }
}
