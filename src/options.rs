//! Conversion options, loadable from a YAML config file.

use serde::Deserialize;

use crate::error::SongError;

/// Shape of the output artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Encode chords into pixel-grid images plus one play call.
    #[default]
    Images,
    /// Emit one play call per note event, no images.
    Direct,
}

impl OutputMode {
    pub fn parse(name: &str) -> Result<Self, SongError> {
        match name {
            "images" => Ok(OutputMode::Images),
            "direct" => Ok(OutputMode::Direct),
            _ => Err(SongError::Options(format!(
                "unknown output mode: {} (expected \"images\" or \"direct\")",
                name
            ))),
        }
    }
}

/// Settings that shape the emitted song code.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub mode: OutputMode,
    /// Title comment placed above the artifact, when set.
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawOptions {
    mode: Option<String>,
    title: Option<String>,
}

impl Options {
    /// Parse options from YAML config text.
    ///
    /// # Example
    /// ```
    /// use gridsong::options::{Options, OutputMode};
    ///
    /// let options = Options::from_yaml("mode: direct\ntitle: Ode to Joy\n")?;
    /// assert_eq!(options.mode, OutputMode::Direct);
    /// assert_eq!(options.title.as_deref(), Some("Ode to Joy"));
    /// # Ok::<(), gridsong::SongError>(())
    /// ```
    pub fn from_yaml(text: &str) -> Result<Self, SongError> {
        if text.trim().is_empty() {
            return Ok(Options::default());
        }
        let raw: RawOptions =
            serde_yaml::from_str(text).map_err(|e| SongError::Options(e.to_string()))?;
        let mode = match raw.mode {
            Some(name) => OutputMode::parse(&name)?,
            None => OutputMode::default(),
        };
        Ok(Options {
            mode,
            title: raw.title,
        })
    }
}
