//! Alarm sound sources.

use std::path::{Path, PathBuf};

/// Frequency of the built-in alarm tone.
pub const TONE_FREQUENCY_HZ: f32 = 880.0;

/// Length of one beep of the built-in tone, in milliseconds.
pub const TONE_BEEP_MS: u64 = 300;

/// Silence between beeps of the built-in tone, in milliseconds.
pub const TONE_GAP_MS: u64 = 200;

/// Where the alarm sound comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundSource {
    /// An audio file on disk (any format rodio can decode).
    File {
        /// Path to the file.
        path: PathBuf,
    },
    /// The synthesized beep pattern built into the binary.
    Tone,
}

impl SoundSource {
    /// Creates a file-backed source.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File { path: path.into() }
    }

    /// Picks the configured file if any, the built-in tone otherwise.
    #[must_use]
    pub fn from_config(alarm_sound: Option<&Path>) -> Self {
        match alarm_sound {
            Some(path) => Self::file(path),
            None => Self::Tone,
        }
    }

    /// Short human-readable name.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::File { path } => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            Self::Tone => "tone".to_string(),
        }
    }
}

impl Default for SoundSource {
    fn default() -> Self {
        Self::Tone
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        assert_eq!(SoundSource::from_config(None), SoundSource::Tone);
        assert_eq!(
            SoundSource::from_config(Some(Path::new("/sounds/bell.ogg"))),
            SoundSource::file("/sounds/bell.ogg")
        );
    }

    #[test]
    fn test_name() {
        assert_eq!(SoundSource::Tone.name(), "tone");
        assert_eq!(SoundSource::file("/sounds/bell.ogg").name(), "bell");
    }

    #[test]
    fn test_default_is_tone() {
        assert_eq!(SoundSource::default(), SoundSource::Tone);
    }
}
