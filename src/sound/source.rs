//! Sound source management.
//!
//! An alarm is either one of the built-in chimes, synthesized at play time,
//! or a user-supplied audio file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::error::SoundError;
use crate::daemon::TimerEvent;
use crate::types::Phase;

/// Supported audio file extensions.
const SUPPORTED_EXTENSIONS: &[&str] = &["wav", "mp3", "flac", "ogg"];

// ============================================================================
// ChimeKind
// ============================================================================

/// Built-in chimes, one per kind of phase expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChimeKind {
    /// Work ran out; time for a break
    WorkEnd,
    /// Break ran out; back to work
    BreakEnd,
    /// The last cycle finished
    SessionEnd,
}

impl ChimeKind {
    /// Returns the tone sequence as (frequency in Hz, duration).
    pub fn tones(&self) -> &'static [(f32, Duration)] {
        const SHORT: Duration = Duration::from_millis(180);
        const LONG: Duration = Duration::from_millis(400);

        match self {
            // Falling pair
            ChimeKind::WorkEnd => &[(880.0, SHORT), (659.25, LONG)],
            // Rising pair
            ChimeKind::BreakEnd => &[(659.25, SHORT), (880.0, LONG)],
            ChimeKind::SessionEnd => &[
                (523.25, SHORT),
                (659.25, SHORT),
                (783.99, SHORT),
                (1046.5, LONG),
            ],
        }
    }

    /// Number of terminal bells used when no audio device is present.
    pub fn bell_count(&self) -> usize {
        match self {
            ChimeKind::WorkEnd | ChimeKind::BreakEnd => 1,
            ChimeKind::SessionEnd => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChimeKind::WorkEnd => "work-end",
            ChimeKind::BreakEnd => "break-end",
            ChimeKind::SessionEnd => "session-end",
        }
    }
}

// ============================================================================
// SoundSource
// ============================================================================

/// Represents the source of a sound to be played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundSource {
    /// A synthesized chime.
    Chime {
        /// Which chime to play
        kind: ChimeKind,
    },
    /// An audio file on disk.
    File {
        /// Display name (the file stem)
        name: String,
        /// Full path to the file
        path: PathBuf,
    },
}

impl SoundSource {
    /// Creates a chime source.
    #[must_use]
    pub fn chime(kind: ChimeKind) -> Self {
        Self::Chime { kind }
    }

    /// Creates a file source after checking the path.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::FileNotFound` if the path is not an existing file,
    /// and `SoundError::DecodeError` if the extension is not a supported
    /// audio format.
    pub fn file(path: impl AsRef<Path>) -> Result<Self, SoundError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(SoundError::FileNotFound(path.display().to_string()));
        }

        let supported = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()));
        if !supported {
            return Err(SoundError::DecodeError(format!(
                "unsupported format: {}",
                path.display()
            )));
        }

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self::File {
            name,
            path: path.to_path_buf(),
        })
    }

    /// Returns the name of the sound source.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Chime { kind } => kind.name(),
            Self::File { name, .. } => name,
        }
    }

    /// Returns the file path if this is a file source.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File { path, .. } => Some(path),
            Self::Chime { .. } => None,
        }
    }

    /// Returns the chime to play instead of this source when it cannot be
    /// played.
    #[must_use]
    pub fn fallback_chime(&self) -> ChimeKind {
        match self {
            Self::Chime { kind } => *kind,
            Self::File { .. } => ChimeKind::WorkEnd,
        }
    }
}

/// Picks the alarm for a timer event.
///
/// Returns `None` for events that do not ring. A configured alarm file
/// replaces every chime.
#[must_use]
pub fn alarm_for(event: &TimerEvent, alarm_file: Option<&SoundSource>) -> Option<SoundSource> {
    let kind = match event {
        TimerEvent::PhaseCompleted {
            phase: Phase::Work, ..
        } => ChimeKind::WorkEnd,
        TimerEvent::PhaseCompleted {
            phase: Phase::Break,
            ..
        } => ChimeKind::BreakEnd,
        TimerEvent::SessionCompleted { .. } => ChimeKind::SessionEnd,
        _ => return None,
    };

    Some(match alarm_file {
        Some(file) => file.clone(),
        None => SoundSource::chime(kind),
    })
}
