//! Alarm playback for phase expiry.
//!
//! This module provides audio notification capabilities, including:
//!
//! - Synthesized chimes, one per kind of expiry
//! - User-supplied alarm files
//! - Non-blocking playback
//! - Graceful degradation to the terminal bell when audio is unavailable
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │   SoundPlayer    │ ← Main interface
//! └────────┬─────────┘
//!          │
//!          ├──────────────▶ RodioSoundPlayer  (feature "audio")
//!          │                  chime / file on an output device
//!          │
//!          └──────────────▶ BellSoundPlayer   (always available)
//!                             BEL characters on stdout
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use pomocycle::sound::{create_player, ChimeKind, SoundSource};
//!
//! let player = create_player(true);
//! if let Err(e) = player.play(&SoundSource::chime(ChimeKind::WorkEnd)) {
//!     eprintln!("Could not play sound: {}", e);
//! }
//! ```

mod error;
#[cfg(feature = "audio")]
mod player;
mod source;

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

pub use error::SoundError;
#[cfg(feature = "audio")]
pub use player::RodioSoundPlayer;
pub use source::{alarm_for, ChimeKind, SoundSource};

/// Trait for sound playback implementations.
///
/// This trait abstracts the sound playback functionality, allowing for
/// different implementations (e.g., rodio-based, terminal bell, mock for
/// testing).
pub trait SoundPlayer: Send + Sync {
    /// Plays a sound from the given source.
    ///
    /// This method should be non-blocking; the sound plays in the background.
    ///
    /// # Errors
    ///
    /// Returns an error if playback fails.
    fn play(&self, source: &SoundSource) -> Result<(), SoundError>;

    /// Returns true if sound playback is disabled.
    fn is_disabled(&self) -> bool;

    /// Enables sound playback.
    fn enable(&self);

    /// Disables sound playback.
    fn disable(&self);
}

#[cfg(feature = "audio")]
impl SoundPlayer for RodioSoundPlayer {
    fn play(&self, source: &SoundSource) -> Result<(), SoundError> {
        RodioSoundPlayer::play(self, source)
    }

    fn is_disabled(&self) -> bool {
        RodioSoundPlayer::is_disabled(self)
    }

    fn enable(&self) {
        RodioSoundPlayer::enable(self)
    }

    fn disable(&self) {
        RodioSoundPlayer::disable(self)
    }
}

// ============================================================================
// BellSoundPlayer
// ============================================================================

/// Rings the terminal bell instead of playing audio.
#[derive(Debug, Default)]
pub struct BellSoundPlayer {
    disabled: AtomicBool,
}

impl BellSoundPlayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the BEL sequence written for `source`.
    #[must_use]
    pub fn bells(source: &SoundSource) -> String {
        "\x07".repeat(source.fallback_chime().bell_count())
    }
}

impl SoundPlayer for BellSoundPlayer {
    fn play(&self, source: &SoundSource) -> Result<(), SoundError> {
        if self.is_disabled() {
            return Ok(());
        }

        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(Self::bells(source).as_bytes())
            .and_then(|()| stdout.flush())
            .map_err(|e| SoundError::PlaybackError(e.to_string()))?;

        debug!("Rang terminal bell for {}", source.name());
        Ok(())
    }

    fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Relaxed)
    }

    fn enable(&self) {
        self.disabled.store(false, Ordering::Relaxed);
    }

    fn disable(&self) {
        self.disabled.store(true, Ordering::Relaxed);
    }
}

// ============================================================================
// MockSoundPlayer
// ============================================================================

/// Mock sound player for testing.
#[derive(Debug, Default)]
pub struct MockSoundPlayer {
    play_calls: Mutex<Vec<SoundSource>>,
    disabled: AtomicBool,
    should_fail: AtomicBool,
}

impl MockSoundPlayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn play_count(&self) -> usize {
        self.calls().len()
    }

    #[must_use]
    pub fn get_play_calls(&self) -> Vec<SoundSource> {
        self.calls().clone()
    }

    pub fn clear_calls(&self) {
        self.calls().clear();
    }

    fn calls(&self) -> std::sync::MutexGuard<'_, Vec<SoundSource>> {
        self.play_calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SoundPlayer for MockSoundPlayer {
    fn play(&self, source: &SoundSource) -> Result<(), SoundError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SoundError::PlaybackError("Mock failure".to_string()));
        }
        if self.disabled.load(Ordering::SeqCst) {
            return Ok(());
        }
        self.calls().push(source.clone());
        Ok(())
    }

    fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    fn enable(&self) {
        self.disabled.store(false, Ordering::SeqCst);
    }

    fn disable(&self) {
        self.disabled.store(true, Ordering::SeqCst);
    }
}

/// Creates the best available player.
///
/// With the `audio` feature an output device is probed first; without one
/// (or without the feature) the terminal bell is used. A player created with
/// `enabled == false` stays silent until enabled.
#[must_use]
pub fn create_player(enabled: bool) -> Arc<dyn SoundPlayer> {
    #[cfg(feature = "audio")]
    {
        if enabled {
            match RodioSoundPlayer::new(false) {
                Ok(player) => return Arc::new(player),
                Err(e) => tracing::warn!("Audio not available, using terminal bell: {}", e),
            }
        }
    }

    let bell = BellSoundPlayer::new();
    if !enabled {
        bell.disable();
    }
    Arc::new(bell)
}
