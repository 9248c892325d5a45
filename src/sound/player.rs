//! Sound player implementation using rodio.
//!
//! This module provides the `RodioSoundPlayer` which uses the rodio v0.20
//! audio library for cross-platform sound playback. It is only built with
//! the `audio` feature.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use rodio::source::{SineWave, Source};
use rodio::{Decoder, OutputStream, Sink};
use tracing::{debug, warn};

use super::error::SoundError;
use super::source::{ChimeKind, SoundSource};

/// Chime volume relative to full scale.
const CHIME_AMPLITUDE: f32 = 0.2;

/// A sound player that uses rodio for audio playback.
///
/// rodio's output stream cannot be moved across threads, so each alarm opens
/// its own stream on a short-lived playback thread. The player itself only
/// holds flags and is safe to share.
pub struct RodioSoundPlayer {
    /// Whether sound playback is disabled.
    disabled: AtomicBool,
}

impl RodioSoundPlayer {
    /// Creates a new sound player after probing the default output device.
    ///
    /// # Arguments
    ///
    /// * `disabled` - If true, all sound playback will be silently skipped.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::DeviceNotAvailable` if no audio output device
    /// is available.
    pub fn new(disabled: bool) -> Result<Self, SoundError> {
        let (_stream, _handle) = OutputStream::try_default()
            .map_err(|e| SoundError::DeviceNotAvailable(e.to_string()))?;

        debug!("Audio output device available");

        Ok(Self {
            disabled: AtomicBool::new(disabled),
        })
    }

    /// Plays a sound from the given source.
    ///
    /// This method is non-blocking; the sound plays on a background thread.
    /// A file that cannot be played falls back to the matching chime.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::PlaybackError` if the playback thread cannot be
    /// spawned.
    pub fn play(&self, source: &SoundSource) -> Result<(), SoundError> {
        if self.disabled.load(Ordering::Relaxed) {
            debug!("Sound playback disabled, skipping");
            return Ok(());
        }

        let source = source.clone();
        std::thread::Builder::new()
            .name("alarm".to_string())
            .spawn(move || {
                if let Err(e) = play_blocking(&source) {
                    warn!("Alarm playback failed: {} ({})", e, e.suggestion());
                }
            })
            .map_err(|e| SoundError::PlaybackError(e.to_string()))?;

        Ok(())
    }

    /// Returns true if sound playback is currently disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Relaxed)
    }

    /// Enables sound playback.
    pub fn enable(&self) {
        self.disabled.store(false, Ordering::Relaxed);
        debug!("Sound playback enabled");
    }

    /// Disables sound playback.
    pub fn disable(&self) {
        self.disabled.store(true, Ordering::Relaxed);
        debug!("Sound playback disabled");
    }
}

impl std::fmt::Debug for RodioSoundPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioSoundPlayer")
            .field("disabled", &self.disabled.load(Ordering::Relaxed))
            .finish()
    }
}

/// Plays `source` to completion on the current thread.
fn play_blocking(source: &SoundSource) -> Result<(), SoundError> {
    let (_stream, handle) =
        OutputStream::try_default().map_err(|e| SoundError::StreamError(e.to_string()))?;
    let sink = Sink::try_new(&handle).map_err(|e| SoundError::StreamError(e.to_string()))?;

    match source {
        SoundSource::Chime { kind } => append_chime(&sink, *kind),
        SoundSource::File { name, path } => {
            debug!("Playing alarm file: {}", name);
            if let Err(e) = append_file(&sink, path) {
                if !e.should_fallback_to_chime() {
                    return Err(e);
                }
                warn!("Failed to play '{}': {}, falling back to chime", name, e);
                append_chime(&sink, source.fallback_chime());
            }
        }
    }

    sink.sleep_until_end();
    Ok(())
}

fn append_chime(sink: &Sink, kind: ChimeKind) {
    for &(frequency, duration) in kind.tones() {
        sink.append(
            SineWave::new(frequency)
                .take_duration(duration)
                .amplify(CHIME_AMPLITUDE),
        );
    }
}

fn append_file(sink: &Sink, path: &Path) -> Result<(), SoundError> {
    let file = File::open(path)
        .map_err(|e| SoundError::FileNotFound(format!("{}: {}", path.display(), e)))?;
    let decoder =
        Decoder::new(BufReader::new(file)).map_err(|e| SoundError::DecodeError(e.to_string()))?;

    sink.append(decoder);
    Ok(())
}
