//! Module TTS (synthèse vocale)
//!
//! Réglages de voix, décodage des clips et événements de synthèse.

mod clip;
mod config;
mod events;

pub use clip::SoundClip;
pub use config::TtsConfiguration;
pub use events::{ListenerHandle, SynthesizeEvents};

#[cfg(test)]
pub(crate) use clip::wav_bytes;

use thiserror::Error;

/// Erreurs de synthèse
#[derive(Error, Debug)]
pub enum TtsError {
    #[error("Audio WAV invalide: {0}")]
    Decode(#[from] hound::Error),

    #[error("Format audio non supporté: {0}")]
    UnsupportedFormat(String),
}
