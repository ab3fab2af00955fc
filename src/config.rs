//! Configuration de l'application
//!
//! Fichier JSON; les champs absents prennent leur valeur par défaut.
//! `WIT_SERVER_TOKEN` remplace le token du fichier.

use crate::audio::{CaptureSettings, BYTES_PER_SAMPLE};
use crate::tts::TtsConfiguration;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Variable d'environnement du token serveur
pub const TOKEN_ENV: &str = "WIT_SERVER_TOKEN";

/// Erreurs de configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Lecture de la configuration impossible: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration invalide: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Valeur invalide pour '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Réglages du périphérique de capture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Nom du périphérique, vide = périphérique par défaut
    pub device_name: String,
    pub sample_rate: u32,
    pub channels: u16,
    /// Capacité du buffer interne en octets
    pub buffer_capacity: usize,
    /// Taille de chunk par tick en octets
    pub chunk_size: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        let settings = CaptureSettings::default();
        Self {
            device_name: String::new(),
            sample_rate: 16000,
            channels: 1,
            buffer_capacity: settings.buffer_capacity,
            chunk_size: settings.chunk_size,
        }
    }
}

impl CaptureConfig {
    pub fn settings(&self) -> CaptureSettings {
        CaptureSettings {
            buffer_capacity: self.buffer_capacity,
            chunk_size: self.chunk_size,
        }
    }
}

/// Réglages d'une session de dictée
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Intervalle entre deux ticks de capture (ms)
    pub tick_interval_ms: u64,
    /// Amplitude au-delà de laquelle l'entrée est considérée comme de la parole
    pub wake_threshold: f32,
    /// Silence après la parole avant de terminer la requête (ms)
    pub silence_timeout_ms: u64,
    /// Durée maximale d'une session (ms)
    pub max_duration_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 50,
            wake_threshold: 0.25,
            silence_timeout_ms: 1000,
            max_duration_ms: 10000,
        }
    }
}

impl SessionConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn silence_timeout(&self) -> Duration {
        Duration::from_millis(self.silence_timeout_ms)
    }

    pub fn max_duration(&self) -> Duration {
        Duration::from_millis(self.max_duration_ms)
    }
}

/// Configuration complète
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WitConfig {
    /// Token serveur de l'application Wit.ai
    pub server_auth_token: String,
    /// Version de l'API, vide = version par défaut
    pub api_version: String,
    /// URL de base, vide = api.wit.ai
    pub custom_url: String,
    pub capture: CaptureConfig,
    pub session: SessionConfig,
    pub tts: TtsConfiguration,
}

impl WitConfig {
    /// Charge la configuration depuis un fichier JSON
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&content)?;
        config.apply_env();
        config.validate()?;
        tracing::info!("Configuration chargée depuis {}", path.display());
        Ok(config)
    }

    /// Configuration par défaut, token pris dans l'environnement
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            if !token.trim().is_empty() {
                self.server_auth_token = token;
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capture.sample_rate == 0 {
            return Err(ConfigError::Invalid {
                field: "capture.sample_rate",
                reason: "doit être > 0".to_string(),
            });
        }
        if !(1..=2).contains(&self.capture.channels) {
            return Err(ConfigError::Invalid {
                field: "capture.channels",
                reason: format!("{} (attendu 1 ou 2)", self.capture.channels),
            });
        }
        if self.capture.buffer_capacity < BYTES_PER_SAMPLE {
            return Err(ConfigError::Invalid {
                field: "capture.buffer_capacity",
                reason: "trop petit".to_string(),
            });
        }
        if self.session.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "session.tick_interval_ms",
                reason: "doit être > 0".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.session.wake_threshold) {
            return Err(ConfigError::Invalid {
                field: "session.wake_threshold",
                reason: format!("{} hors de [0, 1]", self.session.wake_threshold),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "custom_url": "http://localhost:9000", "capture": {{ "sample_rate": 48000 }} }}"#
        )
        .unwrap();

        let config = WitConfig::load(file.path()).unwrap();
        assert_eq!(config.custom_url, "http://localhost:9000");
        assert_eq!(config.capture.sample_rate, 48000);
        assert_eq!(config.capture.channels, 1);
        assert_eq!(config.session, SessionConfig::default());
        assert_eq!(config.tts.voice, "Charlie");
    }

    #[test]
    fn test_load_rejects_invalid_channels() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "capture": {{ "channels": 6 }} }}"#).unwrap();

        assert!(matches!(
            WitConfig::load(file.path()),
            Err(ConfigError::Invalid {
                field: "capture.channels",
                ..
            })
        ));
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ pas du json").unwrap();
        assert!(matches!(
            WitConfig::load(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            WitConfig::load("/nonexistent/voxwit.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
