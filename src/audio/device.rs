//! Adaptateur de périphérique audio
//!
//! Interface consommée par le moteur de capture. Aucune méthode ne doit
//! bloquer: `read_available` livre uniquement ce qui est déjà capturé.

use std::time::Duration;
use thiserror::Error;

/// Erreurs remontées par un périphérique audio
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("Aucun périphérique audio trouvé: {0}")]
    NoDevice(String),

    #[error("Erreur de configuration: {0}")]
    ConfigError(String),

    #[error("Erreur de stream: {0}")]
    StreamError(String),

    #[error("Périphérique non ouvert")]
    NotOpen,
}

/// Source d'audio PCM 16 bits signé little-endian
#[cfg_attr(test, mockall::automock)]
pub trait AudioDevice {
    /// Ouvre le périphérique `name` (vide = périphérique par défaut)
    fn open(&mut self, name: &str, sample_rate: u32, channels: u16) -> Result<(), DeviceError>;

    /// Retourne les octets capturés depuis le dernier appel (éventuellement aucun)
    ///
    /// `elapsed` est le temps écoulé depuis le tick précédent.
    fn read_available(&mut self, elapsed: Duration) -> Result<Vec<u8>, DeviceError>;

    /// Réinitialise les timers internes au début d'une capture
    fn reset(&mut self);

    /// Ferme le périphérique
    fn close(&mut self);
}
