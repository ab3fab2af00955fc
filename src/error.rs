//! Erreurs de voxwit

use thiserror::Error;

use crate::config::ConfigError;
use crate::pipeline::SessionError;
use crate::request::RequestError;
use crate::transport::TransportError;
use crate::tts::TtsError;

/// Résultat des opérations voxwit
pub type Result<T> = std::result::Result<T, Error>;

/// Erreurs possibles
#[derive(Error, Debug)]
pub enum Error {
    #[error("Requête invalide: {0}")]
    Request(#[from] RequestError),

    #[error("Transport: {0}")]
    Transport(#[from] TransportError),

    /// Réponse d'erreur du service
    #[error("Erreur API {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Sérialisation: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Synthèse: {0}")]
    Tts(#[from] TtsError),

    #[error("Configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Session: {0}")]
    Session(#[from] SessionError),
}
