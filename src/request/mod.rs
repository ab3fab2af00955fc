//! Module de construction des requêtes Wit.ai
//!
//! Produit des descripteurs (URL, en-têtes, paramètres, Content-Type audio)
//! pour les opérations /speech, /message, /synthesize et /voices.

mod builder;
mod descriptor;
mod types;

pub use builder::{
    add_encoding_content_type, add_endian_content_type, add_format_accept,
    add_format_content_type, add_rate_content_type, add_sample_size_content_type,
    add_text_parameter, encode_text, set_base_configuration,
};
pub use descriptor::{AudioContentType, PreparedRequest, RequestDescriptor};
pub use types::{
    Encoding, Endian, Endpoint, Format, Method, SampleSize, HEADER_ACCEPT,
    HEADER_AUTHORIZATION, HEADER_CONTENT_TYPE, URL_DEFAULT, VERSION_DEFAULT,
};

use thiserror::Error;

/// Erreurs de configuration d'une requête
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("Token d'authentification vide")]
    EmptyAuthToken,

    #[error("Configuration de base absente (opération, token, version)")]
    MissingBaseConfiguration,

    #[error("Texte vide")]
    EmptyText,

    #[error("Taux d'échantillonnage invalide: {0}")]
    InvalidRate(i32),

    #[error("Content-Type audio incomplet: '{0}' manquant")]
    IncompleteContentType(&'static str),

    #[error("Paramètre texte requis pour /message")]
    MissingText,

    #[error("Format Accept requis pour /synthesize")]
    MissingAccept,

    #[error("Content-Type audio non supporté pour /{0}")]
    UnexpectedContentType(Endpoint),

    #[error("Paramètre texte non supporté pour /{0}")]
    UnexpectedText(Endpoint),
}
