//! Module transport HTTP
//!
//! Envoie une `PreparedRequest` avec un corps vide, complet ou streamé par
//! chunks, et retourne le statut et le corps de la réponse.

mod http;

pub use http::HttpTransport;

use crate::request::PreparedRequest;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// Erreurs du transport
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Erreur réseau: {0}")]
    Http(#[from] reqwest::Error),
}

/// Corps d'une requête
#[derive(Debug)]
pub enum Payload {
    Empty,
    Bytes(Vec<u8>),
    /// Chunks envoyés au fil de la capture; la fermeture du canal termine le corps
    Stream(mpsc::Receiver<Vec<u8>>),
}

/// Réponse brute du service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Corps interprété en UTF-8 (avec remplacement)
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Capacité d'envoi d'une requête
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: &PreparedRequest,
        payload: Payload,
    ) -> Result<TransportResponse, TransportError>;
}
