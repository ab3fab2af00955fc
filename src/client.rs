//! Contexte Wit.ai
//!
//! `WitContext` est construit explicitement au démarrage et passé aux
//! collaborateurs. Il possède le transport HTTP et la configuration; le
//! relâcher (ou appeler `shutdown`) est le seul chemin de fermeture.

use crate::audio::DeviceConfig;
use crate::config::WitConfig;
use crate::error::{Error, Result};
use crate::request::{
    add_encoding_content_type, add_endian_content_type, add_format_accept,
    add_format_content_type, add_rate_content_type, add_sample_size_content_type,
    add_text_parameter, encode_text, set_base_configuration, Encoding, Endian, Endpoint,
    Format, PreparedRequest, RequestDescriptor, RequestError, SampleSize,
};
use crate::transport::{HttpTransport, Payload, Transport, TransportResponse};
use crate::tts::{SoundClip, SynthesizeEvents, TtsConfiguration};
use serde::Deserialize;
use std::sync::Arc;

/// Corps d'erreur renvoyé par le service
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    code: Option<String>,
}

/// Contexte partagé par les opérations Wit.ai
pub struct WitContext<T: Transport = HttpTransport> {
    config: WitConfig,
    transport: Arc<T>,
}

impl WitContext<HttpTransport> {
    /// Contexte avec le transport reqwest
    pub fn from_config(config: WitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config, HttpTransport::new()))
    }
}

impl<T: Transport> WitContext<T> {
    pub fn new(config: WitConfig, transport: T) -> Self {
        tracing::info!(
            "Contexte Wit.ai prêt (url: {})",
            if config.custom_url.is_empty() {
                crate::request::URL_DEFAULT
            } else {
                config.custom_url.as_str()
            }
        );
        Self {
            config,
            transport: Arc::new(transport),
        }
    }

    pub fn config(&self) -> &WitConfig {
        &self.config
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Descripteur initialisé avec le token, la version et l'URL configurés
    pub fn descriptor(&self, endpoint: Endpoint) -> std::result::Result<RequestDescriptor, RequestError> {
        let mut descriptor = RequestDescriptor::new();
        set_base_configuration(
            &mut descriptor,
            endpoint,
            &self.config.server_auth_token,
            &self.config.api_version,
            &self.config.custom_url,
        )?;
        Ok(descriptor)
    }

    /// Requête /speech pour du PCM 16 bits signé little-endian
    pub fn speech_request(
        &self,
        device: &DeviceConfig,
    ) -> std::result::Result<PreparedRequest, RequestError> {
        if device.channels != 1 {
            tracing::warn!(
                "/speech attend de l'audio mono, {} canaux configurés",
                device.channels
            );
        }

        let mut descriptor = self.descriptor(Endpoint::Speech)?;
        add_format_content_type(&mut descriptor, Format::Raw)?;
        add_encoding_content_type(&mut descriptor, Encoding::SignedInteger)?;
        add_sample_size_content_type(&mut descriptor, SampleSize::Word)?;
        add_rate_content_type(
            &mut descriptor,
            i32::try_from(device.sample_rate).unwrap_or(i32::MAX),
        )?;
        add_endian_content_type(&mut descriptor, Endian::Little)?;
        descriptor.build()
    }

    pub fn message_request(&self, text: &str) -> std::result::Result<PreparedRequest, RequestError> {
        let mut descriptor = self.descriptor(Endpoint::Message)?;
        add_text_parameter(&mut descriptor, &encode_text(text))?;
        descriptor.build()
    }

    pub fn synthesize_request(&self) -> std::result::Result<PreparedRequest, RequestError> {
        let mut descriptor = self.descriptor(Endpoint::Synthesize)?;
        add_format_accept(&mut descriptor, Format::Wav)?;
        descriptor.build()
    }

    pub fn voices_request(&self) -> std::result::Result<PreparedRequest, RequestError> {
        self.descriptor(Endpoint::Voices)?.build()
    }

    /// Compréhension d'un texte (/message), réponse JSON brute
    pub async fn understand(&self, text: &str) -> Result<serde_json::Value> {
        let request = self.message_request(text)?;
        let response = self.transport.send(&request, Payload::Empty).await?;
        json_body(&response)
    }

    /// Liste des voix disponibles (/voices), réponse JSON brute
    pub async fn list_voices(&self) -> Result<serde_json::Value> {
        let request = self.voices_request()?;
        let response = self.transport.send(&request, Payload::Empty).await?;
        json_body(&response)
    }

    /// Synthèse vocale (/synthesize)
    ///
    /// Les écouteurs reçoivent d'abord la réponse brute, puis le clip décodé.
    /// Toute erreur est aussi diffusée aux écouteurs d'erreur.
    pub async fn synthesize(
        &self,
        text: &str,
        settings: &TtsConfiguration,
        events: &SynthesizeEvents,
    ) -> Result<SoundClip> {
        let result = self.synthesize_inner(text, settings, events).await;
        match &result {
            Ok(clip) => events.broadcast_response(true, Some(clip)),
            Err(e) => {
                let (code, message) = match e {
                    Error::Api { code, message, .. } => (code.clone(), message.clone()),
                    Error::Request(_) => ("invalid_request".to_string(), e.to_string()),
                    Error::Tts(_) => ("invalid_audio".to_string(), e.to_string()),
                    _ => ("transport".to_string(), e.to_string()),
                };
                events.broadcast_error(&code, &message);
                events.broadcast_response(false, None);
            }
        }
        result
    }

    async fn synthesize_inner(
        &self,
        text: &str,
        settings: &TtsConfiguration,
        events: &SynthesizeEvents,
    ) -> Result<SoundClip> {
        if text.trim().is_empty() {
            return Err(RequestError::EmptyText.into());
        }

        let request = self.synthesize_request()?;
        let body = serde_json::to_vec(&settings.body(text))?;
        tracing::debug!("Synthèse de {} caractères (voix {})", text.len(), settings.voice);

        let response = self.transport.send(&request, Payload::Bytes(body)).await?;
        if !response.is_success() {
            return Err(api_error(&response));
        }

        let clip_id = settings.clip_id(text);
        events.broadcast_raw(&clip_id, &response.body, settings);

        let clip = SoundClip::from_wav(&response.body)?;
        tracing::info!("Clip {} synthétisé ({:?})", clip_id, clip.duration());
        Ok(clip)
    }

    /// Ferme le contexte
    pub fn shutdown(self) {
        tracing::info!("Contexte Wit.ai fermé");
    }
}

fn json_body(response: &TransportResponse) -> Result<serde_json::Value> {
    if !response.is_success() {
        return Err(api_error(response));
    }
    Ok(serde_json::from_slice(&response.body)?)
}

fn api_error(response: &TransportResponse) -> Error {
    let parsed = serde_json::from_slice::<ApiErrorBody>(&response.body).ok();
    let code = parsed
        .as_ref()
        .and_then(|b| b.code.clone())
        .unwrap_or_else(|| format!("http_{}", response.status));
    let message = parsed
        .and_then(|b| b.error)
        .unwrap_or_else(|| response.text());

    Error::Api {
        status: response.status,
        code,
        message,
    }
}
