//! Descripteur de requête
//!
//! `RequestDescriptor` est rempli par les fonctions du builder, puis scellé
//! par `build()` en `PreparedRequest`, immuable pour la durée d'un appel.

use super::types::{
    Encoding, Endian, Endpoint, Format, Method, SampleSize, ENCODING_KEY, ENDIAN_KEY,
    FORMAT_KEY, HEADER_ACCEPT, HEADER_CONTENT_TYPE, PARAMETER_TEXT_KEY, RATE_KEY,
    SAMPLE_SIZE_KEY,
};
use super::RequestError;
use std::collections::BTreeMap;

/// Facettes du Content-Type audio de /speech
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioContentType {
    pub format: Option<Format>,
    pub encoding: Option<Encoding>,
    pub sample_size: Option<SampleSize>,
    pub rate: Option<u32>,
    pub endian: Option<Endian>,
}

impl AudioContentType {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Paramètres ordonnés; erreur sur la première facette manquante
    fn parameters(&self) -> Result<Vec<(&'static str, String)>, RequestError> {
        let missing = RequestError::IncompleteContentType;
        let format = self.format.ok_or(missing(FORMAT_KEY))?;
        let encoding = self.encoding.ok_or(missing(ENCODING_KEY))?;
        let sample_size = self.sample_size.ok_or(missing(SAMPLE_SIZE_KEY))?;
        let rate = self.rate.ok_or(missing(RATE_KEY))?;
        let endian = self.endian.ok_or(missing(ENDIAN_KEY))?;

        Ok(vec![
            (FORMAT_KEY, format.token().to_string()),
            (ENCODING_KEY, encoding.token().to_string()),
            (SAMPLE_SIZE_KEY, sample_size.token().to_string()),
            (RATE_KEY, rate.to_string()),
            (ENDIAN_KEY, endian.token().to_string()),
        ])
    }
}

/// Requête en cours de construction
#[derive(Debug, Clone, Default)]
pub struct RequestDescriptor {
    pub(super) endpoint: Option<Endpoint>,
    pub(super) base_url: String,
    pub(super) auth_token: String,
    pub(super) api_version: String,
    pub(super) headers: BTreeMap<String, String>,
    pub(super) query: Vec<(String, String)>,
    pub(super) content: AudioContentType,
}

impl RequestDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn endpoint(&self) -> Option<Endpoint> {
        self.endpoint
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn content(&self) -> &AudioContentType {
        &self.content
    }

    /// Remplace ou ajoute un paramètre, en conservant sa position
    pub(super) fn set_query(&mut self, key: &str, value: &str) {
        match self.query.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.query.push((key.to_string(), value.to_string())),
        }
    }

    /// Vérifie les invariants de l'opération et scelle la requête
    pub fn build(self) -> Result<PreparedRequest, RequestError> {
        let endpoint = self.endpoint.ok_or(RequestError::MissingBaseConfiguration)?;
        let has_text = self.query.iter().any(|(k, _)| k == PARAMETER_TEXT_KEY);
        let mut headers = self.headers;
        let mut content_parameters = Vec::new();

        if endpoint != Endpoint::Speech && !self.content.is_empty() {
            return Err(RequestError::UnexpectedContentType(endpoint));
        }

        match endpoint {
            Endpoint::Speech => {
                content_parameters = self.content.parameters()?;
                let content_type = render_content_type(&content_parameters);
                headers.insert(HEADER_CONTENT_TYPE.to_string(), content_type);
            }
            Endpoint::Message => {
                if !has_text {
                    return Err(RequestError::MissingText);
                }
            }
            Endpoint::Synthesize => {
                if !headers.contains_key(HEADER_ACCEPT) {
                    return Err(RequestError::MissingAccept);
                }
                headers.insert(
                    HEADER_CONTENT_TYPE.to_string(),
                    Format::Json.mime().to_string(),
                );
            }
            Endpoint::Voices => {}
        }

        if endpoint != Endpoint::Message && has_text {
            return Err(RequestError::UnexpectedText(endpoint));
        }

        let url = render_url(&self.base_url, endpoint, &self.query);
        tracing::debug!("Requête préparée: {:?} {}", endpoint.method(), url);

        Ok(PreparedRequest {
            endpoint,
            url,
            headers,
            query: self.query,
            content_parameters,
        })
    }
}

/// `audio/raw;encoding=...;bits=...;rate=...;endian=...`
fn render_content_type(parameters: &[(&'static str, String)]) -> String {
    let mut rendered = String::new();
    for (key, value) in parameters {
        if *key == FORMAT_KEY {
            rendered.push_str("audio/");
            rendered.push_str(value);
        } else {
            rendered.push(';');
            rendered.push_str(key);
            rendered.push('=');
            rendered.push_str(value);
        }
    }
    rendered
}

fn render_url(base_url: &str, endpoint: Endpoint, query: &[(String, String)]) -> String {
    let mut url = format!("{}/{}", base_url.trim_end_matches('/'), endpoint.token());
    for (i, (key, value)) in query.iter().enumerate() {
        url.push(if i == 0 { '?' } else { '&' });
        url.push_str(key);
        url.push('=');
        url.push_str(value);
    }
    url
}

/// Requête scellée, remise telle quelle au transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    endpoint: Endpoint,
    url: String,
    headers: BTreeMap<String, String>,
    query: Vec<(String, String)>,
    content_parameters: Vec<(&'static str, String)>,
}

impl PreparedRequest {
    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    pub fn method(&self) -> Method {
        self.endpoint.method()
    }

    /// URL complète, paramètres compris
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(HEADER_CONTENT_TYPE)
    }

    /// Paramètres audio ordonnés (vide hors /speech)
    pub fn content_parameters(&self) -> &[(&'static str, String)] {
        &self.content_parameters
    }

    /// Paramètres audio au format `format=raw; encoding=...; ...`
    pub fn content_parameter_string(&self) -> String {
        self.content_parameters
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("; ")
    }
}
