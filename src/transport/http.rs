//! Transport reqwest

use super::{Payload, Transport, TransportError, TransportResponse};
use crate::request::{Method, PreparedRequest};
use async_trait::async_trait;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

/// Transport HTTP basé sur reqwest
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &PreparedRequest,
        payload: Payload,
    ) -> Result<TransportResponse, TransportError> {
        let mut builder = match request.method() {
            Method::Get => self.client.get(request.url()),
            Method::Post => self.client.post(request.url()),
        };

        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match payload {
            Payload::Empty => builder,
            Payload::Bytes(bytes) => {
                tracing::debug!("Envoi de {} octets vers {}", bytes.len(), request.url());
                builder.body(bytes)
            }
            Payload::Stream(rx) => {
                tracing::debug!("Envoi streamé vers {}", request.url());
                let stream = ReceiverStream::new(rx).map(Ok::<_, std::io::Error>);
                builder.body(reqwest::Body::wrap_stream(stream))
            }
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        if !(200..300).contains(&status) {
            tracing::warn!("Réponse {} pour /{}", status, request.endpoint());
        } else {
            tracing::debug!("Réponse {} ({} octets)", status, body.len());
        }

        Ok(TransportResponse { status, body })
    }
}
