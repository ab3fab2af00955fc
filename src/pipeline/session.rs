//! Session de dictée
//!
//! Pilote les ticks du moteur de capture sur un intervalle tokio, attend que
//! l'amplitude dépasse le seuil de réveil, puis streame les chunks capturés
//! comme corps d'une requête /speech jusqu'au silence ou à la durée maximale.

use crate::audio::{AudioDevice, CaptureState, EngineStatus, VoiceCaptureEngine};
use crate::client::WitContext;
use crate::config::SessionConfig;
use crate::request::RequestError;
use crate::transport::{Payload, Transport, TransportError, TransportResponse};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, Interval, MissedTickBehavior};

/// Chunks en attente d'envoi avant que la capture ne patiente
const STREAM_CHANNEL_CAPACITY: usize = 32;

/// Erreurs de session
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Capture non initialisée")]
    NotInitialized,

    #[error("Défaut du périphérique pendant la session")]
    DeviceFault,

    #[error("Requête invalide: {0}")]
    Request(#[from] RequestError),

    #[error("Transport: {0}")]
    Transport(#[from] TransportError),
}

/// Événements émis pendant une session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Le seuil de réveil a été dépassé
    Woke { amplitude: f32 },
    /// Un chunk a été envoyé
    ChunkSent { bytes: usize },
    /// La requête est terminée
    Finished { status: u16 },
}

/// Issue d'une session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Aucune parole avant la durée maximale, rien n'a été envoyé
    NoSpeech,
    Response(TransportResponse),
}

/// Session de dictée réutilisable
pub struct SpeechSession {
    config: SessionConfig,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl SpeechSession {
    pub fn new(config: SessionConfig) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self { config, event_tx }
    }

    /// S'abonne aux événements de session
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Exécute une session complète sur un moteur initialisé
    ///
    /// La capture est démarrée si besoin et arrêtée à la fin.
    pub async fn run<D, T>(
        &self,
        engine: &mut VoiceCaptureEngine<D>,
        context: &WitContext<T>,
    ) -> Result<SessionOutcome, SessionError>
    where
        D: AudioDevice,
        T: Transport,
    {
        let device = engine
            .device_config()
            .cloned()
            .ok_or(SessionError::NotInitialized)?;
        let request = context.speech_request(&device)?;

        if !engine.is_capturing() && !engine.start() {
            return Err(SessionError::NotInitialized);
        }

        let mut ticker = interval(self.config.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let Some(amplitude) = self.wait_for_wake(engine, &mut ticker).await? else {
            engine.stop();
            tracing::info!("Aucune parole détectée");
            return Ok(SessionOutcome::NoSpeech);
        };

        tracing::info!("Réveil (amplitude {:.2}), envoi vers /speech", amplitude);
        let _ = self.event_tx.send(SessionEvent::Woke { amplitude });

        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        let streamed = {
            let send = context.transport().send(&request, Payload::Stream(rx));
            let streaming = self.stream_chunks(engine, &mut ticker, tx);
            tokio::pin!(send, streaming);

            // Sur défaut du périphérique la requête en vol est abandonnée
            tokio::select! {
                faulted = &mut streaming => if faulted { None } else { Some(send.await) },
                response = &mut send => if streaming.await { None } else { Some(response) },
            }
        };
        engine.stop();

        let Some(response) = streamed else {
            tracing::warn!("Défaut du périphérique, requête /speech abandonnée");
            return Err(SessionError::DeviceFault);
        };

        let response = response?;
        let _ = self.event_tx.send(SessionEvent::Finished {
            status: response.status,
        });
        tracing::info!("Session terminée: statut {}", response.status);
        Ok(SessionOutcome::Response(response))
    }

    /// Tick jusqu'au seuil de réveil; `None` si la durée maximale est atteinte
    async fn wait_for_wake<D: AudioDevice>(
        &self,
        engine: &mut VoiceCaptureEngine<D>,
        ticker: &mut Interval,
    ) -> Result<Option<f32>, SessionError> {
        let tick = self.config.tick_interval();
        let mut elapsed = std::time::Duration::ZERO;
        let mut discard = vec![0u8; chunk_len(engine)];

        while elapsed < self.config.max_duration() {
            ticker.tick().await;
            engine.tick(tick);
            elapsed += tick;

            if engine.status() == EngineStatus::Error {
                return Err(SessionError::DeviceFault);
            }

            let amplitude = engine.get_current_amplitude();
            if amplitude >= self.config.wake_threshold {
                return Ok(Some(amplitude));
            }

            // L'audio précédant le réveil n'est pas envoyé
            while engine.get_voice_data(&mut discard).state == CaptureState::Ok {}
        }
        Ok(None)
    }

    /// Envoie les chunks jusqu'au silence; retourne `true` sur défaut du périphérique
    async fn stream_chunks<D: AudioDevice>(
        &self,
        engine: &mut VoiceCaptureEngine<D>,
        ticker: &mut Interval,
        tx: mpsc::Sender<Vec<u8>>,
    ) -> bool {
        let tick = self.config.tick_interval();
        let mut chunk = vec![0u8; chunk_len(engine)];
        let mut elapsed = std::time::Duration::ZERO;
        let mut silence = std::time::Duration::ZERO;

        loop {
            loop {
                let data = engine.get_voice_data(&mut chunk);
                if data.state != CaptureState::Ok {
                    break;
                }
                let bytes = chunk[..data.available_bytes].to_vec();
                if tx.send(bytes).await.is_err() {
                    tracing::warn!("Requête /speech fermée par le transport");
                    return false;
                }
                let _ = self.event_tx.send(SessionEvent::ChunkSent {
                    bytes: data.available_bytes,
                });
            }

            if engine.get_current_amplitude() < self.config.wake_threshold {
                silence += tick;
            } else {
                silence = std::time::Duration::ZERO;
            }
            if silence >= self.config.silence_timeout() || elapsed >= self.config.max_duration() {
                tracing::debug!("Fin du flux après {:?} (silence {:?})", elapsed, silence);
                return false;
            }

            ticker.tick().await;
            engine.tick(tick);
            elapsed += tick;

            if engine.status() == EngineStatus::Error {
                return true;
            }
        }
    }
}

fn chunk_len<D: AudioDevice>(engine: &VoiceCaptureEngine<D>) -> usize {
    usize::try_from(engine.get_buffer_size()).unwrap_or(0).max(1)
}
