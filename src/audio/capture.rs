//! Moteur de capture vocale
//!
//! Possède le cycle de vie du périphérique, bufferise le PCM et expose une
//! API de lecture non bloquante. Le moteur est piloté par un tick externe;
//! il n'a pas de verrou interne et doit être sérialisé par l'appelant.

use super::buffer::CaptureBuffer;
use super::device::AudioDevice;
use std::time::Duration;

/// Taille d'un échantillon PCM en octets (16 bits)
pub const BYTES_PER_SAMPLE: usize = 2;

/// Réglages du moteur
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    /// Capacité du buffer interne en octets
    pub buffer_capacity: usize,
    /// Taille de chunk annoncée par tick, en octets
    pub chunk_size: usize,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            buffer_capacity: 16000 * BYTES_PER_SAMPLE * 5, // 5 secondes @ 16kHz mono
            chunk_size: 3200,                              // 100ms @ 16kHz mono
        }
    }
}

/// Résultat de la dernière tentative de lecture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Capture en cours, rien à lire pour l'instant
    NoData,
    /// Des octets sont disponibles ou ont été copiés
    Ok,
    /// Au repos, aucune erreur (après un arrêt normal)
    NoError,
    /// Défaut du périphérique, réinitialisation requise
    Error,
    /// Moteur non initialisé ou arrêté définitivement
    StoppedUnsupported,
}

/// État du cycle de vie du moteur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    Uninitialized,
    Idle,
    Capturing,
    Error,
    Shutdown,
}

/// Configuration du périphérique courant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    pub name: String,
    pub sample_rate: u32,
    pub channels: u16,
}

impl DeviceConfig {
    fn validate(sample_rate: i32, channels: i32) -> Option<(u32, u16)> {
        if sample_rate <= 0 || !(1..=2).contains(&channels) {
            return None;
        }
        Some((sample_rate as u32, channels as u16))
    }
}

/// Résultat d'une lecture de données vocales
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceData {
    pub state: CaptureState,
    /// Octets copiés dans le buffer de l'appelant
    pub available_bytes: usize,
    /// Échantillons produits depuis le dernier `start()`
    pub sample_counter: u64,
}

/// Moteur de capture générique sur son adaptateur de périphérique
pub struct VoiceCaptureEngine<D: AudioDevice> {
    device: D,
    settings: CaptureSettings,
    status: EngineStatus,
    config: Option<DeviceConfig>,
    buffer: CaptureBuffer,
    amplitude: f32,
    sample_counter: u64,
    capture_time: Duration,
}

impl<D: AudioDevice> VoiceCaptureEngine<D> {
    /// Crée un moteur non initialisé
    pub fn new(device: D, settings: CaptureSettings) -> Self {
        let buffer = CaptureBuffer::new(settings.buffer_capacity);
        Self {
            device,
            settings,
            status: EngineStatus::Uninitialized,
            config: None,
            buffer,
            amplitude: 0.0,
            sample_counter: 0,
            capture_time: Duration::ZERO,
        }
    }

    /// Valide les paramètres et ouvre le périphérique
    pub fn init(&mut self, device_name: &str, sample_rate: i32, channels: i32) -> bool {
        match self.status {
            EngineStatus::Shutdown => {
                tracing::warn!("init() refusé: moteur arrêté définitivement");
                return false;
            }
            EngineStatus::Capturing => {
                tracing::warn!("init() refusé pendant la capture, utiliser change_device()");
                return false;
            }
            _ => {}
        }

        let Some((rate, channels)) = DeviceConfig::validate(sample_rate, channels) else {
            tracing::warn!(
                "Paramètres de capture invalides: {}Hz {}ch",
                sample_rate,
                channels
            );
            return false;
        };

        if self.config.is_some() {
            self.device.close();
            self.config = None;
        }

        match self.device.open(device_name, rate, channels) {
            Ok(()) => {
                self.config = Some(DeviceConfig {
                    name: device_name.to_string(),
                    sample_rate: rate,
                    channels,
                });
                self.buffer.clear();
                self.amplitude = 0.0;
                self.status = EngineStatus::Idle;
                tracing::info!(
                    "Capture initialisée: '{}' {}Hz {}ch",
                    device_name,
                    rate,
                    channels
                );
                true
            }
            Err(e) => {
                tracing::warn!("Ouverture du périphérique '{}' impossible: {}", device_name, e);
                if self.status != EngineStatus::Error {
                    self.status = EngineStatus::Uninitialized;
                }
                false
            }
        }
    }

    /// Ferme le périphérique; l'instance devient inutilisable
    pub fn shutdown(&mut self) {
        if self.status == EngineStatus::Shutdown {
            return;
        }
        if self.config.take().is_some() {
            self.device.close();
        }
        self.buffer.clear();
        self.amplitude = 0.0;
        self.status = EngineStatus::Shutdown;
        tracing::info!("Capture arrêtée définitivement");
    }

    /// Démarre la capture
    pub fn start(&mut self) -> bool {
        if self.status != EngineStatus::Idle {
            tracing::warn!("start() refusé dans l'état {:?}", self.status);
            return false;
        }

        self.device.reset();
        self.buffer.clear();
        self.amplitude = 0.0;
        self.sample_counter = 0;
        self.capture_time = Duration::ZERO;
        self.status = EngineStatus::Capturing;
        tracing::info!("Capture audio démarrée");
        true
    }

    /// Arrête la capture; idempotent. L'audio non lu est jeté.
    pub fn stop(&mut self) {
        if self.status != EngineStatus::Capturing {
            return;
        }

        let dropped = self.buffer.clear();
        if dropped > 0 {
            tracing::debug!("Arrêt: {} octets non lus jetés", dropped);
        }
        self.amplitude = 0.0;
        self.status = EngineStatus::Idle;
        tracing::info!("Capture audio arrêtée");
    }

    /// Change de périphérique sans état intermédiaire visible
    ///
    /// En cas d'échec, le périphérique précédent est rouvert et l'état du
    /// moteur (statut, audio non lu, compteur d'échantillons) reste celui
    /// d'avant l'appel. Si la réouverture échoue elle aussi, le moteur passe
    /// en `Error`.
    pub fn change_device(&mut self, device_name: &str, sample_rate: i32, channels: i32) -> bool {
        if matches!(
            self.status,
            EngineStatus::Shutdown | EngineStatus::Uninitialized | EngineStatus::Error
        ) {
            return self.init(device_name, sample_rate, channels);
        }

        let Some((rate, channels)) = DeviceConfig::validate(sample_rate, channels) else {
            tracing::warn!(
                "Changement de périphérique refusé: {}Hz {}ch invalide",
                sample_rate,
                channels
            );
            return false;
        };

        self.device.close();
        if let Err(e) = self.device.open(device_name, rate, channels) {
            tracing::warn!("Changement vers '{}' impossible: {}", device_name, e);
            self.reopen_previous();
            return false;
        }

        let was_capturing = self.is_capturing();
        self.stop();
        self.config = Some(DeviceConfig {
            name: device_name.to_string(),
            sample_rate: rate,
            channels,
        });
        tracing::info!("Périphérique changé: '{}' {}Hz {}ch", device_name, rate, channels);

        if was_capturing {
            self.start();
        }
        true
    }

    fn reopen_previous(&mut self) {
        let Some(previous) = self.config.clone() else {
            self.enter_error();
            return;
        };

        match self
            .device
            .open(&previous.name, previous.sample_rate, previous.channels)
        {
            Ok(()) => tracing::info!("Périphérique précédent '{}' restauré", previous.name),
            Err(e) => {
                tracing::error!("Restauration de '{}' impossible: {}", previous.name, e);
                self.enter_error();
            }
        }
    }

    fn enter_error(&mut self) {
        if self.config.take().is_some() {
            self.device.close();
        }
        self.buffer.clear();
        self.amplitude = 0.0;
        self.status = EngineStatus::Error;
    }

    pub fn is_capturing(&self) -> bool {
        self.status == EngineStatus::Capturing
    }

    pub fn status(&self) -> EngineStatus {
        self.status
    }

    /// Configuration du périphérique actif
    pub fn device_config(&self) -> Option<&DeviceConfig> {
        self.config.as_ref()
    }

    /// État courant et nombre d'octets prêts, sans les consommer
    pub fn get_capture_state(&self) -> (CaptureState, usize) {
        match self.status {
            EngineStatus::Error => (CaptureState::Error, 0),
            EngineStatus::Uninitialized | EngineStatus::Shutdown => {
                (CaptureState::StoppedUnsupported, 0)
            }
            EngineStatus::Idle => (CaptureState::NoError, 0),
            EngineStatus::Capturing if self.buffer.is_empty() => (CaptureState::NoData, 0),
            EngineStatus::Capturing => (CaptureState::Ok, self.buffer.len()),
        }
    }

    /// Consomme jusqu'à `out.len()` octets du buffer interne
    pub fn get_voice_data(&mut self, out: &mut [u8]) -> VoiceData {
        let state = match self.status {
            EngineStatus::Error => CaptureState::Error,
            EngineStatus::Uninitialized | EngineStatus::Shutdown => {
                CaptureState::StoppedUnsupported
            }
            EngineStatus::Idle => CaptureState::NoError,
            EngineStatus::Capturing => {
                let copied = self.buffer.pop_into(out);
                // Un buffer de sortie vide ne vide rien: `Ok` si des octets restent
                return VoiceData {
                    state: if copied > 0 || !self.buffer.is_empty() {
                        CaptureState::Ok
                    } else {
                        CaptureState::NoData
                    },
                    available_bytes: copied,
                    sample_counter: self.sample_counter,
                };
            }
        };

        VoiceData {
            state,
            available_bytes: 0,
            sample_counter: self.sample_counter,
        }
    }

    /// Taille de chunk par tick, en octets
    pub fn get_buffer_size(&self) -> i32 {
        i32::try_from(self.settings.chunk_size).unwrap_or(i32::MAX)
    }

    /// Amplitude normalisée [0, 1] du dernier chunk capturé
    pub fn get_current_amplitude(&self) -> f32 {
        self.amplitude
    }

    /// Avance la capture d'un tick. Retourne `true` pour rester planifié.
    pub fn tick(&mut self, delta: Duration) -> bool {
        if self.status == EngineStatus::Shutdown {
            return false;
        }
        if self.status != EngineStatus::Capturing {
            return true;
        }

        self.capture_time += delta;
        match self.device.read_available(delta) {
            Ok(bytes) => {
                self.amplitude = peak_amplitude(&bytes);
                self.sample_counter += (bytes.len() / BYTES_PER_SAMPLE) as u64;
                if !bytes.is_empty() {
                    self.buffer.push(&bytes);
                }
            }
            Err(e) => {
                tracing::error!("Défaut du périphérique pendant la capture: {}", e);
                self.enter_error();
            }
        }
        true
    }

    /// Journalise l'état complet du moteur
    pub fn dump_state(&self) {
        tracing::debug!(
            status = ?self.status,
            device = ?self.config,
            buffered = self.buffer.len(),
            capacity = self.buffer.capacity(),
            amplitude = self.amplitude,
            samples = self.sample_counter,
            capture_time = ?self.capture_time,
            "État de la capture"
        );
    }

    #[cfg(test)]
    pub(crate) fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }
}

/// Crête normalisée d'un chunk PCM 16 bits LE
pub fn peak_amplitude(pcm: &[u8]) -> f32 {
    let peak = pcm
        .chunks_exact(BYTES_PER_SAMPLE)
        .map(|b| i16::from_le_bytes([b[0], b[1]]).unsigned_abs())
        .max()
        .unwrap_or(0);
    (peak as f32 / 32768.0).min(1.0)
}
