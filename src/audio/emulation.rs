//! Source audio émulée
//!
//! Produit une tonale pendant `OUTPUT_SOUND_DURATION` puis du silence, assez
//! fort pour dépasser le seuil de réveil. Un enregistrement PCM peut remplacer
//! la tonale (`with_pcm`) pour rejouer de la vraie parole. Permet de tester le
//! protocole sans matériel.

use super::device::{AudioDevice, DeviceError};
use std::f32::consts::PI;
use std::time::Duration;

/// Durée de la tonale après chaque démarrage
pub const OUTPUT_SOUND_DURATION: Duration = Duration::from_secs(1);

/// Fréquence de la tonale (Hz)
const TONE_FREQUENCY: f32 = 440.0;

/// Amplitude crête de la tonale, normalisée
pub const TONE_AMPLITUDE: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ToneState {
    Producing,
    Silent,
}

#[derive(Debug, Clone)]
enum Waveform {
    Tone,
    /// PCM 16 bits LE entrelacé, au format du périphérique ouvert
    Pcm { data: Vec<u8>, cursor: usize },
}

/// Générateur déterministe: tonale (ou enregistrement) puis silence
#[derive(Debug)]
pub struct ToneGenerator {
    open: Option<(u32, u16)>,
    waveform: Waveform,
    state: ToneState,
    elapsed: Duration,
    duration: Duration,
    /// Position de phase en échantillons depuis le début
    sample_index: u64,
    /// Fraction d'échantillon non encore produite
    carry: f64,
}

impl ToneGenerator {
    pub fn new() -> Self {
        Self::with_duration(OUTPUT_SOUND_DURATION)
    }

    /// Générateur avec une durée de tonale personnalisée
    pub fn with_duration(duration: Duration) -> Self {
        Self {
            open: None,
            waveform: Waveform::Tone,
            state: ToneState::Producing,
            elapsed: Duration::ZERO,
            duration,
            sample_index: 0,
            carry: 0.0,
        }
    }

    /// Rejoue `pcm` une fois puis produit du silence
    ///
    /// Les octets sont livrés tels quels: ils doivent correspondre au format
    /// passé à `open` (PCM 16 bits signé LE, canaux entrelacés).
    pub fn with_pcm(pcm: Vec<u8>) -> Self {
        Self {
            waveform: Waveform::Pcm {
                data: pcm,
                cursor: 0,
            },
            ..Self::with_duration(Duration::MAX)
        }
    }

    /// Vrai tant que la tonale est produite
    pub fn is_producing(&self) -> bool {
        self.state == ToneState::Producing
    }
}

impl Default for ToneGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioDevice for ToneGenerator {
    fn open(&mut self, name: &str, sample_rate: u32, channels: u16) -> Result<(), DeviceError> {
        tracing::debug!("Émulation ouverte ({}): {}Hz {}ch", name, sample_rate, channels);
        self.open = Some((sample_rate, channels));
        self.reset();
        Ok(())
    }

    fn read_available(&mut self, elapsed: Duration) -> Result<Vec<u8>, DeviceError> {
        let (sample_rate, channels) = self.open.ok_or(DeviceError::NotOpen)?;

        let exact = sample_rate as f64 * elapsed.as_secs_f64() + self.carry;
        let frames = exact.floor() as usize;
        self.carry = exact - frames as f64;

        let frame_bytes = channels as usize * 2;
        if let Waveform::Pcm { data, cursor } = &mut self.waveform {
            let mut bytes = vec![0u8; frames * frame_bytes];
            if self.state == ToneState::Producing {
                let n = bytes.len().min(data.len() - *cursor);
                bytes[..n].copy_from_slice(&data[*cursor..*cursor + n]);
                *cursor += n;
                if *cursor >= data.len() {
                    tracing::debug!("Émulation: fin de l'enregistrement ({} octets)", data.len());
                    self.state = ToneState::Silent;
                }
            }
            return Ok(bytes);
        }

        let mut bytes = Vec::with_capacity(frames * frame_bytes);
        for _ in 0..frames {
            let value = match self.state {
                ToneState::Producing => {
                    let t = self.sample_index as f32 / sample_rate as f32;
                    TONE_AMPLITUDE * (2.0 * PI * TONE_FREQUENCY * t).sin()
                }
                ToneState::Silent => 0.0,
            };
            let pcm = (value * 32767.0) as i16;
            for _ in 0..channels {
                bytes.extend_from_slice(&pcm.to_le_bytes());
            }
            self.sample_index += 1;
        }

        if self.state == ToneState::Producing {
            self.elapsed += elapsed;
            if self.elapsed >= self.duration {
                tracing::debug!("Émulation: fin de la tonale après {:?}", self.elapsed);
                self.state = ToneState::Silent;
            }
        }

        Ok(bytes)
    }

    fn reset(&mut self) {
        self.state = ToneState::Producing;
        self.elapsed = Duration::ZERO;
        self.sample_index = 0;
        self.carry = 0.0;
        if let Waveform::Pcm { cursor, .. } = &mut self.waveform {
            *cursor = 0;
        }
    }

    fn close(&mut self) {
        self.open = None;
    }
}
