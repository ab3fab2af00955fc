//! Module de capture audio
//!
//! Gère le périphérique d'entrée, le buffering PCM et la mesure d'amplitude.

mod buffer;
mod capture;
mod device;
mod emulation;
mod microphone;

pub use buffer::CaptureBuffer;
pub use capture::{
    peak_amplitude, CaptureSettings, CaptureState, DeviceConfig, EngineStatus,
    VoiceCaptureEngine, VoiceData, BYTES_PER_SAMPLE,
};
pub use device::{AudioDevice, DeviceError};
#[cfg(test)]
pub(crate) use device::MockAudioDevice;
pub use emulation::{ToneGenerator, OUTPUT_SOUND_DURATION, TONE_AMPLITUDE};
pub use microphone::{list_input_devices, CpalDevice};

/// Capture émulée: tonale puis silence
pub type VoiceCaptureEmulation = VoiceCaptureEngine<ToneGenerator>;
