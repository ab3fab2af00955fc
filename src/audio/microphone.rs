//! Capture audio depuis le microphone
//!
//! Utilise cpal pour la capture cross-platform et ringbuf pour le buffering.
//! Les échantillons f32 sont convertis en PCM 16 bits little-endian dans le
//! callback, puis livrés au moteur à chaque tick.

use super::device::{AudioDevice, DeviceError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleRate, Stream, StreamConfig};
use ringbuf::{traits::*, HeapCons, HeapRb};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Secondes d'audio retenues entre deux ticks
const RING_SECONDS: usize = 1;

struct OpenStream {
    stream: Stream,
    consumer: HeapCons<u8>,
    faulted: Arc<AtomicBool>,
    fault_message: Arc<std::sync::Mutex<Option<String>>>,
}

/// Périphérique d'entrée réel (cpal)
#[derive(Default)]
pub struct CpalDevice {
    open: Option<OpenStream>,
}

impl CpalDevice {
    pub fn new() -> Self {
        Self::default()
    }

    fn find_device(name: &str) -> Result<Device, DeviceError> {
        let host = cpal::default_host();
        if name.is_empty() {
            return host
                .default_input_device()
                .ok_or_else(|| DeviceError::NoDevice("défaut".to_string()));
        }

        host.input_devices()
            .map_err(|e| DeviceError::ConfigError(e.to_string()))?
            .find(|d| d.name().map(|n| n == name).unwrap_or(false))
            .ok_or_else(|| DeviceError::NoDevice(name.to_string()))
    }
}

impl AudioDevice for CpalDevice {
    fn open(&mut self, name: &str, sample_rate: u32, channels: u16) -> Result<(), DeviceError> {
        self.close();

        let device = Self::find_device(name)?;
        tracing::info!("Périphérique audio: {:?}", device.name());

        let stream_config = StreamConfig {
            channels,
            sample_rate: SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let capacity = sample_rate as usize * channels as usize * 2 * RING_SECONDS;
        let (mut producer, consumer) = HeapRb::<u8>::new(capacity.max(2)).split();

        let faulted = Arc::new(AtomicBool::new(false));
        let fault_message = Arc::new(std::sync::Mutex::new(None));
        let faulted_cb = Arc::clone(&faulted);
        let fault_message_cb = Arc::clone(&fault_message);

        let stream = device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // Conversion f32 -> i16 LE, les octets en trop sont perdus
                    for &sample in data {
                        let pcm = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
                        let _ = producer.push_slice(&pcm.to_le_bytes());
                    }
                },
                move |err| {
                    tracing::error!("Erreur stream audio: {}", err);
                    if let Ok(mut message) = fault_message_cb.lock() {
                        *message = Some(err.to_string());
                    }
                    faulted_cb.store(true, Ordering::SeqCst);
                },
                None,
            )
            .map_err(|e| DeviceError::StreamError(e.to_string()))?;

        stream
            .play()
            .map_err(|e| DeviceError::StreamError(e.to_string()))?;

        tracing::info!("Stream micro ouvert: {}Hz {}ch", sample_rate, channels);

        self.open = Some(OpenStream {
            stream,
            consumer,
            faulted,
            fault_message,
        });
        Ok(())
    }

    fn read_available(&mut self, _elapsed: Duration) -> Result<Vec<u8>, DeviceError> {
        let open = self.open.as_mut().ok_or(DeviceError::NotOpen)?;

        if open.faulted.load(Ordering::SeqCst) {
            let message = open
                .fault_message
                .lock()
                .ok()
                .and_then(|m| m.clone())
                .unwrap_or_else(|| "stream interrompu".to_string());
            return Err(DeviceError::StreamError(message));
        }

        let mut bytes = vec![0u8; open.consumer.occupied_len()];
        let n = open.consumer.pop_slice(&mut bytes);
        bytes.truncate(n);
        Ok(bytes)
    }

    fn reset(&mut self) {
        if let Some(open) = self.open.as_mut() {
            open.consumer.clear();
        }
    }

    fn close(&mut self) {
        if let Some(open) = self.open.take() {
            if let Err(e) = open.stream.pause() {
                tracing::warn!("Pause du stream impossible: {}", e);
            }
            tracing::info!("Stream micro fermé");
        }
    }
}

impl Drop for CpalDevice {
    fn drop(&mut self) {
        self.close();
    }
}

/// Liste les périphériques d'entrée disponibles
pub fn list_input_devices() -> Vec<String> {
    let host = cpal::default_host();
    host.input_devices()
        .map(|devices| devices.filter_map(|d| d.name().ok()).collect())
        .unwrap_or_default()
}
