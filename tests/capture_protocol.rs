//! Tests d'intégration capture + protocole
//!
//! Utilise la capture émulée, sans matériel audio.

use std::time::Duration;
use voxwit::audio::{
    CaptureSettings, CaptureState, ToneGenerator, VoiceCaptureEmulation, VoiceCaptureEngine,
    OUTPUT_SOUND_DURATION,
};
use voxwit::request::{
    add_encoding_content_type, add_endian_content_type, add_format_content_type,
    add_rate_content_type, add_sample_size_content_type, add_text_parameter, encode_text,
    set_base_configuration, Encoding, Endian, Endpoint, Format, RequestDescriptor, RequestError,
    SampleSize,
};

const TICK: Duration = Duration::from_millis(20);
const WAKE_THRESHOLD: f32 = 0.25;

fn emulation() -> VoiceCaptureEmulation {
    VoiceCaptureEngine::new(ToneGenerator::new(), CaptureSettings::default())
}

#[test]
fn test_captured_bytes_never_exceed_capacity() {
    let mut engine = emulation();
    assert!(engine.init("", 16000, 2));
    assert!(engine.start());

    let mut out = [0u8; 700];
    for capacity in [1usize, 7, 128, 700] {
        engine.tick(TICK);
        loop {
            let data = engine.get_voice_data(&mut out[..capacity]);
            assert!(data.available_bytes <= capacity);
            if data.state == CaptureState::Ok {
                assert!(data.available_bytes > 0);
            } else {
                assert_eq!(data.state, CaptureState::NoData);
                assert_eq!(data.available_bytes, 0);
                break;
            }
        }
    }
}

#[test]
fn test_amplitude_falls_after_output_duration() {
    let mut engine = emulation();
    engine.init("", 16000, 1);
    engine.start();

    engine.tick(TICK);
    assert!(engine.get_current_amplitude() > WAKE_THRESHOLD);

    let mut ticked = TICK;
    while ticked < OUTPUT_SOUND_DURATION {
        engine.tick(TICK);
        ticked += TICK;
    }
    engine.tick(TICK);
    assert!(engine.get_current_amplitude() <= 0.001);
}

#[test]
fn test_captured_audio_feeds_speech_request() {
    let mut engine = emulation();
    engine.init("", 16000, 1);
    engine.start();
    engine.tick(TICK);

    let device = engine.device_config().cloned().unwrap();
    let mut descriptor = RequestDescriptor::new();
    set_base_configuration(&mut descriptor, Endpoint::Speech, "token", "", "").unwrap();
    add_format_content_type(&mut descriptor, Format::Raw).unwrap();
    add_encoding_content_type(&mut descriptor, Encoding::SignedInteger).unwrap();
    add_sample_size_content_type(&mut descriptor, SampleSize::Word).unwrap();
    add_rate_content_type(&mut descriptor, device.sample_rate as i32).unwrap();
    add_endian_content_type(&mut descriptor, Endian::Little).unwrap();
    let request = descriptor.build().unwrap();

    assert_eq!(
        request.content_parameter_string(),
        "format=raw; encoding=signed-integer; bits=16; rate=16000; endian=little"
    );

    let (state, available) = engine.get_capture_state();
    assert_eq!(state, CaptureState::Ok);
    assert_eq!(available, 640);
}

#[test]
fn test_message_descriptor_text_handling() {
    let mut encoded = RequestDescriptor::new();
    set_base_configuration(&mut encoded, Endpoint::Message, "token", "", "").unwrap();
    add_text_parameter(&mut encoded, &encode_text("quelle heure est-il ?")).unwrap();
    let request = encoded.build().unwrap();
    assert!(request.url().ends_with("&q=quelle%20heure%20est-il%20%3F"));

    let mut empty = RequestDescriptor::new();
    set_base_configuration(&mut empty, Endpoint::Message, "token", "", "").unwrap();
    assert_eq!(
        add_text_parameter(&mut empty, ""),
        Err(RequestError::EmptyText)
    );
    assert_eq!(empty.build(), Err(RequestError::MissingText));
}
