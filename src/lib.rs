//! voxwit - Capture micro et protocole Wit.ai
//!
//! Deux sous-systèmes: le moteur de capture vocale (cycle de vie du
//! périphérique, buffer PCM, amplitude) et la construction des requêtes
//! pour /speech, /message, /synthesize et /voices.

pub mod audio;
pub mod client;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod request;
pub mod transport;
pub mod tts;

pub use client::WitContext;
pub use config::WitConfig;
pub use error::{Error, Result};
