//! Vocabulaire du protocole Wit.ai
//!
//! Chaque option énumérée correspond à un token fixe sur le fil.

use serde::{Deserialize, Serialize};
use std::fmt;

/// URL par défaut de l'API
pub const URL_DEFAULT: &str = "https://api.wit.ai";

/// Version utilisée quand aucune n'est fournie
pub const VERSION_DEFAULT: &str = "20240304";

pub const PARAMETER_VERSION_KEY: &str = "v";
pub const PARAMETER_TEXT_KEY: &str = "q";

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_ACCEPT: &str = "Accept";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";

pub const FORMAT_KEY: &str = "format";
pub const ENCODING_KEY: &str = "encoding";
pub const SAMPLE_SIZE_KEY: &str = "bits";
pub const RATE_KEY: &str = "rate";
pub const ENDIAN_KEY: &str = "endian";

/// Opérations de l'API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Speech,
    Message,
    Synthesize,
    Voices,
}

/// Méthode HTTP d'une opération
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Endpoint {
    const TOKENS: [&'static str; 4] = ["speech", "message", "synthesize", "voices"];

    /// Chemin de l'opération, sans '/'
    pub fn token(self) -> &'static str {
        Self::TOKENS[self as usize]
    }

    pub fn method(self) -> Method {
        match self {
            Endpoint::Speech | Endpoint::Synthesize => Method::Post,
            Endpoint::Message | Endpoint::Voices => Method::Get,
        }
    }
}

/// Format audio / MIME
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Raw,
    Wav,
    Json,
}

impl Format {
    const TOKENS: [&'static str; 3] = ["raw", "wav", "json"];
    const MIME: [&'static str; 3] = ["audio/raw", "audio/wav", "application/json"];

    /// Valeur du paramètre `format`
    pub fn token(self) -> &'static str {
        Self::TOKENS[self as usize]
    }

    /// Type MIME correspondant
    pub fn mime(self) -> &'static str {
        Self::MIME[self as usize]
    }

    /// Vrai pour les formats audio acceptés en entrée de /speech
    pub fn is_audio(self) -> bool {
        matches!(self, Format::Raw | Format::Wav)
    }
}

/// Encodage des échantillons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Encoding {
    FloatingPoint,
    SignedInteger,
    UnsignedInteger,
}

impl Encoding {
    const TOKENS: [&'static str; 3] = ["floating-point", "signed-integer", "unsigned-integer"];

    pub fn token(self) -> &'static str {
        Self::TOKENS[self as usize]
    }
}

/// Taille d'échantillon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleSize {
    /// 8 bits
    Byte,
    /// 16 bits
    Word,
    /// 32 bits
    Dword,
}

impl SampleSize {
    const TOKENS: [&'static str; 3] = ["8", "16", "32"];

    pub fn token(self) -> &'static str {
        Self::TOKENS[self as usize]
    }

    pub fn bits(self) -> u16 {
        match self {
            SampleSize::Byte => 8,
            SampleSize::Word => 16,
            SampleSize::Dword => 32,
        }
    }
}

/// Boutisme des échantillons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    const TOKENS: [&'static str; 2] = ["little", "big"];

    pub fn token(self) -> &'static str {
        Self::TOKENS[self as usize]
    }
}

macro_rules! display_token {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.token())
            }
        })*
    };
}

display_token!(Endpoint, Format, Encoding, SampleSize, Endian);
