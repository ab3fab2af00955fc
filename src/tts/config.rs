//! Réglages de voix pour /synthesize

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Paramètres d'un clip synthétisé
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfiguration {
    /// Nom de la voix (voir /voices)
    pub voice: String,
    /// Style de la voix, vide = style par défaut
    pub style: String,
    /// Vitesse en pourcentage (10 à 400)
    pub speed: u32,
    /// Hauteur en pourcentage (25 à 400)
    pub pitch: u32,
}

impl Default for TtsConfiguration {
    fn default() -> Self {
        Self {
            voice: "Charlie".to_string(),
            style: String::new(),
            speed: 100,
            pitch: 100,
        }
    }
}

impl TtsConfiguration {
    /// Identifiant stable d'un clip pour ces réglages et ce texte
    pub fn clip_id(&self, text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.voice.as_bytes());
        hasher.update(b"|");
        hasher.update(self.style.as_bytes());
        hasher.update(format!("|{}|{}|", self.speed, self.pitch).as_bytes());
        hasher.update(text.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Corps JSON de la requête /synthesize
    pub(crate) fn body<'a>(&'a self, text: &'a str) -> SynthesizeBody<'a> {
        SynthesizeBody {
            q: text,
            voice: &self.voice,
            style: (!self.style.is_empty()).then_some(self.style.as_str()),
            speed: self.speed.clamp(10, 400),
            pitch: self.pitch.clamp(25, 400),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SynthesizeBody<'a> {
    q: &'a str,
    voice: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    style: Option<&'a str>,
    speed: u32,
    pitch: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_id_depends_on_settings() {
        let a = TtsConfiguration::default();
        let b = TtsConfiguration {
            speed: 150,
            ..Default::default()
        };
        assert_eq!(a.clip_id("bonjour"), a.clip_id("bonjour"));
        assert_ne!(a.clip_id("bonjour"), b.clip_id("bonjour"));
        assert_eq!(a.clip_id("bonjour").len(), 64);

        let styled = TtsConfiguration {
            style: "soft".to_string(),
            ..Default::default()
        };
        let other_voice = TtsConfiguration {
            voice: "Rebecca".to_string(),
            ..Default::default()
        };
        assert_ne!(a.clip_id("bonjour"), styled.clip_id("bonjour"));
        assert_ne!(a.clip_id("bonjour"), other_voice.clip_id("bonjour"));
        assert_ne!(a.clip_id("bonjour"), a.clip_id("bonsoir"));
    }

    #[test]
    fn test_body_serialization() {
        let config = TtsConfiguration {
            speed: 1000,
            ..Default::default()
        };
        let json = serde_json::to_value(config.body("salut")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "q": "salut", "voice": "Charlie", "speed": 400, "pitch": 100 })
        );

        let styled = TtsConfiguration {
            style: "soft".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(styled.body("salut")).unwrap();
        assert_eq!(json["style"], "soft");
    }
}
