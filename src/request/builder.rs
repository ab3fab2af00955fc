//! Fonctions de construction des requêtes
//!
//! Chaque fonction ajoute une seule facette au descripteur. La configuration
//! de base doit être posée en premier; les autres appels commutent entre eux.
//! Une entrée invalide est rejetée immédiatement, sans modifier le descripteur.

use super::descriptor::RequestDescriptor;
use super::types::{
    Encoding, Endian, Endpoint, Format, SampleSize, HEADER_ACCEPT, HEADER_AUTHORIZATION,
    PARAMETER_TEXT_KEY, PARAMETER_VERSION_KEY, URL_DEFAULT, VERSION_DEFAULT,
};
use super::RequestError;

/// Pose l'opération, l'authentification, la version et l'URL de base
///
/// `custom_url` est utilisée telle quelle si non vide, sinon l'URL Wit.ai par
/// défaut. Une version vide prend la version par défaut.
pub fn set_base_configuration(
    descriptor: &mut RequestDescriptor,
    endpoint: Endpoint,
    auth_token: &str,
    version: &str,
    custom_url: &str,
) -> Result<(), RequestError> {
    let auth_token = auth_token.trim();
    if auth_token.is_empty() {
        return Err(RequestError::EmptyAuthToken);
    }

    let version = if version.trim().is_empty() {
        VERSION_DEFAULT
    } else {
        version.trim()
    };
    let base_url = if custom_url.is_empty() {
        URL_DEFAULT
    } else {
        custom_url
    };

    descriptor.endpoint = Some(endpoint);
    descriptor.base_url = base_url.to_string();
    descriptor.auth_token = auth_token.to_string();
    descriptor.api_version = version.to_string();
    descriptor.headers.insert(
        HEADER_AUTHORIZATION.to_string(),
        format!("Bearer {}", auth_token),
    );
    descriptor.set_query(PARAMETER_VERSION_KEY, version);
    Ok(())
}

fn require_base(descriptor: &RequestDescriptor) -> Result<(), RequestError> {
    if descriptor.endpoint.is_none() {
        return Err(RequestError::MissingBaseConfiguration);
    }
    Ok(())
}

/// Ajoute le texte (déjà encodé URL) de l'opération /message
///
/// Le texte n'est pas ré-encodé.
pub fn add_text_parameter(
    descriptor: &mut RequestDescriptor,
    encoded_text: &str,
) -> Result<(), RequestError> {
    require_base(descriptor)?;
    if encoded_text.trim().is_empty() {
        return Err(RequestError::EmptyText);
    }
    descriptor.set_query(PARAMETER_TEXT_KEY, encoded_text);
    Ok(())
}

/// Ajoute le format accepté en réponse (requis pour /synthesize)
pub fn add_format_accept(
    descriptor: &mut RequestDescriptor,
    format: Format,
) -> Result<(), RequestError> {
    require_base(descriptor)?;
    descriptor
        .headers
        .insert(HEADER_ACCEPT.to_string(), format.mime().to_string());
    Ok(())
}

/// Ajoute le format audio envoyé (requis pour /speech)
///
/// Seuls `Raw` et `Wav` décrivent de l'audio; tout autre format retombe sur
/// `Raw`.
pub fn add_format_content_type(
    descriptor: &mut RequestDescriptor,
    format: Format,
) -> Result<(), RequestError> {
    require_base(descriptor)?;
    let format = if format.is_audio() {
        format
    } else {
        tracing::warn!("Format de contenu {:?} non audio, repli sur raw", format);
        Format::Raw
    };
    descriptor.content.format = Some(format);
    Ok(())
}

pub fn add_encoding_content_type(
    descriptor: &mut RequestDescriptor,
    encoding: Encoding,
) -> Result<(), RequestError> {
    require_base(descriptor)?;
    descriptor.content.encoding = Some(encoding);
    Ok(())
}

pub fn add_sample_size_content_type(
    descriptor: &mut RequestDescriptor,
    sample_size: SampleSize,
) -> Result<(), RequestError> {
    require_base(descriptor)?;
    descriptor.content.sample_size = Some(sample_size);
    Ok(())
}

/// Ajoute le taux d'échantillonnage; seuls les taux > 0 sont acceptés
pub fn add_rate_content_type(
    descriptor: &mut RequestDescriptor,
    rate: i32,
) -> Result<(), RequestError> {
    require_base(descriptor)?;
    if rate <= 0 {
        return Err(RequestError::InvalidRate(rate));
    }
    descriptor.content.rate = Some(rate as u32);
    Ok(())
}

pub fn add_endian_content_type(
    descriptor: &mut RequestDescriptor,
    endian: Endian,
) -> Result<(), RequestError> {
    require_base(descriptor)?;
    descriptor.content.endian = Some(endian);
    Ok(())
}

/// Encode un texte pour `add_text_parameter`
pub fn encode_text(text: &str) -> String {
    urlencoding::encode(text).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Method;

    const TOKEN: &str = "SERVERTOKEN";

    fn base(endpoint: Endpoint) -> RequestDescriptor {
        let mut descriptor = RequestDescriptor::new();
        set_base_configuration(&mut descriptor, endpoint, TOKEN, "", "").unwrap();
        descriptor
    }

    fn speech(descriptor: &mut RequestDescriptor) {
        add_format_content_type(descriptor, Format::Raw).unwrap();
        add_encoding_content_type(descriptor, Encoding::FloatingPoint).unwrap();
        add_sample_size_content_type(descriptor, SampleSize::Word).unwrap();
        add_rate_content_type(descriptor, 16000).unwrap();
        add_endian_content_type(descriptor, Endian::Little).unwrap();
    }

    #[test]
    fn test_base_configuration_defaults() {
        let descriptor = base(Endpoint::Voices);
        assert_eq!(descriptor.base_url(), URL_DEFAULT);
        assert_eq!(descriptor.api_version(), VERSION_DEFAULT);
        assert_eq!(
            descriptor.headers().get(HEADER_AUTHORIZATION).map(String::as_str),
            Some("Bearer SERVERTOKEN")
        );

        let request = descriptor.build().unwrap();
        assert_eq!(request.method(), Method::Get);
        assert_eq!(request.url(), "https://api.wit.ai/voices?v=20240304");
    }

    #[test]
    fn test_custom_url_used_verbatim() {
        let mut descriptor = RequestDescriptor::new();
        set_base_configuration(
            &mut descriptor,
            Endpoint::Voices,
            TOKEN,
            "20230215",
            "http://localhost:8080/",
        )
        .unwrap();
        assert_eq!(descriptor.base_url(), "http://localhost:8080/");
        let request = descriptor.build().unwrap();
        assert_eq!(request.url(), "http://localhost:8080/voices?v=20230215");
    }

    #[test]
    fn test_empty_token_rejected() {
        let mut descriptor = RequestDescriptor::new();
        assert_eq!(
            set_base_configuration(&mut descriptor, Endpoint::Speech, "  ", "", ""),
            Err(RequestError::EmptyAuthToken)
        );
        assert!(descriptor.endpoint().is_none());
    }

    #[test]
    fn test_facets_require_base() {
        let mut descriptor = RequestDescriptor::new();
        assert_eq!(
            add_rate_content_type(&mut descriptor, 16000),
            Err(RequestError::MissingBaseConfiguration)
        );
        assert_eq!(
            descriptor.build(),
            Err(RequestError::MissingBaseConfiguration)
        );
    }

    #[test]
    fn test_speech_content_type_order() {
        let mut descriptor = base(Endpoint::Speech);
        speech(&mut descriptor);
        let request = descriptor.build().unwrap();

        assert_eq!(request.method(), Method::Post);
        assert_eq!(
            request.content_parameter_string(),
            "format=raw; encoding=floating-point; bits=16; rate=16000; endian=little"
        );
        assert_eq!(
            request.content_type(),
            Some("audio/raw;encoding=floating-point;bits=16;rate=16000;endian=little")
        );
        assert_eq!(request.url(), "https://api.wit.ai/speech?v=20240304");
    }

    #[test]
    fn test_speech_facets_commute() {
        let mut descriptor = base(Endpoint::Speech);
        add_endian_content_type(&mut descriptor, Endian::Big).unwrap();
        add_rate_content_type(&mut descriptor, 8000).unwrap();
        add_sample_size_content_type(&mut descriptor, SampleSize::Dword).unwrap();
        add_encoding_content_type(&mut descriptor, Encoding::SignedInteger).unwrap();
        add_format_content_type(&mut descriptor, Format::Wav).unwrap();

        let request = descriptor.build().unwrap();
        assert_eq!(
            request.content_type(),
            Some("audio/wav;encoding=signed-integer;bits=32;rate=8000;endian=big")
        );
    }

    #[test]
    fn test_speech_incomplete_content_type() {
        let mut descriptor = base(Endpoint::Speech);
        add_format_content_type(&mut descriptor, Format::Raw).unwrap();
        add_encoding_content_type(&mut descriptor, Encoding::SignedInteger).unwrap();
        add_sample_size_content_type(&mut descriptor, SampleSize::Word).unwrap();
        add_endian_content_type(&mut descriptor, Endian::Little).unwrap();

        assert_eq!(
            descriptor.build(),
            Err(RequestError::IncompleteContentType("rate"))
        );
    }

    #[test]
    fn test_non_positive_rate_preserves_state() {
        let mut descriptor = base(Endpoint::Speech);
        add_rate_content_type(&mut descriptor, 44100).unwrap();

        assert_eq!(
            add_rate_content_type(&mut descriptor, 0),
            Err(RequestError::InvalidRate(0))
        );
        assert_eq!(
            add_rate_content_type(&mut descriptor, -16000),
            Err(RequestError::InvalidRate(-16000))
        );
        assert_eq!(descriptor.content().rate, Some(44100));
    }

    #[test]
    fn test_json_content_format_falls_back_to_raw() {
        let mut descriptor = base(Endpoint::Speech);
        add_format_content_type(&mut descriptor, Format::Json).unwrap();
        assert_eq!(descriptor.content().format, Some(Format::Raw));
    }

    #[test]
    fn test_message_requires_text() {
        let descriptor = base(Endpoint::Message);
        assert_eq!(descriptor.build(), Err(RequestError::MissingText));

        let mut descriptor = base(Endpoint::Message);
        assert_eq!(
            add_text_parameter(&mut descriptor, ""),
            Err(RequestError::EmptyText)
        );
        assert_eq!(descriptor.build(), Err(RequestError::MissingText));
    }

    #[test]
    fn test_message_text_not_reencoded() {
        let mut descriptor = base(Endpoint::Message);
        let encoded = encode_text("allume la lumière");
        assert_eq!(encoded, "allume%20la%20lumi%C3%A8re");
        add_text_parameter(&mut descriptor, &encoded).unwrap();

        let request = descriptor.build().unwrap();
        assert_eq!(
            request.url(),
            "https://api.wit.ai/message?v=20240304&q=allume%20la%20lumi%C3%A8re"
        );
        assert_eq!(request.method(), Method::Get);
    }

    #[test]
    fn test_text_only_on_message() {
        let mut descriptor = base(Endpoint::Voices);
        add_text_parameter(&mut descriptor, "bonjour").unwrap();
        assert_eq!(
            descriptor.build(),
            Err(RequestError::UnexpectedText(Endpoint::Voices))
        );
    }

    #[test]
    fn test_synthesize_requires_accept() {
        let descriptor = base(Endpoint::Synthesize);
        assert_eq!(descriptor.build(), Err(RequestError::MissingAccept));

        let mut descriptor = base(Endpoint::Synthesize);
        add_format_accept(&mut descriptor, Format::Wav).unwrap();
        let request = descriptor.build().unwrap();
        assert_eq!(request.header(HEADER_ACCEPT), Some("audio/wav"));
        assert_eq!(request.content_type(), Some("application/json"));
    }

    #[test]
    fn test_audio_facets_only_on_speech() {
        let mut descriptor = base(Endpoint::Message);
        add_text_parameter(&mut descriptor, "salut").unwrap();
        add_rate_content_type(&mut descriptor, 16000).unwrap();
        assert_eq!(
            descriptor.build(),
            Err(RequestError::UnexpectedContentType(Endpoint::Message))
        );
    }

    #[test]
    fn test_version_kept_first_on_reconfiguration() {
        let mut descriptor = base(Endpoint::Message);
        add_text_parameter(&mut descriptor, "a").unwrap();
        set_base_configuration(&mut descriptor, Endpoint::Message, TOKEN, "20200101", "")
            .unwrap();
        let request = descriptor.build().unwrap();
        assert_eq!(request.url(), "https://api.wit.ai/message?v=20200101&q=a");
    }
}
