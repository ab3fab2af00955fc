//! voxwit - dictée vers Wit.ai
//!
//! Liste les périphériques audio puis, si un token serveur est configuré,
//! capture une phrase et l'envoie à /speech.

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voxwit::audio::{list_input_devices, CpalDevice, VoiceCaptureEngine};
use voxwit::pipeline::{SessionOutcome, SpeechSession};
use voxwit::{WitConfig, WitContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialiser le logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voxwit=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("voxwit v{}", env!("CARGO_PKG_VERSION"));

    let devices = list_input_devices();
    tracing::info!("Périphériques audio détectés: {:?}", devices);
    println!("Périphériques audio:");
    for device in &devices {
        println!("  - {}", device);
    }

    let config = match std::env::args().nth(1) {
        Some(path) => WitConfig::load(&path).with_context(|| format!("configuration {}", path))?,
        None => WitConfig::from_env(),
    };

    if config.server_auth_token.is_empty() {
        println!();
        println!("Aucun token serveur (WIT_SERVER_TOKEN), pas de capture.");
        return Ok(());
    }

    let context = WitContext::from_config(config.clone())?;
    let mut engine = VoiceCaptureEngine::new(CpalDevice::new(), config.capture.settings());
    if !engine.init(
        &config.capture.device_name,
        i32::try_from(config.capture.sample_rate)?,
        i32::from(config.capture.channels),
    ) {
        anyhow::bail!("impossible d'ouvrir le périphérique de capture");
    }

    println!("Parlez...");
    let session = SpeechSession::new(config.session.clone());
    let outcome = session.run(&mut engine, &context).await;
    engine.shutdown();

    match outcome? {
        SessionOutcome::NoSpeech => println!("Aucune parole détectée."),
        SessionOutcome::Response(response) => {
            println!("Réponse {}:", response.status);
            println!("{}", response.text());
        }
    }

    context.shutdown();
    Ok(())
}
