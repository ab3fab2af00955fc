//! Module pipeline de dictée
//!
//! Gère le flux capture → seuil de réveil → requête /speech streamée.

mod session;

pub use session::{SessionError, SessionEvent, SessionOutcome, SpeechSession};
