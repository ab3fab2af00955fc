//! Événements de synthèse vocale
//!
//! Registre d'écouteurs appelés dans l'ordre d'enregistrement. Chaque
//! enregistrement retourne un handle à passer à `unregister`.

use super::{SoundClip, TtsConfiguration};

/// Handle d'un écouteur enregistré
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

type ResponseListener = Box<dyn Fn(bool, Option<&SoundClip>) + Send + Sync>;
type ErrorListener = Box<dyn Fn(&str, &str) + Send + Sync>;
type RawListener = Box<dyn Fn(&str, &[u8], &TtsConfiguration) + Send + Sync>;

struct Listeners<F: ?Sized> {
    entries: Vec<(ListenerHandle, Box<F>)>,
}

impl<F: ?Sized> Default for Listeners<F> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<F: ?Sized> Listeners<F> {
    fn remove(&mut self, handle: ListenerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(h, _)| *h != handle);
        self.entries.len() != before
    }

    fn iter(&self) -> impl Iterator<Item = &F> {
        self.entries.iter().map(|(_, f)| &**f)
    }
}

/// Écouteurs des réponses /synthesize
#[derive(Default)]
pub struct SynthesizeEvents {
    next_id: u64,
    on_response: Listeners<dyn Fn(bool, Option<&SoundClip>) + Send + Sync>,
    on_error: Listeners<dyn Fn(&str, &str) + Send + Sync>,
    on_raw: Listeners<dyn Fn(&str, &[u8], &TtsConfiguration) + Send + Sync>,
}

impl SynthesizeEvents {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_handle(&mut self) -> ListenerHandle {
        self.next_id += 1;
        ListenerHandle(self.next_id)
    }

    /// Réponse traitée: succès et clip décodé
    pub fn on_response<F>(&mut self, listener: F) -> ListenerHandle
    where
        F: Fn(bool, Option<&SoundClip>) + Send + Sync + 'static,
    {
        let handle = self.next_handle();
        let listener: ResponseListener = Box::new(listener);
        self.on_response.entries.push((handle, listener));
        handle
    }

    /// Erreur: code machine et message lisible
    pub fn on_error<F>(&mut self, listener: F) -> ListenerHandle
    where
        F: Fn(&str, &str) + Send + Sync + 'static,
    {
        let handle = self.next_handle();
        let listener: ErrorListener = Box::new(listener);
        self.on_error.entries.push((handle, listener));
        handle
    }

    /// Réponse brute: identifiant du clip, octets reçus, réglages
    pub fn on_raw<F>(&mut self, listener: F) -> ListenerHandle
    where
        F: Fn(&str, &[u8], &TtsConfiguration) + Send + Sync + 'static,
    {
        let handle = self.next_handle();
        let listener: RawListener = Box::new(listener);
        self.on_raw.entries.push((handle, listener));
        handle
    }

    /// Retire un écouteur; retourne `false` s'il n'était pas enregistré
    pub fn unregister(&mut self, handle: ListenerHandle) -> bool {
        self.on_response.remove(handle) || self.on_error.remove(handle) || self.on_raw.remove(handle)
    }

    pub fn listener_count(&self) -> usize {
        self.on_response.entries.len() + self.on_error.entries.len() + self.on_raw.entries.len()
    }

    pub fn broadcast_response(&self, is_successful: bool, clip: Option<&SoundClip>) {
        for listener in self.on_response.iter() {
            listener(is_successful, clip);
        }
    }

    pub fn broadcast_error(&self, code: &str, message: &str) {
        tracing::debug!("Erreur de synthèse {}: {}", code, message);
        for listener in self.on_error.iter() {
            listener(code, message);
        }
    }

    pub fn broadcast_raw(&self, clip_id: &str, data: &[u8], settings: &TtsConfiguration) {
        for listener in self.on_raw.iter() {
            listener(clip_id, data, settings);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_listeners_called_in_registration_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut events = SynthesizeEvents::new();

        for i in 0..3 {
            let calls = Arc::clone(&calls);
            events.on_error(move |code, _| calls.lock().unwrap().push(format!("{}:{}", i, code)));
        }
        events.broadcast_error("timeout", "délai dépassé");

        assert_eq!(
            *calls.lock().unwrap(),
            vec!["0:timeout", "1:timeout", "2:timeout"]
        );
    }

    #[test]
    fn test_unregister() {
        let calls = Arc::new(Mutex::new(0));
        let mut events = SynthesizeEvents::new();

        let counter = Arc::clone(&calls);
        let handle = events.on_raw(move |_, _, _| *counter.lock().unwrap() += 1);
        events.on_response(|_, _| {});
        assert_eq!(events.listener_count(), 2);

        assert!(events.unregister(handle));
        assert!(!events.unregister(handle));
        events.broadcast_raw("id", &[1, 2], &TtsConfiguration::default());

        assert_eq!(*calls.lock().unwrap(), 0);
        assert_eq!(events.listener_count(), 1);
    }
}
