//! Buffer de capture PCM
//!
//! Ring de taille fixe contenant les octets PCM en attente de lecture.
//! Quand il déborde, les octets les plus anciens sont écrasés.

use ringbuf::{traits::*, HeapRb};

/// Buffer d'octets PCM non compressés, possédé exclusivement par le moteur
pub struct CaptureBuffer {
    ring: HeapRb<u8>,
}

impl CaptureBuffer {
    /// Crée un buffer pouvant contenir `capacity` octets
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: HeapRb::new(capacity.max(1)),
        }
    }

    /// Ajoute des octets, en écrasant les plus anciens si nécessaire
    ///
    /// Retourne le nombre d'octets perdus.
    pub fn push(&mut self, bytes: &[u8]) -> usize {
        let overflow = bytes.len().saturating_sub(self.ring.vacant_len());
        if overflow > 0 {
            tracing::warn!("Buffer de capture plein, {} octets écrasés", overflow);
        }
        self.ring.push_slice_overwrite(bytes);
        overflow
    }

    /// Copie jusqu'à `out.len()` octets dans `out` et les retire du buffer
    pub fn pop_into(&mut self, out: &mut [u8]) -> usize {
        self.ring.pop_slice(out)
    }

    /// Nombre d'octets disponibles
    pub fn len(&self) -> usize {
        self.ring.occupied_len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Capacité totale en octets
    pub fn capacity(&self) -> usize {
        self.ring.capacity().get()
    }

    /// Vide le buffer (audio périmé)
    pub fn clear(&mut self) -> usize {
        self.ring.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_pop() {
        let mut buffer = CaptureBuffer::new(8);
        assert_eq!(buffer.push(&[1, 2, 3]), 0);
        assert_eq!(buffer.len(), 3);

        let mut out = [0u8; 2];
        assert_eq!(buffer.pop_into(&mut out), 2);
        assert_eq!(out, [1, 2]);
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_overflow_drops_oldest() {
        let mut buffer = CaptureBuffer::new(4);
        buffer.push(&[1, 2, 3]);
        assert_eq!(buffer.push(&[4, 5, 6]), 2);
        assert_eq!(buffer.len(), 4);

        let mut out = [0u8; 8];
        let n = buffer.pop_into(&mut out);
        assert_eq!(&out[..n], &[3, 4, 5, 6]);
    }

    #[test]
    fn test_clear() {
        let mut buffer = CaptureBuffer::new(16);
        buffer.push(&[9; 10]);
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 16);
    }
}
