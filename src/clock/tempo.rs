// Shared tempo - Lock-free BPM shared between sequencer and clock thread

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Tempo bounds in BPM
pub const MIN_BPM: f64 = 40.0;
pub const MAX_BPM: f64 = 300.0;

/// Thread-safe BPM value stored as f64 bits.
///
/// Written by the sequencer, read by the clock thread once per pulse.
/// A stale read only affects the interval currently being measured.
#[derive(Debug, Clone)]
pub struct SharedTempo {
    inner: Arc<AtomicU64>,
}

impl SharedTempo {
    pub fn new(bpm: f64) -> Self {
        Self {
            inner: Arc::new(AtomicU64::new(clamp_bpm(bpm).to_bits())),
        }
    }

    /// Set the tempo (clamped to the supported range)
    pub fn set(&self, bpm: f64) {
        self.inner.store(clamp_bpm(bpm).to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.inner.load(Ordering::Relaxed))
    }
}

impl Default for SharedTempo {
    fn default() -> Self {
        Self::new(90.0)
    }
}

/// Clamp a BPM value into [MIN_BPM, MAX_BPM]. NaN maps to the minimum.
pub fn clamp_bpm(bpm: f64) -> f64 {
    if bpm.is_nan() {
        return MIN_BPM;
    }
    bpm.clamp(MIN_BPM, MAX_BPM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_tempo_clamps() {
        let tempo = SharedTempo::new(500.0);
        assert_eq!(tempo.get(), MAX_BPM);

        tempo.set(10.0);
        assert_eq!(tempo.get(), MIN_BPM);

        tempo.set(f64::NAN);
        assert_eq!(tempo.get(), MIN_BPM);
    }

    #[test]
    fn test_shared_tempo_clones_share_value() {
        let tempo = SharedTempo::new(90.0);
        let reader = tempo.clone();
        tempo.set(133.5);
        assert_eq!(reader.get(), 133.5);
    }
}
