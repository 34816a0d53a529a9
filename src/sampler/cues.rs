// Cues - Generated metronome clicks and error beep
// Short enveloped tones, rendered once at the output rate

use super::loader::Frame;
use std::f32::consts::PI;
use std::sync::Arc;

/// Metronome click type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickType {
    /// First beat of the bar
    Accent,
    Regular,
}

impl ClickType {
    pub fn for_beat(beat: usize) -> Self {
        if beat == 0 {
            ClickType::Accent
        } else {
            ClickType::Regular
        }
    }
}

/// Pre-rendered cue sounds
#[derive(Debug, Clone)]
pub struct CueSounds {
    accent: Arc<[Frame]>,
    regular: Arc<[Frame]>,
    error: Arc<[Frame]>,
}

impl CueSounds {
    const CLICK_MS: f32 = 10.0;
    const ERROR_MS: f32 = 180.0;

    pub fn new(sample_rate: f32) -> Self {
        Self {
            accent: tone(sample_rate, Self::CLICK_MS, 1200.0, 0.6, 8.0),
            regular: tone(sample_rate, Self::CLICK_MS, 800.0, 0.4, 8.0),
            error: tone(sample_rate, Self::ERROR_MS, 220.0, 0.8, 2.0),
        }
    }

    pub fn click(&self, click_type: ClickType) -> &Arc<[Frame]> {
        match click_type {
            ClickType::Accent => &self.accent,
            ClickType::Regular => &self.regular,
        }
    }

    pub fn error(&self) -> &Arc<[Frame]> {
        &self.error
    }
}

/// Sine burst with an exponential decay over its length
fn tone(sample_rate: f32, duration_ms: f32, frequency: f32, amplitude: f32, decay: f32) -> Arc<[Frame]> {
    let len = (duration_ms * sample_rate / 1000.0).round().max(1.0) as usize;
    let phase_increment = 2.0 * PI * frequency / sample_rate;

    (0..len)
        .map(|i| {
            let envelope = (-(i as f32 / len as f32) * decay).exp();
            let s = (i as f32 * phase_increment).sin() * envelope * amplitude;
            [s, s]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_type_for_beat() {
        assert_eq!(ClickType::for_beat(0), ClickType::Accent);
        assert_eq!(ClickType::for_beat(3), ClickType::Regular);
    }

    #[test]
    fn test_cue_lengths() {
        let cues = CueSounds::new(48000.0);
        assert_eq!(cues.click(ClickType::Accent).len(), 480);
        assert_eq!(cues.click(ClickType::Regular).len(), 480);
        assert_eq!(cues.error().len(), 8640);
    }

    #[test]
    fn test_accent_is_louder() {
        let cues = CueSounds::new(44100.0);
        let peak = |s: &[Frame]| s.iter().map(|f| f[0].abs()).fold(0.0f32, f32::max);
        assert!(peak(cues.click(ClickType::Accent)) > peak(cues.click(ClickType::Regular)));
    }
}
