// Pad bank - Track to sample bindings
// 4 banks (A-D) of 8 pads map onto the 32 pattern tracks

use super::pitch::UNPITCHED;
use crate::sequencer::pattern::TRACKS;
use serde::{Deserialize, Serialize};

/// Pads per bank
pub const PADS_PER_BANK: usize = 8;

/// Bank letters in track order
pub const BANKS: [char; 4] = ['A', 'B', 'C', 'D'];

/// What a track plays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PadBinding {
    /// Sound name as registered with the sample engine
    pub sample: Option<String>,
    /// Pitch ladder index used for live hits and new recordings
    pub pitch: u8,
    /// Mixer channel (0 is reserved for metronome and previews)
    pub channel: usize,
    /// Track gain, 0.0 to 1.0
    pub gain: f32,
}

impl PadBinding {
    fn for_track(track: usize) -> Self {
        Self {
            sample: None,
            pitch: UNPITCHED,
            channel: track + 1,
            gain: 0.5,
        }
    }
}

/// Bindings for all 32 tracks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PadBank {
    pads: Vec<PadBinding>,
}

impl Default for PadBank {
    fn default() -> Self {
        Self {
            pads: (0..TRACKS).map(PadBinding::for_track).collect(),
        }
    }
}

impl PadBank {
    /// Track index for a bank letter and pad (0-7)
    pub fn track(bank: char, pad: usize) -> Option<usize> {
        let bank_index = BANKS.iter().position(|&b| b == bank.to_ascii_uppercase())?;
        (pad < PADS_PER_BANK).then_some(bank_index * PADS_PER_BANK + pad)
    }

    /// Display label such as "A1" or "D8"
    pub fn label(track: usize) -> Option<String> {
        let bank = BANKS.get(track / PADS_PER_BANK)?;
        Some(format!("{}{}", bank, track % PADS_PER_BANK + 1))
    }

    pub fn pad(&self, track: usize) -> Option<&PadBinding> {
        self.pads.get(track)
    }

    pub fn pad_mut(&mut self, track: usize) -> Option<&mut PadBinding> {
        self.pads.get_mut(track)
    }

    pub fn pads(&self) -> &[PadBinding] {
        &self.pads
    }

    /// Bind a sound to a track
    pub fn assign(&mut self, track: usize, sample: &str) {
        if let Some(pad) = self.pads.get_mut(track) {
            pad.sample = Some(sample.to_string());
        }
    }

    /// Names of every bound sound, without duplicates
    pub fn sample_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.pads.iter().filter_map(|p| p.sample.as_deref()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    pub fn len(&self) -> usize {
        self.pads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pads.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let bank = PadBank::default();
        assert_eq!(bank.len(), TRACKS);
        assert_eq!(bank.pad(0).unwrap().channel, 1);
        assert_eq!(bank.pad(31).unwrap().channel, 32);
        assert!(bank.pads().iter().all(|p| p.pitch == UNPITCHED));
    }

    #[test]
    fn test_track_mapping() {
        assert_eq!(PadBank::track('A', 0), Some(0));
        assert_eq!(PadBank::track('b', 3), Some(11));
        assert_eq!(PadBank::track('D', 7), Some(31));
        assert_eq!(PadBank::track('E', 0), None);
        assert_eq!(PadBank::track('A', 8), None);

        assert_eq!(PadBank::label(0).as_deref(), Some("A1"));
        assert_eq!(PadBank::label(17).as_deref(), Some("C2"));
        assert_eq!(PadBank::label(32), None);
    }

    #[test]
    fn test_sample_names() {
        let mut bank = PadBank::default();
        bank.assign(0, "kick.wav");
        bank.assign(5, "snare.wav");
        bank.assign(9, "kick.wav");
        assert_eq!(bank.sample_names(), vec!["kick.wav", "snare.wav"]);
    }
}
