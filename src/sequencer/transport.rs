// Transport - Playhead counters and transport state
// Position tracks pulse/beat/bar within the active pattern

use crate::clock::{PPQN, PULSES_PER_BAR};
use std::fmt;

/// Beats per bar (4/4 only)
pub const BEATS_PER_BAR: usize = 4;

/// Transport state derived from the sequencer flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Stopped,
    Playing,
    Recording,
    /// Playing through a song playlist
    SongPlaying,
}

impl TransportState {
    pub fn is_playing(&self) -> bool {
        !matches!(self, TransportState::Stopped)
    }
}

/// Playhead position inside a pattern.
///
/// `pulse` is absolute within the pattern; `beat` and `bar` always agree
/// with it (pulse = 96 * bar + 24 * beat + pulse-in-beat).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub pulse: usize,
    pub beat: usize,
    pub bar: usize,
}

impl Position {
    /// Position for an absolute pulse index
    pub fn from_pulse(pulse: usize) -> Self {
        Self {
            pulse,
            beat: (pulse % PULSES_PER_BAR) / PPQN,
            bar: pulse / PULSES_PER_BAR,
        }
    }

    /// Pulse offset within the current beat
    pub fn pulse_in_beat(&self) -> usize {
        self.pulse - PPQN * self.beat - PULSES_PER_BAR * self.bar
    }

    /// Move one pulse forward in a pattern of `length` pulses.
    ///
    /// Returns true when the bar counter wraps back to 0 (end of pattern).
    pub fn advance(&mut self, length: usize) -> bool {
        self.pulse += 1;
        if self.pulse >= length {
            self.pulse = 0;
        }

        if self.pulse % PPQN == 0 {
            self.beat += 1;
        }

        if self.beat == BEATS_PER_BAR {
            self.beat = 0;
            self.bar += 1;
        }

        if self.bar >= length / PULSES_PER_BAR {
            self.bar = 0;
            return true;
        }

        false
    }
}

impl fmt::Display for Position {
    /// Counter display: bar.beat.pulse-in-beat, bar and beat 1-based
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}.{:02}.{}",
            self.bar + 1,
            self.beat + 1,
            self.pulse_in_beat()
        )
    }
}
