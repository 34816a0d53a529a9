// Quantize - Snap a pulse to the nearest grid point of a resolution
// Candidates span one beat, shifted to the beat/bar being played

use super::transport::Position;
use crate::clock::{PPQN, PULSES_PER_BAR};

/// Auto-correct resolution for recording, indexed 0 (quarter) to 7 (hi-rez)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Resolution {
    #[default]
    Quarter,
    Eighth,
    EighthTriplet,
    Sixteenth,
    SixteenthTriplet,
    ThirtySecond,
    ThirtySecondTriplet,
    /// One pulse per step, effectively unquantized
    HiRez,
}

impl Resolution {
    pub const ALL: [Resolution; 8] = [
        Resolution::Quarter,
        Resolution::Eighth,
        Resolution::EighthTriplet,
        Resolution::Sixteenth,
        Resolution::SixteenthTriplet,
        Resolution::ThirtySecond,
        Resolution::ThirtySecondTriplet,
        Resolution::HiRez,
    ];

    /// Resolution at `index`, clamped to the last one
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Grid spacing in pulses
    pub fn step(self) -> usize {
        match self {
            Resolution::Quarter => 24,
            Resolution::Eighth => 12,
            Resolution::EighthTriplet => 8,
            Resolution::Sixteenth => 6,
            Resolution::SixteenthTriplet => 4,
            Resolution::ThirtySecond => 3,
            Resolution::ThirtySecondTriplet => 2,
            Resolution::HiRez => 1,
        }
    }

    /// Display label
    pub fn label(self) -> &'static str {
        match self {
            Resolution::Quarter => "4",
            Resolution::Eighth => "8",
            Resolution::EighthTriplet => "8t",
            Resolution::Sixteenth => "16",
            Resolution::SixteenthTriplet => "16t",
            Resolution::ThirtySecond => "32",
            Resolution::ThirtySecondTriplet => "32t",
            Resolution::HiRez => "HI-REZ",
        }
    }

    /// Grid offsets within one beat, both ends included (0 ..= 24)
    pub fn offsets(self) -> impl Iterator<Item = usize> {
        (0..=PPQN).step_by(self.step())
    }

    /// Resolution `delta` steps away, clamped at both ends
    pub fn offset_by(self, delta: i32) -> Self {
        let index = (self.index() as i64 + delta as i64).max(0) as usize;
        Self::from_index(index)
    }
}

/// Nearest grid pulse to `position.pulse` for a pattern of `length` pulses.
///
/// Candidates are the resolution's offsets shifted by the start of the
/// current beat. The first candidate with the smallest distance wins, so an
/// exact tie goes to the earlier one. A candidate that lands on `length`
/// (the downbeat after the last beat) wraps to 0.
pub fn quantize(resolution: Resolution, position: Position, length: usize) -> usize {
    let base = PPQN * position.beat + PULSES_PER_BAR * position.bar;
    let pulse = position.pulse;

    let mut best = base;
    let mut best_distance = usize::MAX;
    for offset in resolution.offsets() {
        let candidate = base + offset;
        let distance = candidate.abs_diff(pulse);
        if distance < best_distance {
            best = candidate;
            best_distance = distance;
        }
    }

    if best == length { 0 } else { best }
}
