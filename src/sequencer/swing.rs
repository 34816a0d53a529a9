// Swing - Off-beat displacement applied when deriving the play buffer
// The record buffer is never swung; only the copy that plays is

use super::pattern::{Cell, Pattern, TRACKS};
use crate::clock::PPQN;
use serde::{Deserialize, Serialize};

/// Offsets within a beat that get swung (the two 16th off-beats)
const SWING_BASES: [usize; 2] = [6, 18];

/// Swing amount, 0 (straight) to 3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct Swing(u8);

impl Swing {
    pub const MAX: u8 = 3;

    /// Clamped to 0..=MAX
    pub fn new(amount: u8) -> Self {
        Self(amount.min(Self::MAX))
    }

    pub fn amount(self) -> u8 {
        self.0
    }

    pub fn is_straight(self) -> bool {
        self.0 == 0
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            0 => "50%",
            1 => "54%",
            2 => "58%",
            _ => "63%",
        }
    }
}

impl From<u8> for Swing {
    fn from(amount: u8) -> Self {
        Self::new(amount)
    }
}

impl From<Swing> for u8 {
    fn from(swing: Swing) -> Self {
        swing.0
    }
}

/// Rebuild `play` from `record`, displacing the swung off-beats.
///
/// For each swing base, the event at `beat + base` lands on
/// `beat + base + amount` and the base position is emptied.
/// `play` keeps its allocation when the lengths match.
pub fn render_play(record: &Pattern, swing: Swing, play: &mut Pattern) {
    play.clone_from(record);

    if swing.is_straight() {
        return;
    }

    let shift = swing.amount() as usize;
    let len = record.len();
    for base in SWING_BASES {
        for track in 0..TRACKS {
            for beat_start in (0..len).step_by(PPQN) {
                let source = record.cell(track, beat_start + base).unwrap_or_default();
                if let Some(cell) = play.cell_mut(track, beat_start + base + shift) {
                    *cell = source;
                }
                if let Some(cell) = play.cell_mut(track, beat_start + base) {
                    *cell = Cell::default();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern_with(hits: &[(usize, usize)]) -> Pattern {
        let mut pattern = Pattern::new(1).unwrap();
        for &(track, pulse) in hits {
            *pattern.cell_mut(track, pulse).unwrap() = Cell::hit(12);
        }
        pattern
    }

    #[test]
    fn test_straight_copy_is_identical() {
        let record = pattern_with(&[(0, 0), (1, 6), (2, 18)]);
        let mut play = Pattern::new(1).unwrap();
        render_play(&record, Swing::default(), &mut play);
        assert_eq!(play, record);
    }

    #[test]
    fn test_swing_moves_off_beats() {
        let record = pattern_with(&[(0, 0), (1, 6), (2, 24 + 18)]);
        let mut play = Pattern::new(1).unwrap();
        render_play(&record, Swing::new(2), &mut play);

        assert_eq!(play.cell(0, 0), Some(Cell::hit(12)));
        assert_eq!(play.cell(1, 6), Some(Cell::default()));
        assert_eq!(play.cell(1, 8), Some(Cell::hit(12)));
        assert_eq!(play.cell(2, 24 + 18), Some(Cell::default()));
        assert_eq!(play.cell(2, 24 + 20), Some(Cell::hit(12)));
        assert_eq!(play.event_count(), 3);

        // Record side untouched
        assert_eq!(record.cell(1, 6), Some(Cell::hit(12)));
    }

    #[test]
    fn test_swing_is_reversible() {
        let record = pattern_with(&[(0, 6), (5, 30), (9, 90)]);
        let mut play = Pattern::new(1).unwrap();

        render_play(&record, Swing::new(3), &mut play);
        assert_ne!(play, record);

        render_play(&record, Swing::new(0), &mut play);
        assert_eq!(play, record);
    }

    #[test]
    fn test_swing_resizes_play_buffer() {
        let record = Pattern::new(4).unwrap();
        let mut play = Pattern::new(1).unwrap();
        render_play(&record, Swing::new(1), &mut play);
        assert_eq!(play.len(), record.len());
    }

    #[test]
    fn test_swing_clamps_and_labels() {
        assert_eq!(Swing::new(9).amount(), 3);
        assert_eq!(Swing::new(9).label(), "63%");
        assert_eq!(Swing::default().label(), "50%");
    }
}
