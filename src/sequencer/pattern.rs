// Pattern - Track x pulse grid of trigger cells
// 32 tracks (4 banks x 8 pads), 96 pulses per bar, 1 to 8 bars

use super::player::MAX_PITCH;
use super::swing::Swing;
use crate::clock::PULSES_PER_BAR;
use serde::{Deserialize, Serialize};

/// Number of tracks (pads) in every pattern
pub const TRACKS: usize = 32;

/// Longest pattern in bars
pub const MAX_BARS: usize = 8;

/// Pattern errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("Bar count {0} out of range 1..={MAX_BARS}")]
    InvalidBars(usize),

    #[error("Grid has {0} rows, expected {TRACKS}")]
    RowCount(usize),

    #[error("Row {row} has {len} pulses, expected {expected}")]
    RowLength {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("Cell {row}:{pulse} has pitch {pitch}, highest is {MAX_PITCH}")]
    Pitch { row: usize, pulse: usize, pitch: u8 },

    #[error("Pattern slot {0} does not exist")]
    NoSuchSlot(usize),

    #[error("Pattern {0} is unused")]
    Unused(usize),

    #[error("Stop playback before editing patterns")]
    Playing,
}

/// One grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cell {
    pub triggered: bool,
    /// Pitch ladder index (12 = unpitched)
    pub pitch: u8,
}

impl Cell {
    pub fn hit(pitch: u8) -> Self {
        Self {
            triggered: true,
            pitch,
        }
    }
}

/// A loopable grid of trigger cells
///
/// Stored track-major: row `t` occupies `cells[t * len .. (t + 1) * len]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    bars: usize,
    cells: Vec<Cell>,
}

impl Pattern {
    /// Create an empty pattern of `bars` bars
    pub fn new(bars: usize) -> Result<Self, PatternError> {
        check_bars(bars)?;
        Ok(Self {
            bars,
            cells: vec![Cell::default(); TRACKS * bars * PULSES_PER_BAR],
        })
    }

    /// Build from raw rows, one per track
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, PatternError> {
        if rows.len() != TRACKS {
            return Err(PatternError::RowCount(rows.len()));
        }

        let len = rows[0].len();
        if len % PULSES_PER_BAR != 0 {
            return Err(PatternError::RowLength {
                row: 0,
                len,
                expected: (len / PULSES_PER_BAR + 1) * PULSES_PER_BAR,
            });
        }
        let bars = len / PULSES_PER_BAR;
        check_bars(bars)?;

        let mut cells = Vec::with_capacity(TRACKS * len);
        for (row, data) in rows.into_iter().enumerate() {
            if data.len() != len {
                return Err(PatternError::RowLength {
                    row,
                    len: data.len(),
                    expected: len,
                });
            }
            if let Some(pulse) = data.iter().position(|c| c.pitch > MAX_PITCH) {
                return Err(PatternError::Pitch {
                    row,
                    pulse,
                    pitch: data[pulse].pitch,
                });
            }
            cells.extend(data);
        }

        Ok(Self { bars, cells })
    }

    pub fn bars(&self) -> usize {
        self.bars
    }

    /// Length in pulses
    pub fn len(&self) -> usize {
        self.bars * PULSES_PER_BAR
    }

    /// Patterns are never zero-length
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Rows in track order
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.len())
    }

    pub fn row(&self, track: usize) -> Option<&[Cell]> {
        if track >= TRACKS {
            return None;
        }
        let len = self.len();
        self.cells.get(track * len..(track + 1) * len)
    }

    pub fn cell(&self, track: usize, pulse: usize) -> Option<Cell> {
        self.index(track, pulse).map(|i| self.cells[i])
    }

    pub fn cell_mut(&mut self, track: usize, pulse: usize) -> Option<&mut Cell> {
        self.index(track, pulse).map(|i| &mut self.cells[i])
    }

    /// Empty one track
    pub fn clear_track(&mut self, track: usize) {
        if track >= TRACKS {
            return;
        }
        let len = self.len();
        if let Some(row) = self.cells.get_mut(track * len..(track + 1) * len) {
            row.fill(Cell::default());
        }
    }

    /// Tracks triggered at `pulse`, with their cells
    pub fn triggered_at(&self, pulse: usize) -> impl Iterator<Item = (usize, Cell)> + '_ {
        let len = self.len();
        (0..TRACKS).filter_map(move |track| {
            if pulse >= len {
                return None;
            }
            let cell = self.cells[track * len + pulse];
            cell.triggered.then_some((track, cell))
        })
    }

    /// Number of triggered cells
    pub fn event_count(&self) -> usize {
        self.cells.iter().filter(|c| c.triggered).count()
    }

    /// Append `other`'s bars after this pattern's
    pub fn append(&mut self, other: &Pattern) -> Result<(), PatternError> {
        let bars = self.bars + other.bars;
        check_bars(bars)?;

        let (len, other_len) = (self.len(), other.len());
        let mut cells = Vec::with_capacity(TRACKS * (len + other_len));
        for track in 0..TRACKS {
            cells.extend_from_slice(&self.cells[track * len..(track + 1) * len]);
            cells.extend_from_slice(&other.cells[track * other_len..(track + 1) * other_len]);
        }

        self.bars = bars;
        self.cells = cells;
        Ok(())
    }

    fn index(&self, track: usize, pulse: usize) -> Option<usize> {
        let len = self.len();
        (track < TRACKS && pulse < len).then_some(track * len + pulse)
    }
}

fn check_bars(bars: usize) -> Result<(), PatternError> {
    if (1..=MAX_BARS).contains(&bars) {
        Ok(())
    } else {
        Err(PatternError::InvalidBars(bars))
    }
}

/// Per-pattern settings kept alongside the grid
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PatternMeta {
    pub name: String,
    #[serde(default)]
    pub swing: Swing,
}

/// All pattern slots of a disk. `None` marks an unused slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternBank {
    slots: Vec<Option<Pattern>>,
    meta: Vec<PatternMeta>,
}

impl PatternBank {
    /// `count` unused slots (at least one)
    pub fn new(count: usize) -> Self {
        let count = count.max(1);
        Self {
            slots: vec![None; count],
            meta: vec![PatternMeta::default(); count],
        }
    }

    /// Combine grids and metadata; missing metadata entries get defaults
    pub fn from_parts(mut slots: Vec<Option<Pattern>>, mut meta: Vec<PatternMeta>) -> Self {
        if slots.is_empty() {
            slots.push(None);
        }
        meta.resize(slots.len(), PatternMeta::default());
        Self { slots, meta }
    }

    pub fn into_parts(self) -> (Vec<Option<Pattern>>, Vec<PatternMeta>) {
        (self.slots, self.meta)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Pattern> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn is_used(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    pub fn slots(&self) -> &[Option<Pattern>] {
        &self.slots
    }

    pub fn meta(&self, index: usize) -> Option<&PatternMeta> {
        self.meta.get(index)
    }

    pub fn meta_mut(&mut self, index: usize) -> Option<&mut PatternMeta> {
        self.meta.get_mut(index)
    }

    pub fn all_meta(&self) -> &[PatternMeta] {
        &self.meta
    }

    /// Swing of a slot (straight if the slot does not exist)
    pub fn swing(&self, index: usize) -> Swing {
        self.meta(index).map(|m| m.swing).unwrap_or_default()
    }

    /// Overwrite a used slot's grid
    pub(crate) fn store(&mut self, index: usize, pattern: Pattern) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = Some(pattern);
        }
    }

    /// Start a fresh empty pattern in `index`
    pub fn init(&mut self, index: usize, bars: usize) -> Result<(), PatternError> {
        let pattern = Pattern::new(bars)?;
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(PatternError::NoSuchSlot(index))?;
        *slot = Some(pattern);
        self.meta[index].name.clear();
        Ok(())
    }

    /// Copy `src` into `dst`; a used destination gets `src` appended to it
    pub fn copy(&mut self, src: usize, dst: usize) -> Result<(), PatternError> {
        if dst >= self.slots.len() {
            return Err(PatternError::NoSuchSlot(dst));
        }
        let source = self
            .slots
            .get(src)
            .ok_or(PatternError::NoSuchSlot(src))?
            .clone()
            .ok_or(PatternError::Unused(src))?;

        match &mut self.slots[dst] {
            Some(existing) => existing.append(&source)?,
            empty => *empty = Some(source),
        }
        Ok(())
    }

    /// Mark a slot unused and forget its settings
    pub fn reset(&mut self, index: usize) -> Result<(), PatternError> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(PatternError::NoSuchSlot(index))?;
        *slot = None;
        self.meta[index] = PatternMeta::default();
        Ok(())
    }

    pub fn rename(&mut self, index: usize, name: &str) -> Result<(), PatternError> {
        if !self.is_used(index) {
            return Err(PatternError::Unused(index));
        }
        self.meta[index].name = name.to_string();
        Ok(())
    }
}
