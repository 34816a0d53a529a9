// Types for disk persistence

use serde::{Deserialize, Serialize};

use crate::sampler::bank::PadBank;
use crate::sequencer::pattern::{Cell, Pattern, PatternBank, PatternError, PatternMeta};
use crate::sequencer::player::SequencerSettings;
use crate::sequencer::quantize::Resolution;
use crate::sequencer::song::Song;

/// Pattern slots on a fresh disk
pub const PATTERN_SLOTS: usize = 100;

/// Song slots on a fresh disk
pub const SONG_SLOTS: usize = 20;

/// Length of the pattern a fresh disk starts with
pub const FIRST_PATTERN_BARS: usize = 2;

/// Settings shared by every pattern on the disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSettings {
    pub bpm: f64,
    pub metronome: bool,
    /// Resolution index, 0 to 7
    pub quantize: usize,
    /// Global volume, 0.0 to 1.0
    pub volume: f32,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        let settings = SequencerSettings::default();
        Self {
            bpm: settings.bpm,
            metronome: settings.metronome,
            quantize: settings.resolution.index(),
            volume: 1.0,
        }
    }
}

impl GlobalSettings {
    pub fn sequencer_settings(&self) -> SequencerSettings {
        SequencerSettings {
            bpm: self.bpm,
            metronome: self.metronome,
            resolution: Resolution::from_index(self.quantize),
        }
    }
}

/// Contents of `config.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskConfig {
    pub global: GlobalSettings,
    pub patterns: Vec<PatternMeta>,
    pub songs: Vec<Option<Song>>,
    pub pads: PadBank,
    /// RFC 3339 time of the last save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
}

/// One pattern grid as stored in `patterns.ron`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSerializable {
    /// One row per track of (triggered, pitch)
    pub rows: Vec<Vec<(bool, u8)>>,
}

impl From<&Pattern> for GridSerializable {
    fn from(pattern: &Pattern) -> Self {
        Self {
            rows: pattern
                .rows()
                .map(|row| row.iter().map(|c| (c.triggered, c.pitch)).collect())
                .collect(),
        }
    }
}

impl TryFrom<GridSerializable> for Pattern {
    type Error = PatternError;

    fn try_from(grid: GridSerializable) -> Result<Self, Self::Error> {
        let rows = grid
            .rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|(triggered, pitch)| Cell { triggered, pitch })
                    .collect()
            })
            .collect();
        Pattern::from_rows(rows)
    }
}

/// Everything a disk holds, in memory
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub global: GlobalSettings,
    pub bank: PatternBank,
    pub songs: Vec<Option<Song>>,
    pub pads: PadBank,
    pub saved_at: Option<String>,
}

impl Default for Project {
    fn default() -> Self {
        let mut bank = PatternBank::new(PATTERN_SLOTS);
        if let Err(e) = bank.init(0, FIRST_PATTERN_BARS) {
            log::error!("Could not initialise first pattern: {}", e);
        }

        Self {
            global: GlobalSettings::default(),
            bank,
            songs: vec![None; SONG_SLOTS],
            pads: PadBank::default(),
            saved_at: None,
        }
    }
}

impl Project {
    /// Used song slots with their index
    pub fn songs(&self) -> impl Iterator<Item = (usize, &Song)> {
        self.songs
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|s| (i, s)))
    }

    pub fn song(&self, index: usize) -> Option<&Song> {
        self.songs.get(index).and_then(Option::as_ref)
    }

    /// Store a song, growing the slot list if needed
    pub fn set_song(&mut self, index: usize, song: Option<Song>) {
        if index >= self.songs.len() {
            self.songs.resize(index + 1, None);
        }
        self.songs[index] = song;
    }
}
