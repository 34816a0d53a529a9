// Song - Ordered playlist of patterns

use super::pattern::PatternBank;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A named list of pattern indices played back to back
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub name: String,
    pub steps: Vec<usize>,
    pub bpm: f64,
}

impl Song {
    pub fn new(name: impl Into<String>, bpm: f64) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            bpm,
        }
    }

    /// Insert a step before `position` (appends past the end)
    pub fn insert_step(&mut self, position: usize, pattern: usize) {
        let position = position.min(self.steps.len());
        self.steps.insert(position, pattern);
    }

    pub fn remove_step(&mut self, position: usize) -> Option<usize> {
        (position < self.steps.len()).then(|| self.steps.remove(position))
    }

    /// Total bars of all steps that point at used patterns
    pub fn total_bars(&self, bank: &PatternBank) -> usize {
        self.steps
            .iter()
            .filter_map(|&i| bank.get(i))
            .map(|p| p.bars())
            .sum()
    }
}

/// Remaining steps of a song being played
#[derive(Debug, Clone)]
pub(crate) struct Playlist {
    remaining: VecDeque<usize>,
    /// Pattern that was active before the song started
    pub return_to: usize,
}

impl Playlist {
    pub fn new(steps: &[usize], return_to: usize) -> Self {
        Self {
            remaining: steps.iter().copied().collect(),
            return_to,
        }
    }

    /// Pop steps until one refers to a used pattern
    pub fn next_used(&mut self, bank: &PatternBank) -> Option<usize> {
        while let Some(index) = self.remaining.pop_front() {
            if bank.is_used(index) {
                return Some(index);
            }
            log::debug!("Song step {} is unused, skipping", index);
        }
        None
    }
}
