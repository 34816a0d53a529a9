// Disk persistence for patterns, songs and pad assignments
// A disk is a directory holding config.json, patterns.ron and samples/

pub mod manager;
pub mod serialization;
pub mod types;

pub use manager::{Disk, ProjectError};
pub use types::{DiskConfig, GlobalSettings, GridSerializable, Project};

use crate::audio::mixer::MIXER_CHANNELS;
use crate::clock::tempo::{MAX_BPM, MIN_BPM};
use crate::sequencer::pattern::TRACKS;
use crate::sequencer::player::MAX_PITCH;
use crate::sequencer::quantize::Resolution;

fn invalid(message: String) -> ProjectError {
    ProjectError::ValidationFailed(message)
}

fn check_bpm(bpm: f64, what: &str) -> Result<(), ProjectError> {
    if !(MIN_BPM..=MAX_BPM).contains(&bpm) {
        return Err(invalid(format!(
            "{} tempo {} must be between {} and {} BPM",
            what, bpm, MIN_BPM, MAX_BPM
        )));
    }
    Ok(())
}

/// Check ranges and cross references of a disk configuration
pub fn validate_config(config: &DiskConfig) -> Result<(), ProjectError> {
    check_bpm(config.global.bpm, "Global")?;

    if !(0.0..=1.0).contains(&config.global.volume) {
        return Err(invalid("Global volume must be between 0.0 and 1.0".to_string()));
    }

    if config.global.quantize >= Resolution::ALL.len() {
        return Err(invalid(format!(
            "Quantize index {} must be below {}",
            config.global.quantize,
            Resolution::ALL.len()
        )));
    }

    if config.patterns.is_empty() {
        return Err(invalid("Disk must have at least one pattern slot".to_string()));
    }

    for (index, song) in config.songs.iter().enumerate() {
        let Some(song) = song else { continue };

        check_bpm(song.bpm, &format!("Song {}", index))?;
        if let Some(step) = song.steps.iter().find(|&&s| s >= config.patterns.len()) {
            return Err(invalid(format!(
                "Song {} references missing pattern {}",
                index, step
            )));
        }
    }

    if config.pads.len() != TRACKS {
        return Err(invalid(format!(
            "Pad table has {} entries, expected {}",
            config.pads.len(),
            TRACKS
        )));
    }

    for (track, pad) in config.pads.pads().iter().enumerate() {
        if pad.pitch > MAX_PITCH {
            return Err(invalid(format!("Pad {} pitch {} exceeds {}", track, pad.pitch, MAX_PITCH)));
        }

        // Channel 0 belongs to the metronome
        if pad.channel == 0 || pad.channel >= MIXER_CHANNELS {
            return Err(invalid(format!(
                "Pad {} channel {} must be between 1 and {}",
                track,
                pad.channel,
                MIXER_CHANNELS - 1
            )));
        }

        if !(0.0..=1.0).contains(&pad.gain) {
            return Err(invalid(format!("Pad {} gain must be between 0.0 and 1.0", track)));
        }
    }

    if let Some(saved_at) = &config.saved_at {
        chrono::DateTime::parse_from_rfc3339(saved_at)
            .map_err(|e| invalid(format!("Bad saved_at timestamp '{}': {}", saved_at, e)))?;
    }

    Ok(())
}
