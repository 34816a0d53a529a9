// Sample engine - Resolves pattern hits to pitched sounds on mixer channels

use super::bank::{PadBank, PadBinding};
use super::cues::{ClickType, CueSounds};
use super::loader::{Frame, Sample, SampleError, load_sample};
use super::pitch::PitchLadder;
use crate::audio::mixer::Mixer;
use crate::sequencer::pattern::Cell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Channel shared by metronome, previews and the error cue
pub const CUE_CHANNEL: usize = 0;

const METRONOME_LEVEL: f32 = 0.4;
const ERROR_LEVEL: f32 = 0.1;
const PREVIEW_LEVEL: f32 = 0.5;

/// A registered sound; decoded only once prepared
#[derive(Debug, Clone, Default)]
struct Sound {
    path: Option<PathBuf>,
    ladder: Option<PitchLadder>,
}

/// Owns decoded audio for every sound on the disk
pub struct SampleEngine {
    sounds: HashMap<String, Sound>,
    cues: CueSounds,
    volume: f32,
    sample_rate: u32,
}

impl SampleEngine {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sounds: HashMap::new(),
            cues: CueSounds::new(sample_rate as f32),
            volume: 1.0,
            sample_rate,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Global volume, 0.0 to 1.0
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    // ========== Sound registry ==========

    /// Register every WAV file directly inside `dir`. Returns how many were found.
    pub fn load_sounds(&mut self, dir: &Path) -> Result<usize, SampleError> {
        let mut found = 0;
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| SampleError::Io(e.into()))?;
            let path = entry.path();
            let is_wav = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("wav"));

            if entry.file_type().is_file() && is_wav {
                self.register(path.to_path_buf());
                found += 1;
            }
        }

        log::info!("Registered {} sounds from {}", found, dir.display());
        Ok(found)
    }

    /// Register (or re-point) one sound file under its file name
    pub fn register(&mut self, path: PathBuf) {
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        self.sounds.entry(name).or_default().path = Some(path);
    }

    /// Add a sound that only exists in memory (recorded or filtered)
    pub fn insert_sample(&mut self, sample: Sample) -> Result<(), SampleError> {
        if sample.is_empty() {
            return Err(SampleError::Empty(sample.name));
        }
        let sample = if sample.sample_rate == self.sample_rate {
            sample
        } else {
            sample.resampled(self.sample_rate)
        };

        let ladder = PitchLadder::new(&sample.frames);
        self.sounds.entry(sample.name).or_default().ladder = Some(ladder);
        Ok(())
    }

    /// Decode a registered sound and build its pitch ladder
    pub fn prepare(&mut self, name: &str) -> Result<(), SampleError> {
        let path = self
            .sounds
            .get(name)
            .and_then(|s| s.path.clone())
            .ok_or_else(|| SampleError::UnknownSound(name.to_string()))?;

        let mut sample = load_sample(&path, self.sample_rate)?;
        sample.name = name.to_string();
        self.insert_sample(sample)?;
        log::debug!("Prepared sound {}", name);
        Ok(())
    }

    /// Prepare every sound bound to a pad. Returns the names that failed.
    pub fn prepare_pads(&mut self, pads: &PadBank) -> Vec<String> {
        let mut failed = Vec::new();
        for name in pads.sample_names() {
            if self.is_prepared(name) {
                continue;
            }
            if let Err(e) = self.prepare(name) {
                log::warn!("Could not prepare {}: {}", name, e);
                failed.push(name.to_string());
            }
        }
        failed
    }

    /// Drop the decoded ladder, keeping the registration
    pub fn unprepare(&mut self, name: &str) {
        if let Some(sound) = self.sounds.get_mut(name) {
            sound.ladder = None;
        }
    }

    pub fn is_prepared(&self, name: &str) -> bool {
        self.ladder(name).is_some()
    }

    pub fn ladder(&self, name: &str) -> Option<&PitchLadder> {
        self.sounds.get(name).and_then(|s| s.ladder.as_ref())
    }

    // ========== Playback ==========

    /// Play every triggered track. Returns how many sounds were started.
    pub fn dispatch<M: Mixer>(
        &self,
        hits: impl IntoIterator<Item = (usize, Cell)>,
        pads: &PadBank,
        mixer: &mut M,
    ) -> usize {
        hits.into_iter()
            .filter(|(track, cell)| {
                pads.pad(*track)
                    .is_some_and(|pad| self.play_binding(pad, cell.pitch, mixer))
            })
            .count()
    }

    /// Live pad hit at the pad's own pitch
    pub fn play_pad<M: Mixer>(&self, track: usize, pads: &PadBank, mixer: &mut M) -> bool {
        pads.pad(track)
            .is_some_and(|pad| self.play_binding(pad, pad.pitch, mixer))
    }

    fn play_binding<M: Mixer>(&self, pad: &PadBinding, pitch: u8, mixer: &mut M) -> bool {
        let Some(sound) = pad
            .sample
            .as_deref()
            .and_then(|name| self.ladder(name))
            .and_then(|ladder| ladder.get(pitch))
        else {
            return false;
        };

        mixer.play(pad.channel, sound.clone(), pad.gain * self.volume);
        true
    }

    /// Metronome click for `beat`, accented on the downbeat
    pub fn play_metronome<M: Mixer>(&self, beat: usize, mixer: &mut M) {
        let click = self.cues.click(ClickType::for_beat(beat)).clone();
        mixer.play(CUE_CHANNEL, click, METRONOME_LEVEL * self.volume);
    }

    pub fn play_error<M: Mixer>(&self, mixer: &mut M) {
        mixer.play(CUE_CHANNEL, self.cues.error().clone(), ERROR_LEVEL * self.volume);
    }

    /// Audition a sound unpitched, decoding it on the fly if needed
    pub fn preview<M: Mixer>(&self, name: &str, mixer: &mut M) -> Result<(), SampleError> {
        let sound: Arc<[Frame]> = match self.ladder(name) {
            Some(ladder) => ladder.unpitched().clone(),
            None => {
                let path = self
                    .sounds
                    .get(name)
                    .and_then(|s| s.path.as_deref())
                    .ok_or_else(|| SampleError::UnknownSound(name.to_string()))?;
                load_sample(path, self.sample_rate)?.frames.into()
            }
        };

        if sound.is_empty() {
            return Err(SampleError::Empty(name.to_string()));
        }
        mixer.play(CUE_CHANNEL, sound, PREVIEW_LEVEL * self.volume);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::pitch::UNPITCHED;

    #[derive(Default)]
    struct RecordingMixer {
        played: Vec<(usize, usize, f32)>,
    }

    impl Mixer for RecordingMixer {
        fn play(&mut self, channel: usize, sound: Arc<[Frame]>, volume: f32) {
            self.played.push((channel, sound.len(), volume));
        }

        fn stop_all(&mut self) {
            self.played.clear();
        }
    }

    fn engine_with(name: &str, len: usize) -> SampleEngine {
        let mut engine = SampleEngine::new(44100);
        engine
            .insert_sample(Sample::new(name, vec![[0.5, 0.5]; len], 44100))
            .unwrap();
        engine
    }

    #[test]
    fn test_insert_builds_ladder() {
        let engine = engine_with("kick", 100);
        let ladder = engine.ladder("kick").unwrap();
        assert_eq!(ladder.get(UNPITCHED).unwrap().len(), 100);
        assert_eq!(ladder.get(0).unwrap().len(), 200);
        assert!(engine.is_prepared("kick"));
    }

    #[test]
    fn test_empty_sample_rejected() {
        let mut engine = SampleEngine::new(44100);
        let result = engine.insert_sample(Sample::new("blank", vec![], 44100));
        assert!(matches!(result, Err(SampleError::Empty(_))));
        assert!(!engine.is_prepared("blank"));
    }

    #[test]
    fn test_dispatch_uses_pad_channel_and_gain() {
        let mut engine = engine_with("kick", 100);
        engine.set_volume(0.5);
        let mut pads = PadBank::default();
        pads.assign(2, "kick");
        pads.pad_mut(2).unwrap().gain = 0.8;

        let mut mixer = RecordingMixer::default();
        let hits = vec![(2, Cell::hit(24)), (3, Cell::hit(12))];
        let played = engine.dispatch(hits, &pads, &mut mixer);

        // Track 3 has no sample bound
        assert_eq!(played, 1);
        let (channel, len, volume) = mixer.played[0];
        assert_eq!(channel, 3);
        assert_eq!(len, 50);
        assert!((volume - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_play_pad_uses_pad_pitch() {
        let engine = engine_with("snare", 100);
        let mut pads = PadBank::default();
        pads.assign(0, "snare");
        pads.pad_mut(0).unwrap().pitch = 0;

        let mut mixer = RecordingMixer::default();
        assert!(engine.play_pad(0, &pads, &mut mixer));
        assert_eq!(mixer.played[0].1, 200);
        assert!(!engine.play_pad(40, &pads, &mut mixer));
    }

    #[test]
    fn test_metronome_and_error_on_cue_channel() {
        let engine = SampleEngine::new(44100);
        let mut mixer = RecordingMixer::default();
        engine.play_metronome(0, &mut mixer);
        engine.play_metronome(2, &mut mixer);
        engine.play_error(&mut mixer);

        assert!(mixer.played.iter().all(|p| p.0 == CUE_CHANNEL));
        assert!((mixer.played[0].2 - 0.4).abs() < 1e-6);
        assert!((mixer.played[2].2 - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_unprepare_and_unknown() {
        let mut engine = engine_with("hat", 10);
        engine.unprepare("hat");
        assert!(!engine.is_prepared("hat"));
        assert!(matches!(
            engine.prepare("nothing"),
            Err(SampleError::UnknownSound(_))
        ));

        let mut mixer = RecordingMixer::default();
        assert!(engine.preview("nothing", &mut mixer).is_err());
    }
}
