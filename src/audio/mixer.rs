// Mixer - One voice per channel, summed to stereo
// A new sound on a channel cuts off the one already playing there

use crate::audio::dsp_utils::{OnePoleSmoother, flush_denormals_to_zero, soft_clip};
use crate::messaging::command::MixerCommand;
use crate::sampler::loader::Frame;
use crate::sequencer::pattern::TRACKS;
use std::sync::Arc;

/// Channel 0 (metronome, previews, error cue) plus one per track
pub const MIXER_CHANNELS: usize = TRACKS + 1;

/// Destination for sounds resolved by the sample engine
pub trait Mixer {
    /// Play `sound` on `channel` at `volume` (0.0 - 1.0)
    fn play(&mut self, channel: usize, sound: Arc<[Frame]>, volume: f32);

    /// Silence every channel
    fn stop_all(&mut self);
}

#[derive(Debug, Clone)]
struct Voice {
    sound: Arc<[Frame]>,
    position: usize,
    volume: f32,
}

/// Voice table rendered by the audio callback
pub struct ChannelMixer {
    voices: Vec<Option<Voice>>,
    master: f32,
    smoother: OnePoleSmoother,
}

impl ChannelMixer {
    pub fn new(channels: usize, sample_rate: f32) -> Self {
        Self {
            voices: vec![None; channels],
            master: 1.0,
            smoother: OnePoleSmoother::new(1.0, 10.0, sample_rate),
        }
    }

    pub fn set_master(&mut self, volume: f32) {
        self.master = volume.clamp(0.0, 1.0);
    }

    /// Apply a queued command. Out-of-range channels are ignored.
    pub fn apply(&mut self, command: MixerCommand) {
        match command {
            MixerCommand::Play {
                channel,
                sound,
                volume,
            } => {
                if let Some(slot) = self.voices.get_mut(channel) {
                    *slot = Some(Voice {
                        sound,
                        position: 0,
                        volume: volume.clamp(0.0, 1.0),
                    });
                }
            }
            MixerCommand::StopChannel(channel) => {
                if let Some(slot) = self.voices.get_mut(channel) {
                    *slot = None;
                }
            }
            MixerCommand::StopAll => self.voices.iter_mut().for_each(|v| *v = None),
        }
    }

    /// Mix one output frame and advance every voice
    pub fn next_frame(&mut self) -> Frame {
        let mut out = [0.0f32; 2];

        for slot in self.voices.iter_mut() {
            let finished = match slot.as_mut() {
                Some(voice) => match voice.sound.get(voice.position) {
                    Some(frame) => {
                        out[0] += frame[0] * voice.volume;
                        out[1] += frame[1] * voice.volume;
                        voice.position += 1;
                        false
                    }
                    None => true,
                },
                None => false,
            };
            if finished {
                *slot = None;
            }
        }

        let gain = self.smoother.process(self.master);
        out.map(|s| soft_clip(flush_denormals_to_zero(s * gain)))
    }

    pub fn render(&mut self, output: &mut [Frame]) {
        for frame in output {
            *frame = self.next_frame();
        }
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_some()).count()
    }
}

impl Mixer for ChannelMixer {
    fn play(&mut self, channel: usize, sound: Arc<[Frame]>, volume: f32) {
        self.apply(MixerCommand::Play {
            channel,
            sound,
            volume,
        });
    }

    fn stop_all(&mut self) {
        self.apply(MixerCommand::StopAll);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sound(value: f32, len: usize) -> Arc<[Frame]> {
        vec![[value, value]; len].into()
    }

    #[test]
    fn test_voice_plays_to_end() {
        let mut mixer = ChannelMixer::new(MIXER_CHANNELS, 44100.0);
        mixer.play(1, sound(0.5, 3), 1.0);
        assert_eq!(mixer.active_voices(), 1);

        let mut out = [[0.0; 2]; 5];
        mixer.render(&mut out);
        assert!(out[0][0] > 0.0);
        assert!(out[2][0] > 0.0);
        assert_eq!(out[4], [0.0, 0.0]);
        assert_eq!(mixer.active_voices(), 0);
    }

    #[test]
    fn test_new_sound_replaces_channel() {
        let mut mixer = ChannelMixer::new(MIXER_CHANNELS, 44100.0);
        mixer.play(2, sound(0.5, 100), 1.0);
        mixer.play(2, sound(-0.5, 100), 1.0);
        assert_eq!(mixer.active_voices(), 1);
        assert!(mixer.next_frame()[0] < 0.0);

        mixer.play(3, sound(0.5, 100), 1.0);
        assert_eq!(mixer.active_voices(), 2);
    }

    #[test]
    fn test_channels_sum() {
        let mut mixer = ChannelMixer::new(MIXER_CHANNELS, 44100.0);
        mixer.play(1, sound(0.1, 10), 1.0);
        let single = mixer.next_frame()[0];

        let mut mixer = ChannelMixer::new(MIXER_CHANNELS, 44100.0);
        mixer.play(1, sound(0.1, 10), 1.0);
        mixer.play(2, sound(0.1, 10), 1.0);
        let double = mixer.next_frame()[0];
        assert!(double > single * 1.9);
    }

    #[test]
    fn test_stop_commands() {
        let mut mixer = ChannelMixer::new(MIXER_CHANNELS, 44100.0);
        mixer.play(0, sound(0.5, 10), 1.0);
        mixer.play(4, sound(0.5, 10), 1.0);
        mixer.apply(MixerCommand::StopChannel(4));
        assert_eq!(mixer.active_voices(), 1);
        mixer.stop_all();
        assert_eq!(mixer.active_voices(), 0);
    }

    #[test]
    fn test_out_of_range_channel_ignored() {
        let mut mixer = ChannelMixer::new(MIXER_CHANNELS, 44100.0);
        mixer.play(MIXER_CHANNELS, sound(0.5, 10), 1.0);
        assert_eq!(mixer.active_voices(), 0);
    }

    #[test]
    fn test_output_bounded() {
        let mut mixer = ChannelMixer::new(MIXER_CHANNELS, 44100.0);
        for channel in 0..MIXER_CHANNELS {
            mixer.play(channel, sound(1.0, 10), 1.0);
        }
        let frame = mixer.next_frame();
        assert!(frame[0] <= 1.0 && frame[1] <= 1.0);
    }
}
