// Audio - Channel mixer and CPAL output

pub mod dsp_utils;
pub mod engine;
pub mod mixer;

pub use engine::{AudioError, AudioOutput, MixerHandle};
pub use mixer::{ChannelMixer, MIXER_CHANNELS, Mixer};
