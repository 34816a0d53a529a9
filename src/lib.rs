// padseq - Pattern drum sequencer library exports for the player, tests and benchmarks

pub mod audio;
pub mod clock;
pub mod messaging;
pub mod project;
pub mod sampler;
pub mod sequencer;

// Re-export commonly used types for convenience
pub use audio::engine::{AudioError, AudioOutput, MixerHandle};
pub use audio::mixer::{ChannelMixer, MIXER_CHANNELS, Mixer};
pub use clock::{Clock, ClockError, ClockGenerator, PPQN, PULSES_PER_BAR, SharedTempo};
pub use project::{Disk, Project, ProjectError};
pub use sampler::{PadBank, SampleEngine, SampleError};
pub use sequencer::{
    Cell, Pattern, PatternBank, Position, Resolution, Sequencer, SequencerCommand,
    SequencerSettings, Song, TickUpdate, TransportState,
};
