pub mod bank;
pub mod cues;
pub mod engine;
pub mod filter;
pub mod loader;
pub mod pitch;

pub use bank::{PadBank, PadBinding};
pub use cues::{ClickType, CueSounds};
pub use engine::{CUE_CHANNEL, SampleEngine};
pub use filter::{LadderFilter, LadderParams, filter_sample};
pub use loader::{Frame, Sample, SampleError, load_sample, save_wav};
pub use pitch::{LADDER_SIZE, PitchLadder, UNPITCHED, pitch_ladder};
