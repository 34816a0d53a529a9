// Sequencer module
// Pattern grids, quantize, swing, songs and the transport state machine

pub mod command;
pub mod pattern;
pub mod player;
pub mod quantize;
pub mod song;
pub mod swing;
pub mod transport;

pub use command::SequencerCommand;
pub use pattern::{Cell, MAX_BARS, Pattern, PatternBank, PatternError, PatternMeta, TRACKS};
pub use player::{MAX_PITCH, Sequencer, SequencerSettings, TickUpdate};
pub use quantize::{Resolution, quantize};
pub use song::Song;
pub use swing::{Swing, render_play};
pub use transport::{Position, TransportState};
