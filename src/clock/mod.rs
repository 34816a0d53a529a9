// Clock - Pulse generation for the sequencer
// A dedicated thread emits 24 pulses per quarter note at the shared tempo

pub mod generator;
pub mod pulse;
pub mod tempo;

pub use generator::{ClockGenerator, pulse_interval};
pub use pulse::{PulseReceiver, PulseSender, pulse_channel};
pub use tempo::SharedTempo;

/// Pulses per quarter note
pub const PPQN: usize = 24;

/// Pulses per 4/4 bar
pub const PULSES_PER_BAR: usize = PPQN * 4;

/// Clock errors
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    #[error("Failed to spawn clock thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Pulse channel is no longer available")]
    ChannelClosed,
}

/// Something that drives the pulse channel.
///
/// `ClockGenerator` is the real-time implementation. The sequencer only
/// needs start/stop control; pulses reach it through its `PulseReceiver`.
pub trait Clock {
    /// Begin emitting pulses. A running clock is stopped first.
    fn start(&mut self) -> Result<(), ClockError>;

    /// Stop emitting pulses. Returns once no further pulse can be sent.
    fn stop(&mut self);

    fn is_running(&self) -> bool;
}
