// Mixer commands - Frame loop -> audio callback

use crate::sampler::loader::Frame;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum MixerCommand {
    /// Start `sound` on `channel`, cutting off whatever played there
    Play {
        channel: usize,
        sound: Arc<[Frame]>,
        volume: f32,
    },
    StopChannel(usize),
    StopAll,
}
