// Lock-free channels between the frame loop and the audio callback

use crate::messaging::command::MixerCommand;
use ringbuf::{HeapRb, traits::Split};

pub type MixerCommandProducer = ringbuf::HeapProd<MixerCommand>;
pub type MixerCommandConsumer = ringbuf::HeapCons<MixerCommand>;

pub fn create_mixer_channel(capacity: usize) -> (MixerCommandProducer, MixerCommandConsumer) {
    let rb = HeapRb::<MixerCommand>::new(capacity);
    rb.split()
}
