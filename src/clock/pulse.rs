// Pulse channel - SPSC tick signal between clock thread and sequencer

use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Create a pulse channel with a single slot.
///
/// Pulses that find the slot occupied are counted instead of queued, so
/// a slow consumer learns how many ticks it missed.
pub fn pulse_channel() -> (PulseSender, PulseReceiver) {
    let (producer, consumer) = HeapRb::<()>::new(1).split();
    let overflow = Arc::new(AtomicU32::new(0));

    (
        PulseSender {
            producer,
            overflow: overflow.clone(),
        },
        PulseReceiver { consumer, overflow },
    )
}

/// Producer half, owned by whichever clock is running
pub struct PulseSender {
    producer: HeapProd<()>,
    overflow: Arc<AtomicU32>,
}

impl PulseSender {
    /// Signal one pulse. Returns false if it had to be coalesced.
    pub fn send(&mut self) -> bool {
        if self.producer.try_push(()).is_ok() {
            true
        } else {
            self.overflow.fetch_add(1, Ordering::AcqRel);
            false
        }
    }
}

/// Consumer half, polled by the sequencer once per frame
pub struct PulseReceiver {
    consumer: HeapCons<()>,
    overflow: Arc<AtomicU32>,
}

impl PulseReceiver {
    /// Number of pulses since the previous poll (0 if none)
    pub fn poll(&mut self) -> u32 {
        let mut count = 0;
        while self.consumer.try_pop().is_some() {
            count += 1;
        }
        count + self.overflow.swap(0, Ordering::AcqRel)
    }

    /// Discard anything pending
    pub fn clear(&mut self) {
        while self.consumer.try_pop().is_some() {}
        self.overflow.store(0, Ordering::Release);
    }
}
