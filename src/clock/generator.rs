// Clock generator - Dedicated pulse thread
// Sleeps for most of each interval, then spins on Instant for the remainder

use super::pulse::PulseSender;
use super::tempo::SharedTempo;
use super::{Clock, ClockError, PPQN};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Share of each interval spent sleeping before busy-waiting
const SLEEP_FRACTION: f64 = 0.8;

/// Time between two pulses at the given tempo: 60 / (bpm * 24) seconds
pub fn pulse_interval(bpm: f64) -> Duration {
    Duration::from_secs_f64(60.0 / (bpm * PPQN as f64))
}

/// Threaded pulse source.
///
/// Owns the producer half of the pulse channel. While running, the sender
/// lives on the clock thread and comes back when the thread is joined, so
/// at most one thread ever writes the channel.
pub struct ClockGenerator {
    tempo: SharedTempo,
    running: Arc<AtomicBool>,
    pulses: Option<PulseSender>,
    handle: Option<JoinHandle<PulseSender>>,
}

impl ClockGenerator {
    pub fn new(tempo: SharedTempo, pulses: PulseSender) -> Self {
        Self {
            tempo,
            running: Arc::new(AtomicBool::new(false)),
            pulses: Some(pulses),
            handle: None,
        }
    }

    pub fn tempo(&self) -> &SharedTempo {
        &self.tempo
    }
}

impl Clock for ClockGenerator {
    fn start(&mut self) -> Result<(), ClockError> {
        if self.handle.is_some() {
            log::debug!("Clock already running, stopping it before restart");
            self.stop();
        }

        let pulses = self.pulses.take().ok_or(ClockError::ChannelClosed)?;
        let tempo = self.tempo.clone();
        let running = self.running.clone();
        running.store(true, Ordering::Release);

        let handle = thread::Builder::new()
            .name("clock-generator".to_string())
            .spawn(move || run(tempo, running, pulses))
            .inspect_err(|_| self.running.store(false, Ordering::Release))?;

        log::debug!("Clock started at {:.1} BPM", self.tempo.get());
        self.handle = Some(handle);
        Ok(())
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::Release);

        if let Some(handle) = self.handle.take() {
            match handle.join() {
                Ok(pulses) => self.pulses = Some(pulses),
                Err(_) => log::error!("Clock thread panicked, pulse channel lost"),
            }
            log::debug!("Clock stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for ClockGenerator {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Clock thread body. Returns the sender so the generator can restart.
///
/// A pulse goes out as soon as the thread starts, then one per interval.
fn run(tempo: SharedTempo, running: Arc<AtomicBool>, mut pulses: PulseSender) -> PulseSender {
    let mut last = Instant::now();

    while running.load(Ordering::Acquire) {
        if !pulses.send() {
            log::trace!("Pulse coalesced, consumer is behind");
        }

        // Re-read every pulse so a tempo change hits the very next interval
        let interval = pulse_interval(tempo.get());
        let deadline = last + interval;

        let sleep_for = interval.mul_f64(SLEEP_FRACTION);
        let elapsed = last.elapsed();
        if elapsed < sleep_for {
            thread::sleep(sleep_for - elapsed);
        }

        while Instant::now() < deadline {
            std::hint::spin_loop();
        }

        // Resync instead of bursting if the thread was held up for a whole interval
        let now = Instant::now();
        last = if now > deadline + interval { now } else { deadline };
    }

    pulses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::pulse::pulse_channel;

    #[test]
    fn test_pulse_interval() {
        // 120 BPM -> 0.5s per beat -> 0.5/24 per pulse
        let interval = pulse_interval(120.0);
        assert!((interval.as_secs_f64() - 0.5 / 24.0).abs() < 1e-9);

        let interval = pulse_interval(90.0);
        assert!((interval.as_secs_f64() - 60.0 / 2160.0).abs() < 1e-9);
    }

    #[test]
    fn test_start_stop_emits_pulses() {
        let (tx, mut rx) = pulse_channel();
        let mut clock = ClockGenerator::new(SharedTempo::new(300.0), tx);

        clock.start().unwrap();
        assert!(clock.is_running());
        thread::sleep(Duration::from_millis(100));
        clock.stop();
        assert!(!clock.is_running());

        // ~8.3ms per pulse at 300 BPM
        let received = rx.poll();
        assert!(received >= 5, "only {} pulses", received);

        // Nothing arrives after stop returns
        thread::sleep(Duration::from_millis(30));
        assert_eq!(rx.poll(), 0);
    }

    #[test]
    fn test_first_pulse_on_start() {
        let (tx, mut rx) = pulse_channel();
        // ~62ms per pulse at 40 BPM
        let mut clock = ClockGenerator::new(SharedTempo::new(40.0), tx);

        clock.start().unwrap();
        thread::sleep(Duration::from_millis(20));
        assert_eq!(rx.poll(), 1);
        clock.stop();
    }

    #[test]
    fn test_restart_while_running() {
        let (tx, mut rx) = pulse_channel();
        let mut clock = ClockGenerator::new(SharedTempo::new(300.0), tx);

        clock.start().unwrap();
        clock.start().unwrap();
        thread::sleep(Duration::from_millis(50));
        assert!(clock.is_running());
        clock.stop();
        assert!(rx.poll() > 0);
    }

    #[test]
    fn test_stop_without_start() {
        let (tx, _rx) = pulse_channel();
        let mut clock = ClockGenerator::new(SharedTempo::default(), tx);
        clock.stop();
        assert!(!clock.is_running());
    }
}
