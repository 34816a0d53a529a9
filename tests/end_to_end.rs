// Integration test: End to end playback with the real clock
//
// Two bars at 90 BPM take a little over five seconds.

use padseq::sequencer::{Cell, PatternBank, Sequencer, SequencerSettings};
use padseq::sequencer::quantize::Resolution;
use std::time::{Duration, Instant};

fn settings() -> SequencerSettings {
    SequencerSettings {
        bpm: 90.0,
        metronome: true,
        resolution: Resolution::Quarter,
    }
}

#[test]
fn test_two_bars_wrap_once() {
    let mut bank = PatternBank::new(4);
    bank.init(0, 2).unwrap();

    let mut seq = Sequencer::new(bank, settings());
    seq.start();
    assert!(seq.is_playing());

    let mut ticks = 0;
    let mut clicks = 0;
    let mut downbeats = 0;
    let deadline = Instant::now() + Duration::from_secs(15);

    while ticks < 192 && Instant::now() < deadline {
        let update = seq.update();
        if update.new_tick {
            ticks += 1;
            if update.metronome {
                clicks += 1;
                if seq.position().beat == 0 {
                    downbeats += 1;
                }
            }
        }
        std::thread::sleep(Duration::from_micros(200));
    }

    assert_eq!(ticks, 192, "timed out waiting for pulses");
    assert_eq!(clicks, 8);
    assert_eq!(downbeats, 2);
    assert_eq!(seq.bar_syncs(), 0);

    // The last advance lands on the next frame
    seq.update();
    assert_eq!(seq.position().bar, 0);
    assert_eq!(seq.position().pulse, 0);
    assert_eq!(seq.bar_syncs(), 1);

    seq.stop();
    assert!(!seq.is_playing());
}

#[test]
fn test_recorded_hit_plays_next_loop() {
    let mut bank = PatternBank::new(4);
    bank.init(0, 1).unwrap();

    let mut seq = Sequencer::new(bank, settings());
    seq.start();
    seq.toggle_record();

    // Wait until the playhead is a few pulses into the bar, then hit pad 3
    let deadline = Instant::now() + Duration::from_secs(10);
    while seq.position().pulse < 5 && Instant::now() < deadline {
        seq.update();
        std::thread::sleep(Duration::from_micros(200));
    }
    seq.record(3, 12);

    // Quarter quantize pulls pulse 5 back to the downbeat
    assert_eq!(seq.record_buffer().unwrap().cell(3, 0), Some(Cell::hit(12)));
    assert_eq!(seq.play_buffer().unwrap().cell(3, 0), Some(Cell::default()));

    // After the wrap the play buffer carries it
    while seq.bar_syncs() == 0 && Instant::now() < deadline {
        seq.update();
        std::thread::sleep(Duration::from_micros(200));
    }
    assert_eq!(seq.bar_syncs(), 1);
    assert!(seq.play_buffer().unwrap().triggered_at(0).any(|(track, _)| track == 3));

    seq.stop();
    assert!(seq.bank().get(0).unwrap().cell(3, 0).unwrap().triggered);
}
