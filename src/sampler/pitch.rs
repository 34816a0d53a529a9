// Pitch ladder - 25 nearest-neighbour resamplings of one sample
// Index 12 is the untouched sample, 0 is an octave down, 24 an octave up

use super::loader::Frame;
use std::sync::Arc;

/// Ladder index of the unpitched sample
pub const UNPITCHED: u8 = 12;

/// Number of ladder steps (-12 ..= +12 semitones)
pub const LADDER_SIZE: usize = 25;

/// Precomputed pitch variants of a sample
#[derive(Debug, Clone)]
pub struct PitchLadder {
    variants: Vec<Arc<[Frame]>>,
}

impl PitchLadder {
    /// Build all variants. `frames` must not be empty.
    pub fn new(frames: &[Frame]) -> Self {
        Self {
            variants: pitch_ladder(frames)
                .into_iter()
                .map(Arc::from)
                .collect(),
        }
    }

    /// Variant for a ladder index (0..=24)
    pub fn get(&self, pitch: u8) -> Option<&Arc<[Frame]>> {
        self.variants.get(pitch as usize)
    }

    pub fn unpitched(&self) -> &Arc<[Frame]> {
        &self.variants[UNPITCHED as usize]
    }
}

/// Resample `data` to every semitone from -12 to +12.
///
/// Down n semitones: read positions k * 2^(-n/12) for k over
/// 0 .. ceil(N * 2^(n/12)), floored, keeping those below N. The buffer
/// grows. Up n semitones: read positions k * 2^(n/12) for k in 0..N,
/// floored, keeping those below N. The buffer shrinks.
pub fn pitch_ladder<T: Copy>(data: &[T]) -> Vec<Vec<T>> {
    let len = data.len();
    let mut ladder = Vec::with_capacity(LADDER_SIZE);

    for n in (1..=12).rev() {
        let count = (len as f64 * semitone_ratio(n)).ceil() as usize;
        let step = semitone_ratio(-n);
        ladder.push(pick(data, (0..count).map(|k| k as f64 * step)));
    }

    ladder.push(data.to_vec());

    for n in 1..=12 {
        let ratio = semitone_ratio(n);
        ladder.push(pick(data, (0..len).map(|k| k as f64 * ratio)));
    }

    ladder
}

fn semitone_ratio(semitones: i32) -> f64 {
    2f64.powf(semitones as f64 / 12.0)
}

fn pick<T: Copy>(data: &[T], positions: impl Iterator<Item = f64>) -> Vec<T> {
    positions
        .map(|p| p.floor() as usize)
        .take_while(|&i| i < data.len())
        .map(|i| data[i])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ladder_size() {
        let data: Vec<i32> = (0..100).collect();
        assert_eq!(pitch_ladder(&data).len(), LADDER_SIZE);
    }

    #[test]
    fn test_unpitched_is_identity() {
        let data: Vec<i32> = (0..257).map(|i| i * 3 - 7).collect();
        let ladder = pitch_ladder(&data);
        assert_eq!(ladder[UNPITCHED as usize], data);
    }

    #[test]
    fn test_octave_down_doubles_samples() {
        let data = vec![1, 2, 3, 4];
        let ladder = pitch_ladder(&data);
        assert_eq!(ladder[0], vec![1, 1, 2, 2, 3, 3, 4, 4]);
    }

    #[test]
    fn test_octave_up_skips_samples() {
        let data = vec![1, 2, 3, 4, 5];
        let ladder = pitch_ladder(&data);
        assert_eq!(ladder[24], vec![1, 3, 5]);
    }

    #[test]
    fn test_lengths_are_monotonic() {
        let data: Vec<u8> = vec![0; 1000];
        let ladder = pitch_ladder(&data);
        for pair in ladder.windows(2) {
            assert!(pair[0].len() >= pair[1].len());
        }
        assert!(ladder[11].len() > 1000);
        assert!(ladder[13].len() < 1000);
    }

    #[test]
    fn test_frame_ladder() {
        let frames: Vec<Frame> = (0..64).map(|i| [i as f32, -(i as f32)]).collect();
        let ladder = PitchLadder::new(&frames);
        assert_eq!(&ladder.unpitched()[..], &frames[..]);
        assert_eq!(ladder.get(0).unwrap().len(), 128);
        assert!(ladder.get(25).is_none());
    }
}
