// DSP utilities - Output hygiene for the audio callback

use crate::sampler::loader::Frame;
use cpal::{FromSample, Sample};

/// Values below this are treated as zero
const DENORMAL_THRESHOLD: f32 = 1e-15;

/// Flush denormals to zero
#[inline]
pub fn flush_denormals_to_zero(x: f32) -> f32 {
    if x.abs() < DENORMAL_THRESHOLD { 0.0 } else { x }
}

/// tanh saturation into [-1, 1]
#[inline]
pub fn soft_clip(x: f32) -> f32 {
    x.tanh()
}

/// One-pole parameter smoother: y += a * (target - y)
///
/// Used on the master volume so level changes don't click.
#[derive(Debug, Clone)]
pub struct OnePoleSmoother {
    current: f32,
    coefficient: f32,
}

impl OnePoleSmoother {
    /// `time_constant_ms` is the time to cover ~63% of a step
    pub fn new(initial_value: f32, time_constant_ms: f32, sample_rate: f32) -> Self {
        let time_constant_samples = time_constant_ms * 0.001 * sample_rate;
        Self {
            current: initial_value,
            coefficient: (1.0 / time_constant_samples.max(1.0)).min(1.0),
        }
    }

    #[inline]
    pub fn process(&mut self, target: f32) -> f32 {
        self.current += self.coefficient * (target - self.current);
        self.current = flush_denormals_to_zero(self.current);
        self.current
    }
}

/// Write a stereo frame into one interleaved device frame.
///
/// Extra device channels get silence; a mono device gets the L/R average.
#[inline]
pub fn write_frame<T>([left, right]: Frame, output: &mut [T])
where
    T: Sample + FromSample<f32>,
{
    match output {
        [] => {}
        [mono] => *mono = T::from_sample((left + right) * 0.5),
        [l, r, rest @ ..] => {
            *l = T::from_sample(left);
            *r = T::from_sample(right);
            for sample in rest {
                *sample = T::from_sample(0.0f32);
            }
        }
    }
}
