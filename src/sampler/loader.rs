// Sample loader - WAV decoding into stereo f32 frames

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::Path;

/// One stereo frame, [left, right]
pub type Frame = [f32; 2];

/// Sample loading errors
#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Unknown sound: {0}")]
    UnknownSound(String),

    #[error("Sample '{0}' has no audio data")]
    Empty(String),
}

/// Decoded audio, always stereo
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub name: String,
    pub frames: Vec<Frame>,
    pub sample_rate: u32,
}

impl Sample {
    pub fn new(name: impl Into<String>, frames: Vec<Frame>, sample_rate: u32) -> Self {
        Self {
            name: name.into(),
            frames,
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames.len() as f64 / self.sample_rate as f64
    }

    /// Linear resample to `target_rate`
    pub fn resampled(&self, target_rate: u32) -> Sample {
        Sample {
            name: self.name.clone(),
            frames: resample_linear(&self.frames, self.sample_rate, target_rate),
            sample_rate: target_rate,
        }
    }
}

/// Load a sample file, converting to `target_rate`
pub fn load_sample(path: &Path, target_rate: u32) -> Result<Sample, SampleError> {
    let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");

    match extension.to_lowercase().as_str() {
        "wav" => {
            let sample = load_wav(path)?;
            Ok(if sample.sample_rate == target_rate {
                sample
            } else {
                sample.resampled(target_rate)
            })
        }
        _ => Err(SampleError::UnsupportedFormat(extension.to_string())),
    }
}

fn load_wav(path: &Path) -> Result<Sample, SampleError> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|x| x as f32 / max))
                .collect::<Result<_, _>>()?
        }
    };

    // Mono is duplicated, extra channels beyond two are dropped
    let channels = spec.channels.max(1) as usize;
    let frames = samples
        .chunks_exact(channels)
        .map(|c| if channels == 1 { [c[0], c[0]] } else { [c[0], c[1]] })
        .collect();

    Ok(Sample {
        name: path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string(),
        frames,
        sample_rate: spec.sample_rate,
    })
}

/// Write a sample as 16-bit stereo WAV
pub fn save_wav(sample: &Sample, path: &Path) -> Result<(), SampleError> {
    let spec = WavSpec {
        channels: 2,
        sample_rate: sample.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for frame in &sample.frames {
        for value in frame {
            writer.write_sample((value.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
        }
    }
    writer.finalize()?;
    Ok(())
}

fn resample_linear(frames: &[Frame], source_rate: u32, target_rate: u32) -> Vec<Frame> {
    if source_rate == target_rate || frames.is_empty() {
        return frames.to_vec();
    }

    let ratio = target_rate as f64 / source_rate as f64;
    let out_len = (frames.len() as f64 * ratio).ceil() as usize;
    let last = frames[frames.len() - 1];

    (0..out_len)
        .map(|i| {
            let pos = i as f64 / ratio;
            let idx = pos.floor() as usize;
            let frac = (pos - idx as f64) as f32;
            if idx + 1 >= frames.len() {
                last
            } else {
                let (a, b) = (frames[idx], frames[idx + 1]);
                [
                    a[0] * (1.0 - frac) + b[0] * frac,
                    a[1] * (1.0 - frac) + b[1] * frac,
                ]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_mono_wav(path: &Path, rate: u32, data: &[i16]) {
        let spec = WavSpec {
            channels: 1,
            sample_rate: rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for &s in data {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_load_mono_wav_as_stereo() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kick.wav");
        write_mono_wav(&path, 44100, &[0, 16384, -16384, 32767]);

        let sample = load_sample(&path, 44100).unwrap();
        assert_eq!(sample.name, "kick.wav");
        assert_eq!(sample.len(), 4);
        assert_eq!(sample.frames[1][0], sample.frames[1][1]);
        assert!((sample.frames[1][0] - 0.5).abs() < 1e-4);
        assert!((sample.frames[2][0] + 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_load_resamples() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snare.wav");
        write_mono_wav(&path, 22050, &[1000; 100]);

        let sample = load_sample(&path, 44100).unwrap();
        assert_eq!(sample.sample_rate, 44100);
        assert_eq!(sample.len(), 200);
    }

    #[test]
    fn test_unsupported_format() {
        let result = load_sample(Path::new("loop.mp3"), 44100);
        assert!(matches!(result, Err(SampleError::UnsupportedFormat(ext)) if ext == "mp3"));
    }

    #[test]
    fn test_missing_file() {
        let result = load_sample(Path::new("/nonexistent/missing.wav"), 44100);
        assert!(matches!(result, Err(SampleError::Wav(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let sample = Sample::new("out", vec![[0.25, -0.25], [0.5, 0.0]], 48000);

        save_wav(&sample, &path).unwrap();
        let loaded = load_sample(&path, 48000).unwrap();
        assert_eq!(loaded.len(), 2);
        assert!((loaded.frames[0][0] - 0.25).abs() < 1e-3);
        assert!((loaded.frames[0][1] + 0.25).abs() < 1e-3);
    }
}
