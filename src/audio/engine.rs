// Audio output - CPAL stream rendering the channel mixer
//
// The frame loop never touches the stream: it pushes `MixerCommand`s into a
// ring buffer through `MixerHandle`, and the callback drains them before
// rendering. Internally everything is f32 stereo; conversion to the device
// format happens while writing the output buffer.
//
// On macOS the Stream is not Send, so `AudioOutput` must stay on the thread
// that created it.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use ringbuf::traits::{Consumer, Producer};
use std::sync::Arc;

use crate::audio::dsp_utils::write_frame;
use crate::audio::mixer::{ChannelMixer, MIXER_CHANNELS, Mixer};
use crate::messaging::channels::{MixerCommandConsumer, MixerCommandProducer, create_mixer_channel};
use crate::messaging::command::MixerCommand;
use crate::sampler::loader::Frame;

/// Commands that can be queued between two callbacks
const COMMAND_CAPACITY: usize = 256;

/// Audio output errors
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("No audio output device found")]
    NoDevice,

    #[error("Could not read device configuration: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),

    #[error("Could not build output stream: {0}")]
    Build(#[from] cpal::BuildStreamError),

    #[error("Could not start output stream: {0}")]
    Play(#[from] cpal::PlayStreamError),

    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),
}

/// Running output stream on the default device
pub struct AudioOutput {
    _device: Device,
    _stream: Stream,
    sample_rate: u32,
    channels: usize,
}

impl AudioOutput {
    /// Open the default output device and start rendering.
    ///
    /// Returns the stream owner and the handle used to send sounds to it.
    pub fn start(master_volume: f32) -> Result<(Self, MixerHandle), AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        log::info!(
            "Audio device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let supported_config = device.default_output_config()?;
        let sample_format = supported_config.sample_format();
        let sample_rate = supported_config.sample_rate().0;
        let channels = supported_config.channels() as usize;
        log::debug!("Audio config: {:?}", supported_config);

        let config: StreamConfig = supported_config.into();
        let (producer, consumer) = create_mixer_channel(COMMAND_CAPACITY);

        let mut mixer = ChannelMixer::new(MIXER_CHANNELS, sample_rate as f32);
        mixer.set_master(master_volume);

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, channels, mixer, consumer),
            SampleFormat::I16 => build_stream::<i16>(&device, &config, channels, mixer, consumer),
            SampleFormat::U16 => build_stream::<u16>(&device, &config, channels, mixer, consumer),
            other => return Err(AudioError::UnsupportedFormat(format!("{:?}", other))),
        }?;

        stream.play()?;
        log::info!("Audio output running at {} Hz, {} channels", sample_rate, channels);

        Ok((
            Self {
                _device: device,
                _stream: stream,
                sample_rate,
                channels,
            },
            MixerHandle { producer },
        ))
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    channels: usize,
    mut mixer: ChannelMixer,
    mut commands: MixerCommandConsumer,
) -> Result<Stream, AudioError>
where
    T: SizedSample + FromSample<f32> + Sample,
{
    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            // No allocation or blocking in here
            while let Some(command) = commands.try_pop() {
                mixer.apply(command);
            }

            for frame in data.chunks_mut(channels) {
                write_frame(mixer.next_frame(), frame);
            }
        },
        |err| log::error!("Audio stream error: {}", err),
        None,
    )?;

    Ok(stream)
}

/// Frame-loop side of the output: queues commands for the callback
pub struct MixerHandle {
    producer: MixerCommandProducer,
}

impl MixerHandle {
    fn send(&mut self, command: MixerCommand) {
        if self.producer.try_push(command).is_err() {
            log::warn!("Mixer command queue full, dropping command");
        }
    }
}

impl Mixer for MixerHandle {
    fn play(&mut self, channel: usize, sound: Arc<[Frame]>, volume: f32) {
        self.send(MixerCommand::Play {
            channel,
            sound,
            volume,
        });
    }

    fn stop_all(&mut self) {
        self.send(MixerCommand::StopAll);
    }
}
