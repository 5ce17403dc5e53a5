//! cpal output stream feeding the mixer.

use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    SampleFormat, Stream,
};
use tracing::{error, info};

use boxbreath::{
    config::AudioSettings,
    cue::{GraphEngine, Mixer},
    error::AudioError,
    MAX_BLOCK_SIZE,
};

/// Open the default output device and start rendering.
///
/// The stream must stay alive (and on this thread) for as long as sound is
/// wanted; dropping it silences the mixer.
pub fn open(settings: &AudioSettings) -> Result<(GraphEngine, Stream), AudioError> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(AudioError::NoOutputDevice)?;
    let config = device
        .default_output_config()
        .map_err(|err| AudioError::backend("failed to fetch default output config", err))?;

    if config.sample_format() != SampleFormat::F32 {
        return Err(AudioError::UnsupportedFormat {
            format: config.sample_format().to_string(),
        });
    }

    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;
    info!(sample_rate, channels, "opening audio output");

    let (engine, mixer) = GraphEngine::new(settings);
    let stream = device
        .build_output_stream(
            &config.into(),
            render_callback(mixer, sample_rate, channels),
            |err| error!(error = %err, "audio stream error"),
            None,
        )
        .map_err(|err| AudioError::backend("failed to build output stream", err))?;

    stream
        .play()
        .map_err(|err| AudioError::backend("failed to start output stream", err))?;

    Ok((engine, stream))
}

fn render_callback(
    mut mixer: Mixer,
    sample_rate: f32,
    channels: usize,
) -> impl FnMut(&mut [f32], &cpal::OutputCallbackInfo) + Send + 'static {
    let mut mono = vec![0.0f32; MAX_BLOCK_SIZE];
    let channels = channels.max(1);

    move |data: &mut [f32], _| {
        for chunk in data.chunks_mut(MAX_BLOCK_SIZE * channels) {
            let frames = chunk.len() / channels;
            let block = &mut mono[..frames];
            mixer.render(block, sample_rate);

            // Copy to output (mono to all channels)
            for (frame, &sample) in chunk.chunks_mut(channels).zip(block.iter()) {
                frame.fill(sample);
            }
        }
    }
}
