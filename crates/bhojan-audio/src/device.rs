use cpal::{
    Device, Host,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use ringbuf_blocking::{
    BlockingHeapRb,
    traits::{Consumer, Producer, Split},
};

/// Extra time a stream is kept alive after the last queued sample, so the
/// device can drain its own buffer.
const DRAIN_MARGIN: std::time::Duration = std::time::Duration::from_millis(150);

/// Errors that can occur while opening an output device or playing on it.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The host reports no default output device (headless machines, CI).
    #[error("no default output device is available")]
    NoOutputDevice,
    /// Failed to obtain the device’s default output stream configuration.
    #[error("failed to build device config: {0}")]
    BuildStreamConfig(#[from] cpal::DefaultStreamConfigError),
    /// Failed to construct an output audio stream.
    #[error("failed to build device output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),
    /// The stream was built but refused to start.
    #[error("failed to start output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
    /// The device's native sample format is not one we can convert to.
    #[error("unsupported output sample format: {0:?}")]
    UnsupportedFormat(cpal::SampleFormat),
}

/// Default output device of a host together with its native stream format.
#[derive(Clone)]
pub struct OutputDevice {
    /// Human-readable device description.
    pub description: String,
    /// Native sample rate of the device.
    pub sample_rate: u32,
    /// Native channel count of the device.
    pub channels: u16,

    sample_format: cpal::SampleFormat,
    device: Device,
}

impl std::fmt::Display for OutputDevice {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{} ({} Hz, {} ch)",
            self.description, self.sample_rate, self.channels
        )
    }
}

impl OutputDevice {
    /// Opens the default output device of `host` with its default output
    /// configuration.
    pub fn open_default(host: &Host) -> Result<Self, DeviceError> {
        let device = host
            .default_output_device()
            .ok_or(DeviceError::NoOutputDevice)?;
        let default_output_config = device.default_output_config()?;
        let description = device
            .description()
            .map(|description| description.to_string())
            .unwrap_or_else(|_| "unknown output device".to_string());

        Ok(Self {
            description,
            sample_rate: default_output_config.sample_rate(),
            channels: default_output_config.channels(),
            sample_format: default_output_config.sample_format(),
            device,
        })
    }

    /// Plays mono `samples` (at [`OutputDevice::sample_rate`]) on every
    /// channel and returns once they have been handed to the device.
    ///
    /// This blocks the calling thread for the duration of the clip; run it on
    /// a dedicated thread (see [`spawn_default_output_playback`]).
    pub fn play_blocking(&self, samples: &[f32]) -> Result<(), DeviceError> {
        if samples.is_empty() {
            return Ok(());
        }

        let buffer = BlockingHeapRb::<f32>::new(samples.len());
        let (mut producer, consumer) = buffer.split();
        producer.push_slice(samples);

        let config = cpal::StreamConfig {
            channels: self.channels,
            sample_rate: self.sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        let stream = match self.sample_format {
            cpal::SampleFormat::F32 => self.build_stream::<f32, _>(&config, consumer)?,
            cpal::SampleFormat::I16 => self.build_stream::<i16, _>(&config, consumer)?,
            cpal::SampleFormat::U16 => self.build_stream::<u16, _>(&config, consumer)?,
            other => return Err(DeviceError::UnsupportedFormat(other)),
        };
        stream.play()?;

        let clip_length =
            std::time::Duration::from_secs_f64(samples.len() as f64 / self.sample_rate as f64);
        std::thread::sleep(clip_length + DRAIN_MARGIN);
        Ok(())
    }

    /// Builds an output stream that drains `consumer`, duplicating each mono
    /// sample over all channels and emitting silence once it is empty.
    fn build_stream<T, C>(
        &self,
        config: &cpal::StreamConfig,
        mut consumer: C,
    ) -> Result<cpal::Stream, DeviceError>
    where
        T: cpal::SizedSample + cpal::FromSample<f32>,
        C: Consumer<Item = f32> + Send + 'static,
    {
        let channels = config.channels.max(1) as usize;
        Ok(self.device.build_output_stream(
            config,
            move |data: &mut [T], _| {
                for frame in data.chunks_mut(channels) {
                    let value = T::from_sample(consumer.try_pop().unwrap_or(0.0));
                    for sample in frame {
                        *sample = value;
                    }
                }
            },
            |error| log::error!("Output stream error while playing an alert: {error}"),
            None,
        )?)
    }
}

/// Plays a clip on the default output device from a short-lived thread.
///
/// `render` receives the device sample rate and produces the mono clip for
/// it. Missing devices and playback failures are logged at debug level and
/// otherwise ignored; the caller never waits.
pub fn spawn_default_output_playback<F>(render: F)
where
    F: FnOnce(u32) -> Vec<f32> + Send + 'static,
{
    let spawned = std::thread::Builder::new()
        .name("alert-playback".to_string())
        .spawn(move || {
            let host = cpal::default_host();
            let output = match OutputDevice::open_default(&host) {
                Ok(output) => output,
                Err(error) => {
                    log::debug!("Skipping alert playback: {error}");
                    return;
                }
            };

            let samples = render(output.sample_rate);
            log::debug!("Playing {} samples on {output}", samples.len());
            if let Err(error) = output.play_blocking(&samples) {
                log::debug!("Alert playback failed on {output}: {error}");
            }
        });

    if let Err(error) = spawned {
        log::debug!("Could not start the playback thread: {error}");
    }
}
