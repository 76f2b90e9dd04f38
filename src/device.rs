//! CPAL device discovery and the live backend.
//!
//! # Example: pick devices by hand
//!
//! ```no_run
//! use ringmod::{CpalDevice, RingMod, RingModConfig};
//!
//! for device in CpalDevice::list_inputs() {
//!     println!("{} ({} Hz, {} ch)", device.name(), device.sample_rate(), device.channels());
//! }
//!
//! let input = CpalDevice::default_input().ok_or(ringmod::Error::NoInputDevice)?;
//! let output = CpalDevice::default_output().ok_or(ringmod::Error::NoOutputDevice)?;
//! let fx = RingMod::from_devices(&RingModConfig::default(), &input, &output)?;
//! # Ok::<(), ringmod::Error>(())
//! ```

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig, SupportedStreamConfig};
use rtrb::Producer;
use tracing::{debug, error, info, warn};

use crate::backend::Backend;
use crate::config::RingModConfig;
use crate::context::Renderer;
use crate::error::{Error, Result};
use crate::nodes::CarrierInput;
use crate::ringmod::RingMod;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Input,
    Output,
}

/// A discovered audio device, with its default stream configuration.
///
/// Use [`default_input`](Self::default_input) / [`default_output`](Self::default_output)
/// for the system defaults, or the `list_*` functions to enumerate.
pub struct CpalDevice {
    device: cpal::Device,
    config: SupportedStreamConfig,
    name: String,
    sample_rate: u32,
    channels: u16,
}

impl CpalDevice {
    fn new(device: cpal::Device, direction: Direction) -> Option<Self> {
        let config = match direction {
            Direction::Input => device.default_input_config().ok()?,
            Direction::Output => device.default_output_config().ok()?,
        };
        let name = device.name().unwrap_or_else(|_| "Unknown".into());

        Some(Self {
            sample_rate: config.sample_rate().0,
            channels: config.channels(),
            name,
            device,
            config,
        })
    }

    /// The system's default capture device, if any.
    pub fn default_input() -> Option<Self> {
        let device = cpal::default_host().default_input_device()?;
        Self::new(device, Direction::Input)
    }

    /// The system's default playback device, if any.
    pub fn default_output() -> Option<Self> {
        let device = cpal::default_host().default_output_device()?;
        Self::new(device, Direction::Output)
    }

    /// Every capture device that reports a usable default config.
    ///
    /// Returns an empty list if enumeration fails.
    pub fn list_inputs() -> Vec<Self> {
        cpal::default_host()
            .input_devices()
            .map(|devices| devices.filter_map(|d| Self::new(d, Direction::Input)).collect())
            .unwrap_or_default()
    }

    /// Every playback device that reports a usable default config.
    pub fn list_outputs() -> Vec<Self> {
        cpal::default_host()
            .output_devices()
            .map(|devices| devices.filter_map(|d| Self::new(d, Direction::Output)).collect())
            .unwrap_or_default()
    }

    pub fn input_by_name(name: &str) -> Option<Self> {
        Self::list_inputs().into_iter().find(|d| d.name == name)
    }

    pub fn output_by_name(name: &str) -> Option<Self> {
        Self::list_outputs().into_iter().find(|d| d.name == name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Default sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// A capture config running at `sample_rate`, which may differ from this
    /// device's default.
    fn capture_config(&self, sample_rate: u32) -> Result<SupportedStreamConfig> {
        if self.sample_rate == sample_rate {
            return Ok(self.config.clone());
        }

        let ranges = self
            .device
            .supported_input_configs()
            .map_err(|e| Error::Capture(e.to_string()))?;

        ranges
            .filter(|r| r.min_sample_rate().0 <= sample_rate && sample_rate <= r.max_sample_rate().0)
            .max_by_key(|r| r.sample_format() == SampleFormat::F32)
            .map(|r| r.with_sample_rate(cpal::SampleRate(sample_rate)))
            .ok_or_else(|| {
                Error::UnsupportedConfig(format!("{} cannot capture at {} Hz", self.name, sample_rate))
            })
    }

    /// Open a paused capture stream that pushes channel 0 into `carrier`.
    fn open_capture(&self, sample_rate: u32, carrier: Producer<f32>) -> Result<Stream> {
        let supported = self.capture_config(sample_rate)?;
        let config = supported.config();

        let stream = match supported.sample_format() {
            SampleFormat::F32 => build_capture::<f32>(&self.device, &config, carrier),
            SampleFormat::I16 => build_capture::<i16>(&self.device, &config, carrier),
            SampleFormat::U16 => build_capture::<u16>(&self.device, &config, carrier),
            other => {
                return Err(Error::UnsupportedConfig(format!("capture sample format {other:?}")))
            }
        }
        .map_err(|e| Error::Capture(e.to_string()))?;

        pause_after_build(&stream, "capture");
        debug!(device = %self.name, sample_rate, channels = config.channels, "capture stream open");
        Ok(stream)
    }

    /// Open a paused playback stream pulling from `renderer`.
    fn open_playback(&self, renderer: Renderer) -> Result<Stream> {
        let config = self.config.config();

        let stream = match self.config.sample_format() {
            SampleFormat::F32 => build_playback::<f32>(&self.device, &config, renderer),
            SampleFormat::I16 => build_playback::<i16>(&self.device, &config, renderer),
            SampleFormat::U16 => build_playback::<u16>(&self.device, &config, renderer),
            other => {
                return Err(Error::UnsupportedConfig(format!("playback sample format {other:?}")))
            }
        }
        .map_err(|e| Error::DeviceUnavailable(e.to_string()))?;

        pause_after_build(&stream, "playback");
        debug!(device = %self.name, sample_rate = self.sample_rate, channels = config.channels, "playback stream open");
        Ok(stream)
    }
}

// Some hosts start streams as soon as they're built.
fn pause_after_build(stream: &Stream, which: &'static str) {
    if let Err(e) = stream.pause() {
        warn!(error = %e, stream = which, "stream could not be paused after opening");
    }
}

fn build_capture<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    mut carrier: Producer<f32>,
) -> core::result::Result<Stream, cpal::BuildStreamError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = (config.channels as usize).max(1);

    device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            for frame in data.chunks(channels) {
                // ring full: drop the newest sample rather than block
                let _ = carrier.push(f32::from_sample(frame[0]));
            }
        },
        |err| error!(error = %err, "capture stream error"),
        None,
    )
}

fn build_playback<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    mut renderer: Renderer,
) -> core::result::Result<Stream, cpal::BuildStreamError>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;

    device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            renderer.render_with(data, channels, T::EQUILIBRIUM, |s| T::from_sample(s));
        },
        |err| error!(error = %err, "playback stream error"),
        None,
    )
}

/// Live capture and playback through CPAL.
///
/// Both streams are opened paused. Suspending pauses capture before playback,
/// resuming starts playback before capture; if the second half of either
/// transition fails the first half is rolled back.
pub struct CpalBackend {
    input: Stream,
    output: Stream,
}

impl CpalBackend {
    /// Open `input` at `output`'s sample rate, feeding `carrier`, and open
    /// `output` pulling from `renderer`.
    pub fn open(
        input: &CpalDevice,
        output: &CpalDevice,
        carrier: Producer<f32>,
        renderer: Renderer,
    ) -> Result<Self> {
        let input_stream = input.open_capture(renderer.sample_rate(), carrier)?;
        let output_stream = output.open_playback(renderer)?;

        info!(input = input.name(), output = output.name(), "audio devices open");
        Ok(Self { input: input_stream, output: output_stream })
    }
}

impl Backend for CpalBackend {
    fn suspend(&mut self) -> Result<()> {
        self.input.pause().map_err(unavailable)?;

        if let Err(e) = self.output.pause() {
            if let Err(e) = self.input.play() {
                warn!(error = %e, "capture could not be restarted");
            }
            return Err(unavailable(e));
        }
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        self.output.play().map_err(unavailable)?;

        if let Err(e) = self.input.play() {
            if let Err(e) = self.output.pause() {
                warn!(error = %e, "playback could not be paused again");
            }
            return Err(unavailable(e));
        }
        Ok(())
    }
}

// Any stream that refuses a transition counts as the device going away,
// whichever half of the pair it was.
fn unavailable(e: impl core::fmt::Display) -> Error {
    Error::DeviceUnavailable(e.to_string())
}

impl RingMod<CpalBackend> {
    /// Open the configured devices (system defaults unless
    /// [`RingModConfig::input_device`]/[`RingModConfig::output_device`] name
    /// others) and build the effect on them.
    pub fn from_default_devices(config: &RingModConfig) -> Result<Self> {
        let output = match &config.output_device {
            Some(name) => CpalDevice::output_by_name(name),
            None => CpalDevice::default_output(),
        }
        .ok_or(Error::NoOutputDevice)?;

        let input = match &config.input_device {
            Some(name) => CpalDevice::input_by_name(name),
            None => CpalDevice::default_input(),
        }
        .ok_or(Error::NoInputDevice)?;

        Self::from_devices(config, &input, &output)
    }

    /// Build the effect on explicit devices. The graph runs at `output`'s
    /// sample rate and the capture is opened at the same rate.
    pub fn from_devices(config: &RingModConfig, input: &CpalDevice, output: &CpalDevice) -> Result<Self> {
        config.validate()?;
        let (producer, carrier) = CarrierInput::channel(config.carrier_buffer);
        Self::with_backend(config, carrier, output.sample_rate(), |renderer| {
            CpalBackend::open(input, output, producer, renderer)
        })
    }
}
