//! Effect configuration.

use alloc::format;
use alloc::string::String;

use crate::error::{Error, Result};

/// Adaptive processing a capture device might apply to the carrier.
///
/// Ring modulation needs the raw signal, so every flag must stay `false`.
/// The struct exists so a host that mirrors a platform's capture options can
/// pass them through and have a mistake rejected instead of silently honored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CaptureConstraints {
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain_control: bool,
}

impl CaptureConstraints {
    /// No processing at all.
    pub const RAW: Self = Self {
        echo_cancellation: false,
        noise_suppression: false,
        auto_gain_control: false,
    };

    /// `Ok` only for a raw capture.
    pub fn validate(&self) -> Result<()> {
        if self.echo_cancellation {
            return Err(Error::CaptureProcessing("echo cancellation"));
        }
        if self.noise_suppression {
            return Err(Error::CaptureProcessing("noise suppression"));
        }
        if self.auto_gain_control {
            return Err(Error::CaptureProcessing("automatic gain control"));
        }
        Ok(())
    }
}

/// Initial values, input ranges and buffer sizes for [`RingMod`](crate::RingMod).
///
/// # Example
///
/// ```
/// use ringmod::RingModConfig;
///
/// let config = RingModConfig::default()
///     .with_rate_hz(8.0)
///     .with_depth(1.0)
///     .with_output_db(-6.0);
/// assert_eq!(config.rate_hz, 8.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RingModConfig {
    /// Initial modulator rate in Hz
    pub rate_hz: f32,
    /// Initial modulation depth, 0.0 (silent) to 1.0 (full)
    pub depth: f32,
    /// Initial output level in dBFS
    pub output_db: f32,
    /// Rate updates are clamped to `[0, max_rate_hz]`
    pub max_rate_hz: f32,
    /// Lowest accepted output level
    pub min_output_db: f32,
    /// Highest accepted output level
    pub max_output_db: f32,
    /// Capacity of each node's message queue
    pub queue_size: usize,
    /// Capacity of the capture ring buffer, in samples
    pub carrier_buffer: usize,
    /// Processing requested from the capture device (must be raw)
    pub capture: CaptureConstraints,
    /// Capture device name; `None` for the system default
    pub input_device: Option<String>,
    /// Playback device name; `None` for the system default
    pub output_device: Option<String>,
    /// Sample rate for offline rendering; devices use their own rate
    pub sample_rate: Option<u32>,
}

impl Default for RingModConfig {
    fn default() -> Self {
        Self {
            rate_hz: 5.0,
            depth: 0.0,
            output_db: 0.0,
            max_rate_hz: 100.0,
            min_output_db: -60.0,
            max_output_db: 0.0,
            queue_size: 64,
            carrier_buffer: 8192,
            capture: CaptureConstraints::RAW,
            input_device: None,
            output_device: None,
            sample_rate: None,
        }
    }
}

impl RingModConfig {
    /// Fallback rate for offline rendering.
    pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

    pub fn with_rate_hz(mut self, hz: f32) -> Self {
        self.rate_hz = hz;
        self
    }

    pub fn with_depth(mut self, depth: f32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_output_db(mut self, db: f32) -> Self {
        self.output_db = db;
        self
    }

    pub fn with_max_rate_hz(mut self, hz: f32) -> Self {
        self.max_rate_hz = hz;
        self
    }

    pub fn with_output_range(mut self, min_db: f32, max_db: f32) -> Self {
        self.min_output_db = min_db;
        self.max_output_db = max_db;
        self
    }

    pub fn with_queue_size(mut self, size: usize) -> Self {
        self.queue_size = size;
        self
    }

    pub fn with_carrier_buffer(mut self, samples: usize) -> Self {
        self.carrier_buffer = samples;
        self
    }

    pub fn with_capture(mut self, capture: CaptureConstraints) -> Self {
        self.capture = capture;
        self
    }

    pub fn with_input_device(mut self, name: impl Into<String>) -> Self {
        self.input_device = Some(name.into());
        self
    }

    pub fn with_output_device(mut self, name: impl Into<String>) -> Self {
        self.output_device = Some(name.into());
        self
    }

    pub fn with_sample_rate(mut self, rate: u32) -> Self {
        self.sample_rate = Some(rate);
        self
    }

    /// Sample rate used when no device dictates one.
    pub fn offline_sample_rate(&self) -> u32 {
        self.sample_rate.unwrap_or(Self::DEFAULT_SAMPLE_RATE)
    }

    /// Check the ranges and buffer sizes, then the capture constraints.
    ///
    /// Initial values don't need to be in range; they are clamped like any
    /// other update.
    pub fn validate(&self) -> Result<()> {
        if !(self.max_rate_hz.is_finite() && self.max_rate_hz >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "max_rate_hz must be finite and non-negative, got {}",
                self.max_rate_hz
            )));
        }
        // also rejects NaN on either side
        if !(self.min_output_db <= self.max_output_db) {
            return Err(Error::InvalidConfig(format!(
                "output range is empty: {} dBFS to {} dBFS",
                self.min_output_db, self.max_output_db
            )));
        }
        if self.carrier_buffer == 0 {
            return Err(Error::InvalidConfig("carrier_buffer must hold at least one sample".into()));
        }
        self.capture.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_resting_state() {
        let config = RingModConfig::default();
        assert_eq!(config.rate_hz, 5.0);
        assert_eq!(config.depth, 0.0);
        assert_eq!(config.output_db, 0.0);
        assert_eq!(config.capture, CaptureConstraints::RAW);
        assert_eq!(config.offline_sample_rate(), 48_000);
    }

    #[test]
    fn raw_capture_only() {
        assert!(CaptureConstraints::RAW.validate().is_ok());

        let aec = CaptureConstraints { echo_cancellation: true, ..CaptureConstraints::RAW };
        assert!(matches!(aec.validate(), Err(Error::CaptureProcessing("echo cancellation"))));

        let agc = CaptureConstraints { auto_gain_control: true, ..CaptureConstraints::RAW };
        assert!(matches!(agc.validate(), Err(Error::CaptureProcessing("automatic gain control"))));
    }

    #[test]
    fn ranges_must_be_ordered() {
        assert!(RingModConfig::default().validate().is_ok());

        let inverted = RingModConfig::default().with_output_range(0.0, -60.0);
        assert!(matches!(inverted.validate(), Err(Error::InvalidConfig(_))));

        let nan = RingModConfig::default().with_output_range(f32::NAN, 0.0);
        assert!(matches!(nan.validate(), Err(Error::InvalidConfig(_))));

        let negative = RingModConfig::default().with_max_rate_hz(-1.0);
        assert!(matches!(negative.validate(), Err(Error::InvalidConfig(_))));

        let empty = RingModConfig::default().with_carrier_buffer(0);
        assert!(matches!(empty.validate(), Err(Error::InvalidConfig(_))));

        let processed = RingModConfig::default()
            .with_capture(CaptureConstraints { noise_suppression: true, ..CaptureConstraints::RAW });
        assert!(matches!(processed.validate(), Err(Error::CaptureProcessing(_))));
    }

    #[test]
    fn builder_sets_fields() {
        let config = RingModConfig::default()
            .with_output_range(-40.0, 6.0)
            .with_input_device("USB Mic")
            .with_sample_rate(44_100);
        assert_eq!(config.min_output_db, -40.0);
        assert_eq!(config.max_output_db, 6.0);
        assert_eq!(config.input_device.as_deref(), Some("USB Mic"));
        assert_eq!(config.offline_sample_rate(), 44_100);
    }
}
