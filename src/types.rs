//! Common codec parameter types

use crate::bindings::{
    OPUS_APPLICATION_AUDIO, OPUS_APPLICATION_RESTRICTED_LOWDELAY, OPUS_APPLICATION_VOIP, OPUS_AUTO,
    OPUS_BITRATE_MAX,
};
use crate::error::Error;

/// Encoder application mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Application {
    /// Optimize for conversational speech.
    #[default]
    Voip = OPUS_APPLICATION_VOIP as isize,
    /// Optimize for general audio/music.
    Audio = OPUS_APPLICATION_AUDIO as isize,
    /// Low-delay mode, reduced algorithmic delay.
    RestrictedLowDelay = OPUS_APPLICATION_RESTRICTED_LOWDELAY as isize,
}

impl Application {
    /// As `i32`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for Application {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            OPUS_APPLICATION_VOIP => Ok(Self::Voip),
            OPUS_APPLICATION_AUDIO => Ok(Self::Audio),
            OPUS_APPLICATION_RESTRICTED_LOWDELAY => Ok(Self::RestrictedLowDelay),
            other => Err(Error::InvalidApplication(other)),
        }
    }
}

/// Audio channel layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Channels {
    /// Single-channel audio.
    #[default]
    Mono = 1,
    /// Two-channel interleaved audio.
    Stereo = 2,
}

impl Channels {
    /// As `usize`.
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self as usize
    }

    /// As `i32`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for Channels {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Mono),
            2 => Ok(Self::Stereo),
            other => Err(Error::InvalidChannels(other)),
        }
    }
}

/// Supported input/output sample rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleRate {
    /// 8 kHz.
    Hz8000 = 8000,
    /// 12 kHz.
    Hz12000 = 12000,
    /// 16 kHz.
    Hz16000 = 16000,
    /// 24 kHz.
    Hz24000 = 24000,
    /// 48 kHz.
    #[default]
    Hz48000 = 48000,
}

impl SampleRate {
    /// As `i32`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for SampleRate {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            8000 => Ok(Self::Hz8000),
            12000 => Ok(Self::Hz12000),
            16000 => Ok(Self::Hz16000),
            24000 => Ok(Self::Hz24000),
            48000 => Ok(Self::Hz48000),
            other => Err(Error::InvalidSampleRate(other)),
        }
    }
}

/// Convenience frame sizes in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSize {
    /// 2.5 ms.
    Ms2_5 = 25,
    /// 5 ms.
    Ms5 = 50,
    /// 10 ms.
    Ms10 = 100,
    /// 20 ms.
    Ms20 = 200,
    /// 40 ms.
    Ms40 = 400,
    /// 60 ms.
    Ms60 = 600,
}

impl FrameSize {
    /// Number of samples per channel for this duration at `sample_rate`.
    #[must_use]
    pub const fn samples(self, sample_rate: SampleRate) -> usize {
        // FrameSize discriminants count 0.1 ms units, so divide by 10_000 to convert to seconds
        (self as usize * (sample_rate as usize)) / 10_000
    }
}

/// Bitrate control options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bitrate {
    /// Let the encoder choose.
    Auto,
    /// Maximum allowed.
    Max,
    /// Explicit bits-per-second.
    Custom(i32),
}

impl Bitrate {
    /// Interpret a raw libopus bitrate value.
    #[must_use]
    pub const fn from_raw(bps: i32) -> Self {
        match bps {
            OPUS_AUTO => Self::Auto,
            OPUS_BITRATE_MAX => Self::Max,
            _ => Self::Custom(bps),
        }
    }

    /// Convert to libopus `i32` value.
    #[must_use]
    pub const fn value(self) -> i32 {
        match self {
            Self::Auto => OPUS_AUTO,
            Self::Max => OPUS_BITRATE_MAX,
            Self::Custom(bps) => bps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_size_samples_are_correct() {
        assert_eq!(FrameSize::Ms20.samples(SampleRate::Hz48000), 960);
        assert_eq!(FrameSize::Ms5.samples(SampleRate::Hz16000), 80);
        assert_eq!(FrameSize::Ms2_5.samples(SampleRate::Hz8000), 20);
    }

    #[test]
    fn raw_parameters_are_validated() {
        assert_eq!(SampleRate::try_from(16_000), Ok(SampleRate::Hz16000));
        assert_eq!(
            SampleRate::try_from(44_100),
            Err(Error::InvalidSampleRate(44_100))
        );
        assert_eq!(Channels::try_from(2), Ok(Channels::Stereo));
        assert_eq!(Channels::try_from(0), Err(Error::InvalidChannels(0)));
        assert_eq!(Application::try_from(2049), Ok(Application::Audio));
        assert_eq!(Application::try_from(7), Err(Error::InvalidApplication(7)));
    }

    #[test]
    fn bitrate_sentinels_round_trip() {
        assert_eq!(Bitrate::from_raw(OPUS_AUTO), Bitrate::Auto);
        assert_eq!(Bitrate::from_raw(OPUS_BITRATE_MAX), Bitrate::Max);
        assert_eq!(Bitrate::from_raw(32_000), Bitrate::Custom(32_000));
        assert_eq!(Bitrate::Custom(32_000).value(), 32_000);
    }
}
