//! Compiled-in codec parameters for key-addressed sessions.

use crate::types::{Application, Bitrate, Channels, FrameSize, SampleRate};

/// Fixed parameter set every keyed session is created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProfile {
    /// Input/output sample rate.
    pub sample_rate: SampleRate,
    /// Channel layout.
    pub channels: Channels,
    /// Encoder application profile.
    pub application: Application,
    /// Encoder target bitrate.
    pub bitrate: Bitrate,
    /// Nominal frame duration the host is expected to feed.
    pub frame_size: FrameSize,
}

impl SessionProfile {
    /// 16 kHz mono speech.
    pub const VOICE_WIDEBAND: Self = Self {
        sample_rate: SampleRate::Hz16000,
        channels: Channels::Mono,
        application: Application::Voip,
        bitrate: Bitrate::Custom(24_000),
        frame_size: FrameSize::Ms20,
    };

    /// 48 kHz mono speech.
    pub const VOICE_FULLBAND: Self = Self {
        sample_rate: SampleRate::Hz48000,
        channels: Channels::Mono,
        application: Application::Voip,
        bitrate: Bitrate::Custom(32_000),
        frame_size: FrameSize::Ms20,
    };

    /// 48 kHz stereo music.
    pub const MUSIC_STEREO: Self = Self {
        sample_rate: SampleRate::Hz48000,
        channels: Channels::Stereo,
        application: Application::Audio,
        bitrate: Bitrate::Custom(64_000),
        frame_size: FrameSize::Ms20,
    };

    /// Interleaved samples in one nominal frame.
    #[must_use]
    pub const fn frame_samples(&self) -> usize {
        self.frame_size.samples(self.sample_rate) * self.channels.as_usize()
    }
}

impl Default for SessionProfile {
    fn default() -> Self {
        Self::VOICE_FULLBAND
    }
}

/// What `init_*` does when the key already names a live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Fail with [`crate::Error::SessionKeyInUse`].
    Reject,
    /// Create the new instance, swap it in, then destroy the old one.
    #[default]
    Replace,
}

/// Bridge-wide configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BridgeConfig {
    /// Parameters for keyed sessions.
    pub profile: SessionProfile,
    /// Key collision handling for keyed sessions.
    pub collision: CollisionPolicy,
}

impl BridgeConfig {
    /// Use `profile` for keyed sessions.
    #[must_use]
    pub const fn with_profile(mut self, profile: SessionProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Use `collision` for keyed sessions.
    #[must_use]
    pub const fn with_collision(mut self, collision: CollisionPolicy) -> Self {
        self.collision = collision;
        self
    }
}
