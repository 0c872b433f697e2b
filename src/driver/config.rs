use std::num::NonZeroU32;

pub const DEFAULT_TICKS_PER_FRAME: NonZeroU32 = NonZeroU32::new(10).unwrap();
pub const DEFAULT_SCALE: NonZeroU32 = NonZeroU32::new(15).unwrap();
/// Largest accepted scale; keeps `64 * scale` well inside GPU texture limits.
pub const MAX_SCALE: u32 = 64;

/// Validated settings for the drive loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DriverConfig {
    /// Instructions executed per presented frame.
    pub ticks_per_frame: NonZeroU32,
    /// Surface pixels per display pixel.
    pub scale: NonZeroU32,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("ticks per frame must be at least 1")]
    ZeroTicksPerFrame,

    #[error("display scale must be at least 1")]
    ZeroScale,

    #[error("display scale {scale} is larger than the maximum of {max}")]
    ScaleTooLarge { scale: u32, max: u32 },
}

impl DriverConfig {
    pub fn new(ticks_per_frame: u32, scale: u32) -> Result<Self, ConfigError> {
        if scale > MAX_SCALE {
            return Err(ConfigError::ScaleTooLarge {
                scale,
                max: MAX_SCALE,
            });
        }

        Ok(Self {
            ticks_per_frame: NonZeroU32::new(ticks_per_frame)
                .ok_or(ConfigError::ZeroTicksPerFrame)?,
            scale: NonZeroU32::new(scale).ok_or(ConfigError::ZeroScale)?,
        })
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            ticks_per_frame: DEFAULT_TICKS_PER_FRAME,
            scale: DEFAULT_SCALE,
        }
    }
}
