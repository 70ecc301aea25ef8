use crate::foundation::error::{StoryreelError, StoryreelResult};

pub use kurbo::Rect;

/// Absolute 0-based frame index in output timeline space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32, // must be > 0
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> StoryreelResult<Self> {
        if den == 0 {
            return Err(StoryreelError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(StoryreelError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Duration of one frame as a [`std::time::Duration`].
    pub fn frame_interval(self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(self.frame_duration_secs())
    }

    /// Convert frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }

    /// Convert seconds to frame count using floor semantics.
    pub fn secs_to_frames_floor(self, secs: f64) -> u64 {
        (secs * self.as_f64()).floor().max(0.0) as u64
    }

    /// Convert seconds to frame count, rounding to the nearest frame.
    pub fn secs_to_frames_round(self, secs: f64) -> u64 {
        (secs * self.as_f64()).round().max(0.0) as u64
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 30, den: 1 }
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// 1080x1920 portrait frame used for short-form previews.
    pub const PORTRAIT_1080: Canvas = Canvas {
        width: 1080,
        height: 1920,
    };

    /// Validate that the canvas can be rasterized and encoded.
    ///
    /// Dimensions must be non-zero, fit the rasterizer's `u16` surfaces and be even (yuv420p).
    pub fn validate(self) -> StoryreelResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(StoryreelError::validation(
                "canvas width/height must be non-zero",
            ));
        }
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(StoryreelError::validation(
                "canvas width/height must fit in u16",
            ));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(StoryreelError::validation(
                "canvas width/height must be even",
            ));
        }
        Ok(())
    }

    /// Width over height.
    pub fn aspect(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Width as `f64`.
    pub fn width_f64(self) -> f64 {
        f64::from(self.width)
    }

    /// Height as `f64`.
    pub fn height_f64(self) -> f64 {
        f64::from(self.height)
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::PORTRAIT_1080
    }
}

/// Straight-alpha RGBA8 color, as written in configuration (`"#0f172a"`, `"#ffffffff"`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque black.
    pub const BLACK: Rgba8 = Rgba8::opaque(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Rgba8 = Rgba8::opaque(255, 255, 255);

    /// Fully opaque color.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`.
    pub fn parse_hex(s: &str) -> StoryreelResult<Self> {
        let hex = s.trim().trim_start_matches('#');
        let byte = |i: usize| -> StoryreelResult<u8> {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| StoryreelError::validation(format!("invalid hex color '{s}'")))
        };
        match hex.len() {
            6 if hex.is_ascii() => Ok(Self::opaque(byte(0)?, byte(2)?, byte(4)?)),
            8 if hex.is_ascii() => Ok(Self {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
                a: byte(6)?,
            }),
            _ => Err(StoryreelError::validation(format!(
                "invalid hex color '{s}' (expected #rrggbb or #rrggbbaa)"
            ))),
        }
    }

    /// Convert to a `vello_cpu` paint color.
    pub(crate) fn to_paint(self) -> vello_cpu::peniko::Color {
        vello_cpu::peniko::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

impl serde::Serialize for Rgba8 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!(
            "#{:02x}{:02x}{:02x}{:02x}",
            self.r, self.g, self.b, self.a
        ))
    }
}

impl<'de> serde::Deserialize<'de> for Rgba8 {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgba8::parse_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
