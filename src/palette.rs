use serde::Deserialize;

const GAMMA: f32 = 2.2;

/// Packed `0xAARRGGBB` color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Argb(pub u32);

impl Argb {
    pub const fn from_channels(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self((a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Accepts `#AARRGGBB` or `#RRGGBB` (opaque).
    pub fn parse(text: &str) -> Option<Self> {
        let hex = text.trim().strip_prefix('#')?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let value = u32::from_str_radix(hex, 16).ok()?;
        match hex.len() {
            8 => Some(Self(value)),
            6 => Some(Self(0xFF00_0000 | value)),
            _ => None,
        }
    }

    /// Gamma-correct interpolation: color channels are blended in linear
    /// space, alpha is blended as-is.
    pub fn lerp(self, end: Argb, fraction: f32) -> Argb {
        let t = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };

        let a = mix(unit(self.alpha()), unit(end.alpha()), t);
        let r = mix(linear(self.red()), linear(end.red()), t);
        let g = mix(linear(self.green()), linear(end.green()), t);
        let b = mix(linear(self.blue()), linear(end.blue()), t);

        Self::from_channels(
            to_channel(a),
            to_channel(encoded(r)),
            to_channel(encoded(g)),
            to_channel(encoded(b)),
        )
    }

    /// Multiplies the alpha channel, e.g. for the disabled look.
    pub fn with_alpha_scaled(self, factor: f32) -> Argb {
        let factor = if factor.is_nan() {
            1.0
        } else {
            factor.clamp(0.0, 1.0)
        };
        let alpha = to_channel(unit(self.alpha()) * factor);
        Self((self.0 & 0x00FF_FFFF) | (alpha as u32) << 24)
    }
}

impl TryFrom<String> for Argb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
            .ok_or_else(|| format!("invalid color `{value}`, expected #AARRGGBB or #RRGGBB"))
    }
}

/// Off/on track colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrackPalette {
    pub default: Argb,
    pub checked: Argb,
}

impl TrackPalette {
    pub fn color_at(&self, tint_fraction: f32) -> Argb {
        self.default.lerp(self.checked, tint_fraction)
    }
}

fn unit(channel: u8) -> f32 {
    channel as f32 / 255.0
}

fn linear(channel: u8) -> f32 {
    unit(channel).powf(GAMMA)
}

fn encoded(value: f32) -> f32 {
    value.max(0.0).powf(1.0 / GAMMA)
}

fn mix(start: f32, end: f32, t: f32) -> f32 {
    start + t * (end - start)
}

fn to_channel(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}
