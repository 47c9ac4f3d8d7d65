use crate::error::ColorParseError;
use crate::random::UniformSource;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A concrete 24-bit color. Serialized as a `#rrggbb` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Per-channel linear blend from `self` toward `other`.
    ///
    /// Each channel is truncated toward zero after scaling, so `fraction = 0`
    /// returns `self` exactly.
    pub fn lerp(self, other: Rgb, fraction: f64) -> Rgb {
        let channel = |a: u8, b: u8| -> u8 {
            let v = a as f64 + (b as f64 - a as f64) * fraction;
            v.clamp(0.0, 255.0) as u8
        };
        Rgb {
            r: channel(self.r, other.r),
            g: channel(self.g, other.g),
            b: channel(self.b, other.b),
        }
    }

    /// Convert HSV (all components in `[0, 1]`) to RGB, truncating each channel.
    pub fn from_hsv(h: f64, s: f64, v: f64) -> Rgb {
        let (r, g, b) = if s == 0.0 {
            (v, v, v)
        } else {
            let sector = (h * 6.0).floor();
            let f = h * 6.0 - sector;
            let p = v * (1.0 - s);
            let q = v * (1.0 - s * f);
            let t = v * (1.0 - s * (1.0 - f));
            match (sector as i64).rem_euclid(6) {
                0 => (v, t, p),
                1 => (q, v, p),
                2 => (p, v, t),
                3 => (p, q, v),
                4 => (t, p, v),
                _ => (v, p, q),
            }
        };
        let byte = |c: f64| (c * 255.0).clamp(0.0, 255.0) as u8;
        Rgb::new(byte(r), byte(g), byte(b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::MissingHash(s.to_string()))?;
        if hex.len() != 6 {
            return Err(ColorParseError::BadLength(s.to_string()));
        }
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::BadDigit(s.to_string()));
        }
        let byte = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| ColorParseError::BadDigit(s.to_string()))
        };
        Ok(Rgb::new(byte(0)?, byte(2)?, byte(4)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_string()
    }
}

/// Trunk color used by palette randomization (saddle brown).
pub const RANDOM_TRUNK: Rgb = Rgb::new(0x8b, 0x45, 0x13);

/// Generate a harmonious three-color leaf palette.
///
/// Hues step by 0.1 from a random base hue; saturation lands in `[0.6, 0.9)`
/// and value in `[0.5, 0.8)`.
pub fn random_palette<S: UniformSource + ?Sized>(rng: &mut S) -> Vec<Rgb> {
    let base_hue = rng.next_unit();
    (0..3)
        .map(|i| {
            let hue = (base_hue + i as f64 * 0.1) % 1.0;
            let saturation = 0.6 + rng.next_unit() * 0.3;
            let value = 0.5 + rng.next_unit() * 0.3;
            Rgb::from_hsv(hue, saturation, value)
        })
        .collect()
}
