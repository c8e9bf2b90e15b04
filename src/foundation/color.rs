use image::Rgb;
use serde::{Deserialize, Serialize};

/// An opaque 8-bit sRGB color as written in project files.
///
/// Accepted forms: `"#rrggbb"`, `"#rgb"`, `[r, g, b]` and `{"r": .., "g": .., "b": ..}`, with
/// channels in `0..=255`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorDef {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl ColorDef {
    /// Pure white, the default scene background.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Pure black, the default ink color.
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// Build a color from channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert to an `image` pixel.
    pub fn to_rgb8(self) -> Rgb<u8> {
        Rgb([self.r, self.g, self.b])
    }

    /// Format as `#rrggbb`, the form SVG documents expect.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Default for ColorDef {
    fn default() -> Self {
        Self::BLACK
    }
}

impl<'de> Deserialize<'de> for ColorDef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            Obj { r: f64, g: f64, b: f64 },
            Arr(Vec<f64>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => parse_hex(&s).map_err(serde::de::Error::custom),
            Repr::Obj { r, g, b } => channels(&[r, g, b]).map_err(serde::de::Error::custom),
            Repr::Arr(v) => {
                if v.len() == 3 {
                    channels(&v).map_err(serde::de::Error::custom)
                } else {
                    Err(serde::de::Error::custom("rgb array must have len 3 ([r,g,b])"))
                }
            }
        }
    }
}

fn channels(v: &[f64]) -> Result<ColorDef, String> {
    fn to_u8(x: f64) -> Result<u8, String> {
        if !x.is_finite() || !(0.0..=255.0).contains(&x) {
            return Err(format!("color channel {x} is outside 0..=255"));
        }
        Ok(x.round() as u8)
    }
    Ok(ColorDef::rgb(to_u8(v[0])?, to_u8(v[1])?, to_u8(v[2])?))
}

fn parse_hex(s: &str) -> Result<ColorDef, String> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);

    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    if !s.is_ascii() {
        return Err("hex color must be #RRGGBB or #RGB".to_owned());
    }

    match s.len() {
        6 => Ok(ColorDef::rgb(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
        )),
        3 => {
            let nib = |i: usize| hex_byte(&s[i..i + 1]).map(|v| v * 17);
            Ok(ColorDef::rgb(nib(0)?, nib(1)?, nib(2)?))
        }
        _ => Err("hex color must be #RRGGBB or #RGB (case-insensitive)".to_owned()),
    }
}
