use std::str::FromStr;

use crate::error::RenderError;

/// Straight-alpha RGBA color with channels normalized to `[0, 1]`.
///
/// Accepted spellings when parsing:
/// - CSS-like names (`"red"`, `"cornflowerblue"`, ...)
/// - `#rgb`, `#rrggbb`, `#rrggbbaa`
///
/// Packed `0xRRGGBBAA` values go through [`Color::from_packed`].
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

const NAMED: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("green", [0, 255, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("cyan", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("gray", [190, 190, 190]),
    ("grey", [190, 190, 190]),
    ("darkgray", [169, 169, 169]),
    ("orange", [255, 165, 0]),
    ("purple", [160, 32, 240]),
    ("pink", [255, 192, 203]),
    ("brown", [165, 42, 42]),
    ("navy", [0, 0, 128]),
    ("teal", [0, 128, 128]),
    ("cornflowerblue", [100, 149, 237]),
];

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    /// `0xRRGGBBAA`.
    #[inline]
    pub fn from_packed(rgba: u32) -> Self {
        let [r, g, b, a] = rgba.to_be_bytes();
        Self::from_rgba8(r, g, b, a)
    }

    /// Looks up a named color (case-insensitive, spaces ignored). Opaque.
    pub fn named(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        if key == "transparent" {
            return Some(Self::TRANSPARENT);
        }
        NAMED
            .iter()
            .find(|(n, _)| *n == key)
            .map(|(_, [r, g, b])| Self::from_rgba8(*r, *g, *b, 255))
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let nibble = |i: usize| u8::from_str_radix(digits.get(i..i + 1)?, 16).ok();
        let byte = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();

        match digits.len() {
            3 => Some(Self::from_rgba8(
                nibble(0)? * 17,
                nibble(1)? * 17,
                nibble(2)? * 17,
                255,
            )),
            6 => Some(Self::from_rgba8(byte(0)?, byte(2)?, byte(4)?, 255)),
            8 => Some(Self::from_rgba8(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Decodes the sRGB transfer curve on the color channels. Alpha is kept.
    pub fn to_linear(self) -> Self {
        fn decode(c: f32) -> f32 {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        Self::new(decode(self.r), decode(self.g), decode(self.b), self.a)
    }

    #[inline]
    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: self.a as f64,
        }
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }
}

impl FromStr for Color {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parsed = if s.starts_with('#') {
            Self::from_hex(s)
        } else {
            Self::named(s)
        };
        parsed.ok_or_else(|| RenderError::ColorParse(s.to_string()))
    }
}

impl From<u32> for Color {
    #[inline]
    fn from(rgba: u32) -> Self {
        Self::from_packed(rgba)
    }
}

impl From<[f32; 4]> for Color {
    #[inline]
    fn from([r, g, b, a]: [f32; 4]) -> Self {
        Self::new(r, g, b, a)
    }
}
