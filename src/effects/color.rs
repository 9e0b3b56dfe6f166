//! Color parsing and HSL math for particle painting.

use palette::{Hsl, IntoColor, Srgb};
use resvg::tiny_skia::Color;

use super::particle::ColorMode;

/// Parses `#rgb`, `#rrggbb` or `#rrggbbaa` (alpha is ignored).
pub fn parse_hex(value: &str) -> Option<Srgb<u8>> {
    let digits = value.trim().trim_start_matches('#');
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let digits = match digits.len() {
        8 => &digits[..6],
        3 | 6 => digits,
        _ => return None,
    };
    digits.parse::<Srgb<u8>>().ok()
}

/// Formats a color as `#rrggbb`.
pub fn to_hex(color: Srgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}

/// Converts an 8-bit sRGB color to an opaque paint color.
pub fn to_skia(color: Srgb<u8>) -> Color {
    Color::from_rgba8(color.red, color.green, color.blue, 255)
}

/// Opaque color for `hsl(hue, saturation%, lightness%)`.
pub fn hsl_color(hue: f32, saturation: f32, lightness: f32) -> Color {
    let hsl: Hsl = Hsl::new(
        hue.rem_euclid(360.0),
        (saturation / 100.0).clamp(0.0, 1.0),
        (lightness / 100.0).clamp(0.0, 1.0),
    );
    let rgb: Srgb = hsl.into_color();
    Color::from_rgba8(
        channel(rgb.red),
        channel(rgb.green),
        channel(rgb.blue),
        255,
    )
}

fn channel(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Hue of halo particle `index` of `count` at time `now` (ms).
pub fn rainbow_hue(now: f64, speed: f32, index: usize, count: usize) -> f32 {
    let base = now * speed as f64 * 0.1;
    let spread = if count == 0 {
        0.0
    } else {
        index as f64 * 360.0 / count as f64
    };
    (base + spread).rem_euclid(360.0) as f32
}

// ============================================================================
// ColorScheme
// ============================================================================

/// Resolved coloring options shared by the trail and the halo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScheme {
    pub mode: ColorMode,
    pub color: Srgb<u8>,
    pub glow: Srgb<u8>,
    /// Degrees per trail point, or hue drift rate for the halo.
    pub speed: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            mode: ColorMode::Fixed,
            color: Srgb::new(0xc8, 0xb8, 0x69),
            glow: Srgb::new(0xe8, 0xc0, 0x1e),
            speed: 3.0,
            saturation: 100.0,
            lightness: 65.0,
        }
    }
}

impl ColorScheme {
    pub fn is_rainbow(&self) -> bool {
        self.mode == ColorMode::Rainbow
    }

    /// Fill color for a trail particle carrying `hue`.
    pub fn particle_color(&self, hue: f32) -> Color {
        match self.mode {
            ColorMode::Fixed => to_skia(self.color),
            ColorMode::Rainbow => hsl_color(hue, self.saturation, self.lightness),
        }
    }

    /// Fill and glow colors for halo particle `index` of `count`.
    pub fn halo_colors(&self, now: f64, index: usize, count: usize) -> (Color, Color) {
        match self.mode {
            ColorMode::Fixed => (to_skia(self.color), to_skia(self.glow)),
            ColorMode::Rainbow => {
                let hue = rainbow_hue(now, self.speed, index, count);
                (
                    hsl_color(hue, self.saturation, self.lightness),
                    hsl_color(hue, self.saturation, (self.lightness + 10.0).min(100.0)),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba8(color: Color) -> [u8; 4] {
        let c = color.to_color_u8();
        [c.red(), c.green(), c.blue(), c.alpha()]
    }

    #[test]
    fn parses_hex_forms() {
        assert_eq!(parse_hex("#c8b869"), Some(Srgb::new(200, 184, 105)));
        assert_eq!(parse_hex("#e8c01eff"), Some(Srgb::new(232, 192, 30)));
        assert_eq!(parse_hex("#fff"), Some(Srgb::new(255, 255, 255)));
        assert_eq!(parse_hex("c8b869"), Some(Srgb::new(200, 184, 105)));
        assert_eq!(parse_hex("#zzzzzz"), None);
        assert_eq!(parse_hex("red"), None);
        assert_eq!(parse_hex(""), None);
        assert_eq!(to_hex(Srgb::new(200, 184, 105)), "#c8b869");
    }

    #[test]
    fn hsl_primaries() {
        assert_eq!(rgba8(hsl_color(0.0, 100.0, 50.0)), [255, 0, 0, 255]);
        assert_eq!(rgba8(hsl_color(120.0, 100.0, 50.0)), [0, 255, 0, 255]);
        assert_eq!(rgba8(hsl_color(480.0, 100.0, 50.0)), [0, 255, 0, 255]);
        assert_eq!(rgba8(hsl_color(200.0, 0.0, 100.0)), [255, 255, 255, 255]);
    }

    #[test]
    fn rainbow_hues_spread_evenly() {
        assert_eq!(rainbow_hue(0.0, 3.0, 0, 3), 0.0);
        assert_eq!(rainbow_hue(0.0, 3.0, 1, 3), 120.0);
        assert_eq!(rainbow_hue(0.0, 3.0, 2, 4), 180.0);
        // 1000 ms at speed 3 is 300 degrees.
        assert!((rainbow_hue(1000.0, 3.0, 1, 3) - 60.0).abs() < 1e-3);
        assert_eq!(rainbow_hue(0.0, 3.0, 0, 0), 0.0);
    }

    #[test]
    fn scheme_colors() {
        let fixed = ColorScheme::default();
        assert_eq!(rgba8(fixed.particle_color(123.0)), [200, 184, 105, 255]);
        let (fill, glow) = fixed.halo_colors(0.0, 0, 3);
        assert_eq!(rgba8(fill), [200, 184, 105, 255]);
        assert_eq!(rgba8(glow), [232, 192, 30, 255]);

        let rainbow = ColorScheme {
            mode: ColorMode::Rainbow,
            lightness: 50.0,
            ..ColorScheme::default()
        };
        assert_eq!(rgba8(rainbow.particle_color(0.0)), [255, 0, 0, 255]);
        let (fill, glow) = rainbow.halo_colors(0.0, 0, 1);
        assert_eq!(rgba8(fill), [255, 0, 0, 255]);
        // Glow is 10 points lighter.
        assert!(rgba8(glow)[1] > 0);
    }
}
