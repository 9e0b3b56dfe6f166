//! Vector paths for particle shapes, painted with tiny-skia.
//!
//! All shapes are centered on the particle position and scale with the
//! particle size `s`:
//!
//! - star: the 8-point outline in [`STAR_POINTS`], scaled by `s`
//! - bubble: a circle of radius `4s` with a small white highlight
//! - heart: two cubic curves spanning `3s`
//! - flower: five elliptical petals rotating with age, plus a pale center
//! - flame: two nested teardrops colored by normalized age

use std::f32::consts::TAU;

use resvg::tiny_skia::{
    Color, FillRule, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Rect, Transform,
};

use super::color::hsl_color;
use super::particle::ShapeStyle;

/// Outline of the star shape at size 1.
pub const STAR_POINTS: [(f32, f32); 8] = [
    (0.0, -4.0),
    (1.0, -1.0),
    (4.0, 0.0),
    (1.0, 1.0),
    (0.0, 4.0),
    (-1.0, 1.0),
    (-4.0, 0.0),
    (-1.0, -1.0),
];

/// Side of the scratch surface halo glows are painted into.
pub const GLOW_SURFACE: u32 = 64;

const GLOW_OFFSETS: [(f32, f32); 4] = [(-2.0, 0.0), (2.0, 0.0), (0.0, -2.0), (0.0, 2.0)];
const HIGHLIGHT_ALPHA: f32 = 0.4;
const FLOWER_CENTER_ALPHA: f32 = 0.7;
const FLOWER_SPIN: f64 = 0.003;

// ============================================================================
// Paths
// ============================================================================

pub fn star_path(x: f32, y: f32, s: f32) -> Option<Path> {
    let mut pb = PathBuilder::new();
    let (first, rest) = STAR_POINTS.split_first()?;
    pb.move_to(x + first.0 * s, y + first.1 * s);
    for (px, py) in rest {
        pb.line_to(x + px * s, y + py * s);
    }
    pb.close();
    pb.finish()
}

pub fn heart_path(x: f32, y: f32, s: f32) -> Option<Path> {
    let h = s * 3.0;
    let mut pb = PathBuilder::new();
    pb.move_to(x, y + h * 0.3);
    pb.cubic_to(x - h, y - h * 0.6, x - h * 0.5, y - h * 1.2, x, y - h * 0.5);
    pb.cubic_to(x + h * 0.5, y - h * 1.2, x + h, y - h * 0.6, x, y + h * 0.3);
    pb.close();
    pb.finish()
}

/// One teardrop pointing up, `height` tall and `width` wide at its widest.
fn teardrop_path(x: f32, y: f32, width: f32, height: f32) -> Option<Path> {
    let (w, h) = (width, height);
    let mut pb = PathBuilder::new();
    pb.move_to(x, y - h * 0.5);
    pb.cubic_to(x + w, y - h * 0.15, x + w * 0.5, y + h * 0.4, x, y + h * 0.5);
    pb.cubic_to(x - w * 0.5, y + h * 0.4, x - w, y - h * 0.15, x, y - h * 0.5);
    pb.close();
    pb.finish()
}

/// Outer and inner flame layers.
pub fn flame_paths(x: f32, y: f32, s: f32) -> Option<(Path, Path)> {
    let (fw, fh) = (s * 2.0, s * 4.0);
    let outer = teardrop_path(x, y, fw, fh)?;
    let inner = teardrop_path(x, y, fw * 0.4, fh * 0.6)?;
    Some((outer, inner))
}

/// The five petals of a flower rotated by `rotation` radians.
pub fn flower_petals(x: f32, y: f32, s: f32, rotation: f32) -> Vec<Path> {
    let (length, width) = (s * 3.0, s * 1.2);
    let Some(oval) = Rect::from_xywh(-width, -length, width * 2.0, length)
        .and_then(PathBuilder::from_oval)
    else {
        return Vec::new();
    };
    (0..5)
        .filter_map(|petal| {
            let angle = rotation + petal as f32 / 5.0 * TAU;
            let transform = Transform::from_rotate(angle.to_degrees()).post_translate(x, y);
            oval.clone().transform(transform)
        })
        .collect()
}

// ============================================================================
// Painting
// ============================================================================

fn fill(pixmap: &mut Pixmap, path: &Path, color: Color, alpha: f32) {
    let mut color = color;
    color.apply_opacity(alpha);
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    pixmap.fill_path(path, &paint, FillRule::Winding, Transform::identity(), None);
}

fn fill_circle(pixmap: &mut Pixmap, x: f32, y: f32, r: f32, color: Color, alpha: f32) {
    if let Some(path) = PathBuilder::from_circle(x, y, r) {
        fill(pixmap, &path, color, alpha);
    }
}

/// Everything needed to paint one particle.
#[derive(Debug, Clone, Copy)]
pub struct ParticleSprite {
    pub style: ShapeStyle,
    pub x: f32,
    pub y: f32,
    /// Size after scaling.
    pub size: f32,
    /// Age in ms; drives flower rotation.
    pub age: f64,
    /// Age over lifetime; drives flame coloring.
    pub progress: f32,
    pub alpha: f32,
    pub color: Color,
}

impl ParticleSprite {
    pub fn paint(&self, pixmap: &mut Pixmap) {
        if self.alpha <= 0.0 || self.size <= 0.0 {
            return;
        }
        let (x, y, s) = (self.x, self.y, self.size);
        match self.style {
            ShapeStyle::Bubble => {
                fill_circle(pixmap, x, y, s * 4.0, self.color, self.alpha);
                fill_circle(
                    pixmap,
                    x - s * 1.2,
                    y - s * 1.2,
                    s * 1.2,
                    Color::WHITE,
                    self.alpha * HIGHLIGHT_ALPHA,
                );
            }
            ShapeStyle::Heart => {
                if let Some(path) = heart_path(x, y, s) {
                    fill(pixmap, &path, self.color, self.alpha);
                }
            }
            ShapeStyle::Flower => {
                let rotation = (self.age * FLOWER_SPIN) as f32;
                for petal in flower_petals(x, y, s, rotation) {
                    fill(pixmap, &petal, self.color, self.alpha);
                }
                let center = Color::from_rgba8(0xff, 0xf8, 0xdc, 0xff);
                fill_circle(pixmap, x, y, s, center, self.alpha * FLOWER_CENTER_ALPHA);
            }
            ShapeStyle::Flame => {
                let t = self.progress.clamp(0.0, 1.0);
                let hue = 60.0 - t * 60.0;
                let lightness = 65.0 - t * 30.0;
                if let Some((outer, inner)) = flame_paths(x, y, s) {
                    fill(pixmap, &outer, hsl_color(hue, 100.0, lightness), self.alpha);
                    let core = hsl_color((hue + 15.0).min(60.0), 100.0, (lightness + 15.0).min(85.0));
                    fill(pixmap, &inner, core, self.alpha);
                }
            }
            ShapeStyle::Star | ShapeStyle::Random => {
                if let Some(path) = star_path(x, y, s) {
                    fill(pixmap, &path, self.color, self.alpha);
                }
            }
        }
    }
}

/// Paints the soft glow drawn under a halo particle.
///
/// The glow is rendered into `scratch` (cleared first) around its center and
/// then composited onto `target` centered at `(x, y)` with `opacity`.
pub fn paint_glow(
    target: &mut Pixmap,
    scratch: &mut Pixmap,
    x: f32,
    y: f32,
    s: f32,
    color: Color,
    opacity: f32,
) {
    if opacity <= 0.0 || s <= 0.0 {
        return;
    }
    scratch.fill(Color::TRANSPARENT);
    let cx = scratch.width() as f32 / 2.0;
    let cy = scratch.height() as f32 / 2.0;
    for (ox, oy) in GLOW_OFFSETS {
        fill_circle(scratch, cx + ox * s, cy + oy * s, s * 3.0, color, 1.0);
    }

    let paint = PixmapPaint {
        opacity,
        ..PixmapPaint::default()
    };
    target.draw_pixmap(
        (x - cx).round() as i32,
        (y - cy).round() as i32,
        scratch.as_ref(),
        &paint,
        Transform::identity(),
        None,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha_at(pixmap: &Pixmap, x: u32, y: u32) -> u8 {
        pixmap.pixel(x, y).map_or(0, |p| p.alpha())
    }

    fn sprite(style: ShapeStyle) -> ParticleSprite {
        ParticleSprite {
            style,
            x: 32.0,
            y: 32.0,
            size: 3.0,
            age: 0.0,
            progress: 0.0,
            alpha: 1.0,
            color: Color::from_rgba8(200, 184, 105, 255),
        }
    }

    #[test]
    fn every_style_paints_its_center() {
        for style in ShapeStyle::CONCRETE {
            let mut pixmap = Pixmap::new(64, 64).unwrap();
            sprite(style).paint(&mut pixmap);
            assert!(alpha_at(&pixmap, 32, 32) > 0, "{style} left its center empty");
            assert_eq!(alpha_at(&pixmap, 0, 0), 0, "{style} spilled into the corner");
        }
    }

    #[test]
    fn transparent_sprite_paints_nothing() {
        let mut pixmap = Pixmap::new(64, 64).unwrap();
        ParticleSprite {
            alpha: 0.0,
            ..sprite(ShapeStyle::Bubble)
        }
        .paint(&mut pixmap);
        assert!(pixmap.data().iter().all(|b| *b == 0));
    }

    #[test]
    fn star_path_spans_four_sizes() {
        let path = star_path(10.0, 10.0, 2.0).unwrap();
        let bounds = path.bounds();
        assert_eq!(bounds.left(), 2.0);
        assert_eq!(bounds.right(), 18.0);
        assert_eq!(bounds.top(), 2.0);
        assert_eq!(bounds.bottom(), 18.0);
    }

    #[test]
    fn flower_has_five_petals() {
        assert_eq!(flower_petals(0.0, 0.0, 1.0, 0.5).len(), 5);
    }

    #[test]
    fn alpha_scales_paint() {
        let mut faint = Pixmap::new(64, 64).unwrap();
        let mut solid = Pixmap::new(64, 64).unwrap();
        ParticleSprite {
            alpha: 0.25,
            ..sprite(ShapeStyle::Star)
        }
        .paint(&mut faint);
        sprite(ShapeStyle::Star).paint(&mut solid);
        assert!(alpha_at(&faint, 32, 32) < alpha_at(&solid, 32, 32));
    }

    #[test]
    fn glow_is_composited_faintly() {
        let mut target = Pixmap::new(100, 100).unwrap();
        let mut scratch = Pixmap::new(GLOW_SURFACE, GLOW_SURFACE).unwrap();
        paint_glow(&mut target, &mut scratch, 50.0, 50.0, 2.0, Color::WHITE, 0.1);

        let center = alpha_at(&target, 50, 50);
        assert!(center > 0 && center < 64);
        assert_eq!(alpha_at(&target, 0, 0), 0);
    }
}
