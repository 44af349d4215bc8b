//! Software rasterizer turning a [`Frame`] into RGB pixels for the encoder.
//!
//! Fills are scanline-filled at pixel centers, strokes and discs get a
//! one-pixel coverage ramp at their edges, and labels are drawn from the
//! bundled Ubuntu Light outlines.

use ab_glyph::{point, Font, FontRef, PxScale, ScaleFont};
use image::{Rgb, RgbImage};
use nalgebra::{Point2, Vector2};

use crate::error::Result;
use crate::render::{Frame, Primitive, Stroke};
use crate::style::Color;

pub struct Rasterizer {
    font: FontRef<'static>,
}

impl Rasterizer {
    pub fn new() -> Result<Self> {
        let font = FontRef::try_from_slice(epaint_default_fonts::UBUNTU_LIGHT)?;
        Ok(Self { font })
    }

    /// Paint `frame` back to front onto a fresh image
    pub fn rasterize(&self, frame: &Frame) -> RgbImage {
        let bg = frame.background;
        let mut image = RgbImage::from_pixel(frame.width, frame.height, Rgb([bg.r, bg.g, bg.b]));

        for item in &frame.items {
            match &item.primitive {
                Primitive::Polygon {
                    points,
                    fill,
                    fill_opacity,
                    stroke,
                } => {
                    if *fill_opacity > 0.0 {
                        fill_polygon(&mut image, points, *fill, *fill_opacity);
                    }
                    if let Some(stroke) = stroke {
                        for i in 0..points.len() {
                            let next = &points[(i + 1) % points.len()];
                            stroke_segment(&mut image, &points[i], next, stroke);
                        }
                    }
                }
                Primitive::Segment { from, to, stroke } => {
                    stroke_segment(&mut image, from, to, stroke);
                }
                Primitive::Disc {
                    center,
                    radius,
                    color,
                    opacity,
                } => fill_disc(&mut image, center, *radius, *color, *opacity),
                Primitive::Text {
                    position,
                    text,
                    size,
                    color,
                } => self.text(&mut image, position, text, *size, *color),
            }
        }

        image
    }

    /// Centered horizontally on `position`, which sits on the baseline
    fn text(&self, image: &mut RgbImage, position: &Point2<f64>, text: &str, size: f64, color: Color) {
        if text.is_empty() || size <= 0.0 {
            return;
        }
        let scaled = self.font.as_scaled(PxScale::from(size as f32));
        let width: f32 = text
            .chars()
            .map(|c| scaled.h_advance(scaled.glyph_id(c)))
            .sum();

        let mut caret = point(position.x as f32 - width / 2.0, position.y as f32);
        for c in text.chars() {
            let mut glyph = scaled.scaled_glyph(c);
            glyph.position = caret;
            caret.x += scaled.h_advance(glyph.id);

            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|x, y, coverage| {
                    blend(
                        image,
                        bounds.min.x as i64 + x as i64,
                        bounds.min.y as i64 + y as i64,
                        color,
                        coverage as f64,
                    );
                });
            }
        }
    }
}

fn blend(image: &mut RgbImage, x: i64, y: i64, color: Color, alpha: f64) {
    if x < 0 || y < 0 || x >= image.width() as i64 || y >= image.height() as i64 {
        return;
    }
    let alpha = alpha.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }
    let Rgb(pixel) = image.get_pixel_mut(x as u32, y as u32);
    for (channel, value) in pixel.iter_mut().zip([color.r, color.g, color.b]) {
        let mixed = *channel as f64 * (1.0 - alpha) + value as f64 * alpha;
        *channel = mixed.round() as u8;
    }
}

/// Even-odd scanline fill sampled at pixel centers
fn fill_polygon(image: &mut RgbImage, points: &[Point2<f64>], color: Color, opacity: f64) {
    if points.len() < 3 {
        return;
    }
    let (min_y, max_y) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.y), hi.max(p.y))
        });
    let first_row = min_y.floor().max(0.0) as i64;
    let last_row = max_y.ceil().min(image.height() as f64) as i64;

    let mut crossings = Vec::with_capacity(points.len());
    for row in first_row..last_row {
        let yc = row as f64 + 0.5;
        crossings.clear();
        for i in 0..points.len() {
            let a = points[i];
            let b = points[(i + 1) % points.len()];
            if (a.y <= yc && yc < b.y) || (b.y <= yc && yc < a.y) {
                crossings.push(a.x + (yc - a.y) / (b.y - a.y) * (b.x - a.x));
            }
        }
        crossings.sort_by(f64::total_cmp);

        for span in crossings.chunks_exact(2) {
            let start = (span[0] - 0.5).ceil() as i64;
            let end = (span[1] - 0.5).floor() as i64;
            for x in start..=end {
                blend(image, x, row, color, opacity);
            }
        }
    }
}

fn stroke_segment(image: &mut RgbImage, from: &Point2<f64>, to: &Point2<f64>, stroke: &Stroke) {
    let half = stroke.width / 2.0;
    let direction: Vector2<f64> = to - from;
    let length = direction.norm();

    let reach = half + 1.0;
    let x0 = (from.x.min(to.x) - reach).floor() as i64;
    let x1 = (from.x.max(to.x) + reach).ceil() as i64;
    let y0 = (from.y.min(to.y) - reach).floor() as i64;
    let y1 = (from.y.max(to.y) + reach).ceil() as i64;

    for y in y0.max(0)..=y1.min(image.height() as i64 - 1) {
        for x in x0.max(0)..=x1.min(image.width() as i64 - 1) {
            let sample = Point2::new(x as f64 + 0.5, y as f64 + 0.5);
            let along = if length > 0.0 {
                ((sample - from).dot(&direction) / length).clamp(0.0, length)
            } else {
                0.0
            };
            if let Some(dash) = stroke.dash {
                if dash > 0.0 && (along / dash) as usize % 2 == 1 {
                    continue;
                }
            }
            let nearest = if length > 0.0 {
                from + direction * (along / length)
            } else {
                *from
            };
            let distance = (sample - nearest).norm();
            blend(image, x, y, stroke.color, half + 0.5 - distance);
        }
    }
}

fn fill_disc(image: &mut RgbImage, center: &Point2<f64>, radius: f64, color: Color, opacity: f64) {
    let reach = radius + 1.0;
    for y in (center.y - reach).floor() as i64..=(center.y + reach).ceil() as i64 {
        for x in (center.x - reach).floor() as i64..=(center.x + reach).ceil() as i64 {
            let sample = Point2::new(x as f64 + 0.5, y as f64 + 0.5);
            let coverage = (radius + 0.5 - (sample - center).norm()).clamp(0.0, 1.0);
            blend(image, x, y, color, coverage * opacity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::DrawItem;
    use crate::style::{BLACK, BLUE, RED, WHITE, YELLOW};

    fn frame(items: Vec<Primitive>) -> Frame {
        Frame {
            width: 100,
            height: 60,
            background: BLACK,
            items: items
                .into_iter()
                .map(|primitive| DrawItem {
                    depth: 0.0,
                    primitive,
                })
                .collect(),
        }
    }

    fn rgb(color: Color) -> Rgb<u8> {
        Rgb([color.r, color.g, color.b])
    }

    #[test]
    fn test_background_fills_every_pixel() {
        let image = Rasterizer::new().unwrap().rasterize(&frame(vec![]));
        assert_eq!(image.dimensions(), (100, 60));
        assert!(image.pixels().all(|p| *p == rgb(BLACK)));
        assert_eq!(image.as_raw().len(), 100 * 60 * 3);
    }

    #[test]
    fn test_polygon_fill_blends_with_opacity() {
        let square = vec![
            Point2::new(10.0, 10.0),
            Point2::new(30.0, 10.0),
            Point2::new(30.0, 30.0),
            Point2::new(10.0, 30.0),
        ];
        let image = Rasterizer::new().unwrap().rasterize(&frame(vec![Primitive::Polygon {
            points: square,
            fill: WHITE,
            fill_opacity: 0.5,
            stroke: None,
        }]));
        assert_eq!(*image.get_pixel(20, 20), Rgb([128, 128, 128]));
        assert_eq!(*image.get_pixel(10, 10), Rgb([128, 128, 128]));
        assert_eq!(*image.get_pixel(30, 20), rgb(BLACK));
        assert_eq!(*image.get_pixel(5, 20), rgb(BLACK));
    }

    #[test]
    fn test_dashed_stroke_leaves_gaps() {
        let image = Rasterizer::new().unwrap().rasterize(&frame(vec![Primitive::Segment {
            from: Point2::new(0.0, 20.5),
            to: Point2::new(100.0, 20.5),
            stroke: Stroke {
                color: YELLOW,
                width: 2.0,
                dash: Some(10.0),
            },
        }]));
        assert_eq!(*image.get_pixel(5, 20), rgb(YELLOW));
        assert_eq!(*image.get_pixel(15, 20), rgb(BLACK));
        assert_eq!(*image.get_pixel(25, 20), rgb(YELLOW));
        assert_eq!(*image.get_pixel(5, 30), rgb(BLACK));
    }

    #[test]
    fn test_disc_and_later_items_paint_over() {
        let image = Rasterizer::new().unwrap().rasterize(&frame(vec![
            Primitive::Disc {
                center: Point2::new(50.0, 30.0),
                radius: 6.0,
                color: BLUE,
                opacity: 1.0,
            },
            Primitive::Disc {
                center: Point2::new(50.0, 30.0),
                radius: 2.0,
                color: RED,
                opacity: 1.0,
            },
        ]));
        assert_eq!(*image.get_pixel(50, 30), rgb(RED));
        assert_eq!(*image.get_pixel(54, 30), rgb(BLUE));
        assert_eq!(*image.get_pixel(50, 40), rgb(BLACK));
    }

    #[test]
    fn test_text_is_drawn_around_its_anchor() {
        let image = Rasterizer::new().unwrap().rasterize(&frame(vec![Primitive::Text {
            position: Point2::new(50.0, 40.0),
            text: "Screen".into(),
            size: 20.0,
            color: WHITE,
        }]));
        let lit: Vec<(u32, u32)> = image
            .enumerate_pixels()
            .filter(|(_, _, p)| **p != rgb(BLACK))
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!lit.is_empty());
        assert!(lit.iter().any(|&(x, _)| x < 50) && lit.iter().any(|&(x, _)| x > 50));
        assert!(lit.iter().all(|&(_, y)| (25..=45).contains(&y)));
    }
}
