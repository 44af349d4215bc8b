//! ASCII rasterizer for terminal preview of rendered frames

use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::Point2;
use projviz_core::render::{Frame, Primitive};
use projviz_core::style::Color as RgbColor;
use std::io::Write;

/// Character luminosity ramp for fill shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: f64 = 2.0;

/// ASCII renderer that converts frame draw lists to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    char_buffer: Vec<char>,
    color_buffer: Vec<RgbColor>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            char_buffer: vec![' '; size],
            color_buffer: vec![RgbColor::rgb(0, 0, 0); size],
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.char_buffer.fill(' ');
        self.color_buffer.fill(RgbColor::rgb(0, 0, 0));
    }

    /// Character at a cell, for inspection
    pub fn cell(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.char_buffer[y * self.width + x])
    }

    /// The buffer as text rows
    pub fn rows(&self) -> Vec<String> {
        self.char_buffer
            .chunks(self.width.max(1))
            .map(|row| row.iter().collect())
            .collect()
    }

    /// Rasterize a frame, scaled to fit the terminal while keeping its aspect
    pub fn render_frame(&mut self, frame: &Frame) {
        self.clear();
        if self.width == 0 || self.height == 0 {
            return;
        }

        let sx = self.width as f64 / frame.width as f64;
        let sy = self.height as f64 * CELL_ASPECT / frame.height as f64;
        let scale = sx.min(sy);
        let offset_x = (self.width as f64 - frame.width as f64 * scale) / 2.0;
        let offset_y = (self.height as f64 - frame.height as f64 * scale / CELL_ASPECT) / 2.0;
        let to_cell = |p: &Point2<f64>| {
            (
                p.x * scale + offset_x,
                p.y * scale / CELL_ASPECT + offset_y,
            )
        };

        // Items arrive back to front, so later writes simply overwrite
        for item in &frame.items {
            match &item.primitive {
                Primitive::Polygon {
                    points,
                    fill,
                    fill_opacity,
                    stroke,
                } => {
                    let cells: Vec<(f64, f64)> = points.iter().map(to_cell).collect();
                    if *fill_opacity > 0.0 {
                        let character = shade(fill.luminance() * fill_opacity);
                        for i in 1..cells.len().saturating_sub(1) {
                            self.rasterize_triangle(
                                &[cells[0], cells[i], cells[i + 1]],
                                character,
                                *fill,
                            );
                        }
                    }
                    if let Some(stroke) = stroke {
                        for i in 0..cells.len() {
                            let next = cells[(i + 1) % cells.len()];
                            self.draw_line(cells[i], next, '#', stroke.color, false);
                        }
                    }
                }
                Primitive::Segment { from, to, stroke } => {
                    let glyph = if stroke.width >= 3.0 { '#' } else { '*' };
                    self.draw_line(
                        to_cell(from),
                        to_cell(to),
                        glyph,
                        stroke.color,
                        stroke.dash.is_some(),
                    );
                }
                Primitive::Disc {
                    center,
                    radius,
                    color,
                    opacity,
                } => {
                    if *opacity > 0.0 {
                        self.draw_disc(to_cell(center), radius * scale, *color);
                    }
                }
                Primitive::Text {
                    position,
                    text,
                    color,
                    ..
                } => {
                    let (x, y) = to_cell(position);
                    let start = x - text.chars().count() as f64 / 2.0;
                    self.draw_text(start, y, text, *color);
                }
            }
        }
    }

    fn put(&mut self, x: i64, y: i64, character: char, color: RgbColor) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        self.char_buffer[idx] = character;
        self.color_buffer[idx] = color;
    }

    fn rasterize_triangle(&mut self, coords: &[(f64, f64); 3], character: char, color: RgbColor) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box, clipped to screen bounds
        let min_x = (v0.0.min(v1.0).min(v2.0).floor() as i64).max(0);
        let max_x = (v0.0.max(v1.0).max(v2.0).ceil() as i64).min(self.width as i64 - 1);
        let min_y = (v0.1.min(v1.1).min(v2.1).floor() as i64).max(0);
        let max_y = (v0.1.max(v1.1).max(v2.1).ceil() as i64).min(self.height as i64 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = (x as f64 + 0.5, y as f64 + 0.5);
                if let Some((w0, w1, w2)) = barycentric(v0, v1, v2, p) {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        self.put(x, y, character, color);
                    }
                }
            }
        }
    }

    fn draw_line(
        &mut self,
        from: (f64, f64),
        to: (f64, f64),
        glyph: char,
        color: RgbColor,
        dashed: bool,
    ) {
        // Bresenham between the endpoint cells
        let (mut x, mut y) = (from.0.floor() as i64, from.1.floor() as i64);
        let (x1, y1) = (to.0.floor() as i64, to.1.floor() as i64);
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let mut step = 0usize;
        loop {
            if !(dashed && (step / 2) % 2 == 1) {
                self.put(x, y, glyph, color);
            }
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
            step += 1;
        }
    }

    fn draw_disc(&mut self, center: (f64, f64), radius: f64, color: RgbColor) {
        let r = radius.max(0.5);
        let (cx, cy) = center;
        let ry = r / CELL_ASPECT;
        for y in (cy - ry).floor() as i64..=(cy + ry).ceil() as i64 {
            for x in (cx - r).floor() as i64..=(cx + r).ceil() as i64 {
                let nx = (x as f64 + 0.5 - cx) / r;
                let ny = (y as f64 + 0.5 - cy) / ry.max(0.5);
                if nx * nx + ny * ny <= 1.0 {
                    self.put(x, y, 'o', color);
                }
            }
        }
        self.put(cx.floor() as i64, cy.floor() as i64, 'o', color);
    }

    fn draw_text(&mut self, x: f64, y: f64, text: &str, color: RgbColor) {
        let row = y.floor() as i64;
        for (i, c) in text.chars().enumerate() {
            self.put(x.floor() as i64 + i as i64, row, c, color);
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                let c = self.char_buffer[idx];
                let RgbColor { r, g, b } = self.color_buffer[idx];

                writer.queue(SetForegroundColor(Color::Rgb { r, g, b }))?;
                writer.queue(Print(c))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Map a brightness in [0, 1] to a ramp character
fn shade(brightness: f64) -> char {
    let index = (brightness.clamp(0.0, 1.0) * (LUMINOSITY_RAMP.len() - 1) as f64) as usize;
    // Keep faint fills visible
    LUMINOSITY_RAMP[index.clamp(1, LUMINOSITY_RAMP.len() - 1)]
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f64, f64),
    v1: (f64, f64),
    v2: (f64, f64),
    p: (f64, f64),
) -> Option<(f64, f64, f64)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-9 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
