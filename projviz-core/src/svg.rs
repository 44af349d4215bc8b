//! SVG output: one file per frame plus a JSON manifest

use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Serialize;

use crate::config::ResolvedConfig;
use crate::error::{Result, VizError};
use crate::render::{Frame, Primitive, Stroke};
use crate::scene::{FrameSink, RenderSummary};

pub const MANIFEST_NAME: &str = "manifest.json";

/// File name of frame `index`
pub fn frame_file_name(index: usize) -> String {
    format!("frame_{index:05}.svg")
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn stroke_attrs(stroke: &Stroke) -> String {
    let mut attrs = format!(
        "stroke=\"{}\" stroke-width=\"{:.2}\" stroke-linecap=\"round\"",
        stroke.color.to_hex(),
        stroke.width
    );
    if let Some(dash) = stroke.dash {
        let _ = write!(attrs, " stroke-dasharray=\"{dash:.2} {dash:.2}\"");
    }
    attrs
}

/// Serialize a frame as a standalone SVG document
pub fn frame_to_svg(frame: &Frame) -> String {
    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n\
         <rect width=\"100%\" height=\"100%\" fill=\"{bg}\"/>\n",
        w = frame.width,
        h = frame.height,
        bg = frame.background.to_hex()
    );

    for item in &frame.items {
        match &item.primitive {
            Primitive::Polygon {
                points,
                fill,
                fill_opacity,
                stroke,
            } => {
                let points = points
                    .iter()
                    .map(|p| format!("{:.1},{:.1}", p.x, p.y))
                    .collect::<Vec<_>>()
                    .join(" ");
                let stroke = stroke
                    .as_ref()
                    .map(stroke_attrs)
                    .unwrap_or_else(|| "stroke=\"none\"".to_string());
                let _ = writeln!(
                    svg,
                    "<polygon points=\"{points}\" fill=\"{}\" fill-opacity=\"{fill_opacity:.3}\" {stroke}/>",
                    fill.to_hex()
                );
            }
            Primitive::Segment { from, to, stroke } => {
                let _ = writeln!(
                    svg,
                    "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" {}/>",
                    from.x,
                    from.y,
                    to.x,
                    to.y,
                    stroke_attrs(stroke)
                );
            }
            Primitive::Disc {
                center,
                radius,
                color,
                opacity,
            } => {
                let _ = writeln!(
                    svg,
                    "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"{radius:.2}\" fill=\"{}\" fill-opacity=\"{opacity:.3}\"/>",
                    center.x,
                    center.y,
                    color.to_hex()
                );
            }
            Primitive::Text {
                position,
                text,
                size,
                color,
            } => {
                if text.is_empty() {
                    continue;
                }
                let _ = writeln!(
                    svg,
                    "<text x=\"{:.1}\" y=\"{:.1}\" font-family=\"sans-serif\" font-size=\"{size:.1}\" fill=\"{}\" text-anchor=\"middle\">{}</text>",
                    position.x,
                    position.y,
                    color.to_hex(),
                    escape(text)
                );
            }
        }
    }

    svg.push_str("</svg>\n");
    svg
}

/// Describes the frame directory and the encoded video, if any
#[derive(Debug, Serialize)]
pub struct Manifest<'a> {
    pub config: &'a ResolvedConfig,
    pub frame_pattern: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<&'a Path>,
    #[serde(flatten)]
    pub summary: &'a RenderSummary,
}

/// Writes each consumed frame to `<dir>/frame_NNNNN.svg`
#[derive(Debug)]
pub struct SvgSequenceWriter {
    dir: PathBuf,
    written: usize,
}

impl SvgSequenceWriter {
    /// Create (or reuse) `dir`
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| VizError::io(&dir, e))?;
        info!("writing frames to {}", dir.display());
        Ok(Self { dir, written: 0 })
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Write `manifest.json` next to the frames and return its path
    pub fn finish(
        &self,
        config: &ResolvedConfig,
        summary: &RenderSummary,
        video: Option<&Path>,
    ) -> Result<PathBuf> {
        let path = self.dir.join(MANIFEST_NAME);
        let file = File::create(&path).map_err(|e| VizError::io(&path, e))?;
        let manifest = Manifest {
            config,
            frame_pattern: "frame_%05d.svg",
            video,
            summary,
        };
        serde_json::to_writer_pretty(BufWriter::new(file), &manifest)?;
        info!(
            "wrote {} ({} frames, {:.2}s)",
            path.display(),
            summary.frame_count,
            summary.duration_secs
        );
        Ok(path)
    }
}

impl FrameSink for SvgSequenceWriter {
    fn consume(&mut self, index: usize, frame: &Frame) -> Result<()> {
        let path = self.dir.join(frame_file_name(index));
        fs::write(&path, frame_to_svg(frame)).map_err(|e| VizError::io(&path, e))?;
        self.written += 1;
        debug!("frame {index} -> {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::DrawItem;
    use crate::style::{BLACK, GREEN, YELLOW};
    use nalgebra::Point2;

    fn frame() -> Frame {
        Frame {
            width: 320,
            height: 180,
            background: BLACK,
            items: vec![
                DrawItem {
                    depth: -1.0,
                    primitive: Primitive::Segment {
                        from: Point2::new(10.0, 10.0),
                        to: Point2::new(100.0, 50.0),
                        stroke: Stroke {
                            color: YELLOW,
                            width: 2.0,
                            dash: Some(3.0),
                        },
                    },
                },
                DrawItem {
                    depth: 0.0,
                    primitive: Primitive::Disc {
                        center: Point2::new(50.0, 50.0),
                        radius: 4.0,
                        color: GREEN,
                        opacity: 1.0,
                    },
                },
                DrawItem {
                    depth: 1.0,
                    primitive: Primitive::Text {
                        position: Point2::new(160.0, 20.0),
                        text: "A & <B>".into(),
                        size: 12.0,
                        color: GREEN,
                    },
                },
            ],
        }
    }

    #[test]
    fn test_svg_contains_primitives() {
        let svg = frame_to_svg(&frame());
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("width=\"320\" height=\"180\""));
        assert!(svg.contains("stroke-dasharray=\"3.00 3.00\""));
        assert!(svg.contains("<circle cx=\"50.0\" cy=\"50.0\""));
        assert!(svg.contains("A &amp; &lt;B&gt;"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_frame_file_names_sort() {
        assert_eq!(frame_file_name(7), "frame_00007.svg");
        assert!(frame_file_name(99) < frame_file_name(100));
    }
}
