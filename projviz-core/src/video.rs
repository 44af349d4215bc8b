//! mp4 output: rasterized frames are piped as raw RGB into an ffmpeg child.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ChildStdin;

use ffmpeg_sidecar::child::FfmpegChild;
use ffmpeg_sidecar::command::{ffmpeg_is_installed, FfmpegCommand};
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use log::{debug, info, warn};

use crate::config::ResolvedConfig;
use crate::error::{Result, VizError};
use crate::raster::Rasterizer;
use crate::render::Frame;
use crate::scene::FrameSink;

pub struct VideoWriter {
    path: PathBuf,
    size: (u32, u32),
    rasterizer: Rasterizer,
    ffmpeg: FfmpegChild,
    /// `None` once the stream has been closed
    stdin: Option<ChildStdin>,
    written: usize,
}

impl VideoWriter {
    /// Whether an ffmpeg executable can be found
    pub fn available() -> bool {
        ffmpeg_is_installed()
    }

    /// Start encoding to `path` at the configured size and frame rate
    pub fn create(path: impl Into<PathBuf>, config: &ResolvedConfig) -> Result<Self> {
        let path = path.into();
        if !Self::available() {
            return Err(VizError::FfmpegNotInstalled);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| VizError::io(parent, e))?;
        }
        let rasterizer = Rasterizer::new()?;

        let size = format!("{}x{}", config.pixel_width, config.pixel_height);
        let rate = config.frame_rate.to_string();
        let mut command = FfmpegCommand::new();
        command
            .hide_banner()
            .args(["-loglevel", "error", "-nostats"])
            // Everything before `-i` describes the input stream
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24"])
            .args(["-s", size.as_str(), "-framerate", rate.as_str()])
            .input("-")
            .args(["-c:v", "libx264", "-pix_fmt", "yuv420p"])
            .overwrite()
            .output(path.to_string_lossy().as_ref());

        let mut ffmpeg = command.spawn().map_err(|e| VizError::io(&path, e))?;
        let stdin = ffmpeg.take_stdin().ok_or_else(|| VizError::Encode {
            path: path.clone(),
            message: "failed to get stdin handle".into(),
        })?;
        info!("encoding {} ({size} @ {rate} fps)", path.display());

        Ok(Self {
            path,
            size: (config.pixel_width, config.pixel_height),
            rasterizer,
            ffmpeg,
            stdin: Some(stdin),
            written: 0,
        })
    }

    /// Close the stream, wait for ffmpeg and return the video's path
    pub fn finish(mut self) -> Result<PathBuf> {
        drop(self.stdin.take());

        let mut errors = Vec::new();
        match self.ffmpeg.iter() {
            Ok(events) => {
                for event in events {
                    match event {
                        FfmpegEvent::Error(message)
                        | FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, message) => {
                            errors.push(message)
                        }
                        _ => {}
                    }
                }
            }
            Err(err) => warn!("no ffmpeg output to inspect: {err}"),
        }

        let status = self.ffmpeg.wait().map_err(|e| VizError::io(&self.path, e))?;
        if !status.success() {
            return Err(VizError::Encode {
                path: self.path.clone(),
                message: if errors.is_empty() {
                    format!("ffmpeg exited with {status}")
                } else {
                    errors.join("; ")
                },
            });
        }

        info!("wrote {} ({} frames)", self.path.display(), self.written);
        Ok(self.path.clone())
    }
}

impl FrameSink for VideoWriter {
    fn consume(&mut self, index: usize, frame: &Frame) -> Result<()> {
        if (frame.width, frame.height) != self.size {
            return Err(VizError::Encode {
                path: self.path.clone(),
                message: format!(
                    "frame {index} is {}x{}, stream is {}x{}",
                    frame.width, frame.height, self.size.0, self.size.1
                ),
            });
        }
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(VizError::Encode {
                path: self.path.clone(),
                message: "stream already closed".into(),
            });
        };

        let image = self.rasterizer.rasterize(frame);
        stdin
            .write_all(image.as_raw())
            .map_err(|e| VizError::io(&self.path, e))?;
        self.written += 1;
        debug!("frame {index} -> ffmpeg");
        Ok(())
    }
}

impl Drop for VideoWriter {
    fn drop(&mut self) {
        // Abandoned mid-stream: don't leave ffmpeg waiting on stdin
        if self.stdin.take().is_some() {
            self.ffmpeg.kill().ok();
            self.ffmpeg.wait().ok();
        }
    }
}
