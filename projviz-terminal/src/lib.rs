//! Terminal playback of rendered projection frames

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use log::info;
use projviz_core::{Frame, FrameSink};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Forwards frames to an output sink and keeps a copy for the preview
pub struct PreviewSink<S: FrameSink> {
    inner: S,
    frames: Option<Vec<Frame>>,
}

impl<S: FrameSink> PreviewSink<S> {
    /// `keep` decides whether frames are retained for playback
    pub fn new(inner: S, keep: bool) -> Self {
        Self {
            inner,
            frames: keep.then(Vec::new),
        }
    }

    pub fn into_parts(self) -> (S, Vec<Frame>) {
        (self.inner, self.frames.unwrap_or_default())
    }
}

impl<S: FrameSink> FrameSink for PreviewSink<S> {
    fn consume(&mut self, index: usize, frame: &Frame) -> projviz_core::Result<()> {
        self.inner.consume(index, frame)?;
        if let Some(frames) = &mut self.frames {
            frames.push(frame.clone());
        }
        Ok(())
    }
}

/// Plays recorded frames in the terminal at a fixed frame rate
pub struct TerminalPreview {
    frames: Vec<Frame>,
    frame_rate: u32,
    renderer: AsciiRenderer,
    current: usize,
    running: bool,
    paused: bool,
}

impl TerminalPreview {
    pub fn new(frames: Vec<Frame>, frame_rate: u32) -> io::Result<Self> {
        let (width, height) = terminal::size()?;

        Ok(Self {
            frames,
            frame_rate: frame_rate.max(1),
            // Bottom row is reserved for the status line
            renderer: AsciiRenderer::new(width as usize, height.saturating_sub(1) as usize),
            current: 0,
            running: true,
            paused: false,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        info!("preview stopped at frame {}/{}", self.current, self.frames.len());
        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_secs_f64(1.0 / self.frame_rate as f64);

        while self.running && self.current < self.frames.len() {
            let frame_start = Instant::now();

            // Handle input
            if event::poll(Duration::from_millis(0))? {
                self.handle_input()?;
            }

            self.render()?;

            if !self.paused {
                self.current += 1;
            }

            // Frame timing
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }
        }

        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        if let Event::Key(KeyEvent { code, .. }) = event::read()? {
            match code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.running = false;
                }
                KeyCode::Char(' ') => {
                    self.paused = !self.paused;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn render(&mut self) -> io::Result<()> {
        let Some(frame) = self.frames.get(self.current) else {
            return Ok(());
        };
        self.renderer.render_frame(frame);

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;
        self.renderer.draw(&mut stdout)?;

        // Status line
        let seconds = self.current as f64 / self.frame_rate as f64;
        queue!(
            stdout,
            cursor::MoveTo(0, self.renderer.height() as u16),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "projviz preview | frame {}/{} | {:.2}s{} | SPACE=Pause Q=Quit",
                self.current + 1,
                self.frames.len(),
                seconds,
                if self.paused { " (paused)" } else { "" }
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use projviz_core::style::BLACK;
    use projviz_core::FrameRecorder;

    fn empty_frame() -> Frame {
        Frame {
            width: 16,
            height: 9,
            background: BLACK,
            items: Vec::new(),
        }
    }

    #[test_log::test]
    fn test_preview_sink_forwards_and_keeps() {
        let mut sink = PreviewSink::new(FrameRecorder::default(), true);
        sink.consume(0, &empty_frame()).unwrap();
        sink.consume(1, &empty_frame()).unwrap();
        let (recorder, kept) = sink.into_parts();
        assert_eq!(recorder.frames.len(), 2);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_preview_sink_without_preview_keeps_nothing() {
        let mut sink = PreviewSink::new(FrameRecorder::default(), false);
        sink.consume(0, &empty_frame()).unwrap();
        let (recorder, kept) = sink.into_parts();
        assert_eq!(recorder.frames.len(), 1);
        assert!(kept.is_empty());
    }
}
