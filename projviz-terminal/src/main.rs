//! projviz - renders the cube-to-screen projection animation
//!
//! Frames are written as SVG under `media/frames/CubeProjectionScene/`,
//! with a `manifest.json` describing the sequence, and encoded through
//! ffmpeg to `media/videos/CubeProjectionScene/<height>p<fps>/`. When
//! preview is on the result is then played back in the terminal.
//!   - SPACE: pause / resume
//!   - Q/ESC: quit the preview

use anyhow::{Context, Result};
use log::info;
use projviz_core::{
    ProjectionVisualizer, Quality, RenderConfig, Scene, SvgSequenceWriter, VideoWriter,
    SCENE_NAME,
};
use projviz_terminal::{PreviewSink, TerminalPreview};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

fn render_config() -> RenderConfig {
    RenderConfig {
        quality: Quality::Medium,
        preview: true,
        pixel_width: Some(1920),
        pixel_height: Some(1080),
        frame_rate: Some(30),
        video: true,
        output_dir: PathBuf::from("media"),
    }
}

fn init_logging(output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    let log_path = output_dir.join("projviz.log");
    let log_file = File::create(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    // The preview owns the terminal, so logs go to a file.
    // Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let config = render_config()
        .resolve()
        .context("Invalid render configuration")?;
    init_logging(&config.output_dir)?;
    info!("Starting projviz with {config:?}");

    let frame_dir = config.frame_dir(SCENE_NAME);
    let writer = SvgSequenceWriter::create(&frame_dir)
        .with_context(|| format!("Failed to prepare {}", frame_dir.display()))?;
    let video = if config.video {
        let path = config.video_path(SCENE_NAME);
        let video = VideoWriter::create(&path, &config)
            .with_context(|| format!("Failed to start encoding {}", path.display()))?;
        Some(video)
    } else {
        None
    };
    let sink = PreviewSink::new((writer, video), config.preview);

    println!("Rendering {SCENE_NAME} to {}...", frame_dir.display());
    let mut scene = Scene::new(SCENE_NAME, config.clone(), sink);
    ProjectionVisualizer::new()
        .run(&mut scene)
        .context("Failed to render scene")?;

    let (sink, summary) = scene.finish();
    let ((writer, video), frames) = sink.into_parts();
    let video_path = video
        .map(VideoWriter::finish)
        .transpose()
        .context("Failed to encode video")?;
    let manifest = writer
        .finish(&config, &summary, video_path.as_deref())
        .context("Failed to write manifest")?;
    println!(
        "Wrote {} frames ({:.1}s) and {}",
        writer.written(),
        summary.duration_secs,
        manifest.display()
    );
    if let Some(path) = &video_path {
        println!("Video: {}", path.display());
    }

    if config.preview {
        let mut preview = TerminalPreview::new(frames, config.frame_rate)
            .context("Failed to open terminal preview")?;
        preview.run().context("Terminal preview failed")?;
    }

    Ok(())
}
