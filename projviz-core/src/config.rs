//! Render configuration: quality tiers and explicit overrides

use std::path::PathBuf;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VizError};

/// Output quality tier. Each tier implies a pixel size and frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    Low,
    #[default]
    Medium,
    High,
    Production,
    Fourk,
}

impl Quality {
    /// (pixel width, pixel height, frame rate)
    pub fn defaults(self) -> (u32, u32, u32) {
        match self {
            Quality::Low => (854, 480, 15),
            Quality::Medium => (1280, 720, 30),
            Quality::High => (1920, 1080, 60),
            Quality::Production => (2560, 1440, 60),
            Quality::Fourk => (3840, 2160, 60),
        }
    }
}

/// Options handed to the renderer before the scene is played
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub quality: Quality,
    /// Play the result back once rendering is done
    pub preview: bool,
    pub pixel_width: Option<u32>,
    pub pixel_height: Option<u32>,
    pub frame_rate: Option<u32>,
    /// Encode an mp4 alongside the SVG frames
    pub video: bool,
    pub output_dir: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            quality: Quality::default(),
            preview: false,
            pixel_width: None,
            pixel_height: None,
            frame_rate: None,
            video: true,
            output_dir: PathBuf::from("media"),
        }
    }
}

impl RenderConfig {
    /// Apply the quality tier's defaults to unset fields and validate the result.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let (width, height, fps) = self.quality.defaults();
        let resolved = ResolvedConfig {
            quality: self.quality,
            preview: self.preview,
            pixel_width: self.pixel_width.unwrap_or(width),
            pixel_height: self.pixel_height.unwrap_or(height),
            frame_rate: self.frame_rate.unwrap_or(fps),
            video: self.video,
            output_dir: self.output_dir.clone(),
        };

        if resolved.pixel_width == 0 || resolved.pixel_height == 0 {
            return Err(VizError::InvalidConfig(format!(
                "pixel size must be non-zero, got {}x{}",
                resolved.pixel_width, resolved.pixel_height
            )));
        }
        if resolved.frame_rate == 0 {
            return Err(VizError::InvalidConfig("frame rate must be non-zero".into()));
        }
        if resolved.video && (resolved.pixel_width % 2 == 1 || resolved.pixel_height % 2 == 1) {
            return Err(VizError::InvalidConfig(format!(
                "video needs even pixel dimensions, got {}x{}",
                resolved.pixel_width, resolved.pixel_height
            )));
        }
        if resolved.frame_rate > 120 {
            warn!(
                "frame rate {} is unusually high; expect a large frame sequence",
                resolved.frame_rate
            );
        }

        Ok(resolved)
    }
}

/// A validated configuration with every field known
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedConfig {
    pub quality: Quality,
    pub preview: bool,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub frame_rate: u32,
    pub video: bool,
    pub output_dir: PathBuf,
}

impl ResolvedConfig {
    /// Directory that receives a scene's frames, e.g. `media/frames/Scene/1080p30`
    pub fn frame_dir(&self, scene_name: &str) -> PathBuf {
        self.output_dir
            .join("frames")
            .join(scene_name)
            .join(self.resolution_dir())
    }

    /// Encoded video, e.g. `media/videos/Scene/1080p30/Scene.mp4`
    pub fn video_path(&self, scene_name: &str) -> PathBuf {
        self.output_dir
            .join("videos")
            .join(scene_name)
            .join(self.resolution_dir())
            .join(format!("{scene_name}.mp4"))
    }

    fn resolution_dir(&self) -> String {
        format!("{}p{}", self.pixel_height, self.frame_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_defaults_fill_unset_fields() {
        let config = RenderConfig {
            quality: Quality::Low,
            ..RenderConfig::default()
        };
        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.pixel_width, 854);
        assert_eq!(resolved.pixel_height, 480);
        assert_eq!(resolved.frame_rate, 15);
    }

    #[test]
    fn test_overrides_win_over_tier() {
        let config = RenderConfig {
            quality: Quality::Medium,
            preview: true,
            pixel_width: Some(1920),
            pixel_height: Some(1080),
            frame_rate: Some(30),
            video: true,
            output_dir: PathBuf::from("out"),
        };
        let resolved = config.resolve().unwrap();
        assert_eq!((resolved.pixel_width, resolved.pixel_height), (1920, 1080));
        assert_eq!(resolved.frame_rate, 30);
        assert!(resolved.preview);
        assert_eq!(
            resolved.frame_dir("CubeProjectionScene"),
            PathBuf::from("out/frames/CubeProjectionScene/1080p30")
        );
        assert_eq!(
            resolved.video_path("CubeProjectionScene"),
            PathBuf::from("out/videos/CubeProjectionScene/1080p30/CubeProjectionScene.mp4")
        );
    }

    #[test]
    fn test_odd_size_rejected_only_for_video() {
        let config = RenderConfig {
            pixel_width: Some(853),
            ..RenderConfig::default()
        };
        assert!(matches!(config.resolve(), Err(VizError::InvalidConfig(_))));

        let frames_only = RenderConfig {
            video: false,
            ..config
        };
        assert_eq!(frames_only.resolve().unwrap().pixel_width, 853);
    }

    #[test]
    fn test_zero_frame_rate_rejected() {
        let config = RenderConfig {
            frame_rate: Some(0),
            ..RenderConfig::default()
        };
        assert!(matches!(config.resolve(), Err(VizError::InvalidConfig(_))));
    }

    #[test]
    fn test_config_json_shape() {
        let json = serde_json::to_value(RenderConfig::default()).unwrap();
        assert_eq!(json["quality"], "medium");
        assert!(json["pixel_width"].is_null());
    }
}
