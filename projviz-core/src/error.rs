//! Error type shared by the scene, renderer and output writers

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::scene::NodeId;

#[derive(Debug, Error)]
pub enum VizError {
    #[error("direction vector {0:?} has no dominant axis")]
    DegenerateDirection([f64; 3]),

    #[error("edge list over {points} points is not a single closed loop: {reason}")]
    OpenLoop { points: usize, reason: String },

    #[error("node {0:?} is not part of the scene")]
    UnknownNode(NodeId),

    #[error("invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to load label font: {0}")]
    Font(#[from] ab_glyph::InvalidFont),

    #[error("couldn't find an ffmpeg executable")]
    FfmpegNotInstalled,

    #[error("ffmpeg failed to encode {path}: {message}")]
    Encode { path: PathBuf, message: String },
}

impl VizError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, VizError>;
