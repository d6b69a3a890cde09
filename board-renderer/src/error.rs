use std::path::PathBuf;

use chess_position::NotationError;
use thiserror::Error;

/// Invalid construction options.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("board size must be between 1 and {max} pixels, got {size}")]
    InvalidSize { size: u32, max: u32 },

    #[error("could not parse color {0:?}")]
    InvalidColor(String),
}

/// Everything that can abandon a render.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    InvalidNotation(#[from] NotationError),

    #[error("no position loaded; load a PGN, FEN or board array first")]
    NotReady,

    #[error("asset not found: {}", path.display())]
    AssetNotFound { path: PathBuf },

    #[error("could not decode image {}: {source}", path.display())]
    AssetDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("could not load avatar {reference:?}: {reason}")]
    AvatarUnavailable { reference: String, reason: String },

    #[error("invalid font data")]
    Font(#[from] ab_glyph::InvalidFont),

    #[error("PNG encoding failed: {0}")]
    Encode(#[source] image::ImageError),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, RenderError>;
