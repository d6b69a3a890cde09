pub mod assets;
pub mod config;
pub mod drawing;
mod error;
pub mod geometry;
pub mod renderer;

pub use assets::{CachedImageSource, FsImageSource, ImageRef, ImageSource};
pub use config::{AvatarFallback, BoardOptions, RendererConfig};
pub use error::*;
pub use geometry::{CANVAS_SIZE, Layout};
pub use renderer::{BoardRenderer, PlayerInfo};

pub use chess_position;
