pub mod engine;
mod error;
pub mod loader;
pub mod pgn;
pub mod types;

pub use engine::{RulesEngine, Shakmaty};
pub use error::*;
pub use loader::PositionLoader;
pub use types::{Color, Kind, Piece, Position, Square};

pub use shakmaty;
