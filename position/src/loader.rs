use tracing::debug;

use crate::engine::{RulesEngine, Shakmaty};
use crate::error::Result;
use crate::types::{Piece, Position, Square};

/// Holds the current position and whether any load has succeeded yet.
///
/// Each loader is independent; callers rendering concurrently should use one
/// loader (or renderer) per in-flight render.
#[derive(Debug, Clone, Default)]
pub struct PositionLoader<E = Shakmaty> {
    engine: E,
    position: Position,
    ready: bool,
}

impl PositionLoader<Shakmaty> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: RulesEngine> PositionLoader<E> {
    pub fn with_engine(engine: E) -> Self {
        Self {
            engine,
            position: Position::empty(),
            ready: false,
        }
    }

    /// Replace the position with the final board of a PGN game.
    ///
    /// On failure the previous position and ready flag are left untouched.
    pub fn load_pgn(&mut self, pgn: &str) -> Result<()> {
        let position = self.engine.parse_pgn(pgn)?;
        self.set(position, "PGN");
        Ok(())
    }

    /// Replace the position with the board described by a FEN string.
    ///
    /// On failure the previous position and ready flag are left untouched.
    pub fn load_fen(&mut self, fen: &str) -> Result<()> {
        let position = self.engine.parse_fen(fen)?;
        self.set(position, "FEN");
        Ok(())
    }

    /// Replace the position with a raw board array (row 0 = rank 8).
    ///
    /// Cells hold a single piece letter, uppercase for white. Empty strings,
    /// unknown codes and cells outside the 8x8 area are ignored. Never fails.
    pub fn load_array<R, S>(&mut self, rows: &[R])
    where
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut position = Position::empty();
        for (i, row) in rows.iter().take(8).enumerate() {
            for (j, cell) in row.as_ref().iter().take(8).enumerate() {
                let Some(piece) = Piece::from_code(cell.as_ref()) else {
                    continue;
                };
                if let Some(square) = Square::new(j as u8, 7 - i as u8) {
                    position.put(square, piece);
                }
            }
        }
        self.set(position, "array");
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    /// The position, but only after a successful load.
    pub fn ready_position(&self) -> Option<&Position> {
        self.ready.then_some(&self.position)
    }

    fn set(&mut self, position: Position, source: &str) {
        debug!(
            "loaded position from {source}: {} pieces",
            position.piece_count()
        );
        self.position = position;
        self.ready = true;
    }
}
