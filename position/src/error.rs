use thiserror::Error;

/// Errors raised while turning chess notation into a [`crate::Position`].
#[derive(Debug, Error)]
pub enum NotationError {
    #[error("FEN could not be read: {reason} (input: {fen:?})")]
    InvalidFen { fen: String, reason: String },

    #[error("PGN could not be read at ply {ply} ({token:?}): {reason}")]
    InvalidPgn {
        ply: usize,
        token: String,
        reason: String,
    },

    #[error("PGN could not be read: unterminated {what}")]
    UnterminatedPgn { what: &'static str },
}

pub type Result<T> = std::result::Result<T, NotationError>;
