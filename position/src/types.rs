use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Algebraic file letters, indexed by file number (a = 0).
pub const FILES: &str = "abcdefgh";

/// Side a piece belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// Single-letter prefix used by sprite names (`w` / `b`).
    pub fn letter(self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }
}

impl From<shakmaty::Color> for Color {
    fn from(c: shakmaty::Color) -> Self {
        match c {
            shakmaty::Color::White => Color::White,
            shakmaty::Color::Black => Color::Black,
        }
    }
}

/// Piece type, independent of color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Kind {
    pub const ALL: [Kind; 6] = [
        Kind::Pawn,
        Kind::Knight,
        Kind::Bishop,
        Kind::Rook,
        Kind::Queen,
        Kind::King,
    ];

    /// Lowercase letter for this kind (`p n b r q k`).
    pub fn letter(self) -> char {
        match self {
            Kind::Pawn => 'p',
            Kind::Knight => 'n',
            Kind::Bishop => 'b',
            Kind::Rook => 'r',
            Kind::Queen => 'q',
            Kind::King => 'k',
        }
    }

    /// Case-insensitive inverse of [`Kind::letter`].
    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'p' => Some(Kind::Pawn),
            'n' => Some(Kind::Knight),
            'b' => Some(Kind::Bishop),
            'r' => Some(Kind::Rook),
            'q' => Some(Kind::Queen),
            'k' => Some(Kind::King),
            _ => None,
        }
    }
}

impl From<shakmaty::Role> for Kind {
    fn from(role: shakmaty::Role) -> Self {
        match role {
            shakmaty::Role::Pawn => Kind::Pawn,
            shakmaty::Role::Knight => Kind::Knight,
            shakmaty::Role::Bishop => Kind::Bishop,
            shakmaty::Role::Rook => Kind::Rook,
            shakmaty::Role::Queen => Kind::Queen,
            shakmaty::Role::King => Kind::King,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub color: Color,
    pub kind: Kind,
}

impl Piece {
    pub fn new(color: Color, kind: Kind) -> Self {
        Piece { color, kind }
    }

    /// Parse a board-array cell: one letter, uppercase for white, lowercase for black.
    ///
    /// Surrounding whitespace is ignored. Anything else yields `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        let mut chars = code.trim().chars();
        let c = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        let kind = Kind::from_letter(c)?;
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece { color, kind })
    }

    /// Inverse of [`Piece::from_code`].
    pub fn code(self) -> char {
        match self.color {
            Color::White => self.kind.letter().to_ascii_uppercase(),
            Color::Black => self.kind.letter(),
        }
    }

    /// Color letter followed by kind letter, e.g. `wp` or `bk`.
    pub fn sprite_key(self) -> String {
        format!("{}{}", self.color.letter(), self.kind.letter())
    }
}

impl From<shakmaty::Piece> for Piece {
    fn from(p: shakmaty::Piece) -> Self {
        Piece {
            color: p.color.into(),
            kind: p.role.into(),
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A board square. `file` 0 = a, `rank` 0 = rank 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Square {
    pub file: u8,
    pub rank: u8,
}

impl Square {
    /// Returns `None` when either coordinate is off the board.
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        (file < 8 && rank < 8).then_some(Square { file, rank })
    }

    /// All 64 squares, a1 first, h8 last.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8u8).flat_map(|rank| (0..8u8).map(move |file| Square { file, rank }))
    }

    pub fn file_char(self) -> char {
        FILES.as_bytes()[self.file as usize] as char
    }

    /// Index into [`Position::rows`]: row 0 is rank 8.
    fn row(self) -> usize {
        7 - self.rank as usize
    }

    fn to_shakmaty(self) -> shakmaty::Square {
        shakmaty::Square::from_coords(
            shakmaty::File::new(self.file as u32),
            shakmaty::Rank::new(self.rank as u32),
        )
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid square name {0:?}")]
pub struct ParseSquareError(pub String);

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSquareError(s.to_string());
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(err());
        }
        let file = FILES
            .bytes()
            .position(|b| b == bytes[0].to_ascii_lowercase())
            .ok_or_else(err)?;
        let rank = match bytes[1] {
            b'1'..=b'8' => bytes[1] - b'1',
            _ => return Err(err()),
        };
        Ok(Square {
            file: file as u8,
            rank,
        })
    }
}

/// An 8x8 grid of optional pieces, row-major from rank 8 down to rank 1.
///
/// No legality is implied: any number of pieces (0..=64) in any arrangement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    rows: [[Option<Piece>; 8]; 8],
}

impl Position {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, square: Square) -> Option<Piece> {
        self.rows[square.row()][square.file as usize]
    }

    pub fn put(&mut self, square: Square, piece: Piece) {
        self.rows[square.row()][square.file as usize] = Some(piece);
    }

    /// The raw grid. Row 0 is rank 8, column 0 is the a-file.
    pub fn rows(&self) -> &[[Option<Piece>; 8]; 8] {
        &self.rows
    }

    /// Occupied squares in a1..h8 order.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| self.get(sq).map(|p| (sq, p)))
    }

    pub fn piece_count(&self) -> usize {
        self.rows.iter().flatten().filter(|c| c.is_some()).count()
    }

    /// Board-array form: one single-letter code per cell, empty string when vacant.
    pub fn to_array(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.map(|p| p.code().to_string()).unwrap_or_default())
                    .collect()
            })
            .collect()
    }

    pub(crate) fn from_board(board: &shakmaty::Board) -> Self {
        let mut position = Position::empty();
        for square in Square::all() {
            if let Some(piece) = board.piece_at(square.to_shakmaty()) {
                position.put(square, piece.into());
            }
        }
        position
    }
}
