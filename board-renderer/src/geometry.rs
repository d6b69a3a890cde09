//! Fixed canvas geometry. Everything here is pure layout math with no image I/O.

use chess_position::Square;

/// Output canvas edge length in pixels (square).
pub const CANVAS_SIZE: u32 = 900;
/// Diameter of the circular avatar clip.
pub const AVATAR_SIZE: u32 = 50;
/// Gap between the bottom avatar and the canvas bottom edge, and the top avatar and the top edge.
pub const AVATAR_MARGIN: u32 = 10;
/// Horizontal inset of the bottom avatar from the board's left edge.
pub const AVATAR_INSET: u32 = 20;
/// Distance from the canvas right edge to the top avatar's left edge.
pub const TOP_AVATAR_RIGHT: u32 = AVATAR_SIZE * 3;
/// Space between an avatar and its name label.
pub const NAME_GAP: u32 = 5;
pub const NAME_FONT_PX: f32 = 25.0;

/// Board orientation and which player sits at the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Flag 0: a1 at the bottom-left, second player at the bottom.
    #[default]
    WhitePerspective,
    /// Flag 1: both axes mirrored (h8 at the bottom-left), first player at the bottom.
    BlackPerspective,
}

impl Layout {
    /// `1` selects black perspective; any other flag falls back to white perspective.
    pub fn from_flag(flag: u8) -> Self {
        match flag {
            1 => Layout::BlackPerspective,
            _ => Layout::WhitePerspective,
        }
    }

    pub fn flag(self) -> u8 {
        match self {
            Layout::WhitePerspective => 0,
            Layout::BlackPerspective => 1,
        }
    }

    /// Square drawn at a given cell. `row` 0 is the top of the board, `col` 0 the left.
    pub fn square_at(self, row: u8, col: u8) -> Square {
        debug_assert!(row < 8 && col < 8);
        match self {
            Layout::WhitePerspective => Square {
                file: col,
                rank: 7 - row,
            },
            Layout::BlackPerspective => Square {
                file: 7 - col,
                rank: row,
            },
        }
    }

    /// Inverse of [`Layout::square_at`]: `(row, col)` where the square is drawn.
    pub fn cell_of(self, square: Square) -> (u8, u8) {
        match self {
            Layout::WhitePerspective => (7 - square.rank, square.file),
            Layout::BlackPerspective => (square.rank, 7 - square.file),
        }
    }

    /// Order two players as `(bottom, top)`.
    pub fn players<T>(self, author: T, author2: T) -> (T, T) {
        match self {
            Layout::BlackPerspective => (author, author2),
            Layout::WhitePerspective => (author2, author),
        }
    }
}

/// Integer pixel rectangle on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Top-left corner of the board area, centered on the canvas.
pub fn board_origin(size: u32) -> (f32, f32) {
    let offset = CANVAS_SIZE as f32 / 2.0 - size as f32 / 2.0;
    (offset, offset)
}

/// Board area as a pixel rectangle.
pub fn board_rect(size: u32) -> PixelRect {
    let (x, y) = board_origin(size);
    let (x, y) = (x.round() as i32, y.round() as i32);
    PixelRect {
        x,
        y,
        width: size,
        height: size,
    }
}

/// Pixel rectangle of the drawn cell at `(row, col)`.
///
/// Edges are rounded from the fractional grid so adjacent cells tile without gaps.
pub fn cell_rect(size: u32, row: u8, col: u8) -> PixelRect {
    let (ox, oy) = board_origin(size);
    let edge = size as f32 / 8.0;
    let x0 = (ox + edge * col as f32).round() as i32;
    let x1 = (ox + edge * (col + 1) as f32).round() as i32;
    let y0 = (oy + edge * row as f32).round() as i32;
    let y1 = (oy + edge * (row + 1) as f32).round() as i32;
    PixelRect {
        x: x0,
        y: y0,
        width: (x1 - x0) as u32,
        height: (y1 - y0) as u32,
    }
}

/// Horizontal alignment of a name label relative to its anchor x.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Right,
}

/// Where one avatar and its name go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvatarSlot {
    pub avatar: PixelRect,
    pub name_x: i32,
    /// Baseline y of the name text.
    pub name_baseline: i32,
    pub align: TextAlign,
}

/// Bottom-left slot: avatar inset from the board's left edge, name to its right.
pub fn bottom_slot(size: u32) -> AvatarSlot {
    let (ox, _) = board_origin(size);
    let x = (ox + AVATAR_INSET as f32).round() as i32;
    let y = (CANVAS_SIZE - AVATAR_SIZE - AVATAR_MARGIN) as i32;
    AvatarSlot {
        avatar: PixelRect {
            x,
            y,
            width: AVATAR_SIZE,
            height: AVATAR_SIZE,
        },
        name_x: x + (AVATAR_SIZE + NAME_GAP) as i32,
        name_baseline: (CANVAS_SIZE - AVATAR_SIZE / 2) as i32,
        align: TextAlign::Left,
    }
}

/// Top-right slot: avatar near the canvas right edge, name right-aligned to its left.
pub fn top_slot() -> AvatarSlot {
    let x = (CANVAS_SIZE - TOP_AVATAR_RIGHT) as i32;
    let y = AVATAR_MARGIN as i32;
    AvatarSlot {
        avatar: PixelRect {
            x,
            y,
            width: AVATAR_SIZE,
            height: AVATAR_SIZE,
        },
        name_x: x - NAME_GAP as i32,
        name_baseline: y + (AVATAR_SIZE / 2 + NAME_GAP) as i32,
        align: TextAlign::Right,
    }
}
