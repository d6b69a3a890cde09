use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;

use ab_glyph::FontArc;
use chess_position::{Position, PositionLoader, RulesEngine, Shakmaty};
use image::{ImageFormat, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, trace, warn};

use crate::assets::{self, CachedImageSource, FsImageSource, ImageRef, ImageSource};
use crate::config::{AvatarFallback, BoardOptions};
use crate::drawing::{self, CircleClip, COLOR_TEXT};
use crate::error::{RenderError, Result};
use crate::geometry::{self, AvatarSlot, CANVAS_SIZE, Layout};

/// A player shown next to the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub name: String,
    /// Local path or `http(s)://` URL.
    pub avatar: String,
}

impl PlayerInfo {
    pub fn new(name: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            avatar: avatar.into(),
        }
    }
}

/// Renders a loaded position, with two players' avatars and names, to PNG.
///
/// Owns its position state; use one renderer per concurrent render.
pub struct BoardRenderer<S = CachedImageSource<FsImageSource>, E = Shakmaty> {
    options: BoardOptions,
    light: Rgba<u8>,
    dark: Rgba<u8>,
    source: S,
    font: FontArc,
    loader: PositionLoader<E>,
}

impl BoardRenderer<CachedImageSource<FsImageSource>, Shakmaty> {
    /// Renderer reading assets from `options.asset_root`. Sprites and board
    /// skins are decoded once per renderer.
    pub fn new(options: BoardOptions) -> Result<Self> {
        let source = FsImageSource::new(&options.asset_root, options.avatar_timeout)?;
        Self::with_source(options, CachedImageSource::new(source))
    }
}

impl<S: ImageSource> BoardRenderer<S, Shakmaty> {
    pub fn with_source(options: BoardOptions, source: S) -> Result<Self> {
        Self::with_parts(options, source, Shakmaty)
    }
}

impl<S: ImageSource, E: RulesEngine> BoardRenderer<S, E> {
    pub fn with_parts(options: BoardOptions, source: S, engine: E) -> Result<Self> {
        let (light, dark) = options.validate()?;
        Ok(Self {
            options,
            light,
            dark,
            source,
            font: drawing::default_font()?,
            loader: PositionLoader::with_engine(engine),
        })
    }

    /// Replace the bundled font used for player names.
    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = font;
        self
    }

    pub fn load_pgn(&mut self, pgn: &str) -> Result<()> {
        Ok(self.loader.load_pgn(pgn)?)
    }

    pub fn load_fen(&mut self, fen: &str) -> Result<()> {
        Ok(self.loader.load_fen(fen)?)
    }

    pub fn load_array<R, C>(&mut self, rows: &[R])
    where
        R: AsRef<[C]>,
        C: AsRef<str>,
    {
        self.loader.load_array(rows)
    }

    pub fn is_ready(&self) -> bool {
        self.loader.is_ready()
    }

    pub fn position(&self) -> &Position {
        self.loader.position()
    }

    /// Compose the full canvas: background, pieces, then avatars and names.
    pub fn compose(
        &self,
        author: &PlayerInfo,
        author2: &PlayerInfo,
        layout: Layout,
    ) -> Result<RgbaImage> {
        let position = self.loader.ready_position().ok_or(RenderError::NotReady)?;
        let span = info_span!("render", layout = layout.flag(), size = self.options.size);
        let _guard = span.enter();

        let mut canvas = RgbaImage::new(CANVAS_SIZE, CANVAS_SIZE);
        self.draw_background(&mut canvas)?;
        self.draw_pieces(&mut canvas, position, layout)?;

        let (bottom, top) = layout.players(author, author2);
        self.draw_player(&mut canvas, bottom, geometry::bottom_slot(self.options.size))?;
        self.draw_player(&mut canvas, top, geometry::top_slot())?;

        Ok(canvas)
    }

    /// Render to an in-memory PNG.
    pub fn render_to_buffer(
        &self,
        author: &PlayerInfo,
        author2: &PlayerInfo,
        layout: Layout,
    ) -> Result<Vec<u8>> {
        let canvas = self.compose(author, author2, layout)?;
        let mut buf = Cursor::new(Vec::new());
        canvas
            .write_to(&mut buf, ImageFormat::Png)
            .map_err(RenderError::Encode)?;
        debug!("encoded {} byte PNG", buf.get_ref().len());
        Ok(buf.into_inner())
    }

    /// Render and write the PNG to `path`. The file handle is released on every path.
    pub fn render_to_file(
        &self,
        path: impl AsRef<Path>,
        author: &PlayerInfo,
        author2: &PlayerInfo,
        layout: Layout,
    ) -> Result<()> {
        let path = path.as_ref();
        let png = self.render_to_buffer(author, author2, layout)?;
        let io_err = |source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&png).map_err(io_err)?;
        writer.flush().map_err(io_err)?;
        debug!("wrote {}", path.display());
        Ok(())
    }

    fn draw_background(&self, canvas: &mut RgbaImage) -> Result<()> {
        match &self.options.board_style {
            Some(style) => {
                let board = self.source.load(&assets::board_asset(style))?;
                drawing::draw_scaled(canvas, &board, geometry::board_rect(self.options.size));
            }
            None => {
                drawing::draw_checkerboard(canvas, self.options.size, self.light, self.dark);
            }
        }
        Ok(())
    }

    fn draw_pieces(
        &self,
        canvas: &mut RgbaImage,
        position: &Position,
        layout: Layout,
    ) -> Result<()> {
        for row in 0..8u8 {
            for col in 0..8u8 {
                let square = layout.square_at(row, col);
                let Some(piece) = position.get(square) else {
                    continue;
                };
                let sprite = self
                    .source
                    .load(&assets::piece_asset(&self.options.style, piece))?;
                trace!("{piece} on {square} at cell ({row}, {col})");
                drawing::draw_scaled(
                    canvas,
                    &sprite,
                    geometry::cell_rect(self.options.size, row, col),
                );
            }
        }
        Ok(())
    }

    fn draw_player(
        &self,
        canvas: &mut RgbaImage,
        player: &PlayerInfo,
        slot: AvatarSlot,
    ) -> Result<()> {
        let clip = CircleClip::inscribed(slot.avatar);
        match self.source.load(&ImageRef::avatar(&player.avatar)) {
            Ok(avatar) => clip.draw_image(canvas, &avatar),
            Err(e) if self.options.avatar_fallback == AvatarFallback::Placeholder => {
                warn!("using placeholder avatar for {:?}: {e}", player.name);
                drawing::draw_placeholder_avatar(canvas, slot.avatar);
            }
            Err(e) => return Err(e),
        }

        drawing::draw_label(
            canvas,
            &self.font,
            &player.name,
            slot.name_x,
            slot.name_baseline,
            slot.align,
            COLOR_TEXT,
        );
        Ok(())
    }
}
