use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chess_position::Piece;
use image::DynamicImage;
use tracing::debug;

use crate::error::{RenderError, Result};

/// Sprite file stem per color+kind key.
pub const SPRITE_STEMS: [(&str, &str); 12] = [
    ("wp", "wp"),
    ("bp", "bp"),
    ("wb", "wb"),
    ("bb", "bb"),
    ("wn", "wn"),
    ("bn", "bn"),
    ("wr", "wr"),
    ("br", "br"),
    ("wq", "wq"),
    ("bq", "bq"),
    ("wk", "wk"),
    ("bk", "bk"),
];

/// Size in pixels at which SVG sprites are rasterized before scaling to the square.
pub const SVG_RASTER_SIZE: u32 = 256;

/// Reference to an image, as understood by an [`ImageSource`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageRef {
    /// Bundled asset, relative to the asset root.
    Asset(PathBuf),
    /// Local file (avatar).
    File(PathBuf),
    /// Remote image (avatar).
    Url(String),
}

impl ImageRef {
    /// Classify an avatar reference: `http(s)://` is remote, anything else a local path.
    pub fn avatar(reference: &str) -> Self {
        let lower = reference.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            ImageRef::Url(reference.to_string())
        } else {
            ImageRef::File(PathBuf::from(reference))
        }
    }

    pub fn is_asset(&self) -> bool {
        matches!(self, ImageRef::Asset(_))
    }

    fn describe(&self) -> String {
        match self {
            ImageRef::Asset(p) | ImageRef::File(p) => p.display().to_string(),
            ImageRef::Url(u) => u.clone(),
        }
    }
}

/// `boards/<style>.png`
pub fn board_asset(style: &str) -> ImageRef {
    ImageRef::Asset(Path::new("boards").join(format!("{style}.png")))
}

/// `pieces/<style>/<stem>.png`
pub fn piece_asset(style: &str, piece: Piece) -> ImageRef {
    let key = piece.sprite_key();
    let stem = SPRITE_STEMS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, stem)| *stem)
        .unwrap_or(key.as_str());
    ImageRef::Asset(Path::new("pieces").join(style).join(format!("{stem}.png")))
}

/// Loads images for the renderer. Swap in a fixture implementation to render
/// without touching the disk or network.
pub trait ImageSource {
    fn load(&self, reference: &ImageRef) -> Result<DynamicImage>;
}

#[cfg(feature = "remote")]
type HttpClient = reqwest::blocking::Client;

/// Without the `remote` feature only the timeout is kept, for diagnostics.
#[cfg(not(feature = "remote"))]
type HttpClient = Duration;

#[cfg(feature = "remote")]
fn http_client(timeout: Duration) -> Result<HttpClient> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| RenderError::AvatarUnavailable {
            reference: String::new(),
            reason: format!("could not build HTTP client: {e}"),
        })
}

#[cfg(not(feature = "remote"))]
fn http_client(timeout: Duration) -> Result<HttpClient> {
    Ok(timeout)
}

/// Filesystem-backed [`ImageSource`], with remote avatar fetching when the
/// `remote` feature is enabled.
pub struct FsImageSource {
    root: PathBuf,
    client: HttpClient,
}

impl FsImageSource {
    pub fn new(root: impl Into<PathBuf>, avatar_timeout: Duration) -> Result<Self> {
        Ok(Self {
            root: root.into(),
            client: http_client(avatar_timeout)?,
        })
    }

    fn load_asset(&self, relative: &Path) -> Result<DynamicImage> {
        let path = self.root.join(relative);
        if path.is_file() {
            return decode_file(&path);
        }
        // Sprite sets are often shipped as SVG; fall back to the same stem.
        if path.extension() == Some(OsStr::new("png")) {
            let svg = path.with_extension("svg");
            if svg.is_file() {
                debug!("rasterizing SVG asset {}", svg.display());
                let data = std::fs::read(&svg).map_err(|source| RenderError::Io {
                    path: svg.clone(),
                    source,
                })?;
                return rasterize_svg(&data, SVG_RASTER_SIZE)
                    .map(DynamicImage::ImageRgba8)
                    .ok_or(RenderError::AssetNotFound { path: svg });
            }
        }
        Err(RenderError::AssetNotFound { path })
    }

    fn load_file(&self, path: &Path) -> Result<DynamicImage> {
        let bytes = std::fs::read(path).map_err(|e| RenderError::AvatarUnavailable {
            reference: path.display().to_string(),
            reason: e.to_string(),
        })?;
        image::load_from_memory(&bytes).map_err(|e| RenderError::AvatarUnavailable {
            reference: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    #[cfg(feature = "remote")]
    fn load_url(&self, url: &str) -> Result<DynamicImage> {
        let unavailable = |reason: String| RenderError::AvatarUnavailable {
            reference: url.to_string(),
            reason,
        };
        debug!("fetching remote image {url}");
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| unavailable(e.to_string()))?;
        let bytes = response.bytes().map_err(|e| unavailable(e.to_string()))?;
        image::load_from_memory(&bytes).map_err(|e| unavailable(e.to_string()))
    }

    #[cfg(not(feature = "remote"))]
    fn load_url(&self, url: &str) -> Result<DynamicImage> {
        Err(RenderError::AvatarUnavailable {
            reference: url.to_string(),
            reason: format!(
                "remote images require the `remote` feature (timeout {:?})",
                self.client
            ),
        })
    }
}

impl ImageSource for FsImageSource {
    fn load(&self, reference: &ImageRef) -> Result<DynamicImage> {
        match reference {
            ImageRef::Asset(relative) => self.load_asset(relative),
            ImageRef::File(path) => self.load_file(path),
            ImageRef::Url(url) => self.load_url(url),
        }
    }
}

fn decode_file(path: &Path) -> Result<DynamicImage> {
    debug!("loading image {}", path.display());
    image::open(path).map_err(|source| match source {
        image::ImageError::IoError(source) => RenderError::Io {
            path: path.to_path_buf(),
            source,
        },
        source => RenderError::AssetDecode {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Memoizes bundled assets (board skins, sprites) of an inner source.
///
/// Avatars are passed through uncached. Not `Sync`; keep one per renderer.
pub struct CachedImageSource<S> {
    inner: S,
    cache: RefCell<HashMap<ImageRef, DynamicImage>>,
}

impl<S: ImageSource> CachedImageSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl<S: ImageSource> ImageSource for CachedImageSource<S> {
    fn load(&self, reference: &ImageRef) -> Result<DynamicImage> {
        if !reference.is_asset() {
            return self.inner.load(reference);
        }
        if let Some(image) = self.cache.borrow().get(reference) {
            return Ok(image.clone());
        }
        let image = self.inner.load(reference)?;
        debug!("caching {}", reference.describe());
        self.cache
            .borrow_mut()
            .insert(reference.clone(), image.clone());
        Ok(image)
    }
}

/// Rasterize an SVG byte buffer to an RGBA image at the given size.
pub fn rasterize_svg(svg_data: &[u8], size: u32) -> Option<image::RgbaImage> {
    let opt = resvg::usvg::Options::default();
    let tree = resvg::usvg::Tree::from_data(svg_data, &opt).ok()?;

    let tree_size = tree.size();
    let sx = size as f32 / tree_size.width();
    let sy = size as f32 / tree_size.height();
    let scale = sx.min(sy);

    let mut pixmap = tiny_skia::Pixmap::new(size, size)?;

    // Center the sprite in the output
    let offset_x = (size as f32 - tree_size.width() * scale) / 2.0;
    let offset_y = (size as f32 - tree_size.height() * scale) / 2.0;
    let transform =
        tiny_skia::Transform::from_translate(offset_x, offset_y).post_scale(scale, scale);

    resvg::render(&tree, transform, &mut pixmap.as_mut());

    // tiny-skia stores premultiplied alpha
    let data = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    image::RgbaImage::from_raw(size, size, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_position::{Color, Kind};
    use std::cell::Cell;

    struct Counting {
        loads: Cell<usize>,
    }

    impl ImageSource for Counting {
        fn load(&self, _reference: &ImageRef) -> Result<DynamicImage> {
            self.loads.set(self.loads.get() + 1);
            Ok(DynamicImage::new_rgba8(1, 1))
        }
    }

    #[test]
    fn asset_paths() {
        assert_eq!(
            board_asset("stone"),
            ImageRef::Asset(PathBuf::from("boards/stone.png"))
        );
        assert_eq!(
            piece_asset("neo", Piece::new(Color::Black, Kind::Knight)),
            ImageRef::Asset(PathBuf::from("pieces/neo/bn.png"))
        );
    }

    #[test]
    fn every_piece_has_a_stem() {
        for color in [Color::White, Color::Black] {
            for kind in Kind::ALL {
                let key = Piece::new(color, kind).sprite_key();
                assert!(SPRITE_STEMS.iter().any(|(k, _)| *k == key), "{key}");
            }
        }
    }

    #[test]
    fn avatar_refs_are_classified() {
        assert_eq!(
            ImageRef::avatar("https://example.com/a.png"),
            ImageRef::Url("https://example.com/a.png".to_string())
        );
        assert_eq!(
            ImageRef::avatar("avatars/me.png"),
            ImageRef::File(PathBuf::from("avatars/me.png"))
        );
    }

    #[test]
    fn missing_asset_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let source = FsImageSource::new(dir.path(), Duration::from_secs(1)).unwrap();
        match source.load(&board_asset("nope")) {
            Err(RenderError::AssetNotFound { path }) => {
                assert!(path.ends_with("boards/nope.png"));
            }
            other => panic!("expected AssetNotFound, got {other:?}"),
        }
    }

    #[test]
    fn missing_avatar_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let source = FsImageSource::new(dir.path(), Duration::from_secs(1)).unwrap();
        let missing = dir.path().join("ghost.png");
        assert!(matches!(
            source.load(&ImageRef::File(missing)),
            Err(RenderError::AvatarUnavailable { .. })
        ));
    }

    #[test]
    fn png_asset_loads_from_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("boards")).unwrap();
        image::RgbaImage::from_pixel(4, 4, image::Rgba([1, 2, 3, 255]))
            .save(dir.path().join("boards/plain.png"))
            .unwrap();
        let source = FsImageSource::new(dir.path(), Duration::from_secs(1)).unwrap();
        let board = source.load(&board_asset("plain")).unwrap().to_rgba8();
        assert_eq!(board.dimensions(), (4, 4));
        assert_eq!(board.get_pixel(0, 0), &image::Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn svg_sprite_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let pieces = dir.path().join("pieces/flat");
        std::fs::create_dir_all(&pieces).unwrap();
        std::fs::write(
            pieces.join("wk.svg"),
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><rect width="10" height="10" fill="#ff0000"/></svg>"##,
        )
        .unwrap();
        let source = FsImageSource::new(dir.path(), Duration::from_secs(1)).unwrap();
        let sprite = source
            .load(&piece_asset("flat", Piece::new(Color::White, Kind::King)))
            .unwrap()
            .to_rgba8();
        assert_eq!(sprite.dimensions(), (SVG_RASTER_SIZE, SVG_RASTER_SIZE));
        assert_eq!(sprite.get_pixel(128, 128), &image::Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn cache_only_keeps_assets() {
        let source = CachedImageSource::new(Counting {
            loads: Cell::new(0),
        });
        let board = board_asset("stone");
        source.load(&board).unwrap();
        source.load(&board).unwrap();
        assert_eq!(source.inner.loads.get(), 1);

        let avatar = ImageRef::avatar("me.png");
        source.load(&avatar).unwrap();
        source.load(&avatar).unwrap();
        assert_eq!(source.inner.loads.get(), 3);
        assert_eq!(source.cached_len(), 1);
    }
}
