use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow, bail};
use clap::{App, Arg, ArgGroup};
use tracing::info;
use tracing_subscriber::EnvFilter;

use chess_board_renderer::config::RendererConfig;
use chess_board_renderer::drawing::load_font;
use chess_board_renderer::{BoardRenderer, Layout, PlayerInfo};

/// Read a board array file: 8 lines of 8 cells separated by spaces or commas.
/// `.` and `-` mark empty squares.
fn read_array(path: &Path) -> anyhow::Result<Vec<Vec<String>>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read board array {}", path.display()))?;
    let rows: Vec<Vec<String>> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.split(|c: char| c == ',' || c.is_whitespace())
                .filter(|cell| !cell.is_empty())
                .map(|cell| match cell {
                    "." | "-" => String::new(),
                    other => other.to_string(),
                })
                .collect()
        })
        .collect();
    if rows.len() != 8 {
        bail!("board array must have 8 rows, found {}", rows.len());
    }
    Ok(rows)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let matches = App::new("Board Renderer")
        .about("Renders a chess position with player avatars as a PNG image")
        .arg(
            Arg::with_name("FEN")
                .help("Position as a FEN string")
                .long("fen")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("PGN")
                .help("PGN file; the final position of the game is rendered")
                .long("pgn")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("ARRAY")
                .help("Board array file: 8 rows of piece letters, '.' for empty")
                .long("array")
                .takes_value(true),
        )
        .group(ArgGroup::with_name("POSITION").args(&["FEN", "PGN", "ARRAY"]))
        .arg(
            Arg::with_name("OUTPUT")
                .help("Output PNG file path")
                .short("o")
                .long("output")
                .takes_value(true)
                .required_unless("GENERATE_CONFIG"),
        )
        .arg(
            Arg::with_name("LAYOUT")
                .help("0 = white at the bottom, 1 = black at the bottom")
                .long("layout")
                .takes_value(true)
                .possible_values(&["0", "1"])
                .default_value("0"),
        )
        .arg(
            Arg::with_name("AUTHOR")
                .help("First player's name")
                .long("author")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("AUTHOR_AVATAR")
                .help("First player's avatar (path or URL)")
                .long("author-avatar")
                .takes_value(true)
                .required_unless("GENERATE_CONFIG"),
        )
        .arg(
            Arg::with_name("AUTHOR2")
                .help("Second player's name")
                .long("author2")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("AUTHOR2_AVATAR")
                .help("Second player's avatar (path or URL)")
                .long("author2-avatar")
                .takes_value(true)
                .required_unless("GENERATE_CONFIG"),
        )
        .arg(
            Arg::with_name("SIZE")
                .help("Board edge length in pixels")
                .long("size")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("LIGHT")
                .help("Light square color when no board style is set")
                .long("light")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("DARK")
                .help("Dark square color when no board style is set")
                .long("dark")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("STYLE")
                .help("Piece sprite set")
                .long("style")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("BOARD_STYLE")
                .help("Board background image")
                .long("board-style")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("ASSETS")
                .help("Directory containing boards/ and pieces/")
                .long("assets")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("FONT")
                .help("TrueType font for player names (defaults to the bundled DejaVu Sans Bold)")
                .long("font")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("PLACEHOLDER_AVATARS")
                .help("Draw a gray circle instead of failing when an avatar can't be loaded")
                .long("placeholder-avatars"),
        )
        .arg(
            Arg::with_name("CONFIG")
                .help("TOML config file")
                .long("config")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("GENERATE_CONFIG")
                .help("Print a default config file and exit")
                .long("generate-config"),
        )
        .get_matches();

    if matches.is_present("GENERATE_CONFIG") {
        print!("{}", RendererConfig::generate_default_toml());
        return Ok(());
    }

    let mut config = match matches.value_of("CONFIG") {
        Some(path) => RendererConfig::load(Path::new(path))?,
        None => RendererConfig::default(),
    };
    config.apply_cli_overrides(&matches)?;

    let font = config
        .font
        .as_ref()
        .map(|path| -> anyhow::Result<_> {
            let data = std::fs::read(path)
                .with_context(|| format!("failed to read font {}", path.display()))?;
            Ok(load_font(data)?)
        })
        .transpose()?;

    let mut renderer = BoardRenderer::new(config.into_board_options())?;
    if let Some(font) = font {
        renderer = renderer.with_font(font);
    }

    if let Some(fen) = matches.value_of("FEN") {
        renderer.load_fen(fen)?;
    } else if let Some(path) = matches.value_of("PGN") {
        let pgn = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read PGN {path}"))?;
        renderer.load_pgn(&pgn)?;
    } else if let Some(path) = matches.value_of("ARRAY") {
        let rows = read_array(Path::new(path))?;
        renderer.load_array(&rows);
    } else {
        return Err(anyhow!("one of --fen, --pgn or --array is required"));
    }

    let layout: u8 = matches
        .value_of("LAYOUT")
        .unwrap_or("0")
        .parse()
        .context("invalid --layout")?;
    let author = PlayerInfo::new(
        matches.value_of("AUTHOR").unwrap_or_default(),
        matches.value_of("AUTHOR_AVATAR").unwrap_or_default(),
    );
    let author2 = PlayerInfo::new(
        matches.value_of("AUTHOR2").unwrap_or_default(),
        matches.value_of("AUTHOR2_AVATAR").unwrap_or_default(),
    );

    let output = PathBuf::from(matches.value_of("OUTPUT").unwrap_or("board.png"));
    renderer.render_to_file(&output, &author, &author2, Layout::from_flag(layout))?;
    info!("wrote {}", output.display());
    Ok(())
}
