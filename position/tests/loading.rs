use chess_position::{Color, Kind, NotationError, Piece, PositionLoader};

const SCHOLARS_MATE: &str = r#"[Event "Casual game"]
[Site "?"]
[White "White"]
[Black "Black"]
[Result "1-0"]

1. e4 e5 2. Bc4 Nc6 3. Qh5 Nf6?? 4. Qxf7# 1-0
"#;

#[test]
fn pgn_final_position() {
    let mut loader = PositionLoader::new();
    loader.load_pgn(SCHOLARS_MATE).unwrap();
    let position = loader.ready_position().unwrap();

    assert_eq!(
        position.get("f7".parse().unwrap()),
        Some(Piece::new(Color::White, Kind::Queen))
    );
    assert_eq!(position.get("d1".parse().unwrap()), None);
    assert_eq!(position.piece_count(), 31);
}

#[test]
fn invalid_notation_is_recoverable() {
    let mut loader = PositionLoader::new();
    let err = loader.load_pgn("1. e4 e5 2. Qxf7").unwrap_err();
    assert!(matches!(err, NotationError::InvalidPgn { ply: 3, .. }));
    assert!(!loader.is_ready());

    loader.load_pgn("1. e4 e5 2. Qh5").unwrap();
    assert!(loader.is_ready());
}

#[test]
fn position_serializes() {
    let mut loader = PositionLoader::new();
    let mut rows = vec![vec![""; 8]; 8];
    rows[0][0] = "k";
    rows[7][7] = "K";
    loader.load_array(&rows);
    let json = serde_json::to_string(loader.position()).unwrap();
    let back: chess_position::Position = serde_json::from_str(&json).unwrap();
    assert_eq!(&back, loader.position());
}
