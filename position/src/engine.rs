use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::{CastlingMode, Chess, Position as _};
use tracing::{debug, trace};

use crate::error::{NotationError, Result};
use crate::pgn;
use crate::types::Position;

/// Chess rules capability: turns notation into a board.
///
/// Move generation and legality checks live behind this trait so the
/// loader never reimplements them.
pub trait RulesEngine {
    fn parse_pgn(&self, text: &str) -> Result<Position>;
    fn parse_fen(&self, text: &str) -> Result<Position>;
}

/// [`RulesEngine`] backed by the `shakmaty` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct Shakmaty;

impl Shakmaty {
    fn read_fen(text: &str) -> Result<Fen> {
        text.trim().parse().map_err(|e| NotationError::InvalidFen {
            fen: text.to_string(),
            reason: format!("{e}"),
        })
    }

    /// Playable start position. Stale castling rights and en passant squares
    /// are dropped; anything else that makes the position unplayable is an error.
    fn setup_from_fen(text: &str) -> Result<Chess> {
        Self::read_fen(text)?
            .into_position::<Chess>(CastlingMode::Standard)
            .or_else(|e| e.ignore_invalid_castling_rights())
            .or_else(|e| e.ignore_invalid_ep_square())
            .map_err(|e| NotationError::InvalidFen {
                fen: text.to_string(),
                reason: format!("{e}"),
            })
    }
}

impl RulesEngine for Shakmaty {
    /// Only the piece placement matters for drawing, so any well-formed FEN is
    /// accepted, including positions no game could reach.
    fn parse_fen(&self, text: &str) -> Result<Position> {
        let fen = Self::read_fen(text)?;
        Ok(Position::from_board(&fen.as_setup().board))
    }

    fn parse_pgn(&self, text: &str) -> Result<Position> {
        let game = pgn::parse(text)?;

        let mut chess = match game.tag("FEN") {
            Some(fen) => {
                debug!("PGN starts from FEN tag: {fen}");
                Self::setup_from_fen(fen).map_err(|e| NotationError::InvalidPgn {
                    ply: 0,
                    token: fen.to_string(),
                    reason: e.to_string(),
                })?
            }
            None => Chess::default(),
        };

        for (index, token) in game.moves.iter().enumerate() {
            let ply = index + 1;
            let invalid = |reason: String| NotationError::InvalidPgn {
                ply,
                token: token.clone(),
                reason,
            };
            let san: SanPlus = token.parse().map_err(|e| invalid(format!("{e}")))?;
            let m = san.san.to_move(&chess).map_err(|e| invalid(format!("{e}")))?;
            trace!("ply {ply}: {token}");
            chess.play_unchecked(&m);
        }

        debug!("replayed {} plies from PGN", game.moves.len());
        Ok(Position::from_board(chess.board()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Color, Kind, Piece};

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn start_fen_fills_back_ranks() {
        let position = Shakmaty.parse_fen(START_FEN).unwrap();
        assert_eq!(position.piece_count(), 32);
        assert_eq!(
            position.get("a1".parse().unwrap()),
            Some(Piece::new(Color::White, Kind::Rook))
        );
        assert_eq!(
            position.get("e8".parse().unwrap()),
            Some(Piece::new(Color::Black, Kind::King))
        );
    }

    #[test]
    fn garbage_fen_is_rejected() {
        assert!(matches!(
            Shakmaty.parse_fen("garbage"),
            Err(NotationError::InvalidFen { .. })
        ));
    }

    #[test]
    fn fen_legality_is_not_enforced() {
        let stale_castling = Shakmaty
            .parse_fen("4k3/8/8/8/8/8/8/4K2R w KQkq - 0 1")
            .unwrap();
        assert_eq!(stale_castling.piece_count(), 3);

        let empty = Shakmaty.parse_fen("8/8/8/8/8/8/8/8 w - - 0 1").unwrap();
        assert_eq!(empty, Position::empty());

        let opposite_check = Shakmaty
            .parse_fen("4k3/4Q3/8/8/8/8/8/4K3 w - - 0 1")
            .unwrap();
        assert_eq!(
            opposite_check.get("e7".parse().unwrap()),
            Some(Piece::new(Color::White, Kind::Queen))
        );
    }

    #[test]
    fn malformed_fen_board_is_rejected() {
        for fen in [
            "8/8/8/8/8/8/8 w - - 0 1",
            "9/8/8/8/8/8/8/8 w - - 0 1",
            "rnbqkbnr/ppppXppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        ] {
            assert!(
                matches!(
                    Shakmaty.parse_fen(fen),
                    Err(NotationError::InvalidFen { .. })
                ),
                "{fen}"
            );
        }
    }

    #[test]
    fn pgn_replays_moves() {
        let position = Shakmaty
            .parse_pgn("1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 4. O-O")
            .unwrap();
        assert_eq!(
            position.get("e4".parse().unwrap()).map(|p| p.kind),
            Some(Kind::Pawn)
        );
        assert_eq!(
            position.get("g1".parse().unwrap()),
            Some(Piece::new(Color::White, Kind::King))
        );
        assert_eq!(
            position.get("f1".parse().unwrap()),
            Some(Piece::new(Color::White, Kind::Rook))
        );
        assert_eq!(position.get("e2".parse().unwrap()), None);
    }

    #[test]
    fn pgn_matches_equivalent_fen() {
        let from_pgn = Shakmaty.parse_pgn("1. d4 Nf6 2. c4 e6").unwrap();
        let from_fen = Shakmaty
            .parse_fen("rnbqkb1r/pppp1ppp/4pn2/8/2PP4/8/PP2PPPP/RNBQKBNR w KQkq - 0 3")
            .unwrap();
        assert_eq!(from_pgn, from_fen);
    }

    #[test]
    fn pgn_fen_tag_sets_start() {
        let pgn = r#"[SetUp "1"]
[FEN "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1"]

1. e4 Kd7"#;
        let position = Shakmaty.parse_pgn(pgn).unwrap();
        assert_eq!(position.piece_count(), 3);
        assert_eq!(
            position.get("d7".parse().unwrap()),
            Some(Piece::new(Color::Black, Kind::King))
        );
    }

    #[test]
    fn pgn_fen_tag_drops_stale_castling_rights() {
        let pgn = "[FEN \"4k3/8/8/8/8/8/8/4K2R w KQkq - 0 1\"]\n\n1. Rh7 Kd8";
        let position = Shakmaty.parse_pgn(pgn).unwrap();
        assert_eq!(
            position.get("h7".parse().unwrap()),
            Some(Piece::new(Color::White, Kind::Rook))
        );

        // Without kings there is nothing to replay moves against.
        assert!(matches!(
            Shakmaty.parse_pgn("[FEN \"8/8/8/8/8/8/8/8 w - - 0 1\"]\n\n1. e4"),
            Err(NotationError::InvalidPgn { ply: 0, .. })
        ));
    }

    #[test]
    fn pgn_variation_comments_are_skipped() {
        let position = Shakmaty
            .parse_pgn("1. e4 (1. d4 ; comment with )\n d5) e5 *")
            .unwrap();
        assert_eq!(
            position.get("e5".parse().unwrap()),
            Some(Piece::new(Color::Black, Kind::Pawn))
        );
        assert_eq!(position.get("d4".parse().unwrap()), None);
    }

    #[test]
    fn illegal_move_reports_ply() {
        match Shakmaty.parse_pgn("1. e4 e5 2. Ke3") {
            Err(NotationError::InvalidPgn { ply, token, .. }) => {
                assert_eq!(ply, 3);
                assert_eq!(token, "Ke3");
            }
            other => panic!("expected InvalidPgn, got {other:?}"),
        }
    }

    #[test]
    fn garbage_pgn_is_rejected() {
        assert!(matches!(
            Shakmaty.parse_pgn("garbage"),
            Err(NotationError::InvalidPgn { ply: 1, .. })
        ));
    }

    #[test]
    fn empty_movetext_is_start_position() {
        let position = Shakmaty.parse_pgn("[Event \"?\"]\n\n*").unwrap();
        assert_eq!(position, Shakmaty.parse_fen(START_FEN).unwrap());
    }
}
