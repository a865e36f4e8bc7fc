// This file is part of the kibitz library.
// Copyright (C) 2025 The kibitz developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.

//! Parse and write Forsyth-Edwards-Notation.
//!
//! # Examples
//!
//! Parse a FEN:
//!
//! ```
//! use kibitz::{fen::Fen, Color, Square};
//!
//! let input = "r1bqkbnr/ppp2Qpp/2np4/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4";
//!
//! let fen: Fen = input.parse()?;
//! assert_eq!(fen.turn, Color::Black);
//! assert_eq!(fen.board.piece_at(Square::F7), Some(Color::White.queen()));
//! assert_eq!(fen.to_string(), input);
//! # Ok::<_, kibitz::fen::ParseFenError>(())
//! ```

use std::{error::Error, fmt, num::NonZeroU32, str::FromStr};

use bitflags::bitflags;

use crate::{Board, CastlingSide, Color, Role, Square};

bitflags! {
    /// Castling rights as written in the third FEN field.
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
    pub struct CastlingRights: u8 {
        const WHITE_KING_SIDE = 1;
        const WHITE_QUEEN_SIDE = 2;
        const BLACK_KING_SIDE = 4;
        const BLACK_QUEEN_SIDE = 8;
    }
}

impl CastlingRights {
    pub const fn of(color: Color, side: CastlingSide) -> CastlingRights {
        match (color, side) {
            (Color::White, CastlingSide::KingSide) => CastlingRights::WHITE_KING_SIDE,
            (Color::White, CastlingSide::QueenSide) => CastlingRights::WHITE_QUEEN_SIDE,
            (Color::Black, CastlingSide::KingSide) => CastlingRights::BLACK_KING_SIDE,
            (Color::Black, CastlingSide::QueenSide) => CastlingRights::BLACK_QUEEN_SIDE,
        }
    }

    pub const fn from_char(ch: char) -> Option<CastlingRights> {
        Some(match ch {
            'K' => CastlingRights::WHITE_KING_SIDE,
            'Q' => CastlingRights::WHITE_QUEEN_SIDE,
            'k' => CastlingRights::BLACK_KING_SIDE,
            'q' => CastlingRights::BLACK_QUEEN_SIDE,
            _ => return None,
        })
    }

    /// Reads the rights off the castling flags of the pieces: an unmoved
    /// king on its starting square and an unmoved rook on the corner of
    /// that side. Attacks are not considered.
    pub fn from_board(board: &Board) -> CastlingRights {
        let mut rights = CastlingRights::empty();
        for color in Color::ALL {
            let king_ready = board
                .entry_at(CastlingSide::king_from(color))
                .is_some_and(|entry| entry.piece() == color.king() && entry.can_castle);
            if !king_ready {
                continue;
            }
            for side in CastlingSide::ALL {
                let rook_ready = board
                    .entry_at(side.rook_from(color))
                    .is_some_and(|entry| entry.piece() == color.rook() && entry.can_castle);
                rights.set(CastlingRights::of(color, side), rook_ready);
            }
        }
        rights
    }

    /// Sets the castling flags of the kings and corner rooks named by these
    /// rights. Rights without a matching piece are ignored.
    pub fn apply(self, board: &mut Board) {
        for color in Color::ALL {
            for side in CastlingSide::ALL {
                if !self.contains(CastlingRights::of(color, side)) {
                    continue;
                }
                for (sq, role) in [
                    (CastlingSide::king_from(color), Role::King),
                    (side.rook_from(color), Role::Rook),
                ] {
                    if let Some(id) = board.id_at(sq) {
                        let entry = board.entry_mut(id);
                        if entry.piece() == role.of(color) {
                            entry.can_castle = true;
                        }
                    }
                }
            }
        }
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        for (flag, ch) in [
            (CastlingRights::WHITE_KING_SIDE, "K"),
            (CastlingRights::WHITE_QUEEN_SIDE, "Q"),
            (CastlingRights::BLACK_KING_SIDE, "k"),
            (CastlingRights::BLACK_QUEEN_SIDE, "q"),
        ] {
            if self.contains(flag) {
                f.write_str(ch)?;
            }
        }
        Ok(())
    }
}

/// Largest fullmove number accepted in a FEN.
pub const MAX_FULLMOVES: u32 = 1 << 30;

/// Tests whether `sq` can be the en passant target with `turn` to move: it
/// lies behind an enemy pawn that just made a double step, and both the
/// target and the square the pawn came from are empty.
pub fn is_valid_ep_square(board: &Board, turn: Color, sq: Square) -> bool {
    let forward = turn.forward();
    let (Some(pushed), Some(origin)) = (sq.offset(0, -forward), sq.offset(0, forward)) else {
        return false;
    };
    origin.rank() == (!turn).pawn_rank()
        && board.piece_at(pushed) == Some((!turn).pawn())
        && board.piece_at(sq).is_none()
        && board.piece_at(origin).is_none()
}

/// Errors that can occur when parsing a FEN.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum ParseFenError {
    /// Fewer than six whitespace separated fields.
    TooFewFields,
    InvalidBoard,
    InvalidTurn,
    InvalidCastling,
    InvalidEpSquare,
    InvalidHalfmoveClock,
    InvalidFullmoves,
}

impl fmt::Display for ParseFenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParseFenError::TooFewFields => "invalid fen: too few fields",
            ParseFenError::InvalidBoard => "invalid fen: board part",
            ParseFenError::InvalidTurn => "invalid fen: turn part",
            ParseFenError::InvalidCastling => "invalid fen: castling part",
            ParseFenError::InvalidEpSquare => "invalid fen: en passant part",
            ParseFenError::InvalidHalfmoveClock => "invalid fen: halfmove clock",
            ParseFenError::InvalidFullmoves => "invalid fen: fullmove number",
        })
    }
}

impl Error for ParseFenError {}

/// A parsed FEN.
///
/// The board carries the castling flags named in the castling field.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Fen {
    pub board: Board,
    pub turn: Color,
    pub castling_rights: CastlingRights,
    pub ep_square: Option<Square>,
    pub halfmoves: u32,
    pub fullmoves: NonZeroU32,
}

impl Default for Fen {
    fn default() -> Fen {
        Fen {
            board: Board::default(),
            turn: Color::White,
            castling_rights: CastlingRights::all(),
            ep_square: None,
            halfmoves: 0,
            fullmoves: NonZeroU32::MIN,
        }
    }
}

impl Fen {
    /// Parses a FEN.
    ///
    /// # Errors
    ///
    /// Returns [`ParseFenError`] if the FEN has fewer than six fields, fewer
    /// than eight ranks, or any field is malformed.
    pub fn from_ascii(fen: &[u8]) -> Result<Fen, ParseFenError> {
        let mut parts = fen
            .split(|ch| ch.is_ascii_whitespace())
            .filter(|part| !part.is_empty());

        let fields: [&[u8]; 6] = [
            parts.next().ok_or(ParseFenError::TooFewFields)?,
            parts.next().ok_or(ParseFenError::TooFewFields)?,
            parts.next().ok_or(ParseFenError::TooFewFields)?,
            parts.next().ok_or(ParseFenError::TooFewFields)?,
            parts.next().ok_or(ParseFenError::TooFewFields)?,
            parts.next().ok_or(ParseFenError::TooFewFields)?,
        ];
        let [board_part, turn_part, castling_part, ep_part, halfmoves_part, fullmoves_part] = fields;

        let mut board = Board::from_board_fen(board_part).ok_or(ParseFenError::InvalidBoard)?;

        let turn = match turn_part {
            b"w" => Color::White,
            b"b" => Color::Black,
            _ => return Err(ParseFenError::InvalidTurn),
        };

        let mut castling = CastlingRights::empty();
        if castling_part != b"-" {
            for &ch in castling_part {
                castling |= CastlingRights::from_char(char::from(ch))
                    .ok_or(ParseFenError::InvalidCastling)?;
            }
        }
        castling.apply(&mut board);

        let ep_square = match ep_part {
            b"-" => None,
            _ => {
                let sq = Square::from_ascii(ep_part).map_err(|_| ParseFenError::InvalidEpSquare)?;
                if !is_valid_ep_square(&board, turn, sq) {
                    return Err(ParseFenError::InvalidEpSquare);
                }
                Some(sq)
            }
        };

        let halfmoves = btoi::btou(halfmoves_part).map_err(|_| ParseFenError::InvalidHalfmoveClock)?;
        let fullmoves = btoi::btou(fullmoves_part)
            .ok()
            .filter(|&n| n <= MAX_FULLMOVES)
            .and_then(NonZeroU32::new)
            .ok_or(ParseFenError::InvalidFullmoves)?;

        Ok(Fen {
            castling_rights: CastlingRights::from_board(&board),
            board,
            turn,
            ep_square,
            halfmoves,
            fullmoves,
        })
    }

    /// The position-only part: placement, turn, castling and en passant.
    pub fn epd(&self) -> String {
        epd(&self.board, self.turn, self.ep_square)
    }
}

impl FromStr for Fen {
    type Err = ParseFenError;

    fn from_str(fen: &str) -> Result<Fen, ParseFenError> {
        Fen::from_ascii(fen.as_bytes())
    }
}

impl fmt::Display for Fen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            self.board.board_fen(),
            self.turn.char(),
            self.castling_rights,
            self.ep_square.map_or("-".to_owned(), |sq| sq.to_string()),
            self.halfmoves,
            self.fullmoves
        )
    }
}

/// Creates an EPD such as `rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -`,
/// taking castling rights from the castling flags on the board.
pub fn epd(board: &Board, turn: Color, ep_square: Option<Square>) -> String {
    format!(
        "{} {} {} {}",
        board.board_fen(),
        turn.char(),
        CastlingRights::from_board(board),
        ep_square.map_or("-".to_owned(), |sq| sq.to_string())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_position() {
        let start = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        let fen: Fen = start.parse().expect("valid fen");
        assert_eq!(fen, Fen::default());
        assert_eq!(fen.to_string(), start);
        assert_eq!(fen.epd(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -");
    }

    #[test]
    fn test_castling_flags() {
        let fen: Fen = "r3k2r/8/8/8/8/8/8/R3K2R w Kq - 0 1".parse().expect("valid fen");
        assert_eq!(
            fen.castling_rights,
            CastlingRights::WHITE_KING_SIDE | CastlingRights::BLACK_QUEEN_SIDE
        );
        let can_castle = |sq| fen.board.entry_at(sq).is_some_and(|entry| entry.can_castle);
        assert!(can_castle(Square::E1));
        assert!(can_castle(Square::H1));
        assert!(!can_castle(Square::A1));
        assert!(can_castle(Square::A8));
        assert!(!can_castle(Square::H8));
        assert!(fen.to_string().contains(" Kq "));
    }

    #[test]
    fn test_rights_without_rook() {
        let fen: Fen = "4k3/8/8/8/8/8/8/4K3 w KQkq - 0 1".parse().expect("valid fen");
        assert_eq!(fen.castling_rights, CastlingRights::empty());
        assert_eq!(fen.to_string(), "4k3/8/8/8/8/8/8/4K3 w - - 0 1");
    }

    #[test]
    fn test_invalid() {
        assert_eq!(
            "8/8/8/8/8/8/8/8 w - - 0".parse::<Fen>(),
            Err(ParseFenError::TooFewFields)
        );
        assert_eq!(
            "8/8/8/8/8/8/8 w - - 0 1".parse::<Fen>(),
            Err(ParseFenError::InvalidBoard)
        );
        assert_eq!(
            "8/8/8/8/8/8/8/8 x - - 0 1".parse::<Fen>(),
            Err(ParseFenError::InvalidTurn)
        );
        assert_eq!(
            "8/8/8/8/8/8/8/8 w KX - 0 1".parse::<Fen>(),
            Err(ParseFenError::InvalidCastling)
        );
        assert_eq!(
            "8/8/8/8/8/8/8/8 w - e9 0 1".parse::<Fen>(),
            Err(ParseFenError::InvalidEpSquare)
        );
        assert_eq!(
            "8/8/8/8/8/8/8/8 w - - x 1".parse::<Fen>(),
            Err(ParseFenError::InvalidHalfmoveClock)
        );
        assert_eq!(
            "8/8/8/8/8/8/8/8 w - - 0 0".parse::<Fen>(),
            Err(ParseFenError::InvalidFullmoves)
        );
    }

    #[test]
    fn test_fullmoves_limit() {
        let fen: Fen = "4k3/8/8/8/8/8/8/4K3 b - - 0 1073741824".parse().expect("valid fen");
        assert_eq!(fen.fullmoves.get(), MAX_FULLMOVES);
        assert_eq!(
            "4k3/8/8/8/8/8/8/4K3 w - - 0 1073741825".parse::<Fen>(),
            Err(ParseFenError::InvalidFullmoves)
        );
        assert_eq!(
            "4k3/8/8/8/8/8/8/4K3 w - - 0 4294967295".parse::<Fen>(),
            Err(ParseFenError::InvalidFullmoves)
        );
    }

    #[test]
    fn test_bogus_en_passant_target() {
        // No black pawn behind e3.
        assert_eq!(
            "4k3/8/8/8/8/8/3PN3/4K3 w - e3 0 1".parse::<Fen>(),
            Err(ParseFenError::InvalidEpSquare)
        );
        // Wrong side to move.
        assert_eq!(
            "4k3/8/8/3pP3/8/8/8/4K3 b - d6 0 1".parse::<Fen>(),
            Err(ParseFenError::InvalidEpSquare)
        );
        // Origin square occupied.
        assert_eq!(
            "4k3/3n4/8/3pP3/8/8/8/4K3 w - d6 0 1".parse::<Fen>(),
            Err(ParseFenError::InvalidEpSquare)
        );
        // A knight is not a pawn.
        assert_eq!(
            "4k3/8/8/3nP3/8/8/8/4K3 w - d6 0 1".parse::<Fen>(),
            Err(ParseFenError::InvalidEpSquare)
        );
        assert!("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1".parse::<Fen>().is_ok());
    }

    #[test]
    fn test_en_passant_field() {
        let fen: Fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
            .parse()
            .expect("valid fen");
        assert_eq!(fen.ep_square, Some(Square::E3));
        assert_eq!(fen.turn, Color::Black);
    }
}
