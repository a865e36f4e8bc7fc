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

//! Read and write Standard Algebraic Notation.
//!
//! The reader is forgiving: capture marks, check marks and separators are
//! skipped, and the origin of the moving piece is only used to choose
//! between candidates.
//!
//! # Examples
//!
//! Parse a move token:
//!
//! ```
//! use kibitz::{san::San, Role, Square};
//!
//! let san: San = "Nxf3+".parse()?;
//! assert_eq!(
//!     san,
//!     San::Normal {
//!         role: Role::Knight,
//!         file: None,
//!         rank: None,
//!         to: Square::F3,
//!         promotion: None,
//!     }
//! );
//! assert_eq!(san.to_string(), "Nf3");
//! # Ok::<_, kibitz::san::ParseSanError>(())
//! ```
//!
//! Converting to a move:
//!
//! ```
//! # use kibitz::san::{ParseSanError, San, SanError};
//! use kibitz::{Game, Move, Role, Square};
//!
//! # let san: San = "Nf3".parse()?;
//! let game = Game::new();
//! let m = san.to_move(&game)?;
//!
//! assert_eq!(m, Move::Normal {
//!     role: Role::Knight,
//!     from: Square::G1,
//!     capture: None,
//!     to: Square::F3,
//!     promotion: None,
//! });
//!
//! # #[derive(Debug)] struct CommonError;
//! # impl From<ParseSanError> for CommonError { fn from(_: ParseSanError) -> Self { Self } }
//! # impl From<SanError> for CommonError { fn from(_: SanError) -> Self { Self } }
//! # Ok::<_, CommonError>(())
//! ```

use std::{
    error::Error,
    fmt::{self, Write as _},
    str::FromStr,
};

use crate::{
    game::Game,
    history::{Disambiguation, MoveRecord, Special, Status},
    legal::LegalMoves,
    Board, CastlingSide, File, Move, Rank, Role, Square,
};

/// Error when parsing a malformed move token.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseSanError;

impl fmt::Display for ParseSanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("bad format")
    }
}

impl Error for ParseSanError {}

/// Error when a move token does not name exactly one legal move.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SanError {
    /// No piece of that kind matches the token.
    NoPiece,
    /// Several pieces can make the move.
    Ambiguous,
    /// The piece cannot go there.
    IllegalMove,
}

impl fmt::Display for SanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match *self {
            SanError::NoPiece => "no available piece",
            SanError::Ambiguous => "ambiguous",
            SanError::IllegalMove => "illegal move",
        })
    }
}

impl Error for SanError {}

/// A move token.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum San {
    Normal {
        role: Role,
        file: Option<File>,
        rank: Option<Rank>,
        to: Square,
        promotion: Option<Role>,
    },
    Castle(CastlingSide),
}

impl San {
    /// Parses a move token.
    ///
    /// A leading file letter starts a pawn move, `N`, `B`, `R`, `Q` or `K`
    /// a piece move, and `O`, `o` or `0` castling: two of them castle king
    /// side, three or more queen side. The rest is read right to left:
    /// optional promotion letter, destination rank and file, then optional
    /// origin rank and file. Anything else is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ParseSanError`] if the token is shorter than two bytes,
    /// starts with an unknown byte, or lacks a destination.
    pub fn from_ascii(san: &[u8]) -> Result<San, ParseSanError> {
        let (&first, _) = san.split_first().ok_or(ParseSanError)?;
        if san.len() < 2 {
            return Err(ParseSanError);
        }

        let role = if File::from_char(char::from(first)).is_some() {
            Role::Pawn
        } else {
            match first {
                b'N' | b'B' | b'R' | b'Q' | b'K' => Role::from_char(char::from(first)).ok_or(ParseSanError)?,
                b'O' | b'o' | b'0' => return San::castle_from_ascii(san),
                _ => return Err(ParseSanError),
            }
        };

        let mut promotion = None;
        let mut to_rank = None;
        let mut to_file = None;
        let mut rank = None;
        let mut file = None;

        for &byte in san.iter().rev() {
            let ch = char::from(byte);
            if to_rank.is_none() {
                if let Some(r) = Rank::from_char(ch) {
                    to_rank = Some(r);
                } else if promotion.is_none() {
                    promotion = Role::promotion_from_char(ch);
                }
            } else if to_file.is_none() {
                to_file = File::from_char(ch);
            } else if rank.is_none() {
                if let Some(r) = Rank::from_char(ch) {
                    rank = Some(r);
                } else if let Some(f) = File::from_char(ch) {
                    file = Some(f);
                    break;
                }
            } else if let Some(f) = File::from_char(ch) {
                file = Some(f);
                break;
            }
        }

        match (to_file, to_rank) {
            (Some(to_file), Some(to_rank)) => Ok(San::Normal {
                role,
                file,
                rank,
                to: Square::from_coords(to_file, to_rank),
                promotion,
            }),
            _ => Err(ParseSanError),
        }
    }

    fn castle_from_ascii(san: &[u8]) -> Result<San, ParseSanError> {
        match san
            .iter()
            .filter(|&&ch| matches!(ch, b'O' | b'o' | b'0'))
            .count()
        {
            2 => Ok(San::Castle(CastlingSide::KingSide)),
            n if n >= 3 => Ok(San::Castle(CastlingSide::QueenSide)),
            _ => Err(ParseSanError),
        }
    }

    /// Resolves the token against the legal moves of the side to move.
    ///
    /// Pawns reaching the last rank are promoted to the requested role, or
    /// to a queen if none was given.
    ///
    /// # Errors
    ///
    /// Returns [`SanError::NoPiece`] if no piece of the role is left after
    /// filtering by the given origin file and rank, or several are left but
    /// none of them can make the move; [`SanError::IllegalMove`] if exactly
    /// one is left and it cannot make the move; [`SanError::Ambiguous`] if
    /// several can make it.
    pub fn to_move(&self, game: &Game) -> Result<Move, SanError> {
        let color = game.turn();
        let legal = game.legal(color);

        match *self {
            San::Normal {
                role,
                file,
                rank,
                to,
                promotion,
            } => {
                let candidates: Vec<Square> = game
                    .pieces_of_role(color, role)
                    .filter(|from| file.is_none_or(|f| f == from.file()))
                    .filter(|from| rank.is_none_or(|r| r == from.rank()))
                    .collect();

                let only_candidate = candidates.len() == 1;
                let mut moves = candidates
                    .into_iter()
                    .filter_map(|from| legal.find(from, to).map(|entry| entry.m));

                match (moves.next(), moves.next()) {
                    (Some(m), None) => Ok(promotion.map_or(m, |role| m.with_promotion(role))),
                    (Some(_), Some(_)) => Err(SanError::Ambiguous),
                    (None, _) if only_candidate => Err(SanError::IllegalMove),
                    (None, _) => Err(SanError::NoPiece),
                }
            }
            San::Castle(side) => {
                let king = game
                    .pieces_of_role(color, Role::King)
                    .next()
                    .ok_or(SanError::NoPiece)?;
                legal
                    .get(king)
                    .and_then(|origin| {
                        origin
                            .entries
                            .iter()
                            .find(|entry| entry.m.castling_side() == Some(side))
                    })
                    .map(|entry| entry.m)
                    .ok_or(SanError::IllegalMove)
            }
        }
    }
}

impl FromStr for San {
    type Err = ParseSanError;

    fn from_str(san: &str) -> Result<San, ParseSanError> {
        San::from_ascii(san.as_bytes())
    }
}

impl fmt::Display for San {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            San::Normal {
                role,
                file,
                rank,
                to,
                promotion,
            } => {
                if role != Role::Pawn {
                    f.write_char(role.upper_char())?;
                }
                if let Some(file) = file {
                    f.write_char(file.char())?;
                }
                if let Some(rank) = rank {
                    f.write_char(rank.char())?;
                }
                write!(f, "{to}")?;
                if let Some(promotion) = promotion {
                    write!(f, "={}", promotion.upper_char())?;
                }
                Ok(())
            }
            San::Castle(side) => f.write_str(side.san()),
        }
    }
}

/// Finds the origin file and/or rank needed to tell `m` apart from moves of
/// other pieces of the same role to the same square.
///
/// Pawn moves and castling never need one.
pub fn disambiguation(board: &Board, legal: &LegalMoves, m: Move) -> Disambiguation {
    let (role, from, to) = match m {
        Move::Normal { role, from, to, .. } if role != Role::Pawn => (role, from, to),
        _ => return Disambiguation::default(),
    };

    let (rank, file) = legal
        .origins()
        .filter(|origin| origin.from != from)
        .filter(|origin| board.entry_at(origin.from).is_some_and(|entry| entry.role == role))
        .filter(|origin| origin.find(to).is_some())
        .fold((false, false), |(rank, file), origin| {
            if from.rank() == origin.from.rank() || from.file() != origin.from.file() {
                (rank, true)
            } else {
                (true, file)
            }
        });

    Disambiguation {
        file: file.then(|| from.file()),
        rank: rank.then(|| from.rank()),
    }
}

/// Writes an executed move in algebraic notation, with `+` for check, `#`
/// and the result for checkmate, and ` ½-½` for a draw.
impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(side) = self.castling_side() {
            f.write_str(side.san())?;
        } else if self.role == Role::Pawn {
            if self.is_capture() {
                write!(f, "{}x", self.from.file())?;
            }
            write!(f, "{}", self.to)?;
            if let Some(Special::Promotion(role)) = self.special {
                write!(f, "={}", role.upper_char())?;
            }
        } else {
            write!(
                f,
                "{}{}{}{}",
                self.role.upper_char(),
                self.disambiguation,
                if self.is_capture() { "x" } else { "" },
                self.to
            )?;
        }

        match self.status {
            Some(Status::Check) => f.write_char('+'),
            Some(Status::Checkmate) => {
                f.write_str(if self.color.is_white() { "# 1-0" } else { "# 0-1" })
            }
            Some(_) => f.write_str(" ½-½"),
            None => Ok(()),
        }
    }
}

/// Numbers the moves of a history: `1. e4 e5 2. Nf3`. A history starting
/// with a black move opens with `1. ...`.
pub fn movetext(history: &[MoveRecord]) -> String {
    let mut text = String::new();
    for (i, record) in history.iter().enumerate() {
        let number = record.ply / 2 + 1;
        if record.color.is_white() {
            if i > 0 {
                text.push(' ');
            }
            let _ = write!(text, "{number}. ");
        } else if i == 0 {
            let _ = write!(text, "{number}. ... ");
        } else {
            text.push(' ');
        }
        let _ = write!(text, "{record}");
    }
    text
}
