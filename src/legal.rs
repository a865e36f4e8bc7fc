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

//! Legal move index.
//!
//! A pseudo-legal move is legal if the mover's king is not attacked on a
//! [`Mailbox`] copy with the move applied.

use arrayvec::ArrayVec;
use bitflags::bitflags;

use crate::{
    attacks::{self, Mailbox},
    movegen, Board, Color, Move, MoveList, Square,
};

bitflags! {
    /// Annotations of a legal move.
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
    pub struct MoveFlags: u8 {
        /// Takes an enemy piece, en passant included.
        const CAPTURE = 1;
        /// Attacks the enemy king.
        const CHECK = 2;
        /// Castles.
        const CASTLE = 4;
    }
}

/// A legal move together with its annotations.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct LegalEntry {
    pub m: Move,
    pub flags: MoveFlags,
}

impl LegalEntry {
    #[inline]
    pub fn to(&self) -> Square {
        self.m.to()
    }

    #[inline]
    pub fn is_capture(&self) -> bool {
        self.flags.contains(MoveFlags::CAPTURE)
    }

    #[inline]
    pub fn is_check(&self) -> bool {
        self.flags.contains(MoveFlags::CHECK)
    }

    #[inline]
    pub fn is_castle(&self) -> bool {
        self.flags.contains(MoveFlags::CASTLE)
    }
}

/// Legal destinations of a single piece.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Origin {
    pub from: Square,
    pub entries: ArrayVec<LegalEntry, 32>,
}

impl Origin {
    pub fn find(&self, to: Square) -> Option<&LegalEntry> {
        self.entries.iter().find(|entry| entry.to() == to)
    }
}

/// Legal moves of one player, grouped by origin square.
///
/// Origins are kept in scan order. Pieces without a legal move have no
/// origin.
///
/// # Examples
///
/// ```
/// use kibitz::{legal::LegalMoves, Board, Color, Square};
///
/// let board = Board::default();
/// let legal = LegalMoves::generate(&board, Color::White, None);
/// assert_eq!(legal.len(), 20);
/// assert!(legal.contains(Square::G1, Square::F3));
/// assert!(!legal.contains(Square::D1, Square::H5));
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Default, Eq, PartialEq, Debug, Hash)]
pub struct LegalMoves {
    origins: Vec<Origin>,
}

impl LegalMoves {
    /// Computes the legal moves of `color`. `ep_square` is the en passant
    /// target if `color` is to move.
    pub fn generate(board: &Board, color: Color, ep_square: Option<Square>) -> LegalMoves {
        let mailbox = board.mailbox();
        let mut origins = Vec::new();

        for (_, entry) in board.pieces_of(color) {
            let Some(from) = entry.square() else {
                continue;
            };

            let mut pseudo = MoveList::new();
            movegen::piece_moves(board, &mailbox, from, entry, ep_square, &mut pseudo);

            let entries: ArrayVec<LegalEntry, 32> = pseudo
                .into_iter()
                .filter_map(|m| {
                    let after = after(&mailbox, m);
                    if attacks::in_check(&after, color) {
                        return None;
                    }
                    let mut flags = MoveFlags::empty();
                    flags.set(MoveFlags::CAPTURE, m.is_capture());
                    flags.set(MoveFlags::CHECK, attacks::in_check(&after, !color));
                    flags.set(MoveFlags::CASTLE, m.is_castle());
                    Some(LegalEntry { m, flags })
                })
                .collect();

            if !entries.is_empty() {
                origins.push(Origin { from, entries });
            }
        }

        LegalMoves { origins }
    }

    pub fn get(&self, from: Square) -> Option<&Origin> {
        self.origins.iter().find(|origin| origin.from == from)
    }

    pub fn find(&self, from: Square, to: Square) -> Option<&LegalEntry> {
        self.get(from).and_then(|origin| origin.find(to))
    }

    pub fn contains(&self, from: Square, to: Square) -> bool {
        self.find(from, to).is_some()
    }

    pub fn origins(&self) -> impl ExactSizeIterator<Item = &Origin> {
        self.origins.iter()
    }

    /// All legal moves, grouped by origin in scan order.
    pub fn iter(&self) -> impl Iterator<Item = &LegalEntry> {
        self.origins.iter().flat_map(|origin| origin.entries.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    /// Number of legal moves. Promotions count once.
    pub fn len(&self) -> usize {
        self.origins.iter().map(|origin| origin.entries.len()).sum()
    }
}

/// Copies `mailbox` and plays `m` on the copy: the captured piece
/// disappears, an en passant victim is removed and a castling rook is
/// relocated.
pub fn after(mailbox: &Mailbox, m: Move) -> Mailbox {
    let mut after = *mailbox;
    match m {
        Move::Normal {
            from,
            to,
            promotion,
            ..
        } => {
            let piece = after.take(from);
            after.set(
                to,
                piece.map(|piece| promotion.map_or(piece, |role| role.of(piece.color))),
            );
        }
        Move::EnPassant { from, to } => {
            after.relocate(from, to);
            after.take(to.with_rank(from.rank()));
        }
        Move::Castle { king, rook } => {
            let color = Color::from_white(king.rank() == Color::White.backrank());
            let side = m.castling_side();
            let king_piece = after.take(king);
            let rook_piece = after.take(rook);
            if let Some(side) = side {
                after.set(side.king_to(color), king_piece);
                after.set(side.rook_to(color), rook_piece);
            }
        }
    }
    after
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    fn board(board_fen: &str) -> Board {
        Board::from_board_fen(board_fen.as_bytes()).expect("valid board fen")
    }

    #[test]
    fn test_pinned_piece() {
        // The knight on e2 is pinned by the rook on e8.
        let legal = LegalMoves::generate(&board("4r1k1/8/8/8/8/8/4N3/4K3"), Color::White, None);
        assert!(legal.get(Square::E2).is_none());
        assert!(legal.get(Square::E1).is_some());
        assert!(!legal.contains(Square::E1, Square::E2));
    }

    #[test]
    fn test_flags() {
        let legal = LegalMoves::generate(&board("4k3/8/8/3p4/8/8/8/3QK3"), Color::White, None);
        let capture = legal.find(Square::D1, Square::D5).expect("Qxd5");
        assert!(capture.is_capture());
        assert!(!capture.is_check());
        let check = legal.find(Square::D1, Square::A4).expect("Qa4+");
        assert!(check.is_check());
        assert!(!check.is_capture());
    }

    #[test]
    fn test_en_passant_is_capture() {
        let legal = LegalMoves::generate(&board("4k3/8/8/3pP3/8/8/8/4K3"), Color::White, Some(Square::D6));
        let ep = legal.find(Square::E5, Square::D6).expect("exd6");
        assert!(ep.m.is_en_passant());
        assert!(ep.is_capture());
    }

    #[test]
    fn test_after_castle() {
        let mailbox = board("4k3/8/8/8/8/8/8/R3K3").mailbox();
        let after = after(
            &mailbox,
            Move::Castle {
                king: Square::E1,
                rook: Square::A1,
            },
        );
        assert_eq!(after.get(Square::C1), Some(Color::White.king()));
        assert_eq!(after.get(Square::D1), Some(Role::Rook.of(Color::White)));
        assert!(!after.is_occupied(Square::E1));
        assert!(!after.is_occupied(Square::A1));
    }

    #[test]
    fn test_stalemate_has_no_moves() {
        let legal = LegalMoves::generate(&board("7k/5Q2/6K1/8/8/8/8/8"), Color::Black, None);
        assert!(legal.is_empty());
        assert_eq!(legal.len(), 0);
    }
}
