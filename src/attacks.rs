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

//! Sight lines and attack queries.
//!
//! Every role sees along a fixed table of [`SightLine`]s. Queries run on a
//! [`Mailbox`], a plain copy of the placement, so checking whether a move
//! would leave the king in check never touches the live
//! [`Board`](crate::Board).
//!
//! # Examples
//!
//! ```
//! use kibitz::{attacks, Board, Color, Role, Square};
//!
//! let mailbox = Board::default().mailbox();
//! // . . . . . . . .
//! // . . . . . . . .
//! // . . . . . . . .
//! // . . . . . . . .
//! // . . . . . . . .
//! // 1 . 1 . . . . .
//! // . . . 1 . . . .
//! // . N . . . . . .
//! let sight = attacks::sight(&mailbox, Square::B1, Role::Knight.of(Color::White));
//! assert!(sight.contains(&Square::C3));
//! assert!(sight.contains(&Square::D2));
//!
//! assert!(attacks::is_attacked(&mailbox, Square::F3, Color::White));
//! assert!(!attacks::in_check(&mailbox, Color::White));
//! ```

use arrayvec::ArrayVec;

use crate::{Color, Piece, Role, Square};

/// A direction together with the number of steps a piece can see along it.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct SightLine {
    pub dfile: i8,
    pub drank: i8,
    pub reach: u8,
}

const fn line(dfile: i8, drank: i8, reach: u8) -> SightLine {
    SightLine {
        dfile,
        drank,
        reach,
    }
}

const KNIGHT_LINES: [SightLine; 8] = [
    line(1, 2, 1),
    line(2, 1, 1),
    line(2, -1, 1),
    line(1, -2, 1),
    line(-1, -2, 1),
    line(-2, -1, 1),
    line(-2, 1, 1),
    line(-1, 2, 1),
];

const BISHOP_LINES: [SightLine; 4] = [line(1, 1, 8), line(1, -1, 8), line(-1, -1, 8), line(-1, 1, 8)];

const ROOK_LINES: [SightLine; 4] = [line(0, 1, 8), line(1, 0, 8), line(0, -1, 8), line(-1, 0, 8)];

const QUEEN_LINES: [SightLine; 8] = [
    line(0, 1, 8),
    line(1, 1, 8),
    line(1, 0, 8),
    line(1, -1, 8),
    line(0, -1, 8),
    line(-1, -1, 8),
    line(-1, 0, 8),
    line(-1, 1, 8),
];

const KING_LINES: [SightLine; 8] = [
    line(0, 1, 1),
    line(1, 1, 1),
    line(1, 0, 1),
    line(1, -1, 1),
    line(0, -1, 1),
    line(-1, -1, 1),
    line(-1, 0, 1),
    line(-1, 1, 1),
];

const WHITE_PAWN_LINES: [SightLine; 2] = [line(-1, 1, 1), line(1, 1, 1)];

const BLACK_PAWN_LINES: [SightLine; 2] = [line(-1, -1, 1), line(1, -1, 1)];

/// Sight lines of a piece. Pawns see their two forward diagonals only.
pub const fn sight_lines(piece: Piece) -> &'static [SightLine] {
    match piece.role {
        Role::Pawn => match piece.color {
            Color::White => &WHITE_PAWN_LINES,
            Color::Black => &BLACK_PAWN_LINES,
        },
        Role::Knight => &KNIGHT_LINES,
        Role::Bishop => &BISHOP_LINES,
        Role::Rook => &ROOK_LINES,
        Role::Queen => &QUEEN_LINES,
        Role::King => &KING_LINES,
    }
}

/// A copy of the piece placement, indexed by square.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct Mailbox([Option<Piece>; 64]);

impl Mailbox {
    pub const fn empty() -> Mailbox {
        Mailbox([None; 64])
    }

    #[inline]
    pub const fn get(&self, sq: Square) -> Option<Piece> {
        self.0[sq.index()]
    }

    #[inline]
    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        self.0[sq.index()] = piece;
    }

    #[inline]
    pub fn take(&mut self, sq: Square) -> Option<Piece> {
        self.0[sq.index()].take()
    }

    /// Moves whatever stands on `from` to `to`, replacing the occupant of
    /// `to`.
    pub fn relocate(&mut self, from: Square, to: Square) {
        let piece = self.take(from);
        self.set(to, piece);
    }

    #[inline]
    pub const fn is_occupied(&self, sq: Square) -> bool {
        self.0[sq.index()].is_some()
    }

    pub fn king_of(&self, color: Color) -> Option<Square> {
        Square::all().find(|&sq| self.get(sq) == Some(color.king()))
    }

    /// Occupied squares with their pieces, in scan order.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(|sq| self.get(sq).map(|piece| (sq, piece)))
    }
}

/// Squares seen by `piece` standing on `from`. Each line stops at the first
/// occupied square, which is included whatever its color.
pub fn sight(mailbox: &Mailbox, from: Square, piece: Piece) -> ArrayVec<Square, 28> {
    let mut squares = ArrayVec::new();
    for sight_line in sight_lines(piece) {
        let mut sq = from;
        for _ in 0..sight_line.reach {
            match sq.offset(sight_line.dfile, sight_line.drank) {
                Some(next) => sq = next,
                None => break,
            }
            squares.push(sq);
            if mailbox.is_occupied(sq) {
                break;
            }
        }
    }
    squares
}

/// Tests if `piece` on `from` attacks `target`: `target` lies on one of its
/// sight lines within reach and every square strictly between is empty.
pub fn attacks(mailbox: &Mailbox, from: Square, piece: Piece, target: Square) -> bool {
    sight_lines(piece).iter().any(|sight_line| {
        let mut sq = from;
        for _ in 0..sight_line.reach {
            match sq.offset(sight_line.dfile, sight_line.drank) {
                Some(next) => sq = next,
                None => return false,
            }
            if sq == target {
                return true;
            }
            if mailbox.is_occupied(sq) {
                return false;
            }
        }
        false
    })
}

/// Tests if any piece of color `by` attacks `sq`.
pub fn is_attacked(mailbox: &Mailbox, sq: Square, by: Color) -> bool {
    mailbox
        .pieces()
        .any(|(from, piece)| piece.color == by && attacks(mailbox, from, piece, sq))
}

/// Tests if the king of `color` is attacked. A side without a king is never
/// in check.
pub fn in_check(mailbox: &Mailbox, color: Color) -> bool {
    mailbox
        .king_of(color)
        .is_some_and(|king| is_attacked(mailbox, king, !color))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Board;

    fn mailbox(board_fen: &str) -> Mailbox {
        Board::from_board_fen(board_fen.as_bytes())
            .expect("valid board fen")
            .mailbox()
    }

    #[test]
    fn test_slider_blocked() {
        let mailbox = mailbox("4k3/8/8/8/4p3/8/8/4R1K1");
        let rook = Color::White.rook();
        assert!(attacks(&mailbox, Square::E1, rook, Square::E4));
        assert!(!attacks(&mailbox, Square::E1, rook, Square::E8));
        assert!(!in_check(&mailbox, Color::Black));

        let sight = sight(&mailbox, Square::E1, rook);
        assert!(sight.contains(&Square::E4));
        assert!(!sight.contains(&Square::E5));
        assert!(sight.contains(&Square::F1));
        assert!(sight.contains(&Square::G1));
        assert!(!sight.contains(&Square::H1));
    }

    #[test]
    fn test_pawn_sees_diagonals() {
        let mailbox = mailbox("4k3/8/8/8/8/8/4P3/4K3");
        let pawn = Color::White.pawn();
        assert!(attacks(&mailbox, Square::E2, pawn, Square::D3));
        assert!(attacks(&mailbox, Square::E2, pawn, Square::F3));
        assert!(!attacks(&mailbox, Square::E2, pawn, Square::E3));
        assert!(attacks(&mailbox, Square::D4, Color::Black.pawn(), Square::E3));
    }

    #[test]
    fn test_in_check() {
        assert!(in_check(&mailbox("4k3/8/8/8/1b6/8/8/4K3"), Color::White));
        assert!(!in_check(&mailbox("4k3/8/8/8/1b6/2P5/8/4K3"), Color::White));
        assert!(in_check(&mailbox("4k3/8/3N4/8/8/8/8/4K3"), Color::Black));
        assert!(!in_check(&mailbox("8/8/8/8/8/8/8/8"), Color::White));
    }

    #[test]
    fn test_edges() {
        let mailbox = Mailbox::empty();
        let sight = sight(&mailbox, Square::A1, Color::Black.king());
        assert_eq!(sight.len(), 3);
        let sight = super::sight(&mailbox, Square::H8, Role::Knight.of(Color::White));
        assert_eq!(sight.len(), 2);
    }
}
