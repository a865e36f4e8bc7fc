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

use std::fmt;

use crate::{Color, Role, Square};

/// A piece with [`Color`] and [`Role`].
#[allow(missing_docs)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct Piece {
    pub color: Color,
    pub role: Role,
}

impl Piece {
    /// FEN letter: uppercase for white, lowercase for black.
    pub const fn char(self) -> char {
        match self.color {
            Color::White => self.role.upper_char(),
            Color::Black => self.role.char(),
        }
    }

    pub fn from_char(ch: char) -> Option<Piece> {
        Role::from_char(ch).map(|role| role.of(Color::from_white(ch.is_ascii_uppercase())))
    }
}

/// Stable identity of a piece for the whole game.
///
/// Pieces are never removed from the [`Board`](crate::Board) arena, so an
/// id stays valid through captures, promotions and undo.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub struct PieceId(pub(crate) u8);

impl PieceId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Where a piece currently is.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Location {
    OnBoard(Square),
    Captured,
}

impl Location {
    pub const fn square(self) -> Option<Square> {
        match self {
            Location::OnBoard(sq) => Some(sq),
            Location::Captured => None,
        }
    }
}

/// A piece in the board arena.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct PieceEntry {
    pub color: Color,
    /// Changes only on promotion and when a promotion is undone.
    pub role: Role,
    pub location: Location,
    /// Set for kings and rooks that have not moved yet and still count for
    /// castling.
    pub can_castle: bool,
}

impl PieceEntry {
    #[inline]
    pub const fn piece(&self) -> Piece {
        self.role.of(self.color)
    }

    #[inline]
    pub const fn square(&self) -> Option<Square> {
        self.location.square()
    }
}

/// Describes the piece the way it is read out to players:
/// `Knight on f3` or `Pawn: Captured`. The alternate form `{:#}` also names
/// the color, `White Knight on f3`.
impl fmt::Display for PieceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{} ", self.color.name())?;
        }
        match self.location {
            Location::OnBoard(sq) => write!(f, "{} on {}", self.role.name(), sq),
            Location::Captured => write!(f, "{}: Captured", self.role.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_char() {
        assert_eq!(Piece::from_char('Q'), Some(Role::Queen.of(Color::White)));
        assert_eq!(Piece::from_char('n'), Some(Role::Knight.of(Color::Black)));
        assert_eq!(Piece::from_char('x'), None);
        assert_eq!(Color::Black.king().char(), 'k');
    }

    #[test]
    fn test_entry_display() {
        let mut entry = PieceEntry {
            color: Color::White,
            role: Role::Knight,
            location: Location::OnBoard(Square::F3),
            can_castle: false,
        };
        assert_eq!(entry.to_string(), "Knight on f3");
        assert_eq!(format!("{entry:#}"), "White Knight on f3");
        entry.location = Location::Captured;
        assert_eq!(entry.to_string(), "Knight: Captured");
    }
}
