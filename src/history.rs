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

//! Move records and repetition bookkeeping.

use std::{collections::HashMap, fmt};

use crate::{CastlingSide, Color, File, PieceId, Rank, Role, Square};

/// What a move did beyond moving a piece from one square to another.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Special {
    /// A pawn stepped two squares.
    DoublePush,
    /// The king castled. The rook moved too.
    Castle(CastlingSide),
    /// A pawn captured en passant.
    EnPassant,
    /// A pawn was promoted to the given role.
    Promotion(Role),
    /// A king or rook moved for the first time and gave up castling.
    WaivedCastling,
}

/// State of the game after a move.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Status {
    Check,
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    Repetition,
    FiftyMoves,
}

impl Status {
    /// Tests if the game ended.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Status::Check)
    }

    pub const fn is_draw(self) -> bool {
        matches!(
            self,
            Status::Stalemate | Status::InsufficientMaterial | Status::Repetition | Status::FiftyMoves
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Check => "check",
            Status::Checkmate => "checkmate",
            Status::Stalemate => "stalemate",
            Status::InsufficientMaterial => "insufficient material",
            Status::Repetition => "threefold repetition",
            Status::FiftyMoves => "fifty-move rule",
        })
    }
}

/// Origin file and/or rank that singles out the moving piece in algebraic
/// notation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Default)]
pub struct Disambiguation {
    pub file: Option<File>,
    pub rank: Option<Rank>,
}

impl fmt::Display for Disambiguation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(file) = self.file {
            write!(f, "{file}")?;
        }
        if let Some(rank) = self.rank {
            write!(f, "{rank}")?;
        }
        Ok(())
    }
}

/// An executed move, with everything needed to take it back.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct MoveRecord {
    /// Number of half-moves played before this one, counted from the
    /// start of the game.
    pub ply: u32,
    pub piece: PieceId,
    pub color: Color,
    /// Role of the moving piece before the move.
    pub role: Role,
    pub from: Square,
    pub to: Square,
    pub disambiguation: Disambiguation,
    pub capture: Option<PieceId>,
    pub special: Option<Special>,
    /// Fifty-move counter before the move.
    pub halfmoves: u32,
    pub status: Option<Status>,
    /// Hash of the resulting position.
    pub hash: u32,
}

impl MoveRecord {
    pub fn is_capture(&self) -> bool {
        self.capture.is_some()
    }

    pub fn promotion(&self) -> Option<Role> {
        match self.special {
            Some(Special::Promotion(role)) => Some(role),
            _ => None,
        }
    }

    pub fn castling_side(&self) -> Option<CastlingSide> {
        match self.special {
            Some(Special::Castle(side)) => Some(side),
            _ => None,
        }
    }
}

#[cfg(feature = "nohash-hasher")]
type BuildHasher = nohash_hasher::BuildNoHashHasher<u32>;
#[cfg(not(feature = "nohash-hasher"))]
type BuildHasher = std::collections::hash_map::RandomState;

/// Number of times each position occurred, keyed by [`position_hash`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Default, Debug)]
pub struct PositionCounts {
    counts: HashMap<u32, u32, BuildHasher>,
}

impl PositionCounts {
    /// Counts one more occurrence and returns the new count.
    pub fn increment(&mut self, hash: u32) -> u32 {
        let count = self.counts.entry(hash).or_insert(0);
        *count += 1;
        *count
    }

    /// Forgets one occurrence. The entry is dropped when it reaches zero.
    pub fn decrement(&mut self, hash: u32) {
        if let Some(count) = self.counts.get_mut(&hash) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(&hash);
            }
        }
    }

    pub fn get(&self, hash: u32) -> u32 {
        self.counts.get(&hash).copied().unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl PartialEq for PositionCounts {
    fn eq(&self, other: &PositionCounts) -> bool {
        self.counts == other.counts
    }
}

impl Eq for PositionCounts {}

/// Jenkins one-at-a-time hash of a position-only FEN.
pub fn position_hash(epd: &str) -> u32 {
    let mut hash: u32 = 0;
    for byte in epd.bytes() {
        hash = hash.wrapping_add(u32::from(byte));
        hash = hash.wrapping_add(hash << 10);
        hash ^= hash >> 6;
    }
    hash = hash.wrapping_add(hash << 3);
    hash ^= hash >> 11;
    hash.wrapping_add(hash << 15)
}
