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

//! Piece placement.
//!
//! The [`Board`] owns every piece of a game in an arena. Squares and the
//! captured pool refer to pieces by [`PieceId`], so a piece keeps its
//! identity when it is captured, promoted or brought back by an undo.
//! Nothing here checks the rules of chess.

use std::fmt::{self, Write as _};

use crate::{
    attacks::Mailbox, Color, File, Location, Piece, PieceEntry, PieceId, Rank, Role, Square,
};

/// Piece arena, square occupancy and captured pool.
///
/// # Examples
///
/// ```
/// use kibitz::{Board, Color, Role, Square};
///
/// let board = Board::default();
/// assert_eq!(board.piece_at(Square::E1), Some(Role::King.of(Color::White)));
/// assert_eq!(board.king_of(Color::Black), Some(Square::E8));
/// assert_eq!(board.occupied_count(), 32);
/// ```
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "BoardRepr", try_from = "BoardRepr")
)]
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Board {
    pieces: Vec<PieceEntry>,
    squares: [Option<PieceId>; 64],
    captured: Vec<PieceId>,
}

impl Board {
    pub fn empty() -> Board {
        Board {
            pieces: Vec::with_capacity(32),
            squares: [None; 64],
            captured: Vec::new(),
        }
    }

    /// Creates a new piece on an empty square.
    pub fn spawn(&mut self, piece: Piece, sq: Square, can_castle: bool) -> PieceId {
        debug_assert!(self.squares[sq.index()].is_none(), "spawn on occupied {sq}");
        let id = PieceId(self.pieces.len() as u8);
        self.pieces.push(PieceEntry {
            color: piece.color,
            role: piece.role,
            location: Location::OnBoard(sq),
            can_castle,
        });
        self.squares[sq.index()] = Some(id);
        id
    }

    #[inline]
    pub fn id_at(&self, sq: Square) -> Option<PieceId> {
        self.squares[sq.index()]
    }

    #[inline]
    pub fn entry(&self, id: PieceId) -> &PieceEntry {
        &self.pieces[id.index()]
    }

    #[inline]
    pub(crate) fn entry_mut(&mut self, id: PieceId) -> &mut PieceEntry {
        &mut self.pieces[id.index()]
    }

    pub fn entry_at(&self, sq: Square) -> Option<&PieceEntry> {
        self.id_at(sq).map(|id| self.entry(id))
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.entry_at(sq).map(PieceEntry::piece)
    }

    /// Moves a piece onto an empty square, lifting it from its current
    /// square if it has one.
    pub fn place(&mut self, id: PieceId, to: Square) {
        debug_assert!(self.squares[to.index()].is_none(), "place on occupied {to}");
        if let Location::OnBoard(from) = self.entry(id).location {
            self.squares[from.index()] = None;
        }
        self.squares[to.index()] = Some(id);
        self.entry_mut(id).location = Location::OnBoard(to);
    }

    /// Takes the piece on `sq` off the board and appends it to the captured
    /// pool.
    pub fn remove(&mut self, sq: Square) -> Option<PieceId> {
        let id = self.squares[sq.index()].take()?;
        self.entry_mut(id).location = Location::Captured;
        self.captured.push(id);
        Some(id)
    }

    /// Takes a piece out of the captured pool and puts it on `sq`.
    pub fn restore(&mut self, id: PieceId, sq: Square) {
        if let Some(pos) = self.captured.iter().rposition(|c| *c == id) {
            self.captured.remove(pos);
        }
        self.place(id, sq);
    }

    /// Pieces of one color that are on the board, in scan order
    /// (`a1`, `b1`, ..., `h8`).
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (PieceId, &PieceEntry)> + '_ {
        self.pieces().filter(move |(_, entry)| entry.color == color)
    }

    /// All pieces on the board, in scan order.
    pub fn pieces(&self) -> impl Iterator<Item = (PieceId, &PieceEntry)> + '_ {
        self.squares
            .iter()
            .flatten()
            .map(move |&id| (id, self.entry(id)))
    }

    /// Captured pieces, oldest capture first.
    pub fn captured(&self) -> impl ExactSizeIterator<Item = &PieceEntry> + '_ {
        self.captured.iter().map(move |&id| self.entry(id))
    }

    pub fn king_of(&self, color: Color) -> Option<Square> {
        self.pieces_of(color)
            .find(|(_, entry)| entry.role == Role::King)
            .and_then(|(_, entry)| entry.square())
    }

    pub fn occupied_count(&self) -> usize {
        self.squares.iter().filter(|sq| sq.is_some()).count()
    }

    /// Copies the placement into a snapshot for attack queries.
    pub fn mailbox(&self) -> Mailbox {
        let mut mailbox = Mailbox::empty();
        for sq in Square::all() {
            mailbox.set(sq, self.piece_at(sq));
        }
        mailbox
    }

    /// Parses the placement part of a FEN, like
    /// `rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR`.
    ///
    /// Castling flags are left unset.
    pub fn from_board_fen(board_fen: &[u8]) -> Option<Board> {
        let mut board = Board::empty();
        let mut groups = board_fen.split(|ch| *ch == b'/');

        for rank in Rank::ALL.into_iter().rev() {
            let group = groups.next()?;
            let mut file = 0u8;
            for &ch in group {
                if file >= 8 {
                    break;
                }
                if (b'1'..=b'8').contains(&ch) {
                    file += ch - b'0';
                } else {
                    let piece = Piece::from_char(char::from(ch))?;
                    let sq = Square::from_coords(File::new(file)?, rank);
                    board.spawn(piece, sq, false);
                    file += 1;
                }
            }
        }

        if groups.next().is_some() {
            return None;
        }

        Some(board)
    }

    /// Renders the placement part of a FEN.
    pub fn board_fen(&self) -> String {
        let mut fen = String::with_capacity(64);

        for rank in Rank::ALL.into_iter().rev() {
            let mut empty = 0;

            for file in File::ALL {
                match self.piece_at(Square::from_coords(file, rank)) {
                    Some(piece) => {
                        if empty > 0 {
                            fen.push(char::from(b'0' + empty));
                            empty = 0;
                        }
                        fen.push(piece.char());
                    }
                    None => empty += 1,
                }
            }

            if empty > 0 {
                fen.push(char::from(b'0' + empty));
            }

            if rank > Rank::First {
                fen.push('/');
            }
        }

        fen
    }
}

impl Default for Board {
    fn default() -> Board {
        const BACKRANK: [Role; 8] = [
            Role::Rook,
            Role::Knight,
            Role::Bishop,
            Role::Queen,
            Role::King,
            Role::Bishop,
            Role::Knight,
            Role::Rook,
        ];

        let mut board = Board::empty();
        for rank in Rank::ALL.into_iter().rev() {
            for (file, role) in File::ALL.into_iter().zip(BACKRANK) {
                let piece = match rank {
                    Rank::First => role.of(Color::White),
                    Rank::Second => Color::White.pawn(),
                    Rank::Seventh => Color::Black.pawn(),
                    Rank::Eighth => role.of(Color::Black),
                    _ => continue,
                };
                let castles = matches!(piece.role, Role::King | Role::Rook);
                board.spawn(piece, Square::from_coords(file, rank), castles);
            }
        }
        board
    }
}

/// ASCII diagram, eighth rank first, `.` for empty squares.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::ALL.into_iter().rev() {
            for file in File::ALL {
                if file > File::A {
                    f.write_char(' ')?;
                }
                let sq = Square::from_coords(file, rank);
                f.write_char(self.piece_at(sq).map_or('.', Piece::char))?;
            }
            f.write_char('\n')?;
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct BoardRepr {
    pieces: Vec<PieceEntry>,
    captured: Vec<PieceId>,
}

#[cfg(feature = "serde")]
impl From<Board> for BoardRepr {
    fn from(board: Board) -> BoardRepr {
        BoardRepr {
            pieces: board.pieces,
            captured: board.captured,
        }
    }
}

/// Error when a stored board has two pieces on one square or refers to
/// unknown pieces.
#[cfg(feature = "serde")]
#[derive(Clone, Debug)]
pub struct InvalidBoardError;

#[cfg(feature = "serde")]
impl fmt::Display for InvalidBoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("inconsistent stored board")
    }
}

#[cfg(feature = "serde")]
impl std::error::Error for InvalidBoardError {}

#[cfg(feature = "serde")]
impl TryFrom<BoardRepr> for Board {
    type Error = InvalidBoardError;

    fn try_from(repr: BoardRepr) -> Result<Board, InvalidBoardError> {
        let mut squares = [None; 64];
        for (index, entry) in repr.pieces.iter().enumerate() {
            if let Location::OnBoard(sq) = entry.location {
                let slot = &mut squares[sq.index()];
                if slot.is_some() {
                    return Err(InvalidBoardError);
                }
                *slot = Some(PieceId(u8::try_from(index).map_err(|_| InvalidBoardError)?));
            }
        }
        if repr.captured.iter().any(|id| {
            repr.pieces
                .get(id.index())
                .is_none_or(|entry| entry.location != Location::Captured)
        }) {
            return Err(InvalidBoardError);
        }
        Ok(Board {
            pieces: repr.pieces,
            squares,
            captured: repr.captured,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_board_fen() {
        assert_eq!(
            Board::default().board_fen(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"
        );
    }

    #[test]
    fn test_board_fen_roundtrip() {
        for fen in [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR",
            "4k3/8/8/8/8/8/8/4K3",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R",
            "8/8/8/8/8/8/8/8",
        ] {
            let board = Board::from_board_fen(fen.as_bytes()).expect("valid board fen");
            assert_eq!(board.board_fen(), fen);
        }
    }

    #[test]
    fn test_invalid_board_fen() {
        assert!(Board::from_board_fen(b"8/8/8/8/8/8/8").is_none());
        assert!(Board::from_board_fen(b"8/8/8/8/8/8/8/8/8").is_none());
        assert!(Board::from_board_fen(b"8/8/8/8/8/8/8/7x").is_none());
        assert!(Board::from_board_fen(b"8/8/8/8/8/8/8/9").is_none());
    }

    #[test]
    fn test_capture_and_restore() {
        let mut board = Board::default();
        let pawn = board.id_at(Square::D7).expect("black pawn");
        let removed = board.remove(Square::D7);
        assert_eq!(removed, Some(pawn));
        assert_eq!(board.entry(pawn).location, Location::Captured);
        assert_eq!(board.captured().len(), 1);
        assert_eq!(board.occupied_count(), 31);

        board.restore(pawn, Square::D7);
        assert_eq!(board.captured().len(), 0);
        assert_eq!(board, Board::default());
    }

    #[test]
    fn test_place() {
        let mut board = Board::default();
        let knight = board.id_at(Square::G1).expect("knight");
        board.place(knight, Square::F3);
        assert_eq!(board.id_at(Square::G1), None);
        assert_eq!(board.id_at(Square::F3), Some(knight));
        assert_eq!(board.entry(knight).square(), Some(Square::F3));
    }

    #[test]
    fn test_display() {
        let board = Board::from_board_fen(b"4k3/8/8/8/8/8/8/4K3").expect("valid");
        let diagram = board.to_string();
        assert_eq!(diagram.lines().count(), 8);
        assert_eq!(diagram.lines().next(), Some(". . . . k . . ."));
        assert_eq!(diagram.lines().last(), Some(". . . . K . . ."));
    }
}
