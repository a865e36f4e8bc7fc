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

//! A game of chess with history.
//!
//! # Examples
//!
//! ```
//! use kibitz::{Game, Status};
//!
//! let mut game = Game::new();
//! for token in ["f3", "e5", "g4"] {
//!     game.play(token)?;
//! }
//! let record = game.play("Qh4#")?;
//! assert_eq!(record.status, Some(Status::Checkmate));
//! assert!(!game.is_active());
//! assert_eq!(game.movetext(), "1. f3 e5 2. g4 Qh4# 0-1");
//! # Ok::<_, kibitz::PlayError>(())
//! ```

use std::{error::Error, fmt, num::NonZeroU32};

use tracing::{debug, trace};

use crate::{
    attacks,
    fen::{self, Fen, ParseFenError},
    history::{position_hash, MoveRecord, PositionCounts, Special, Status},
    legal::LegalMoves,
    san::{self, ParseSanError, San, SanError},
    Board, ByColor, CastlingSide, Color, Move, Role, Square,
};

/// Error when a move cannot be played.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PlayError {
    /// The token is not a move.
    Parse(ParseSanError),
    /// The move does not resolve to exactly one legal move.
    San(SanError),
    /// The game is over or was never started.
    GameOver,
}

impl fmt::Display for PlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayError::Parse(err) => err.fmt(f),
            PlayError::San(err) => err.fmt(f),
            PlayError::GameOver => f.write_str("game over"),
        }
    }
}

impl Error for PlayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PlayError::Parse(err) => Some(err),
            PlayError::San(err) => Some(err),
            PlayError::GameOver => None,
        }
    }
}

impl From<ParseSanError> for PlayError {
    fn from(err: ParseSanError) -> PlayError {
        PlayError::Parse(err)
    }
}

impl From<SanError> for PlayError {
    fn from(err: SanError) -> PlayError {
        PlayError::San(err)
    }
}

/// Error when there is no move to take back.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum UndoError {
    EmptyHistory,
}

impl fmt::Display for UndoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("move list empty")
    }
}

impl Error for UndoError {}

/// Outcome of a finished game.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Outcome {
    Decisive { winner: Color },
    Draw,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match *self {
            Outcome::Decisive {
                winner: Color::White,
            } => "1-0",
            Outcome::Decisive {
                winner: Color::Black,
            } => "0-1",
            Outcome::Draw => "½-½",
        })
    }
}

/// One side of the game.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Player {
    pub color: Color,
    pub name: String,
    legal: LegalMoves,
}

impl Player {
    fn new(color: Color) -> Player {
        Player {
            color,
            name: color.name().to_owned(),
            legal: LegalMoves::default(),
        }
    }

    /// Legal moves of this player. Only the side to move may capture en
    /// passant.
    pub fn legal(&self) -> &LegalMoves {
        &self.legal
    }
}

/// A game of chess: the position, both players, and every move played
/// since the game was started or loaded.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    players: ByColor<Player>,
    history: Vec<MoveRecord>,
    positions: PositionCounts,
    ply: u32,
    halfmoves: u32,
    active: bool,
    initial_ep: Option<Square>,
    start_ply: u32,
}

impl Default for Game {
    fn default() -> Game {
        Game::new()
    }
}

impl Game {
    /// A new game from the starting position.
    pub fn new() -> Game {
        let mut game = Game::empty();
        game.reset();
        game
    }

    /// An empty board. The game is not active, so no move can be played
    /// until it is reset or a position is loaded.
    pub fn empty() -> Game {
        Game {
            board: Board::empty(),
            players: ByColor::new_with(Player::new),
            history: Vec::new(),
            positions: PositionCounts::default(),
            ply: 0,
            halfmoves: 0,
            active: false,
            initial_ep: None,
            start_ply: 0,
        }
    }

    /// Parses a FEN and sets up a game from it.
    ///
    /// # Errors
    ///
    /// Returns [`ParseFenError`] if the FEN is malformed.
    pub fn from_fen(fen: &str) -> Result<Game, ParseFenError> {
        let mut game = Game::empty();
        game.load_fen(fen)?;
        Ok(game)
    }

    /// Sets up the starting position. Player names are kept.
    pub fn reset(&mut self) {
        self.load(Fen::default());
        debug!("board reset");
    }

    /// Empties the board and ends the game. Player names are kept.
    pub fn clear(&mut self) {
        self.board = Board::empty();
        self.history.clear();
        self.positions.clear();
        self.ply = 0;
        self.halfmoves = 0;
        self.active = false;
        self.initial_ep = None;
        self.start_ply = 0;
        self.refresh_legal();
        debug!("board cleared");
    }

    /// Parses a FEN and loads the position. Nothing changes on error.
    ///
    /// # Errors
    ///
    /// Returns [`ParseFenError`] if the FEN is malformed.
    pub fn load_fen(&mut self, fen: &str) -> Result<(), ParseFenError> {
        let fen: Fen = fen.parse()?;
        self.load(fen);
        Ok(())
    }

    /// Loads a position. The history is cleared, the position counts once
    /// for repetition and the game becomes active. The position itself is
    /// not classified.
    ///
    /// Fullmove numbers above [`fen::MAX_FULLMOVES`] are clamped and an en
    /// passant target that fails [`fen::is_valid_ep_square`] is dropped.
    pub fn load(&mut self, fen: Fen) {
        let fullmoves = fen.fullmoves.get().min(fen::MAX_FULLMOVES);
        self.ply = (fullmoves - 1) * 2 + u32::from(fen.turn.is_black());
        self.start_ply = self.ply;
        self.halfmoves = fen.halfmoves;
        self.initial_ep = fen
            .ep_square
            .filter(|&sq| fen::is_valid_ep_square(&fen.board, fen.turn, sq));
        self.board = fen.board;
        self.history.clear();
        self.positions.clear();
        self.active = true;
        self.refresh_legal();
        self.positions.increment(position_hash(&self.epd()));
        debug!(fen = %self.fen(), "position loaded");
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn player(&self, color: Color) -> &Player {
        self.players.get(color)
    }

    pub fn players(&self) -> &ByColor<Player> {
        &self.players
    }

    /// Sets a player name. `None` restores the default name.
    pub fn set_name(&mut self, color: Color, name: Option<String>) {
        self.players.get_mut(color).name = name.unwrap_or_else(|| color.name().to_owned());
    }

    pub fn legal(&self, color: Color) -> &LegalMoves {
        self.players.get(color).legal()
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.history.last()
    }

    pub fn positions(&self) -> &PositionCounts {
        &self.positions
    }

    /// Half-moves since the game was started, including the moves before a
    /// loaded position.
    pub fn ply(&self) -> u32 {
        self.ply
    }

    /// Fifty-move counter: half-moves since the last capture or pawn move.
    pub fn halfmoves(&self) -> u32 {
        self.halfmoves
    }

    pub fn fullmoves(&self) -> NonZeroU32 {
        NonZeroU32::MIN.saturating_add(self.ply / 2)
    }

    pub fn turn(&self) -> Color {
        Color::from_white(self.ply % 2 == 0)
    }

    /// Tests if moves can be played.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Square a pawn of the side to move can capture en passant onto: the
    /// square skipped by a double step made on the last move, or the target
    /// of a loaded position before any move.
    pub fn ep_square(&self) -> Option<Square> {
        match self.history.last() {
            Some(record) if record.special == Some(Special::DoublePush) => {
                let rank = record.from.rank().offset(record.color.forward())?;
                Some(record.from.with_rank(rank))
            }
            Some(_) => None,
            None => self.initial_ep,
        }
    }

    pub fn is_check(&self) -> bool {
        attacks::in_check(&self.board.mailbox(), self.turn())
    }

    /// Status after the last move.
    pub fn status(&self) -> Option<Status> {
        self.history.last().and_then(|record| record.status)
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.status()? {
            Status::Checkmate => Some(Outcome::Decisive {
                winner: !self.turn(),
            }),
            Status::Check => None,
            _ => Some(Outcome::Draw),
        }
    }

    /// Position-only FEN, as counted for repetitions.
    pub fn epd(&self) -> String {
        fen::epd(&self.board, self.turn(), self.ep_square())
    }

    pub fn fen(&self) -> String {
        format!("{} {} {}", self.epd(), self.halfmoves, self.fullmoves())
    }

    /// Numbered move list like `1. e4 e5 2. Nf3`.
    pub fn movetext(&self) -> String {
        san::movetext(&self.history)
    }

    /// Parses a move token and plays it.
    ///
    /// # Errors
    ///
    /// Returns [`PlayError`] if the game is not active, the token is
    /// malformed, or it does not name exactly one legal move. The game is
    /// unchanged on error.
    pub fn play(&mut self, token: &str) -> Result<&MoveRecord, PlayError> {
        if !self.active {
            return Err(PlayError::GameOver);
        }
        let san = San::from_ascii(token.as_bytes())?;
        let m = san.to_move(self)?;
        self.play_unchecked(m)
    }

    /// Plays a move after checking it against the legal moves of the side
    /// to move. The promotion role of `m` is kept.
    ///
    /// # Errors
    ///
    /// Returns [`PlayError`] if the game is not active or the move is not
    /// legal.
    pub fn play_move(&mut self, m: Move) -> Result<&MoveRecord, PlayError> {
        if !self.active {
            return Err(PlayError::GameOver);
        }
        let legal = self
            .legal(self.turn())
            .find(m.from(), m.to())
            .is_some_and(|entry| entry.m.promotion().is_some() == m.promotion().is_some() && entry.m.role() == m.role());
        if !legal {
            return Err(PlayError::San(SanError::IllegalMove));
        }
        self.play_unchecked(m)
    }

    /// Plays a move taken from the legal moves of the side to move.
    pub(crate) fn play_unchecked(&mut self, m: Move) -> Result<&MoveRecord, PlayError> {
        let color = self.turn();
        let from = m.from();
        let to = m.to();
        let id = self
            .board
            .id_at(from)
            .ok_or(PlayError::San(SanError::NoPiece))?;
        let role = self.board.entry(id).role;
        let disambiguation = san::disambiguation(&self.board, self.legal(color), m);

        let mut capture = None;
        let special = match m {
            Move::Normal { promotion, .. } => {
                capture = self.board.remove(to);
                self.board.place(id, to);
                let entry = self.board.entry_mut(id);
                if let Some(promotion) = promotion {
                    entry.role = promotion;
                    Some(Special::Promotion(promotion))
                } else if m.is_double_push() {
                    Some(Special::DoublePush)
                } else if entry.can_castle {
                    entry.can_castle = false;
                    Some(Special::WaivedCastling)
                } else {
                    None
                }
            }
            Move::EnPassant { .. } => {
                capture = self.board.remove(to.with_rank(from.rank()));
                self.board.place(id, to);
                Some(Special::EnPassant)
            }
            Move::Castle { rook, .. } => {
                let side = CastlingSide::from_king_side(from < rook);
                let rook_id = self.board.id_at(rook).ok_or(PlayError::San(SanError::IllegalMove))?;
                self.board.place(id, side.king_to(color));
                self.board.place(rook_id, side.rook_to(color));
                self.board.entry_mut(id).can_castle = false;
                self.board.entry_mut(rook_id).can_castle = false;
                Some(Special::Castle(side))
            }
        };

        let halfmoves = self.halfmoves;
        self.halfmoves = if m.is_zeroing() { 0 } else { halfmoves + 1 };

        let index = self.history.len();
        self.history.push(MoveRecord {
            ply: self.ply,
            piece: id,
            color,
            role,
            from,
            to,
            disambiguation,
            capture,
            special,
            halfmoves,
            status: None,
            hash: 0,
        });
        self.ply += 1;
        self.refresh_legal();

        let hash = position_hash(&self.epd());
        let occurrences = self.positions.increment(hash);
        let status = self.classify(occurrences);
        if status.is_some_and(Status::is_terminal) {
            self.active = false;
        }

        let record = &mut self.history[index];
        record.hash = hash;
        record.status = status;
        debug!(ply = record.ply, %m, ?status, "move played");
        Ok(record)
    }

    /// Takes back the last move, restoring the exact previous state.
    ///
    /// # Errors
    ///
    /// Returns [`UndoError::EmptyHistory`] if no move was played since the
    /// game was started or loaded.
    pub fn undo(&mut self) -> Result<MoveRecord, UndoError> {
        let record = self.history.pop().ok_or(UndoError::EmptyHistory)?;

        match record.special {
            Some(Special::Castle(side)) => {
                if let Some(rook_id) = self.board.id_at(side.rook_to(record.color)) {
                    self.board.place(rook_id, side.rook_from(record.color));
                    self.board.entry_mut(rook_id).can_castle = true;
                }
                self.board.place(record.piece, record.from);
                self.board.entry_mut(record.piece).can_castle = true;
            }
            Some(Special::WaivedCastling) => {
                self.board.place(record.piece, record.from);
                self.board.entry_mut(record.piece).can_castle = true;
            }
            _ => self.board.place(record.piece, record.from),
        }
        self.board.entry_mut(record.piece).role = record.role;

        if let Some(captured) = record.capture {
            let sq = if record.special == Some(Special::EnPassant) {
                record.to.with_rank(record.from.rank())
            } else {
                record.to
            };
            self.board.restore(captured, sq);
        }

        self.positions.decrement(record.hash);
        self.halfmoves = record.halfmoves;
        self.ply = record.ply;
        self.active = true;
        self.refresh_legal();

        debug!(ply = record.ply, from = %record.from, to = %record.to, "move undone");
        Ok(record)
    }

    fn refresh_legal(&mut self) {
        let turn = self.turn();
        let ep_square = self.ep_square();
        for color in Color::ALL {
            let ep_square = if color == turn { ep_square } else { None };
            let legal = LegalMoves::generate(&self.board, color, ep_square);
            trace!(%color, moves = legal.len(), "legal moves");
            self.players.get_mut(color).legal = legal;
        }
    }

    /// Checkmate wins over the draws. Otherwise a later draw rule wins over
    /// an earlier one.
    fn classify(&self, occurrences: u32) -> Option<Status> {
        let in_check = self.is_check();
        let mut status = if self.legal(self.turn()).is_empty() {
            Some(if in_check {
                Status::Checkmate
            } else {
                Status::Stalemate
            })
        } else if in_check {
            Some(Status::Check)
        } else {
            None
        };

        if status == Some(Status::Checkmate) {
            return status;
        }
        if self.is_insufficient_material() {
            status = Some(Status::InsufficientMaterial);
        }
        if occurrences >= 3 {
            status = Some(Status::Repetition);
        }
        if self.halfmoves >= 100 {
            status = Some(Status::FiftyMoves);
        }
        status
    }

    /// Coarse rule: fewer than four pieces on the board and none of them a
    /// pawn, rook or queen.
    pub fn is_insufficient_material(&self) -> bool {
        self.board.occupied_count() < 4
            && self
                .board
                .pieces()
                .all(|(_, entry)| !entry.role.is_mating_material())
    }

    /// The first ply of the current history.
    pub fn start_ply(&self) -> u32 {
        self.start_ply
    }

    /// Pieces of `role` and `color` on the board, in scan order.
    pub(crate) fn pieces_of_role(&self, color: Color, role: Role) -> impl Iterator<Item = Square> + '_ {
        self.board
            .pieces_of(color)
            .filter(move |(_, entry)| entry.role == role)
            .filter_map(|(_, entry)| entry.square())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play_all(game: &mut Game, tokens: &str) {
        for token in tokens.split_whitespace() {
            if let Err(err) = game.play(token) {
                panic!("{token}: {err}");
            }
        }
    }

    #[test]
    fn test_load_clamps_fullmoves() {
        let mut fen: Fen = "4k3/8/8/8/8/8/8/4K3 b - - 0 1".parse().expect("valid fen");
        fen.fullmoves = NonZeroU32::MAX;
        let mut game = Game::empty();
        game.load(fen);
        assert_eq!(game.turn(), Color::Black);
        assert_eq!(game.fen(), "4k3/8/8/8/8/8/8/4K3 b - - 0 1073741824");
        game.play("Kd7").expect("legal move");
        assert_eq!(game.turn(), Color::White);
    }

    #[test]
    fn test_load_drops_bogus_en_passant() {
        let mut fen: Fen = "4k3/8/8/8/8/8/3PN3/4K3 w - - 0 1".parse().expect("valid fen");
        fen.ep_square = Some(Square::E3);
        let mut game = Game::empty();
        game.load(fen);
        assert!(game
            .legal(Color::White)
            .iter()
            .all(|entry| !entry.m.is_en_passant()));
        assert_eq!(game.play("dxe3"), Err(PlayError::San(SanError::IllegalMove)));
        assert_eq!(game.fen(), "4k3/8/8/8/8/8/3PN3/4K3 w - - 0 1");
    }

    #[test]
    fn test_new_game() {
        let game = Game::new();
        assert!(game.is_active());
        assert_eq!(game.turn(), Color::White);
        assert_eq!(game.legal(Color::White).len(), 20);
        assert_eq!(game.legal(Color::Black).len(), 20);
        assert_eq!(game.fen(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        assert_eq!(game.positions().len(), 1);
    }

    #[test]
    fn test_ep_square_after_double_push() {
        let mut game = Game::new();
        play_all(&mut game, "e4");
        assert_eq!(game.ep_square(), Some(Square::E3));
        assert_eq!(
            game.fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
        play_all(&mut game, "Nf6");
        assert_eq!(game.ep_square(), None);
    }

    #[test]
    fn test_undo_restores_everything() {
        let mut game = Game::new();
        let before = game.clone();
        play_all(&mut game, "e4 d5 exd5 Qxd5 Nc3 Qa5 Nf3 Nf6 Bc4 Bg4 O-O");
        for _ in 0..11 {
            game.undo().expect("move to undo");
        }
        assert_eq!(game.board(), before.board());
        assert_eq!(game.fen(), before.fen());
        assert_eq!(game.positions(), before.positions());
        assert_eq!(game.legal(Color::White), before.legal(Color::White));
        assert_eq!(game.undo(), Err(UndoError::EmptyHistory));
    }

    #[test]
    fn test_undo_en_passant_and_promotion() {
        let mut game = Game::from_fen("4k3/1P6/8/3pP3/8/8/8/4K3 w - d6 0 1").expect("valid fen");
        let start = game.fen();
        let record = game.play("exd6").expect("en passant").clone();
        assert_eq!(record.special, Some(Special::EnPassant));
        assert!(game.board().piece_at(Square::D5).is_none());
        game.undo().expect("undo");
        assert_eq!(game.fen(), start);
        assert_eq!(game.board().piece_at(Square::D5), Some(Color::Black.pawn()));

        let record = game.play("b8=N").expect("promotion").clone();
        assert_eq!(record.special, Some(Special::Promotion(Role::Knight)));
        assert_eq!(game.board().piece_at(Square::B8), Some(Color::White.knight()));
        game.undo().expect("undo");
        assert_eq!(game.board().piece_at(Square::B7), Some(Color::White.pawn()));
        assert_eq!(game.fen(), start);
    }

    #[test]
    fn test_castling_flags_restored() {
        let mut game = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").expect("valid fen");
        let start = game.fen();
        play_all(&mut game, "O-O-O");
        assert!(game.fen().contains(" kq "));
        assert_eq!(game.board().piece_at(Square::D1), Some(Color::White.rook()));
        game.undo().expect("undo");
        assert_eq!(game.fen(), start);

        play_all(&mut game, "Rb1");
        assert!(game.fen().contains(" Kkq "));
        game.undo().expect("undo");
        assert_eq!(game.fen(), start);
    }

    #[test]
    fn test_fools_mate() {
        let mut game = Game::new();
        play_all(&mut game, "f3 e5 g4 Qh4");
        assert_eq!(game.status(), Some(Status::Checkmate));
        assert_eq!(
            game.outcome(),
            Some(Outcome::Decisive {
                winner: Color::Black
            })
        );
        assert_eq!(game.play("a3"), Err(PlayError::GameOver));
        game.undo().expect("undo");
        assert!(game.is_active());
        assert_eq!(game.status(), None);
    }

    #[test]
    fn test_stalemate() {
        let mut game = Game::from_fen("7k/8/5Q2/6K1/8/8/8/8 w - - 0 1").expect("valid fen");
        play_all(&mut game, "Qf7");
        assert_eq!(game.status(), Some(Status::Stalemate));
        assert_eq!(game.outcome(), Some(Outcome::Draw));
        assert!(!game.is_active());
    }

    #[test]
    fn test_repetition() {
        let mut game = Game::new();
        play_all(&mut game, "Nf3 Nf6 Ng1 Ng8 Nf3 Nf6 Ng1");
        assert!(game.is_active());
        play_all(&mut game, "Ng8");
        assert_eq!(game.status(), Some(Status::Repetition));
        assert!(!game.is_active());
    }

    #[test]
    fn test_fifty_moves() {
        let mut game = Game::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 98 60").expect("valid fen");
        play_all(&mut game, "Ra2");
        assert!(game.is_active());
        play_all(&mut game, "Kd8");
        assert_eq!(game.halfmoves(), 100);
        assert_eq!(game.status(), Some(Status::FiftyMoves));
    }

    #[test]
    fn test_insufficient_material() {
        let mut game = Game::from_fen("4k3/8/8/8/8/8/3p4/4K3 w - - 0 1").expect("valid fen");
        play_all(&mut game, "Kxd2");
        assert_eq!(game.status(), Some(Status::InsufficientMaterial));
        assert!(!game.is_active());
    }

    #[test]
    fn test_black_to_move_fen() {
        let game = Game::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 3 12").expect("valid fen");
        assert_eq!(game.turn(), Color::Black);
        assert_eq!(game.ply(), 23);
        assert_eq!(game.fen(), "4k3/8/8/8/8/8/8/4K3 b - - 3 12");
    }
}
