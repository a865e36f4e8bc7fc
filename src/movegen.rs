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

//! Pseudo-legal move generation.
//!
//! Moves generated here obey the movement rules of each piece but may still
//! leave the own king in check. [`legal`](crate::legal) filters them.

use crate::{
    attacks::{self, Mailbox},
    Board, CastlingSide, Color, Move, MoveList, PieceEntry, Role, Square,
};

/// Generates the pseudo-legal moves of the piece on `from`.
///
/// `ep_square` is the en passant target available to the side to move. It
/// must be `None` when generating for the other side.
pub fn piece_moves(
    board: &Board,
    mailbox: &Mailbox,
    from: Square,
    entry: &PieceEntry,
    ep_square: Option<Square>,
    moves: &mut MoveList,
) {
    match entry.role {
        Role::Pawn => gen_pawn(mailbox, from, entry.color, ep_square, moves),
        role => {
            let piece = role.of(entry.color);
            for to in attacks::sight(mailbox, from, piece) {
                let capture = match mailbox.get(to) {
                    Some(target) if target.color == entry.color => continue,
                    Some(target) => Some(target.role),
                    None => None,
                };
                moves.push(Move::Normal {
                    role,
                    from,
                    capture,
                    to,
                    promotion: None,
                });
            }
            if role == Role::King && entry.can_castle {
                gen_castling(board, mailbox, from, entry.color, moves);
            }
        }
    }
}

fn push_pawn_move(moves: &mut MoveList, color: Color, from: Square, capture: Option<Role>, to: Square) {
    let promotion = (to.rank() == (!color).backrank()).then_some(Role::Queen);
    moves.push(Move::Normal {
        role: Role::Pawn,
        from,
        capture,
        to,
        promotion,
    });
}

fn gen_pawn(
    mailbox: &Mailbox,
    from: Square,
    color: Color,
    ep_square: Option<Square>,
    moves: &mut MoveList,
) {
    let forward = color.forward();

    if let Some(single) = from.offset(0, forward) {
        if !mailbox.is_occupied(single) {
            push_pawn_move(moves, color, from, None, single);

            if from.rank() == color.pawn_rank() {
                if let Some(double) = single.offset(0, forward) {
                    if !mailbox.is_occupied(double) {
                        push_pawn_move(moves, color, from, None, double);
                    }
                }
            }
        }
    }

    for to in attacks::sight(mailbox, from, color.pawn()) {
        match mailbox.get(to) {
            Some(target) if target.color != color => {
                push_pawn_move(moves, color, from, Some(target.role), to);
            }
            Some(_) => (),
            None if Some(to) == ep_square => moves.push(Move::EnPassant { from, to }),
            None => (),
        }
    }
}

fn gen_castling(board: &Board, mailbox: &Mailbox, king: Square, color: Color, moves: &mut MoveList) {
    if king != CastlingSide::king_from(color) {
        return;
    }

    for side in CastlingSide::ALL {
        let rook = side.rook_from(color);
        let rook_ready = board
            .entry_at(rook)
            .is_some_and(|entry| entry.piece() == color.rook() && entry.can_castle);
        if !rook_ready {
            continue;
        }

        let step: i8 = if side.is_king_side() { 1 } else { -1 };

        let mut between = king;
        let path_clear = loop {
            match between.offset(step, 0) {
                Some(next) if next == rook => break true,
                Some(next) if mailbox.is_occupied(next) => break false,
                Some(next) => between = next,
                None => break false,
            }
        };
        if !path_clear {
            continue;
        }

        let king_to = side.king_to(color);
        let safe = [Some(king), king.offset(step, 0), Some(king_to)]
            .into_iter()
            .flatten()
            .all(|sq| !attacks::is_attacked(mailbox, sq, !color));
        if safe {
            moves.push(Move::Castle { king, rook });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moves_of(board_fen: &str, from: Square, ep_square: Option<Square>) -> MoveList {
        let board = Board::from_board_fen(board_fen.as_bytes()).expect("valid board fen");
        let mailbox = board.mailbox();
        let entry = board.entry_at(from).expect("piece on origin").clone();
        let mut moves = MoveList::new();
        piece_moves(&board, &mailbox, from, &entry, ep_square, &mut moves);
        moves
    }

    #[test]
    fn test_start_position() {
        let board = Board::default();
        let mailbox = board.mailbox();
        let mut moves = MoveList::new();
        for (_, entry) in board.pieces_of(Color::White) {
            if let Some(from) = entry.square() {
                piece_moves(&board, &mailbox, from, entry, None, &mut moves);
            }
        }
        assert_eq!(moves.len(), 20);
        assert_eq!(moves[0].from(), Square::B1);
    }

    #[test]
    fn test_pawn_double_push_blocked() {
        let moves = moves_of("4k3/8/8/8/8/4n3/4P3/4K3", Square::E2, None);
        assert!(moves.is_empty());
        let moves = moves_of("4k3/8/8/8/4n3/8/4P3/4K3", Square::E2, None);
        assert_eq!(moves.len(), 1);
    }

    #[test]
    fn test_en_passant() {
        let moves = moves_of("4k3/8/8/3pP3/8/8/8/4K3", Square::E5, Some(Square::D6));
        assert!(moves.contains(&Move::EnPassant {
            from: Square::E5,
            to: Square::D6
        }));
        let moves = moves_of("4k3/8/8/3pP3/8/8/8/4K3", Square::E5, None);
        assert!(moves.iter().all(|m| !m.is_en_passant()));
    }

    #[test]
    fn test_promotion_defaults_to_queen() {
        let moves = moves_of("1n2k3/P7/8/8/8/8/8/4K3", Square::A7, None);
        assert_eq!(moves.len(), 2);
        assert!(moves.iter().all(|m| m.promotion() == Some(Role::Queen)));
    }

    #[test]
    fn test_castling() {
        let mut board = Board::from_board_fen(b"r3k2r/8/8/8/8/8/8/R3K2R").expect("valid");
        for sq in [Square::A1, Square::E1, Square::H1] {
            if let Some(id) = board.id_at(sq) {
                board.entry_mut(id).can_castle = true;
            }
        }
        let mailbox = board.mailbox();
        let entry = board.entry_at(Square::E1).expect("king").clone();
        let mut moves = MoveList::new();
        piece_moves(&board, &mailbox, Square::E1, &entry, None, &mut moves);
        assert_eq!(moves.iter().filter(|m| m.is_castle()).count(), 2);

        // A rook on f8 covers the king's transit square.
        let mut board = Board::from_board_fen(b"4kr2/8/8/8/8/8/8/R3K2R").expect("valid");
        for sq in [Square::A1, Square::E1, Square::H1] {
            if let Some(id) = board.id_at(sq) {
                board.entry_mut(id).can_castle = true;
            }
        }
        let mailbox = board.mailbox();
        let entry = board.entry_at(Square::E1).expect("king").clone();
        let mut moves = MoveList::new();
        piece_moves(&board, &mailbox, Square::E1, &entry, None, &mut moves);
        let castles: Vec<_> = moves.iter().filter_map(|m| m.castling_side()).collect();
        assert_eq!(castles, [CastlingSide::QueenSide]);
    }
}
