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

use crate::{Game, MoveList, Role};

/// Counts legal move paths of a given length.
///
/// Each promotion counts four times, once per promotion role. Draw rules are
/// ignored, so that the counts are comparable with other move generators.
/// Every move played is taken back again.
///
/// # Examples
///
/// ```
/// use kibitz::{perft, Game};
///
/// let mut game = Game::new();
/// assert_eq!(perft(&mut game, 1), 20);
/// assert_eq!(perft(&mut game, 2), 400);
/// ```
pub fn perft(game: &mut Game, depth: u32) -> u64 {
    if depth < 1 {
        return 1;
    }

    let moves = expanded_moves(game);
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0;
    for m in moves {
        if game.play_unchecked(m).is_ok() {
            nodes += perft(game, depth - 1);
            let _ = game.undo();
        }
    }
    nodes
}

fn expanded_moves(game: &Game) -> MoveList {
    let mut moves = MoveList::new();
    for entry in game.legal(game.turn()).iter() {
        if entry.m.is_promotion() {
            moves.extend(Role::PROMOTIONS.map(|role| entry.m.with_promotion(role)));
        } else {
            moves.push(entry.m);
        }
    }
    moves
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promotions_count_four_times() {
        let mut game = Game::from_fen("4k3/1P6/8/8/8/8/8/4K3 w - - 0 1").expect("valid fen");
        // 4 promotions and 5 king moves.
        assert_eq!(perft(&mut game, 1), 9);
    }

    #[test]
    fn test_game_unchanged() {
        let mut game = Game::new();
        let fen = game.fen();
        assert_eq!(perft(&mut game, 3), 8902);
        assert_eq!(game.fen(), fen);
        assert!(game.history().is_empty());
    }
}
