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

//! Plain English descriptions of a game, meant to be read by players.
//!
//! # Examples
//!
//! ```
//! use kibitz::{report, Color, Game};
//!
//! let game = Game::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1")?;
//! assert_eq!(
//!     report::pieces(&game, Color::White).to_string(),
//!     "White's pieces are: King on e1, Rook on h1."
//! );
//! assert!(report::legal(&game, Color::White)
//!     .to_string()
//!     .contains("King on e1: e2, f2, f1, d1, d2, g1 (castle)."));
//! # Ok::<_, kibitz::fen::ParseFenError>(())
//! ```

use std::fmt::{self, Write as _};

use crate::{legal::LegalEntry, Color, Game};

/// Legal moves of a player, one line per piece that can move.
#[derive(Debug)]
pub struct Legal<'a> {
    game: &'a Game,
    color: Color,
}

pub fn legal(game: &Game, color: Color) -> Legal<'_> {
    Legal { game, color }
}

impl fmt::Display for Legal<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'s legal moves are:", self.game.player(self.color).name)?;

        let legal = self.game.legal(self.color);
        if legal.is_empty() {
            return f.write_str(" None.");
        }

        for origin in legal.origins() {
            f.write_char('\n')?;
            if let Some(entry) = self.game.board().entry_at(origin.from) {
                write!(f, "{entry}: ")?;
            }
            for (i, entry) in origin.entries.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_entry(f, entry)?;
            }
            f.write_char('.')?;
        }
        Ok(())
    }
}

fn write_entry(f: &mut fmt::Formatter<'_>, entry: &LegalEntry) -> fmt::Result {
    write!(f, "{}", entry.to())?;

    let notes: Vec<&str> = [
        (entry.is_castle(), "castle"),
        (entry.is_capture(), "capture"),
        (entry.is_check(), "check"),
    ]
    .into_iter()
    .filter_map(|(set, note)| set.then_some(note))
    .collect();

    if !notes.is_empty() {
        write!(f, " ({})", notes.join(", "))?;
    }
    Ok(())
}

/// The pieces a player has on the board, in scan order.
#[derive(Debug)]
pub struct Pieces<'a> {
    game: &'a Game,
    color: Color,
}

pub fn pieces(game: &Game, color: Color) -> Pieces<'_> {
    Pieces { game, color }
}

impl fmt::Display for Pieces<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'s pieces are: ", self.game.player(self.color).name)?;
        for (i, (_, entry)) in self.game.board().pieces_of(self.color).enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{entry}")?;
        }
        f.write_char('.')
    }
}

/// Captured pieces of both colors, oldest capture first.
#[derive(Debug)]
pub struct Captured<'a> {
    game: &'a Game,
}

pub fn captured(game: &Game) -> Captured<'_> {
    Captured { game }
}

impl fmt::Display for Captured<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Captured pieces:")?;
        let captured = self.game.board().captured();
        if captured.len() == 0 {
            return f.write_str(" None.");
        }
        for (i, entry) in captured.enumerate() {
            f.write_str(if i > 0 { ", " } else { " " })?;
            write!(f, "{} {}", entry.color.name(), entry.role)?;
        }
        f.write_char('.')
    }
}

/// ASCII diagram followed by the FEN.
#[derive(Debug)]
pub struct Diagram<'a> {
    game: &'a Game,
}

pub fn diagram(game: &Game) -> Diagram<'_> {
    Diagram { game }
}

impl fmt::Display for Diagram<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.game.board(), self.game.fen())
    }
}

/// What players are told about a running game: who plays, what the
/// opponent of the side to move has left and what the side to move can do.
#[derive(Debug)]
pub struct Context<'a> {
    game: &'a Game,
}

pub fn context(game: &Game) -> Context<'_> {
    Context { game }
}

impl fmt::Display for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let players = self.game.players();
        let turn = self.game.turn();
        writeln!(
            f,
            "There is currently an ongoing chess game between {} and {}.",
            players.white.name, players.black.name
        )?;
        writeln!(f, "{}", pieces(self.game, !turn))?;
        write!(f, "{}", legal(self.game, turn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_start() {
        let game = Game::new();
        let text = legal(&game, Color::White).to_string();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("White's legal moves are:"));
        assert_eq!(lines.next(), Some("Knight on b1: c3, a3."));
        assert_eq!(lines.next(), Some("Knight on g1: h3, f3."));
        assert_eq!(lines.next(), Some("Pawn on a2: a3, a4."));
        assert_eq!(text.lines().count(), 11);
    }

    #[test]
    fn test_legal_notes() {
        let game = Game::from_fen("4k3/8/8/3p4/8/8/8/3QK3 w - - 0 1").expect("valid fen");
        let text = legal(&game, Color::White).to_string();
        assert!(text.contains("d5 (capture)"));
        assert!(text.contains("a4 (check)"));
    }

    #[test]
    fn test_legal_none() {
        let mut game = Game::new();
        for token in ["f3", "e5", "g4", "Qh4"] {
            game.play(token).expect("legal move");
        }
        assert_eq!(
            legal(&game, Color::White).to_string(),
            "White's legal moves are: None."
        );
    }

    #[test]
    fn test_captured() {
        let mut game = Game::new();
        assert_eq!(captured(&game).to_string(), "Captured pieces: None.");
        for token in ["e4", "d5", "exd5", "Qxd5"] {
            game.play(token).expect("legal move");
        }
        assert_eq!(
            captured(&game).to_string(),
            "Captured pieces: Black Pawn, White Pawn."
        );
    }

    #[test]
    fn test_context() {
        let mut game = Game::new();
        game.set_name(Color::Black, Some("Morphy".to_owned()));
        let text = context(&game).to_string();
        assert!(text.starts_with("There is currently an ongoing chess game between White and Morphy.\n"));
        assert!(text.contains("Morphy's pieces are: Pawn on a7,"));
        assert!(text.contains("White's legal moves are:"));
    }
}
