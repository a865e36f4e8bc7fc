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

//! Text commands for driving a game.
//!
//! A host splits the input into words, drops its own command keyword and
//! hands the rest to [`Session::execute`], which answers with a [`Reply`].
//!
//! # Examples
//!
//! ```
//! use kibitz::command::Session;
//!
//! let mut session = Session::new();
//! assert_eq!(session.execute("new").to_string(), "Board reset!");
//! assert_eq!(session.execute("push e4 e5 Qh5").to_string(), "Success!");
//! assert_eq!(
//!     session.execute("push Nc6 Bc4 Nf6 Qxf7").to_string(),
//!     "Checkmate!"
//! );
//! assert_eq!(session.execute("push a6").to_string(), "game over, 0 moves pushed");
//! assert_eq!(
//!     session.execute("pgn").to_string(),
//!     "1. e4 e5 2. Qh5 Nc6 3. Bc4 Nf6 4. Qxf7# 1-0"
//! );
//! ```

use std::{error::Error, fmt, str::FromStr};

use tracing::debug;

use crate::{
    game::{Game, PlayError},
    history::{Special, Status},
    report, CastlingSide, Color,
};

/// Error when a command line does not start with a known verb.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseCommandError {
    Empty,
    UnknownVerb(String),
}

impl fmt::Display for ParseCommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid command")
    }
}

impl Error for ParseCommandError {}

/// A parsed command. Verbs are case insensitive and have synonyms.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    /// `new`, `start` or `reset`.
    New,
    /// `off` or `close`.
    Off,
    /// `suspend`, `pause` or `adjourn`.
    Suspend,
    /// `resume` or `continue`.
    Resume,
    /// `white` or `black`, followed by a name. Without a name the default
    /// name is restored.
    Name { color: Color, name: Option<String> },
    /// `push` or `add`, followed by move tokens.
    Push(Vec<String>),
    /// `pop` or `undo`, followed by an optional count.
    Pop(u32),
    /// `legal`.
    Legal,
    /// `board` or `print`.
    Board,
    /// `pgn` or `moves`.
    Pgn,
    /// `fen`, `pos` or `position`, followed by a FEN.
    Position(String),
}

impl Command {
    /// Parses a command from its words.
    ///
    /// # Errors
    ///
    /// Returns [`ParseCommandError`] if there are no words or the first
    /// word is not a known verb.
    pub fn from_args<'a, I>(args: I) -> Result<Command, ParseCommandError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut args = args.into_iter();
        let verb = args.next().ok_or(ParseCommandError::Empty)?;
        let rest: Vec<&str> = args.collect();

        Ok(match verb.to_ascii_lowercase().as_str() {
            "new" | "start" | "reset" => Command::New,
            "off" | "close" => Command::Off,
            "suspend" | "pause" | "adjourn" => Command::Suspend,
            "resume" | "continue" => Command::Resume,
            "white" | "black" => Command::Name {
                color: Color::from_white(verb.eq_ignore_ascii_case("white")),
                name: (!rest.is_empty()).then(|| rest.join(" ")),
            },
            "push" | "add" => Command::Push(rest.into_iter().map(str::to_owned).collect()),
            "pop" | "undo" => Command::Pop(
                rest.first()
                    .and_then(|n| btoi::btou(n.as_bytes()).ok())
                    .unwrap_or(1),
            ),
            "legal" => Command::Legal,
            "board" | "print" => Command::Board,
            "pgn" | "moves" => Command::Pgn,
            "fen" | "pos" | "position" => Command::Position(rest.join(" ")),
            _ => return Err(ParseCommandError::UnknownVerb(verb.to_owned())),
        })
    }
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Command, ParseCommandError> {
        Command::from_args(s.split_whitespace())
    }
}

/// Answer to a command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Reply {
    Reset,
    Ended,
    Adjourned,
    Resumed,
    NameSet,
    /// All tokens were played. Describes the last move.
    Pushed {
        status: Option<Status>,
        special: Option<Special>,
    },
    /// A token failed, or there was none. The moves before it stay played.
    PushFailed {
        error: Option<PlayError>,
        pushed: usize,
    },
    Undone(usize),
    /// The history ran out before the requested number of moves was taken
    /// back.
    UndoFailed { undone: usize },
    Loaded,
    BadFormat,
    InvalidCommand,
    /// A report: board, move list or legal moves.
    Text(String),
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        "move"
    } else {
        "moves"
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Reset => f.write_str("Board reset!"),
            Reply::Ended => f.write_str("Chess game ended!"),
            Reply::Adjourned => f.write_str("Chess game adjourned!"),
            Reply::Resumed => f.write_str("Chess game resumed!"),
            Reply::NameSet => f.write_str("Player name set!"),
            Reply::Pushed { status, special } => f.write_str(match (status, special) {
                (Some(Status::Check), _) => "Check!",
                (Some(Status::Checkmate), _) => "Checkmate!",
                (Some(Status::Stalemate), _) => "Stalemate!",
                (Some(Status::InsufficientMaterial), _) => "Draw by insufficient material!",
                (Some(Status::Repetition), _) => "Draw by repetition!",
                (Some(Status::FiftyMoves), _) => "50-move draw!",
                (None, Some(Special::Promotion(_))) => "Pawn promotion!",
                (None, Some(Special::Castle(CastlingSide::KingSide))) => "Kingside castle!",
                (None, Some(Special::Castle(CastlingSide::QueenSide))) => "Queenside castle!",
                (None, Some(Special::EnPassant)) => "En passant!",
                (None, _) => "Success!",
            }),
            Reply::PushFailed { error, pushed } => match error {
                Some(error) => write!(f, "{error}, {pushed} {} pushed", plural(*pushed)),
                None => write!(f, "no move, {pushed} {} pushed", plural(*pushed)),
            },
            Reply::Undone(n) => write!(f, "{n} {} undone", plural(*n)),
            Reply::UndoFailed { undone } => {
                write!(f, "move list empty, {undone} {} undone", plural(*undone))
            }
            Reply::Loaded => f.write_str("Position loaded!"),
            Reply::BadFormat => f.write_str("bad format"),
            Reply::InvalidCommand => f.write_str("invalid command"),
            Reply::Text(text) => f.write_str(text),
        }
    }
}

/// A game together with the state of the surrounding conversation.
///
/// A new session has an empty board. `new` or `fen` starts a game.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug)]
pub struct Session {
    game: Game,
    suspended: bool,
}

impl Default for Session {
    fn default() -> Session {
        Session::new()
    }
}

impl Session {
    pub fn new() -> Session {
        Session {
            game: Game::empty(),
            suspended: false,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Tests if the game is hidden from the narrative context.
    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Parses and runs a command line.
    pub fn execute(&mut self, line: &str) -> Reply {
        match line.parse() {
            Ok(command) => self.run(command),
            Err(_) => Reply::InvalidCommand,
        }
    }

    pub fn run(&mut self, command: Command) -> Reply {
        debug!(?command, "running command");
        match command {
            Command::New => {
                self.game.reset();
                self.suspended = false;
                Reply::Reset
            }
            Command::Off => {
                self.game.clear();
                Reply::Ended
            }
            Command::Suspend => {
                self.suspended = true;
                Reply::Adjourned
            }
            Command::Resume => {
                self.suspended = false;
                Reply::Resumed
            }
            Command::Name { color, name } => {
                self.game.set_name(color, name);
                Reply::NameSet
            }
            Command::Push(tokens) => self.push(&tokens),
            Command::Pop(n) => {
                for undone in 0..n as usize {
                    if self.game.undo().is_err() {
                        return Reply::UndoFailed { undone };
                    }
                }
                Reply::Undone(n as usize)
            }
            Command::Legal => Reply::Text(report::legal(&self.game, self.game.turn()).to_string()),
            Command::Board => Reply::Text(report::diagram(&self.game).to_string()),
            Command::Pgn => Reply::Text(self.game.movetext()),
            Command::Position(fen) => match self.game.load_fen(&fen) {
                Ok(()) => {
                    self.suspended = false;
                    Reply::Loaded
                }
                Err(_) => Reply::BadFormat,
            },
        }
    }

    fn push(&mut self, tokens: &[String]) -> Reply {
        let mut last = None;
        for (pushed, token) in tokens.iter().enumerate() {
            match self.game.play(token) {
                Ok(record) => last = Some((record.status, record.special)),
                Err(error) => {
                    return Reply::PushFailed {
                        error: Some(error),
                        pushed,
                    }
                }
            }
        }
        match last {
            Some((status, special)) => Reply::Pushed { status, special },
            None => Reply::PushFailed {
                error: None,
                pushed: 0,
            },
        }
    }

    /// Narrative summary of the game while it is running and not
    /// suspended.
    pub fn context(&self) -> Option<String> {
        (self.game.is_active() && !self.suspended).then(|| report::context(&self.game).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("RESET".parse(), Ok(Command::New));
        assert_eq!("pause".parse(), Ok(Command::Suspend));
        assert_eq!("undo".parse(), Ok(Command::Pop(1)));
        assert_eq!("pop 3".parse(), Ok(Command::Pop(3)));
        assert_eq!("pop many".parse(), Ok(Command::Pop(1)));
        assert_eq!(
            "black Paul  Morphy".parse(),
            Ok(Command::Name {
                color: Color::Black,
                name: Some("Paul Morphy".to_owned())
            })
        );
        assert_eq!(
            "white".parse(),
            Ok(Command::Name {
                color: Color::White,
                name: None
            })
        );
        assert_eq!(
            "add e4 e5".parse(),
            Ok(Command::Push(vec!["e4".to_owned(), "e5".to_owned()]))
        );
        assert_eq!("".parse::<Command>(), Err(ParseCommandError::Empty));
        assert_eq!(
            "castle".parse::<Command>(),
            Err(ParseCommandError::UnknownVerb("castle".to_owned()))
        );
    }

    #[test]
    fn test_push_replies() {
        let mut session = Session::new();
        assert_eq!(session.execute("push e4").to_string(), "game over, 0 moves pushed");
        session.execute("new");
        assert_eq!(session.execute("push").to_string(), "no move, 0 moves pushed");
        assert_eq!(
            session.execute("push e4 e5 Ke3").to_string(),
            "illegal move, 2 moves pushed"
        );
        assert_eq!(
            session.execute("push Nc3 Nc6 Nd5 Nb4 Nh6").to_string(),
            "no available piece, 4 moves pushed"
        );
        assert_eq!(session.game().history().len(), 6);
        assert_eq!(session.execute("push ??").to_string(), "bad format, 0 moves pushed");
    }

    #[test]
    fn test_pop_replies() {
        let mut session = Session::new();
        session.execute("new");
        session.execute("push e4 e5 Nf3");
        assert_eq!(session.execute("pop").to_string(), "1 move undone");
        assert_eq!(session.execute("undo 5").to_string(), "move list empty, 2 moves undone");
        assert_eq!(session.game().history().len(), 0);
    }

    #[test]
    fn test_special_replies() {
        let mut session = Session::new();
        session.execute("fen r3k2r/8/8/3pP3/8/8/1p6/R3K2R w KQkq d6 0 1");
        assert_eq!(session.execute("push exd6").to_string(), "En passant!");
        assert_eq!(session.execute("push O-O-O").to_string(), "Queenside castle!");
        assert_eq!(session.execute("push Rc1").to_string(), "Check!");
        assert_eq!(session.execute("push bxc1=N").to_string(), "Pawn promotion!");
    }

    #[test]
    fn test_session_lifecycle() {
        let mut session = Session::new();
        assert_eq!(session.context(), None);
        assert_eq!(session.execute("new").to_string(), "Board reset!");
        assert!(session.context().is_some());
        assert_eq!(session.execute("adjourn").to_string(), "Chess game adjourned!");
        assert_eq!(session.context(), None);
        assert_eq!(session.execute("push e4").to_string(), "Success!");
        assert_eq!(session.execute("continue").to_string(), "Chess game resumed!");
        assert!(session.context().is_some());
        assert_eq!(session.execute("close").to_string(), "Chess game ended!");
        assert_eq!(session.context(), None);
        assert_eq!(session.game().board().occupied_count(), 0);
        assert_eq!(session.execute("fen 8/8 w - - 0 1").to_string(), "bad format");
        assert_eq!(session.execute("fen 8/8/8/8").to_string(), "bad format");
        assert_eq!(
            session.execute("fen 4k3/8/8/8/8/8/8/4K3 w - - 0 4294967295").to_string(),
            "bad format"
        );
        assert_eq!(
            session.execute("fen 4k3/8/8/8/8/8/3PN3/4K3 w - e3 0 1").to_string(),
            "bad format"
        );
        assert_eq!(session.execute("resign").to_string(), "invalid command");
    }

    #[test]
    fn test_names_survive_reset() {
        let mut session = Session::new();
        assert_eq!(session.execute("white Anderssen").to_string(), "Player name set!");
        session.execute("new");
        assert_eq!(session.game().player(Color::White).name, "Anderssen");
        session.execute("white");
        assert_eq!(session.game().player(Color::White).name, "White");
    }
}
