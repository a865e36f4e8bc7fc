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

//! Chess rules, move validation and notation for text-driven hosts.
//!
//! # Examples
//!
//! Play moves given in standard algebraic notation:
//!
//! ```
//! use kibitz::{Color, Game};
//!
//! let mut game = Game::new();
//! assert_eq!(game.legal(Color::White).len(), 20);
//!
//! game.play("e4")?;
//! game.play("e5")?;
//! game.play("Nf3")?;
//! assert_eq!(game.movetext(), "1. e4 e5 2. Nf3");
//! # Ok::<_, kibitz::PlayError>(())
//! ```
//!
//! Detect game end conditions:
//!
//! ```
//! use kibitz::{Game, Outcome, Status};
//!
//! let mut game = Game::from_fen("7k/8/5Q2/6K1/8/8/8/8 w - - 0 1")?;
//! game.play("Qf7")?;
//! assert_eq!(game.status(), Some(Status::Stalemate));
//! assert_eq!(game.outcome(), Some(Outcome::Draw));
//! assert!(!game.is_active());
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```
//!
//! Drive a game with text commands:
//!
//! ```
//! use kibitz::Session;
//!
//! let mut session = Session::new();
//! session.execute("new");
//! assert_eq!(session.execute("push e4 e5 Ke3").to_string(), "illegal move, 2 moves pushed");
//! assert_eq!(session.execute("pop 2").to_string(), "2 moves undone");
//! ```
//!
//! Also supports [FEN](fen) and [SAN](san) formats for positions and moves,
//! and plain English [reports](report) of a game.
//!
//! # Feature flags
//!
//! * `serde`: Implements [`serde::Serialize`](https://docs.rs/serde/1/serde/trait.Serialize.html)
//!   and [`serde::Deserialize`](https://docs.rs/serde/1/serde/trait.Deserialize.html) for
//!   games, sessions and their parts.
//! * `nohash-hasher`: Implements
//!   [`nohash_hasher::IsEnabled`](https://docs.rs/nohash-hasher/0.2/nohash_hasher/trait.IsEnabled.html)
//!   for sensible types, and counts positions with a pass-through hasher.

#![forbid(unsafe_code)]
#![warn(missing_debug_implementations)]
#![cfg_attr(docs_rs, feature(doc_auto_cfg))]

mod castling_side;
mod color;
mod game;
mod m;
mod movegen;
mod perft;
mod role;
mod square;
mod types;

pub mod attacks;
pub mod board;
pub mod command;
pub mod fen;
pub mod history;
pub mod legal;
pub mod report;
pub mod san;

pub use board::Board;
pub use castling_side::CastlingSide;
pub use color::{ByColor, Color, ParseColorError};
pub use command::{Command, Reply, Session};
pub use fen::Fen;
pub use game::{Game, Outcome, PlayError, Player, UndoError};
pub use history::{MoveRecord, Special, Status};
pub use m::{Move, MoveList};
pub use perft::perft;
pub use role::Role;
pub use san::San;
pub use square::{File, ParseSquareError, Rank, Square};
pub use types::{Location, Piece, PieceEntry, PieceId};

#[cfg(feature = "nohash-hasher")]
impl nohash_hasher::IsEnabled for File {}

#[cfg(feature = "nohash-hasher")]
impl nohash_hasher::IsEnabled for Rank {}

#[cfg(feature = "nohash-hasher")]
impl nohash_hasher::IsEnabled for Square {}

#[cfg(feature = "nohash-hasher")]
impl nohash_hasher::IsEnabled for Role {}

#[cfg(feature = "nohash-hasher")]
impl nohash_hasher::IsEnabled for Color {}

#[cfg(feature = "nohash-hasher")]
impl nohash_hasher::IsEnabled for PieceId {}
