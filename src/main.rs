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

//! Line based host for a chess session.
//!
//! Reads commands from stdin, one per line, optionally prefixed with
//! `/chess`. Replies go to stdout. With `--context` the narrative context is
//! printed after every reply while a game is running. Logging is configured
//! with `RUST_LOG` and goes to stderr.

use std::{
    env,
    io::{self, BufRead as _, Write as _},
};

use kibitz::Session;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn strip_keyword(line: &str) -> &str {
    let line = line.trim();
    match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) if keyword.eq_ignore_ascii_case("/chess") => rest,
        _ if line.eq_ignore_ascii_case("/chess") => "",
        _ => line,
    }
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let show_context = env::args().skip(1).any(|arg| arg == "--context");
    let mut session = Session::new();
    info!(show_context, "session started");

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line?;
        let command = strip_keyword(&line);
        if command.is_empty() {
            continue;
        }

        writeln!(stdout, "{}", session.execute(command))?;
        if show_context {
            if let Some(context) = session.context() {
                writeln!(stdout, "{context}")?;
            }
        }
        stdout.flush()?;
    }

    info!("session closed");
    Ok(())
}
