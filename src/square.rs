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

use std::{error::Error, fmt, str::FromStr};

macro_rules! coord_impl {
    ($t:ident, $first:literal, [$($v:ident = $i:literal),+]) => {
        impl $t {
            pub const fn new(index: u8) -> Option<$t> {
                match index {
                    $($i => Some($t::$v),)+
                    _ => None,
                }
            }

            pub const fn from_char(ch: char) -> Option<$t> {
                if ch.is_ascii() {
                    let byte = ch as u8;
                    if byte >= $first {
                        return $t::new(byte - $first);
                    }
                }
                None
            }

            #[inline]
            pub const fn index(self) -> u8 {
                self as u8
            }

            pub const fn char(self) -> char {
                ($first + self as u8) as char
            }

            #[must_use]
            pub const fn offset(self, delta: i8) -> Option<$t> {
                let index = self as i8 + delta;
                if index < 0 {
                    None
                } else {
                    $t::new(index as u8)
                }
            }

            pub const ALL: [$t; 8] = [$($t::$v),+];
        }

        impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.char())
            }
        }
    };
}

/// A file of the chessboard.
#[allow(missing_docs)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
#[repr(u8)]
pub enum File {
    A = 0,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

coord_impl!(File, b'a', [A = 0, B = 1, C = 2, D = 3, E = 4, F = 5, G = 6, H = 7]);

/// A rank of the chessboard.
#[allow(missing_docs)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
#[repr(u8)]
pub enum Rank {
    First = 0,
    Second,
    Third,
    Fourth,
    Fifth,
    Sixth,
    Seventh,
    Eighth,
}

coord_impl!(
    Rank,
    b'1',
    [First = 0, Second = 1, Third = 2, Fourth = 3, Fifth = 4, Sixth = 5, Seventh = 6, Eighth = 7]
);

/// Error when parsing an invalid square name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseSquareError;

impl fmt::Display for ParseSquareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid square name")
    }
}

impl Error for ParseSquareError {}

/// A square of the chessboard, indexed `a1 = 0` to `h8 = 63`.
///
/// # Examples
///
/// ```
/// use kibitz::{File, Rank, Square};
///
/// let sq = Square::from_coords(File::E, Rank::Fourth);
/// assert_eq!(sq, Square::E4);
/// assert_eq!(sq.to_string(), "e4");
/// assert_eq!("e4".parse::<Square>(), Ok(Square::E4));
/// ```
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "u8", into = "u8")
)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Square(u8);

impl Square {
    #[inline]
    pub const fn from_coords(file: File, rank: Rank) -> Square {
        Square(rank as u8 * 8 + file as u8)
    }

    /// Gets the square with the given index, `0..64`.
    pub const fn new(index: u8) -> Option<Square> {
        if index < 64 {
            Some(Square(index))
        } else {
            None
        }
    }

    /// Parses a square name like `e4`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseSquareError`] unless `s` is exactly a file letter
    /// followed by a rank digit.
    pub fn from_ascii(s: &[u8]) -> Result<Square, ParseSquareError> {
        match *s {
            [file, rank] => Ok(Square::from_coords(
                File::from_char(char::from(file)).ok_or(ParseSquareError)?,
                Rank::from_char(char::from(rank)).ok_or(ParseSquareError)?,
            )),
            _ => Err(ParseSquareError),
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn file(self) -> File {
        match File::new(self.0 & 7) {
            Some(file) => file,
            None => unreachable!(),
        }
    }

    #[inline]
    pub const fn rank(self) -> Rank {
        match Rank::new(self.0 >> 3) {
            Some(rank) => rank,
            None => unreachable!(),
        }
    }

    /// Steps `dfile` files and `drank` ranks away, or `None` when that
    /// leaves the board.
    #[must_use]
    pub const fn offset(self, dfile: i8, drank: i8) -> Option<Square> {
        match (self.file().offset(dfile), self.rank().offset(drank)) {
            (Some(file), Some(rank)) => Some(Square::from_coords(file, rank)),
            _ => None,
        }
    }

    /// Same file, other rank.
    #[must_use]
    pub const fn with_rank(self, rank: Rank) -> Square {
        Square::from_coords(self.file(), rank)
    }

    /// Iterates all squares in scan order, `a1`, `b1`, ..., `h8`.
    pub fn all() -> impl DoubleEndedIterator<Item = Square> + ExactSizeIterator {
        (0..64).map(Square)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file().char(), self.rank().char())
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string().to_uppercase())
    }
}

impl TryFrom<u8> for Square {
    type Error = ParseSquareError;

    fn try_from(index: u8) -> Result<Square, ParseSquareError> {
        Square::new(index).ok_or(ParseSquareError)
    }
}

impl From<Square> for u8 {
    fn from(sq: Square) -> u8 {
        sq.0
    }
}

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Square, ParseSquareError> {
        Square::from_ascii(s.as_bytes())
    }
}

macro_rules! square_consts {
    ($($name:ident = $index:literal),+ $(,)?) => {
        #[allow(missing_docs)]
        impl Square {
            $(pub const $name: Square = Square($index);)+
        }
    };
}

square_consts! {
    A1 = 0, B1 = 1, C1 = 2, D1 = 3, E1 = 4, F1 = 5, G1 = 6, H1 = 7,
    A2 = 8, B2 = 9, C2 = 10, D2 = 11, E2 = 12, F2 = 13, G2 = 14, H2 = 15,
    A3 = 16, B3 = 17, C3 = 18, D3 = 19, E3 = 20, F3 = 21, G3 = 22, H3 = 23,
    A4 = 24, B4 = 25, C4 = 26, D4 = 27, E4 = 28, F4 = 29, G4 = 30, H4 = 31,
    A5 = 32, B5 = 33, C5 = 34, D5 = 35, E5 = 36, F5 = 37, G5 = 38, H5 = 39,
    A6 = 40, B6 = 41, C6 = 42, D6 = 43, E6 = 44, F6 = 45, G6 = 46, H6 = 47,
    A7 = 48, B7 = 49, C7 = 50, D7 = 51, E7 = 52, F7 = 53, G7 = 54, H7 = 55,
    A8 = 56, B8 = 57, C8 = 58, D8 = 59, E8 = 60, F8 = 61, G8 = 62, H8 = 63,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_from_index() {
        assert_eq!(Square::try_from(12), Ok(Square::E2));
        assert_eq!(Square::try_from(64), Err(ParseSquareError));
        assert_eq!(u8::from(Square::H8), 63);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_out_of_range() {
        #[derive(serde::Deserialize)]
        struct Row {
            sq: Square,
        }

        let mut reader = csv::Reader::from_reader("sq\n12\n64\n".as_bytes());
        let rows: Vec<Result<Row, csv::Error>> = reader.deserialize().collect();
        assert_eq!(rows[0].as_ref().map(|row| row.sq).ok(), Some(Square::E2));
        assert!(rows[1].is_err());
    }

    #[test]
    fn test_square() {
        for file in File::ALL {
            for rank in Rank::ALL {
                let square = Square::from_coords(file, rank);
                assert_eq!(square.file(), file);
                assert_eq!(square.rank(), rank);
            }
        }
    }

    #[test]
    fn test_offset() {
        assert_eq!(Square::E2.offset(0, 2), Some(Square::E4));
        assert_eq!(Square::G1.offset(-1, 2), Some(Square::F3));
        assert_eq!(Square::H4.offset(1, 0), None);
        assert_eq!(Square::A8.offset(0, 1), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!("h8".parse::<Square>(), Ok(Square::H8));
        assert_eq!("i1".parse::<Square>(), Err(ParseSquareError));
        assert_eq!("a9".parse::<Square>(), Err(ParseSquareError));
        assert_eq!("a".parse::<Square>(), Err(ParseSquareError));
        assert_eq!(format!("{:?}", Square::C7), "C7");
    }

    #[test]
    fn test_chars() {
        assert_eq!(File::from_char('h'), Some(File::H));
        assert_eq!(File::from_char('H'), None);
        assert_eq!(Rank::from_char('9'), None);
        assert_eq!(Rank::from_char('0'), None);
        assert_eq!(Rank::Sixth.char(), '6');
    }
}
