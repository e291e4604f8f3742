//! Face-turn notation: `R`, `R'`, `R2` and friends.

use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::puzzle::common::{Basis, Face};

/// A turn of one outer face.
///
/// Positive `quarter_turns` are clockwise as seen from outside the face;
/// magnitude 2 is a half turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Move {
    face: Face,
    quarter_turns: i8,
}

impl Move {
    pub fn new(face: Face, quarter_turns: i8) -> Result<Self, ParseError> {
        match quarter_turns {
            -2 | -1 | 1 | 2 => Ok(Self {
                face,
                quarter_turns,
            }),
            _ => Err(ParseError::InvalidToken(format!(
                "{}{quarter_turns}",
                face.name()
            ))),
        }
    }

    pub fn face(&self) -> Face {
        self.face
    }

    pub fn quarter_turns(&self) -> i8 {
        self.quarter_turns
    }

    pub fn inverse(&self) -> Self {
        Self {
            face: self.face,
            quarter_turns: -self.quarter_turns,
        }
    }

    pub fn axis(&self) -> Basis {
        self.face.0
    }

    /// Number of counterclockwise quarter steps about the positive axis.
    ///
    /// Clockwise seen from outside the face is clockwise about the face's
    /// outward direction, so L, D and B flip the sign of R, U and F.
    pub fn steps(&self) -> u8 {
        (-self.quarter_turns * self.face.1.to_i8()).rem_euclid(4) as u8
    }

    /// Signed angle in radians about the positive axis, keeping the
    /// direction the turn was written in (so `R2` and `R2'` animate in
    /// opposite directions).
    pub fn angle(&self) -> f32 {
        -f32::from(self.quarter_turns * self.face.1.to_i8()) * FRAC_PI_2
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.face)?;
        if self.quarter_turns.abs() == 2 {
            write!(f, "2")?;
        }
        if self.quarter_turns < 0 {
            write!(f, "'")?;
        }
        Ok(())
    }
}

/// Parses a single move token.
pub fn parse(token: &str) -> Result<Move, ParseError> {
    let invalid = || ParseError::InvalidToken(token.to_string());
    let mut chars = token.trim().chars();
    let face = chars.next().and_then(Face::from_name).ok_or_else(invalid)?;

    let mut double = false;
    let mut prime = false;
    for c in chars {
        match c {
            '2' if !double => double = true,
            '\'' if !prime => prime = true,
            _ => return Err(invalid()),
        }
    }

    let magnitude = if double { 2 } else { 1 };
    Move::new(face, if prime { -magnitude } else { magnitude })
}

/// Parses a whitespace separated sequence of moves, e.g. `"R U R' U'"`.
pub fn parse_sequence(sequence: &str) -> Result<Vec<Move>, ParseError> {
    sequence.split_whitespace().map(parse).collect()
}

impl FromStr for Move {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl From<Move> for String {
    fn from(mv: Move) -> String {
        mv.to_string()
    }
}

impl TryFrom<String> for Move {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse(&value)
    }
}
