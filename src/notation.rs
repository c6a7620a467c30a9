//! Text form of squares, towers and moves as they appear in game records.
//!
//! A square is a column letter and a row digit (`c3`, case-insensitive
//! letter). A tower is a square followed by its pieces top to bottom
//! (`c3_wbB`). A move is either `c3-d4` or a capture chain `c3:e5:g3`; every
//! square of a move may carry a tower annotation (`c3_w-d4_w`) which is
//! accepted and ignored.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::board::{FIRST_ROW, LAST_ROW, Position};
use crate::piece::Piece;
use crate::tower::Tower;

const SQUARE: &str = r"[a-hA-H][1-8]";
const CONTENT: &str = r"[wWbB]+";

lazy_static! {
    static ref TOWER_RE: Regex = Regex::new(&format!(
        r"({square})_({content})",
        square = SQUARE,
        content = CONTENT
    ))
    .unwrap();
    static ref SINGLE_TOWER_RE: Regex = Regex::new(&format!(
        r"^({square})_({content})$",
        square = SQUARE,
        content = CONTENT
    ))
    .unwrap();
    static ref QUIET_RE: Regex = Regex::new(&format!(
        r"^({square})(?:_{content})?-({square})(?:_{content})?$",
        square = SQUARE,
        content = CONTENT
    ))
    .unwrap();
    static ref CHAIN_RE: Regex = Regex::new(&format!(
        r"^{square}(?:_{content})?(?::{square}(?:_{content})?)+$",
        square = SQUARE,
        content = CONTENT
    ))
    .unwrap();
    static ref CHAIN_STEP_RE: Regex = Regex::new(&format!(
        r"({square})(?:_{content})?",
        square = SQUARE,
        content = CONTENT
    ))
    .unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotationError {
    #[error("invalid square `{0}`")]
    InvalidSquare(String),
    #[error("invalid tower `{0}`")]
    InvalidTower(String),
    #[error("invalid move `{0}`")]
    InvalidMove(String),
}

/// One side's move as written in the record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveToken {
    Quiet { from: Position, to: Position },
    /// Squares visited by the capturing tower, at least two
    Capture { path: Vec<Position> },
}

impl fmt::Display for MoveToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveToken::Quiet { from, to } => write!(f, "{}-{}", from, to),
            MoveToken::Capture { path } => {
                let squares: Vec<String> = path.iter().map(Position::to_string).collect();
                f.write_str(&squares.join(":"))
            }
        }
    }
}

pub fn parse_square(text: &str) -> Result<Position, NotationError> {
    let invalid = || NotationError::InvalidSquare(text.to_string());

    let mut chars = text.chars();
    let (Some(letter), Some(digit), None) = (chars.next(), chars.next(), chars.next()) else {
        return Err(invalid());
    };

    let letter = letter.to_ascii_lowercase();
    if !('a'..='h').contains(&letter) {
        return Err(invalid());
    }
    let col = (letter as u8 - b'a') as usize + 1;
    let row = digit.to_digit(10).ok_or_else(invalid)? as usize;
    if !(FIRST_ROW..=LAST_ROW).contains(&row) {
        return Err(invalid());
    }
    Ok(Position::new(col, row))
}

fn pieces_from(content: &str) -> Result<Vec<Piece>, NotationError> {
    content
        .chars()
        .map(|c| {
            Piece::from_letter(c).ok_or_else(|| NotationError::InvalidTower(content.to_string()))
        })
        .collect()
}

fn tower_from(square: &str, content: &str) -> Result<(Position, Tower), NotationError> {
    let pos = parse_square(square)?;
    let tower = Tower::from_pieces(pieces_from(content)?)
        .ok_or_else(|| NotationError::InvalidTower(format!("{}_{}", square, content)))?;
    Ok((pos, tower))
}

/// Parse a single `c3_wbB` token
pub fn parse_tower(token: &str) -> Result<(Position, Tower), NotationError> {
    let caps = SINGLE_TOWER_RE
        .captures(token)
        .ok_or_else(|| NotationError::InvalidTower(token.to_string()))?;
    tower_from(&caps[1], &caps[2])
}

/// Every tower token found in a setup line. Text between tokens is skipped.
pub fn parse_setup_line(line: &str) -> Result<Vec<(Position, Tower)>, NotationError> {
    TOWER_RE
        .captures_iter(line)
        .map(|caps| tower_from(&caps[1], &caps[2]))
        .collect()
}

pub fn parse_move(token: &str) -> Result<MoveToken, NotationError> {
    if let Some(caps) = QUIET_RE.captures(token) {
        return Ok(MoveToken::Quiet {
            from: parse_square(&caps[1])?,
            to: parse_square(&caps[2])?,
        });
    }

    if CHAIN_RE.is_match(token) {
        let path = CHAIN_STEP_RE
            .captures_iter(token)
            .map(|caps| parse_square(&caps[1]))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(MoveToken::Capture { path });
    }

    Err(NotationError::InvalidMove(token.to_string()))
}

/// Record form of a tower, e.g. `c3_wbB`
pub fn format_tower(pos: Position, tower: &Tower) -> String {
    format!("{}_{}", pos, tower.content_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Color;

    #[test]
    fn test_parse_square() {
        assert_eq!(parse_square("a1"), Ok(Position::new(1, 1)));
        assert_eq!(parse_square("H8"), Ok(Position::new(8, 8)));
        assert_eq!(parse_square("c5"), Ok(Position::new(3, 5)));

        for bad in ["i1", "a0", "a9", "a", "a12", "", "11"] {
            assert_eq!(
                parse_square(bad),
                Err(NotationError::InvalidSquare(bad.to_string())),
                "{:?} should not parse",
                bad
            );
        }
    }

    #[test]
    fn test_parse_tower() {
        let (pos, tower) = parse_tower("C3_WbB").unwrap();
        assert_eq!(pos, Position::new(3, 3));
        assert_eq!(tower.content_string(), "WbB");
        assert_eq!(tower.color(), Color::Light);
        assert!(tower.is_king());

        assert!(parse_tower("c3_").is_err());
        assert!(parse_tower("c3_x").is_err());
        assert!(parse_tower("c3wb").is_err());
    }

    #[test]
    fn test_parse_setup_line_skips_junk() {
        let towers = parse_setup_line("White: a1_w, c3_wb; e5_W").unwrap();
        let rendered: Vec<String> = towers
            .iter()
            .map(|(pos, tower)| format_tower(*pos, tower))
            .collect();
        assert_eq!(rendered, vec!["a1_w", "c3_wb", "e5_W"]);

        assert!(parse_setup_line("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_quiet_move() {
        assert_eq!(
            parse_move("c3-d4"),
            Ok(MoveToken::Quiet {
                from: Position::new(3, 3),
                to: Position::new(4, 4),
            })
        );

        // Annotated form carries the tower contents, which are ignored
        assert_eq!(parse_move("c3_wb-D4_wb"), parse_move("c3-d4"));
    }

    #[test]
    fn test_parse_capture_chain() {
        let token = parse_move("a1_w:c3_wb:e5_wbb").unwrap();
        assert_eq!(
            token,
            MoveToken::Capture {
                path: vec![Position::new(1, 1), Position::new(3, 3), Position::new(5, 5)],
            }
        );
        assert_eq!(token.to_string(), "a1:c3:e5");

        assert_eq!(
            parse_move("g3:e5"),
            Ok(MoveToken::Capture {
                path: vec![Position::new(7, 3), Position::new(5, 5)],
            })
        );
    }

    #[test]
    fn test_parse_move_rejects_garbage() {
        for bad in ["c3", "c3-", "c3-d4-e5", "c3:d4-e5", "c3--d4", "z1-a2", "c3:", ""] {
            assert_eq!(
                parse_move(bad),
                Err(NotationError::InvalidMove(bad.to_string())),
                "{:?} should not parse",
                bad
            );
        }
    }

    #[test]
    fn test_quiet_move_display() {
        let token = parse_move("C3-d4").unwrap();
        assert_eq!(token.to_string(), "c3-d4");
    }
}
