use serde::{Deserialize, Serialize};
use std::fmt;

use crate::board::{FIRST_ROW, LAST_ROW};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Light,
    Dark,
}

impl Color {
    pub fn opponent(&self) -> Color {
        match self {
            Color::Light => Color::Dark,
            Color::Dark => Color::Light,
        }
    }

    /// Row on which a plain piece of this color is crowned
    pub fn promotion_row(&self) -> usize {
        match self {
            Color::Light => LAST_ROW,
            Color::Dark => FIRST_ROW,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Color::Light => "light",
            Color::Dark => "dark",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single checker. The color never changes; the king flag can only be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    color: Color,
    king: bool,
}

impl Piece {
    pub fn new(color: Color) -> Self {
        Piece { color, king: false }
    }

    pub fn king(color: Color) -> Self {
        Piece { color, king: true }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn is_king(&self) -> bool {
        self.king
    }

    pub fn crown(&mut self) {
        self.king = true;
    }

    /// Record letter: `w`/`b` for plain pieces, `W`/`B` for kings
    pub fn letter(&self) -> char {
        match (self.color, self.king) {
            (Color::Light, false) => 'w',
            (Color::Light, true) => 'W',
            (Color::Dark, false) => 'b',
            (Color::Dark, true) => 'B',
        }
    }

    pub fn from_letter(letter: char) -> Option<Piece> {
        match letter {
            'w' => Some(Piece::new(Color::Light)),
            'W' => Some(Piece::king(Color::Light)),
            'b' => Some(Piece::new(Color::Dark)),
            'B' => Some(Piece::king(Color::Dark)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crown_sets_king_flag() {
        let mut piece = Piece::new(Color::Dark);
        assert!(!piece.is_king());

        piece.crown();
        assert!(piece.is_king());

        // Crowning twice keeps the flag
        piece.crown();
        assert!(piece.is_king());
    }

    #[test]
    fn test_color_is_kept() {
        let mut piece = Piece::new(Color::Dark);
        piece.crown();
        assert_eq!(piece.color(), Color::Dark);
    }

    #[test]
    fn test_opponent() {
        assert_eq!(Color::Light.opponent(), Color::Dark);
        assert_eq!(Color::Dark.opponent(), Color::Light);
    }

    #[test]
    fn test_promotion_rows() {
        assert_eq!(Color::Light.promotion_row(), 8);
        assert_eq!(Color::Dark.promotion_row(), 1);
    }

    #[test]
    fn test_letters() {
        for letter in ['w', 'W', 'b', 'B'] {
            let piece = Piece::from_letter(letter).unwrap();
            assert_eq!(piece.letter(), letter);
        }
        assert_eq!(Piece::from_letter('B'), Some(Piece::king(Color::Dark)));
        assert_eq!(Piece::from_letter('x'), None);
    }
}
