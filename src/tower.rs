use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::board::Position;
use crate::piece::{Color, Piece};

/// How a tower looks for victims, decided by its top piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureStyle {
    /// Jump an adjacent enemy onto the empty square right behind it
    PlainJump,
    /// Slide along a diagonal and jump the first enemy met
    KingSlide,
}

/// The pieces stacked on one square, top first.
///
/// The top piece is stored apart from the rest so a tower always holds at
/// least one piece. Only the top piece decides the tower's color and rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tower {
    top: Piece,
    below: VecDeque<Piece>,
    /// Square of the victim taken by the last hop of the current capture chain
    last_captured_at: Option<Position>,
}

impl Tower {
    pub fn new(top: Piece) -> Self {
        Tower {
            top,
            below: VecDeque::new(),
            last_captured_at: None,
        }
    }

    /// Build a tower from pieces listed top to bottom. Returns `None` for an
    /// empty list.
    pub fn from_pieces<I>(pieces: I) -> Option<Self>
    where
        I: IntoIterator<Item = Piece>,
    {
        let mut pieces = pieces.into_iter();
        let mut tower = Tower::new(pieces.next()?);
        tower.below.extend(pieces);
        Some(tower)
    }

    pub fn top(&self) -> &Piece {
        &self.top
    }

    pub fn color(&self) -> Color {
        self.top.color()
    }

    pub fn is_king(&self) -> bool {
        self.top.is_king()
    }

    pub fn capture_style(&self) -> CaptureStyle {
        if self.is_king() {
            CaptureStyle::KingSlide
        } else {
            CaptureStyle::PlainJump
        }
    }

    pub fn crown(&mut self) {
        self.top.crown();
    }

    pub fn height(&self) -> usize {
        1 + self.below.len()
    }

    /// Pieces from top to bottom
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        std::iter::once(&self.top).chain(self.below.iter())
    }

    /// Captured pieces go under the tower
    pub fn push_bottom(&mut self, piece: Piece) {
        self.below.push_back(piece);
    }

    /// Remove the top piece. The rest of the tower, if anything is left, keeps
    /// its capture memo.
    pub fn pop_top(self) -> (Piece, Option<Tower>) {
        let Tower {
            top,
            mut below,
            last_captured_at,
        } = self;
        let rest = below.pop_front().map(|new_top| Tower {
            top: new_top,
            below,
            last_captured_at,
        });
        (top, rest)
    }

    pub fn last_captured_at(&self) -> Option<Position> {
        self.last_captured_at
    }

    pub fn set_last_captured_at(&mut self, pos: Position) {
        self.last_captured_at = Some(pos);
    }

    pub fn clear_last_captured(&mut self) {
        self.last_captured_at = None;
    }

    /// Record letters top to bottom, e.g. `WbwB`
    pub fn content_string(&self) -> String {
        self.pieces().map(Piece::letter).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tower(letters: &str) -> Tower {
        Tower::from_pieces(letters.chars().map(|c| Piece::from_letter(c).unwrap())).unwrap()
    }

    #[test]
    fn test_content_string_is_top_to_bottom() {
        let mut tower = Tower::new(Piece::king(Color::Light));
        tower.push_bottom(Piece::new(Color::Dark));
        tower.push_bottom(Piece::new(Color::Light));
        tower.push_bottom(Piece::king(Color::Dark));

        assert_eq!(tower.content_string(), "WbwB");
        assert_eq!(tower.height(), 4);
    }

    #[test]
    fn test_empty_list_builds_no_tower() {
        assert!(Tower::from_pieces(Vec::new()).is_none());
    }

    #[test]
    fn test_top_piece_decides_color_and_rank() {
        let king = tower("Bww");
        assert_eq!(king.color(), Color::Dark);
        assert!(king.is_king());
        assert_eq!(king.capture_style(), CaptureStyle::KingSlide);

        let plain = tower("wB");
        assert_eq!(plain.color(), Color::Light);
        assert!(!plain.is_king());
        assert_eq!(plain.capture_style(), CaptureStyle::PlainJump);
    }

    #[test]
    fn test_pop_top_exposes_next_piece() {
        let mut victim = tower("bWw");
        victim.set_last_captured_at(Position::new(4, 4));

        let (piece, rest) = victim.pop_top();
        assert_eq!(piece, Piece::new(Color::Dark));

        let rest = rest.unwrap();
        assert_eq!(rest.content_string(), "Ww");
        assert_eq!(rest.color(), Color::Light);
        assert_eq!(rest.last_captured_at(), Some(Position::new(4, 4)));
    }

    #[test]
    fn test_pop_last_piece_empties_tower() {
        let (piece, rest) = tower("B").pop_top();
        assert_eq!(piece, Piece::king(Color::Dark));
        assert!(rest.is_none());
    }

    #[test]
    fn test_crown_only_touches_top() {
        let mut tower = tower("wb");
        tower.crown();
        assert_eq!(tower.content_string(), "Wb");
    }

    #[test]
    fn test_capture_memo() {
        let mut tower = tower("w");
        assert_eq!(tower.last_captured_at(), None);

        tower.set_last_captured_at(Position::new(2, 2));
        assert_eq!(tower.last_captured_at(), Some(Position::new(2, 2)));

        tower.clear_last_captured();
        assert_eq!(tower.last_captured_at(), None);
    }
}
