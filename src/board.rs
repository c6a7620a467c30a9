use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::piece::Color;
use crate::tower::{CaptureStyle, Tower};

/// Side of the storage grid. Row and column 0 are padding so that squares
/// keep their 1-based names.
pub const BOARD_SIDE: usize = 9;
pub const FIRST_ROW: usize = 1;
pub const LAST_ROW: usize = BOARD_SIDE - 1;

const CELL_COUNT: usize = BOARD_SIDE * BOARD_SIDE;

const DIAGONALS: [(isize, isize); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];

/// A square, column first. Playable squares have both coordinates in `1..=8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub col: usize,
    pub row: usize,
}

impl Position {
    pub fn new(col: usize, row: usize) -> Self {
        Position { col, row }
    }

    pub fn is_on_board(&self) -> bool {
        (FIRST_ROW..=LAST_ROW).contains(&self.col) && (FIRST_ROW..=LAST_ROW).contains(&self.row)
    }

    /// Dark squares: column and row share parity, so `a1` is playable
    pub fn is_playable(&self) -> bool {
        (self.col + self.row) % 2 == 0
    }

    fn step(&self, dc: isize, dr: isize) -> Option<Position> {
        let col = self.col.checked_add_signed(dc)?;
        let row = self.row.checked_add_signed(dr)?;
        let pos = Position::new(col, row);
        pos.is_on_board().then_some(pos)
    }

    /// Integer midpoint of the segment from `self` to `other`
    fn midpoint(&self, other: Position) -> Position {
        Position::new((self.col + other.col) / 2, (self.row + other.row) / 2)
    }

    /// True when `self` lies inside the open rectangle spanned by `a` and `b`
    fn is_strictly_between(&self, a: Position, b: Position) -> bool {
        let (min_col, max_col) = (a.col.min(b.col), a.col.max(b.col));
        let (min_row, max_row) = (a.row.min(b.row), a.row.max(b.row));
        self.col > min_col && self.col < max_col && self.row > min_row && self.row < max_row
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_on_board() {
            write!(f, "{}{}", (b'a' + (self.col - 1) as u8) as char, self.row)
        } else {
            write!(f, "({}, {})", self.col, self.row)
        }
    }
}

/// Rule violations. Every one of them ends the game record being replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("out of bounds")]
    OutOfBounds,
    #[error("busy cell")]
    BusyCell,
    #[error("white cell")]
    NotPlayable,
    #[error("invalid move")]
    InvalidMove,
    #[error("error")]
    AnyError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Option<Tower>; CELL_COUNT],
}

impl Board {
    pub fn new() -> Self {
        Board {
            cells: std::array::from_fn(|_| None),
        }
    }

    fn index(pos: Position) -> Option<usize> {
        (pos.col < BOARD_SIDE && pos.row < BOARD_SIDE).then_some(pos.row * BOARD_SIDE + pos.col)
    }

    pub fn tower(&self, pos: Position) -> Option<&Tower> {
        Self::index(pos).and_then(|i| self.cells[i].as_ref())
    }

    /// Place (or clear) a square directly, without any rule checks. Returns
    /// whatever stood there before.
    pub fn set_tower(
        &mut self,
        pos: Position,
        tower: Option<Tower>,
    ) -> Result<Option<Tower>, RuleError> {
        if !pos.is_on_board() {
            return Err(RuleError::OutOfBounds);
        }
        Ok(self.put(pos, tower))
    }

    pub fn take_tower(&mut self, pos: Position) -> Option<Tower> {
        Self::index(pos).and_then(|i| self.cells[i].take())
    }

    fn put(&mut self, pos: Position, tower: Option<Tower>) -> Option<Tower> {
        match Self::index(pos) {
            Some(i) => std::mem::replace(&mut self.cells[i], tower),
            None => None,
        }
    }

    /// Every playable square, row by row from `a1`
    pub fn positions() -> impl Iterator<Item = Position> {
        (FIRST_ROW..=LAST_ROW).flat_map(|row| {
            (FIRST_ROW..=LAST_ROW)
                .map(move |col| Position::new(col, row))
                .filter(Position::is_playable)
        })
    }

    /// Occupied squares whose top piece has the given color
    pub fn towers(&self, color: Color) -> impl Iterator<Item = (Position, &Tower)> + '_ {
        Self::positions().filter_map(move |pos| {
            self.tower(pos)
                .filter(|tower| tower.color() == color)
                .map(|tower| (pos, tower))
        })
    }

    /// Check that a tower may land on `to`
    pub fn validate_destination(&self, to: Position) -> Result<(), RuleError> {
        if !to.is_on_board() {
            return Err(RuleError::OutOfBounds);
        }
        if self.tower(to).is_some() {
            return Err(RuleError::BusyCell);
        }
        if !to.is_playable() {
            return Err(RuleError::NotPlayable);
        }
        Ok(())
    }

    /// Enemy squares the tower at `from` could jump right now. `None` when
    /// there are none, never an empty list.
    pub fn possible_victims(&self, from: Position) -> Option<Vec<Position>> {
        let tower = self.tower(from)?;
        self.victims_of(from, tower, tower.last_captured_at())
    }

    fn victims_of(
        &self,
        from: Position,
        tower: &Tower,
        last_captured: Option<Position>,
    ) -> Option<Vec<Position>> {
        let enemy = tower.color().opponent();
        let style = tower.capture_style();

        let victims: Vec<Position> = DIAGONALS
            .iter()
            .filter_map(|&(dc, dr)| match style {
                CaptureStyle::PlainJump => self.jump_victim(from, dc, dr, enemy, last_captured),
                CaptureStyle::KingSlide => self.slide_victim(from, dc, dr, enemy, last_captured),
            })
            .collect();

        trace!("{} at {} can take {:?}", tower.content_string(), from, victims);
        (!victims.is_empty()).then_some(victims)
    }

    fn jump_victim(
        &self,
        from: Position,
        dc: isize,
        dr: isize,
        enemy: Color,
        last_captured: Option<Position>,
    ) -> Option<Position> {
        let victim = from.step(dc, dr)?;
        let landing = victim.step(dc, dr)?;

        let is_enemy = self.tower(victim)?.color() == enemy;
        (is_enemy && self.tower(landing).is_none() && last_captured != Some(victim))
            .then_some(victim)
    }

    fn slide_victim(
        &self,
        from: Position,
        dc: isize,
        dr: isize,
        enemy: Color,
        last_captured: Option<Position>,
    ) -> Option<Position> {
        let mut current = from;
        loop {
            current = current.step(dc, dr)?;
            let Some(blocker) = self.tower(current) else {
                continue;
            };

            // The first occupied square ends the ray either way
            if blocker.color() != enemy || last_captured == Some(current) {
                return None;
            }
            let landing = current.step(dc, dr)?;
            return self.tower(landing).is_none().then_some(current);
        }
    }

    /// Victims for every tower of `color`, keyed by the attacker's square.
    /// Towers with nothing to take are left out.
    pub fn all_possible_victims(&self, color: Color) -> BTreeMap<Position, Vec<Position>> {
        self.towers(color)
            .filter_map(|(pos, tower)| {
                self.victims_of(pos, tower, tower.last_captured_at())
                    .map(|victims| (pos, victims))
            })
            .collect()
    }

    /// Squares of `color` holding a tower that must capture on a fresh turn.
    /// Capture memos are ignored: they belong to a chain that is already over.
    fn forced_capturers(&self, color: Color) -> Vec<Position> {
        self.towers(color)
            .filter(|&(pos, tower)| self.victims_of(pos, tower, None).is_some())
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Forget every capture memo on the board. Called when a capture chain
    /// is over and a new turn starts.
    pub fn end_chain(&mut self) {
        for tower in self.cells.iter_mut().flatten() {
            tower.clear_last_captured();
        }
    }

    fn promote(tower: &mut Tower, to: Position) {
        if !tower.is_king() && to.row == tower.color().promotion_row() {
            debug!("{} tower crowned on {}", tower.color(), to);
            tower.crown();
        }
    }

    /// Quiet (non-capturing) move
    pub fn move_tower(&mut self, from: Position, to: Position) -> Result<(), RuleError> {
        self.validate_destination(to)?;
        let color = self.tower(from).ok_or(RuleError::AnyError)?.color();

        let capturers = self.forced_capturers(color);
        if !capturers.is_empty() {
            debug!(
                "{} -> {} skips a capture available from {:?}",
                from, to, capturers
            );
            return Err(RuleError::InvalidMove);
        }

        let mut tower = self.take_tower(from).ok_or(RuleError::AnyError)?;
        Self::promote(&mut tower, to);
        self.put(to, Some(tower));
        self.end_chain();

        debug!("{} moved {} -> {}", color, from, to);
        Ok(())
    }

    /// Capture with a plain tower: the victim is the tower halfway between
    /// `from` and `to`
    pub fn beat_with_tower(&mut self, from: Position, to: Position) -> Result<(), RuleError> {
        self.validate_destination(to)?;
        let attacker = self.tower(from).ok_or(RuleError::AnyError)?;

        let victim_pos = from.midpoint(to);
        let victim = self.tower(victim_pos).ok_or(RuleError::AnyError)?;
        if victim.color() == attacker.color() {
            debug!("{} cannot jump its own color on {}", from, victim_pos);
            return Err(RuleError::AnyError);
        }

        self.transfer(from, victim_pos, to)
    }

    /// Capture with a king: the victim is the candidate lying strictly inside
    /// the rectangle spanned by `from` and `to`, however far the king slides
    pub fn beat_with_king(&mut self, from: Position, to: Position) -> Result<(), RuleError> {
        self.validate_destination(to)?;
        let victims = self.possible_victims(from).ok_or(RuleError::AnyError)?;

        let victim_pos = victims
            .into_iter()
            .find(|victim| victim.is_strictly_between(from, to))
            .ok_or(RuleError::AnyError)?;

        self.transfer(from, victim_pos, to)
    }

    /// Capture with whatever style the tower on `from` has
    pub fn beat(&mut self, from: Position, to: Position) -> Result<(), RuleError> {
        match self.tower(from).map(Tower::capture_style) {
            Some(CaptureStyle::KingSlide) => self.beat_with_king(from, to),
            _ => self.beat_with_tower(from, to),
        }
    }

    /// Move the victim's top piece under the attacker and land the attacker
    fn transfer(
        &mut self,
        from: Position,
        victim_pos: Position,
        to: Position,
    ) -> Result<(), RuleError> {
        let mut attacker = self.take_tower(from).ok_or(RuleError::AnyError)?;
        let Some(victim) = self.take_tower(victim_pos) else {
            self.put(from, Some(attacker));
            return Err(RuleError::AnyError);
        };

        let (piece, rest) = victim.pop_top();
        attacker.push_bottom(piece);
        if rest.is_none() {
            debug!("tower on {} is gone", victim_pos);
        }
        self.put(victim_pos, rest);

        self.end_chain();
        attacker.set_last_captured_at(victim_pos);
        Self::promote(&mut attacker, to);

        debug!(
            "{} took {} on {}: {} -> {}",
            attacker.color(),
            piece.letter(),
            victim_pos,
            from,
            to
        );
        self.put(to, Some(attacker));
        Ok(())
    }

    /// Get a string representation of the board
    pub fn display_board(&self) -> String {
        let mut result = String::new();
        for row in (FIRST_ROW..=LAST_ROW).rev() {
            result.push_str(&format!("{} ", row));
            for col in FIRST_ROW..=LAST_ROW {
                let pos = Position::new(col, row);
                let c = match self.tower(pos) {
                    Some(tower) => tower.top().letter(),
                    None if pos.is_playable() => '.',
                    None => ' ',
                };
                result.push_str(&format!(" {} ", c));
            }
            result.push('\n');
        }
        result.push_str("  ");
        for col in FIRST_ROW..=LAST_ROW {
            result.push_str(&format!(" {} ", (b'a' + (col - 1) as u8) as char));
        }
        result.push('\n');
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
