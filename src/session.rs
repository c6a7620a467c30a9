use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, BufRead};
use thiserror::Error;

use crate::board::{Board, Position, RuleError};
use crate::notation::{self, MoveToken, NotationError};
use crate::piece::Color;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    /// Two space-separated lines, light towers then dark towers
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub format: ReportFormat,
    /// Print the board to stderr after every turn
    pub show_board: bool,
}

/// Why a single move was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error(transparent)]
    Rule(#[from] RuleError),
    #[error("error")]
    Notation(#[from] NotationError),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to read game record: {0}")]
    Io(#[from] io::Error),
    #[error("missing {0} setup line")]
    MissingSetup(Color),
    #[error("invalid {color} setup: {error}")]
    Setup {
        color: Color,
        #[source]
        error: NotationError,
    },
    #[error("cannot place tower on {pos}: {error}")]
    Placement {
        pos: Position,
        #[source]
        error: RuleError,
    },
    /// A move broke the rules; the record is not replayed any further
    #[error("{error}")]
    Violation {
        turn: usize,
        side: Color,
        token: String,
        #[source]
        error: MoveError,
    },
}

/// Surviving towers in record form, each group sorted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub light: Vec<String>,
    pub dark: Vec<String>,
}

impl Report {
    pub fn from_board(board: &Board) -> Self {
        let group = |color| {
            let mut towers: Vec<String> = board
                .towers(color)
                .map(|(pos, tower)| notation::format_tower(pos, tower))
                .collect();
            towers.sort();
            towers
        };
        Report {
            light: group(Color::Light),
            dark: group(Color::Dark),
        }
    }

    pub fn render(&self, format: ReportFormat) -> Result<String, serde_json::Error> {
        match format {
            ReportFormat::Text => Ok(self.to_string()),
            ReportFormat::Json => serde_json::to_string_pretty(self),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.light.join(" "), self.dark.join(" "))
    }
}

/// Replays a game record on one board
pub struct Session {
    board: Board,
    config: SessionConfig,
    turn: usize,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_board(Board::new(), config)
    }

    pub fn with_board(board: Board, config: SessionConfig) -> Self {
        Session {
            board,
            config,
            turn: 0,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> usize {
        self.turn
    }

    /// Place every tower listed on a setup line
    pub fn setup(&mut self, color: Color, line: &str) -> Result<(), SessionError> {
        let towers =
            notation::parse_setup_line(line).map_err(|error| SessionError::Setup { color, error })?;

        for (pos, tower) in towers {
            if tower.color() != color {
                warn!("{} setup line places a {} tower on {}", color, tower.color(), pos);
            }
            self.board
                .validate_destination(pos)
                .map_err(|error| SessionError::Placement { pos, error })?;
            self.board
                .set_tower(pos, Some(tower))
                .map_err(|error| SessionError::Placement { pos, error })?;
        }

        debug!("{} setup done", color);
        Ok(())
    }

    /// Play one record line: light's move, then dark's. A line with a single
    /// move only plays light.
    pub fn play_line(&mut self, line: &str) -> Result<(), SessionError> {
        self.turn += 1;
        let turn = self.turn;

        let mut tokens = line.split_whitespace();
        for side in [Color::Light, Color::Dark] {
            let Some(text) = tokens.next() else {
                break;
            };
            self.play_token(text)
                .map_err(|error| SessionError::Violation {
                    turn,
                    side,
                    token: text.to_string(),
                    error,
                })?;
        }
        if tokens.next().is_some() {
            warn!("turn {}: ignoring text after the second move", turn);
        }

        if self.config.show_board {
            eprintln!("After turn {}:\n{}", turn, self.board.display_board());
        }
        Ok(())
    }

    fn play_token(&mut self, text: &str) -> Result<(), MoveError> {
        let token = notation::parse_move(text)?;
        self.play_move(&token)?;
        Ok(())
    }

    /// Apply one move to the board. Whichever tower stands on the first
    /// square moves; its color is not matched against the side to play.
    pub fn play_move(&mut self, token: &MoveToken) -> Result<(), RuleError> {
        debug!("turn {}: {}", self.turn, token);

        match token {
            MoveToken::Quiet { from, to } => self.board.move_tower(*from, *to),
            MoveToken::Capture { path } => {
                // A capture starts a fresh chain
                self.board.end_chain();
                for hop in path.windows(2) {
                    self.board.beat(hop[0], hop[1])?;
                }

                let landing = path.last().copied().ok_or(RuleError::AnyError)?;
                if let Some(victims) = self.board.possible_victims(landing) {
                    debug!("chain stopped on {} with {:?} still capturable", landing, victims);
                    return Err(RuleError::InvalidMove);
                }
                Ok(())
            }
        }
    }

    pub fn report(&self) -> Report {
        Report::from_board(&self.board)
    }
}

/// Read a whole game record: two setup lines, then one line per turn until a
/// blank line or the end of input.
pub fn run<R: BufRead>(input: R, config: SessionConfig) -> Result<Report, SessionError> {
    let mut lines = input.lines();
    let mut session = Session::new(config);

    for color in [Color::Light, Color::Dark] {
        let line = lines.next().ok_or(SessionError::MissingSetup(color))??;
        session.setup(color, &line)?;
    }

    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            break;
        }
        session.play_line(&line)?;
    }

    info!("record replayed: {} turns", session.turn());
    Ok(session.report())
}
