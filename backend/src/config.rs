//! What the page knows about the game before the board is shown

use core::{fmt, str::FromStr, time::Duration};
use std::{fs, path::PathBuf};

use board::{Color, ColorFromStrErr};
use clap::{Args, Parser, ValueEnum};
use remote::MoveEncoding;

use crate::Result;

/// The game a controller is attached to, and who is looking at it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameConfig {
    /// The server's id for the game
    pub game_id: String,
    /// The color the user plays, or `None` when they are only watching
    pub user_color: Option<Color>,
    pub white_name: String,
    pub black_name: String,
    /// The moves played so far, as PGN
    pub prior_record: Option<String>,
    /// How moves are written when they are sent to the server
    pub encoding: MoveEncoding,
}

impl GameConfig {
    /// A fresh game between "White" and "Black" which the user is watching
    pub fn new(game_id: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
            user_color: None,
            white_name: "White".to_string(),
            black_name: "Black".to_string(),
            prior_record: None,
            encoding: MoveEncoding::default(),
        }
    }

    /// The name of whoever plays `color`
    pub fn name_of(&self, color: Color) -> &str {
        match color {
            Color::White => &self.white_name,
            Color::Black => &self.black_name,
        }
    }

    /// Set the prior record, treating a blank one or the literal `None` as no record at all
    pub fn with_prior_record(mut self, record: Option<String>) -> Self {
        self.prior_record = record.filter(|record| {
            let record = record.trim();
            !record.is_empty() && record != "None"
        });
        self
    }
}

/// Where the user sits at the board
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Seat {
    Player(Color),
    Spectator,
}

impl From<Seat> for Option<Color> {
    fn from(seat: Seat) -> Self {
        match seat {
            Seat::Player(color) => Some(color),
            Seat::Spectator => None,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player(color) => write!(f, "{color}"),
            Self::Spectator => f.write_str("none"),
        }
    }
}

impl FromStr for Seat {
    type Err = ColorFromStrErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "spectator" | "" => Ok(Self::Spectator),
            other => other.parse().map(Self::Player),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum EncodingArg {
    San,
    Coordinate,
}

impl From<EncodingArg> for MoveEncoding {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::San => MoveEncoding::San,
            EncodingArg::Coordinate => MoveEncoding::Coordinate,
        }
    }
}

#[derive(Clone, Debug, Args)]
#[group(required = false, multiple = false)]
struct PriorRecord {
    /// The moves played so far, as PGN
    #[arg(long, env = "CHESS_PGN")]
    pgn: Option<String>,
    /// A file holding the moves played so far, as PGN
    #[arg(long, env = "CHESS_PGN_FILE")]
    pgn_file: Option<PathBuf>,
}

/// Play a correspondence chess game from the terminal
#[derive(Clone, Debug, Parser)]
#[command(name = "backend", about = "Play a correspondence chess game from the terminal")]
pub struct Cli {
    /// The server's id for the game
    #[arg(long, env = "CHESS_GAME_ID")]
    game_id: String,
    /// The color you play: white, black, or none to watch
    #[arg(long, env = "CHESS_COLOR", default_value = "none")]
    color: Seat,
    /// White's name
    #[arg(long, env = "CHESS_WHITE", default_value = "White")]
    white: String,
    /// Black's name
    #[arg(long, env = "CHESS_BLACK", default_value = "Black")]
    black: String,
    #[command(flatten)]
    record: PriorRecord,
    /// Base URL of the game server
    #[arg(long, env = "CHESS_SERVER", default_value = "http://127.0.0.1:5000")]
    server: String,
    /// Seconds to wait for the server before treating a move as refused
    #[arg(long, env = "CHESS_TIMEOUT_SECS", default_value_t = 10)]
    timeout_secs: u64,
    /// How moves are written when they are sent to the server
    #[arg(long, env = "CHESS_ENCODING", value_enum, default_value_t = EncodingArg::San)]
    encoding: EncodingArg,
}

impl Cli {
    /// The base URL of the game server
    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build the game's configuration, reading the prior record from disk if one was named
    pub fn game_config(&self) -> Result<GameConfig> {
        let record = match (&self.record.pgn, &self.record.pgn_file) {
            (Some(pgn), _) => Some(pgn.clone()),
            (None, Some(path)) => Some(fs::read_to_string(path)?),
            (None, None) => None,
        };
        Ok(GameConfig {
            game_id: self.game_id.clone(),
            user_color: self.color.into(),
            white_name: self.white.clone(),
            black_name: self.black.clone(),
            prior_record: None,
            encoding: self.encoding.into(),
        }
        .with_prior_record(record))
    }
}
