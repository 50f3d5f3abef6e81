//! Wires a board widget to a rule engine and to the server that keeps the game record
//!
//! Moves are applied locally first, then sent to the server; if the server refuses one, it is taken
//! back.

mod config;
mod controller;

pub use config::{Cli, GameConfig, Seat};
pub use controller::MoveCommitController;

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("could not load the game record: {0}")]
    LoadRecord(String),
    #[error("could not read the game record file: {0}")]
    ReadRecord(#[from] std::io::Error),
}
