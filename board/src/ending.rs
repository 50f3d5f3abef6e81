//! Detecting the end of the game

use core::fmt;

use crate::RuleEngine;

/// The ways a game can end, in the order they are checked
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEnd {
    Checkmate,
    Draw,
    Stalemate,
    ThreefoldRepetition,
}

impl GameEnd {
    /// Find how the game ended, if it has.
    ///
    /// Only the first matching condition is reported, checking checkmate, then draw, then
    /// stalemate, then threefold repetition.
    pub fn detect(engine: &impl RuleEngine) -> Option<Self> {
        if engine.is_checkmate() {
            Some(Self::Checkmate)
        } else if engine.is_draw() {
            Some(Self::Draw)
        } else if engine.is_stalemate() {
            Some(Self::Stalemate)
        } else if engine.is_threefold_repetition() {
            Some(Self::ThreefoldRepetition)
        } else {
            None
        }
    }

    /// The message shown to the user
    pub const fn message(self) -> &'static str {
        match self {
            Self::Checkmate => "Game over. Checkmate!",
            Self::Draw => "Game over. Draw!",
            Self::Stalemate => "Game over. Stalemate!",
            Self::ThreefoldRepetition => "Game over. Draw by three-fold repetition!",
        }
    }
}

impl fmt::Display for GameEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
