//! Tallies of captured material, as shown next to the board

use core::fmt;

use crate::{Color, MoveRecord, PieceKind};

/// How many pieces of one color have been captured, by kind
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CapturedTally {
    pub pawn: u8,
    pub knight: u8,
    pub bishop: u8,
    pub rook: u8,
    pub queen: u8,
}

impl CapturedTally {
    /// Count the pieces of `color` captured over the whole game.
    ///
    /// This walks the full history every time rather than keeping a running count, so it can never
    /// drift from the engine after an undo.
    pub fn of(color: Color, history: &[MoveRecord]) -> Self {
        let mut tally = Self::default();
        for captured in history
            .iter()
            .filter(|mv| mv.color != color)
            .filter_map(|mv| mv.captured)
        {
            if let Some(count) = tally.count_mut(captured) {
                *count += 1;
            }
        }
        tally
    }

    /// The number of captured pieces of the given kind (kings are never captured)
    pub const fn count(&self, kind: PieceKind) -> u8 {
        match kind {
            PieceKind::Pawn => self.pawn,
            PieceKind::Knight => self.knight,
            PieceKind::Bishop => self.bishop,
            PieceKind::Rook => self.rook,
            PieceKind::Queen => self.queen,
            PieceKind::King => 0,
        }
    }

    fn count_mut(&mut self, kind: PieceKind) -> Option<&mut u8> {
        match kind {
            PieceKind::Pawn => Some(&mut self.pawn),
            PieceKind::Knight => Some(&mut self.knight),
            PieceKind::Bishop => Some(&mut self.bishop),
            PieceKind::Rook => Some(&mut self.rook),
            PieceKind::Queen => Some(&mut self.queen),
            PieceKind::King => None,
        }
    }

    /// Total number of captured pieces
    pub const fn total(&self) -> u8 {
        self.pawn + self.knight + self.bishop + self.rook + self.queen
    }
}

impl fmt::Display for CapturedTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "p:{} n:{} b:{} r:{} q:{}",
            self.pawn, self.knight, self.bishop, self.rook, self.queen
        )
    }
}
