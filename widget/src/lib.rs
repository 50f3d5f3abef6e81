//! Traits for whatever shows the board to the user
//!
//! A board widget renders the position and turns pointer interaction into [`WidgetEvent`]s. The
//! page around it shows alerts, asks questions, and carries the player labels and capture counts.
//! Both are generic over how they do it, so a terminal and a test double can implement them.

use board::{BoardSquare, CapturedTally, Color, Piece};

mod placement;

pub use placement::{Placement, PlacementError};

/// Something the user did on the board
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WidgetEvent {
    /// A piece was picked up
    DragStart { square: BoardSquare, piece: Piece },
    /// A dragged piece was dropped on `to`
    Drop { from: BoardSquare, to: BoardSquare },
    /// The pointer entered a square
    MouseoverSquare { square: BoardSquare },
    /// The pointer left a square
    MouseoutSquare { square: BoardSquare },
    /// The animation of a dropped piece finished
    SnapEnd,
}

/// How the controller answered an event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventResponse {
    /// Nothing special, carry on
    Continue,
    /// Put the piece back down where it was picked up; no drop will follow
    CancelDrag,
    /// The drop was refused, so return the piece to where it came from
    Snapback,
}

/// The two shades used to mark squares a piece can move to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SquareShade {
    /// Used on light squares
    Light,
    /// Used on dark squares
    Dark,
}

impl SquareShade {
    /// The shade to highlight the given square with
    pub const fn for_square(is_dark: bool) -> Self {
        if is_dark {
            Self::Dark
        } else {
            Self::Light
        }
    }

    /// The CSS color of this shade
    pub const fn css(self) -> &'static str {
        match self {
            Self::Light => "#a9a9a9",
            Self::Dark => "#696969",
        }
    }
}

/// Where a player's name is shown, relative to the board's orientation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelSlot {
    Top,
    Bottom,
}

/// A board the user can drag pieces around on
pub trait BoardWidget {
    /// Show the position from the given FEN, animating the change if asked to
    fn set_position(&mut self, fen: &str, animate: bool);

    /// The position currently displayed, as the piece-placement field of a FEN
    fn position(&self) -> String;

    /// Which color is shown at the bottom
    fn orientation(&self) -> Color;

    fn set_orientation(&mut self, bottom: Color);

    /// Set the background of one square
    fn highlight_square(&mut self, square: BoardSquare, shade: SquareShade);

    /// Reset every square's background
    fn clear_highlights(&mut self);

    /// Whether the widget draws this square dark
    fn is_dark_square(&self, square: BoardSquare) -> bool {
        square.is_dark()
    }

    /// Wait for the next thing the user does, or `None` once they are done
    fn next_event(&mut self) -> Option<WidgetEvent>;

    /// Tell the widget how the last event it produced was handled
    fn respond(&mut self, response: EventResponse);
}

/// The page the board lives on
pub trait Page {
    /// Show a message the user has to acknowledge
    fn alert(&mut self, message: &str);

    /// Ask what a pawn should promote into, returning whatever the user answered
    fn prompt_promotion(&mut self) -> String;

    /// Show a player's name above or below the board
    fn set_player_label(&mut self, slot: LabelSlot, name: &str);

    /// Show how many of `color`'s pieces have been captured
    fn show_captured(&mut self, color: Color, tally: &CapturedTally);
}
