//! Chess vocabulary shared by the rule engine, the board widget and the controller, plus the
//! [`RuleEngine`] capability set the controller drives.

use core::{fmt, str::FromStr};
use std::error;

mod captured;
mod ending;

pub use captured::CapturedTally;
pub use ending::GameEnd;

/// The types of pieces there are
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}
impl PieceKind {
    /// All the kinds of pieces there are
    pub const KINDS: [PieceKind; 6] = [
        Self::Pawn,
        Self::Rook,
        Self::Knight,
        Self::Bishop,
        Self::Queen,
        Self::King,
    ];

    /// The kinds a pawn may promote into
    pub const PROMOTIONS: [PieceKind; 4] = [Self::Queen, Self::Rook, Self::Bishop, Self::Knight];

    /// The capitalized version of the letter used for this piece in FEN
    pub const fn fen_letter(self) -> char {
        match self {
            Self::Pawn => 'P',
            Self::Rook => 'R',
            Self::Knight => 'N',
            Self::Bishop => 'B',
            Self::Queen => 'Q',
            Self::King => 'K',
        }
    }

    /// Parse the letter used for this piece in FEN, in either case
    pub const fn from_fen_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'P' => Some(Self::Pawn),
            'R' => Some(Self::Rook),
            'N' => Some(Self::Knight),
            'B' => Some(Self::Bishop),
            'Q' => Some(Self::Queen),
            'K' => Some(Self::King),
            _ => None,
        }
    }

    /// Whether a pawn can promote into this kind of piece
    pub const fn is_promotable(self) -> bool {
        match self {
            PieceKind::Pawn | PieceKind::King => false,
            PieceKind::Rook | PieceKind::Queen | PieceKind::Knight | PieceKind::Bishop => true,
        }
    }

    /// Interpret what a user typed when asked what to promote into.
    ///
    /// Accepts the piece letter (`q`, `r`, `b`, `n`) or the full name, in any case. Anything
    /// else, including an empty answer, falls back to a queen.
    ///
    /// ```
    /// use board::PieceKind;
    /// assert_eq!(PieceKind::from_promotion_input("n"), PieceKind::Knight);
    /// assert_eq!(PieceKind::from_promotion_input(" Rook\n"), PieceKind::Rook);
    /// assert_eq!(PieceKind::from_promotion_input("x"), PieceKind::Queen);
    /// assert_eq!(PieceKind::from_promotion_input(""), PieceKind::Queen);
    /// ```
    pub fn from_promotion_input(input: &str) -> Self {
        let input = input.trim().to_ascii_lowercase();
        Self::PROMOTIONS
            .into_iter()
            .find(|kind| {
                let letter = kind.fen_letter().to_ascii_lowercase();
                input == kind.to_string() || (input.len() == 1 && input.starts_with(letter))
            })
            .unwrap_or(Self::Queen)
    }
}
impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pawn => "pawn",
            Self::Rook => "rook",
            Self::Knight => "knight",
            Self::Bishop => "bishop",
            Self::Queen => "queen",
            Self::King => "king",
        })
    }
}

/// The colors a piece can have
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}
impl Color {
    pub const fn other(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Color::White => "white",
            Color::Black => "black",
        })
    }
}
#[derive(Debug)]
pub struct ColorFromStrErr;
impl fmt::Display for ColorFromStrErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("color must be \"white\" or \"black\"")
    }
}
impl error::Error for ColorFromStrErr {}
impl FromStr for Color {
    type Err = ColorFromStrErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "white" | "w" => Ok(Self::White),
            "black" | "b" => Ok(Self::Black),
            _ => Err(ColorFromStrErr),
        }
    }
}

/// A piece
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}
impl Piece {
    pub const fn fen_letter(self) -> char {
        match self.color {
            Color::White => self.kind.fen_letter().to_ascii_uppercase(),
            Color::Black => self.kind.fen_letter().to_ascii_lowercase(),
        }
    }

    /// Parse a piece from its FEN letter, where uppercase is white
    pub const fn from_fen_letter(letter: char) -> Option<Self> {
        let color = if letter.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        match PieceKind::from_fen_letter(letter) {
            Some(kind) => Some(Self { kind, color }),
            None => None,
        }
    }
}

/// A square on the board
///
/// Stored in 0x88 method:
/// ```text
/// 0b12345678
///        +-+ File
///    +-+ Rank
///   +   + Must be zero, invalid position if 1
/// ```
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardSquare(pub u8);
impl BoardSquare {
    /// An invalid square
    pub const INVALID: Self = Self(0xee);

    /// Returns if this square is valid
    ///
    /// ```
    /// # use board::BoardSquare;
    /// assert!(!BoardSquare::INVALID.is_valid());
    /// ```
    pub const fn is_valid(self) -> bool {
        self.0 & 0x88 == 0
    }

    /// Produce a board square from the rank and file, returning [`Self::INVALID`] if the rank and
    /// file are not a valid square.
    pub const fn from_rank_file(rank: u8, file: u8) -> Self {
        if rank < 8 && file < 8 {
            Self(rank << 4 | file)
        } else {
            Self::INVALID
        }
    }

    /// Returns the `(rank, file)` tuple if this position is valid
    pub const fn to_rank_file(self) -> Option<(u8, u8)> {
        if self.is_valid() {
            Some((self.0 >> 4, self.0 & 0x07))
        } else {
            None
        }
    }

    /// The zero-indexed rank, where 0 is rank 1
    pub const fn rank(self) -> u8 {
        self.0 >> 4 & 0x07
    }

    /// The zero-indexed file, where 0 is the a-file
    pub const fn file(self) -> u8 {
        self.0 & 0x07
    }

    /// The index of this square counting from a1 along the ranks, in `0..64`
    pub const fn index(self) -> u8 {
        self.rank() * 8 + self.file()
    }

    /// The inverse of [`Self::index`]
    pub const fn from_index(index: u8) -> Self {
        Self::from_rank_file(index / 8, index % 8)
    }

    /// Whether this is one of the dark squares (a1 is dark)
    ///
    /// ```
    /// # use board::BoardSquare;
    /// assert!("a1".parse::<BoardSquare>().unwrap().is_dark());
    /// assert!("h1".parse::<BoardSquare>().unwrap().is_light());
    /// ```
    pub const fn is_dark(self) -> bool {
        (self.rank() + self.file()) % 2 == 0
    }

    pub const fn is_light(self) -> bool {
        !self.is_dark()
    }

    /// Whether this square is on the first or the last rank
    pub const fn is_back_rank(self) -> bool {
        matches!(self.rank(), 0 | 7)
    }

    /// An iterator over all valid squares on the board, starting at a1
    ///
    /// ```
    /// assert_eq!(board::BoardSquare::all_squares().count(), 64);
    /// ```
    pub fn all_squares() -> impl Iterator<Item = Self> {
        (0..64).map(Self::from_index)
    }
}
impl fmt::Debug for BoardSquare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "BoardSquare({self})")
        } else {
            write!(f, "BoardSquare(invalid {:X})", self.0)
        }
    }
}
impl fmt::Display for BoardSquare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_rank_file() {
            Some((rank, file)) => write!(f, "{}{}", (b'a' + file) as char, rank + 1),
            None => f.write_str("XX"),
        }
    }
}
#[derive(Debug)]
pub struct BoardSquareFromStrErr;
impl fmt::Display for BoardSquareFromStrErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("board position string was invalid")
    }
}
impl error::Error for BoardSquareFromStrErr {}
impl FromStr for BoardSquare {
    type Err = BoardSquareFromStrErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let &[file @ b'a'..=b'h', rank @ b'1'..=b'8'] = s.as_bytes() else {
            return Err(BoardSquareFromStrErr);
        };
        Ok(Self::from_rank_file(rank - b'1', file - b'a'))
    }
}

/// A half-move the user is attempting, as dropped on the board
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveAttempt {
    pub from: BoardSquare,
    pub to: BoardSquare,
    /// What to promote into, if the move turns out to be a promotion
    pub promotion: Option<PieceKind>,
}

/// A move as reported by a [`RuleEngine`], either from its history or from legal move enumeration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveRecord {
    /// The side that made the move
    pub color: Color,
    /// The kind of piece that moved
    pub piece: PieceKind,
    pub from: BoardSquare,
    /// Where the moving piece lands (the king's destination when castling)
    pub to: BoardSquare,
    pub captured: Option<PieceKind>,
    pub promotion: Option<PieceKind>,
    /// The move in standard algebraic notation, including any check suffix
    pub san: String,
}
impl MoveRecord {
    /// The move as origin and destination squares, with a trailing promotion letter
    ///
    /// ```
    /// # use board::*;
    /// let mv = MoveRecord {
    ///     color: Color::White,
    ///     piece: PieceKind::Pawn,
    ///     from: "e7".parse().unwrap(),
    ///     to: "e8".parse().unwrap(),
    ///     captured: None,
    ///     promotion: Some(PieceKind::Knight),
    ///     san: "e8=N".to_string(),
    /// };
    /// assert_eq!(mv.coordinate_notation(), "e7e8n");
    /// ```
    pub fn coordinate_notation(&self) -> String {
        let promotion = self
            .promotion
            .map_or_else(String::new, |kind| kind.fen_letter().to_ascii_lowercase().to_string());
        format!("{}{}{}", self.from, self.to, promotion)
    }
}

/// The capabilities a chess rule engine offers the controller
///
/// The engine exclusively owns the game state; the controller only ever changes it through
/// [`RuleEngine::make_move`], [`RuleEngine::undo`] and [`RuleEngine::load_pgn`].
pub trait RuleEngine {
    /// An error type that can be returned
    type Err: fmt::Debug + fmt::Display;

    /// The side to move
    fn turn(&self) -> Color;

    /// The piece on the given square, if any
    fn piece_at(&self, square: BoardSquare) -> Option<Piece>;

    /// All legal moves starting on the given square
    fn legal_moves_from(&self, square: BoardSquare) -> Vec<MoveRecord>;

    /// Every move made so far, oldest first
    fn history(&self) -> &[MoveRecord];

    fn is_checkmate(&self) -> bool;

    fn is_draw(&self) -> bool;

    fn is_stalemate(&self) -> bool;

    fn is_threefold_repetition(&self) -> bool;

    /// Whether no more moves should be played
    fn is_game_over(&self) -> bool {
        self.is_checkmate()
            || self.is_draw()
            || self.is_stalemate()
            || self.is_threefold_repetition()
    }

    /// Make the given move, in place
    ///
    /// Returns the record of the move if it is legal, and `None` (leaving the game untouched) if
    /// it isn't.
    fn make_move(&mut self, attempt: MoveAttempt) -> Option<MoveRecord>;

    /// Take back the last move, returning it
    fn undo(&mut self) -> Option<MoveRecord>;

    /// Convert the current position to a FEN string
    fn to_fen(&self) -> String;

    /// Replace the game with the one recorded in the given PGN
    fn load_pgn(&mut self, pgn: &str) -> Result<(), Self::Err>;

    /// Whether moving from `from` to `to` is legal for some promotion choice
    fn is_legal(&self, from: BoardSquare, to: BoardSquare) -> bool {
        self.legal_moves_from(from).iter().any(|mv| mv.to == to)
    }

    /// Whether moving from `from` to `to` would push a pawn onto the first or last rank
    fn is_promotion(&self, from: BoardSquare, to: BoardSquare) -> bool {
        self.piece_at(from)
            .is_some_and(|piece| piece.kind == PieceKind::Pawn)
            && to.is_back_rank()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use quickcheck::{quickcheck, Arbitrary, Gen};

    impl Arbitrary for BoardSquare {
        fn arbitrary(g: &mut Gen) -> Self {
            Self(u8::arbitrary(g))
        }
    }

    quickcheck! {
        fn test_board_square_str_knows_when_valid(square: BoardSquare) -> bool {
            square.is_valid() == square.to_string().parse::<BoardSquare>().is_ok()
        }

        fn test_promotion_input_never_yields_pawn_or_king(input: String) -> bool {
            PieceKind::from_promotion_input(&input).is_promotable()
        }
    }

    #[test]
    fn test_board_square_name_round_trip() {
        for square in BoardSquare::all_squares() {
            assert_eq!(square, square.to_string().parse().unwrap());
        }
    }

    #[test]
    fn test_board_square_index_round_trip() {
        for index in 0..64 {
            assert_eq!(BoardSquare::from_index(index).index(), index);
        }
    }

    #[test]
    fn test_square_shades_alternate() {
        let light = BoardSquare::all_squares().filter(|sq| sq.is_light()).count();
        assert_eq!(light, 32);
        assert!("e4".parse::<BoardSquare>().unwrap().is_light());
        assert!("d4".parse::<BoardSquare>().unwrap().is_dark());
    }

    #[test]
    fn test_promotion_input() {
        for (input, kind) in [
            ("q", PieceKind::Queen),
            ("r", PieceKind::Rook),
            ("b", PieceKind::Bishop),
            ("n", PieceKind::Knight),
            ("N", PieceKind::Knight),
            ("bishop", PieceKind::Bishop),
            ("x", PieceKind::Queen),
            ("k", PieceKind::Queen),
            ("", PieceKind::Queen),
            ("qr", PieceKind::Queen),
            ("Knight", PieceKind::Knight),
            ("pawn", PieceKind::Queen),
        ] {
            assert_eq!(PieceKind::from_promotion_input(input), kind, "input {input:?}");
        }
    }

    #[test]
    fn test_fen_letters() {
        for kind in PieceKind::KINDS {
            for color in [Color::White, Color::Black] {
                let piece = Piece { kind, color };
                assert_eq!(Piece::from_fen_letter(piece.fen_letter()), Some(piece));
            }
        }
        assert_eq!(Piece::from_fen_letter('x'), None);
    }

    #[test]
    fn test_color_parsing() {
        assert_eq!("white".parse::<Color>().unwrap(), Color::White);
        assert_eq!("Black".parse::<Color>().unwrap(), Color::Black);
        assert!("none".parse::<Color>().is_err());
    }
}
