//! A [`RuleEngine`] backed by the `shakmaty` move generator
//!
//! `shakmaty` positions carry no history, so this keeps every position reached in the game. That
//! gives exact take-backs and lets us count repetitions.

use board::{BoardSquare, Color, MoveAttempt, MoveRecord, Piece, PieceKind, RuleEngine};
use shakmaty::{
    fen::Fen, san::San, CastlingMode, Chess, EnPassantMode, File, Move, Position, Role, Square,
};

mod pgn;

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid FEN: {0}")]
    InvalidFen(String),
    #[error("could not read `{token}` as a move in algebraic notation")]
    InvalidSan { token: String },
    #[error("move `{san}` is not legal in position {fen}")]
    IllegalMove { san: String, fen: String },
    #[error("comment opened but never closed")]
    UnterminatedComment,
    #[error("variation opened but never closed")]
    UnterminatedVariation,
}

/// A game of standard chess, with its full history
#[derive(Clone, Debug)]
pub struct ShakmatyEngine {
    /// The position after the last move
    current: Chess,
    /// Every earlier position, oldest first
    previous: Vec<Chess>,
    /// The moves that led from the first position to `current`
    history: Vec<MoveRecord>,
}

impl ShakmatyEngine {
    /// A game at the standard starting position
    pub fn new() -> Self {
        Self::from_position(Chess::default())
    }

    /// A game with no history starting at the given position
    pub fn from_fen(fen: &str) -> Result<Self> {
        let position = Fen::from_ascii(fen.trim().as_bytes())
            .map_err(|e| Error::InvalidFen(e.to_string()))?
            .into_position::<Chess>(CastlingMode::Standard)
            .map_err(|e| Error::InvalidFen(e.to_string()))?;
        Ok(Self::from_position(position))
    }

    fn from_position(position: Chess) -> Self {
        Self {
            current: position,
            previous: Vec::new(),
            history: Vec::new(),
        }
    }

    /// The underlying position
    pub fn position(&self) -> &Chess {
        &self.current
    }

    /// Play a move already known to be legal in the current position
    fn push(&mut self, mv: &Move) -> Option<MoveRecord> {
        let (record, after) = describe(&self.current, mv)?;
        self.previous
            .push(core::mem::replace(&mut self.current, after));
        self.history.push(record.clone());
        Some(record)
    }

    /// Play a move given in standard algebraic notation
    pub fn make_san_move(&mut self, token: &str) -> Result<MoveRecord> {
        let san = token.parse::<San>().map_err(|_| Error::InvalidSan {
            token: token.to_string(),
        })?;
        let mv = san
            .to_move(&self.current)
            .map_err(|_| Error::IllegalMove {
                san: token.to_string(),
                fen: self.to_fen(),
            })?;
        self.push(&mv).ok_or_else(|| Error::IllegalMove {
            san: token.to_string(),
            fen: self.to_fen(),
        })
    }
}

impl Default for ShakmatyEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleEngine for ShakmatyEngine {
    type Err = Error;

    fn turn(&self) -> Color {
        color_from(self.current.turn())
    }

    fn piece_at(&self, square: BoardSquare) -> Option<Piece> {
        let piece = self.current.board().piece_at(square_to(square)?)?;
        Some(Piece {
            kind: kind_from(piece.role),
            color: color_from(piece.color),
        })
    }

    fn legal_moves_from(&self, square: BoardSquare) -> Vec<MoveRecord> {
        let Some(origin) = square_to(square) else {
            return Vec::new();
        };
        self.current
            .legal_moves()
            .iter()
            .filter(|mv| mv.from() == Some(origin))
            .filter_map(|mv| describe(&self.current, mv).map(|(record, _)| record))
            .collect()
    }

    fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    fn is_checkmate(&self) -> bool {
        self.current.is_checkmate()
    }

    /// Any draw: the fifty-move rule, insufficient material, stalemate or threefold repetition
    fn is_draw(&self) -> bool {
        self.current.halfmoves() >= 100
            || self.current.is_insufficient_material()
            || self.is_stalemate()
            || self.is_threefold_repetition()
    }

    fn is_stalemate(&self) -> bool {
        self.current.is_stalemate()
    }

    fn is_threefold_repetition(&self) -> bool {
        let key = repetition_key(&self.current);
        let repeats = self
            .previous
            .iter()
            .filter(|position| repetition_key(position) == key)
            .count();
        repeats >= 2
    }

    fn make_move(&mut self, attempt: MoveAttempt) -> Option<MoveRecord> {
        let from = square_to(attempt.from)?;
        let to = square_to(attempt.to)?;
        let promotion = role_to(attempt.promotion.unwrap_or(PieceKind::Queen));
        let mv = self.current.legal_moves().into_iter().find(|mv| {
            mv.from() == Some(from)
                && landing_square(mv) == to
                && mv.promotion().map_or(true, |role| role == promotion)
        })?;
        self.push(&mv)
    }

    fn undo(&mut self) -> Option<MoveRecord> {
        self.current = self.previous.pop()?;
        self.history.pop()
    }

    fn to_fen(&self) -> String {
        Fen::from_position(self.current.clone(), EnPassantMode::Legal).to_string()
    }

    fn load_pgn(&mut self, pgn: &str) -> Result<()> {
        let record = pgn::GameRecord::parse(pgn)?;
        let mut game = match record.fen {
            Some(fen) => Self::from_fen(&fen)?,
            None => Self::new(),
        };
        for token in &record.moves {
            game.make_san_move(token)?;
        }
        tracing::debug!(moves = game.history.len(), fen = %game.to_fen(), "loaded game record");
        *self = game;
        Ok(())
    }
}

/// Work out the record for a legal move, and the position it leads to
fn describe(position: &Chess, mv: &Move) -> Option<(MoveRecord, Chess)> {
    let from = mv.from()?;
    let mut after = position.clone();
    after.play_unchecked(mv);
    let suffix = if after.is_checkmate() {
        "#"
    } else if after.is_check() {
        "+"
    } else {
        ""
    };
    let record = MoveRecord {
        color: color_from(position.turn()),
        piece: kind_from(mv.role()),
        from: square_from(from),
        to: square_from(landing_square(mv)),
        captured: mv.capture().map(kind_from),
        promotion: mv.promotion().map(kind_from),
        san: format!("{}{suffix}", San::from_move(position, mv)),
    };
    Some((record, after))
}

/// Where the moving piece ends up
///
/// `shakmaty` encodes castling as the king capturing its own rook, but a board widget drops the
/// king two files over.
fn landing_square(mv: &Move) -> Square {
    match *mv {
        Move::Castle { king, rook } => {
            let file = if rook.file() > king.file() {
                File::G
            } else {
                File::C
            };
            Square::from_coords(file, king.rank())
        }
        _ => mv.to(),
    }
}

/// The parts of the FEN that matter for repetition: placement, side to move, castling rights and
/// a capturable en passant square
fn repetition_key(position: &Chess) -> String {
    Fen::from_position(position.clone(), EnPassantMode::Legal)
        .to_string()
        .split(' ')
        .take(4)
        .collect::<Vec<_>>()
        .join(" ")
}

fn square_to(square: BoardSquare) -> Option<Square> {
    square
        .is_valid()
        .then(|| Square::new(u32::from(square.index())))
}

fn square_from(square: Square) -> BoardSquare {
    BoardSquare::from_index(square as u8)
}

const fn color_from(color: shakmaty::Color) -> Color {
    match color {
        shakmaty::Color::White => Color::White,
        shakmaty::Color::Black => Color::Black,
    }
}

const fn kind_from(role: Role) -> PieceKind {
    match role {
        Role::Pawn => PieceKind::Pawn,
        Role::Knight => PieceKind::Knight,
        Role::Bishop => PieceKind::Bishop,
        Role::Rook => PieceKind::Rook,
        Role::Queen => PieceKind::Queen,
        Role::King => PieceKind::King,
    }
}

const fn role_to(kind: PieceKind) -> Role {
    match kind {
        PieceKind::Pawn => Role::Pawn,
        PieceKind::Knight => Role::Knight,
        PieceKind::Bishop => Role::Bishop,
        PieceKind::Rook => Role::Rook,
        PieceKind::Queen => Role::Queen,
        PieceKind::King => Role::King,
    }
}
