//! The pieces on the board, as a widget sees them

use core::{fmt, str::FromStr};
use std::error;

use board::{BoardSquare, Piece};

/// Which piece stands on each square, without any of the game state around it
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Placement([Option<Piece>; 64]);

impl Placement {
    /// A board with no pieces on it
    pub const EMPTY: Self = Self([None; 64]);

    /// Read the placement out of a FEN (or just its first field)
    pub fn from_fen(fen: &str) -> Result<Self, PlacementError> {
        let mut placement = Self::EMPTY;
        let pieces = fen.split(' ').next().unwrap_or_default();
        let ranks = pieces.split('/').collect::<Vec<_>>();
        if ranks.len() != 8 {
            return Err(PlacementError);
        }
        for (rank_idx, rank) in ranks.into_iter().enumerate() {
            let rank_idx = 7 - rank_idx as u8;
            let mut file = 0u8;
            for c in rank.chars() {
                if let Some(value) = c.to_digit(10) {
                    file = file.saturating_add(value as u8);
                    continue;
                }
                let piece = Piece::from_fen_letter(c).ok_or(PlacementError)?;
                if file >= 8 {
                    return Err(PlacementError);
                }
                placement.0[BoardSquare::from_rank_file(rank_idx, file).index() as usize] =
                    Some(piece);
                file += 1;
            }
            if file != 8 {
                return Err(PlacementError);
            }
        }
        Ok(placement)
    }

    /// The piece on the given square, if any
    pub fn get(&self, square: BoardSquare) -> Option<Piece> {
        if square.is_valid() {
            self.0[square.index() as usize]
        } else {
            None
        }
    }

    /// Write the placement as the first field of a FEN
    pub fn to_fen_field(&self) -> String {
        (0..8u8)
            .rev()
            .map(|rank| {
                let mut row = String::with_capacity(8);
                let mut empty = 0;
                for file in 0..8 {
                    match self.get(BoardSquare::from_rank_file(rank, file)) {
                        Some(piece) => {
                            if empty > 0 {
                                row.push_str(&empty.to_string());
                                empty = 0;
                            }
                            row.push(piece.fen_letter());
                        }
                        None => empty += 1,
                    }
                }
                if empty > 0 {
                    row.push_str(&empty.to_string());
                }
                row
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Placement").field(&self.to_fen_field()).finish()
    }
}

impl FromStr for Placement {
    type Err = PlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

#[derive(Debug)]
pub struct PlacementError;
impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("piece placement in FEN was invalid")
    }
}
impl error::Error for PlacementError {}

#[cfg(test)]
mod tests {
    use super::*;

    use board::{Color, PieceKind};

    const INITIAL_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_opening_placement() {
        let placement = Placement::from_fen(INITIAL_FEN).unwrap();
        assert_eq!(
            placement.get("e1".parse().unwrap()),
            Some(Piece {
                kind: PieceKind::King,
                color: Color::White
            })
        );
        assert_eq!(
            placement.get("d8".parse().unwrap()),
            Some(Piece {
                kind: PieceKind::Queen,
                color: Color::Black
            })
        );
        assert_eq!(placement.get("e4".parse().unwrap()), None);
        assert_eq!(
            placement.to_fen_field(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"
        );
    }

    #[test]
    fn test_round_trip() {
        for field in [
            "r3k2r/8/8/8/8/8/8/R4RK1",
            "8/4P3/8/8/8/k7/8/K7",
            "rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNB1KBNR",
        ] {
            assert_eq!(field.parse::<Placement>().unwrap().to_fen_field(), field);
        }
    }

    #[test]
    fn test_invalid_placements() {
        assert!(Placement::from_fen("").is_err());
        assert!(Placement::from_fen("8/8/8").is_err());
        assert!(Placement::from_fen("9/8/8/8/8/8/8/8").is_err());
        assert!(Placement::from_fen("7/8/8/8/8/8/8/8").is_err());
        assert!(Placement::from_fen("x7/8/8/8/8/8/8/8").is_err());
        assert!(Placement::from_fen("ppppppppp/8/8/8/8/8/8/8").is_err());
    }
}
