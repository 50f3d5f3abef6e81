//! Reading the moves out of a game in PGN

use crate::{Error, Result};

/// The parts of a PGN game needed to replay it
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct GameRecord {
    /// The starting position, if the game didn't start from the usual one
    pub fen: Option<String>,
    /// The mainline moves, in algebraic notation with annotations stripped
    pub moves: Vec<String>,
}

impl GameRecord {
    pub fn parse(pgn: &str) -> Result<Self> {
        let mut record = Self::default();
        let mut movetext = String::new();
        for line in pgn.lines() {
            let trimmed = line.trim_start();
            if trimmed.starts_with('[') {
                if let Some(("FEN", value)) = parse_tag(trimmed) {
                    record.fen = Some(value);
                }
            } else if !trimmed.starts_with('%') {
                movetext.push_str(line);
                movetext.push('\n');
            }
        }
        record.moves = mainline_moves(&movetext)?;
        Ok(record)
    }
}

/// Split a tag pair line like `[White "alice"]` into its name and value
fn parse_tag(line: &str) -> Option<(&str, String)> {
    let inside = line.trim_end().strip_prefix('[')?.strip_suffix(']')?;
    let (key, value) = inside.split_once(char::is_whitespace)?;
    let value = value.trim().strip_prefix('"')?.strip_suffix('"')?;
    Some((key, value.replace("\\\"", "\"").replace("\\\\", "\\")))
}

/// The move tokens of the main line, skipping comments, variations, NAGs, move numbers and the
/// game result
fn mainline_moves(movetext: &str) -> Result<Vec<String>> {
    let mut moves = Vec::new();
    let mut word = String::new();
    let mut chars = movetext.chars();
    while let Some(c) = chars.next() {
        match c {
            '{' => {
                finish_word(&mut word, &mut moves);
                if !chars.by_ref().any(|c| c == '}') {
                    return Err(Error::UnterminatedComment);
                }
            }
            ';' => {
                finish_word(&mut word, &mut moves);
                // Rest of line comment
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '(' => {
                finish_word(&mut word, &mut moves);
                skip_variation(&mut chars)?;
            }
            c if c.is_whitespace() => finish_word(&mut word, &mut moves),
            c => word.push(c),
        }
    }
    finish_word(&mut word, &mut moves);
    Ok(moves)
}

/// Skip past the `)` closing a variation whose `(` was just read, including nested variations and
/// any comments inside them
fn skip_variation(chars: &mut core::str::Chars<'_>) -> Result<()> {
    let mut depth = 1usize;
    while depth > 0 {
        match chars.next() {
            Some('(') => depth += 1,
            Some(')') => depth -= 1,
            Some('{') => {
                if !chars.any(|c| c == '}') {
                    return Err(Error::UnterminatedComment);
                }
            }
            Some(_) => {}
            None => return Err(Error::UnterminatedVariation),
        }
    }
    Ok(())
}

/// Push the word, if it is a move, and reset it
fn finish_word(word: &mut String, moves: &mut Vec<String>) {
    if let Some(mv) = move_token(word) {
        moves.push(mv.to_string());
    }
    word.clear();
}

fn move_token(word: &str) -> Option<&str> {
    if word.starts_with('$') || matches!(word, "1-0" | "0-1" | "1/2-1/2" | "*") {
        return None;
    }
    // Move numbers may be glued onto the move, as in `1.e4` or `12...Nf6`
    let word = match word.rfind('.') {
        Some(dot) => &word[dot + 1..],
        None if word.bytes().all(|b| b.is_ascii_digit()) => "",
        None => word,
    };
    let word = word.trim_end_matches(['!', '?']);
    let word = match word.trim_end_matches(['+', '#']) {
        "0-0" => "O-O",
        "0-0-0" => "O-O-O",
        _ => word,
    };
    (!word.is_empty()).then_some(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags() {
        assert_eq!(
            parse_tag("[White \"alice\"]"),
            Some(("White", "alice".to_string()))
        );
        assert_eq!(
            parse_tag("[Annotator \"a \\\"quoted\\\" name\"]"),
            Some(("Annotator", "a \"quoted\" name".to_string()))
        );
        assert_eq!(parse_tag("[Broken"), None);
    }

    #[test]
    fn test_move_numbers_and_annotations() {
        let record = GameRecord::parse("1.e4 e5 2. Nf3?! 2... Nc6!! 3.Bc4 $14 1-0").unwrap();
        assert_eq!(record.moves, ["e4", "e5", "Nf3", "Nc6", "Bc4"]);
        assert_eq!(record.fen, None);
    }

    #[test]
    fn test_castling_written_with_zeroes() {
        let record = GameRecord::parse("9. 0-0 0-0-0 10.0-0+ 10...O-O").unwrap();
        assert_eq!(record.moves, ["O-O", "O-O-O", "O-O", "O-O"]);
    }

    #[test]
    fn test_comments_and_variations() {
        let record = GameRecord::parse(
            "1. d4 ; queen's pawn\nd5 (1... Nf6 {indian} (1... f5)) 2. c4 {gambit} *",
        )
        .unwrap();
        assert_eq!(record.moves, ["d4", "d5", "c4"]);
    }

    #[test]
    fn test_unterminated() {
        assert!(matches!(
            GameRecord::parse("1. e4 (1. d4"),
            Err(Error::UnterminatedVariation)
        ));
        assert!(matches!(
            GameRecord::parse("1. e4 (1. d4 {oops)"),
            Err(Error::UnterminatedComment)
        ));
    }

    #[test]
    fn test_fen_tag() {
        let record = GameRecord::parse("[FEN \"8/8/8/4k3/8/8/8/4K3 w - - 0 1\"]\n\n*").unwrap();
        assert_eq!(record.fen.as_deref(), Some("8/8/8/4k3/8/8/8/4K3 w - - 0 1"));
        assert!(record.moves.is_empty());
    }
}
