//! A board widget for a human typing in the terminal

use std::{
    collections::VecDeque,
    io::{self, BufRead, Write},
};

use board::{BoardSquare, CapturedTally, Color};
use widget::{
    BoardWidget, EventResponse, LabelSlot, Page, Placement, SquareShade, WidgetEvent,
};

const HELP: &str = "Commands: `e2e4` or `e2 e4` to move, `hover e2` to see where a piece can go, \
                    `quit` to leave";

/// A board drawn as text, driven by commands typed on the input
///
/// Moving a piece is a drag followed by a drop, so `e2e4` produces a
/// [`WidgetEvent::DragStart`], and the [`WidgetEvent::Drop`] only once the drag has been accepted.
pub struct TerminalBoard<R, W> {
    input: R,
    output: W,
    placement: Placement,
    orientation: Color,
    highlights: Vec<(BoardSquare, SquareShade)>,
    top_label: String,
    bottom_label: String,
    captured_white: CapturedTally,
    captured_black: CapturedTally,
    /// Events decided on but not handed out yet
    pending: VecDeque<WidgetEvent>,
    /// The last event handed out, awaiting a response
    last_event: Option<WidgetEvent>,
    /// The move typed in by the user, while its piece is being dragged
    drag: Option<(BoardSquare, BoardSquare)>,
    hovered: Option<BoardSquare>,
    /// Whether something changed since the board was last drawn
    dirty: bool,
}

impl TerminalBoard<io::StdinLock<'static>, io::Stdout> {
    /// A board reading commands from stdin and drawing to stdout
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalBoard<R, W> {
    /// Create an empty board, white at the bottom
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            placement: Placement::EMPTY,
            orientation: Color::White,
            highlights: Vec::new(),
            top_label: String::new(),
            bottom_label: String::new(),
            captured_white: CapturedTally::default(),
            captured_black: CapturedTally::default(),
            pending: VecDeque::new(),
            last_event: None,
            drag: None,
            hovered: None,
            dirty: true,
        }
    }

    /// Take back the output, for looking at what was drawn
    pub fn into_output(self) -> W {
        self.output
    }

    /// The squares currently highlighted
    pub fn highlights(&self) -> &[(BoardSquare, SquareShade)] {
        &self.highlights
    }

    /// Draw the board, labels and capture counts
    pub fn render(&mut self) {
        let _ = self.write_board();
        self.dirty = false;
    }

    fn write_board(&mut self) -> io::Result<()> {
        let (ranks, files): (Vec<u8>, Vec<u8>) = match self.orientation {
            Color::White => ((0..8).rev().collect(), (0..8).collect()),
            Color::Black => ((0..8).collect(), (0..8).rev().collect()),
        };
        writeln!(self.output)?;
        writeln!(self.output, "    {}", self.top_label)?;
        for &rank in &ranks {
            write!(self.output, " {} ", rank + 1)?;
            for &file in &files {
                let square = BoardSquare::from_rank_file(rank, file);
                let letter = match self.placement.get(square) {
                    Some(piece) => piece.fen_letter(),
                    None if square.is_dark() => ':',
                    None => '.',
                };
                let shade = self
                    .highlights
                    .iter()
                    .find(|(highlighted, _)| *highlighted == square)
                    .map(|(_, shade)| *shade);
                match shade {
                    Some(SquareShade::Light) => write!(self.output, "({letter})")?,
                    Some(SquareShade::Dark) => write!(self.output, "[{letter}]")?,
                    None => write!(self.output, " {letter} ")?,
                }
            }
            writeln!(self.output)?;
        }
        write!(self.output, "   ")?;
        for &file in &files {
            write!(self.output, " {} ", (b'a' + file) as char)?;
        }
        writeln!(self.output)?;
        writeln!(self.output, "    {}", self.bottom_label)?;
        writeln!(self.output, "    white lost: {}", self.captured_white)?;
        writeln!(self.output, "    black lost: {}", self.captured_black)?;
        self.output.flush()
    }

    fn read_line(&mut self) -> Option<String> {
        let mut buffer = String::new();
        match self.input.read_line(&mut buffer) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(buffer.trim().to_string()),
        }
    }

    fn say(&mut self, message: &str) {
        let _ = writeln!(self.output, "{message}");
    }

    /// Read commands until one of them produces events, queueing those events
    ///
    /// Returns `false` if the user is done.
    fn read_command(&mut self) -> bool {
        loop {
            if self.dirty {
                self.render();
            }
            print_prompt(&mut self.output, "> ");
            let Some(line) = self.read_line() else {
                return false;
            };
            if let Some(square) = self.hovered.take() {
                self.pending
                    .push_back(WidgetEvent::MouseoutSquare { square });
            }
            match parse_command(&line) {
                Some(Command::Quit) => return false,
                Some(Command::Hover(square)) => {
                    self.hovered = Some(square);
                    self.pending
                        .push_back(WidgetEvent::MouseoverSquare { square });
                }
                Some(Command::Move(from, to)) => match self.placement.get(from) {
                    Some(piece) => {
                        self.drag = Some((from, to));
                        self.pending.push_back(WidgetEvent::DragStart {
                            square: from,
                            piece,
                        });
                    }
                    None => self.say(&format!("There is no piece on {from}.")),
                },
                None if line.is_empty() => {}
                None => self.say(HELP),
            }
            if !self.pending.is_empty() {
                return true;
            }
        }
    }
}

fn print_prompt(output: &mut impl Write, prompt: &str) {
    let _ = write!(output, "{prompt}");
    let _ = output.flush();
}

/// What the user can type
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Move(BoardSquare, BoardSquare),
    Hover(BoardSquare),
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim().to_ascii_lowercase();
    match line.split_whitespace().collect::<Vec<_>>()[..] {
        ["quit"] | ["exit"] => Some(Command::Quit),
        ["hover", square] => square.parse().ok().map(Command::Hover),
        [from, to] => Some(Command::Move(from.parse().ok()?, to.parse().ok()?)),
        [word] => {
            let word = word.replace('-', "");
            let (from, to) = (word.get(..2)?, word.get(2..)?);
            Some(Command::Move(from.parse().ok()?, to.parse().ok()?))
        }
        _ => None,
    }
}

impl<R: BufRead, W: Write> BoardWidget for TerminalBoard<R, W> {
    fn set_position(&mut self, fen: &str, _animate: bool) {
        match Placement::from_fen(fen) {
            Ok(placement) => {
                self.placement = placement;
                self.dirty = true;
            }
            Err(e) => self.say(&format!("Unable to show position `{fen}`: {e}")),
        }
    }

    fn position(&self) -> String {
        self.placement.to_fen_field()
    }

    fn orientation(&self) -> Color {
        self.orientation
    }

    fn set_orientation(&mut self, bottom: Color) {
        self.orientation = bottom;
        self.dirty = true;
    }

    fn highlight_square(&mut self, square: BoardSquare, shade: SquareShade) {
        self.highlights.retain(|(highlighted, _)| *highlighted != square);
        self.highlights.push((square, shade));
        self.dirty = true;
    }

    fn clear_highlights(&mut self) {
        if !self.highlights.is_empty() {
            self.highlights.clear();
            self.dirty = true;
        }
    }

    fn next_event(&mut self) -> Option<WidgetEvent> {
        if self.pending.is_empty() && !self.read_command() {
            return None;
        }
        self.last_event = self.pending.pop_front();
        self.last_event
    }

    fn respond(&mut self, response: EventResponse) {
        match (self.last_event.take(), response) {
            (Some(WidgetEvent::DragStart { .. }), EventResponse::Continue) => {
                if let Some((from, to)) = self.drag.take() {
                    self.pending.push_back(WidgetEvent::Drop { from, to });
                }
            }
            (Some(WidgetEvent::DragStart { .. }), _) => {
                self.drag = None;
                self.say("You can't move that piece right now.");
            }
            (Some(WidgetEvent::Drop { .. }), EventResponse::Snapback) => {
                self.say("That move isn't legal.");
            }
            (Some(WidgetEvent::Drop { .. }), _) => {
                self.pending.push_back(WidgetEvent::SnapEnd);
            }
            _ => {}
        }
    }
}

impl<R: BufRead, W: Write> Page for TerminalBoard<R, W> {
    fn alert(&mut self, message: &str) {
        self.say(&format!("! {message}"));
    }

    fn prompt_promotion(&mut self) -> String {
        print_prompt(
            &mut self.output,
            "Enter piece you want to promote to: ((q)ueen, (r)ook, (b)ishop, k(n)ight): ",
        );
        self.read_line().unwrap_or_default()
    }

    fn set_player_label(&mut self, slot: LabelSlot, name: &str) {
        match slot {
            LabelSlot::Top => self.top_label = name.to_string(),
            LabelSlot::Bottom => self.bottom_label = name.to_string(),
        }
        self.dirty = true;
    }

    fn show_captured(&mut self, color: Color, tally: &CapturedTally) {
        match color {
            Color::White => self.captured_white = *tally,
            Color::Black => self.captured_black = *tally,
        }
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use board::{Piece, PieceKind};

    const INITIAL_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn sq(name: &str) -> BoardSquare {
        name.parse().unwrap()
    }

    fn board(input: &str) -> TerminalBoard<&[u8], Vec<u8>> {
        let mut board = TerminalBoard::new(input.as_bytes(), Vec::new());
        board.set_position(INITIAL_FEN, false);
        board
    }

    fn output(board: TerminalBoard<&[u8], Vec<u8>>) -> String {
        String::from_utf8(board.into_output()).unwrap()
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(
            parse_command("e2e4"),
            Some(Command::Move(sq("e2"), sq("e4")))
        );
        assert_eq!(
            parse_command(" E2 e4 "),
            Some(Command::Move(sq("e2"), sq("e4")))
        );
        assert_eq!(
            parse_command("g1-f3"),
            Some(Command::Move(sq("g1"), sq("f3")))
        );
        assert_eq!(parse_command("hover d7"), Some(Command::Hover(sq("d7"))));
        assert_eq!(parse_command("quit"), Some(Command::Quit));
        assert_eq!(parse_command("e2e9"), None);
        assert_eq!(parse_command("hover"), None);
        assert_eq!(parse_command("e2"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn test_accepted_drag_and_drop() {
        let mut board = board("e2e4\n");
        assert_eq!(
            board.next_event(),
            Some(WidgetEvent::DragStart {
                square: sq("e2"),
                piece: Piece {
                    kind: PieceKind::Pawn,
                    color: Color::White
                },
            })
        );
        board.respond(EventResponse::Continue);
        assert_eq!(
            board.next_event(),
            Some(WidgetEvent::Drop {
                from: sq("e2"),
                to: sq("e4")
            })
        );
        board.respond(EventResponse::Continue);
        assert_eq!(board.next_event(), Some(WidgetEvent::SnapEnd));
        board.respond(EventResponse::Continue);
        assert_eq!(board.next_event(), None);
    }

    #[test]
    fn test_cancelled_drag_has_no_drop() {
        let mut board = board("e7e5\n");
        assert!(matches!(
            board.next_event(),
            Some(WidgetEvent::DragStart { .. })
        ));
        board.respond(EventResponse::CancelDrag);
        assert_eq!(board.next_event(), None);
        assert!(output(board).contains("You can't move that piece right now."));
    }

    #[test]
    fn test_snapback_has_no_snap_end() {
        let mut board = board("e2e5\n");
        board.next_event();
        board.respond(EventResponse::Continue);
        assert!(matches!(board.next_event(), Some(WidgetEvent::Drop { .. })));
        board.respond(EventResponse::Snapback);
        assert_eq!(board.next_event(), None);
        assert!(output(board).contains("That move isn't legal."));
    }

    #[test]
    fn test_hover_then_leave() {
        let mut board = board("hover g1\ng1f3\n");
        assert_eq!(
            board.next_event(),
            Some(WidgetEvent::MouseoverSquare { square: sq("g1") })
        );
        board.respond(EventResponse::Continue);
        assert_eq!(
            board.next_event(),
            Some(WidgetEvent::MouseoutSquare { square: sq("g1") })
        );
        board.respond(EventResponse::Continue);
        assert!(matches!(
            board.next_event(),
            Some(WidgetEvent::DragStart { .. })
        ));
    }

    #[test]
    fn test_empty_square_and_nonsense_are_skipped() {
        let mut board = board("e4e5\nwhat\n\nquit\n");
        assert_eq!(board.next_event(), None);
        let output = output(board);
        assert!(output.contains("There is no piece on e4."));
        assert!(output.contains(HELP));
    }

    #[test]
    fn test_promotion_prompt() {
        let mut board = board("n\n");
        assert_eq!(board.prompt_promotion(), "n");
        assert_eq!(board.prompt_promotion(), "");
    }

    #[test]
    fn test_render_follows_orientation() {
        let mut board = board("");
        board.set_player_label(LabelSlot::Top, "alice");
        board.set_player_label(LabelSlot::Bottom, "bob");
        board.set_orientation(Color::Black);
        board.highlight_square(sq("e2"), SquareShade::Light);
        board.highlight_square(sq("e3"), SquareShade::Dark);
        board.render();
        let output = output(board);
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines[1], "    alice");
        assert!(lines[2].starts_with(" 1 "), "{output}");
        assert!(lines[3].contains("(P)"), "{output}");
        assert!(lines[4].contains("[:]"), "{output}");
        assert_eq!(lines[10], "    h  g  f  e  d  c  b  a ");
        assert_eq!(lines[11], "    bob");
    }

    #[test]
    fn test_position_and_highlights() {
        let mut board = board("");
        assert_eq!(
            board.position(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"
        );
        board.highlight_square(sq("e2"), SquareShade::Light);
        board.highlight_square(sq("e2"), SquareShade::Dark);
        assert_eq!(board.highlights(), &[(sq("e2"), SquareShade::Dark)]);
        board.clear_highlights();
        assert!(board.highlights().is_empty());
        board.set_position("garbage", true);
        assert_eq!(
            board.position(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"
        );
    }
}
