//! Applies the user's moves locally and keeps them in step with the server

use std::{
    sync::{mpsc, Arc},
    thread,
};

use board::{
    BoardSquare, CapturedTally, Color, GameEnd, MoveAttempt, MoveRecord, Piece, PieceKind,
    RuleEngine,
};
use remote::{CommitOutcome, MoveEncoding, MoveRequest, MoveServer};
use widget::{BoardWidget, EventResponse, LabelSlot, Page, SquareShade, WidgetEvent};

use crate::{config::GameConfig, Error, Result};

/// Shown when the server refuses a move, or can't be reached
const REJECTED_MESSAGE: &str = "Unable to perform move.";

/// What a worker thread reports back once the server has answered
struct CommitReport {
    ticket: u64,
    result: remote::Result<CommitOutcome>,
}

/// The move the server hasn't answered for yet
struct PendingCommit {
    ticket: u64,
    record: MoveRecord,
}

/// Drives one game: turns the widget's events into moves on the engine, and the engine's moves
/// into requests to the server
///
/// Moves are applied to the engine as soon as they are dropped, and only then submitted. If the
/// server refuses one (or can't be reached), the move is undone and the board redrawn. Only one
/// submission is outstanding at a time; the user can't pick up a piece until it is settled.
pub struct MoveCommitController<E, U, S> {
    config: GameConfig,
    engine: E,
    ui: U,
    server: Arc<S>,
    sender: mpsc::Sender<CommitReport>,
    receiver: mpsc::Receiver<CommitReport>,
    in_flight: Option<PendingCommit>,
    next_ticket: u64,
}

impl<E, U, S> MoveCommitController<E, U, S>
where
    E: RuleEngine,
    U: BoardWidget + Page,
    S: MoveServer + Send + Sync + 'static,
{
    /// Load the game so far into `engine` and show it on `ui`
    pub fn new(config: GameConfig, mut engine: E, ui: U, server: S) -> Result<Self> {
        if let Some(record) = &config.prior_record {
            engine
                .load_pgn(record)
                .map_err(|e| Error::LoadRecord(e.to_string()))?;
            tracing::debug!(moves = engine.history().len(), "loaded prior record");
        }
        let (sender, receiver) = mpsc::channel();
        let mut controller = Self {
            config,
            engine,
            ui,
            server: Arc::new(server),
            sender,
            receiver,
            in_flight: None,
            next_ticket: 0,
        };
        let fen = controller.engine.to_fen();
        controller.ui.set_position(&fen, false);
        controller.refresh_captured();

        controller
            .ui
            .set_orientation(controller.config.user_color.unwrap_or(Color::White));
        let bottom = controller.ui.orientation();
        let top_name = controller.config.name_of(bottom.other()).to_string();
        let bottom_name = controller.config.name_of(bottom).to_string();
        controller.ui.set_player_label(LabelSlot::Top, &top_name);
        controller.ui.set_player_label(LabelSlot::Bottom, &bottom_name);
        tracing::info!(
            game = %controller.config.game_id,
            user = ?controller.config.user_color,
            turn = %controller.engine.turn(),
            "game ready"
        );
        Ok(controller)
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut U {
        &mut self.ui
    }

    /// Whether a move is waiting on the server's answer
    pub fn is_commit_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether the side to move is the user's
    fn is_users_turn(&self) -> bool {
        self.config.user_color == Some(self.engine.turn())
    }

    /// Route an event from the widget to its handler
    pub fn dispatch(&mut self, event: WidgetEvent) -> EventResponse {
        match event {
            WidgetEvent::DragStart { square, piece } => self.on_drag_start(square, piece),
            WidgetEvent::Drop { from, to } => self.on_drop(from, to),
            WidgetEvent::MouseoverSquare { square } => {
                self.on_mouseover_square(square);
                EventResponse::Continue
            }
            WidgetEvent::MouseoutSquare { square } => {
                self.on_mouseout_square(square);
                EventResponse::Continue
            }
            WidgetEvent::SnapEnd => {
                self.on_snap_end();
                EventResponse::Continue
            }
        }
    }

    /// Play events from the widget until it runs out of them
    ///
    /// Each submission is settled before the next event is read, so the board the user sees
    /// always reflects what the server has agreed to.
    pub fn run(&mut self) {
        loop {
            self.await_commit();
            let Some(event) = self.ui.next_event() else {
                break;
            };
            tracing::trace!(?event, "widget event");
            let response = self.dispatch(event);
            self.ui.respond(response);
        }
        self.await_commit();
    }

    /// Decide whether the user may pick up `piece` from `square`
    pub fn on_drag_start(&mut self, square: BoardSquare, piece: Piece) -> EventResponse {
        if self.in_flight.is_some() {
            tracing::debug!(%square, "drag refused, a move is still being submitted");
            return EventResponse::CancelDrag;
        }
        if self.engine.is_game_over() {
            tracing::debug!(%square, "drag refused, the game is over");
            return EventResponse::CancelDrag;
        }
        if piece.color != self.engine.turn() || !self.is_users_turn() {
            tracing::debug!(%square, %piece.color, "drag refused");
            return EventResponse::CancelDrag;
        }
        EventResponse::Continue
    }

    /// Try the dropped move on the engine, and submit it if the engine accepts it
    ///
    /// A drop while an earlier move is still being submitted is refused, so the server's answer
    /// always applies to the last move played.
    pub fn on_drop(&mut self, from: BoardSquare, to: BoardSquare) -> EventResponse {
        self.ui.clear_highlights();
        if self.in_flight.is_some() {
            tracing::debug!(%from, %to, "drop refused, a move is still being submitted");
            return EventResponse::Snapback;
        }

        let promotion = if self.engine.is_legal(from, to) && self.engine.is_promotion(from, to) {
            let answer = self.ui.prompt_promotion();
            Some(PieceKind::from_promotion_input(&answer))
        } else {
            None
        };
        let attempt = MoveAttempt {
            from,
            to,
            promotion,
        };
        let Some(record) = self.engine.make_move(attempt) else {
            tracing::debug!(%from, %to, "illegal drop");
            return EventResponse::Snapback;
        };
        tracing::info!(san = %record.san, color = %record.color, "move applied");

        let fen = self.engine.to_fen();
        self.ui.set_position(&fen, true);
        self.refresh_captured();
        self.submit(record);

        if let Some(end) = GameEnd::detect(&self.engine) {
            tracing::info!(%end, "game over");
            self.ui.alert(end.message());
        }
        EventResponse::Continue
    }

    /// Highlight where the piece on `square` can go, if the user could move it
    pub fn on_mouseover_square(&mut self, square: BoardSquare) {
        if !self.is_users_turn() {
            return;
        }
        let moves = self.engine.legal_moves_from(square);
        if moves.is_empty() {
            return;
        }
        self.highlight(square);
        for mv in &moves {
            self.highlight(mv.to);
        }
    }

    pub fn on_mouseout_square(&mut self, _square: BoardSquare) {
        self.ui.clear_highlights();
    }

    /// Redraw the position once the drop animation finishes
    ///
    /// Castling, en passant and promotion all change squares other than the one dropped on.
    pub fn on_snap_end(&mut self) {
        let fen = self.engine.to_fen();
        self.ui.set_position(&fen, true);
    }

    /// Apply the server's answer if it has arrived, without waiting for it
    ///
    /// Returns how the settled move went, if one was settled.
    pub fn poll_commits(&mut self) -> Option<CommitOutcome> {
        match self.receiver.try_recv() {
            Ok(report) => self.settle(report),
            Err(_) => None,
        }
    }

    /// Wait for the server's answer to the outstanding move, if there is one, and apply it
    pub fn await_commit(&mut self) -> Option<CommitOutcome> {
        while self.in_flight.is_some() {
            // The controller holds a sender itself, so this only fails if that has gone away.
            let Ok(report) = self.receiver.recv() else {
                break;
            };
            if let Some(outcome) = self.settle(report) {
                return Some(outcome);
            }
        }
        None
    }

    fn highlight(&mut self, square: BoardSquare) {
        let shade = SquareShade::for_square(self.ui.is_dark_square(square));
        self.ui.highlight_square(square, shade);
    }

    fn refresh_captured(&mut self) {
        for color in [Color::White, Color::Black] {
            let tally = CapturedTally::of(color, self.engine.history());
            self.ui.show_captured(color, &tally);
        }
    }

    fn encode(&self, record: &MoveRecord) -> String {
        match self.config.encoding {
            MoveEncoding::San => record.san.clone(),
            MoveEncoding::Coordinate => record.coordinate_notation(),
        }
    }

    /// Send the move to the server from a worker thread
    fn submit(&mut self, record: MoveRecord) {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        let request = MoveRequest {
            game_id: self.config.game_id.clone(),
            mv: self.encode(&record),
        };
        tracing::debug!(ticket, mv = %request.mv, "submitting move");
        self.in_flight = Some(PendingCommit { ticket, record });

        let server = Arc::clone(&self.server);
        let sender = self.sender.clone();
        let spawned = thread::Builder::new()
            .name("move-commit".to_string())
            .spawn(move || {
                let result = server.submit_move(&request);
                let _ = sender.send(CommitReport { ticket, result });
            });
        if let Err(e) = spawned {
            self.settle(CommitReport {
                ticket,
                result: Err(e.into()),
            });
        }
    }

    /// Apply a report from the server, taking the move back if it wasn't recorded
    fn settle(&mut self, report: CommitReport) -> Option<CommitOutcome> {
        let pending = match self.in_flight.take() {
            Some(pending) if pending.ticket == report.ticket => pending,
            other => {
                tracing::debug!(ticket = report.ticket, "ignoring stale commit report");
                self.in_flight = other;
                return None;
            }
        };
        let outcome = match report.result {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, san = %pending.record.san, "could not submit move");
                CommitOutcome::Rejected
            }
        };
        match outcome {
            CommitOutcome::Accepted => {
                tracing::info!(san = %pending.record.san, "server recorded move");
            }
            CommitOutcome::Rejected => {
                tracing::info!(san = %pending.record.san, "server refused move, taking it back");
                self.ui.alert(REJECTED_MESSAGE);
                self.engine.undo();
                let fen = self.engine.to_fen();
                self.ui.set_position(&fen, true);
                self.refresh_captured();
            }
        }
        Some(outcome)
    }
}
