//! Game sessions: own the board and players, enforce turn order and keep an
//! undoable move history.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::engine::models::{Event, GameResult, PlayerId, Seat};
use crate::engine::plugin::TurnBasedGame;
use crate::error::GameError;

use super::board::Board;
use super::factory::SessionFactory;
use super::pieces::SpeciesTable;
use super::rules::{CompositeRule, Rule, RuleContext};
use super::types::{Occupant, Piece, Player, Position};

/// Events kept for `take_events`. Older ones are dropped first.
pub const MAX_PENDING_EVENTS: usize = 1024;

/// A captured piece together with its index in the owner's piece list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapturedPiece {
    pub piece: Piece,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Move {
    pub from: Position,
    pub to: Position,
    pub piece: Occupant,
    pub captured: Option<CapturedPiece>,
}

impl Move {
    pub fn new(from: Position, to: Position, piece: Occupant) -> Self {
        Self {
            from,
            to,
            piece,
            captured: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "entry", rename_all = "snake_case")]
pub enum HistoryEntry {
    Move(Move),
    Pass { seat: Seat },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WinReason {
    DenReached,
    NoPiecesLeft,
}

impl WinReason {
    pub fn as_str(self) -> &'static str {
        match self {
            WinReason::DenReached => "den_reached",
            WinReason::NoPiecesLeft => "no_pieces_left",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GameStatus {
    InProgress,
    GameOver { winner: Seat, reason: WinReason },
}

/// Result of a move request. A rejection is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveOutcome {
    pub accepted: bool,
    pub captured: Option<Piece>,
    pub game_over: bool,
    pub winner: Option<PlayerId>,
    /// Name of the rule that refused the move.
    pub rejection: Option<String>,
    pub events: Vec<Event>,
}

impl MoveOutcome {
    fn rejected(reason: &str) -> Self {
        Self {
            accepted: false,
            captured: None,
            game_over: false,
            winner: None,
            rejection: Some(reason.to_string()),
            events: vec![],
        }
    }
}

/// Comparable view of everything a move can change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub board: Board,
    pub players: Vec<Player>,
    pub current_seat: Seat,
    pub status: GameStatus,
}

pub struct GameSession {
    game_id: String,
    board: Board,
    players: Vec<Player>,
    species: SpeciesTable,
    rules: CompositeRule,
    current: Seat,
    history: Vec<HistoryEntry>,
    status: GameStatus,
    events: Vec<Event>,
}

impl GameSession {
    /// Build a session from a factory. Any setup failure is fatal.
    pub fn new(factory: &dyn SessionFactory) -> Result<Self, GameError> {
        let species = factory.create_species()?;
        let mut board = factory.create_board()?;
        let mut players = factory.create_players()?;
        if players.is_empty() {
            return Err(GameError::config("a session needs at least one player"));
        }
        for (i, p) in players.iter().enumerate() {
            if p.seat_index != i {
                return Err(GameError::config(format!(
                    "player {} has seat {} but is listed at position {}",
                    p.player_id, p.seat_index, i
                )));
            }
        }
        factory.populate(&mut board, &mut players, &species)?;
        let rules = factory.create_rule_engine();

        info!(
            game_id = factory.game_id(),
            players = players.len(),
            pieces = players.iter().map(|p| p.pieces.len()).sum::<usize>(),
            "session created"
        );

        let events = vec![Event::new(
            "game_started",
            None,
            serde_json::json!({
                "players": players.iter().map(|p| &p.player_id).collect::<Vec<_>>(),
                "width": board.width(),
                "height": board.height(),
            }),
        )];

        Ok(Self {
            game_id: factory.game_id().to_string(),
            board,
            players,
            species,
            rules,
            current: 0,
            history: Vec::new(),
            status: GameStatus::InProgress,
            events,
        })
    }

    /// Replace this session with a fresh one from `factory`.
    pub fn reset(&mut self, factory: &dyn SessionFactory) -> Result<(), GameError> {
        *self = GameSession::new(factory)?;
        Ok(())
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, seat: Seat) -> Option<&Player> {
        self.players.get(seat)
    }

    pub fn current_seat(&self) -> Seat {
        self.current
    }

    pub fn current_player(&self) -> &PlayerId {
        &self.players[self.current].player_id
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        matches!(self.status, GameStatus::GameOver { .. })
    }

    pub fn winner(&self) -> Option<&PlayerId> {
        match self.status {
            GameStatus::GameOver { winner, .. } => self.players.get(winner).map(|p| &p.player_id),
            GameStatus::InProgress => None,
        }
    }

    /// Engine-neutral summary once the game has ended.
    pub fn result(&self) -> Option<GameResult> {
        match self.status {
            GameStatus::GameOver { winner, reason } => Some(GameResult {
                winners: vec![self.players[winner].player_id.clone()],
                reason: reason.as_str().to_string(),
                details: [("moves".to_string(), serde_json::json!(self.history.len()))]
                    .into_iter()
                    .collect(),
            }),
            GameStatus::InProgress => None,
        }
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn piece_at(&self, pos: Position) -> Result<Option<&Piece>, GameError> {
        Ok(self
            .board
            .occupant(pos)?
            .and_then(|occ| self.players.get(occ.owner)?.piece(occ.piece)))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            board: self.board.clone(),
            players: self.players.clone(),
            current_seat: self.current,
            status: self.status,
        }
    }

    /// Drain the events emitted since the last call. At most
    /// [`MAX_PENDING_EVENTS`] are held; callers that never drain only lose
    /// the oldest.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    fn record_events(&mut self, events: impl IntoIterator<Item = Event>) {
        self.events.extend(events);
        if self.events.len() > MAX_PENDING_EVENTS {
            let excess = self.events.len() - MAX_PENDING_EVENTS;
            self.events.drain(..excess);
        }
    }

    fn rule_context(&self) -> RuleContext<'_> {
        RuleContext {
            board: &self.board,
            species: &self.species,
            to_move: self.current,
        }
    }

    /// Validate and, if legal, execute the move of the piece on `from`.
    pub fn request_move(&mut self, from: Position, to: Position) -> Result<MoveOutcome, GameError> {
        if self.is_over() {
            debug!(%from, %to, "move rejected: game is over");
            return Ok(MoveOutcome::rejected("game_over"));
        }

        let mover = self.board.occupant(from)?.ok_or(GameError::NoPiece(from))?;
        let mv = Move::new(from, to, mover);

        if let Some(rule) = self.rules.explain(&mv, &self.rule_context()) {
            debug!(%from, %to, species = %mover.species, seat = mover.owner, rule, "move rejected");
            return Ok(MoveOutcome::rejected(rule));
        }

        self.execute(mv)
    }

    fn execute(&mut self, mut mv: Move) -> Result<MoveOutcome, GameError> {
        let seat = mv.piece.owner;
        let target = self.board.occupant(mv.to)?;

        // Check both pieces exist before touching any state.
        if self.players.get(seat).and_then(|p| p.piece(mv.piece.piece)).is_none() {
            return Err(GameError::NoPiece(mv.from));
        }
        if let Some(t) = target {
            if self.players.get(t.owner).and_then(|p| p.piece(t.piece)).is_none() {
                return Err(GameError::NoPiece(mv.to));
            }
        }

        let mut events = Vec::new();
        let mover_id = self.players[seat].player_id.clone();

        if let Some(t) = target {
            self.board.remove_occupant(mv.to)?;
            if let Some((index, piece)) = self.players[t.owner].remove_piece(t.piece) {
                events.push(Event::new(
                    "piece_captured",
                    Some(mover_id.clone()),
                    serde_json::json!({
                        "species": piece.species,
                        "owner": self.players[t.owner].player_id,
                        "at": mv.to,
                    }),
                ));
                mv.captured = Some(CapturedPiece { piece, index });
            }
        }

        if let Some(piece) = self.players[seat].piece_mut(mv.piece.piece) {
            self.board.place_piece(piece, mv.to)?;
        }

        events.push(Event::new(
            "move_made",
            Some(mover_id.clone()),
            serde_json::json!({
                "species": mv.piece.species,
                "from": mv.from,
                "to": mv.to,
            }),
        ));

        let captured = mv.captured.as_ref().map(|c| c.piece.clone());
        let to = mv.to;
        self.history.push(HistoryEntry::Move(mv));
        self.advance_turn();

        debug!(%to, seat, captured = captured.is_some(), "move accepted");

        if let Some(reason) = self.win_reason(seat, to, captured.is_some())? {
            self.status = GameStatus::GameOver { winner: seat, reason };
            info!(winner = %mover_id, reason = reason.as_str(), moves = self.history.len(), "game over");
            events.push(Event::new(
                "game_over",
                Some(mover_id.clone()),
                serde_json::json!({ "reason": reason.as_str() }),
            ));
        }

        self.record_events(events.iter().cloned());

        Ok(MoveOutcome {
            accepted: true,
            captured,
            game_over: self.is_over(),
            winner: self.winner().cloned(),
            rejection: None,
            events,
        })
    }

    fn win_reason(&self, seat: Seat, to: Position, captured: bool) -> Result<Option<WinReason>, GameError> {
        if self.board.terrain(to)?.den_owner().is_some_and(|owner| owner != seat) {
            return Ok(Some(WinReason::DenReached));
        }
        if captured
            && self
                .players
                .iter()
                .filter(|p| p.seat_index != seat)
                .all(|p| !p.has_pieces())
        {
            return Ok(Some(WinReason::NoPiecesLeft));
        }
        Ok(None)
    }

    fn advance_turn(&mut self) {
        self.current = (self.current + 1) % self.players.len();
    }

    fn retreat_turn(&mut self) {
        let n = self.players.len();
        self.current = (self.current + n - 1) % n;
    }

    /// Hand the turn to the next seat without moving. Ignored once the game
    /// is over.
    pub fn pass_turn(&mut self) {
        if self.is_over() {
            return;
        }
        let seat = self.current;
        self.history.push(HistoryEntry::Pass { seat });
        self.advance_turn();
        let event = Event::new("turn_passed", Some(self.players[seat].player_id.clone()), serde_json::json!({}));
        self.record_events([event]);
    }

    /// Revert the latest history entry. Returns `false` when there is nothing
    /// to undo.
    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.history.pop() else {
            return false;
        };

        if let HistoryEntry::Move(mv) = &entry {
            if let Err(e) = self.revert(mv) {
                warn!(error = %e, "failed to revert move");
                self.history.push(entry);
                return false;
            }
        }

        self.retreat_turn();
        self.status = GameStatus::InProgress;
        let event = Event::new(
            "move_undone",
            Some(self.players[self.current].player_id.clone()),
            serde_json::json!({ "history_len": self.history.len() }),
        );
        self.record_events([event]);
        true
    }

    fn revert(&mut self, mv: &Move) -> Result<(), GameError> {
        let seat = mv.piece.owner;
        let piece = self
            .players
            .get_mut(seat)
            .and_then(|p| p.piece_mut(mv.piece.piece))
            .ok_or(GameError::NoPiece(mv.to))?;
        self.board.place_piece(piece, mv.from)?;

        if let Some(captured) = &mv.captured {
            let mut piece = captured.piece.clone();
            self.board.place_piece(&mut piece, mv.to)?;
            let owner = piece.owner;
            self.players
                .get_mut(owner)
                .ok_or_else(|| GameError::config(format!("no player at seat {owner}")))?
                .restore_piece(captured.index, piece);
        }
        Ok(())
    }

    /// Orthogonal single steps the rule engine accepts for `seat`'s pieces.
    /// Leaps are not listed.
    pub fn legal_moves(&self, seat: Seat) -> Vec<Move> {
        let Some(player) = self.players.get(seat) else {
            return vec![];
        };
        let ctx = self.rule_context();
        let mut moves = Vec::new();
        for piece in &player.pieces {
            let Some(from) = piece.position else {
                continue;
            };
            for to in self.board.orthogonal_neighbors(from) {
                let mv = Move::new(from, to, piece.occupant());
                if self.rules.validate(&mv, &ctx) {
                    moves.push(mv);
                }
            }
        }
        moves
    }
}

impl TurnBasedGame for GameSession {
    type Move = Move;
    type Snapshot = SessionSnapshot;

    fn game_id(&self) -> &str {
        &self.game_id
    }

    fn num_players(&self) -> usize {
        self.players.len()
    }

    fn current_seat(&self) -> Seat {
        self.current
    }

    fn player_id(&self, seat: Seat) -> Option<&PlayerId> {
        self.players.get(seat).map(|p| &p.player_id)
    }

    fn legal_moves(&self) -> Vec<Move> {
        GameSession::legal_moves(self, self.current)
    }

    fn play(&mut self, mv: &Move) -> Result<bool, GameError> {
        Ok(self.request_move(mv.from, mv.to)?.accepted)
    }

    fn pass(&mut self) {
        self.pass_turn();
    }

    fn undo(&mut self) -> bool {
        GameSession::undo(self)
    }

    fn is_over(&self) -> bool {
        GameSession::is_over(self)
    }

    fn winner(&self) -> Option<Seat> {
        match self.status {
            GameStatus::GameOver { winner, .. } => Some(winner),
            GameStatus::InProgress => None,
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        GameSession::snapshot(self)
    }

    fn material(&self) -> usize {
        self.players.iter().map(|p| p.pieces.len()).sum()
    }
}
