use crate::authority::{Authority, AuthorityError, GameId, Reply, Status};
use crate::board::BoardView;
use crate::chess::{Color, Move, ParseMoveError, Promotion, Square};
use crate::history::{pairs, MovePair};
use crate::rules::{Rules, Standard};
use derive_more::{Display, Error};
use std::collections::BTreeSet;
use tracing::{debug, error, info, instrument, warn};

/// The lifecycle stage of a [`GameSession`].
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Phase {
    /// No game has been started yet, or starting one failed.
    #[display(fmt = "waiting for a new game")]
    Uninitialized,

    /// The game is in progress and no move awaits the authority's verdict.
    #[display(fmt = "your move")]
    PlayerToMove,

    /// A move was applied locally and awaits the authority's verdict.
    #[display(fmt = "move submitted")]
    MoveSubmitted,

    /// The authority reported a terminal status.
    #[display(fmt = "game over")]
    Finished,

    /// The local position can no longer be reconciled with the authority.
    #[display(fmt = "out of sync")]
    Desynced,

    /// The session was torn down.
    #[display(fmt = "disposed")]
    Disposed,
}

/// The reason why a [`GameSession`] operation failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
pub enum SessionError {
    /// The authority failed to start a game.
    #[display(fmt = "failed to start a new game; {}", _0)]
    Creation(AuthorityError),

    /// The authority declined a move, which was taken back.
    #[display(fmt = "move `{}` was declined: {}", _0, _1)]
    Rejected(Move, String),

    /// A move could not be submitted and was taken back.
    #[display(fmt = "move `{}` could not be submitted: {}", _0, _1)]
    Transport(Move, String),

    /// A move from the authority could not be played on the local position.
    #[display(fmt = "cannot play the opponent's move `{}`; {}", token, reason)]
    Desync { token: String, reason: String },
}

impl SessionError {
    /// Whether the session can carry on after this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, SessionError::Desync { .. })
    }
}

/// The state restored when an optimistic move is taken back.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct Snapshot<P> {
    position: P,
    history_len: usize,
    last_move: Option<Move>,
}

impl<P> Snapshot<P> {
    /// Rewinds `session` to the moment this snapshot was taken.
    fn restore<R: Rules<Position = P>>(self, session: &mut GameSession<R>) {
        session.position = self.position;
        session.history.truncate(self.history_len);
        session.last_move = self.last_move;
    }
}

/// A move applied locally that must be sent to the authority.
///
/// The answer must be handed back to [`GameSession::settle`].
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Submission {
    generation: u64,
    game: GameId,
    r#move: Move,
}

impl Submission {
    /// The session generation this submission belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The game this move was played in.
    pub fn game(&self) -> &GameId {
        &self.game
    }

    /// The submitted [`Move`].
    pub fn r#move(&self) -> Move {
        self.r#move
    }

    /// The wire token of the submitted move.
    pub fn token(&self) -> String {
        self.r#move.to_string()
    }

    /// Submits the move to the authority.
    pub async fn send<A: Authority + ?Sized>(&self, authority: &A) -> Result<Reply, AuthorityError> {
        authority.submit_move(&self.game, &self.token()).await
    }
}

/// A game of chess against a remote authority.
///
/// The player's moves are applied as soon as they are made and taken back if the
/// authority doesn't confirm them. At most one move is awaiting confirmation at a time.
#[derive(Debug)]
pub struct GameSession<R: Rules = Standard> {
    rules: R,
    phase: Phase,
    generation: u64,
    game: Option<GameId>,
    color: Color,
    position: R::Position,
    history: Vec<String>,
    last_move: Option<Move>,
    status: Status,
    selected: Option<Square>,
    candidates: BTreeSet<Square>,
    error: Option<SessionError>,
    inflight: Option<(Move, Snapshot<R::Position>)>,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(Standard)
    }
}

impl<R: Rules> GameSession<R> {
    /// Constructs a session that has yet to start a game.
    pub fn new(rules: R) -> Self {
        GameSession {
            position: rules.initial(),
            rules,
            phase: Phase::Uninitialized,
            generation: 0,
            game: None,
            color: Color::White,
            history: Vec::new(),
            last_move: None,
            status: Status::in_progress(),
            selected: None,
            candidates: BTreeSet::new(),
            error: None,
            inflight: None,
        }
    }

    /// Starts a new game, optionally with the authority's opening move already played.
    ///
    /// An opening that cannot be played leaves the session [`Phase::Desynced`].
    #[instrument(level = "debug", skip(self))]
    pub fn initialize(&mut self, game: GameId, color: Color, opening: Option<&str>) {
        self.start(game, color, opening, Status::in_progress());
    }

    /// Asks the authority for a new game and starts it.
    ///
    /// On failure the session is left [`Phase::Uninitialized`] and the error is recorded.
    #[instrument(level = "debug", skip(self, authority))]
    pub async fn create<A: Authority + ?Sized>(&mut self, authority: &A, color: Color) {
        if self.phase == Phase::Disposed {
            return;
        }

        self.reset(color);

        match authority.create_game(color).await {
            Ok(reply) => {
                let opening = reply.authority_move.as_deref();
                self.start(reply.game_id.clone(), color, opening, reply.status.clone());
            }

            Err(e) => {
                warn!(error = %e, "failed to create a new game");
                self.error = Some(SessionError::Creation(e));
            }
        }
    }

    fn reset(&mut self, color: Color) {
        self.generation += 1;
        self.phase = Phase::Uninitialized;
        self.game = None;
        self.color = color;
        self.position = self.rules.initial();
        self.history.clear();
        self.last_move = None;
        self.status = Status::in_progress();
        self.error = None;
        self.inflight = None;
        self.deselect();
    }

    fn start(&mut self, game: GameId, color: Color, opening: Option<&str>, status: Status) {
        if self.phase == Phase::Disposed {
            return;
        }

        self.reset(color);
        self.game = Some(game);
        self.status = status;

        if let Some(token) = opening {
            if let Err(e) = self.play_authority_move(token) {
                return self.desync(e);
            }
        }

        self.phase = self.resting_phase();
        info!(game = %self.game.as_ref().map_or("", GameId::as_str), %color, phase = %self.phase, "new game");
    }

    /// Selects or deselects a [`Square`].
    ///
    /// Selecting one of the player's pieces replaces any previous selection and
    /// selecting it again clears it. Selecting any other square that is not a
    /// candidate destination clears the selection.
    #[instrument(level = "trace", skip(self))]
    pub fn select_square(&mut self, s: Square) {
        if !self.is_players_turn() {
            return;
        }

        match self.rules.piece_at(&self.position, s) {
            Some(p) if p.color() == self.color => {
                if self.selected == Some(s) {
                    self.deselect();
                } else {
                    self.selected = Some(s);
                    self.candidates = self.rules.candidates(&self.position, s);
                }
            }

            _ if self.selected.is_some() && !self.candidates.contains(&s) => self.deselect(),
            _ => {}
        }
    }

    /// Moves the selected piece to `whither`.
    ///
    /// Pawns reaching the last rank are promoted to a queen unless told otherwise.
    /// Returns the [`Submission`] to be sent to the authority, or `None` if the
    /// move couldn't be played.
    #[instrument(level = "debug", skip(self))]
    pub fn attempt_move(&mut self, whither: Square, promotion: Promotion) -> Option<Submission> {
        if !self.is_players_turn() {
            return None;
        }

        let whence = self.selected?;
        if !self.candidates.contains(&whither) {
            return None;
        }

        let m = self.resolve(whence, whither, promotion)?;
        self.submit(m)
    }

    /// Plays a [`Move`] directly, regardless of the selection.
    #[instrument(level = "debug", skip(self))]
    pub fn play(&mut self, m: Move) -> Option<Submission> {
        if !self.is_players_turn() {
            return None;
        }

        let m = self.resolve(m.whence(), m.whither(), m.promotion())?;
        self.submit(m)
    }

    /// Selects `s`, or moves the selected piece there if it's a candidate destination.
    pub fn click(&mut self, s: Square) -> Option<Submission> {
        if self.selected.is_some() && self.candidates.contains(&s) {
            self.attempt_move(s, Promotion::None)
        } else {
            self.select_square(s);
            None
        }
    }

    fn resolve(&self, whence: Square, whither: Square, promotion: Promotion) -> Option<Move> {
        match self.rules.piece_at(&self.position, whence) {
            Some(p) if p.color() == self.color => {}
            _ => return None,
        }

        let legal = self.rules.moves(&self.position, whence);
        let preferred = Move(whence, whither, promotion);
        let queen = Move(whence, whither, Promotion::Queen);

        if legal.contains(&preferred) {
            Some(preferred)
        } else if promotion == Promotion::None && legal.contains(&queen) {
            Some(queen)
        } else {
            None
        }
    }

    fn submit(&mut self, m: Move) -> Option<Submission> {
        let game = self.game.clone()?;

        let (next, san) = match self.rules.apply(&self.position, m) {
            Ok(r) => r,
            Err(e) => {
                debug!(error = %e);
                return None;
            }
        };

        let snapshot = Snapshot {
            position: std::mem::replace(&mut self.position, next),
            history_len: self.history.len(),
            last_move: self.last_move.replace(m),
        };

        self.history.push(san);
        self.inflight = Some((m, snapshot));
        self.error = None;
        self.deselect();
        self.phase = Phase::MoveSubmitted;

        Some(Submission {
            generation: self.generation,
            game,
            r#move: m,
        })
    }

    /// Reconciles the session with the authority's answer to a [`Submission`].
    ///
    /// Answers to submissions that are no longer awaited are ignored.
    #[instrument(level = "debug", skip(self))]
    pub fn settle(&mut self, submission: &Submission, result: Result<Reply, AuthorityError>) {
        if self.phase != Phase::MoveSubmitted || submission.generation != self.generation {
            debug!(phase = %self.phase, "ignoring stale submission");
            return;
        }

        let snapshot = match self.inflight.take() {
            Some((m, snapshot)) if m == submission.r#move => snapshot,
            inflight => {
                self.inflight = inflight;
                debug!("ignoring unknown submission");
                return;
            }
        };

        match result {
            Ok(reply) => {
                self.status = reply.status;

                if let Some(token) = reply.authority_move.as_deref() {
                    if let Err(e) = self.play_authority_move(token) {
                        return self.desync(e);
                    }
                }

                self.phase = self.resting_phase();
                info!(token = %submission.token(), status = %self.status, phase = %self.phase, "move confirmed");
            }

            Err(e) => {
                snapshot.restore(self);
                self.phase = Phase::PlayerToMove;

                warn!(token = %submission.token(), error = %e, "move taken back");

                self.error = Some(match e {
                    AuthorityError::Rejected(msg) => SessionError::Rejected(submission.r#move, msg),
                    AuthorityError::Transport(msg) => SessionError::Transport(submission.r#move, msg),
                });
            }
        }
    }

    fn play_authority_move(&mut self, token: &str) -> Result<(), SessionError> {
        let desync = |reason: String| SessionError::Desync {
            token: token.into(),
            reason,
        };

        let m: Move = token.parse().map_err(|e: ParseMoveError| desync(e.to_string()))?;
        let (next, san) = self
            .rules
            .apply(&self.position, m)
            .map_err(|e| desync(e.to_string()))?;

        self.position = next;
        self.history.push(san);
        self.last_move = Some(m);
        Ok(())
    }

    fn desync(&mut self, e: SessionError) {
        error!(error = %e, "lost synchronization with the authority");
        self.phase = Phase::Desynced;
        self.error = Some(e);
    }

    fn resting_phase(&self) -> Phase {
        if self.status.is_in_progress() {
            Phase::PlayerToMove
        } else {
            Phase::Finished
        }
    }

    fn deselect(&mut self) {
        self.selected = None;
        self.candidates.clear();
    }

    /// Tears the session down; answers arriving later are ignored.
    #[instrument(level = "debug", skip(self))]
    pub fn dispose(&mut self) {
        self.phase = Phase::Disposed;
        self.inflight = None;
        self.deselect();
    }

    /// Forgets the last recoverable error.
    pub fn clear_error(&mut self) {
        if self.error.as_ref().map_or(false, SessionError::is_recoverable) {
            self.error = None;
        }
    }

    /// The rules this session plays by.
    pub fn rules(&self) -> &R {
        &self.rules
    }

    /// The current [`Phase`].
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether a move awaits the authority's verdict.
    pub fn is_pending(&self) -> bool {
        self.phase == Phase::MoveSubmitted
    }

    /// Whether the player may select pieces and move right now.
    pub fn is_players_turn(&self) -> bool {
        self.phase == Phase::PlayerToMove && self.rules.turn(&self.position) == self.color
    }

    /// Incremented every time a new game starts.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The current game, if any.
    pub fn game(&self) -> Option<&GameId> {
        self.game.as_ref()
    }

    /// The player's side.
    pub fn color(&self) -> Color {
        self.color
    }

    /// The current position, including a move awaiting confirmation.
    pub fn position(&self) -> &R::Position {
        &self.position
    }

    /// The moves played so far in algebraic notation.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// The history grouped by move number.
    pub fn pairs(&self) -> Vec<MovePair<String>> {
        pairs(&self.history)
    }

    /// The last move played by either side.
    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    /// The status last reported by the authority.
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// The selected square, if any.
    pub fn selected(&self) -> Option<Square> {
        self.selected
    }

    /// The squares the selected piece may move to.
    pub fn candidates(&self) -> &BTreeSet<Square> {
        &self.candidates
    }

    /// The last error, if any.
    pub fn error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }

    /// The serialized current position.
    pub fn serialize(&self) -> String {
        self.rules.serialize(&self.position)
    }

    /// The board as seen from `perspective`.
    pub fn board(&self, perspective: Color) -> BoardView {
        BoardView::new(
            &self.rules,
            &self.position,
            perspective,
            self.selected,
            &self.candidates,
            self.last_move,
        )
    }
}
