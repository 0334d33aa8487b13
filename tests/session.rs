use async_trait::async_trait;
use lib::authority::{Authority, AuthorityError, GameId, Reply};
use lib::board::Highlight;
use lib::chess::{Color, Promotion, Square};
use lib::session::{GameSession, Phase, SessionError};
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::runtime::{self, Runtime};

/// An authority that answers from a script and records what it was asked.
#[derive(Default)]
struct Script {
    replies: Mutex<VecDeque<Result<Reply, AuthorityError>>>,
    received: Mutex<Vec<String>>,
}

impl Script {
    fn new<I: IntoIterator<Item = Result<Reply, AuthorityError>>>(replies: I) -> Self {
        Script {
            replies: Mutex::new(replies.into_iter().collect()),
            received: Mutex::default(),
        }
    }

    fn next(&self) -> Result<Reply, AuthorityError> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AuthorityError::Transport("script exhausted".into())))
    }

    fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl Authority for Script {
    async fn create_game(&self, color: Color) -> Result<Reply, AuthorityError> {
        self.received.lock().unwrap().push(format!("new {color}"));
        self.next()
    }

    async fn submit_move(&self, game: &GameId, token: &str) -> Result<Reply, AuthorityError> {
        self.received.lock().unwrap().push(format!("{game} {token}"));
        self.next()
    }
}

fn ok(authority_move: Option<&str>, status: &str) -> Result<Reply, AuthorityError> {
    Ok(Reply {
        game_id: "game-1".into(),
        authority_move: authority_move.map(String::from),
        status: status.into(),
    })
}

fn sq(s: &str) -> Square {
    s.parse().unwrap()
}

fn rt() -> Runtime {
    runtime::Builder::new_current_thread().build().unwrap()
}

#[test]
fn playing_a_short_game_as_white() {
    let rt = rt();
    let authority = Script::new([
        ok(None, "in_progress"),
        ok(Some("e7e5"), "in_progress"),
        ok(Some("b8c6"), "in_progress"),
    ]);

    let mut session = GameSession::default();
    rt.block_on(session.create(&authority, Color::White));
    assert_eq!(session.phase(), Phase::PlayerToMove);

    for (whence, whither) in [("e2", "e4"), ("g1", "f3")] {
        assert_eq!(session.click(sq(whence)), None);
        let submission = session.click(sq(whither)).unwrap();
        let result = rt.block_on(submission.send(&authority));
        session.settle(&submission, result);
    }

    assert_eq!(session.history(), ["e4", "e5", "Nf3", "Nc6"]);
    assert_eq!(session.phase(), Phase::PlayerToMove);
    assert_eq!(
        authority.received(),
        ["new white", "game-1 e2e4", "game-1 g1f3"]
    );

    let pairs = session.pairs();
    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[1].number, 2);
    assert_eq!(pairs[1].white, "Nf3");
    assert_eq!(pairs[1].black.as_deref(), Some("Nc6"));
}

#[test]
fn playing_as_black_starts_after_the_opening_reply() {
    let rt = rt();
    let authority = Script::new([ok(Some("e2e4"), "in_progress")]);

    let mut session = GameSession::default();
    rt.block_on(session.create(&authority, Color::Black));

    assert_eq!(session.phase(), Phase::PlayerToMove);
    assert_eq!(session.color(), Color::Black);
    assert_eq!(session.history(), ["e4"]);

    let board = session.board(Color::Black);
    assert_eq!(board.cells()[0].square, sq("h1"));
    assert!(board.cell(sq("e4")).highlight.contains(Highlight::LAST_MOVE));
    assert!(board.cell(sq("e2")).highlight.contains(Highlight::LAST_MOVE));
}

#[test]
fn a_rejected_move_is_taken_back_and_the_game_goes_on() {
    let rt = rt();
    let authority = Script::new([
        ok(None, "in_progress"),
        Err(AuthorityError::Rejected("Illegal move".into())),
        ok(Some("d7d5"), "in_progress"),
    ]);

    let mut session = GameSession::default();
    rt.block_on(session.create(&authority, Color::White));
    let initial = session.serialize();

    session.select_square(sq("e2"));
    let submission = session.attempt_move(sq("e4"), Promotion::None).unwrap();
    assert!(session.is_pending());

    let result = rt.block_on(submission.send(&authority));
    session.settle(&submission, result);

    assert_eq!(session.phase(), Phase::PlayerToMove);
    assert_eq!(session.serialize(), initial);
    assert!(session.history().is_empty());
    assert!(matches!(session.error(), Some(SessionError::Rejected(_, msg)) if msg == "Illegal move"));

    session.select_square(sq("d2"));
    let submission = session.attempt_move(sq("d4"), Promotion::None).unwrap();
    let result = rt.block_on(submission.send(&authority));
    session.settle(&submission, result);

    assert_eq!(session.history(), ["d4", "d5"]);
    assert_eq!(session.error(), None);
}

#[test]
fn an_unreachable_authority_leaves_the_session_uninitialized() {
    let rt = rt();
    let authority = Script::new([
        Err(AuthorityError::Transport("connection refused".into())),
        ok(None, "in_progress"),
    ]);

    let mut session = GameSession::default();
    rt.block_on(session.create(&authority, Color::White));
    assert_eq!(session.phase(), Phase::Uninitialized);
    assert!(matches!(session.error(), Some(SessionError::Creation(_))));

    rt.block_on(session.create(&authority, Color::White));
    assert_eq!(session.phase(), Phase::PlayerToMove);
    assert_eq!(session.error(), None);
}

#[test]
fn a_reply_arriving_after_a_new_game_is_ignored() {
    let rt = rt();
    let authority = Script::new([
        ok(None, "in_progress"),
        ok(None, "in_progress"),
        ok(Some("e7e5"), "in_progress"),
    ]);

    let mut session = GameSession::default();
    rt.block_on(session.create(&authority, Color::White));
    let submission = session.play("e2e4".parse().unwrap()).unwrap();

    rt.block_on(session.create(&authority, Color::White));
    let result = rt.block_on(submission.send(&authority));
    session.settle(&submission, result);

    assert_eq!(session.phase(), Phase::PlayerToMove);
    assert!(session.history().is_empty());
}

#[test]
fn checkmate_finishes_the_game() {
    let rt = rt();
    let authority = Script::new([
        ok(None, "in_progress"),
        ok(Some("e7e5"), "in_progress"),
        ok(Some("b8c6"), "in_progress"),
        ok(Some("g8f6"), "in_progress"),
        ok(None, "checkmate"),
    ]);

    let mut session = GameSession::default();
    rt.block_on(session.create(&authority, Color::White));

    for token in ["e2e4", "f1c4", "d1h5", "h5f7"] {
        let submission = session.play(token.parse().unwrap()).unwrap();
        let result = rt.block_on(submission.send(&authority));
        session.settle(&submission, result);
    }

    assert_eq!(session.phase(), Phase::Finished);
    assert_eq!(session.status().as_str(), "checkmate");
    assert_eq!(session.history().last().map(String::as_str), Some("Qxf7#"));
    assert_eq!(session.play("a2a3".parse().unwrap()), None);
}
