//! Live game session.
//!
//! Drives one game against the arena server: obtain a position, run the
//! strategy through the invoker, validate, submit, checkpoint, repeat. The
//! loop owns the session state exclusively and writes the checkpoint only
//! after a turn fully resolves, so resume never observes a half-finished
//! turn.
//!
//! State machine:
//!
//! ```text
//! Connecting -> Authenticated -> AwaitingTurn -> Invoking -> Submitting
//!                                     ^                          |
//!                                     └──────────────────────────┘
//!                                     |
//!                               Terminated / Suspended
//! ```
//!
//! `Suspended` is realized by the persisted checkpoint: a process stop
//! retains the last checkpoint, and a restart with the continue directive
//! resumes into `AwaitingTurn` with the stored identity instead of
//! re-queueing.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::game::position::PositionSnapshot;
use crate::game::strategy::Strategy;
use crate::harness::invoker::{invoke, StrategyOutcome};
use crate::network::checkpoint::{CheckpointError, GameIdentity, SessionCheckpoint};
use crate::network::protocol::{ClientMessage, GameResult, ServerMessage};

/// Transport-level failures. Retried with backoff by the session loop.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// WebSocket error.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Connection closed by the server.
    #[error("connection closed by server")]
    Closed,

    /// The server answered with something the protocol does not allow here.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The server explicitly rejected the request.
    #[error("server rejected request: {0}")]
    Rejected(String),
}

/// Session-level failures. These terminate the game with an error result.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The server rejected our identity during matchmaking or resume.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// A transport operation kept failing after bounded retries.
    #[error("transport failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Attempts made, including the first.
        attempts: u32,
        /// Last error observed.
        source: TransportError,
    },

    /// Checkpoint persistence failed.
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    /// The server delivered a playable position with no legal moves.
    #[error("server delivered a position with no legal moves")]
    EmptyPosition,
}

/// Result of matchmaking: who we are, plus any server-imposed budget.
#[derive(Debug, Clone)]
pub struct MatchJoin {
    /// Identity for the new game.
    pub identity: GameIdentity,
    /// Per-move budget the server enforces, if any.
    pub server_search_time: Option<Duration>,
}

/// One turn as seen by the session loop.
#[derive(Debug, Clone)]
pub enum Turn {
    /// It is our move.
    Position(PositionSnapshot),
    /// The game has ended.
    Finished(GameResult),
}

/// Blocking request/response access to the arena server.
///
/// The session loop is generic over this trait so its turn handling,
/// fallback, retry, and checkpoint behavior can be exercised without a
/// network.
pub trait ArenaTransport {
    /// Join matchmaking and wait for a game.
    fn join_queue(&mut self) -> impl std::future::Future<Output = Result<MatchJoin, TransportError>> + Send;

    /// Wait until it is our move or the game is over.
    fn await_turn(
        &mut self,
        identity: &GameIdentity,
    ) -> impl std::future::Future<Output = Result<Turn, TransportError>> + Send;

    /// Submit the chosen move and wait for acknowledgment.
    fn submit_move(
        &mut self,
        identity: &GameIdentity,
        mv: &str,
    ) -> impl std::future::Future<Output = Result<(), TransportError>> + Send;
}

// =============================================================================
// WEBSOCKET TRANSPORT
// =============================================================================

/// [`ArenaTransport`] over tokio-tungstenite.
pub struct WsTransport {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    /// Delay between board polls while waiting for the opponent.
    poll_interval: Duration,
}

impl WsTransport {
    /// Connect to the arena server, e.g. `ws://localhost:9002/ws`.
    pub async fn connect(url: &str) -> Result<Self, TransportError> {
        let (ws, _) = connect_async(url).await?;
        info!(url, "connected to arena server");
        Ok(Self {
            ws,
            poll_interval: Duration::from_millis(500),
        })
    }

    async fn send(&mut self, msg: &ClientMessage) -> Result<(), TransportError> {
        let text = msg
            .to_json()
            .map_err(|e| TransportError::Protocol(format!("failed to serialize request: {e}")))?;
        self.ws.send(Message::Text(text)).await?;
        Ok(())
    }

    /// Read the next parseable server message, skipping pings and pushes the
    /// protocol does not model.
    async fn recv(&mut self) -> Result<ServerMessage, TransportError> {
        loop {
            match self.ws.next().await {
                Some(Ok(Message::Text(text))) => match ServerMessage::from_json(&text) {
                    Ok(msg) => return Ok(msg),
                    Err(e) => {
                        debug!(%e, "skipping unrecognized server message");
                    }
                },
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
                Some(Ok(Message::Close(_))) | None => return Err(TransportError::Closed),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
            }
        }
    }
}

impl ArenaTransport for WsTransport {
    async fn join_queue(&mut self) -> Result<MatchJoin, TransportError> {
        self.send(&ClientMessage::JoinQueue).await?;
        info!("joined matchmaking queue, waiting for opponent");

        loop {
            match self.recv().await? {
                ServerMessage::MatchFound {
                    game_id,
                    player_id,
                    auth_token,
                    assigned_color,
                    server_search_time,
                } => {
                    info!(game_id, player_id, color = %assigned_color, "match found");
                    return Ok(MatchJoin {
                        identity: GameIdentity {
                            game_id,
                            player_id,
                            color: assigned_color,
                            auth_token,
                        },
                        server_search_time: server_search_time.map(Duration::from_secs_f64),
                    });
                }
                ServerMessage::QueueTimeout => {
                    info!("queue timed out, re-queueing");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    self.send(&ClientMessage::JoinQueue).await?;
                }
                ServerMessage::Error { message } => return Err(TransportError::Rejected(message)),
                other => debug!(?other, "ignoring message while in queue"),
            }
        }
    }

    async fn await_turn(&mut self, identity: &GameIdentity) -> Result<Turn, TransportError> {
        loop {
            self.send(&ClientMessage::GetBoard {
                game_id: identity.game_id.clone(),
                player_id: identity.player_id.clone(),
                auth_token: identity.auth_token.clone(),
            })
            .await?;

            match self.recv().await? {
                ServerMessage::BoardState {
                    fen,
                    legal_moves,
                    current_turn,
                    game_over,
                    winner,
                } => {
                    if game_over {
                        return Ok(Turn::Finished(result_for(identity, winner)));
                    }
                    if current_turn == identity.color && !legal_moves.is_empty() {
                        return Ok(Turn::Position(PositionSnapshot::new(
                            fen,
                            legal_moves,
                            identity.color,
                        )));
                    }
                    // Opponent to move; poll again shortly.
                    tokio::time::sleep(self.poll_interval).await;
                }
                ServerMessage::GameOver { winner, reason } => {
                    if let Some(reason) = reason {
                        info!(reason, "game over");
                    }
                    return Ok(Turn::Finished(result_for(identity, winner)));
                }
                ServerMessage::Error { message } => return Err(TransportError::Rejected(message)),
                other => debug!(?other, "ignoring message while awaiting turn"),
            }
        }
    }

    async fn submit_move(
        &mut self,
        identity: &GameIdentity,
        mv: &str,
    ) -> Result<(), TransportError> {
        self.send(&ClientMessage::MakeMove {
            game_id: identity.game_id.clone(),
            player_id: identity.player_id.clone(),
            auth_token: identity.auth_token.clone(),
            mv: mv.to_string(),
        })
        .await?;

        loop {
            match self.recv().await? {
                ServerMessage::MoveAck => return Ok(()),
                ServerMessage::Error { message } => return Err(TransportError::Rejected(message)),
                other => debug!(?other, "ignoring message while awaiting ack"),
            }
        }
    }
}

/// Map a winner color to a result from our perspective.
fn result_for(identity: &GameIdentity, winner: Option<crate::game::position::PlayerColor>) -> GameResult {
    match winner {
        Some(color) if color == identity.color => GameResult::Win,
        Some(_) => GameResult::Loss,
        None => GameResult::Draw,
    }
}

// =============================================================================
// SESSION LOOP
// =============================================================================

/// Session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Per-move wall-clock budget.
    pub search_time: Duration,
    /// Transport attempts per operation, including the first.
    pub max_retries: u32,
    /// Base backoff between attempts; doubles each retry.
    pub retry_backoff: Duration,
    /// Where the checkpoint lives.
    pub checkpoint_path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            search_time: Duration::from_secs_f64(crate::DEFAULT_SEARCH_TIME),
            max_retries: 3,
            retry_backoff: Duration::from_millis(500),
            checkpoint_path: PathBuf::from(".arena_session.json"),
        }
    }
}

/// Per-game diagnostics accumulated by the loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Turns we completed.
    pub turns: u32,
    /// Turns resolved with a fallback because the strategy faulted.
    pub faults: u32,
    /// Turns resolved with a fallback because the strategy timed out.
    pub timeouts: u32,
}

/// Drives one game over an [`ArenaTransport`].
pub struct ArenaSession<T: ArenaTransport> {
    transport: T,
    strategy: Arc<dyn Strategy>,
    config: SessionConfig,
    stats: SessionStats,
}

impl<T: ArenaTransport> ArenaSession<T> {
    /// Create a session over a connected transport.
    pub fn new(transport: T, strategy: Arc<dyn Strategy>, config: SessionConfig) -> Self {
        Self {
            transport,
            strategy,
            config,
            stats: SessionStats::default(),
        }
    }

    /// Diagnostics for the game so far.
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Queue for a new game and play it to completion.
    pub async fn run_new_game(&mut self) -> Result<GameResult, SessionError> {
        let join = self.join_with_retry().await?;

        // The effective budget is the stricter of ours and the server's.
        if let Some(server_time) = join.server_search_time {
            if server_time < self.config.search_time {
                warn!(
                    client_s = self.config.search_time.as_secs_f64(),
                    server_s = server_time.as_secs_f64(),
                    "server enforces a shorter search time, clamping"
                );
                self.config.search_time = server_time;
            }
        }

        let checkpoint = SessionCheckpoint::new(join.identity);
        checkpoint.save(&self.config.checkpoint_path)?;
        self.game_loop(checkpoint).await
    }

    /// Resume a suspended game from its checkpoint.
    pub async fn resume(&mut self) -> Result<GameResult, SessionError> {
        let checkpoint = SessionCheckpoint::load(&self.config.checkpoint_path)?;
        info!(
            game_id = checkpoint.identity.game_id,
            turn = checkpoint.turn_index,
            "resuming game from checkpoint"
        );
        self.game_loop(checkpoint).await
    }

    /// AwaitingTurn -> Invoking -> Submitting, until Terminated.
    async fn game_loop(
        &mut self,
        mut checkpoint: SessionCheckpoint,
    ) -> Result<GameResult, SessionError> {
        let identity = checkpoint.identity.clone();

        loop {
            let turn = self.await_turn_with_retry(&identity).await?;

            let snapshot = match turn {
                Turn::Finished(result) => {
                    info!(?result, stats = ?self.stats, "game terminated");
                    SessionCheckpoint::clear(&self.config.checkpoint_path);
                    return Ok(result);
                }
                Turn::Position(snapshot) => snapshot,
            };

            if snapshot.legal_moves.is_empty() {
                return Err(SessionError::EmptyPosition);
            }

            let invocation = invoke(
                self.strategy.clone(),
                &snapshot,
                self.config.search_time,
            )
            .await;

            // A bad turn never stalls the game: fall back to the first legal
            // move and keep playing.
            let mv = match invocation.outcome {
                StrategyOutcome::Move(mv) => mv,
                StrategyOutcome::Fault(reason) => {
                    self.stats.faults += 1;
                    let fallback = snapshot.first_legal().unwrap_or_default().to_string();
                    warn!(%reason, fallback, "strategy faulted, playing fallback");
                    fallback
                }
                StrategyOutcome::TimedOut { elapsed } => {
                    self.stats.timeouts += 1;
                    let fallback = snapshot.first_legal().unwrap_or_default().to_string();
                    warn!(
                        elapsed_ms = elapsed.as_millis() as u64,
                        fallback, "strategy timed out, playing fallback"
                    );
                    fallback
                }
            };

            info!(
                turn = checkpoint.turn_index + 1,
                mv,
                elapsed_ms = invocation.elapsed.as_millis() as u64,
                "submitting move"
            );
            self.submit_with_retry(&identity, &mv).await?;

            self.stats.turns += 1;
            checkpoint.record_turn(mv);
            checkpoint.save(&self.config.checkpoint_path)?;
        }
    }

    async fn join_with_retry(&mut self) -> Result<MatchJoin, SessionError> {
        let mut backoff = self.config.retry_backoff;
        let mut last_err = None;

        for attempt in 1..=self.config.max_retries {
            match self.transport.join_queue().await {
                Ok(join) => return Ok(join),
                Err(TransportError::Rejected(message)) => {
                    // Identity rejection is not transient.
                    return Err(SessionError::AuthFailed(message));
                }
                Err(e) => {
                    warn!(attempt, %e, "matchmaking attempt failed");
                    last_err = Some(e);
                    if attempt < self.config.max_retries {
                        tokio::time::sleep(backoff).await;
                        backoff *= 2;
                    }
                }
            }
        }

        Err(SessionError::RetriesExhausted {
            attempts: self.config.max_retries,
            source: last_err.unwrap_or(TransportError::Closed),
        })
    }

    async fn await_turn_with_retry(
        &mut self,
        identity: &GameIdentity,
    ) -> Result<Turn, SessionError> {
        let mut backoff = self.config.retry_backoff;
        let mut last_err = None;

        for attempt in 1..=self.config.max_retries {
            match self.transport.await_turn(identity).await {
                Ok(turn) => return Ok(turn),
                Err(e) => {
                    warn!(attempt, %e, "board request failed");
                    last_err = Some(e);
                    if attempt < self.config.max_retries {
                        tokio::time::sleep(backoff).await;
                        backoff *= 2;
                    }
                }
            }
        }

        Err(SessionError::RetriesExhausted {
            attempts: self.config.max_retries,
            source: last_err.unwrap_or(TransportError::Closed),
        })
    }

    async fn submit_with_retry(
        &mut self,
        identity: &GameIdentity,
        mv: &str,
    ) -> Result<(), SessionError> {
        let mut backoff = self.config.retry_backoff;
        let mut last_err = None;

        for attempt in 1..=self.config.max_retries {
            match self.transport.submit_move(identity, mv).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!(attempt, %e, "move submission failed");
                    last_err = Some(e);
                    if attempt < self.config.max_retries {
                        tokio::time::sleep(backoff).await;
                        backoff *= 2;
                    }
                }
            }
        }

        Err(SessionError::RetriesExhausted {
            attempts: self.config.max_retries,
            source: last_err.unwrap_or(TransportError::Closed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::position::PlayerColor;
    use crate::game::strategy::FirstMoveStrategy;
    use std::collections::VecDeque;

    /// Scripted transport: hands out a fixed sequence of turns and records
    /// every submitted move.
    struct MockTransport {
        join: Option<MatchJoin>,
        join_calls: u32,
        turns: VecDeque<Result<Turn, TransportError>>,
        submitted: Vec<String>,
        fail_submissions: u32,
    }

    impl MockTransport {
        fn new(turns: Vec<Result<Turn, TransportError>>) -> Self {
            Self {
                join: Some(MatchJoin {
                    identity: identity(),
                    server_search_time: None,
                }),
                join_calls: 0,
                turns: turns.into(),
                submitted: Vec::new(),
                fail_submissions: 0,
            }
        }
    }

    impl ArenaTransport for MockTransport {
        async fn join_queue(&mut self) -> Result<MatchJoin, TransportError> {
            self.join_calls += 1;
            self.join.take().ok_or(TransportError::Closed)
        }

        async fn await_turn(&mut self, _: &GameIdentity) -> Result<Turn, TransportError> {
            self.turns.pop_front().unwrap_or(Err(TransportError::Closed))
        }

        async fn submit_move(&mut self, _: &GameIdentity, mv: &str) -> Result<(), TransportError> {
            if self.fail_submissions > 0 {
                self.fail_submissions -= 1;
                return Err(TransportError::Closed);
            }
            self.submitted.push(mv.to_string());
            Ok(())
        }
    }

    fn identity() -> GameIdentity {
        GameIdentity {
            game_id: "g1".into(),
            player_id: "p1".into(),
            color: PlayerColor::White,
            auth_token: "tok".into(),
        }
    }

    fn position(moves: &[&str]) -> Turn {
        Turn::Position(PositionSnapshot::new(
            "some-fen",
            moves.iter().map(|m| m.to_string()).collect(),
            PlayerColor::White,
        ))
    }

    fn config(name: &str) -> SessionConfig {
        SessionConfig {
            search_time: Duration::from_secs(5),
            max_retries: 3,
            retry_backoff: Duration::from_millis(1),
            checkpoint_path: std::env::temp_dir()
                .join(format!("chess-arena-session-{}-{name}.json", std::process::id())),
        }
    }

    struct FnStrategy(fn(&PositionSnapshot) -> anyhow::Result<String>);

    impl Strategy for FnStrategy {
        fn name(&self) -> &'static str {
            "test-fn"
        }

        fn choose_move(&self, snapshot: &PositionSnapshot) -> anyhow::Result<String> {
            (self.0)(snapshot)
        }
    }

    #[tokio::test]
    async fn test_plays_game_to_completion() {
        let transport = MockTransport::new(vec![
            Ok(position(&["e4", "d4"])),
            Ok(position(&["Nf3", "c4"])),
            Ok(Turn::Finished(GameResult::Win)),
        ]);
        let cfg = config("completion");
        let path = cfg.checkpoint_path.clone();
        let mut session = ArenaSession::new(transport, Arc::new(FirstMoveStrategy), cfg);

        let result = session.run_new_game().await.unwrap();

        assert_eq!(result, GameResult::Win);
        assert_eq!(session.transport.submitted, vec!["e4", "Nf3"]);
        assert_eq!(session.stats().turns, 2);
        assert_eq!(session.stats().faults, 0);
        // Checkpoint cleared on terminal result.
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_fault_plays_fallback_and_continues() {
        let transport = MockTransport::new(vec![
            Ok(position(&["e4", "d4"])),
            Ok(Turn::Finished(GameResult::Loss)),
        ]);
        let cfg = config("fault");
        let mut session = ArenaSession::new(
            transport,
            Arc::new(FnStrategy(|_| Ok("not-a-move".into()))),
            cfg,
        );

        let result = session.run_new_game().await.unwrap();

        // Illegal choice resolved with the first legal move, game went on.
        assert_eq!(result, GameResult::Loss);
        assert_eq!(session.transport.submitted, vec!["e4"]);
        assert_eq!(session.stats().faults, 1);
    }

    #[tokio::test]
    async fn test_timeout_plays_fallback() {
        let transport = MockTransport::new(vec![
            Ok(position(&["d4", "e4"])),
            Ok(Turn::Finished(GameResult::Draw)),
        ]);
        let mut cfg = config("timeout");
        cfg.search_time = Duration::from_millis(50);
        let mut session = ArenaSession::new(
            transport,
            Arc::new(FnStrategy(|s| {
                std::thread::sleep(Duration::from_millis(300));
                Ok(s.legal_moves[1].clone())
            })),
            cfg,
        );

        let result = session.run_new_game().await.unwrap();

        assert_eq!(result, GameResult::Draw);
        assert_eq!(session.transport.submitted, vec!["d4"]);
        assert_eq!(session.stats().timeouts, 1);
    }

    #[tokio::test]
    async fn test_transient_transport_errors_are_retried() {
        let transport = MockTransport::new(vec![
            Err(TransportError::Closed),
            Ok(position(&["e4"])),
            Ok(Turn::Finished(GameResult::Win)),
        ]);
        let cfg = config("retry");
        let mut session = ArenaSession::new(transport, Arc::new(FirstMoveStrategy), cfg);

        let result = session.run_new_game().await.unwrap();
        assert_eq!(result, GameResult::Win);
        assert_eq!(session.transport.submitted, vec!["e4"]);
    }

    #[tokio::test]
    async fn test_retry_exhaustion_is_fatal() {
        let transport = MockTransport::new(vec![
            Err(TransportError::Closed),
            Err(TransportError::Closed),
            Err(TransportError::Closed),
        ]);
        let cfg = config("exhausted");
        let path = cfg.checkpoint_path.clone();
        let mut session = ArenaSession::new(transport, Arc::new(FirstMoveStrategy), cfg);

        let err = session.run_new_game().await.unwrap_err();
        match err {
            SessionError::RetriesExhausted { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("expected retries exhausted, got {other:?}"),
        }
        // Checkpoint survives a failed session for later resume.
        assert!(path.exists());
        SessionCheckpoint::clear(&path);
    }

    #[tokio::test]
    async fn test_exhaustion_returns_without_a_final_backoff() {
        let transport = MockTransport::new(vec![
            Err(TransportError::Closed),
            Err(TransportError::Closed),
            Err(TransportError::Closed),
        ]);
        let mut cfg = config("no-final-backoff");
        cfg.retry_backoff = Duration::from_millis(100);
        let path = cfg.checkpoint_path.clone();
        let mut session = ArenaSession::new(transport, Arc::new(FirstMoveStrategy), cfg);

        let started = std::time::Instant::now();
        let err = session.run_new_game().await.unwrap_err();
        let waited = started.elapsed();

        assert!(matches!(err, SessionError::RetriesExhausted { .. }));
        // Backoff runs between attempts only: 100ms + 200ms. A sleep after
        // the third failure would push this past 700ms.
        assert!(waited >= Duration::from_millis(300), "backoff skipped: {waited:?}");
        assert!(waited < Duration::from_millis(600), "slept after final attempt: {waited:?}");
        SessionCheckpoint::clear(&path);
    }

    #[tokio::test]
    async fn test_server_search_time_clamps_budget() {
        let mut transport = MockTransport::new(vec![Ok(Turn::Finished(GameResult::Draw))]);
        transport.join.as_mut().unwrap().server_search_time = Some(Duration::from_secs(2));

        let mut cfg = config("clamp");
        cfg.search_time = Duration::from_secs(30);
        let mut session = ArenaSession::new(transport, Arc::new(FirstMoveStrategy), cfg);

        session.run_new_game().await.unwrap();
        assert_eq!(session.config.search_time, Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_resume_skips_matchmaking() {
        let cfg = config("resume");

        // A previous session left a checkpoint behind.
        let mut checkpoint = SessionCheckpoint::new(identity());
        checkpoint.record_turn("e4".into());
        checkpoint.record_turn("Nf3".into());
        checkpoint.save(&cfg.checkpoint_path).unwrap();

        let transport = MockTransport::new(vec![
            Ok(position(&["Bc4", "d3"])),
            Ok(Turn::Finished(GameResult::Win)),
        ]);
        let path = cfg.checkpoint_path.clone();
        let mut session = ArenaSession::new(transport, Arc::new(FirstMoveStrategy), cfg);

        let result = session.resume().await.unwrap();

        assert_eq!(result, GameResult::Win);
        // Only the new turn was played and submitted; no re-authentication.
        assert_eq!(session.transport.join_calls, 0);
        assert_eq!(session.transport.submitted, vec!["Bc4"]);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_resume_without_checkpoint_fails() {
        let transport = MockTransport::new(vec![]);
        let cfg = config("no-checkpoint");
        let mut session = ArenaSession::new(transport, Arc::new(FirstMoveStrategy), cfg);

        let err = session.resume().await.unwrap_err();
        assert!(matches!(err, SessionError::Checkpoint(_)));
    }

    #[tokio::test]
    async fn test_auth_rejection_is_fatal() {
        let mut transport = MockTransport::new(vec![]);
        transport.join = None;
        let cfg = config("auth");
        let mut session = ArenaSession::new(transport, Arc::new(FirstMoveStrategy), cfg);

        // join_queue returns Closed here, which exhausts retries; a Rejected
        // error short-circuits instead.
        struct RejectingTransport;
        impl ArenaTransport for RejectingTransport {
            async fn join_queue(&mut self) -> Result<MatchJoin, TransportError> {
                Err(TransportError::Rejected("bad token".into()))
            }
            async fn await_turn(&mut self, _: &GameIdentity) -> Result<Turn, TransportError> {
                unreachable!()
            }
            async fn submit_move(&mut self, _: &GameIdentity, _: &str) -> Result<(), TransportError> {
                unreachable!()
            }
        }

        let err = session.run_new_game().await.unwrap_err();
        assert!(matches!(err, SessionError::RetriesExhausted { .. }));

        let cfg = config("auth-reject");
        let mut session = ArenaSession::new(RejectingTransport, Arc::new(FirstMoveStrategy), cfg);
        let err = session.run_new_game().await.unwrap_err();
        match err {
            SessionError::AuthFailed(message) => assert_eq!(message, "bad token"),
            other => panic!("expected auth failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failed_submission_retries_then_succeeds() {
        let mut transport = MockTransport::new(vec![
            Ok(position(&["e4"])),
            Ok(Turn::Finished(GameResult::Win)),
        ]);
        transport.fail_submissions = 2;
        let cfg = config("submit-retry");
        let mut session = ArenaSession::new(transport, Arc::new(FirstMoveStrategy), cfg);

        let result = session.run_new_game().await.unwrap();
        assert_eq!(result, GameResult::Win);
        assert_eq!(session.transport.submitted, vec!["e4"]);
    }
}
