//! Turn state machine - sequences swaps, resolution passes and gravity
//!
//! The machine is driven by [`TurnStateMachine::tick`] with the elapsed time in
//! milliseconds. Every phase waits out a configured delay (standing in for
//! presentation time) and then performs exactly one transition:
//!
//! ```text
//! Idle --request_swap--> Swapping --swap delay--> Matching
//! Matching --match delay, selection empty----> Idle
//! Matching --match delay, cascade limit hit--> Idle
//! Matching --match delay, selection found----> (clear) --clear delay--> Falling
//! Falling  --gravity, fall delay-------------> Matching
//! ```
//!
//! Grid mutations happen synchronously inside a transition, so classification
//! never observes a half-applied swap, clear or compaction. Swap requests are
//! only accepted while idle; anything else is rejected without side effects
//! beyond a [`TurnEvent::SwapRejected`] notification.
//!
//! Collaborators (token factory, randomness) are injected through
//! [`TurnStateMachineBuilder`]. Notifications are queued and pulled with
//! [`TurnStateMachine::drain_events`]. The queue holds at most
//! [`EVENT_QUEUE_CAPACITY`] events; when a caller stops draining, the oldest
//! are dropped and counted in [`TurnStateMachine::dropped_events`].

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::config::GameConfig;
use crate::error::{BuildError, SwapRejection};
use crate::gravity::apply_gravity;
use crate::grid::Grid;
use crate::resolve::{find_matches, swap_would_match, MatchSelection};
use crate::rng::{RandomSource, SimpleRng};
use crate::snapshot::TurnSnapshot;
use crate::token::{SequentialTokenFactory, Token, TokenFactory};
use crate::types::{Position, TokenId, TurnPhase};

pub const EVENT_QUEUE_CAPACITY: usize = 4096;

/// Notifications for rendering, HUD and pooling collaborators
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEvent {
    PhaseChanged { from: TurnPhase, to: TurnPhase },
    /// A token now sits at `token.position`; `from` is `None` for new tokens
    TokenPlaced {
        token: Token,
        from: Option<Position>,
    },
    /// A token left the grid
    TokenRemoved { token: Token },
    /// A resolution pass cleared a non-empty selection
    Matched {
        selection: MatchSelection,
        score_delta: u32,
        cascade: u32,
    },
    /// A resolution pass found nothing; the turn is over
    NoMatches,
    /// The turn hit `max_cascade_passes` and ended with matches possibly left
    CascadeCapped { passes: u32 },
    SwapRejected {
        a: TokenId,
        b: TokenId,
        reason: SwapRejection,
    },
}

/// Internal steps; several share one public phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Idle,
    SwapSettle,
    MatchDelay,
    ClearSettle,
    FallSettle,
}

impl Step {
    fn phase(self) -> TurnPhase {
        match self {
            Step::Idle => TurnPhase::Idle,
            Step::SwapSettle => TurnPhase::Swapping,
            Step::MatchDelay | Step::ClearSettle => TurnPhase::Matching,
            Step::FallSettle => TurnPhase::Falling,
        }
    }
}

pub struct TurnStateMachine {
    config: GameConfig,
    grid: Grid,
    factory: Box<dyn TokenFactory>,
    rng: Box<dyn RandomSource>,
    step: Step,
    timer_ms: u32,
    running: bool,
    paused: bool,
    score: u32,
    /// Accepted swaps
    moves: u32,
    /// Non-empty resolution passes in the current turn
    cascade_depth: u32,
    last_selection: Option<MatchSelection>,
    events: VecDeque<TurnEvent>,
    dropped_events: u32,
}

impl std::fmt::Debug for TurnStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnStateMachine")
            .field("step", &self.step)
            .field("timer_ms", &self.timer_ms)
            .field("running", &self.running)
            .field("paused", &self.paused)
            .field("score", &self.score)
            .field("moves", &self.moves)
            .field("cascade_depth", &self.cascade_depth)
            .field("grid", &self.grid)
            .finish_non_exhaustive()
    }
}

impl TurnStateMachine {
    pub fn builder() -> TurnStateMachineBuilder {
        TurnStateMachineBuilder::default()
    }

    /// Empty board of the configured size, sequential ids, seeded [`SimpleRng`]
    pub fn new(config: GameConfig) -> Result<Self, BuildError> {
        let seed = config.seed;
        Self::builder()
            .config(config)
            .token_factory(SequentialTokenFactory::new())
            .random_source(SimpleRng::new(seed))
            .build()
    }

    /// Use a prepared grid; new ids continue after the highest id on it
    pub fn from_grid(grid: Grid, config: GameConfig) -> Result<Self, BuildError> {
        let seed = config.seed;
        let factory = match grid.max_token_id() {
            Some(last) => SequentialTokenFactory::starting_after(last),
            None => SequentialTokenFactory::new(),
        };
        Self::builder()
            .config(config)
            .grid(grid)
            .token_factory(factory)
            .random_source(SimpleRng::new(seed))
            .build()
    }

    // ------------------------------------------------------------------
    // Session lifecycle
    // ------------------------------------------------------------------

    /// Fill every empty cell and begin accepting swaps.
    /// Returns false if the session is already running.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.paused = false;
        self.set_step(Step::Idle, 0);
        self.fill_board();
        info!(
            width = self.grid.width(),
            height = self.grid.height(),
            seed = self.config.seed,
            "session started"
        );
        true
    }

    /// Empty the grid, reset counters, refill and return to idle.
    ///
    /// Any in-flight resolution pass is abandoned.
    pub fn restart(&mut self) {
        let removed: Vec<Token> = self.grid.tokens().collect();
        for token in removed {
            self.grid.take(token.position);
            self.push_event(TurnEvent::TokenRemoved { token });
        }

        self.score = 0;
        self.moves = 0;
        self.cascade_depth = 0;
        self.last_selection = None;
        self.running = true;
        self.paused = false;
        self.set_step(Step::Idle, 0);
        self.fill_board();
        info!("session restarted");
    }

    /// Stop the loop; ticks become no-ops and swaps are rejected.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.paused = false;
        self.set_step(Step::Idle, 0);
        info!(score = self.score, moves = self.moves, "session stopped");
    }

    pub fn pause(&mut self) -> bool {
        if !self.running || self.paused {
            return false;
        }
        self.paused = true;
        debug!("session paused");
        true
    }

    pub fn resume(&mut self) -> bool {
        if !self.running || !self.paused {
            return false;
        }
        self.paused = false;
        debug!("session resumed");
        true
    }

    // ------------------------------------------------------------------
    // Swaps
    // ------------------------------------------------------------------

    /// Ask to exchange two tokens. Accepted only while idle, for two distinct
    /// tokens on the grid that are 4-directionally adjacent.
    ///
    /// On acceptance the tokens are exchanged immediately and the machine
    /// enters `Swapping`. On rejection nothing changes.
    pub fn request_swap(&mut self, a: TokenId, b: TokenId) -> Result<(), SwapRejection> {
        let (pa, pb) = match self.check_swap(a, b) {
            Ok(positions) => positions,
            Err(reason) => {
                debug!(%a, %b, reason = reason.code(), "swap rejected");
                self.push_event(TurnEvent::SwapRejected { a, b, reason });
                return Err(reason);
            }
        };

        self.grid.swap(pa, pb);
        self.moves = self.moves.saturating_add(1);
        self.cascade_depth = 0;
        self.last_selection = None;

        for (pos, from) in [(pb, pa), (pa, pb)] {
            if let Some(token) = self.grid.token_at(pos) {
                self.push_event(TurnEvent::TokenPlaced {
                    token,
                    from: Some(from),
                });
            }
        }
        debug!(%a, %b, from = %pa, to = %pb, "swap accepted");

        self.set_step(Step::SwapSettle, self.config.swap_delay_ms);
        Ok(())
    }

    fn check_swap(&self, a: TokenId, b: TokenId) -> Result<(Position, Position), SwapRejection> {
        if !self.running {
            return Err(SwapRejection::Stopped);
        }
        if self.paused {
            return Err(SwapRejection::Paused);
        }
        if self.step != Step::Idle {
            return Err(SwapRejection::Busy {
                phase: self.phase(),
            });
        }
        self.locate_pair(a, b)
    }

    fn locate_pair(&self, a: TokenId, b: TokenId) -> Result<(Position, Position), SwapRejection> {
        if a == b {
            return Err(SwapRejection::SameToken(a));
        }
        let ta = self.grid.find(a).ok_or(SwapRejection::UnknownToken(a))?;
        let tb = self.grid.find(b).ok_or(SwapRejection::UnknownToken(b))?;
        if !ta.position.is_adjacent(tb.position) {
            return Err(SwapRejection::NotAdjacent {
                a: ta.position,
                b: tb.position,
            });
        }
        Ok((ta.position, tb.position))
    }

    /// Whether swapping the two tokens would produce a match.
    ///
    /// Works in any phase and leaves the grid exactly as it was.
    pub fn validate_swap(&mut self, a: TokenId, b: TokenId) -> bool {
        match self.locate_pair(a, b) {
            Ok((pa, pb)) => swap_would_match(&mut self.grid, pa, pb),
            Err(_) => false,
        }
    }

    // ------------------------------------------------------------------
    // Timing
    // ------------------------------------------------------------------

    /// Advance timers by `elapsed_ms`. Returns true if a transition happened.
    ///
    /// At most one transition runs per call; time left over after a timer
    /// expires is discarded. Transitions queue events, so callers should
    /// [`drain_events`](Self::drain_events) regularly.
    pub fn tick(&mut self, elapsed_ms: u32) -> bool {
        if !self.running || self.paused || self.step == Step::Idle {
            return false;
        }

        self.timer_ms = self.timer_ms.saturating_sub(elapsed_ms);
        if self.timer_ms > 0 {
            return false;
        }

        match self.step {
            Step::SwapSettle | Step::FallSettle => {
                self.set_step(Step::MatchDelay, self.config.match_check_delay_ms)
            }
            Step::MatchDelay => self.resolve_pass(),
            Step::ClearSettle => self.fall(),
            Step::Idle => {}
        }
        true
    }

    /// Run pending transitions until the machine is idle again.
    /// Returns the number of transitions performed.
    pub fn settle(&mut self) -> u32 {
        let mut transitions = 0u32;
        while self.running && !self.paused && self.step != Step::Idle {
            let pending = self.timer_ms;
            if !self.tick(pending) {
                break;
            }
            transitions += 1;
        }
        transitions
    }

    fn resolve_pass(&mut self) {
        if self.cascade_depth >= self.config.max_cascade_passes {
            warn!(
                passes = self.cascade_depth,
                "cascade limit reached, ending turn"
            );
            self.push_event(TurnEvent::CascadeCapped {
                passes: self.cascade_depth,
            });
            self.set_step(Step::Idle, 0);
            return;
        }

        let selection = find_matches(&self.grid);
        if selection.is_empty() {
            debug!(cascade = self.cascade_depth, "no matches");
            self.push_event(TurnEvent::NoMatches);
            self.set_step(Step::Idle, 0);
            return;
        }

        self.cascade_depth += 1;
        let score_delta = self.config.scoring.selection_score(&selection);
        self.clear_selection(&selection);
        self.score = self.score.saturating_add(score_delta);
        debug!(
            matches = selection.len(),
            tokens = selection.token_count(),
            score_delta,
            cascade = self.cascade_depth,
            "selection cleared"
        );

        self.push_event(TurnEvent::Matched {
            selection: selection.clone(),
            score_delta,
            cascade: self.cascade_depth,
        });
        self.last_selection = Some(selection);
        self.set_step(Step::ClearSettle, self.config.clear_delay_ms);
    }

    fn clear_selection(&mut self, selection: &MatchSelection) {
        for member in selection.iter().flat_map(|c| c.members.iter()) {
            let live = self
                .grid
                .token_at(member.position)
                .filter(|t| t.id == member.id);
            debug_assert!(
                live.is_some(),
                "stale match member {} at {}",
                member.id,
                member.position
            );
            match live {
                Some(token) => {
                    self.grid.take(member.position);
                    self.push_event(TurnEvent::TokenRemoved { token });
                }
                None => {
                    warn!(id = %member.id, pos = %member.position, "skipping stale match member");
                }
            }
        }
    }

    fn fall(&mut self) {
        let report = apply_gravity(&mut self.grid, self.factory.as_mut(), self.rng.as_mut());
        for fall in &report.falls {
            self.push_event(TurnEvent::TokenPlaced {
                token: fall.token,
                from: Some(fall.from),
            });
        }
        for token in &report.spawned {
            self.push_event(TurnEvent::TokenPlaced {
                token: *token,
                from: None,
            });
        }
        self.set_step(Step::FallSettle, self.config.fall_delay_ms);
    }

    fn fill_board(&mut self) {
        let spawned =
            crate::gravity::refill(&mut self.grid, self.factory.as_mut(), self.rng.as_mut());
        for token in spawned {
            self.push_event(TurnEvent::TokenPlaced { token, from: None });
        }
    }

    fn set_step(&mut self, step: Step, delay_ms: u32) {
        let from = self.step.phase();
        self.step = step;
        self.timer_ms = delay_ms;
        let to = step.phase();
        if from != to {
            debug!(%from, %to, delay_ms, "phase changed");
            self.push_event(TurnEvent::PhaseChanged { from, to });
        }
    }

    fn push_event(&mut self, event: TurnEvent) {
        if self.events.len() >= EVENT_QUEUE_CAPACITY {
            self.events.pop_front();
            if self.dropped_events == 0 {
                warn!(
                    capacity = EVENT_QUEUE_CAPACITY,
                    "event queue full, dropping oldest events"
                );
            }
            self.dropped_events = self.dropped_events.saturating_add(1);
        }
        self.events.push_back(event);
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Take all queued notifications, oldest first
    pub fn drain_events(&mut self) -> Vec<TurnEvent> {
        self.dropped_events = 0;
        self.events.drain(..).collect()
    }

    /// Events lost to the queue limit since the last drain
    pub fn dropped_events(&self) -> u32 {
        self.dropped_events
    }

    pub fn phase(&self) -> TurnPhase {
        self.step.phase()
    }

    pub fn is_idle(&self) -> bool {
        self.step == Step::Idle
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Remaining wait before the next transition
    pub fn pending_ms(&self) -> u32 {
        self.timer_ms
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn cascade_depth(&self) -> u32 {
        self.cascade_depth
    }

    /// Most recent selection cleared during the current turn
    pub fn last_selection(&self) -> Option<&MatchSelection> {
        self.last_selection.as_ref()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn snapshot(&self) -> TurnSnapshot {
        TurnSnapshot {
            phase: self.phase(),
            running: self.running,
            paused: self.paused,
            score: self.score,
            moves: self.moves,
            cascade_depth: self.cascade_depth,
            pending_ms: self.timer_ms,
            width: self.grid.width(),
            height: self.grid.height(),
            board: TurnSnapshot::board_rows(&self.grid),
        }
    }
}

/// Assembles a [`TurnStateMachine`]. Both collaborators are required.
#[derive(Default)]
pub struct TurnStateMachineBuilder {
    config: Option<GameConfig>,
    grid: Option<Grid>,
    factory: Option<Box<dyn TokenFactory>>,
    rng: Option<Box<dyn RandomSource>>,
}

impl TurnStateMachineBuilder {
    pub fn config(mut self, config: GameConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Start from this grid instead of an empty one of the configured size
    pub fn grid(mut self, grid: Grid) -> Self {
        self.grid = Some(grid);
        self
    }

    pub fn token_factory(mut self, factory: impl TokenFactory + 'static) -> Self {
        self.factory = Some(Box::new(factory));
        self
    }

    pub fn random_source(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }

    pub fn build(self) -> Result<TurnStateMachine, BuildError> {
        let factory = self
            .factory
            .ok_or(BuildError::MissingCollaborator("token factory"))?;
        let rng = self
            .rng
            .ok_or(BuildError::MissingCollaborator("random source"))?;

        let mut config = self.config.unwrap_or_default();
        let grid = match self.grid {
            Some(grid) => {
                config.width = grid.width();
                config.height = grid.height();
                grid
            }
            None => Grid::new(config.width, config.height)
                .map_err(|e| BuildError::InvalidConfig(e.to_string()))?,
        };
        config
            .validate()
            .map_err(|e| BuildError::InvalidConfig(e.to_string()))?;

        Ok(TurnStateMachine {
            config,
            grid,
            factory,
            rng,
            step: Step::Idle,
            timer_ms: 0,
            running: false,
            paused: false,
            score: 0,
            moves: 0,
            cascade_depth: 0,
            last_selection: None,
            events: VecDeque::new(),
            dropped_events: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::KindSequence;
    use crate::types::{ShapeKind, TokenKind};

    /// Rows top first: `R R R` appears on the bottom row after swapping (2,0) and (3,0)
    const ONE_MATCH: &str = "
        GYBY
        BGYG
        RRBR
    ";

    fn machine(layout: &str, refill: &str, config: GameConfig) -> TurnStateMachine {
        let grid = Grid::parse(layout).unwrap();
        let last = grid.max_token_id().unwrap_or(TokenId(0));
        let mut m = TurnStateMachine::builder()
            .config(config)
            .grid(grid)
            .token_factory(SequentialTokenFactory::starting_after(last))
            .random_source(KindSequence::from_codes(refill))
            .build()
            .unwrap();
        m.start();
        m.drain_events();
        m
    }

    fn id_at(m: &TurnStateMachine, col: i8, row: i8) -> TokenId {
        m.grid().token_at(Position::new(col, row)).unwrap().id
    }

    #[test]
    fn test_builder_requires_collaborators() {
        let err = TurnStateMachine::builder()
            .random_source(SimpleRng::new(1))
            .build()
            .unwrap_err();
        assert_eq!(err, BuildError::MissingCollaborator("token factory"));

        let err = TurnStateMachine::builder()
            .token_factory(SequentialTokenFactory::new())
            .build()
            .unwrap_err();
        assert_eq!(err, BuildError::MissingCollaborator("random source"));
    }

    #[test]
    fn test_start_fills_board() {
        let mut m = TurnStateMachine::new(GameConfig::default()).unwrap();
        assert!(m.grid().count_empty() > 0);
        assert!(m.start());
        assert!(!m.start());
        assert!(m.grid().is_full());
        assert_eq!(m.phase(), TurnPhase::Idle);
        let placed = m
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, TurnEvent::TokenPlaced { from: None, .. }))
            .count();
        assert_eq!(placed, 64);
    }

    #[test]
    fn test_full_turn_timing() {
        let mut m = machine(ONE_MATCH, "POP", GameConfig::default());
        let a = id_at(&m, 2, 0);
        let b = id_at(&m, 3, 0);

        m.request_swap(a, b).unwrap();
        assert_eq!(m.phase(), TurnPhase::Swapping);
        assert_eq!(m.moves(), 1);

        assert!(!m.tick(299));
        assert!(m.tick(1));
        assert_eq!(m.phase(), TurnPhase::Matching);

        assert!(m.tick(500));
        assert_eq!(m.phase(), TurnPhase::Matching);
        assert_eq!(m.score(), 300);
        assert_eq!(m.grid().count_empty(), 3);

        assert!(m.tick(500));
        assert_eq!(m.phase(), TurnPhase::Falling);
        assert!(m.grid().is_full());

        assert!(m.tick(300));
        assert_eq!(m.phase(), TurnPhase::Matching);
        assert!(m.tick(500));
        assert_eq!(m.phase(), TurnPhase::Idle);
        assert_eq!(m.cascade_depth(), 1);

        let selection = m.last_selection().unwrap();
        assert_eq!(selection.len(), 1);
        assert_eq!(selection.iter().next().unwrap().shape, ShapeKind::Line3);
    }

    #[test]
    fn test_large_tick_runs_one_transition() {
        let mut m = machine(ONE_MATCH, "POP", GameConfig::default());
        let (a, b) = (id_at(&m, 2, 0), id_at(&m, 3, 0));
        m.request_swap(a, b).unwrap();
        assert!(m.tick(10_000));
        assert_eq!(m.phase(), TurnPhase::Matching);
        assert_eq!(m.pending_ms(), 500);
    }

    #[test]
    fn test_swap_updates_positions() {
        let mut m = machine(ONE_MATCH, "POP", GameConfig::default());
        let (a, b) = (id_at(&m, 2, 0), id_at(&m, 3, 0));
        m.request_swap(a, b).unwrap();
        assert_eq!(m.grid().find(a).unwrap().position, Position::new(3, 0));
        assert_eq!(m.grid().find(b).unwrap().position, Position::new(2, 0));
        let events = m.drain_events();
        assert!(events.contains(&TurnEvent::PhaseChanged {
            from: TurnPhase::Idle,
            to: TurnPhase::Swapping
        }));
    }

    #[test]
    fn test_rejections_change_nothing() {
        let mut m = machine(ONE_MATCH, "POP", GameConfig::default());
        let before = m.grid().clone();
        let far = (id_at(&m, 0, 0), id_at(&m, 2, 0));

        assert!(matches!(
            m.request_swap(far.0, far.1),
            Err(SwapRejection::NotAdjacent { .. })
        ));
        assert_eq!(
            m.request_swap(far.0, far.0),
            Err(SwapRejection::SameToken(far.0))
        );
        assert_eq!(
            m.request_swap(far.0, TokenId(999)),
            Err(SwapRejection::UnknownToken(TokenId(999)))
        );

        assert_eq!(m.grid(), &before);
        assert_eq!(m.phase(), TurnPhase::Idle);
        assert_eq!(m.moves(), 0);
        let rejected = m
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, TurnEvent::SwapRejected { .. }))
            .count();
        assert_eq!(rejected, 3);
    }

    #[test]
    fn test_busy_rejects_swap() {
        let mut m = machine(ONE_MATCH, "POP", GameConfig::default());
        let (a, b) = (id_at(&m, 2, 0), id_at(&m, 3, 0));
        m.request_swap(a, b).unwrap();
        let grid = m.grid().clone();
        assert_eq!(
            m.request_swap(a, b),
            Err(SwapRejection::Busy {
                phase: TurnPhase::Swapping
            })
        );
        assert_eq!(m.grid(), &grid);
        assert_eq!(m.phase(), TurnPhase::Swapping);
    }

    #[test]
    fn test_cascade_scores_each_pass() {
        let layout = "
            BGR
            RRG
        ";
        let mut m = machine(layout, "YYYBPO", GameConfig::builder().instant().build().unwrap());
        let (a, b) = (id_at(&m, 2, 0), id_at(&m, 2, 1));
        m.request_swap(a, b).unwrap();
        m.settle();

        assert!(m.is_idle());
        assert_eq!(m.cascade_depth(), 2);
        assert_eq!(m.score(), 600);
        let cascades: Vec<u32> = m
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                TurnEvent::Matched { cascade, .. } => Some(cascade),
                _ => None,
            })
            .collect();
        assert_eq!(cascades, vec![1, 2]);
    }

    #[test]
    fn test_cascade_cap_ends_turn() {
        let layout = "
            BGR
            RRG
        ";
        let config = GameConfig::builder()
            .instant()
            .max_cascade_passes(1)
            .build()
            .unwrap();
        let mut m = machine(layout, "YYYBPO", config);
        let (a, b) = (id_at(&m, 2, 0), id_at(&m, 2, 1));
        m.request_swap(a, b).unwrap();
        m.settle();

        assert!(m.is_idle());
        assert_eq!(m.cascade_depth(), 1);
        assert_eq!(m.score(), 300);
        assert_eq!(m.grid().kind_at(Position::new(1, 1)), Some(TokenKind::Yellow));

        let events = m.drain_events();
        assert!(events.contains(&TurnEvent::CascadeCapped { passes: 1 }));
        assert!(!events.contains(&TurnEvent::NoMatches));
    }

    #[test]
    fn test_undrained_queue_drops_oldest() {
        let mut m = machine(ONE_MATCH, "POP", GameConfig::default());
        let a = id_at(&m, 0, 0);
        let overflow = EVENT_QUEUE_CAPACITY + 10;
        for _ in 0..overflow {
            let _ = m.request_swap(a, a);
        }
        assert_eq!(m.dropped_events(), 10);

        let events = m.drain_events();
        assert_eq!(events.len(), EVENT_QUEUE_CAPACITY);
        assert_eq!(m.dropped_events(), 0);
    }

    #[test]
    fn test_instant_turn_transition_count() {
        let mut m = machine(ONE_MATCH, "POP", GameConfig::builder().instant().build().unwrap());
        let (a, b) = (id_at(&m, 2, 0), id_at(&m, 3, 0));
        m.request_swap(a, b).unwrap();
        assert_eq!(m.settle(), 5);
    }

    #[test]
    fn test_pause_freezes_ticks() {
        let mut m = machine(ONE_MATCH, "POP", GameConfig::default());
        let (a, b) = (id_at(&m, 2, 0), id_at(&m, 3, 0));
        m.request_swap(a, b).unwrap();
        assert!(m.pause());
        assert!(!m.tick(1000));
        assert_eq!(m.phase(), TurnPhase::Swapping);
        assert_eq!(m.request_swap(a, b), Err(SwapRejection::Paused));
        assert!(m.resume());
        assert!(m.tick(300));
    }

    #[test]
    fn test_stop_rejects_and_restart_resets() {
        let mut m = machine(ONE_MATCH, "POP", GameConfig::builder().instant().build().unwrap());
        let (a, b) = (id_at(&m, 2, 0), id_at(&m, 3, 0));
        m.request_swap(a, b).unwrap();
        m.settle();
        assert!(m.score() > 0);

        m.stop();
        assert!(!m.is_running());
        assert_eq!(m.request_swap(a, b), Err(SwapRejection::Stopped));
        assert!(!m.tick(16));

        m.restart();
        assert!(m.is_running());
        assert_eq!(m.score(), 0);
        assert_eq!(m.moves(), 0);
        assert!(m.grid().is_full());
        assert!(m.grid().find(a).is_none());
    }

    #[test]
    fn test_validate_swap_leaves_grid() {
        let mut m = machine(ONE_MATCH, "POP", GameConfig::default());
        let before = m.grid().clone();
        let (a, b) = (id_at(&m, 2, 0), id_at(&m, 3, 0));
        assert!(m.validate_swap(a, b));
        assert!(!m.validate_swap(id_at(&m, 0, 2), id_at(&m, 1, 2)));
        assert_eq!(m.grid(), &before);
        assert!(m.drain_events().is_empty());
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut m = machine(ONE_MATCH, "POP", GameConfig::default());
        let (a, b) = (id_at(&m, 2, 0), id_at(&m, 3, 0));
        m.request_swap(a, b).unwrap();
        let snap = m.snapshot();
        assert_eq!(snap.phase, TurnPhase::Swapping);
        assert_eq!(snap.pending_ms, 300);
        assert_eq!(snap.board, vec!["GYBY", "BGYG", "RRRB"]);
        assert!(!snap.playable());
    }
}
