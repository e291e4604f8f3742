//! Move queue and sequencing.
//!
//! Moves are played one at a time: a move submitted while another is being
//! animated waits in the queue, and the next one starts as soon as the
//! current animation commits.

use enum_map::EnumMap;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

use crate::error::{Error, ParseError};
use crate::preferences::Preferences;
use crate::puzzle::common::Face;
use crate::puzzle::cube::{CubeSnapshot, CubeState};
use crate::puzzle::notation::{parse, Move};
use crate::render::VisualPuzzle;
use crate::util::color::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    Animating,
    /// Playing out a shuffle batch; moves are not counted.
    Draining,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveSource {
    User,
    Shuffle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuedMove {
    pub mv: Move,
    pub source: MoveSource,
}

/// Things the presentation layer may want to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    MoveCommitted {
        mv: Move,
        source: MoveSource,
        snapshot: CubeSnapshot,
    },
    MoveDropped {
        token: String,
        error: ParseError,
    },
    ShuffleFinished,
    /// The cube was solved by the user.
    Solved { move_count: u32, elapsed_ms: u64 },
}

/// Solve timer. Runs from the first counted move until the cube is solved.
#[derive(Debug, Clone, Default)]
pub struct SolveTimer {
    elapsed: Duration,
    running: bool,
}

impl SolveTimer {
    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn advance(&mut self, dt: Duration) {
        if self.running {
            self.elapsed += dt;
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

/// Random quarter turns, never turning the same face twice in a row.
pub fn shuffle_sequence<R: Rng>(rng: &mut R, length: usize) -> Vec<Move> {
    let pool: Vec<Move> = Face::ALL
        .into_iter()
        .flat_map(|face| [(face, 1), (face, -1)])
        .filter_map(|(face, q)| Move::new(face, q).ok())
        .collect();

    let mut moves: Vec<Move> = Vec::with_capacity(length);
    for _ in 0..length {
        let previous = moves.last().map(|mv| mv.face());
        let candidates: Vec<_> = pool
            .iter()
            .filter(|mv| Some(mv.face()) != previous)
            .collect();
        moves.push(*candidates[rng.gen_range(0..candidates.len())]);
    }
    moves
}

pub struct Session {
    puzzle: VisualPuzzle,
    colors: EnumMap<Face, Color>,
    queue: VecDeque<QueuedMove>,
    /// Source of the move currently being animated.
    in_flight: Option<MoveSource>,
    state: SequencerState,
    shuffling: bool,
    /// Set once a solve has been reported; cleared by a shuffle or reset.
    solved_reported: bool,
    timer: SolveTimer,
    twist_duration_ms: f32,
    shuffle_length: usize,
    events: Vec<Event>,
    scramble: Vec<Move>,
    twists: Vec<Move>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(&Preferences::default())
    }
}

impl Session {
    pub fn new(prefs: &Preferences) -> Self {
        let colors = prefs.colors.cube;
        Self {
            puzzle: VisualPuzzle::new(CubeState::new(&colors), prefs.animation.spacing),
            colors,
            queue: VecDeque::new(),
            in_flight: None,
            state: SequencerState::Idle,
            shuffling: false,
            solved_reported: false,
            timer: SolveTimer::default(),
            twist_duration_ms: prefs.animation.twist_duration_ms,
            shuffle_length: prefs.shuffle.length,
            events: vec![],
            scramble: vec![],
            twists: vec![],
        }
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn is_animating(&self) -> bool {
        self.puzzle.is_animating()
    }

    /// Nothing animating and nothing queued.
    pub fn is_idle(&self) -> bool {
        self.state == SequencerState::Idle && self.queue.is_empty()
    }

    pub fn is_shuffling(&self) -> bool {
        self.shuffling
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn puzzle(&self) -> &VisualPuzzle {
        &self.puzzle
    }

    pub fn cube(&self) -> &CubeState {
        self.puzzle.puzzle()
    }

    pub fn elapsed(&self) -> Duration {
        self.timer.elapsed()
    }

    pub fn snapshot(&self) -> CubeSnapshot {
        self.cube().snapshot(self.is_animating())
    }

    /// Takes every event raised since the last call. Events are buffered
    /// until drained and each commit carries a full snapshot, so callers
    /// should drain once per frame.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Submits a move token. Malformed tokens are dropped and reported as
    /// [`Event::MoveDropped`]; they never stop the queue.
    pub fn submit(&mut self, token: &str) -> Result<(), Error> {
        match parse(token) {
            Ok(mv) => self.submit_move(mv),
            Err(error) => {
                tracing::warn!(token, %error, "dropping move");
                self.events.push(Event::MoveDropped {
                    token: token.to_string(),
                    error,
                });
                Ok(())
            }
        }
    }

    pub fn submit_move(&mut self, mv: Move) -> Result<(), Error> {
        self.enqueue(QueuedMove {
            mv,
            source: MoveSource::User,
        })
    }

    fn enqueue(&mut self, queued: QueuedMove) -> Result<(), Error> {
        if self.state == SequencerState::Idle {
            self.start(queued)
        } else {
            self.queue.push_back(queued);
            Ok(())
        }
    }

    fn start(&mut self, queued: QueuedMove) -> Result<(), Error> {
        if let Err(error) = self.puzzle.twist(queued.mv, self.twist_duration_ms) {
            return Err(self.abort(error));
        }
        tracing::debug!(mv = %queued.mv, queued = self.queue.len(), "starting twist");
        self.in_flight = Some(queued.source);
        self.state = if self.shuffling {
            SequencerState::Draining
        } else {
            SequencerState::Animating
        };
        Ok(())
    }

    fn dispatch_next(&mut self) -> Result<(), Error> {
        match self.queue.pop_front() {
            Some(next) => self.start(next),
            None => {
                self.state = SequencerState::Idle;
                Ok(())
            }
        }
    }

    /// Advances the timer and the current animation by one frame.
    pub fn tick(&mut self, dt: Duration) -> Result<(), Error> {
        self.timer.advance(dt);
        if self.state == SequencerState::Idle && !self.queue.is_empty() {
            self.dispatch_next()?;
        }
        match self.puzzle.update(dt.as_secs_f32() * 1000.0) {
            Ok(Some(mv)) => self.on_commit(mv),
            Ok(None) => Ok(()),
            Err(e) => Err(self.abort(e)),
        }
    }

    /// Plays every queued move to the end without animating.
    pub fn catch_up(&mut self) -> Result<(), Error> {
        loop {
            match self.puzzle.force_complete() {
                Ok(Some(mv)) => self.on_commit(mv)?,
                Ok(None) if !self.queue.is_empty() => self.dispatch_next()?,
                Ok(None) => return Ok(()),
                Err(e) => return Err(self.abort(e)),
            }
        }
    }

    /// The current move failed and has been discarded; the queue carries
    /// on from the next move on the following tick.
    fn abort(&mut self, error: Error) -> Error {
        tracing::error!(%error, "twist aborted");
        self.in_flight = None;
        self.state = SequencerState::Idle;
        error
    }

    fn on_commit(&mut self, mv: Move) -> Result<(), Error> {
        let source = self.in_flight.take().unwrap_or(MoveSource::User);
        let counted = source == MoveSource::User && !self.shuffling;
        tracing::debug!(%mv, ?source, "committed twist");

        if counted {
            self.twists.push(mv);
            self.puzzle.puzzle_mut().record_move();
            if !self.timer.is_running() && !self.solved_reported {
                self.timer.start();
            }
        }
        self.events.push(Event::MoveCommitted {
            mv,
            source,
            snapshot: self.cube().snapshot(false),
        });

        if counted && !self.solved_reported && self.cube().is_solved() {
            self.solved_reported = true;
            self.timer.stop();
            let move_count = self.cube().move_count();
            let elapsed_ms = u64::try_from(self.timer.elapsed().as_millis()).unwrap_or(u64::MAX);
            tracing::info!(move_count, elapsed_ms, "cube solved");
            self.events.push(Event::Solved {
                move_count,
                elapsed_ms,
            });
        }

        if self.shuffling
            && !self
                .queue
                .iter()
                .any(|queued| queued.source == MoveSource::Shuffle)
        {
            self.finish_shuffle();
        }

        self.dispatch_next()
    }

    /// Queues a random scramble. Ignored while a shuffle is already being
    /// played.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) -> Result<bool, Error> {
        if self.shuffling {
            tracing::debug!("already shuffling");
            return Ok(false);
        }
        let moves = shuffle_sequence(rng, self.shuffle_length);
        self.shuffling = true;
        self.scramble = moves.clone();
        if moves.is_empty() {
            self.finish_shuffle();
        }
        for mv in moves {
            self.enqueue(QueuedMove {
                mv,
                source: MoveSource::Shuffle,
            })?;
        }
        Ok(true)
    }

    fn finish_shuffle(&mut self) {
        self.shuffling = false;
        self.solved_reported = false;
        self.puzzle.puzzle_mut().reset_move_count();
        self.timer.reset();
        self.twists.clear();
        tracing::info!(moves = self.scramble.len(), "shuffle finished");
        self.events.push(Event::ShuffleFinished);
    }

    /// Back to a solved cube. An animation in flight is completed first so
    /// nothing is left referring to the old cube.
    pub fn reset(&mut self) {
        if let Err(error) = self.puzzle.force_complete() {
            tracing::warn!(%error, "discarding in-flight twist on reset");
        }
        self.queue.clear();
        self.in_flight = None;
        self.shuffling = false;
        self.solved_reported = false;
        self.state = SequencerState::Idle;
        self.timer.reset();
        self.scramble.clear();
        self.twists.clear();
        self.puzzle.replace(CubeState::new(&self.colors));
    }

    pub fn to_log(&self) -> SessionLog {
        SessionLog {
            version: env!("CARGO_PKG_VERSION").to_string(),
            scramble: self.scramble.clone(),
            twists: self.twists.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionLog {
    pub version: String,
    pub scramble: Vec<Move>,
    pub twists: Vec<Move>,
}
