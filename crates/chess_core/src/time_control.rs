//! Search limits, cancellation and time allocation.
//!
//! The search itself never looks at a clock. It polls a [`CancelToken`] at a
//! fixed node interval; whoever starts the search decides when to cancel,
//! usually through a [`Deadline`] armed with [`SearchLimits::time_budget`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

use crate::types::Color;

/// Upper bound for a single move when the clock does not say otherwise.
pub const DEFAULT_MAX_TIME: Duration = Duration::from_secs(10);

/// Shared flag telling a running search to stop.
///
/// Cheap to clone; every clone observes the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Remaining clock time and increments, as sent with `go`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Clock {
    pub white_time: Option<Duration>,
    pub black_time: Option<Duration>,
    pub white_inc: Duration,
    pub black_inc: Duration,
    pub moves_to_go: Option<u32>,
}

impl Clock {
    pub fn time(&self, side: Color) -> Option<Duration> {
        match side {
            Color::White => self.white_time,
            Color::Black => self.black_time,
        }
    }

    pub fn increment(&self, side: Color) -> Duration {
        match side {
            Color::White => self.white_inc,
            Color::Black => self.black_inc,
        }
    }
}

/// Moves the remaining clock is spread over when no move count is given.
pub const SUDDEN_DEATH_HORIZON: u32 = 30;

/// Limits for one search.
#[derive(Debug, Clone)]
pub struct SearchLimits {
    /// Maximum iterative-deepening depth in plies.
    pub depth: u8,
    /// Fixed time for this move; wins over the clock.
    pub move_time: Option<Duration>,
    pub clock: Clock,
    /// Search until cancelled.
    pub infinite: bool,
    /// Cap on any computed budget.
    pub max_time: Duration,
    pub cancel: CancelToken,
}

impl SearchLimits {
    /// Depth limit only.
    pub fn depth(depth: u8) -> Self {
        Self {
            depth,
            move_time: None,
            clock: Clock::default(),
            infinite: false,
            max_time: DEFAULT_MAX_TIME,
            cancel: CancelToken::new(),
        }
    }

    pub fn depth_and_time(depth: u8, move_time: Duration) -> Self {
        Self {
            move_time: Some(move_time),
            ..Self::depth(depth)
        }
    }

    /// Time limit only.
    pub fn time(move_time: Duration) -> Self {
        Self::depth_and_time(u8::MAX, move_time)
    }

    /// No limit at all; the search runs until cancelled.
    pub fn infinite() -> Self {
        Self {
            infinite: true,
            ..Self::depth(u8::MAX)
        }
    }

    /// Replace the cancellation token, e.g. with one owned by a controller.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Wall-clock budget for `side`, or `None` when the search is unbounded
    /// in time.
    ///
    /// A fixed move time wins. Otherwise the remaining time plus the
    /// increments due before the next time control is spread over the moves
    /// to go, capped at `max_time`. Without a move count the clock is spread
    /// over [`SUDDEN_DEATH_HORIZON`] moves plus the increment, never more
    /// than a quarter of the time left. A tenth is kept back for returning
    /// the move.
    pub fn time_budget(&self, side: Color) -> Option<Duration> {
        if self.infinite {
            return None;
        }

        let remaining = self.clock.time(side).filter(|t| !t.is_zero());
        let budget = if let Some(fixed) = self.move_time {
            fixed
        } else {
            match (remaining, self.clock.moves_to_go) {
                (Some(time), Some(moves)) if moves > 0 => {
                    let inc = self.clock.increment(side);
                    ((time + inc * moves) / moves).min(self.max_time)
                }
                (Some(time), _) => {
                    let share = time / SUDDEN_DEATH_HORIZON + self.clock.increment(side);
                    share.min(time / 4).min(self.max_time)
                }
                (None, _) => self.max_time,
            }
        };

        Some(budget - budget / 10)
    }
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self::depth(4)
    }
}

/// Cancels a token when a time budget runs out.
///
/// Dropping the guard disarms it and joins the watcher thread.
pub struct Deadline {
    disarm: Option<mpsc::Sender<()>>,
    watcher: Option<JoinHandle<()>>,
}

impl Deadline {
    pub fn arm(cancel: CancelToken, budget: Duration) -> Self {
        let (tx, rx) = mpsc::channel::<()>();
        let watcher = thread::spawn(move || match rx.recv_timeout(budget) {
            Err(RecvTimeoutError::Timeout) => {
                debug!(?budget, "time budget exhausted, cancelling search");
                cancel.cancel();
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {}
        });
        Self {
            disarm: Some(tx),
            watcher: Some(watcher),
        }
    }
}

impl Drop for Deadline {
    fn drop(&mut self) {
        // Closing the channel wakes the watcher immediately.
        self.disarm.take();
        if let Some(handle) = self.watcher.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
#[path = "time_control_tests.rs"]
mod time_control_tests;
