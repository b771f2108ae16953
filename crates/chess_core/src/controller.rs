//! Asynchronous driver around one [`Engine`].
//!
//! The controller holds the current position and runs searches on a worker
//! thread, so a protocol loop can keep reading commands (`stop`, `isready`)
//! while the engine thinks. States move `Idle -> PositionSet -> Running ->
//! PositionSet`; changing the position or the engine while `Running` is
//! rejected.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{debug, error};

use crate::board::Position;
use crate::error::{ChessError, ChessResult};
use crate::search::SearchInfo;
use crate::time_control::{CancelToken, Deadline, SearchLimits};
use crate::{Engine, SearchResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    PositionSet,
    Running,
}

struct Inner {
    state: EngineState,
    position: Option<Position>,
    history: Vec<u64>,
    cancel: CancelToken,
    worker: Option<JoinHandle<()>>,
}

/// A poisoned lock only means a callback panicked; the data is still valid.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Puts the controller back into `PositionSet` when the worker finishes,
/// including when the engine panics.
struct WorkerGuard(Arc<Mutex<Inner>>);

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        if thread::panicking() {
            error!("search worker panicked");
        }
        lock(&self.0).state = EngineState::PositionSet;
    }
}

pub struct EngineController<E: Engine + 'static> {
    engine: Arc<Mutex<E>>,
    inner: Arc<Mutex<Inner>>,
    /// Name and author, read once so the handshake never waits on a search.
    identity: (String, String),
}

impl<E: Engine + 'static> EngineController<E> {
    pub fn new(engine: E) -> Self {
        let identity = (engine.name().to_string(), engine.author().to_string());
        Self {
            identity,
            engine: Arc::new(Mutex::new(engine)),
            inner: Arc::new(Mutex::new(Inner {
                state: EngineState::Idle,
                position: None,
                history: Vec::new(),
                cancel: CancelToken::new(),
                worker: None,
            })),
        }
    }

    pub fn state(&self) -> EngineState {
        lock(&self.inner).state
    }

    pub fn is_running(&self) -> bool {
        self.state() == EngineState::Running
    }

    /// A copy of the current position, if one is set.
    pub fn position(&self) -> Option<Position> {
        lock(&self.inner).position.clone()
    }

    /// Replace the position and the hashes of the game leading up to it.
    pub fn set_position(&self, position: Position, history: Vec<u64>) -> ChessResult<()> {
        let mut inner = lock(&self.inner);
        if inner.state == EngineState::Running {
            return Err(ChessError::SearchRunning);
        }
        inner.position = Some(position);
        inner.history = history;
        inner.state = EngineState::PositionSet;
        Ok(())
    }

    /// Forget the position and let the engine clear its tables.
    pub fn new_game(&self) -> ChessResult<()> {
        let mut inner = lock(&self.inner);
        if inner.state == EngineState::Running {
            return Err(ChessError::SearchRunning);
        }
        lock(&self.engine).new_game();
        inner.position = None;
        inner.history.clear();
        inner.state = EngineState::Idle;
        Ok(())
    }

    /// Forward an option to the engine. Returns whether it was recognized.
    pub fn set_option(&self, name: &str, value: &str) -> ChessResult<bool> {
        let inner = lock(&self.inner);
        if inner.state == EngineState::Running {
            return Err(ChessError::SearchRunning);
        }
        Ok(lock(&self.engine).set_option(name, value))
    }

    /// Engine name and author, for the `uci` handshake.
    pub fn identity(&self) -> (String, String) {
        self.identity.clone()
    }

    /// Start searching the current position on a worker thread.
    ///
    /// `on_info` sees every completed iteration and `on_done` receives the
    /// final result. The controller is back in `PositionSet` by the time
    /// `on_done` runs, so the callback may start the next search.
    pub fn start<F, G>(&self, limits: SearchLimits, mut on_info: F, on_done: G) -> ChessResult<()>
    where
        F: FnMut(&SearchInfo) + Send + 'static,
        G: FnOnce(SearchResult) + Send + 'static,
    {
        let mut inner = lock(&self.inner);
        if inner.state == EngineState::Running {
            return Err(ChessError::SearchRunning);
        }
        let position = inner.position.clone().ok_or(ChessError::NoPosition)?;
        let history = inner.history.clone();

        if let Some(previous) = inner.worker.take()
            && previous.is_finished()
        {
            let _ = previous.join();
        }

        let cancel = CancelToken::new();
        let limits = limits.with_cancel(cancel.clone());
        let budget = limits.time_budget(position.side_to_move());
        debug!(?budget, depth = limits.depth, "starting search");

        inner.cancel = cancel.clone();
        inner.state = EngineState::Running;

        let engine = Arc::clone(&self.engine);
        let guard = WorkerGuard(Arc::clone(&self.inner));
        inner.worker = Some(thread::spawn(move || {
            let deadline = budget.map(|budget| Deadline::arm(cancel, budget));
            let result =
                lock(&engine).search_with_info(&position, &history, limits, &mut on_info);
            drop(deadline);

            debug!(
                depth = result.depth,
                nodes = result.nodes,
                stopped = result.stopped,
                "search finished"
            );
            drop(guard);
            on_done(result);
        }));
        Ok(())
    }

    /// Ask a running search to stop. The result still arrives through
    /// `on_done`.
    pub fn stop(&self) {
        lock(&self.inner).cancel.cancel();
    }

    /// Block until the current worker, if any, has finished.
    ///
    /// Must not be called from inside `on_done`.
    pub fn wait(&self) {
        let worker = lock(&self.inner).worker.take();
        if let Some(worker) = worker {
            let _ = worker.join();
        }
    }
}

impl<E: Engine + 'static> Drop for EngineController<E> {
    fn drop(&mut self) {
        self.stop();
        self.wait();
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod controller_tests;
