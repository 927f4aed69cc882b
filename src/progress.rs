//! Progress reporting for the long per-point and per-unit loops.
//!
//! Reporters are passed into each operation rather than held globally; `()`
//! reports nothing.

use std::fmt;

/// Pipeline stage emitting a progress update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Classify,
    Resolve,
    Recover,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Classify => "classify",
            Stage::Resolve => "resolve",
            Stage::Recover => "recover",
        })
    }
}

/// Receives `(done, total)` updates from a running stage.
pub trait Progress {
    fn report(&self, stage: Stage, done: usize, total: usize);
}

impl Progress for () {
    #[inline] fn report(&self, _stage: Stage, _done: usize, _total: usize) {}
}

/// Logs every `every`-th update (and the final one) through `tracing`.
#[derive(Debug, Clone, Copy)]
pub struct LogProgress {
    every: usize,
}

impl LogProgress {
    pub fn new(every: usize) -> Self { Self { every: every.max(1) } }
}

impl Default for LogProgress {
    fn default() -> Self { Self::new(10_000) }
}

impl Progress for LogProgress {
    fn report(&self, stage: Stage, done: usize, total: usize) {
        if done % self.every == 0 || done == total {
            tracing::info!(%stage, done, total, "[progress] {done}/{total}");
        }
    }
}
