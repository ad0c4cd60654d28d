use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::trace;

/// A write that was armed and has not fired, been cancelled or superseded.
#[derive(Debug)]
struct PendingWrite {
    generation: u64,
    token: CancellationToken,
}

/// Timer armed by [`PersistScheduler::arm`]; the caller sleeps for `window`
/// unless `token` is cancelled first.
#[derive(Debug, Clone)]
pub(crate) struct ArmedWrite {
    pub(crate) generation: u64,
    pub(crate) window: Duration,
    pub(crate) token: CancellationToken,
}

/// Debounce bookkeeping for persisted writes.
///
/// Pure state: spawning the timer and performing the write is left to the
/// store, which owns the runtime handle and the backend. Every update cancels
/// the pending write; if a persisted key changed since the last write, a new
/// one is armed, so only a full quiet window issues a write.
#[derive(Debug)]
pub(crate) struct PersistScheduler {
    window: Duration,
    generation: u64,
    pending: Option<PendingWrite>,
    /// A persisted key changed and that change has not been written yet
    dirty: bool,
}

impl PersistScheduler {
    pub(crate) fn new(window: Duration) -> Self {
        Self {
            window,
            generation: 0,
            pending: None,
            dirty: false,
        }
    }

    /// Cancel the pending write, if any.
    pub(crate) fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            trace!(generation = pending.generation, "Pending persist cancelled");
            pending.token.cancel();
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    #[inline]
    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[cfg(test)]
    #[inline]
    pub(crate) fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Replace any pending write with a fresh one. Returns `None` while no
    /// persisted key is waiting to be written.
    pub(crate) fn arm(&mut self) -> Option<ArmedWrite> {
        self.cancel();
        if !self.dirty {
            return None;
        }

        self.generation += 1;
        let token = CancellationToken::new();
        self.pending = Some(PendingWrite {
            generation: self.generation,
            token: token.clone(),
        });

        trace!(generation = self.generation, window = ?self.window, "Persist armed");
        Some(ArmedWrite {
            generation: self.generation,
            window: self.window,
            token,
        })
    }

    /// Claim the write for a timer that just fired. Only the most recently
    /// armed timer may claim it; stale or cancelled timers get `false`.
    pub(crate) fn settle(
        &mut self,
        generation: u64,
    ) -> bool {
        match &self.pending {
            Some(pending) if pending.generation == generation && !pending.token.is_cancelled() => {
                self.pending = None;
                self.dirty = false;
                true
            }
            _ => false,
        }
    }

    /// Claim whatever is outstanding right now, cancelling the timer.
    /// Returns `false` when nothing needs writing.
    pub(crate) fn settle_now(&mut self) -> bool {
        self.cancel();
        std::mem::replace(&mut self.dirty, false)
    }
}
