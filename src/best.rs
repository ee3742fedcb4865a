//! Shared best-known clique state.
//!
//! Exactly three pieces of cross-thread mutable state exist during a
//! search: the monotone best size `mc` (atomic), the `found_ub` latch
//! (atomic, set once), and the witness vector (one mutex, held only for a
//! swap). Workers read `mc` lock-free; publications are linearized by the
//! mutex, so a worker that has observed `mc >= k` can never be superseded
//! by a clique of size `<= k`.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

// ============================================================================
// BestState
// ============================================================================

/// The best clique found so far, shared by all workers.
#[derive(Debug)]
pub struct BestState {
    mc: AtomicUsize,
    found_ub: AtomicBool,
    witness: Mutex<Vec<u32>>,
    param_ub: usize,
}

impl BestState {
    /// Creates a state seeded with the caller's lower bound.
    ///
    /// The witness starts empty; it tracks `mc` from the first successful
    /// publish onward. `param_ub` is the early-exit threshold: reaching it
    /// latches [`found_ub`](Self::found_ub).
    pub fn new(lb: usize, param_ub: usize) -> Self {
        Self {
            mc: AtomicUsize::new(lb),
            found_ub: AtomicBool::new(param_ub != 0 && lb >= param_ub),
            witness: Mutex::new(Vec::new()),
            param_ub,
        }
    }

    /// Lock-free snapshot of the best size.
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.mc.load(Ordering::Acquire)
    }

    /// Whether some worker reached the early-exit threshold.
    #[inline(always)]
    pub fn found_ub(&self) -> bool {
        self.found_ub.load(Ordering::Acquire)
    }

    /// The early-exit threshold this state was built with.
    #[inline(always)]
    pub fn param_ub(&self) -> usize {
        self.param_ub
    }

    /// Attempts to install `candidate` as the new best clique.
    ///
    /// Succeeds only on a strict improvement, checked again under the
    /// lock: a stale caller that lost the race leaves the state untouched.
    /// On success the candidate vector is swapped into the witness slot
    /// (the caller gets the old witness back in its buffer) and `found_ub`
    /// latches when the new size reaches `param_ub`.
    pub fn try_publish(&self, candidate: &mut Vec<u32>) -> bool {
        let mut witness = self
            .witness
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if candidate.len() <= self.mc.load(Ordering::Relaxed) {
            return false;
        }
        std::mem::swap(&mut *witness, candidate);
        let size = witness.len();
        self.mc.store(size, Ordering::Release);
        if size >= self.param_ub {
            self.found_ub.store(true, Ordering::Release);
        }
        true
    }

    /// Runs `f` while holding the witness mutex.
    ///
    /// The prune mask may only be written inside this scope; see
    /// [`crate::prune`].
    pub fn locked<R>(&self, f: impl FnOnce() -> R) -> R {
        let _witness = self
            .witness
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f()
    }

    /// Clones the current witness.
    pub fn witness(&self) -> Vec<u32> {
        self.witness
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Consumes the state, returning `(mc, witness)`.
    pub fn into_result(self) -> (usize, Vec<u32>) {
        let witness = self
            .witness
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        (self.mc.into_inner(), witness)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn publish_requires_strict_improvement() {
        let best = BestState::new(2, 10);

        let mut tie = vec![0, 1];
        assert!(!best.try_publish(&mut tie), "a tie must not publish");
        assert_eq!(best.size(), 2);

        let mut better = vec![0, 1, 2];
        assert!(best.try_publish(&mut better));
        assert_eq!(best.size(), 3);
        assert_eq!(best.witness(), vec![0, 1, 2]);
    }

    #[test]
    fn publish_swaps_buffers() {
        let best = BestState::new(0, 10);
        let mut first = vec![4, 5];
        assert!(best.try_publish(&mut first));
        assert!(first.is_empty(), "caller receives the previous witness");

        let mut second = vec![1, 2, 3];
        assert!(best.try_publish(&mut second));
        assert_eq!(second, vec![4, 5]);
        assert_eq!(best.witness(), vec![1, 2, 3]);
    }

    #[test]
    fn found_ub_latches_at_threshold() {
        let best = BestState::new(0, 3);
        assert!(!best.found_ub());

        let mut c = vec![0, 1];
        best.try_publish(&mut c);
        assert!(!best.found_ub());

        let mut c = vec![0, 1, 2];
        best.try_publish(&mut c);
        assert!(best.found_ub());
    }

    #[test]
    fn lb_at_param_ub_latches_immediately() {
        let best = BestState::new(4, 4);
        assert!(best.found_ub());
    }

    #[test]
    fn size_never_decreases_under_contention() {
        let best = Arc::new(BestState::new(0, usize::MAX));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let best = Arc::clone(&best);
                thread::spawn(move || {
                    for len in 1..=64u32 {
                        let mut candidate: Vec<u32> = (0..len).collect();
                        let before = best.size();
                        best.try_publish(&mut candidate);
                        let after = best.size();
                        assert!(after >= before, "thread {t}: size went backwards");
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(best.size(), 64);
        assert_eq!(best.witness().len(), 64);
    }

    #[test]
    fn into_result_returns_final_pair() {
        let best = BestState::new(0, 10);
        let mut c = vec![7, 8, 9];
        best.try_publish(&mut c);
        let (mc, witness) = best.into_result();
        assert_eq!(mc, 3);
        assert_eq!(witness, vec![7, 8, 9]);
    }
}
