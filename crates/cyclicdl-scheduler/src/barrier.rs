//! Reusable rendezvous for the startup protocol.
//!
//! Like [`std::sync::Barrier`], but a participant that will never arrive
//! can [`leave`](PhaseBarrier::leave), which shrinks the party count so
//! the others are not stranded.

use parking_lot::{Condvar, Mutex};

#[derive(Debug)]
struct State {
    parties: usize,
    arrived: usize,
    generation: u64,
}

/// N-party barrier that resets after each release.
#[derive(Debug)]
pub struct PhaseBarrier {
    state: Mutex<State>,
    released: Condvar,
}

impl PhaseBarrier {
    /// Barrier for `parties` participants.
    pub fn new(parties: usize) -> Self {
        Self {
            state: Mutex::new(State {
                parties,
                arrived: 0,
                generation: 0,
            }),
            released: Condvar::new(),
        }
    }

    /// Block until every remaining participant has called `wait` for the
    /// current phase. Returns true for exactly one caller per phase.
    pub fn wait(&self) -> bool {
        let mut state = self.state.lock();
        let generation = state.generation;
        state.arrived += 1;
        if state.arrived >= state.parties {
            Self::release(&mut state);
            self.released.notify_all();
            return true;
        }
        while state.generation == generation {
            self.released.wait(&mut state);
        }
        false
    }

    /// Withdraw one participant for good.
    pub fn leave(&self) {
        let mut state = self.state.lock();
        state.parties = state.parties.saturating_sub(1);
        if state.arrived > 0 && state.arrived >= state.parties {
            Self::release(&mut state);
            self.released.notify_all();
        }
    }

    /// Participants still expected per phase.
    pub fn parties(&self) -> usize {
        self.state.lock().parties
    }

    fn release(state: &mut State) {
        state.arrived = 0;
        state.generation = state.generation.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use super::*;

    #[test]
    fn test_single_party_never_blocks() {
        let barrier = PhaseBarrier::new(1);
        assert!(barrier.wait());
        assert!(barrier.wait());
    }

    #[test]
    fn test_reusable_across_phases() {
        let parties = 4;
        let barrier = Arc::new(PhaseBarrier::new(parties));
        let counter = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..parties)
            .map(|_| {
                let barrier = Arc::clone(&barrier);
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    let mut leaders = 0;
                    for phase in 0..3 {
                        counter.fetch_add(1, Ordering::SeqCst);
                        if barrier.wait() {
                            leaders += 1;
                        }
                        // Every participant of this phase has incremented.
                        assert!(counter.load(Ordering::SeqCst) >= (phase + 1) * parties);
                        barrier.wait();
                    }
                    leaders
                })
            })
            .collect();

        let mut leaders = 0;
        for handle in handles {
            match handle.join() {
                Ok(n) => leaders += n,
                Err(_) => panic!("participant panicked"),
            }
        }
        assert_eq!(leaders, 3);
    }

    #[test]
    fn test_leave_releases_waiters() {
        let barrier = Arc::new(PhaseBarrier::new(3));
        let waiter = {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || barrier.wait())
        };

        barrier.leave();
        // Two parties remain; this arrival completes the phase.
        barrier.wait();
        assert!(waiter.join().is_ok());
        assert_eq!(barrier.parties(), 2);
    }

    #[test]
    fn test_leave_completes_phase_already_full() {
        let barrier = Arc::new(PhaseBarrier::new(2));
        let waiter = {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || barrier.wait())
        };
        // Give the waiter a chance to arrive; either ordering must finish.
        thread::yield_now();
        barrier.leave();
        assert!(waiter.join().is_ok());
    }
}
