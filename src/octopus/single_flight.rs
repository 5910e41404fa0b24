//! A once-only, coalescing initializer for one cached value.
//!
//! [`SingleFlight`] holds a value that is expensive to build and must be built
//! at most once at a time:
//!
//! - Once a value is stored, [`SingleFlight::get_or_try_init`] returns it
//!   straight from a `OnceCell`; the construction lock is never touched again.
//! - While an attempt is running, every other caller blocks and receives that
//!   attempt's outcome, success or failure, instead of starting its own.
//! - A failed attempt stores nothing. The next caller to arrive after it has
//!   finished starts a fresh attempt.
//! - If the initializer panics, blocked callers are released with an
//!   `Internal` error and the slot stays empty.

use crate::error::{OctoError, Result};
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

pub struct SingleFlight<T> {
    value: OnceCell<T>,
    flight: Mutex<Option<Arc<Flight<T>>>>,
}

struct Flight<T> {
    outcome: Mutex<Option<Result<T>>>,
    landed: Condvar,
    waiting: AtomicUsize,
}

enum Role<T> {
    Leader(Arc<Flight<T>>),
    Follower(Arc<Flight<T>>),
}

impl<T: Clone> Default for SingleFlight<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> SingleFlight<T> {
    pub fn new() -> Self {
        Self {
            value: OnceCell::new(),
            flight: Mutex::new(None),
        }
    }

    /// The stored value, if an attempt has succeeded.
    pub fn get(&self) -> Option<&T> {
        self.value.get()
    }

    pub fn get_or_try_init<F>(&self, init: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        if let Some(value) = self.value.get() {
            return Ok(value.clone());
        }

        let role = {
            let mut slot = lock(&self.flight);
            // Re-check under the lock: a leader may have landed in between.
            if let Some(value) = self.value.get() {
                return Ok(value.clone());
            }
            match slot.as_ref() {
                Some(flight) => Role::Follower(Arc::clone(flight)),
                None => {
                    let flight = Arc::new(Flight::new());
                    *slot = Some(Arc::clone(&flight));
                    Role::Leader(flight)
                }
            }
        };

        match role {
            Role::Follower(flight) => flight.wait(),
            Role::Leader(flight) => {
                let mut landing = Landing {
                    owner: self,
                    flight: flight.as_ref(),
                    landed: false,
                };
                let outcome = init();
                landing.land(outcome.clone());
                outcome
            }
        }
    }

    #[cfg(test)]
    fn waiting(&self) -> Option<usize> {
        lock(&self.flight)
            .as_ref()
            .map(|flight| flight.waiting.load(Ordering::SeqCst))
    }
}

impl<T: Clone> Flight<T> {
    fn new() -> Self {
        Self {
            outcome: Mutex::new(None),
            landed: Condvar::new(),
            waiting: AtomicUsize::new(0),
        }
    }

    fn wait(&self) -> Result<T> {
        self.waiting.fetch_add(1, Ordering::SeqCst);
        let mut outcome = lock(&self.outcome);
        loop {
            if let Some(result) = outcome.as_ref() {
                return result.clone();
            }
            outcome = self
                .landed
                .wait(outcome)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn complete(&self, result: Result<T>) {
        *lock(&self.outcome) = Some(result);
        self.landed.notify_all();
    }
}

/// Publishes the leader's outcome, including when the initializer unwinds.
struct Landing<'a, T: Clone> {
    owner: &'a SingleFlight<T>,
    flight: &'a Flight<T>,
    landed: bool,
}

impl<T: Clone> Landing<'_, T> {
    fn land(&mut self, outcome: Result<T>) {
        {
            let mut slot = lock(&self.owner.flight);
            if let Ok(value) = &outcome {
                let _ = self.owner.value.set(value.clone());
            }
            *slot = None;
        }
        self.flight.complete(outcome);
        self.landed = true;
    }
}

impl<T: Clone> Drop for Landing<'_, T> {
    fn drop(&mut self) {
        if !self.landed {
            self.land(Err(OctoError::Internal(
                "client construction panicked".to_string(),
            )));
        }
    }
}

fn lock<M>(mutex: &Mutex<M>) -> MutexGuard<'_, M> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
