//! One-slot in-flight frame gate.
//!
//! The tick thread acquires the token before recording GPU work; the GPU
//! completion callback releases it, usually from a different thread. At most
//! one frame of GPU work is ever outstanding.

use std::sync::{Arc, Condvar, Mutex};

/// Two-state gate: Idle (token free) or InFlight (token held). Cloning
/// shares the underlying token, so a clone can be moved into a completion
/// callback and released from whatever thread the callback runs on.
#[derive(Debug, Clone)]
pub struct FramePacer {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    held: Mutex<bool>,
    freed: Condvar,
}

impl FramePacer {
    /// A new pacer starts Idle.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                held: Mutex::new(false),
                freed: Condvar::new(),
            }),
        }
    }

    /// Block the calling thread until the token is free, then take it.
    pub fn acquire(&self) {
        let mut held = self.inner.held.lock().expect("pacer lock poisoned");
        while *held {
            held = self.inner.freed.wait(held).expect("pacer lock poisoned");
        }
        *held = true;
    }

    /// Take the token if it is free. Never blocks.
    pub fn try_acquire(&self) -> bool {
        let mut held = self.inner.held.lock().expect("pacer lock poisoned");
        if *held {
            false
        } else {
            *held = true;
            true
        }
    }

    /// Return the token. Safe to call from any thread. Releasing an already
    /// free token is a no-op so the fallback release path cannot wedge the
    /// gate the other way.
    pub fn release(&self) {
        let mut held = self.inner.held.lock().expect("pacer lock poisoned");
        *held = false;
        self.inner.freed.notify_one();
    }

    /// Whether the token is currently free (test observability).
    pub fn is_free(&self) -> bool {
        !*self.inner.held.lock().expect("pacer lock poisoned")
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new()
    }
}
