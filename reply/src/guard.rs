//! Revocable guards for continuations that may outlive the context that started them.
//!
//! A [`GuardScope`] owns a token; every [`Guard`] handed out holds only a weak reference to it.
//! Invalidating the scope (or dropping it) swaps the token out, so every outstanding guard goes
//! dead at once and continuations wrapped by them become no-ops.

use std::sync::Arc;
use std::sync::Weak;

#[derive(Debug)]
pub struct GuardScope {
    token: Arc<()>,
}

impl GuardScope {
    pub fn new() -> Self {
        Self {
            token: Arc::new(()),
        }
    }

    pub fn guard(&self) -> Guard {
        Guard {
            token: Arc::downgrade(&self.token),
        }
    }

    /// Kill every guard handed out so far. Guards created afterwards are alive.
    pub fn invalidate(&mut self) {
        self.token = Arc::new(());
    }
}

impl Default for GuardScope {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct Guard {
    token: Weak<()>,
}

impl Guard {
    pub fn is_alive(&self) -> bool {
        self.token.strong_count() > 0
    }

    /// Wrap `f` so it only runs while this guard is alive.
    ///
    /// When the guard is dead at call time, `f` is dropped without running.
    pub fn wrap<A, F>(self, f: F) -> impl FnOnce(A)
    where
        F: FnOnce(A),
    {
        move |arg| {
            if self.is_alive() {
                f(arg);
            }
        }
    }
}
