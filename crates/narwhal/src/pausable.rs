//! Pause/resume wrapper for force layouts.
//!
//! Editing code often tweaks a parameter and then calls `start`/`resume`/`set_alpha`. When the
//! layout has been paused those calls must not make it jump or run; instead they are buffered
//! and replayed exactly once when the layout is unpaused.

use crate::DEFAULT_ALPHA;
use crate::error::Result;
use crate::force::{Force, TickEvent};
use crate::graph::ForceGraph;

/// The control surface shared by force layouts and their wrappers.
pub trait Simulation {
    fn alpha(&self) -> f64;
    fn set_alpha(&mut self, alpha: f64);
    fn start(&mut self);

    fn stop(&mut self) {
        self.set_alpha(0.0);
    }

    fn resume(&mut self) {
        self.set_alpha(DEFAULT_ALPHA);
    }
}

#[derive(Debug, Clone, Default)]
pub struct Pausable<S> {
    inner: S,
    paused: bool,
    pending_alpha: f64,
    pending_start: bool,
}

impl<S: Simulation> Pausable<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            paused: false,
            pending_alpha: 0.0,
            pending_start: false,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pauses or unpauses. Setting the current value again is a no-op.
    pub fn set_paused(&mut self, paused: bool) {
        if paused == self.paused {
            return;
        }
        if paused {
            self.pending_alpha = self.inner.alpha();
            self.pending_start = false;
            self.inner.stop();
            self.paused = true;
            tracing::debug!(alpha = self.pending_alpha, "simulation paused");
        } else {
            // Cleared first so the replayed calls reach the inner simulation.
            self.paused = false;
            if std::mem::take(&mut self.pending_start) {
                self.inner.start();
            }
            self.inner.set_alpha(self.pending_alpha);
            tracing::debug!(alpha = self.pending_alpha, "simulation unpaused");
        }
    }

    pub fn has_pending_start(&self) -> bool {
        self.paused && self.pending_start
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Direct access to the wrapped simulation; calls made through it bypass buffering.
    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }
}

impl Pausable<Force> {
    /// Ticks are never intercepted: a paused layout has alpha 0 and ticks as a no-op.
    pub fn tick<G: ForceGraph + ?Sized>(&mut self, graph: &mut G) -> Result<Option<TickEvent>> {
        self.inner.tick(graph)
    }
}

impl<S: Simulation> Simulation for Pausable<S> {
    fn alpha(&self) -> f64 {
        if self.paused {
            self.pending_alpha
        } else {
            self.inner.alpha()
        }
    }

    fn set_alpha(&mut self, alpha: f64) {
        if self.paused {
            self.pending_alpha = alpha;
        } else {
            self.inner.set_alpha(alpha);
        }
    }

    fn start(&mut self) {
        if self.paused {
            self.pending_start = true;
            self.pending_alpha = DEFAULT_ALPHA;
        } else {
            self.inner.start();
        }
    }

    fn stop(&mut self) {
        if self.paused {
            self.pending_alpha = 0.0;
        } else {
            self.inner.stop();
        }
    }

    fn resume(&mut self) {
        if self.paused {
            self.pending_alpha = DEFAULT_ALPHA;
        } else {
            self.inner.resume();
        }
    }
}
