#![forbid(unsafe_code)]

//! Headless force-directed graph simulation.
//!
//! `narwhal` steps a Verlet-integrated layout (spring links, gravity, Barnes-Hut charge
//! repulsion) over node storage owned by the caller. Nothing here schedules itself: an external
//! timer or animation loop calls [`Force::tick`] until it reports that the layout has cooled.
//!
//! [`Pausable`] wraps any [`Simulation`] and buffers `start`/`alpha` calls while paused, so
//! interactive editors can freeze a layout without losing the caller's intent.

pub mod error;
pub mod force;
pub mod graph;
pub mod pausable;
mod quadtree;
mod rng;

pub use error::{Error, Result};
pub use force::{Force, TickEvent};
pub use graph::{Body, BodyGraph, Edge, ForceGraph};
pub use pausable::{Pausable, Simulation};

/// Alpha applied by `resume` (and therefore by `start`).
pub const DEFAULT_ALPHA: f64 = 0.1;
