#![forbid(unsafe_code)]

//! Interactive metro-map layout for story collections.
//!
//! A metro map draws narrative threads as transit lines: stories are stations, threads are
//! lines, and each link between consecutive stations is pulled toward one of a small set of
//! angles. Layout is a [`narwhal`] force simulation with three constraint passes applied after
//! every tick (line monotonicity, time-axis attraction and octilinearity), wrapped in a
//! pausable controller with EDIT and VIEW modes.
//!
//! ```no_run
//! use metromap::{Line, Link, MetroMap, Node, Topology};
//!
//! let topology = Topology::new(
//!     vec![Node::new("a", 0.0, 0.0), Node::new("b", 10.0, 3.0)],
//!     vec![Link::new("ab", "a", "b").on_lines(["red"])],
//!     vec![Line::new("red", ["a", "b"])],
//! )?;
//! let mut map = MetroMap::new(topology);
//! map.start();
//! map.run(1000)?;
//! # Ok::<(), metromap::Error>(())
//! ```

pub mod config;
pub mod constraints;
pub mod directions;
mod edit;
pub mod error;
pub mod event;
pub mod geom;
pub mod map;
pub mod model;
pub mod render;
pub mod scale;
pub mod state;
pub mod svg;
pub mod topology;

pub use config::Tunables;
pub use constraints::{Constraints, Strengths};
pub use directions::DirectionSet;
pub use error::{ConfigError, Error, Result, StateError, TopologyError};
pub use event::{PointerEvent, Target};
pub use map::{MetroMap, Mode, Tick};
pub use model::{Line, Link, Node, NodeKind};
pub use render::{NullRenderer, Renderer, Scene};
pub use scale::{LinearScale, StrengthScale, TimeScale};
pub use state::MetroState;
pub use svg::SvgRenderer;
pub use topology::Topology;
