//! Geometric constraints layered on top of each force tick.
//!
//! Three passes run in a fixed order: line monotonicity, time-axis attraction, then
//! octilinearity, so the angular correction sees positions already adjusted by the first two.
//! Each pass blends nodes a fraction `k` of the way toward their constrained position, where
//! `k` comes from that pass's [`StrengthScale`] at the current alpha.

use crate::config::Tunables;
use crate::directions::DirectionSet;
use crate::error::ConfigError;
use crate::geom::{Point, Vector, centroid, norm, point, scale};
use crate::scale::{StrengthScale, TimeScale};
use crate::topology::Topology;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraints {
    pub octo: StrengthScale,
    pub mono: StrengthScale,
    pub time: StrengthScale,
    pub directions: DirectionSet,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            octo: StrengthScale::new([0.0, 1.0]).unwrap_or_else(|_| StrengthScale::disabled()),
            mono: StrengthScale::disabled(),
            time: StrengthScale::disabled(),
            directions: DirectionSet::Octilinear,
        }
    }
}

impl Constraints {
    pub fn from_tunables(tunables: &Tunables) -> Result<Self, ConfigError> {
        Ok(Self {
            octo: StrengthScale::new(tunables.octoforce)?,
            mono: StrengthScale::new(tunables.monoforce)?,
            time: StrengthScale::new(tunables.timeforce)?,
            directions: tunables.directions,
        })
    }
}

/// The blend factors one application used.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Strengths {
    pub mono: f64,
    pub time: f64,
    pub octo: f64,
}

/// Runs all three passes over `topology` at `alpha`.
///
/// The time pass needs `time_scale`; without one it is skipped.
pub fn apply(
    topology: &mut Topology,
    alpha: f64,
    constraints: &Constraints,
    time_scale: Option<&TimeScale>,
) -> Strengths {
    let strengths = Strengths {
        mono: constraints.mono.strength(alpha),
        time: constraints.time.strength(alpha),
        octo: constraints.octo.strength(alpha),
    };
    if strengths.mono != 0.0 {
        monotonic(topology, strengths.mono);
    }
    if let Some(ts) = time_scale.filter(|_| strengths.time != 0.0) {
        time_axis(topology, strengths.time, ts);
    }
    if strengths.octo != 0.0 {
        octilinear(topology, strengths.octo, constraints.directions);
    }
    tracing::trace!(
        alpha,
        mono = strengths.mono,
        time = strengths.time,
        octo = strengths.octo,
        "constraints applied"
    );
    strengths
}

/// Pulls consecutive stops of every line together on each axis where they are out of order.
/// Pairs already in order are left alone.
pub fn monotonic(topology: &mut Topology, k: f64) {
    let routes = topology.routes().to_vec();
    for route in &routes {
        for pair in route.windows(2) {
            let (ia, ib) = (pair[0], pair[1]);
            if ia == ib {
                continue;
            }
            let (Some(a), Some(b)) = (topology.node_at(ia), topology.node_at(ib)) else {
                continue;
            };
            let (mut ax, mut ay, mut bx, mut by) = (a.x, a.y, b.x, b.y);
            if ax > bx {
                let d = (ax - bx) / 2.0 * k;
                ax -= d;
                bx += d;
            }
            if ay > by {
                let d = (ay - by) / 2.0 * k;
                ay -= d;
                by += d;
            }
            set_position(topology, ia, point(ax, ay));
            set_position(topology, ib, point(bx, by));
        }
    }
}

/// Pulls every dated, non-dummy node toward the x its date maps to.
pub fn time_axis(topology: &mut Topology, k: f64, time_scale: &TimeScale) {
    for n in topology.nodes.values_mut().filter(|n| !n.is_dummy()) {
        if let Some(date) = n.date {
            let target = time_scale.x(date);
            n.x -= (n.x - target) * k;
        }
    }
}

/// Rotates every link toward the best-aligned direction of `directions`, keeping its length.
///
/// A pinned endpoint stays put and the other end swings around it; otherwise both ends move
/// around the link's midpoint.
pub fn octilinear(topology: &mut Topology, k: f64, directions: DirectionSet) {
    let edges = topology.edge_indices().to_vec();
    for e in &edges {
        if e.source == e.target {
            continue;
        }
        let (Some(s), Some(t)) = (topology.node_at(e.source), topology.node_at(e.target)) else {
            continue;
        };
        let (sp, tp) = (s.position(), t.position());
        let v = tp - sp;
        let dir = directions.snap(v);

        if s.fixed && !t.fixed {
            let goal = sp + scale(norm(v), dir);
            blend(topology, e.target, tp, goal, k);
        } else if t.fixed && !s.fixed {
            let goal = tp - scale(norm(v), dir);
            blend(topology, e.source, sp, goal, k);
        } else {
            let ray: Vector = scale(norm(v) / 2.0, dir);
            let center = centroid(&[sp, tp]).unwrap_or(sp);
            blend(topology, e.source, sp, center - ray, k);
            blend(topology, e.target, tp, center + ray, k);
        }
    }
}

fn blend(topology: &mut Topology, index: usize, from: Point, goal: Point, k: f64) {
    set_position(topology, index, from + (goal - from) * k);
}

fn set_position(topology: &mut Topology, index: usize, p: Point) {
    if let Some(n) = topology.node_at_mut(index) {
        n.x = p.x;
        n.y = p.y;
    }
}
