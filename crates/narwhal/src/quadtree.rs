use crate::graph::Body;
use crate::rng::XorShift64Star;

/// Points closer than this (in Manhattan distance) are pushed into a child quad instead of
/// splitting the current one.
const COINCIDENT_DISTANCE: f64 = 0.01;

#[derive(Debug, Clone)]
struct Quad {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    leaf: bool,
    point: Option<usize>,
    children: [Option<usize>; 4],
    // Accumulated (alpha-scaled) charge and its center.
    charge: f64,
    point_charge: f64,
    cx: f64,
    cy: f64,
}

impl Quad {
    fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            leaf: true,
            point: None,
            children: [None; 4],
            charge: 0.0,
            point_charge: 0.0,
            cx: 0.0,
            cy: 0.0,
        }
    }
}

/// Barnes-Hut quadtree over body positions.
///
/// Internal quads may still carry a point: coincident points are stacked into children without
/// evicting the resident point.
#[derive(Debug, Clone)]
pub(crate) struct QuadTree {
    quads: Vec<Quad>,
}

impl QuadTree {
    pub(crate) fn build(bodies: &[Body]) -> Self {
        let mut x1 = f64::INFINITY;
        let mut y1 = f64::INFINITY;
        let mut x2 = f64::NEG_INFINITY;
        let mut y2 = f64::NEG_INFINITY;
        for b in bodies.iter().filter(|b| b.x.is_finite() && b.y.is_finite()) {
            x1 = x1.min(b.x);
            y1 = y1.min(b.y);
            x2 = x2.max(b.x);
            y2 = y2.max(b.y);
        }
        if !(x1.is_finite() && y1.is_finite()) {
            return Self {
                quads: vec![Quad::new(0.0, 0.0, 0.0, 0.0)],
            };
        }

        // Squarify.
        let dx = x2 - x1;
        let dy = y2 - y1;
        if dx > dy {
            y2 = y1 + dx;
        } else {
            x2 = x1 + dy;
        }

        let mut tree = Self {
            quads: vec![Quad::new(x1, y1, x2, y2)],
        };
        for (idx, b) in bodies.iter().enumerate() {
            if b.x.is_finite() && b.y.is_finite() {
                tree.insert(0, idx, bodies, x1, y1, x2, y2);
            }
        }
        tree
    }

    #[allow(clippy::too_many_arguments)]
    fn insert(
        &mut self,
        quad: usize,
        idx: usize,
        bodies: &[Body],
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    ) {
        if !self.quads[quad].leaf {
            self.insert_child(quad, idx, bodies, x1, y1, x2, y2);
            return;
        }
        match self.quads[quad].point {
            None => self.quads[quad].point = Some(idx),
            Some(resident) => {
                let (nx, ny) = (bodies[resident].x, bodies[resident].y);
                let (x, y) = (bodies[idx].x, bodies[idx].y);
                if (nx - x).abs() + (ny - y).abs() < COINCIDENT_DISTANCE {
                    self.insert_child(quad, idx, bodies, x1, y1, x2, y2);
                } else {
                    self.quads[quad].point = None;
                    self.insert_child(quad, resident, bodies, x1, y1, x2, y2);
                    self.insert_child(quad, idx, bodies, x1, y1, x2, y2);
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn insert_child(
        &mut self,
        quad: usize,
        idx: usize,
        bodies: &[Body],
        mut x1: f64,
        mut y1: f64,
        mut x2: f64,
        mut y2: f64,
    ) {
        let sx = (x1 + x2) / 2.0;
        let sy = (y1 + y2) / 2.0;
        let right = bodies[idx].x >= sx;
        let bottom = bodies[idx].y >= sy;
        let slot = ((bottom as usize) << 1) | (right as usize);

        if right {
            x1 = sx;
        } else {
            x2 = sx;
        }
        if bottom {
            y1 = sy;
        } else {
            y2 = sy;
        }

        self.quads[quad].leaf = false;
        let child = match self.quads[quad].children[slot] {
            Some(c) => c,
            None => {
                let c = self.quads.len();
                self.quads.push(Quad::new(x1, y1, x2, y2));
                self.quads[quad].children[slot] = Some(c);
                c
            }
        };
        self.insert(child, idx, bodies, x1, y1, x2, y2);
    }

    /// Accumulates charge `k` (already scaled by alpha) per point and computes each quad's
    /// center of charge. Points resident in internal quads are jittered to break coincidence.
    pub(crate) fn accumulate(&mut self, bodies: &mut [Body], k: f64, rng: &mut XorShift64Star) {
        self.accumulate_quad(0, bodies, k, rng);
    }

    fn accumulate_quad(
        &mut self,
        quad: usize,
        bodies: &mut [Body],
        k: f64,
        rng: &mut XorShift64Star,
    ) {
        let mut cx = 0.0;
        let mut cy = 0.0;
        let mut charge = 0.0;

        let leaf = self.quads[quad].leaf;
        if !leaf {
            let children = self.quads[quad].children;
            for child in children.into_iter().flatten() {
                self.accumulate_quad(child, bodies, k, rng);
                let c = &self.quads[child];
                if c.charge != 0.0 {
                    charge += c.charge;
                    cx += c.charge * c.cx;
                    cy += c.charge * c.cy;
                }
            }
        }

        if let Some(p) = self.quads[quad].point {
            if !leaf {
                bodies[p].x += rng.next_jitter();
                bodies[p].y += rng.next_jitter();
            }
            self.quads[quad].point_charge = k;
            charge += k;
            cx += k * bodies[p].x;
            cy += k * bodies[p].y;
        }

        let q = &mut self.quads[quad];
        q.charge = charge;
        q.cx = cx / charge;
        q.cy = cy / charge;
    }

    /// Applies repulsion from every other point to `bodies[node]`, writing into its previous
    /// position so integration turns it into velocity.
    pub(crate) fn repulse(&self, node: usize, bodies: &mut [Body], theta: f64) {
        let (x, y) = (bodies[node].x, bodies[node].y);
        let mut stack: Vec<usize> = vec![0];
        while let Some(qi) = stack.pop() {
            let quad = &self.quads[qi];
            if quad.point != Some(node) {
                let dx = quad.cx - x;
                let dy = quad.cy - y;
                let dn = 1.0 / (dx * dx + dy * dy).sqrt();

                if (quad.x2 - quad.x1) * dn < theta {
                    let k = quad.charge * dn * dn;
                    bodies[node].px -= dx * k;
                    bodies[node].py -= dy * k;
                    continue;
                }

                if let Some(p) = quad.point {
                    if dn.is_finite() {
                        let pdx = bodies[p].x - x;
                        let pdy = bodies[p].y - y;
                        let pdn = 1.0 / (pdx * pdx + pdy * pdy).sqrt();
                        if pdn.is_finite() {
                            let k = quad.point_charge * pdn * pdn;
                            bodies[node].px -= pdx * k;
                            bodies[node].py -= pdy * k;
                        }
                    }
                }
            }
            if quad.charge != 0.0 {
                stack.extend(quad.children.iter().flatten().copied());
            }
        }
    }
}
