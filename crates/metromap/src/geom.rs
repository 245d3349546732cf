//! 2D vector primitives used by the constraint passes.

pub type Unit = euclid::UnknownUnit;

pub type Point = euclid::Point2D<f64, Unit>;
pub type Vector = euclid::Vector2D<f64, Unit>;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}

pub fn vector(x: f64, y: f64) -> Vector {
    euclid::vec2(x, y)
}

pub fn dot(a: Vector, b: Vector) -> f64 {
    a.dot(b)
}

/// Euclidean length.
pub fn norm(v: Vector) -> f64 {
    v.length()
}

pub fn scale(k: f64, v: Vector) -> Vector {
    v * k
}

/// Displacement from `from` to `to`.
pub fn between(from: Point, to: Point) -> Vector {
    to - from
}

/// Mean of `points`; `None` when empty.
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(point(sx / n, sy / n))
}

/// The candidate with the largest projection onto `v`. Ties keep the earliest candidate.
pub fn max_projection(candidates: &[Vector], v: Vector) -> Option<Vector> {
    let mut best: Option<(Vector, f64)> = None;
    for &c in candidates {
        let p = dot(c, v);
        match best {
            Some((_, bp)) if p <= bp => {}
            _ => best = Some((c, p)),
        }
    }
    best.map(|(c, _)| c)
}
