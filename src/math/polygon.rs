//! Planar polygon kernel: offset, union, and difference on simple polygons.
//!
//! Wraps the clipper2 library. Orientation convention throughout the
//! engine: positive signed area = outer boundary, negative = hole.
//! Degenerate rings (fewer than 3 points) are filtered before clipping and
//! output fragments below [`AREA_EPSILON`] are discarded as numerical
//! noise, so repeated offset+difference passes stay clean.

use clipper2::{EndType, FillRule, JoinType, Paths};
use glam::Vec2;

/// Output rings with |area| below this (plan units squared) are noise.
pub const AREA_EPSILON: f32 = 1.0;

/// Corner treatment for [`offset`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinStyle {
    Miter,
    Round,
}

/// A 2D polygon ring in plan space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygon2 {
    pub points: Vec<Vec2>,
}

impl Polygon2 {
    pub fn new(points: Vec<Vec2>) -> Self {
        Self { points }
    }

    /// Shoelace signed area. Positive for counter-clockwise rings.
    pub fn signed_area(&self) -> f32 {
        if self.points.len() < 3 {
            return 0.0;
        }
        let mut area = 0.0;
        for i in 0..self.points.len() {
            let a = self.points[i];
            let b = self.points[(i + 1) % self.points.len()];
            area += a.x * b.y - b.x * a.y;
        }
        area * 0.5
    }

    /// Whether this ring is an outer boundary under the engine convention.
    pub fn is_outer(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// Degenerate rings cannot participate in clipping.
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 3 || self.signed_area().abs() < AREA_EPSILON
    }

    /// Vertex centroid.
    pub fn centroid(&self) -> Vec2 {
        if self.points.is_empty() {
            return Vec2::ZERO;
        }
        self.points.iter().copied().sum::<Vec2>() / self.points.len() as f32
    }

    /// Even-odd point-in-polygon test.
    pub fn contains_point(&self, p: Vec2) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[j];
            if (a.y > p.y) != (b.y > p.y)
                && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Remove consecutive duplicate points (zero-length edges), including
    /// a duplicated closing point.
    pub fn dedup_points(&self, epsilon: f32) -> Polygon2 {
        let mut out: Vec<Vec2> = Vec::with_capacity(self.points.len());
        for &p in &self.points {
            if out.last().is_none_or(|&q| p.distance(q) > epsilon) {
                out.push(p);
            }
        }
        if out.len() > 1 && out[0].distance(out[out.len() - 1]) <= epsilon {
            out.pop();
        }
        Polygon2::new(out)
    }

    /// Translate all points by an offset.
    pub fn translated(&self, offset: Vec2) -> Polygon2 {
        Polygon2::new(self.points.iter().map(|&p| p + offset).collect())
    }

    /// Force counter-clockwise winding.
    pub fn ensure_ccw(mut self) -> Polygon2 {
        if self.signed_area() < 0.0 {
            self.points.reverse();
        }
        self
    }

    /// Perpendicular distance from a point to the nearest boundary edge.
    pub fn distance_to_boundary(&self, p: Vec2) -> f32 {
        let n = self.points.len();
        if n < 2 {
            return 0.0;
        }
        let mut best = f32::INFINITY;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            best = best.min(point_segment_distance(p, a, b));
        }
        best
    }
}

/// Distance from point to line segment.
pub fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-12 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

// ---------------------------------------------------------------------------
// Clipper2 bridge
// ---------------------------------------------------------------------------

fn to_coords(polys: &[Polygon2]) -> Vec<Vec<(f64, f64)>> {
    polys
        .iter()
        .filter(|p| p.points.len() >= 3)
        .map(|p| {
            p.points
                .iter()
                .map(|v| (v.x as f64, v.y as f64))
                .collect()
        })
        .collect()
}

fn from_paths(paths: Paths) -> Vec<Polygon2> {
    let output: Vec<Vec<(f64, f64)>> = paths.into();
    let rings: Vec<Polygon2> = output
        .into_iter()
        .filter(|ring| ring.len() >= 3)
        .map(|ring| {
            Polygon2::new(
                ring.into_iter()
                    .map(|(x, y)| Vec2::new(x as f32, y as f32))
                    .collect(),
            )
        })
        .filter(|p| p.signed_area().abs() >= AREA_EPSILON)
        .collect();
    normalize_orientation(rings)
}

/// Rewind rings so nesting-even rings are CCW (outer, positive area) and
/// nesting-odd rings are CW (hole, negative area). Clipping libraries do
/// not all agree on output winding, so the engine convention is enforced
/// here rather than assumed.
fn normalize_orientation(mut rings: Vec<Polygon2>) -> Vec<Polygon2> {
    let probes: Vec<Vec2> = rings.iter().map(|r| r.points[0]).collect();
    for i in 0..rings.len() {
        let depth = rings
            .iter()
            .enumerate()
            .filter(|&(j, other)| j != i && other.contains_point(probes[i]))
            .count();
        let want_ccw = depth % 2 == 0;
        if rings[i].is_outer() != want_ccw {
            rings[i].points.reverse();
        }
    }
    rings
}

/// Offset polygons outward (positive) or inward (negative).
pub fn offset(polys: &[Polygon2], distance: f32, style: JoinStyle) -> Vec<Polygon2> {
    let coords = to_coords(polys);
    if coords.is_empty() {
        return Vec::new();
    }
    if distance.abs() < 1e-4 {
        return polys
            .iter()
            .filter(|p| !p.is_degenerate())
            .cloned()
            .collect();
    }
    let join = match style {
        JoinStyle::Miter => JoinType::Miter,
        JoinStyle::Round => JoinType::Round,
    };
    let paths: Paths = coords.into();
    let result = paths.inflate(distance as f64, join, EndType::Polygon, 2.0);
    from_paths(result)
}

/// Union an arbitrary set of polygons into disjoint outer rings and holes.
pub fn union_all(polys: &[Polygon2]) -> Vec<Polygon2> {
    let coords = to_coords(polys);
    if coords.is_empty() {
        return Vec::new();
    }
    let subject: Paths = coords.into();
    let clip: Paths = Vec::<Vec<(f64, f64)>>::new().into();
    match clipper2::union(subject, clip, FillRule::NonZero) {
        Ok(result) => from_paths(result),
        Err(e) => {
            log::warn!("polygon union failed, dropping input set: {e:?}");
            Vec::new()
        }
    }
}

/// Subtract `clip` polygons from `subject` polygons.
pub fn difference(subject: &[Polygon2], clip: &[Polygon2]) -> Vec<Polygon2> {
    let subject_coords = to_coords(subject);
    if subject_coords.is_empty() {
        return Vec::new();
    }
    let subject_paths: Paths = subject_coords.into();
    let clip_paths: Paths = to_coords(clip).into();
    match clipper2::difference(subject_paths, clip_paths, FillRule::NonZero) {
        Ok(result) => from_paths(result),
        Err(e) => {
            log::warn!("polygon difference failed, dropping subject: {e:?}");
            Vec::new()
        }
    }
}

/// Remove redundant and self-intersection-noise vertices from a polygon.
pub fn simplify(poly: &Polygon2, tolerance: f32) -> Polygon2 {
    if poly.points.len() < 4 || tolerance <= 0.0 {
        return poly.clone();
    }
    let paths: Paths = to_coords(std::slice::from_ref(poly)).into();
    let result = paths.simplify(tolerance as f64, false);
    from_paths(result)
        .into_iter()
        .max_by(|a, b| {
            a.signed_area()
                .abs()
                .total_cmp(&b.signed_area().abs())
        })
        .unwrap_or_else(|| poly.clone())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn square(origin: Vec2, size: f32) -> Polygon2 {
        Polygon2::new(vec![
            origin,
            origin + Vec2::new(size, 0.0),
            origin + Vec2::new(size, size),
            origin + Vec2::new(0.0, size),
        ])
    }

    #[test]
    fn test_signed_area_ccw_positive() {
        let p = square(Vec2::ZERO, 10.0);
        assert!((p.signed_area() - 100.0).abs() < 1e-3);
        assert!(p.is_outer());
    }

    #[test]
    fn test_signed_area_cw_negative() {
        let mut p = square(Vec2::ZERO, 10.0);
        p.points.reverse();
        assert!((p.signed_area() + 100.0).abs() < 1e-3);
        assert!(!p.is_outer());
    }

    #[test]
    fn test_contains_point() {
        let p = square(Vec2::ZERO, 10.0);
        assert!(p.contains_point(Vec2::new(5.0, 5.0)));
        assert!(!p.contains_point(Vec2::new(15.0, 5.0)));
    }

    #[test]
    fn test_dedup_removes_zero_length_edges() {
        let p = Polygon2::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(0.0, 0.0), // closing duplicate
        ]);
        let d = p.dedup_points(1e-4);
        assert_eq!(d.points.len(), 4);
    }

    #[test]
    fn test_degenerate_detection() {
        assert!(Polygon2::new(vec![Vec2::ZERO, Vec2::X]).is_degenerate());
        // Tiny sliver below the area epsilon
        let sliver = Polygon2::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 0.1),
        ]);
        assert!(sliver.is_degenerate());
        assert!(!square(Vec2::ZERO, 10.0).is_degenerate());
    }

    #[test]
    fn test_union_merges_overlapping_squares() {
        let a = square(Vec2::ZERO, 10.0);
        let b = square(Vec2::new(5.0, 0.0), 10.0);
        let out = union_all(&[a, b]);
        assert_eq!(out.len(), 1);
        assert!((out[0].signed_area().abs() - 150.0).abs() < 1.0);
    }

    #[test]
    fn test_union_keeps_disjoint_squares() {
        let a = square(Vec2::ZERO, 10.0);
        let b = square(Vec2::new(100.0, 0.0), 10.0);
        let out = union_all(&[a, b]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_difference_produces_hole() {
        let outer = square(Vec2::ZERO, 30.0);
        let inner = square(Vec2::new(10.0, 10.0), 10.0);
        let out = difference(&[outer], &[inner]);
        let outers: Vec<_> = out.iter().filter(|p| p.is_outer()).collect();
        let holes: Vec<_> = out.iter().filter(|p| !p.is_outer()).collect();
        assert_eq!(outers.len(), 1);
        assert_eq!(holes.len(), 1);
        assert!((holes[0].signed_area().abs() - 100.0).abs() < 1.0);
    }

    #[test]
    fn test_difference_of_disjoint_is_subject() {
        let a = square(Vec2::ZERO, 10.0);
        let b = square(Vec2::new(100.0, 0.0), 10.0);
        let out = difference(&[a.clone()], &[b]);
        assert_eq!(out.len(), 1);
        assert!((out[0].signed_area().abs() - 100.0).abs() < 1.0);
    }

    #[test]
    fn test_offset_grows_square() {
        let a = square(Vec2::ZERO, 10.0);
        let out = offset(&[a], 2.0, JoinStyle::Miter);
        assert_eq!(out.len(), 1);
        // 14x14 with mitered corners
        assert!((out[0].signed_area().abs() - 196.0).abs() < 2.0);
    }

    #[test]
    fn test_offset_filters_degenerate_input() {
        let out = offset(&[Polygon2::new(vec![Vec2::ZERO, Vec2::X])], 2.0, JoinStyle::Miter);
        assert!(out.is_empty());
    }

    #[test]
    fn test_distance_to_boundary() {
        let p = square(Vec2::ZERO, 10.0);
        let d = p.distance_to_boundary(Vec2::new(5.0, 5.0));
        assert!((d - 5.0).abs() < 1e-4);
        let d_edge = p.distance_to_boundary(Vec2::new(5.0, 1.0));
        assert!((d_edge - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_repeated_offset_difference_is_stable() {
        // Offset out then back in and subtract the original: remainder
        // should be a clean ring without sliver noise accumulating.
        let a = square(Vec2::ZERO, 100.0);
        let grown = offset(std::slice::from_ref(&a), 4.0, JoinStyle::Miter);
        let ring = difference(&grown, std::slice::from_ref(&a));
        for p in &ring {
            assert!(p.signed_area().abs() >= AREA_EPSILON);
        }
        let outer_area: f32 = ring
            .iter()
            .map(|p| p.signed_area())
            .sum();
        // 108^2 - 100^2 = 1664
        assert!((outer_area - 1664.0).abs() < 10.0, "ring area = {outer_area}");
    }
}
