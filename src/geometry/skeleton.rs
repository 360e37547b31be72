//! Straight skeleton construction for simple polygons.
//!
//! The polygon boundary is collapsed inward at uniform speed; the traces of
//! the wavefront vertices form the skeleton arcs. Each original edge sweeps
//! out one face bounded by the edge and its arcs. The construction handles
//! edge events (an edge collapsing to a point) and split events (a reflex
//! vertex hitting an opposite edge).
//!
//! All failures are reported as [`Error::Skeleton`]; callers degrade to
//! flat roofing per polygon and never panic.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use glam::{DVec2, Vec2};

use crate::core::{Error, Result};
use crate::math::Polygon2;

const EPS: f64 = 1e-7;

/// One node of the skeleton graph. `time` is the wavefront offset distance
/// at which the node appears: 0 on the boundary, positive in the interior.
#[derive(Clone, Copy, Debug)]
pub struct SkeletonNode {
    pub position: Vec2,
    pub time: f32,
}

/// Straight skeleton of a simple polygon.
///
/// `nodes[0..boundary_len]` are the input vertices in order (time 0);
/// the rest are interior nodes. `faces` holds one vertex-index cycle per
/// original edge, ordered boundary-edge-first.
#[derive(Clone, Debug)]
pub struct Skeleton {
    pub nodes: Vec<SkeletonNode>,
    pub faces: Vec<Vec<usize>>,
    pub boundary_len: usize,
}

// ---------------------------------------------------------------------------
// Internal wavefront state
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
struct OriginalEdge {
    a: DVec2,
    dir: DVec2,
    /// Inward unit normal (left of dir for a CCW polygon).
    normal: DVec2,
    /// Initial bisector velocities at the edge endpoints, for the split
    /// event wedge test.
    bis_a: DVec2,
    bis_b: DVec2,
}

#[derive(Clone, Copy)]
struct WavefrontVertex {
    /// Position at creation time.
    origin: DVec2,
    /// Creation time.
    start: f64,
    /// Velocity such that `pos(t) = origin + velocity * (t - start)` keeps
    /// unit distance rate to both adjacent wavefront edges.
    velocity: DVec2,
    /// Original edge indices bordering this vertex.
    edge_left: usize,
    edge_right: usize,
    /// Output node this vertex starts at.
    node: usize,
    prev: usize,
    next: usize,
    active: bool,
    reflex: bool,
}

impl WavefrontVertex {
    fn pos(&self, t: f64) -> DVec2 {
        self.origin + self.velocity * (t - self.start)
    }
}

#[derive(Clone, Copy, Debug)]
enum EventKind {
    /// Wavefront edge between vertex `a` and its `next` collapses.
    Edge { a: usize, b: usize },
    /// Reflex vertex `v` hits original edge `edge`.
    Split { v: usize, edge: usize },
}

#[derive(Clone, Copy, Debug)]
struct Event {
    time: f64,
    point: DVec2,
    kind: EventKind,
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time
    }
}
impl Eq for Event {}
impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Event {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.time.total_cmp(&other.time)
    }
}

/// Bisector velocity for a wavefront vertex between two edges with unit
/// directions `d_left` (into the vertex) and `d_right` (out of it).
/// Returns `(velocity, reflex)`.
fn bisector_velocity(d_left: DVec2, d_right: DVec2) -> Result<(DVec2, bool)> {
    let n0 = DVec2::new(-d_left.y, d_left.x);
    let n1 = DVec2::new(-d_right.y, d_right.x);
    let denom = 1.0 + n0.dot(n1);
    if denom.abs() < EPS {
        return Err(Error::Skeleton("anti-parallel edges at vertex".into()));
    }
    // dot(velocity, n0) == dot(velocity, n1) == 1
    let velocity = (n0 + n1) / denom;
    let reflex = d_left.perp_dot(d_right) < -EPS;
    Ok((velocity, reflex))
}

struct Builder {
    edges: Vec<OriginalEdge>,
    vertices: Vec<WavefrontVertex>,
    nodes: Vec<SkeletonNode>,
    /// (from_node, to_node, face_a, face_b)
    arcs: Vec<(usize, usize, usize, usize)>,
    queue: BinaryHeap<Reverse<Event>>,
}

impl Builder {
    fn new(points: &[DVec2]) -> Result<Self> {
        let n = points.len();
        let mut edges = Vec::with_capacity(n);
        for i in 0..n {
            let a = points[i];
            let b = points[(i + 1) % n];
            let d = b - a;
            let len = d.length();
            if len < EPS {
                return Err(Error::Skeleton("zero-length edge".into()));
            }
            let dir = d / len;
            edges.push(OriginalEdge {
                a,
                dir,
                normal: DVec2::new(-dir.y, dir.x),
                bis_a: DVec2::ZERO,
                bis_b: DVec2::ZERO,
            });
        }

        let mut vertices = Vec::with_capacity(n);
        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let e_left = (i + n - 1) % n;
            let (velocity, reflex) = bisector_velocity(edges[e_left].dir, edges[i].dir)?;
            vertices.push(WavefrontVertex {
                origin: points[i],
                start: 0.0,
                velocity,
                edge_left: e_left,
                edge_right: i,
                node: i,
                prev: (i + n - 1) % n,
                next: (i + 1) % n,
                active: true,
                reflex,
            });
            nodes.push(SkeletonNode {
                position: Vec2::new(points[i].x as f32, points[i].y as f32),
                time: 0.0,
            });
        }
        for i in 0..n {
            edges[i].bis_a = vertices[i].velocity;
            edges[i].bis_b = vertices[(i + 1) % n].velocity;
        }

        Ok(Self {
            edges,
            vertices,
            nodes,
            arcs: Vec::new(),
            queue: BinaryHeap::new(),
        })
    }

    fn push_edge_event(&mut self, a: usize, b: usize) {
        let va = self.vertices[a];
        let vb = self.vertices[b];
        // pos_a(t) == pos_b(t); solve via projection onto the relative velocity
        let p0 = va.origin - va.velocity * va.start;
        let q0 = vb.origin - vb.velocity * vb.start;
        let dv = vb.velocity - va.velocity;
        let dv_len_sq = dv.length_squared();
        if dv_len_sq < EPS * EPS {
            return; // parallel wavefront bisectors, never meet
        }
        let t = (p0 - q0).dot(dv) / dv_len_sq;
        if !t.is_finite() || t < va.start - EPS || t < vb.start - EPS {
            return;
        }
        let point = p0 + va.velocity * t;
        // Reject spurious projections where the two trajectories don't
        // actually meet.
        if point.distance(q0 + vb.velocity * t) > 1e-3 {
            return;
        }
        self.queue.push(Reverse(Event {
            time: t.max(0.0),
            point,
            kind: EventKind::Edge { a, b },
        }));
    }

    fn push_split_events(&mut self, v: usize) {
        let vert = self.vertices[v];
        if !vert.reflex {
            return;
        }
        let r0 = vert.origin - vert.velocity * vert.start;
        for (ei, edge) in self.edges.iter().enumerate() {
            if ei == vert.edge_left || ei == vert.edge_right {
                continue;
            }
            let denom = 1.0 - vert.velocity.dot(edge.normal);
            if denom.abs() < EPS {
                continue;
            }
            let t = (r0 - edge.a).dot(edge.normal) / denom;
            if !t.is_finite() || t <= vert.start + EPS {
                continue;
            }
            let point = r0 + vert.velocity * t;
            if !self.point_in_edge_wedge(point, ei) {
                continue;
            }
            self.queue.push(Reverse(Event {
                time: t,
                point,
                kind: EventKind::Split { v, edge: ei },
            }));
        }
    }

    /// Whether a candidate split point lies in the region swept by an
    /// original edge: on its inward side and between its endpoint
    /// bisectors.
    fn point_in_edge_wedge(&self, p: DVec2, ei: usize) -> bool {
        let edge = &self.edges[ei];
        let edge_end = self.edges[(ei + 1) % self.edges.len()].a;
        if (p - edge.a).dot(edge.normal) < EPS {
            return false;
        }
        edge.bis_a.perp_dot(p - edge.a) <= EPS && edge.bis_b.perp_dot(p - edge_end) >= -EPS
    }

    fn seed_events(&mut self) {
        for i in 0..self.vertices.len() {
            let next = self.vertices[i].next;
            self.push_edge_event(i, next);
        }
        for i in 0..self.vertices.len() {
            self.push_split_events(i);
        }
    }

    fn add_node(&mut self, point: DVec2, time: f64) -> usize {
        self.nodes.push(SkeletonNode {
            position: Vec2::new(point.x as f32, point.y as f32),
            time: time as f32,
        });
        self.nodes.len() - 1
    }

    fn retire(&mut self, v: usize, node: usize) {
        self.vertices[v].active = false;
        let (from, fa, fb) = (
            self.vertices[v].node,
            self.vertices[v].edge_left,
            self.vertices[v].edge_right,
        );
        if from != node {
            self.arcs.push((from, node, fa, fb));
        }
    }

    fn spawn(
        &mut self,
        point: DVec2,
        time: f64,
        node: usize,
        edge_left: usize,
        edge_right: usize,
        prev: usize,
        next: usize,
    ) -> Result<usize> {
        let (velocity, reflex) =
            bisector_velocity(self.edges[edge_left].dir, self.edges[edge_right].dir)?;
        let id = self.vertices.len();
        self.vertices.push(WavefrontVertex {
            origin: point,
            start: time,
            velocity,
            edge_left,
            edge_right,
            node,
            prev,
            next,
            active: true,
            reflex,
        });
        self.vertices[prev].next = id;
        self.vertices[next].prev = id;
        self.push_edge_event(prev, id);
        self.push_edge_event(id, next);
        self.push_split_events(id);
        Ok(id)
    }

    fn handle_edge_event(&mut self, ev: Event, a: usize, b: usize) -> Result<()> {
        if !self.vertices[a].active
            || !self.vertices[b].active
            || self.vertices[a].next != b
        {
            return Ok(()); // stale
        }

        // Triangle collapse: the whole LAV meets at one point.
        if self.vertices[b].next == self.vertices[a].prev {
            let c = self.vertices[a].prev;
            let node = self.add_node(ev.point, ev.time);
            self.retire(a, node);
            self.retire(b, node);
            self.retire(c, node);
            return Ok(());
        }
        // Two-vertex LAV left over from a previous split.
        if self.vertices[b].next == a {
            let node = self.add_node(ev.point, ev.time);
            self.retire(a, node);
            self.retire(b, node);
            return Ok(());
        }

        let node = self.add_node(ev.point, ev.time);
        let (prev, next) = (self.vertices[a].prev, self.vertices[b].next);
        let (edge_left, edge_right) = (self.vertices[a].edge_left, self.vertices[b].edge_right);
        self.retire(a, node);
        self.retire(b, node);
        if self
            .spawn(ev.point, ev.time, node, edge_left, edge_right, prev, next)
            .is_err()
        {
            // The surviving wavefront edges are anti-parallel: the region
            // between them is a ribbon collapsing onto a ridge line.
            self.resolve_ridge(node, ev.point, ev.time, edge_left, edge_right, prev, next)?;
        }
        Ok(())
    }

    /// Resolve a ribbon collapse: two anti-parallel wavefront edges meet
    /// along a ridge. Only the common case of a 3-vertex remainder LAV is
    /// handled; anything longer is reported as a failure.
    fn resolve_ridge(
        &mut self,
        node_b: usize,
        b: DVec2,
        time: f64,
        edge_left: usize,
        edge_right: usize,
        prev: usize,
        next: usize,
    ) -> Result<()> {
        if self.vertices[prev].prev != next {
            return Err(Error::Skeleton("ribbon collapse with long remainder".into()));
        }
        let n0 = self.edges[edge_left].normal;
        let mut rdir = DVec2::new(-n0.y, n0.x);
        let p_prev = self.vertices[prev].pos(time);
        let p_next = self.vertices[next].pos(time);
        if rdir.dot((p_prev + p_next) * 0.5 - b) < 0.0 {
            rdir = -rdir;
        }

        // Far ridge end: intersect both neighbor trajectories with the
        // ridge line and require agreement.
        let hit = |origin: DVec2, velocity: DVec2| -> Result<DVec2> {
            let denom = velocity.perp_dot(rdir);
            if denom.abs() < EPS {
                return Err(Error::Skeleton("ridge-parallel neighbor".into()));
            }
            let delta = -(origin - b).perp_dot(rdir) / denom;
            if delta < -1e-6 {
                return Err(Error::Skeleton("ridge end behind wavefront".into()));
            }
            Ok(origin + velocity * delta)
        };
        let n_prev = hit(p_prev, self.vertices[prev].velocity)?;
        let n_next = hit(p_next, self.vertices[next].velocity)?;
        if n_prev.distance(n_next) > 1e-3 {
            return Err(Error::Skeleton("ridge ends disagree".into()));
        }

        if n_prev.distance(b) < 1e-6 {
            // Ridge degenerates to a point; everything meets at node_b.
            self.retire(prev, node_b);
            self.retire(next, node_b);
            return Ok(());
        }
        let node_n = self.add_node(n_prev, time);
        self.arcs.push((node_b, node_n, edge_left, edge_right));
        self.retire(prev, node_n);
        self.retire(next, node_n);
        Ok(())
    }

    fn handle_split_event(&mut self, ev: Event, v: usize, edge: usize) -> Result<()> {
        if !self.vertices[v].active {
            return Ok(());
        }
        // Find the live wavefront span of the split edge that contains the
        // event point. A previous split may have divided the edge's
        // wavefront into several spans.
        let edge_a = self.edges[edge].a;
        let edge_dir = self.edges[edge].dir;
        let s_p = (ev.point - edge_a).dot(edge_dir);
        let mut span = None;
        for (i, w) in self.vertices.iter().enumerate() {
            if !w.active || w.edge_right != edge {
                continue;
            }
            let y = w.next;
            if self.vertices[y].edge_left != edge || !self.vertices[y].active {
                continue;
            }
            let s_x = (w.pos(ev.time) - edge_a).dot(edge_dir);
            let s_y = (self.vertices[y].pos(ev.time) - edge_a).dot(edge_dir);
            if s_p >= s_x - 1e-6 && s_p <= s_y + 1e-6 {
                span = Some((i, y));
                break;
            }
        }
        let Some((x, y)) = span else {
            return Ok(()); // edge span already collapsed, stale event
        };
        if x == v || y == v {
            return Ok(());
        }

        let node = self.add_node(ev.point, ev.time);
        let (prev, next) = (self.vertices[v].prev, self.vertices[v].next);
        let (edge_left, edge_right) = (self.vertices[v].edge_left, self.vertices[v].edge_right);
        self.retire(v, node);

        // Two new LAVs: prev..v1..y and x..v2..next. Either side may itself
        // be a ribbon whose wavefront edges are anti-parallel (a reflex
        // vertex splitting into a parallel corridor): resolve those along
        // their ridge instead of spawning.
        if self
            .spawn(ev.point, ev.time, node, edge_left, edge, prev, y)
            .is_err()
        {
            self.resolve_ridge(node, ev.point, ev.time, edge_left, edge, prev, y)?;
        }
        if self
            .spawn(ev.point, ev.time, node, edge, edge_right, x, next)
            .is_err()
        {
            self.resolve_ridge(node, ev.point, ev.time, edge, edge_right, x, next)?;
        }
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        self.seed_events();
        let max_events = 16 * self.edges.len() * self.edges.len() + 256;
        let mut processed = 0usize;
        while let Some(Reverse(ev)) = self.queue.pop() {
            processed += 1;
            if processed > max_events {
                return Err(Error::Skeleton("event budget exceeded".into()));
            }
            match ev.kind {
                EventKind::Edge { a, b } => self.handle_edge_event(ev, a, b)?,
                EventKind::Split { v, edge } => self.handle_split_event(ev, v, edge)?,
            }
        }
        if self.vertices.iter().any(|v| v.active) {
            return Err(Error::Skeleton("wavefront did not collapse".into()));
        }
        Ok(())
    }

    /// Assemble the face cycle for each original edge from the labeled arcs.
    fn faces(&self) -> Result<Vec<Vec<usize>>> {
        let n = self.edges.len();
        let mut faces = Vec::with_capacity(n);
        for ei in 0..n {
            let start = ei;
            let end = (ei + 1) % n;
            // Undirected adjacency over arcs bordering this face.
            let mut adj: std::collections::HashMap<usize, Vec<usize>> =
                std::collections::HashMap::new();
            for &(from, to, fa, fb) in &self.arcs {
                if fa == ei || fb == ei {
                    adj.entry(from).or_default().push(to);
                    adj.entry(to).or_default().push(from);
                }
            }
            // Walk from the edge's far endpoint back to its near endpoint.
            let mut face = vec![start, end];
            let mut current = end;
            let mut came_from = usize::MAX;
            loop {
                let neighbors = adj
                    .get(&current)
                    .ok_or_else(|| Error::Skeleton(format!("open face for edge {ei}")))?;
                let next = neighbors
                    .iter()
                    .copied()
                    .find(|&c| c != came_from)
                    .ok_or_else(|| Error::Skeleton(format!("dead end in face {ei}")))?;
                if next == start {
                    break;
                }
                came_from = current;
                current = next;
                face.push(current);
                if face.len() > self.nodes.len() + 2 {
                    return Err(Error::Skeleton(format!("unclosed face for edge {ei}")));
                }
            }
            faces.push(face);
        }
        Ok(faces)
    }
}

/// Build the straight skeleton of a simple polygon.
///
/// The input is deduplicated and normalized to CCW. Holes are not
/// supported; callers split multi-ring regions beforehand.
pub fn straight_skeleton(poly: &Polygon2) -> Result<Skeleton> {
    let clean = poly.dedup_points(1e-4).ensure_ccw();
    if clean.points.len() < 3 {
        return Err(Error::Skeleton("fewer than 3 points".into()));
    }
    if clean.signed_area() < crate::math::polygon::AREA_EPSILON {
        return Err(Error::Skeleton("degenerate area".into()));
    }
    let points: Vec<DVec2> = clean
        .points
        .iter()
        .map(|p| DVec2::new(p.x as f64, p.y as f64))
        .collect();

    let mut builder = Builder::new(&points)?;
    builder.run()?;
    let faces = builder.faces()?;
    Ok(Skeleton {
        nodes: builder.nodes,
        faces,
        boundary_len: points.len(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
