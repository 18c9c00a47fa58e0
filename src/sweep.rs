// Copyright 2025 The glutess Authors
// License: SGI Free Software License B (MIT-compatible)
//
// Sweep-line construction of the planar arrangement.
//
// Vertices are processed left to right (in `vert_leq` order). The active
// edges crossing the sweep line are kept sorted in a `Dict`; each one owns the
// region directly below it. When the sweep finishes, every face of the mesh is
// monotone and carries an inside/outside flag derived from the winding rule.
//
// Invariants the loop maintains between events:
//   - adjacent active edges do not cross to the left of the sweep line;
//   - every active edge has its origin at or right of the sweep line and its
//     destination at or left of it;
//   - the region above the top sentinel and below the bottom one is never
//     inspected.

use tracing::{trace, warn};

use crate::bucketalloc::BucketAlloc;
use crate::config::WindingRule;
use crate::dict::{Dict, NodeIdx};
use crate::error::TessError;
use crate::geom::{edge_eval, edge_intersect, edge_sign, vert_eq, vert_l1_dist, vert_leq, Real, MAX_COORD};
use crate::mesh::{EdgeIdx, Mesh, VertIdx, E_HEAD, F_HEAD, INVALID};
use crate::priorityq::PriorityQ;

/// Index into the sweep's region arena.
pub type RegionIdx = u32;

/// Sentinel edges lie beyond any clamped input coordinate.
const SENTINEL_COORD: Real = 4.0 * MAX_COORD;

/// Bookkeeping for the region below one active edge.
#[derive(Clone, Debug)]
pub struct ActiveRegion {
    /// Upper edge, directed right to left.
    pub e_up: EdgeIdx,
    pub node_up: NodeIdx,
    pub winding_number: i32,
    pub inside: bool,
    /// One of the two edges at +/- infinity.
    pub sentinel: bool,
    /// Upper or lower edge changed; the pair must be re-checked.
    pub dirty: bool,
    /// `e_up` is a temporary edge that will be replaced once its true
    /// left neighbor is known.
    pub fix_upper_edge: bool,
}

impl ActiveRegion {
    fn new(e_up: EdgeIdx) -> Self {
        ActiveRegion {
            e_up,
            node_up: INVALID,
            winding_number: 0,
            inside: false,
            sentinel: false,
            dirty: false,
            fix_upper_edge: false,
        }
    }
}

/// Supplies client data for vertices the sweep synthesizes or merges.
///
/// `data` holds the data slots of up to four contributing vertices (INVALID
/// when absent) and `weights` their interpolation weights. Returning `None`
/// means no data could be produced.
pub trait Combiner {
    fn combine(&mut self, coords: [Real; 3], data: [u32; 4], weights: [f32; 4]) -> Option<u32>;
}

/// Combiner that never produces data; useful when the input is known to be simple.
pub struct NoCombine;

impl Combiner for NoCombine {
    fn combine(&mut self, _coords: [Real; 3], _data: [u32; 4], _weights: [f32; 4]) -> Option<u32> {
        None
    }
}

/// Order of two active edges at the current event.
///
/// Both edges must cross the sweep line. When an edge ends at the event
/// vertex itself its height there is the event's t, so the generic
/// evaluation is replaced by a sign test against the other edge.
fn edge_leq(mesh: &Mesh, event: VertIdx, e1: EdgeIdx, e2: EdgeIdx) -> bool {
    let ev = mesh.st(event);
    let (o1, d1) = (mesh.org(e1), mesh.dst(e1));
    let (o2, d2) = (mesh.org(e2), mesh.dst(e2));

    if d1 == event {
        if d2 == event {
            // Both end at the event: order by slope.
            if vert_leq(mesh.st(o1), mesh.st(o2)) {
                return edge_sign(mesh.st(d2), mesh.st(o1), mesh.st(o2)) <= 0.0;
            }
            return edge_sign(mesh.st(d1), mesh.st(o2), mesh.st(o1)) >= 0.0;
        }
        return edge_sign(mesh.st(d2), ev, mesh.st(o2)) <= 0.0;
    }
    if d2 == event {
        return edge_sign(mesh.st(d1), ev, mesh.st(o1)) >= 0.0;
    }

    let t1 = edge_eval(mesh.st(d1), ev, mesh.st(o1));
    let t2 = edge_eval(mesh.st(d2), ev, mesh.st(o2));
    t1 >= t2
}

fn vertex_leq(mesh: &Mesh) -> impl Fn(u32, u32) -> bool + '_ {
    move |a, b| vert_leq(mesh.st(a), mesh.st(b))
}

struct Sweep<'a, C> {
    mesh: &'a mut Mesh,
    combiner: &'a mut C,
    rule: WindingRule,
    dict: Dict,
    pq: PriorityQ,
    regions: BucketAlloc<ActiveRegion>,
    event: VertIdx,
    /// A required combine produced no data.
    fatal: bool,
}

impl<'a, C: Combiner> Sweep<'a, C> {
    fn new(mesh: &'a mut Mesh, rule: WindingRule, combiner: &'a mut C) -> Self {
        let vertex_count = mesh.verts.len();
        Sweep {
            mesh,
            combiner,
            rule,
            dict: Dict::new(),
            pq: PriorityQ::new(vertex_count + 8),
            regions: BucketAlloc::new(),
            event: INVALID,
            fatal: false,
        }
    }

    // ──────────────────────────── Regions ────────────────────────────

    fn region_below(&self, reg: RegionIdx) -> RegionIdx {
        self.dict.key(self.dict.pred(self.regions[reg].node_up))
    }

    /// INVALID above the top sentinel.
    fn region_above(&self, reg: RegionIdx) -> RegionIdx {
        self.dict.key(self.dict.succ(self.regions[reg].node_up))
    }

    fn dict_insert_before(&mut self, node: NodeIdx, reg: RegionIdx) -> NodeIdx {
        let mesh = &*self.mesh;
        let regions = &self.regions;
        let event = self.event;
        self.dict
            .insert_before(node, reg, |a, b| edge_leq(mesh, event, regions[a].e_up, regions[b].e_up))
    }

    fn add_winding(&mut self, e_dst: EdgeIdx, e_src: EdgeIdx) {
        let w = self.mesh.edges[e_src as usize].winding;
        let w_sym = self.mesh.edges[(e_src ^ 1) as usize].winding;
        self.mesh.edges[e_dst as usize].winding += w;
        self.mesh.edges[(e_dst ^ 1) as usize].winding += w_sym;
    }

    fn delete_region(&mut self, reg: RegionIdx) {
        let (e_up, node_up, fix) = {
            let r = &self.regions[reg];
            (r.e_up, r.node_up, r.fix_upper_edge)
        };
        if fix {
            // Only a temporary edge with zero winding may be replaced.
            debug_assert_eq!(self.mesh.edges[e_up as usize].winding, 0);
        }
        self.mesh.edges[e_up as usize].active_region = INVALID;
        self.dict.delete(node_up);
        self.regions.free(reg);
    }

    /// Replaces a temporary upper edge by `new_edge`.
    fn fix_upper_edge(&mut self, reg: RegionIdx, new_edge: EdgeIdx) {
        debug_assert!(self.regions[reg].fix_upper_edge);
        let old = self.regions[reg].e_up;
        self.mesh.delete_edge(old);
        let r = &mut self.regions[reg];
        r.fix_upper_edge = false;
        r.e_up = new_edge;
        self.mesh.edges[new_edge as usize].active_region = reg;
    }

    fn top_left_region(&mut self, mut reg: RegionIdx) -> RegionIdx {
        let org = self.mesh.org(self.regions[reg].e_up);
        // Find the region above the uppermost edge with the same origin.
        loop {
            reg = self.region_above(reg);
            if self.mesh.org(self.regions[reg].e_up) != org {
                break;
            }
        }

        // If the edge above was a temporary edge introduced by
        // connect_right_vertex, now is the time to fix it.
        if self.regions[reg].fix_upper_edge {
            let below = self.region_below(reg);
            let e_below = self.regions[below].e_up ^ 1;
            let e_lnext = self.mesh.lnext(self.regions[reg].e_up);
            let e = self.mesh.connect(e_below, e_lnext);
            self.fix_upper_edge(reg, e);
            reg = self.region_above(reg);
        }
        reg
    }

    fn top_right_region(&self, mut reg: RegionIdx) -> RegionIdx {
        let dst = self.mesh.dst(self.regions[reg].e_up);
        loop {
            reg = self.region_above(reg);
            if self.mesh.dst(self.regions[reg].e_up) != dst {
                return reg;
            }
        }
    }

    /// Adds a region below `reg_above` for the right-going edge `e_new_up`.
    /// Winding number and inside flag are left for the caller.
    fn add_region_below(&mut self, reg_above: RegionIdx, e_new_up: EdgeIdx) -> RegionIdx {
        let reg_new = self.regions.alloc(ActiveRegion::new(e_new_up));
        let node_above = self.regions[reg_above].node_up;
        let node = self.dict_insert_before(node_above, reg_new);
        self.regions[reg_new].node_up = node;
        self.mesh.edges[e_new_up as usize].active_region = reg_new;
        reg_new
    }

    fn compute_winding(&mut self, reg: RegionIdx) {
        let above = self.region_above(reg);
        let e_up = self.regions[reg].e_up;
        let wn = self.regions[above].winding_number + self.mesh.edges[e_up as usize].winding;
        let r = &mut self.regions[reg];
        r.winding_number = wn;
        r.inside = self.rule.is_inside(wn);
    }

    /// The face left of `reg`'s upper edge is complete: record its
    /// inside flag and retire the region.
    fn finish_region(&mut self, reg: RegionIdx) {
        let e = self.regions[reg].e_up;
        let f = self.mesh.lface(e) as usize;
        self.mesh.faces[f].inside = self.regions[reg].inside;
        self.mesh.faces[f].an_edge = e;
        self.delete_region(reg);
    }

    /// Finishes the regions from `reg_first` down to (not including)
    /// `reg_last` (INVALID: as far as edges share the same origin), fixing
    /// the mesh where the dictionary order and the edge order around the
    /// event disagree. Returns the lowest upper edge visited.
    fn finish_left_regions(&mut self, reg_first: RegionIdx, reg_last: RegionIdx) -> EdgeIdx {
        let mut reg_prev = reg_first;
        let mut e_prev = self.regions[reg_first].e_up;

        while reg_prev != reg_last {
            self.regions[reg_prev].fix_upper_edge = false;
            let reg = self.region_below(reg_prev);
            let mut e = self.regions[reg].e_up;

            if self.mesh.org(e) != self.mesh.org(e_prev) {
                if !self.regions[reg].fix_upper_edge {
                    // Past the last edge with this origin.
                    self.finish_region(reg_prev);
                    break;
                }
                // A temporary edge: connect it to the event instead.
                let e_lprev = self.mesh.lprev(e_prev);
                e = self.mesh.connect(e_lprev, e ^ 1);
                self.fix_upper_edge(reg, e);
            }

            // Relink edges so the mesh order matches the dictionary.
            if self.mesh.onext(e_prev) != e {
                let e_oprev = self.mesh.oprev(e);
                self.mesh.splice(e_oprev, e);
                self.mesh.splice(e_prev, e);
            }
            self.finish_region(reg_prev);
            e_prev = self.regions[reg].e_up;
            reg_prev = reg;
        }
        e_prev
    }

    /// Inserts the right-going edges `e_first ..= (onext) .. e_last` below
    /// `reg_up`, then updates winding numbers and mesh connectivity.
    ///
    /// Returns the lowest region touched. With `clean_up` the dirty regions
    /// are walked before returning.
    fn add_right_edges(
        &mut self,
        reg_up: RegionIdx,
        e_first: EdgeIdx,
        e_last: EdgeIdx,
        e_top_left: EdgeIdx,
        clean_up: bool,
    ) -> RegionIdx {
        let mut e = e_first;
        loop {
            debug_assert!(vert_leq(self.mesh.st(self.mesh.org(e)), self.mesh.st(self.mesh.dst(e))));
            self.add_region_below(reg_up, e ^ 1);
            e = self.mesh.onext(e);
            if e == e_last {
                break;
            }
        }

        let e_top_left = if e_top_left == INVALID {
            let below = self.region_below(reg_up);
            self.mesh.rprev(self.regions[below].e_up)
        } else {
            e_top_left
        };

        let mut reg_prev = reg_up;
        let mut e_prev = e_top_left;
        let mut first = true;
        let (reg, e) = loop {
            let reg = self.region_below(reg_prev);
            let e = self.regions[reg].e_up ^ 1;
            if self.mesh.org(e) != self.mesh.org(e_prev) {
                break (reg, e);
            }

            if self.mesh.onext(e) != e_prev {
                // Unlink e from its current position and relink below e_prev.
                let e_oprev = self.mesh.oprev(e);
                self.mesh.splice(e_oprev, e);
                let prev_oprev = self.mesh.oprev(e_prev);
                self.mesh.splice(prev_oprev, e);
            }

            let wn = self.regions[reg_prev].winding_number - self.mesh.edges[e as usize].winding;
            {
                let r = &mut self.regions[reg];
                r.winding_number = wn;
                r.inside = self.rule.is_inside(wn);
            }

            // Check for two outgoing edges with the same slope.
            self.regions[reg_prev].dirty = true;
            if !first && self.check_for_right_splice(reg_prev) {
                self.add_winding(e, e_prev);
                self.delete_region(reg_prev);
                self.mesh.delete_edge(e_prev);
            }
            first = false;
            reg_prev = reg;
            e_prev = e;
        };

        self.regions[reg_prev].dirty = true;
        debug_assert_eq!(
            self.regions[reg_prev].winding_number - self.mesh.edges[e as usize].winding,
            self.regions[reg].winding_number
        );

        if clean_up {
            self.walk_dirty_regions(reg_prev);
        }
        reg_prev
    }

    // ──────────────────────────── Combining ────────────────────────────

    fn call_combine(&mut self, isect: VertIdx, data: [u32; 4], weights: [f32; 4], needed: bool) {
        let coords = self.mesh.verts[isect as usize].coords;
        match self.combiner.combine(coords, data, weights) {
            Some(out) => self.mesh.verts[isect as usize].data = out,
            None if !needed => self.mesh.verts[isect as usize].data = data[0],
            None => {
                if !self.fatal {
                    warn!(?coords, "intersection requires a combine callback");
                    self.fatal = true;
                }
                self.mesh.verts[isect as usize].data = INVALID;
            }
        }
    }

    /// Merges the origins of `e1` and `e2`, which coincide, keeping `e1`'s.
    fn splice_merge_vertices(&mut self, e1: EdgeIdx, e2: EdgeIdx) {
        let v1 = self.mesh.org(e1);
        let v2 = self.mesh.org(e2);
        let data = [
            self.mesh.verts[v1 as usize].data,
            self.mesh.verts[v2 as usize].data,
            INVALID,
            INVALID,
        ];
        self.call_combine(v1, data, [0.5, 0.5, 0.0, 0.0], false);
        self.mesh.splice(e1, e2);
    }

    /// Interpolation weights of `org` and `dst` for a point on their edge;
    /// accumulates the weighted coordinates into `isect`.
    fn vertex_weights(&mut self, isect: VertIdx, org: VertIdx, dst: VertIdx) -> [f32; 2] {
        let p = self.mesh.st(isect);
        let t1 = vert_l1_dist(self.mesh.st(org), p);
        let t2 = vert_l1_dist(self.mesh.st(dst), p);
        let w0 = (0.5 * t2 / (t1 + t2)) as f32;
        let w1 = (0.5 * t1 / (t1 + t2)) as f32;
        let oc = self.mesh.verts[org as usize].coords;
        let dc = self.mesh.verts[dst as usize].coords;
        let ic = &mut self.mesh.verts[isect as usize].coords;
        for i in 0..3 {
            ic[i] += w0 as Real * oc[i] + w1 as Real * dc[i];
        }
        [w0, w1]
    }

    /// Computes coordinates and client data for an intersection vertex.
    fn get_intersect_data(&mut self, isect: VertIdx, org_up: VertIdx, dst_up: VertIdx, org_lo: VertIdx, dst_lo: VertIdx) {
        let data = [org_up, dst_up, org_lo, dst_lo].map(|v| self.mesh.verts[v as usize].data);
        self.mesh.verts[isect as usize].coords = [0.0; 3];
        let [w0, w1] = self.vertex_weights(isect, org_up, dst_up);
        let [w2, w3] = self.vertex_weights(isect, org_lo, dst_lo);
        self.call_combine(isect, data, [w0, w1, w2, w3], true);
    }

    // ──────────────────────────── Splices and intersections ────────────────────────────

    /// Handles an upper edge whose origin lies on (or just below) the lower
    /// edge, or vice versa, at their right end. Returns true if the mesh changed.
    fn check_for_right_splice(&mut self, reg_up: RegionIdx) -> bool {
        let reg_lo = self.region_below(reg_up);
        let e_up = self.regions[reg_up].e_up;
        let e_lo = self.regions[reg_lo].e_up;
        let org_up = self.mesh.org(e_up);
        let org_lo = self.mesh.org(e_lo);

        if vert_leq(self.mesh.st(org_up), self.mesh.st(org_lo)) {
            if edge_sign(self.mesh.st(self.mesh.dst(e_lo)), self.mesh.st(org_up), self.mesh.st(org_lo)) > 0.0 {
                return false;
            }
            if !vert_eq(self.mesh.st(org_up), self.mesh.st(org_lo)) {
                // Splice org_up into e_lo.
                self.mesh.split_edge(e_lo ^ 1);
                let e_lo_oprev = self.mesh.oprev(e_lo);
                self.mesh.splice(e_up, e_lo_oprev);
                self.regions[reg_up].dirty = true;
                self.regions[reg_lo].dirty = true;
            } else if org_up != org_lo {
                // Merge the two vertices, discarding org_up.
                let handle = self.mesh.verts[org_up as usize].pq_handle;
                {
                    let leq = vertex_leq(&*self.mesh);
                    self.pq.delete(handle, &leq);
                }
                let e_lo_oprev = self.mesh.oprev(e_lo);
                self.splice_merge_vertices(e_lo_oprev, e_up);
            }
        } else {
            if edge_sign(self.mesh.st(self.mesh.dst(e_up)), self.mesh.st(org_lo), self.mesh.st(org_up)) < 0.0 {
                return false;
            }
            // Splice org_lo into e_up.
            let above = self.region_above(reg_up);
            self.regions[above].dirty = true;
            self.regions[reg_up].dirty = true;
            self.mesh.split_edge(e_up ^ 1);
            let e_lo_oprev = self.mesh.oprev(e_lo);
            self.mesh.splice(e_lo_oprev, e_up);
        }
        true
    }

    /// Same as `check_for_right_splice`, at the left (destination) end.
    /// The destinations must not coincide.
    fn check_for_left_splice(&mut self, reg_up: RegionIdx) -> bool {
        let reg_lo = self.region_below(reg_up);
        let e_up = self.regions[reg_up].e_up;
        let e_lo = self.regions[reg_lo].e_up;
        let dst_up = self.mesh.st(self.mesh.dst(e_up));
        let dst_lo = self.mesh.st(self.mesh.dst(e_lo));
        debug_assert!(!vert_eq(dst_up, dst_lo));

        if vert_leq(dst_up, dst_lo) {
            if edge_sign(dst_up, dst_lo, self.mesh.st(self.mesh.org(e_up))) < 0.0 {
                return false;
            }
            // dst_lo is above e_up: splice it in.
            let above = self.region_above(reg_up);
            self.regions[above].dirty = true;
            self.regions[reg_up].dirty = true;
            let e = self.mesh.split_edge(e_up);
            self.mesh.splice(e_lo ^ 1, e);
            let f = self.mesh.lface(e) as usize;
            self.mesh.faces[f].inside = self.regions[reg_up].inside;
        } else {
            if edge_sign(dst_lo, dst_up, self.mesh.st(self.mesh.org(e_lo))) > 0.0 {
                return false;
            }
            // dst_up is below e_lo.
            self.regions[reg_up].dirty = true;
            self.regions[reg_lo].dirty = true;
            let e = self.mesh.split_edge(e_lo);
            let e_up_lnext = self.mesh.lnext(e_up);
            self.mesh.splice(e_up_lnext, e_lo ^ 1);
            let f = self.mesh.rface(e) as usize;
            self.mesh.faces[f].inside = self.regions[reg_up].inside;
        }
        true
    }

    /// Checks the upper and lower edges of `reg_up` for an intersection
    /// right of the sweep line and splits them if they cross.
    ///
    /// When the crossing is resolved by re-inserting edges at the event, the
    /// dirty walk must restart from the returned region.
    fn check_for_intersect(&mut self, reg_up: RegionIdx) -> Option<RegionIdx> {
        let reg_lo = self.region_below(reg_up);
        let e_up = self.regions[reg_up].e_up;
        let e_lo = self.regions[reg_lo].e_up;
        let org_up = self.mesh.org(e_up);
        let org_lo = self.mesh.org(e_lo);
        let dst_up = self.mesh.dst(e_up);
        let dst_lo = self.mesh.dst(e_lo);
        let (p_org_up, p_org_lo) = (self.mesh.st(org_up), self.mesh.st(org_lo));
        let (p_dst_up, p_dst_lo) = (self.mesh.st(dst_up), self.mesh.st(dst_lo));
        let ev = self.mesh.st(self.event);

        debug_assert!(!vert_eq(p_dst_lo, p_dst_up));
        debug_assert!(edge_sign(p_dst_up, ev, p_org_up) <= 0.0);
        debug_assert!(edge_sign(p_dst_lo, ev, p_org_lo) >= 0.0);
        debug_assert!(org_up != self.event && org_lo != self.event);
        debug_assert!(!self.regions[reg_up].fix_upper_edge && !self.regions[reg_lo].fix_upper_edge);

        if org_up == org_lo {
            // Right endpoints are the same vertex.
            return None;
        }

        let t_min_up = p_org_up.t.min(p_dst_up.t);
        let t_max_lo = p_org_lo.t.max(p_dst_lo.t);
        if t_min_up > t_max_lo {
            // t ranges do not overlap.
            return None;
        }

        if vert_leq(p_org_up, p_org_lo) {
            if edge_sign(p_dst_lo, p_org_up, p_org_lo) > 0.0 {
                return None;
            }
        } else if edge_sign(p_dst_up, p_org_lo, p_org_up) < 0.0 {
            return None;
        }

        let mut isect = edge_intersect(p_dst_up, p_org_up, p_dst_lo, p_org_lo);
        debug_assert!(p_org_up.t.min(p_dst_up.t) <= isect.t);
        debug_assert!(isect.t <= p_org_lo.t.max(p_dst_lo.t));
        debug_assert!(p_dst_lo.s.min(p_dst_up.s) <= isect.s);
        debug_assert!(isect.s <= p_org_lo.s.max(p_org_up.s));

        if vert_leq(isect, ev) {
            // The intersection is left of the sweep line: snap it to the
            // event, the closest point that keeps the dictionary ordered.
            isect = ev;
        }
        let org_min = if vert_leq(p_org_up, p_org_lo) { p_org_up } else { p_org_lo };
        if vert_leq(org_min, isect) {
            isect = org_min;
        }

        if vert_eq(isect, p_org_up) || vert_eq(isect, p_org_lo) {
            // Easy case: the intersection is one of the right endpoints.
            self.check_for_right_splice(reg_up);
            return None;
        }

        if (!vert_eq(p_dst_up, ev) && edge_sign(p_dst_up, ev, isect) >= 0.0)
            || (!vert_eq(p_dst_lo, ev) && edge_sign(p_dst_lo, ev, isect) <= 0.0)
        {
            // The intersection is very close to the event; rounding may put
            // it on the wrong side of an edge that ends at the event.
            if dst_lo == self.event {
                // Splice dst_lo into e_up and reprocess the event's edges.
                self.mesh.split_edge(e_up ^ 1);
                self.mesh.splice(e_lo ^ 1, e_up);
                let reg_up = self.top_left_region(reg_up);
                let below = self.region_below(reg_up);
                let e_up = self.regions[below].e_up;
                self.finish_left_regions(below, reg_lo);
                let e_first = self.mesh.oprev(e_up);
                return Some(self.add_right_edges(reg_up, e_first, e_up, e_up, false));
            }
            if dst_up == self.event {
                // Splice dst_up into e_lo and reprocess.
                self.mesh.split_edge(e_lo ^ 1);
                let e_up_lnext = self.mesh.lnext(e_up);
                let e_lo_oprev = self.mesh.oprev(e_lo);
                self.mesh.splice(e_up_lnext, e_lo_oprev);
                let reg_lo = reg_up;
                let reg_up = self.top_right_region(reg_up);
                let below = self.region_below(reg_up);
                let e = self.mesh.rprev(self.regions[below].e_up);
                self.regions[reg_lo].e_up = self.mesh.oprev(e_lo);
                let e_lo = self.finish_left_regions(reg_lo, INVALID);
                let e_first = self.mesh.onext(e_lo);
                let e_last = self.mesh.rprev(e_up);
                return Some(self.add_right_edges(reg_up, e_first, e_last, e, false));
            }

            // Split the edges that pass close to the event, at the event.
            if edge_sign(p_dst_up, ev, isect) >= 0.0 {
                let above = self.region_above(reg_up);
                self.regions[above].dirty = true;
                self.regions[reg_up].dirty = true;
                self.mesh.split_edge(e_up ^ 1);
                let v = self.mesh.org(e_up) as usize;
                self.mesh.verts[v].s = ev.s;
                self.mesh.verts[v].t = ev.t;
            }
            if edge_sign(p_dst_lo, ev, isect) <= 0.0 {
                self.regions[reg_up].dirty = true;
                self.regions[reg_lo].dirty = true;
                self.mesh.split_edge(e_lo ^ 1);
                let v = self.mesh.org(e_lo) as usize;
                self.mesh.verts[v].s = ev.s;
                self.mesh.verts[v].t = ev.t;
            }
            return None;
        }

        // General case: split both edges at a new vertex and queue it.
        self.mesh.split_edge(e_up ^ 1);
        self.mesh.split_edge(e_lo ^ 1);
        let e_lo_oprev = self.mesh.oprev(e_lo);
        self.mesh.splice(e_lo_oprev, e_up);
        let v = self.mesh.org(e_up);
        self.mesh.verts[v as usize].s = isect.s;
        self.mesh.verts[v as usize].t = isect.t;
        let handle = {
            let leq = vertex_leq(&*self.mesh);
            self.pq.insert(v, &leq)
        };
        self.mesh.verts[v as usize].pq_handle = handle;
        trace!(s = isect.s, t = isect.t, "intersection vertex");
        self.get_intersect_data(v, org_up, dst_up, org_lo, dst_lo);

        let above = self.region_above(reg_up);
        self.regions[above].dirty = true;
        self.regions[reg_up].dirty = true;
        self.regions[reg_lo].dirty = true;
        None
    }

    /// Restores the dictionary invariants for every dirty region, starting
    /// at `reg_up` and moving up and down as regions become dirty.
    fn walk_dirty_regions(&mut self, reg_up: RegionIdx) {
        let mut reg_up = reg_up;
        let mut reg_lo = self.region_below(reg_up);

        loop {
            // Find the lowest dirty region.
            while self.regions[reg_lo].dirty {
                reg_up = reg_lo;
                reg_lo = self.region_below(reg_lo);
            }
            if !self.regions[reg_up].dirty {
                reg_lo = reg_up;
                reg_up = self.region_above(reg_up);
                if reg_up == INVALID || !self.regions[reg_up].dirty {
                    return;
                }
            }
            self.regions[reg_up].dirty = false;
            let mut e_up = self.regions[reg_up].e_up;
            let mut e_lo = self.regions[reg_lo].e_up;

            if self.mesh.dst(e_up) != self.mesh.dst(e_lo) && self.check_for_left_splice(reg_up) {
                // A temporary edge that took part in the splice is no longer needed.
                if self.regions[reg_lo].fix_upper_edge {
                    self.delete_region(reg_lo);
                    self.mesh.delete_edge(e_lo);
                    reg_lo = self.region_below(reg_up);
                    e_lo = self.regions[reg_lo].e_up;
                } else if self.regions[reg_up].fix_upper_edge {
                    self.delete_region(reg_up);
                    self.mesh.delete_edge(e_up);
                    reg_up = self.region_above(reg_lo);
                    e_up = self.regions[reg_up].e_up;
                }
            }

            if self.mesh.org(e_up) != self.mesh.org(e_lo) {
                if self.mesh.dst(e_up) != self.mesh.dst(e_lo)
                    && !self.regions[reg_up].fix_upper_edge
                    && !self.regions[reg_lo].fix_upper_edge
                    && (self.mesh.dst(e_up) == self.event || self.mesh.dst(e_lo) == self.event)
                {
                    if let Some(restart) = self.check_for_intersect(reg_up) {
                        reg_up = restart;
                        reg_lo = self.region_below(reg_up);
                        continue;
                    }
                } else {
                    self.check_for_right_splice(reg_up);
                }
            }

            if self.mesh.org(e_up) == self.mesh.org(e_lo) && self.mesh.dst(e_up) == self.mesh.dst(e_lo) {
                // A degenerate loop of two edges: merge them.
                self.add_winding(e_lo, e_up);
                self.delete_region(reg_up);
                self.mesh.delete_edge(e_up);
                reg_up = self.region_above(reg_lo);
            }
        }
    }

    // ──────────────────────────── Events ────────────────────────────

    /// The event has no right-going edges: connect it to the mesh with a
    /// temporary edge so its left edges can be finished.
    fn connect_right_vertex(&mut self, reg_up: RegionIdx, e_bottom_left: EdgeIdx) {
        let mut reg_up = reg_up;
        let mut e_bottom_left = e_bottom_left;
        let mut e_top_left = self.mesh.onext(e_bottom_left);
        let reg_lo = self.region_below(reg_up);
        let e_up = self.regions[reg_up].e_up;
        let e_lo = self.regions[reg_lo].e_up;
        let mut degenerate = false;

        if self.mesh.dst(e_up) != self.mesh.dst(e_lo) {
            if let Some(restart) = self.check_for_intersect(reg_up) {
                self.walk_dirty_regions(restart);
            }
        }

        // An intersection may have left an edge origin at the event.
        let ev = self.mesh.st(self.event);
        if vert_eq(self.mesh.st(self.mesh.org(e_up)), ev) {
            let e_top_oprev = self.mesh.oprev(e_top_left);
            self.mesh.splice(e_top_oprev, e_up);
            reg_up = self.top_left_region(reg_up);
            let below = self.region_below(reg_up);
            e_top_left = self.regions[below].e_up;
            self.finish_left_regions(below, reg_lo);
            degenerate = true;
        }
        if vert_eq(self.mesh.st(self.mesh.org(e_lo)), ev) {
            let e_lo_oprev = self.mesh.oprev(e_lo);
            self.mesh.splice(e_bottom_left, e_lo_oprev);
            e_bottom_left = self.finish_left_regions(reg_lo, INVALID);
            degenerate = true;
        }
        if degenerate {
            let e_first = self.mesh.onext(e_bottom_left);
            self.add_right_edges(reg_up, e_first, e_top_left, e_top_left, true);
            return;
        }

        // Connect to the closer of e_lo.org and e_up.org.
        let target = if vert_leq(self.mesh.st(self.mesh.org(e_lo)), self.mesh.st(self.mesh.org(e_up))) {
            self.mesh.oprev(e_lo)
        } else {
            e_up
        };
        let e_bl_lprev = self.mesh.lprev(e_bottom_left);
        let e_new = self.mesh.connect(e_bl_lprev, target);

        let e_next = self.mesh.onext(e_new);
        self.add_right_edges(reg_up, e_new, e_next, e_next, false);
        let fixable = self.mesh.edges[(e_new ^ 1) as usize].active_region;
        self.regions[fixable].fix_upper_edge = true;
        self.walk_dirty_regions(reg_up);
    }

    /// The event lies on the upper edge of `reg_up` (or on one of its
    /// endpoints).
    fn connect_left_degenerate(&mut self, reg_up: RegionIdx, v_event: VertIdx) {
        let e = self.regions[reg_up].e_up;
        let p_event = self.mesh.st(v_event);
        let an_edge = self.mesh.verts[v_event as usize].an_edge;

        if vert_eq(self.mesh.st(self.mesh.org(e)), p_event) {
            // e.org is still unprocessed: merge now, it will be pulled from
            // the queue later.
            self.splice_merge_vertices(e, an_edge);
            return;
        }

        if !vert_eq(self.mesh.st(self.mesh.dst(e)), p_event) {
            // The event lies in the interior of e: split it.
            self.mesh.split_edge(e ^ 1);
            if self.regions[reg_up].fix_upper_edge {
                // The half of e left of the event is no longer needed.
                let e_onext = self.mesh.onext(e);
                self.mesh.delete_edge(e_onext);
                self.regions[reg_up].fix_upper_edge = false;
            }
            self.mesh.splice(an_edge, e);
            self.sweep_event(v_event);
            return;
        }

        // The event coincides with e.dst, which was processed already.
        let reg_up = self.top_right_region(reg_up);
        let reg = self.region_below(reg_up);
        let mut e_top_right = self.regions[reg].e_up ^ 1;
        let e_last = self.mesh.onext(e_top_right);
        let mut e_top_left = e_last;
        if self.regions[reg].fix_upper_edge {
            debug_assert_ne!(e_top_left, e_top_right);
            self.delete_region(reg);
            self.mesh.delete_edge(e_top_right);
            e_top_right = self.mesh.oprev(e_top_left);
        }
        self.mesh.splice(an_edge, e_top_right);
        if !self.mesh.edge_goes_left(e_top_left) {
            e_top_left = INVALID;
        }
        let e_first = self.mesh.onext(e_top_right);
        self.add_right_edges(reg_up, e_first, e_last, e_top_left, true);
    }

    /// The event has no left-going edges: locate its containing region and
    /// connect it into the mesh if that region is inside.
    fn connect_left_vertex(&mut self, v_event: VertIdx) {
        let an_edge = self.mesh.verts[v_event as usize].an_edge;
        let tmp = an_edge ^ 1;

        let reg_up = {
            let mesh = &*self.mesh;
            let regions = &self.regions;
            let event = self.event;
            let node = self.dict.search(|k| edge_leq(mesh, event, tmp, regions[k].e_up));
            self.dict.key(node)
        };
        let reg_lo = self.region_below(reg_up);
        let e_up = self.regions[reg_up].e_up;
        let e_lo = self.regions[reg_lo].e_up;

        let p_event = self.mesh.st(v_event);
        if edge_sign(self.mesh.st(self.mesh.dst(e_up)), p_event, self.mesh.st(self.mesh.org(e_up))) == 0.0 {
            self.connect_left_degenerate(reg_up, v_event);
            return;
        }

        // Connect to the closer of e_lo.dst and e_up.dst.
        let reg = if vert_leq(self.mesh.st(self.mesh.dst(e_lo)), self.mesh.st(self.mesh.dst(e_up))) {
            reg_up
        } else {
            reg_lo
        };

        if self.regions[reg_up].inside || self.regions[reg].fix_upper_edge {
            let e_new = if reg == reg_up {
                let e_up_lnext = self.mesh.lnext(e_up);
                self.mesh.connect(an_edge ^ 1, e_up_lnext)
            } else {
                let e_lo_dnext = self.mesh.dnext(e_lo);
                self.mesh.connect(e_lo_dnext, an_edge) ^ 1
            };
            if self.regions[reg].fix_upper_edge {
                self.fix_upper_edge(reg, e_new);
            } else {
                let r = self.add_region_below(reg_up, e_new);
                self.compute_winding(r);
            }
            self.sweep_event(v_event);
        } else {
            // Outside: no connection needed, just add the edges.
            self.add_right_edges(reg_up, an_edge, an_edge, INVALID, true);
        }
    }

    fn sweep_event(&mut self, v_event: VertIdx) {
        self.event = v_event;
        trace!(v = v_event, s = self.mesh.verts[v_event as usize].s, t = self.mesh.verts[v_event as usize].t, "sweep event");

        // Look for an edge already in the dictionary.
        let an_edge = self.mesh.verts[v_event as usize].an_edge;
        let mut e = an_edge;
        while self.mesh.edges[e as usize].active_region == INVALID {
            e = self.mesh.onext(e);
            if e == an_edge {
                self.connect_left_vertex(v_event);
                return;
            }
        }

        // Finish the regions ending at the event, from the top down.
        let reg_up = self.top_left_region(self.mesh.edges[e as usize].active_region);
        let reg = self.region_below(reg_up);
        let e_top_left = self.regions[reg].e_up;
        let e_bottom_left = self.finish_left_regions(reg, INVALID);

        if self.mesh.onext(e_bottom_left) == e_top_left {
            // No right-going edges.
            self.connect_right_vertex(reg_up, e_bottom_left);
        } else {
            let e_first = self.mesh.onext(e_bottom_left);
            self.add_right_edges(reg_up, e_first, e_top_left, e_top_left, true);
        }
    }

    // ──────────────────────────── Setup and teardown ────────────────────────────

    fn add_sentinel(&mut self, t: Real) {
        let e = self.mesh.make_edge();
        let org = self.mesh.org(e) as usize;
        let dst = self.mesh.dst(e) as usize;
        self.mesh.verts[org].s = SENTINEL_COORD;
        self.mesh.verts[org].t = t;
        self.mesh.verts[dst].s = -SENTINEL_COORD;
        self.mesh.verts[dst].t = t;
        self.event = dst as VertIdx;

        let reg = self.regions.alloc(ActiveRegion {
            sentinel: true,
            ..ActiveRegion::new(e)
        });
        let node = {
            let mesh = &*self.mesh;
            let regions = &self.regions;
            let event = self.event;
            self.dict
                .insert(reg, |a, b| edge_leq(mesh, event, regions[a].e_up, regions[b].e_up))
        };
        self.regions[reg].node_up = node;
    }

    fn init_edge_dict(&mut self) {
        self.add_sentinel(-SENTINEL_COORD);
        self.add_sentinel(SENTINEL_COORD);
    }

    fn done_edge_dict(&mut self) {
        let mut fixed = 0;
        loop {
            let reg = self.dict.key(self.dict.min());
            if reg == INVALID {
                break;
            }
            // Only the sentinels and at most one temporary edge survive the sweep.
            if !self.regions[reg].sentinel {
                debug_assert!(self.regions[reg].fix_upper_edge);
                fixed += 1;
                debug_assert_eq!(fixed, 1);
            }
            debug_assert_eq!(self.regions[reg].winding_number, 0);
            self.delete_region(reg);
        }
    }

    /// Removes zero-length edges and contours with fewer than three edges.
    fn remove_degenerate_edges(&mut self) {
        let mut e = self.mesh.edges[E_HEAD as usize].next;
        while e != E_HEAD {
            let mut e_next = self.mesh.edges[e as usize].next;
            let mut e_lnext = self.mesh.lnext(e);

            if vert_eq(self.mesh.st(self.mesh.org(e)), self.mesh.st(self.mesh.dst(e)))
                && self.mesh.lnext(e_lnext) != e
            {
                // Zero-length edge in a contour with at least three edges.
                self.splice_merge_vertices(e_lnext, e);
                self.mesh.delete_edge(e);
                e = e_lnext;
                e_lnext = self.mesh.lnext(e);
            }

            if self.mesh.lnext(e_lnext) == e {
                // Degenerate contour of one or two edges.
                if e_lnext != e {
                    if e_lnext == e_next || e_lnext == e_next ^ 1 {
                        e_next = self.mesh.edges[e_next as usize].next;
                    }
                    self.mesh.delete_edge(e_lnext);
                }
                if e == e_next || e == e_next ^ 1 {
                    e_next = self.mesh.edges[e_next as usize].next;
                }
                self.mesh.delete_edge(e);
            }
            e = e_next;
        }
    }

    fn init_priority_queue(&mut self) {
        let verts = self.mesh.vertex_list();
        let handles: Vec<_> = {
            let leq = vertex_leq(&*self.mesh);
            let handles = verts.iter().map(|&v| self.pq.insert(v, &leq)).collect();
            self.pq.init(&leq);
            handles
        };
        for (v, h) in verts.into_iter().zip(handles) {
            self.mesh.verts[v as usize].pq_handle = h;
        }
    }

    /// Deletes faces with only two edges, including those left by the
    /// sentinels.
    fn remove_degenerate_faces(&mut self) {
        let mut f = self.mesh.faces[F_HEAD as usize].next;
        while f != F_HEAD {
            let f_next = self.mesh.faces[f as usize].next;
            let e = self.mesh.faces[f as usize].an_edge;
            debug_assert_ne!(self.mesh.lnext(e), e);
            if self.mesh.lnext(self.mesh.lnext(e)) == e {
                let e_onext = self.mesh.onext(e);
                self.add_winding(e_onext, e);
                self.mesh.delete_edge(e);
            }
            f = f_next;
        }
    }

    fn run(&mut self) {
        self.remove_degenerate_edges();
        self.init_priority_queue();
        self.init_edge_dict();

        loop {
            let v = {
                let leq = vertex_leq(&*self.mesh);
                self.pq.extract_min(&leq)
            };
            if v == INVALID {
                break;
            }
            // Merge every pending vertex that coincides with v.
            loop {
                let next = {
                    let leq = vertex_leq(&*self.mesh);
                    self.pq.minimum(&leq)
                };
                if next == INVALID || !vert_eq(self.mesh.st(next), self.mesh.st(v)) {
                    break;
                }
                let next = {
                    let leq = vertex_leq(&*self.mesh);
                    self.pq.extract_min(&leq)
                };
                let e1 = self.mesh.verts[v as usize].an_edge;
                let e2 = self.mesh.verts[next as usize].an_edge;
                self.splice_merge_vertices(e1, e2);
            }
            self.sweep_event(v);
        }

        self.done_edge_dict();
        self.remove_degenerate_faces();
        if cfg!(debug_assertions) {
            self.mesh.check_mesh();
        }
    }
}

/// Computes the planar arrangement of `mesh` and marks every face inside
/// or outside according to `rule`. Each inside face is monotone afterwards.
///
/// Edge windings must be set (+1 along each contour, -1 on the opposite
/// halves) and vertex sweep coordinates projected. Fails with
/// `NeedCombineCallback` when an intersection vertex got no data; the mesh
/// is still a valid arrangement in that case but must not be rendered.
pub fn compute_interior<C: Combiner>(mesh: &mut Mesh, rule: WindingRule, combiner: &mut C) -> Result<(), TessError> {
    let mut sweep = Sweep::new(mesh, rule, combiner);
    sweep.run();
    if sweep.fatal {
        Err(TessError::NeedCombineCallback)
    } else {
        Ok(())
    }
}
