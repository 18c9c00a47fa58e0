// Copyright 2025 The glutess Authors
// License: SGI Free Software License B (MIT-compatible)
//
// Half-edge mesh (Guibas/Stolfi quad-edge restricted to planar subdivisions).
//
// Layout:
//   - Every link is a u32 index into one of three arenas; INVALID marks an
//     absent link (a zapped face, a vertex that was killed).
//   - Half-edges are allocated in pairs: edges[e] and edges[e ^ 1]. The even
//     index is the one threaded on the global edge list, and the odd half's
//     `next` points back to the previous pair's odd half.
//   - Dummy heads: verts[0], faces[0], edges[0] / edges[1].
//   - Killed records keep their slots; a mesh lives for one polygon only.

use crate::geom::{vert_leq, Real, SweepPt};

pub const INVALID: u32 = u32::MAX;

/// Index into `Mesh::verts`
pub type VertIdx = u32;
/// Index into `Mesh::faces`
pub type FaceIdx = u32;
/// Index into `Mesh::edges`
pub type EdgeIdx = u32;

pub const V_HEAD: VertIdx = 0;
pub const F_HEAD: FaceIdx = 0;
pub const E_HEAD: EdgeIdx = 0;
pub const E_HEAD_SYM: EdgeIdx = 1;

/// The opposite half of a pair.
#[inline(always)]
pub fn sym(e: EdgeIdx) -> EdgeIdx {
    e ^ 1
}

#[derive(Clone, Debug)]
pub struct Vertex {
    pub next: VertIdx,
    pub prev: VertIdx,
    /// A half-edge with this vertex as origin.
    pub an_edge: EdgeIdx,
    pub coords: [Real; 3],
    pub s: Real,
    pub t: Real,
    /// Client data slot (index into the tessellator's vertex data table).
    pub data: u32,
    pub pq_handle: i32,
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            next: INVALID,
            prev: INVALID,
            an_edge: INVALID,
            coords: [0.0; 3],
            s: 0.0,
            t: 0.0,
            data: INVALID,
            pq_handle: 0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Face {
    pub next: FaceIdx,
    pub prev: FaceIdx,
    /// A half-edge with this face on its left.
    pub an_edge: EdgeIdx,
    /// Stack link used while growing fans and strips.
    pub trail: FaceIdx,
    pub marked: bool,
    pub inside: bool,
}

impl Default for Face {
    fn default() -> Self {
        Self {
            next: INVALID,
            prev: INVALID,
            an_edge: INVALID,
            trail: INVALID,
            marked: false,
            inside: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HalfEdge {
    /// Global edge list link; see the module header for the odd-half convention.
    pub next: EdgeIdx,
    /// Next edge CCW around the origin.
    pub onext: EdgeIdx,
    /// Next edge CCW around the left face.
    pub lnext: EdgeIdx,
    pub org: VertIdx,
    pub lface: FaceIdx,
    /// Active region while the edge crosses the sweep line.
    pub active_region: u32,
    /// Change in winding number when crossing from the right face to the left.
    pub winding: i32,
}

impl Default for HalfEdge {
    fn default() -> Self {
        Self {
            next: INVALID,
            onext: INVALID,
            lnext: INVALID,
            org: INVALID,
            lface: INVALID,
            active_region: INVALID,
            winding: 0,
        }
    }
}

pub struct Mesh {
    pub verts: Vec<Vertex>,
    pub faces: Vec<Face>,
    pub edges: Vec<HalfEdge>,
}

impl Mesh {
    pub fn new() -> Self {
        let v_head = Vertex {
            next: V_HEAD,
            prev: V_HEAD,
            ..Vertex::default()
        };
        let f_head = Face {
            next: F_HEAD,
            prev: F_HEAD,
            ..Face::default()
        };
        let e_head = HalfEdge {
            next: E_HEAD,
            ..HalfEdge::default()
        };
        let e_head_sym = HalfEdge {
            next: E_HEAD_SYM,
            ..HalfEdge::default()
        };
        Mesh {
            verts: vec![v_head],
            faces: vec![f_head],
            edges: vec![e_head, e_head_sym],
        }
    }

    // ──────────────────────────── Navigation ────────────────────────────

    #[inline]
    pub fn org(&self, e: EdgeIdx) -> VertIdx {
        self.edges[e as usize].org
    }

    #[inline]
    pub fn dst(&self, e: EdgeIdx) -> VertIdx {
        self.edges[(e ^ 1) as usize].org
    }

    #[inline]
    pub fn onext(&self, e: EdgeIdx) -> EdgeIdx {
        self.edges[e as usize].onext
    }

    #[inline]
    pub fn lnext(&self, e: EdgeIdx) -> EdgeIdx {
        self.edges[e as usize].lnext
    }

    #[inline]
    pub fn lface(&self, e: EdgeIdx) -> FaceIdx {
        self.edges[e as usize].lface
    }

    #[inline]
    pub fn rface(&self, e: EdgeIdx) -> FaceIdx {
        self.edges[(e ^ 1) as usize].lface
    }

    /// Sym.Lnext
    #[inline]
    pub fn oprev(&self, e: EdgeIdx) -> EdgeIdx {
        self.edges[(e ^ 1) as usize].lnext
    }

    /// Onext.Sym
    #[inline]
    pub fn lprev(&self, e: EdgeIdx) -> EdgeIdx {
        self.edges[e as usize].onext ^ 1
    }

    /// Lnext.Sym
    #[inline]
    pub fn dprev(&self, e: EdgeIdx) -> EdgeIdx {
        self.edges[e as usize].lnext ^ 1
    }

    /// Sym.Onext
    #[inline]
    pub fn rprev(&self, e: EdgeIdx) -> EdgeIdx {
        self.edges[(e ^ 1) as usize].onext
    }

    /// Rprev.Sym
    #[inline]
    pub fn dnext(&self, e: EdgeIdx) -> EdgeIdx {
        self.edges[(e ^ 1) as usize].onext ^ 1
    }

    /// Oprev.Sym
    #[inline]
    pub fn rnext(&self, e: EdgeIdx) -> EdgeIdx {
        self.edges[(e ^ 1) as usize].lnext ^ 1
    }

    /// Sweep-space position of a vertex.
    #[inline]
    pub fn st(&self, v: VertIdx) -> SweepPt {
        let v = &self.verts[v as usize];
        SweepPt::new(v.s, v.t)
    }

    #[inline]
    pub fn edge_goes_left(&self, e: EdgeIdx) -> bool {
        vert_leq(self.st(self.dst(e)), self.st(self.org(e)))
    }

    #[inline]
    pub fn edge_goes_right(&self, e: EdgeIdx) -> bool {
        vert_leq(self.st(self.org(e)), self.st(self.dst(e)))
    }

    // ──────────────────────── Allocation primitives ────────────────────────

    /// Allocates an edge pair forming a single loop (e.Onext = e, e.Lnext = e.Sym)
    /// and threads it onto the edge list just before `e_next`.
    fn make_edge_pair(&mut self, e_next: EdgeIdx) -> EdgeIdx {
        let e_next = e_next & !1;
        let e_new = self.edges.len() as EdgeIdx;
        let e_sym = e_new ^ 1;
        let e_prev = self.edges[(e_next ^ 1) as usize].next;

        self.edges.push(HalfEdge {
            next: e_next,
            onext: e_new,
            lnext: e_sym,
            ..HalfEdge::default()
        });
        self.edges.push(HalfEdge {
            next: e_prev,
            onext: e_sym,
            lnext: e_new,
            ..HalfEdge::default()
        });

        self.edges[(e_prev ^ 1) as usize].next = e_new;
        self.edges[(e_next ^ 1) as usize].next = e_sym;
        e_new
    }

    /// New vertex before `v_next`; every edge around `e_orig` gets it as origin.
    fn make_vertex(&mut self, e_orig: EdgeIdx, v_next: VertIdx) -> VertIdx {
        let v_new = self.verts.len() as VertIdx;
        let v_prev = self.verts[v_next as usize].prev;
        self.verts.push(Vertex {
            next: v_next,
            prev: v_prev,
            an_edge: e_orig,
            ..Vertex::default()
        });
        self.verts[v_prev as usize].next = v_new;
        self.verts[v_next as usize].prev = v_new;

        let mut e = e_orig;
        loop {
            self.edges[e as usize].org = v_new;
            e = self.edges[e as usize].onext;
            if e == e_orig {
                break;
            }
        }
        v_new
    }

    /// New face before `f_next`, inheriting its `inside` flag; every edge of
    /// the loop through `e_orig` gets it as left face.
    fn make_face(&mut self, e_orig: EdgeIdx, f_next: FaceIdx) -> FaceIdx {
        let f_new = self.faces.len() as FaceIdx;
        let f_prev = self.faces[f_next as usize].prev;
        let inside = self.faces[f_next as usize].inside;
        self.faces.push(Face {
            next: f_next,
            prev: f_prev,
            an_edge: e_orig,
            inside,
            ..Face::default()
        });
        self.faces[f_prev as usize].next = f_new;
        self.faces[f_next as usize].prev = f_new;

        let mut e = e_orig;
        loop {
            self.edges[e as usize].lface = f_new;
            e = self.edges[e as usize].lnext;
            if e == e_orig {
                break;
            }
        }
        f_new
    }

    fn kill_edge(&mut self, e_del: EdgeIdx) {
        let e_del = e_del & !1;
        let e_next = self.edges[e_del as usize].next;
        let e_prev = self.edges[(e_del ^ 1) as usize].next;
        self.edges[(e_next ^ 1) as usize].next = e_prev;
        self.edges[(e_prev ^ 1) as usize].next = e_next;

        for h in [e_del, e_del ^ 1] {
            self.edges[h as usize] = HalfEdge::default();
        }
    }

    fn kill_vertex(&mut self, v_del: VertIdx, new_org: VertIdx) {
        let e_start = self.verts[v_del as usize].an_edge;
        let mut e = e_start;
        loop {
            self.edges[e as usize].org = new_org;
            e = self.edges[e as usize].onext;
            if e == e_start {
                break;
            }
        }

        let v_prev = self.verts[v_del as usize].prev;
        let v_next = self.verts[v_del as usize].next;
        self.verts[v_next as usize].prev = v_prev;
        self.verts[v_prev as usize].next = v_next;

        let v = &mut self.verts[v_del as usize];
        v.next = INVALID;
        v.prev = INVALID;
        v.an_edge = INVALID;
    }

    fn kill_face(&mut self, f_del: FaceIdx, new_lface: FaceIdx) {
        let e_start = self.faces[f_del as usize].an_edge;
        let mut e = e_start;
        loop {
            self.edges[e as usize].lface = new_lface;
            e = self.edges[e as usize].lnext;
            if e == e_start {
                break;
            }
        }

        let f_prev = self.faces[f_del as usize].prev;
        let f_next = self.faces[f_del as usize].next;
        self.faces[f_next as usize].prev = f_prev;
        self.faces[f_prev as usize].next = f_next;

        let f = &mut self.faces[f_del as usize];
        f.next = INVALID;
        f.prev = INVALID;
        f.an_edge = INVALID;
    }

    /// Exchanges a.Onext and b.Onext, fixing up the Lnext links. Pure
    /// connectivity: vertex and face records are left to the caller.
    fn raw_splice(&mut self, a: EdgeIdx, b: EdgeIdx) {
        let a_onext = self.edges[a as usize].onext;
        let b_onext = self.edges[b as usize].onext;
        self.edges[(a_onext ^ 1) as usize].lnext = b;
        self.edges[(b_onext ^ 1) as usize].lnext = a;
        self.edges[a as usize].onext = b_onext;
        self.edges[b as usize].onext = a_onext;
    }

    // ──────────────────────── Public operations ────────────────────────

    /// One edge, two vertices and a single face loop.
    pub fn make_edge(&mut self) -> EdgeIdx {
        let e = self.make_edge_pair(E_HEAD);
        self.make_vertex(e, V_HEAD);
        self.make_vertex(e ^ 1, V_HEAD);
        self.make_face(e, F_HEAD);
        e
    }

    /// The basic connectivity-changing operation.
    ///
    /// If `e_org.org != e_dst.org` the two vertices merge (e_dst's is
    /// destroyed); otherwise the vertex is split in two. Independently, if
    /// `e_org.lface != e_dst.lface` the two faces merge (e_dst's is
    /// destroyed); otherwise the face is split in two.
    pub fn splice(&mut self, e_org: EdgeIdx, e_dst: EdgeIdx) {
        if e_org == e_dst {
            return;
        }

        let org_org = self.org(e_org);
        let dst_org = self.org(e_dst);
        let joining_vertices = dst_org != org_org;
        if joining_vertices {
            self.kill_vertex(dst_org, org_org);
        }
        let org_lface = self.lface(e_org);
        let dst_lface = self.lface(e_dst);
        let joining_loops = dst_lface != org_lface;
        if joining_loops {
            self.kill_face(dst_lface, org_lface);
        }

        self.raw_splice(e_dst, e_org);

        if !joining_vertices {
            self.make_vertex(e_dst, org_org);
            self.verts[org_org as usize].an_edge = e_org;
        }
        if !joining_loops {
            self.make_face(e_dst, org_lface);
            self.faces[org_lface as usize].an_edge = e_org;
        }
    }

    /// Removes an edge pair. Faces on either side merge, or an isolated
    /// endpoint (and a face left without edges) is destroyed.
    pub fn delete_edge(&mut self, e_del: EdgeIdx) {
        let e_del_sym = e_del ^ 1;

        let lface = self.lface(e_del);
        let rface = self.rface(e_del);
        let joining_loops = lface != rface;
        if joining_loops {
            self.kill_face(lface, rface);
        }

        if self.onext(e_del) == e_del {
            self.kill_vertex(self.org(e_del), INVALID);
        } else {
            let oprev = self.oprev(e_del);
            let rface = self.rface(e_del);
            self.faces[rface as usize].an_edge = oprev;
            let org = self.org(e_del);
            self.verts[org as usize].an_edge = self.onext(e_del);

            self.raw_splice(e_del, oprev);
            if !joining_loops {
                let lface = self.lface(e_del);
                self.make_face(e_del, lface);
            }
        }

        if self.onext(e_del_sym) == e_del_sym {
            self.kill_vertex(self.org(e_del_sym), INVALID);
            self.kill_face(self.lface(e_del_sym), INVALID);
        } else {
            let oprev = self.oprev(e_del_sym);
            let lface = self.lface(e_del);
            self.faces[lface as usize].an_edge = oprev;
            let org = self.org(e_del_sym);
            self.verts[org as usize].an_edge = self.onext(e_del_sym);
            self.raw_splice(e_del_sym, oprev);
        }

        self.kill_edge(e_del);
    }

    /// New edge `e_new = e_org.lnext` whose destination is a new vertex.
    /// Both halves share e_org's left face.
    pub fn add_edge_vertex(&mut self, e_org: EdgeIdx) -> EdgeIdx {
        let e_new = self.make_edge_pair(e_org);
        let e_new_sym = e_new ^ 1;

        let lnext = self.lnext(e_org);
        self.raw_splice(e_new, lnext);

        let org = self.dst(e_org);
        self.edges[e_new as usize].org = org;
        self.make_vertex(e_new_sym, org);

        let lface = self.lface(e_org);
        self.edges[e_new as usize].lface = lface;
        self.edges[e_new_sym as usize].lface = lface;
        e_new
    }

    /// Splits e_org into e_org and `e_new = e_org.lnext`, with a new vertex
    /// between them. Both keep e_org's winding contributions.
    pub fn split_edge(&mut self, e_org: EdgeIdx) -> EdgeIdx {
        let temp = self.add_edge_vertex(e_org);
        let e_new = temp ^ 1;
        let e_org_sym = e_org ^ 1;

        let oprev = self.oprev(e_org_sym);
        self.raw_splice(e_org_sym, oprev);
        self.raw_splice(e_org_sym, e_new);

        let mid = self.org(e_new);
        self.edges[e_org_sym as usize].org = mid;
        let far = self.dst(e_new);
        self.verts[far as usize].an_edge = e_new ^ 1;
        let rface = self.rface(e_org);
        self.edges[(e_new ^ 1) as usize].lface = rface;
        self.edges[e_new as usize].winding = self.edges[e_org as usize].winding;
        self.edges[(e_new ^ 1) as usize].winding = self.edges[e_org_sym as usize].winding;
        e_new
    }

    /// New edge from `e_org.dst` to `e_dst.org`. If the two edges share a
    /// left face it is split in two, otherwise the faces merge.
    pub fn connect(&mut self, e_org: EdgeIdx, e_dst: EdgeIdx) -> EdgeIdx {
        let e_new = self.make_edge_pair(e_org);
        let e_new_sym = e_new ^ 1;

        let org_lface = self.lface(e_org);
        let dst_lface = self.lface(e_dst);
        let joining_loops = dst_lface != org_lface;
        if joining_loops {
            self.kill_face(dst_lface, org_lface);
        }

        let lnext = self.lnext(e_org);
        self.raw_splice(e_new, lnext);
        self.raw_splice(e_new_sym, e_dst);

        self.edges[e_new as usize].org = self.dst(e_org);
        self.edges[e_new_sym as usize].org = self.org(e_dst);
        self.edges[e_new as usize].lface = org_lface;
        self.edges[e_new_sym as usize].lface = org_lface;
        self.faces[org_lface as usize].an_edge = e_new_sym;

        if !joining_loops {
            self.make_face(e_new, org_lface);
        }
        e_new
    }

    /// Destroys a face. Its edges lose their left face; any edge whose
    /// right face is also gone is deleted along with isolated vertices.
    pub fn zap_face(&mut self, f_zap: FaceIdx) {
        let e_start = self.faces[f_zap as usize].an_edge;
        let mut e_next = self.lnext(e_start);
        loop {
            let e = e_next;
            e_next = self.lnext(e);

            self.edges[e as usize].lface = INVALID;
            if self.rface(e) == INVALID {
                if self.onext(e) == e {
                    self.kill_vertex(self.org(e), INVALID);
                } else {
                    let org = self.org(e);
                    self.verts[org as usize].an_edge = self.onext(e);
                    let oprev = self.oprev(e);
                    self.raw_splice(e, oprev);
                }
                let e_sym = e ^ 1;
                if self.onext(e_sym) == e_sym {
                    self.kill_vertex(self.org(e_sym), INVALID);
                } else {
                    let org = self.org(e_sym);
                    self.verts[org as usize].an_edge = self.onext(e_sym);
                    let oprev = self.oprev(e_sym);
                    self.raw_splice(e_sym, oprev);
                }
                self.kill_edge(e);
            }

            if e == e_start {
                break;
            }
        }

        let f_prev = self.faces[f_zap as usize].prev;
        let f_next = self.faces[f_zap as usize].next;
        self.faces[f_next as usize].prev = f_prev;
        self.faces[f_prev as usize].next = f_next;
        let f = &mut self.faces[f_zap as usize];
        f.next = INVALID;
        f.prev = INVALID;
        f.an_edge = INVALID;
    }

    /// Resets every edge's winding: boundary edges between an inside and an
    /// outside face get `value` (positive with the inside on the left), all
    /// others get 0 or, with `keep_only_boundary`, are deleted.
    pub fn set_winding_number(&mut self, value: i32, keep_only_boundary: bool) {
        let mut e = self.edges[E_HEAD as usize].next;
        while e != E_HEAD {
            let e_next = self.edges[e as usize].next;
            let l_inside = self.faces[self.lface(e) as usize].inside;
            let r_inside = self.faces[self.rface(e) as usize].inside;
            if r_inside != l_inside {
                self.edges[e as usize].winding = if l_inside { value } else { -value };
            } else if !keep_only_boundary {
                self.edges[e as usize].winding = 0;
            } else {
                self.delete_edge(e);
            }
            e = e_next;
        }
    }

    /// Number of edges around a face loop.
    pub fn count_face_verts(&self, f: FaceIdx) -> usize {
        let e_start = self.faces[f as usize].an_edge;
        let mut e = e_start;
        let mut n = 0;
        loop {
            n += 1;
            e = self.lnext(e);
            if e == e_start {
                break;
            }
        }
        n
    }

    /// Live faces, in list order.
    pub fn face_list(&self) -> Vec<FaceIdx> {
        let mut out = Vec::new();
        let mut f = self.faces[F_HEAD as usize].next;
        while f != F_HEAD {
            out.push(f);
            f = self.faces[f as usize].next;
        }
        out
    }

    /// Live vertices, in list order.
    pub fn vertex_list(&self) -> Vec<VertIdx> {
        let mut out = Vec::new();
        let mut v = self.verts[V_HEAD as usize].next;
        while v != V_HEAD {
            out.push(v);
            v = self.verts[v as usize].next;
        }
        out
    }

    /// Live edge pairs (even halves), in list order.
    pub fn edge_list(&self) -> Vec<EdgeIdx> {
        let mut out = Vec::new();
        let mut e = self.edges[E_HEAD as usize].next;
        while e != E_HEAD {
            out.push(e);
            e = self.edges[e as usize].next;
        }
        out
    }

    /// Walks every list and loop, panicking on the first broken invariant.
    pub fn check_mesh(&self) {
        let mut f_prev = F_HEAD;
        let mut f = self.faces[F_HEAD as usize].next;
        while f != F_HEAD {
            assert_eq!(self.faces[f as usize].prev, f_prev, "face list broken at {f}");
            let e_start = self.faces[f as usize].an_edge;
            let mut e = e_start;
            loop {
                self.check_half_edge(e);
                assert_eq!(self.lface(e), f, "edge {e} not on face {f}");
                e = self.lnext(e);
                if e == e_start {
                    break;
                }
            }
            f_prev = f;
            f = self.faces[f as usize].next;
        }
        assert_eq!(self.faces[F_HEAD as usize].prev, f_prev);
        assert_eq!(self.faces[F_HEAD as usize].an_edge, INVALID);

        let mut v_prev = V_HEAD;
        let mut v = self.verts[V_HEAD as usize].next;
        while v != V_HEAD {
            assert_eq!(self.verts[v as usize].prev, v_prev, "vertex list broken at {v}");
            let e_start = self.verts[v as usize].an_edge;
            let mut e = e_start;
            loop {
                self.check_half_edge(e);
                assert_eq!(self.org(e), v, "edge {e} not around vertex {v}");
                e = self.onext(e);
                if e == e_start {
                    break;
                }
            }
            v_prev = v;
            v = self.verts[v as usize].next;
        }
        assert_eq!(self.verts[V_HEAD as usize].prev, v_prev);
        assert_eq!(self.verts[V_HEAD as usize].an_edge, INVALID);

        let mut e_prev = E_HEAD;
        let mut e = self.edges[E_HEAD as usize].next;
        while e != E_HEAD {
            assert_eq!(self.edges[(e ^ 1) as usize].next, e_prev ^ 1, "edge list broken at {e}");
            self.check_half_edge(e);
            assert_ne!(self.org(e), INVALID);
            assert_ne!(self.dst(e), INVALID);
            e_prev = e;
            e = self.edges[e as usize].next;
        }
        assert_eq!(self.edges[E_HEAD_SYM as usize].next, e_prev ^ 1);
        assert_eq!(self.org(E_HEAD), INVALID);
        assert_eq!(self.dst(E_HEAD), INVALID);
        assert_eq!(self.lface(E_HEAD), INVALID);
        assert_eq!(self.rface(E_HEAD), INVALID);
    }

    fn check_half_edge(&self, e: EdgeIdx) {
        assert_eq!(self.onext(self.lnext(e)) ^ 1, e, "lnext.onext.sym != e at {e}");
        assert_eq!(self.lnext(self.onext(e) ^ 1), e, "onext.sym.lnext != e at {e}");
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a closed contour the way the tessellator does: one self-loop
    /// edge, then one split per further vertex.
    fn contour(mesh: &mut Mesh, pts: &[(Real, Real)]) -> EdgeIdx {
        let mut e = INVALID;
        for &(s, t) in pts {
            if e == INVALID {
                e = mesh.make_edge();
                mesh.splice(e, e ^ 1);
            } else {
                mesh.split_edge(e);
                e = mesh.lnext(e);
            }
            let v = mesh.org(e) as usize;
            mesh.verts[v].s = s;
            mesh.verts[v].t = t;
            mesh.verts[v].coords = [s, t, 0.0];
            mesh.edges[e as usize].winding = 1;
            mesh.edges[(e ^ 1) as usize].winding = -1;
        }
        e
    }

    #[test]
    fn make_edge_creates_single_loop() {
        let mut mesh = Mesh::new();
        let e = mesh.make_edge();
        assert_eq!(mesh.vertex_list().len(), 2);
        assert_eq!(mesh.face_list().len(), 1);
        assert_eq!(mesh.edge_list(), vec![e]);
        assert_ne!(mesh.org(e), mesh.dst(e));
        assert_eq!(mesh.lface(e), mesh.rface(e));
        mesh.check_mesh();
    }

    #[test]
    fn sym_involution() {
        for e in 0u32..16 {
            assert_eq!(sym(sym(e)), e);
        }
    }

    #[test]
    fn splice_merges_then_splits_vertices() {
        let mut mesh = Mesh::new();
        let e = mesh.make_edge();
        mesh.splice(e, e ^ 1);
        // A self-loop: one vertex, two faces.
        assert_eq!(mesh.vertex_list().len(), 1);
        assert_eq!(mesh.face_list().len(), 2);
        assert_eq!(mesh.org(e), mesh.dst(e));
        mesh.check_mesh();

        mesh.splice(e, e ^ 1);
        assert_eq!(mesh.vertex_list().len(), 2);
        assert_eq!(mesh.face_list().len(), 1);
        mesh.check_mesh();
    }

    #[test]
    fn contour_has_two_faces() {
        let mut mesh = Mesh::new();
        let e = contour(&mut mesh, &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]);
        assert_eq!(mesh.vertex_list().len(), 3);
        assert_eq!(mesh.edge_list().len(), 3);
        assert_eq!(mesh.face_list().len(), 2);
        assert_eq!(mesh.count_face_verts(mesh.lface(e)), 3);
        assert_eq!(mesh.count_face_verts(mesh.rface(e)), 3);
        mesh.check_mesh();
    }

    #[test]
    fn split_edge_keeps_winding_and_faces() {
        let mut mesh = Mesh::new();
        let e = contour(&mut mesh, &[(0.0, 0.0), (2.0, 0.0), (0.0, 2.0)]);
        let far = mesh.dst(e);
        let e_new = mesh.split_edge(e);
        assert_eq!(mesh.lnext(e), e_new);
        assert_eq!(mesh.dst(e), mesh.org(e_new));
        assert_eq!(mesh.dst(e_new), far);
        assert_eq!(mesh.edges[e_new as usize].winding, 1);
        assert_eq!(mesh.edges[(e_new ^ 1) as usize].winding, -1);
        assert_eq!(mesh.lface(e_new), mesh.lface(e));
        assert_eq!(mesh.rface(e_new), mesh.rface(e));
        assert_eq!(mesh.vertex_list().len(), 4);
        mesh.check_mesh();
    }

    #[test]
    fn connect_splits_and_delete_rejoins() {
        let mut mesh = Mesh::new();
        let e = contour(&mut mesh, &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let face = mesh.lface(e);
        assert_eq!(mesh.count_face_verts(face), 4);

        // Diagonal from (0,0) to (1,1).
        let target = mesh.lnext(mesh.lnext(mesh.lnext(e)));
        let diag = mesh.connect(e, target);
        assert_eq!(mesh.org(diag), mesh.dst(e));
        assert_eq!(mesh.dst(diag), mesh.org(target));
        assert_eq!(mesh.face_list().len(), 3);
        assert_eq!(mesh.count_face_verts(mesh.lface(diag)), 3);
        assert_eq!(mesh.count_face_verts(mesh.rface(diag)), 3);
        mesh.check_mesh();

        mesh.delete_edge(diag);
        assert_eq!(mesh.face_list().len(), 2);
        assert_eq!(mesh.edge_list().len(), 4);
        mesh.check_mesh();
    }

    #[test]
    fn delete_dangling_edge_removes_vertex() {
        let mut mesh = Mesh::new();
        let e = contour(&mut mesh, &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]);
        let spur = mesh.add_edge_vertex(e);
        assert_eq!(mesh.vertex_list().len(), 4);
        assert_eq!(mesh.lface(spur), mesh.rface(spur));
        mesh.check_mesh();

        mesh.delete_edge(spur);
        assert_eq!(mesh.vertex_list().len(), 3);
        assert_eq!(mesh.edge_list().len(), 3);
        mesh.check_mesh();
    }

    #[test]
    fn zap_both_faces_empties_mesh() {
        let mut mesh = Mesh::new();
        let e = contour(&mut mesh, &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]);
        let (l, r) = (mesh.lface(e), mesh.rface(e));
        mesh.zap_face(l);
        assert_eq!(mesh.face_list(), vec![r]);
        assert_eq!(mesh.edge_list().len(), 3);
        mesh.check_mesh();

        mesh.zap_face(r);
        assert!(mesh.face_list().is_empty());
        assert!(mesh.edge_list().is_empty());
        assert!(mesh.vertex_list().is_empty());
        mesh.check_mesh();
    }

    #[test]
    fn winding_reset_keeps_only_boundary() {
        let mut mesh = Mesh::new();
        let e = contour(&mut mesh, &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let target = mesh.lnext(mesh.lnext(mesh.lnext(e)));
        let diag = mesh.connect(e, target);
        let (l, r) = (mesh.lface(diag), mesh.rface(diag));
        mesh.faces[l as usize].inside = true;
        mesh.faces[r as usize].inside = true;

        mesh.set_winding_number(1, false);
        assert_eq!(mesh.edges[diag as usize].winding, 0);
        assert_eq!(mesh.edge_list().len(), 5);

        mesh.set_winding_number(1, true);
        assert_eq!(mesh.edge_list().len(), 4);
        for edge in mesh.edge_list() {
            let w = mesh.edges[edge as usize].winding;
            let inside_left = mesh.faces[mesh.lface(edge) as usize].inside;
            assert_eq!(w, if inside_left { 1 } else { -1 });
        }
        mesh.check_mesh();
    }

    #[test]
    fn edge_direction_predicates() {
        let mut mesh = Mesh::new();
        let last = contour(&mut mesh, &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]);
        // The closing edge runs from (0,1) back to (0,0); the next one from (0,0) to (1,0).
        let e = mesh.lnext(last);
        assert_eq!(mesh.st(mesh.org(e)), SweepPt::new(0.0, 0.0));
        assert!(mesh.edge_goes_right(e));
        assert!(!mesh.edge_goes_left(e));
        assert!(mesh.edge_goes_left(e ^ 1));
        // Straight down counts as going left.
        assert!(mesh.edge_goes_left(last));
    }
}
