// Copyright 2025 The glutess Authors
// License: SGI Free Software License B (MIT-compatible)
//
// Primitive output: groups triangulated faces into fans and strips, emits
// boundary loops, and renders small single-contour polygons straight from
// the vertex cache.

use crate::callback::PrimitiveKind;
use crate::config::WindingRule;
use crate::geom::Real;
use crate::mesh::{EdgeIdx, FaceIdx, Mesh, F_HEAD, INVALID};

/// Receives primitives as vertex data slots.
pub trait PrimitiveSink {
    fn begin(&mut self, kind: PrimitiveKind);
    fn vertex(&mut self, data: u32);
    fn edge_flag(&mut self, boundary: bool);
    fn end(&mut self);
}

#[derive(Clone, Copy, Debug)]
enum Grouping {
    Triangle,
    Fan,
    Strip,
}

/// A candidate primitive: how many triangles it covers and where it starts.
#[derive(Clone, Copy, Debug)]
struct FaceCount {
    size: usize,
    e_start: EdgeIdx,
    grouping: Grouping,
}

#[inline]
fn marked(mesh: &Mesh, f: FaceIdx) -> bool {
    let face = &mesh.faces[f as usize];
    !face.inside || face.marked
}

fn add_to_trail(mesh: &mut Mesh, f: FaceIdx, trail: FaceIdx) -> FaceIdx {
    let face = &mut mesh.faces[f as usize];
    face.trail = trail;
    face.marked = true;
    f
}

fn free_trail(mesh: &mut Mesh, mut trail: FaceIdx) {
    while trail != INVALID {
        let face = &mut mesh.faces[trail as usize];
        face.marked = false;
        trail = face.trail;
    }
}

/// Largest fan around `e_orig.org` containing `e_orig.lface`.
fn maximum_fan(mesh: &mut Mesh, e_orig: EdgeIdx) -> FaceCount {
    let mut size = 0;
    let mut trail = INVALID;

    let mut e = e_orig;
    while !marked(mesh, mesh.lface(e)) {
        let f = mesh.lface(e);
        trail = add_to_trail(mesh, f, trail);
        size += 1;
        e = mesh.onext(e);
    }
    let mut e = e_orig;
    while !marked(mesh, mesh.rface(e)) {
        let f = mesh.rface(e);
        trail = add_to_trail(mesh, f, trail);
        size += 1;
        e = mesh.oprev(e);
    }
    free_trail(mesh, trail);

    FaceCount {
        size,
        e_start: e,
        grouping: Grouping::Fan,
    }
}

/// Largest strip through `e_orig.lface` whose triangles all stay CCW.
///
/// A strip starting at one end alternates orientation, so the side walked
/// first must hold an even number of triangles; when both sides are odd
/// the strip loses one triangle.
fn maximum_strip(mesh: &mut Mesh, e_orig: EdgeIdx) -> FaceCount {
    let mut tail_size = 0usize;
    let mut head_size = 0usize;
    let mut trail = INVALID;

    let mut e = e_orig;
    while !marked(mesh, mesh.lface(e)) {
        let f = mesh.lface(e);
        trail = add_to_trail(mesh, f, trail);
        tail_size += 1;
        e = mesh.lnext(e) ^ 1;
        if marked(mesh, mesh.lface(e)) {
            break;
        }
        let f = mesh.lface(e);
        trail = add_to_trail(mesh, f, trail);
        tail_size += 1;
        e = mesh.onext(e);
    }
    let e_tail = e;

    let mut e = e_orig;
    while !marked(mesh, mesh.rface(e)) {
        let f = mesh.rface(e);
        trail = add_to_trail(mesh, f, trail);
        head_size += 1;
        e = mesh.oprev(e);
        if marked(mesh, mesh.rface(e)) {
            break;
        }
        let f = mesh.rface(e);
        trail = add_to_trail(mesh, f, trail);
        head_size += 1;
        e = mesh.dnext(e);
    }
    let e_head = e;
    free_trail(mesh, trail);

    let mut size = tail_size + head_size;
    let e_start = if tail_size % 2 == 0 {
        e_tail ^ 1
    } else if head_size % 2 == 0 {
        e_head
    } else {
        // Start from e_head so e_orig.lface is still covered.
        size -= 1;
        mesh.onext(e_head)
    };
    FaceCount {
        size,
        e_start,
        grouping: Grouping::Strip,
    }
}

fn render_fan<S: PrimitiveSink>(mesh: &mut Mesh, sink: &mut S, mut e: EdgeIdx, mut size: usize) {
    sink.begin(PrimitiveKind::TriangleFan);
    sink.vertex(mesh.verts[mesh.org(e) as usize].data);
    sink.vertex(mesh.verts[mesh.dst(e) as usize].data);
    while !marked(mesh, mesh.lface(e)) {
        let f = mesh.lface(e) as usize;
        mesh.faces[f].marked = true;
        size -= 1;
        e = mesh.onext(e);
        sink.vertex(mesh.verts[mesh.dst(e) as usize].data);
    }
    debug_assert_eq!(size, 0);
    sink.end();
}

fn render_strip<S: PrimitiveSink>(mesh: &mut Mesh, sink: &mut S, mut e: EdgeIdx, mut size: usize) {
    sink.begin(PrimitiveKind::TriangleStrip);
    sink.vertex(mesh.verts[mesh.org(e) as usize].data);
    sink.vertex(mesh.verts[mesh.dst(e) as usize].data);
    while !marked(mesh, mesh.lface(e)) {
        let f = mesh.lface(e) as usize;
        mesh.faces[f].marked = true;
        size -= 1;
        e = mesh.lnext(e) ^ 1;
        sink.vertex(mesh.verts[mesh.org(e) as usize].data);
        if marked(mesh, mesh.lface(e)) {
            break;
        }
        let f = mesh.lface(e) as usize;
        mesh.faces[f].marked = true;
        size -= 1;
        e = mesh.onext(e);
        sink.vertex(mesh.verts[mesh.dst(e) as usize].data);
    }
    debug_assert_eq!(size, 0);
    sink.end();
}

/// Renders the best primitive through `f_orig`, or queues it as a lonely
/// triangle.
fn render_maximum_face_group<S: PrimitiveSink>(
    mesh: &mut Mesh,
    sink: &mut S,
    f_orig: FaceIdx,
    flag_boundary: bool,
    lonely: &mut FaceIdx,
) {
    let e = mesh.faces[f_orig as usize].an_edge;
    let mut max = FaceCount {
        size: 1,
        e_start: e,
        grouping: Grouping::Triangle,
    };

    if !flag_boundary {
        let starts = [e, mesh.lnext(e), mesh.lprev(e)];
        for start in starts {
            let candidate = maximum_fan(mesh, start);
            if candidate.size > max.size {
                max = candidate;
            }
        }
        for start in starts {
            let candidate = maximum_strip(mesh, start);
            if candidate.size > max.size {
                max = candidate;
            }
        }
    }

    match max.grouping {
        Grouping::Triangle => {
            debug_assert_eq!(max.size, 1);
            let f = mesh.lface(max.e_start);
            *lonely = add_to_trail(mesh, f, *lonely);
        }
        Grouping::Fan => render_fan(mesh, sink, max.e_start, max.size),
        Grouping::Strip => render_strip(mesh, sink, max.e_start, max.size),
    }
}

/// Emits the queued triangles as one `Triangles` primitive. With
/// `flag_boundary`, an edge flag precedes the first vertex of each run of
/// boundary (or interior) edges.
fn render_lonely_triangles<S: PrimitiveSink>(mesh: &Mesh, sink: &mut S, mut f: FaceIdx, flag_boundary: bool) {
    // Forces a flag before the very first vertex.
    let mut edge_state: Option<bool> = None;

    sink.begin(PrimitiveKind::Triangles);
    while f != INVALID {
        let start = mesh.faces[f as usize].an_edge;
        let mut e = start;
        loop {
            if flag_boundary {
                let boundary = !mesh.faces[mesh.rface(e) as usize].inside;
                if edge_state != Some(boundary) {
                    edge_state = Some(boundary);
                    sink.edge_flag(boundary);
                }
            }
            sink.vertex(mesh.verts[mesh.org(e) as usize].data);
            e = mesh.lnext(e);
            if e == start {
                break;
            }
        }
        f = mesh.faces[f as usize].trail;
    }
    sink.end();
}

/// Breaks the inside faces of a triangulated mesh into fans, strips and
/// separate triangles, as few primitives as the greedy grouping finds.
///
/// `flag_boundary` disables fans and strips so that each triangle edge can
/// carry its boundary flag.
pub fn render_mesh<S: PrimitiveSink>(mesh: &mut Mesh, sink: &mut S, flag_boundary: bool) {
    let mut f = mesh.faces[F_HEAD as usize].next;
    while f != F_HEAD {
        mesh.faces[f as usize].marked = false;
        f = mesh.faces[f as usize].next;
    }

    let mut lonely = INVALID;
    let mut f = mesh.faces[F_HEAD as usize].next;
    while f != F_HEAD {
        let face = &mesh.faces[f as usize];
        if face.inside && !face.marked {
            render_maximum_face_group(mesh, sink, f, flag_boundary, &mut lonely);
            debug_assert!(mesh.faces[f as usize].marked);
        }
        f = mesh.faces[f as usize].next;
    }

    if lonely != INVALID {
        render_lonely_triangles(mesh, sink, lonely, flag_boundary);
    }
}

/// One `LineLoop` per inside face, in face-loop order.
pub fn render_boundary<S: PrimitiveSink>(mesh: &Mesh, sink: &mut S) {
    let mut f = mesh.faces[F_HEAD as usize].next;
    while f != F_HEAD {
        if mesh.faces[f as usize].inside {
            sink.begin(PrimitiveKind::LineLoop);
            let start = mesh.faces[f as usize].an_edge;
            let mut e = start;
            loop {
                sink.vertex(mesh.verts[mesh.org(e) as usize].data);
                e = mesh.lnext(e);
                if e == start {
                    break;
                }
            }
            sink.end();
        }
        f = mesh.faces[f as usize].next;
    }
}

// ──────────────────────────── Vertex cache ────────────────────────────

/// A vertex of a polygon's first contour, held back until the polygon is
/// known to need the full pipeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CachedVertex {
    pub coords: [Real; 3],
    pub data: u32,
}

/// Orientation of the fan from the first cached vertex.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FanSign {
    Ccw,
    Cw,
    /// Every fan triangle has zero area.
    Degenerate,
    Inconsistent,
}

/// Sum-of-triangles normal of the fan from `v[0]`. Back-facing triangles
/// are subtracted rather than added so that a self-intersecting contour
/// (a bowtie) still yields a normal of reasonable length.
pub fn cache_normal(v: &[CachedVertex]) -> [Real; 3] {
    let mut norm = [0.0; 3];
    let Some((first, rest)) = v.split_first() else {
        return norm;
    };
    let rel = |c: &CachedVertex| {
        [
            c.coords[0] - first.coords[0],
            c.coords[1] - first.coords[1],
            c.coords[2] - first.coords[2],
        ]
    };
    for pair in rest.windows(2) {
        let p = rel(&pair[0]);
        let c = rel(&pair[1]);
        let n = [p[1] * c[2] - p[2] * c[1], p[2] * c[0] - p[0] * c[2], p[0] * c[1] - p[1] * c[0]];
        let dot = n[0] * norm[0] + n[1] * norm[1] + n[2] * norm[2];
        if dot >= 0.0 {
            for i in 0..3 {
                norm[i] += n[i];
            }
        } else {
            for i in 0..3 {
                norm[i] -= n[i];
            }
        }
    }
    norm
}

/// Checks that every non-degenerate fan triangle from `v[0]` winds the same
/// way around `norm`.
pub fn fan_sign(v: &[CachedVertex], norm: [Real; 3]) -> FanSign {
    let mut sign = FanSign::Degenerate;
    let Some((first, rest)) = v.split_first() else {
        return sign;
    };
    let rel = |c: &CachedVertex| {
        [
            c.coords[0] - first.coords[0],
            c.coords[1] - first.coords[1],
            c.coords[2] - first.coords[2],
        ]
    };
    for pair in rest.windows(2) {
        let p = rel(&pair[0]);
        let c = rel(&pair[1]);
        let n = [p[1] * c[2] - p[2] * c[1], p[2] * c[0] - p[0] * c[2], p[0] * c[1] - p[1] * c[0]];
        let dot = n[0] * norm[0] + n[1] * norm[1] + n[2] * norm[2];
        if dot > 0.0 {
            if sign == FanSign::Cw {
                return FanSign::Inconsistent;
            }
            sign = FanSign::Ccw;
        } else if dot < 0.0 {
            if sign == FanSign::Ccw {
                return FanSign::Inconsistent;
            }
            sign = FanSign::Cw;
        }
    }
    sign
}

/// Options for rendering from the cache.
#[derive(Clone, Copy, Debug)]
pub struct CacheRender {
    pub normal: [Real; 3],
    pub winding_rule: WindingRule,
    pub boundary_only: bool,
    /// Emit consistently oriented fans directly instead of running the sweep.
    pub fast_path: bool,
}

/// Tries to finish a single-contour polygon without building a mesh.
///
/// Returns true when the polygon is fully handled: fewer than three
/// vertices, an all-degenerate fan, or (with the fast path on) a
/// consistently oriented fan. Returns false when the full pipeline must run.
pub fn render_cache<S: PrimitiveSink>(v: &[CachedVertex], opts: CacheRender, sink: &mut S) -> bool {
    if v.len() < 3 {
        return true;
    }

    let norm = if opts.normal == [0.0; 3] {
        cache_normal(v)
    } else {
        opts.normal
    };

    let sign = match fan_sign(v, norm) {
        FanSign::Inconsistent => return false,
        FanSign::Degenerate => return true,
        s => s,
    };
    if !opts.fast_path {
        return false;
    }

    // A single simple contour has winding +1 (CCW) or -1 (CW) everywhere inside.
    let winding = if sign == FanSign::Ccw { 1 } else { -1 };
    if !opts.winding_rule.is_inside(winding) {
        return true;
    }

    let kind = if opts.boundary_only {
        PrimitiveKind::LineLoop
    } else if v.len() > 3 {
        PrimitiveKind::TriangleFan
    } else {
        PrimitiveKind::Triangles
    };
    sink.begin(kind);
    sink.vertex(v[0].data);
    if sign == FanSign::Ccw {
        for c in &v[1..] {
            sink.vertex(c.data);
        }
    } else {
        for c in v[1..].iter().rev() {
            sink.vertex(c.data);
        }
    }
    sink.end();
    true
}
