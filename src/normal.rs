// Copyright 2025 The glutess Authors
// License: SGI Free Software License B (MIT-compatible)
//
// Plane selection and projection of input vertices to sweep coordinates.

use crate::geom::{Real, MAX_COORD};
use crate::mesh::{Mesh, F_HEAD, V_HEAD};

/// The frame a polygon was projected with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub normal: [Real; 3],
    pub s_unit: [Real; 3],
    pub t_unit: [Real; 3],
    /// The normal was derived from the vertices rather than supplied.
    pub computed: bool,
}

#[inline]
fn dot(u: &[Real; 3], v: &[Real; 3]) -> Real {
    u[0] * v[0] + u[1] * v[1] + u[2] * v[2]
}

/// Index of the component with the largest magnitude.
pub fn long_axis(v: &[Real; 3]) -> usize {
    let mut i = 0;
    if v[1].abs() > v[0].abs() {
        i = 1;
    }
    if v[2].abs() > v[i].abs() {
        i = 2;
    }
    i
}

/// Estimates a normal for the mesh vertices.
///
/// Takes the two vertices furthest apart along the axis of greatest spread
/// and the third vertex forming the largest triangle with them. Coincident
/// input yields +z; collinear input the long axis of the line.
pub fn compute_normal(mesh: &Mesh) -> [Real; 3] {
    let mut max_val = [-2.0 * MAX_COORD; 3];
    let mut min_val = [2.0 * MAX_COORD; 3];
    let mut max_vert = [V_HEAD; 3];
    let mut min_vert = [V_HEAD; 3];

    let mut v = mesh.verts[V_HEAD as usize].next;
    while v != V_HEAD {
        let c = mesh.verts[v as usize].coords;
        for i in 0..3 {
            if c[i] < min_val[i] {
                min_val[i] = c[i];
                min_vert[i] = v;
            }
            if c[i] > max_val[i] {
                max_val[i] = c[i];
                max_vert[i] = v;
            }
        }
        v = mesh.verts[v as usize].next;
    }

    let mut i = 0;
    if max_val[1] - min_val[1] > max_val[0] - min_val[0] {
        i = 1;
    }
    if max_val[2] - min_val[2] > max_val[i] - min_val[i] {
        i = 2;
    }
    if min_val[i] >= max_val[i] {
        // All vertices coincide; any normal will do.
        return [0.0, 0.0, 1.0];
    }

    let c1 = mesh.verts[min_vert[i] as usize].coords;
    let c2 = mesh.verts[max_vert[i] as usize].coords;
    let d1 = [c1[0] - c2[0], c1[1] - c2[1], c1[2] - c2[2]];

    let mut norm = [0.0; 3];
    let mut max_len2 = 0.0;
    let mut v = mesh.verts[V_HEAD as usize].next;
    while v != V_HEAD {
        let c = mesh.verts[v as usize].coords;
        let d2 = [c[0] - c2[0], c[1] - c2[1], c[2] - c2[2]];
        let tn = [
            d1[1] * d2[2] - d1[2] * d2[1],
            d1[2] * d2[0] - d1[0] * d2[2],
            d1[0] * d2[1] - d1[1] * d2[0],
        ];
        let len2 = dot(&tn, &tn);
        if len2 > max_len2 {
            max_len2 = len2;
            norm = tn;
        }
        v = mesh.verts[v as usize].next;
    }

    if max_len2 <= 0.0 {
        // All points on one line.
        norm = [0.0; 3];
        norm[long_axis(&d1)] = 1.0;
    }
    norm
}

/// Flips t if the contours' total signed area is negative, so that an
/// automatically chosen normal always sees the input as CCW overall.
/// Returns true if it flipped.
pub fn check_orientation(mesh: &mut Mesh) -> bool {
    let mut area = 0.0;
    let mut f = mesh.faces[F_HEAD as usize].next;
    while f != F_HEAD {
        let start = mesh.faces[f as usize].an_edge;
        if mesh.edges[start as usize].winding > 0 {
            let mut e = start;
            loop {
                let o = mesh.st(mesh.org(e));
                let d = mesh.st(mesh.dst(e));
                area += (o.s - d.s) * (o.t + d.t);
                e = mesh.lnext(e);
                if e == start {
                    break;
                }
            }
        }
        f = mesh.faces[f as usize].next;
    }

    if area < 0.0 {
        let mut v = mesh.verts[V_HEAD as usize].next;
        while v != V_HEAD {
            let vert = &mut mesh.verts[v as usize];
            vert.t = -vert.t;
            v = vert.next;
        }
        return true;
    }
    false
}

/// Projects every vertex onto the plane perpendicular to `normal`, or to a
/// computed normal when `normal` is zero.
///
/// The projection drops the normal's dominant coordinate, which is
/// numerically better than a true orthogonal projection.
pub fn project_polygon(mesh: &mut Mesh, normal: [Real; 3]) -> Projection {
    let computed = normal == [0.0; 3];
    let norm = if computed { compute_normal(mesh) } else { normal };

    let i = long_axis(&norm);
    let mut s_unit = [0.0; 3];
    let mut t_unit = [0.0; 3];
    s_unit[(i + 1) % 3] = 1.0;
    t_unit[(i + 2) % 3] = if norm[i] > 0.0 { 1.0 } else { -1.0 };

    let mut v = mesh.verts[V_HEAD as usize].next;
    while v != V_HEAD {
        let vert = &mut mesh.verts[v as usize];
        vert.s = dot(&vert.coords, &s_unit);
        vert.t = dot(&vert.coords, &t_unit);
        v = vert.next;
    }

    if computed && check_orientation(mesh) {
        t_unit = t_unit.map(|x| -x);
    }

    Projection {
        normal: norm,
        s_unit,
        t_unit,
        computed,
    }
}
