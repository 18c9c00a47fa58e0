// Copyright 2025 The glutess Authors
// License: SGI Free Software License B (MIT-compatible)
//
// Triangulation of monotone faces.

use crate::geom::{edge_sign, vert_leq};
use crate::mesh::{FaceIdx, Mesh, F_HEAD};

/// Triangulates one face, which must be monotone with respect to the sweep
/// direction and wound CCW.
///
/// Walks the upper and lower chains leftward from the rightmost vertex,
/// always advancing the chain whose next vertex is further left, and
/// connects it to the other chain while the resulting triangles stay CCW.
/// CW triangles are allowed where they cannot make the fan worse; that is
/// what lets a merely monotone (not convex) chain be fanned correctly.
pub fn tessellate_mono_region(mesh: &mut Mesh, face: FaceIdx) {
    let mut up = mesh.faces[face as usize].an_edge;
    assert!(
        mesh.lnext(up) != up && mesh.lnext(mesh.lnext(up)) != up,
        "monotone face needs at least three edges"
    );

    while vert_leq(mesh.st(mesh.dst(up)), mesh.st(mesh.org(up))) {
        up = mesh.lprev(up);
    }
    while vert_leq(mesh.st(mesh.org(up)), mesh.st(mesh.dst(up))) {
        up = mesh.lnext(up);
    }
    let mut lo = mesh.lprev(up);

    while mesh.lnext(up) != lo {
        if vert_leq(mesh.st(mesh.dst(up)), mesh.st(mesh.org(lo))) {
            // up.dst is on the left: fan out from lo.org.
            while mesh.lnext(lo) != up && {
                let next = mesh.lnext(lo);
                mesh.edge_goes_left(next)
                    || edge_sign(mesh.st(mesh.org(lo)), mesh.st(mesh.dst(lo)), mesh.st(mesh.dst(next)))
                        <= 0.0
            } {
                let next = mesh.lnext(lo);
                lo = mesh.connect(next, lo) ^ 1;
            }
            lo = mesh.lprev(lo);
        } else {
            // lo.org is on the left: fan out from up.dst.
            while mesh.lnext(lo) != up && {
                let prev = mesh.lprev(up);
                mesh.edge_goes_right(prev)
                    || edge_sign(mesh.st(mesh.dst(up)), mesh.st(mesh.org(up)), mesh.st(mesh.org(prev)))
                        >= 0.0
            } {
                let prev = mesh.lprev(up);
                up = mesh.connect(up, prev) ^ 1;
            }
            up = mesh.lnext(up);
        }
    }

    assert!(mesh.lnext(lo) != up);
    while mesh.lnext(mesh.lnext(lo)) != up {
        let next = mesh.lnext(lo);
        lo = mesh.connect(next, lo) ^ 1;
    }
}

/// Triangulates every face marked inside.
pub fn tessellate_interior(mesh: &mut Mesh) {
    let mut f = mesh.faces[F_HEAD as usize].next;
    while f != F_HEAD {
        // Faces created by the connects below are inserted before `f`.
        let next = mesh.faces[f as usize].next;
        if mesh.faces[f as usize].inside {
            tessellate_mono_region(mesh, f);
        }
        f = next;
    }
}
