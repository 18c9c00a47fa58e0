// Copyright 2025 The glutess Authors
// License: SGI Free Software License B (MIT-compatible)
//
// Geometric predicates over projected sweep coordinates.
//
// Everything here works on (s, t) pairs: s is the primary sweep axis, t the
// secondary one. The evaluation formulas are chosen for numerical stability,
// not brevity; the whole sweep depends on them being consistent, so do not
// replace them with "equivalent" linear blends.

pub type Real = f64;

/// Largest accepted input coordinate magnitude; larger values are clamped.
pub const MAX_COORD: Real = 1.0e150;

/// A point in sweep space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SweepPt {
    pub s: Real,
    pub t: Real,
}

impl SweepPt {
    #[inline]
    pub const fn new(s: Real, t: Real) -> Self {
        SweepPt { s, t }
    }
}

/// Lexicographic sweep order: s first, ties broken by t.
#[inline]
pub fn vert_leq(u: SweepPt, v: SweepPt) -> bool {
    u.s < v.s || (u.s == v.s && u.t <= v.t)
}

/// Exact coincidence in sweep space.
#[inline]
pub fn vert_eq(u: SweepPt, v: SweepPt) -> bool {
    u.s == v.s && u.t == v.t
}

/// Sweep order with s and t transposed.
#[inline]
pub fn trans_leq(u: SweepPt, v: SweepPt) -> bool {
    u.t < v.t || (u.t == v.t && u.s <= v.s)
}

/// Given `u <= v <= w` in sweep order, evaluates the t-coordinate of edge uw
/// at `v.s` and returns `v.t - (uw)(v.s)`: the signed distance from uw to v.
/// Zero when uw is vertical.
///
/// The result is accurate even when v is very close to u or w: with
/// `v.t = 0`, the negated result always lies within `[min(u.t, w.t), max(u.t, w.t)]`.
pub fn edge_eval(u: SweepPt, v: SweepPt, w: SweepPt) -> Real {
    debug_assert!(vert_leq(u, v) && vert_leq(v, w));
    let gap_l = v.s - u.s;
    let gap_r = w.s - v.s;
    if gap_l + gap_r > 0.0 {
        if gap_l < gap_r {
            (v.t - u.t) + (u.t - w.t) * (gap_l / (gap_l + gap_r))
        } else {
            (v.t - w.t) + (w.t - u.t) * (gap_r / (gap_l + gap_r))
        }
    } else {
        0.0
    }
}

/// Same sign as [`edge_eval`] but cheaper: > 0, == 0 or < 0 as v is above,
/// on, or below the edge uw.
pub fn edge_sign(u: SweepPt, v: SweepPt, w: SweepPt) -> Real {
    debug_assert!(vert_leq(u, v) && vert_leq(v, w));
    let gap_l = v.s - u.s;
    let gap_r = w.s - v.s;
    if gap_l + gap_r > 0.0 {
        (v.t - w.t) * gap_l + (v.t - u.t) * gap_r
    } else {
        0.0
    }
}

/// [`edge_eval`] with s and t transposed; requires `u <= v <= w` in [`trans_leq`] order.
pub fn trans_eval(u: SweepPt, v: SweepPt, w: SweepPt) -> Real {
    debug_assert!(trans_leq(u, v) && trans_leq(v, w));
    let gap_l = v.t - u.t;
    let gap_r = w.t - v.t;
    if gap_l + gap_r > 0.0 {
        if gap_l < gap_r {
            (v.s - u.s) + (u.s - w.s) * (gap_l / (gap_l + gap_r))
        } else {
            (v.s - w.s) + (w.s - u.s) * (gap_r / (gap_l + gap_r))
        }
    } else {
        0.0
    }
}

/// [`edge_sign`] with s and t transposed.
pub fn trans_sign(u: SweepPt, v: SweepPt, w: SweepPt) -> Real {
    debug_assert!(trans_leq(u, v) && trans_leq(v, w));
    let gap_l = v.t - u.t;
    let gap_r = w.t - v.t;
    if gap_l + gap_r > 0.0 {
        (v.s - w.s) * gap_l + (v.s - u.s) * gap_r
    } else {
        0.0
    }
}

/// True if (u, v, w) turn counter-clockwise (or are collinear).
/// Unreliable for nearly-degenerate input, like any floating-point orientation test.
#[inline]
pub fn vert_ccw(u: SweepPt, v: SweepPt, w: SweepPt) -> bool {
    u.s * (v.t - w.t) + v.s * (w.t - u.t) + w.s * (u.t - v.t) >= 0.0
}

#[inline]
pub fn vert_l1_dist(u: SweepPt, v: SweepPt) -> Real {
    (u.s - v.s).abs() + (u.t - v.t).abs()
}

/// Returns `(b*x + a*y) / (a + b)`, or `(x + y) / 2` when `a == b == 0`.
/// Slightly negative weights are clamped to zero. The result always lies
/// between x and y, even when a and b differ greatly in magnitude.
#[inline]
pub fn real_interpolate(a: Real, x: Real, b: Real, y: Real) -> Real {
    let a = if a < 0.0 { 0.0 } else { a };
    let b = if b < 0.0 { 0.0 } else { b };
    if a <= b {
        if b == 0.0 {
            (x + y) / 2.0
        } else {
            x + (y - x) * (a / (a + b))
        }
    } else {
        y + (x - y) * (b / (a + b))
    }
}

/// Intersection of edges (o1, d1) and (o2, d2).
///
/// Not the cheapest formulation, but a stable one: each coordinate is
/// interpolated between the two middle endpoints of the relevant ordering
/// (`vert_leq` for s, `trans_leq` for t). The result lies inside the
/// intersection of both edges' bounding boxes.
pub fn edge_intersect(o1: SweepPt, d1: SweepPt, o2: SweepPt, d2: SweepPt) -> SweepPt {
    let s = {
        let (mut o1, mut d1, mut o2, mut d2) = (o1, d1, o2, d2);
        if !vert_leq(o1, d1) {
            std::mem::swap(&mut o1, &mut d1);
        }
        if !vert_leq(o2, d2) {
            std::mem::swap(&mut o2, &mut d2);
        }
        if !vert_leq(o1, o2) {
            std::mem::swap(&mut o1, &mut o2);
            std::mem::swap(&mut d1, &mut d2);
        }

        if !vert_leq(o2, d1) {
            // No overlap; do our best.
            (o2.s + d1.s) / 2.0
        } else if vert_leq(d1, d2) {
            // Interpolate between o2 and d1.
            let mut z1 = edge_eval(o1, o2, d1);
            let mut z2 = edge_eval(o2, d1, d2);
            if z1 + z2 < 0.0 {
                z1 = -z1;
                z2 = -z2;
            }
            real_interpolate(z1, o2.s, z2, d1.s)
        } else {
            // Interpolate between o2 and d2.
            let mut z1 = edge_sign(o1, o2, d1);
            let mut z2 = -edge_sign(o1, d2, d1);
            if z1 + z2 < 0.0 {
                z1 = -z1;
                z2 = -z2;
            }
            real_interpolate(z1, o2.s, z2, d2.s)
        }
    };

    let t = {
        let (mut o1, mut d1, mut o2, mut d2) = (o1, d1, o2, d2);
        if !trans_leq(o1, d1) {
            std::mem::swap(&mut o1, &mut d1);
        }
        if !trans_leq(o2, d2) {
            std::mem::swap(&mut o2, &mut d2);
        }
        if !trans_leq(o1, o2) {
            std::mem::swap(&mut o1, &mut o2);
            std::mem::swap(&mut d1, &mut d2);
        }

        if !trans_leq(o2, d1) {
            (o2.t + d1.t) / 2.0
        } else if trans_leq(d1, d2) {
            let mut z1 = trans_eval(o1, o2, d1);
            let mut z2 = trans_eval(o2, d1, d2);
            if z1 + z2 < 0.0 {
                z1 = -z1;
                z2 = -z2;
            }
            real_interpolate(z1, o2.t, z2, d1.t)
        } else {
            let mut z1 = trans_sign(o1, o2, d1);
            let mut z2 = -trans_sign(o1, d2, d1);
            if z1 + z2 < 0.0 {
                z1 = -z1;
                z2 = -z2;
            }
            real_interpolate(z1, o2.t, z2, d2.t)
        }
    };

    SweepPt { s, t }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn p(s: Real, t: Real) -> SweepPt {
        SweepPt::new(s, t)
    }

    #[test]
    fn vert_leq_orders_by_s_then_t() {
        assert!(vert_leq(p(0.0, 0.0), p(1.0, 0.0)));
        assert!(vert_leq(p(0.0, 0.0), p(0.0, 1.0)));
        assert!(vert_leq(p(0.0, 0.0), p(0.0, 0.0)));
        assert!(!vert_leq(p(1.0, 0.0), p(0.0, 5.0)));
    }

    #[test]
    fn trans_leq_orders_by_t_then_s() {
        assert!(trans_leq(p(5.0, 0.0), p(0.0, 1.0)));
        assert!(trans_leq(p(0.0, 0.0), p(1.0, 0.0)));
        assert!(!trans_leq(p(0.0, 1.0), p(0.0, 0.0)));
    }

    #[test]
    fn edge_eval_is_signed_distance() {
        // uw is the s axis; v sits one unit above it.
        let r = edge_eval(p(0.0, 0.0), p(0.5, 1.0), p(1.0, 0.0));
        assert_abs_diff_eq!(r, 1.0, epsilon = 1e-12);
        let r = edge_eval(p(0.0, 0.0), p(0.25, -2.0), p(1.0, 0.0));
        assert_abs_diff_eq!(r, -2.0, epsilon = 1e-12);
    }

    #[test]
    fn edge_eval_vertical_edge_is_zero() {
        assert_eq!(edge_eval(p(0.0, 0.0), p(0.0, 0.5), p(0.0, 1.0)), 0.0);
        assert_eq!(edge_sign(p(0.0, 0.0), p(0.0, 0.5), p(0.0, 1.0)), 0.0);
    }

    #[test]
    fn edge_sign_matches_edge_eval_sign() {
        let cases = [
            (p(0.0, 0.0), p(1.0, 3.0), p(4.0, 1.0)),
            (p(0.0, 0.0), p(1.0, -3.0), p(4.0, 1.0)),
            (p(-2.0, 1.0), p(0.0, 0.0), p(2.0, -1.0)),
        ];
        for (u, v, w) in cases {
            let e = edge_eval(u, v, w);
            let s = edge_sign(u, v, w);
            assert_eq!(e.partial_cmp(&0.0), s.partial_cmp(&0.0), "{u:?} {v:?} {w:?}");
        }
    }

    #[test]
    fn trans_variants_mirror_the_plain_ones() {
        // Swapping s and t should map trans_eval onto edge_eval.
        let (u, v, w) = (p(0.0, 0.0), p(1.0, 0.5), p(0.0, 1.0));
        let swap = |q: SweepPt| p(q.t, q.s);
        assert_abs_diff_eq!(trans_eval(u, v, w), edge_eval(swap(u), swap(v), swap(w)), epsilon = 1e-12);
        assert_abs_diff_eq!(trans_sign(u, v, w), edge_sign(swap(u), swap(v), swap(w)), epsilon = 1e-12);
    }

    #[test]
    fn vert_ccw_detects_turn_direction() {
        assert!(vert_ccw(p(0.0, 0.0), p(1.0, 0.0), p(0.5, 1.0)));
        assert!(!vert_ccw(p(0.0, 0.0), p(0.5, 1.0), p(1.0, 0.0)));
    }

    #[test]
    fn l1_distance() {
        assert_eq!(vert_l1_dist(p(1.0, 1.0), p(-2.0, 5.0)), 7.0);
    }

    #[test]
    fn interpolate_midpoint_and_weights() {
        assert_eq!(real_interpolate(0.0, 0.0, 0.0, 1.0), 0.5);
        assert_abs_diff_eq!(real_interpolate(1.0, 0.0, 1.0, 2.0), 1.0);
        // a small relative to b pulls toward x.
        assert_abs_diff_eq!(real_interpolate(1.0, 0.0, 3.0, 4.0), 1.0);
        // negative weights clamp.
        assert_eq!(real_interpolate(-1.0, 3.0, 2.0, 7.0), 3.0);
    }

    #[test]
    fn interpolate_stays_in_range() {
        let r = real_interpolate(1e-300, 10.0, 1e300, 20.0);
        assert!((10.0..=20.0).contains(&r));
    }

    #[test]
    fn intersect_crossing_diagonals() {
        let x = edge_intersect(p(0.0, 0.0), p(1.0, 1.0), p(0.0, 1.0), p(1.0, 0.0));
        assert_abs_diff_eq!(x.s, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(x.t, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn intersect_bowtie_center() {
        let x = edge_intersect(p(0.0, 0.0), p(10.0, 10.0), p(10.0, 0.0), p(0.0, 10.0));
        assert_abs_diff_eq!(x.s, 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(x.t, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn intersect_is_independent_of_edge_direction() {
        let a = edge_intersect(p(0.0, 0.0), p(4.0, 2.0), p(0.0, 3.0), p(4.0, -1.0));
        let b = edge_intersect(p(4.0, -1.0), p(0.0, 3.0), p(4.0, 2.0), p(0.0, 0.0));
        assert_abs_diff_eq!(a.s, b.s, epsilon = 1e-12);
        assert_abs_diff_eq!(a.t, b.t, epsilon = 1e-12);
    }
}
