// Copyright 2025 The glutess Authors
// License: SGI Free Software License B (MIT-compatible)
//
// Primitive grouping, edge flags, boundary-only output and the fan fast path.

mod helpers;

use approx::assert_abs_diff_eq;
use glutess::{PrimitiveKind, Tessellator, WindingRule};
use helpers::{feed, loop_area, rect, regular_polygon, reversed, tessellate, total_area, Event, Recorder};

/// Begin, vertices and flags, end; never nested, never empty.
fn assert_well_formed(events: &[Event]) {
    let mut open = false;
    let mut count = 0;
    for e in events {
        match e {
            Event::Begin(_) => {
                assert!(!open, "nested begin");
                open = true;
                count = 0;
            }
            Event::Vertex(_) => {
                assert!(open, "vertex outside begin/end");
                count += 1;
            }
            Event::EdgeFlag(_) => assert!(open, "edge flag outside begin/end"),
            Event::End => {
                assert!(open, "end without begin");
                assert!(count > 0, "empty primitive");
                open = false;
            }
            Event::Error(_) => {}
        }
    }
    assert!(!open, "unterminated primitive");
}

/// The boundary flag in effect for each emitted vertex.
fn vertex_flags(events: &[Event]) -> Vec<bool> {
    let mut flag = None;
    let mut out = Vec::new();
    for e in events {
        match e {
            Event::EdgeFlag(b) => flag = Some(*b),
            Event::Vertex(_) => out.push(flag.expect("flag precedes first vertex")),
            _ => {}
        }
    }
    out
}

fn with_edge_flags() -> Recorder {
    Recorder {
        edge_flags: true,
        can_combine: true,
        ..Recorder::default()
    }
}

#[test]
fn hexagon_groups_into_four_triangles() {
    let rec = tessellate(&[regular_polygon(6, 1.0)], WindingRule::Odd);
    assert_well_formed(&rec.events);
    let tris = rec.triangles();
    assert_eq!(tris.len(), 4);
    helpers::assert_all_ccw(&tris);
    assert_abs_diff_eq!(total_area(&tris), 1.5 * 3f64.sqrt(), epsilon = 1e-12);
}

#[test]
fn edge_flags_force_independent_triangles() {
    let rec = helpers::tessellate_with(with_edge_flags(), &[rect(0.0, 0.0, 4.0, 4.0)], WindingRule::Odd);
    assert_well_formed(&rec.events);
    let prims = rec.primitives();
    assert!(prims.iter().all(|(k, _)| *k == PrimitiveKind::Triangles));
    assert_eq!(rec.triangles().len(), 2);

    let flags = vertex_flags(&rec.events);
    assert_eq!(flags.len(), 6);
    // Four outline edges, plus the diagonal seen from both triangles.
    assert_eq!(flags.iter().filter(|f| **f).count(), 4);
    assert_eq!(flags.iter().filter(|f| !**f).count(), 2);
}

#[test]
fn edge_flags_on_hole_edges() {
    let contours = vec![rect(0.0, 0.0, 10.0, 10.0), reversed(rect(3.0, 3.0, 7.0, 7.0))];
    let rec = helpers::tessellate_with(with_edge_flags(), &contours, WindingRule::Odd);
    assert_well_formed(&rec.events);
    let flags = vertex_flags(&rec.events);
    // Eight input edges are boundary; every other edge is shared by two triangles.
    assert_eq!(flags.iter().filter(|f| **f).count(), 8);
    assert_eq!(flags.len(), rec.triangles().len() * 3);
    assert_abs_diff_eq!(total_area(&rec.triangles()), 84.0, epsilon = 1e-9);
}

#[test]
fn single_triangle_with_edge_flags_flags_once() {
    let rec = helpers::tessellate_with(
        with_edge_flags(),
        &[vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]],
        WindingRule::Odd,
    );
    let flag_events = rec
        .events
        .iter()
        .filter(|e| matches!(e, Event::EdgeFlag(_)))
        .count();
    assert_eq!(flag_events, 1);
    assert_eq!(rec.events[1], Event::EdgeFlag(true));
}

#[test]
fn boundary_only_square_with_hole() {
    let mut tess = Tessellator::new(Recorder::default());
    tess.set_boundary_only(true);
    tess.set_normal(0.0, 0.0, 1.0);
    feed(&mut tess, &[rect(0.0, 0.0, 10.0, 10.0), reversed(rect(2.0, 2.0, 4.0, 4.0))]);
    let rec = tess.into_callback();
    assert_well_formed(&rec.events);

    let loops = rec.loops();
    assert_eq!(loops.len(), 2);
    assert!(loops.iter().all(|l| l.len() == 4));
    let mut areas: Vec<f64> = loops.iter().map(|l| loop_area(l)).collect();
    areas.sort_by(|a, b| a.total_cmp(b));
    assert_abs_diff_eq!(areas[0], -4.0, epsilon = 1e-12);
    assert_abs_diff_eq!(areas[1], 100.0, epsilon = 1e-12);
    assert!(rec.triangles().is_empty());
}

#[test]
fn boundary_only_outlines_the_union() {
    let mut tess = Tessellator::new(Recorder::combining());
    tess.set_boundary_only(true);
    tess.set_winding_rule(WindingRule::NonZero);
    tess.set_normal(0.0, 0.0, 1.0);
    feed(&mut tess, &[rect(0.0, 0.0, 10.0, 10.0), rect(5.0, 5.0, 15.0, 15.0)]);
    let loops = tess.into_callback().loops();
    assert_eq!(loops.len(), 1);
    assert_eq!(loops[0].len(), 8);
    assert_abs_diff_eq!(loop_area(&loops[0]), 175.0, epsilon = 1e-9);
}

#[test]
fn boundary_only_splits_bowtie_lobes() {
    let mut tess = Tessellator::new(Recorder::combining());
    tess.set_boundary_only(true);
    tess.set_winding_rule(WindingRule::NonZero);
    tess.set_normal(0.0, 0.0, 1.0);
    feed(&mut tess, &[vec![[0.0, 0.0], [10.0, 10.0], [10.0, 0.0], [0.0, 10.0]]]);
    let loops = tess.into_callback().loops();
    assert_eq!(loops.len(), 2);
    for l in &loops {
        assert_eq!(l.len(), 3);
        assert_abs_diff_eq!(loop_area(l), 25.0, epsilon = 1e-9);
    }
}

fn fast(recorder: Recorder, contour: Vec<[f64; 2]>, rule: WindingRule, boundary_only: bool) -> Recorder {
    let mut tess = Tessellator::new(recorder);
    tess.set_convex_fast_path(true);
    tess.set_winding_rule(rule);
    tess.set_boundary_only(boundary_only);
    tess.set_normal(0.0, 0.0, 1.0);
    feed(&mut tess, &[contour]);
    tess.into_callback()
}

#[test]
fn fast_path_emits_one_fan() {
    let hexagon = regular_polygon(6, 2.0);
    let rec = fast(Recorder::default(), hexagon.clone(), WindingRule::Odd, false);
    let prims = rec.primitives();
    assert_eq!(prims.len(), 1);
    assert_eq!(prims[0].0, PrimitiveKind::TriangleFan);
    let fan: Vec<[f64; 2]> = prims[0].1.iter().map(|v| [v[0], v[1]]).collect();
    assert_eq!(fan, hexagon);
}

#[test]
fn fast_path_reverses_clockwise_input() {
    let cw = reversed(rect(0.0, 0.0, 2.0, 1.0));
    let rec = fast(Recorder::default(), cw.clone(), WindingRule::NonZero, false);
    let tris = rec.triangles();
    helpers::assert_all_ccw(&tris);
    assert_abs_diff_eq!(total_area(&tris), 2.0, epsilon = 1e-12);

    let rec = fast(Recorder::default(), cw, WindingRule::Positive, false);
    assert!(!rec.has_geometry());
}

#[test]
fn fast_path_triangle_and_boundary() {
    let tri = vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
    let rec = fast(Recorder::default(), tri.clone(), WindingRule::Odd, false);
    assert_eq!(rec.primitives()[0].0, PrimitiveKind::Triangles);

    let rec = fast(Recorder::default(), tri, WindingRule::Odd, true);
    let loops = rec.loops();
    assert_eq!(loops.len(), 1);
    assert_abs_diff_eq!(loop_area(&loops[0]), 0.5, epsilon = 1e-12);
}

#[test]
fn fast_path_yields_to_edge_flags() {
    let rec = fast(with_edge_flags(), regular_polygon(6, 2.0), WindingRule::Odd, false);
    assert!(rec.primitives().iter().all(|(k, _)| *k == PrimitiveKind::Triangles));
    assert_eq!(rec.triangles().len(), 4);
}

#[test]
fn fast_path_skips_concave_or_crossing_input() {
    // Fan triangles of this bowtie disagree in orientation, so the sweep runs.
    let rec = fast(
        Recorder::combining(),
        vec![[0.0, 0.0], [10.0, 10.0], [10.0, 0.0], [0.0, 10.0]],
        WindingRule::NonZero,
        false,
    );
    assert_eq!(rec.combines.len(), 1);
    assert_abs_diff_eq!(total_area(&rec.triangles()), 50.0, epsilon = 1e-9);
}
