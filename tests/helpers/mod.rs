// Copyright 2025 The glutess Authors
// License: SGI Free Software License B (MIT-compatible)
//
// Shared test utilities for glutess tests.

#![allow(dead_code)]

use glutess::{PrimitiveKind, TessError, Tessellator, WindingRule};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Begin(PrimitiveKind),
    Vertex([f64; 3]),
    EdgeFlag(bool),
    End,
    Error(TessError),
}

/// One `combine` request as the tessellator made it.
#[derive(Debug, Clone)]
pub struct CombineCall {
    pub coords: [f64; 3],
    pub sources: Vec<[f64; 3]>,
    pub weights: [f32; 4],
}

/// Records every callback. Vertex data is the vertex position, so output
/// can be checked geometrically.
#[derive(Debug, Default)]
pub struct Recorder {
    pub events: Vec<Event>,
    pub combines: Vec<CombineCall>,
    /// Polygon data seen by each `begin`.
    pub polygon_tags: Vec<Option<u32>>,
    pub can_combine: bool,
    pub edge_flags: bool,
    pub no_geometry: bool,
}

impl Recorder {
    pub fn combining() -> Self {
        Recorder {
            can_combine: true,
            ..Self::default()
        }
    }

    pub fn errors(&self) -> Vec<TessError> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Error(err) => Some(*err),
                _ => None,
            })
            .collect()
    }

    /// Each begin..end group as (kind, vertices).
    pub fn primitives(&self) -> Vec<(PrimitiveKind, Vec<[f64; 3]>)> {
        let mut out: Vec<(PrimitiveKind, Vec<[f64; 3]>)> = Vec::new();
        for e in &self.events {
            match e {
                Event::Begin(kind) => out.push((*kind, Vec::new())),
                Event::Vertex(v) => {
                    if let Some(p) = out.last_mut() {
                        p.1.push(*v);
                    }
                }
                _ => {}
            }
        }
        out
    }

    pub fn triangles(&self) -> Vec<[[f64; 3]; 3]> {
        let mut tris = Vec::new();
        for (kind, v) in self.primitives() {
            match kind {
                PrimitiveKind::Triangles => {
                    tris.extend(v.chunks_exact(3).map(|c| [c[0], c[1], c[2]]));
                }
                PrimitiveKind::TriangleFan => {
                    for i in 1..v.len().saturating_sub(1) {
                        tris.push([v[0], v[i], v[i + 1]]);
                    }
                }
                PrimitiveKind::TriangleStrip => {
                    for i in 0..v.len().saturating_sub(2) {
                        if i % 2 == 0 {
                            tris.push([v[i], v[i + 1], v[i + 2]]);
                        } else {
                            tris.push([v[i + 1], v[i], v[i + 2]]);
                        }
                    }
                }
                PrimitiveKind::LineLoop => {}
            }
        }
        tris
    }

    pub fn loops(&self) -> Vec<Vec<[f64; 3]>> {
        self.primitives()
            .into_iter()
            .filter(|(k, _)| *k == PrimitiveKind::LineLoop)
            .map(|(_, v)| v)
            .collect()
    }

    pub fn has_geometry(&self) -> bool {
        self.events.iter().any(|e| matches!(e, Event::Begin(_)))
    }
}

impl glutess::TessCallback for Recorder {
    type VertexData = [f64; 3];
    type PolygonData = u32;

    fn begin(&mut self, kind: PrimitiveKind, polygon: Option<&u32>) {
        self.polygon_tags.push(polygon.copied());
        self.events.push(Event::Begin(kind));
    }

    fn vertex(&mut self, data: &[f64; 3], _polygon: Option<&u32>) {
        self.events.push(Event::Vertex(*data));
    }

    fn edge_flag(&mut self, boundary: bool, _polygon: Option<&u32>) {
        self.events.push(Event::EdgeFlag(boundary));
    }

    fn end(&mut self, _polygon: Option<&u32>) {
        self.events.push(Event::End);
    }

    fn error(&mut self, err: TessError, _polygon: Option<&u32>) {
        self.events.push(Event::Error(err));
    }

    fn combine(
        &mut self,
        coords: [f64; 3],
        data: [Option<&[f64; 3]>; 4],
        weights: [f32; 4],
        _polygon: Option<&u32>,
    ) -> Option<[f64; 3]> {
        self.combines.push(CombineCall {
            coords,
            sources: data.iter().flatten().map(|d| **d).collect(),
            weights,
        });
        if self.can_combine {
            Some(coords)
        } else {
            None
        }
    }

    fn wants_edge_flags(&self) -> bool {
        self.edge_flags
    }

    fn wants_geometry(&self) -> bool {
        !self.no_geometry
    }
}

/// Feeds one polygon of 2D contours through `tess`.
pub fn feed(tess: &mut Tessellator<Recorder>, contours: &[Vec<[f64; 2]>]) {
    tess.begin_polygon(None);
    for contour in contours {
        tess.begin_contour();
        for p in contour {
            tess.vertex([p[0], p[1], 0.0], [p[0], p[1], 0.0]);
        }
        tess.end_contour();
    }
    tess.end_polygon();
}

/// Tessellates 2D contours against the +z normal.
pub fn tessellate_with(recorder: Recorder, contours: &[Vec<[f64; 2]>], rule: WindingRule) -> Recorder {
    let mut tess = Tessellator::new(recorder);
    tess.set_winding_rule(rule);
    tess.set_normal(0.0, 0.0, 1.0);
    feed(&mut tess, contours);
    tess.into_callback()
}

pub fn tessellate(contours: &[Vec<[f64; 2]>], rule: WindingRule) -> Recorder {
    tessellate_with(Recorder::combining(), contours, rule)
}

/// Signed area of a triangle projected to xy.
pub fn triangle_area(t: &[[f64; 3]; 3]) -> f64 {
    0.5 * ((t[1][0] - t[0][0]) * (t[2][1] - t[0][1]) - (t[2][0] - t[0][0]) * (t[1][1] - t[0][1]))
}

pub fn total_area(tris: &[[[f64; 3]; 3]]) -> f64 {
    tris.iter().map(triangle_area).sum()
}

/// Signed xy area of a closed loop.
pub fn loop_area(v: &[[f64; 3]]) -> f64 {
    let n = v.len();
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += v[i][0] * v[j][1] - v[j][0] * v[i][1];
    }
    area * 0.5
}

/// Axis-aligned rectangle, counter-clockwise.
pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<[f64; 2]> {
    vec![[x0, y0], [x1, y0], [x1, y1], [x0, y1]]
}

pub fn reversed(mut c: Vec<[f64; 2]>) -> Vec<[f64; 2]> {
    c.reverse();
    c
}

/// Regular n-gon, counter-clockwise.
pub fn regular_polygon(n: usize, radius: f64) -> Vec<[f64; 2]> {
    (0..n)
        .map(|i| {
            let a = i as f64 / n as f64 * std::f64::consts::TAU;
            [radius * a.cos(), radius * a.sin()]
        })
        .collect()
}

/// Star polygon {n/2} traced as one self-intersecting contour
/// (a pentagram for n = 5). The center has winding number 2.
pub fn star(n: usize, radius: f64) -> Vec<[f64; 2]> {
    (0..n)
        .map(|i| {
            let a = (2 * i % n) as f64 / n as f64 * std::f64::consts::TAU + std::f64::consts::FRAC_PI_2;
            [radius * a.cos(), radius * a.sin()]
        })
        .collect()
}

/// Every output triangle is counter-clockwise in xy (allowing slivers).
pub fn assert_all_ccw(tris: &[[[f64; 3]; 3]]) {
    for t in tris {
        assert!(triangle_area(t) >= -1e-9, "clockwise triangle {:?}", t);
    }
}
