// Copyright 2025 The glutess Authors
// License: SGI Free Software License B (MIT-compatible)
//
// Ready-made callbacks that gather output into vectors, and one-call
// triangulation built on them.

use crate::callback::{PrimitiveKind, TessCallback};
use crate::config::WindingRule;
use crate::error::TessError;
use crate::tess::Tessellator;

/// Splits a fan, strip or triangle list into independent triangles with
/// the winding they were emitted with.
fn expand<T: Copy>(kind: PrimitiveKind, v: &[T], out: &mut Vec<[T; 3]>) {
    match kind {
        PrimitiveKind::Triangles => {
            out.extend(v.chunks_exact(3).map(|c| [c[0], c[1], c[2]]));
        }
        PrimitiveKind::TriangleFan => {
            for i in 1..v.len().saturating_sub(1) {
                out.push([v[0], v[i], v[i + 1]]);
            }
        }
        PrimitiveKind::TriangleStrip => {
            for i in 0..v.len().saturating_sub(2) {
                if i % 2 == 0 {
                    out.push([v[i], v[i + 1], v[i + 2]]);
                } else {
                    out.push([v[i + 1], v[i], v[i + 2]]);
                }
            }
        }
        PrimitiveKind::LineLoop => {}
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Primitive {
    pub kind: PrimitiveKind,
    pub vertices: Vec<[f64; 3]>,
}

impl Primitive {
    /// Independent triangles; empty for line loops.
    pub fn triangles(&self) -> Vec<[[f64; 3]; 3]> {
        let mut out = Vec::new();
        expand(self.kind, &self.vertices, &mut out);
        out
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedPrimitive {
    pub kind: PrimitiveKind,
    pub indices: Vec<u32>,
}

impl IndexedPrimitive {
    pub fn triangles(&self) -> Vec<[u32; 3]> {
        let mut out = Vec::new();
        expand(self.kind, &self.indices, &mut out);
        out
    }
}

/// Collects primitives as vertex positions. The vertex data passed to
/// [`Tessellator::vertex`] is the position itself.
#[derive(Clone, Debug, Default)]
pub struct PrimitiveCollector {
    pub primitives: Vec<Primitive>,
    pub errors: Vec<TessError>,
}

impl PrimitiveCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn triangles(&self) -> Vec<[[f64; 3]; 3]> {
        self.primitives.iter().flat_map(|p| p.triangles()).collect()
    }

    pub fn first_fatal(&self) -> Option<TessError> {
        self.errors.iter().copied().find(|e| e.is_fatal())
    }
}

impl TessCallback for PrimitiveCollector {
    type VertexData = [f64; 3];
    type PolygonData = ();

    fn begin(&mut self, kind: PrimitiveKind, _polygon: Option<&()>) {
        self.primitives.push(Primitive {
            kind,
            vertices: Vec::new(),
        });
    }

    fn vertex(&mut self, data: &[f64; 3], _polygon: Option<&()>) {
        if let Some(p) = self.primitives.last_mut() {
            p.vertices.push(*data);
        }
    }

    fn error(&mut self, err: TessError, _polygon: Option<&()>) {
        self.errors.push(err);
    }

    fn combine(
        &mut self,
        coords: [f64; 3],
        _data: [Option<&[f64; 3]>; 4],
        _weights: [f32; 4],
        _polygon: Option<&()>,
    ) -> Option<[f64; 3]> {
        Some(coords)
    }
}

/// Collects primitives as indices into a position table. Input vertices
/// carry their index; intersections append to `positions`.
#[derive(Clone, Debug, Default)]
pub struct IndexedCollector {
    pub positions: Vec<[f64; 3]>,
    pub primitives: Vec<IndexedPrimitive>,
    pub errors: Vec<TessError>,
}

impl IndexedCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from the positions the input indices refer to.
    pub fn with_positions(positions: Vec<[f64; 3]>) -> Self {
        IndexedCollector {
            positions,
            ..Self::default()
        }
    }

    pub fn triangles(&self) -> Vec<[u32; 3]> {
        self.primitives.iter().flat_map(|p| p.triangles()).collect()
    }

    pub fn first_fatal(&self) -> Option<TessError> {
        self.errors.iter().copied().find(|e| e.is_fatal())
    }
}

impl TessCallback for IndexedCollector {
    type VertexData = u32;
    type PolygonData = ();

    fn begin(&mut self, kind: PrimitiveKind, _polygon: Option<&()>) {
        self.primitives.push(IndexedPrimitive {
            kind,
            indices: Vec::new(),
        });
    }

    fn vertex(&mut self, data: &u32, _polygon: Option<&()>) {
        if let Some(p) = self.primitives.last_mut() {
            p.indices.push(*data);
        }
    }

    fn error(&mut self, err: TessError, _polygon: Option<&()>) {
        self.errors.push(err);
    }

    fn combine(
        &mut self,
        coords: [f64; 3],
        _data: [Option<&u32>; 4],
        _weights: [f32; 4],
        _polygon: Option<&()>,
    ) -> Option<u32> {
        self.positions.push(coords);
        Some((self.positions.len() - 1) as u32)
    }
}

fn run<C: TessCallback>(
    tess: &mut Tessellator<C>,
    contours: &[Vec<[f64; 2]>],
    mut data: impl FnMut([f64; 2]) -> C::VertexData,
) {
    tess.set_normal(0.0, 0.0, 1.0);
    tess.begin_polygon(None);
    for contour in contours {
        tess.begin_contour();
        for &p in contour {
            tess.vertex([p[0], p[1], 0.0], data(p));
        }
        tess.end_contour();
    }
    tess.end_polygon();
}

/// Triangulates 2D contours under `rule`. Every three consecutive points
/// of the result form one counter-clockwise triangle.
pub fn triangulate(contours: &[Vec<[f64; 2]>], rule: WindingRule) -> Result<Vec<[f64; 2]>, TessError> {
    let mut tess = Tessellator::new(PrimitiveCollector::new());
    tess.set_winding_rule(rule);
    run(&mut tess, contours, |p| [p[0], p[1], 0.0]);

    let collector = tess.into_callback();
    if let Some(err) = collector.first_fatal() {
        return Err(err);
    }
    Ok(collector
        .triangles()
        .into_iter()
        .flatten()
        .map(|v| [v[0], v[1]])
        .collect())
}

/// Like [`triangulate`], but returns triangle indices into a position
/// table: the input points in contour order, then any intersections.
pub fn triangulate_indexed(
    contours: &[Vec<[f64; 2]>],
    rule: WindingRule,
) -> Result<(Vec<u32>, Vec<[f64; 2]>), TessError> {
    let positions = contours
        .iter()
        .flatten()
        .map(|p| [p[0], p[1], 0.0])
        .collect();
    let mut tess = Tessellator::new(IndexedCollector::with_positions(positions));
    tess.set_winding_rule(rule);
    let mut next = 0u32;
    run(&mut tess, contours, |_| {
        next += 1;
        next - 1
    });

    let collector = tess.into_callback();
    if let Some(err) = collector.first_fatal() {
        return Err(err);
    }
    let indices = collector.triangles().into_iter().flatten().collect();
    let positions = collector.positions.iter().map(|p| [p[0], p[1]]).collect();
    Ok((indices, positions))
}
