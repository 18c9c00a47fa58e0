// Copyright 2025 The glutess Authors
// License: SGI Free Software License B (MIT-compatible)
//
// Client-facing output protocol.

use crate::error::TessError;

/// Primitive topology of a `begin` .. `end` group.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Triangles,
    TriangleFan,
    TriangleStrip,
    LineLoop,
}

impl PrimitiveKind {
    /// The matching GL primitive enumerant.
    pub fn gl_code(self) -> u32 {
        match self {
            PrimitiveKind::LineLoop => 0x0002,
            PrimitiveKind::Triangles => 0x0004,
            PrimitiveKind::TriangleStrip => 0x0005,
            PrimitiveKind::TriangleFan => 0x0006,
        }
    }
}

/// Receives tessellation output.
///
/// Every method has a no-op default, so an implementor only overrides what
/// it consumes. Each call carries the polygon data given to
/// [`Tessellator::begin_polygon`](crate::Tessellator::begin_polygon).
///
/// Geometry arrives as `begin`, then one `vertex` per primitive vertex
/// (possibly preceded by `edge_flag` changes), then `end`. No geometry is
/// delivered for a polygon that failed with a fatal error.
pub trait TessCallback {
    type VertexData: Clone;
    type PolygonData;

    fn begin(&mut self, _kind: PrimitiveKind, _polygon: Option<&Self::PolygonData>) {}

    fn vertex(&mut self, _data: &Self::VertexData, _polygon: Option<&Self::PolygonData>) {}

    /// `true` when the edges following this call lie on the region boundary.
    /// Only called when [`wants_edge_flags`](Self::wants_edge_flags) is true.
    fn edge_flag(&mut self, _boundary: bool, _polygon: Option<&Self::PolygonData>) {}

    fn end(&mut self, _polygon: Option<&Self::PolygonData>) {}

    fn error(&mut self, _err: TessError, _polygon: Option<&Self::PolygonData>) {}

    /// Creates data for a vertex synthesized at `coords` as a weighted blend
    /// of up to four existing vertices. Unused slots carry `None` and a zero
    /// weight. Returning `None` means the client cannot combine; when the
    /// sweep genuinely needs a new vertex this abandons the polygon with
    /// [`TessError::NeedCombineCallback`].
    fn combine(
        &mut self,
        _coords: [f64; 3],
        _data: [Option<&Self::VertexData>; 4],
        _weights: [f32; 4],
        _polygon: Option<&Self::PolygonData>,
    ) -> Option<Self::VertexData> {
        None
    }

    /// Requesting edge flags restricts output to independent triangles.
    fn wants_edge_flags(&self) -> bool {
        false
    }

    /// When false, the mesh is still built (and errors still reported) but
    /// nothing is rendered.
    fn wants_geometry(&self) -> bool {
        true
    }
}
