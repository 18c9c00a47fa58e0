// Copyright 2025 The glutess Authors
// License: SGI Free Software License B (MIT-compatible)
//
// WASM bindings for glutess

use glutess::{IndexedCollector, PrimitiveKind, TessError, Tessellator, WindingRule};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn main_js() {
    console_error_panic_hook::set_once();
}

/// Accumulates contours, then tessellates them all as one polygon.
#[wasm_bindgen]
pub struct TessellatorJs {
    contours: Vec<Vec<[f64; 2]>>,
    winding: WindingRule,
    boundary_only: bool,
    positions: Vec<f64>,
    indices: Vec<u32>,
    /// Vertex count of each line loop in boundary mode.
    loop_lengths: Vec<u32>,
    error: Option<TessError>,
}

#[wasm_bindgen]
impl TessellatorJs {
    #[wasm_bindgen(constructor)]
    pub fn new() -> TessellatorJs {
        TessellatorJs {
            contours: Vec::new(),
            winding: WindingRule::Odd,
            boundary_only: false,
            positions: Vec::new(),
            indices: Vec::new(),
            loop_lengths: Vec::new(),
            error: None,
        }
    }

    /// Add a contour from a flat [x0,y0, x1,y1, ...] Float64Array.
    pub fn add_contour(&mut self, vertices: &[f64]) {
        self.contours
            .push(vertices.chunks_exact(2).map(|p| [p[0], p[1]]).collect());
    }

    pub fn clear(&mut self) {
        self.contours.clear();
    }

    /// winding: 0=Odd 1=NonZero 2=Positive 3=Negative 4=AbsGeqTwo
    pub fn set_winding(&mut self, winding: u32) {
        self.winding = winding_rule(winding);
    }

    pub fn set_boundary_only(&mut self, boundary_only: bool) {
        self.boundary_only = boundary_only;
    }

    /// Tessellate and return true on success. Output stays available
    /// through the getters until the next call.
    pub fn tessellate(&mut self) -> bool {
        let positions = self
            .contours
            .iter()
            .flatten()
            .map(|p| [p[0], p[1], 0.0])
            .collect();
        let mut tess = Tessellator::new(IndexedCollector::with_positions(positions));
        tess.set_winding_rule(self.winding);
        tess.set_boundary_only(self.boundary_only);
        tess.set_normal(0.0, 0.0, 1.0);

        let mut next = 0u32;
        tess.begin_polygon(None);
        for contour in &self.contours {
            tess.begin_contour();
            for p in contour {
                tess.vertex([p[0], p[1], 0.0], next);
                next += 1;
            }
            tess.end_contour();
        }
        tess.end_polygon();

        let out = tess.into_callback();
        self.error = out.first_fatal();
        self.positions = out.positions.iter().flat_map(|p| [p[0], p[1]]).collect();
        self.loop_lengths = out
            .primitives
            .iter()
            .filter(|p| p.kind == PrimitiveKind::LineLoop)
            .map(|p| p.indices.len() as u32)
            .collect();
        self.indices = if self.boundary_only {
            out.primitives.iter().flat_map(|p| p.indices.iter().copied()).collect()
        } else {
            out.triangles().into_iter().flatten().collect()
        };
        self.error.is_none()
    }

    /// Triangle index triples, or concatenated loop indices in boundary mode.
    pub fn get_elements(&self) -> Vec<u32> {
        self.indices.clone()
    }

    pub fn get_loop_lengths(&self) -> Vec<u32> {
        self.loop_lengths.clone()
    }

    /// Flat [x0,y0, x1,y1, ...]: the input points, then intersections.
    pub fn get_vertices(&self) -> Vec<f64> {
        self.positions.clone()
    }

    /// GLU code of the error that abandoned the last polygon, or 0.
    pub fn error_code(&self) -> u32 {
        self.error.map_or(0, |e| e.code())
    }
}

impl Default for TessellatorJs {
    fn default() -> Self {
        Self::new()
    }
}

fn winding_rule(winding: u32) -> WindingRule {
    match winding {
        1 => WindingRule::NonZero,
        2 => WindingRule::Positive,
        3 => WindingRule::Negative,
        4 => WindingRule::AbsGeqTwo,
        _ => WindingRule::Odd,
    }
}

/// Convenience: triangulate one closed contour. Returns flat CCW triangle
/// corners [x0,y0, x1,y1, x2,y2, ...], empty on failure.
#[wasm_bindgen]
pub fn tessellate_polygon(vertices: &[f64], winding: u32) -> Vec<f64> {
    let contour: Vec<[f64; 2]> = vertices.chunks_exact(2).map(|p| [p[0], p[1]]).collect();
    glutess::triangulate(&[contour], winding_rule(winding))
        .map(|tris| tris.into_iter().flatten().collect())
        .unwrap_or_default()
}
