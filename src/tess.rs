// Copyright 2025 The glutess Authors
// License: SGI Free Software License B (MIT-compatible)
//
// The tessellator object: the begin/vertex/end protocol, properties, the
// single-contour vertex cache, and the pipeline run at end_polygon.

use tracing::{debug, warn};

use crate::callback::{PrimitiveKind, TessCallback};
use crate::config::{TessConfig, TessProperty, WindingRule};
use crate::error::TessError;
use crate::geom::{Real, MAX_COORD};
use crate::mesh::{EdgeIdx, Mesh, INVALID};
use crate::mono::tessellate_interior;
use crate::normal::project_polygon;
use crate::render::{render_boundary, render_cache, render_mesh, CacheRender, CachedVertex, PrimitiveSink};
use crate::sweep::{compute_interior, Combiner};

/// Vertices of a first contour are held back up to this count.
pub const MAX_CACHE: usize = 100;

/// Protocol state. Calls move the tessellator between these levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum TessState {
    Dormant,
    InPolygon,
    InContour,
}

/// Forwards primitives to the client callback, resolving data slots.
struct CallbackSink<'a, C: TessCallback> {
    callback: &'a mut C,
    data: &'a [C::VertexData],
    polygon: Option<&'a C::PolygonData>,
    enabled: bool,
}

impl<C: TessCallback> PrimitiveSink for CallbackSink<'_, C> {
    fn begin(&mut self, kind: PrimitiveKind) {
        if self.enabled {
            self.callback.begin(kind, self.polygon);
        }
    }

    fn vertex(&mut self, data: u32) {
        if !self.enabled {
            return;
        }
        if let Some(v) = self.data.get(data as usize) {
            self.callback.vertex(v, self.polygon);
        }
    }

    fn edge_flag(&mut self, boundary: bool) {
        if self.enabled {
            self.callback.edge_flag(boundary, self.polygon);
        }
    }

    fn end(&mut self) {
        if self.enabled {
            self.callback.end(self.polygon);
        }
    }
}

/// Lets the sweep ask the client for data of synthesized vertices.
struct CombineAdapter<'a, C: TessCallback> {
    callback: &'a mut C,
    data: &'a mut Vec<C::VertexData>,
    polygon: Option<&'a C::PolygonData>,
}

impl<C: TessCallback> Combiner for CombineAdapter<'_, C> {
    fn combine(&mut self, coords: [Real; 3], data: [u32; 4], weights: [f32; 4]) -> Option<u32> {
        let sources = data.map(|d| self.data.get(d as usize));
        let out = self.callback.combine(coords, sources, weights, self.polygon)?;
        self.data.push(out);
        Some((self.data.len() - 1) as u32)
    }
}

/// GLU-style polygon tessellator.
///
/// Feed one polygon at a time through `begin_polygon`, one or more
/// `begin_contour` / `vertex`* / `end_contour` groups, and `end_polygon`.
/// Output and errors go to the callback `C`. Calls made in the wrong
/// state are repaired by synthesizing the missing calls, each reported as
/// an error.
pub struct Tessellator<C: TessCallback> {
    callback: C,
    config: TessConfig,
    state: TessState,
    mesh: Option<Mesh>,
    /// The most recent vertex of the current contour is `last_edge.org`.
    last_edge: EdgeIdx,
    cache: Vec<CachedVertex>,
    flush_cache_on_next_vertex: bool,
    /// Client data of every vertex in the polygon, input and synthesized.
    vertex_data: Vec<C::VertexData>,
    polygon_data: Option<C::PolygonData>,
    contour_count: usize,
}

impl<C: TessCallback> Tessellator<C> {
    pub fn new(callback: C) -> Self {
        Self::with_config(callback, TessConfig::default())
    }

    pub fn with_config(callback: C, config: TessConfig) -> Self {
        Tessellator {
            callback,
            config,
            state: TessState::Dormant,
            mesh: None,
            last_edge: INVALID,
            cache: Vec::with_capacity(MAX_CACHE),
            flush_cache_on_next_vertex: false,
            vertex_data: Vec::new(),
            polygon_data: None,
            contour_count: 0,
        }
    }

    pub fn callback(&self) -> &C {
        &self.callback
    }

    pub fn callback_mut(&mut self) -> &mut C {
        &mut self.callback
    }

    /// Returns the callback, first closing any open contour or polygon
    /// (reporting each as missing).
    pub fn into_callback(mut self) -> C {
        self.goto_state(TessState::Dormant);
        self.callback
    }

    pub fn state(&self) -> TessState {
        self.state
    }

    // ──────────────────────────── Configuration ────────────────────────────

    pub fn config(&self) -> &TessConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: TessConfig) {
        self.config = config;
    }

    pub fn set_winding_rule(&mut self, rule: WindingRule) {
        self.config.winding_rule = rule;
    }

    pub fn set_boundary_only(&mut self, boundary_only: bool) {
        self.config.boundary_only = boundary_only;
    }

    /// A zero normal means "compute one from the vertices".
    pub fn set_normal(&mut self, x: f64, y: f64, z: f64) {
        self.config.normal = [x, y, z];
    }

    pub fn set_convex_fast_path(&mut self, enabled: bool) {
        self.config.convex_fast_path = enabled;
    }

    /// Numeric property interface. Invalid values are reported as
    /// `InvalidValue` and leave the setting unchanged.
    pub fn set_property(&mut self, prop: TessProperty, value: f64) {
        if let Err(err) = self.config.set_property(prop, value) {
            self.report(err);
        }
    }

    /// Like [`set_property`](Self::set_property), by GLU enumerant.
    /// Unknown properties are reported as `InvalidEnum`.
    pub fn set_property_code(&mut self, code: u32, value: f64) {
        match TessProperty::try_from(code) {
            Ok(prop) => self.set_property(prop, value),
            Err(err) => self.report(err),
        }
    }

    pub fn get_property(&self, prop: TessProperty) -> f64 {
        self.config.property(prop)
    }

    /// Returns 0.0 and reports `InvalidEnum` for unknown properties.
    pub fn get_property_code(&mut self, code: u32) -> f64 {
        match TessProperty::try_from(code) {
            Ok(prop) => self.get_property(prop),
            Err(err) => {
                self.report(err);
                0.0
            }
        }
    }

    // ──────────────────────────── Protocol ────────────────────────────

    fn report(&mut self, err: TessError) {
        self.callback.error(err, self.polygon_data.as_ref());
    }

    fn make_dormant(&mut self) {
        self.state = TessState::Dormant;
        self.mesh = None;
        self.last_edge = INVALID;
        self.cache.clear();
        self.vertex_data.clear();
        self.polygon_data = None;
    }

    /// Moves one level at a time toward `target`, reporting each implied call.
    fn goto_state(&mut self, target: TessState) {
        while self.state != target {
            let (err, forward) = match (self.state, self.state < target) {
                (TessState::Dormant, _) => (TessError::MissingBeginPolygon, true),
                (TessState::InPolygon, true) => (TessError::MissingBeginContour, true),
                (TessState::InPolygon, false) => (TessError::MissingEndPolygon, false),
                (TessState::InContour, _) => (TessError::MissingEndContour, false),
            };
            warn!(from = ?self.state, to = ?target, %err, "repairing tessellator call order");
            self.report(err);
            match (self.state, forward) {
                (TessState::Dormant, _) => self.begin_polygon(None),
                (TessState::InPolygon, true) => self.begin_contour(),
                (TessState::InContour, _) => self.end_contour(),
                // Too much work to finish the polygon: it is dropped.
                (TessState::InPolygon, false) => self.make_dormant(),
            }
        }
    }

    fn require_state(&mut self, state: TessState) {
        if self.state != state {
            self.goto_state(state);
        }
    }

    pub fn begin_polygon(&mut self, data: Option<C::PolygonData>) {
        self.require_state(TessState::Dormant);
        self.state = TessState::InPolygon;
        self.cache.clear();
        self.flush_cache_on_next_vertex = false;
        self.mesh = None;
        self.vertex_data.clear();
        self.contour_count = 0;
        self.polygon_data = data;
    }

    pub fn begin_contour(&mut self) {
        self.require_state(TessState::InPolygon);
        self.state = TessState::InContour;
        self.last_edge = INVALID;
        self.contour_count += 1;
        if !self.cache.is_empty() {
            // Flushing lazily keeps empty contours from disturbing the cache.
            self.flush_cache_on_next_vertex = true;
        }
    }

    /// Adds a vertex to the current contour. Coordinates beyond
    /// ±[`MAX_COORD`] are clamped and reported; a vertex with a NaN
    /// coordinate is reported as `InvalidValue` and skipped.
    pub fn vertex(&mut self, coords: [f64; 3], data: C::VertexData) {
        self.require_state(TessState::InContour);

        if self.flush_cache_on_next_vertex {
            self.flush_cache();
            self.last_edge = INVALID;
        }

        if coords.iter().any(|c| c.is_nan()) {
            warn!(?coords, "ignoring vertex with NaN coordinate");
            self.report(TessError::InvalidValue);
            return;
        }
        let clamped = coords.map(|c| c.clamp(-MAX_COORD, MAX_COORD));
        if clamped != coords {
            warn!(?coords, "clamping vertex coordinates");
            self.report(TessError::CoordTooLarge);
        }

        let slot = self.vertex_data.len() as u32;
        self.vertex_data.push(data);

        if self.mesh.is_none() {
            if self.cache.len() < MAX_CACHE {
                self.cache.push(CachedVertex {
                    coords: clamped,
                    data: slot,
                });
                return;
            }
            self.flush_cache();
        }
        self.add_vertex(clamped, slot);
    }

    pub fn end_contour(&mut self) {
        self.require_state(TessState::InContour);
        self.state = TessState::InPolygon;
    }

    /// Obsolete single-call contour separator: ends the current contour
    /// and begins the next.
    pub fn next_contour(&mut self) {
        self.end_contour();
        self.begin_contour();
    }

    /// Runs the tessellation and delivers its output.
    pub fn end_polygon(&mut self) {
        self.require_state(TessState::InPolygon);
        self.state = TessState::Dormant;
        self.tessellate();
        self.mesh = None;
        self.cache.clear();
        self.vertex_data.clear();
        self.polygon_data = None;
    }

    // ──────────────────────────── Mesh building ────────────────────────────

    /// Appends a vertex after `last_edge` in the current contour.
    fn add_vertex(&mut self, coords: [Real; 3], data: u32) {
        let mesh = self.mesh.get_or_insert_with(Mesh::new);
        let e = if self.last_edge == INVALID {
            // A self-loop: one vertex, one edge.
            let e = mesh.make_edge();
            mesh.splice(e, e ^ 1);
            e
        } else {
            mesh.split_edge(self.last_edge);
            mesh.lnext(self.last_edge)
        };

        let v = mesh.org(e) as usize;
        mesh.verts[v].coords = coords;
        mesh.verts[v].data = data;
        // Crossing a CCW contour from right to left adds one to the winding number.
        mesh.edges[e as usize].winding = 1;
        mesh.edges[(e ^ 1) as usize].winding = -1;
        self.last_edge = e;
    }

    fn flush_cache(&mut self) {
        self.mesh = Some(Mesh::new());
        self.last_edge = INVALID;
        let cached = std::mem::take(&mut self.cache);
        for v in &cached {
            self.add_vertex(v.coords, v.data);
        }
        self.cache = cached;
        self.cache.clear();
        self.flush_cache_on_next_vertex = false;
    }

    fn tessellate(&mut self) {
        let rule = self.config.winding_rule;
        let boundary_only = self.config.boundary_only;
        let flag_boundary = self.callback.wants_edge_flags();
        let wants_geometry = self.callback.wants_geometry();

        if self.mesh.is_none() {
            if !flag_boundary {
                let opts = CacheRender {
                    normal: self.config.normal,
                    winding_rule: rule,
                    boundary_only,
                    fast_path: self.config.convex_fast_path,
                };
                let mut sink = CallbackSink {
                    callback: &mut self.callback,
                    data: &self.vertex_data,
                    polygon: self.polygon_data.as_ref(),
                    enabled: wants_geometry,
                };
                if render_cache(&self.cache, opts, &mut sink) {
                    debug!(vertices = self.cache.len(), ?rule, path = "cache", "polygon done");
                    return;
                }
            }
            self.flush_cache();
        }
        let Some(mut mesh) = self.mesh.take() else {
            return;
        };

        let projection = project_polygon(&mut mesh, self.config.normal);

        let mut combiner = CombineAdapter {
            callback: &mut self.callback,
            data: &mut self.vertex_data,
            polygon: self.polygon_data.as_ref(),
        };
        if let Err(err) = compute_interior(&mut mesh, rule, &mut combiner) {
            warn!(%err, "abandoning polygon");
            self.report(err);
            return;
        }

        if boundary_only {
            mesh.set_winding_number(1, true);
        } else {
            tessellate_interior(&mut mesh);
        }
        if cfg!(debug_assertions) {
            mesh.check_mesh();
        }

        if wants_geometry {
            let mut sink = CallbackSink {
                callback: &mut self.callback,
                data: &self.vertex_data,
                polygon: self.polygon_data.as_ref(),
                enabled: true,
            };
            if boundary_only {
                render_boundary(&mesh, &mut sink);
            } else {
                render_mesh(&mut mesh, &mut sink, flag_boundary);
            }
        }
        debug!(
            vertices = self.vertex_data.len(),
            contours = self.contour_count,
            ?rule,
            normal = ?projection.normal,
            path = "sweep",
            "polygon done"
        );
    }
}

impl<C: TessCallback + Default> Default for Tessellator<C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Begin(PrimitiveKind),
        Vertex(u32),
        End,
        Error(TessError),
    }

    #[derive(Default)]
    struct Rec {
        calls: Vec<Call>,
        combine: bool,
    }

    impl TessCallback for Rec {
        type VertexData = u32;
        type PolygonData = &'static str;

        fn begin(&mut self, kind: PrimitiveKind, _polygon: Option<&&'static str>) {
            self.calls.push(Call::Begin(kind));
        }
        fn vertex(&mut self, data: &u32, _polygon: Option<&&'static str>) {
            self.calls.push(Call::Vertex(*data));
        }
        fn end(&mut self, _polygon: Option<&&'static str>) {
            self.calls.push(Call::End);
        }
        fn error(&mut self, err: TessError, _polygon: Option<&&'static str>) {
            self.calls.push(Call::Error(err));
        }
        fn combine(
            &mut self,
            _coords: [f64; 3],
            data: [Option<&u32>; 4],
            _weights: [f32; 4],
            _polygon: Option<&&'static str>,
        ) -> Option<u32> {
            if self.combine {
                data[0].map(|d| d + 100)
            } else {
                None
            }
        }
    }

    impl Rec {
        fn errors(&self) -> Vec<TessError> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Error(e) => Some(*e),
                    _ => None,
                })
                .collect()
        }

        fn has_geometry(&self) -> bool {
            self.calls.iter().any(|c| matches!(c, Call::Begin(_)))
        }
    }

    fn contour(tess: &mut Tessellator<Rec>, pts: &[[f64; 2]], first: u32) {
        tess.begin_contour();
        for (i, p) in pts.iter().enumerate() {
            tess.vertex([p[0], p[1], 0.0], first + i as u32);
        }
        tess.end_contour();
    }

    const SQUARE: [[f64; 2]; 4] = [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]];

    #[test]
    fn clean_protocol_reports_nothing() {
        let mut tess = Tessellator::new(Rec::default());
        tess.begin_polygon(Some("square"));
        contour(&mut tess, &SQUARE, 0);
        tess.end_polygon();
        assert_eq!(tess.state(), TessState::Dormant);
        let cb = tess.into_callback();
        assert!(cb.errors().is_empty());
        assert!(cb.has_geometry());
    }

    #[test]
    fn vertex_without_begin_is_repaired() {
        let mut tess = Tessellator::new(Rec::default());
        tess.vertex([0.0, 0.0, 0.0], 0);
        assert_eq!(tess.state(), TessState::InContour);
        assert_eq!(
            tess.callback().errors(),
            vec![TessError::MissingBeginPolygon, TessError::MissingBeginContour]
        );
    }

    #[test]
    fn end_polygon_inside_contour_closes_it() {
        let mut tess = Tessellator::new(Rec::default());
        tess.begin_polygon(None);
        tess.begin_contour();
        for (i, p) in SQUARE.iter().enumerate() {
            tess.vertex([p[0], p[1], 0.0], i as u32);
        }
        tess.end_polygon();
        let cb = tess.into_callback();
        assert_eq!(cb.errors(), vec![TessError::MissingEndContour]);
        assert!(cb.has_geometry());
    }

    #[test]
    fn begin_polygon_twice_drops_the_first() {
        let mut tess = Tessellator::new(Rec::default());
        tess.begin_polygon(None);
        contour(&mut tess, &SQUARE, 0);
        tess.begin_polygon(None);
        assert_eq!(tess.callback().errors(), vec![TessError::MissingEndPolygon]);
        assert!(!tess.callback().has_geometry());
        assert_eq!(tess.state(), TessState::InPolygon);
    }

    #[test]
    fn into_callback_closes_open_polygon() {
        let mut tess = Tessellator::new(Rec::default());
        tess.begin_polygon(None);
        tess.begin_contour();
        let cb = tess.into_callback();
        assert_eq!(cb.errors(), vec![TessError::MissingEndContour, TessError::MissingEndPolygon]);
    }

    #[test]
    fn huge_coordinates_are_clamped() {
        let mut tess = Tessellator::new(Rec::default());
        tess.begin_polygon(None);
        contour(&mut tess, &[[0.0, 0.0], [1e200, 0.0], [1e200, 1e200], [0.0, 1e200]], 0);
        tess.end_polygon();
        let cb = tess.into_callback();
        assert_eq!(cb.errors(), vec![TessError::CoordTooLarge; 3]);
        assert!(cb.has_geometry());
    }

    #[test]
    fn nan_vertex_is_skipped() {
        let mut tess = Tessellator::new(Rec::default());
        tess.begin_polygon(None);
        tess.begin_contour();
        tess.vertex([f64::NAN, 0.0, 0.0], 9);
        for (i, p) in SQUARE.iter().enumerate() {
            tess.vertex([p[0], p[1], 0.0], i as u32);
        }
        tess.end_contour();
        tess.end_polygon();
        let cb = tess.into_callback();
        assert_eq!(cb.errors(), vec![TessError::InvalidValue]);
        assert!(!cb.calls.contains(&Call::Vertex(9)));
    }

    #[test]
    fn property_codes() {
        let mut tess = Tessellator::new(Rec::default());
        tess.set_property_code(100140, 100131.0);
        assert_eq!(tess.config().winding_rule, WindingRule::NonZero);
        tess.set_property_code(100140, 100131.5);
        tess.set_property_code(100142, 2.0);
        tess.set_property_code(12345, 1.0);
        assert_eq!(tess.get_property_code(100142), 0.0);
        assert_eq!(tess.get_property_code(1), 0.0);
        assert_eq!(
            tess.callback().errors(),
            vec![
                TessError::InvalidValue,
                TessError::InvalidValue,
                TessError::InvalidEnum,
                TessError::InvalidEnum
            ]
        );
        assert_eq!(tess.get_property(TessProperty::WindingRule), 100131.0);
    }

    #[test]
    fn bowtie_needs_combine() {
        let bowtie = [[0.0, 0.0], [10.0, 10.0], [10.0, 0.0], [0.0, 10.0]];
        let mut tess = Tessellator::new(Rec::default());
        tess.set_winding_rule(WindingRule::NonZero);
        tess.begin_polygon(None);
        contour(&mut tess, &bowtie, 0);
        tess.end_polygon();
        assert_eq!(tess.callback().errors(), vec![TessError::NeedCombineCallback]);
        assert!(!tess.callback().has_geometry());

        // Reusable, and fine once the client combines.
        tess.callback_mut().calls.clear();
        tess.callback_mut().combine = true;
        tess.begin_polygon(None);
        contour(&mut tess, &bowtie, 0);
        tess.end_polygon();
        assert!(tess.callback().errors().is_empty());
        assert!(tess.callback().has_geometry());
    }

    #[test]
    fn second_contour_flushes_cache() {
        let mut tess = Tessellator::new(Rec::default());
        tess.begin_polygon(None);
        contour(&mut tess, &SQUARE, 0);
        assert!(tess.mesh.is_none());
        assert_eq!(tess.cache.len(), 4);
        tess.begin_contour();
        assert!(tess.mesh.is_none());
        tess.vertex([2.0, 2.0, 0.0], 4);
        assert!(tess.mesh.is_some());
        assert!(tess.cache.is_empty());
    }

    #[test]
    fn long_contour_overflows_cache() {
        let mut tess = Tessellator::new(Rec::default());
        tess.begin_polygon(None);
        tess.begin_contour();
        let n = MAX_CACHE + 20;
        for i in 0..n {
            let a = i as f64 / n as f64 * std::f64::consts::TAU;
            tess.vertex([a.cos() * 50.0, a.sin() * 50.0, 0.0], i as u32);
        }
        assert!(tess.mesh.is_some());
        tess.end_contour();
        tess.end_polygon();
        let cb = tess.into_callback();
        assert!(cb.errors().is_empty());
        let vertex_count = cb.calls.iter().filter(|c| matches!(c, Call::Vertex(_))).count();
        assert!(vertex_count >= n);
    }
}
