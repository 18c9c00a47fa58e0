// glutess: the GLU polygon tessellator in Rust
// Copyright 2025 The glutess Authors
// License: SGI Free Software License B (MIT-compatible)

pub mod bucketalloc;
pub mod callback;
pub mod collect;
pub mod config;
pub mod dict;
pub mod error;
pub mod geom;
pub mod mesh;
pub mod mono;
pub mod normal;
pub mod priorityq;
pub mod render;
pub mod sweep;
pub mod tess;

pub use callback::{PrimitiveKind, TessCallback};
pub use collect::{
    triangulate, triangulate_indexed, IndexedCollector, IndexedPrimitive, Primitive, PrimitiveCollector,
};
pub use config::{TessConfig, TessProperty, WindingRule};
pub use error::TessError;
pub use tess::{TessState, Tessellator};
