use std::path::PathBuf;

use thiserror::Error;

/// Geometry contract violations. These are programmer or input errors, so the render call fails
/// outright instead of producing NaN pixels.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("cannot normalize a zero-length vector")]
    ZeroVector,
    #[error("perspective divide by w = 0 (geometry at the eye plane)")]
    DegenerateW,
    #[error("invalid projection: {0}")]
    InvalidProjection(String),
}

/// Topology problems found while building a submesh.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    #[error("index arrays differ in length: {positions} positions, {tex_coords} texture coordinates, {normals} normals")]
    IndexCountMismatch {
        positions: usize,
        tex_coords: usize,
        normals: usize,
    },
    #[error("index count {0} is not a multiple of 3")]
    NotTriangles(usize),
    #[error("{attribute} index {index} out of range (only {len} entries)")]
    IndexOutOfRange {
        attribute: &'static str,
        index: usize,
        len: usize,
    },
}

/// Failures while reading a mesh from disk.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot open {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse {path}: {source}")]
    Obj {
        path: PathBuf,
        source: obj::ObjError,
    },
    #[error("{path}: face {face} {reason}")]
    Topology {
        path: PathBuf,
        face: usize,
        reason: String,
    },
    #[error("{path}: {source}")]
    Mesh {
        path: PathBuf,
        source: MeshError,
    },
}

/// Failures while reading a render configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}
