use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use image::imageops::flip_vertical_in_place;
use log::{info, warn};
use nalgebra::vector;
use obj::raw::object::Polygon;
use obj::raw::parse_obj;

use super::{Materials, MeshData, Submesh};
use crate::canvas::Texture;
use crate::error::LoadError;

const DIFFUSE_SUFFIX: &str = "_diffuse.tga";
const NORMAL_SUFFIX: &str = "_nm.tga";
const SPECULAR_SUFFIX: &str = "_spec.tga";

/// Parses a Wavefront OBJ made of triangles whose corners all carry position, texture coordinate
/// and normal indices. `path` is only used in diagnostics.
pub fn parse_mesh<R: BufRead>(input: R, path: &Path) -> Result<MeshData, LoadError> {
    let raw = parse_obj(input).map_err(|source| LoadError::Obj { path: path.to_path_buf(), source })?;

    let mut mesh = MeshData {
        positions: raw.positions.iter().map(|&(x, y, z, _)| vector![x, y, z]).collect(),
        tex_coords: raw.tex_coords.iter().map(|&(u, v, w)| vector![u, v, w]).collect(),
        normals: raw.normals.iter().map(|&(x, y, z)| vector![x, y, z]).collect(),
        ..Default::default()
    };

    for (face, polygon) in raw.polygons.iter().enumerate() {
        let topology_error = |reason: &str| LoadError::Topology {
            path: path.to_path_buf(),
            face,
            reason: reason.to_string(),
        };
        let corners = match polygon {
            Polygon::PTN(corners) => corners,
            _ => return Err(topology_error("lacks texture coordinate or normal indices")),
        };
        if corners.len() != 3 {
            return Err(topology_error(&format!("has {} corners, only triangles are supported", corners.len())));
        }
        for &(position, tex, normal) in corners {
            mesh.position_indices.push(position);
            mesh.tex_indices.push(tex);
            mesh.normal_indices.push(normal);
        }
    }

    return Ok(mesh);
}

/// Path of a texture map sitting next to the mesh: `head.obj` -> `head_diffuse.tga`.
pub fn texture_path(mesh_path: &Path, suffix: &str) -> PathBuf {
    let stem = mesh_path.file_stem().map(|stem| stem.to_string_lossy().into_owned()).unwrap_or_default();
    return mesh_path.with_file_name(format!("{}{}", stem, suffix));
}

/// Loads a texture map flipped so that v = 0 is the bottom row. A map which can't be read only
/// degrades shading, so failures are logged and replaced with an empty texture.
pub fn load_texture(path: &Path) -> Texture {
    match image::open(path) {
        Ok(image) => {
            let mut image = image.to_rgba8();
            flip_vertical_in_place(&mut image);
            info!("texture file {} loading ok ({}x{})", path.display(), image.width(), image.height());
            return Texture::new(image);
        }
        Err(error) => {
            warn!("texture file {} loading failed: {}", path.display(), error);
            return Texture::empty();
        }
    }
}

pub fn load_materials(mesh_path: &Path) -> Materials {
    return Materials {
        diffuse: load_texture(&texture_path(mesh_path, DIFFUSE_SUFFIX)),
        normal: load_texture(&texture_path(mesh_path, NORMAL_SUFFIX)),
        specular: load_texture(&texture_path(mesh_path, SPECULAR_SUFFIX)),
    };
}

/// Reads one OBJ file together with its texture maps.
pub fn load_submesh(path: &Path) -> Result<Submesh, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
    let mesh = parse_mesh(BufReader::new(file), path)?;
    info!(
        "{}: {} vertices, {} texture coordinates, {} normals, {} triangles",
        path.display(), mesh.positions.len(), mesh.tex_coords.len(), mesh.normals.len(), mesh.position_indices.len() / 3
    );

    let materials = load_materials(path);
    let name = path.display().to_string();
    return Submesh::new(name, mesh, materials).map_err(|source| LoadError::Mesh { path: path.to_path_buf(), source });
}
