pub mod buffer;
pub mod loader;
pub mod shader;

use std::path::Path;

use log::{debug, info};
use nalgebra as na;
use na::{vector, Matrix4, Vector2, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::canvas::{Color, DepthBuffer, FrameBuffer, Texture};
use crate::config::RenderConfig;
use crate::error::{LoadError, MeshError, RenderError};
use crate::raster;
use crate::util::{look_at, perspective_divide, to_hom_point, try_normalize, viewport};
use buffer::{Uniforms, Varyings};
use shader::ShadingMode;

/// Depth resolution of the viewport transform, matching the 8-bit depth buffer.
pub const DEPTH_RANGE: f32 = 255.0;

/// Raw attribute arrays of one mesh, as delivered by an ingestion step. Indices are 0-based and
/// consumed in lockstep: entries i, i + 1, i + 2 of the three index arrays form one triangle.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub positions: Vec<Vector3<f32>>,
    pub tex_coords: Vec<Vector3<f32>>,
    pub normals: Vec<Vector3<f32>>,
    pub position_indices: Vec<usize>,
    pub tex_indices: Vec<usize>,
    pub normal_indices: Vec<usize>,
}

/// Texture maps used while shading. Missing maps are empty textures.
#[derive(Default)]
pub struct Materials {
    pub diffuse: Texture,
    pub normal: Texture,
    pub specular: Texture,
}

/// Counters of one render call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub triangles: usize, // Triangles that reached the rasterizer.
    pub culled: usize,    // Back-facing or smaller than a pixel.
    pub fragments: usize, // Pixels that passed the depth test.
}

pub struct Submesh {
    pub name: String,
    pub materials: Materials,
    mesh: MeshData,
    // Results of the last transform pass, parallel to mesh.positions and mesh.normals.
    screen_positions: Vec<Vector3<f32>>,
    intensities: Vec<f32>,
}

impl Submesh {
    /// Validates the topology once; it never changes afterwards.
    pub fn new(name: String, mesh: MeshData, materials: Materials) -> Result<Submesh, MeshError> {
        let count = mesh.position_indices.len();
        if mesh.tex_indices.len() != count || mesh.normal_indices.len() != count {
            return Err(MeshError::IndexCountMismatch {
                positions: count,
                tex_coords: mesh.tex_indices.len(),
                normals: mesh.normal_indices.len(),
            });
        }
        if count % 3 != 0 {
            return Err(MeshError::NotTriangles(count));
        }
        check_indices("position", &mesh.position_indices, mesh.positions.len())?;
        check_indices("texture coordinate", &mesh.tex_indices, mesh.tex_coords.len())?;
        check_indices("normal", &mesh.normal_indices, mesh.normals.len())?;

        return Ok(Submesh {
            name,
            materials,
            mesh,
            screen_positions: Vec::new(),
            intensities: Vec::new(),
        });
    }

    pub fn triangle_count(&self) -> usize {
        return self.mesh.position_indices.len() / 3;
    }

    pub fn vertex_count(&self) -> usize {
        return self.mesh.positions.len();
    }

    /// Vertex part of the pipeline. Every vertex is transformed exactly once, no matter how many
    /// triangles share it. Intensities are computed once per normal when `light_direction` is set.
    fn transform(&mut self, mvp: &Matrix4<f32>, light_direction: Option<Vector3<f32>>) -> Result<(), RenderError> {
        self.screen_positions = self.mesh.positions.iter()
            .map(|position| perspective_divide(mvp * to_hom_point(*position)))
            .collect::<Result<Vec<_>, _>>()?;

        self.intensities.clear();
        if let Some(light_direction) = light_direction {
            self.intensities.extend(self.mesh.normals.iter().map(|normal| normal.dot(&light_direction).max(0.0)));
        }
        return Ok(());
    }

    /// Gathers per-triangle values for the fragment part of the pipeline.
    fn varyings(&self, first: usize) -> Varyings {
        let mut varyings = Varyings::default();
        for i in 0..3 {
            varyings.tex_coords.set_column(i, &self.mesh.tex_coords[self.mesh.tex_indices[first + i]]);
            let normal_index = self.mesh.normal_indices[first + i];
            varyings.intensities[i] = self.intensities.get(normal_index).copied().unwrap_or(0.0);
        }
        return varyings;
    }

    /// Rasterizes all triangles in index order. Must run after `transform`.
    fn draw(
        &self,
        mode: ShadingMode,
        uniforms: &Uniforms,
        rng: &mut StdRng,
        frame: &mut FrameBuffer,
        depth: &mut DepthBuffer,
    ) -> RenderStats {
        let mut stats = RenderStats::default();
        for first in (0..self.mesh.position_indices.len()).step_by(3) {
            let [a, b, c] = [0, 1, 2].map(|i| self.screen_positions[self.mesh.position_indices[first + i]]);
            let result = match mode {
                ShadingMode::Wireframe { color } => {
                    raster::line(to_pixel(a), to_pixel(b), frame, color);
                    raster::line(to_pixel(b), to_pixel(c), frame, color);
                    raster::line(to_pixel(c), to_pixel(a), frame, color);
                    Some(0)
                }
                ShadingMode::Flat { color } => raster::fill_triangle(a, b, c, depth, frame, color),
                ShadingMode::RandomColor { .. } => {
                    // Drawn even for culled triangles, so colors stay tied to triangle order.
                    let color = Color::new(rng.gen(), rng.gen(), rng.gen());
                    raster::fill_triangle(a, b, c, depth, frame, color)
                }
                ShadingMode::Gouraud { color } => {
                    let varyings = self.varyings(first);
                    raster::triangle(a, b, c, depth, frame, |bar_coord| Some(color.scale(varyings.intensity(bar_coord))))
                }
                ShadingMode::Textured { lighting } => {
                    let varyings = self.varyings(first);
                    raster::triangle(a, b, c, depth, frame, |bar_coord| {
                        Some(shader::fragment(bar_coord, &varyings, uniforms, &self.materials, lighting))
                    })
                }
            };
            match result {
                Some(fragments) => {
                    stats.triangles += 1;
                    stats.fragments += fragments;
                }
                None => stats.culled += 1,
            }
        }
        return stats;
    }
}

fn check_indices(attribute: &'static str, indices: &[usize], len: usize) -> Result<(), MeshError> {
    match indices.iter().find(|&&index| index >= len) {
        Some(&index) => return Err(MeshError::IndexOutOfRange { attribute, index, len }),
        None => return Ok(()),
    }
}

fn to_pixel(v: Vector3<f32>) -> Vector2<i32> {
    return vector![v.x as i32, v.y as i32];
}

/// Ordered collection of submeshes sharing one transform. Submeshes are drawn in list order, the
/// depth buffer alone resolves visibility between them.
pub struct Object {
    submeshes: Vec<Submesh>,
}

impl Object {
    pub fn new(submeshes: Vec<Submesh>) -> Object {
        return Object { submeshes };
    }

    /// Builds one submesh per file. Any mesh failure aborts the whole object.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Object, LoadError> {
        let submeshes = paths.iter()
            .map(|path| loader::load_submesh(path.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Object::new(submeshes));
    }

    pub fn submeshes(&self) -> &[Submesh] {
        return &self.submeshes[..];
    }

    /// Renders the object into the given buffers.
    ///
    /// Matrices are built once: viewport * projection * view * model. All vertices of all
    /// submeshes are transformed before the first triangle is drawn. Everything runs on the
    /// calling thread; triangles are filled strictly one after another, since each pixel's depth
    /// test and writes must not interleave with another triangle's.
    pub fn render(&mut self, config: &RenderConfig, frame: &mut FrameBuffer, depth: &mut DepthBuffer) -> Result<RenderStats, RenderError> {
        let camera = config.camera;
        let model_matrix = config.model.matrix();
        let view_matrix = look_at(camera.eye, camera.center, camera.up)?;
        let projection_matrix = config.projection.matrix()?;
        let viewport_matrix = viewport(frame.width(), frame.height(), DEPTH_RANGE);
        let mvp_matrix = viewport_matrix * projection_matrix * view_matrix * model_matrix;

        let uniforms = Uniforms {
            light_direction: try_normalize(config.light)?,
            view_direction: try_normalize(camera.eye - camera.center)?,
        };
        let vertex_light = match config.shading.needs_vertex_intensities() {
            true => Some(uniforms.light_direction),
            false => None,
        };

        for submesh in &mut self.submeshes {
            submesh.transform(&mvp_matrix, vertex_light)?;
        }

        let seed = match config.shading {
            ShadingMode::RandomColor { seed } => seed,
            _ => 0,
        };
        let mut rng = StdRng::seed_from_u64(seed);

        let mut stats = RenderStats::default();
        for submesh in &self.submeshes {
            let submesh_stats = submesh.draw(config.shading, &uniforms, &mut rng, frame, depth);
            debug!(
                "{}: {} triangles drawn, {} culled, {} fragments",
                submesh.name, submesh_stats.triangles, submesh_stats.culled, submesh_stats.fragments
            );
            stats.triangles += submesh_stats.triangles;
            stats.culled += submesh_stats.culled;
            stats.fragments += submesh_stats.fragments;
        }
        info!(
            "Rendered {} triangles ({} culled), {} fragments passed the depth test",
            stats.triangles, stats.culled, stats.fragments
        );

        return Ok(stats);
    }
}
