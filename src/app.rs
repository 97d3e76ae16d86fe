use std::path::PathBuf;
use std::time;

use log::info;

use crate::canvas::{DepthBuffer, FrameBuffer};
use crate::config::RenderConfig;
use crate::scene::shader::ShadingMode;
use crate::scene::Object;

/// Execution parameters gathered from the command line. Anything set here overrides the
/// configuration file.
pub struct Params {
    pub config_path: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub shading: Option<ShadingMode>,
    pub mesh_paths: Vec<PathBuf>,
}

/// Loads the meshes, renders a single frame and writes the results to disk.
pub fn run(params: Params) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &params.config_path {
        Some(path) => {
            info!("Reading configuration from {}", path.display());
            RenderConfig::load(path)?
        }
        None => RenderConfig::default(),
    };
    if let Some(output) = params.output {
        config.output = output;
    }
    if let Some(shading) = params.shading {
        config.shading = shading;
    }

    let mut object = Object::load(&params.mesh_paths)?;
    let triangles: usize = object.submeshes().iter().map(|submesh| submesh.triangle_count()).sum();
    let vertices: usize = object.submeshes().iter().map(|submesh| submesh.vertex_count()).sum();
    info!("Number of submeshes - {}", object.submeshes().len());
    info!("Number of vertices  - {}", vertices);
    info!("Number of triangles - {}", triangles);

    let mut frame = FrameBuffer::new(config.width, config.height);
    let mut depth = DepthBuffer::new(config.width, config.height);

    let time_begin = time::Instant::now();
    object.render(&config, &mut frame, &mut depth)?;
    info!("Frame rendered in {:.1} ms", time_begin.elapsed().as_secs_f32() * 1000.0);

    frame.to_image().save(&config.output)?;
    info!("Frame buffer written to {}", config.output.display());
    if let Some(path) = &config.depth_output {
        depth.to_image().save(path)?;
        info!("Depth buffer written to {}", path.display());
    }

    return Ok(());
}
