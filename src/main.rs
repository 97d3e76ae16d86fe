mod app;
mod canvas;
mod config;
mod error;
mod raster;
mod scene;
mod util;

use std::env;
use std::path::PathBuf;

use scene::shader::ShadingMode;

const USAGE: &str = "Usage: tiny_rasterizer [-c config.toml] [-o output.png] [-s shading] model.obj...";

/// Takes the value following a flag.
fn flag_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
    return args.next().ok_or_else(|| format!("{} expects a value\n{}", flag, USAGE));
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Default values.
    let mut config_path = None;
    let mut output = None;
    let mut shading = None;
    let mut mesh_paths = Vec::new();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-c" => { config_path = Some(PathBuf::from(flag_value(&mut args, "-c")?)); }
            "-o" => { output = Some(PathBuf::from(flag_value(&mut args, "-o")?)); }
            "-s" => {
                let name = flag_value(&mut args, "-s")?;
                shading = Some(ShadingMode::from_name(&name).ok_or_else(|| format!("unknown shading mode {}", name))?);
            }
            _ => { mesh_paths.push(PathBuf::from(arg)); }
        }
    }
    if mesh_paths.is_empty() {
        return Err(USAGE.into());
    }

    let params = app::Params {
        config_path,
        output,
        shading,
        mesh_paths,
    };

    app::run(params)?;

    return Ok(());
}
