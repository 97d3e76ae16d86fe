use nalgebra as na;
use na::{vector, Vector3};
use serde::{Deserialize, Serialize};

use super::buffer::{Uniforms, Varyings};
use super::Materials;
use crate::canvas::{Color, RED, WHITE};

/// How triangles are turned into pixels, chosen once per render call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ShadingMode {
    /// Triangle edges only, drawn over everything without touching the depth buffer.
    Wireframe { color: Color },
    /// Depth-tested fill with one color.
    Flat { color: Color },
    /// Depth-tested fill, the color scaled by the interpolated vertex intensities.
    Gouraud { color: Color },
    /// Depth-tested fill, every triangle in its own opaque color drawn from a generator seeded
    /// with `seed`, so the same seed gives the same frame.
    RandomColor {
        #[serde(default)]
        seed: u64,
    },
    /// Diffuse map lit according to `lighting`.
    Textured { lighting: Lighting },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lighting {
    /// Intensity interpolated from per-vertex normals.
    Vertex,
    /// Intensity from the normal map.
    NormalMap,
    /// Normal map plus a highlight driven by the specular map.
    Specular,
}

impl ShadingMode {
    /// Parses the short names accepted on the command line.
    pub fn from_name(name: &str) -> Option<ShadingMode> {
        match name {
            "wireframe" => return Some(ShadingMode::Wireframe { color: RED }),
            "flat" => return Some(ShadingMode::Flat { color: WHITE }),
            "gouraud" => return Some(ShadingMode::Gouraud { color: WHITE }),
            "random" => return Some(ShadingMode::RandomColor { seed: 0 }),
            "textured" => return Some(ShadingMode::Textured { lighting: Lighting::Vertex }),
            "normal_map" => return Some(ShadingMode::Textured { lighting: Lighting::NormalMap }),
            "specular" => return Some(ShadingMode::Textured { lighting: Lighting::Specular }),
            _ => return None,
        }
    }

    /// Whether the transform pass has to compute per-vertex light intensities.
    pub fn needs_vertex_intensities(&self) -> bool {
        match self {
            ShadingMode::Gouraud { .. } => return true,
            ShadingMode::Textured { lighting: Lighting::Vertex } => return true,
            _ => return false,
        }
    }
}

impl Default for ShadingMode {
    fn default() -> ShadingMode {
        return ShadingMode::Textured { lighting: Lighting::NormalMap };
    }
}

/// Strength of the specular highlight relative to the diffuse term.
const SPECULAR_WEIGHT: f32 = 0.6;

/// Decodes a tangent-space normal stored as rgb8: every channel maps to (c - 128) / 128.
pub fn decode_normal(texel: Color) -> Vector3<f32> {
    return vector![
        (texel.r as f32 - 128.0) / 128.0,
        (texel.g as f32 - 128.0) / 128.0,
        (texel.b as f32 - 128.0) / 128.0
    ];
}

/// Fragment shader of the textured modes. Pure: the caller writes the returned color.
pub fn fragment(
    bar_coord: Vector3<f32>,
    varyings: &Varyings,
    uniforms: &Uniforms,
    maps: &Materials,
    lighting: Lighting,
) -> Color {
    let uv = varyings.uv(bar_coord);
    let color = maps.diffuse.sample(uv);
    match lighting {
        Lighting::Vertex => {
            return color.scale(varyings.intensity(bar_coord));
        }
        Lighting::NormalMap => {
            let normal = decode_normal(maps.normal.sample(uv));
            let diff_coef = normal.dot(&uniforms.light_direction).max(0.0);
            return color.scale(diff_coef);
        }
        Lighting::Specular => {
            let normal = decode_normal(maps.normal.sample(uv));
            let n_dot_l = normal.dot(&uniforms.light_direction);
            let diff_coef = n_dot_l.max(0.0);
            let mut spec_coef = 0.0;
            if !maps.specular.is_empty() {
                let reflected = 2.0 * n_dot_l * normal - uniforms.light_direction;
                let exponent = maps.specular.sample(uv).r as f32;
                spec_coef = SPECULAR_WEIGHT * reflected.dot(&uniforms.view_direction).max(0.0).powf(exponent);
            }
            let coef = diff_coef + spec_coef;
            return Color {
                r: (coef * color.r as f32).min(255.0) as u8,
                g: (coef * color.g as f32).min(255.0) as u8,
                b: (coef * color.b as f32).min(255.0) as u8,
                a: color.a,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Texture, BLACK};
    use approx::assert_relative_eq;
    use image::{Rgba, RgbaImage};
    use nalgebra::Matrix3;

    fn solid(r: u8, g: u8, b: u8) -> Texture {
        return Texture::new(RgbaImage::from_pixel(4, 4, Rgba([r, g, b, 255])));
    }

    fn varyings() -> Varyings {
        return Varyings {
            tex_coords: Matrix3::from_columns(&[
                vector![0.1, 0.1, 0.0],
                vector![0.9, 0.1, 0.0],
                vector![0.1, 0.9, 0.0],
            ]),
            intensities: vector![1.0, 0.5, 0.0],
        };
    }

    fn facing_light() -> Uniforms {
        return Uniforms {
            light_direction: vector![0.0, 0.0, 1.0],
            view_direction: vector![0.0, 0.0, 1.0],
        };
    }

    #[test]
    fn decodes_flat_normal() {
        let n = decode_normal(Color::new(128, 128, 255));
        assert_relative_eq!(n, vector![0.0, 0.0, 127.0 / 128.0]);
        let n = decode_normal(Color::new(0, 255, 128));
        assert_relative_eq!(n, vector![-1.0, 127.0 / 128.0, 0.0]);
    }

    #[test]
    fn vertex_lighting_interpolates_intensity() {
        let maps = Materials { diffuse: solid(200, 100, 50), ..Default::default() };
        let color = fragment(vector![0.0, 1.0, 0.0], &varyings(), &facing_light(), &maps, Lighting::Vertex);
        assert_eq!(color, Color::new(100, 50, 25));
    }

    #[test]
    fn normal_map_lighting_clamps_back_light_to_black() {
        let maps = Materials {
            diffuse: solid(200, 100, 50),
            normal: solid(128, 128, 255),
            ..Default::default()
        };
        let lit = fragment(vector![0.3, 0.3, 0.4], &varyings(), &facing_light(), &maps, Lighting::NormalMap);
        assert_eq!(lit, Color::new(198, 99, 49));

        let behind = Uniforms { light_direction: vector![0.0, 0.0, -1.0], ..facing_light() };
        let unlit = fragment(vector![0.3, 0.3, 0.4], &varyings(), &behind, &maps, Lighting::NormalMap);
        assert_eq!(unlit, BLACK);
    }

    #[test]
    fn specular_map_brightens_highlight() {
        let mut maps = Materials {
            diffuse: solid(200, 100, 50),
            normal: solid(128, 128, 255),
            ..Default::default()
        };
        let bar_coord = vector![0.3, 0.3, 0.4];
        // Without a specular map the result equals plain normal mapping.
        let plain = fragment(bar_coord, &varyings(), &facing_light(), &maps, Lighting::Specular);
        assert_eq!(plain, Color::new(198, 99, 49));

        // A black map means exponent 0: the full highlight, clamped per channel.
        maps.specular = solid(0, 0, 0);
        let shiny = fragment(bar_coord, &varyings(), &facing_light(), &maps, Lighting::Specular);
        assert_eq!(shiny, Color::new(255, 159, 79));
    }

    #[test]
    fn specular_exponent_comes_from_the_map() {
        let maps = Materials {
            diffuse: solid(100, 60, 20),
            normal: solid(128, 128, 255),
            specular: solid(10, 0, 0),
        };
        // n = (0, 0, 127/128), so r.v = 2(n.l)^2 - 1 and the coefficient is
        // 127/128 + 0.6 * 0.96887^10 = 1.4295.
        let color = fragment(vector![0.3, 0.3, 0.4], &varyings(), &facing_light(), &maps, Lighting::Specular);
        assert_eq!(color, Color::new(142, 85, 28));
    }

    #[test]
    fn missing_diffuse_map_shades_black() {
        let maps = Materials::default();
        let color = fragment(vector![1.0, 0.0, 0.0], &varyings(), &facing_light(), &maps, Lighting::Vertex);
        assert_eq!(color, BLACK);
    }

    #[test]
    fn only_interpolating_modes_need_intensities() {
        assert!(ShadingMode::from_name("gouraud").unwrap().needs_vertex_intensities());
        assert!(ShadingMode::from_name("textured").unwrap().needs_vertex_intensities());
        assert!(!ShadingMode::from_name("normal_map").unwrap().needs_vertex_intensities());
        assert!(!ShadingMode::from_name("wireframe").unwrap().needs_vertex_intensities());
        assert!(!ShadingMode::from_name("random").unwrap().needs_vertex_intensities());
        assert_eq!(ShadingMode::from_name("phong"), None);
    }
}
