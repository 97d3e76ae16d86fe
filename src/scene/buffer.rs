use nalgebra as na;
use na::{vector, Matrix3, Vector2, Vector3};

/// Frame constants, set up once per render call and shared by every fragment.
#[derive(Debug, Clone, Copy)]
pub struct Uniforms {
    pub light_direction: Vector3<f32>, // Normalized, pointing towards the light.
    pub view_direction: Vector3<f32>,  // Normalized, pointing from the scene center to the eye.
}

/// Buffer for passing values from the vertex part of the pipeline to the fragment part, filled
/// once per triangle.
#[derive(Debug, Clone, Copy, Default)]
pub struct Varyings {
    pub tex_coords: Matrix3<f32>,   // Texture coordinates of the vertices as columns.
    pub intensities: Vector3<f32>,  // Light intensity in each vertex of the triangle.
}

impl Varyings {
    /// Texture coordinate at the fragment.
    pub fn uv(&self, bar_coord: Vector3<f32>) -> Vector2<f32> {
        let interpolated = self.tex_coords * bar_coord;
        return vector![interpolated.x, interpolated.y];
    }

    /// Light intensity at the fragment.
    pub fn intensity(&self, bar_coord: Vector3<f32>) -> f32 {
        return bar_coord.dot(&self.intensities);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn interpolation_follows_barycentric_weights() {
        let varyings = Varyings {
            tex_coords: Matrix3::from_columns(&[
                vector![0.0, 0.0, 0.0],
                vector![1.0, 0.0, 0.0],
                vector![0.0, 1.0, 0.0],
            ]),
            intensities: vector![0.2, 0.4, 1.0],
        };
        let bar_coord = vector![0.5, 0.25, 0.25];
        assert_relative_eq!(varyings.uv(bar_coord), vector![0.25, 0.25], epsilon = 1e-6);
        assert_relative_eq!(varyings.intensity(bar_coord), 0.45, epsilon = 1e-6);
    }
}
