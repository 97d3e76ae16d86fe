use nalgebra as na;
use na::{matrix, vector, Matrix4, Vector3, Vector4};

use crate::error::RenderError;

// All matrices act on column vectors: v' = M * v. A vertex goes through
// viewport * projection * view * model, in that order of composition.

/// Transformation of a point to homogenous coordinates.
pub fn to_hom_point(v: Vector3<f32>) -> Vector4<f32> {
    return vector![v.x, v.y, v.z, 1.0];
}

/// Transformation of a point from homogenous coordinates, i.e. the perspective divide.
/// Fails when w is exactly zero, which happens only for geometry lying in the eye plane.
pub fn perspective_divide(v: Vector4<f32>) -> Result<Vector3<f32>, RenderError> {
    if v.w == 0.0 {
        return Err(RenderError::DegenerateW);
    }
    return Ok(vector![v.x / v.w, v.y / v.w, v.z / v.w]);
}

/// Normalization which refuses zero vectors instead of returning NaNs.
pub fn try_normalize(v: Vector3<f32>) -> Result<Vector3<f32>, RenderError> {
    let norm = v.norm();
    if norm == 0.0 {
        return Err(RenderError::ZeroVector);
    }
    return Ok(v / norm);
}

pub fn translation(tx: f32, ty: f32, tz: f32) -> Matrix4<f32> {
    return matrix![1.0, 0.0, 0.0, tx;
                   0.0, 1.0, 0.0, ty;
                   0.0, 0.0, 1.0, tz;
                   0.0, 0.0, 0.0, 1.0];
}

pub fn scaling(sx: f32, sy: f32, sz: f32) -> Matrix4<f32> {
    return matrix![sx,  0.0, 0.0, 0.0;
                   0.0, sy,  0.0, 0.0;
                   0.0, 0.0, sz,  0.0;
                   0.0, 0.0, 0.0, 1.0];
}

/// Right-handed view matrix: the eye ends up in the origin, looking down -z, with `up` projected
/// onto the +y axis.
pub fn look_at(eye: Vector3<f32>, center: Vector3<f32>, up: Vector3<f32>) -> Result<Matrix4<f32>, RenderError> {
    // New coordinate system around the camera position.
    let new_z = try_normalize(eye - center)?;
    let new_x = try_normalize(up.cross(&new_z))?;
    let new_y = new_z.cross(&new_x);
    return Ok(matrix![new_x.x, new_x.y, new_x.z, -new_x.dot(&eye);
                      new_y.x, new_y.y, new_y.z, -new_y.dot(&eye);
                      new_z.x, new_z.y, new_z.z, -new_z.dot(&eye);
                      0.0,     0.0,     0.0,     1.0]);
}

/// Right-handed perspective projection of a view volume `width` x `height` at the near plane.
/// Depth lands in [0, 1] after the divide, near plane at 0.
pub fn perspective(width: f32, height: f32, near: f32, far: f32) -> Matrix4<f32> {
    let range = far / (near - far);
    return matrix![2.0 * near / width, 0.0,                 0.0,   0.0;
                   0.0,                2.0 * near / height, 0.0,   0.0;
                   0.0,                0.0,                 range, near * range;
                   0.0,                0.0,                 -1.0,  0.0];
}

/// Right-handed orthographic projection, depth in [0, 1] with the near plane at 0.
pub fn orthographic(width: f32, height: f32, near: f32, far: f32) -> Matrix4<f32> {
    let range = 1.0 / (near - far);
    return matrix![2.0 / width, 0.0,          0.0,   0.0;
                   0.0,         2.0 / height, 0.0,   0.0;
                   0.0,         0.0,          range, near * range;
                   0.0,         0.0,          0.0,   1.0];
}

/// Maps normalized device coordinates to pixels. x and y go from [-1, 1] to [0, width] and
/// [0, height]; depth goes from [0, 1] to [depth, 0].
///
/// This flip is the one place where the depth convention is set: the larger the stored depth,
/// the nearer the surface. The rasterizer's depth test relies on it.
///
/// The z row stays in floats: vertex depths are interpolated unrounded and only the per-pixel
/// result is truncated to the 8-bit buffer.
pub fn viewport(width: u32, height: u32, depth: f32) -> Matrix4<f32> {
    let w = width as f32;
    let h = height as f32;
    return matrix![w / 2.0, 0.0,     0.0,    w / 2.0;
                   0.0,     h / 2.0, 0.0,    h / 2.0;
                   0.0,     0.0,     -depth, depth;
                   0.0,     0.0,     0.0,    1.0];
}
