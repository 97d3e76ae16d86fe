//! Stateless rasterization primitives. Every buffer and color is an explicit parameter.

use std::cmp::{max, min};
use std::mem::swap;

use nalgebra as na;
use na::{vector, Vector2, Vector3};

use crate::canvas::{Color, DepthBuffer, FrameBuffer};

/// Draws a line from a to b via Bresenham's algorithm with an integer decision variable.
///
/// Exactly one pixel is written per step along the major axis, the far endpoint excluded, so
/// (0, 0) -> (10, 0) covers x = 0..9. A segment whose endpoints coincide draws nothing.
/// Endpoint order does not matter: both directions are walked left to right.
///
/// Only the steps that land inside the buffer along the major axis are walked, so the cost is
/// bounded by the buffer size however far off screen the endpoints are.
pub fn line(a: Vector2<i32>, b: Vector2<i32>, frame: &mut FrameBuffer, color: Color) {
    let (mut ax, mut ay, mut bx, mut by) = (a.x as i64, a.y as i64, b.x as i64, b.y as i64);
    let steep = (by - ay).abs() > (bx - ax).abs();
    if steep {
        swap(&mut ax, &mut ay);
        swap(&mut bx, &mut by);
    }
    // Make it left-to-right.
    if ax > bx {
        swap(&mut ax, &mut bx);
        swap(&mut ay, &mut by);
    }
    let (major_len, minor_len) = match steep {
        true => (frame.height() as i64, frame.width() as i64),
        false => (frame.width() as i64, frame.height() as i64),
    };
    let first = max(ax, 0);
    let last = min(bx, major_len);
    if first >= last {
        return;
    }

    let dx = bx - ax;
    let dy = (by - ay).abs();
    let step_y = if by > ay { 1 } else { -1 };
    // D := 2dy - dx, y advances whenever D turns positive. After k steps y has advanced
    // ceil((2k dy - dx) / 2dx) rows; jump straight to the first visible step.
    let skipped = (first - ax) as i128;
    let (dx_wide, dy_wide) = (dx as i128, dy as i128);
    let rise = -(dx_wide - 2 * skipped * dy_wide).div_euclid(2 * dx_wide);
    let mut y = ay + step_y * rise as i64;
    let mut decision = (2 * dy_wide * (skipped + 1) - dx_wide - 2 * dx_wide * rise) as i64;
    for x in first..last {
        if (0..minor_len).contains(&y) {
            if steep {
                frame.set(y as i32, x as i32, color);
            } else {
                frame.set(x as i32, y as i32, color);
            }
        }
        if decision > 0 {
            y += step_y;
            decision -= 2 * dx;
        }
        decision += 2 * dy;
    }
}

/// Signed area of the triangle pqr, positive for counter-clockwise winding with y up.
/// The cross product is exact in integers for any i32 input, only the halving happens in floats.
pub fn signed_area(p: Vector2<i32>, q: Vector2<i32>, r: Vector2<i32>) -> f32 {
    let [px, py, qx, qy, rx, ry] = [p.x, p.y, q.x, q.y, r.x, r.y].map(|c| c as i128);
    let cross = (qx - px) * (ry - py) - (qy - py) * (rx - px);
    return cross as f32 / 2.0;
}

/// Barycentric coordinates of p in abc given the precomputed area of abc.
/// Any negative component means p lies outside of the triangle.
pub fn barycentric(p: Vector2<i32>, a: Vector2<i32>, b: Vector2<i32>, c: Vector2<i32>, total_area: f32) -> Vector3<f32> {
    return vector![
        signed_area(p, b, c) / total_area,
        signed_area(p, c, a) / total_area,
        signed_area(p, a, b) / total_area
    ];
}

/// Triangles with less than this signed area are discarded. Clockwise (back-facing) triangles
/// have negative area, so the same threshold culls them together with sub-pixel slivers.
pub const MIN_TRIANGLE_AREA: f32 = 1.0;

/// Integer pixel bounds of a triangle, `min` inclusive and `max` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min: Vector2<i32>,
    pub max: Vector2<i32>,
}

impl BoundingBox {
    pub fn of_triangle(a: Vector2<i32>, b: Vector2<i32>, c: Vector2<i32>) -> BoundingBox {
        return BoundingBox {
            min: vector![min(min(a.x, b.x), c.x), min(min(a.y, b.y), c.y)],
            max: vector![max(max(a.x, b.x), c.x), max(max(a.y, b.y), c.y)],
        };
    }

    /// Intersection with a `width` x `height` buffer.
    pub fn clip(self, width: u32, height: u32) -> BoundingBox {
        return BoundingBox {
            min: vector![max(self.min.x, 0), max(self.min.y, 0)],
            max: vector![min(self.max.x, width as i32), min(self.max.y, height as i32)],
        };
    }
}

/// Fills a screen-space triangle with a depth test.
///
/// x and y of the vertices are pixel coordinates (truncated to integers), z is a depth already
/// mapped to [0, 255]. For every covered pixel the interpolated depth is compared to the depth
/// buffer: nearer-or-equal fragments overwrite the stored depth, then `fragment` is asked for
/// the color given the barycentric coordinates; `None` keeps the old color.
///
/// Returns `None` when the triangle is culled (see `MIN_TRIANGLE_AREA`), otherwise the number of
/// fragments that passed the depth test.
///
/// The bounding box is walked half-open, so pixels on its right and top edge are never tested.
/// The depth read and both writes for one pixel happen back to back; this is what keeps the
/// function correct only as long as triangles are drawn one after another.
pub fn triangle<F>(
    a: Vector3<f32>, b: Vector3<f32>, c: Vector3<f32>,
    depth: &mut DepthBuffer,
    frame: &mut FrameBuffer,
    mut fragment: F,
) -> Option<usize>
where
    F: FnMut(Vector3<f32>) -> Option<Color>,
{
    let coord_a = vector![a.x as i32, a.y as i32];
    let coord_b = vector![b.x as i32, b.y as i32];
    let coord_c = vector![c.x as i32, c.y as i32];
    let total_area = signed_area(coord_a, coord_b, coord_c);
    if total_area < MIN_TRIANGLE_AREA {
        return None;
    }
    let z_values = vector![a.z, b.z, c.z];

    let bbox = BoundingBox::of_triangle(coord_a, coord_b, coord_c).clip(frame.width(), frame.height());
    let mut fragments = 0;
    for x in bbox.min.x..bbox.max.x {
        for y in bbox.min.y..bbox.max.y {
            let bar_coord = barycentric(vector![x, y], coord_a, coord_b, coord_c, total_area);
            if bar_coord.x < 0.0 || bar_coord.y < 0.0 || bar_coord.z < 0.0 {
                continue;
            }
            // Vertex depths are not rounded first, only the interpolated value is.
            let z = bar_coord.dot(&z_values) as u8;
            // Farther fragments fail, equal ones overwrite.
            match depth.get(x, y) {
                Some(stored) if z >= stored => (),
                _ => continue,
            }
            depth.set(x, y, z);
            if let Some(color) = fragment(bar_coord) {
                frame.set(x, y, color);
            }
            fragments += 1;
        }
    }

    return Some(fragments);
}

/// Depth-tested triangle filled with a single color.
pub fn fill_triangle(
    a: Vector3<f32>, b: Vector3<f32>, c: Vector3<f32>,
    depth: &mut DepthBuffer,
    frame: &mut FrameBuffer,
    color: Color,
) -> Option<usize> {
    return triangle(a, b, c, depth, frame, |_| Some(color));
}
