//! Ground-plane geometry for the single-track steering model.
//!
//! Points and directions are `Vec2`s holding world `(x, z)`.

use glam::{Vec2, Vec3};

/// Determinant magnitude below which two axle lines count as parallel.
const PARALLEL_EPSILON: f32 = 1e-6;

/// Project a world point or direction onto the ground plane.
pub fn ground(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Rotate a ground-plane vector about the vertical axis.
pub fn rotate_about_y(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(cos * v.x - sin * v.y, sin * v.x + cos * v.y)
}

/// A line `normal · p = constant` on the ground plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line {
    pub normal: Vec2,
    pub constant: f32,
}

impl Line {
    /// The line through `point` with the given normal.
    pub fn through(point: Vec2, normal: Vec2) -> Self {
        Self {
            normal,
            constant: normal.dot(point),
        }
    }

    /// Intersection with another line, `None` when parallel or degenerate.
    pub fn intersect(&self, other: &Line) -> Option<Vec2> {
        let (a, b) = (self.normal, other.normal);
        let det = a.x * b.y - b.x * a.y;
        if det.abs() < PARALLEL_EPSILON {
            return None;
        }
        let x = (b.y * self.constant - a.y * other.constant) / det;
        let z = (a.x * other.constant - b.x * self.constant) / det;
        let point = Vec2::new(x, z);
        point.is_finite().then_some(point)
    }
}

/// Point on the circle around `center` nearest to `point`.
///
/// Returns `None` when `point` sits on the center (no direction to keep) or the
/// result is not finite.
pub fn snap_to_circle(center: Vec2, radius: f32, point: Vec2) -> Option<Vec2> {
    let offset = point - center;
    let length = offset.length();
    if length <= f32::EPSILON {
        return None;
    }
    let snapped = center + offset * (radius / length);
    snapped.is_finite().then_some(snapped)
}

/// Turn center of a single-track vehicle.
///
/// The rear axle line passes through `position` perpendicular to `heading`;
/// the front axle line passes through `position + heading * wheelbase / 2`,
/// perpendicular to the heading turned by `wheel_angle`. Straight wheels give
/// parallel lines and no center.
pub fn turn_center(position: Vec2, heading: Vec2, wheel_angle: f32, wheelbase: f32) -> Option<Vec2> {
    let rear = Line::through(position, heading);
    let front_normal = rotate_about_y(heading, wheel_angle);
    let front = Line::through(position + heading * (wheelbase * 0.5), front_normal);
    front.intersect(&rear)
}
