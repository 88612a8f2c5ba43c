use super::{Point2d, Vector2d};
use cgmath::prelude::*;

/// Projects a point onto a local coordinate system.
///
/// # Parameters
/// * `point` - The point to project
/// * `origin` - The origin of the coordinate system
/// * `x_axis` - The basis vector pointing in the positive x-axis.
/// * `y_axis` - The basis vector pointing in the positive y-axis.
pub fn project_local(
    point: Point2d,
    origin: Point2d,
    x_axis: Vector2d,
    y_axis: Vector2d,
) -> Point2d {
    let point = point - origin;
    Point2d::new(point.dot(x_axis), point.dot(y_axis))
}

/// Rotates a vector 90 degrees anticlockwise, so that it points to the left.
pub fn rot90(vec: Vector2d) -> Vector2d {
    Vector2d::new(-vec.y, vec.x)
}

/// The unit vector pointing along the given heading, in radians.
pub fn heading_to_vector(heading: f64) -> Vector2d {
    let (sin, cos) = heading.sin_cos();
    Vector2d::new(cos, sin)
}

/// The heading in radians of the given vector, in the range `(-pi, pi]`.
pub fn vector_to_heading(vec: Vector2d) -> f64 {
    vec.y.atan2(vec.x)
}
