use super::{heading_to_vector, rot90, vector_to_heading, Point2d, Polyline2d};
use cgmath::prelude::*;
use itertools::Itertools;
use parry2d_f64::na::{Isometry2, Point2, Vector2};
use parry2d_f64::query::{self, PointQuery};
use parry2d_f64::shape::SharedShape;
use std::fmt;

/// A region of the plane used for footprint and corridor overlap tests.
#[derive(Clone)]
pub struct Shape2d {
    /// The pose of the collision shape in world space.
    pose: Isometry2<f64>,
    /// The collision shape.
    shape: SharedShape,
    /// An approximate outline, for debugging output.
    outline: Vec<Point2d>,
}

impl Shape2d {
    /// Creates a rectangle centred on `centre` and rotated to `heading`.
    pub fn rectangle(centre: Point2d, heading: f64, length: f64, width: f64) -> Self {
        let long = heading_to_vector(heading) * (0.5 * length);
        let lat = rot90(heading_to_vector(heading)) * (0.5 * width);
        Self {
            pose: Isometry2::new(Vector2::new(centre.x, centre.y), heading),
            shape: SharedShape::cuboid(0.5 * length, 0.5 * width),
            outline: vec![
                centre + long + lat,
                centre - long + lat,
                centre - long - lat,
                centre + long - lat,
            ],
        }
    }

    /// Creates the region within `0.5 * width` of the centre line, measured
    /// perpendicular to it. The region is flat at both ends of the centre line
    /// and keeps its full width around bends.
    pub fn strip(centre_line: &Polyline2d, width: f64) -> Self {
        let half_wid = 0.5 * width;
        let points = centre_line.points();

        let segments = points.iter().tuple_windows().map(|(&a, &b)| {
            let mid = a.midpoint(b);
            let pose = Isometry2::new(Vector2::new(mid.x, mid.y), vector_to_heading(b - a));
            (pose, SharedShape::cuboid(0.5 * a.distance(b), half_wid))
        });
        // Fills the wedge left between two segments on the outside of a bend
        let joints = points[1..points.len() - 1]
            .iter()
            .map(|p| (Isometry2::translation(p.x, p.y), SharedShape::ball(half_wid)));

        let mut outline = centre_line.offset_points(half_wid);
        outline.extend(centre_line.offset_points(-half_wid).into_iter().rev());

        Self {
            pose: Isometry2::identity(),
            shape: SharedShape::compound(segments.chain(joints).collect()),
            outline,
        }
    }

    /// An approximate outline of the region.
    pub fn outline(&self) -> &[Point2d] {
        &self.outline
    }

    /// Determines whether the point lies inside the region.
    pub fn contains(&self, point: Point2d) -> bool {
        self.shape
            .contains_point(&self.pose, &Point2::new(point.x, point.y))
    }

    /// Determines whether the two regions overlap or touch.
    pub fn intersects(&self, other: &Shape2d) -> bool {
        // Every pair of shapes built here is supported by the query dispatcher
        query::intersection_test(&self.pose, &*self.shape, &other.pose, &*other.shape)
            .unwrap_or(false)
    }
}

impl fmt::Debug for Shape2d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shape2d")
            .field("outline", &self.outline)
            .finish()
    }
}
