use crate::math::{Point2d, Polyline2d, Shape2d};
use crate::{LaneCorridorId, LaneCorridorSet, RoadCorridorId};

/// A lane corridor is a drivable path with a centre line and a shape
/// describing the area it covers.
#[derive(Clone, Debug)]
pub struct LaneCorridor {
    /// The lane corridor ID.
    id: LaneCorridorId,
    /// The centre line of the corridor.
    centre_line: Polyline2d,
    /// The drivable area of the corridor.
    polygon: Shape2d,
    /// The width of the corridor in m.
    width: f64,
}

/// The attributes of a lane corridor.
#[derive(Clone, Debug)]
pub struct LaneCorridorAttributes {
    /// The points defining the centre line, in the direction of travel.
    /// At least two of them must be distinct.
    pub centre_line: Vec<Point2d>,
    /// The width of the corridor in m.
    pub width: f64,
}

/// The set of lane corridors available to an agent at its location on the road.
#[derive(Clone, Debug)]
pub struct RoadCorridor {
    /// The road corridor ID.
    id: RoadCorridorId,
    /// The unique lane corridors, in the order they were added.
    lane_corridors: Vec<LaneCorridorId>,
}

impl LaneCorridor {
    /// Creates a new lane corridor.
    pub(crate) fn new(id: LaneCorridorId, attribs: &LaneCorridorAttributes) -> Self {
        let centre_line = Polyline2d::new(attribs.centre_line.iter().copied());
        let polygon = Shape2d::strip(&centre_line, attribs.width);
        Self {
            id,
            centre_line,
            polygon,
            width: attribs.width,
        }
    }

    /// Gets the lane corridor's ID.
    pub fn id(&self) -> LaneCorridorId {
        self.id
    }

    /// Gets the length of the centre line in m.
    pub fn length(&self) -> f64 {
        self.centre_line.length()
    }

    /// Gets the width of the corridor in m.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Gets the corridor's centre line.
    pub fn centre_line(&self) -> &Polyline2d {
        &self.centre_line
    }

    /// Gets the shape covering the whole drivable area of the corridor.
    pub fn merged_polygon(&self) -> &Shape2d {
        &self.polygon
    }

    /// Whether the given point lies within the corridor.
    pub fn contains(&self, point: Point2d) -> bool {
        self.polygon.contains(point)
    }

    /// The longitudinal position of `point` along the centre line in m.
    pub fn s(&self, point: Point2d) -> f64 {
        self.centre_line.project(point).s
    }

    /// The distance in m from the projection of `point` to the end of the corridor.
    pub fn length_until_end(&self, point: Point2d) -> f64 {
        self.centre_line.remaining_length(point)
    }
}

impl RoadCorridor {
    /// Creates a new road corridor, discarding repeated lane corridors.
    pub(crate) fn new(id: RoadCorridorId, lane_corridors: &[LaneCorridorId]) -> Self {
        let mut unique = Vec::with_capacity(lane_corridors.len());
        for lane_corr in lane_corridors {
            if !unique.contains(lane_corr) {
                unique.push(*lane_corr);
            }
        }
        Self {
            id,
            lane_corridors: unique,
        }
    }

    /// Gets the road corridor's ID.
    pub fn id(&self) -> RoadCorridorId {
        self.id
    }

    /// The unique lane corridors of the road corridor, in a stable order.
    pub fn unique_lane_corridors(&self) -> &[LaneCorridorId] {
        &self.lane_corridors
    }

    /// Finds the lane corridor containing `point`.
    /// If corridors overlap at that point, the first one added wins.
    pub fn current_lane_corridor(
        &self,
        point: Point2d,
        lane_corridors: &LaneCorridorSet,
    ) -> Option<LaneCorridorId> {
        self.lane_corridors
            .iter()
            .copied()
            .find(|id| lane_corridors[*id].contains(point))
    }
}
