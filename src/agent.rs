use crate::math::{heading_to_vector, Point2d, Shape2d, Vector2d};
use crate::{AgentId, RoadCorridorId};
use serde::{Deserialize, Serialize};

/// A simulated road user.
#[derive(Clone, Debug)]
pub struct Agent {
    /// The agent's ID
    pub(crate) id: AgentId,
    /// Half the agent's length in m.
    half_len: f64,
    /// Half the agent's width in m.
    half_wid: f64,
    /// Whether the agent is a vehicle, as opposed to a pedestrian or other obstacle.
    is_vehicle: bool,
    /// The current kinematic state.
    state: AgentState,
    /// The road corridor the agent is travelling along.
    road_corridor: RoadCorridorId,
}

/// The attributes of a simulated agent.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct AgentAttributes {
    /// The agent length in m.
    pub length: f64,
    /// The agent width in m.
    pub width: f64,
    /// Whether the agent is a vehicle.
    pub is_vehicle: bool,
}

/// The kinematic state of an agent at a point in time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    /// The simulation time in s.
    pub time: f64,
    /// The world space coordinates of the centre of the agent.
    pub pos: Point2d,
    /// The heading in radians, anticlockwise from the x-axis.
    pub heading: f64,
    /// The speed in m/s.
    pub vel: f64,
}

impl Default for AgentAttributes {
    fn default() -> Self {
        Self {
            length: 4.5,
            width: 1.8,
            is_vehicle: true,
        }
    }
}

impl AgentState {
    /// Creates a state at time zero.
    pub fn new(pos: Point2d, heading: f64, vel: f64) -> Self {
        Self {
            time: 0.0,
            pos,
            heading,
            vel,
        }
    }

    /// A unit vector aligned with the heading.
    pub fn direction(&self) -> Vector2d {
        heading_to_vector(self.heading)
    }
}

impl Agent {
    /// Creates a new agent.
    pub(crate) fn new(
        id: AgentId,
        attributes: &AgentAttributes,
        state: AgentState,
        road_corridor: RoadCorridorId,
    ) -> Self {
        Self {
            id,
            half_len: 0.5 * attributes.length,
            half_wid: 0.5 * attributes.width,
            is_vehicle: attributes.is_vehicle,
            state,
            road_corridor,
        }
    }

    /// Gets the agent's ID.
    pub fn id(&self) -> AgentId {
        self.id
    }

    /// The agent's length in m.
    pub fn length(&self) -> f64 {
        2.0 * self.half_len
    }

    /// The agent's width in m.
    pub fn width(&self) -> f64 {
        2.0 * self.half_wid
    }

    /// Whether the agent is a vehicle.
    pub fn is_vehicle(&self) -> bool {
        self.is_vehicle
    }

    /// The agent's current state.
    pub fn state(&self) -> &AgentState {
        &self.state
    }

    /// The coordinates in world space of the centre of the agent.
    pub fn position(&self) -> Point2d {
        self.state.pos
    }

    /// The agent's heading in radians.
    pub fn heading(&self) -> f64 {
        self.state.heading
    }

    /// The agent's speed in m/s.
    pub fn vel(&self) -> f64 {
        self.state.vel
    }

    /// The road corridor the agent is travelling along.
    pub fn road_corridor(&self) -> RoadCorridorId {
        self.road_corridor
    }

    /// The rectangle in world space occupied by the agent.
    pub fn footprint(&self) -> Shape2d {
        Shape2d::rectangle(
            self.state.pos,
            self.state.heading,
            self.length(),
            self.width(),
        )
    }

    /// Replaces the agent's state.
    pub(crate) fn set_state(&mut self, state: AgentState) {
        self.state = state;
    }
}
