use crate::math::{Point2d, Shape2d};
use crate::prediction::PredictiveMotionModel;
use crate::{
    Agent, AgentAttributes, AgentId, AgentSet, AgentState, LaneCorridor, LaneCorridorAttributes,
    LaneCorridorId, LaneCorridorSet, RoadCorridor, RoadCorridorId, RoadCorridorSet,
};
use smallvec::SmallVec;

/// A snapshot of the road network and the agents on it.
///
/// Agents are always visited in slot order, which is their creation order
/// unless agents have been removed and their slots reused.
#[derive(Clone, Default)]
pub struct World {
    /// The lane corridors in the network.
    lane_corridors: LaneCorridorSet,
    /// The road corridors in the network.
    road_corridors: RoadCorridorSet,
    /// The agents in the world.
    agents: AgentSet,
    /// The simulation time in s.
    time: f64,
}

/// A read-only view of a [World] from the perspective of one agent, the "ego" agent.
#[derive(Clone, Copy)]
pub struct ObservedWorld<'a> {
    world: &'a World,
    ego: AgentId,
}

/// Agents found by a shape query; usually only a handful.
pub type AgentIds = SmallVec<[AgentId; 8]>;

impl World {
    /// Creates a new, empty world.
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds a lane corridor to the network.
    ///
    /// # Panics
    /// If the centre line has fewer than two distinct points.
    pub fn add_lane_corridor(&mut self, attributes: &LaneCorridorAttributes) -> LaneCorridorId {
        self.lane_corridors
            .insert_with_key(|id| LaneCorridor::new(id, attributes))
    }

    /// Adds a road corridor made up of the given lane corridors.
    pub fn add_road_corridor(&mut self, lane_corridors: &[LaneCorridorId]) -> RoadCorridorId {
        self.road_corridors
            .insert_with_key(|id| RoadCorridor::new(id, lane_corridors))
    }

    /// Adds an agent travelling along the given road corridor.
    pub fn add_agent(
        &mut self,
        attributes: &AgentAttributes,
        state: AgentState,
        road_corridor: RoadCorridorId,
    ) -> AgentId {
        self.agents
            .insert_with_key(|id| Agent::new(id, attributes, state, road_corridor))
    }

    /// Removes an agent from the world.
    pub fn remove_agent(&mut self, id: AgentId) -> Option<Agent> {
        self.agents.remove(id)
    }

    /// Replaces the state of an agent.
    pub fn set_agent_state(&mut self, id: AgentId, state: AgentState) {
        if let Some(agent) = self.agents.get_mut(id) {
            agent.set_state(state);
        }
    }

    /// Sets the simulation time.
    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    /// The simulation time in s.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Gets the agent with the given ID, if it is still in the world.
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    /// Returns an iterator over all the agents, in slot order.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    /// Gets a reference to the lane corridor with the given ID.
    pub fn lane_corridor(&self, id: LaneCorridorId) -> &LaneCorridor {
        &self.lane_corridors[id]
    }

    /// Gets a reference to the road corridor with the given ID.
    pub fn road_corridor(&self, id: RoadCorridorId) -> &RoadCorridor {
        &self.road_corridors[id]
    }

    /// Finds the lane corridor of an agent's road corridor which contains `point`.
    pub fn lane_corridor_at(
        &self,
        road_corridor: RoadCorridorId,
        point: Point2d,
    ) -> Option<LaneCorridorId> {
        self.road_corridors[road_corridor].current_lane_corridor(point, &self.lane_corridors)
    }

    /// Finds the lane corridor the agent is currently in, if any.
    pub fn current_lane_corridor(&self, id: AgentId) -> Option<LaneCorridorId> {
        let agent = self.agents.get(id)?;
        self.lane_corridor_at(agent.road_corridor(), agent.position())
    }

    /// Finds the agents whose footprint overlaps the shape, in slot order.
    pub fn agents_intersecting_polygon(&self, shape: &Shape2d) -> AgentIds {
        self.agents
            .values()
            .filter(|agent| agent.footprint().intersects(shape))
            .map(|agent| agent.id())
            .collect()
    }

    /// Creates a copy of the world with every agent moved `dt` seconds into the future.
    pub fn predict(&self, dt: f64, model: &dyn PredictiveMotionModel) -> World {
        let mut world = self.clone();
        for agent in world.agents.values_mut() {
            let state = model.predict(agent.state(), dt);
            agent.set_state(state);
        }
        world.time += dt;
        world
    }
}

impl<'a> ObservedWorld<'a> {
    /// Observes the world from the perspective of the `ego` agent.
    ///
    /// # Panics
    /// If the ego agent is not in the world.
    pub fn new(world: &'a World, ego: AgentId) -> Self {
        if !world.agents.contains_key(ego) {
            panic!("Ego agent is not in the world");
        }
        Self { world, ego }
    }

    /// The observed world.
    pub fn world(&self) -> &'a World {
        self.world
    }

    /// The ID of the ego agent.
    pub fn ego_id(&self) -> AgentId {
        self.ego
    }

    /// The ego agent.
    pub fn ego_agent(&self) -> &'a Agent {
        let world = self.world;
        &world.agents[self.ego]
    }

    /// The ego agent's current state.
    pub fn ego_state(&self) -> &'a AgentState {
        self.ego_agent().state()
    }

    /// The ego agent's current position.
    pub fn ego_position(&self) -> Point2d {
        self.ego_agent().position()
    }

    /// The road corridor of the ego agent.
    pub fn ego_road_corridor(&self) -> &'a RoadCorridor {
        self.world.road_corridor(self.ego_agent().road_corridor())
    }

    /// The lane corridor the ego agent is currently in, if any.
    pub fn lane_corridor(&self) -> Option<LaneCorridorId> {
        self.world.current_lane_corridor(self.ego)
    }

    /// Finds the nearest other agent within the lane corridor that is ahead of the ego agent,
    /// and its longitudinal distance along the centre line.
    pub fn agent_in_front(&self, lane_corridor: LaneCorridorId) -> Option<(AgentId, f64)> {
        self.nearest_agent(lane_corridor, |ds| ds > 0.0)
    }

    /// Finds the nearest other agent within the lane corridor that is level with or behind
    /// the ego agent, and its (non-positive) longitudinal distance along the centre line.
    pub fn agent_behind(&self, lane_corridor: LaneCorridorId) -> Option<(AgentId, f64)> {
        self.nearest_agent(lane_corridor, |ds| ds <= 0.0)
    }

    fn nearest_agent(
        &self,
        lane_corridor: LaneCorridorId,
        accept: impl Fn(f64) -> bool,
    ) -> Option<(AgentId, f64)> {
        let lane_corr = self.world.lane_corridor(lane_corridor);
        let s_ego = lane_corr.s(self.ego_position());

        let mut nearest: Option<(AgentId, f64)> = None;
        for agent in self.world.agents() {
            if agent.id() == self.ego || !lane_corr.contains(agent.position()) {
                continue;
            }
            let ds = lane_corr.s(agent.position()) - s_ego;
            if accept(ds) && nearest.map_or(true, |(_, best)| ds.abs() < best.abs()) {
                nearest = Some((agent.id(), ds));
            }
        }
        nearest
    }
}
