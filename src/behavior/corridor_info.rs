use crate::{AgentId, LaneCorridorId, ObservedWorld};

/// The longitudinal distance reported when there is no agent, in m.
/// Large and negative so that a missing agent reads as plenty of space behind.
pub const NO_AGENT_DISTANCE: f64 = -1000.0;

/// The state of another agent relative to the ego agent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RelativeAgentInfo {
    /// Whether an agent was found. Always check this before trusting the other fields.
    pub present: bool,
    /// The agent, valid for lookups in the observed world only.
    pub agent: Option<AgentId>,
    /// The longitudinal distance from the ego agent, negative if behind, in m.
    pub rel_distance: f64,
    /// The other agent's velocity minus the ego's velocity, in m/s.
    pub rel_velocity: f64,
    /// Whether the other agent is a vehicle.
    pub is_vehicle: bool,
}

/// What the ego agent knows about one lane corridor of its road corridor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CorridorInfo {
    /// The lane corridor described.
    pub lane_corridor: LaneCorridorId,
    /// The nearest agent ahead. Its distance is clamped to `remaining_distance`.
    pub front: RelativeAgentInfo,
    /// The nearest agent behind.
    pub rear: RelativeAgentInfo,
    /// The distance from the ego agent to the end of the corridor, in m.
    pub remaining_distance: f64,
}

impl Default for RelativeAgentInfo {
    fn default() -> Self {
        Self {
            present: false,
            agent: None,
            rel_distance: NO_AGENT_DISTANCE,
            rel_velocity: 0.0,
            is_vehicle: false,
        }
    }
}

impl RelativeAgentInfo {
    fn from_agent(observed: &ObservedWorld, agent_id: AgentId, rel_distance: f64) -> Self {
        match observed.world().agent(agent_id) {
            Some(agent) => Self {
                present: true,
                agent: Some(agent_id),
                rel_distance,
                rel_velocity: agent.vel() - observed.ego_state().vel,
                is_vehicle: agent.is_vehicle(),
            },
            None => Self::default(),
        }
    }
}

/// Finds the nearest agents ahead of and behind the ego agent within the lane corridor.
pub fn front_rear_agents(
    observed: &ObservedWorld,
    lane_corridor: LaneCorridorId,
) -> (RelativeAgentInfo, RelativeAgentInfo) {
    let front = observed
        .agent_in_front(lane_corridor)
        .map(|(id, ds)| RelativeAgentInfo::from_agent(observed, id, ds))
        .unwrap_or_default();
    let rear = observed
        .agent_behind(lane_corridor)
        .map(|(id, ds)| RelativeAgentInfo::from_agent(observed, id, ds))
        .unwrap_or_default();
    (front, rear)
}

/// Describes a single lane corridor relative to the ego agent.
pub fn corridor_info(observed: &ObservedWorld, lane_corridor: LaneCorridorId) -> CorridorInfo {
    let (mut front, rear) = front_rear_agents(observed, lane_corridor);
    let remaining_distance = observed
        .world()
        .lane_corridor(lane_corridor)
        .length_until_end(observed.ego_position());

    // The end of the corridor bounds the free space ahead just like an agent does
    front.rel_distance = if front.present {
        f64::min(front.rel_distance, remaining_distance)
    } else {
        remaining_distance
    };

    CorridorInfo {
        lane_corridor,
        front,
        rear,
        remaining_distance,
    }
}

/// Describes every lane corridor of the ego agent's road corridor, in the road corridor's order.
pub fn scan_lane_corridors(observed: &ObservedWorld) -> Vec<CorridorInfo> {
    observed
        .ego_road_corridor()
        .unique_lane_corridors()
        .iter()
        .map(|lane_corr| corridor_info(observed, *lane_corr))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::Point2d;
    use crate::{AgentAttributes, AgentState, LaneCorridorAttributes, World};
    use assert_approx_eq::assert_approx_eq;

    fn two_lanes() -> (World, [LaneCorridorId; 2], crate::RoadCorridorId) {
        let mut world = World::new();
        let lanes = [0.0, 3.5].map(|y| {
            world.add_lane_corridor(&LaneCorridorAttributes {
                centre_line: vec![Point2d::new(0.0, y), Point2d::new(100.0, y)],
                width: 3.5,
            })
        });
        let road = world.add_road_corridor(&lanes);
        (world, lanes, road)
    }

    fn add(world: &mut World, road: crate::RoadCorridorId, x: f64, y: f64, vel: f64) -> AgentId {
        world.add_agent(
            &AgentAttributes::default(),
            AgentState::new(Point2d::new(x, y), 0.0, vel),
            road,
        )
    }

    #[test]
    fn empty_corridor_reports_remaining_distance_and_sentinel() {
        let (mut world, lanes, road) = two_lanes();
        let ego = add(&mut world, road, 30.0, 0.0, 10.0);
        let observed = ObservedWorld::new(&world, ego);

        let info = corridor_info(&observed, lanes[1]);
        assert!(!info.front.present);
        assert_approx_eq!(info.remaining_distance, 70.0);
        assert_approx_eq!(info.front.rel_distance, 70.0);
        assert!(!info.rear.present);
        assert_eq!(info.rear.rel_distance, NO_AGENT_DISTANCE);
        assert_eq!(info.rear.rel_velocity, 0.0);
    }

    #[test]
    fn front_agent_distance_and_velocity() {
        let (mut world, lanes, road) = two_lanes();
        let ego = add(&mut world, road, 30.0, 0.0, 10.0);
        let front = add(&mut world, road, 99.0, 0.0, 4.0);
        let observed = ObservedWorld::new(&world, ego);

        let info = corridor_info(&observed, lanes[0]);
        assert!(info.front.present);
        assert_eq!(info.front.agent, Some(front));
        assert_approx_eq!(info.front.rel_distance, 69.0);
        assert_approx_eq!(info.front.rel_velocity, -6.0);

        world.set_agent_state(ego, AgentState::new(Point2d::new(40.0, 0.0), 0.0, 10.0));
        let observed = ObservedWorld::new(&world, ego);
        let info = corridor_info(&observed, lanes[0]);
        assert_approx_eq!(info.front.rel_distance, 59.0);
    }

    #[test]
    fn agents_are_assigned_to_their_own_corridor() {
        let (mut world, lanes, road) = two_lanes();
        let ego = add(&mut world, road, 30.0, 0.0, 10.0);
        let rear = add(&mut world, road, 20.0, 3.5, 12.0);
        let observed = ObservedWorld::new(&world, ego);

        let infos = scan_lane_corridors(&observed);
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].lane_corridor, lanes[0]);
        assert!(!infos[0].rear.present);
        assert_eq!(infos[1].rear.agent, Some(rear));
        assert_approx_eq!(infos[1].rear.rel_distance, -10.0);
        assert_approx_eq!(infos[1].rear.rel_velocity, 2.0);
        assert!(infos[1].rear.is_vehicle);
    }
}
