use crate::debug::{debug_point, debug_shape};
use crate::prediction::PredictiveMotionModel;
use crate::{AgentId, BehaviorParams, LaneCorridorId, ObservedWorld, World};
use log::trace;

/// An agent predicted to cut across a lane corridor.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ConflictResult {
    /// How far the conflicting agent travels before the conflict, in m.
    /// Used as the distance to an imaginary stationary obstacle.
    pub augmented_distance: f64,
    /// The conflicting agent, valid for lookups in the observed world only.
    pub agent: Option<AgentId>,
    /// The time until the conflict, in s.
    pub time: f64,
}

impl ConflictResult {
    /// Whether a conflicting agent was found.
    pub fn is_conflict(&self) -> bool {
        self.agent.is_some()
    }
}

/// Predicts the other agents' motion over the prediction horizon and finds the first agent
/// which crosses into `lane_corridor` ahead of the ego agent.
///
/// # Parameters
/// * `lane_corridor` - The corridor the ego agent intends to follow
/// * `observed` - The current observation
/// * `model` - Predicts how the other agents move
/// * `params` - The prediction horizon and step, and the crossing thresholds
pub fn check_intersecting_vehicles(
    lane_corridor: LaneCorridorId,
    observed: &ObservedWorld,
    model: &dyn PredictiveMotionModel,
    params: &BehaviorParams,
) -> ConflictResult {
    let corridor_shape = observed.world().lane_corridor(lane_corridor).merged_polygon();
    debug_shape("lane corridor", corridor_shape);

    let (horizon, step) = (params.prediction_horizon, params.prediction_step);
    if !(step > 0.0 && horizon.is_finite()) {
        return ConflictResult::default();
    }

    let num_steps = f64::max((horizon / step).ceil(), 0.0) as usize;
    let times = (0..num_steps)
        .map(|i| i as f64 * step)
        .take_while(|t| *t < horizon);

    for t in times {
        let predicted = observed.world().predict(t, model);
        let intersecting = predicted.agents_intersecting_polygon(corridor_shape);
        trace!(
            "Agent {:?}: {} agents in corridor at t = {:.2}",
            observed.ego_id(),
            intersecting.len(),
            t
        );

        let found = filter_intersecting_agents(&intersecting, &predicted, observed, params);
        if let Some(agent_id) = found {
            // Speed is taken from the current observation, not the prediction
            let vel = observed.world().agent(agent_id).map_or(0.0, |a| a.vel());
            if let Some(agent) = predicted.agent(agent_id) {
                debug_point("conflict", agent.position());
            }
            return ConflictResult {
                augmented_distance: vel * t,
                agent: Some(agent_id),
                time: t,
            };
        }
    }

    ConflictResult::default()
}

/// Finds the first of `candidates` which is crossing the ego agent's path just ahead of it.
///
/// # Parameters
/// * `candidates` - Agents overlapping the corridor, in the order to check them
/// * `predicted` - The world the candidates are drawn from
/// * `observed` - The current observation, which supplies the ego agent's state
/// * `params` - The crossing thresholds
pub fn filter_intersecting_agents(
    candidates: &[AgentId],
    predicted: &World,
    observed: &ObservedWorld,
    params: &BehaviorParams,
) -> Option<AgentId> {
    let ego_lane_corr = observed.lane_corridor()?;
    let centre_line = observed.world().lane_corridor(ego_lane_corr).centre_line();
    let ego_state = observed.ego_state();
    let s_ego = centre_line.project(ego_state.pos).s;

    candidates.iter().copied().find(|id| {
        let agent = match predicted.agent(*id) {
            Some(agent) => agent,
            None => return false,
        };
        if *id == observed.ego_id() || predicted.current_lane_corridor(*id) == Some(ego_lane_corr) {
            return false;
        }

        // TODO: compare wrapped angles so that headings either side of +-pi are treated as close
        let crossing = (ego_state.heading - agent.heading()).abs() > params.heading_divergence;
        let s_other = centre_line.project(agent.position()).s;
        crossing && s_other > s_ego && s_other - s_ego < params.max_longitudinal_offset
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::Point2d;
    use crate::{
        AgentAttributes, AgentState, ConstantVelocity, LaneCorridorAttributes, RoadCorridorId,
    };
    use assert_approx_eq::assert_approx_eq;
    use std::cell::RefCell;

    struct Crossing {
        world: World,
        ego: AgentId,
        lane: LaneCorridorId,
        cross_road: RoadCorridorId,
    }

    /// An east-bound lane along the x-axis crossed by a north-bound lane at x = 25.
    fn crossing() -> Crossing {
        let mut world = World::new();
        let lane = world.add_lane_corridor(&LaneCorridorAttributes {
            centre_line: vec![Point2d::new(0.0, 0.0), Point2d::new(100.0, 0.0)],
            width: 4.0,
        });
        let cross_lane = world.add_lane_corridor(&LaneCorridorAttributes {
            centre_line: vec![Point2d::new(25.0, -50.0), Point2d::new(25.0, 50.0)],
            width: 4.0,
        });
        let road = world.add_road_corridor(&[lane]);
        let cross_road = world.add_road_corridor(&[cross_lane]);
        let ego = world.add_agent(
            &AgentAttributes::default(),
            AgentState::new(Point2d::new(20.0, 0.0), 0.0, 5.0),
            road,
        );
        Crossing {
            world,
            ego,
            lane,
            cross_road,
        }
    }

    fn add_crosser(c: &mut Crossing, y: f64, heading: f64, vel: f64) -> AgentId {
        c.world.add_agent(
            &AgentAttributes {
                length: 4.0,
                width: 2.0,
                is_vehicle: true,
            },
            AgentState::new(Point2d::new(25.0, y), heading, vel),
            c.cross_road,
        )
    }

    #[test]
    fn heading_divergence_is_strict() {
        let mut c = crossing();
        let at_limit = add_crosser(&mut c, 0.0, 1.4, 0.0);
        let beyond = add_crosser(&mut c, 0.0, 1.4 + 1e-9, 0.0);
        let observed = ObservedWorld::new(&c.world, c.ego);
        let params = BehaviorParams::default();

        let found = filter_intersecting_agents(&[at_limit], &c.world, &observed, &params);
        assert_eq!(found, None);
        let found = filter_intersecting_agents(&[at_limit, beyond], &c.world, &observed, &params);
        assert_eq!(found, Some(beyond));
    }

    #[test]
    fn ignores_ego_and_agents_outside_the_longitudinal_window() {
        let mut c = crossing();
        let behind = c.world.add_agent(
            &AgentAttributes::default(),
            AgentState::new(Point2d::new(15.0, 0.0), 1.6, 0.0),
            c.cross_road,
        );
        let far = c.world.add_agent(
            &AgentAttributes::default(),
            AgentState::new(Point2d::new(30.5, 0.0), 1.6, 0.0),
            c.cross_road,
        );
        let observed = ObservedWorld::new(&c.world, c.ego);
        let params = BehaviorParams::default();

        let found = filter_intersecting_agents(&[c.ego, behind, far], &c.world, &observed, &params);
        assert_eq!(found, None);
    }

    #[test]
    fn agents_in_the_ego_corridor_are_not_crossing() {
        let mut c = crossing();
        let road = c.world.agent(c.ego).unwrap().road_corridor();
        let oncoming = c.world.add_agent(
            &AgentAttributes::default(),
            AgentState::new(Point2d::new(25.0, 0.0), 3.1, 0.0),
            road,
        );
        let observed = ObservedWorld::new(&c.world, c.ego);
        let params = BehaviorParams::default();
        let found = filter_intersecting_agents(&[oncoming], &c.world, &observed, &params);
        assert_eq!(found, None);
    }

    #[test]
    fn finds_crossing_agent_when_it_enters_the_corridor() {
        let mut c = crossing();
        // Reaches the corridor edge at t = 2.0 s, moving at 3 m/s
        let crosser = add_crosser(&mut c, -9.876, 1.6, 3.0);
        let observed = ObservedWorld::new(&c.world, c.ego);
        let params = BehaviorParams {
            prediction_step: 0.1,
            ..Default::default()
        };

        let result = check_intersecting_vehicles(c.lane, &observed, &ConstantVelocity, &params);
        assert_eq!(result.agent, Some(crosser));
        assert_approx_eq!(result.time, 2.0, 0.1 + 1e-9);
        assert_approx_eq!(result.augmented_distance, 6.0, 0.3 + 1e-9);
    }

    #[cfg(feature = "debug")]
    #[test]
    fn records_corridor_and_conflict_in_debug_frame() {
        let mut c = crossing();
        add_crosser(&mut c, -9.876, 1.6, 3.0);
        let observed = ObservedWorld::new(&c.world, c.ego);
        let params = BehaviorParams {
            prediction_step: 0.1,
            ..Default::default()
        };

        crate::debug::take_debug_frame();
        let result = check_intersecting_vehicles(c.lane, &observed, &ConstantVelocity, &params);
        assert!(result.is_conflict());
        let frame = crate::debug::take_debug_frame();
        let items = frame.as_array().unwrap();
        assert!(items
            .iter()
            .any(|v| v["type"] == "shape" && v["name"] == "lane corridor"));
        assert!(items
            .iter()
            .any(|v| v["type"] == "point" && v["name"] == "conflict"));
    }

    #[test]
    fn nothing_found_beyond_the_horizon() {
        let mut c = crossing();
        add_crosser(&mut c, -9.876, 1.6, 3.0);
        let observed = ObservedWorld::new(&c.world, c.ego);
        let params = BehaviorParams {
            prediction_horizon: 1.5,
            prediction_step: 0.1,
            ..Default::default()
        };

        let result = check_intersecting_vehicles(c.lane, &observed, &ConstantVelocity, &params);
        assert!(!result.is_conflict());
        assert_eq!(result.augmented_distance, 0.0);
    }

    /// Records every prediction interval it is asked for.
    #[derive(Default)]
    struct Recording {
        times: RefCell<Vec<f64>>,
    }

    impl PredictiveMotionModel for Recording {
        fn predict(&self, state: &AgentState, dt: f64) -> AgentState {
            self.times.borrow_mut().push(dt);
            ConstantVelocity.predict(state, dt)
        }
    }

    #[test]
    fn prediction_stops_at_first_conflict() {
        let mut c = crossing();
        add_crosser(&mut c, -9.876, 1.6, 3.0);
        let observed = ObservedWorld::new(&c.world, c.ego);
        let params = BehaviorParams {
            prediction_step: 0.1,
            ..Default::default()
        };
        let model = Recording::default();

        let result = check_intersecting_vehicles(c.lane, &observed, &model, &params);
        let times = model.times.borrow();
        assert!(result.is_conflict());
        assert!(times.iter().all(|t| *t <= result.time));
        assert!(times.iter().any(|t| *t == result.time));
    }

    #[test]
    fn unbounded_horizon_predicts_nothing() {
        let c = crossing();
        let observed = ObservedWorld::new(&c.world, c.ego);
        let model = Recording::default();
        for prediction_horizon in [f64::INFINITY, f64::NAN] {
            let params = BehaviorParams {
                prediction_horizon,
                ..Default::default()
            };
            let result = check_intersecting_vehicles(c.lane, &observed, &model, &params);
            assert!(!result.is_conflict());
        }
        assert!(model.times.borrow().is_empty());
    }

    #[test]
    fn prediction_never_reaches_the_horizon() {
        let c = crossing();
        let observed = ObservedWorld::new(&c.world, c.ego);
        let params = BehaviorParams {
            prediction_horizon: 3.0,
            prediction_step: 0.2,
            ..Default::default()
        };
        let model = Recording::default();

        let result = check_intersecting_vehicles(c.lane, &observed, &model, &params);
        let times = model.times.borrow();
        assert!(!result.is_conflict());
        assert!(times.iter().all(|t| *t < 3.0));
        // One prediction per step for the ego agent
        assert_eq!(times.len(), 15);
    }
}
