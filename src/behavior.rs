//! The rule-based lane change and intersection behavior.

pub use corridor_info::{
    corridor_info, front_rear_agents, scan_lane_corridors, CorridorInfo, RelativeAgentInfo,
    NO_AGENT_DISTANCE,
};
pub use intersection::{check_intersecting_vehicles, filter_intersecting_agents, ConflictResult};
pub use lane_change::{
    check_if_lane_change_beneficial, lane_change_candidates, LaneChangeDecision,
};
pub use trajectory::{
    Action, IdmTrajectoryGenerator, Trajectory, TrajectoryGenerator, TrajectoryPoint,
};

use crate::prediction::{ConstantVelocity, PredictiveMotionModel};
use crate::{BehaviorParams, LaneCorridorId, ObservedWorld, ParamsResult};
use log::{debug, info};

mod acceleration;
mod corridor_info;
mod intersection;
mod lane_change;
mod trajectory;

/// Whether the last call to [IntersectionBehavior::plan] produced a new trajectory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BehaviorStatus {
    /// The behavior has not planned yet.
    NotStarted,
    /// A new trajectory was planned.
    Valid,
    /// The ego agent is outside its road corridor; the previous trajectory was reused.
    Expired,
}

/// The obstacle the ego agent should follow.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RelativeValues {
    /// The distance to the obstacle, or to the end of the corridor, in m.
    pub gap: f64,
    /// The velocity of the obstacle in m/s. Zero for a stationary obstacle.
    pub velocity: f64,
    /// Whether there is an obstacle to follow.
    pub valid: bool,
}

/// Plans trajectories for one agent: picks the lane corridor with the most
/// free space and slows for agents predicted to cut across it.
pub struct IntersectionBehavior<G = IdmTrajectoryGenerator> {
    params: BehaviorParams,
    prediction_model: Box<dyn PredictiveMotionModel>,
    generator: G,
    status: BehaviorStatus,
    /// The lane corridor adopted on the last successful plan.
    lane_corridor: Option<LaneCorridorId>,
    last_trajectory: Trajectory,
    last_action: Action,
}

impl IntersectionBehavior {
    /// Creates a behavior which follows its corridor using the intelligent driver model.
    ///
    /// Fails if the parameters do not pass [BehaviorParams::validate].
    pub fn new(params: BehaviorParams) -> ParamsResult<Self> {
        params.validate()?;
        Ok(Self::from_valid(params))
    }

    /// Creates a behavior from parameters which have already been validated.
    pub(crate) fn from_valid(params: BehaviorParams) -> Self {
        let generator = IdmTrajectoryGenerator::new(params.idm.clone());
        Self::with_valid_generator(params, generator)
    }
}

impl<G: TrajectoryGenerator> IntersectionBehavior<G> {
    /// Creates a behavior with a custom trajectory generator.
    ///
    /// Fails if the parameters do not pass [BehaviorParams::validate].
    pub fn with_generator(params: BehaviorParams, generator: G) -> ParamsResult<Self> {
        params.validate()?;
        Ok(Self::with_valid_generator(params, generator))
    }

    fn with_valid_generator(params: BehaviorParams, generator: G) -> Self {
        Self {
            params,
            prediction_model: Box::new(ConstantVelocity),
            generator,
            status: BehaviorStatus::NotStarted,
            lane_corridor: None,
            last_trajectory: Trajectory::default(),
            last_action: Action::default(),
        }
    }

    /// Replaces the model used to predict the other agents. Defaults to [ConstantVelocity].
    pub fn with_prediction_model(mut self, model: impl PredictiveMotionModel + 'static) -> Self {
        self.prediction_model = Box::new(model);
        self
    }

    /// Plans the ego agent's trajectory for the next `dt` seconds.
    ///
    /// If the ego agent is not inside any lane corridor of its road corridor,
    /// the previous trajectory is returned and the status becomes [BehaviorStatus::Expired].
    pub fn plan(&mut self, dt: f64, observed: &ObservedWorld) -> Trajectory {
        self.status = BehaviorStatus::Valid;

        let (_, lane_corr) = check_if_lane_change_beneficial(observed, &self.params);
        let lane_corr = match lane_corr {
            Some(lane_corr) => lane_corr,
            None => {
                self.status = BehaviorStatus::Expired;
                return self.last_trajectory.clone();
            }
        };
        if self.lane_corridor != Some(lane_corr) {
            debug!(
                "Agent {:?}: following lane corridor {:?}",
                observed.ego_id(),
                lane_corr
            );
        }
        self.lane_corridor = Some(lane_corr);

        let conflict = check_intersecting_vehicles(
            lane_corr,
            observed,
            self.prediction_model.as_ref(),
            &self.params,
        );
        let info = corridor_info(observed, lane_corr);
        let values = relative_values(&info, &conflict, observed.ego_state().vel);
        if let Some(agent) = conflict.agent {
            info!(
                "Agent {:?}: yielding to intersecting agent {:?} in {:.1} s",
                observed.ego_id(),
                agent,
                conflict.time
            );
        }

        let lane_corridor = observed.world().lane_corridor(lane_corr);
        let (trajectory, action) = self.generator.generate(observed, lane_corridor, values, dt);
        self.last_trajectory = trajectory.clone();
        self.last_action = action;
        trajectory
    }

    /// The status of the last plan.
    pub fn status(&self) -> BehaviorStatus {
        self.status
    }

    /// The lane corridor being followed, if any plan has succeeded.
    pub fn lane_corridor(&self) -> Option<LaneCorridorId> {
        self.lane_corridor
    }

    /// The most recently planned trajectory.
    pub fn last_trajectory(&self) -> &Trajectory {
        &self.last_trajectory
    }

    /// The action behind the most recently planned trajectory.
    pub fn last_action(&self) -> Action {
        self.last_action
    }

    pub fn params(&self) -> &BehaviorParams {
        &self.params
    }
}

/// Computes the obstacle to follow within a corridor.
///
/// An intersecting agent replaces the obstacle ahead with a stationary one
/// at the distance the intersecting agent covers before the conflict.
///
/// # Parameters
/// * `info` - The corridor being followed
/// * `conflict` - The result of the intersection check on that corridor
/// * `ego_vel` - The ego agent's velocity in m/s
pub fn relative_values(
    info: &CorridorInfo,
    conflict: &ConflictResult,
    ego_vel: f64,
) -> RelativeValues {
    if conflict.is_conflict() {
        return RelativeValues {
            gap: conflict.augmented_distance,
            velocity: 0.0,
            valid: true,
        };
    }
    RelativeValues {
        gap: info.front.rel_distance,
        velocity: if info.front.present {
            ego_vel + info.front.rel_velocity
        } else {
            0.0
        },
        valid: info.front.present,
    }
}
