use super::acceleration::AccelerationModel;
use super::RelativeValues;
use crate::math::{rot90, vector_to_heading, Point2d};
use crate::{AgentState, IdmParams, LaneCorridor, ObservedWorld};

/// A timed sequence of states the ego agent should follow.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trajectory {
    points: Vec<TrajectoryPoint>,
}

/// One state of a [Trajectory].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrajectoryPoint {
    /// The simulation time in s.
    pub time: f64,
    /// The world space position.
    pub pos: Point2d,
    /// The heading in radians.
    pub heading: f64,
    /// The speed in m/s.
    pub vel: f64,
}

/// The control input behind a [Trajectory].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Action {
    /// The commanded longitudinal acceleration in m/s<sup>2</sup>.
    pub acceleration: f64,
}

/// Turns a longitudinal control target into a trajectory along a lane corridor.
pub trait TrajectoryGenerator {
    /// Generates a trajectory lasting `dt` seconds.
    ///
    /// # Parameters
    /// * `observed` - The world as seen by the ego agent
    /// * `lane_corridor` - The corridor to follow
    /// * `values` - The obstacle ahead
    /// * `dt` - The duration of the trajectory in s
    fn generate(
        &self,
        observed: &ObservedWorld,
        lane_corridor: &LaneCorridor,
        values: RelativeValues,
        dt: f64,
    ) -> (Trajectory, Action);
}

/// Follows the corridor's centre line with a constant acceleration given by the
/// intelligent driver model.
#[derive(Clone, Debug, Default)]
pub struct IdmTrajectoryGenerator {
    params: IdmParams,
}

impl Trajectory {
    /// Creates a trajectory from its points.
    pub fn new(points: Vec<TrajectoryPoint>) -> Self {
        Self { points }
    }

    /// The points of the trajectory, in time order.
    pub fn points(&self) -> &[TrajectoryPoint] {
        &self.points
    }

    /// Whether the trajectory has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The state at the end of the trajectory.
    pub fn final_state(&self) -> Option<AgentState> {
        self.points.last().map(|p| AgentState {
            time: p.time,
            pos: p.pos,
            heading: p.heading,
            vel: p.vel,
        })
    }
}

impl IdmTrajectoryGenerator {
    /// Creates a new trajectory generator.
    pub fn new(params: IdmParams) -> Self {
        Self { params }
    }

    /// The acceleration the ego agent should apply.
    pub fn acceleration(&self, observed: &ObservedWorld, values: RelativeValues) -> f64 {
        let ego = observed.ego_agent();
        let acc = AccelerationModel::new(&self.params);
        acc.reset();
        acc.apply_desired_velocity(ego.vel(), self.params.desired_velocity);
        if values.valid {
            // The gap is measured between centres
            let net_dist = values.gap - ego.length();
            acc.follow_obstacle(net_dist, ego.vel(), values.velocity);
        }
        acc.acc()
    }
}

impl TrajectoryGenerator for IdmTrajectoryGenerator {
    fn generate(
        &self,
        observed: &ObservedWorld,
        lane_corridor: &LaneCorridor,
        values: RelativeValues,
        dt: f64,
    ) -> (Trajectory, Action) {
        let acc = self.acceleration(observed, values);
        let ego = observed.ego_state();
        let centre_line = lane_corridor.centre_line();
        let proj = centre_line.project(ego.pos);

        let n = self.params.num_points.max(2);
        let step = dt / (n - 1) as f64;
        let mut points = Vec::with_capacity(n);
        points.push(TrajectoryPoint {
            time: ego.time,
            pos: ego.pos,
            heading: ego.heading,
            vel: ego.vel,
        });

        let (mut s, mut vel) = (proj.s, ego.vel);
        for i in 1..n {
            let new_vel = f64::max(vel + acc * step, 0.0);
            s += 0.5 * (vel + new_vel) * step;
            vel = new_vel;

            // Any lateral offset from the centre line is removed over the trajectory
            let lat = proj.lat * (1.0 - i as f64 / (n - 1) as f64);
            let sample = centre_line.sample(s);
            points.push(TrajectoryPoint {
                time: ego.time + i as f64 * step,
                pos: sample.pos + rot90(sample.tan) * lat,
                heading: vector_to_heading(sample.tan),
                vel,
            });
        }

        (Trajectory::new(points), Action { acceleration: acc })
    }
}
