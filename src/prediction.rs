//! Simplified motion models used to predict other agents' future states.

use crate::AgentState;

/// A model that predicts how an agent will move over a short interval of time.
pub trait PredictiveMotionModel {
    /// Advances `state` by `dt` seconds.
    fn predict(&self, state: &AgentState, dt: f64) -> AgentState;
}

/// Assumes agents hold their current speed and heading.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConstantVelocity;

impl PredictiveMotionModel for ConstantVelocity {
    fn predict(&self, state: &AgentState, dt: f64) -> AgentState {
        AgentState {
            time: state.time + dt,
            pos: state.pos + state.direction() * (state.vel * dt),
            ..*state
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::Point2d;
    use assert_approx_eq::assert_approx_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn constant_velocity_moves_along_heading() {
        let state = AgentState::new(Point2d::new(1.0, 2.0), FRAC_PI_2, 3.0);
        let next = ConstantVelocity.predict(&state, 2.0);
        assert_approx_eq!(next.pos.x, 1.0);
        assert_approx_eq!(next.pos.y, 8.0);
        assert_approx_eq!(next.time, 2.0);
        assert_eq!(next.vel, 3.0);
        assert_eq!(next.heading, FRAC_PI_2);
    }
}
