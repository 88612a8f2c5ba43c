//! Tunable thresholds of the behavior model.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating [BehaviorParams].
#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("could not parse behavior parameters: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid behavior parameter `{name}`: {reason}")]
    Invalid { name: &'static str, reason: String },
}

pub type ParamsResult<T> = Result<T, ParamsError>;

/// Parameters of the rule-based lane change and intersection behavior.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorParams {
    /// A lane corridor is only considered if at least this much of it remains ahead, in m.
    pub min_remaining_distance: f64,
    /// The minimum gap to a vehicle behind in the target corridor, in m.
    pub min_vehicle_rear_distance: f64,
    /// The minimum gap to a vehicle ahead in the target corridor, in m.
    pub min_vehicle_front_distance: f64,
    /// The time over which a closing rear vehicle is extrapolated, in s.
    pub time_keeping_gap: f64,
    /// Agents whose heading differs from the ego's by more than this are crossing, in radians.
    pub heading_divergence: f64,
    /// Crossing agents must be less than this far ahead along the ego's centre line, in m.
    pub max_longitudinal_offset: f64,
    /// How far ahead other agents are predicted, in s.
    pub prediction_horizon: f64,
    /// The interval between predictions, in s.
    pub prediction_step: f64,
    /// Which front clearance gates a lane change.
    pub lane_change_gate: LaneChangeGate,
    /// Parameters of the car following model.
    pub idm: IdmParams,
}

/// Selects which corridors' front clearance must hold before a lane change is considered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaneChangeGate {
    /// Candidates are only considered while the ego's own corridor has enough front clearance.
    EgoCorridorFront,
    /// Only the candidate corridor's clearances are checked.
    CandidateOnly,
}

/// Parameters of the intelligent driver model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdmParams {
    /// The desired velocity on a free road, in m/s.
    pub desired_velocity: f64,
    /// The maximum acceleration, in m/s<sup>2</sup>.
    pub max_acceleration: f64,
    /// The comfortable deceleration, a positive number in m/s<sup>2</sup>.
    pub comfortable_deceleration: f64,
    /// The desired gap between this and the vehicle ahead in seconds.
    pub time_headway: f64,
    /// The minimum gap to maintain between vehicles in m.
    pub min_spacing: f64,
    /// The maximum deceleration, a negative number in m/s<sup>2</sup>.
    pub max_deceleration: f64,
    /// The number of points in each generated trajectory, including the start.
    pub num_points: usize,
}

impl Default for BehaviorParams {
    fn default() -> Self {
        Self {
            min_remaining_distance: 5.0,
            min_vehicle_rear_distance: 5.0,
            min_vehicle_front_distance: 5.0,
            time_keeping_gap: 1.0,
            heading_divergence: 1.4,
            max_longitudinal_offset: 10.0,
            prediction_horizon: 3.0,
            prediction_step: 0.2,
            lane_change_gate: LaneChangeGate::EgoCorridorFront,
            idm: IdmParams::default(),
        }
    }
}

impl Default for IdmParams {
    fn default() -> Self {
        Self {
            desired_velocity: 15.0,
            max_acceleration: 1.7,
            comfortable_deceleration: 1.67,
            time_headway: 1.5,
            min_spacing: 2.0,
            max_deceleration: -6.0,
            num_points: 11,
        }
    }
}

impl BehaviorParams {
    /// Parses parameters from JSON, using defaults for missing fields, and validates them.
    pub fn from_json(json: &str) -> ParamsResult<Self> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Checks that every parameter is usable.
    pub fn validate(&self) -> ParamsResult<()> {
        non_negative("min_remaining_distance", self.min_remaining_distance)?;
        non_negative("min_vehicle_rear_distance", self.min_vehicle_rear_distance)?;
        non_negative("min_vehicle_front_distance", self.min_vehicle_front_distance)?;
        non_negative("time_keeping_gap", self.time_keeping_gap)?;
        non_negative("heading_divergence", self.heading_divergence)?;
        positive("max_longitudinal_offset", self.max_longitudinal_offset)?;
        non_negative("prediction_horizon", self.prediction_horizon)?;
        positive("prediction_step", self.prediction_step)?;
        self.idm.validate()
    }
}

impl IdmParams {
    /// Checks that every parameter is usable.
    pub fn validate(&self) -> ParamsResult<()> {
        positive("idm.desired_velocity", self.desired_velocity)?;
        positive("idm.max_acceleration", self.max_acceleration)?;
        positive("idm.comfortable_deceleration", self.comfortable_deceleration)?;
        non_negative("idm.time_headway", self.time_headway)?;
        non_negative("idm.min_spacing", self.min_spacing)?;
        if !(self.max_deceleration.is_finite() && self.max_deceleration < 0.0) {
            return Err(invalid("idm.max_deceleration", "must be negative"));
        }
        if self.num_points < 2 {
            return Err(invalid("idm.num_points", "must be at least 2"));
        }
        Ok(())
    }
}

fn invalid(name: &'static str, reason: &str) -> ParamsError {
    ParamsError::Invalid {
        name,
        reason: reason.to_string(),
    }
}

fn positive(name: &'static str, value: f64) -> ParamsResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(name, &format!("must be finite and positive, got {}", value)))
    }
}

fn non_negative(name: &'static str, value: f64) -> ParamsResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(name, &format!("must be finite and non-negative, got {}", value)))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(BehaviorParams::default().validate().is_ok());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let params = BehaviorParams::from_json(
            r#"{ "prediction_horizon": 2.0, "idm": { "desired_velocity": 5.0 } }"#,
        )
        .unwrap();
        assert_eq!(params.prediction_horizon, 2.0);
        assert_eq!(params.idm.desired_velocity, 5.0);
        assert_eq!(params.heading_divergence, 1.4);
        assert_eq!(params.lane_change_gate, LaneChangeGate::EgoCorridorFront);
    }

    #[test]
    fn rejects_zero_prediction_step() {
        let err = BehaviorParams::from_json(r#"{ "prediction_step": 0.0 }"#).unwrap_err();
        assert!(matches!(
            err,
            ParamsError::Invalid {
                name: "prediction_step",
                ..
            }
        ));
    }

    #[test]
    fn non_finite_values_are_named_in_errors() {
        let params = BehaviorParams {
            time_keeping_gap: f64::INFINITY,
            ..Default::default()
        };
        let message = params.validate().unwrap_err().to_string();
        assert!(message.contains("`time_keeping_gap`"));
        assert!(message.ends_with("must be finite and non-negative, got inf"));
    }

    #[test]
    fn reports_malformed_json() {
        let err = BehaviorParams::from_json("{ nope").unwrap_err();
        assert!(matches!(err, ParamsError::Json(_)));
    }
}
