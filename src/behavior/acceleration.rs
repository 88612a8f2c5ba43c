use crate::IdmParams;
use std::cell::Cell;

/// The acceleration model of the ego vehicle: the intelligent driver model.
///
/// Each constraint applied lowers the acceleration; the result is the
/// most restrictive of them.
#[derive(Clone, Debug)]
pub struct AccelerationModel {
    headway: f64,
    max_acc: f64,
    comf_dec: f64,
    min_gap: f64,
    max_dec: f64,
    acc: Cell<f64>,
}

impl AccelerationModel {
    /// Creates a new acceleration model.
    pub fn new(params: &IdmParams) -> Self {
        AccelerationModel {
            headway: params.time_headway,
            max_acc: params.max_acceleration,
            comf_dec: params.comfortable_deceleration,
            min_gap: params.min_spacing,
            max_dec: params.max_deceleration,
            acc: Cell::new(params.max_acceleration),
        }
    }

    /// Resets the acceleration model. Use at the start of an update.
    pub fn reset(&self) {
        self.acc.set(self.max_acc);
    }

    /// Gets the current acceleration of the vehicle.
    pub fn acc(&self) -> f64 {
        f64::max(self.acc.get(), self.max_dec)
    }

    /// Calculates the acceleration needed to approach the desired velocity on a free road.
    /// # Arguments
    /// * `vel` - The velocity of the simulated vehicle (m/s).
    /// * `desired_vel` - The desired velocity (m/s).
    pub fn apply_desired_velocity(&self, vel: f64, desired_vel: f64) {
        let this_acc = self.max_acc * (1. - (vel / desired_vel).powi(4));
        self.acc.set(f64::min(self.acc.get(), this_acc));
    }

    /// Calculates the acceleration needed to follow the obstacle ahead.
    ///
    /// # Arguments
    /// * `net_dist` - The distance between this vehicle and the obstacle ahead in metres.
    /// * `my_vel` - The velocity of the simulated vehicle (m/s).
    /// * `their_vel` - The obstacle's velocity (m/s).
    pub fn follow_obstacle(&self, net_dist: f64, my_vel: f64, their_vel: f64) {
        let acc = self.idm(net_dist, my_vel, their_vel);
        self.acc.set(f64::min(self.acc.get(), acc));
    }

    /// Computes an acceleration using the intelligent driver model.
    fn idm(&self, net_dist: f64, my_vel: f64, their_vel: f64) -> f64 {
        let comf_dec = self.comf_dec; // m.s^-2
        let max_acc = self.max_acc; // m.s^-2

        if net_dist <= self.min_gap {
            self.max_dec
        } else {
            let appr = my_vel - their_vel;
            let factor = 1. / (2. * (max_acc * comf_dec).sqrt());
            let ss = self.min_gap + (my_vel * self.headway) + (my_vel * appr * factor);
            let ss = f64::max(ss, self.min_gap);
            let term = ss / net_dist;
            max_acc * (1. - (term * term))
        }
    }
}
