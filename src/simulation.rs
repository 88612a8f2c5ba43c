#[cfg(feature = "debug")]
use crate::debug::take_debug_frame;
use crate::prediction::{ConstantVelocity, PredictiveMotionModel};
use crate::{
    AgentAttributes, AgentId, AgentState, BehaviorParams, BehaviorStatus, IntersectionBehavior,
    ObservedWorld, ParamsResult, RoadCorridorId, World,
};
use log::warn;
use rand_distr::Distribution;
use slotmap::SecondaryMap;

/// Runs a [World] forward in time, with some agents controlled by an [IntersectionBehavior].
pub struct Simulation {
    /// The road network and agents.
    world: World,
    /// The parameters given to newly controlled agents.
    params: BehaviorParams,
    /// The behaviors of the controlled agents.
    behaviors: SecondaryMap<AgentId, IntersectionBehavior>,
    /// The current frame of simulation.
    frame: usize,
    /// Debugging information from the previously simulated frame.
    #[cfg(feature = "debug")]
    debug: serde_json::Value,
}

impl Simulation {
    /// Creates a new simulation with an empty world.
    ///
    /// Fails if the parameters do not pass [BehaviorParams::validate].
    pub fn new(params: BehaviorParams) -> ParamsResult<Self> {
        params.validate()?;
        Ok(Self {
            world: World::new(),
            params,
            behaviors: SecondaryMap::new(),
            frame: 0,
            #[cfg(feature = "debug")]
            debug: serde_json::Value::Null,
        })
    }

    /// Gets the simulated world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Gets the simulated world mutably, e.g. to add corridors.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Adds an agent to the simulation.
    ///
    /// # Parameters
    /// * `attributes` - The size of the agent
    /// * `state` - The initial state
    /// * `road_corridor` - The road corridor the agent travels along
    /// * `controlled` - Whether the agent plans with an [IntersectionBehavior];
    ///   otherwise it keeps a constant velocity
    pub fn add_agent(
        &mut self,
        attributes: &AgentAttributes,
        state: AgentState,
        road_corridor: RoadCorridorId,
        controlled: bool,
    ) -> AgentId {
        let id = self.world.add_agent(attributes, state, road_corridor);
        if controlled {
            self.behaviors
                .insert(id, IntersectionBehavior::from_valid(self.params.clone()));
        }
        id
    }

    /// Removes an agent from the simulation.
    pub fn remove_agent(&mut self, id: AgentId) {
        self.behaviors.remove(id);
        self.world.remove_agent(id);
    }

    /// Randomly scales the desired velocity of each controlled agent by a factor
    /// sampled from a normal distribution with a mean of 1 and standard deviation of `stddev`.
    ///
    /// The affected behaviors restart their planning state. A negative or
    /// non-finite `stddev` is logged and leaves the behaviors unchanged.
    pub fn randomise_desired_velocities(&mut self, stddev: f64) {
        if !(stddev >= 0.0 && stddev.is_finite()) {
            warn!("Cannot randomise desired velocities: invalid standard deviation {}", stddev);
            return;
        }
        let distr = match rand_distr::Normal::new(1.0, stddev) {
            Ok(distr) => distr,
            Err(err) => {
                warn!("Cannot randomise desired velocities: {}", err);
                return;
            }
        };
        let mut rand = rand::thread_rng();
        for (_, behavior) in &mut self.behaviors {
            let factor = distr.sample(&mut rand).clamp(0.75, 1.25);
            let mut params = self.params.clone();
            params.idm.desired_velocity *= factor;
            // Scaling by at most 25% keeps the desired velocity positive
            *behavior = IntersectionBehavior::from_valid(params);
        }
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Every controlled agent plans against the same snapshot of the world
    /// before any agent is moved.
    pub fn step(&mut self, dt: f64) {
        let time = self.world.time() + dt;

        let mut states = Vec::with_capacity(self.behaviors.len());
        for agent in self.world.agents() {
            let id = agent.id();
            let planned = self.behaviors.get_mut(id).and_then(|behavior| {
                let trajectory = behavior.plan(dt, &ObservedWorld::new(&self.world, id));
                match behavior.status() {
                    BehaviorStatus::Valid => trajectory.final_state(),
                    _ => None,
                }
            });
            let state = planned.unwrap_or_else(|| ConstantVelocity.predict(agent.state(), dt));
            states.push((id, state));
        }

        for (id, state) in states {
            self.world.set_agent_state(id, state);
        }
        self.world.set_time(time);
        self.frame += 1;

        #[cfg(feature = "debug")]
        {
            self.debug = take_debug_frame();
        }
    }

    /// Gets the behavior controlling an agent, if it is controlled.
    pub fn behavior(&self, id: AgentId) -> Option<&IntersectionBehavior> {
        self.behaviors.get(id)
    }

    /// Gets the current simulation frame index.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Gets the debugging information for the previously simulated frame as JSON array.
    #[cfg(feature = "debug")]
    pub fn debug(&mut self) -> serde_json::Value {
        self.debug.clone()
    }
}
