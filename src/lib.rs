pub use agent::{Agent, AgentAttributes, AgentState};
pub use behavior::{
    Action, BehaviorStatus, ConflictResult, CorridorInfo, IdmTrajectoryGenerator,
    IntersectionBehavior, LaneChangeDecision, RelativeAgentInfo, RelativeValues, Trajectory,
    TrajectoryGenerator, TrajectoryPoint,
};
pub use cgmath;
pub use corridor::{LaneCorridor, LaneCorridorAttributes, RoadCorridor};
#[cfg(feature = "debug")]
pub use debug::take_debug_frame;
pub use params::{BehaviorParams, IdmParams, LaneChangeGate, ParamsError, ParamsResult};
pub use prediction::{ConstantVelocity, PredictiveMotionModel};
pub use simulation::Simulation;
use slotmap::{new_key_type, SlotMap};
pub use slotmap::{Key, KeyData};
pub use world::{ObservedWorld, World};

mod agent;
pub mod behavior;
mod corridor;
mod debug;
pub mod math;
mod params;
mod prediction;
mod simulation;
mod world;

new_key_type! {
    /// Unique ID of an [Agent].
    pub struct AgentId;
    /// Unique ID of a [LaneCorridor].
    pub struct LaneCorridorId;
    /// Unique ID of a [RoadCorridor].
    pub struct RoadCorridorId;
}

type AgentSet = SlotMap<AgentId, Agent>;
type LaneCorridorSet = SlotMap<LaneCorridorId, LaneCorridor>;
type RoadCorridorSet = SlotMap<RoadCorridorId, RoadCorridor>;
