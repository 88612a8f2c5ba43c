use super::corridor_info::{scan_lane_corridors, CorridorInfo};
use crate::{BehaviorParams, LaneChangeGate, LaneCorridorId, ObservedWorld};
use log::debug;
use smallvec::SmallVec;

/// The lateral intent of the ego agent.
///
/// The rule-based policy always reports `KeepLane`; a change of lane is
/// expressed by the lane corridor it selects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LaneChangeDecision {
    KeepLane,
    ChangeLeft,
    ChangeRight,
}

/// Selects the corridors the ego agent could safely move into.
///
/// # Parameters
/// * `infos` - The scanned corridors, in scan order
/// * `ego_info` - The corridor the ego agent is currently in
/// * `params` - The clearance thresholds
pub fn lane_change_candidates<'a>(
    infos: &'a [CorridorInfo],
    ego_info: &CorridorInfo,
    params: &BehaviorParams,
) -> SmallVec<[&'a CorridorInfo; 4]> {
    let ego_front_clear = match params.lane_change_gate {
        LaneChangeGate::EgoCorridorFront => {
            ego_info.front.rel_distance >= params.min_vehicle_front_distance
        }
        LaneChangeGate::CandidateOnly => true,
    };
    if !ego_front_clear {
        return SmallVec::new();
    }

    infos
        .iter()
        .filter(|info| info.remaining_distance >= params.min_remaining_distance)
        .filter(|info| rear_is_clear(info, params))
        .filter(|info| info.front.rel_distance >= params.min_vehicle_front_distance)
        .collect()
}

/// Whether a vehicle behind, extrapolated at its closing speed, stays far enough back.
fn rear_is_clear(info: &CorridorInfo, params: &BehaviorParams) -> bool {
    if !info.rear.present {
        return true;
    }
    let required = params.min_vehicle_rear_distance
        + info.rear.rel_velocity.abs() * params.time_keeping_gap;
    info.rear.rel_distance <= -required
}

/// Picks the candidate with the most free space ahead; the first wins a tie.
fn most_free_space<'a>(candidates: &[&'a CorridorInfo]) -> Option<&'a CorridorInfo> {
    let mut best = None;
    let mut max_front = 0.0;
    for info in candidates {
        if info.front.rel_distance > max_front {
            max_front = info.front.rel_distance;
            best = Some(*info);
        }
    }
    best
}

/// Decides which lane corridor of its road corridor the ego agent should follow.
///
/// Returns no corridor if the ego agent is not in any lane corridor.
pub fn check_if_lane_change_beneficial(
    observed: &ObservedWorld,
    params: &BehaviorParams,
) -> (LaneChangeDecision, Option<LaneCorridorId>) {
    let ego_corr = match observed.lane_corridor() {
        Some(lane_corr) => lane_corr,
        None => return (LaneChangeDecision::KeepLane, None),
    };

    let infos = scan_lane_corridors(observed);
    let ego_info = match infos.iter().find(|info| info.lane_corridor == ego_corr) {
        Some(info) => info,
        None => return (LaneChangeDecision::KeepLane, Some(ego_corr)),
    };

    let candidates = lane_change_candidates(&infos, ego_info, params);
    let lane_corr = most_free_space(&candidates)
        .map(|info| info.lane_corridor)
        .unwrap_or(ego_corr);

    if lane_corr != ego_corr {
        debug!(
            "Agent {:?}: moving to lane corridor {:?} from {:?}",
            observed.ego_id(),
            lane_corr,
            ego_corr
        );
    }

    (LaneChangeDecision::KeepLane, Some(lane_corr))
}
