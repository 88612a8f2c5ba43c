use traffic_behavior::math::Point2d;
use traffic_behavior::{
    AgentAttributes, AgentState, BehaviorParams, IdmParams, LaneCorridorAttributes, ParamsResult,
    Simulation,
};

/// Simulates a three-way intersection: two opposing lanes on the main road,
/// and a side road joining from the south which turns left across both.
fn main() -> ParamsResult<()> {
    let params = BehaviorParams {
        prediction_horizon: 3.0,
        idm: IdmParams {
            desired_velocity: 5.0,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut sim = Simulation::new(params)?;

    let lanes = [
        vec![Point2d::new(-40.0, -2.0), Point2d::new(40.0, -2.0)],
        vec![Point2d::new(40.0, 2.0), Point2d::new(-40.0, 2.0)],
        vec![
            Point2d::new(2.0, -40.0),
            Point2d::new(2.0, -6.0),
            Point2d::new(0.0, 0.0),
            Point2d::new(-6.0, 2.0),
            Point2d::new(-40.0, 2.0),
        ],
    ];
    let roads = lanes.map(|centre_line| {
        let world = sim.world_mut();
        let lane = world.add_lane_corridor(&LaneCorridorAttributes {
            centre_line,
            width: 4.0,
        });
        world.add_road_corridor(&[lane])
    });

    let starts = [
        (Point2d::new(-20.0, -2.0), 0.0),
        (Point2d::new(20.0, 2.0), std::f64::consts::PI),
        (Point2d::new(2.0, -20.0), std::f64::consts::FRAC_PI_2),
    ];
    let agents = roads
        .iter()
        .zip(starts)
        .map(|(road, (pos, heading))| {
            sim.add_agent(
                &AgentAttributes::default(),
                AgentState::new(pos, heading, 5.0),
                *road,
                true,
            )
        })
        .collect::<Vec<_>>();

    println!("Simulating...");
    for _ in 0..50 {
        sim.step(0.2);
        let states = agents
            .iter()
            .filter_map(|id| sim.world().agent(*id))
            .map(|agent| {
                format!(
                    "({:6.2}, {:6.2}) @ {:4.2} m/s",
                    agent.position().x,
                    agent.position().y,
                    agent.vel()
                )
            })
            .collect::<Vec<_>>();
        println!("t = {:4.1}s: {}", sim.world().time(), states.join("  "));
    }
    Ok(())
}
