use servo_arm::{ArmConfig, ArmKinematics, ConfigError, TipPosition};

fn main() -> Result<(), ConfigError> {
    tracing_subscriber::fmt::init();

    let config = ArmConfig::measured_arm();
    config.validate()?;
    let arm = ArmKinematics::from_config(config);

    let home = arm.home_pulses();
    let pose = arm.forward_kinematics(&home);
    println!("home pulses: {:?}", home);
    println!(
        "home tip:    ({:.2}, {:.2}, {:.2}) mm, angles {:?}",
        pose.tip.x, pose.tip.y, pose.tip.z, pose.angles_deg
    );

    let current = [1500, 1600, 1500, 1500];

    // A reachable target: where a mild displacement from home puts the tip.
    let target = arm.forward_kinematics(&[1400, 1600, 1400, 1600]).tip;
    println!(
        "\nplanning move to ({:.1}, {:.1}, {:.1})...",
        target.x, target.y, target.z
    );
    let plan = arm.safe_move_to_target(target, &current);
    match plan.path {
        Some(path) => {
            println!("approved: execute home {:?} then target {:?}", path[0], path[1]);
            if let Some(ik) = &plan.ik {
                println!(
                    "solver: {} iterations, {:.3}mm residual",
                    ik.iterations, ik.error_mm
                );
            }
        }
        None => println!("rejected: {}", plan.reason.unwrap_or_default()),
    }

    // The incident scenario: a target inside the base housing.
    let blocked = arm.safe_move_to_target(TipPosition::new(0.0, 0.0, 30.0), &current);
    println!("\nplanning move into the base cylinder...");
    println!(
        "rejected as expected: {}",
        blocked.reason.as_deref().unwrap_or("")
    );
    println!(
        "full report: {}",
        serde_json::to_string_pretty(&blocked).unwrap_or_default()
    );

    Ok(())
}
