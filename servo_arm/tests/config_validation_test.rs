/// Calibration loading and validation: malformed geometry must refuse to
/// operate, and a valid calibration file must round-trip losslessly.
use servo_arm::{ArmConfig, ConfigError};

#[test]
fn test_measured_arm_is_valid() {
    assert_eq!(ArmConfig::measured_arm().validate(), Ok(()));
}

#[test]
fn test_non_positive_scale_is_fatal() {
    let mut config = ArmConfig::measured_arm();
    config.joints[0].scale_deg_per_us = 0.0;
    assert_eq!(config.validate(), Err(ConfigError::NonPositiveScale { joint: 0 }));

    config.joints[0].scale_deg_per_us = -0.135;
    assert_eq!(config.validate(), Err(ConfigError::NonPositiveScale { joint: 0 }));
}

#[test]
fn test_direction_must_be_unit() {
    let mut config = ArmConfig::measured_arm();
    config.joints[2].direction = 0;
    assert_eq!(
        config.validate(),
        Err(ConfigError::InvalidDirection { joint: 2, direction: 0 })
    );

    config.joints[2].direction = 2;
    assert_eq!(
        config.validate(),
        Err(ConfigError::InvalidDirection { joint: 2, direction: 2 })
    );
}

#[test]
fn test_neutral_pulse_must_stay_in_servo_range() {
    let mut config = ArmConfig::measured_arm();
    config.joints[1].trim_us = 1200; // 1500 + 1200 = 2700 > 2500
    assert_eq!(
        config.validate(),
        Err(ConfigError::NeutralOutOfRange { joint: 1, neutral: 2700 })
    );

    config.joints[1].trim_us = -1100; // 1500 - 1100 = 400 < 500
    assert_eq!(
        config.validate(),
        Err(ConfigError::NeutralOutOfRange { joint: 1, neutral: 400 })
    );
}

#[test]
fn test_collision_zone_must_have_volume() {
    let mut config = ArmConfig::measured_arm();
    config.base_zone.radius = 0.0;
    assert_eq!(config.validate(), Err(ConfigError::DegenerateCollisionZone));

    let mut config = ArmConfig::measured_arm();
    config.base_zone.height = -1.0;
    assert_eq!(config.validate(), Err(ConfigError::DegenerateCollisionZone));
}

#[test]
fn test_calibration_file_round_trip() {
    let original = ArmConfig::measured_arm();
    let json = serde_json::to_string_pretty(&original).expect("serialize calibration");
    println!("{}", json);

    let loaded = ArmConfig::from_json(&json).expect("load calibration");
    assert_eq!(original, loaded);
}

#[test]
fn test_malformed_calibration_is_a_parse_error() {
    let result = ArmConfig::from_json("{ not json");
    match result {
        Err(ConfigError::Parse(msg)) => assert!(!msg.is_empty()),
        other => panic!("expected a parse error, got {:?}", other),
    }
}

#[test]
fn test_invalid_calibration_file_is_rejected_on_load() {
    // A file that parses but describes impossible geometry must still fail.
    let mut config = ArmConfig::measured_arm();
    config.joints[0].scale_deg_per_us = 0.0;
    let json = serde_json::to_string(&config).expect("serialize");

    assert_eq!(
        ArmConfig::from_json(&json),
        Err(ConfigError::NonPositiveScale { joint: 0 })
    );
}

#[test]
fn test_error_messages_name_the_joint() {
    let err = ConfigError::NonPositiveScale { joint: 0 };
    assert!(err.to_string().contains("Joint 1"));

    let err = ConfigError::NeutralOutOfRange { joint: 1, neutral: 2700 };
    assert!(err.to_string().contains("2700"));
}
