use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Fatal calibration errors, raised once at load time.
///
/// Wrong geometry is a physical-safety issue: a bad scale or direction makes
/// the collision checks meaningless, so a config that fails validation must
/// never be silently defaulted or repaired.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ConfigError {
    Parse(String),
    NonPositiveScale { joint: usize },
    InvalidDirection { joint: usize, direction: i8 },
    NeutralOutOfRange { joint: usize, neutral: i32 },
    DegenerateCollisionZone,
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ConfigError::Parse(ref msg) => write!(f, "Calibration parse error: {}", msg),
            ConfigError::NonPositiveScale { joint } => {
                write!(f, "Joint {} has a non-positive deg/µs scale", joint + 1)
            }
            ConfigError::InvalidDirection { joint, direction } => {
                write!(
                    f,
                    "Joint {} direction must be +1 or -1, got {}",
                    joint + 1,
                    direction
                )
            }
            ConfigError::NeutralOutOfRange { joint, neutral } => {
                write!(
                    f,
                    "Joint {} neutral pulse {}µs is outside the servo range",
                    joint + 1,
                    neutral
                )
            }
            ConfigError::DegenerateCollisionZone => {
                write!(f, "Base collision cylinder must have positive radius and height")
            }
        }
    }
}
