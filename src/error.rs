//! Error types for the simulation boundary
//!
//! Per-entity corruption and missing preconditions are handled inside the
//! tick and never surface here. Only faults that invalidate a whole tick,
//! and bad configuration, are reported to the caller.

use thiserror::Error;

/// A fault that aborted a tick. The caller keeps its prior state.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TickError {
    #[error("invalid delta time: {0} ms")]
    InvalidDelta(f32),

    #[error("{kind} count {count} exceeds limit {limit}")]
    EntityLimit {
        kind: &'static str,
        count: usize,
        limit: usize,
    },

    #[error("player state corrupted after update: {0}")]
    CorruptedPlayer(&'static str),
}

/// Rejected tuning or mission data
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_error_display() {
        let err = TickError::EntityLimit {
            kind: "projectile",
            count: 3000,
            limit: 2048,
        };
        assert_eq!(err.to_string(), "projectile count 3000 exceeds limit 2048");
        assert_eq!(
            TickError::InvalidDelta(f32::NAN).to_string(),
            "invalid delta time: NaN ms"
        );
    }

    #[test]
    fn test_config_error_from_json() {
        let parse: Result<u32, _> = serde_json::from_str("not json");
        let err: ConfigError = parse.unwrap_err().into();
        assert!(err.to_string().starts_with("failed to parse config"));
    }
}
