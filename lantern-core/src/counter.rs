//! Persisted counter state

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// The single shared `{count, step}` pair behind the counter page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CounterState {
    pub count: i64,
    pub step: i64,
}

impl CounterState {
    pub const DEFAULT_COUNT: i64 = 0;
    pub const DEFAULT_STEP: i64 = 1;

    /// Count after applying `delta`, rejecting overflow.
    pub fn applied(&self, delta: i64) -> Result<i64, ValidationError> {
        self.count
            .checked_add(delta)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "delta".to_string(),
                reason: format!("{} + {} overflows", self.count, delta),
            })
    }
}

impl Default for CounterState {
    fn default() -> Self {
        Self {
            count: Self::DEFAULT_COUNT,
            step: Self::DEFAULT_STEP,
        }
    }
}

/// Steps are positive; the page never offers anything below 1.
pub fn validate_step(step: i64) -> Result<i64, ValidationError> {
    if step < 1 {
        return Err(ValidationError::InvalidValue {
            field: "step".to_string(),
            reason: "must be >= 1".to_string(),
        });
    }
    Ok(step)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let state = CounterState::default();
        assert_eq!(state.count, 0);
        assert_eq!(state.step, 1);
    }

    #[test]
    fn test_applied_overflow() {
        let state = CounterState {
            count: i64::MAX,
            step: 1,
        };
        assert!(state.applied(1).is_err());
        assert_eq!(state.applied(-1).unwrap(), i64::MAX - 1);
    }

    #[test]
    fn test_validate_step() {
        assert_eq!(validate_step(3).unwrap(), 3);
        assert!(validate_step(0).is_err());
        assert!(validate_step(-4).is_err());
    }
}
