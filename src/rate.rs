//! Learning-rate schedules.
//!
//! A schedule maps training progress `(iteration, epochs)` to an effective
//! learning rate. Both variants validate their arguments the same way the
//! neighborhood functions do (see [`check_schedule`]).

use crate::error::NetworkError;
use serde::{Deserialize, Serialize};

/// Validate a `(iteration, epochs)` pair for any schedule-like function.
///
/// `epochs` must be positive and `iteration` must lie in `[0, epochs)`.
pub(crate) fn check_schedule(iteration: usize, epochs: usize) -> Result<(), NetworkError> {
    if epochs == 0 {
        return Err(NetworkError::ArgumentRange { name: "epochs", value: 0 });
    }
    if iteration >= epochs {
        return Err(NetworkError::ArgumentRange {
            name: "iteration",
            value: iteration as i64,
        });
    }
    Ok(())
}

/// Decaying learning-rate schedule consumed by layers during training.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum LearningRateSchedule {
    /// Uniform change from `initial` to `final` over the training run.
    Linear { initial: f64, r#final: f64 },
    /// Exponential decay from `initial` toward `final`.
    Exponential { initial: f64, r#final: f64 },
}

impl LearningRateSchedule {
    /// Constant schedule: the same rate for the whole run.
    pub fn constant(rate: f64) -> Self {
        Self::Linear { initial: rate, r#final: rate }
    }

    /// Initial learning rate of the schedule.
    pub fn initial(&self) -> f64 {
        match *self {
            Self::Linear { initial, .. } | Self::Exponential { initial, .. } => initial,
        }
    }

    /// Final learning rate of the schedule.
    pub fn r#final(&self) -> f64 {
        match *self {
            Self::Linear { r#final, .. } | Self::Exponential { r#final, .. } => r#final,
        }
    }

    /// Effective learning rate for the given training iteration.
    pub fn rate(&self, iteration: usize, epochs: usize) -> Result<f64, NetworkError> {
        check_schedule(iteration, epochs)?;
        let t = iteration as f64 / epochs as f64;
        Ok(match *self {
            Self::Linear { initial, r#final } => initial + (r#final - initial) * t,
            Self::Exponential { initial, r#final } => {
                // Decay constant chosen so the rate reaches `final` at t = 1.
                // A tiny floor keeps the ratio finite when `final` is zero.
                let floor = 1e-12;
                let ratio = (r#final.max(floor)) / initial.max(floor);
                initial * ratio.powf(t)
            }
        })
    }
}

impl Default for LearningRateSchedule {
    fn default() -> Self {
        Self::Linear { initial: 0.3, r#final: 0.05 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_endpoints() {
        let s = LearningRateSchedule::Linear { initial: 0.5, r#final: 0.1 };
        assert_relative_eq!(s.rate(0, 100).unwrap(), 0.5);
        // Last iteration approaches (but does not reach) the final value
        let last = s.rate(99, 100).unwrap();
        assert!(last > 0.1 && last < 0.11);
    }

    #[test]
    fn test_linear_monotonic() {
        let s = LearningRateSchedule::Linear { initial: 0.9, r#final: 0.05 };
        let mut prev = f64::INFINITY;
        for t in 0..50 {
            let r = s.rate(t, 50).unwrap();
            assert!(r < prev, "rate must decrease monotonically");
            assert!(r <= 0.9 && r >= 0.05);
            prev = r;
        }
    }

    #[test]
    fn test_exponential_endpoints() {
        let s = LearningRateSchedule::Exponential { initial: 1.0, r#final: 0.01 };
        assert_relative_eq!(s.rate(0, 1000).unwrap(), 1.0);
        let last = s.rate(999, 1000).unwrap();
        assert!(last > 0.01 && last < 0.0105);
    }

    #[test]
    fn test_constant_schedule() {
        let s = LearningRateSchedule::constant(0.3);
        assert_relative_eq!(s.rate(0, 10).unwrap(), 0.3);
        assert_relative_eq!(s.rate(9, 10).unwrap(), 0.3);
    }

    #[test]
    fn test_range_validation() {
        let s = LearningRateSchedule::default();
        assert!(s.rate(0, 0).is_err());
        assert!(s.rate(10, 10).is_err());
        assert!(s.rate(11, 10).is_err());
        assert!(s.rate(9, 10).is_ok());
    }
}
