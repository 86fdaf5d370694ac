//! Neighborhood functions for Kohonen layers.
//!
//! A neighborhood function assigns every neuron an influence weight relative
//! to the current winner. The Gaussian variant shrinks its sigma linearly to
//! zero over the training run; the Mexican hat keeps its initial sigma for
//! the whole run, forming a fixed inhibitory ring.

use serde::{Deserialize, Serialize};

/// Full width at half maximum of a Gaussian is `sigma * 2.35482`, and the
/// caller-supplied learning radius is half of that.
const GAUSSIAN_RADIUS_TO_SIGMA: f64 = 1.17741;

/// Radius-to-sigma conversion for the Mexican hat curve.
const MEXICAN_HAT_RADIUS_TO_SIGMA: f64 = 0.5259;

/// Neighborhood curve centered at the winner neuron.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum NeighborhoodFunction {
    /// Continuous bell curve, unity at the winner.
    Gaussian { sigma: f64 },
    /// Normalized second derivative of a Gaussian: unity at the winner,
    /// dipping negative past `d = sigma` before decaying to zero.
    MexicanHat { sigma: f64 },
}

impl NeighborhoodFunction {
    /// Gaussian neighborhood from an initial learning radius.
    pub fn gaussian(learning_radius: f64) -> Self {
        Self::Gaussian { sigma: learning_radius / GAUSSIAN_RADIUS_TO_SIGMA }
    }

    /// Mexican hat neighborhood from an initial learning radius.
    pub fn mexican_hat(learning_radius: f64) -> Self {
        Self::MexicanHat { sigma: learning_radius / MEXICAN_HAT_RADIUS_TO_SIGMA }
    }

    /// Initial sigma of the curve.
    pub fn sigma(&self) -> f64 {
        match *self {
            Self::Gaussian { sigma } | Self::MexicanHat { sigma } => sigma,
        }
    }

    /// Neighborhood value for a neuron at squared lattice distance `dist_sq`
    /// from the winner. Schedule arguments are assumed pre-validated by the
    /// calling layer.
    #[inline]
    pub fn factor(&self, dist_sq: f64, iteration: usize, epochs: usize) -> f64 {
        match *self {
            Self::Gaussian { sigma } => {
                // Sigma uniformly decreases to zero as training progresses
                let current = sigma - (sigma * iteration as f64) / epochs as f64;
                let two_sigma_sq = 2.0 * current * current;
                (-dist_sq / two_sigma_sq).exp()
            }
            Self::MexicanHat { sigma } => {
                let q = dist_sq / (sigma * sigma + 1e-9);
                (1.0 - q) * (-q / 2.0).exp()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gaussian_unity_at_winner() {
        for radius in [1.0, 3.0, 10.0] {
            let f = NeighborhoodFunction::gaussian(radius);
            assert_relative_eq!(f.factor(0.0, 0, 100), 1.0);
            assert_relative_eq!(f.factor(0.0, 99, 100), 1.0);
        }
    }

    #[test]
    fn test_gaussian_decays_with_distance() {
        let f = NeighborhoodFunction::gaussian(3.0);
        let near = f.factor(1.0, 0, 100);
        let far = f.factor(25.0, 0, 100);
        assert!(near > far);
        assert!(far > 0.0);
    }

    #[test]
    fn test_gaussian_shrinks_over_training() {
        let f = NeighborhoodFunction::gaussian(3.0);
        let early = f.factor(4.0, 0, 100);
        let late = f.factor(4.0, 90, 100);
        assert!(late < early, "neighborhood must tighten as training progresses");
    }

    #[test]
    fn test_mexican_hat_unity_at_winner() {
        let f = NeighborhoodFunction::mexican_hat(4.0);
        assert_relative_eq!(f.factor(0.0, 0, 10), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_mexican_hat_inhibitory_ring() {
        let f = NeighborhoodFunction::mexican_hat(2.0);
        let sigma = f.sigma();
        // Past d = sigma the curve goes negative
        assert!(f.factor(sigma * sigma * 1.5, 0, 10) < 0.0);
        // And decays back toward zero far away
        assert!(f.factor(sigma * sigma * 40.0, 0, 10).abs() < 1e-3);
    }

    #[test]
    fn test_mexican_hat_sigma_is_fixed() {
        // Unlike the Gaussian, the hat does not tighten over the run
        let f = NeighborhoodFunction::mexican_hat(2.0);
        assert_relative_eq!(f.factor(1.0, 0, 100), f.factor(1.0, 99, 100));
    }

    #[test]
    fn test_radius_conversion() {
        let g = NeighborhoodFunction::gaussian(5.0);
        assert_relative_eq!(g.sigma(), 5.0 / 1.17741, epsilon = 1e-9);
        let m = NeighborhoodFunction::mexican_hat(5.0);
        assert_relative_eq!(m.sigma(), 5.0 / 0.5259, epsilon = 1e-9);
    }
}
