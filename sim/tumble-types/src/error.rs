//! Error types for body construction and stepping.

use thiserror::Error;

/// Errors that can occur while building or advancing a rigid body.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DynamicsError {
    /// Box dimension or density is non-positive or non-finite.
    #[error("invalid shape: {reason}")]
    InvalidShape {
        /// Description of the offending parameter.
        reason: String,
    },

    /// Mass or inertia cannot describe a physical body.
    #[error("invalid mass properties: {reason}")]
    InvalidMassProperties {
        /// Description of what's wrong.
        reason: String,
    },

    /// Invalid timestep passed to a step call.
    #[error("invalid timestep: {0} (must be positive and finite)")]
    InvalidTimestep(f64),

    /// Step requested on an integrator with no body attached.
    #[error("integrator is not bound to a body")]
    Unbound,

    /// Orientation quaternion collapsed to (near) zero during renormalization.
    #[error("degenerate orientation: quaternion norm {norm} cannot be normalized")]
    DegenerateOrientation {
        /// Norm of the quaternion before renormalization.
        norm: f64,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },

    /// A step would have produced `NaN` or `Inf` state.
    #[error("simulation diverged: {reason}")]
    Diverged {
        /// Description of what went wrong.
        reason: String,
    },
}

impl DynamicsError {
    /// Create an invalid shape error.
    #[must_use]
    pub fn invalid_shape(reason: impl Into<String>) -> Self {
        Self::InvalidShape {
            reason: reason.into(),
        }
    }

    /// Create an invalid mass properties error.
    #[must_use]
    pub fn invalid_mass(reason: impl Into<String>) -> Self {
        Self::InvalidMassProperties {
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create a degenerate orientation error.
    #[must_use]
    pub fn degenerate_orientation(norm: f64) -> Self {
        Self::DegenerateOrientation { norm }
    }

    /// Create a diverged error.
    #[must_use]
    pub fn diverged(reason: impl Into<String>) -> Self {
        Self::Diverged {
            reason: reason.into(),
        }
    }

    /// Check if this error was raised while building a body or configuration.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidShape { .. }
                | Self::InvalidMassProperties { .. }
                | Self::InvalidConfig { .. }
        )
    }

    /// Check if this error was raised by a step call.
    #[must_use]
    pub fn is_step_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidTimestep(_)
                | Self::Unbound
                | Self::DegenerateOrientation { .. }
                | Self::Diverged { .. }
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DynamicsError::InvalidTimestep(-0.5);
        assert!(err.to_string().contains("-0.5"));

        let err = DynamicsError::invalid_shape("width must be positive, got 0");
        assert!(err.to_string().contains("width"));

        let err = DynamicsError::degenerate_orientation(1e-20);
        assert!(err.to_string().contains("quaternion"));

        assert_eq!(
            DynamicsError::Unbound.to_string(),
            "integrator is not bound to a body"
        );
    }

    #[test]
    fn test_error_predicates() {
        let err = DynamicsError::invalid_shape("depth");
        assert!(err.is_config_error());
        assert!(!err.is_step_error());

        let err = DynamicsError::invalid_config("bad gravity");
        assert!(err.is_config_error());

        assert!(DynamicsError::Unbound.is_step_error());
        assert!(DynamicsError::InvalidTimestep(0.0).is_step_error());
        assert!(DynamicsError::diverged("NaN in momentum").is_step_error());
        assert!(!DynamicsError::degenerate_orientation(0.0).is_config_error());
    }
}
