//! Configuration types for simulation.
//!
//! These control what body is built, which forces act on it, and how the
//! scene driver turns frame times into integration steps.

use nalgebra::Vector3;

use crate::forces::{Gravity, ScriptedImpulse};
use crate::{BodyState, BoxShape};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest step the demo scene takes, regardless of frame time (seconds).
pub const DEFAULT_MAX_TIMESTEP: f64 = 0.017;

/// Parameters of a box-shaped body.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BoxConfig {
    /// Extent along body X (m).
    pub width: f64,
    /// Extent along body Y (m).
    pub height: f64,
    /// Extent along body Z (m).
    pub depth: f64,
    /// Uniform density (kg/m³).
    pub density: f64,
    /// Initial linear velocity view (m/s).
    pub linear_velocity: Vector3<f64>,
    /// Initial angular velocity view (rad/s).
    pub angular_velocity: Vector3<f64>,
}

impl Default for BoxConfig {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
            density: 1.0,
            linear_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
        }
    }
}

impl BoxConfig {
    /// Create a box configuration with the given dimensions and unit density.
    #[must_use]
    pub fn new(width: f64, height: f64, depth: f64) -> Self {
        Self {
            width,
            height,
            depth,
            ..Default::default()
        }
    }

    /// Create a cube configuration with unit density.
    #[must_use]
    pub fn cube(edge: f64) -> Self {
        Self::new(edge, edge, edge)
    }

    /// Set the density.
    #[must_use]
    pub fn density(mut self, density: f64) -> Self {
        self.density = density;
        self
    }

    /// Set the initial velocity views.
    #[must_use]
    pub fn velocities(mut self, linear: Vector3<f64>, angular: Vector3<f64>) -> Self {
        self.linear_velocity = linear;
        self.angular_velocity = angular;
        self
    }

    /// Build the validated shape.
    pub fn shape(&self) -> crate::Result<BoxShape> {
        BoxShape::new(self.width, self.height, self.depth, self.density)
    }

    /// Build a fresh body from this configuration.
    pub fn build(&self) -> crate::Result<BodyState> {
        self.shape()?.into_body(self.linear_velocity, self.angular_velocity)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> crate::Result<()> {
        self.shape()?;

        let velocities_finite = self
            .linear_velocity
            .iter()
            .chain(self.angular_velocity.iter())
            .all(|x| x.is_finite());
        if !velocities_finite {
            return Err(crate::DynamicsError::invalid_config(
                "initial velocities must be finite",
            ));
        }

        Ok(())
    }
}

/// Configuration of the force model used by the integrator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IntegratorConfig {
    /// Uniform gravity, applied every step.
    pub gravity: Gravity,
    /// One-shot excitation applied on the first step after binding.
    pub impulse: Option<ScriptedImpulse>,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            gravity: Gravity::zero(),
            impulse: Some(ScriptedImpulse::default()),
        }
    }
}

impl IntegratorConfig {
    /// Create a configuration with the given gravity and the default impulse.
    #[must_use]
    pub fn with_gravity(gravity: Gravity) -> Self {
        Self {
            gravity,
            ..Default::default()
        }
    }

    /// Set the gravity.
    #[must_use]
    pub fn gravity(mut self, gravity: Gravity) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the one-shot impulse.
    #[must_use]
    pub fn impulse(mut self, impulse: ScriptedImpulse) -> Self {
        self.impulse = Some(impulse);
        self
    }

    /// Disable the one-shot impulse.
    #[must_use]
    pub fn without_impulse(mut self) -> Self {
        self.impulse = None;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.gravity.is_finite() {
            return Err(crate::DynamicsError::invalid_config("gravity must be finite"));
        }

        if let Some(impulse) = &self.impulse {
            if !impulse.is_finite() {
                return Err(crate::DynamicsError::invalid_config(
                    "impulse force must be finite",
                ));
            }
        }

        Ok(())
    }
}

/// Configuration of the headless scene driver.
///
/// When deserialized, a missing section takes the scene default, but a
/// partial section is completed from its own type's default. A `"body"`
/// object naming only `width` therefore gets the unit-density 1 m cube of
/// [`BoxConfig::default`] for its other fields, not the 10 cm demo cube.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SceneConfig {
    /// Body built on creation and on every reset.
    pub body: BoxConfig,
    /// Force model.
    pub integrator: IntegratorConfig,
    /// Frame times above this are clamped before stepping (seconds).
    pub max_timestep: f64,
}

impl Default for SceneConfig {
    /// A 10 cm cube of density 10 under [`Gravity::lab`], impulse armed.
    fn default() -> Self {
        Self {
            body: BoxConfig::cube(0.1).density(10.0),
            integrator: IntegratorConfig::with_gravity(Gravity::lab()),
            max_timestep: DEFAULT_MAX_TIMESTEP,
        }
    }
}

impl SceneConfig {
    /// Set the body configuration.
    #[must_use]
    pub fn body(mut self, body: BoxConfig) -> Self {
        self.body = body;
        self
    }

    /// Set the integrator configuration.
    #[must_use]
    pub fn integrator(mut self, integrator: IntegratorConfig) -> Self {
        self.integrator = integrator;
        self
    }

    /// Set the timestep cap.
    #[must_use]
    pub fn max_timestep(mut self, max_timestep: f64) -> Self {
        self.max_timestep = max_timestep;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.max_timestep.is_finite() || self.max_timestep <= 0.0 {
            return Err(crate::DynamicsError::invalid_config(format!(
                "max_timestep must be positive and finite, got {}",
                self.max_timestep
            )));
        }

        self.body.validate()?;
        self.integrator.validate()?;

        Ok(())
    }
}
