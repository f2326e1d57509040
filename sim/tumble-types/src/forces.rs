//! Force sources: uniform gravity and the one-shot scripted impulse.
//!
//! The world is Y-up and right-handed, matching the render layer that
//! consumes [`BodyState::world_transform`](crate::BodyState::world_transform).

use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Uniform gravitational field.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Gravity {
    /// Acceleration due to gravity (m/s²).
    pub acceleration: Vector3<f64>,
}

impl Default for Gravity {
    fn default() -> Self {
        Self::zero()
    }
}

impl Gravity {
    /// Standard Earth gravity (9.81 m/s² in -Y direction).
    #[must_use]
    pub fn earth() -> Self {
        Self {
            acceleration: Vector3::new(0.0, -9.81, 0.0),
        }
    }

    /// Gravity of the demo scene, a tenth of Earth's (0.98 m/s² in -Y direction).
    #[must_use]
    pub fn lab() -> Self {
        Self {
            acceleration: Vector3::new(0.0, -0.98, 0.0),
        }
    }

    /// Zero gravity (free floating).
    #[must_use]
    pub fn zero() -> Self {
        Self {
            acceleration: Vector3::zeros(),
        }
    }

    /// Custom gravity vector.
    #[must_use]
    pub fn custom(acceleration: Vector3<f64>) -> Self {
        Self { acceleration }
    }

    /// Compute the gravitational force on a body.
    #[must_use]
    pub fn force_on_mass(&self, mass: f64) -> Vector3<f64> {
        self.acceleration * mass
    }

    /// Check that every component is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.acceleration.iter().all(|x| x.is_finite())
    }
}

/// A force applied once, at a body vertex, on the first step after binding.
///
/// The application point is the vertex's current world-space offset from the
/// center of mass, so the impulse also produces a torque `r × F`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScriptedImpulse {
    /// Force vector in world coordinates (Newtons).
    pub force: Vector3<f64>,
    /// Index into the body-space vertex list of the application point.
    pub vertex: usize,
}

impl Default for ScriptedImpulse {
    fn default() -> Self {
        Self {
            force: Vector3::new(0.15, 0.25, 0.03),
            vertex: 0,
        }
    }
}

impl ScriptedImpulse {
    /// Create an impulse applied at the given vertex.
    #[must_use]
    pub const fn new(force: Vector3<f64>, vertex: usize) -> Self {
        Self { force, vertex }
    }

    /// Torque produced about the center of mass by applying the force at `offset`.
    ///
    /// τ = r × F
    #[must_use]
    pub fn torque_about(&self, offset: &Vector3<f64>) -> Vector3<f64> {
        offset.cross(&self.force)
    }

    /// Check that the force is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.force.iter().all(|x| x.is_finite())
    }
}
