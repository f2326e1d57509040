//! Explicit rigid body integrator.
//!
//! [`Integrator`] advances one bound [`BodyState`] by a step of size `dt`:
//!
//! 1. Accumulate force and torque: gravity every step, plus the scripted
//!    impulse on the first step after binding.
//! 2. Linear motion with semi-implicit (symplectic) Euler:
//!    `P += F dt`, `V = P / M`, `X += V dt`.
//! 3. Angular motion: `L += τ dt`, `Iinv = R I0inv Rᵗ` with the rotation
//!    from the previous step, `ω = Iinv L`.
//! 4. Orientation: `q += ½ (0, ω) q dt`, renormalize, re-derive `R`.
//! 5. Clear the accumulators.
//! 6. Advance the step counter and the simulated clock.
//!
//! Every quantity of the new instant is computed before anything is written
//! back, so a failed step leaves the body exactly as it was, with zero
//! accumulators.
//!
//! # Example
//!
//! ```
//! use tumble_core::Integrator;
//! use tumble_types::{BoxConfig, Gravity};
//!
//! let body = BoxConfig::cube(0.1).density(10.0).build().unwrap();
//!
//! let mut integrator = Integrator::new(Gravity::earth());
//! integrator.bind(body);
//!
//! for _ in 0..60 {
//!     integrator.step(1.0 / 60.0).unwrap();
//! }
//!
//! let body = integrator.body().unwrap();
//! assert!(body.position.y < 0.0);
//! assert!((body.orientation().norm() - 1.0).abs() < 1e-9);
//! ```

use std::borrow::{Borrow, BorrowMut};

use nalgebra::{Matrix3, Point3, Quaternion, UnitQuaternion, Vector3};
use tracing::{debug, info, trace, warn};
use tumble_types::{BodyState, DynamicsError, Gravity, IntegratorConfig, Result, ScriptedImpulse};

/// Quaternions shorter than this are not renormalized.
const MIN_QUATERNION_NORM: f64 = 1e-12;

/// Steps a single rigid body forward in time.
///
/// The integrator is either unbound (no body, [`step`](Self::step) fails
/// with [`DynamicsError::Unbound`]) or bound to exactly one body. `B` decides
/// how the body is held: `BodyState` or `Box<BodyState>` to own it,
/// `&mut BodyState` to borrow it for the lifetime of the binding.
#[derive(Debug, Clone)]
pub struct Integrator<B = BodyState> {
    body: Option<B>,
    gravity: Gravity,
    impulse: Option<ScriptedImpulse>,
    impulse_pending: bool,
    steps: u64,
    time: f64,
}

impl<B> Default for Integrator<B> {
    fn default() -> Self {
        Self::from_parts(IntegratorConfig::default())
    }
}

impl<B> Integrator<B> {
    fn from_parts(config: IntegratorConfig) -> Self {
        Self {
            body: None,
            gravity: config.gravity,
            impulse: config.impulse,
            impulse_pending: false,
            steps: 0,
            time: 0.0,
        }
    }
}

impl<B: BorrowMut<BodyState>> Integrator<B> {
    /// Create an unbound integrator with the given gravity and the default
    /// scripted impulse.
    #[must_use]
    pub fn new(gravity: Gravity) -> Self {
        Self::from_parts(IntegratorConfig::with_gravity(gravity))
    }

    /// Create an unbound integrator from a validated configuration.
    pub fn with_config(config: IntegratorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(config))
    }

    /// Attach a body, resetting the step counter and clock and re-arming the
    /// scripted impulse.
    ///
    /// Returns the previously bound body, if any.
    pub fn bind(&mut self, body: B) -> Option<B> {
        let previous = self.body.replace(body);
        self.steps = 0;
        self.time = 0.0;
        self.impulse_pending = self.impulse.is_some();

        info!(
            rebind = previous.is_some(),
            impulse_armed = self.impulse_pending,
            "integrator bound to body"
        );

        previous
    }

    /// Detach and return the bound body. The integrator becomes inert.
    pub fn unbind(&mut self) -> Option<B> {
        self.impulse_pending = false;
        self.body.take()
    }

    /// Whether a body is attached.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.body.is_some()
    }

    /// The bound body.
    #[must_use]
    pub fn body(&self) -> Option<&BodyState> {
        self.body.as_ref().map(Borrow::borrow)
    }

    /// The bound body, mutably.
    pub fn body_mut(&mut self) -> Option<&mut BodyState> {
        self.body.as_mut().map(BorrowMut::borrow_mut)
    }

    /// Number of completed steps since the last bind.
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Simulated time since the last bind (seconds).
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Gravity applied every step.
    #[must_use]
    pub fn gravity(&self) -> &Gravity {
        &self.gravity
    }

    /// The configured one-shot impulse.
    #[must_use]
    pub fn impulse(&self) -> Option<&ScriptedImpulse> {
        self.impulse.as_ref()
    }

    /// Whether the scripted impulse will fire on the next step.
    #[must_use]
    pub fn impulse_pending(&self) -> bool {
        self.impulse_pending
    }

    /// Arm the scripted impulse again without rebinding.
    ///
    /// Has no effect if no impulse is configured or no body is bound.
    pub fn rearm_impulse(&mut self) {
        self.impulse_pending = self.impulse.is_some() && self.body.is_some();
    }

    /// Advance the bound body by `dt` seconds.
    ///
    /// # Errors
    ///
    /// - [`DynamicsError::InvalidTimestep`] if `dt` is not positive and finite
    /// - [`DynamicsError::Unbound`] if no body is attached
    /// - [`DynamicsError::InvalidConfig`] if the impulse vertex does not exist on the body
    /// - [`DynamicsError::DegenerateOrientation`] if the orientation cannot be renormalized
    /// - [`DynamicsError::Diverged`] if the new state would not be finite
    ///
    /// On error the body is left unchanged apart from zeroed accumulators.
    pub fn step(&mut self, dt: f64) -> Result<()> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(DynamicsError::InvalidTimestep(dt));
        }

        let gravity = self.gravity;
        let impulse = if self.impulse_pending {
            self.impulse
        } else {
            None
        };

        let holder = self.body.as_mut().ok_or(DynamicsError::Unbound)?;
        let body: &mut BodyState = holder.borrow_mut();

        debug!(step = self.steps + 1, time = self.time, dt, "advancing rigid body");

        let result = accumulate_forces(body, &gravity, impulse.as_ref())
            .and_then(|()| NextState::integrate(body, dt));

        body.force = Vector3::zeros();
        body.torque = Vector3::zeros();

        let next = match result {
            Ok(next) => next,
            Err(err) => {
                warn!(step = self.steps + 1, %err, "rigid body step rejected");
                return Err(err);
            }
        };
        next.commit(body);

        if impulse.is_some() {
            self.impulse_pending = false;
        }
        self.steps += 1;
        self.time += dt;

        Ok(())
    }
}

/// Reset the accumulators to the forces acting during this step.
fn accumulate_forces(
    body: &mut BodyState,
    gravity: &Gravity,
    impulse: Option<&ScriptedImpulse>,
) -> Result<()> {
    body.force = gravity.force_on_mass(body.mass());
    body.torque = Vector3::zeros();

    if let Some(impulse) = impulse {
        let offset = body.vertex_offset(impulse.vertex).ok_or_else(|| {
            DynamicsError::invalid_config(format!(
                "impulse vertex {} out of range for a body with {} vertices",
                impulse.vertex,
                body.vertices_body().len()
            ))
        })?;

        let torque = impulse.torque_about(&offset);
        body.force += impulse.force;
        body.torque += torque;

        trace!(
            force = ?impulse.force,
            torque = ?torque,
            vertex = impulse.vertex,
            "scripted impulse applied"
        );
    }

    Ok(())
}

/// Every quantity of the body at the end of a step.
struct NextState {
    position: Point3<f64>,
    linear_momentum: Vector3<f64>,
    velocity: Vector3<f64>,
    angular_momentum: Vector3<f64>,
    inverse_inertia_world: Matrix3<f64>,
    angular_velocity: Vector3<f64>,
    orientation: UnitQuaternion<f64>,
}

impl NextState {
    fn integrate(body: &BodyState, dt: f64) -> Result<Self> {
        // Linear: velocity from the updated momentum, then position
        let linear_momentum = body.linear_momentum + body.force * dt;
        let velocity = linear_momentum * body.inverse_mass();
        let position = body.position + velocity * dt;

        // Angular: inertia is transformed with the rotation of the previous step
        let angular_momentum = body.angular_momentum + body.torque * dt;
        let inverse_inertia_world =
            body.rotation() * body.inverse_inertia_body() * body.rotation().transpose();
        let angular_velocity = inverse_inertia_world * angular_momentum;

        let orientation = integrate_orientation(body.orientation(), &angular_velocity, dt)?;

        let next = Self {
            position,
            linear_momentum,
            velocity,
            angular_momentum,
            inverse_inertia_world,
            angular_velocity,
            orientation,
        };
        next.check_finite()?;
        Ok(next)
    }

    fn check_finite(&self) -> Result<()> {
        let finite = |v: &Vector3<f64>| v.iter().all(|x| x.is_finite());

        if !finite(&self.position.coords) {
            return Err(DynamicsError::diverged("non-finite position"));
        }
        if !finite(&self.linear_momentum) {
            return Err(DynamicsError::diverged("non-finite linear momentum"));
        }
        if !finite(&self.angular_momentum) {
            return Err(DynamicsError::diverged("non-finite angular momentum"));
        }
        Ok(())
    }

    fn commit(self, body: &mut BodyState) {
        body.position = self.position;
        body.linear_momentum = self.linear_momentum;
        body.velocity = self.velocity;
        body.angular_momentum = self.angular_momentum;
        body.inverse_inertia_world = self.inverse_inertia_world;
        body.angular_velocity = self.angular_velocity;
        body.set_orientation(self.orientation);
    }
}

/// First-order quaternion update followed by renormalization.
///
/// ```text
/// q(t+dt) = normalize(q + ½ (0, ω) q dt)
/// ```
///
/// `omega` is the world-space angular velocity, so the spin quaternion
/// multiplies from the left.
///
/// # Errors
///
/// Returns [`DynamicsError::DegenerateOrientation`] if the updated quaternion
/// is too short (or not finite) to renormalize.
pub fn integrate_orientation(
    orientation: &UnitQuaternion<f64>,
    omega: &Vector3<f64>,
    dt: f64,
) -> Result<UnitQuaternion<f64>> {
    let q = *orientation.quaternion();
    let spin = Quaternion::from_imag(*omega);
    let dq = spin * q * 0.5;
    let updated = q + dq * dt;

    let norm = updated.norm();
    if !norm.is_finite() || norm < MIN_QUATERNION_NORM {
        return Err(DynamicsError::degenerate_orientation(norm));
    }

    Ok(UnitQuaternion::new_unchecked(updated / norm))
}
