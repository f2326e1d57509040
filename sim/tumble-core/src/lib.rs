//! Rigid body integration for a single tumbling box.
//!
//! This crate provides the stepping logic on top of [`tumble_types`], which
//! holds the data structures.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Scene                               │
//! │  Frame loop: pause state, frame time clamping, reset         │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Integrator                            │
//! │  Binding, gravity, one-shot impulse, symplectic Euler step   │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  BodyState (tumble-types)                    │
//! │  Mass properties, pose, momenta, accumulators                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Layer 0 Crate
//!
//! No windowing or rendering dependencies. The world transform is exposed
//! as an `f64` matrix and, via [`BodyState::render_transform`], as a
//! `glam::Mat4` for whatever draws it.
//!
//! # Quick Start
//!
//! ```
//! use tumble_core::{Integrator, BoxConfig, Gravity};
//!
//! let body = BoxConfig::cube(0.1).density(10.0).build().unwrap();
//!
//! let mut integrator = Integrator::new(Gravity::lab());
//! integrator.bind(body);
//!
//! // First step applies the scripted impulse, which starts the tumble
//! integrator.step(0.01).unwrap();
//! assert!(!integrator.impulse_pending());
//!
//! let body = integrator.body().unwrap();
//! assert!(body.angular_momentum.norm() > 0.0);
//! ```
//!
//! # Borrowing a Body
//!
//! The integrator can also borrow a body it does not own:
//!
//! ```
//! use tumble_core::{Integrator, BoxConfig, Gravity};
//!
//! let mut body = BoxConfig::default().build().unwrap();
//! {
//!     let mut integrator = Integrator::new(Gravity::earth());
//!     integrator.bind(&mut body);
//!     integrator.step(0.01).unwrap();
//! }
//! assert!(body.velocity.y < 0.0);
//! ```

#![doc(html_root_url = "https://docs.rs/tumble-core/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
)]

pub mod integrator;
mod scene;

pub use integrator::{integrate_orientation, Integrator};
pub use scene::{Frame, Scene};

// Re-export key types from tumble-types for convenience
pub use tumble_types::{
    BodyState, BoxConfig, BoxShape, DynamicsError, Gravity, IntegratorConfig, Result,
    SceneConfig, ScriptedImpulse, BOX_VERTEX_COUNT, DEFAULT_MAX_TIMESTEP,
};

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::cast_precision_loss
)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};

    #[test]
    fn test_basic_simulation() {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        scene.resume();

        let frames = scene.run(60, 1.0 / 60.0).expect("simulation should succeed");
        assert_eq!(frames.len(), 60);

        // Body should have fallen and started to tumble
        let body = scene.body().expect("body should be bound");
        assert!(body.position.y < 0.0);
        assert!(body.angular_velocity.norm() > 0.0);
        assert!(body.is_finite());
    }

    #[test]
    fn test_momentum_conservation() {
        // No gravity and no impulse: momenta never change
        let mut body = BoxConfig::new(0.4, 0.2, 0.1).build().unwrap();
        body.linear_momentum = Vector3::new(0.01, -0.02, 0.005);
        body.angular_momentum = Vector3::new(0.001, 0.002, -0.0005);
        let initial_p = body.linear_momentum;
        let initial_l = body.angular_momentum;

        let config = IntegratorConfig::default().without_impulse();
        let mut integrator = Integrator::with_config(config).unwrap();
        integrator.bind(body);

        for _ in 0..500 {
            integrator.step(0.01).expect("simulation should succeed");
        }

        let body = integrator.body().unwrap();
        assert_relative_eq!(body.linear_momentum, initial_p, epsilon = 1e-15);
        assert_relative_eq!(body.angular_momentum, initial_l, epsilon = 1e-15);
    }

    #[test]
    fn test_energy_trend() {
        // Free falling body should gain kinetic energy equal to lost potential energy
        let initial_height = 10.0;
        let g = 9.81;

        let mut body = BoxConfig::default().build().unwrap();
        body.position = Point3::new(0.0, initial_height, 0.0);
        let mass = body.mass();
        let initial_total = mass * g * initial_height;

        let config = IntegratorConfig::with_gravity(Gravity::earth()).without_impulse();
        let mut integrator = Integrator::with_config(config).unwrap();
        integrator.bind(body);

        for _ in 0..50 {
            integrator.step(0.01).expect("simulation should succeed");
        }

        let body = integrator.body().unwrap();
        let final_total = mass * g * body.position.y + body.kinetic_energy();

        // Some drift expected from the first-order position update
        let energy_drift = (final_total - initial_total).abs() / initial_total;
        assert!(
            energy_drift < 0.01,
            "Energy drift too large: {}%",
            energy_drift * 100.0
        );
    }

    #[test]
    fn test_independent_integrators() {
        let mut a = Integrator::new(Gravity::earth());
        let mut b = Integrator::new(Gravity::zero());
        a.bind(BoxConfig::default().build().unwrap());
        b.bind(BoxConfig::default().build().unwrap());

        a.step(0.01).unwrap();
        a.step(0.01).unwrap();

        assert_eq!(a.steps(), 2);
        assert_eq!(b.steps(), 0);
        assert!(b.impulse_pending());
        assert_eq!(b.body().unwrap().position, Point3::origin());
    }

    #[test]
    fn test_steps_to_time() {
        let mut integrator = Integrator::new(Gravity::lab());
        integrator.bind(BoxConfig::default().build().unwrap());

        for _ in 0..100 {
            integrator.step(0.001).unwrap();
        }
        assert_eq!(integrator.steps(), 100);
        assert_relative_eq!(integrator.time(), 100.0 * 0.001, epsilon = 1e-12);
    }
}
