//! Core types for single rigid body simulation.
//!
//! This crate provides the data side of the simulation:
//!
//! - [`BodyState`] - Mass, inertia, pose, momenta and force accumulators of one body
//! - [`BoxShape`] - Uniform-density box: mass, diagonal inertia, corner vertices
//! - [`Gravity`], [`ScriptedImpulse`] - The forces acting on the body
//! - [`IntegratorConfig`], [`SceneConfig`], [`BoxConfig`] - Simulation configuration
//! - [`DynamicsError`] - Construction and stepping failures
//!
//! # Layer 0
//!
//! These types have no stepping logic of their own; `tumble-core` advances
//! them. Nothing here is global: every simulation lives in its own values, so
//! any number of independent bodies can coexist.
//!
//! # Coordinate System
//!
//! - X: right
//! - Y: up
//! - Z: toward the viewer
//! - Right-handed
//!
//! # Example
//!
//! ```
//! use tumble_types::{BoxConfig, Gravity};
//!
//! let body = BoxConfig::cube(1.0).density(10.0).build().unwrap();
//! assert_eq!(body.mass(), 10.0);
//!
//! let weight = Gravity::earth().force_on_mass(body.mass());
//! assert!(weight.y < 0.0);
//! ```

#![doc(html_root_url = "https://docs.rs/tumble-types/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
    clippy::missing_errors_doc,        // Error docs added where non-obvious
)]

mod body;
mod config;
mod error;
mod forces;
mod shape;

pub use body::BodyState;
pub use config::{BoxConfig, IntegratorConfig, SceneConfig, DEFAULT_MAX_TIMESTEP};
pub use error::DynamicsError;
pub use forces::{Gravity, ScriptedImpulse};
pub use shape::{BoxShape, BOX_VERTEX_COUNT};

// Re-export math types for convenience
pub use glam::Mat4;
pub use nalgebra::{Matrix3, Matrix4, Point3, UnitQuaternion, Vector3};

/// Result type for simulation operations.
pub type Result<T> = std::result::Result<T, DynamicsError>;
