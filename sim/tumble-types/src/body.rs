//! Rigid body state.
//!
//! [`BodyState`] carries everything needed to advance one rigid body in time:
//! the construction-time constants (mass, body-space inertia, body-space
//! vertices), the authoritative dynamic state (position, orientation
//! quaternion, linear and angular momentum), the per-step force/torque
//! accumulators, and a few caches derived from the momenta.
//!
//! Momentum is authoritative and velocity is a view: `velocity` and
//! `angular_velocity` are recomputed from `linear_momentum` and
//! `angular_momentum` on every step and never integrated on their own.
//! Likewise the quaternion `orientation` is the single source of truth for
//! attitude and `rotation` is re-derived from it after every update.

use nalgebra::{Matrix3, Matrix4, Point3, UnitQuaternion, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{DynamicsError, Result};

/// Relative tolerance used when checking that an inertia tensor is symmetric.
const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Physical state of one rigid body.
///
/// # Example
///
/// ```
/// use tumble_types::BoxShape;
/// use nalgebra::Vector3;
///
/// let body = BoxShape::new(1.0, 1.0, 1.0, 10.0)
///     .unwrap()
///     .into_body(Vector3::zeros(), Vector3::zeros())
///     .unwrap();
///
/// assert_eq!(body.mass(), 10.0);
/// assert_eq!(body.vertices_body().len(), 8);
/// assert_eq!(body.world_transform(), nalgebra::Matrix4::identity());
/// ```
///
/// Deserialization goes through [`from_mass_properties`](Self::from_mass_properties):
/// the mass properties are re-validated and the derived caches rebuilt.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "BodyStateData"))]
pub struct BodyState {
    mass: f64,
    inertia_body: Matrix3<f64>,
    inverse_inertia_body: Matrix3<f64>,
    vertices_body: Vec<Point3<f64>>,

    /// Position of the center of mass in world coordinates.
    pub position: Point3<f64>,
    orientation: UnitQuaternion<f64>,
    rotation: Matrix3<f64>,
    /// Linear momentum `P` (kg·m/s).
    pub linear_momentum: Vector3<f64>,
    /// Angular momentum `L` in world coordinates (kg·m²/s).
    pub angular_momentum: Vector3<f64>,

    /// Linear velocity `P / M` (derived cache).
    pub velocity: Vector3<f64>,
    /// Angular velocity `Iinv · L` in world coordinates (derived cache).
    pub angular_velocity: Vector3<f64>,
    /// World-space inverse inertia `R · I0inv · Rᵗ` (derived cache).
    pub inverse_inertia_world: Matrix3<f64>,

    /// Accumulated force for the current step. Zero between steps.
    pub force: Vector3<f64>,
    /// Accumulated torque for the current step. Zero between steps.
    pub torque: Vector3<f64>,
}

impl BodyState {
    /// Create a body from its mass properties.
    ///
    /// The body starts at the origin with identity orientation and zero
    /// momenta. `linear_velocity` and `angular_velocity` only seed the
    /// velocity views; since momenta start at zero, the first step
    /// recomputes both views from the (zero) momenta.
    ///
    /// # Arguments
    ///
    /// * `mass` - Total mass (must be positive and finite)
    /// * `inertia` - Symmetric, invertible inertia tensor about the center of mass, in body space
    /// * `vertices` - Body-space point cloud, fixed for the lifetime of the body
    /// * `linear_velocity` - Initial linear velocity view
    /// * `angular_velocity` - Initial angular velocity view
    pub fn from_mass_properties(
        mass: f64,
        inertia: Matrix3<f64>,
        vertices: Vec<Point3<f64>>,
        linear_velocity: Vector3<f64>,
        angular_velocity: Vector3<f64>,
    ) -> Result<Self> {
        if !mass.is_finite() || mass <= 0.0 {
            return Err(DynamicsError::invalid_mass(format!(
                "mass must be positive and finite, got {mass}"
            )));
        }

        if !inertia.iter().all(|x| x.is_finite()) {
            return Err(DynamicsError::invalid_mass("inertia tensor must be finite"));
        }

        let asymmetry = (inertia - inertia.transpose()).norm();
        if asymmetry > SYMMETRY_TOLERANCE * inertia.norm().max(1.0) {
            return Err(DynamicsError::invalid_mass("inertia tensor must be symmetric"));
        }

        let inverse_inertia = inertia
            .try_inverse()
            .ok_or_else(|| DynamicsError::invalid_mass("inertia tensor is singular"))?;

        if !vertices.iter().all(|v| v.coords.iter().all(|x| x.is_finite())) {
            return Err(DynamicsError::invalid_mass("vertices must be finite"));
        }

        Ok(Self {
            mass,
            inertia_body: inertia,
            inverse_inertia_body: inverse_inertia,
            vertices_body: vertices,
            position: Point3::origin(),
            orientation: UnitQuaternion::identity(),
            rotation: Matrix3::identity(),
            linear_momentum: Vector3::zeros(),
            angular_momentum: Vector3::zeros(),
            velocity: linear_velocity,
            angular_velocity,
            inverse_inertia_world: inverse_inertia,
            force: Vector3::zeros(),
            torque: Vector3::zeros(),
        })
    }

    /// Total mass (kg).
    #[must_use]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Inverse of the total mass.
    #[must_use]
    pub fn inverse_mass(&self) -> f64 {
        1.0 / self.mass
    }

    /// Inertia tensor about the center of mass, in body space (kg·m²).
    #[must_use]
    pub fn inertia_body(&self) -> &Matrix3<f64> {
        &self.inertia_body
    }

    /// Inverse of [`inertia_body`](Self::inertia_body).
    #[must_use]
    pub fn inverse_inertia_body(&self) -> &Matrix3<f64> {
        &self.inverse_inertia_body
    }

    /// Orientation, body to world. Authoritative attitude representation.
    #[must_use]
    pub fn orientation(&self) -> &UnitQuaternion<f64> {
        &self.orientation
    }

    /// Rotation matrix equivalent of [`orientation`](Self::orientation).
    #[must_use]
    pub fn rotation(&self) -> &Matrix3<f64> {
        &self.rotation
    }

    /// Replace the orientation and re-derive the rotation matrix from it.
    ///
    /// `inverse_inertia_world` is left alone; it always lags one step behind
    /// and is refreshed by the next integration step.
    pub fn set_orientation(&mut self, orientation: UnitQuaternion<f64>) {
        self.orientation = orientation;
        self.rotation = orientation.to_rotation_matrix().into_inner();
    }

    /// Body-space vertex positions.
    #[must_use]
    pub fn vertices_body(&self) -> &[Point3<f64>] {
        &self.vertices_body
    }

    /// World-space offset of a body vertex from the center of mass (`R · v`).
    ///
    /// Returns `None` if `index` is out of range.
    #[must_use]
    pub fn vertex_offset(&self, index: usize) -> Option<Vector3<f64>> {
        self.vertices_body
            .get(index)
            .map(|v| self.rotation * v.coords)
    }

    /// Body vertices transformed to world coordinates (`X + R · v`).
    #[must_use]
    pub fn world_vertices(&self) -> Vec<Point3<f64>> {
        self.vertices_body
            .iter()
            .map(|v| self.position + self.rotation * v.coords)
            .collect()
    }

    /// 4×4 world transform for rendering.
    ///
    /// Column-major, with `rotation` as the upper-left 3×3 block and
    /// `position` in the last column.
    #[must_use]
    pub fn world_transform(&self) -> Matrix4<f64> {
        let mut transform = self.rotation.to_homogeneous();
        transform
            .fixed_view_mut::<3, 1>(0, 3)
            .copy_from(&self.position.coords);
        transform
    }

    /// [`world_transform`](Self::world_transform) as a single-precision `glam` matrix.
    #[must_use]
    pub fn render_transform(&self) -> glam::Mat4 {
        let transform = self.world_transform().cast::<f32>();
        glam::Mat4::from_cols_slice(transform.as_slice())
    }

    /// Kinetic energy from the velocity views: ½ M |V|² + ½ ω · L.
    #[must_use]
    pub fn kinetic_energy(&self) -> f64 {
        let linear = 0.5 * self.mass * self.velocity.norm_squared();
        let angular = 0.5 * self.angular_velocity.dot(&self.angular_momentum);
        linear + angular
    }

    /// Whether the force and torque accumulators are both zero.
    #[must_use]
    pub fn accumulators_clear(&self) -> bool {
        self.force == Vector3::zeros() && self.torque == Vector3::zeros()
    }

    /// Check if the dynamic state contains `NaN` or `Inf` values.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.coords.iter().all(|x| x.is_finite())
            && self.orientation.coords.iter().all(|x| x.is_finite())
            && self.linear_momentum.iter().all(|x| x.is_finite())
            && self.angular_momentum.iter().all(|x| x.is_finite())
    }
}

/// Serialized form of [`BodyState`], validated on the way in.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct BodyStateData {
    mass: f64,
    inertia_body: Matrix3<f64>,
    vertices_body: Vec<Point3<f64>>,
    position: Point3<f64>,
    orientation: nalgebra::Quaternion<f64>,
    linear_momentum: Vector3<f64>,
    angular_momentum: Vector3<f64>,
    velocity: Vector3<f64>,
    angular_velocity: Vector3<f64>,
    #[serde(default = "zero_vector")]
    force: Vector3<f64>,
    #[serde(default = "zero_vector")]
    torque: Vector3<f64>,
}

#[cfg(feature = "serde")]
fn zero_vector() -> Vector3<f64> {
    Vector3::zeros()
}

#[cfg(feature = "serde")]
impl TryFrom<BodyStateData> for BodyState {
    type Error = DynamicsError;

    fn try_from(data: BodyStateData) -> Result<Self> {
        let mut body = Self::from_mass_properties(
            data.mass,
            data.inertia_body,
            data.vertices_body,
            data.velocity,
            data.angular_velocity,
        )?;

        let norm = data.orientation.norm();
        if !norm.is_finite() || norm < 1e-12 {
            return Err(DynamicsError::degenerate_orientation(norm));
        }
        body.set_orientation(UnitQuaternion::from_quaternion(data.orientation));
        body.inverse_inertia_world =
            body.rotation * body.inverse_inertia_body * body.rotation.transpose();

        body.position = data.position;
        body.linear_momentum = data.linear_momentum;
        body.angular_momentum = data.angular_momentum;
        body.force = data.force;
        body.torque = data.torque;

        let finite = |v: &Vector3<f64>| v.iter().all(|x| x.is_finite());
        if !body.is_finite() || !finite(&body.velocity) || !finite(&body.angular_velocity) {
            return Err(DynamicsError::invalid_config("body state must be finite"));
        }

        Ok(body)
    }
}
