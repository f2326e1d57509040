//! Box shape factory.
//!
//! A [`BoxShape`] is a uniform-density cuboid centered on its center of mass
//! and aligned with its body axes, so its inertia tensor is diagonal:
//!
//! - Ixx = (1/12) * m * (h² + d²)
//! - Iyy = (1/12) * m * (w² + d²)
//! - Izz = (1/12) * m * (w² + h²)

use nalgebra::{Matrix3, Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{BodyState, DynamicsError, Result};

/// Number of corners of a box.
pub const BOX_VERTEX_COUNT: usize = 8;

/// Uniform-density box with its dimensions retained after construction.
///
/// # Example
///
/// ```
/// use tumble_types::BoxShape;
///
/// let shape = BoxShape::new(2.0, 1.0, 1.0, 3.0).unwrap();
/// assert_eq!(shape.mass(), 6.0);
///
/// assert!(BoxShape::new(0.0, 1.0, 1.0, 1.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "BoxShapeData"))]
pub struct BoxShape {
    width: f64,
    height: f64,
    depth: f64,
    density: f64,
}

impl Default for BoxShape {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
            density: 1.0,
        }
    }
}

impl BoxShape {
    /// Create a box, rejecting non-positive or non-finite parameters.
    ///
    /// # Arguments
    ///
    /// * `width` - Extent along body X (m)
    /// * `height` - Extent along body Y (m)
    /// * `depth` - Extent along body Z (m)
    /// * `density` - Uniform density (kg/m³)
    pub fn new(width: f64, height: f64, depth: f64, density: f64) -> Result<Self> {
        for (name, value) in [
            ("width", width),
            ("height", height),
            ("depth", depth),
            ("density", density),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(DynamicsError::invalid_shape(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }

        Ok(Self {
            width,
            height,
            depth,
            density,
        })
    }

    /// Create a cube with the given edge length and density.
    pub fn cube(edge: f64, density: f64) -> Result<Self> {
        Self::new(edge, edge, edge, density)
    }

    /// Extent along body X.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Extent along body Y.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Extent along body Z.
    #[must_use]
    pub fn depth(&self) -> f64 {
        self.depth
    }

    /// Uniform density.
    #[must_use]
    pub fn density(&self) -> f64 {
        self.density
    }

    /// Full extents `(w, h, d)`.
    #[must_use]
    pub fn dimensions(&self) -> Vector3<f64> {
        Vector3::new(self.width, self.height, self.depth)
    }

    /// Half extents `(w/2, h/2, d/2)`.
    #[must_use]
    pub fn half_extents(&self) -> Vector3<f64> {
        self.dimensions() * 0.5
    }

    /// Volume `w · h · d`.
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.width * self.height * self.depth
    }

    /// Mass `density · w · h · d`.
    #[must_use]
    pub fn mass(&self) -> f64 {
        self.density * self.volume()
    }

    /// Diagonal body-space inertia tensor about the center of mass.
    #[must_use]
    pub fn inertia(&self) -> Matrix3<f64> {
        let m = self.mass();
        let w2 = self.width * self.width;
        let h2 = self.height * self.height;
        let d2 = self.depth * self.depth;

        let ixx = m * (h2 + d2) / 12.0;
        let iyy = m * (w2 + d2) / 12.0;
        let izz = m * (w2 + h2) / 12.0;

        Matrix3::from_diagonal(&Vector3::new(ixx, iyy, izz))
    }

    /// The eight corners in body space.
    ///
    /// Order: the back face (`z = -d/2`) counter-clockwise starting at
    /// `(-w/2, -h/2, -d/2)`, then the front face (`z = +d/2`) in the same
    /// order. Vertex 0 is always the all-negative corner.
    #[must_use]
    pub fn vertices(&self) -> Vec<Point3<f64>> {
        let h = self.half_extents();
        vec![
            Point3::new(-h.x, -h.y, -h.z),
            Point3::new(h.x, -h.y, -h.z),
            Point3::new(h.x, h.y, -h.z),
            Point3::new(-h.x, h.y, -h.z),
            Point3::new(-h.x, -h.y, h.z),
            Point3::new(h.x, -h.y, h.z),
            Point3::new(h.x, h.y, h.z),
            Point3::new(-h.x, h.y, h.z),
        ]
    }

    /// Build a fully populated [`BodyState`] at the origin with identity orientation.
    ///
    /// `linear_velocity` and `angular_velocity` seed the velocity views.
    pub fn into_body(
        self,
        linear_velocity: Vector3<f64>,
        angular_velocity: Vector3<f64>,
    ) -> Result<BodyState> {
        BodyState::from_mass_properties(
            self.mass(),
            self.inertia(),
            self.vertices(),
            linear_velocity,
            angular_velocity,
        )
    }
}

/// Serialized form of [`BoxShape`], validated by [`BoxShape::new`].
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct BoxShapeData {
    width: f64,
    height: f64,
    depth: f64,
    density: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<BoxShapeData> for BoxShape {
    type Error = DynamicsError;

    fn try_from(data: BoxShapeData) -> Result<Self> {
        Self::new(data.width, data.height, data.depth, data.density)
    }
}
