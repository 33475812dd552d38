//! Homogeneous rigid-body transforms.
//!
//! [`Transform`] is a 4×4 row-major matrix whose upper-left 3×3 block is a
//! rotation and whose last column holds the translation.  `a.compose(&b)`
//! (or `a * b`) applies `b` first, so if `a` = T_A_B and `b` = T_B_C the
//! product is T_A_C.
//!
//! # Example
//!
//! ```rust
//! use std::f64::consts::FRAC_PI_2;
//! use armguard_kinematics::transform::Transform;
//!
//! // Rotate 90° about Z, then step 1 m along the rotated X axis.
//! let t = Transform::from_axis_angle([0.0, 0.0, 1.0], FRAC_PI_2)
//!     * Transform::from_translation([1.0, 0.0, 0.0]);
//! let [x, y, _] = t.translation();
//! assert!(x.abs() < 1e-12);
//! assert!((y - 1.0).abs() < 1e-12);
//! ```

use std::ops::Mul;

type Matrix = [[f64; 4]; 4];

const IDENTITY: Matrix = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// A rigid-body transform stored as a homogeneous 4×4 matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    m: Matrix,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// The identity transform.
    pub const fn identity() -> Self {
        Self { m: IDENTITY }
    }

    /// Wrap a raw matrix.  The caller guarantees the rotation block is
    /// orthonormal and the last row is `[0, 0, 0, 1]`.
    pub const fn from_matrix(m: [[f64; 4]; 4]) -> Self {
        Self { m }
    }

    /// Pure translation.
    pub fn from_translation([x, y, z]: [f64; 3]) -> Self {
        let mut m = IDENTITY;
        m[0][3] = x;
        m[1][3] = y;
        m[2][3] = z;
        Self { m }
    }

    /// Rotation of `angle` radians about `axis` (Rodrigues' formula).
    ///
    /// A zero-length axis yields the identity.
    pub fn from_axis_angle(axis: [f64; 3], angle: f64) -> Self {
        let Some([x, y, z]) = normalize(axis) else {
            return Self::identity();
        };
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        Self {
            m: [
                [t * x * x + c, t * x * y - s * z, t * x * z + s * y, 0.0],
                [t * x * y + s * z, t * y * y + c, t * y * z - s * x, 0.0],
                [t * x * z - s * y, t * y * z + s * x, t * z * z + c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Fixed-axis roll/pitch/yaw rotation: `Rz(yaw) · Ry(pitch) · Rx(roll)`.
    pub fn from_rpy([roll, pitch, yaw]: [f64; 3]) -> Self {
        Self::from_axis_angle([0.0, 0.0, 1.0], yaw)
            * Self::from_axis_angle([0.0, 1.0, 0.0], pitch)
            * Self::from_axis_angle([1.0, 0.0, 0.0], roll)
    }

    /// Translation followed by an rpy rotation, the usual joint-origin
    /// encoding.
    pub fn from_origin(xyz: [f64; 3], rpy: [f64; 3]) -> Self {
        Self::from_translation(xyz) * Self::from_rpy(rpy)
    }

    /// Matrix product `self · other`.
    pub fn compose(&self, other: &Self) -> Self {
        let mut out = [[0.0; 4]; 4];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.m[i][k] * other.m[k][j]).sum();
            }
        }
        Self { m: out }
    }

    /// Inverse of a rigid transform: `[Rᵀ | -Rᵀt]`.
    pub fn inverse(&self) -> Self {
        let mut m = IDENTITY;
        for i in 0..3 {
            for j in 0..3 {
                m[i][j] = self.m[j][i];
            }
        }
        for i in 0..3 {
            m[i][3] = -(0..3).map(|k| m[i][k] * self.m[k][3]).sum::<f64>();
        }
        Self { m }
    }

    /// Translation column.
    pub fn translation(&self) -> [f64; 3] {
        [self.m[0][3], self.m[1][3], self.m[2][3]]
    }

    /// Map a point expressed in the child frame into the parent frame.
    pub fn transform_point(&self, p: [f64; 3]) -> [f64; 3] {
        let mut out = [0.0; 3];
        for (i, v) in out.iter_mut().enumerate() {
            *v = self.m[i][0] * p[0] + self.m[i][1] * p[1] + self.m[i][2] * p[2] + self.m[i][3];
        }
        out
    }

    pub fn matrix(&self) -> &[[f64; 4]; 4] {
        &self.m
    }

    /// Element-wise comparison within `tolerance`.
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.m
            .iter()
            .flatten()
            .zip(other.m.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

impl Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        self.compose(&rhs)
    }
}

fn normalize([x, y, z]: [f64; 3]) -> Option<[f64; 3]> {
    let n = (x * x + y * y + z * z).sqrt();
    (n > f64::EPSILON).then(|| [x / n, y / n, z / n])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    const TOL: f64 = 1e-12;

    #[test]
    fn identity_compose_is_noop() {
        let t = Transform::from_translation([1.0, 2.0, 3.0]);
        assert!(Transform::identity().compose(&t).approx_eq(&t, TOL));
        assert!(t.compose(&Transform::identity()).approx_eq(&t, TOL));
    }

    #[test]
    fn translations_add() {
        let t = Transform::from_translation([1.0, 0.0, 0.0])
            * Transform::from_translation([2.0, 0.5, 0.0]);
        assert_eq!(t.translation(), [3.0, 0.5, 0.0]);
    }

    #[test]
    fn yaw_90_rotates_x_to_y() {
        let q = Transform::from_axis_angle([0.0, 0.0, 1.0], FRAC_PI_2);
        let [x, y, z] = q.transform_point([1.0, 0.0, 0.0]);
        assert!(x.abs() < TOL);
        assert!((y - 1.0).abs() < TOL);
        assert!(z.abs() < TOL);
    }

    #[test]
    fn axis_is_normalized() {
        let a = Transform::from_axis_angle([0.0, 0.0, 5.0], 0.3);
        let b = Transform::from_axis_angle([0.0, 0.0, 1.0], 0.3);
        assert!(a.approx_eq(&b, TOL));
    }

    #[test]
    fn zero_axis_is_identity() {
        let t = Transform::from_axis_angle([0.0, 0.0, 0.0], 1.0);
        assert!(t.approx_eq(&Transform::identity(), TOL));
    }

    #[test]
    fn rpy_matches_single_axis_rotations() {
        let yaw = Transform::from_rpy([0.0, 0.0, 0.7]);
        assert!(yaw.approx_eq(&Transform::from_axis_angle([0.0, 0.0, 1.0], 0.7), TOL));
        let roll = Transform::from_rpy([PI, 0.0, 0.0]);
        let [_, y, z] = roll.transform_point([0.0, 1.0, 1.0]);
        assert!((y + 1.0).abs() < TOL);
        assert!((z + 1.0).abs() < TOL);
    }

    #[test]
    fn inverse_undoes_transform() {
        let t = Transform::from_origin([0.3, -0.2, 1.1], [0.1, 0.4, -0.9]);
        assert!((t * t.inverse()).approx_eq(&Transform::identity(), 1e-12));
        assert!((t.inverse() * t).approx_eq(&Transform::identity(), 1e-12));
    }

    #[test]
    fn origin_translates_then_rotates() {
        // Child frame sits 1 m up X, yawed 90°; a point 1 m along child X
        // lands at (1, 1, 0) in the parent.
        let t = Transform::from_origin([1.0, 0.0, 0.0], [0.0, 0.0, FRAC_PI_2]);
        let [x, y, _] = t.transform_point([1.0, 0.0, 0.0]);
        assert!((x - 1.0).abs() < TOL);
        assert!((y - 1.0).abs() < TOL);
    }
}
