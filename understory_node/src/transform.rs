// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Column-major 4×4 transforms for the `transform` and
//! `subnode_transform` properties.

use core::ops::Mul;

use kurbo::{Affine, Vec2};

/// A column-major 4×4 transform.
///
/// Each inner array is one column `[x, y, z, w]`, the layout toolkit
/// compositors use for their 3-D layer transforms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3d {
    /// The four columns.
    pub cols: [[f64; 4]; 4],
}

impl Transform3d {
    /// The identity transform.
    pub const IDENTITY: Self = Self::from_scale(1.0, 1.0, 1.0);

    /// Creates a transform from its columns.
    #[must_use]
    pub const fn from_cols(c0: [f64; 4], c1: [f64; 4], c2: [f64; 4], c3: [f64; 4]) -> Self {
        Self {
            cols: [c0, c1, c2, c3],
        }
    }

    /// A translation by `(x, y, z)`.
    #[must_use]
    pub const fn from_translation(x: f64, y: f64, z: f64) -> Self {
        let mut t = Self::IDENTITY;
        t.cols[3] = [x, y, z, 1.0];
        t
    }

    /// A scale along each axis.
    #[must_use]
    pub const fn from_scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self::from_cols(
            [sx, 0.0, 0.0, 0.0],
            [0.0, sy, 0.0, 0.0],
            [0.0, 0.0, sz, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        )
    }

    /// A rotation of `radians` around the Z axis.
    #[must_use]
    pub fn from_rotation_z(radians: f64) -> Self {
        let (s, c) = radians.sin_cos();
        Self::from_cols(
            [c, s, 0.0, 0.0],
            [-s, c, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        )
    }

    /// Embeds a 2-D affine transform in the XY plane.
    #[must_use]
    pub fn from_affine(affine: Affine) -> Self {
        let [a, b, c, d, e, f] = affine.as_coeffs();
        Self::from_cols(
            [a, b, 0.0, 0.0],
            [c, d, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [e, f, 0.0, 1.0],
        )
    }

    /// Returns the 2-D part if this transform only acts in the XY plane.
    #[must_use]
    pub fn to_affine(&self) -> Option<Affine> {
        let [c0, c1, c2, c3] = self.cols;
        let planar = c0[2] == 0.0
            && c0[3] == 0.0
            && c1[2] == 0.0
            && c1[3] == 0.0
            && c2 == [0.0, 0.0, 1.0, 0.0]
            && c3[2] == 0.0
            && c3[3] == 1.0;
        planar.then(|| Affine::new([c0[0], c0[1], c1[0], c1[1], c3[0], c3[1]]))
    }

    /// Returns the XY translation.
    #[must_use]
    pub fn translation_2d(&self) -> Vec2 {
        Vec2::new(self.cols[3][0], self.cols[3][1])
    }

    /// Returns `true` for the identity transform.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Returns `true` if every element is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.cols.iter().flatten().all(|v| v.is_finite())
    }
}

impl Default for Transform3d {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform3d {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut out = [[0.0_f64; 4]; 4];
        for (j, column) in out.iter_mut().enumerate() {
            for (i, cell) in column.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.cols[k][i] * rhs.cols[j][k]).sum();
            }
        }
        Self { cols: out }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_identity() {
        assert_eq!(Transform3d::default(), Transform3d::IDENTITY);
        assert!(Transform3d::IDENTITY.is_identity());
    }

    #[test]
    fn translations_compose() {
        let t = Transform3d::from_translation(1.0, 0.0, 0.0) * Transform3d::from_translation(0.0, 2.0, 0.0);
        assert_eq!(t.cols[3], [1.0, 2.0, 0.0, 1.0]);
        assert_eq!(t.translation_2d(), Vec2::new(1.0, 2.0));
    }

    #[test]
    fn scale_then_translate() {
        let t = Transform3d::from_translation(3.0, 4.0, 0.0) * Transform3d::from_scale(2.0, 2.0, 2.0);
        assert_eq!(t.cols[0], [2.0, 0.0, 0.0, 0.0]);
        assert_eq!(t.cols[3], [3.0, 4.0, 0.0, 1.0]);
    }

    #[test]
    fn affine_embedding() {
        let affine = Affine::translate((5.0, -2.0)) * Affine::scale(3.0);
        let t = Transform3d::from_affine(affine);
        assert_eq!(t.to_affine(), Some(affine));
        assert_eq!(Transform3d::from_translation(0.0, 0.0, 1.0).to_affine(), None);
    }

    #[test]
    fn rotation_quarter_turn() {
        let r = Transform3d::from_rotation_z(core::f64::consts::FRAC_PI_2);
        assert!((r.cols[0][1] - 1.0).abs() < 1e-9);
        assert!((r.cols[1][0] + 1.0).abs() < 1e-9);
    }

    #[test]
    fn non_finite_detected() {
        let mut t = Transform3d::IDENTITY;
        assert!(t.is_finite());
        t.cols[2][1] = f64::NAN;
        assert!(!t.is_finite());
    }
}
