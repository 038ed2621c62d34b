use cgmath::{num_traits::zero, Deg, Matrix as _, SquareMatrix as _};
use log::warn;
use serde::Serialize;

use crate::types::{Mat4, Vec3};

/// Object-to-world matrix together with the two derived matrices the renderer needs:
/// the inverse (world-to-object, for rays) and the inverse-transpose (for normals).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transform {
    pub matrix: Mat4,
    pub inverse: Mat4,
    pub inverse_transpose: Mat4,
}

impl Transform {
    pub fn identity() -> Self {
        Self { matrix: Mat4::identity(), inverse: Mat4::identity(), inverse_transpose: Mat4::identity() }
    }

    /// Composes `T * Rx * Ry * Rz * S`: scale first, then rotation about x, y and z
    /// (in degrees), then translation.
    pub fn new(translation: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        let matrix = Mat4::from_translation(translation)
            * Mat4::from_angle_x(Deg(rotation.x))
            * Mat4::from_angle_y(Deg(rotation.y))
            * Mat4::from_angle_z(Deg(rotation.z))
            * Mat4::from_nonuniform_scale(scale.x, scale.y, scale.z);

        let inverse = matrix.invert().unwrap_or_else(|| {
            warn!("Singular transform (scale {:?}), using a zero inverse", scale);
            zero()
        });

        Self { matrix, inverse, inverse_transpose: inverse.transpose() }
    }

    pub fn point(&self, p: Vec3) -> Vec3 {
        (self.matrix * p.extend(1.0)).truncate()
    }

    /// Maps a normal with `w = 0` through the inverse-transpose. The result is not normalized.
    pub fn normal(&self, n: Vec3) -> Vec3 {
        (self.inverse_transpose * n.extend(0.0)).truncate()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Translation, rotation (degrees) and scale as written in an OBJECT record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub translation: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Placement {
    pub fn transform(&self) -> Transform {
        Transform::new(self.translation, self.rotation, self.scale)
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self { translation: zero(), rotation: zero(), scale: Vec3::new(1.0, 1.0, 1.0) }
    }
}
