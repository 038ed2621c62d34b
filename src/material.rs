use cgmath::num_traits::zero;
use serde::Serialize;

use crate::types::{Float, Vec3};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Specular {
    pub exponent: Float,
    pub color: Vec3,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Material {
    pub id: usize,
    pub color: Vec3,
    pub specular: Specular,
    /// 0 means not reflective.
    pub reflectivity: Float,
    /// 0 means not refractive.
    pub refractivity: Float,
    pub index_of_refraction: Float,
    /// 0 means the surface does not emit light.
    pub emittance: Float,
}

impl Material {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            color: zero(),
            specular: Specular { exponent: 0.0, color: zero() },
            reflectivity: 0.0,
            refractivity: 0.0,
            index_of_refraction: 0.0,
            emittance: 0.0,
        }
    }

    pub fn is_light(&self) -> bool {
        self.emittance > 0.0
    }
}
