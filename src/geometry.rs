use serde::Serialize;

use crate::{transform::{Placement, Transform}, types::{normalize_or_zero, Vec3}};

/// Triangle with per-vertex normals. Imported mesh triangles are already in world space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Triangle {
    pub vertices: [Vec3; 3],
    pub normals: [Vec3; 3],
}

impl Triangle {
    pub fn new(vertices: [Vec3; 3], normals: [Vec3; 3]) -> Self {
        Self { vertices, normals }
    }

    /// Bakes the triangle into world space: vertices through the full transform,
    /// normals through the inverse-transpose as directions.
    pub fn baked(&self, transform: &Transform) -> Self {
        Self {
            vertices: self.vertices.map(|v| transform.point(v)),
            normals: self.normals.map(|n| normalize_or_zero(transform.normal(n))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Shape {
    /// Radius 0.5 centered at the object-space origin.
    Sphere,
    /// Spans -0.5..0.5 on every object-space axis.
    Cube,
    Triangle(Triangle),
    /// Shape line missing or naming a kind this loader does not know.
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Geometry {
    pub object_id: usize,
    pub material_id: usize,
    pub shape: Shape,
    pub placement: Placement,
    pub transform: Transform,
}

impl Geometry {
    pub fn new(object_id: usize, material_id: usize, shape: Shape, placement: Placement) -> Self {
        Self { object_id, material_id, shape, placement, transform: placement.transform() }
    }
}
