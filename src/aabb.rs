use cgmath::{num_traits::zero, vec3};
use rayon::iter::{IntoParallelRefIterator as _, ParallelIterator as _};
use serde::Serialize;

use crate::{geometry::{Geometry, Shape}, types::{Float, Vec3}};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

pub trait HasAABB {
    fn aabb(&self) -> AABB;
}

const CUBE_CORNERS: [[Float; 3]; 8] = [
    [-0.5, -0.5, -0.5], [-0.5, -0.5, 0.5],
    [-0.5, 0.5, -0.5],  [-0.5, 0.5, 0.5],
    [0.5, -0.5, -0.5],  [0.5, -0.5, 0.5],
    [0.5, 0.5, -0.5],   [0.5, 0.5, 0.5],
];

const SPHERE_POLES: [[Float; 3]; 6] = [
    [0.5, 0.0, 0.0], [-0.5, 0.0, 0.0],
    [0.0, 0.5, 0.0], [0.0, -0.5, 0.0],
    [0.0, 0.0, 0.5], [0.0, 0.0, -0.5],
];

impl AABB {
    pub fn empty() -> Self {
        Self {
            min: vec3(Float::INFINITY, Float::INFINITY, Float::INFINITY),
            max: vec3(-Float::INFINITY, -Float::INFINITY, -Float::INFINITY),
        }
    }

    /// Zero-extent box at the origin.
    pub fn point() -> Self {
        Self { min: zero(), max: zero() }
    }

    pub fn extend(&mut self, v: &Vec3) {
        self.min = apply(&self.min, v, min);
        self.max = apply(&self.max, v, max);
    }

    pub fn extend_aabb(&mut self, v: &AABB) {
        self.min = apply(&self.min, &v.min, min);
        self.max = apply(&self.max, &v.max, max);
    }

    pub fn union(mut self, other: AABB) -> Self {
        self.extend_aabb(&other);
        self
    }
}

fn min(a: Float, b: Float) -> Float {
    if a < b { a } else { b }
}

fn max(a: Float, b: Float) -> Float {
    if b < a { a } else { b }
}

fn apply(a: &Vec3, b: &Vec3, f: fn(Float, Float) -> Float) -> Vec3 {
    Vec3 {
        x: f(a.x, b.x),
        y: f(a.y, b.y),
        z: f(a.z, b.z),
    }
}

fn bound_points(points: impl IntoIterator<Item = Vec3>) -> AABB {
    let mut aabb = AABB::empty();
    for p in points {
        aabb.extend(&p);
    }
    aabb
}

impl HasAABB for Geometry {
    fn aabb(&self) -> AABB {
        match &self.shape {
            // already in world space
            Shape::Triangle(triangle) => bound_points(triangle.vertices),
            Shape::Cube => bound_points(CUBE_CORNERS.map(|c| self.transform.point(c.into()))),
            // Only the six axis poles are transformed: exact for unrotated spheres,
            // an under-estimate whenever the sphere is rotated.
            Shape::Sphere => bound_points(SPHERE_POLES.map(|p| self.transform.point(p.into()))),
            Shape::Unknown => AABB::point(),
        }
    }
}

/// Union of every geometry's box, or `None` for an empty list.
pub fn scene_bounds(geometries: &[Geometry]) -> Option<AABB> {
    if geometries.is_empty() {
        return None;
    }
    Some(geometries.par_iter().map(|geometry| geometry.aabb()).reduce(AABB::empty, AABB::union))
}

#[cfg(test)]
mod test {
    use cgmath::{assert_abs_diff_eq, num_traits::zero, vec3};

    use crate::{geometry::{Geometry, Shape, Triangle}, transform::Placement, types::PI};

    use super::{scene_bounds, HasAABB, AABB};

    fn unit(shape: Shape) -> Geometry {
        Geometry::new(0, 0, shape, Placement::default())
    }

    fn placed(shape: Shape, translation: [f64; 3], rotation: [f64; 3], scale: [f64; 3]) -> Geometry {
        Geometry::new(0, 0, shape, Placement { translation: translation.into(), rotation: rotation.into(), scale: scale.into() })
    }

    #[test]
    fn unit_cube() {
        let aabb = unit(Shape::Cube).aabb();
        assert_abs_diff_eq!(aabb.min, vec3(-0.5, -0.5, -0.5));
        assert_abs_diff_eq!(aabb.max, vec3(0.5, 0.5, 0.5));
    }

    #[test]
    fn unit_sphere() {
        let aabb = unit(Shape::Sphere).aabb();
        assert_abs_diff_eq!(aabb.min, vec3(-0.5, -0.5, -0.5));
        assert_abs_diff_eq!(aabb.max, vec3(0.5, 0.5, 0.5));
    }

    #[test]
    fn rotated_cube_grows() {
        let aabb = placed(Shape::Cube, [0.0; 3], [0.0, 0.0, 45.0], [1.0; 3]).aabb();
        let half_diagonal = (2.0f64).sqrt() / 2.0;
        assert_abs_diff_eq!(aabb.max, vec3(half_diagonal, half_diagonal, 0.5), epsilon = 1e-9);
        assert_abs_diff_eq!(aabb.min, -vec3(half_diagonal, half_diagonal, 0.5), epsilon = 1e-9);
    }

    #[test]
    fn triangle_uses_world_vertices() {
        let triangle = Triangle::new([vec3(1.0, -2.0, 0.0), vec3(3.0, 0.0, 1.0), vec3(2.0, 4.0, -1.0)], [zero(); 3]);
        // the transform must not be applied a second time
        let aabb = placed(Shape::Triangle(triangle), [10.0; 3], [0.0; 3], [5.0; 3]).aabb();
        assert_eq!(aabb, AABB { min: vec3(1.0, -2.0, -1.0), max: vec3(3.0, 4.0, 1.0) });
    }

    #[test]
    fn unknown_shape_is_a_point() {
        let aabb = placed(Shape::Unknown, [3.0; 3], [0.0; 3], [2.0; 3]).aabb();
        assert_eq!(aabb, AABB::point());
    }

    #[test]
    fn empty_scene_has_no_bounds() {
        assert!(scene_bounds(&[]).is_none());
    }

    #[test]
    fn rotated_sphere_uses_pole_approximation() {
        // the poles swing inward, so the box is smaller than the true 0.5 envelope
        let aabb = placed(Shape::Sphere, [0.0; 3], [0.0, 0.0, 45.0], [1.0; 3]).aabb();
        let extent = 0.5 * (PI / 4.0).cos();
        assert_abs_diff_eq!(aabb.min, vec3(-extent, -extent, -0.5), epsilon = 1e-9);
        assert_abs_diff_eq!(aabb.max, vec3(extent, extent, 0.5), epsilon = 1e-9);
    }

    #[test]
    fn cube_and_sphere() {
        let geometries = vec![
            placed(Shape::Cube, [0.0; 3], [0.0; 3], [2.0; 3]),
            placed(Shape::Sphere, [3.0, 0.0, 0.0], [0.0; 3], [1.0; 3]),
        ];
        let sphere = geometries[1].aabb();
        assert_abs_diff_eq!(sphere.min, vec3(2.5, -0.5, -0.5));
        assert_abs_diff_eq!(sphere.max, vec3(3.5, 0.5, 0.5));

        let bounds = scene_bounds(&geometries).unwrap();
        assert_abs_diff_eq!(bounds.min, vec3(-1.0, -1.0, -1.0));
        assert_abs_diff_eq!(bounds.max, vec3(3.5, 1.0, 1.0));
    }
}
