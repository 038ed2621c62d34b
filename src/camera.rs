use cgmath::{num_traits::zero, vec2};
use log::warn;
use serde::Serialize;

use crate::types::{normalize_or_zero, Float, Resolution, Vec2, Vec3, PI};

/// Scalar camera keys accepted before the EYE/LOOKAT/UP block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraSchema {
    keys: &'static [&'static str],
}

impl CameraSchema {
    pub fn standard() -> Self {
        Self { keys: &["RES", "FOVY", "ITERATIONS", "DEPTH", "FILE"] }
    }

    pub fn depth_of_field() -> Self {
        Self { keys: &["RES", "FOVY", "ITERATIONS", "DEPTH", "FILE", "FOCALDIST", "LENRADIUS"] }
    }

    pub fn for_config(depth_of_field: bool) -> Self {
        if depth_of_field { Self::depth_of_field() } else { Self::standard() }
    }

    pub fn recognizes(&self, key: &str) -> bool {
        self.keys.iter().any(|k| *k == key)
    }
}

/// Raw CAMERA record values; anything the record omitted stays `None`.
#[derive(Debug, Default)]
pub struct CameraParams {
    pub resolution: Option<Resolution>,
    pub fovy: Option<Float>,
    pub iterations: Option<usize>,
    pub depth: Option<usize>,
    pub file: Option<String>,
    pub focal_distance: Option<Float>,
    pub lens_radius: Option<Float>,
    pub position: Option<Vec3>,
    pub look_at: Option<Vec3>,
    pub up: Option<Vec3>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Camera {
    pub resolution: Resolution,
    /// Horizontal and vertical half-angles in degrees.
    pub fov: Vec2,
    pub pixel_length: Vec2,
    pub position: Vec3,
    pub look_at: Vec3,
    pub view: Vec3,
    pub up: Vec3,
    pub right: Vec3,
    pub focal_distance: Float,
    pub lens_radius: Float,
}

impl Camera {
    pub fn new(params: &CameraParams) -> Self {
        let resolution = params.resolution.unwrap_or(zero());
        if resolution.x == 0 || resolution.y == 0 {
            warn!("Camera resolution {}x{} is empty", resolution.x, resolution.y);
        }

        let fovy = params.fovy.unwrap_or(0.0);
        let y_scaled = (fovy * PI / 180.0).tan();
        let x_scaled = ratio(y_scaled * resolution.x as Float, resolution.y);
        let fovx = x_scaled.atan() * 180.0 / PI;

        let position = params.position.unwrap_or(zero());
        let look_at = params.look_at.unwrap_or(zero());
        let up = params.up.unwrap_or(zero());

        // view has to exist before right is derived from it
        let view = normalize_or_zero(look_at - position);
        let right = normalize_or_zero(view.cross(up));
        if right == zero() {
            warn!("Camera view {:?} and up {:?} do not span a plane", view, up);
        }

        Self {
            resolution,
            fov: vec2(fovx, fovy),
            pixel_length: vec2(ratio(2.0 * x_scaled, resolution.x), ratio(2.0 * y_scaled, resolution.y)),
            position,
            look_at,
            view,
            up,
            right,
            focal_distance: params.focal_distance.unwrap_or(0.0),
            lens_radius: params.lens_radius.unwrap_or(0.0),
        }
    }

    /// Full horizontal and vertical opening angles in degrees.
    pub fn full_field_of_view(&self) -> Vec2 {
        self.fov * 2.0
    }

    pub fn pixel_count(&self) -> usize {
        self.resolution.x * self.resolution.y
    }
}

fn ratio(value: Float, pixels: usize) -> Float {
    if pixels == 0 { 0.0 } else { value / pixels as Float }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderState {
    pub camera: Camera,
    pub iterations: usize,
    pub trace_depth: usize,
    pub image_name: String,
    /// Accumulated radiance per pixel, row-major, zeroed until the renderer writes it.
    #[serde(skip)]
    pub image: Vec<Vec3>,
}

impl RenderState {
    pub fn new(params: CameraParams) -> Self {
        let camera = Camera::new(&params);
        let image = vec![zero(); camera.pixel_count()];
        Self {
            camera,
            iterations: params.iterations.unwrap_or(0),
            trace_depth: params.depth.unwrap_or(0),
            image_name: params.file.unwrap_or_default(),
            image,
        }
    }
}
