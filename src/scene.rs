use std::{fs::File, io::{BufRead, BufReader}, path::{Path, PathBuf}};

use log::{info, warn};
use serde::Serialize;

use crate::{
    aabb::{scene_bounds, AABB},
    camera::{Camera, RenderState},
    error::SceneError,
    geometry::{Geometry, Shape},
    material::Material,
    scene_parser::{parse_scene, ParsedScene},
};

#[derive(Debug, Clone, Default)]
pub struct LoaderConfig {
    /// Accept FOCALDIST and LENRADIUS in CAMERA records.
    pub depth_of_field: bool,
    /// Base directory for relative mesh and material library paths.
    /// `None` uses them as written.
    pub asset_root: Option<PathBuf>,
}

/// A loaded scene, read-only once constructed.
#[derive(Debug)]
pub struct Scene {
    /// Indexed by material id.
    pub materials: Vec<Material>,
    pub geometries: Vec<Geometry>,
    pub render_state: Option<RenderState>,
    /// `None` when there is no geometry.
    pub bounds: Option<AABB>,
}

impl Scene {
    pub fn load(path: impl AsRef<Path>, config: &LoaderConfig) -> Result<Self, SceneError> {
        let path = path.as_ref();
        info!("Reading scene from {} ...", path.display());
        let file = File::open(path).map_err(|source| SceneError::Open { path: path.to_path_buf(), source })?;
        Ok(Self::from_reader(BufReader::new(file), config))
    }

    pub fn from_reader(reader: impl BufRead, config: &LoaderConfig) -> Self {
        Self::new(parse_scene(reader, config))
    }

    pub fn new(scene: ParsedScene) -> Self {
        for geometry in &scene.geometries {
            if geometry.material_id >= scene.materials.len() {
                warn!("Geom {} refers to undefined material {}", geometry.object_id, geometry.material_id);
            }
        }
        if scene.render_state.is_none() {
            warn!("Scene has no camera");
        }

        let bounds = scene_bounds(&scene.geometries);
        Self {
            materials: scene.materials,
            geometries: scene.geometries,
            render_state: scene.render_state,
            bounds,
        }
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.render_state.as_ref().map(|state| &state.camera)
    }

    pub fn summary(&self) -> SceneSummary<'_> {
        let mut shapes = ShapeCounts::default();
        for geometry in &self.geometries {
            match geometry.shape {
                Shape::Sphere      => shapes.spheres += 1,
                Shape::Cube        => shapes.cubes += 1,
                Shape::Triangle(_) => shapes.triangles += 1,
                Shape::Unknown     => shapes.unknown += 1,
            }
        }
        SceneSummary {
            materials: self.materials.len(),
            lights: self.materials.iter().filter(|material| material.is_light()).count(),
            geometries: self.geometries.len(),
            shapes,
            bounds: self.bounds.as_ref(),
            camera: self.camera(),
            iterations: self.render_state.as_ref().map(|state| state.iterations),
            trace_depth: self.render_state.as_ref().map(|state| state.trace_depth),
            image_name: self.render_state.as_ref().map(|state| state.image_name.as_str()),
        }
    }
}

#[derive(Debug, Default, PartialEq, Serialize)]
pub struct ShapeCounts {
    pub spheres: usize,
    pub cubes: usize,
    pub triangles: usize,
    pub unknown: usize,
}

#[derive(Debug, Serialize)]
pub struct SceneSummary<'a> {
    pub materials: usize,
    pub lights: usize,
    pub geometries: usize,
    pub shapes: ShapeCounts,
    pub bounds: Option<&'a AABB>,
    pub camera: Option<&'a Camera>,
    pub iterations: Option<usize>,
    pub trace_depth: Option<usize>,
    pub image_name: Option<&'a str>,
}
