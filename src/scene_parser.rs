use std::{fmt::Debug, io::{self, BufRead}, str::{FromStr, SplitAsciiWhitespace}};

use cgmath::{vec2, vec3, Vector2, Vector3};
use log::{debug, error, info, warn};

use crate::{
    camera::{CameraParams, CameraSchema, RenderState},
    error::SceneError,
    geometry::{Geometry, Shape},
    material::Material,
    mesh::{load_obj_mesh, resolve},
    scene::LoaderConfig,
    transform::Placement,
};

const MATERIAL_PROPERTIES: usize = 7;

/// Everything a single pass over a scene file produces, before bounds are derived.
#[derive(Debug, Default)]
pub struct ParsedScene {
    pub materials: Vec<Material>,
    pub geometries: Vec<Geometry>,
    pub render_state: Option<RenderState>,
}

pub struct Line {
    pub number: usize,
    text: String,
}

impl Line {
    pub fn parts(&self) -> SplitAsciiWhitespace<'_> {
        self.text.split_ascii_whitespace()
    }

    pub fn is_blank(&self) -> bool {
        self.parts().next().is_none()
    }
}

/// Read position in a scene stream. Record handlers pull their property lines from it.
pub struct Cursor<R: BufRead> {
    lines: io::Lines<R>,
    line_number: usize,
    finished: bool,
}

impl<R: BufRead> Cursor<R> {
    pub fn new(reader: R) -> Self {
        Self { lines: reader.lines(), line_number: 0, finished: false }
    }

    /// Next line of the stream. A read error ends the stream.
    pub fn next_line(&mut self) -> Option<Line> {
        if self.finished {
            return None;
        }
        match self.lines.next() {
            Some(Ok(text)) => {
                self.line_number += 1;
                Some(Line { number: self.line_number, text })
            },
            Some(Err(err)) => {
                warn!("Stopped reading scene after line {}: {}", self.line_number, err);
                self.finished = true;
                None
            },
            None => {
                self.finished = true;
                None
            },
        }
    }

    /// Next line of the current record; `None` once a blank line or the end of the stream is hit.
    pub fn next_property(&mut self) -> Option<Line> {
        self.next_line().filter(|line| !line.is_blank())
    }
}

/// Record handlers share one signature; only MATERIAL can currently fail.
pub fn parse_scene(reader: impl BufRead, config: &LoaderConfig) -> ParsedScene {
    let mut cursor = Cursor::new(reader);
    let mut scene = ParsedScene::default();

    while let Some(line) = cursor.next_line() {
        let mut parts = line.parts();
        let result = match parts.next() {
            Some("MATERIAL") => load_material(&mut cursor, &mut parts, &mut scene),
            Some("OBJECT")   => load_object(&mut cursor, &mut parts, &mut scene, config),
            Some("CAMERA")   => load_camera(&mut cursor, &mut scene, config),
            Some(other) => {
                debug!("Line {}: ignoring '{}'", line.number, other);
                continue;
            },
            None => continue,
        };
        if let Err(err) = result {
            error!("Line {}: {}", line.number, err);
        }
    }

    scene
}

pub fn load_material<R: BufRead>(cursor: &mut Cursor<R>, header: &mut SplitAsciiWhitespace, scene: &mut ParsedScene) -> Result<(), SceneError> {
    let id: i64 = next(header);
    let expected = scene.materials.len();
    if id != expected as i64 {
        return Err(SceneError::MaterialOutOfSequence { expected, found: id });
    }

    info!("Loading Material {}...", id);
    let mut material = Material::new(expected);

    for _ in 0..MATERIAL_PROPERTIES {
        let Some(line) = cursor.next_property() else { break; };
        let mut parts = line.parts();
        match parts.next() {
            Some("RGB")       => material.color                = next_vec3(&mut parts),
            Some("SPECEX")    => material.specular.exponent    = next(&mut parts),
            Some("SPECRGB")   => material.specular.color       = next_vec3(&mut parts),
            Some("REFL")      => material.reflectivity         = next(&mut parts),
            Some("REFR")      => material.refractivity         = next(&mut parts),
            Some("REFRIOR")   => material.index_of_refraction  = next(&mut parts),
            Some("EMITTANCE") => material.emittance            = next(&mut parts),
            Some(other) => debug!("Line {}: unknown material property '{}'", line.number, other),
            None => {},
        }
    }

    scene.materials.push(material);
    Ok(())
}

pub fn load_object<R: BufRead>(cursor: &mut Cursor<R>, header: &mut SplitAsciiWhitespace, scene: &mut ParsedScene, config: &LoaderConfig) -> Result<(), SceneError> {
    let object_id: usize = next(header);
    info!("Loading Geom {}...", object_id);

    let mut shape = Shape::Unknown;
    let mut mesh = None;
    let mut material_id = 0;
    let mut placement = Placement::default();

    let shape_line = cursor.next_property();
    if let Some(line) = &shape_line {
        let mut parts = line.parts();
        match parts.next() {
            Some("sphere") => shape = Shape::Sphere,
            Some("cube")   => shape = Shape::Cube,
            Some("mesh_obj") => {
                let root = config.asset_root.as_deref();
                match (parts.next(), parts.next()) {
                    (Some(mesh_path), Some(material_path)) => {
                        info!("Creating new OBJ mesh from {}...", mesh_path);
                        mesh = Some(load_obj_mesh(&resolve(root, mesh_path), &resolve(root, material_path)));
                    },
                    _ => {
                        warn!("Line {}: mesh_obj expects a mesh path and a material library path", line.number);
                        mesh = Some(vec![]);
                    },
                }
            },
            Some(other) => warn!("Line {}: unknown shape '{}'", line.number, other),
            None => {},
        }
    }

    let material_line = shape_line.and_then(|_| cursor.next_property());
    if let Some(line) = &material_line {
        let mut parts = line.parts();
        if parts.next() != Some("material") {
            warn!("Line {}: expected 'material <id>'", line.number);
        }
        material_id = next(&mut parts);
        info!("Connecting Geom {} to Material {}...", object_id, material_id);
    }

    if material_line.is_some() {
        while let Some(line) = cursor.next_property() {
            let mut parts = line.parts();
            match parts.next() {
                Some("TRANS") => placement.translation = next_vec3(&mut parts),
                Some("ROTAT") => placement.rotation    = next_vec3(&mut parts),
                Some("SCALE") => placement.scale       = next_vec3(&mut parts),
                Some(other) => debug!("Line {}: unknown object property '{}'", line.number, other),
                None => {},
            }
        }
    }

    match mesh {
        Some(triangles) => {
            let transform = placement.transform();
            scene.geometries.extend(triangles.into_iter().map(|triangle| Geometry {
                object_id,
                material_id,
                shape: Shape::Triangle(triangle.baked(&transform)),
                placement,
                transform: transform.clone(),
            }));
        },
        None => scene.geometries.push(Geometry::new(object_id, material_id, shape, placement)),
    }
    Ok(())
}

pub fn load_camera<R: BufRead>(cursor: &mut Cursor<R>, scene: &mut ParsedScene, config: &LoaderConfig) -> Result<(), SceneError> {
    info!("Loading Camera ...");
    let schema = CameraSchema::for_config(config.depth_of_field);
    let mut params = CameraParams::default();

    while let Some(line) = cursor.next_property() {
        let mut parts = line.parts();
        let Some(key) = parts.next() else { continue; };
        match key {
            "EYE"    => params.position = Some(next_vec3(&mut parts)),
            "LOOKAT" => params.look_at  = Some(next_vec3(&mut parts)),
            "UP"     => params.up       = Some(next_vec3(&mut parts)),
            _ if !schema.recognizes(key) => debug!("Line {}: ignoring camera property '{}'", line.number, key),
            "RES"        => params.resolution     = Some(next_vec2(&mut parts)),
            "FOVY"       => params.fovy           = Some(next(&mut parts)),
            "ITERATIONS" => params.iterations     = Some(next(&mut parts)),
            "DEPTH"      => params.depth          = Some(next(&mut parts)),
            "FILE"       => params.file           = parts.next().map(str::to_string),
            "FOCALDIST"  => params.focal_distance = Some(next(&mut parts)),
            "LENRADIUS"  => params.lens_radius    = Some(next(&mut parts)),
            _ => {},
        }
    }

    if scene.render_state.is_some() {
        warn!("Camera defined more than once, keeping the last one");
    }
    scene.render_state = Some(RenderState::new(params));
    info!("Loaded camera!");
    Ok(())
}

/// Parses the next token, falling back to the type's zero value when it is missing or malformed.
fn next<T: FromStr + Default>(parts: &mut SplitAsciiWhitespace) -> T
    where <T as FromStr>::Err: Debug
{
    match parts.next().map(str::parse) {
        Some(Ok(value)) => value,
        Some(Err(err)) => {
            warn!("Malformed value: {:?}", err);
            T::default()
        },
        None => T::default(),
    }
}

fn next_vec3<T: FromStr + Default>(parts: &mut SplitAsciiWhitespace) -> Vector3<T>
    where <T as FromStr>::Err: Debug
{
    vec3(next(parts), next(parts), next(parts))
}

fn next_vec2<T: FromStr + Default>(parts: &mut SplitAsciiWhitespace) -> Vector2<T>
    where <T as FromStr>::Err: Debug
{
    vec2(next(parts), next(parts))
}
