use std::{fs::File, io::BufReader, path::{Path, PathBuf}};

use cgmath::{num_traits::zero, vec3};
use log::{debug, error, info, warn};

use crate::{error::SceneError, geometry::Triangle, types::{normalize_or_zero, Float, Vec3}};

/// Shape/face/vertex view over an imported mesh file.
///
/// Vertex indices are flattened per shape: the vertices of face `f` occupy
/// `offset..offset + num_vertices(shape, f)` where `offset` sums the arities of earlier faces.
pub trait MeshSource {
    fn is_ready(&self) -> bool;
    fn num_shapes(&self) -> usize;
    fn num_faces(&self, shape: usize) -> usize;
    fn num_vertices(&self, shape: usize, face: usize) -> usize;
    fn vertex_position(&self, shape: usize, index: usize) -> Vec3;
    /// `None` when the file carries no normal for this vertex.
    fn vertex_normal(&self, shape: usize, index: usize) -> Option<Vec3>;
}

pub struct ObjLoader {
    models: Vec<tobj::Model>,
    materials: Vec<tobj::Material>,
    ready: bool,
}

impl ObjLoader {
    /// Reads `mesh_path` with `material_path` as its material library. The library is
    /// loaded whether or not the OBJ has an `mtllib` line, and replaces any it names.
    pub fn open(mesh_path: &Path, material_path: &Path) -> Result<Self, SceneError> {
        let file = File::open(mesh_path).map_err(|source| SceneError::MeshOpen { path: mesh_path.to_path_buf(), source })?;
        let mut reader = BufReader::new(file);
        let options = tobj::LoadOptions { single_index: true, triangulate: false, ..Default::default() };

        let library = tobj::load_mtl(material_path);
        let materials = match &library {
            Ok((materials, _)) => {
                debug!("Material library {} has {} materials", material_path.display(), materials.len());
                materials.clone()
            },
            Err(err) => {
                warn!("Material library {} not loaded: {}", material_path.display(), err);
                vec![]
            },
        };

        let (models, _) = tobj::load_obj_buf(&mut reader, &options, |_| library.clone())
            .map_err(|source| SceneError::MeshImport { path: mesh_path.to_path_buf(), source })?;

        Ok(Self { models, materials, ready: true })
    }

    pub fn materials(&self) -> &[tobj::Material] {
        &self.materials
    }

    pub fn not_ready() -> Self {
        Self { models: vec![], materials: vec![], ready: false }
    }

    fn mesh(&self, shape: usize) -> &tobj::Mesh {
        &self.models[shape].mesh
    }
}

impl MeshSource for ObjLoader {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn num_shapes(&self) -> usize {
        self.models.len()
    }

    fn num_faces(&self, shape: usize) -> usize {
        let mesh = self.mesh(shape);
        if mesh.face_arities.is_empty() { mesh.indices.len() / 3 } else { mesh.face_arities.len() }
    }

    fn num_vertices(&self, shape: usize, face: usize) -> usize {
        // tobj leaves face_arities empty when every face is a triangle
        self.mesh(shape).face_arities.get(face).map_or(3, |&arity| arity as usize)
    }

    fn vertex_position(&self, shape: usize, index: usize) -> Vec3 {
        let mesh = self.mesh(shape);
        read_vec3(&mesh.positions, mesh.indices[index] as usize).unwrap_or_else(zero)
    }

    fn vertex_normal(&self, shape: usize, index: usize) -> Option<Vec3> {
        let mesh = self.mesh(shape);
        read_vec3(&mesh.normals, mesh.indices[index] as usize)
    }
}

fn read_vec3(data: &[f32], index: usize) -> Option<Vec3> {
    let v = data.get(index * 3..index * 3 + 3)?;
    Some(vec3(v[0] as Float, v[1] as Float, v[2] as Float))
}

/// Flattens every triangular face into an object-space `Triangle`.
/// Faces of any other arity are skipped; an unready source yields nothing.
pub fn load_triangles(source: &impl MeshSource) -> Vec<Triangle> {
    let mut triangles = vec![];
    if !source.is_ready() {
        return triangles;
    }

    for shape in 0..source.num_shapes() {
        let mut offset = 0;
        for face in 0..source.num_faces(shape) {
            let num_vertices = source.num_vertices(shape, face);
            if num_vertices != 3 {
                error!("Non-triangular face ({} vertices) in shape {} skipped", num_vertices, shape);
                offset += num_vertices;
                continue;
            }

            let vertices = [0, 1, 2].map(|i| source.vertex_position(shape, offset + i));
            let face_normal = normalize_or_zero((vertices[1] - vertices[0]).cross(vertices[2] - vertices[0]));
            let normals = [0, 1, 2].map(|i| source.vertex_normal(shape, offset + i).unwrap_or(face_normal));

            triangles.push(Triangle::new(vertices, normals));
            offset += num_vertices;
        }
    }
    triangles
}

/// Imports `mesh_path` as a flat triangle list. A file that cannot be read gives an empty list.
pub fn load_obj_mesh(mesh_path: &Path, material_path: &Path) -> Vec<Triangle> {
    let loader = ObjLoader::open(mesh_path, material_path).unwrap_or_else(|err| {
        error!("{}", err);
        ObjLoader::not_ready()
    });
    let triangles = load_triangles(&loader);
    info!(
        "OBJ mesh {} loaded with {} triangles and {} materials",
        mesh_path.display(),
        triangles.len(),
        loader.materials().len()
    );
    triangles
}

pub fn resolve(root: Option<&Path>, path: &str) -> PathBuf {
    match root {
        Some(root) if Path::new(path).is_relative() => root.join(path),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod test {
    use std::{fs, path::Path};

    use cgmath::{assert_abs_diff_eq, vec3};

    use crate::types::Vec3;

    use crate::error::SceneError;

    use super::{load_obj_mesh, load_triangles, resolve, MeshSource, ObjLoader};

    struct Faces(Vec<Vec<Vec3>>);

    impl MeshSource for Faces {
        fn is_ready(&self) -> bool { true }
        fn num_shapes(&self) -> usize { 1 }
        fn num_faces(&self, _: usize) -> usize { self.0.len() }
        fn num_vertices(&self, _: usize, face: usize) -> usize { self.0[face].len() }
        fn vertex_position(&self, _: usize, index: usize) -> Vec3 { self.0.iter().flatten().nth(index).copied().unwrap() }
        fn vertex_normal(&self, _: usize, _: usize) -> Option<Vec3> { Some(vec3(0.0, 1.0, 0.0)) }
    }

    #[test]
    fn skips_quads_and_keeps_offsets() {
        let source = Faces(vec![
            vec![vec3(0.0, 0.0, 0.0), vec3(1.0, 0.0, 0.0), vec3(0.0, 0.0, 1.0)],
            vec![vec3(5.0, 0.0, 0.0), vec3(6.0, 0.0, 0.0), vec3(6.0, 1.0, 0.0), vec3(5.0, 1.0, 0.0)],
            vec![vec3(7.0, 0.0, 0.0), vec3(8.0, 0.0, 0.0), vec3(7.0, 1.0, 0.0)],
        ]);
        let triangles = load_triangles(&source);
        assert_eq!(triangles.len(), 2);
        assert_eq!(triangles[1].vertices[0], vec3(7.0, 0.0, 0.0));
        assert_eq!(triangles[1].normals[2], vec3(0.0, 1.0, 0.0));
    }

    #[test]
    fn unready_source_is_empty() {
        assert!(load_triangles(&ObjLoader::not_ready()).is_empty());
        assert!(load_obj_mesh(Path::new("does/not/exist.obj"), Path::new("does/not/exist.mtl")).is_empty());
    }

    #[test]
    fn reads_obj_file() {
        let dir = tempfile::tempdir().unwrap();
        let obj = dir.path().join("quad.obj");
        fs::write(&obj, "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vn 0 0 1
f 1//1 2//1 3//1
f 1//1 3//1 4//1
f 1//1 2//1 3//1 4//1
").unwrap();

        let triangles = load_obj_mesh(&obj, &dir.path().join("missing.mtl"));
        assert_eq!(triangles.len(), 2);
        assert_abs_diff_eq!(triangles[1].vertices[2], vec3(0.0, 1.0, 0.0));
        for triangle in &triangles {
            assert_eq!(triangle.normals, [vec3(0.0, 0.0, 1.0); 3]);
        }
    }

    #[test]
    fn missing_normals_use_face_normal() {
        let dir = tempfile::tempdir().unwrap();
        let obj = dir.path().join("tri.obj");
        fs::write(&obj, "v 0 0 0\nv 0 0 1\nv 1 0 0\nf 1 2 3\n").unwrap();

        let triangles = load_obj_mesh(&obj, &dir.path().join("missing.mtl"));
        assert_eq!(triangles.len(), 1);
        assert_abs_diff_eq!(triangles[0].normals[0], vec3(0.0, 1.0, 0.0));
    }

    #[test]
    fn material_library_loads_without_mtllib() {
        let dir = tempfile::tempdir().unwrap();
        let obj = dir.path().join("tri.obj");
        let mtl = dir.path().join("red.mtl");
        fs::write(&obj, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        fs::write(&mtl, "newmtl red\nKd 1 0 0\n").unwrap();

        let loader = ObjLoader::open(&obj, &mtl).unwrap();
        assert!(loader.is_ready());
        assert_eq!(loader.materials().len(), 1);
        assert_eq!(loader.materials()[0].name, "red");
    }

    #[test]
    fn missing_mesh_keeps_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.obj");
        let err = ObjLoader::open(&missing, &dir.path().join("missing.mtl")).err().unwrap();
        match err {
            SceneError::MeshOpen { path, source } => {
                assert_eq!(path, missing);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            },
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn resolves_relative_paths() {
        assert_eq!(resolve(Some(Path::new("assets")), "bunny.obj"), Path::new("assets/bunny.obj"));
        assert_eq!(resolve(None, "bunny.obj"), Path::new("bunny.obj"));
        assert_eq!(resolve(Some(Path::new("assets")), "/abs/bunny.obj"), Path::new("/abs/bunny.obj"));
    }
}
