pub mod aabb;
pub mod camera;
pub mod error;
pub mod geometry;
pub mod material;
pub mod mesh;
pub mod scene;
pub mod scene_parser;
pub mod transform;
pub mod types;

pub use aabb::{HasAABB, AABB};
pub use error::SceneError;
pub use scene::{LoaderConfig, Scene};
