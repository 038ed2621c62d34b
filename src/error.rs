use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to open scene file {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("material id {found} does not match expected number of materials {expected}")]
    MaterialOutOfSequence { expected: usize, found: i64 },

    #[error("failed to open mesh {}: {source}", path.display())]
    MeshOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to import mesh {}", path.display())]
    MeshImport {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
}
