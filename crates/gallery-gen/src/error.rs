use std::path::PathBuf;

use gallery_common::error::CommonError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("templates directory not found: {}", .0.display())]
    TemplatesDirNotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Common(#[from] CommonError),
}
