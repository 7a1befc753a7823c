/// Error types shared by the generator and the gallery service.
///
/// These cover infrastructure failures (filesystem, JSON). The Redis wrapper never
/// surfaces errors; it degrades to cache misses.
/// Application-specific errors live in each binary crate and wrap `CommonError` via `#[from]`.

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
