use std::path::PathBuf;
use std::time::Duration;

use gallery_common::markdown::RenderClientConfig;

use crate::error::AppError;

/// Gallery service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    /// Site root holding `templates/`, `previews/` and `data/templates.json`.
    pub root: PathBuf,
    /// Cards per page; 0 renders the whole filtered list at once.
    pub page_size: usize,
    /// Redis connection URL. `None` disables the session and render caches.
    pub redis_url: Option<String>,
    /// How long a cached manifest stays valid.
    pub cache_ttl: Duration,
    pub render: RenderClientConfig,
}

impl Config {
    /// Optional:
    /// - `GALLERY_LISTEN_ADDR` (default: "127.0.0.1:8080")
    /// - `GALLERY_ROOT` (default: ".")
    /// - `GALLERY_PAGE_SIZE` (default: 12, 0 disables pagination)
    /// - `GALLERY_CACHE_TTL_SECS` (default: 300)
    /// - `REDIS_URL`
    /// - `MARKDOWN_API_*`, see `RenderClientConfig::from_env`
    pub fn from_env() -> Result<Self, AppError> {
        let listen_addr =
            std::env::var("GALLERY_LISTEN_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

        let root = PathBuf::from(std::env::var("GALLERY_ROOT").unwrap_or_else(|_| ".".to_string()));
        if !root.is_dir() {
            return Err(AppError::Config(format!(
                "GALLERY_ROOT is not a directory: {}",
                root.display()
            )));
        }

        let page_size = parse_env("GALLERY_PAGE_SIZE", 12)?;
        let cache_ttl = Duration::from_secs(parse_env("GALLERY_CACHE_TTL_SECS", 300)?);

        Ok(Self {
            listen_addr,
            root,
            page_size,
            redis_url: std::env::var("REDIS_URL").ok(),
            cache_ttl,
            render: RenderClientConfig::from_env(),
        })
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.root.join("templates")
    }

    pub fn previews_dir(&self) -> PathBuf {
        self.root.join("previews")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join("data").join("templates.json")
    }

    /// Configuration rooted at `root` with caches and the remote renderer disabled.
    #[cfg(test)]
    pub fn for_root(root: &std::path::Path) -> Self {
        Self {
            listen_addr: "127.0.0.1:0".to_string(),
            root: root.to_path_buf(),
            page_size: 2,
            redis_url: None,
            cache_ttl: Duration::from_secs(300),
            render: RenderClientConfig {
                remote_enabled: false,
                ..RenderClientConfig::default()
            },
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| AppError::Config(format!("{name} must be a non-negative integer, got {raw:?}"))),
        Err(_) => Ok(default),
    }
}
