use std::path::PathBuf;

/// Generator configuration loaded from environment variables.
///
/// The generator takes no flags; every path has a default relative to the
/// working directory.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the `<category>/<id>.md` tree.
    pub templates_dir: PathBuf,
    /// Directory holding `<category>-<id>.<ext>` preview images.
    pub previews_dir: PathBuf,
    /// Where the manifest JSON is written.
    pub output_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from("./templates"),
            previews_dir: PathBuf::from("./previews"),
            output_file: PathBuf::from("./data/templates.json"),
        }
    }
}

impl Config {
    /// Optional:
    /// - `GALLERY_TEMPLATES_DIR` (default: `./templates`)
    /// - `GALLERY_PREVIEWS_DIR` (default: `./previews`)
    /// - `GALLERY_OUTPUT_FILE` (default: `./data/templates.json`)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            templates_dir: env_path("GALLERY_TEMPLATES_DIR").unwrap_or(defaults.templates_dir),
            previews_dir: env_path("GALLERY_PREVIEWS_DIR").unwrap_or(defaults.previews_dir),
            output_file: env_path("GALLERY_OUTPUT_FILE").unwrap_or(defaults.output_file),
        }
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}
