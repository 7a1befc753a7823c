/// Manifest builder.
///
/// Walks `<templates_dir>/<category>/<id>.md`, extracts tags and resolves preview images
/// per file, and writes the category-keyed manifest. Invalid UTF-8 is decoded lossily.
/// Unreadable files are logged and skipped; a missing templates directory aborts the run.
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use gallery_common::error::CommonError;
use gallery_common::model::{Manifest, TemplateEntry};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::preview::resolve_preview;
use crate::tags::TagExtractor;

pub struct ManifestBuilder {
    config: Config,
    extractor: TagExtractor,
}

impl ManifestBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            extractor: TagExtractor::new(),
        }
    }

    /// Scan the templates tree into `(category, template)` pairs.
    ///
    /// Categories and files are visited in name order.
    pub fn scan(&self) -> Result<Vec<(String, TemplateEntry)>, AppError> {
        let root = &self.config.templates_dir;
        if !root.is_dir() {
            return Err(AppError::TemplatesDirNotFound(root.clone()));
        }

        let mut templates = Vec::new();
        for category in sorted_entries(root, |path| path.is_dir())? {
            let category_path = root.join(&category);
            let files = sorted_entries(&category_path, |path| {
                path.extension().is_some_and(|ext| ext == "md")
            })?;

            for file in files {
                let Some(id) = file.strip_suffix(".md") else {
                    continue;
                };
                let file_path = category_path.join(&file);
                match std::fs::read(&file_path) {
                    Ok(bytes) => {
                        let content = String::from_utf8_lossy(&bytes);
                        let tags = self.extractor.extract(&content);
                        let preview_url = resolve_preview(&self.config.previews_dir, &category, id);
                        templates.push((
                            category.clone(),
                            TemplateEntry {
                                username: id.to_string(),
                                tags,
                                preview_url,
                            },
                        ));
                    }
                    Err(e) => {
                        warn!(path = %file_path.display(), error = %e, "failed to process template, skipping");
                    }
                }
            }
        }

        Ok(templates)
    }

    pub fn build(&self, generated_at: DateTime<Utc>) -> Result<Manifest, AppError> {
        let templates = self.scan()?;
        Ok(Manifest::from_templates(generated_at, templates))
    }

    /// Write the manifest as pretty-printed JSON, creating the parent directory if needed.
    pub fn write(&self, manifest: &Manifest) -> Result<PathBuf, AppError> {
        let output = &self.config.output_file;
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| AppError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(manifest).map_err(CommonError::from)?;
        std::fs::write(output, json).map_err(|source| AppError::Write {
            path: output.clone(),
            source,
        })?;
        Ok(output.clone())
    }

    /// Full run: scan, aggregate, persist, and log a summary.
    pub fn generate(&self) -> Result<Manifest, AppError> {
        info!(templates_dir = %self.config.templates_dir.display(), "scanning templates directory");
        let manifest = self.build(Utc::now())?;
        let output = self.write(&manifest)?;

        info!(
            total_templates = manifest.total_templates,
            total_categories = manifest.total_categories,
            output = %output.display(),
            "metadata generation complete"
        );
        for (category, entry) in &manifest.categories {
            info!(category = %category, count = entry.count, "category breakdown");
        }
        Ok(manifest)
    }
}

/// Names of the entries in `dir` accepted by `keep`, sorted.
///
/// Entries whose names are not valid UTF-8 are skipped with a warning.
fn sorted_entries(dir: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<String>, AppError> {
    let read_dir = std::fs::read_dir(dir).map_err(|source| AppError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut names = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|source| AppError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !keep(&path) {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => warn!(name = ?raw, dir = %dir.display(), "skipping non UTF-8 entry"),
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    struct Fixture {
        _dir: tempfile::TempDir,
        config: Config,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let config = Config {
            templates_dir: root.join("templates"),
            previews_dir: root.join("previews"),
            output_file: root.join("data").join("templates.json"),
        };
        fs::create_dir_all(config.templates_dir.join("minimalistic")).unwrap();
        fs::create_dir_all(config.templates_dir.join("code-focused")).unwrap();
        fs::create_dir_all(&config.previews_dir).unwrap();

        fs::write(
            config.templates_dir.join("minimalistic").join("zed.md"),
            "# Zed\nPlain text.",
        )
        .unwrap();
        fs::write(
            config.templates_dir.join("minimalistic").join("alice.md"),
            "![badge](https://img.shields.io/badge/docker-blue?logo=docker)",
        )
        .unwrap();
        fs::write(
            config.templates_dir.join("code-focused").join("bob.md"),
            "I love rust",
        )
        .unwrap();
        fs::write(config.templates_dir.join("code-focused").join("notes.txt"), "ignored").unwrap();
        fs::write(config.templates_dir.join("README.md"), "top-level file, not a category").unwrap();
        fs::write(config.previews_dir.join("code-focused-bob.png"), [0u8]).unwrap();

        Fixture { _dir: dir, config }
    }

    #[test]
    fn scan_collects_markdown_files_in_order() {
        let fx = fixture();
        let templates = ManifestBuilder::new(fx.config.clone()).scan().unwrap();
        let keys: Vec<_> = templates
            .iter()
            .map(|(c, t)| format!("{c}/{}", t.username))
            .collect();
        assert_eq!(keys, ["code-focused/bob", "minimalistic/alice", "minimalistic/zed"]);

        let (_, bob) = &templates[0];
        assert_eq!(bob.preview_url.as_deref(), Some("previews/code-focused-bob.png"));
        assert!(bob.tags.contains(&"rust".to_string()));

        let (_, alice) = &templates[1];
        assert!(alice.tags.contains(&"docker".to_string()));
        assert_eq!(alice.preview_url, None);
    }

    #[test]
    fn generate_writes_consistent_manifest() {
        let fx = fixture();
        let builder = ManifestBuilder::new(fx.config.clone());
        let manifest = builder.generate().unwrap();

        assert!(manifest.is_consistent());
        assert_eq!(manifest.total_templates, 3);
        assert_eq!(manifest.total_categories, 2);

        let written = fs::read_to_string(&fx.config.output_file).unwrap();
        let parsed: Manifest = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, manifest);
        assert!(written.contains("\"preview_url\": false"));
    }

    #[test]
    fn missing_templates_dir_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            templates_dir: dir.path().join("nope"),
            previews_dir: dir.path().join("previews"),
            output_file: dir.path().join("out.json"),
        };
        let err = ManifestBuilder::new(config.clone()).generate().unwrap_err();
        assert!(matches!(err, AppError::TemplatesDirNotFound(_)));
        assert!(!config.output_file.exists());
    }

    #[test]
    fn unreadable_file_is_skipped() {
        let fx = fixture();
        fs::create_dir_all(fx.config.templates_dir.join("minimalistic").join("broken.md")).unwrap();
        let templates = ManifestBuilder::new(fx.config.clone()).scan().unwrap();
        assert_eq!(templates.len(), 3);
        assert!(templates.iter().all(|(_, t)| t.username != "broken"));
    }

    #[test]
    fn non_utf8_file_is_kept() {
        let fx = fixture();
        fs::create_dir_all(fx.config.templates_dir.join("others")).unwrap();
        fs::write(
            fx.config.templates_dir.join("others").join("jose.md"),
            b"# Caf\xe9 - I write rust and docker",
        )
        .unwrap();
        let templates = ManifestBuilder::new(fx.config.clone()).scan().unwrap();
        let (category, jose) = templates
            .iter()
            .find(|(_, t)| t.username == "jose")
            .expect("jose should be scanned");
        assert_eq!(category, "others");
        assert_eq!(jose.tags, ["docker", "rust"]);
    }

    #[test]
    fn empty_tree_produces_empty_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            templates_dir: dir.path().to_path_buf(),
            previews_dir: dir.path().join("previews"),
            output_file: dir.path().join("nested").join("deeper").join("out.json"),
        };
        let manifest = ManifestBuilder::new(config.clone()).generate().unwrap();
        assert_eq!(manifest.total_templates, 0);
        assert_eq!(manifest.total_categories, 0);
        assert!(config.output_file.exists());
    }
}
