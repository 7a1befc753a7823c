/// In-memory index over the manifest.
///
/// The manifest is flattened once into `TemplateRecord`s (category order, then template
/// order) and never mutated; filtering only derives views from it.
use std::path::PathBuf;
use std::sync::Arc;

use gallery_common::error::CommonError;
use gallery_common::model::{Manifest, DEFAULT_PREVIEW};
use tracing::{info, warn};

use crate::cache::GalleryCache;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateRecord {
    pub category: String,
    pub username: String,
    pub tags: Vec<String>,
    pub preview_url: Option<String>,
}

impl TemplateRecord {
    /// Identifier unique across categories, e.g. `minimalistic-alice`.
    pub fn card_id(&self) -> String {
        format!("{}-{}", self.category, self.username)
    }

    /// Site-relative path of the markdown source.
    pub fn source_path(&self) -> String {
        format!("templates/{}/{}.md", self.category, self.username)
    }

    pub fn preview_image(&self) -> &str {
        self.preview_url.as_deref().unwrap_or(DEFAULT_PREVIEW)
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    manifest: Manifest,
    records: Vec<TemplateRecord>,
}

impl Catalog {
    pub fn from_manifest(manifest: Manifest) -> Self {
        if !manifest.is_consistent() {
            warn!(
                total_templates = manifest.total_templates,
                total_categories = manifest.total_categories,
                "manifest counts do not match its contents"
            );
        }

        let records = manifest
            .categories
            .iter()
            .flat_map(|(category, entry)| {
                entry.templates.iter().map(move |t| TemplateRecord {
                    category: category.clone(),
                    username: t.username.clone(),
                    tags: t.tags.clone(),
                    preview_url: t.preview_url.clone(),
                })
            })
            .collect();

        Self { manifest, records }
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn records(&self) -> &[TemplateRecord] {
        &self.records
    }

    /// Category names with their template counts, in manifest order.
    pub fn categories(&self) -> impl Iterator<Item = (&str, usize)> {
        self.manifest
            .categories
            .iter()
            .map(|(name, entry)| (name.as_str(), entry.count))
    }

    pub fn find(&self, category: &str, username: &str) -> Option<&TemplateRecord> {
        self.records
            .iter()
            .find(|r| r.category == category && r.username == username)
    }
}

/// Loads the manifest, preferring a fresh session-cache entry over the file on disk.
pub struct CatalogLoader {
    manifest_path: PathBuf,
    cache: Arc<GalleryCache>,
}

impl CatalogLoader {
    pub fn new(manifest_path: PathBuf, cache: Arc<GalleryCache>) -> Self {
        Self {
            manifest_path,
            cache,
        }
    }

    pub async fn load(&self) -> Result<Catalog, AppError> {
        if let Some(manifest) = self.cache.get_manifest().await {
            info!(templates = manifest.total_templates, "manifest loaded from cache");
            return Ok(Catalog::from_manifest(manifest));
        }

        let manifest = self.read_manifest().await?;
        self.cache.set_manifest(&manifest).await;
        info!(
            path = %self.manifest_path.display(),
            templates = manifest.total_templates,
            categories = manifest.total_categories,
            "manifest loaded from disk"
        );
        Ok(Catalog::from_manifest(manifest))
    }

    /// Drop the cached manifest and load again from disk.
    pub async fn reload(&self) -> Result<Catalog, AppError> {
        self.cache.invalidate_manifest().await;
        self.load().await
    }

    async fn read_manifest(&self) -> Result<Manifest, AppError> {
        let raw = tokio::fs::read_to_string(&self.manifest_path)
            .await
            .map_err(|e| {
                AppError::ManifestUnavailable(format!(
                    "failed to read {}: {}",
                    self.manifest_path.display(),
                    CommonError::from(e)
                ))
            })?;
        serde_json::from_str(&raw).map_err(|e| {
            AppError::ManifestUnavailable(CommonError::from(e).to_string())
        })
    }
}
