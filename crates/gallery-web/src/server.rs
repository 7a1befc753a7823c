use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use gallery_common::model::{Manifest, DEFAULT_PREVIEW_FILE};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{info, warn};

use crate::assets::{template_id, validate_segment, TemplateStore};
use crate::catalog::{Catalog, CatalogLoader, TemplateRecord};
use crate::config::Config;
use crate::error::AppError;
use crate::filter::{CategoryFilter, FilterState};
use crate::gallery::Gallery;
use crate::preview::{PreviewService, PreviewView, FRAME_SANDBOX};
use crate::view::{category_options, download_name, CategoryOption, GalleryView};

pub struct AppState {
    page_size: usize,
    catalog: RwLock<Option<Arc<Catalog>>>,
    loader: CatalogLoader,
    previews: PreviewService,
    store: TemplateStore,
    previews_dir: PathBuf,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        config: &Config,
        catalog: Option<Catalog>,
        loader: CatalogLoader,
        previews: PreviewService,
    ) -> Self {
        Self {
            page_size: config.page_size,
            catalog: RwLock::new(catalog.map(Arc::new)),
            loader,
            previews,
            store: TemplateStore::new(config.templates_dir()),
            previews_dir: config.previews_dir(),
        }
    }

    /// Current catalog, loading it on first use after a failed startup load.
    async fn catalog(&self) -> Result<Arc<Catalog>, AppError> {
        if let Some(catalog) = self.catalog.read().await.as_ref() {
            return Ok(catalog.clone());
        }
        let mut slot = self.catalog.write().await;
        if let Some(catalog) = slot.as_ref() {
            return Ok(catalog.clone());
        }
        let catalog = Arc::new(self.loader.load().await?);
        *slot = Some(catalog.clone());
        Ok(catalog)
    }

    async fn reload(&self) -> Result<Arc<Catalog>, AppError> {
        let catalog = Arc::new(self.loader.reload().await?);
        *self.catalog.write().await = Some(catalog.clone());
        Ok(catalog)
    }
}

pub fn router(state: SharedState) -> Router {
    // Unknown preview images get the default image with a 200.
    let preview_images = ServeDir::new(&state.previews_dir)
        .fallback(ServeFile::new(state.previews_dir.join(DEFAULT_PREVIEW_FILE)));

    Router::new()
        .route("/api/templates", get(list_templates))
        .route("/api/templates/{category}/{id}/preview", get(template_preview))
        .route("/api/categories", get(list_categories))
        .route("/api/manifest", get(manifest))
        .route("/api/reload", post(reload))
        .route("/templates/{category}/{id}", get(raw_template))
        .route("/templates/{category}/{id}/download", get(download_template))
        .route("/preview/{category}/{id}", get(preview_document))
        .nest_service("/previews", preview_images)
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct TemplateQuery {
    search: Option<String>,
    category: Option<String>,
    /// Comma-separated active tags.
    tags: Option<String>,
    page: Option<usize>,
}

impl TemplateQuery {
    fn filter_state(&self) -> FilterState {
        let mut state = FilterState::default();
        if let Some(search) = &self.search {
            state.set_search(search.trim());
        }
        if let Some(category) = &self.category {
            state.set_category(category);
        }
        for tag in self.tags.iter().flat_map(|t| t.split(',')) {
            state.add_tag(tag);
        }
        state
    }
}

async fn list_templates(
    State(state): State<SharedState>,
    Query(query): Query<TemplateQuery>,
) -> Result<Json<GalleryView>, AppError> {
    let catalog = state.catalog().await?;
    let gallery = Gallery::with_filter(catalog, state.page_size, query.filter_state());
    Ok(Json(gallery.page_view(query.page.unwrap_or(0))))
}

async fn list_categories(
    State(state): State<SharedState>,
) -> Result<Json<Vec<CategoryOption>>, AppError> {
    let catalog = state.catalog().await?;
    Ok(Json(category_options(&catalog, &CategoryFilter::All)))
}

async fn manifest(State(state): State<SharedState>) -> Result<Json<Manifest>, AppError> {
    let catalog = state.catalog().await?;
    Ok(Json(catalog.manifest().clone()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReloadResponse {
    total_templates: usize,
    total_categories: usize,
}

async fn reload(State(state): State<SharedState>) -> Result<Json<ReloadResponse>, AppError> {
    let catalog = state.reload().await?;
    let manifest = catalog.manifest();
    info!(
        templates = manifest.total_templates,
        categories = manifest.total_categories,
        "catalog reloaded"
    );
    Ok(Json(ReloadResponse {
        total_templates: manifest.total_templates,
        total_categories: manifest.total_categories,
    }))
}

async fn template_preview(
    State(state): State<SharedState>,
    Path((category, id)): Path<(String, String)>,
) -> Result<Json<PreviewView>, AppError> {
    let (catalog, markdown) = load_template(&state, &category, &id).await?;
    let record = find_record(&catalog, &category, &id)?;
    Ok(Json(state.previews.preview(record, &markdown).await))
}

async fn preview_document(
    State(state): State<SharedState>,
    Path((category, id)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let (catalog, markdown) = load_template(&state, &category, &id).await?;
    let record = find_record(&catalog, &category, &id)?;
    let document = state.previews.document(record, &markdown).await;
    let csp = format!("sandbox {FRAME_SANDBOX}");
    Ok(([(header::CONTENT_SECURITY_POLICY, csp)], Html(document)).into_response())
}

async fn raw_template(
    State(state): State<SharedState>,
    Path((category, id)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let markdown = state.store.read_markdown(&category, &id).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        markdown,
    )
        .into_response())
}

async fn download_template(
    State(state): State<SharedState>,
    Path((category, id)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let markdown = state.store.read_markdown(&category, &id).await?;
    let disposition = format!("attachment; filename=\"{}\"", download_name(template_id(&id)?));
    Ok((
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        markdown,
    )
        .into_response())
}

/// Catalog and markdown for a previewed template. Both must exist.
async fn load_template(
    state: &AppState,
    category: &str,
    id: &str,
) -> Result<(Arc<Catalog>, String), AppError> {
    validate_segment(category)?;
    template_id(id)?;
    let catalog = state.catalog().await?;
    let markdown = state.store.read_markdown(category, id).await.inspect_err(|e| {
        warn!(category, id, error = %e, "failed to fetch template source");
    })?;
    Ok((catalog, markdown))
}

fn find_record<'a>(
    catalog: &'a Catalog,
    category: &str,
    id: &str,
) -> Result<&'a TemplateRecord, AppError> {
    let id = template_id(id)?;
    catalog
        .find(category, id)
        .ok_or_else(|| AppError::NotFound(format!("template {category}/{id}")))
}
