/// Redis caching layer for the gallery service.
///
/// All operations return `Option<T>` for graceful degradation. If Redis is unavailable,
/// callers fall through to the manifest file or the render API.
///
/// Key schema:
/// - `gallery:v1:manifest`: JSON `{cachedAt, manifest}`, TTL = configured expiry
/// - `gallery:v1:render:{sha256(markdown)}`: remote-rendered HTML (TTL 3600s)
use std::time::Duration;

use chrono::{DateTime, Utc};
use gallery_common::model::Manifest;
use gallery_common::redis::RedisCache;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

const KEY_PREFIX: &str = "gallery:v1:";
const RENDER_TTL_SECS: u64 = 3600;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedManifest {
    cached_at: DateTime<Utc>,
    manifest: Manifest,
}

pub struct GalleryCache {
    redis: RedisCache,
    manifest_ttl: Duration,
}

impl GalleryCache {
    pub fn new(redis: RedisCache, manifest_ttl: Duration) -> Self {
        Self {
            redis,
            manifest_ttl,
        }
    }

    // --- Manifest (session cache) ---

    /// Cached manifest, if one was written within the expiry window.
    pub async fn get_manifest(&self) -> Option<Manifest> {
        let key = manifest_key();
        let json = self.redis.get(&key).await?;
        let cached: CachedManifest = serde_json::from_str(&json)
            .inspect_err(|e| warn!(error = %e, key = %key, "cache deserialization failed"))
            .ok()?;
        if !is_fresh(cached.cached_at, Utc::now(), self.manifest_ttl) {
            debug!(cached_at = %cached.cached_at, "cached manifest expired");
            return None;
        }
        Some(cached.manifest)
    }

    pub async fn set_manifest(&self, manifest: &Manifest) {
        let entry = CachedManifest {
            cached_at: Utc::now(),
            manifest: manifest.clone(),
        };
        let Ok(json) = serde_json::to_string(&entry)
            .inspect_err(|e| warn!(error = %e, "cache serialization failed"))
        else {
            return;
        };
        let ttl = self.manifest_ttl.as_secs().max(1);
        self.redis.set_with_ttl(&manifest_key(), &json, ttl).await;
    }

    pub async fn invalidate_manifest(&self) {
        self.redis.delete(&manifest_key()).await;
    }

    // --- Rendered previews ---

    pub async fn get_rendered(&self, markdown: &str) -> Option<String> {
        self.redis.get(&render_key(markdown)).await
    }

    pub async fn set_rendered(&self, markdown: &str, html: &str) {
        self.redis
            .set_with_ttl(&render_key(markdown), html, RENDER_TTL_SECS)
            .await;
    }
}

/// Whether an entry written at `cached_at` is still valid at `now`.
///
/// Entries stamped in the future are treated as stale.
pub fn is_fresh(cached_at: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    (now - cached_at).to_std().is_ok_and(|age| age < ttl)
}

fn manifest_key() -> String {
    format!("{KEY_PREFIX}manifest")
}

fn render_key(markdown: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(markdown.as_bytes());
    let hash = hasher.finalize();
    format!("{KEY_PREFIX}render:{:x}", hash)
}
