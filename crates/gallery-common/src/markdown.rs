/// Markdown to HTML conversion for template previews.
///
/// The remote rendering API is tried first so previews match what the templates look
/// like on the hosting site. Any failure there, including rate limiting, silently degrades
/// to the local `pulldown-cmark` renderer: `render` never returns an error.
use std::time::Duration;

use pulldown_cmark::{Options, Parser};
use reqwest::StatusCode;
use serde::Serialize;
use tracing::warn;

#[derive(Clone, Debug)]
pub struct RenderClientConfig {
    pub api_url: String,
    pub timeout: Duration,
    /// When false the remote API is never contacted.
    pub remote_enabled: bool,
    pub max_error_body_bytes: usize,
}

impl Default for RenderClientConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com/markdown".to_string(),
            timeout: Duration::from_secs(10),
            remote_enabled: true,
            max_error_body_bytes: 4 * 1024,
        }
    }
}

impl RenderClientConfig {
    /// Optional:
    /// - `MARKDOWN_API_URL` (default: GitHub's markdown endpoint)
    /// - `MARKDOWN_API_TIMEOUT_SECS` (default: 10)
    /// - `MARKDOWN_API_DISABLED` (`1`/`true` forces local rendering)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_url = std::env::var("MARKDOWN_API_URL").unwrap_or(defaults.api_url);

        let timeout = std::env::var("MARKDOWN_API_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        let remote_enabled = !std::env::var("MARKDOWN_API_DISABLED")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            api_url,
            timeout,
            remote_enabled,
            max_error_body_bytes: defaults.max_error_body_bytes,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("markdown API rate limit exceeded")]
    RateLimited,

    #[error("markdown API returned error: status={status} body={body}")]
    Upstream { status: StatusCode, body: String },

    #[error("remote rendering disabled")]
    Disabled,
}

/// Which renderer produced a preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderSource {
    Remote,
    Local,
}

#[derive(Debug, Clone)]
pub struct Rendered {
    pub html: String,
    pub source: RenderSource,
}

#[derive(Serialize)]
struct RenderRequest<'a> {
    text: &'a str,
    mode: &'static str,
}

#[derive(Clone)]
pub struct MarkdownRenderer {
    config: RenderClientConfig,
    http: reqwest::Client,
}

impl MarkdownRenderer {
    pub fn new(config: RenderClientConfig) -> Result<Self, RenderError> {
        let http = reqwest::Client::builder()
            .user_agent("readme-gallery")
            .build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &RenderClientConfig {
        &self.config
    }

    /// Render through the remote API only.
    ///
    /// A 403 maps to `RenderError::RateLimited`; any other non-success status maps to
    /// `RenderError::Upstream`.
    pub async fn render_remote(&self, markdown: &str) -> Result<String, RenderError> {
        if !self.config.remote_enabled {
            return Err(RenderError::Disabled);
        }

        let resp = self
            .http
            .post(&self.config.api_url)
            .timeout(self.config.timeout)
            .header(reqwest::header::ACCEPT, "application/vnd.github.v3+json")
            .json(&RenderRequest {
                text: markdown,
                mode: "markdown",
            })
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp.text().await?);
        }
        if status == StatusCode::FORBIDDEN {
            return Err(RenderError::RateLimited);
        }
        let body = read_limited_text(resp, self.config.max_error_body_bytes).await;
        Err(RenderError::Upstream { status, body })
    }

    /// Render with the remote API, falling back to the local renderer on any failure.
    pub async fn render(&self, markdown: &str) -> Rendered {
        match self.render_remote(markdown).await {
            Ok(html) => Rendered {
                html,
                source: RenderSource::Remote,
            },
            Err(RenderError::Disabled) => render_local(markdown),
            Err(RenderError::RateLimited) => {
                warn!("markdown API rate limit exceeded, using local renderer");
                render_local(markdown)
            }
            Err(e) => {
                warn!(error = %e, "markdown API failed, using local renderer");
                render_local(markdown)
            }
        }
    }
}

/// Convert markdown to HTML locally.
pub fn render_local(markdown: &str) -> Rendered {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);

    let parser = Parser::new_ext(markdown, options);
    let mut html = String::with_capacity(markdown.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut html, parser);

    Rendered {
        html,
        source: RenderSource::Local,
    }
}

async fn read_limited_text(resp: reqwest::Response, max_bytes: usize) -> String {
    match resp.bytes().await {
        Ok(mut b) => {
            if b.len() > max_bytes {
                b.truncate(max_bytes);
            }
            String::from_utf8_lossy(&b).to_string()
        }
        Err(e) => {
            warn!(error = %e, "failed to read markdown API error body");
            "<failed to read error body>".to_string()
        }
    }
}
