/// Template preview: highlighted raw source plus an isolated HTML document.
///
/// Rendered markdown is untrusted. It is only ever shipped inside a sandboxed
/// subdocument (`srcdoc` of a sandboxed iframe, or the `/preview` route with a CSP
/// sandbox header) and never inlined into the host page.
use std::sync::Arc;

use gallery_common::markdown::{render_local, MarkdownRenderer, RenderSource, Rendered};
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::GalleryCache;
use crate::catalog::TemplateRecord;
use crate::highlight::{escape_html, MarkdownHighlighter};
use crate::rate_limit::RateLimiter;
use crate::view::{category_label, download_name};

/// No `allow-same-origin`: the document must not reach the host page.
pub const FRAME_SANDBOX: &str = "allow-scripts allow-popups allow-popups-to-escape-sandbox";
pub const FRAME_MIN_HEIGHT: u32 = 600;
pub const FRAME_MAX_HEIGHT: u32 = 800;
pub const FRAME_PADDING: u32 = 40;

/// Iframe height for a content height reported by the embedded document.
pub fn frame_height(reported: u32) -> u32 {
    reported
        .saturating_add(FRAME_PADDING)
        .min(FRAME_MAX_HEIGHT)
        .max(FRAME_MIN_HEIGHT)
}

#[derive(Debug, Clone, Serialize)]
pub struct FrameView {
    pub srcdoc: String,
    pub sandbox: &'static str,
    /// Height before the document reports its own size.
    pub height: u32,
    pub min_height: u32,
    pub max_height: u32,
    pub padding: u32,
}

impl FrameView {
    fn new(srcdoc: String) -> Self {
        Self {
            srcdoc,
            sandbox: FRAME_SANDBOX,
            height: frame_height(0),
            min_height: FRAME_MIN_HEIGHT,
            max_height: FRAME_MAX_HEIGHT,
            padding: FRAME_PADDING,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PreviewView {
    pub title: String,
    pub category: String,
    pub category_label: String,
    pub raw_html: String,
    pub frame: FrameView,
    pub source: RenderSource,
    pub raw_url: String,
    pub download_url: String,
    pub download_name: String,
}

const DOCUMENT_STYLES: &str = r#"
body {
  font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", "Noto Sans", Helvetica, Arial, sans-serif;
  font-size: 16px;
  line-height: 1.5;
  color: #1f2328;
  background-color: #ffffff;
  margin: 0;
  padding: 24px;
  word-wrap: break-word;
}
.markdown-body { max-width: 980px; margin: 0 auto; }
h1, h2, h3, h4, h5, h6 { margin-top: 24px; margin-bottom: 16px; font-weight: 600; line-height: 1.25; }
h1 { font-size: 2em; border-bottom: 1px solid #d0d7de; padding-bottom: .3em; }
h2 { font-size: 1.5em; border-bottom: 1px solid #d0d7de; padding-bottom: .3em; }
h3 { font-size: 1.25em; }
p { margin-top: 0; margin-bottom: 16px; }
a { color: #0969da; text-decoration: none; }
a:hover { text-decoration: underline; }
img { max-width: 100%; height: auto; box-sizing: content-box; }
code {
  padding: .2em .4em;
  font-size: 85%;
  background-color: rgba(175, 184, 193, 0.2);
  border-radius: 6px;
  font-family: ui-monospace, SFMono-Regular, Consolas, monospace;
}
pre { padding: 16px; overflow: auto; font-size: 85%; line-height: 1.45; background-color: #f6f8fa; border-radius: 6px; margin-bottom: 16px; }
pre code { padding: 0; background: transparent; }
blockquote { padding: 0 1em; color: #656d76; border-left: .25em solid #d0d7de; margin: 0 0 16px 0; }
ul, ol { margin-bottom: 16px; padding-left: 2em; }
table { border-collapse: collapse; margin-bottom: 16px; width: 100%; }
table th, table td { padding: 6px 13px; border: 1px solid #d0d7de; }
table th { background-color: #f6f8fa; font-weight: 600; }
table tr:nth-child(2n) { background-color: #f6f8fa; }
hr { height: .25em; padding: 0; margin: 24px 0; background-color: #d0d7de; border: 0; }
[align="center"], p:has(img[src*="shields.io"]), p:has(img[src*="badge"]) { text-align: center; }
"#;

const DOCUMENT_SCRIPT: &str = r#"
function adjustHeight() {
  window.parent.postMessage({ type: 'resize', height: document.body.scrollHeight }, '*');
}
setTimeout(adjustHeight, 100);
document.querySelectorAll('img').forEach(function (img) {
  img.addEventListener('load', adjustHeight);
  img.addEventListener('error', adjustHeight);
});
document.querySelectorAll('a').forEach(function (link) {
  link.addEventListener('click', function (e) {
    e.preventDefault();
    window.open(this.href, '_blank');
  });
});
"#;

/// Full standalone HTML page around rendered markdown.
pub fn isolated_document(title: &str, body_html: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>{title}</title>\n<style>{DOCUMENT_STYLES}</style>\n</head>\n<body>\n\
         <div class=\"markdown-body\">\n{body_html}\n</div>\n\
         <script>{DOCUMENT_SCRIPT}</script>\n</body>\n</html>\n",
        title = escape_html(title),
    )
}

pub struct PreviewService {
    renderer: MarkdownRenderer,
    limiter: Option<RateLimiter>,
    cache: Arc<GalleryCache>,
    highlighter: MarkdownHighlighter,
}

impl PreviewService {
    pub fn new(
        renderer: MarkdownRenderer,
        limiter: Option<RateLimiter>,
        cache: Arc<GalleryCache>,
    ) -> Self {
        Self {
            renderer,
            limiter,
            cache,
            highlighter: MarkdownHighlighter::new(),
        }
    }

    /// Render markdown to HTML. Never fails: the local renderer covers every remote failure.
    pub async fn render(&self, markdown: &str) -> Rendered {
        if !self.renderer.config().remote_enabled {
            return render_local(markdown);
        }

        if let Some(html) = self.cache.get_rendered(markdown).await {
            debug!("render cache hit");
            return Rendered {
                html,
                source: RenderSource::Remote,
            };
        }

        if let Some(limiter) = &self.limiter {
            if let Err(wait) = limiter.try_acquire().await {
                warn!(
                    rps = limiter.rps(),
                    retry_in_ms = wait.as_millis() as u64,
                    "render rate limit reached, using local renderer"
                );
                return render_local(markdown);
            }
        }

        let rendered = self.renderer.render(markdown).await;
        if rendered.source == RenderSource::Remote {
            self.cache.set_rendered(markdown, &rendered.html).await;
        }
        rendered
    }

    /// Standalone document for the `/preview` route.
    pub async fn document(&self, record: &TemplateRecord, markdown: &str) -> String {
        let rendered = self.render(markdown).await;
        isolated_document(&record.username, &rendered.html)
    }

    pub async fn preview(&self, record: &TemplateRecord, markdown: &str) -> PreviewView {
        let rendered = self.render(markdown).await;
        let path = format!("{}/{}", record.category, record.username);
        PreviewView {
            title: record.username.clone(),
            category: record.category.clone(),
            category_label: category_label(&record.category),
            raw_html: self.highlighter.highlight(markdown),
            frame: FrameView::new(isolated_document(&record.username, &rendered.html)),
            source: rendered.source,
            raw_url: format!("/templates/{path}"),
            download_url: format!("/templates/{path}/download"),
            download_name: download_name(&record.username),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use gallery_common::markdown::RenderClientConfig;
    use gallery_common::redis::RedisCache;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub(crate) fn local_service() -> PreviewService {
        service_for(
            RenderClientConfig {
                remote_enabled: false,
                ..RenderClientConfig::default()
            },
            None,
        )
    }

    fn service_for(config: RenderClientConfig, limiter: Option<RateLimiter>) -> PreviewService {
        let cache = Arc::new(GalleryCache::new(
            RedisCache::disabled(),
            Duration::from_secs(60),
        ));
        PreviewService::new(MarkdownRenderer::new(config).unwrap(), limiter, cache)
    }

    fn remote_config(server: &MockServer) -> RenderClientConfig {
        RenderClientConfig {
            api_url: format!("{}/markdown", server.uri()),
            timeout: Duration::from_secs(2),
            ..RenderClientConfig::default()
        }
    }

    fn record() -> TemplateRecord {
        TemplateRecord {
            category: "minimalistic".to_string(),
            username: "alice".to_string(),
            tags: vec![],
            preview_url: None,
        }
    }

    #[test]
    fn height_is_clamped() {
        assert_eq!(frame_height(100), FRAME_MIN_HEIGHT);
        assert_eq!(frame_height(700), 740);
        assert_eq!(frame_height(5000), FRAME_MAX_HEIGHT);
        assert_eq!(frame_height(u32::MAX), FRAME_MAX_HEIGHT);
    }

    #[test]
    fn document_wraps_body_with_script() {
        let doc = isolated_document("<x>", "<p>hi</p>");
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<title>&lt;x&gt;</title>"));
        assert!(doc.contains("<div class=\"markdown-body\">\n<p>hi</p>\n</div>"));
        assert!(doc.contains("type: 'resize'"));
        assert!(doc.contains("window.open(this.href, '_blank')"));
    }

    #[test]
    fn sandbox_never_shares_origin() {
        assert!(!FRAME_SANDBOX.contains("allow-same-origin"));
    }

    #[tokio::test]
    async fn remote_render_is_used_when_available() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/markdown"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<h1>remote</h1>"))
            .mount(&server)
            .await;

        let service = service_for(remote_config(&server), None);
        let view = service.preview(&record(), "# remote").await;
        assert_eq!(view.source, RenderSource::Remote);
        assert!(view.frame.srcdoc.contains("<h1>remote</h1>"));
        assert_eq!(view.frame.sandbox, FRAME_SANDBOX);
        assert_eq!(view.frame.height, FRAME_MIN_HEIGHT);
        assert_eq!(view.category_label, "🎯 Minimalistic");
        assert_eq!(view.download_name, "alice-profile-readme.md");
    }

    #[tokio::test]
    async fn rate_limited_api_still_previews() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let service = service_for(remote_config(&server), None);
        let view = service.preview(&record(), "# Hello").await;
        assert_eq!(view.source, RenderSource::Local);
        assert!(view.frame.srcdoc.contains("<h1>Hello</h1>"));
        assert!(view.raw_html.contains("hljs-section"));
    }

    #[tokio::test]
    async fn local_limiter_skips_remote_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>remote</p>"))
            .expect(1)
            .mount(&server)
            .await;

        let service = service_for(remote_config(&server), RateLimiter::new(1));
        assert_eq!(service.render("a").await.source, RenderSource::Remote);
        assert_eq!(service.render("b").await.source, RenderSource::Local);
    }

    #[tokio::test]
    async fn disabled_remote_renders_locally() {
        let html = local_service().document(&record(), "*hi*").await;
        assert!(html.contains("<em>hi</em>"));
    }
}
