use std::path::Path;

/// Extensions tried, in order of preference.
pub const PREVIEW_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg"];

/// Find the preview image for a template, returning its site-relative path.
///
/// Looks for `<previews_dir>/<category>-<id>.<ext>` and reports the first hit as
/// `previews/<category>-<id>.<ext>`. `None` means the default preview applies.
pub fn resolve_preview(previews_dir: &Path, category: &str, id: &str) -> Option<String> {
    PREVIEW_EXTENSIONS.iter().find_map(|ext| {
        let filename = format!("{category}-{id}.{ext}");
        previews_dir
            .join(&filename)
            .is_file()
            .then(|| format!("previews/{filename}"))
    })
}
