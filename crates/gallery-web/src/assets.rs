/// Template sources on disk.
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::error::AppError;

/// Reject anything that could escape its directory or break a quoted header value.
pub fn validate_segment(segment: &str) -> Result<&str, AppError> {
    if segment.is_empty()
        || segment.starts_with('.')
        || segment.contains(['/', '\\', '"'])
        || segment.contains("..")
        || segment.chars().any(char::is_control)
    {
        return Err(AppError::InvalidPath(segment.to_string()));
    }
    Ok(segment)
}

/// Template id from a route segment, accepting an optional `.md` suffix.
pub fn template_id(segment: &str) -> Result<&str, AppError> {
    let segment = validate_segment(segment)?;
    let id = segment.strip_suffix(".md").unwrap_or(segment);
    validate_segment(id)
}

#[derive(Debug, Clone)]
pub struct TemplateStore {
    templates_dir: PathBuf,
}

impl TemplateStore {
    pub fn new(templates_dir: PathBuf) -> Self {
        Self { templates_dir }
    }

    /// Raw markdown of `templates/<category>/<id>.md`. Invalid UTF-8 is replaced, not rejected.
    pub async fn read_markdown(&self, category: &str, id: &str) -> Result<String, AppError> {
        let category = validate_segment(category)?;
        let id = template_id(id)?;
        let path = self.templates_dir.join(category).join(format!("{id}.md"));

        let bytes = tokio::fs::read(&path).await.map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                AppError::NotFound(format!("template {category}/{id}"))
            } else {
                AppError::TemplateRead {
                    path: path.display().to_string(),
                    source,
                }
            }
        })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
