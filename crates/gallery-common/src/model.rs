use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Image shown for any template without a preview of its own.
pub const DEFAULT_PREVIEW: &str = "previews/default-preview.svg";
/// File name of `DEFAULT_PREVIEW` inside the previews directory.
pub const DEFAULT_PREVIEW_FILE: &str = "default-preview.svg";

/// Generation-time snapshot of every template, grouped by category.
///
/// Written once by the generator and only ever read afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub last_updated: DateTime<Utc>,
    pub total_templates: usize,
    pub total_categories: usize,
    pub categories: BTreeMap<String, CategoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub count: usize,
    pub templates: Vec<TemplateEntry>,
}

/// One markdown file inside a category directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateEntry {
    /// File stem, unique within its category.
    pub username: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Relative image path, serialized as `false` when no preview exists.
    #[serde(with = "preview_url", default)]
    pub preview_url: Option<String>,
}

impl Manifest {
    /// Group `(category, template)` pairs into a manifest, deriving all counts.
    ///
    /// Templates keep their relative order within a category.
    pub fn from_templates<I>(last_updated: DateTime<Utc>, templates: I) -> Self
    where
        I: IntoIterator<Item = (String, TemplateEntry)>,
    {
        let mut categories: BTreeMap<String, CategoryEntry> = BTreeMap::new();
        let mut total_templates = 0;

        for (category, template) in templates {
            let entry = categories.entry(category).or_insert(CategoryEntry {
                count: 0,
                templates: Vec::new(),
            });
            entry.count += 1;
            entry.templates.push(template);
            total_templates += 1;
        }

        Self {
            last_updated,
            total_templates,
            total_categories: categories.len(),
            categories,
        }
    }

    /// True when every derived count matches the collections it summarizes.
    pub fn is_consistent(&self) -> bool {
        let sum: usize = self.categories.values().map(|c| c.count).sum();
        self.total_categories == self.categories.len()
            && self.total_templates == sum
            && self
                .categories
                .values()
                .all(|c| c.count == c.templates.len())
    }
}

impl TemplateEntry {
    /// Preview image to display, substituting the default asset when none was found.
    pub fn preview_or_default(&self) -> &str {
        self.preview_url.as_deref().unwrap_or(DEFAULT_PREVIEW)
    }
}

mod preview_url {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(path) => s.serialize_str(path),
            None => s.serialize_bool(false),
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Flag(bool),
        Path(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let raw = Option::<Raw>::deserialize(d)?;
        Ok(match raw {
            Some(Raw::Path(path)) if !path.is_empty() && path != "false" => Some(path),
            _ => None,
        })
    }
}
