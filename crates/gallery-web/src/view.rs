/// View models for the gallery page.
///
/// Pure mappings from catalog data and filter state to serializable structures. The
/// host page owns markup and event wiring; nothing here touches HTML beyond URLs.
use gallery_common::model::DEFAULT_PREVIEW;
use serde::Serialize;

use crate::catalog::{Catalog, TemplateRecord};
use crate::filter::{CategoryFilter, FilterState, ALL_CATEGORIES};

/// Tags shown on a card; the rest are only searchable.
pub const MAX_CARD_TAGS: usize = 6;

/// Shown in place of tags when a template has none.
pub const PLACEHOLDER_TAG: &str = "template";

pub fn category_icon(category: &str) -> &'static str {
    match category {
        "badges-icons" => "🏆",
        "code-focused" => "💻",
        "creative-artistic" => "🎨",
        "data-visual" => "📊",
        "dynamic-interactive" => "⚡",
        "media-rich" => "🖼️",
        "minimalistic" => "🎯",
        "showcase-collections" => "✨",
        "others" => "📦",
        _ => "📄",
    }
}

/// `code-focused` -> `Code Focused`.
pub fn category_title(category: &str) -> String {
    category
        .split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn category_label(category: &str) -> String {
    format!("{} {}", category_icon(category), category_title(category))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagChip {
    pub tag: String,
    pub label: String,
    pub placeholder: bool,
}

impl TagChip {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            label: format!("#{tag}"),
            placeholder: false,
        }
    }

    fn placeholder() -> Self {
        Self {
            placeholder: true,
            ..Self::new(PLACEHOLDER_TAG)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView {
    pub id: String,
    pub title: String,
    pub category: String,
    pub category_label: String,
    pub preview_image: String,
    /// Swapped in by the page when `preview_image` fails to load.
    pub fallback_image: String,
    pub tags: Vec<TagChip>,
    pub preview_url: String,
    pub frame_url: String,
    pub raw_url: String,
    pub download_url: String,
    pub download_name: String,
}

impl CardView {
    pub fn from_record(record: &TemplateRecord) -> Self {
        let tags = if record.tags.is_empty() {
            vec![TagChip::placeholder()]
        } else {
            record
                .tags
                .iter()
                .take(MAX_CARD_TAGS)
                .map(|t| TagChip::new(t))
                .collect()
        };

        let path = format!("{}/{}", record.category, record.username);
        Self {
            id: record.card_id(),
            title: record.username.clone(),
            category: record.category.clone(),
            category_label: category_label(&record.category),
            preview_image: format!("/{}", record.preview_image()),
            fallback_image: format!("/{DEFAULT_PREVIEW}"),
            tags,
            preview_url: format!("/api/templates/{path}/preview"),
            frame_url: format!("/preview/{path}"),
            raw_url: format!("/templates/{path}"),
            download_url: format!("/templates/{path}/download"),
            download_name: download_name(&record.username),
        }
    }
}

/// Attachment name for a downloaded template.
pub fn download_name(id: &str) -> String {
    format!("{id}-profile-readme.md")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryOption {
    pub value: String,
    pub label: String,
    pub count: Option<usize>,
    pub selected: bool,
}

/// Category selector entries: the wildcard first, then each category with its count.
pub fn category_options(catalog: &Catalog, selected: &CategoryFilter) -> Vec<CategoryOption> {
    let mut options = vec![CategoryOption {
        value: ALL_CATEGORIES.to_string(),
        label: "All Categories".to_string(),
        count: None,
        selected: *selected == CategoryFilter::All,
    }];
    options.extend(catalog.categories().map(|(name, count)| CategoryOption {
        value: name.to_string(),
        label: format!("{} ({count})", category_label(name)),
        count: Some(count),
        selected: selected.as_str() == name,
    }));
    options
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsInfo {
    pub showing: usize,
    pub total: usize,
    pub text: String,
    pub no_results: bool,
}

impl ResultsInfo {
    /// `showing` counts the filtered list, not the cards rendered so far.
    pub fn new(showing: usize, total: usize) -> Self {
        let text = if showing == total {
            format!("Showing all {total} templates")
        } else {
            format!("Showing {showing} of {total} templates")
        };
        Self {
            showing,
            total,
            text,
            no_results: showing == 0,
        }
    }
}

/// Header counter, e.g. `42+`.
pub fn total_badge(total: usize) -> String {
    format!("{total}+")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveTagChip {
    pub tag: String,
    pub label: String,
    /// Value of the `tags` query parameter once this chip is removed.
    pub remove_tags: String,
}

pub fn active_tag_chips(state: &FilterState) -> Vec<ActiveTagChip> {
    state
        .tags()
        .iter()
        .map(|tag| ActiveTagChip {
            tag: tag.clone(),
            label: format!("#{tag}"),
            remove_tags: state
                .tags()
                .iter()
                .filter(|t| *t != tag)
                .cloned()
                .collect::<Vec<_>>()
                .join(","),
        })
        .collect()
}

/// One rendered state of the gallery: filters, counters and the visible cards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryView {
    pub search: String,
    pub category: String,
    pub active_tags: Vec<ActiveTagChip>,
    pub categories: Vec<CategoryOption>,
    pub results: ResultsInfo,
    pub total_badge: String,
    pub cards: Vec<CardView>,
    pub page: usize,
    pub has_more: bool,
}
