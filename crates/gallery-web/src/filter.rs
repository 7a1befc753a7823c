/// Filter engine.
///
/// A template passes when all three sub-predicates hold:
/// - search: case-insensitive substring of username, category, or any tag (empty matches)
/// - category: exact match, or the `all` wildcard
/// - tags: every active tag present in the template's tags, case-insensitively (empty matches)
///
/// There is no ranking; results keep the order of the source list.
use crate::catalog::TemplateRecord;

/// Category selector value that matches every template.
pub const ALL_CATEGORIES: &str = "all";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == ALL_CATEGORIES {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(value.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CategoryFilter::All => ALL_CATEGORIES,
            CategoryFilter::Only(name) => name,
        }
    }

    fn matches(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(name) => name == category,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    search: String,
    category: CategoryFilter,
    tags: Vec<String>,
}

impl FilterState {
    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn category(&self) -> &CategoryFilter {
        &self.category
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    pub fn set_category(&mut self, category: &str) {
        self.category = CategoryFilter::parse(category);
    }

    /// Activate a tag. Returns false if it was empty or already active.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.has_tag(tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    /// Deactivate a tag. Returns false if it was not active.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        let needle = tag.trim().to_lowercase();
        self.tags.retain(|t| t.to_lowercase() != needle);
        self.tags.len() != before
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.category == CategoryFilter::All && self.tags.is_empty()
    }

    fn has_tag(&self, tag: &str) -> bool {
        let needle = tag.to_lowercase();
        self.tags.iter().any(|t| t.to_lowercase() == needle)
    }

    pub fn matches(&self, record: &TemplateRecord) -> bool {
        self.matches_search(record) && self.category.matches(&record.category) && self.matches_tags(record)
    }

    fn matches_search(&self, record: &TemplateRecord) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        record.username.to_lowercase().contains(&needle)
            || record.category.to_lowercase().contains(&needle)
            || record.tags.iter().any(|t| t.to_lowercase().contains(&needle))
    }

    fn matches_tags(&self, record: &TemplateRecord) -> bool {
        self.tags.iter().all(|active| {
            let active = active.to_lowercase();
            record.tags.iter().any(|t| t.to_lowercase() == active)
        })
    }
}

/// Indices of the records passing `state`, in source order.
pub fn filter_indices(records: &[TemplateRecord], state: &FilterState) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| state.matches(r))
        .map(|(i, _)| i)
        .collect()
}

/// Records passing `state`, in source order.
pub fn apply_filter<'a>(records: &'a [TemplateRecord], state: &FilterState) -> Vec<&'a TemplateRecord> {
    records.iter().filter(|r| state.matches(r)).collect()
}
