/// Heuristic tag extraction from README markdown.
///
/// Three independent passes feed one ordered, deduplicated set:
/// - shields-style badge path segments (`.../badge/<label>-<color>`)
/// - `logo=<name>` query parameters on badge URLs
/// - a fixed technology vocabulary, matched against the whole text and against link text
///
/// The result is best-effort and capped at `MAX_TAGS`. Extraction never fails.
use std::collections::HashSet;

use regex::Regex;

pub const MAX_TAGS: usize = 10;

/// Technology keywords, in the order they are reported.
pub const TECH_KEYWORDS: &[&str] = &[
    "python", "javascript", "typescript", "java", "cpp", "csharp",
    "react", "vue", "angular", "nodejs", "node", "express", "django", "flask",
    "html", "css", "sass", "scss", "tailwind", "bootstrap",
    "docker", "kubernetes", "aws", "azure", "gcp", "git", "github",
    "mongodb", "postgresql", "mysql", "redis", "graphql", "rest", "api",
    "tensorflow", "pytorch", "machine-learning", "ml", "ai", "data-science",
    "linux", "bash", "shell", "vim", "vscode", "jetbrains",
    "golang", "go", "rust", "php", "ruby", "swift", "kotlin", "dart", "flutter",
];

pub struct TagExtractor {
    badge_re: Regex,
    logo_re: Regex,
    link_re: Regex,
}

impl Default for TagExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TagExtractor {
    pub fn new() -> Self {
        Self {
            badge_re: Regex::new(r"(?i)badge[/-]([^-?&\s]+)").expect("valid regex"),
            logo_re: Regex::new(r"(?i:logo)=([A-Za-z0-9-]+)").expect("valid regex"),
            link_re: Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid regex"),
        }
    }

    /// Extract up to `MAX_TAGS` lowercase tags in order of discovery.
    pub fn extract(&self, content: &str) -> Vec<String> {
        let mut tags = TagSet::default();

        for caps in self.badge_re.captures_iter(content) {
            let tag = normalize_badge_label(&caps[1]);
            if tag.len() > 2 && tag.len() < 20 {
                tags.insert(tag);
            }
        }

        for caps in self.logo_re.captures_iter(content) {
            let tag = caps[1].to_ascii_lowercase();
            if tag.len() > 2 {
                tags.insert(tag);
            }
        }

        let lowered = content.to_lowercase();
        for keyword in TECH_KEYWORDS {
            if lowered.contains(keyword) {
                tags.insert((*keyword).to_string());
            }
        }

        for caps in self.link_re.captures_iter(content) {
            let link_text = caps[1].to_lowercase();
            for keyword in TECH_KEYWORDS {
                if link_text.contains(keyword) {
                    tags.insert((*keyword).to_string());
                }
            }
        }

        tags.into_vec()
    }
}

/// Lowercase, turn `%20`/space/underscore into hyphens, drop everything outside `[a-z0-9-]`.
fn normalize_badge_label(raw: &str) -> String {
    raw.to_lowercase()
        .replace("%20", "-")
        .replace([' ', '_'], "-")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

#[derive(Default)]
struct TagSet {
    seen: HashSet<String>,
    ordered: Vec<String>,
}

impl TagSet {
    fn insert(&mut self, tag: String) {
        if self.ordered.len() >= MAX_TAGS || tag.is_empty() {
            return;
        }
        if self.seen.insert(tag.clone()) {
            self.ordered.push(tag);
        }
    }

    fn into_vec(self) -> Vec<String> {
        self.ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_valid_tag(tag: &str) -> bool {
        !tag.is_empty()
            && tag
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    }

    #[test]
    fn docker_badge_yields_docker_tag() {
        let content = "![badge](https://img.shields.io/badge/docker-blue?logo=docker)";
        let tags = TagExtractor::new().extract(content);
        assert!(tags.contains(&"docker".to_string()), "got {tags:?}");
        assert_eq!(tags.iter().filter(|t| *t == "docker").count(), 1);
    }

    #[test]
    fn badge_labels_are_normalized() {
        let content = "![x](https://img.shields.io/badge/Visual%20Studio_Code-0078d7.svg)";
        let tags = TagExtractor::new().extract(content);
        assert_eq!(tags.first().map(String::as_str), Some("visual-studio-code"));
    }

    #[test]
    fn badge_labels_outside_length_window_are_dropped() {
        let content = "https://img.shields.io/badge/JS-yellow \
                       https://img.shields.io/badge/averyveryverylonglabelname-red";
        let tags = TagExtractor::new().extract(content);
        assert!(!tags.contains(&"js".to_string()));
        assert!(!tags.iter().any(|t| t.starts_with("averyvery")));
    }

    #[test]
    fn logo_parameters_are_lowercased() {
        let content = "https://img.shields.io/static/v1?label=x&logo=PostgreSQL&color=blue";
        let tags = TagExtractor::new().extract(content);
        assert_eq!(tags.first().map(String::as_str), Some("postgresql"));
    }

    #[test]
    fn keywords_follow_vocabulary_order() {
        let tags = TagExtractor::new().extract("I write Rust and Python daily.");
        let rust = tags.iter().position(|t| t == "rust").unwrap();
        let python = tags.iter().position(|t| t == "python").unwrap();
        assert!(python < rust);
    }

    #[test]
    fn link_text_keywords_are_found() {
        let tags = TagExtractor::new().extract("See [My Kotlin app](https://example.com/x).");
        assert!(tags.contains(&"kotlin".to_string()));
    }

    #[test]
    fn plain_prose_yields_no_tags() {
        assert!(TagExtractor::new().extract("").is_empty());
        assert!(TagExtractor::new().extract("hello there, friend").is_empty());
    }

    #[test]
    fn logo_ignores_unicode_case_folds() {
        // U+212A KELVIN SIGN folds to `k` under Unicode case-insensitivity.
        let tags = TagExtractor::new().extract("logo=\u{212A}otlin");
        assert!(tags.iter().all(|t| is_valid_tag(t)), "malformed tag in {tags:?}");
    }

    #[test]
    fn results_are_capped_unique_and_well_formed() {
        let inputs = [
            TECH_KEYWORDS.join(" "),
            "![a](https://img.shields.io/badge/C%2B%2B-00599C?logo=c%2B%2B) C++ and C# too".to_string(),
            "badge/Ünïcode_Label-red badge/under_score-x logo=ABC logo=ab".to_string(),
            "[React](r) [react](r) REACT react".to_string(),
        ];
        let extractor = TagExtractor::new();
        for input in &inputs {
            let tags = extractor.extract(input);
            assert!(tags.len() <= MAX_TAGS, "too many tags for {input:?}: {tags:?}");
            assert!(tags.iter().all(|t| is_valid_tag(t)), "malformed tag in {tags:?}");
            let unique: HashSet<_> = tags.iter().collect();
            assert_eq!(unique.len(), tags.len(), "duplicates in {tags:?}");
        }
        assert_eq!(extractor.extract(&inputs[0]).len(), MAX_TAGS);
    }

    mod proptest_tags {
        use super::*;
        use proptest::prelude::*;

        fn assert_well_formed(tags: &[String]) {
            assert!(tags.len() <= MAX_TAGS, "too many tags: {tags:?}");
            assert!(tags.iter().all(|t| is_valid_tag(t)), "malformed tag in {tags:?}");
            let unique: HashSet<_> = tags.iter().collect();
            assert_eq!(unique.len(), tags.len(), "duplicates in {tags:?}");
        }

        /// README-like fragments: badges, logos, links and vocabulary words mixed with noise.
        fn readme_fragment() -> impl Strategy<Value = String> {
            prop_oneof![
                "\\PC{0,12}",
                "[A-Za-z0-9_% .+-]{1,24}".prop_map(|label| format!("badge/{label}-blue ")),
                "[A-Za-z0-9+-]{0,16}".prop_map(|name| format!("?logo={name}&")),
                prop::sample::select(TECH_KEYWORDS).prop_map(|k| k.to_uppercase()),
                ("\\PC{0,10}", "[a-z/.:]{0,10}").prop_map(|(text, url)| format!("[{text}]({url})")),
            ]
        }

        proptest! {
            /// Arbitrary text never produces malformed, duplicate or excess tags.
            #[test]
            fn arbitrary_text_yields_well_formed_tags(content in "\\PC*") {
                assert_well_formed(&TagExtractor::new().extract(&content));
            }

            /// Badge- and keyword-heavy documents respect the same bounds.
            #[test]
            fn readme_like_text_yields_well_formed_tags(
                parts in prop::collection::vec(readme_fragment(), 0..40)
            ) {
                let content = parts.concat();
                let extractor = TagExtractor::new();
                let tags = extractor.extract(&content);
                assert_well_formed(&tags);
                prop_assert_eq!(extractor.extract(&content), tags);
            }
        }
    }
}
