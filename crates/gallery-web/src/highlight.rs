/// Raw-markdown view with lightweight syntax highlighting.
///
/// The source is HTML-escaped first, then annotated line by line with `hljs-*` spans.
/// Fenced blocks are passed through as code without inline markup.
use regex::{Captures, Regex};

pub struct MarkdownHighlighter {
    heading_re: Regex,
    bullet_re: Regex,
    inline_re: Regex,
}

impl Default for MarkdownHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownHighlighter {
    pub fn new() -> Self {
        Self {
            heading_re: Regex::new(r"^#{1,6}\s").expect("valid regex"),
            bullet_re: Regex::new(r"^(\s*)([-*+]|\d+\.)(\s.*)$").expect("valid regex"),
            inline_re: Regex::new(concat!(
                r"(?P<code>`[^`]+`)",
                r"|(?P<tag>&lt;/?[A-Za-z].*?&gt;)",
                r"|(?P<link>!?\[[^\]]*\]\([^)\s]*\))",
                r"|(?P<strong>\*\*[^*]+\*\*|__[^_]+__)",
                r"|(?P<em>\*[^*\s][^*]*\*|_[^_\s][^_]*_)",
            ))
            .expect("valid regex"),
        }
    }

    /// Escaped, highlighted markdown wrapped in `<pre><code>`.
    pub fn highlight(&self, markdown: &str) -> String {
        let mut in_fence = false;
        let lines: Vec<String> = markdown
            .lines()
            .map(|line| {
                let escaped = escape_html(line);
                if line.trim_start().starts_with("```") {
                    in_fence = !in_fence;
                    return span("code", &escaped);
                }
                if in_fence {
                    return span("code", &escaped);
                }
                self.highlight_line(&escaped)
            })
            .collect();

        format!(
            "<pre><code class=\"language-markdown hljs\">{}</code></pre>",
            lines.join("\n")
        )
    }

    fn highlight_line(&self, line: &str) -> String {
        if self.heading_re.is_match(line) {
            return span("section", line);
        }
        if line.starts_with("&gt;") {
            return span("quote", &self.highlight_inline(line));
        }
        if let Some(caps) = self.bullet_re.captures(line) {
            return format!(
                "{}{}{}",
                &caps[1],
                span("bullet", &caps[2]),
                self.highlight_inline(&caps[3])
            );
        }
        self.highlight_inline(line)
    }

    fn highlight_inline(&self, text: &str) -> String {
        self.inline_re
            .replace_all(text, |caps: &Captures| {
                let class = ["code", "tag", "link", "strong", "em"]
                    .into_iter()
                    .find(|name| caps.name(name).is_some())
                    .unwrap_or("code");
                let class = if class == "em" { "emphasis" } else { class };
                span(class, &caps[0])
            })
            .into_owned()
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn span(class: &str, text: &str) -> String {
    format!("<span class=\"hljs-{class}\">{text}</span>")
}
