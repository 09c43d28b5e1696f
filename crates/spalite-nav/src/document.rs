//! Parsed snapshot of a fetched page.

use crate::html;

/// Immutable result of fetching one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePayload {
    /// Raw response body.
    pub html: String,
    /// `<title>` text, `None` when the document has none.
    pub title: Option<String>,
    /// Inner markup of the content region, `None` when the region is
    /// missing.
    pub content: Option<String>,
}

impl PagePayload {
    /// Extract title and content region from a fetched document.
    pub fn parse(html: String, region_id: &str) -> Self {
        let title = html::title_text(&html);
        let content = html::inner_html_by_id(&html, region_id).map(str::to_string);
        Self {
            html,
            title,
            content,
        }
    }

    /// Whether a swap can use this payload.
    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_page() {
        let p = PagePayload::parse(
            "<title>About</title><main id=\"main-content\"><h1>About</h1></main>".to_string(),
            "main-content",
        );
        assert_eq!(p.title.as_deref(), Some("About"));
        assert_eq!(p.content.as_deref(), Some("<h1>About</h1>"));
        assert!(p.has_content());
    }

    #[test]
    fn parse_page_without_region() {
        let p = PagePayload::parse("<title>Oops</title><div>x</div>".to_string(), "main-content");
        assert_eq!(p.title.as_deref(), Some("Oops"));
        assert!(!p.has_content());
        assert!(p.html.contains("<div>x</div>"));
    }

    #[test]
    fn parse_page_without_title() {
        let p = PagePayload::parse("<main id=m>x</main>".to_string(), "m");
        assert_eq!(p.title, None);
        assert_eq!(p.content.as_deref(), Some("x"));
    }
}
