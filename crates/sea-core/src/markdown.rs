//! Markdown to sanitized HTML.
//!
//! Backend answers are markdown. [`to_html`] converts them with
//! pulldown-cmark and then runs ammonia's default sanitization policy over
//! the result, so the output is safe to embed in a page as-is.

use pulldown_cmark::{Options, Parser, html};

/// Converts markdown to HTML and sanitizes it.
///
/// Scripts, event handler attributes and other unsafe markup are removed;
/// text content survives unchanged.
pub fn to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(
        markdown,
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH,
    );

    let mut unsafe_html = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut unsafe_html, parser);

    ammonia::clean(&unsafe_html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_markdown() {
        let html = to_html("# Title\n\nSome **bold** and `code`.");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<code>code</code>"));
    }

    #[test]
    fn test_inline_script_removed_text_kept() {
        let html = to_html("Before <script>alert('x')</script> after");
        assert!(!html.contains("<script"));
        assert!(!html.contains("alert"));
        assert!(html.contains("<p>Before  after</p>"));
    }

    #[test]
    fn test_event_handlers_and_js_links_removed() {
        let html = to_html(
            "<img src=\"x.png\" onerror=\"alert(1)\">\n\n[click](javascript:alert(1))",
        );
        assert!(!html.contains("onerror"));
        assert!(!html.contains("javascript:"));
        assert!(html.contains("click"));
    }

    #[test]
    fn test_links_get_noopener() {
        let html = to_html("[docs](https://example.com/manual)");
        assert!(html.contains("href=\"https://example.com/manual\""));
        assert!(html.contains("rel=\"noopener noreferrer\""));
    }

    #[test]
    fn test_tables_render() {
        let html = to_html("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(to_html(""), "");
    }
}
