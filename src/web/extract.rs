//! HTML to plain text.

use scraper::{Html, Node};

/// Elements whose text never counts as page content.
const SKIPPED_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Extracts the visible text of an HTML document.
///
/// Every text node outside of script/style blocks is trimmed, blank nodes are
/// dropped, and the rest are joined with single spaces.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut parts: Vec<&str> = Vec::new();

    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map(|element| SKIPPED_ELEMENTS.contains(&element.name()))
                .unwrap_or(false)
        });
        if hidden {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scripts_and_styles() {
        let html = r#"
            <html>
            <head>
                <title>Pricing</title>
                <style>body { color: red; }</style>
                <script>var tracking = 1;</script>
            </head>
            <body>
                <h1>Plans</h1>
                <p>Starter is <b>free</b>.</p>
                <noscript>Enable JavaScript</noscript>
            </body>
            </html>
        "#;

        let text = html_to_text(html);

        assert_eq!(text, "Pricing Plans Starter is free .");
        assert!(!text.contains("tracking"));
        assert!(!text.contains("color"));
        assert!(!text.contains("JavaScript"));
    }

    #[test]
    fn collapses_blank_nodes() {
        let text = html_to_text("<div>\n   <span>  a  </span>\n\n<span>b</span></div>");
        assert_eq!(text, "a b");
    }

    #[test]
    fn empty_document_yields_empty_text() {
        assert_eq!(html_to_text(""), "");
    }
}
