//! Owned SVG element tree and its text forms

mod document;
pub mod pretty;

pub use document::{Element, Node, VectorDocument};

/// MIME type of exported artifacts
pub const SVG_MIME: &str = "image/svg+xml";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    #[error("malformed markup: {0}")]
    Parse(#[from] roxmltree::Error),

    #[error("root element is <{0}>, expected <svg>")]
    NotSvg(String),
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            '\t' => out.push_str("&#9;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_escaping_leaves_quotes_alone() {
        assert_eq!(escape_text(r#"a < b && "c" > d"#), r#"a &lt; b &amp;&amp; "c" &gt; d"#);
    }

    #[test]
    fn attribute_escaping_covers_quotes_and_line_breaks() {
        assert_eq!(escape_attr("x=\"1\"\n<&>"), "x=&quot;1&quot;&#10;&lt;&amp;&gt;");
    }
}
