//! Indented re-serialization of SVG markup
//!
//! Optimizers emit everything on one line. This lays the tree out one
//! element per line so the saved file can be read and diffed. Rendering is
//! unaffected: only whitespace-only text is dropped and other text is
//! trimmed.

use super::{Element, MarkupError, Node, VectorDocument, XML_DECLARATION, escape_text};

const INDENT: &str = "  ";

/// Re-indent `markup`, two spaces per depth level
pub fn format(markup: &str) -> Result<String, MarkupError> {
    let doc = VectorDocument::parse(markup)?;
    let mut out = String::from(XML_DECLARATION);
    out.push('\n');
    write_element(doc.root(), 0, &mut out);
    Ok(out)
}

fn write_element(element: &Element, depth: usize, out: &mut String) {
    let pad = INDENT.repeat(depth);
    let children: Vec<&Node> = element
        .children
        .iter()
        .filter(|child| match child {
            Node::Text(text) => !text.trim().is_empty(),
            Node::Element(_) => true,
        })
        .collect();

    out.push_str(&pad);
    element.write_start_tag(out);
    if children.is_empty() {
        out.push_str("/>\n");
        return;
    }
    out.push_str(">\n");

    for child in children {
        match child {
            Node::Element(child) => write_element(child, depth + 1, out),
            Node::Text(text) => {
                out.push_str(&pad);
                out.push_str(INDENT);
                out.push_str(&escape_text(text.trim()));
                out.push('\n');
            }
        }
    }

    out.push_str(&pad);
    out.push_str("</");
    out.push_str(&element.name);
    out.push_str(">\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tree with whitespace-only text removed and remaining text trimmed
    fn significant(element: &Element) -> Element {
        Element {
            name: element.name.clone(),
            attributes: element.attributes.clone(),
            children: element
                .children
                .iter()
                .filter_map(|child| match child {
                    Node::Element(e) => Some(Node::Element(significant(e))),
                    Node::Text(t) if t.trim().is_empty() => None,
                    Node::Text(t) => Some(Node::Text(t.trim().to_string())),
                })
                .collect(),
        }
    }

    #[test]
    fn minified_markup_is_indented_by_depth() {
        let minified = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><g fill="red"><path d="M0 0h5v5z"/><text>hi</text></g></svg>"#;

        let formatted = format(minified).unwrap();

        let expected = concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            "\n",
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10">"#,
            "\n",
            r#"  <g fill="red">"#,
            "\n",
            r#"    <path d="M0 0h5v5z"/>"#,
            "\n",
            "    <text>\n",
            "      hi\n",
            "    </text>\n",
            "  </g>\n",
            "</svg>\n",
        );
        assert_eq!(formatted, expected);
    }

    #[test]
    fn whitespace_only_children_collapse_to_self_closing() {
        let formatted = format("<svg xmlns=\"http://www.w3.org/2000/svg\"><g>\n   \n</g></svg>").unwrap();
        assert!(formatted.contains("\n  <g/>\n"));
    }

    #[test]
    fn text_is_trimmed_and_escaped() {
        let formatted =
            format("<svg xmlns=\"http://www.w3.org/2000/svg\"><text>   a &lt; b   </text></svg>")
                .unwrap();
        assert!(formatted.contains("\n    a &lt; b\n"));
    }

    #[test]
    fn formatted_output_reparses_to_the_same_structure() {
        let source = r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" viewBox="1 2 3 4"><defs><path id="p" d="M0 0"/></defs>
            <use xlink:href="#p"/><g><text x="1">label</text></g></svg>"##;

        let original = VectorDocument::parse(source).unwrap();
        let reparsed = VectorDocument::parse(&format(source).unwrap()).unwrap();

        assert_eq!(significant(reparsed.root()), significant(original.root()));
    }

    #[test]
    fn formatting_is_idempotent() {
        let once = format(r#"<svg xmlns="http://www.w3.org/2000/svg"><g><g/></g></svg>"#).unwrap();
        assert_eq!(format(&once).unwrap(), once);
    }

    #[test]
    fn malformed_input_is_an_error() {
        assert!(format("<svg").is_err());
    }
}
