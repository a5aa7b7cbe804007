use roxmltree::{NodeType, ParsingOptions};

use super::{MarkupError, XML_DECLARATION, escape_attr, escape_text};
use crate::geometry::PointRect;

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// A child of an element
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element with its prefixed name, attributes in document order
/// (namespace declarations included) and children
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Replace the value of `name`, or append it when absent
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    /// Child elements, skipping text
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Writes `<name attr="…"` without closing the tag
    pub(super) fn write_start_tag(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape_attr(value));
            out.push('"');
        }
    }

    fn write_compact(&self, out: &mut String) {
        self.write_start_tag(out);
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                Node::Element(element) => element.write_compact(out),
                Node::Text(text) => out.push_str(&escape_text(text)),
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

/// A full SVG document. Constructed per export, adjusted, serialized and
/// dropped.
#[derive(Clone, Debug, PartialEq)]
pub struct VectorDocument {
    root: Element,
}

impl VectorDocument {
    /// Parse SVG markup. Comments and processing instructions are dropped;
    /// text is kept verbatim, whitespace included.
    pub fn parse(markup: &str) -> Result<Self, MarkupError> {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let doc = roxmltree::Document::parse_with_options(markup, options)?;
        let root = doc.root_element();
        if root.tag_name().name() != "svg" {
            return Err(MarkupError::NotSvg(root.tag_name().name().to_string()));
        }
        Ok(Self {
            root: convert_element(root),
        })
    }

    #[must_use]
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Current `viewBox`, if the producer set one
    #[must_use]
    pub fn frame(&self) -> Option<&str> {
        self.root.attribute("viewBox")
    }

    /// Restrict the visible frame to `frame` and size the document to match
    pub fn set_frame(&mut self, frame: PointRect) {
        self.root.set_attribute("viewBox", frame.view_box());
        self.root.set_attribute("width", format!("{}pt", frame.width));
        self.root.set_attribute("height", format!("{}pt", frame.height));
    }

    /// Serialize with an XML declaration; text nodes are emitted as parsed so
    /// the producer's indentation is preserved
    #[must_use]
    pub fn to_markup(&self) -> String {
        let mut out = String::from(XML_DECLARATION);
        out.push('\n');
        self.root.write_compact(&mut out);
        out.push('\n');
        out
    }
}

fn convert_element(node: roxmltree::Node<'_, '_>) -> Element {
    let mut attributes = namespace_declarations(node);
    for attr in node.attributes() {
        let name = match attr.namespace().and_then(|uri| attribute_prefix(node, uri)) {
            Some(prefix) => format!("{prefix}:{}", attr.name()),
            None => attr.name().to_string(),
        };
        attributes.push((name, attr.value().to_string()));
    }

    let mut children: Vec<Node> = Vec::new();
    for child in node.children() {
        match child.node_type() {
            NodeType::Element => children.push(Node::Element(convert_element(child))),
            NodeType::Text => {
                let text = child.text().unwrap_or_default();
                // Text split by a dropped comment becomes one run again
                if let Some(Node::Text(previous)) = children.last_mut() {
                    previous.push_str(text);
                } else {
                    children.push(Node::Text(text.to_string()));
                }
            }
            _ => {}
        }
    }

    Element {
        name: element_name(node),
        attributes,
        children,
    }
}

fn element_name(node: roxmltree::Node<'_, '_>) -> String {
    let tag = node.tag_name();
    let Some(uri) = tag.namespace() else {
        return tag.name().to_string();
    };
    let in_default = node
        .namespaces()
        .any(|ns| ns.name().is_none() && ns.uri() == uri);
    if in_default {
        return tag.name().to_string();
    }
    match attribute_prefix(node, uri) {
        Some(prefix) => format!("{prefix}:{}", tag.name()),
        None => tag.name().to_string(),
    }
}

/// Prefix bound to `uri` in scope at `node`. Unprefixed (default) bindings
/// never apply to attributes.
fn attribute_prefix(node: roxmltree::Node<'_, '_>, uri: &str) -> Option<String> {
    if uri == XML_NS {
        return Some("xml".to_string());
    }
    node.namespaces()
        .filter(|ns| ns.uri() == uri)
        .find_map(|ns| ns.name())
        .map(str::to_string)
}

/// `xmlns` attributes for bindings introduced on this element
fn namespace_declarations(node: roxmltree::Node<'_, '_>) -> Vec<(String, String)> {
    let inherited: Vec<(Option<String>, String)> = node
        .parent_element()
        .map(|parent| {
            parent
                .namespaces()
                .map(|ns| (ns.name().map(str::to_string), ns.uri().to_string()))
                .collect()
        })
        .unwrap_or_default();

    node.namespaces()
        .filter(|ns| ns.uri() != XML_NS)
        .filter(|ns| {
            !inherited
                .iter()
                .any(|(name, uri)| name.as_deref() == ns.name() && uri == ns.uri())
        })
        .map(|ns| match ns.name() {
            Some(prefix) => (format!("xmlns:{prefix}"), ns.uri().to_string()),
            None => ("xmlns".to_string(), ns.uri().to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_SVG: &str = r##"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">
<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" version="1.1" width="612pt" height="792pt" viewBox="0 0 612 792">
<!-- page 1 -->
<defs>
<path id="glyph_a" d="M0 0L10 0"/>
</defs>
<path transform="matrix(1,0,0,1,0,0)" d="M 100 100 L 300 100 L 300 250 Z" fill="#0000ff"/>
<use xlink:href="#glyph_a" x="50" y="60"/>
<text xml:space="preserve">a &amp; b</text>
</svg>
"##;

    #[test]
    fn parse_keeps_namespaces_and_prefixes() {
        let doc = VectorDocument::parse(PAGE_SVG).unwrap();
        let root = doc.root();

        assert_eq!(root.name, "svg");
        assert_eq!(root.attribute("xmlns"), Some("http://www.w3.org/2000/svg"));
        assert_eq!(
            root.attribute("xmlns:xlink"),
            Some("http://www.w3.org/1999/xlink")
        );

        let use_el = root.elements().find(|e| e.name == "use").unwrap();
        assert_eq!(use_el.attribute("xlink:href"), Some("#glyph_a"));
        // Declarations are not repeated on children
        assert!(use_el.attribute("xmlns").is_none());

        let text_el = root.elements().find(|e| e.name == "text").unwrap();
        assert_eq!(text_el.attribute("xml:space"), Some("preserve"));
        assert_eq!(text_el.children, vec![Node::Text("a & b".to_string())]);
    }

    #[test]
    fn comments_are_dropped() {
        let doc = VectorDocument::parse(PAGE_SVG).unwrap();
        assert!(!doc.to_markup().contains("page 1"));
    }

    #[test]
    fn set_frame_replaces_view_box_and_size() {
        let mut doc = VectorDocument::parse(PAGE_SVG).unwrap();
        assert_eq!(doc.frame(), Some("0 0 612 792"));

        doc.set_frame(PointRect::new(100.0 / 1.5, 100.0 / 1.5, 200.0, 100.0));

        assert_eq!(
            doc.frame(),
            Some("66.66666666666667 66.66666666666667 200 100")
        );
        assert_eq!(doc.root().attribute("width"), Some("200pt"));
        assert_eq!(doc.root().attribute("height"), Some("100pt"));
        let view_boxes = doc
            .root()
            .attributes
            .iter()
            .filter(|(k, _)| k == "viewBox")
            .count();
        assert_eq!(view_boxes, 1);
    }

    #[test]
    fn set_frame_adds_missing_attributes() {
        let mut doc =
            VectorDocument::parse(r#"<svg xmlns="http://www.w3.org/2000/svg"><g/></svg>"#).unwrap();
        doc.set_frame(PointRect::new(1.0, 2.0, 3.5, 4.0));
        assert_eq!(doc.frame(), Some("1 2 3.5 4"));
        assert_eq!(doc.root().attribute("width"), Some("3.5pt"));
    }

    #[test]
    fn framing_keeps_full_page_content() {
        let mut doc = VectorDocument::parse(PAGE_SVG).unwrap();
        let before: Vec<String> = doc.root().elements().map(|e| e.name.clone()).collect();
        doc.set_frame(PointRect::new(0.0, 0.0, 10.0, 10.0));
        let after: Vec<String> = doc.root().elements().map(|e| e.name.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn markup_reparses_to_the_same_tree() {
        let doc = VectorDocument::parse(PAGE_SVG).unwrap();
        let markup = doc.to_markup();

        assert!(markup.starts_with(XML_DECLARATION));
        assert_eq!(VectorDocument::parse(&markup).unwrap(), doc);
    }

    #[test]
    fn producer_indentation_survives_serialization() {
        let source = "<svg xmlns=\"http://www.w3.org/2000/svg\">\n    <g>\n        <path d=\"M0 0\"/>\n    </g>\n</svg>";
        let markup = VectorDocument::parse(source).unwrap().to_markup();
        assert!(markup.contains("\n    <g>\n        <path d=\"M0 0\"/>\n    </g>\n</svg>"));
    }

    #[test]
    fn non_svg_root_is_rejected() {
        let err = VectorDocument::parse("<html/>").unwrap_err();
        assert!(matches!(err, MarkupError::NotSvg(name) if name == "html"));
    }

    #[test]
    fn malformed_markup_is_a_parse_error() {
        let err = VectorDocument::parse("<svg><g></svg>").unwrap_err();
        assert!(matches!(err, MarkupError::Parse(_)));
    }
}
