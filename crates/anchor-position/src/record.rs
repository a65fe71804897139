//! Style records: one stylesheet's text, where it came from, and whether
//! the engine rewrote it.

use std::collections::BTreeMap;

use anchor_common::warning::warn_once;
use anchor_css::{ParseError, Stylesheet};
use anchor_dom::{NodeId, NodeType};
use serde::Serialize;

use crate::document::Document;
use crate::ids::IdGenerator;

/// Attribute tying an element to the record holding its inline styles.
pub const INLINE_STYLES_ATTRIBUTE: &str = "data-has-inline-styles";

/// Where a record's CSS came from, and where an apply step writes it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum StyleSource {
    /// A `<link rel="stylesheet">`.
    Link {
        /// The link's `href`.
        href: String,
    },
    /// An element's `style` attribute.
    Inline {
        /// The element.
        element: NodeId,
    },
    /// A `<style>` element.
    Element {
        /// The `<style>` element.
        element: NodeId,
    },
    /// A stylesheet generated by the engine.
    Created {
        /// Generated id.
        id: String,
    },
}

/// One stylesheet being polyfilled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleRecord {
    /// Origin.
    pub source: StyleSource,
    /// Current CSS text.
    pub css: String,
    /// True once the engine rewrote `css`.
    pub changed: bool,
    /// True for records the engine generated.
    pub created: bool,
}

impl StyleRecord {
    /// An authored record.
    #[must_use]
    pub fn new(source: StyleSource, css: impl Into<String>) -> Self {
        Self {
            source,
            css: css.into(),
            changed: false,
            created: false,
        }
    }

    /// A record the engine generated.
    #[must_use]
    pub fn created(id: impl Into<String>, css: impl Into<String>) -> Self {
        Self {
            source: StyleSource::Created { id: id.into() },
            css: css.into(),
            changed: true,
            created: true,
        }
    }

    /// Wrap an element's `style` attribute in a rule selecting that element
    /// through [`INLINE_STYLES_ATTRIBUTE`], which is set on the element.
    pub fn from_inline_style(
        document: &mut Document,
        element: NodeId,
        ids: &mut dyn IdGenerator,
    ) -> Option<Self> {
        let style = document.attribute(element, "style")?.to_string();
        let id = ids.next_id("--anchor-inline");
        document.set_attribute(element, INLINE_STYLES_ATTRIBUTE, &id);
        Some(Self::new(
            StyleSource::Inline { element },
            format!("[{INLINE_STYLES_ATTRIBUTE}=\"{id}\"]{{{style}}}"),
        ))
    }

    /// Human-readable origin for diagnostics.
    #[must_use]
    pub fn origin(&self) -> String {
        match &self.source {
            StyleSource::Link { href } => format!("<link href={href:?}>"),
            StyleSource::Inline { element } => format!("style attribute of node {}", element.0),
            StyleSource::Element { element } => format!("<style> node {}", element.0),
            StyleSource::Created { id } => format!("generated stylesheet {id}"),
        }
    }

    /// Strict parse of the current CSS.
    ///
    /// # Errors
    ///
    /// Returns the first recovered parse error.
    pub fn parse(&self) -> Result<Stylesheet, ParseError> {
        anchor_css::parse_stylesheet(&self.css)
    }

    /// Replace the CSS text, marking the record changed when it differs.
    pub fn replace_css(&mut self, css: String) {
        if css != self.css {
            self.css = css;
            self.changed = true;
        }
    }
}

/// Gather every record of a document in tree order: `<style>` elements,
/// `<link rel=stylesheet>` elements whose text is in `linked` (keyed by
/// href), and, unless excluded, `style` attributes.
pub fn collect_style_records(
    document: &mut Document,
    linked: &BTreeMap<String, String>,
    include_inline_styles: bool,
    ids: &mut dyn IdGenerator,
) -> Vec<StyleRecord> {
    let mut records = Vec::new();
    for element in document.tree().descendant_elements(NodeId::ROOT) {
        let Some(data) = document.tree().as_element(element) else {
            continue;
        };
        match data.tag_name.as_str() {
            "style" => {
                let css: String = document
                    .tree()
                    .children(element)
                    .iter()
                    .filter_map(|&child| match &document.tree().get(child)?.node_type {
                        NodeType::Text(text) => Some(text.as_str()),
                        _ => None,
                    })
                    .collect();
                records.push(StyleRecord::new(StyleSource::Element { element }, css));
            }
            "link" if data.attrs.get("rel").is_some_and(|rel| rel.eq_ignore_ascii_case("stylesheet")) => {
                let Some(href) = data.attrs.get("href") else {
                    continue;
                };
                match linked.get(href) {
                    Some(css) => records.push(StyleRecord::new(
                        StyleSource::Link { href: href.clone() },
                        css.clone(),
                    )),
                    None => {
                        let _ = warn_once("Records", &format!("no stylesheet text for {href:?}"));
                    }
                }
            }
            _ => {}
        }
        if include_inline_styles
            && let Some(record) = StyleRecord::from_inline_style(document, element, ids)
        {
            records.push(record);
        }
    }
    log::debug!("collected {} style records", records.len());
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use anchor_dom::{DomTree, ElementData};

    #[test]
    fn test_inline_style_is_wrapped_in_attribute_rule() {
        let mut tree = DomTree::new();
        let el = tree.append_element(
            NodeId::ROOT,
            ElementData::new("div").with_attr("style", "top: anchor(--a bottom)"),
        );
        let mut doc = Document::new(tree);
        let record = StyleRecord::from_inline_style(&mut doc, el, &mut SequentialIds::new());
        let record = record.expect("style attribute");
        assert_eq!(
            record.css,
            "[data-has-inline-styles=\"--anchor-inline-1\"]{top: anchor(--a bottom)}"
        );
        assert_eq!(doc.attribute(el, INLINE_STYLES_ATTRIBUTE), Some("--anchor-inline-1"));
    }

    #[test]
    fn test_collect_reads_style_elements_and_links() {
        let mut tree = DomTree::new();
        let head = tree.append_element(NodeId::ROOT, ElementData::new("head"));
        let style = tree.append_element(head, ElementData::new("style"));
        let text = tree.alloc(NodeType::Text("#a{anchor-name:--a}".to_string()));
        tree.append_child(style, text);
        let _ = tree.append_element(
            head,
            ElementData::new("link").with_attr("rel", "stylesheet").with_attr("href", "a.css"),
        );
        let mut doc = Document::new(tree);
        let linked = BTreeMap::from([("a.css".to_string(), "#b{top:0}".to_string())]);
        let records = collect_style_records(&mut doc, &linked, true, &mut SequentialIds::new());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].source, StyleSource::Element { element: style });
        assert_eq!(records[1].css, "#b{top:0}");
        assert!(records.iter().all(|r| !r.changed && !r.created));
    }

    #[test]
    fn test_replace_css_only_marks_real_changes() {
        let mut record = StyleRecord::new(StyleSource::Link { href: "x".into() }, "a{b:c}");
        record.replace_css("a{b:c}".to_string());
        assert!(!record.changed);
        record.replace_css("a{b:d}".to_string());
        assert!(record.changed);
    }
}
