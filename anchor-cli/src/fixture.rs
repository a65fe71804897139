//! JSON fixtures: a document, its stylesheets and known element boxes.

use std::collections::BTreeMap;
use std::path::Path;

use anchor_dom::{DomTree, ElementData, NodeId, NodeType};
use anchor_position::{Document, PolyfillOptions, Rect, StyleLayout};
use anyhow::Context;
use serde::Deserialize;

/// One node: an element with `tag`, or a text node with `text`.
#[derive(Debug, Deserialize)]
pub struct NodeFixture {
    pub tag: Option<String>,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    pub text: Option<String>,
    #[serde(default)]
    pub children: Vec<NodeFixture>,
}

/// ```json
/// {
///   "document": { "tag": "html", "children": [ ... ] },
///   "linked": { "main.css": "#btn { anchor-name: --btn }" },
///   "stylesheets": ["#popup { top: anchor(--btn bottom) }"],
///   "options": { "roundAnchorPositions": true },
///   "rects": { "btn": { "x": 0, "y": 0, "width": 80, "height": 20 } }
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub document: NodeFixture,
    /// `<link href>` → stylesheet text.
    #[serde(default)]
    pub linked: BTreeMap<String, String>,
    /// Extra stylesheets, applied after the document's own.
    #[serde(default)]
    pub stylesheets: Vec<String>,
    #[serde(default)]
    pub options: PolyfillOptions,
    /// Element `id` → border box.
    #[serde(default)]
    pub rects: BTreeMap<String, Rect>,
}

impl Fixture {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("invalid fixture {}", path.display()))
    }

    pub fn build_document(&self) -> anyhow::Result<Document> {
        let mut tree = DomTree::new();
        append_node(&mut tree, NodeId::ROOT, &self.document)?;
        Ok(Document::new(tree))
    }

    pub fn layout(&self, document: &Document) -> StyleLayout {
        self.rects
            .iter()
            .fold(StyleLayout::new(), |layout, (id, rect)| {
                match document.element_by_id(id) {
                    Some(element) => layout.with_rect(element, *rect),
                    None => {
                        log::warn!("no element with id {id:?} for its rect");
                        layout
                    }
                }
            })
    }
}

fn append_node(tree: &mut DomTree, parent: NodeId, node: &NodeFixture) -> anyhow::Result<()> {
    match (&node.tag, &node.text) {
        (Some(tag), _) => {
            let data = node
                .attrs
                .iter()
                .fold(ElementData::new(tag), |data, (name, value)| data.with_attr(name, value));
            let element = tree.append_element(parent, data);
            for child in &node.children {
                append_node(tree, element, child)?;
            }
        }
        (None, Some(text)) => {
            let id = tree.alloc(NodeType::Text(text.clone()));
            tree.append_child(parent, id);
        }
        (None, None) => anyhow::bail!("fixture node has neither `tag` nor `text`"),
    }
    Ok(())
}
