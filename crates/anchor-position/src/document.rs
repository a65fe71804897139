//! The document the engine queries: a DOM tree plus the computed styles of
//! the stylesheets being polyfilled.

use std::collections::BTreeMap;

use anchor_common::warning::warn_once;
use anchor_css::style::Position;
use anchor_css::{ComputedStyles, ComputedValues, PseudoElement, Selector, Stylesheet};
use anchor_dom::{DomTree, ElementData, NodeId, NodeType};
use serde::Serialize;

/// Tag name of the transient elements standing in for pseudo-elements.
const PSEUDO_STAND_IN_TAG: &str = "anchor-polyfill-pseudo";

/// An element, or one of its `::before`/`::after` boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ElementRef {
    /// The element, or the originating element of the pseudo-element.
    pub element: NodeId,
    /// The pseudo-element, if this refers to one.
    pub pseudo_element: Option<PseudoElement>,
}

impl ElementRef {
    /// A plain element.
    #[must_use]
    pub const fn element(element: NodeId) -> Self {
        Self {
            element,
            pseudo_element: None,
        }
    }

    /// A pseudo-element of `element`.
    #[must_use]
    pub const fn pseudo(element: NodeId, pseudo_element: PseudoElement) -> Self {
        Self {
            element,
            pseudo_element: Some(pseudo_element),
        }
    }
}

/// A DOM tree with computed styles.
#[derive(Debug, Clone, Default)]
pub struct Document {
    tree: DomTree,
    styles: ComputedStyles,
    /// Detached stand-ins, reused so the arena does not grow per query.
    stand_ins: BTreeMap<ElementRef, NodeId>,
}

impl Document {
    /// Wrap a tree. Styles are empty until [`Document::restyle`] runs.
    #[must_use]
    pub fn new(tree: DomTree) -> Self {
        Self {
            tree,
            styles: ComputedStyles::default(),
            stand_ins: BTreeMap::new(),
        }
    }

    /// The underlying tree.
    #[must_use]
    pub const fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Recompute styles from author stylesheets in document order.
    pub fn restyle(&mut self, sheets: &[&Stylesheet]) {
        self.styles = anchor_css::compute_styles(&self.tree, sheets);
        log::debug!("restyled {} elements", self.styles.len());
    }

    /// Computed values of an element or pseudo-element.
    #[must_use]
    pub fn computed(&self, target: ElementRef) -> Option<&ComputedValues> {
        match target.pseudo_element {
            None => self.styles.get(target.element),
            Some(pseudo) => self.styles.pseudo(target.element, pseudo),
        }
    }

    /// Computed value of `property` on an element, as trimmed text.
    #[must_use]
    pub fn computed_text(&self, element: NodeId, property: &str) -> Option<String> {
        self.styles.get(element)?.text(property)
    }

    /// Computed value of `property` on an element, when it is one keyword.
    #[must_use]
    pub fn computed_keyword(&self, element: NodeId, property: &str) -> Option<String> {
        self.styles.get(element)?.keyword(property)
    }

    /// Computed `position`, `static` when unstyled.
    #[must_use]
    pub fn position(&self, element: NodeId) -> Position {
        self.styles
            .get(element)
            .map(ComputedValues::position)
            .unwrap_or_default()
    }

    /// True for `position: absolute` and `position: fixed`.
    #[must_use]
    pub fn is_absolutely_positioned(&self, element: NodeId) -> bool {
        self.position(element).is_absolutely_positioned()
    }

    /// [DOM § 4.2.2 Document position](https://dom.spec.whatwg.org/#dom-node-comparedocumentposition):
    /// true when `a` precedes `b` in tree order.
    #[must_use]
    pub fn precedes(&self, a: NodeId, b: NodeId) -> bool {
        self.tree.precedes(a, b)
    }

    /// The root element or the document node itself.
    #[must_use]
    pub fn is_root(&self, node: NodeId) -> bool {
        node == NodeId::ROOT || self.tree.document_element() == Some(node)
    }

    /// An attribute of an element.
    #[must_use]
    pub fn attribute(&self, element: NodeId, name: &str) -> Option<&str> {
        self.tree.attribute(element, name)
    }

    /// Set an attribute on an element.
    pub fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) {
        let _ = self.tree.set_attribute(element, name, value);
    }

    /// The first element whose `id` attribute is `id`.
    #[must_use]
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree
            .descendant_elements(NodeId::ROOT)
            .into_iter()
            .find(|&el| self.tree.attribute(el, "id") == Some(id))
    }

    /// [DOM § 4.2.6 querySelectorAll](https://dom.spec.whatwg.org/#dom-parentnode-queryselectorall)
    ///
    /// Elements matching the selector's element part, in tree order, each
    /// carrying the selector's pseudo-element.
    #[must_use]
    pub fn query_selector_all(&self, selector: &Selector) -> Vec<ElementRef> {
        let Some(parsed) = anchor_css::parse_selector(&selector.element_part) else {
            let _ = warn_once("Selectors", &format!("unsupported selector {:?}", selector.text));
            return Vec::new();
        };
        self.tree
            .descendant_elements(NodeId::ROOT)
            .into_iter()
            .filter(|&el| parsed.matches_in_tree(&self.tree, el))
            .map(|element| ElementRef {
                element,
                pseudo_element: selector.pseudo_element,
            })
            .collect()
    }

    /// Insert a transient element standing in for a pseudo-element, carrying
    /// its computed style, so containing-block queries see a concrete box.
    /// Each pseudo-element keeps one stand-in slot across calls. Plain
    /// element refs are returned as-is.
    pub fn materialize_pseudo(&mut self, target: ElementRef) -> NodeId {
        let Some(pseudo) = target.pseudo_element else {
            return target.element;
        };
        let values = self
            .styles
            .pseudo(target.element, pseudo)
            .cloned()
            .unwrap_or_default();
        let stand_in = match self.stand_ins.get(&target) {
            Some(&existing) if self.tree.parent(existing).is_some() => return existing,
            Some(&existing) => existing,
            None => {
                let created = self
                    .tree
                    .alloc(NodeType::Element(ElementData::new(PSEUDO_STAND_IN_TAG)));
                let _ = self.stand_ins.insert(target, created);
                created
            }
        };
        match (pseudo, self.tree.first_child(target.element)) {
            (PseudoElement::Before, Some(first)) => {
                self.tree.insert_before(target.element, stand_in, first);
            }
            _ => self.tree.append_child(target.element, stand_in),
        }
        self.styles.insert(stand_in, values);
        log::trace!("materialized {} of {:?}", pseudo.as_str(), target.element);
        stand_in
    }

    /// Remove a stand-in created by [`Document::materialize_pseudo`].
    /// Plain elements are left alone.
    pub fn discard_pseudo(&mut self, stand_in: NodeId) {
        let is_stand_in = self
            .tree
            .as_element(stand_in)
            .is_some_and(|data| data.tag_name == PSEUDO_STAND_IN_TAG);
        if !is_stand_in {
            return;
        }
        if let Some(parent) = self.tree.parent(stand_in) {
            self.tree.remove_child(parent, stand_in);
        }
        let _ = self.styles.remove(stand_in);
    }

    /// A short label such as `div#btn.primary::before`.
    #[must_use]
    pub fn describe(&self, target: ElementRef) -> String {
        let mut label = String::new();
        if let Some(data) = self.tree.as_element(target.element) {
            label.push_str(&data.tag_name);
            if let Some(id) = data.id() {
                label.push('#');
                label.push_str(id);
            }
            let mut classes: Vec<&str> = data.classes().into_iter().collect();
            classes.sort_unstable();
            for class in classes {
                label.push('.');
                label.push_str(class);
            }
        } else {
            label = format!("{:?}", target.element);
        }
        if let Some(pseudo) = target.pseudo_element {
            label.push_str(pseudo.as_str());
        }
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> (Document, NodeId) {
        let mut tree = DomTree::new();
        let html = tree.append_element(NodeId::ROOT, ElementData::new("html"));
        let body = tree.append_element(html, ElementData::new("body"));
        let btn = tree.append_element(body, ElementData::new("button").with_attr("id", "btn"));
        let _ = tree.append_element(btn, ElementData::new("span"));
        (Document::new(tree), btn)
    }

    #[test]
    fn test_query_selector_all_keeps_pseudo_element() {
        let (doc, btn) = document();
        let found = doc.query_selector_all(&Selector::new("#btn::before"));
        assert_eq!(found, vec![ElementRef::pseudo(btn, PseudoElement::Before)]);
        assert_eq!(doc.describe(found[0]), "button#btn::before");
    }

    #[test]
    fn test_pseudo_stand_in_is_inserted_and_removed() {
        let (mut doc, btn) = document();
        let children = doc.tree().children(btn).len();
        let stand_in = doc.materialize_pseudo(ElementRef::pseudo(btn, PseudoElement::Before));
        assert_eq!(doc.tree().first_child(btn), Some(stand_in));
        assert!(doc.precedes(stand_in, doc.tree().children(btn)[1]));
        doc.discard_pseudo(stand_in);
        assert_eq!(doc.tree().children(btn).len(), children);
    }

    #[test]
    fn test_pseudo_stand_in_slot_is_reused() {
        let (mut doc, btn) = document();
        let after = ElementRef::pseudo(btn, PseudoElement::After);
        let first = doc.materialize_pseudo(after);
        doc.discard_pseudo(first);
        let nodes = doc.tree().len();
        for _ in 0..3 {
            let again = doc.materialize_pseudo(after);
            assert_eq!(again, first);
            assert_eq!(doc.tree().children(btn).last(), Some(&again));
            doc.discard_pseudo(again);
        }
        assert_eq!(doc.tree().len(), nodes);

        let before = doc.materialize_pseudo(ElementRef::pseudo(btn, PseudoElement::Before));
        assert_ne!(before, first);
        doc.discard_pseudo(before);
    }

    #[test]
    fn test_discard_ignores_plain_elements() {
        let (mut doc, btn) = document();
        let same = doc.materialize_pseudo(ElementRef::element(btn));
        assert_eq!(same, btn);
        doc.discard_pseudo(btn);
        assert_eq!(doc.element_by_id("btn"), Some(btn));
    }
}
