//! Geometry seam.
//!
//! The validator only needs containing blocks, which the default
//! [`StyleLayout`] derives from computed styles. Real box geometry comes
//! from whoever embeds the engine.

use std::collections::HashMap;

use anchor_css::ComputedValues;
use anchor_css::style::{Direction, Position};
use anchor_dom::NodeId;
use serde::{Deserialize, Serialize};

use crate::document::{Document, ElementRef};

/// A border box in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

/// Layout queries the engine needs. Synchronous: callers with asynchronous
/// geometry resolve it before running the engine.
pub trait Layout {
    /// [CSSOM View § 7 offsetParent](https://drafts.csswg.org/cssom-view/#dom-htmlelement-offsetparent):
    /// the element that establishes the containing block of an absolutely
    /// positioned `element`, or `None` for the viewport.
    fn offset_parent(&self, document: &Document, element: NodeId) -> Option<NodeId>;

    /// The nearest ancestor establishing a formatting context, which is the
    /// containing block of an in-flow `element`. `None` for the viewport.
    fn formatting_context_root(&self, document: &Document, element: NodeId) -> Option<NodeId>;

    /// True when `element` lays out right to left.
    fn is_rtl(&self, document: &Document, element: NodeId) -> bool;

    /// The element's border box, if known.
    fn element_rect(&self, document: &Document, element: NodeId) -> Option<Rect>;
}

/// [CSS Display § 2.1 Containing blocks](https://drafts.csswg.org/css-display-3/#containing-block)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainingBlock {
    /// The initial containing block.
    Viewport,
    /// An element's box.
    Element(NodeId),
}

impl ContainingBlock {
    /// True for the viewport and the root element.
    #[must_use]
    pub fn is_root(self, document: &Document) -> bool {
        match self {
            Self::Viewport => true,
            Self::Element(node) => document.is_root(node),
        }
    }
}

/// The containing block of `element`: its offset parent when absolutely
/// positioned, else its formatting context root.
pub fn containing_block(
    layout: &dyn Layout,
    document: &Document,
    element: NodeId,
) -> ContainingBlock {
    let block = if document.is_absolutely_positioned(element) {
        layout.offset_parent(document, element)
    } else {
        layout.formatting_context_root(document, element)
    };
    block.map_or(ContainingBlock::Viewport, ContainingBlock::Element)
}

/// Layout answered from computed styles, with an optional table of boxes.
#[derive(Debug, Clone, Default)]
pub struct StyleLayout {
    rects: HashMap<NodeId, Rect>,
}

impl StyleLayout {
    /// No known boxes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an element's box.
    #[must_use]
    pub fn with_rect(mut self, element: NodeId, rect: Rect) -> Self {
        let _ = self.rects.insert(element, rect);
        self
    }

    fn ancestor_elements<'a>(
        document: &'a Document,
        element: NodeId,
    ) -> impl Iterator<Item = NodeId> + 'a {
        document
            .tree()
            .ancestors(element)
            .filter(|&node| document.tree().as_element(node).is_some())
    }
}

/// [CSS Transforms § 2](https://drafts.csswg.org/css-transforms-1/#containing-block-for-all-descendants),
/// [Filter Effects § 5](https://drafts.fxtf.org/filter-effects/#FilterProperty),
/// [CSS Containment § 3](https://drafts.csswg.org/css-contain-2/#containment-layout):
/// boxes that contain fixed-position descendants too.
fn contains_fixed_descendants(values: &ComputedValues) -> bool {
    let is_set =
        |name: &str| values.get(name).is_some() && values.keyword(name).as_deref() != Some("none");
    is_set("transform")
        || is_set("filter")
        || has_containment(values, &["layout", "paint", "strict", "content"])
}

fn has_containment(values: &ComputedValues, kinds: &[&str]) -> bool {
    values.get("contain").is_some_and(|contain| {
        contain
            .iter()
            .filter_map(|cv| cv.as_ident())
            .any(|ident| kinds.iter().any(|kind| ident.eq_ignore_ascii_case(kind)))
    })
}

/// [CSS Display § 2.4 Block formatting contexts](https://drafts.csswg.org/css-display-3/#establish-an-independent-formatting-context)
fn establishes_formatting_context(values: &ComputedValues) -> bool {
    let overflow_clips = ["overflow", "overflow-x", "overflow-y"].iter().any(|name| {
        values
            .keyword(name)
            .is_some_and(|v| v != "visible" && v != "clip")
    });
    values.display().establishes_formatting_context()
        || values.position().is_absolutely_positioned()
        || values.keyword("float").is_some_and(|v| v != "none")
        || overflow_clips
        || has_containment(values, &["layout", "paint", "strict", "content"])
        || (values.get("column-count").is_some() && values.keyword("column-count").is_none())
}

impl Layout for StyleLayout {
    fn offset_parent(&self, document: &Document, element: NodeId) -> Option<NodeId> {
        let fixed = document.position(element) == Position::Fixed;
        Self::ancestor_elements(document, element).find(|&ancestor| {
            let Some(values) = document.computed(ElementRef::element(ancestor)) else {
                return false;
            };
            contains_fixed_descendants(values) || (!fixed && values.position().is_positioned())
        })
    }

    fn formatting_context_root(&self, document: &Document, element: NodeId) -> Option<NodeId> {
        Self::ancestor_elements(document, element).find(|&ancestor| {
            document.is_root(ancestor)
                || document
                    .computed(ElementRef::element(ancestor))
                    .is_some_and(establishes_formatting_context)
        })
    }

    fn is_rtl(&self, document: &Document, element: NodeId) -> bool {
        document
            .computed(ElementRef::element(element))
            .is_some_and(|values| values.direction() == Direction::Rtl)
    }

    fn element_rect(&self, _document: &Document, element: NodeId) -> Option<Rect> {
        self.rects.get(&element).copied()
    }
}
