//! [§ 2.3 Determining the anchor](https://drafts.csswg.org/css-anchor-position-1/#target)
//!
//! "An element el is an acceptable anchor element for an absolutely
//! positioned element query el if all of the following are true" ...

use std::collections::HashSet;

use anchor_dom::NodeId;

use crate::document::{Document, ElementRef};
use crate::layout::{ContainingBlock, Layout, containing_block};

/// The last containing block on `candidate_block`'s chain before it
/// reaches `target_block` or the viewport.
fn last_block_before(
    layout: &dyn Layout,
    document: &Document,
    candidate_block: ContainingBlock,
    target_block: ContainingBlock,
) -> Option<NodeId> {
    let mut current = candidate_block;
    let mut last = None;
    let mut visited = HashSet::new();
    while let ContainingBlock::Element(node) = current {
        if current == target_block || !visited.insert(node) {
            break;
        }
        last = Some(node);
        current = containing_block(layout, document, node);
    }
    last
}

/// [CSS Contain § 4.2](https://drafts.csswg.org/css-contain-2/#skips-its-contents):
/// "skips its contents" via `content-visibility: hidden` on an ancestor.
fn in_skipped_contents(document: &Document, candidate: NodeId) -> bool {
    document.tree().ancestors(candidate).any(|ancestor| {
        document.computed_keyword(ancestor, "content-visibility").as_deref() == Some("hidden")
    })
}

/// Whether `candidate` may anchor `target`. Both must be concrete elements;
/// pseudo-elements are materialized by [`select_anchor`].
pub fn is_acceptable_anchor(
    document: &Document,
    layout: &dyn Layout,
    candidate: NodeId,
    target: NodeId,
) -> bool {
    // "query el is absolutely positioned"
    if candidate == target || !document.is_absolutely_positioned(target) {
        return false;
    }
    let target_block = containing_block(layout, document, target);
    let candidate_block = containing_block(layout, document, candidate);

    // "Either el is a descendant of query el's containing block, or query
    // el's containing block is the initial containing block."
    let inside = match target_block {
        ContainingBlock::Element(block) if !target_block.is_root(document) => {
            document.tree().is_descendant_of(candidate, block)
        }
        _ => true,
    };
    if !inside {
        log::trace!("{candidate:?} is outside the containing block of {target:?}");
        return false;
    }

    if candidate_block == target_block {
        // "If el has the same containing block as query el, el is not
        // absolutely positioned."
        if document.is_absolutely_positioned(candidate) {
            return false;
        }
    } else if let Some(last) = last_block_before(layout, document, candidate_block, target_block) {
        // "If el has a different containing block from query el, the last
        // containing block in el's containing block chain before reaching
        // query el's containing block is either not absolutely positioned or
        // precedes query el in the tree order."
        if document.is_absolutely_positioned(last) && !document.precedes(last, target) {
            return false;
        }
    }

    !in_skipped_contents(document, candidate)
}

/// Pick the anchor for `target` among `candidates`: the last acceptable one
/// in tree order. Pseudo-elements get transient stand-ins while they are
/// checked.
pub fn select_anchor(
    document: &mut Document,
    layout: &dyn Layout,
    target: ElementRef,
    candidates: &[ElementRef],
) -> Option<ElementRef> {
    if candidates.is_empty() {
        return None;
    }
    let target_node = document.materialize_pseudo(target);
    let mut seen = HashSet::new();
    let mut materialized: Vec<(ElementRef, NodeId)> = Vec::new();
    for &candidate in candidates {
        if candidate != target && seen.insert(candidate) {
            materialized.push((candidate, document.materialize_pseudo(candidate)));
        }
    }
    materialized.sort_by(|(_, a), (_, b)| document.tree().tree_order(*a, *b));

    let found = materialized
        .iter()
        .rev()
        .find(|(_, node)| is_acceptable_anchor(document, layout, *node, target_node))
        .map(|(candidate, _)| *candidate);

    for (_, node) in materialized {
        document.discard_pseudo(node);
    }
    document.discard_pseudo(target_node);
    found
}
