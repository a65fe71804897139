//! Tests for DOM tree mutation and ordering: `remove_child`, `insert_before`,
//! attributes, and tree order.

use std::cmp::Ordering;

use anchor_dom::{DomTree, ElementData, NodeId};

/// Helper to create an element node attached to `parent`.
fn element(tree: &mut DomTree, parent: NodeId, tag: &str) -> NodeId {
    tree.append_element(parent, ElementData::new(tag))
}

// ========== remove_child ==========

#[test]
fn test_remove_child_single_child() {
    let mut tree = DomTree::new();
    let parent = element(&mut tree, NodeId::ROOT, "div");
    let child = element(&mut tree, parent, "p");

    tree.remove_child(parent, child);

    assert!(tree.children(parent).is_empty());
    assert_eq!(tree.parent(child), None);
    assert_eq!(tree.prev_sibling(child), None);
    assert_eq!(tree.next_sibling(child), None);
}

#[test]
fn test_remove_child_middle_of_three() {
    let mut tree = DomTree::new();
    let parent = element(&mut tree, NodeId::ROOT, "div");
    let a = element(&mut tree, parent, "a");
    let b = element(&mut tree, parent, "b");
    let c = element(&mut tree, parent, "c");

    tree.remove_child(parent, b);

    assert_eq!(tree.children(parent), &[a, c]);
    assert_eq!(tree.next_sibling(a), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(a));
}

#[test]
fn test_remove_child_not_a_child_is_noop() {
    let mut tree = DomTree::new();
    let parent = element(&mut tree, NodeId::ROOT, "div");
    let other = element(&mut tree, NodeId::ROOT, "div");
    let child = element(&mut tree, other, "p");

    tree.remove_child(parent, child);

    assert_eq!(tree.parent(child), Some(other));
}

// ========== insert_before ==========

#[test]
fn test_insert_before_first_child() {
    let mut tree = DomTree::new();
    let parent = element(&mut tree, NodeId::ROOT, "div");
    let existing = element(&mut tree, parent, "b");

    let new_child = tree.alloc(anchor_dom::NodeType::Element(ElementData::new("a")));
    tree.insert_before(parent, new_child, existing);

    assert_eq!(tree.children(parent), &[new_child, existing]);
    assert_eq!(tree.parent(new_child), Some(parent));
    assert_eq!(tree.next_sibling(new_child), Some(existing));
    assert_eq!(tree.prev_sibling(new_child), None);
    assert_eq!(tree.prev_sibling(existing), Some(new_child));
}

#[test]
fn test_insert_before_middle() {
    let mut tree = DomTree::new();
    let parent = element(&mut tree, NodeId::ROOT, "div");
    let a = element(&mut tree, parent, "a");
    let c = element(&mut tree, parent, "c");

    let b = tree.alloc(anchor_dom::NodeType::Element(ElementData::new("b")));
    tree.insert_before(parent, b, c);

    assert_eq!(tree.children(parent), &[a, b, c]);
    assert_eq!(tree.next_sibling(a), Some(b));
    assert_eq!(tree.prev_sibling(b), Some(a));
    assert_eq!(tree.next_sibling(b), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(b));
}

#[test]
fn test_insert_then_remove_restores_links() {
    let mut tree = DomTree::new();
    let parent = element(&mut tree, NodeId::ROOT, "div");
    let a = element(&mut tree, parent, "a");
    let b = element(&mut tree, parent, "b");

    let transient = tree.alloc(anchor_dom::NodeType::Element(ElementData::new("span")));
    tree.insert_before(parent, transient, a);
    tree.remove_child(parent, transient);

    assert_eq!(tree.children(parent), &[a, b]);
    assert_eq!(tree.prev_sibling(a), None);
    assert_eq!(tree.next_sibling(a), Some(b));
}

// ========== attributes ==========

#[test]
fn test_set_and_remove_attribute() {
    let mut tree = DomTree::new();
    let div = element(&mut tree, NodeId::ROOT, "div");

    assert_eq!(tree.set_attribute(div, "data-x", "1"), None);
    assert_eq!(tree.set_attribute(div, "data-x", "2").as_deref(), Some("1"));
    assert_eq!(tree.attribute(div, "data-x"), Some("2"));
    assert_eq!(tree.remove_attribute(div, "data-x").as_deref(), Some("2"));
    assert_eq!(tree.attribute(div, "data-x"), None);
}

#[test]
fn test_id_and_classes() {
    let data = ElementData::new("DIV")
        .with_attr("id", "btn")
        .with_attr("class", "a  b");
    assert_eq!(data.tag_name, "div");
    assert_eq!(data.id(), Some("btn"));
    assert!(data.classes().contains("a"));
    assert!(data.classes().contains("b"));
    assert_eq!(data.classes().len(), 2);
}

// ========== tree order ==========

#[test]
fn test_tree_order_siblings_and_ancestors() {
    let mut tree = DomTree::new();
    let body = element(&mut tree, NodeId::ROOT, "body");
    let first = element(&mut tree, body, "div");
    let nested = element(&mut tree, first, "span");
    let second = element(&mut tree, body, "div");

    assert!(tree.precedes(first, second));
    assert!(tree.precedes(nested, second));
    assert!(tree.precedes(body, nested));
    assert!(!tree.precedes(second, nested));
    assert_eq!(tree.tree_order(first, first), Ordering::Equal);
}

#[test]
fn test_descendant_elements_preorder() {
    let mut tree = DomTree::new();
    let body = element(&mut tree, NodeId::ROOT, "body");
    let a = element(&mut tree, body, "a");
    let a1 = element(&mut tree, a, "i");
    let b = element(&mut tree, body, "b");

    assert_eq!(tree.descendant_elements(NodeId::ROOT), vec![body, a, a1, b]);
    assert!(tree.is_descendant_of(a1, body));
    assert!(!tree.is_descendant_of(b, a));
}
