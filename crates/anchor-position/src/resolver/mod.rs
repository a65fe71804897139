//! Anchor and `position-area` resolution.
//!
//! Five passes over every record:
//!
//! 1. collect anchor names, scopes and `position-area`s, and replace each
//!    `anchor()`/`anchor-size()` with a reference to its descriptor;
//! 2. trace custom properties assigned from anchor-carrying ones;
//! 3. point concrete properties at per-property shadows of those custom
//!    properties;
//! 4. emit the shadows and restore the authored custom property values;
//! 5. find the target elements and validate their anchors.

mod anchor_fn;
mod chains;

use std::collections::{BTreeMap, HashSet};

use anchor_common::warning::warn_once;
use anchor_css::{Selector, Stylesheet};
use anchor_dom::NodeId;
use serde::{Serialize, Serializer};

pub use anchor_fn::{AnchorFunction, AnchorFunctionKind, DEFAULT_FALLBACK, rewrite_anchor_functions};

use crate::context::{ALL_ANCHOR_NAMES, ChainTrace, ResolverContext};
use crate::document::{Document, ElementRef};
use crate::error::PolyfillError;
use crate::fallback::{TryBlock, TryOrder};
use crate::ids::IdGenerator;
use crate::layout::Layout;
use crate::position_area::{PositionAreaDescriptor, WRAPPER_ATTRIBUTE, wrapper_rule};
use crate::record::StyleRecord;
use crate::syntax::is_dashed_ident;
use crate::validator::select_anchor;

/// One resolved use of an anchor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ResolvedDeclaration {
    /// An `anchor()`/`anchor-size()` call.
    Anchor {
        /// The call.
        descriptor: AnchorFunction,
        /// The validated anchor; `None` means the fallback applies.
        anchor_el: Option<ElementRef>,
        /// The positioned element.
        target_el: ElementRef,
        /// Per-element custom property carrying the computed value.
        uuid: String,
    },
    /// A `position-area` declaration.
    PositionArea {
        /// The mapped area.
        descriptor: PositionAreaDescriptor,
        /// The validated anchor, if any.
        anchor_el: Option<ElementRef>,
        /// The positioned element.
        target_el: ElementRef,
        /// Value of the wrapper attribute set on the target.
        wrapper_id: String,
    },
}

impl ResolvedDeclaration {
    /// The validated anchor.
    #[must_use]
    pub const fn anchor_el(&self) -> Option<ElementRef> {
        match self {
            Self::Anchor { anchor_el, .. } | Self::PositionArea { anchor_el, .. } => *anchor_el,
        }
    }

    /// The positioned element.
    #[must_use]
    pub const fn target_el(&self) -> ElementRef {
        match self {
            Self::Anchor { target_el, .. } | Self::PositionArea { target_el, .. } => *target_el,
        }
    }
}

/// Everything resolved for one target selector.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TargetPositions {
    /// Property → resolved uses, in discovery order.
    pub declarations: BTreeMap<String, Vec<ResolvedDeclaration>>,
    /// Position fallbacks.
    pub fallbacks: Vec<TryBlock>,
    /// `position-try-order`.
    pub order: Option<TryOrder>,
}

/// Target selector text → what was resolved for it.
pub type ResolvedPositions = BTreeMap<String, TargetPositions>;

/// The outcome of one resolution.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Resolution {
    /// Resolved uses per target selector.
    pub positions: ResolvedPositions,
    /// Element → descriptor id → per-element custom property, to be set
    /// inline as `<descriptor id>: var(<per-element id>)`.
    pub inline_styles: BTreeMap<NodeId, BTreeMap<String, String>>,
    /// How custom property chains were traced.
    pub chain_traces: Vec<ChainTrace>,
    /// Records that could not be processed. Serialized as messages.
    #[serde(serialize_with = "serialize_errors")]
    pub errors: Vec<PolyfillError>,
    /// True when any record was rewritten or created.
    pub changed: bool,
}

fn serialize_errors<S: Serializer>(errors: &[PolyfillError], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(errors.iter().map(ToString::to_string))
}

/// A record's parsed sheet while the passes run.
pub(crate) struct ParsedSheet {
    record: usize,
    sheet: Stylesheet,
    changed: bool,
}

/// Resolve every record against `document`.
pub fn resolve(
    records: &mut Vec<StyleRecord>,
    document: &mut Document,
    layout: &dyn Layout,
    ids: &mut dyn IdGenerator,
) -> Resolution {
    resolve_with_fallbacks(records, document, layout, ids, BTreeMap::new())
}

/// [`resolve`], attributing anchors found in generated try-block rules
/// (`try_selectors`: generated selector text → target selector) to their
/// targets.
pub fn resolve_with_fallbacks(
    records: &mut Vec<StyleRecord>,
    document: &mut Document,
    layout: &dyn Layout,
    ids: &mut dyn IdGenerator,
    try_selectors: BTreeMap<String, Selector>,
) -> Resolution {
    let mut cx = ResolverContext::new(ids, try_selectors);
    let mut sheets = Vec::new();
    for (index, record) in records.iter().enumerate() {
        match record.parse() {
            Ok(sheet) => sheets.push(ParsedSheet {
                record: index,
                sheet,
                changed: false,
            }),
            Err(error) => {
                let origin = record.origin();
                let _ = warn_once("Resolver", &format!("skipping {origin}: {error}"));
                cx.errors.push(PolyfillError::Parse { origin, error });
            }
        }
    }

    anchor_fn::collect_declarations(&mut cx, &mut sheets);
    chains::trace_chains(&mut cx, &mut sheets);
    chains::resolve_use_sites(&mut cx, &mut sheets);
    chains::restore_custom_properties(&mut cx, &mut sheets);

    let mut changed = false;
    for parsed in &sheets {
        if parsed.changed {
            records[parsed.record].replace_css(parsed.sheet.to_string());
            changed = true;
        }
    }

    let styled: Vec<&Stylesheet> = sheets.iter().map(|parsed| &parsed.sheet).collect();
    document.restyle(&styled);

    let mut targets = TargetResolver {
        cx: &mut cx,
        document,
        layout,
        resolution: Resolution::default(),
        wrapper_css: String::new(),
    };
    targets.resolve_anchor_functions();
    targets.resolve_position_areas();
    let TargetResolver {
        mut resolution,
        wrapper_css,
        ..
    } = targets;

    if !wrapper_css.is_empty() {
        records.push(StyleRecord::created(cx.next_id("--anchor-wrappers"), wrapper_css));
        changed = true;
    }
    resolution.chain_traces = cx.traces;
    resolution.errors = cx.errors;
    resolution.changed = changed;
    log::debug!(
        "resolved {} targets, changed: {}",
        resolution.positions.len(),
        resolution.changed
    );
    resolution
}

/// Where the anchor name of one use comes from.
enum AnchorSource {
    Name(String),
    Implicit(NodeId),
}

/// Pass 5.
struct TargetResolver<'c, 'a, 'd> {
    cx: &'c mut ResolverContext<'a>,
    document: &'d mut Document,
    layout: &'d dyn Layout,
    resolution: Resolution,
    wrapper_css: String,
}

impl TargetResolver<'_, '_, '_> {
    /// The target selector a rule's selector stands for: itself, or the
    /// target of the try block it was generated for.
    fn base_selector(&self, selector: &Selector) -> Selector {
        self.cx
            .try_selectors
            .get(&selector.text)
            .cloned()
            .unwrap_or_else(|| selector.clone())
    }

    /// The effective anchor: the explicit name, then `position-anchor`,
    /// then the implicit `anchor` attribute, then the custom property the
    /// call reads.
    fn anchor_source(
        &self,
        target: ElementRef,
        anchor_name: Option<&str>,
        custom_prop_name: Option<&str>,
    ) -> Option<AnchorSource> {
        if let Some(name) = anchor_name {
            return Some(AnchorSource::Name(name.to_string()));
        }
        let computed = self.document.computed(target);
        if let Some(name) = computed
            .and_then(|values| values.text("position-anchor"))
            .filter(|name| is_dashed_ident(name))
        {
            return Some(AnchorSource::Name(name));
        }
        if let Some(element) = self
            .document
            .attribute(target.element, "anchor")
            .and_then(|id| self.document.element_by_id(id))
        {
            return Some(AnchorSource::Implicit(element));
        }
        custom_prop_name
            .and_then(|custom| computed?.text(custom))
            .filter(|name| is_dashed_ident(name))
            .map(AnchorSource::Name)
    }

    /// The nearest ancestor-or-self of `element` scoping `name`.
    fn scope_of(&self, name: &str, element: NodeId) -> Option<NodeId> {
        let scopes: HashSet<NodeId> = [name, ALL_ANCHOR_NAMES]
            .iter()
            .filter_map(|key| self.cx.anchor_scopes.get(*key))
            .flatten()
            .flat_map(|selector| self.document.query_selector_all(selector))
            .map(|scope| scope.element)
            .collect();
        if scopes.is_empty() {
            return None;
        }
        std::iter::once(element)
            .chain(self.document.tree().ancestors(element))
            .find(|node| scopes.contains(node))
    }

    /// Elements declaring `name` that `target` can see.
    fn candidates(&self, name: &str, target: ElementRef) -> Vec<ElementRef> {
        let Some(selectors) = self.cx.anchor_names.get(name) else {
            return Vec::new();
        };
        selectors
            .iter()
            .flat_map(|selector| self.document.query_selector_all(selector))
            .filter(|candidate| {
                self.scope_of(name, candidate.element).is_none_or(|scope| {
                    scope == target.element
                        || self.document.tree().is_descendant_of(target.element, scope)
                })
            })
            .collect()
    }

    fn find_anchor(
        &mut self,
        target: ElementRef,
        anchor_name: Option<&str>,
        custom_prop_name: Option<&str>,
    ) -> Option<ElementRef> {
        let candidates = match self.anchor_source(target, anchor_name, custom_prop_name)? {
            AnchorSource::Name(name) => self.candidates(&name, target),
            AnchorSource::Implicit(element) => vec![ElementRef::element(element)],
        };
        select_anchor(self.document, self.layout, target, &candidates)
    }

    fn push(&mut self, selector: &Selector, property: &str, declaration: ResolvedDeclaration) {
        self.resolution
            .positions
            .entry(selector.text.clone())
            .or_default()
            .declarations
            .entry(property.to_string())
            .or_default()
            .push(declaration);
    }

    fn resolve_anchor_functions(&mut self) {
        let uses = std::mem::take(&mut self.cx.anchor_functions);
        for (selector, properties) in &uses {
            let base = self.base_selector(selector);
            for target in self.document.query_selector_all(&base) {
                for (property, functions) in properties {
                    for function in functions {
                        let anchor_el = self.find_anchor(
                            target,
                            function.anchor_name.as_deref(),
                            function.custom_prop_name.as_deref(),
                        );
                        let uuid = self.cx.next_id("--anchor-el");
                        let _ = self
                            .resolution
                            .inline_styles
                            .entry(target.element)
                            .or_default()
                            .insert(function.id.clone(), uuid.clone());
                        self.push(
                            &base,
                            property,
                            ResolvedDeclaration::Anchor {
                                descriptor: function.clone(),
                                anchor_el,
                                target_el: target,
                                uuid,
                            },
                        );
                    }
                }
            }
        }
        self.cx.anchor_functions = uses;
    }

    /// Every matching `position-area` gets its own wrapper id. An element
    /// carries all of its ids, so whichever declaration wins the cascade
    /// finds its placeholders filled.
    fn resolve_position_areas(&mut self) {
        let areas = std::mem::take(&mut self.cx.position_areas);
        let mut wrappers: BTreeMap<NodeId, Vec<String>> = BTreeMap::new();
        for (selector, descriptors) in &areas {
            let base = self.base_selector(selector);
            for target in self.document.query_selector_all(&base) {
                for descriptor in descriptors {
                    let anchor_el = self.find_anchor(target, None, None);
                    let wrapper_id = self.cx.next_id("--pa-wrapper");
                    wrappers
                        .entry(target.element)
                        .or_default()
                        .push(wrapper_id.clone());
                    self.wrapper_css
                        .push_str(&wrapper_rule(&wrapper_id, &descriptor.id));
                    self.push(
                        &base,
                        "position-area",
                        ResolvedDeclaration::PositionArea {
                            descriptor: descriptor.clone(),
                            anchor_el,
                            target_el: target,
                            wrapper_id,
                        },
                    );
                }
            }
        }
        for (element, ids) in wrappers {
            self.document
                .set_attribute(element, WRAPPER_ATTRIBUTE, &ids.join(" "));
        }
        self.cx.position_areas = areas;
    }
}
