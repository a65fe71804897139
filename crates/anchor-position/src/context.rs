//! Tables shared by the resolver passes. One context lives for one
//! resolution and is dropped with it.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use anchor_common::warning::warn_once;
use anchor_css::walk::visit_values;
use anchor_css::{ComponentValue, Selector};
use serde::Serialize;

use crate::error::PolyfillError;
use crate::ids::IdGenerator;
use crate::position_area::PositionAreaDescriptor;
use crate::resolver::AnchorFunction;

/// `anchor-scope` entries that apply to every anchor name.
pub const ALL_ANCHOR_NAMES: &str = "all";

/// A custom property assigned from anchor-carrying custom properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CustomPropertyChain {
    /// The custom properties it reads.
    pub ancestors: BTreeSet<String>,
    /// Markers that replaced those reads.
    pub ids: BTreeSet<String>,
}

/// How one use site's custom property was traced back to anchor functions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainTrace {
    /// The custom property read by the use site.
    pub start: String,
    /// Custom properties visited, in visiting order.
    pub visited: Vec<String>,
    /// True when the chain loops back on itself.
    pub cycle: bool,
}

/// What a trace reached.
#[derive(Debug, Default)]
pub(crate) struct Reached {
    pub(crate) descriptors: Vec<AnchorFunction>,
    pub(crate) markers: Vec<String>,
}

/// Per-resolution state.
pub struct ResolverContext<'a> {
    pub(crate) ids: &'a mut dyn IdGenerator,
    /// Anchor name → selectors declaring it.
    pub anchor_names: BTreeMap<String, Vec<Selector>>,
    /// Anchor name (or [`ALL_ANCHOR_NAMES`]) → selectors scoping it.
    pub anchor_scopes: BTreeMap<String, Vec<Selector>>,
    /// Selector → property → anchor functions it uses.
    pub anchor_functions: BTreeMap<Selector, BTreeMap<String, Vec<AnchorFunction>>>,
    /// Custom property → anchor functions assigned to it directly.
    pub custom_prop_anchors: BTreeMap<String, Vec<AnchorFunction>>,
    /// Selector → `position-area` declarations.
    pub position_areas: BTreeMap<Selector, Vec<PositionAreaDescriptor>>,
    /// Generated id → authored value of the declaration it was found in.
    pub originals: BTreeMap<String, Vec<ComponentValue>>,
    /// Custom property → chain it belongs to.
    pub chains: BTreeMap<String, CustomPropertyChain>,
    /// Chain marker → the custom property it replaced a read of.
    pub chain_markers: BTreeMap<String, String>,
    /// (custom property, concrete property) → shadow custom property.
    pub shadows: BTreeMap<(String, String), String>,
    /// Generated id → concrete property → the id replacing it there.
    pub replacements: BTreeMap<String, BTreeMap<String, String>>,
    /// Every descriptor, clones included, by id.
    pub descriptors: BTreeMap<String, AnchorFunction>,
    /// Generated try-block selector text → the target selector.
    pub try_selectors: BTreeMap<String, Selector>,
    /// Chain traces, one per traced custom property.
    pub traces: Vec<ChainTrace>,
    /// Records that could not be processed.
    pub errors: Vec<PolyfillError>,
}

impl<'a> ResolverContext<'a> {
    /// Empty tables.
    pub fn new(ids: &'a mut dyn IdGenerator, try_selectors: BTreeMap<String, Selector>) -> Self {
        Self {
            ids,
            anchor_names: BTreeMap::new(),
            anchor_scopes: BTreeMap::new(),
            anchor_functions: BTreeMap::new(),
            custom_prop_anchors: BTreeMap::new(),
            position_areas: BTreeMap::new(),
            originals: BTreeMap::new(),
            chains: BTreeMap::new(),
            chain_markers: BTreeMap::new(),
            shadows: BTreeMap::new(),
            replacements: BTreeMap::new(),
            descriptors: BTreeMap::new(),
            try_selectors,
            traces: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// A fresh id.
    pub fn next_id(&mut self, prefix: &str) -> String {
        self.ids.next_id(prefix)
    }

    /// True when `name` carries anchor functions, directly or through a
    /// chain.
    #[must_use]
    pub fn is_tracked(&self, name: &str) -> bool {
        self.custom_prop_anchors.contains_key(name) || self.chains.contains_key(name)
    }

    /// True for ids this resolution generated into custom property values.
    #[must_use]
    pub fn is_generated(&self, name: &str) -> bool {
        self.originals.contains_key(name)
    }

    /// The authored value behind a rewritten value: the original recorded
    /// for the first generated id it reads.
    #[must_use]
    pub fn original_of(&self, values: &[ComponentValue]) -> Option<Vec<ComponentValue>> {
        let mut found = None;
        visit_values(values, &mut |cv| {
            if found.is_none()
                && let Some(original) = cv.var_name().and_then(|name| self.originals.get(name))
            {
                found = Some(original.clone());
            }
        });
        found
    }

    /// The shadow custom property exposing `custom`'s value for `property`.
    pub fn shadow(&mut self, custom: &str, property: &str) -> String {
        let key = (custom.to_string(), property.to_string());
        if let Some(shadow) = self.shadows.get(&key) {
            return shadow.clone();
        }
        let shadow = self.ids.next_id("--anchor-shadow");
        let _ = self.shadows.insert(key, shadow.clone());
        shadow
    }

    /// The copy of `descriptor` used by `property`, created on first use.
    pub fn property_clone(&mut self, descriptor: &AnchorFunction, property: &str) -> AnchorFunction {
        if let Some(existing) = self
            .replacements
            .get(&descriptor.id)
            .and_then(|by_property| by_property.get(property))
            .and_then(|id| self.descriptors.get(id))
        {
            return existing.clone();
        }
        let clone = AnchorFunction {
            id: self.ids.next_id("--anchor"),
            ..descriptor.clone()
        };
        let _ = self
            .replacements
            .entry(descriptor.id.clone())
            .or_default()
            .insert(property.to_string(), clone.id.clone());
        let _ = self.descriptors.insert(clone.id.clone(), clone.clone());
        clone
    }

    /// Walk the chain from `start` to every custom property it reads,
    /// collecting direct anchor functions and chain markers. Each name is
    /// visited at most once, so cycles terminate.
    pub(crate) fn trace(&mut self, start: &str) -> Reached {
        let mut tracer = Tracer::default();
        tracer.run(self, start);
        if tracer.cycle {
            let _ = warn_once(
                "Resolver",
                &format!("custom property chain through {start} is cyclic"),
            );
        }
        if !self.traces.iter().any(|trace| trace.start == start) {
            self.traces.push(ChainTrace {
                start: start.to_string(),
                visited: tracer.visited,
                cycle: tracer.cycle,
            });
        }
        tracer.reached
    }
}

/// Depth-first walk over chain ancestors, driven by an explicit stack.
#[derive(Default)]
struct Tracer {
    reached: Reached,
    visited: Vec<String>,
    seen: HashSet<String>,
    on_path: HashSet<String>,
    cycle: bool,
}

/// A custom property on the current path and the ancestors left to visit.
struct Frame {
    name: String,
    pending: Vec<String>,
}

impl Tracer {
    fn run(&mut self, cx: &ResolverContext<'_>, start: &str) {
        let mut stack = vec![self.enter(cx, start)];
        while let Some(frame) = stack.last_mut() {
            let Some(ancestor) = frame.pending.pop() else {
                if let Some(done) = stack.pop() {
                    let _ = self.on_path.remove(&done.name);
                }
                continue;
            };
            if self.on_path.contains(&ancestor) {
                self.cycle = true;
            } else if !self.seen.contains(&ancestor) {
                stack.push(self.enter(cx, &ancestor));
            }
        }
    }

    fn enter(&mut self, cx: &ResolverContext<'_>, name: &str) -> Frame {
        let _ = self.seen.insert(name.to_string());
        let _ = self.on_path.insert(name.to_string());
        self.visited.push(name.to_string());
        if let Some(descriptors) = cx.custom_prop_anchors.get(name) {
            self.reached.descriptors.extend(descriptors.iter().cloned());
        }
        let mut pending = Vec::new();
        if let Some(chain) = cx.chains.get(name) {
            self.reached.markers.extend(chain.ids.iter().cloned());
            // Popped from the back, so ancestors are visited in name order.
            pending.extend(chain.ancestors.iter().rev().cloned());
        }
        Frame {
            name: name.to_string(),
            pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;

    fn link(cx: &mut ResolverContext<'_>, name: &str, reads: &str, marker: &str) {
        let chain = cx.chains.entry(name.to_string()).or_default();
        let _ = chain.ancestors.insert(reads.to_string());
        let _ = chain.ids.insert(marker.to_string());
    }

    #[test]
    fn test_trace_follows_long_alias_chain() {
        let mut ids = SequentialIds::new();
        let mut cx = ResolverContext::new(&mut ids, BTreeMap::new());
        let depth = 20_000;
        for i in 0..depth {
            link(&mut cx, &format!("--v{i}"), &format!("--v{}", i + 1), &format!("--m{i}"));
        }

        let reached = cx.trace("--v0");
        assert_eq!(reached.markers.len(), depth);
        let trace = &cx.traces[0];
        assert_eq!(trace.visited.len(), depth + 1);
        assert_eq!(trace.visited.last().map(String::as_str), Some("--v20000"));
        assert!(!trace.cycle);
    }

    #[test]
    fn test_trace_flags_cycle_and_visits_each_name_once() {
        let mut ids = SequentialIds::new();
        let mut cx = ResolverContext::new(&mut ids, BTreeMap::new());
        link(&mut cx, "--a", "--b", "--m1");
        link(&mut cx, "--a", "--c", "--m2");
        link(&mut cx, "--b", "--c", "--m3");
        link(&mut cx, "--c", "--a", "--m4");

        let reached = cx.trace("--a");
        assert_eq!(reached.markers, ["--m1", "--m2", "--m3", "--m4"]);
        let trace = &cx.traces[0];
        assert_eq!(trace.visited, ["--a", "--b", "--c"]);
        assert!(trace.cycle);
    }

    #[test]
    fn test_shared_ancestor_is_not_a_cycle() {
        let mut ids = SequentialIds::new();
        let mut cx = ResolverContext::new(&mut ids, BTreeMap::new());
        link(&mut cx, "--top", "--left", "--m1");
        link(&mut cx, "--top", "--right", "--m2");
        link(&mut cx, "--left", "--base", "--m3");
        link(&mut cx, "--right", "--base", "--m4");

        let _ = cx.trace("--top");
        let trace = &cx.traces[0];
        assert_eq!(trace.visited, ["--top", "--left", "--base", "--right"]);
        assert!(!trace.cycle);
    }
}
