//! Custom property chains: which anchor functions reach a concrete
//! property through `var()` hops, and the shadow properties that carry
//! them there.
//!
//! Given
//!
//! ```css
//! :root { --a: anchor(--btn top); --b: var(--a); }
//! #popup { top: var(--b); }
//! ```
//!
//! the passes produce
//!
//! ```css
//! :root {
//!   --a: anchor(--btn top); --shadow-a-top: var(--anchor-top-copy);
//!   --b: var(--a); --shadow-b-top: var(--shadow-a-top);
//! }
//! #popup { top: var(--shadow-b-top); }
//! ```
//!
//! Every assignment of a custom property keeps its own shadow, so whichever
//! one wins the cascade also wins for the shadows.

use std::collections::{HashSet, VecDeque};

use anchor_css::{ComponentValue, Declaration};
use anchor_css::walk::{Descend, walk_declarations_mut, walk_values_mut};

use crate::context::ResolverContext;
use crate::syntax::accepts_anchor_functions;

use super::ParsedSheet;
use super::anchor_fn::record_use;

/// Point a `var()` at another custom property, keeping its fallback.
fn retarget_var(value: &mut ComponentValue, to: &str) {
    if let ComponentValue::Function { value: args, .. } = value
        && let Some(name) = args.iter_mut().find(|arg| !arg.is_whitespace())
    {
        *name = ComponentValue::ident(to);
    }
}

/// Pass 2: rewrite reads of tracked custom properties inside other custom
/// properties to markers, queueing each newly tracked property once.
pub(super) fn trace_chains(cx: &mut ResolverContext<'_>, sheets: &mut [ParsedSheet]) {
    let mut queue: VecDeque<String> = cx.custom_prop_anchors.keys().cloned().collect();
    let mut queued: HashSet<String> = queue.iter().cloned().collect();
    while let Some(tracked) = queue.pop_front() {
        for parsed in sheets.iter_mut() {
            let mut changed = false;
            let _ = walk_declarations_mut(&mut parsed.sheet, |_, declaration| {
                if !declaration.is_custom_property() || declaration.name == tracked {
                    return;
                }
                let original = cx
                    .original_of(&declaration.value)
                    .unwrap_or_else(|| declaration.value.clone());
                let mut markers = Vec::new();
                walk_values_mut(&mut declaration.value, &mut |cv| {
                    if cv.var_name() != Some(tracked.as_str()) {
                        return Descend::Children;
                    }
                    let marker = cx.next_id("--anchor-chain");
                    retarget_var(cv, &marker);
                    markers.push(marker);
                    Descend::Children
                });
                if markers.is_empty() {
                    return;
                }
                changed = true;
                let chain = cx.chains.entry(declaration.name.clone()).or_default();
                let _ = chain.ancestors.insert(tracked.clone());
                chain.ids.extend(markers.iter().cloned());
                for marker in markers {
                    log::trace!("{} reads {tracked} through {marker}", declaration.name);
                    let _ = cx.chain_markers.insert(marker.clone(), tracked.clone());
                    let _ = cx.originals.insert(marker, original.clone());
                }
                if queued.insert(declaration.name.clone()) {
                    queue.push_back(declaration.name.clone());
                }
            });
            parsed.changed |= changed;
        }
    }
    log::debug!("traced {} custom property chains", cx.chains.len());
}

/// Pass 3: point every concrete `property: var(--tracked)` at the shadow
/// of `--tracked` for that property, and record the property-specific
/// copies of every anchor function the chain reaches.
pub(super) fn resolve_use_sites(cx: &mut ResolverContext<'_>, sheets: &mut [ParsedSheet]) {
    for parsed in sheets.iter_mut() {
        let mut changed = false;
        let _ = walk_declarations_mut(&mut parsed.sheet, |wcx, declaration| {
            let Some(selectors) = wcx.rule.selectors() else {
                return;
            };
            if declaration.is_custom_property() || !accepts_anchor_functions(&declaration.name) {
                return;
            }
            let property = declaration.name.clone();
            let mut reached_any = Vec::new();
            walk_values_mut(&mut declaration.value, &mut |cv| {
                let Some(name) = cv.var_name().map(str::to_string) else {
                    return Descend::Children;
                };
                if !cx.is_tracked(&name) {
                    return Descend::Children;
                }
                let reached = cx.trace(&name);
                if reached.descriptors.is_empty() {
                    return Descend::Children;
                }
                let shadow = cx.shadow(&name, &property);
                retarget_var(cv, &shadow);
                for marker in &reached.markers {
                    if let Some(parent) = cx.chain_markers.get(marker).cloned() {
                        let parent_shadow = cx.shadow(&parent, &property);
                        let _ = cx
                            .replacements
                            .entry(marker.clone())
                            .or_default()
                            .insert(property.clone(), parent_shadow);
                    }
                }
                for descriptor in &reached.descriptors {
                    reached_any.push(cx.property_clone(descriptor, &property));
                }
                Descend::Children
            });
            if reached_any.is_empty() {
                return;
            }
            changed = true;
            for function in reached_any {
                record_use(cx, selectors, declaration, function);
            }
        });
        parsed.changed |= changed;
    }
}

/// Pass 4: give every rewritten custom property assignment one shadow per
/// concrete property reading it, then restore its authored value.
pub(super) fn restore_custom_properties(cx: &mut ResolverContext<'_>, sheets: &mut [ParsedSheet]) {
    let cx = &*cx;
    for parsed in sheets.iter_mut() {
        let mut changed = false;
        let _ = walk_declarations_mut(&mut parsed.sheet, |wcx, declaration| {
            if !declaration.is_custom_property() {
                return;
            }
            let Some(original) = cx.original_of(&declaration.value) else {
                return;
            };
            for ((custom, property), shadow) in &cx.shadows {
                if *custom != declaration.name {
                    continue;
                }
                let mut value = declaration.value.clone();
                walk_values_mut(&mut value, &mut |cv| {
                    let Some(name) = cv.var_name().filter(|name| cx.is_generated(name)) else {
                        return Descend::Children;
                    };
                    let target = cx
                        .replacements
                        .get(name)
                        .and_then(|by_property| by_property.get(property))
                        .or_else(|| cx.chain_markers.get(name))
                        .cloned();
                    if let Some(target) = target {
                        retarget_var(cv, &target);
                    }
                    Descend::Children
                });
                wcx.insert_after(Declaration {
                    name: shadow.clone(),
                    value,
                    important: declaration.important,
                });
            }
            declaration.value = original;
            changed = true;
        });
        parsed.changed |= changed;
    }
}
