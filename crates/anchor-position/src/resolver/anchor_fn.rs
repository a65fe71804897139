//! `anchor()` and `anchor-size()` descriptors, and the collection pass that
//! finds them.

use std::collections::BTreeMap;

use anchor_css::walk::{Descend, significant, walk_declarations_mut, walk_values_mut};
use anchor_css::{ComponentValue, Declaration, Selector};
use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::context::{ALL_ANCHOR_NAMES, ResolverContext};
use crate::position_area::{PositionArea, placeholder_declarations};
use crate::syntax::{AnchorSide, AnchorSize, accepts_anchor_functions, is_dashed_ident};

use super::ParsedSheet;

/// Fallback when an anchor function gives none.
pub const DEFAULT_FALLBACK: &str = "0px";

/// Which anchor function a descriptor came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorFunctionKind {
    /// [§ 3.2 The anchor() function](https://drafts.csswg.org/css-anchor-position-1/#anchor-pos)
    Anchor,
    /// [§ 4.1 The anchor-size() function](https://drafts.csswg.org/css-anchor-position-1/#anchor-size-fn)
    AnchorSize,
}

/// One parsed `anchor()`/`anchor-size()` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnchorFunction {
    /// `anchor` or `anchor-size`.
    pub kind: AnchorFunctionKind,
    /// Explicit `<anchor-name>`.
    pub anchor_name: Option<String>,
    /// Custom property named by a `var()` in the anchor-name position,
    /// read from the target at resolution time.
    pub custom_prop_name: Option<String>,
    /// `<anchor-side>`, for `anchor()`.
    pub anchor_side: Option<AnchorSide>,
    /// `<anchor-size>`, for `anchor-size()`.
    pub anchor_size: Option<AnchorSize>,
    /// Everything after the first top-level comma, verbatim.
    pub fallback_value: String,
    /// Generated id; the call was replaced with `var(<id>)`.
    pub id: String,
}

impl AnchorFunction {
    /// Parse a call's arguments. `None` when an argument is neither a name,
    /// a `var()`, nor a side/size keyword, or one is repeated.
    #[must_use]
    pub fn parse(kind: AnchorFunctionKind, args: &[ComponentValue], id: String) -> Option<Self> {
        let comma = args.iter().position(ComponentValue::is_comma);
        let (head, fallback) = match comma {
            Some(index) => (&args[..index], Some(&args[index + 1..])),
            None => (args, None),
        };
        let fallback_value = fallback
            .map(|values| anchor_css::serialize_values(values).trim().to_string())
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| DEFAULT_FALLBACK.to_string());

        let mut function = Self {
            kind,
            anchor_name: None,
            custom_prop_name: None,
            anchor_side: None,
            anchor_size: None,
            fallback_value,
            id,
        };
        for arg in significant(head) {
            let named = function.anchor_name.is_some() || function.custom_prop_name.is_some();
            if let Some(name) = arg.as_ident().filter(|ident| is_dashed_ident(ident)) {
                if named {
                    return None;
                }
                function.anchor_name = Some(name.to_string());
            } else if let Some(name) = arg.var_name() {
                if named {
                    return None;
                }
                function.custom_prop_name = Some(name.to_string());
            } else if kind == AnchorFunctionKind::Anchor && function.anchor_side.is_none() {
                function.anchor_side = Some(AnchorSide::from_value(arg)?);
            } else if kind == AnchorFunctionKind::AnchorSize && function.anchor_size.is_none() {
                function.anchor_size = Some(AnchorSize::from_value(arg)?);
            } else {
                return None;
            }
        }
        Some(function)
    }
}

/// Replace every valid anchor function in `values` (at any depth) with
/// `var(<id>)`, returning the descriptors. Invalid calls stay as written.
pub fn rewrite_anchor_functions(
    values: &mut [ComponentValue],
    cx: &mut ResolverContext<'_>,
) -> Vec<AnchorFunction> {
    let mut found = Vec::new();
    walk_values_mut(values, &mut |cv| {
        let ComponentValue::Function { name, value } = cv else {
            return Descend::Children;
        };
        let Ok(kind) = name.parse::<AnchorFunctionKind>() else {
            return Descend::Children;
        };
        match AnchorFunction::parse(kind, value, String::new()) {
            Some(mut function) => {
                function.id = cx.next_id("--anchor");
                log::trace!("{name}() became var({})", function.id);
                *cv = ComponentValue::var(function.id.clone());
                found.push(function);
                Descend::Skip
            }
            None => Descend::Children,
        }
    });
    found
}

/// Anchor names in an `anchor-name`/`anchor-scope` value: dashed idents,
/// separated by commas or whitespace. `none` yields nothing.
fn declared_names(values: &[ComponentValue], allow_all: bool) -> Vec<String> {
    significant(values)
        .into_iter()
        .filter_map(ComponentValue::as_ident)
        .filter(|ident| is_dashed_ident(ident) || (allow_all && *ident == ALL_ANCHOR_NAMES))
        .map(str::to_string)
        .collect()
}

fn index_selectors(
    index: &mut BTreeMap<String, Vec<Selector>>,
    names: Vec<String>,
    selectors: &[Selector],
) {
    for name in names {
        index.entry(name).or_default().extend(selectors.iter().cloned());
    }
}

/// Pass 1: index anchor names and scopes, map `position-area`s and
/// replace anchor functions with references to their descriptors.
pub(super) fn collect_declarations(cx: &mut ResolverContext<'_>, sheets: &mut [ParsedSheet]) {
    for parsed in sheets.iter_mut() {
        let mut changed = false;
        let _ = walk_declarations_mut(&mut parsed.sheet, |wcx, declaration| {
            let selectors = wcx.rule.selectors();
            match (declaration.name.as_str(), selectors) {
                ("anchor-name", Some(selectors)) => {
                    index_selectors(&mut cx.anchor_names, declared_names(&declaration.value, false), selectors);
                }
                ("anchor-scope", Some(selectors)) => {
                    index_selectors(&mut cx.anchor_scopes, declared_names(&declaration.value, true), selectors);
                }
                ("position-area" | "inset-area", Some(selectors)) => {
                    if let Some(area) = PositionArea::parse(&declaration.value) {
                        let descriptor = area.descriptor(cx.next_id("--pa"));
                        for placeholder in placeholder_declarations(&descriptor.id) {
                            wcx.insert_after(placeholder);
                        }
                        for selector in selectors {
                            cx.position_areas
                                .entry(selector.clone())
                                .or_default()
                                .push(descriptor.clone());
                        }
                        changed = true;
                    }
                }
                _ => {}
            }

            let custom = declaration.is_custom_property();
            if !custom && (selectors.is_none() || !accepts_anchor_functions(&declaration.name)) {
                return;
            }
            let original = declaration.value.clone();
            let found = rewrite_anchor_functions(&mut declaration.value, cx);
            if found.is_empty() {
                return;
            }
            changed = true;
            for function in found {
                let _ = cx.descriptors.insert(function.id.clone(), function.clone());
                if custom {
                    let _ = cx.originals.insert(function.id.clone(), original.clone());
                    cx.custom_prop_anchors
                        .entry(declaration.name.clone())
                        .or_default()
                        .push(function);
                } else {
                    record_use(cx, selectors.unwrap_or_default(), declaration, function);
                }
            }
        });
        parsed.changed |= changed;
    }
    log::debug!(
        "collected {} anchor names, {} custom properties with anchors, {} position areas",
        cx.anchor_names.len(),
        cx.custom_prop_anchors.len(),
        cx.position_areas.len()
    );
}

/// Record a descriptor against every (selector, property) of a use site.
pub(super) fn record_use(
    cx: &mut ResolverContext<'_>,
    selectors: &[Selector],
    declaration: &Declaration,
    function: AnchorFunction,
) {
    for selector in selectors {
        let uses = cx
            .anchor_functions
            .entry(selector.clone())
            .or_default()
            .entry(declaration.name.clone())
            .or_default();
        if !uses.iter().any(|existing| existing.id == function.id) {
            uses.push(function.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(kind: AnchorFunctionKind, args: &str) -> Option<AnchorFunction> {
        AnchorFunction::parse(kind, &anchor_css::parse_component_values(args), "--id".into())
    }

    #[test]
    fn test_name_side_and_fallback() {
        let function = parse(AnchorFunctionKind::Anchor, "--btn bottom, calc(1px + 2px)").expect("valid");
        assert_eq!(function.anchor_name.as_deref(), Some("--btn"));
        assert_eq!(
            function.anchor_side,
            Some(AnchorSide::Keyword(crate::syntax::AnchorSideKeyword::Bottom))
        );
        assert_eq!(function.fallback_value, "calc(1px + 2px)");
    }

    #[test]
    fn test_defaults() {
        let function = parse(AnchorFunctionKind::AnchorSize, "").expect("valid");
        assert_eq!(function.anchor_size, None);
        assert_eq!(function.fallback_value, DEFAULT_FALLBACK);
    }

    #[test]
    fn test_var_names_the_anchor_at_use_time() {
        let function = parse(AnchorFunctionKind::Anchor, "var(--which) 50%").expect("valid");
        assert_eq!(function.custom_prop_name.as_deref(), Some("--which"));
        assert_eq!(function.anchor_side, Some(AnchorSide::Percentage(50.0)));
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(parse(AnchorFunctionKind::Anchor, "--a --b top").is_none());
        assert!(parse(AnchorFunctionKind::Anchor, "--a width").is_none());
        assert!(parse(AnchorFunctionKind::AnchorSize, "--a top").is_none());
    }
}
