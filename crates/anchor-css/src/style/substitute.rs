//! CSS Custom Properties `var()` Substitution
//!
//! [CSS Custom Properties for Cascading Variables Module Level 1 § 3](https://www.w3.org/TR/css-variables-1/#using-variables)
//!
//! "If a property value contains one or more `var()` functions, and those
//! functions are syntactically valid, the entire property's grammar must be
//! assumed to be valid at parse time. It is only syntax-checked at
//! computed-value time, after `var()` functions have been substituted."

use std::collections::{BTreeMap, HashSet};

use crate::parser::ComponentValue;
use crate::tokenizer::CSSToken;

/// [§ 3 Using Cascading Variables](https://www.w3.org/TR/css-variables-1/#using-variables)
///
/// Check if component values contain any `var()` function references.
#[must_use]
pub fn contains_var(values: &[ComponentValue]) -> bool {
    values.iter().any(|cv| match cv {
        ComponentValue::Function { name, value } => {
            name.eq_ignore_ascii_case("var") || contains_var(value)
        }
        ComponentValue::Block { value, .. } => contains_var(value),
        ComponentValue::Token(_) => false,
    })
}

/// [§ 3 Using Cascading Variables](https://www.w3.org/TR/css-variables-1/#using-variables)
///
/// "To substitute a `var()` in a property's value:
///  2. If the value of the custom property named by the first argument to
///     the `var()` function is anything but the initial value, replace the
///     `var()` function by the value of the corresponding custom property.
///  3. Otherwise, if the `var()` function has a fallback value as its second
///     argument, replace the `var()` function by the fallback value. If there
///     are any `var()` references in the fallback, substitute them as well.
///  4. Otherwise, the property containing the `var()` function is invalid at
///     computed-value time."
///
/// `custom_properties` holds already-substituted values. Returns `None` when
/// the property is invalid at computed-value time.
#[must_use]
pub fn substitute_var(
    values: &[ComponentValue],
    custom_properties: &BTreeMap<String, Vec<ComponentValue>>,
) -> Option<Vec<ComponentValue>> {
    substitute_with(values, &mut |name| custom_properties.get(name).cloned())
}

fn substitute_with(
    values: &[ComponentValue],
    lookup: &mut impl FnMut(&str) -> Option<Vec<ComponentValue>>,
) -> Option<Vec<ComponentValue>> {
    let mut result = Vec::with_capacity(values.len());

    for cv in values {
        match cv {
            ComponentValue::Function { name, value } if name.eq_ignore_ascii_case("var") => {
                let (prop_name, fallback) = parse_var_arguments(value);
                let prop_name = prop_name?;

                if let Some(prop_value) = lookup(&prop_name) {
                    result.extend(prop_value);
                } else if let Some(fb) = fallback {
                    result.extend(substitute_with(&fb, lookup)?);
                } else {
                    return None;
                }
            }
            ComponentValue::Function { name, value } => {
                result.push(ComponentValue::Function {
                    name: name.clone(),
                    value: substitute_with(value, lookup)?,
                });
            }
            ComponentValue::Block { token, value } => {
                result.push(ComponentValue::Block {
                    token: *token,
                    value: substitute_with(value, lookup)?,
                });
            }
            other @ ComponentValue::Token(_) => result.push(other.clone()),
        }
    }

    Some(result)
}

/// [§ 2.3 Resolving Dependency Cycles](https://www.w3.org/TR/css-variables-1/#cycles)
///
/// Substitute `var()` inside every custom property of one element.
///
/// "If there is a cycle in the dependency graph, all the custom properties
/// in the cycle are invalid at computed-value time." Cycles are detected
/// with an in-progress set; invalid properties are dropped from the result.
#[must_use]
pub fn resolve_custom_properties(
    declared: &BTreeMap<String, Vec<ComponentValue>>,
) -> BTreeMap<String, Vec<ComponentValue>> {
    let mut resolver = CustomPropertyResolver {
        declared,
        resolved: BTreeMap::new(),
        invalid: HashSet::new(),
        in_progress: HashSet::new(),
    };
    for name in declared.keys() {
        let _ = resolver.resolve(name);
    }
    resolver.resolved
}

struct CustomPropertyResolver<'a> {
    declared: &'a BTreeMap<String, Vec<ComponentValue>>,
    resolved: BTreeMap<String, Vec<ComponentValue>>,
    invalid: HashSet<String>,
    in_progress: HashSet<String>,
}

impl<'a> CustomPropertyResolver<'a> {
    fn resolve(&mut self, name: &str) -> Option<Vec<ComponentValue>> {
        if let Some(value) = self.resolved.get(name) {
            return Some(value.clone());
        }
        if self.invalid.contains(name) {
            return None;
        }
        let declared_map: &'a BTreeMap<String, Vec<ComponentValue>> = self.declared;
        let declared = declared_map.get(name)?;
        if !self.in_progress.insert(name.to_string()) {
            // Back at a property still being resolved: a cycle.
            let _ = self.invalid.insert(name.to_string());
            return None;
        }

        let result = substitute_with(declared, &mut |dep| self.resolve(dep));
        let _ = self.in_progress.remove(name);
        match &result {
            Some(value) if !self.invalid.contains(name) => {
                let _ = self.resolved.insert(name.to_string(), value.clone());
            }
            _ => {
                let _ = self.invalid.insert(name.to_string());
                return None;
            }
        }
        result
    }
}

/// Parse the arguments of a `var()` function.
///
/// "`var()` = var( <custom-property-name> \[, <declaration-value>\]? )"
///
/// Returns `(property_name, fallback)`. The fallback is everything after the
/// first comma, leading whitespace trimmed: "var(--foo, red, blue) defines a
/// fallback of `red, blue`."
#[must_use]
pub fn parse_var_arguments(
    args: &[ComponentValue],
) -> (Option<String>, Option<Vec<ComponentValue>>) {
    let mut prop_name: Option<String> = None;
    let mut comma_idx: Option<usize> = None;

    for (i, cv) in args.iter().enumerate() {
        match cv {
            ComponentValue::Token(CSSToken::Ident(ident))
                if ident.starts_with("--") && prop_name.is_none() =>
            {
                prop_name = Some(ident.clone());
            }
            ComponentValue::Token(CSSToken::Comma) => {
                comma_idx = Some(i);
                break;
            }
            ComponentValue::Token(CSSToken::Whitespace) => {}
            _ => {
                if prop_name.is_none() {
                    return (None, None);
                }
            }
        }
    }

    let fallback = comma_idx.map(|ci| {
        let rest = &args[ci + 1..];
        let start = rest
            .iter()
            .position(|cv| !cv.is_whitespace())
            .unwrap_or(rest.len());
        rest[start..].to_vec()
    });

    (prop_name, fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(s: &str) -> ComponentValue {
        ComponentValue::ident(s)
    }

    fn comma() -> ComponentValue {
        ComponentValue::Token(CSSToken::Comma)
    }

    fn ws() -> ComponentValue {
        ComponentValue::Token(CSSToken::Whitespace)
    }

    fn var_fn(args: Vec<ComponentValue>) -> ComponentValue {
        ComponentValue::Function {
            name: "var".to_string(),
            value: args,
        }
    }

    fn props(entries: &[(&str, Vec<ComponentValue>)]) -> BTreeMap<String, Vec<ComponentValue>> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_contains_var_nested() {
        let values = vec![ComponentValue::Function {
            name: "calc".to_string(),
            value: vec![var_fn(vec![ident("--x")])],
        }];
        assert!(contains_var(&values));
        assert!(!contains_var(&[ident("red")]));
    }

    #[test]
    fn test_substitute_basic() {
        let values = vec![var_fn(vec![ident("--color")])];
        let custom = props(&[("--color", vec![ident("red")])]);
        assert_eq!(substitute_var(&values, &custom), Some(vec![ident("red")]));
    }

    #[test]
    fn test_substitute_comma_in_fallback() {
        let values = vec![var_fn(vec![
            ident("--missing"),
            comma(),
            ws(),
            ident("Arial"),
            comma(),
            ws(),
            ident("sans-serif"),
        ])];
        assert_eq!(
            substitute_var(&values, &BTreeMap::new()),
            Some(vec![ident("Arial"), comma(), ws(), ident("sans-serif")])
        );
    }

    #[test]
    fn test_substitute_missing_no_fallback() {
        let values = vec![var_fn(vec![ident("--missing")])];
        assert_eq!(substitute_var(&values, &BTreeMap::new()), None);
    }

    #[test]
    fn test_resolve_chain() {
        let declared = props(&[
            ("--a", vec![var_fn(vec![ident("--b")])]),
            ("--b", vec![var_fn(vec![ident("--c")])]),
            ("--c", vec![ident("--anchor")]),
        ]);
        let resolved = resolve_custom_properties(&declared);
        assert_eq!(resolved.get("--a"), Some(&vec![ident("--anchor")]));
        assert_eq!(resolved.get("--b"), Some(&vec![ident("--anchor")]));
    }

    #[test]
    fn test_resolve_cycle_is_invalid() {
        let declared = props(&[
            ("--a", vec![var_fn(vec![ident("--b")])]),
            ("--b", vec![var_fn(vec![ident("--a")])]),
            ("--ok", vec![ident("fine")]),
        ]);
        let resolved = resolve_custom_properties(&declared);
        assert!(!resolved.contains_key("--a"));
        assert!(!resolved.contains_key("--b"));
        assert_eq!(resolved.get("--ok"), Some(&vec![ident("fine")]));
    }

    #[test]
    fn test_parse_var_arguments_invalid_first_argument() {
        let (name, fallback) = parse_var_arguments(&[ident("red")]);
        assert!(name.is_none());
        assert!(fallback.is_none());
    }
}
