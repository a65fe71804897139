//! Cascade preprocessing.
//!
//! Browsers drop declarations they don't understand, so anchor
//! properties never reach the computed style the polyfill reads. Each one
//! is duplicated into a private custom property, which always survives the
//! cascade. Inset shorthands are expanded so later passes only see
//! longhands.

use anchor_css::walk::{significant, walk_declarations_mut};
use anchor_css::Declaration;

use crate::error::PolyfillError;
use crate::record::StyleRecord;

/// Properties duplicated into private custom properties.
pub const SHIFTED_PROPERTIES: [&str; 7] = [
    "anchor-name",
    "anchor-scope",
    "position-anchor",
    "position-area",
    "position-try-fallbacks",
    "position-try-order",
    "position-visibility",
];

/// The private custom property shadowing `property` for one polyfill
/// instance.
#[must_use]
pub fn shifted_property_name(property: &str, token: &str) -> String {
    format!("--{property}-{token}")
}

/// [CSS Logical § 4.3 Flow-relative offsets](https://drafts.csswg.org/css-logical-1/#inset-properties)
/// and [CSS Box § 5 shorthand expansion](https://drafts.csswg.org/css-box-4/#margin-shorthand).
///
/// Longhands of an inset shorthand, or `None` when the value cannot be
/// expanded statically: an unsupported value count, or a top-level `var()`.
#[must_use]
pub fn expand_inset_shorthand(declaration: &Declaration) -> Option<Vec<Declaration>> {
    let longhands: &[&str] = match declaration.name.as_str() {
        "inset" => &["top", "right", "bottom", "left"],
        "inset-block" => &["inset-block-start", "inset-block-end"],
        "inset-inline" => &["inset-inline-start", "inset-inline-end"],
        _ => return None,
    };
    let parts = significant(&declaration.value);
    if parts.iter().any(|cv| cv.is_function("var")) {
        return None;
    }
    let picks: &[usize] = match (longhands.len(), parts.len()) {
        (4, 1) | (2, 1) => &[0, 0, 0, 0],
        (4, 2) => &[0, 1, 0, 1],
        (4, 3) => &[0, 1, 2, 1],
        (4, 4) => &[0, 1, 2, 3],
        (2, 2) => &[0, 1],
        _ => return None,
    };
    Some(
        longhands
            .iter()
            .zip(picks)
            .map(|(name, &pick)| Declaration {
                name: (*name).to_string(),
                value: vec![parts[pick].clone()],
                important: declaration.important,
            })
            .collect(),
    )
}

/// Shift anchor properties and expand inset shorthands in every record.
///
/// Records that fail to parse are left untouched and reported in `errors`.
/// Returns true if any record changed.
pub fn preprocess(
    records: &mut [StyleRecord],
    token: &str,
    errors: &mut Vec<PolyfillError>,
) -> bool {
    let mut any_changed = false;
    for record in records.iter_mut() {
        let mut sheet = match record.parse() {
            Ok(sheet) => sheet,
            Err(error) => {
                let origin = record.origin();
                let _ = anchor_common::warning::warn_once(
                    "Cascade",
                    &format!("skipping {origin}: {error}"),
                );
                errors.push(PolyfillError::Parse { origin, error });
                continue;
            }
        };
        let mut changed = false;
        let _ = walk_declarations_mut(&mut sheet, |cx, declaration| {
            if SHIFTED_PROPERTIES.contains(&declaration.name.as_str()) {
                cx.insert_after(Declaration {
                    name: shifted_property_name(&declaration.name, token),
                    value: declaration.value.clone(),
                    important: declaration.important,
                });
                changed = true;
            } else if let Some(longhands) = expand_inset_shorthand(declaration) {
                let mut longhands = longhands.into_iter();
                if let Some(first) = longhands.next() {
                    *declaration = first;
                }
                for longhand in longhands {
                    cx.insert_after(longhand);
                }
                changed = true;
            }
        });
        if changed {
            log::trace!("preprocessed {}", record.origin());
            record.replace_css(sheet.to_string());
            any_changed |= record.changed;
        }
    }
    log::debug!("cascade preprocessing changed records: {any_changed}");
    any_changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::StyleSource;

    fn record(css: &str) -> StyleRecord {
        StyleRecord::new(StyleSource::Link { href: "a.css".into() }, css)
    }

    #[test]
    fn test_shifted_property_follows_original() {
        let mut records = vec![record("#a{anchor-name:--a !important;color:red}")];
        let mut errors = Vec::new();
        assert!(preprocess(&mut records, "t0k", &mut errors));
        assert_eq!(
            records[0].css,
            "#a{anchor-name:--a!important;--anchor-name-t0k:--a!important;color:red}"
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn test_unrelated_css_is_untouched() {
        let mut records = vec![record("#a { color: red }")];
        let mut errors = Vec::new();
        assert!(!preprocess(&mut records, "t", &mut errors));
        assert_eq!(records[0].css, "#a { color: red }");
        assert!(!records[0].changed);
    }

    #[test]
    fn test_unparseable_record_is_isolated() {
        let mut records = vec![record("#a { color: red"), record("#b{inset:0}")];
        let mut errors = Vec::new();
        assert!(preprocess(&mut records, "t", &mut errors));
        assert_eq!(errors.len(), 1);
        assert_eq!(records[0].css, "#a { color: red");
        assert_eq!(records[1].css, "#b{top:0;right:0;bottom:0;left:0}");
    }

    #[test]
    fn test_var_values_are_not_expanded() {
        let decl = &anchor_css::parse_declarations("inset: var(--x)")[0];
        assert_eq!(expand_inset_shorthand(decl), None);
    }
}
