//! CSS anchor positioning, resolved by rewriting stylesheets.
//!
//! # Scope
//!
//! This crate implements:
//! - **Cascade preprocessing**: anchor properties are duplicated under
//!   instance-scoped custom property names so their cascaded values can be
//!   read back, and `inset` shorthands are expanded
//! - **Resolution** of `anchor()`, `anchor-size()` and
//!   [`position-area`](https://drafts.csswg.org/css-anchor-position-1/#position-area)
//!   ([CSS Anchor Positioning](https://drafts.csswg.org/css-anchor-position-1/)),
//!   including custom properties that carry them
//! - **Anchor validation** per
//!   [§ 2.1 Acceptable anchor elements](https://drafts.csswg.org/css-anchor-position-1/#acceptable-anchor-element)
//! - **Position fallbacks**: `@position-try` rules and try tactics
//!
//! # Not Yet Implemented
//!
//! - Pixel positioning: callers compute values for the emitted custom
//!   properties
//! - Scroll adjustments and `position-visibility`

/// Anchor property shifting and `inset` expansion.
pub mod cascade;
/// Resolution state shared between passes.
pub mod context;
/// Documents with computed styles.
pub mod document;
/// Errors.
pub mod error;
/// Position fallbacks and try tactics.
pub mod fallback;
/// Identifier generation.
pub mod ids;
/// Containing blocks and element geometry.
pub mod layout;
/// `position-area` geometry.
pub mod position_area;
/// Style records.
pub mod record;
/// The resolver.
pub mod resolver;
/// Property and keyword classification.
pub mod syntax;
/// [§ 2.1 Acceptable anchor elements](https://drafts.csswg.org/css-anchor-position-1/#acceptable-anchor-element)
pub mod validator;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use document::{Document, ElementRef};
pub use error::PolyfillError;
pub use ids::{IdGenerator, RandomIds, SequentialIds};
pub use layout::{Layout, Rect, StyleLayout};
pub use record::{StyleRecord, StyleSource, collect_style_records};
pub use resolver::{Resolution, ResolvedDeclaration, ResolvedPositions, TargetPositions};

/// Caller configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PolyfillOptions {
    /// Leave `style` attributes out.
    pub exclude_inline_styles: bool,
    /// Round computed positions to whole pixels.
    pub round_anchor_positions: bool,
    /// Token for shifted property names; the process-wide one when unset.
    pub instance_token: Option<String>,
}

/// Everything one run produced.
#[derive(Debug, Clone, Serialize)]
pub struct PolyfillOutput {
    /// Every record, rewritten in place, plus any the run created.
    pub records: Vec<StyleRecord>,
    /// Resolved anchors and inline-style patches.
    pub resolution: Resolution,
    /// Carried from [`PolyfillOptions::round_anchor_positions`].
    pub round_anchor_positions: bool,
}

impl PolyfillOutput {
    /// True when any record changed or was created.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.resolution.changed
    }
}

/// Run the whole pipeline: preprocess, collect fallbacks, resolve.
pub fn polyfill(
    document: &mut Document,
    mut records: Vec<StyleRecord>,
    options: &PolyfillOptions,
    layout: &dyn Layout,
    ids: &mut dyn IdGenerator,
) -> PolyfillOutput {
    if options.exclude_inline_styles {
        records.retain(|record| !matches!(record.source, StyleSource::Inline { .. }));
    }
    let token = if let Some(token) = options.instance_token.as_deref() {
        token
    } else {
        ids::instance_token()
    };

    // The resolver re-reports records that fail to parse.
    let mut preprocess_errors = Vec::new();
    let mut changed = cascade::preprocess(&mut records, token, &mut preprocess_errors);

    let sheets: Vec<_> = records.iter().filter_map(|record| record.parse().ok()).collect();
    let sheet_refs: Vec<_> = sheets.iter().collect();
    let tries = fallback::collect_try_blocks(&sheet_refs, ids);
    if !tries.css.is_empty() {
        records.push(StyleRecord::created(ids.next_id("--anchor-fallbacks"), tries.css));
        changed = true;
    }

    let mut resolution =
        resolver::resolve_with_fallbacks(&mut records, document, layout, ids, tries.try_selectors);
    for (selector, target) in tries.targets {
        let positions = resolution.positions.entry(selector).or_default();
        positions.fallbacks = target.fallbacks;
        positions.order = target.order;
    }
    resolution.changed |= changed;
    log::debug!(
        "polyfilled {} records, {} targets",
        records.len(),
        resolution.positions.len()
    );

    PolyfillOutput {
        records,
        resolution,
        round_anchor_positions: options.round_anchor_positions,
    }
}

/// The inline `style` text a patch sets on one element.
#[must_use]
pub fn inline_style_text(patch: &BTreeMap<String, String>) -> String {
    patch
        .iter()
        .map(|(descriptor, uuid)| format!("{descriptor}:var({uuid})"))
        .collect::<Vec<_>>()
        .join(";")
}
