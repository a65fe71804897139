//! [§ 3.1 The position-area property](https://drafts.csswg.org/css-anchor-position-1/#position-area)
//!
//! Maps a `position-area` value onto a 3×3 grid around the anchor. Each
//! axis has grid lines 0 (containing block start), 1 (anchor start),
//! 2 (anchor end) and 3 (containing block end); a keyword picks a span
//! between two lines. Logical keywords assume `horizontal-tb` and `ltr`.

use core::fmt;

use anchor_css::{ComponentValue, Declaration};
use anchor_css::walk::significant;
use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Attribute listing the wrapper ids on a `position-area` target, space
/// separated, one per `position-area` declaration matching it.
pub const WRAPPER_ATTRIBUTE: &str = "data-anchor-polyfill-wrapper";

/// Properties that receive a placeholder for each `position-area`
/// declaration.
pub const PLACEHOLDER_PROPERTIES: [&str; 8] = [
    "top",
    "left",
    "right",
    "bottom",
    "inline-size",
    "block-size",
    "justify-self",
    "align-self",
];

/// "`<position-area>` = `[ <keyword> ]{1,2}`"
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumString, Display, AsRefStr, EnumIter,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum PositionAreaKeyword {
    // Common (shared) keywords:
    Center,
    SpanAll,

    // Horizontal keywords:
    Left,
    Right,
    SpanLeft,
    SpanRight,
    XStart,
    XEnd,
    SpanXStart,
    SpanXEnd,
    XSelfStart,
    XSelfEnd,
    SpanXSelfStart,
    SpanXSelfEnd,
    // Vertical keywords:
    Top,
    Bottom,
    SpanTop,
    SpanBottom,
    YStart,
    YEnd,
    SpanYStart,
    SpanYEnd,
    YSelfStart,
    YSelfEnd,
    SpanYSelfStart,
    SpanYSelfEnd,

    // Block keywords:
    BlockStart,
    BlockEnd,
    SpanBlockStart,
    SpanBlockEnd,
    // Inline keywords:
    InlineStart,
    InlineEnd,
    SpanInlineStart,
    SpanInlineEnd,

    // "Self" block keywords:
    SelfBlockStart,
    SelfBlockEnd,
    SpanSelfBlockStart,
    SpanSelfBlockEnd,
    // "Self" inline keywords:
    SelfInlineStart,
    SelfInlineEnd,
    SpanSelfInlineStart,
    SpanSelfInlineEnd,

    // Inferred axis keywords:
    Start,
    End,
    SpanStart,
    SpanEnd,

    // "Self" inferred axis keywords:
    SelfStart,
    SelfEnd,
    SpanSelfStart,
    SpanSelfEnd,
}

/// The pairing table a keyword belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeywordGroup {
    Common,
    Horizontal,
    Vertical,
    Block,
    Inline,
    SelfBlock,
    SelfInline,
    InferredLogical,
    SelfInferredLogical,
}

impl KeywordGroup {
    /// `Some(true)` for block-axis groups, `Some(false)` for inline-axis
    /// groups, `None` when the axis comes from the keyword's position.
    const fn is_block_axis(self) -> Option<bool> {
        match self {
            Self::Vertical | Self::Block | Self::SelfBlock => Some(true),
            Self::Horizontal | Self::Inline | Self::SelfInline => Some(false),
            Self::Common | Self::InferredLogical | Self::SelfInferredLogical => None,
        }
    }
}

impl PositionAreaKeyword {
    const fn group(self) -> KeywordGroup {
        use PositionAreaKeyword as K;
        match self {
            K::Center | K::SpanAll => KeywordGroup::Common,
            K::Left
            | K::Right
            | K::SpanLeft
            | K::SpanRight
            | K::XStart
            | K::XEnd
            | K::SpanXStart
            | K::SpanXEnd
            | K::XSelfStart
            | K::XSelfEnd
            | K::SpanXSelfStart
            | K::SpanXSelfEnd => KeywordGroup::Horizontal,
            K::Top
            | K::Bottom
            | K::SpanTop
            | K::SpanBottom
            | K::YStart
            | K::YEnd
            | K::SpanYStart
            | K::SpanYEnd
            | K::YSelfStart
            | K::YSelfEnd
            | K::SpanYSelfStart
            | K::SpanYSelfEnd => KeywordGroup::Vertical,
            K::BlockStart | K::BlockEnd | K::SpanBlockStart | K::SpanBlockEnd => {
                KeywordGroup::Block
            }
            K::InlineStart | K::InlineEnd | K::SpanInlineStart | K::SpanInlineEnd => {
                KeywordGroup::Inline
            }
            K::SelfBlockStart | K::SelfBlockEnd | K::SpanSelfBlockStart | K::SpanSelfBlockEnd => {
                KeywordGroup::SelfBlock
            }
            K::SelfInlineStart
            | K::SelfInlineEnd
            | K::SpanSelfInlineStart
            | K::SpanSelfInlineEnd => KeywordGroup::SelfInline,
            K::Start | K::End | K::SpanStart | K::SpanEnd => KeywordGroup::InferredLogical,
            K::SelfStart | K::SelfEnd | K::SpanSelfStart | K::SpanSelfEnd => {
                KeywordGroup::SelfInferredLogical
            }
        }
    }

    /// Is a value that's common to all compatible keyword groupings.
    #[must_use]
    pub const fn is_common(self) -> bool {
        matches!(self.group(), KeywordGroup::Common)
    }

    /// True when a lone keyword applies to both axes: the common keywords
    /// and the inferred-axis forms.
    #[must_use]
    pub const fn is_axis_ambiguous(self) -> bool {
        self.group().is_block_axis().is_none()
    }

    /// The grid span this keyword selects on its axis.
    #[must_use]
    pub fn span(self) -> GridSpan {
        match self {
            Self::Center => return GridSpan::new(1, 2),
            Self::SpanAll => return GridSpan::new(0, 3),
            _ => {}
        }
        let name: &str = self.as_ref();
        let (spanning, edge) = name
            .strip_prefix("span-")
            .map_or((false, name), |rest| (true, rest));
        let at_start = edge.ends_with("start") || edge == "top" || edge == "left";
        match (spanning, at_start) {
            (false, true) => GridSpan::new(0, 1),
            (false, false) => GridSpan::new(2, 3),
            (true, true) => GridSpan::new(0, 2),
            (true, false) => GridSpan::new(1, 3),
        }
    }

    /// The same keyword on the opposite side of its axis: `top` ⇄ `bottom`,
    /// `span-x-start` ⇄ `span-x-end`. Centered keywords are unchanged.
    #[must_use]
    pub fn flip_side(self) -> Self {
        const OPPOSITES: [(&str, &str); 3] = [("start", "end"), ("top", "bottom"), ("left", "right")];
        let name: &str = self.as_ref();
        for (a, b) in OPPOSITES {
            for (from, to) in [(a, b), (b, a)] {
                if let Some(stem) = name.strip_suffix(from) {
                    return format!("{stem}{to}").parse().unwrap_or(self);
                }
            }
        }
        self
    }

    /// The same keyword on the other axis: `top` ⇄ `left`,
    /// `y-self-end` ⇄ `x-self-end`, `block-start` ⇄ `inline-start`.
    #[must_use]
    pub fn swap_axis(self) -> Self {
        let name: &str = self.as_ref();
        let swapped: Vec<&str> = name
            .split('-')
            .map(|part| match part {
                "top" => "left",
                "left" => "top",
                "bottom" => "right",
                "right" => "bottom",
                "x" => "y",
                "y" => "x",
                "block" => "inline",
                "inline" => "block",
                other => other,
            })
            .collect();
        swapped.join("-").parse().unwrap_or(self)
    }
}

/// Two keywords are compatible when one is common, or both come from
/// matching halves of one table.
const fn is_compatible_pairing(first: PositionAreaKeyword, second: PositionAreaKeyword) -> bool {
    use KeywordGroup as G;
    if first.is_common() || second.is_common() {
        return true;
    }
    matches!(
        (first.group(), second.group()),
        (G::Horizontal, G::Vertical)
            | (G::Vertical, G::Horizontal)
            | (G::Block, G::Inline)
            | (G::Inline, G::Block)
            | (G::SelfBlock, G::SelfInline)
            | (G::SelfInline, G::SelfBlock)
            | (G::InferredLogical, G::InferredLogical)
            | (G::SelfInferredLogical, G::SelfInferredLogical)
    )
}

/// A validated pair of keywords, as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionArea {
    /// First keyword.
    pub first: PositionAreaKeyword,
    /// Second keyword. A lone keyword has been disambiguated already.
    pub second: PositionAreaKeyword,
}

impl PositionArea {
    /// Validate one or two keywords.
    ///
    /// A lone axis-ambiguous keyword applies to both axes (`center` →
    /// `center center`); any other lone keyword spans the whole other axis
    /// (`top` → `top span-all`).
    #[must_use]
    pub const fn new(first: PositionAreaKeyword, second: Option<PositionAreaKeyword>) -> Option<Self> {
        let second = match second {
            Some(second) => second,
            None if first.is_axis_ambiguous() => first,
            None => PositionAreaKeyword::SpanAll,
        };
        if is_compatible_pairing(first, second) {
            Some(Self { first, second })
        } else {
            None
        }
    }

    /// Parse a declaration value. `none`, unknown keywords, invalid pairs
    /// and more than two keywords yield `None`.
    #[must_use]
    pub fn parse(value: &[ComponentValue]) -> Option<Self> {
        let keywords: Option<Vec<PositionAreaKeyword>> = significant(value)
            .into_iter()
            .map(|cv| cv.as_ident()?.parse().ok())
            .collect();
        match keywords?.as_slice() {
            [first] => Self::new(*first, None),
            [first, second] => Self::new(*first, Some(*second)),
            _ => None,
        }
    }

    /// False when the first keyword is inline-axis, or the second one is
    /// block-axis; otherwise the first keyword is the block one.
    const fn block_is_first(self) -> bool {
        !matches!(
            (self.first.group().is_block_axis(), self.second.group().is_block_axis()),
            (Some(false), _) | (_, Some(true))
        )
    }

    /// `(block, inline)` keywords.
    #[must_use]
    pub const fn axes(self) -> (PositionAreaKeyword, PositionAreaKeyword) {
        if self.block_is_first() {
            (self.first, self.second)
        } else {
            (self.second, self.first)
        }
    }

    /// Mirror the block axis.
    #[must_use]
    pub fn flip_block(self) -> Self {
        if self.block_is_first() {
            Self { first: self.first.flip_side(), ..self }
        } else {
            Self { second: self.second.flip_side(), ..self }
        }
    }

    /// Mirror the inline axis.
    #[must_use]
    pub fn flip_inline(self) -> Self {
        if self.block_is_first() {
            Self { second: self.second.flip_side(), ..self }
        } else {
            Self { first: self.first.flip_side(), ..self }
        }
    }

    /// Transpose the axes. Keywords whose axis comes from their position
    /// swap places instead.
    #[must_use]
    pub fn flip_start(self) -> Self {
        if self.first.is_axis_ambiguous() && self.second.is_axis_ambiguous() {
            Self {
                first: self.second,
                second: self.first,
            }
        } else {
            Self {
                first: self.first.swap_axis(),
                second: self.second.swap_axis(),
            }
        }
    }

    /// Map onto the grid.
    #[must_use]
    pub fn descriptor(self, id: impl Into<String>) -> PositionAreaDescriptor {
        let (block, inline) = self.axes();
        let block_span = block.span();
        let inline_span = inline.span();
        PositionAreaDescriptor {
            block_value: block,
            inline_value: inline,
            block_span,
            inline_span,
            block_inset: InsetPair::from_span(block_span, true),
            inline_inset: InsetPair::from_span(inline_span, false),
            block_alignment: Alignment::from_span(block_span),
            inline_alignment: Alignment::from_span(inline_span),
            id: id.into(),
        }
    }
}

impl fmt::Display for PositionArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first, self.second)
    }
}

/// Two grid lines on one axis, `start < end`, both in `0..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GridSpan {
    /// First line.
    pub start: u8,
    /// Last line.
    pub end: u8,
}

impl GridSpan {
    const fn new(start: u8, end: u8) -> Self {
        Self { start, end }
    }
}

/// What an inset resolves against: the containing block edge, or an
/// anchor edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Inset {
    /// The containing block edge.
    #[serde(rename = "0")]
    #[strum(serialize = "0")]
    Zero,
    /// `anchor(top)`
    Top,
    /// `anchor(bottom)`
    Bottom,
    /// `anchor(left)`
    Left,
    /// `anchor(right)`
    Right,
}

/// The start and end insets of one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct InsetPair {
    /// `top` or `left`.
    pub start: Inset,
    /// `bottom` or `right`.
    pub end: Inset,
}

impl InsetPair {
    const fn from_span(span: GridSpan, block: bool) -> Self {
        let (near, far) = if block {
            (Inset::Top, Inset::Bottom)
        } else {
            (Inset::Left, Inset::Right)
        };
        Self {
            start: match span.start {
                0 => Inset::Zero,
                1 => near,
                _ => far,
            },
            end: match span.end {
                3 => Inset::Zero,
                2 => far,
                _ => near,
            },
        }
    }
}

/// Self-alignment within the selected area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Alignment {
    /// `start`
    Start,
    /// `end`
    End,
    /// `center`
    Center,
}

impl Alignment {
    /// "the box is aligned toward the anchor": an area that starts at the
    /// containing block edge aligns to its end, and vice versa.
    const fn from_span(span: GridSpan) -> Self {
        match (span.start, span.end) {
            (0, 3) => Self::Center,
            (0, _) => Self::End,
            (_, 3) => Self::Start,
            _ => Self::Center,
        }
    }
}

/// A `position-area` mapped onto the grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PositionAreaDescriptor {
    /// Keyword selecting the block-axis span.
    pub block_value: PositionAreaKeyword,
    /// Keyword selecting the inline-axis span.
    pub inline_value: PositionAreaKeyword,
    /// Block-axis grid span.
    pub block_span: GridSpan,
    /// Inline-axis grid span.
    pub inline_span: GridSpan,
    /// `top`/`bottom` insets.
    pub block_inset: InsetPair,
    /// `left`/`right` insets.
    pub inline_inset: InsetPair,
    /// `align-self`.
    pub block_alignment: Alignment,
    /// `justify-self`.
    pub inline_alignment: Alignment,
    /// Generated id; placeholders read `var(<id>-<property>)`.
    pub id: String,
}

/// The custom property a placeholder for `property` reads.
#[must_use]
pub fn placeholder_property(id: &str, property: &str) -> String {
    format!("{id}-{property}")
}

/// `top: var(<id>-top)` and friends, one per [`PLACEHOLDER_PROPERTIES`].
#[must_use]
pub fn placeholder_declarations(id: &str) -> Vec<Declaration> {
    PLACEHOLDER_PROPERTIES
        .iter()
        .map(|property| {
            Declaration::new(
                *property,
                vec![ComponentValue::var(placeholder_property(id, property))],
            )
        })
        .collect()
}

/// The rule forwarding a wrapper's per-element values into the
/// descriptor's placeholders. It matches any element whose wrapper list
/// contains `wrapper_id`.
#[must_use]
pub fn wrapper_rule(wrapper_id: &str, descriptor_id: &str) -> String {
    let body: Vec<String> = PLACEHOLDER_PROPERTIES
        .iter()
        .map(|property| {
            format!(
                "{}:var({})",
                placeholder_property(descriptor_id, property),
                placeholder_property(wrapper_id, property)
            )
        })
        .collect();
    format!("[{WRAPPER_ATTRIBUTE}~=\"{wrapper_id}\"]{{{}}}", body.join(";"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use PositionAreaKeyword as K;

    #[test]
    fn test_spans() {
        assert_eq!(K::Top.span(), GridSpan::new(0, 1));
        assert_eq!(K::Center.span(), GridSpan::new(1, 2));
        assert_eq!(K::Right.span(), GridSpan::new(2, 3));
        assert_eq!(K::SpanYSelfStart.span(), GridSpan::new(0, 2));
        assert_eq!(K::SpanInlineEnd.span(), GridSpan::new(1, 3));
        assert_eq!(K::SpanAll.span(), GridSpan::new(0, 3));
    }

    #[test]
    fn test_flip_side_and_swap_axis() {
        assert_eq!(K::Top.flip_side(), K::Bottom);
        assert_eq!(K::SpanXSelfStart.flip_side(), K::SpanXSelfEnd);
        assert_eq!(K::SpanAll.flip_side(), K::SpanAll);
        assert_eq!(K::SpanTop.swap_axis(), K::SpanLeft);
        assert_eq!(K::SelfBlockEnd.swap_axis(), K::SelfInlineEnd);
        assert_eq!(K::YStart.swap_axis(), K::XStart);
        assert_eq!(K::SpanStart.swap_axis(), K::SpanStart);
    }

    #[test]
    fn test_bottom_right_descriptor() {
        let area = PositionArea::new(K::Right, Some(K::Bottom)).expect("valid pair");
        let descriptor = area.descriptor("--pa-1");
        assert_eq!(descriptor.block_value, K::Bottom);
        assert_eq!(descriptor.inline_value, K::Right);
        assert_eq!(descriptor.block_inset, InsetPair { start: Inset::Bottom, end: Inset::Zero });
        assert_eq!(descriptor.inline_inset, InsetPair { start: Inset::Right, end: Inset::Zero });
        assert_eq!(descriptor.block_alignment, Alignment::Start);
        assert_eq!(descriptor.inline_alignment, Alignment::Start);
    }

    #[test]
    fn test_wrapper_rule_maps_every_placeholder() {
        let rule = wrapper_rule("--w", "--pa");
        assert!(rule.starts_with("[data-anchor-polyfill-wrapper=\"--w\"]{--pa-top:var(--w-top);"));
        assert!(rule.ends_with("--pa-align-self:var(--w-align-self)}"));
        assert_eq!(placeholder_declarations("--pa").len(), 8);
    }
}
