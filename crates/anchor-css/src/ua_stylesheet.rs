//! User-Agent Stylesheet
//!
//! [WHATWG HTML § 15 Rendering](https://html.spec.whatwg.org/multipage/rendering.html)
//!
//! "User agents are expected to have a default style sheet that presents elements
//! of HTML documents in ways consistent with general user expectations."
//!
//! Only `display` matters here: it decides which boxes are block-level and
//! which elements generate no box at all.

use std::sync::OnceLock;

use crate::parser::Stylesheet;

/// [WHATWG HTML § 15.3 Rendering — Suggested default style sheet](https://html.spec.whatwg.org/multipage/rendering.html#the-css-user-agent-style-sheet-and-presentational-hints)
const UA_CSS: &str = r"
/* [§ 15.3.1 Hidden elements] */
area, base, basefont, datalist, head, link, meta, noembed,
noframes, param, rp, script, style, template, title {
    display: none;
}

[hidden] {
    display: none;
}

/* [§ 15.3.3 Flow content] */
address, article, aside, blockquote, body, center, dd, details,
dialog, dir, div, dl, dt, fieldset, figcaption, figure, footer,
form, h1, h2, h3, h4, h5, h6, header, hgroup, hr, html, legend,
listing, main, menu, nav, ol, p, plaintext, pre, search,
section, summary, ul, xmp {
    display: block;
}

li {
    display: list-item;
}

table {
    display: table;
}

input, textarea, select, button {
    display: inline-block;
}

/* [§ 15.3.4 The dialog element] */
dialog {
    position: absolute;
}

dialog:not([open]) {
    display: none;
}
";

/// Return the parsed UA stylesheet, parsing only once.
///
/// [CSS Cascading § 6.1](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
///
/// "Each style rule has a cascade origin... User-Agent origin rules have
/// the lowest priority."
pub fn ua_stylesheet() -> &'static Stylesheet {
    static STYLESHEET: OnceLock<Stylesheet> = OnceLock::new();
    STYLESHEET.get_or_init(|| crate::parse_css_text(UA_CSS))
}
