//! Computed style representation and value parsing
//!
//! Only the properties anchor positioning reasons about are interpreted:
//! - [CSS Display Module Level 3](https://www.w3.org/TR/css-display-3/)
//! - [CSS Positioned Layout Level 3](https://www.w3.org/TR/css-position-3/)
//! - [CSS Writing Modes Level 4](https://www.w3.org/TR/css-writing-modes-4/)
//! - [CSS Custom Properties Level 1](https://www.w3.org/TR/css-variables-1/)

pub mod computed;
mod display;
mod position;
pub mod substitute;
mod writing_mode;

pub use computed::ComputedValues;
pub use display::{DisplayValue, InnerDisplayType, OuterDisplayType, parse_display_value};
pub use position::{Position, parse_position};
pub use writing_mode::{Direction, WritingMode, parse_direction, parse_writing_mode};
