//! [§ 9 Serialization](https://www.w3.org/TR/css-syntax-3/#serialization)
//!
//! Regenerates CSS text from a parsed tree. Output is compact
//! (`sel{prop:value;prop:value}`), and reparsing it yields an equivalent tree.
//! Runs of whitespace inside values collapse to a single space.

use core::fmt;

use crate::parser::{AtRule, AtRuleBlock, ComponentValue, Declaration, Rule, StyleRule, Stylesheet};
use crate::tokenizer::token::write_ident;

/// Serialize a list of component values.
#[must_use]
pub fn serialize_values(values: &[ComponentValue]) -> String {
    let mut out = String::new();
    for value in values {
        out.push_str(&value.to_string());
    }
    out
}

const fn closing(token: char) -> char {
    match token {
        '{' => '}',
        '[' => ']',
        _ => ')',
    }
}

impl fmt::Display for ComponentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(token) => write!(f, "{token}"),
            Self::Function { name, value } => {
                write_ident(f, name)?;
                f.write_str("(")?;
                for v in value {
                    write!(f, "{v}")?;
                }
                f.write_str(")")
            }
            Self::Block { token, value } => {
                write!(f, "{token}")?;
                for v in value {
                    write!(f, "{v}")?;
                }
                write!(f, "{}", closing(*token))
            }
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.name)?;
        for v in &self.value {
            write!(f, "{v}")?;
        }
        if self.important {
            f.write_str("!important")?;
        }
        Ok(())
    }
}

fn write_declarations(f: &mut fmt::Formatter<'_>, declarations: &[Declaration]) -> fmt::Result {
    f.write_str("{")?;
    for (i, declaration) in declarations.iter().enumerate() {
        if i > 0 {
            f.write_str(";")?;
        }
        write!(f, "{declaration}")?;
    }
    f.write_str("}")
}

impl fmt::Display for StyleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, selector) in self.selectors.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(&selector.text)?;
        }
        write_declarations(f, &self.declarations)
    }
}

impl fmt::Display for AtRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)?;
        let prelude = self.prelude_text();
        if !prelude.is_empty() {
            write!(f, " {prelude}")?;
        }
        match &self.block {
            None => f.write_str(";"),
            Some(AtRuleBlock::Declarations(declarations)) => write_declarations(f, declarations),
            Some(AtRuleBlock::Rules(rules)) => {
                f.write_str("{")?;
                for rule in rules {
                    write!(f, "{rule}")?;
                }
                f.write_str("}")
            }
            Some(AtRuleBlock::Raw(values)) => {
                f.write_str("{")?;
                f.write_str(serialize_values(values).trim())?;
                f.write_str("}")
            }
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Style(rule) => write!(f, "{rule}"),
            Self::At(rule) => write!(f, "{rule}"),
        }
    }
}

impl fmt::Display for Stylesheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            write!(f, "{rule}")?;
        }
        Ok(())
    }
}
