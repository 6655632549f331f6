//! The pattern language for keyword variants
//!
//! A variant spells the whole directive, starting with the keyword itself:
//!
//!     @name:ident    identifier slot, stored under attribute `name`
//!     @name:expr     balanced expression slot, ends at the variant's next literal
//!                    (or the end of the line when nothing follows)
//!     blanks         one optional whitespace element; absorbs repeated blanks
//!     other          a literal character
//!
//! Patterns are tokenised with logos.

use super::KeywordError;
use logos::Logos;

#[derive(Logos, Debug, PartialEq, Clone)]
enum PatternToken {
    #[regex(r"@[A-Za-z_][A-Za-z0-9_-]*:[A-Za-z]+", |lex| lex.slice()[1..].to_string())]
    Slot(String),

    #[regex(r"[ \t]+")]
    Blank,

    #[regex(r"[^@ \t]", |lex| lex.slice().chars().next())]
    Literal(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Identifier,
    Expression,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub attribute: String,
    pub kind: SlotKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Literal(char),
    Space,
    Slot(Slot),
}

impl Element {
    pub fn is_space(&self) -> bool {
        matches!(self, Element::Space)
    }
}

/// Parses `source` into the elements that follow the keyword `name`
pub fn parse_variant(name: &str, source: &str) -> Result<Vec<Element>, KeywordError> {
    let missing_name = || KeywordError::MissingName {
        name: name.to_string(),
        variant: source.to_string(),
    };
    let rest = source.strip_prefix(name).ok_or_else(missing_name)?;
    if rest
        .chars()
        .next()
        .is_some_and(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
    {
        return Err(missing_name());
    }

    let mut elements = Vec::new();
    let mut lexer = PatternToken::lexer(rest);
    while let Some(token) = lexer.next() {
        let token = token.map_err(|_| KeywordError::InvalidPattern {
            name: name.to_string(),
            variant: source.to_string(),
            text: lexer.slice().to_string(),
        })?;
        match token {
            PatternToken::Blank => elements.push(Element::Space),
            PatternToken::Literal(ch) => elements.push(Element::Literal(ch)),
            PatternToken::Slot(slot) => {
                let (attribute, kind) = slot.split_once(':').unwrap_or((slot.as_str(), ""));
                let kind = match kind {
                    "ident" => SlotKind::Identifier,
                    "expr" => SlotKind::Expression,
                    other => {
                        return Err(KeywordError::UnknownSlotKind {
                            name: name.to_string(),
                            kind: other.to_string(),
                        })
                    }
                };
                elements.push(Element::Slot(Slot {
                    attribute: attribute.to_string(),
                    kind,
                }));
            }
        }
    }
    Ok(elements)
}
