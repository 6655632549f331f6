//! Curated sample sources
//!
//! The samples live in `docs/samples/` and are embedded at compile time, so tests never
//! depend on the working directory. Each sample exercises one area of its grammar:
//!
//!     template/nav          nested tags, shorthand class, shorty chains, inline text
//!     template/page        declaration, id/class shorthand, text lines, sibling `+`
//!     template/attributes  bracket attributes, escapes, inheritance, whitespace flags
//!     template/text        expressions in text, `|>` blocks, `<|`
//!     template/groups      `{ … }` over several lines and on one line
//!     template/keywords    `if`, `else`, both `for` variants
//!     template/defines     define, call, hidden class
//!     template/comments    line and block comments
//!     template/fragments   `.|` markup fragments, conditional classes
//!
//!     markup/page          declaration, attributes, comment, self-closing tags, CDATA
//!     markup/escapes       escaped quotes in attribute values
//!     markup/whitespace    whitespace text between tags

/// Names of every template sample
pub const TEMPLATES: &[&str] = &[
    "nav",
    "page",
    "attributes",
    "text",
    "groups",
    "keywords",
    "defines",
    "comments",
    "fragments",
];

/// Names of every markup sample
pub const MARKUP: &[&str] = &["page", "escapes", "whitespace"];

/// The template sample called `name`
///
/// # Panics
///
/// When no such sample exists.
pub fn template(name: &str) -> &'static str {
    match name {
        "nav" => include_str!("../../../docs/samples/template/nav.bone"),
        "page" => include_str!("../../../docs/samples/template/page.bone"),
        "attributes" => include_str!("../../../docs/samples/template/attributes.bone"),
        "text" => include_str!("../../../docs/samples/template/text.bone"),
        "groups" => include_str!("../../../docs/samples/template/groups.bone"),
        "keywords" => include_str!("../../../docs/samples/template/keywords.bone"),
        "defines" => include_str!("../../../docs/samples/template/defines.bone"),
        "comments" => include_str!("../../../docs/samples/template/comments.bone"),
        "fragments" => include_str!("../../../docs/samples/template/fragments.bone"),
        other => panic!("No template sample named `{}`", other),
    }
}

/// The markup sample called `name`
///
/// # Panics
///
/// When no such sample exists.
pub fn markup(name: &str) -> &'static str {
    match name {
        "page" => include_str!("../../../docs/samples/markup/page.html"),
        "escapes" => include_str!("../../../docs/samples/markup/escapes.html"),
        "whitespace" => include_str!("../../../docs/samples/markup/whitespace.html"),
        other => panic!("No markup sample named `{}`", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bones::grammars::markup::parse_markup;
    use crate::bones::grammars::template::parse_template;

    #[test]
    fn test_every_sample_parses() {
        for name in TEMPLATES {
            if let Err(err) = parse_template(template(name)) {
                panic!("template sample `{}` failed: {}", name, err);
            }
        }
        for name in MARKUP {
            if let Err(err) = parse_markup(markup(name)) {
                panic!("markup sample `{}` failed: {}", name, err);
            }
        }
    }
}
