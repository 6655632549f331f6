//! Template grammar
//!
//! An indentation-sensitive templating language. Every line opens at most one entry and
//! closes it again at the end of the line; nesting comes from indentation, from explicit
//! `{ … }` groups, and from the `>` shorthand.
//!
//! ```text
//! !doctype html
//! html
//!   body.page[data-id="${page.id}"]
//!     ul#menu > li.item > a[href="/"] | Home
//!     for (item in items) {
//!       p.note | ${item.text}
//!     }
//!     |>
//!     Verbatim, multi-line
//!     text.
//!     |
//! ```
//!
//! Syntax summary
//!
//!     tag                    `div`, `a${suffix}`
//!     shorthand              `.cls`, `#id`, `div.a#b` (a leading `.`/`#` opens the shorthand tag)
//!     inheritance            `.&-item` (parent's class), `class.active: test` (conditional)
//!     attributes             `[href="/" disabled]`, whitespace flags `[<]` `[>]` `[<>]`
//!     text                   `| text`, `|> … |` multi-line, `|>…<|` inline
//!     comments               `// line`, `/* block */`
//!     groups                 `div { … }`
//!     shorthand nesting      `ul > li > a`
//!     sibling                `h1 + p`
//!     define / call          `name = (a, b)`, `name(args)`
//!     hidden class           `%name`
//!     markup fragment        `.|<b>raw markup</b>`
//!     doctype                `!doctype html`
//!     keywords               `if (…)`, `else`, `for (x in xs)` and whatever is registered
//!
//! The table lives in [`states`]; handlers are grouped by concern in [`entries`], [`text`]
//! and [`structure`].

mod entries;
mod states;
mod structure;
mod text;

use crate::bones::ast::{Fragment, NodeId, Tree};
use crate::bones::config::TemplateConfig;
use crate::bones::engine::{Grammar, Lexer};
use crate::bones::error::ParseResult;
use crate::bones::indentation::IndentationTracker;
use crate::bones::keywords::{KeywordError, KeywordMatcher, KeywordRegistry};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

/// What a template parse can be configured with
#[derive(Debug, Clone)]
pub struct TemplateSettings {
    /// Tag opened by a line starting with `.` or `#`
    pub shorthand_tag: String,
    pub keywords: KeywordRegistry,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            shorthand_tag: "div".to_string(),
            keywords: KeywordRegistry::standard(),
        }
    }
}

/// Per-parse state of the template grammar
#[derive(Debug)]
pub struct TemplateScratch {
    settings: Arc<TemplateSettings>,
    tracker: IndentationTracker,
    /// Open groups, by the level of the line that opened them
    groups: HashMap<NodeId, usize>,
    /// Fragments of the tag name read so far
    name_chain: Vec<Fragment>,
    /// Fragments of the attribute value or shorthand read so far
    value_chain: Vec<Fragment>,
    /// Fragments of the text read so far
    text_chain: Vec<Fragment>,
    /// `.` or `#` while reading shorthand
    shorthand: char,
    /// Attribute whose value is being read
    attribute: String,
    /// Run of backslashes inside a quoted value
    slashes: usize,
    keyword: Option<KeywordMatcher>,
    /// Keyword attribute the current slot fills
    slot: String,
    /// Where the `//` comment on the current line belongs
    comment_parent: Option<NodeId>,
}

impl TemplateScratch {
    pub fn new(settings: Arc<TemplateSettings>) -> Self {
        Self {
            settings,
            tracker: IndentationTracker::new(),
            groups: HashMap::new(),
            name_chain: Vec::new(),
            value_chain: Vec::new(),
            text_chain: Vec::new(),
            shorthand: '.',
            attribute: String::new(),
            slashes: 0,
            keyword: None,
            slot: String::new(),
            comment_parent: None,
        }
    }

    fn reset(&mut self) {
        *self = Self::new(self.settings.clone());
    }

    pub fn tracker(&self) -> &IndentationTracker {
        &self.tracker
    }
}

pub(crate) type Lx<'g> = Lexer<'g, TemplateScratch>;

static TEMPLATE: Lazy<Grammar<TemplateScratch>> =
    Lazy::new(|| states::build().expect("template grammar table is well-formed"));

static DEFAULT_SETTINGS: Lazy<Arc<TemplateSettings>> =
    Lazy::new(|| Arc::new(TemplateSettings::default()));

pub fn template_grammar() -> &'static Grammar<TemplateScratch> {
    &TEMPLATE
}

/// Parses templates with a fixed set of settings; cheap to clone and share
#[derive(Debug, Clone)]
pub struct TemplateParser {
    settings: Arc<TemplateSettings>,
}

impl TemplateParser {
    /// Standard keywords, `div` as the shorthand tag
    pub fn new() -> Self {
        Self {
            settings: DEFAULT_SETTINGS.clone(),
        }
    }

    pub fn with_settings(settings: TemplateSettings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }

    pub fn with_keywords(keywords: KeywordRegistry) -> Self {
        Self::with_settings(TemplateSettings {
            keywords,
            ..TemplateSettings::default()
        })
    }

    pub fn from_config(config: &TemplateConfig) -> Result<Self, KeywordError> {
        Ok(Self::with_settings(TemplateSettings {
            shorthand_tag: config.shorthand_tag.clone(),
            keywords: KeywordRegistry::from_specs(&config.keywords)?,
        }))
    }

    pub fn settings(&self) -> &TemplateSettings {
        &self.settings
    }

    pub fn keywords(&self) -> &KeywordRegistry {
        &self.settings.keywords
    }

    /// Parses `source`; line endings are normalized to `\n` and a final newline is ensured
    pub fn parse(&self, source: &str) -> ParseResult<Tree> {
        let source = normalize_source(source);
        TEMPLATE.parse(&source, TemplateScratch::new(self.settings.clone()))
    }
}

impl Default for TemplateParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses a template with the default settings
pub fn parse_template(source: &str) -> ParseResult<Tree> {
    TemplateParser::new().parse(source)
}

/// Normalizes `\r\n` and ensures the source ends with a newline
fn normalize_source(source: &str) -> String {
    let mut normalized = source.replace("\r\n", "\n");
    if !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}
