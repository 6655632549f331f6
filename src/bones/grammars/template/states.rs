//! The template state table
//!
//! States are named after what they read; `x:await` states skip blanks until `x` starts.

use super::{entries, structure, text, TemplateScratch};
use crate::bones::engine::{
    Grammar, GrammarError, Step, TokenAction, Transition, Trigger, DEFAULT_STATE,
};

pub(super) fn build() -> Result<Grammar<TemplateScratch>, GrammarError> {
    let blank = Trigger::class("blank");
    let name = Trigger::class("name");
    let attr = Trigger::class("attr");
    let ident = Trigger::class("ident");

    Grammar::builder("template")
        .class("blank", &[" ", "\t"])
        .class("name", &["a-z", "A-Z", "0-9", "-", "_"])
        .class("name_start", &["a-z", "A-Z", "_"])
        .class("attr", &["a-z", "A-Z", "0-9", "-", "_", ":", "@", "."])
        .class("ident", &["a-z", "A-Z", "0-9", "_", "$"])
        .class("ident_start", &["a-z", "A-Z", "_", "$"])
        // Line starts
        .state(DEFAULT_STATE, |s| {
            s.step(blank, Step::skip())
                .step('\n', Step::skip())
                .step(Trigger::class("name_start"), Step::begin("entry"))
                .call('$', entries::name_expression_start)
                .call_each(".#", entries::shorthand_start)
                .step('%', Step::to("hidden_class"))
                .step('!', Step::to("dtd"))
                .step('|', Step::to("text:await"))
                .step('/', Step::to("comment:await"))
                .call('}', structure::close_group)
                .fail(Trigger::Any)
        })
        // Entries: a name, then whatever follows it on the line
        .state("entry", |s| {
            s.step(name, Step::extend())
                .call('$', entries::name_expression)
                .step(blank, Step::reconsume("entry:stopper:await"))
                .step_each(".#[({}>+|/=\n", Step::reconsume("entry:stopper"))
                .fail(Trigger::Any)
        })
        .state("entry:stopper:await", |s| {
            s.step(blank, Step::extend())
                .step_each("{}(=|/>+[\n", Step::reconsume("entry:stopper"))
                .call(Trigger::Any, entries::keyword_after_blank)
        })
        .state("entry:stopper", |s| s.call(Trigger::Any, entries::entry_stopper))
        .state("entry:group", |s| {
            s.step(blank, Step::skip())
                .call('{', structure::open_group)
                .call('}', structure::close_group)
                .call('>', structure::shorty)
                .call('+', structure::sibling)
                .step('|', Step::to("text:await"))
                .step('/', Step::to("comment:await"))
                .call('\n', structure::line_end)
                .fail(Trigger::Any)
        })
        // Shorthand: `.a#b`
        .state("id_or_class", |s| {
            s.step(name, Step::extend())
                .call('&', entries::inherit_parent)
                .call('$', entries::shorthand_expression)
                .call_each(".#", entries::shorthand_next)
                .call('[', entries::shorthand_attributes)
                .call(blank, entries::shorthand_end)
                .call_each("{}>+|/\n", entries::shorthand_end)
                .fail(Trigger::Any)
        })
        .state("class_attr", |s| {
            s.step(name, Step::extend())
                .call('&', entries::inherit_self)
                .call('$', entries::shorthand_expression)
                .call(':', entries::class_condition)
                .fail(Trigger::Any)
        })
        .state("hidden_class", |s| {
            s.step(name, Step::extend())
                .call(blank, entries::hidden_class)
                .call_each("{}>+|/\n", entries::hidden_class)
                .fail(Trigger::Any)
        })
        // Inline attributes: `[name="value" flag]`
        // Attribute lists may run over several lines
        .state("inline_attr:await", |s| {
            s.step(blank, Step::skip())
                .step('\n', Step::skip())
                .call_each("<>", entries::whitespace_flag)
                .step(attr, Step::begin("inline_attr:name"))
                .call('=', entries::empty_attribute_name)
                .step(']', Step::to("inline_attr:next"))
                .fail(Trigger::Any)
        })
        .state("inline_attr:ws", |s| {
            s.call_each("<>", entries::whitespace_flag)
                .step(']', Step::to("inline_attr:next"))
                .fail(Trigger::Any)
        })
        .state("inline_attr:name", |s| {
            s.step(attr, Step::extend())
                .call('=', entries::attribute_name)
                .call(blank, entries::boolean_attribute)
                .call('\n', entries::boolean_attribute)
                .call(']', entries::boolean_attribute)
                .fail(Trigger::Any)
        })
        .state("inline_attr:value:await", |s| {
            s.call('"', entries::value_open).fail(Trigger::Any)
        })
        .state("inline_attr:value", |s| {
            s.call('\\', entries::value_backslash)
                .call('"', entries::value_quote)
                .call('$', entries::value_expression)
                .fail('\n')
                .call(Trigger::Any, entries::value_char)
        })
        .state("inline_attr:after", |s| {
            s.step(blank, Step::to("inline_attr:await"))
                .step('\n', Step::to("inline_attr:await"))
                .step(']', Step::to("inline_attr:next"))
                .fail(Trigger::Any)
        })
        .state("inline_attr:next", |s| {
            s.step('[', Step::to("inline_attr:await"))
                .step(Trigger::Any, Step::reconsume("entry:group"))
        })
        // Define and call
        .state("define", |s| {
            s.step(blank, Step::skip())
                .call_each("{[(", entries::define_open)
                .fail(Trigger::Any)
        })
        .state("define:params", |s| {
            s.step(ident, Step::extend())
                .call(blank, entries::define_param)
                .call(',', entries::define_param)
                .call_each("}])", entries::define_close)
                .fail(Trigger::Any)
        })
        // Text
        .state("text:await", |s| {
            s.step(blank, Step::skip())
                .call('>', text::multiline_open)
                .call('\n', text::text_end)
                .step(Trigger::Any, Step::new(TokenAction::Begin, Transition::Reconsume("text")))
        })
        .state("text", |s| {
            s.call('$', text::text_expression).call('\n', text::text_end)
        })
        .state("text:multiline", |s| {
            s.call('$', text::text_expression)
                .call('<', text::inline_terminator)
                .call('\n', text::multiline_line_end)
        })
        .state("text:end", |s| {
            s.step(blank, Step::skip())
                .call('\n', text::after_text)
                .fail(Trigger::Any)
        })
        // Comments and declarations
        .state("comment:await", |s| {
            s.step('/', Step::to("comment"))
                .step('*', Step::to("multi_comment"))
                .fail(Trigger::Any)
        })
        .state("comment", |s| s.call('\n', text::comment_end))
        .state("multi_comment", |s| s.call('/', text::multi_comment_end))
        .state("dtd", |s| s.call('\n', text::dtd_end))
        // Keyword directives
        .state("keyword", |s| s.call(Trigger::Any, structure::keyword_step))
        .state("keyword:ident", |s| {
            s.step(blank, Step::skip())
                .step(Trigger::class("ident_start"), Step::begin("keyword:ident:next"))
                .call(Trigger::Any, structure::keyword_missing_ident)
        })
        .state("keyword:ident:next", |s| {
            s.step(ident, Step::extend())
                .call(Trigger::Any, structure::keyword_ident)
        })
        .state("keyword:expr", |s| s.call(Trigger::Any, structure::keyword_expression))
        .state("keyword:end", |s| {
            s.step(blank, Step::skip())
                .call('{', structure::open_group)
                .call('\n', structure::line_end)
                .call(Trigger::Any, structure::keyword_trailing)
        })
        .on_start(structure::template_start)
        .on_indent(structure::template_indent)
        .on_end(structure::template_end)
        .build()
}
