//! Template grammar, element by element
//!
//! Each test loads one curated sample from `bones::testing::samples` and checks the whole
//! tree with `assert_tree`. Small variations are covered by rstest tables on inline sources.

use bonelex::bones::ast::{DefineKind, Fragment, InheritFrom, NodeKind};
use bonelex::bones::grammars::template::{TemplateParser, TemplateSettings};
use bonelex::bones::testing::{assert_tree, samples};
use bonelex::{parse_template, Tree};
use rstest::rstest;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn parse(source: &str) -> Tree {
    init_logger();
    match parse_template(source) {
        Ok(tree) => tree,
        Err(err) => panic!("failed to parse {:?}: {}", source, err),
    }
}

fn sample(name: &str) -> Tree {
    parse(samples::template(name))
}

#[test]
fn test_nav_nests_by_indentation_and_shorty() {
    let tree = sample("nav");

    assert_tree(&tree).child_count(1).child(0, |nav| {
        nav.assert_tag("nav").line(0).child_count(1).child(0, |ul| {
            ul.assert_tag("ul")
                .attr_literal("class", "menu")
                .line(1)
                .child_count(2)
                .child(0, |li| {
                    li.assert_tag("li").shorty(true).child_count(1).child(0, |a| {
                        a.assert_tag("a")
                            .attr_literal("href", "/")
                            .child(0, |text| text.assert_text("Home").multiline(false))
                    })
                })
                .child(1, |li| {
                    li.assert_tag("li").line(3).child(0, |a| {
                        a.assert_tag("a")
                            .attr_literal("href", "/about")
                            .child(0, |text| text.assert_text("About"))
                    })
                })
        })
    });
}

#[test]
fn test_page_document() {
    let tree = sample("page");

    assert_tree(&tree)
        .child_count(2)
        .child(0, |dtd| dtd.assert_dtd("doctype html"))
        .child(1, |html| {
            html.assert_tag("html")
                .child_count(2)
                .child(0, |head| {
                    head.assert_tag("head")
                        .child(0, |title| title.assert_tag("title").child(0, |t| t.assert_text("Sample")))
                })
                .child(1, |body| {
                    body.assert_tag("body")
                        .attr_literal("id", "page")
                        .attr_literal("class", "home")
                        .child_count(3)
                        .child(0, |wrapper| {
                            wrapper
                                .assert_tag("div")
                                .attr_literal("class", "wrapper")
                                .child_count(2)
                                .child(0, |h1| h1.assert_tag("h1").child(0, |t| t.assert_text("Hello")))
                                .child(1, |p| {
                                    p.assert_tag("p")
                                        .child_count(2)
                                        .child(0, |t| t.assert_text("First line"))
                                        .child(1, |t| t.assert_text("Second line"))
                                })
                        })
                        .child(1, |br| br.assert_tag("br").child_count(0))
                        .child(2, |hr| hr.assert_tag("hr").child_count(0))
                })
        });
}

#[test]
fn test_attributes() {
    let tree = sample("attributes");

    assert_tree(&tree)
        .child_count(2)
        .child(0, |input| {
            input
                .assert_tag("input")
                .attr_count(5)
                .attr_literal("id", "q")
                .attr_literal("type", "text")
                .attr_literal("name", "q")
                .attr_literal("placeholder", "Search \"all\"")
                .attr_values("required", &[vec![Fragment::Boolean(true)]])
                .ws(false, false)
        })
        .child(1, |a| {
            a.assert_tag("a")
                .attr_values(
                    "class",
                    &[
                        vec![Fragment::literal("button")],
                        vec![Fragment::Inherit(InheritFrom::Parent), Fragment::literal("-primary")],
                    ],
                )
                .attr_values("href", &[vec![Fragment::expression("url")]])
                .ws(true, true)
                .child(0, |text| text.assert_text("Go"))
        });
}

#[test]
fn test_text_forms() {
    let tree = sample("text");

    assert_tree(&tree)
        .child_count(3)
        .child(0, |p| {
            p.assert_tag("p").child(0, |text| {
                text.assert_text("Inline ${user.name}!").text_fragments(&[
                    Fragment::literal("Inline "),
                    Fragment::expression("user.name"),
                    Fragment::literal("!"),
                ])
            })
        })
        .child(1, |pre| {
            pre.assert_tag("pre").child_count(1).child(0, |text| {
                text.assert_text("  line one\n    line two")
                    .multiline(true)
                    .line(1)
            })
        })
        .child(2, |p| {
            p.assert_tag("p")
                .child(0, |text| text.assert_text(" short ").multiline(true))
        });
}

#[test]
fn test_groups() {
    let tree = sample("groups");

    assert_tree(&tree)
        .child_count(2)
        .child(0, |ul| {
            ul.assert_tag("ul")
                .group(true)
                .child_count(2)
                .child(0, |li| li.assert_tag("li").child(0, |t| t.assert_text("one")))
                .child(1, |li| li.assert_tag("li").child(0, |t| t.assert_text("two")))
        })
        .child(1, |div| {
            div.assert_tag("div")
                .group(true)
                .child_count(1)
                .child(0, |span| span.assert_tag("span").child_count(0))
        });
}

#[test]
fn test_keywords() {
    let tree = sample("keywords");

    assert_tree(&tree)
        .child_count(4)
        .child(0, |kw| {
            kw.assert_keyword("if")
                .variant(0)
                .keyword_attr("test", "user.admin")
                .child(0, |p| p.assert_tag("p").child(0, |t| t.assert_text("Welcome back")))
        })
        .child(1, |kw| {
            kw.assert_keyword("else")
                .variant(0)
                .child(0, |p| p.assert_tag("p").child(0, |t| t.assert_text("Sign in")))
        })
        .child(2, |kw| {
            kw.assert_keyword("for")
                .variant(0)
                .keyword_attr("as", "item")
                .keyword_attr("data", "items")
                .child(0, |li| li.assert_tag("li").child(0, |t| t.assert_text("${item}")))
        })
        .child(3, |kw| {
            kw.assert_keyword("for")
                .variant(1)
                .group(true)
                .keyword_attr("key", "key")
                .keyword_attr("as", "value")
                .keyword_attr("data", "pairs")
                .child_count(1)
                .child(0, |dt| dt.assert_tag("dt"))
        });
}

#[test]
fn test_defines_calls_and_hidden_classes() {
    let tree = sample("defines");

    assert_tree(&tree)
        .child_count(3)
        .child(0, |define| {
            define
                .assert_define("card", DefineKind::Parenthesis, &["title", "body"])
                .child(0, |card| {
                    card.assert_tag("div")
                        .attr_literal("class", "card")
                        .child_count(2)
                        .child(0, |h2| h2.assert_tag("h2").child(0, |t| t.assert_text("${title}")))
                        .child(1, |t| t.assert_text("${body}"))
                })
        })
        .child(1, |call| call.assert_call("card", &["\"Hello\"", "\"World\""]).child_count(0))
        .child(2, |hidden| {
            hidden
                .assert_hidden_class("muted")
                .child(0, |span| span.assert_tag("span").child(0, |t| t.assert_text("quiet")))
        });
}

#[test]
fn test_comments() {
    let tree = sample("comments");

    assert_tree(&tree)
        .child_count(2)
        .child(0, |c| c.assert_comment(" top comment"))
        .child(1, |div| {
            div.assert_tag("div")
                .child_count(2)
                .child(0, |c| c.assert_comment(" block\n     comment ").line(2))
                .child(1, |p| p.assert_tag("p").line(4).child(0, |t| t.assert_text("text")))
        });
}

#[test]
fn test_markup_fragment_and_conditional_class() {
    let tree = sample("fragments");

    assert_tree(&tree).child_count(1).child(0, |p| {
        p.assert_tag("p")
            .attr_values(
                "class",
                &[vec![Fragment::Group {
                    test: "${selected}".to_string(),
                    fragments: vec![Fragment::literal("active")],
                }]],
            )
            .child_count(2)
            .child(0, |b| {
                b.assert_tag("b")
                    .line(1)
                    .child(0, |t| t.assert_text("bold"))
            })
            .child(1, |t| t.assert_text(" text"))
    });
}

#[rstest]
#[case("div", "div")]
#[case("my-tag_2", "my-tag_2")]
#[case("${tag}", "${tag}")]
#[case("x${a}y", "x${a}y")]
#[case("h1 ", "h1")]
fn test_tag_names(#[case] source: &str, #[case] name: &str) {
    let tree = parse(source);
    assert_tree(&tree)
        .child_count(1)
        .child(0, |tag| tag.kind(NodeKind::Tag).assert_tag(name).child_count(0));
}

#[rstest]
#[case(".a", "div", "class", "a")]
#[case("#main", "div", "id", "main")]
#[case("span.a.b", "span", "class", "a b")]
#[case("p.${cls}", "p", "class", "${cls}")]
#[case("li.&-item", "li", "class", "&-item")]
#[case("a#top.x", "a", "id", "top")]
fn test_shorthand(#[case] source: &str, #[case] tag: &str, #[case] attr: &str, #[case] value: &str) {
    let tree = parse(source);
    assert_tree(&tree).child(0, |node| node.assert_tag(tag).attr_literal(attr, value));
}

#[rstest]
#[case("b[<]", true, false)]
#[case("b[>]", false, true)]
#[case("b[<>]", true, true)]
#[case("b[<][title=\"t\"]", true, false)]
fn test_whitespace_flags(#[case] source: &str, #[case] before: bool, #[case] after: bool) {
    let tree = parse(source);
    assert_tree(&tree).child(0, |b| b.assert_tag("b").ws(before, after));
}

#[rstest]
#[case(r#"a[title="x \"y\""]"#, "x \"y\"")]
#[case(r#"a[title="back\\slash"]"#, "back\\slash")]
#[case(r#"a[title=""]"#, "")]
#[case(r#"a[title="\${not}"]"#, "\\${not}")]
fn test_quoted_values(#[case] source: &str, #[case] value: &str) {
    let tree = parse(source);
    assert_tree(&tree).child(0, |a| a.attr_literal("title", value));
}

#[test]
fn test_attribute_value_mixes_literals_and_expressions() {
    let tree = parse(r#"img[src="/img/${name}.png"]"#);
    assert_tree(&tree).child(0, |img| {
        img.attr_values(
            "src",
            &[vec![
                Fragment::literal("/img/"),
                Fragment::expression("name"),
                Fragment::literal(".png"),
            ]],
        )
    });
}

#[test]
fn test_shorty_chain_closes_with_the_line() {
    let tree = parse("ul > li > a | x\np\n");
    assert_tree(&tree)
        .child_count(2)
        .child(0, |ul| {
            ul.assert_tag("ul").shorty(true).child(0, |li| {
                li.assert_tag("li")
                    .shorty(true)
                    .child(0, |a| a.assert_tag("a").shorty(false).child(0, |t| t.assert_text("x")))
            })
        })
        .child(1, |p| p.assert_tag("p"));
}

#[test]
fn test_indentation_under_a_shorty_chain() {
    let tree = parse("ul > li\n  a | x\n");
    assert_tree(&tree).child(0, |ul| {
        ul.child(0, |li| li.assert_tag("li").child(0, |a| a.assert_tag("a")))
    });
}

#[test]
fn test_sibling_continuation() {
    let tree = parse("div\n  br + hr + img\n");
    assert_tree(&tree).child(0, |div| {
        div.child_count(3)
            .child(0, |n| n.assert_tag("br"))
            .child(1, |n| n.assert_tag("hr"))
            .child(2, |n| n.assert_tag("img"))
    });
}

#[test]
fn test_tab_indentation() {
    let tree = parse("div\n\tspan\n\t\tem\n\tp\n");
    assert_tree(&tree).child(0, |div| {
        div.child_count(2)
            .child(0, |span| span.assert_tag("span").child(0, |em| em.assert_tag("em")))
            .child(1, |p| p.assert_tag("p"))
    });
}

#[test]
fn test_crlf_and_missing_final_newline() {
    let tree = parse("div\r\n  span | hi");
    assert_tree(&tree).child(0, |div| {
        div.child(0, |span| span.assert_tag("span").child(0, |t| t.assert_text("hi")))
    });
}

#[test]
fn test_blank_lines_do_not_move_the_current_node() {
    let tree = parse("ul\n  li\n\n     \n  li\n");
    assert_tree(&tree).child(0, |ul| ul.child_count(2));
}

#[test]
fn test_group_body_nests_deeper_levels() {
    let tree = parse("ul {\n  li\n    a\n  li\n}\n");
    assert_tree(&tree).child(0, |ul| {
        ul.group(true)
            .child_count(2)
            .child(0, |li| li.child(0, |a| a.assert_tag("a")))
            .child(1, |li| li.assert_tag("li").child_count(0))
    });
}

#[test]
fn test_define_kinds() {
    let tree = parse("a = {x y}\nb = [one, two]\nc = ()\n");
    assert_tree(&tree)
        .child_count(3)
        .child(0, |d| d.assert_define("a", DefineKind::Brace, &["x", "y"]))
        .child(1, |d| d.assert_define("b", DefineKind::Bracket, &["one", "two"]))
        .child(2, |d| d.assert_define("c", DefineKind::Parenthesis, &[]));
}

#[test]
fn test_call_arguments_are_opaque() {
    let tree = parse("widget(a, f(b, c), \"x,y\") | after\n");
    assert_tree(&tree).child(0, |call| {
        call.assert_call("widget", &["a", "f(b, c)", "\"x,y\""])
            .child(0, |t| t.assert_text("after"))
    });
}

#[test]
fn test_shorthand_tag_is_configurable() {
    let parser = TemplateParser::with_settings(TemplateSettings {
        shorthand_tag: "section".to_string(),
        ..TemplateSettings::default()
    });
    let tree = parser.parse(".intro\n").unwrap();
    assert_tree(&tree).child(0, |n| n.assert_tag("section").attr_literal("class", "intro"));
}

#[test]
fn test_hash_pipe_is_a_markup_fragment() {
    let tree = parse("div\n  #|<i>x</i>\n");
    assert_tree(&tree).child(0, |div| div.child_count(1).child(0, |i| i.assert_tag("i")));
}

#[rstest]
#[case::one_per_line("div[\n  a=\"1\"\n  b\n]\np\n")]
#[case::continued("div[a=\"1\"\n     b]\np\n")]
fn test_attribute_lists_span_lines(#[case] source: &str) {
    let tree = parse(source);
    assert_tree(&tree)
        .child_count(2)
        .child(0, |div| {
            div.assert_tag("div")
                .attr_count(2)
                .attr_literal("a", "1")
                .has_attr("b")
                .child_count(0)
        })
        .child(1, |p| p.assert_tag("p"));
}

#[test]
fn test_comment_off_the_indent_unit_stays_with_current_node() {
    let tree = parse("div\n  span\n     // note\n  b\n");
    assert_tree(&tree).child_count(1).child(0, |div| {
        div.assert_tag("div")
            .child_count(3)
            .child(0, |span| span.assert_tag("span").child_count(0))
            .child(1, |c| c.assert_comment(" note"))
            .child(2, |b| b.assert_tag("b"))
    });
}

#[test]
fn test_dedented_comment_never_takes_children() {
    let tree = parse("div\n  span\n// note\n  b\n");
    assert_tree(&tree)
        .child_count(2)
        .child(0, |div| {
            div.assert_tag("div")
                .child_count(2)
                .child(0, |span| span.assert_tag("span"))
                .child(1, |b| b.assert_tag("b"))
        })
        .child(1, |c| c.assert_comment(" note").child_count(0));
}

#[test]
fn test_keyword_expression_runs_across_lines() {
    let tree = parse("if (a &&\n    b)\n  p\n");
    assert_tree(&tree).child_count(1).child(0, |kw| {
        kw.assert_keyword("if")
            .keyword_attr("test", "a &&\n    b")
            .child_count(1)
            .child(0, |p| p.assert_tag("p"))
    });
}

#[test]
fn test_trailing_comment_is_a_sibling() {
    let tree = parse("div // trailing\np\n");
    assert_tree(&tree)
        .child_count(3)
        .child(0, |div| div.assert_tag("div").child_count(0))
        .child(1, |c| c.assert_comment(" trailing"))
        .child(2, |p| p.assert_tag("p"));
}
