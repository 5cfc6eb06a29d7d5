use pretty_assertions::assert_eq;
use prosa_lib::builder::segment;
use prosa_lib::config::SourceFormat;
use prosa_lib::markup::Token;
use prosa_lib::scope::ScopeTable;
use prosa_lib::segment::{Document, SegmentKind};
use prosa_lib::{Config, SegmentBuilder, segment_document};
use std::sync::Arc;

fn scopes_and_texts(document: &Document) -> Vec<(String, String)> {
    document
        .iter()
        .map(|s| (s.scope.clone(), s.text.clone()))
        .collect()
}

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items.iter().map(|(a, b)| (a.to_string(), b.to_string())).collect()
}

#[test]
fn test_strong_inside_paragraph() {
    let document = segment("<p>Hello <strong>world</strong>!</p>", SourceFormat::Html, &ScopeTable::default());

    assert_eq!(
        scopes_and_texts(&document),
        pairs(&[("strong", "world"), ("p", "Hello world!")])
    );

    let strong = &document.segments[0];
    let paragraph = &document.segments[1];
    assert_eq!(strong.kind, SegmentKind::Inline);
    assert_eq!(strong.context.as_deref(), Some("Hello @@@@@!"));
    assert_eq!(paragraph.children.len(), 1);
    assert!(Arc::ptr_eq(strong, &paragraph.children[0]));
}

#[test]
fn test_image_alt_text_is_independent() {
    let document = segment(
        r#"<p>Look <img alt="a cat" src="x.png"> here</p>"#,
        SourceFormat::Html,
        &ScopeTable::default(),
    );
    assert_eq!(
        scopes_and_texts(&document),
        pairs(&[("text.attr.alt", "a cat"), ("p", "Look here")])
    );
}

#[test]
fn test_table_cell_link_resolves_to_cell() {
    let document = segment(
        r##"<table><tr><th>Name</th></tr><tr><td><a href="#">link text</a></td></tr></table>"##,
        SourceFormat::Html,
        &ScopeTable::default(),
    );
    assert_eq!(
        scopes_and_texts(&document),
        pairs(&[
            ("text.table.header", "Name"),
            ("link", "link text"),
            ("text.table.cell", "link text"),
        ])
    );
}

#[test]
fn test_summary_excludes_structural_scopes() {
    let document = segment(
        "<h2>Heading</h2><p>First paragraph.</p><table><tr><td>Cell</td></tr></table><p>Second paragraph.</p>",
        SourceFormat::Html,
        &ScopeTable::default(),
    );
    assert_eq!(document.summary, "First paragraph. Second paragraph. ");
}

#[test]
fn test_markdown_document() {
    let source = r#"# Guide

Install the *latest* release with [the installer](https://example.com).

- First item
- Second `item`

> A quote.

```sh
rm -rf /
```

![diagram of the flow](flow.png)
"#;
    let document = segment_document(source, SourceFormat::Markdown, &Config::default());

    assert_eq!(
        scopes_and_texts(&document),
        pairs(&[
            ("text.heading.h1", "Guide"),
            ("emphasis", "latest"),
            ("link", "the installer"),
            ("p", "Install the latest release with the installer."),
            ("text.list", "First item"),
            ("code", "item"),
            ("text.list", "Second `****`"),
            ("text.blockquote", "A quote."),
            ("text.attr.alt", "diagram of the flow"),
        ])
    );
    assert_eq!(document.summary, "Install the latest release with the installer. ");
    assert!(!document.iter().any(|s| s.text.contains("rm -rf")));
}

#[test]
fn test_rst_literal_is_masked() {
    let html = r#"<p>Run <tt class="docutils literal"><span class="pre">make</span> <span class="pre">all</span></tt>.</p>"#;
    let document = segment(html, SourceFormat::ReStructuredText, &ScopeTable::default());
    let block = document.with_scope("p").next().unwrap();
    assert!(!block.text.contains("make"));
    assert!(!block.text.contains("all"));
    assert!(block.text.starts_with("Run "));
}

#[test]
fn test_asciidoc_html_scopes() {
    let html = r#"<div class="paragraph"><p>Some <em>emphasis</em> here.</p></div>
<div class="ulist"><ul><li><p>An item</p></li></ul></div>"#;
    let document = segment(html, SourceFormat::AsciiDoc, &ScopeTable::default());

    assert_eq!(
        scopes_and_texts(&document),
        pairs(&[
            ("emphasis", "emphasis"),
            ("p", "Some emphasis here."),
            ("text.list", "An item"),
        ])
    );
    assert_eq!(document.segments[1].classes, vec!["paragraph"]);
}

#[test]
fn test_comments_are_segments() {
    let document = segment(
        "<p>One</p><!-- prosa Style.Rule = NO --><p>Two</p>",
        SourceFormat::Html,
        &ScopeTable::default(),
    );
    assert_eq!(
        scopes_and_texts(&document),
        pairs(&[("p", "One"), ("comment", "prosa Style.Rule = NO"), ("p", "Two")])
    );
}

#[test]
fn test_truncated_stream_keeps_earlier_segments() {
    let table = ScopeTable::default();
    let tokens = vec![
        Token::start("h1", &[]),
        Token::text("Title"),
        Token::end("h1"),
        Token::start("p", &[]),
        Token::text("Never closed"),
        Token::Error("EOF in tag".to_string()),
        Token::end("p"),
    ];
    let document = SegmentBuilder::new(&table, SourceFormat::Html).build(tokens);
    assert_eq!(scopes_and_texts(&document), pairs(&[("text.heading.h1", "Title")]));
}

#[test]
fn test_unterminated_html_tail_is_dropped() {
    let document = segment_document(
        "<p>Closed.</p><p>Hello <strong>world",
        SourceFormat::Html,
        &Config::default(),
    );
    assert_eq!(
        scopes_and_texts(&document),
        pairs(&[("p", "Closed."), ("strong", "world")])
    );
    assert_eq!(document.segments[1].context, None);
    assert_eq!(document.summary, "Closed. ");
}

#[test]
fn test_figure_image_keeps_alt_text() {
    let document = segment_document(
        r#"<figure><img alt="a cat" src="x.png"><figcaption>A caption</figcaption></figure>"#,
        SourceFormat::Html,
        &Config::default(),
    );
    assert_eq!(scopes_and_texts(&document), pairs(&[("text.attr.alt", "a cat")]));
    assert_eq!(document.segments[0].kind, SegmentKind::Attribute);
}

#[test]
fn test_repeated_word_context_masks_the_linked_occurrence() {
    let document = segment_document(
        "Read the docs, then open [the docs](https://example.com).\n",
        SourceFormat::Markdown,
        &Config::default(),
    );
    let link = document.with_scope("link").next().unwrap();
    assert_eq!(link.context.as_deref(), Some("Read the docs, then open @@@@@@@@."));
}

#[test]
fn test_unknown_tags_fall_back_to_prose() {
    let document = segment(
        "<custom-note><p>Inside a custom element</p></custom-note>",
        SourceFormat::Html,
        &ScopeTable::default(),
    );
    assert_eq!(scopes_and_texts(&document), pairs(&[("p", "Inside a custom element")]));
}

#[test]
fn test_document_serializes_to_json() {
    let document = segment("<p>A <a href=\"#\">link</a></p>", SourceFormat::Html, &ScopeTable::default());
    let json = serde_json::to_value(&document).unwrap();

    assert_eq!(json["segments"][0]["kind"], "inline");
    assert_eq!(json["segments"][0]["context"], "A @@@@");
    assert_eq!(json["segments"][1]["children"][0]["text"], "link");
    assert_eq!(json["summary"], "A link ");
}
