use marktree::BlockKind;
use marktree::Document;

#[cfg(feature = "html")]
use marktree::html::HtmlFactory;
#[cfg(feature = "html")]
use marktree::Tag;
#[cfg(feature = "html")]
use marktree::TagOverrides;

#[cfg(feature = "html")]
fn render_with(src: &str, overrides: &TagOverrides<String>) -> String {
    marktree::parse(src, &mut HtmlFactory::new(), overrides).concat()
}

#[cfg(feature = "html")]
#[test]
fn disabled_extension_reproduces_source() {
    let mut overrides = TagOverrides::new();
    overrides.disable(Tag::Sup);
    assert_eq!(render_with("a ^b^ c", &overrides), "<p>a ^b^ c</p>");

    let mut overrides = TagOverrides::new();
    overrides.disable(Tag::Mark);
    assert_eq!(render_with("==x marks==", &overrides), "<p>==x marks==</p>");

    let mut overrides = TagOverrides::new();
    overrides.disable(Tag::Ins);
    assert_eq!(
        render_with("keep ++this++ too", &overrides),
        "<p>keep ++this++ too</p>",
    );
}

#[cfg(feature = "html")]
#[test]
fn disabled_checkbox_reproduces_marker() {
    let mut overrides = TagOverrides::new();
    overrides.disable(Tag::Checkbox);
    assert_eq!(
        render_with("- [ ] open", &overrides),
        "<ul><li>[ ] open</li></ul>",
    );
}

#[cfg(feature = "html")]
#[test]
fn constructor_override_replaces_node() {
    let mut overrides = TagOverrides::new();
    overrides.set(Tag::A, |attrs: &marktree::Attrs, children: Vec<String>| {
        let href = attrs
            .iter()
            .find(|(k, _)| *k == "href")
            .map(|(_, v)| v.as_str())
            .unwrap_or("");
        format!("<a class=\"ext\" href=\"{}\">{}</a>", href, children.concat())
    });
    assert_eq!(
        render_with("[x](/u)", &overrides),
        "<p><a class=\"ext\" href=\"/u\">x</a></p>",
    );
}

#[test]
fn block_spans_index_source() {
    let doc = Document::parse("# Foo\n\npara here");
    let blocks = doc.children();
    assert_eq!(blocks.len(), 2);
    assert_eq!(&doc.src()[blocks[0].span.start()..blocks[0].span.end()], "# Foo");
    assert_eq!(
        &doc.src()[blocks[1].span.start()..blocks[1].span.end()],
        "para here",
    );
}

#[test]
fn tightness_flips_on_blank_line() {
    let tight = Document::parse("- a\n- b");
    let loose = Document::parse("- a\n\n- b");
    match (&tight.children()[0].kind, &loose.children()[0].kind) {
        (
            BlockKind::List { tight: t, .. },
            BlockKind::List { tight: l, .. },
        ) => {
            assert!(*t);
            assert!(!*l);
        }
        _ => panic!("expected lists"),
    }
}

#[test]
fn every_input_parses() {
    // no error channel: odd input still yields a tree
    for src in ["", "\n\n\n", "][", "***a", "`", "|", "> > >", "- - -\t-"] {
        let _ = Document::parse(src);
    }
}
