//! A Markdown parser producing a document tree.
//!
//! The parser runs in two passes: a line-oriented block pass builds the
//! [`Block`] tree and harvests link reference definitions, then an inline
//! pass resolves the raw text of every leaf into [`Inline`] trees. The
//! finished [`Document`] renders through a caller-supplied [`NodeFactory`]
//! under a [`TagOverrides`] configuration.
//!
//! Supported syntax is CommonMark plus tables and task lists, and the
//! underline (`__`), subscript (`~`), superscript (`^`), strikethrough
//! (`~~`), insert (`++`) and mark (`==`) inline extensions.
//!
//! ```
//! # #[cfg(feature = "html")] {
//! let mut factory = marktree::html::HtmlFactory::new();
//! let overrides = marktree::TagOverrides::new();
//! let nodes = marktree::parse("# Foo", &mut factory, &overrides);
//! assert_eq!(nodes.concat(), "<h1>Foo</h1>");
//! # }
//! ```
//!
//! Every input yields some tree; there is no error channel. Ambiguous
//! constructs fall back to literal text.

#[cfg(feature = "html")]
pub mod html;

mod block;
mod inline;
mod lex;
mod reference;
mod render;
mod span;

pub use render::Attrs;
pub use render::NodeFactory;
pub use render::Override;
pub use render::Tag;
pub use render::TagOverrides;
pub use span::Span;

const EOF: char = '\0';

/// A parsed document.
///
/// Owns a tab-expanded copy of the source so that block spans can
/// reproduce literal text for disabled tags.
#[derive(Debug)]
pub struct Document {
    src: String,
    children: Vec<Block>,
}

impl Document {
    /// Parse a document. Never fails: Markdown admits no invalid input.
    #[must_use]
    pub fn parse(src: &str) -> Self {
        let src = block::expand_tabs(src);
        let (mut children, refs) = block::scan(&src);
        for block in &mut children {
            block.resolve_inlines(&refs);
        }
        Document { src, children }
    }

    /// The tab-expanded source text.
    #[must_use]
    pub fn src(&self) -> &str {
        &self.src
    }

    /// Top-level blocks.
    #[must_use]
    pub fn children(&self) -> &[Block] {
        &self.children
    }

    /// Render the tree through a node factory. Returns the top-level
    /// nodes; the host owns the surrounding container.
    pub fn render<F: NodeFactory>(
        &self,
        factory: &mut F,
        overrides: &TagOverrides<F::Node>,
    ) -> Vec<F::Node> {
        render::render(self, factory, overrides)
    }
}

/// Parse and render in one step.
pub fn parse<F: NodeFactory>(
    src: &str,
    factory: &mut F,
    overrides: &TagOverrides<F::Node>,
) -> Vec<F::Node> {
    Document::parse(src).render(factory, overrides)
}

/// A block-level node with its extent in the document source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    /// A paragraph.
    Paragraph(Content),
    /// An ATX or setext heading, level 1-6.
    Heading { level: u8, content: Content },
    /// A thematic break, typically a horizontal rule.
    ThematicBreak,
    /// A code block indented by four spaces.
    IndentedCode { literal: String },
    /// A backtick or tilde fenced code block with its info string.
    FencedCode { info: String, literal: String },
    /// A raw HTML block, passed through unparsed.
    HtmlBlock { literal: String },
    /// A blockquote.
    Blockquote { children: Vec<Block> },
    /// A list. `tight` is fixed when the list closes, from whether any
    /// blank line appeared between or inside its items.
    List {
        kind: ListKind,
        tight: bool,
        items: Vec<ListItem>,
    },
    /// A table with one header row and zero or more body rows.
    Table {
        alignments: Vec<Alignment>,
        head: Vec<Content>,
        rows: Vec<Vec<Content>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// Bullet list, e.g. `- a`.
    Unordered { bullet: char },
    /// Numbered list, e.g. `3. a` or `3) a`. Start is capped at nine
    /// digits by the block pass.
    Ordered { start: u64, delim: char },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub children: Vec<Block>,
    /// Task list marker, if the item started with `[ ]` or `[x]`.
    pub checked: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Unspecified,
    Left,
    Center,
    Right,
}

/// Leaf text: the raw source run and, after the inline pass, its
/// resolved inline tree. Inline spans index `raw`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Content {
    pub raw: String,
    pub inlines: Vec<Inline>,
}

impl Content {
    pub(crate) fn new(raw: String) -> Self {
        Content {
            raw,
            inlines: Vec::new(),
        }
    }
}

/// An inline node with its extent in the owning leaf's raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inline {
    pub kind: InlineKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineKind {
    /// Literal text (escapes already dropped from the span).
    Str,
    /// A code span.
    Code { literal: String },
    /// Emphasis, `*` or `_` (strength 1).
    Emphasis { children: Vec<Inline> },
    /// Strong emphasis, `**` (strength 2).
    Strong { children: Vec<Inline> },
    /// Underline, `__` (extension).
    Underline { children: Vec<Inline> },
    /// Strikethrough, `~~` (extension).
    Delete { children: Vec<Inline> },
    /// Inserted text, `++` (extension).
    Insert { children: Vec<Inline> },
    /// Highlighted text, `==` (extension).
    Mark { children: Vec<Inline> },
    /// Superscript, `^` (extension).
    Superscript { children: Vec<Inline> },
    /// Subscript, `~` (extension).
    Subscript { children: Vec<Inline> },
    /// An inline, reference or shortcut link.
    Link {
        dest: String,
        title: Option<String>,
        children: Vec<Inline>,
    },
    /// An image. `alt` is the flattened plain text of the bracket content.
    Image {
        dest: String,
        title: Option<String>,
        alt: String,
    },
    /// A `<...>` autolink.
    Autolink { uri: String, email: bool },
    /// Raw inline HTML, passed through unparsed.
    RawHtml,
    /// A soft line break.
    Softbreak,
    /// A hard line break (trailing backslash or two spaces).
    Hardbreak,
}

impl Block {
    fn resolve_inlines(&mut self, refs: &reference::ReferenceTable) {
        match &mut self.kind {
            BlockKind::Paragraph(content)
            | BlockKind::Heading { content, .. } => content.resolve(refs),
            BlockKind::Blockquote { children } => {
                for child in children {
                    child.resolve_inlines(refs);
                }
            }
            BlockKind::List { items, .. } => {
                for item in items {
                    for child in &mut item.children {
                        child.resolve_inlines(refs);
                    }
                }
            }
            BlockKind::Table { head, rows, .. } => {
                for cell in head {
                    cell.resolve(refs);
                }
                for row in rows {
                    for cell in row {
                        cell.resolve(refs);
                    }
                }
            }
            BlockKind::ThematicBreak
            | BlockKind::IndentedCode { .. }
            | BlockKind::FencedCode { .. }
            | BlockKind::HtmlBlock { .. } => {}
        }
    }
}

impl Content {
    fn resolve(&mut self, refs: &reference::ReferenceTable) {
        self.inlines = inline::parse(&self.raw, refs);
    }
}

#[cfg(test)]
mod test {
    use super::Alignment;
    use super::BlockKind;
    use super::Document;
    use super::InlineKind;

    #[test]
    fn heading() {
        let doc = Document::parse("# Foo");
        assert_eq!(doc.children().len(), 1);
        match &doc.children()[0].kind {
            BlockKind::Heading { level, content } => {
                assert_eq!(*level, 1);
                assert_eq!(content.raw, "Foo");
            }
            b => panic!("{:?}", b),
        }
    }

    #[test]
    fn lazy_blockquote() {
        let doc = Document::parse("> foo\n> bar");
        match &doc.children()[0].kind {
            BlockKind::Blockquote { children } => match &children[0].kind {
                BlockKind::Paragraph(content) => assert_eq!(content.raw, "foo\nbar"),
                b => panic!("{:?}", b),
            },
            b => panic!("{:?}", b),
        }
    }

    #[test]
    fn reference_link() {
        let doc = Document::parse("[foo]: /url\n\n[foo]");
        assert_eq!(doc.children().len(), 1);
        match &doc.children()[0].kind {
            BlockKind::Paragraph(content) => match &content.inlines[0].kind {
                InlineKind::Link { dest, title, .. } => {
                    assert_eq!(dest, "/url");
                    assert_eq!(*title, None);
                }
                i => panic!("{:?}", i),
            },
            b => panic!("{:?}", b),
        }
    }

    #[test]
    fn reference_after_use() {
        // definitions may follow their first use
        let doc = Document::parse("[foo]\n\n[foo]: /url");
        match &doc.children()[0].kind {
            BlockKind::Paragraph(content) => {
                assert!(matches!(
                    content.inlines[0].kind,
                    InlineKind::Link { .. }
                ));
            }
            b => panic!("{:?}", b),
        }
    }

    #[test]
    fn table() {
        let doc = Document::parse("| a | b |\n|---|---|\n| 1 | 2 |");
        match &doc.children()[0].kind {
            BlockKind::Table {
                alignments,
                head,
                rows,
            } => {
                assert_eq!(
                    alignments,
                    &[Alignment::Unspecified, Alignment::Unspecified]
                );
                assert_eq!(head.len(), 2);
                assert_eq!(head[0].raw, "a");
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0][1].raw, "2");
            }
            b => panic!("{:?}", b),
        }
    }

    #[test]
    fn tightness() {
        let doc = Document::parse("- a\n- b");
        match &doc.children()[0].kind {
            BlockKind::List { tight, .. } => assert!(tight),
            b => panic!("{:?}", b),
        }
        let doc = Document::parse("- a\n\n- b");
        match &doc.children()[0].kind {
            BlockKind::List { tight, .. } => assert!(!tight),
            b => panic!("{:?}", b),
        }
    }
}
