use std::collections::HashMap;

use crate::Alignment;
use crate::Block;
use crate::BlockKind;
use crate::Content;
use crate::Document;
use crate::Inline;
use crate::InlineKind;
use crate::ListItem;
use crate::ListKind;
use crate::Span;

/// Attributes passed to the node factory, in emission order.
pub type Attrs = Vec<(&'static str, String)>;

/// Host contract for tree construction. One call per rendered node.
pub trait NodeFactory {
    type Node;

    fn make_element(&mut self, tag: Tag, attrs: &Attrs, children: Vec<Self::Node>) -> Self::Node;

    fn make_text(&mut self, text: &str) -> Self::Node;

    /// Raw markup passthrough. Hosts without one treat it as text.
    fn make_raw(&mut self, raw: &str) -> Self::Node {
        self.make_text(raw)
    }
}

/// Every renderable construct, one tag per override key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    P,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    Hr,
    Pre,
    Code,
    Blockquote,
    Ul,
    Ol,
    Li,
    Table,
    Thead,
    Tbody,
    Tr,
    Th,
    Td,
    A,
    Img,
    Strong,
    Em,
    S,
    U,
    Ins,
    Mark,
    Sup,
    Sub,
    Br,
    Checkbox,
}

impl Tag {
    /// The HTML element name.
    pub fn name(self) -> &'static str {
        match self {
            Tag::P => "p",
            Tag::H1 => "h1",
            Tag::H2 => "h2",
            Tag::H3 => "h3",
            Tag::H4 => "h4",
            Tag::H5 => "h5",
            Tag::H6 => "h6",
            Tag::Hr => "hr",
            Tag::Pre => "pre",
            Tag::Code => "code",
            Tag::Blockquote => "blockquote",
            Tag::Ul => "ul",
            Tag::Ol => "ol",
            Tag::Li => "li",
            Tag::Table => "table",
            Tag::Thead => "thead",
            Tag::Tbody => "tbody",
            Tag::Tr => "tr",
            Tag::Th => "th",
            Tag::Td => "td",
            Tag::A => "a",
            Tag::Img => "img",
            Tag::Strong => "strong",
            Tag::Em => "em",
            Tag::S => "s",
            Tag::U => "u",
            Tag::Ins => "ins",
            Tag::Mark => "mark",
            Tag::Sup => "sup",
            Tag::Sub => "sub",
            Tag::Br => "br",
            Tag::Checkbox => "input",
        }
    }

    /// Void elements take no children.
    pub fn is_void(self) -> bool {
        matches!(self, Tag::Hr | Tag::Img | Tag::Br | Tag::Checkbox)
    }
}

/// What to do instead of the factory's default element for a tag.
pub enum Override<N> {
    /// Render the construct's literal source text.
    Disabled,
    /// Build the node with a replacement constructor.
    Constructor(Box<dyn Fn(&Attrs, Vec<N>) -> N>),
}

/// Per-tag render overrides. Tags without an entry render normally.
pub struct TagOverrides<N> {
    map: HashMap<Tag, Override<N>>,
}

impl<N> TagOverrides<N> {
    pub fn new() -> Self {
        TagOverrides {
            map: HashMap::new(),
        }
    }

    /// Make `tag` render as its literal source text.
    pub fn disable(&mut self, tag: Tag) -> &mut Self {
        self.map.insert(tag, Override::Disabled);
        self
    }

    /// Replace `tag`'s constructor.
    pub fn set<F>(&mut self, tag: Tag, f: F) -> &mut Self
    where
        F: Fn(&Attrs, Vec<N>) -> N + 'static,
    {
        self.map.insert(tag, Override::Constructor(Box::new(f)));
        self
    }

    pub fn get(&self, tag: Tag) -> Option<&Override<N>> {
        self.map.get(&tag)
    }
}

impl<N> Default for TagOverrides<N> {
    fn default() -> Self {
        TagOverrides::new()
    }
}

pub(crate) fn render<F: NodeFactory>(
    doc: &Document,
    factory: &mut F,
    overrides: &TagOverrides<F::Node>,
) -> Vec<F::Node> {
    let mut renderer = Renderer {
        src: doc.src(),
        factory,
        overrides,
    };
    renderer.blocks(doc.children())
}

struct Renderer<'a, F: NodeFactory> {
    src: &'a str,
    factory: &'a mut F,
    overrides: &'a TagOverrides<F::Node>,
}

impl<F: NodeFactory> Renderer<'_, F> {
    fn blocks(&mut self, blocks: &[Block]) -> Vec<F::Node> {
        blocks.iter().map(|b| self.block(b)).collect()
    }

    fn block(&mut self, block: &Block) -> F::Node {
        let literal = &self.src[block.span.start()..block.span.end().min(self.src.len())];
        match &block.kind {
            BlockKind::Paragraph(content) => {
                let children = self.inlines(content);
                self.element(Tag::P, Vec::new(), children, literal)
            }
            BlockKind::Heading { level, content } => {
                let tag = match level {
                    1 => Tag::H1,
                    2 => Tag::H2,
                    3 => Tag::H3,
                    4 => Tag::H4,
                    5 => Tag::H5,
                    _ => Tag::H6,
                };
                let children = self.inlines(content);
                self.element(tag, Vec::new(), children, literal)
            }
            BlockKind::ThematicBreak => self.element(Tag::Hr, Vec::new(), Vec::new(), literal),
            BlockKind::IndentedCode { literal: text } => self.code_block(None, text, literal),
            BlockKind::FencedCode {
                info,
                literal: text,
            } => self.code_block(info.split_whitespace().next(), text, literal),
            BlockKind::HtmlBlock { literal } => self.factory.make_raw(literal),
            BlockKind::Blockquote { children } => {
                let children = self.blocks(children);
                self.element(Tag::Blockquote, Vec::new(), children, literal)
            }
            BlockKind::List { kind, tight, items } => self.list(*kind, *tight, items, literal),
            BlockKind::Table {
                alignments,
                head,
                rows,
            } => self.table(alignments, head, rows, literal),
        }
    }

    fn code_block(&mut self, lang: Option<&str>, text: &str, literal: &str) -> F::Node {
        let mut attrs = Vec::new();
        if let Some(lang) = lang.filter(|l| !l.is_empty()) {
            attrs.push(("class", format!("language-{}", lang)));
        }
        let text = self.factory.make_text(text);
        let code = self.element(Tag::Code, attrs, vec![text], literal);
        self.element(Tag::Pre, Vec::new(), vec![code], literal)
    }

    fn list(&mut self, kind: ListKind, tight: bool, items: &[ListItem], literal: &str) -> F::Node {
        let mut nodes = Vec::with_capacity(items.len());
        for item in items {
            let mut children = Vec::new();
            if let Some(checked) = item.checked {
                children.push(self.checkbox(checked));
            }
            for (i, child) in item.children.iter().enumerate() {
                // a tight list drops the paragraph wrapper
                match &child.kind {
                    BlockKind::Paragraph(content) if tight => {
                        if i > 0 {
                            children.push(self.factory.make_text("\n"));
                        }
                        children.extend(self.inlines(content));
                    }
                    _ => children.push(self.block(child)),
                }
            }
            let span = child_span(item);
            let item_literal = &self.src[span.start()..span.end().min(self.src.len())];
            nodes.push(self.element(Tag::Li, Vec::new(), children, item_literal));
        }
        let (tag, attrs) = match kind {
            ListKind::Unordered { .. } => (Tag::Ul, Vec::new()),
            ListKind::Ordered { start, .. } if start != 1 => {
                (Tag::Ol, vec![("start", start.to_string())])
            }
            ListKind::Ordered { .. } => (Tag::Ol, Vec::new()),
        };
        self.element(tag, attrs, nodes, literal)
    }

    fn checkbox(&mut self, checked: bool) -> F::Node {
        let mut attrs: Attrs = vec![("type", "checkbox".to_string())];
        if checked {
            attrs.push(("checked", String::new()));
        }
        attrs.push(("disabled", String::new()));
        let literal = if checked { "[x] " } else { "[ ] " };
        self.element(Tag::Checkbox, attrs, Vec::new(), literal)
    }

    fn table(
        &mut self,
        alignments: &[Alignment],
        head: &[Content],
        rows: &[Vec<Content>],
        literal: &str,
    ) -> F::Node {
        let cells = self.row(alignments, head, Tag::Th, literal);
        let tr = self.element(Tag::Tr, Vec::new(), cells, literal);
        let thead = self.element(Tag::Thead, Vec::new(), vec![tr], literal);
        let mut children = vec![thead];
        if !rows.is_empty() {
            let mut body = Vec::with_capacity(rows.len());
            for row in rows {
                let cells = self.row(alignments, row, Tag::Td, literal);
                body.push(self.element(Tag::Tr, Vec::new(), cells, literal));
            }
            children.push(self.element(Tag::Tbody, Vec::new(), body, literal));
        }
        self.element(Tag::Table, Vec::new(), children, literal)
    }

    fn row(
        &mut self,
        alignments: &[Alignment],
        cells: &[Content],
        tag: Tag,
        literal: &str,
    ) -> Vec<F::Node> {
        cells
            .iter()
            .zip(alignments)
            .map(|(cell, align)| {
                let attrs = match align {
                    Alignment::Unspecified => Vec::new(),
                    Alignment::Left => vec![("align", "left".to_string())],
                    Alignment::Center => vec![("align", "center".to_string())],
                    Alignment::Right => vec![("align", "right".to_string())],
                };
                let children = self.inlines(cell);
                self.element(tag, attrs, children, literal)
            })
            .collect()
    }

    fn inlines(&mut self, content: &Content) -> Vec<F::Node> {
        self.inline_nodes(&content.inlines, &content.raw)
    }

    fn inline_nodes(&mut self, inlines: &[Inline], raw: &str) -> Vec<F::Node> {
        inlines.iter().map(|i| self.inline(i, raw)).collect()
    }

    fn inline(&mut self, inline: &Inline, raw: &str) -> F::Node {
        let literal = &raw[inline.span.start()..inline.span.end().min(raw.len())];
        match &inline.kind {
            InlineKind::Str => self.factory.make_text(literal),
            InlineKind::Code { literal: text } => {
                let text = self.factory.make_text(text);
                self.element(Tag::Code, Vec::new(), vec![text], literal)
            }
            InlineKind::Emphasis { children } => self.spanned(Tag::Em, children, raw, literal),
            InlineKind::Strong { children } => self.spanned(Tag::Strong, children, raw, literal),
            InlineKind::Underline { children } => self.spanned(Tag::U, children, raw, literal),
            InlineKind::Delete { children } => self.spanned(Tag::S, children, raw, literal),
            InlineKind::Insert { children } => self.spanned(Tag::Ins, children, raw, literal),
            InlineKind::Mark { children } => self.spanned(Tag::Mark, children, raw, literal),
            InlineKind::Superscript { children } => self.spanned(Tag::Sup, children, raw, literal),
            InlineKind::Subscript { children } => self.spanned(Tag::Sub, children, raw, literal),
            InlineKind::Link {
                dest,
                title,
                children,
            } => {
                let mut attrs = vec![("href", dest.clone())];
                if let Some(title) = title {
                    attrs.push(("title", title.clone()));
                }
                let children = self.inline_nodes(children, raw);
                self.element(Tag::A, attrs, children, literal)
            }
            InlineKind::Image { dest, title, alt } => {
                let mut attrs = vec![("src", dest.clone()), ("alt", alt.clone())];
                if let Some(title) = title {
                    attrs.push(("title", title.clone()));
                }
                self.element(Tag::Img, attrs, Vec::new(), literal)
            }
            InlineKind::Autolink { uri, email } => {
                let href = if *email {
                    format!("mailto:{}", uri)
                } else {
                    uri.clone()
                };
                let text = self.factory.make_text(uri);
                self.element(Tag::A, vec![("href", href)], vec![text], literal)
            }
            InlineKind::RawHtml => self.factory.make_raw(literal),
            InlineKind::Softbreak => self.factory.make_text("\n"),
            InlineKind::Hardbreak => self.element(Tag::Br, Vec::new(), Vec::new(), literal),
        }
    }

    fn spanned(&mut self, tag: Tag, children: &[Inline], raw: &str, literal: &str) -> F::Node {
        let children = self.inline_nodes(children, raw);
        self.element(tag, Vec::new(), children, literal)
    }

    fn element(&mut self, tag: Tag, attrs: Attrs, children: Vec<F::Node>, literal: &str) -> F::Node {
        match self.overrides.get(tag) {
            Some(Override::Disabled) => self.factory.make_text(literal),
            Some(Override::Constructor(f)) => f(&attrs, children),
            None => self.factory.make_element(tag, &attrs, children),
        }
    }
}

/// The source extent of a list item, from its first to its last child.
fn child_span(item: &ListItem) -> Span {
    match (item.children.first(), item.children.last()) {
        (Some(first), Some(last)) => first.span.union(last.span),
        _ => Span::new(0, 0),
    }
}
