//! An HTML node factory.
//!
//! Nodes are rendered markup strings. Text and attribute values are
//! escaped; [`NodeFactory::make_raw`] passes markup through untouched.

use crate::render::Attrs;
use crate::render::NodeFactory;
use crate::render::Tag;
use crate::render::TagOverrides;

/// Builds HTML strings. Stateless; one instance serves any number of
/// documents.
#[derive(Debug, Default)]
pub struct HtmlFactory;

impl HtmlFactory {
    pub fn new() -> Self {
        HtmlFactory
    }
}

impl NodeFactory for HtmlFactory {
    type Node = String;

    fn make_element(&mut self, tag: Tag, attrs: &Attrs, children: Vec<String>) -> String {
        let mut out = String::from("<");
        out.push_str(tag.name());
        for (name, value) in attrs {
            out.push(' ');
            out.push_str(name);
            if !value.is_empty() {
                out.push_str("=\"");
                escape_into(&mut out, value, true);
                out.push('"');
            }
        }
        out.push('>');
        if tag.is_void() {
            return out;
        }
        for child in children {
            out.push_str(&child);
        }
        out.push_str("</");
        out.push_str(tag.name());
        out.push('>');
        out
    }

    fn make_text(&mut self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        escape_into(&mut out, text, false);
        out
    }

    fn make_raw(&mut self, raw: &str) -> String {
        raw.to_string()
    }
}

/// Render a document straight to HTML with no overrides.
pub fn render(src: &str) -> String {
    crate::parse(src, &mut HtmlFactory, &TagOverrides::new()).concat()
}

fn escape_into(out: &mut String, text: &str, attribute: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod test {
    use super::render;

    #[test]
    fn escaping() {
        assert_eq!(render("a < b & c"), "<p>a &lt; b &amp; c</p>");
        assert_eq!(
            render("[x](/u \"a<b\")"),
            "<p><a href=\"/u\" title=\"a&lt;b\">x</a></p>",
        );
    }

    #[test]
    fn raw_passthrough() {
        assert_eq!(render("<div>\nx\n</div>"), "<div>\nx\n</div>\n");
        assert_eq!(render("a <b>c</b>"), "<p>a <b>c</b></p>");
    }

    #[test]
    fn void_elements() {
        assert_eq!(render("***"), "<hr>");
        assert_eq!(
            render("![x](/i)"),
            "<p><img src=\"/i\" alt=\"x\"></p>",
        );
    }
}
