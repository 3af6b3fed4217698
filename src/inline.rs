use crate::lex;
use crate::lex::Delim;
use crate::reference;
use crate::reference::ReferenceTable;
use crate::span::Span;
use crate::Inline;
use crate::InlineKind;

/// Resolve the raw text of one leaf into an inline tree.
pub(crate) fn parse(raw: &str, refs: &ReferenceTable) -> Vec<Inline> {
    Resolver::new(raw, refs).resolve()
}

/// One delimiter run on the stack. `node` indexes the run's Str node in
/// the flat node list; `len` is the unconsumed length, `orig` the original
/// run length used by the rule of three.
#[derive(Debug)]
struct DelimRun {
    delim: Delim,
    node: usize,
    len: usize,
    orig: usize,
    can_open: bool,
    can_close: bool,
}

/// One bracket on the stack. `delim_floor` bounds emphasis processing to
/// the bracket's interior, `active` is cleared when an enclosing link
/// forms (links cannot nest).
#[derive(Debug)]
struct Bracket {
    image: bool,
    node: usize,
    label_start: usize,
    delim_floor: usize,
    active: bool,
}

struct Resolver<'s> {
    text: &'s str,
    refs: &'s ReferenceTable,
    nodes: Vec<Inline>,
    delims: Vec<DelimRun>,
    brackets: Vec<Bracket>,
    pos: usize,
    /// Node eligible for span extension by adjacent literal text.
    extend: Option<usize>,
    /// Skip the whitespace token following a line break.
    after_break: bool,
}

impl<'s> Resolver<'s> {
    fn new(text: &'s str, refs: &'s ReferenceTable) -> Self {
        Self {
            text,
            refs,
            nodes: Vec::new(),
            delims: Vec::new(),
            brackets: Vec::new(),
            pos: 0,
            extend: None,
            after_break: false,
        }
    }

    fn resolve(mut self) -> Vec<Inline> {
        let mut lexer = lex::Lexer::new(self.text);
        let mut escape = false;
        while let Some(tok) = lexer.next() {
            let start = self.pos;
            self.pos = start + tok.len;
            let mut jumped = false;
            let was_escape = escape;
            escape = false;
            match tok.kind {
                lex::Kind::Text | lex::Kind::Whitespace => {
                    if tok.kind == lex::Kind::Whitespace && self.after_break {
                        // spaces at the start of a line are dropped
                    } else {
                        self.push_str(Span::new(start, self.pos));
                    }
                }
                lex::Kind::Escape => {
                    escape = true;
                    continue; // the escaped character follows
                }
                lex::Kind::Newline => {
                    self.line_break(start, was_escape);
                    self.after_break = true;
                    continue;
                }
                lex::Kind::Backticks => jumped = self.code_span(start, tok.len),
                lex::Kind::Lt => jumped = self.angle(start),
                lex::Kind::OpenBracket | lex::Kind::BangBracket => {
                    self.push_opaque(InlineKind::Str, Span::new(start, self.pos));
                    self.brackets.push(Bracket {
                        image: tok.kind == lex::Kind::BangBracket,
                        node: self.nodes.len() - 1,
                        label_start: self.pos,
                        delim_floor: self.delims.len(),
                        active: true,
                    });
                }
                lex::Kind::CloseBracket => jumped = self.close_bracket(start),
                lex::Kind::Seq(d) => self.delimiter_run(d, start, tok.len),
            }
            self.after_break = false;
            if jumped {
                lexer = lex::Lexer::new(&self.text[self.pos..]);
            }
        }
        self.process_emphasis(0);
        self.nodes
            .retain(|n| !(matches!(n.kind, InlineKind::Str) && n.span.is_empty()));
        self.nodes
    }

    fn push_str(&mut self, sp: Span) {
        if let Some(i) = self.extend {
            if self.nodes[i].span.end() == sp.start() {
                self.nodes[i].span = self.nodes[i].span.union(sp);
                return;
            }
        }
        self.nodes.push(Inline {
            kind: InlineKind::Str,
            span: sp,
        });
        self.extend = Some(self.nodes.len() - 1);
    }

    /// Push a node literal text may not extend into.
    fn push_opaque(&mut self, kind: InlineKind, span: Span) {
        self.nodes.push(Inline { kind, span });
        self.extend = None;
    }

    /// Hard break on an escaped newline or two trailing spaces, soft
    /// break otherwise. Trailing spaces are trimmed either way.
    fn line_break(&mut self, start: usize, escaped: bool) {
        let mut hard = escaped;
        let mut break_start = start;
        if escaped {
            break_start -= 1; // include the backslash
        } else if let Some(i) = self.nodes.len().checked_sub(1) {
            let node = &mut self.nodes[i];
            if matches!(node.kind, InlineKind::Str) && node.span.end() == start {
                let trailing = node.span.of(self.text).len()
                    - node.span.of(self.text).trim_end_matches(' ').len();
                if trailing > 0 {
                    hard = trailing >= 2;
                    node.span = node.span.trim_end(trailing);
                    break_start = start - trailing;
                    if node.span.is_empty() {
                        self.nodes.pop();
                        self.extend = None;
                    }
                }
            }
        }
        let kind = if hard {
            InlineKind::Hardbreak
        } else {
            InlineKind::Softbreak
        };
        self.push_opaque(kind, Span::new(break_start, self.pos));
    }

    /// A backtick run opens a code span only if an equal-length run
    /// appears later in the text.
    fn code_span(&mut self, start: usize, len: usize) -> bool {
        let Some(close) = find_backtick_run(&self.text[self.pos..], len) else {
            self.push_str(Span::new(start, self.pos));
            return false;
        };
        let close = self.pos + close;
        let mut literal = self.text[self.pos..close].replace('\n', " ");
        if literal.len() >= 2
            && literal.starts_with(' ')
            && literal.ends_with(' ')
            && !literal.bytes().all(|b| b == b' ')
        {
            literal = literal[1..literal.len() - 1].to_string();
        }
        self.pos = close + len;
        self.push_opaque(InlineKind::Code { literal }, Span::new(start, self.pos));
        true
    }

    /// `<...>`: autolink, then raw inline HTML, then a literal `<`.
    fn angle(&mut self, start: usize) -> bool {
        if let Some((uri, email, end)) = scan_autolink(self.text, start) {
            self.pos = end;
            self.push_opaque(
                InlineKind::Autolink { uri, email },
                Span::new(start, end),
            );
            return true;
        }
        if let Some(end) = scan_inline_html(self.text, start) {
            self.pos = end;
            self.push_opaque(InlineKind::RawHtml, Span::new(start, end));
            return true;
        }
        self.push_str(Span::new(start, self.pos));
        false
    }

    fn delimiter_run(&mut self, delim: Delim, start: usize, len: usize) {
        let prev = self.text[..start].chars().next_back();
        let next = self.text[self.pos..].chars().next();
        let prev_ws = prev.map_or(true, char::is_whitespace);
        let next_ws = next.map_or(true, char::is_whitespace);
        let prev_punct = prev.map_or(false, is_punctuation);
        let next_punct = next.map_or(false, is_punctuation);

        let left = !next_ws && (!next_punct || prev_ws || prev_punct);
        let right = !prev_ws && (!prev_punct || next_ws || next_punct);

        // `_` may not open or close across an alphanumeric boundary
        let (can_open, can_close) = if delim == Delim::Underscore {
            (
                left && (!right || prev_punct),
                right && (!left || next_punct),
            )
        } else {
            (left, right)
        };

        self.push_opaque(InlineKind::Str, Span::new(start, self.pos));
        if can_open || can_close {
            self.delims.push(DelimRun {
                delim,
                node: self.nodes.len() - 1,
                len,
                orig: len,
                can_open,
                can_close,
            });
        }
    }

    /// `]`: resolve a link or image against the nearest bracket opener,
    /// trying inline, reference, then shortcut form. On failure both
    /// brackets stay literal text.
    fn close_bracket(&mut self, start: usize) -> bool {
        let Some(bracket) = self.brackets.pop() else {
            self.push_str(Span::new(start, self.pos));
            return false;
        };
        if !bracket.active {
            self.push_str(Span::new(start, self.pos));
            return false;
        }
        let label = &self.text[bracket.label_start..start];
        let after = &self.text[self.pos..];

        if let Some((dest, title, len)) = scan_inline_spec(after) {
            self.finish_link(bracket, dest, title, self.pos + len);
            return true;
        }

        if after.starts_with('[') {
            let lookup = if after.starts_with("[]") {
                Some((label.to_string(), 2))
            } else {
                reference::scan_label(after)
            };
            if let Some((ref_label, len)) = lookup {
                if let Some(def) = self.refs.get(&ref_label) {
                    let (dest, title) = (def.dest.clone(), def.title.clone());
                    self.finish_link(bracket, dest, title, self.pos + len);
                    return true;
                }
                self.push_str(Span::new(start, self.pos));
                return false;
            }
        }

        if let Some(def) = self.refs.get(label) {
            let (dest, title) = (def.dest.clone(), def.title.clone());
            self.finish_link(bracket, dest, title, self.pos);
            return true;
        }

        self.push_str(Span::new(start, self.pos));
        false
    }

    fn finish_link(
        &mut self,
        bracket: Bracket,
        dest: String,
        title: Option<String>,
        end: usize,
    ) {
        self.process_emphasis(bracket.delim_floor);
        self.delims.truncate(bracket.delim_floor);
        let children = self
            .nodes
            .split_off(bracket.node + 1)
            .into_iter()
            .filter(|n| !(matches!(n.kind, InlineKind::Str) && n.span.is_empty()))
            .collect::<Vec<_>>();
        let span = Span::new(self.nodes[bracket.node].span.start(), end);
        let kind = if bracket.image {
            InlineKind::Image {
                dest,
                title,
                alt: plain_text(&children, self.text),
            }
        } else {
            // links cannot nest: deactivate enclosing link openers
            for b in &mut self.brackets {
                if !b.image {
                    b.active = false;
                }
            }
            InlineKind::Link {
                dest,
                title,
                children,
            }
        };
        self.nodes[bracket.node] = Inline { kind, span };
        self.pos = end;
        self.extend = None;
    }

    /// Match closers to openers bottom-up, wrapping enclosed ranges.
    /// Entries below `bottom` are out of reach (the bracket floor).
    fn process_emphasis(&mut self, bottom: usize) {
        let mut closer = bottom;
        while closer < self.delims.len() {
            if !self.delims[closer].can_close {
                closer += 1;
                continue;
            }
            let mut found = None;
            let mut i = closer;
            while i > bottom {
                i -= 1;
                let o = &self.delims[i];
                let c = &self.delims[closer];
                if o.delim != c.delim || !o.can_open {
                    continue;
                }
                if !lengths_compatible(o, c) {
                    continue;
                }
                if let Some(used) = use_delims(o.delim, o.len, c.len) {
                    found = Some((i, used));
                    break;
                }
            }
            let Some((opener, used)) = found else {
                closer += 1;
                continue;
            };
            closer = self.wrap(opener, closer, used);
        }
    }

    /// Consume `used` symbols from each side of an opener/closer pair and
    /// wrap the enclosed nodes. Returns the closer's new stack index.
    fn wrap(&mut self, opener: usize, closer: usize, used: usize) -> usize {
        let o_node = self.delims[opener].node;
        let c_node = self.delims[closer].node;
        let delim = self.delims[opener].delim;

        self.nodes[o_node].span = self.nodes[o_node].span.trim_end(used);
        let c_start = self.nodes[c_node].span.start();
        self.nodes[c_node].span = self.nodes[c_node].span.trim_start(used);
        let span = Span::new(self.nodes[o_node].span.end(), c_start + used);

        let removed = c_node - o_node - 1;
        let children = self
            .nodes
            .drain(o_node + 1..c_node)
            .filter(|n| !(matches!(n.kind, InlineKind::Str) && n.span.is_empty()))
            .collect::<Vec<_>>();
        self.nodes.insert(
            o_node + 1,
            Inline {
                kind: span_kind(delim, used, children),
                span,
            },
        );
        let shift = 1 - removed as isize;
        for d in &mut self.delims {
            if d.node > o_node {
                d.node = (d.node as isize + shift) as usize;
            }
        }
        self.extend = None;

        self.delims[opener].len -= used;
        self.delims[closer].len -= used;

        // spent entries and everything in between leave the stack
        let mut remove = Vec::new();
        if self.delims[closer].len == 0 {
            remove.push(closer);
        }
        for i in (opener + 1..closer).rev() {
            remove.push(i);
        }
        if self.delims[opener].len == 0 {
            remove.push(opener);
        }
        for &i in &remove {
            self.delims.remove(i);
        }
        closer - remove.iter().filter(|&&i| i < closer).count()
    }
}

/// Rule of three for `*` and `_`, applied when either delimiter run can
/// both open and close: runs may not combine when both lengths are
/// multiples of three, or when their sum is a multiple of three while
/// neither individually is.
fn lengths_compatible(o: &DelimRun, c: &DelimRun) -> bool {
    if !matches!(o.delim, Delim::Asterisk | Delim::Underscore) {
        return true;
    }
    if !(o.can_close || c.can_open) {
        return true;
    }
    let (a, b) = (o.orig, c.orig);
    if a % 3 == 0 && b % 3 == 0 {
        return false;
    }
    !((a + b) % 3 == 0 && a % 3 != 0 && b % 3 != 0)
}

/// How many symbols a pair consumes per side, or None if these run
/// lengths cannot combine for this delimiter kind.
fn use_delims(delim: Delim, opener: usize, closer: usize) -> Option<usize> {
    let double = opener >= 2 && closer >= 2;
    match delim {
        Delim::Asterisk | Delim::Underscore | Delim::Tilde => {
            Some(if double { 2 } else { 1 })
        }
        Delim::Caret => Some(1),
        Delim::Equal | Delim::Plus => double.then_some(2),
    }
}

fn span_kind(delim: Delim, used: usize, children: Vec<Inline>) -> InlineKind {
    match (delim, used) {
        (Delim::Asterisk, 2) => InlineKind::Strong { children },
        (Delim::Asterisk, _) => InlineKind::Emphasis { children },
        (Delim::Underscore, 2) => InlineKind::Underline { children },
        (Delim::Underscore, _) => InlineKind::Emphasis { children },
        (Delim::Tilde, 2) => InlineKind::Delete { children },
        (Delim::Tilde, _) => InlineKind::Subscript { children },
        (Delim::Caret, _) => InlineKind::Superscript { children },
        (Delim::Equal, _) => InlineKind::Mark { children },
        (Delim::Plus, _) => InlineKind::Insert { children },
    }
}

fn is_punctuation(c: char) -> bool {
    !c.is_alphanumeric() && !c.is_whitespace()
}

/// Byte offset of the next backtick run of exactly `len`, if any.
fn find_backtick_run(text: &str, len: usize) -> Option<usize> {
    let mut run_start = None;
    let mut run_len = 0;
    for (i, c) in text.char_indices().chain([(text.len(), '\0')]) {
        if c == '`' {
            if run_start.is_none() {
                run_start = Some(i);
            }
            run_len += 1;
        } else {
            if run_len == len {
                return run_start;
            }
            run_start = None;
            run_len = 0;
        }
    }
    None
}

/// Flatten resolved inline content to plain text (image alt).
fn plain_text(inlines: &[Inline], text: &str) -> String {
    let mut out = String::new();
    for inline in inlines {
        match &inline.kind {
            InlineKind::Str | InlineKind::RawHtml => out.push_str(inline.span.of(text)),
            InlineKind::Code { literal } => out.push_str(literal),
            InlineKind::Emphasis { children }
            | InlineKind::Strong { children }
            | InlineKind::Underline { children }
            | InlineKind::Delete { children }
            | InlineKind::Insert { children }
            | InlineKind::Mark { children }
            | InlineKind::Superscript { children }
            | InlineKind::Subscript { children }
            | InlineKind::Link { children, .. } => {
                out.push_str(&plain_text(children, text));
            }
            InlineKind::Image { alt, .. } => out.push_str(alt),
            InlineKind::Autolink { uri, .. } => out.push_str(uri),
            InlineKind::Softbreak | InlineKind::Hardbreak => out.push(' '),
        }
    }
    out
}

/// `(<dest> "title")` after a closing bracket.
fn scan_inline_spec(text: &str) -> Option<(String, Option<String>, usize)> {
    if !text.starts_with('(') {
        return None;
    }
    let mut pos = 1 + reference::scan_space(&text[1..], usize::MAX)?;
    if text[pos..].starts_with(')') {
        return Some((String::new(), None, pos + 1));
    }
    let (dest, dest_len) = reference::scan_destination(&text[pos..])?;
    pos += dest_len;
    let ws = reference::scan_space(&text[pos..], usize::MAX)?;
    let mut title = None;
    let mut end = pos + ws;
    if ws > 0 {
        if let Some((t, len)) = reference::scan_title(&text[end..]) {
            title = Some(t);
            end += len;
            end += reference::scan_space(&text[end..], usize::MAX)?;
        }
    }
    text[end..].starts_with(')').then(|| (dest, title, end + 1))
}

/// `<scheme:...>` or `<local@domain>`.
fn scan_autolink(text: &str, start: usize) -> Option<(String, bool, usize)> {
    let inner = &text[start + 1..];
    let gt = inner.find('>')?;
    let content = &inner[..gt];
    if content.is_empty() || content.chars().any(|c| c.is_whitespace() || c == '<') {
        return None;
    }
    let end = start + 1 + gt + 1;
    if is_uri(content) {
        return Some((content.to_string(), false, end));
    }
    if is_email(content) {
        return Some((content.to_string(), true, end));
    }
    None
}

fn is_uri(s: &str) -> bool {
    let Some(colon) = s.find(':') else {
        return false;
    };
    let scheme = &s[..colon];
    let mut chars = scheme.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (2..=32).contains(&scheme.len())
        && first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'))
}

fn is_email(s: &str) -> bool {
    let Some(at) = s.find('@') else {
        return false;
    };
    let (local, domain) = (&s[..at], &s[at + 1..]);
    let local_ok = !local.is_empty()
        && local.chars().all(|c| {
            c.is_ascii_alphanumeric() || ".!#$%&'*+/=?^_`{|}~-".contains(c)
        });
    let domain_ok = !domain.is_empty()
        && domain.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && label
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-')
                && !label.starts_with('-')
                && !label.ends_with('-')
        });
    local_ok && domain_ok
}

/// Raw inline HTML at a `<`: open/close tag, comment, processing
/// instruction, declaration, or CDATA section. Returns the end offset.
/// The block pass shares this for type 7 HTML blocks.
pub(crate) fn scan_inline_html(text: &str, start: usize) -> Option<usize> {
    let rest = &text[start..];
    if let Some(inner) = rest.strip_prefix("<!--") {
        return inner.find("-->").map(|i| start + 4 + i + 3);
    }
    if let Some(inner) = rest.strip_prefix("<![CDATA[") {
        return inner.find("]]>").map(|i| start + 9 + i + 3);
    }
    if let Some(inner) = rest.strip_prefix("<?") {
        return inner.find("?>").map(|i| start + 2 + i + 2);
    }
    if let Some(inner) = rest.strip_prefix("<!") {
        if inner.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return inner.find('>').map(|i| start + 2 + i + 1);
        }
        return None;
    }
    if let Some(inner) = rest.strip_prefix("</") {
        let name = scan_tag_name(inner)?;
        let after = skip_html_space(&inner[name..]);
        return inner[name + after..]
            .starts_with('>')
            .then_some(start + 2 + name + after + 1);
    }
    let inner = rest.strip_prefix('<')?;
    let name = scan_tag_name(inner)?;
    let mut pos = name;
    loop {
        let ws = skip_html_space(&inner[pos..]);
        let rest = &inner[pos + ws..];
        if rest.starts_with("/>") {
            return Some(start + 1 + pos + ws + 2);
        }
        if rest.starts_with('>') {
            return Some(start + 1 + pos + ws + 1);
        }
        if ws == 0 {
            return None;
        }
        let attr = scan_html_attribute(rest)?;
        pos += ws + attr;
    }
}

fn scan_tag_name(text: &str) -> Option<usize> {
    let mut chars = text.char_indices();
    let (_, first) = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    for (i, c) in chars {
        if !(c.is_ascii_alphanumeric() || c == '-') {
            return Some(i);
        }
    }
    Some(text.len())
}

fn skip_html_space(text: &str) -> usize {
    text.len()
        - text
            .trim_start_matches(|c: char| c.is_whitespace())
            .len()
}

fn scan_html_attribute(text: &str) -> Option<usize> {
    let mut chars = text.char_indices();
    let (_, first) = chars.next()?;
    if !(first.is_ascii_alphabetic() || first == '_' || first == ':') {
        return None;
    }
    let mut name_end = text.len();
    for (i, c) in chars {
        if !(c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '.' | '-')) {
            name_end = i;
            break;
        }
    }
    let ws = skip_html_space(&text[name_end..]);
    let rest = &text[name_end + ws..];
    if !rest.starts_with('=') {
        return Some(name_end);
    }
    let ws2 = skip_html_space(&rest[1..]);
    let value = &rest[1 + ws2..];
    let value_len = match value.chars().next()? {
        q @ ('"' | '\'') => value[1..].find(q).map(|i| i + 2)?,
        _ => {
            let len = value
                .find(|c: char| {
                    c.is_whitespace() || matches!(c, '"' | '\'' | '=' | '<' | '>' | '`')
                })
                .unwrap_or(value.len());
            if len == 0 {
                return None;
            }
            len
        }
    };
    Some(name_end + ws + 1 + ws2 + value_len)
}

#[cfg(test)]
mod test {
    use crate::reference::ReferenceTable;
    use crate::Inline;
    use crate::InlineKind;

    /// Compact s-expression form of an inline tree for assertions.
    fn sexp(inlines: &[Inline], text: &str) -> String {
        inlines
            .iter()
            .map(|i| node(i, text))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn node(inline: &Inline, text: &str) -> String {
        let wrap = |tag: &str, children: &[Inline]| {
            format!("{}({})", tag, sexp(children, text))
        };
        match &inline.kind {
            InlineKind::Str => format!("{:?}", inline.span.of(text)),
            InlineKind::Code { literal } => format!("code({:?})", literal),
            InlineKind::Emphasis { children } => wrap("em", children),
            InlineKind::Strong { children } => wrap("strong", children),
            InlineKind::Underline { children } => wrap("u", children),
            InlineKind::Delete { children } => wrap("del", children),
            InlineKind::Insert { children } => wrap("ins", children),
            InlineKind::Mark { children } => wrap("mark", children),
            InlineKind::Superscript { children } => wrap("sup", children),
            InlineKind::Subscript { children } => wrap("sub", children),
            InlineKind::Link {
                dest,
                title,
                children,
            } => format!(
                "link[{}{}]({})",
                dest,
                title.as_deref().map(|t| format!(" {:?}", t)).unwrap_or_default(),
                sexp(children, text),
            ),
            InlineKind::Image { dest, alt, .. } => format!("img[{} {:?}]", dest, alt),
            InlineKind::Autolink { uri, email } => {
                format!("auto[{}{}]", if *email { "mailto " } else { "" }, uri)
            }
            InlineKind::RawHtml => format!("html({:?})", inline.span.of(text)),
            InlineKind::Softbreak => "br".to_string(),
            InlineKind::Hardbreak => "BR".to_string(),
        }
    }

    macro_rules! test_parse {
        ($src:expr, $expected:expr $(,)?) => {
            let refs = ReferenceTable::new();
            test_parse!($src, $expected, refs);
        };
        ($src:expr, $expected:expr, $refs:expr $(,)?) => {
            let actual = super::parse($src, &$refs);
            assert_eq!(sexp(&actual, $src), $expected, "\n\n{}\n\n", $src);
        };
    }

    #[test]
    fn str() {
        test_parse!("abc", r#""abc""#);
        test_parse!("abc def", r#""abc def""#);
    }

    #[test]
    fn emphasis() {
        test_parse!("*foo*", r#"em("foo")"#);
        test_parse!("_foo_", r#"em("foo")"#);
        test_parse!("**foo**", r#"strong("foo")"#);
        test_parse!("*foo* *bar*", r#"em("foo") " " em("bar")"#);
        test_parse!("*foo **bar** baz*", r#"em("foo " strong("bar") " baz")"#);
    }

    #[test]
    fn emphasis_unmatched() {
        test_parse!("*foo", r#""*" "foo""#);
        test_parse!("foo*", r#""foo" "*""#);
        test_parse!("* foo *", r#""*" " foo " "*""#);
    }

    #[test]
    fn rule_of_three() {
        test_parse!("***foo***", r#"em(strong("foo"))"#);
        test_parse!("*foo**bar*", r#"em("foo" "**" "bar")"#);
        test_parse!("***foo**", r#""*" strong("foo")"#);
    }

    #[test]
    fn underscore_intraword() {
        test_parse!("foo_bar_", r#""foo" "_" "bar" "_""#);
        test_parse!("*foo*bar", r#"em("foo") "bar""#);
        test_parse!("foo_bar_baz_", r#""foo" "_" "bar" "_" "baz" "_""#);
    }

    #[test]
    fn underline() {
        test_parse!("__foo__", r#"u("foo")"#);
        test_parse!("__foo _bar_ baz__", r#"u("foo " em("bar") " baz")"#);
    }

    #[test]
    fn extensions() {
        test_parse!("~~foo~~", r#"del("foo")"#);
        test_parse!("~foo~", r#"sub("foo")"#);
        test_parse!("^foo^", r#"sup("foo")"#);
        test_parse!("==foo==", r#"mark("foo")"#);
        test_parse!("++foo++", r#"ins("foo")"#);
        // single `=`/`+` never form spans
        test_parse!("=foo=", r#""=" "foo" "=""#);
        test_parse!("+foo+", r#""+" "foo" "+""#);
    }

    #[test]
    fn extensions_nested() {
        test_parse!("~~*foo*~~", r#"del(em("foo"))"#);
        test_parse!("*~~foo~~*", r#"em(del("foo"))"#);
        test_parse!("e = mc^2^", r#""e " "=" " mc" sup("2")"#);
    }

    #[test]
    fn code_span() {
        test_parse!("`foo`", r#"code("foo")"#);
        test_parse!("``foo ` bar``", r#"code("foo ` bar")"#);
        test_parse!("`` `foo` ``", r#"code("`foo`")"#);
        test_parse!("`foo", r#""`foo""#);
        test_parse!("`foo\nbar`", r#"code("foo bar")"#);
    }

    #[test]
    fn code_span_opaque() {
        // emphasis does not reach into code
        test_parse!("*a `b*` c", r#""*" "a " code("b*") " c""#);
    }

    #[test]
    fn escape() {
        test_parse!(r"\*foo\*", r#""*foo" "*""#);
        test_parse!(r"\\*foo*", r#""\\" em("foo")"#);
        test_parse!(r"\[x]", r#""[x]""#);
    }

    #[test]
    fn breaks() {
        test_parse!("foo\nbar", r#""foo" br "bar""#);
        test_parse!("foo  \nbar", r#""foo" BR "bar""#);
        test_parse!("foo\\\nbar", r#""foo" BR "bar""#);
        test_parse!("foo \nbar", r#""foo" br "bar""#);
    }

    #[test]
    fn autolink() {
        test_parse!("<https://example.com>", "auto[https://example.com]");
        test_parse!("<user@example.com>", "auto[mailto user@example.com]");
        test_parse!("<3 cheers>", r#""<3 cheers>""#);
    }

    #[test]
    fn raw_html() {
        test_parse!("<em a='b'>", r#"html("<em a='b'>")"#);
        test_parse!("</em>", r#"html("</em>")"#);
        test_parse!("<!-- c -->", r#"html("<!-- c -->")"#);
        test_parse!("a <? pi ?> b", r#""a " html("<? pi ?>") " b""#);
        test_parse!("< em>", r#""< em>""#);
    }

    #[test]
    fn inline_link() {
        test_parse!("[foo](/url)", r#"link[/url]("foo")"#);
        test_parse!(
            "[foo](/url \"title\")",
            r#"link[/url "title"]("foo")"#,
        );
        test_parse!("[foo](<my url>)", r#"link[my url]("foo")"#);
        test_parse!("[foo]()", r#"link[]("foo")"#);
        test_parse!("[*foo*](/url)", r#"link[/url](em("foo"))"#);
    }

    #[test]
    fn link_fallback() {
        test_parse!("[foo]", r#""[" "foo]""#);
        test_parse!("[foo](", r#""[" "foo](""#);
        test_parse!("[foo] (/url)", r#""[" "foo] (/url)""#);
    }

    #[test]
    fn reference_link() {
        let mut refs = ReferenceTable::new();
        refs.insert("foo", "/url".to_string(), Some("t".to_string()));
        test_parse!("[foo]", r#"link[/url "t"]("foo")"#, refs);
        test_parse!("[foo][]", r#"link[/url "t"]("foo")"#, refs);
        test_parse!("[bar][foo]", r#"link[/url "t"]("bar")"#, refs);
        test_parse!("[bar][baz]", r#""[" "bar]" "[" "baz]""#, refs);
        test_parse!("[FOO]", r#"link[/url "t"]("FOO")"#, refs);
    }

    #[test]
    fn image() {
        test_parse!("![alt](/img)", r#"img[/img "alt"]"#);
        test_parse!("![*alt*](/img)", r#"img[/img "alt"]"#);
    }

    #[test]
    fn links_do_not_nest() {
        test_parse!(
            "[a [b](/inner)](/outer)",
            r#""[" "a " link[/inner]("b") "](/outer)""#,
        );
    }

    #[test]
    fn image_in_link() {
        test_parse!(
            "[![alt](/img)](/url)",
            r#"link[/url](img[/img "alt"])"#,
        );
    }

    #[test]
    fn emphasis_in_link_is_contained() {
        // the opener inside the bracket may not pair with a closer outside
        test_parse!("*[a*](/u)", r#""*" link[/u]("a" "*")"#);
    }
}
