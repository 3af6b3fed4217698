use crate::inline;
use crate::reference;
use crate::reference::ReferenceTable;
use crate::span::Span;
use crate::Alignment;
use crate::Block;
use crate::BlockKind;
use crate::Content;
use crate::ListItem;
use crate::ListKind;

/// Expand tabs to four-column stops and normalize line endings.
///
/// Running this once over the whole input keeps every later column
/// computation a plain byte count.
pub(crate) fn expand_tabs(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut col = 0;
    for c in src.chars() {
        match c {
            '\t' => {
                let n = 4 - col % 4;
                for _ in 0..n {
                    out.push(' ');
                }
                col += n;
            }
            '\n' => {
                out.push('\n');
                col = 0;
            }
            '\r' => {}
            _ => {
                out.push(c);
                col += 1;
            }
        }
    }
    out
}

/// Build the block tree and collect link reference definitions.
///
/// Offsets in the returned spans index `src`, which must already be
/// tab-expanded.
pub(crate) fn scan(src: &str) -> (Vec<Block>, ReferenceTable) {
    let mut scanner = Scanner::new();
    let mut pos = 0;
    while pos < src.len() {
        let end = src[pos..].find('\n').map_or(src.len(), |i| pos + i);
        scanner.line(pos, &src[pos..end]);
        pos = end + 1;
    }
    scanner.finish()
}

/// An open container on the stack. An `Item` always sits directly on
/// its `List`.
enum Container {
    Blockquote {
        start: usize,
        children: Vec<Block>,
    },
    List {
        kind: ListKind,
        start: usize,
        items: Vec<ListItem>,
        /// A blank line occurred while this list was open.
        blank: bool,
        loose: bool,
    },
    Item {
        /// Content column, relative to the enclosing container prefix.
        col: usize,
        children: Vec<Block>,
        checked: Option<bool>,
        /// Opened by a marker with no content on its line.
        fresh: bool,
    },
}

/// The open leaf, owned by the innermost container.
enum Leaf {
    Paragraph {
        raw: String,
        start: usize,
        end: usize,
        /// Start offset of the last raw line, for table conversion.
        line_pos: usize,
    },
    Indented {
        literal: String,
        /// Interior blank lines, dropped if nothing follows them.
        blanks: Vec<String>,
        start: usize,
        end: usize,
    },
    Fenced {
        fence: char,
        len: usize,
        indent: usize,
        info: String,
        literal: String,
        start: usize,
        end: usize,
    },
    Html {
        kind: u8,
        literal: String,
        start: usize,
        end: usize,
    },
    Table {
        alignments: Vec<Alignment>,
        head: Vec<Content>,
        rows: Vec<Vec<Content>>,
        start: usize,
        end: usize,
    },
}

/// What a leaf decided about the current line.
enum Next {
    Done,
    Finish,
    Classify,
    Setext(u8),
    Table(Vec<Alignment>),
}

struct Scanner {
    containers: Vec<Container>,
    leaf: Option<Leaf>,
    doc: Vec<Block>,
    refs: ReferenceTable,
    /// End offset of the last consumed content line.
    end: usize,
}

impl Scanner {
    fn new() -> Self {
        Scanner {
            containers: Vec::new(),
            leaf: None,
            doc: Vec::new(),
            refs: ReferenceTable::new(),
            end: 0,
        }
    }

    fn finish(mut self) -> (Vec<Block>, ReferenceTable) {
        self.close_to(0);
        (self.doc, self.refs)
    }

    /// Process one line, exclusive of its newline.
    fn line(&mut self, line_start: usize, line: &str) {
        let (matched, p) = self.match_continuations(line);
        if is_blank(&line[p..]) {
            self.blank_line(matched, line_start, line, p);
            return;
        }
        let line_end = line_start + line.len();
        if matched < self.containers.len() {
            if self.lazy(line, p) {
                if let Some(Leaf::Paragraph { raw, end, line_pos, .. }) = &mut self.leaf {
                    let ind = leading_spaces(&line[p..]);
                    raw.push('\n');
                    raw.push_str(&line[p + ind..]);
                    *end = line_end;
                    *line_pos = line_start + p + ind;
                }
                self.end = line_end;
                return;
            }
            self.close_to(matched);
        }
        self.open_and_append(line_start, line, p);
        self.end = line_end;
    }

    /// Match the line against the open container chain. Returns how many
    /// containers matched and the byte offset past the consumed prefix.
    fn match_continuations(&self, line: &str) -> (usize, usize) {
        let mut p = 0;
        let mut i = 0;
        while i < self.containers.len() {
            match &self.containers[i] {
                Container::Blockquote { .. } => {
                    let ind = leading_spaces(&line[p..]);
                    if ind <= 3 && line[p + ind..].starts_with('>') {
                        p += ind + 1;
                        if line[p..].starts_with(' ') {
                            p += 1;
                        }
                        i += 1;
                    } else {
                        break;
                    }
                }
                Container::List { kind, .. } => {
                    let kind = *kind;
                    let col = match self.containers.get(i + 1) {
                        Some(Container::Item { col, .. }) => *col,
                        _ => 0,
                    };
                    let rest = &line[p..];
                    if is_blank(rest) {
                        i += 2;
                        continue;
                    }
                    let ind = leading_spaces(rest);
                    if ind >= col {
                        p += col;
                        i += 2;
                        continue;
                    }
                    // a sibling marker keeps the list but not the item
                    if ind <= 3 && !thematic_break(&rest[ind..]) {
                        if let Some(m) = list_marker(&rest[ind..]) {
                            if same_flavor(kind, m.kind) {
                                i += 1;
                            }
                        }
                    }
                    break;
                }
                Container::Item { .. } => i += 1,
            }
        }
        (i, p)
    }

    /// Would this line lazily continue an open paragraph through the
    /// unmatched part of the container chain?
    fn lazy(&self, line: &str, p: usize) -> bool {
        if !matches!(self.leaf, Some(Leaf::Paragraph { .. })) {
            return false;
        }
        let ind = leading_spaces(&line[p..]);
        if ind >= 4 {
            return true;
        }
        let t = &line[p + ind..];
        !(t.starts_with('>') || starts_block(t) || list_marker(t).is_some())
    }

    fn blank_line(&mut self, matched: usize, line_start: usize, line: &str, p: usize) {
        if matched == self.containers.len() {
            let line_end = line_start + line.len();
            match &mut self.leaf {
                Some(Leaf::Fenced {
                    indent,
                    literal,
                    end,
                    ..
                }) => {
                    let strip = leading_spaces(&line[p..]).min(*indent);
                    literal.push_str(&line[p + strip..]);
                    literal.push('\n');
                    *end = line_end;
                    self.end = line_end;
                    return;
                }
                Some(Leaf::Html { kind, literal, end, .. }) if *kind <= 5 => {
                    literal.push_str(&line[p..]);
                    literal.push('\n');
                    *end = line_end;
                    self.end = line_end;
                    return;
                }
                Some(Leaf::Indented { blanks, .. }) => {
                    let strip = leading_spaces(&line[p..]).min(4);
                    blanks.push(line[p + strip..].to_string());
                    return;
                }
                _ => {}
            }
        }
        self.close_to(matched);
        // an item may begin with at most one blank line
        if let Some(Container::Item {
            fresh: true,
            children,
            ..
        }) = self.containers.last()
        {
            if children.is_empty() {
                self.close_container();
                self.close_container();
            }
        }
        for c in &mut self.containers {
            if let Container::List { blank, .. } = c {
                *blank = true;
            }
        }
    }

    /// Open any new containers the line starts, then hand the remainder
    /// to the leaf.
    fn open_and_append(&mut self, line_start: usize, line: &str, mut p: usize) {
        if !matches!(
            self.leaf,
            Some(Leaf::Fenced { .. }) | Some(Leaf::Html { .. })
        ) {
            loop {
                let ind = leading_spaces(&line[p..]);
                if ind >= 4 {
                    break;
                }
                let t = &line[p + ind..];
                if t.starts_with('>') {
                    self.close_leaf();
                    self.mark_loose();
                    self.containers.push(Container::Blockquote {
                        start: line_start + p + ind,
                        children: Vec::new(),
                    });
                    p += ind + 1;
                    if line[p..].starts_with(' ') {
                        p += 1;
                    }
                    continue;
                }
                if thematic_break(t) {
                    break;
                }
                let Some(m) = list_marker(t) else { break };
                let after = &t[m.len..];
                let blank_item = is_blank(after);
                let spaces = leading_spaces(after);
                let same_list = matches!(
                    self.containers.last(),
                    Some(Container::List { kind, .. }) if same_flavor(*kind, m.kind)
                );
                if !same_list && matches!(self.leaf, Some(Leaf::Paragraph { .. })) {
                    // a new list interrupts a paragraph only with a
                    // non-empty first item numbered 1 (or a bullet)
                    let ok = !blank_item
                        && match m.kind {
                            ListKind::Unordered { .. } => true,
                            ListKind::Ordered { start, .. } => start == 1,
                        };
                    if !ok {
                        break;
                    }
                }
                self.close_leaf();
                self.mark_loose();
                let abs = line_start + p + ind;
                if !same_list {
                    self.containers.push(Container::List {
                        kind: m.kind,
                        start: abs,
                        items: Vec::new(),
                        blank: false,
                        loose: false,
                    });
                }
                let (col, consumed) = if blank_item {
                    (ind + m.len + 1, m.len)
                } else if spaces >= 5 {
                    (ind + m.len + 1, m.len + 1)
                } else {
                    (ind + m.len + spaces, m.len + spaces)
                };
                self.containers.push(Container::Item {
                    col,
                    children: Vec::new(),
                    checked: None,
                    fresh: blank_item,
                });
                p += ind + consumed;
            }
        }
        if is_blank(&line[p..]) {
            return;
        }
        self.leaf_line(line_start, line, p);
    }

    fn leaf_line(&mut self, line_start: usize, line: &str, p: usize) {
        let ind = leading_spaces(&line[p..]);
        let line_end = line_start + line.len();
        let next = match &mut self.leaf {
            Some(Leaf::Fenced {
                fence,
                len,
                indent,
                literal,
                end,
                ..
            }) => {
                let t = &line[p + ind..];
                if ind <= 3 && fence_close(t, *fence, *len) {
                    *end = line_end;
                    Next::Finish
                } else {
                    let strip = ind.min(*indent);
                    literal.push_str(&line[p + strip..]);
                    literal.push('\n');
                    *end = line_end;
                    Next::Done
                }
            }
            Some(Leaf::Html { kind, literal, end, .. }) => {
                literal.push_str(&line[p..]);
                literal.push('\n');
                *end = line_end;
                if html_end(*kind, &line[p..]) {
                    Next::Finish
                } else {
                    Next::Done
                }
            }
            Some(Leaf::Indented {
                literal,
                blanks,
                end,
                ..
            }) => {
                if ind >= 4 {
                    for b in blanks.drain(..) {
                        literal.push_str(&b);
                        literal.push('\n');
                    }
                    literal.push_str(&line[p + 4..]);
                    literal.push('\n');
                    *end = line_end;
                    Next::Done
                } else {
                    Next::Classify
                }
            }
            Some(Leaf::Table {
                alignments,
                rows,
                end,
                ..
            }) => {
                let t = &line[p + ind..];
                if ind <= 3 && starts_block(t) {
                    Next::Classify
                } else {
                    let mut cells: Vec<Content> = split_row(&line[p..])
                        .into_iter()
                        .map(Content::new)
                        .collect();
                    cells.truncate(alignments.len());
                    while cells.len() < alignments.len() {
                        cells.push(Content::new(String::new()));
                    }
                    rows.push(cells);
                    *end = line_end;
                    Next::Done
                }
            }
            Some(Leaf::Paragraph { raw, end, line_pos, .. }) => {
                let t = &line[p + ind..];
                let mut next = None;
                if ind <= 3 {
                    if let Some(level) = setext_line(t) {
                        next = Some(Next::Setext(level));
                    } else if let Some(aligns) = delimiter_row(t) {
                        let last = &raw[raw.rfind('\n').map_or(0, |i| i + 1)..];
                        if has_unescaped_pipe(last) {
                            next = Some(Next::Table(aligns));
                        }
                    }
                    if next.is_none() && starts_block(t) {
                        next = Some(Next::Classify);
                    }
                }
                match next {
                    Some(n) => n,
                    None => {
                        raw.push('\n');
                        raw.push_str(t);
                        *end = line_end;
                        *line_pos = line_start + p + ind;
                        Next::Done
                    }
                }
            }
            None => Next::Classify,
        };
        match next {
            Next::Done => {}
            Next::Finish => self.close_leaf(),
            Next::Classify => {
                self.close_leaf();
                self.open_leaf(line_start, line, p);
            }
            Next::Setext(level) => self.close_setext(level, line_start, line, p),
            Next::Table(alignments) => self.convert_table(alignments, line_end),
        }
    }

    fn open_leaf(&mut self, line_start: usize, line: &str, p: usize) {
        let ind = leading_spaces(&line[p..]);
        let line_end = line_start + line.len();
        self.mark_loose();
        if ind >= 4 {
            let mut literal = line[p + 4..].to_string();
            literal.push('\n');
            self.leaf = Some(Leaf::Indented {
                literal,
                blanks: Vec::new(),
                start: line_start + p,
                end: line_end,
            });
            return;
        }
        let t = &line[p + ind..];
        let abs = line_start + p + ind;
        if let Some((level, text)) = atx_heading(t) {
            self.push_block(Block {
                kind: BlockKind::Heading {
                    level,
                    content: Content::new(text),
                },
                span: Span::new(abs, line_end),
            });
            return;
        }
        if thematic_break(t) {
            self.push_block(Block {
                kind: BlockKind::ThematicBreak,
                span: Span::new(abs, line_end),
            });
            return;
        }
        if let Some((fence, len, info)) = fence_open(t) {
            self.leaf = Some(Leaf::Fenced {
                fence,
                len,
                indent: ind,
                info,
                literal: String::new(),
                start: abs,
                end: line_end,
            });
            return;
        }
        if let Some(kind) = html_start(t, false) {
            let mut literal = line[p..].to_string();
            literal.push('\n');
            self.leaf = Some(Leaf::Html {
                kind,
                literal,
                start: line_start + p,
                end: line_end,
            });
            if kind <= 5 && html_end(kind, t) {
                self.close_leaf();
            }
            return;
        }
        let mut text = t;
        if let Some(Container::Item {
            children, checked, ..
        }) = self.containers.last_mut()
        {
            if children.is_empty() && checked.is_none() {
                if let Some((state, rest)) = task_marker(text) {
                    *checked = Some(state);
                    text = rest;
                }
            }
        }
        self.leaf = Some(Leaf::Paragraph {
            raw: text.to_string(),
            start: abs,
            end: line_end,
            line_pos: abs,
        });
    }

    /// Close the open paragraph as a setext heading, unless reference
    /// definitions consumed all of it, in which case the underline line
    /// reverts to ordinary content.
    fn close_setext(&mut self, level: u8, line_start: usize, line: &str, p: usize) {
        let Some(Leaf::Paragraph { raw, start, .. }) = self.leaf.take() else {
            return;
        };
        let raw = raw.trim_end();
        let consumed = self.refs.harvest(raw);
        let rest = raw[consumed..].trim().to_string();
        if rest.is_empty() {
            self.open_leaf(line_start, line, p);
            return;
        }
        self.push_block(Block {
            kind: BlockKind::Heading {
                level,
                content: Content::new(rest),
            },
            span: Span::new(start, line_start + line.len()),
        });
    }

    /// Reinterpret the paragraph's last line as a table header row; any
    /// earlier lines close as a paragraph of their own. The alignment
    /// vector pads or truncates to the header's cell count.
    fn convert_table(&mut self, mut alignments: Vec<Alignment>, line_end: usize) {
        let Some(Leaf::Paragraph {
            raw, start, line_pos, ..
        }) = self.leaf.take()
        else {
            return;
        };
        let last_start = raw.rfind('\n').map_or(0, |i| i + 1);
        if last_start > 0 {
            let span = Span::new(start, line_pos.saturating_sub(1).max(start));
            if let Some(b) = self.paragraph_block(raw[..last_start - 1].trim_end(), span) {
                self.push_block(b);
            }
        }
        let head: Vec<Content> = split_row(&raw[last_start..])
            .into_iter()
            .map(Content::new)
            .collect();
        alignments.resize(head.len(), Alignment::Unspecified);
        self.leaf = Some(Leaf::Table {
            alignments,
            head,
            rows: Vec::new(),
            start: line_pos,
            end: line_end,
        });
    }

    fn close_leaf(&mut self) {
        let Some(leaf) = self.leaf.take() else { return };
        let block = match leaf {
            Leaf::Paragraph { raw, start, end, .. } => {
                match self.paragraph_block(raw.trim_end(), Span::new(start, end)) {
                    Some(b) => b,
                    None => return,
                }
            }
            Leaf::Indented {
                literal, start, end, ..
            } => Block {
                kind: BlockKind::IndentedCode { literal },
                span: Span::new(start, end),
            },
            Leaf::Fenced {
                info,
                literal,
                start,
                end,
                ..
            } => Block {
                kind: BlockKind::FencedCode { info, literal },
                span: Span::new(start, end),
            },
            Leaf::Html {
                literal, start, end, ..
            } => Block {
                kind: BlockKind::HtmlBlock { literal },
                span: Span::new(start, end),
            },
            Leaf::Table {
                alignments,
                head,
                rows,
                start,
                end,
            } => Block {
                kind: BlockKind::Table {
                    alignments,
                    head,
                    rows,
                },
                span: Span::new(start, end),
            },
        };
        self.push_block(block);
    }

    /// Split reference definitions off the front of a closing paragraph;
    /// the remainder, if any, is the paragraph proper.
    fn paragraph_block(&mut self, raw: &str, span: Span) -> Option<Block> {
        let consumed = self.refs.harvest(raw);
        let rest = raw[consumed..].trim_end();
        if rest.is_empty() {
            return None;
        }
        Some(Block {
            kind: BlockKind::Paragraph(Content::new(rest.to_string())),
            span,
        })
    }

    fn close_to(&mut self, depth: usize) {
        self.close_leaf();
        while self.containers.len() > depth {
            self.close_container();
        }
    }

    fn close_container(&mut self) {
        match self.containers.pop() {
            Some(Container::Blockquote { start, children }) => {
                let span = Span::new(start, self.end.max(start));
                self.push_block(Block {
                    kind: BlockKind::Blockquote { children },
                    span,
                });
            }
            Some(Container::Item {
                children, checked, ..
            }) => {
                if let Some(Container::List { items, .. }) = self.containers.last_mut() {
                    items.push(ListItem { children, checked });
                }
            }
            Some(Container::List {
                kind,
                start,
                items,
                loose,
                ..
            }) => {
                let span = Span::new(start, self.end.max(start));
                self.push_block(Block {
                    kind: BlockKind::List {
                        kind,
                        tight: !loose,
                        items,
                    },
                    span,
                });
            }
            None => {}
        }
    }

    fn push_block(&mut self, block: Block) {
        for c in self.containers.iter_mut().rev() {
            match c {
                Container::Blockquote { children, .. } => {
                    children.push(block);
                    return;
                }
                Container::Item {
                    children, fresh, ..
                } => {
                    children.push(block);
                    *fresh = false;
                    return;
                }
                Container::List { .. } => {}
            }
        }
        self.doc.push(block);
    }

    /// A blank line followed by more content makes the innermost open
    /// list loose; enclosing lists forget the blank, it was not directly
    /// between their blocks.
    fn mark_loose(&mut self) {
        let deepest = self
            .containers
            .iter()
            .rposition(|c| matches!(c, Container::List { .. }));
        for (i, c) in self.containers.iter_mut().enumerate() {
            if let Container::List { blank, loose, .. } = c {
                if *blank {
                    if Some(i) == deepest {
                        *loose = true;
                    }
                    *blank = false;
                }
            }
        }
    }
}

fn leading_spaces(t: &str) -> usize {
    t.len() - t.trim_start_matches(' ').len()
}

fn is_blank(t: &str) -> bool {
    t.chars().all(char::is_whitespace)
}

/// Does this text open a leaf block that may interrupt a paragraph?
fn starts_block(t: &str) -> bool {
    thematic_break(t)
        || atx_heading(t).is_some()
        || fence_open(t).is_some()
        || html_start(t, true).is_some()
}

fn thematic_break(t: &str) -> bool {
    let t = t.trim_end();
    let mut chars = t.chars().filter(|c| *c != ' ');
    let Some(first) = chars.next() else {
        return false;
    };
    if !matches!(first, '-' | '_' | '*') {
        return false;
    }
    let mut count = 1;
    for c in chars {
        if c != first {
            return false;
        }
        count += 1;
    }
    count >= 3
}

fn atx_heading(t: &str) -> Option<(u8, String)> {
    let level = t.bytes().take_while(|b| *b == b'#').count();
    if !(1..=6).contains(&level) {
        return None;
    }
    let rest = &t[level..];
    if !(rest.is_empty() || rest.starts_with(' ')) {
        return None;
    }
    let mut content = rest.trim();
    // optional closing sequence
    let trimmed = content.trim_end_matches('#');
    if trimmed.len() < content.len() && (trimmed.is_empty() || trimmed.ends_with(' ')) {
        content = trimmed.trim_end();
    }
    Some((level as u8, content.to_string()))
}

fn setext_line(t: &str) -> Option<u8> {
    let t = t.trim_end();
    if t.is_empty() {
        None
    } else if t.bytes().all(|b| b == b'=') {
        Some(1)
    } else if t.bytes().all(|b| b == b'-') {
        Some(2)
    } else {
        None
    }
}

fn fence_open(t: &str) -> Option<(char, usize, String)> {
    let fence = t.chars().next()?;
    if fence != '`' && fence != '~' {
        return None;
    }
    let len = t.chars().take_while(|c| *c == fence).count();
    if len < 3 {
        return None;
    }
    let info = t[len..].trim();
    if fence == '`' && info.contains('`') {
        return None;
    }
    Some((fence, len, reference::unescape(info)))
}

fn fence_close(t: &str, fence: char, open: usize) -> bool {
    let t = t.trim_end();
    !t.is_empty() && t.chars().all(|c| c == fence) && t.len() >= open
}

struct Marker {
    kind: ListKind,
    len: usize,
}

fn list_marker(t: &str) -> Option<Marker> {
    let c = t.chars().next()?;
    if matches!(c, '-' | '+' | '*') {
        let after = &t[1..];
        if after.is_empty() || after.starts_with(' ') {
            return Some(Marker {
                kind: ListKind::Unordered { bullet: c },
                len: 1,
            });
        }
        return None;
    }
    let digits = t.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 || digits > 9 {
        return None;
    }
    let delim = t[digits..].chars().next()?;
    if delim != '.' && delim != ')' {
        return None;
    }
    let after = &t[digits + 1..];
    if !(after.is_empty() || after.starts_with(' ')) {
        return None;
    }
    let start = t[..digits].parse().ok()?;
    Some(Marker {
        kind: ListKind::Ordered { start, delim },
        len: digits + 1,
    })
}

fn same_flavor(a: ListKind, b: ListKind) -> bool {
    match (a, b) {
        (ListKind::Unordered { bullet: x }, ListKind::Unordered { bullet: y }) => x == y,
        (ListKind::Ordered { delim: x, .. }, ListKind::Ordered { delim: y, .. }) => x == y,
        _ => false,
    }
}

fn task_marker(t: &str) -> Option<(bool, &str)> {
    let state = match t.get(..4)? {
        "[ ] " => false,
        "[x] " | "[X] " => true,
        _ => return None,
    };
    Some((state, t[4..].trim_start()))
}

/// Split a table row into trimmed cells. `\|` yields a literal pipe
/// inside a cell; other escapes pass through to the inline pass.
fn split_row(t: &str) -> Vec<String> {
    let t = t.trim();
    let t = t.strip_prefix('|').unwrap_or(t);
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut chars = t.chars();
    let mut closed = true;
    while let Some(c) = chars.next() {
        closed = false;
        match c {
            '\\' => match chars.next() {
                Some('|') => cell.push('|'),
                Some(n) => {
                    cell.push('\\');
                    cell.push(n);
                }
                None => cell.push('\\'),
            },
            '|' => {
                cells.push(std::mem::take(&mut cell));
                closed = true;
            }
            _ => cell.push(c),
        }
    }
    if !closed {
        cells.push(cell);
    }
    cells
        .into_iter()
        .map(|c| c.trim().to_string())
        .collect()
}

fn has_unescaped_pipe(t: &str) -> bool {
    let mut chars = t.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '|' => return true,
            _ => {}
        }
    }
    false
}

fn delimiter_row(t: &str) -> Option<Vec<Alignment>> {
    if !t.contains('|') {
        return None;
    }
    let cells = split_row(t);
    if cells.is_empty() {
        return None;
    }
    cells.iter().map(|c| delimiter_cell(c)).collect()
}

fn delimiter_cell(c: &str) -> Option<Alignment> {
    let left = c.starts_with(':');
    let right = c.ends_with(':') && c.len() > left as usize;
    let dashes = &c[left as usize..c.len() - right as usize];
    if dashes.is_empty() || !dashes.bytes().all(|b| b == b'-') {
        return None;
    }
    Some(match (left, right) {
        (true, true) => Alignment::Center,
        (true, false) => Alignment::Left,
        (false, true) => Alignment::Right,
        (false, false) => Alignment::Unspecified,
    })
}

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "base", "basefont", "blockquote", "body", "caption",
    "center", "col", "colgroup", "dd", "details", "dialog", "dir", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "frame", "frameset", "h1",
    "h2", "h3", "h4", "h5", "h6", "head", "header", "hr", "html", "iframe", "legend",
    "li", "link", "main", "menu", "menuitem", "nav", "noframes", "ol", "optgroup",
    "option", "p", "param", "search", "section", "summary", "table", "tbody", "td",
    "tfoot", "th", "thead", "title", "tr", "track", "ul",
];

/// Classify the start of an HTML block, types 1 through 7. Type 7 never
/// interrupts a paragraph.
fn html_start(t: &str, interrupting: bool) -> Option<u8> {
    if !t.starts_with('<') {
        return None;
    }
    let lower = t.to_ascii_lowercase();
    for tag in ["<pre", "<script", "<style", "<textarea"] {
        if lower.starts_with(tag) {
            let rest = &t[tag.len()..];
            if rest.is_empty() || rest.starts_with(' ') || rest.starts_with('>') {
                return Some(1);
            }
        }
    }
    if t.starts_with("<!--") {
        return Some(2);
    }
    if t.starts_with("<?") {
        return Some(3);
    }
    if t.starts_with("<![CDATA[") {
        return Some(5);
    }
    if t.starts_with("<!") && t[2..].starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Some(4);
    }
    let rest = t.strip_prefix("</").unwrap_or(&t[1..]);
    let name_len = rest
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric())
        .count();
    if name_len > 0 && BLOCK_TAGS.contains(&rest[..name_len].to_ascii_lowercase().as_str()) {
        let after = &rest[name_len..];
        if after.is_empty()
            || after.starts_with(' ')
            || after.starts_with('>')
            || after.starts_with("/>")
        {
            return Some(6);
        }
    }
    if !interrupting {
        if let Some(end) = inline::scan_inline_html(t, 0) {
            if t[end..].chars().all(char::is_whitespace) {
                return Some(7);
            }
        }
    }
    None
}

fn html_end(kind: u8, line: &str) -> bool {
    match kind {
        1 => {
            let lower = line.to_ascii_lowercase();
            ["</pre>", "</script>", "</style>", "</textarea>"]
                .iter()
                .any(|t| lower.contains(t))
        }
        2 => line.contains("-->"),
        3 => line.contains("?>"),
        4 => line.contains('>'),
        5 => line.contains("]]>"),
        _ => false,
    }
}
