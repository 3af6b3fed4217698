use std::collections::HashMap;

/// Link reference definitions harvested by the block pass.
///
/// Keys are case-folded, whitespace-collapsed labels. The first definition
/// for a label wins, later duplicates are ignored.
#[derive(Debug, Default)]
pub(crate) struct ReferenceTable {
    defs: HashMap<String, Definition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Definition {
    pub dest: String,
    pub title: Option<String>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: &str, dest: String, title: Option<String>) {
        self.defs
            .entry(fold_label(label))
            .or_insert(Definition { dest, title });
    }

    pub fn get(&self, label: &str) -> Option<&Definition> {
        self.defs.get(&fold_label(label))
    }

    /// Split leading link reference definitions off a closing paragraph.
    ///
    /// Returns the byte offset in `raw` where the remaining paragraph text
    /// starts. A malformed candidate reverts to paragraph text, so the
    /// offset stops at the first line that is not a complete definition.
    pub fn harvest(&mut self, raw: &str) -> usize {
        let mut pos = 0;
        while let Some(consumed) = self.definition(&raw[pos..]) {
            pos += consumed;
            if pos >= raw.len() {
                break;
            }
        }
        pos
    }

    /// Parse one `[label]: dest ["title"]` group at the start of `text`.
    /// Returns the number of bytes consumed, including the line terminator.
    fn definition(&mut self, text: &str) -> Option<usize> {
        let mut pos = leading_spaces(text);
        if pos > 3 {
            return None;
        }
        let (label, label_len) = scan_label(&text[pos..])?;
        pos += label_len;
        if !text[pos..].starts_with(':') {
            return None;
        }
        pos += 1;
        let ws = scan_space(&text[pos..], 1)?;
        pos += ws;
        let (dest, dest_len) = scan_destination(&text[pos..])?;
        if dest_len == 0 {
            return None;
        }
        pos += dest_len;

        // Everything to the end of the line after the destination must be a
        // title (possibly spanning lines) or blank. A failed title falls
        // back to a title-less definition when the destination ends its
        // line cleanly.
        let dest_eol = line_is_blank(&text[pos..]).then(|| end_of_line(text, pos));

        let mut title_end = None;
        if let Some(ws) = scan_space(&text[pos..], 1) {
            if ws > 0 {
                let after_ws = pos + ws;
                if let Some((title, title_len)) = scan_title(&text[after_ws..]) {
                    let after = after_ws + title_len;
                    if line_is_blank(&text[after..]) {
                        title_end = Some((title, end_of_line(text, after)));
                    }
                }
            }
        }

        match (title_end, dest_eol) {
            (Some((title, end)), _) => {
                self.insert(&label, dest, Some(title));
                Some(end)
            }
            (None, Some(end)) => {
                self.insert(&label, dest, None);
                Some(end)
            }
            (None, None) => None,
        }
    }
}

/// Normalize a reference label: trim, collapse interior whitespace, and
/// apply Unicode case folding so that e.g. `ẞ` and `ss` compare equal.
pub(crate) fn fold_label(label: &str) -> String {
    let collapsed = label.split_whitespace().collect::<Vec<_>>().join(" ");
    caseless::default_case_fold_str(&collapsed)
}

/// Scan a bracketed link label `[...]`. The label may span lines, must
/// contain a non-whitespace character and no unescaped brackets, and is
/// capped at 999 characters.
pub(crate) fn scan_label(text: &str) -> Option<(String, usize)> {
    let mut chars = text.char_indices();
    let (_, '[') = chars.next()? else {
        return None;
    };
    let mut escape = false;
    let mut count = 0;
    for (i, c) in chars {
        if escape {
            escape = false;
            continue;
        }
        match c {
            '\\' => escape = true,
            '[' => return None,
            ']' => {
                let label = &text[1..i];
                return (!label.trim().is_empty()).then(|| (label.to_string(), i + 1));
            }
            _ => {}
        }
        count += 1;
        if count > 999 {
            return None;
        }
    }
    None
}

/// Scan a link destination: `<...>` or a bare parenthesis-balanced token.
pub(crate) fn scan_destination(text: &str) -> Option<(String, usize)> {
    let mut chars = text.char_indices();
    match chars.next() {
        Some((_, '<')) => {
            let mut escape = false;
            for (i, c) in chars {
                if escape {
                    escape = false;
                    continue;
                }
                match c {
                    '\\' => escape = true,
                    '\n' | '<' => return None,
                    '>' => return Some((unescape(&text[1..i]), i + 1)),
                    _ => {}
                }
            }
            None
        }
        Some((_, first)) => {
            if first.is_whitespace() || first.is_control() {
                return Some((String::new(), 0));
            }
            let mut depth = if first == '(' { 1 } else { 0 };
            if first == ')' {
                return Some((String::new(), 0));
            }
            let mut escape = false;
            let mut end = text.len();
            for (i, c) in chars {
                if escape {
                    escape = false;
                    continue;
                }
                match c {
                    '\\' => escape = true,
                    '(' => depth += 1,
                    ')' => {
                        if depth == 0 {
                            end = i;
                            break;
                        }
                        depth -= 1;
                    }
                    _ if c.is_whitespace() || c.is_control() => {
                        end = i;
                        break;
                    }
                    _ => {}
                }
            }
            Some((unescape(&text[..end]), end))
        }
        None => Some((String::new(), 0)),
    }
}

/// Scan a link title delimited by `"…"`, `'…'` or `(…)`. Titles may span
/// lines; the block pass guarantees no blank line reaches this scanner.
pub(crate) fn scan_title(text: &str) -> Option<(String, usize)> {
    let mut chars = text.char_indices();
    let (_, open) = chars.next()?;
    let close = match open {
        '"' => '"',
        '\'' => '\'',
        '(' => ')',
        _ => return None,
    };
    let mut escape = false;
    for (i, c) in chars {
        if escape {
            escape = false;
            continue;
        }
        match c {
            '\\' => escape = true,
            _ if c == close => return Some((unescape(&text[1..i]), i + 1)),
            '(' if open == '(' => return None,
            _ => {}
        }
    }
    None
}

/// Remove backslashes preceding ASCII punctuation.
pub(crate) fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.clone().next() {
                Some(p) if p.is_ascii_punctuation() => {
                    out.push(p);
                    chars.next();
                    continue;
                }
                _ => {}
            }
        }
        out.push(c);
    }
    out
}

/// Skip whitespace containing at most `max_newlines` line breaks. Returns
/// the number of bytes skipped, or None if the newline budget is exceeded.
pub(crate) fn scan_space(text: &str, max_newlines: usize) -> Option<usize> {
    let mut newlines = 0;
    for (i, c) in text.char_indices() {
        if c == '\n' {
            newlines += 1;
            if newlines > max_newlines {
                return None;
            }
        } else if !c.is_whitespace() {
            return Some(i);
        }
    }
    Some(text.len())
}

fn leading_spaces(text: &str) -> usize {
    text.bytes().take_while(|b| *b == b' ').count()
}

fn line_is_blank(text: &str) -> bool {
    text.chars().take_while(|c| *c != '\n').all(char::is_whitespace)
}

fn end_of_line(text: &str, pos: usize) -> usize {
    text[pos..].find('\n').map_or(text.len(), |i| pos + i + 1)
}

#[cfg(test)]
mod test {
    use super::ReferenceTable;

    macro_rules! test_harvest {
        ($src:expr, $rest:expr $(,$($label:expr => ($dest:expr, $title:expr)),* $(,)?)?) => {
            #[allow(unused_mut)]
            let mut refs = ReferenceTable::new();
            let pos = refs.harvest($src);
            assert_eq!(&$src[pos..], $rest, "\n\n{}\n\n", $src);
            $($(
                let def = refs.get($label).expect($label);
                assert_eq!(def.dest, $dest);
                assert_eq!(def.title, $title.map(str::to_string));
            )*)?
        };
    }

    #[test]
    fn simple() {
        test_harvest!("[foo]: /url\n", "", "foo" => ("/url", None::<&str>));
        test_harvest!("[foo]: /url", "", "foo" => ("/url", None::<&str>));
    }

    #[test]
    fn with_title() {
        test_harvest!(
            "[foo]: /url \"title\"\n",
            "",
            "foo" => ("/url", Some("title")),
        );
        test_harvest!(
            "[foo]: /url 'title'\n",
            "",
            "foo" => ("/url", Some("title")),
        );
        test_harvest!(
            "[foo]: /url (title)\n",
            "",
            "foo" => ("/url", Some("title")),
        );
    }

    #[test]
    fn title_next_line() {
        test_harvest!(
            "[foo]: /url\n\"title\"\n",
            "",
            "foo" => ("/url", Some("title")),
        );
    }

    #[test]
    fn title_spanning_lines() {
        test_harvest!(
            "[foo]: /url \"two\nlines\"\n",
            "",
            "foo" => ("/url", Some("two\nlines")),
        );
    }

    #[test]
    fn angle_destination() {
        test_harvest!(
            "[foo]: </my url>\n",
            "",
            "foo" => ("/my url", None::<&str>),
        );
    }

    #[test]
    fn followed_by_paragraph() {
        test_harvest!(
            "[foo]: /url\npara\n",
            "para\n",
            "foo" => ("/url", None::<&str>),
        );
    }

    #[test]
    fn junk_after_destination() {
        // neither a valid title nor a clean line end
        test_harvest!("[foo]: /url junk\n", "[foo]: /url junk\n");
    }

    #[test]
    fn bad_title_falls_back_to_dest_line() {
        // destination line is fine on its own, the would-be title line
        // reverts to paragraph text
        test_harvest!(
            "[foo]: /url\n\"title\" junk\n",
            "\"title\" junk\n",
            "foo" => ("/url", None::<&str>),
        );
    }

    #[test]
    fn not_a_definition() {
        test_harvest!("[foo] /url\n", "[foo] /url\n");
        test_harvest!("[foo]:\n", "[foo]:\n");
        test_harvest!("    [foo]: /url\n", "    [foo]: /url\n");
    }

    #[test]
    fn first_definition_wins() {
        test_harvest!(
            "[foo]: /first\n[foo]: /second\n",
            "",
            "foo" => ("/first", None::<&str>),
        );
    }

    #[test]
    fn case_folded_lookup() {
        let mut refs = ReferenceTable::new();
        refs.harvest("[ẞ]: /url\n");
        assert_eq!(refs.get("ss").unwrap().dest, "/url");
        assert_eq!(refs.get("SS").unwrap().dest, "/url");
    }

    #[test]
    fn label_whitespace_collapsed() {
        let mut refs = ReferenceTable::new();
        refs.harvest("[foo  bar]: /url\n");
        assert_eq!(refs.get("foo bar").unwrap().dest, "/url");
    }

    #[test]
    fn escaped_brackets_in_label() {
        let mut refs = ReferenceTable::new();
        refs.harvest("[a\\]b]: /url\n");
        assert!(refs.get("a\\]b").is_some());
    }

    #[test]
    fn several_definitions() {
        test_harvest!(
            "[a]: /a\n[b]: /b \"t\"\nrest\n",
            "rest\n",
            "a" => ("/a", None::<&str>),
            "b" => ("/b", Some("t")),
        );
    }
}
