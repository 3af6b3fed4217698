#![cfg(feature = "html")]

macro_rules! test_html {
    ($src:expr, $expected:expr $(,)?) => {
        assert_eq!(marktree::html::render($src), $expected);
    };
}

#[test]
fn mini_soft_break() {
    test_html!(
        concat!(
            "a\n", //
            "b\n",
        ),
        concat!(
            "<p>a\n", //
            "b</p>"
        ),
    );
}

#[test]
fn mini_hard_break() {
    test_html!(
        concat!(
            "a\\\n", //
            "b\n",
        ),
        "<p>a<br>b</p>",
    );
    test_html!(
        concat!(
            "a  \n", //
            "b\n",
        ),
        "<p>a<br>b</p>",
    );
}

#[test]
fn mini_blank_line() {
    test_html!(
        concat!(
            "a\n", //
            "\n",  //
            "\n",  //
            "b\n",
        ),
        "<p>a</p><p>b</p>",
    );
}

#[test]
fn headings() {
    test_html!("# Foo\n", "<h1>Foo</h1>");
    test_html!("###### deep\n", "<h6>deep</h6>");
    test_html!("####### deep\n", "<p>####### deep</p>");
    test_html!("#hash\n", "<p>#hash</p>");
    test_html!(
        concat!(
            "Foo\n", //
            "---\n",
        ),
        "<h2>Foo</h2>",
    );
}

#[test]
fn thematic_breaks() {
    test_html!("***\n", "<hr>");
    test_html!(" - - -\n", "<hr>");
    test_html!("**\n", "<p>**</p>");
    test_html!("*-*\n", "<p><em>-</em></p>");
}

#[test]
fn code_blocks() {
    test_html!("    a < b\n", "<pre><code>a &lt; b\n</code></pre>");
    test_html!(
        concat!(
            "```rust\n",     //
            "fn f() {}\n",   //
            "```\n",
        ),
        "<pre><code class=\"language-rust\">fn f() {}\n</code></pre>",
    );
}

#[test]
fn blockquote_lazy() {
    test_html!(
        concat!(
            "> a\n", //
            "b\n",
        ),
        concat!(
            "<blockquote><p>a\n", //
            "b</p></blockquote>",
        ),
    );
}

#[test]
fn lists() {
    test_html!(
        concat!(
            "- a\n", //
            "- b\n",
        ),
        "<ul><li>a</li><li>b</li></ul>",
    );
    test_html!(
        concat!(
            "- a\n", //
            "\n",    //
            "- b\n",
        ),
        "<ul><li><p>a</p></li><li><p>b</p></li></ul>",
    );
    test_html!("3) a\n", "<ol start=\"3\"><li>a</li></ol>");
    test_html!("1. a\n", "<ol><li>a</li></ol>");
}

#[test]
fn task_lists() {
    test_html!(
        concat!(
            "- [x] done\n", //
            "- [ ] todo\n",
        ),
        concat!(
            "<ul><li><input type=\"checkbox\" checked disabled>done</li>",
            "<li><input type=\"checkbox\" disabled>todo</li></ul>",
        ),
    );
}

#[test]
fn tables() {
    test_html!(
        concat!(
            "a|b\n",   //
            "-|:-:\n", //
            "1|2\n",
        ),
        concat!(
            "<table><thead><tr><th>a</th><th align=\"center\">b</th></tr></thead>",
            "<tbody><tr><td>1</td><td align=\"center\">2</td></tr></tbody></table>",
        ),
    );
    test_html!(
        concat!(
            "a|b\n", //
            "-|-\n",
        ),
        "<table><thead><tr><th>a</th><th>b</th></tr></thead></table>",
    );
}

#[test]
fn emphasis_variants() {
    test_html!("*a*\n", "<p><em>a</em></p>");
    test_html!("**a**\n", "<p><strong>a</strong></p>");
    test_html!("_a_\n", "<p><em>a</em></p>");
    test_html!("__a__\n", "<p><u>a</u></p>");
    test_html!("~a~\n", "<p><sub>a</sub></p>");
    test_html!("~~a~~\n", "<p><s>a</s></p>");
    test_html!("^a^\n", "<p><sup>a</sup></p>");
    test_html!("==a==\n", "<p><mark>a</mark></p>");
    test_html!("++a++\n", "<p><ins>a</ins></p>");
    // single = and + stay literal
    test_html!("=a=\n", "<p>=a=</p>");
    test_html!("+a+\n", "<p>+a+</p>");
}

#[test]
fn rule_of_three() {
    test_html!("*foo**bar*\n", "<p><em>foo**bar</em></p>");
    test_html!("***foo***\n", "<p><em><strong>foo</strong></em></p>");
    test_html!("***foo**\n", "<p>*<strong>foo</strong></p>");
}

#[test]
fn code_spans() {
    test_html!("`a<b`\n", "<p><code>a&lt;b</code></p>");
    test_html!("`` `x` ``\n", "<p><code>`x`</code></p>");
    test_html!("`*not em*`\n", "<p><code>*not em*</code></p>");
}

#[test]
fn links() {
    test_html!(
        "[a](/u \"t\")\n",
        "<p><a href=\"/u\" title=\"t\">a</a></p>",
    );
    test_html!(
        concat!(
            "[foo]\n",          //
            "\n",               //
            "[foo]: /url \"t\"\n",
        ),
        "<p><a href=\"/url\" title=\"t\">foo</a></p>",
    );
    test_html!("![a *b*](/u)\n", "<p><img src=\"/u\" alt=\"a b\"></p>");
    test_html!(
        "<https://example.com>\n",
        "<p><a href=\"https://example.com\">https://example.com</a></p>",
    );
    test_html!(
        "<me@example.com>\n",
        "<p><a href=\"mailto:me@example.com\">me@example.com</a></p>",
    );
}

#[test]
fn reference_case_folding() {
    test_html!(
        concat!(
            "[ẞ]\n", //
            "\n",     //
            "[ss]: /u\n",
        ),
        "<p><a href=\"/u\">ẞ</a></p>",
    );
    // the first definition of a label wins
    test_html!(
        concat!(
            "[a]: /1\n", //
            "[a]: /2\n", //
            "\n",        //
            "[a]\n",
        ),
        "<p><a href=\"/1\">a</a></p>",
    );
}

#[test]
fn raw_html() {
    test_html!(
        concat!(
            "<div>\n", //
            "x\n",     //
            "</div>\n",
        ),
        concat!(
            "<div>\n", //
            "x\n",     //
            "</div>\n",
        ),
    );
    test_html!("a <b>c</b>\n", "<p>a <b>c</b></p>");
}

#[test]
fn escapes() {
    test_html!("\\*not em\\*\n", "<p>*not em*</p>");
    test_html!("a & b\n", "<p>a &amp; b</p>");
}
