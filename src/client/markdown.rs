//! A small markdown to HTML renderer for assistant replies.
//!
//! Supports fenced code blocks (with an optional language), inline
//! code, bold, italic, links and bullet/numbered list lines. All text
//! from the reply is HTML escaped before any tag is generated so the
//! only markup in the output is what this module emits.
use std::sync::LazyLock;

use regex::Regex;

static CODE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```([\w+#-]+)?[ \t]*\r?\n(.*?)```").expect("valid regex")
});
static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`\n]+)`").expect("valid regex"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)\s]+)\)").expect("valid regex"));
// Emphasis markers must hug their text, so `2 * 3 * 4` stays as is
static BOLD_ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*\*(\S(?:.*?\S)?)\*\*\*").expect("valid regex"));
static BOLD_STARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(\S(?:.*?\S)?)\*\*").expect("valid regex"));
static BOLD_UNDERSCORES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__(\S(?:.*?\S)?)__").expect("valid regex"));
static ITALIC_STAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*\s](?:[^*]*?[^*\s])?)\*").expect("valid regex"));
static ITALIC_UNDERSCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_([^_\s](?:[^_]*?[^_\s])?)_").expect("valid regex"));
static BULLET_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*+] (.+)$").expect("valid regex"));
static NUMBERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\. (.+)$").expect("valid regex"));

pub fn escape_html(text: &str) -> String {
    html_escape::encode_quoted_attribute(text).into_owned()
}

/// Render an assistant reply to safe HTML.
pub fn render_markdown(content: &str) -> String {
    let mut html = String::new();
    let mut last = 0;
    let mut first = true;

    for caps in CODE_BLOCK.captures_iter(content) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let text = &content[last..whole.start()];
        html.push_str(&render_text(strip_edge_newlines(text, !first, true)));
        html.push_str(&render_code_block(
            caps.get(1).map(|m| m.as_str()),
            caps.get(2).map_or("", |m| m.as_str()),
        ));
        last = whole.end();
        first = false;
    }

    let rest = &content[last..];
    html.push_str(&render_text(strip_edge_newlines(rest, !first, false)));
    html
}

// Newlines that only separate text from a code block shouldn't turn
// into line breaks.
fn strip_edge_newlines(text: &str, after_block: bool, before_block: bool) -> &str {
    let mut text = text;
    if after_block {
        text = text
            .strip_prefix("\r\n")
            .or_else(|| text.strip_prefix('\n'))
            .unwrap_or(text);
    }
    if before_block {
        text = text
            .strip_suffix("\r\n")
            .or_else(|| text.strip_suffix('\n'))
            .unwrap_or(text);
    }
    text
}

fn render_code_block(lang: Option<&str>, code: &str) -> String {
    let header = lang
        .map(|l| format!("<div class=\"code-header\">{}</div>", escape_html(l)))
        .unwrap_or_default();
    format!(
        "<div class=\"code-block\">{}<pre><code class=\"language-{}\">{}</code></pre></div>",
        header,
        escape_html(lang.unwrap_or("text")),
        escape_html(code.trim())
    )
}

#[derive(Clone, Copy, PartialEq)]
enum ListKind {
    Bullet,
    Numbered,
}

impl ListKind {
    fn tag(&self) -> &'static str {
        match self {
            ListKind::Bullet => "ul",
            ListKind::Numbered => "ol",
        }
    }
}

/// Render a run of text that contains no code blocks. List items on
/// consecutive lines are grouped, every other newline becomes `<br>`.
fn render_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    let mut open_list: Option<ListKind> = None;
    let mut needs_break = false;

    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let item = if let Some(caps) = BULLET_ITEM.captures(line) {
            Some((ListKind::Bullet, caps.get(1).map_or("", |m| m.as_str())))
        } else if let Some(caps) = NUMBERED_ITEM.captures(line) {
            Some((ListKind::Numbered, caps.get(1).map_or("", |m| m.as_str())))
        } else {
            None
        };

        match item {
            Some((kind, body)) => {
                // Lists are block level, no break needed before them
                if open_list != Some(kind) {
                    if let Some(prev) = open_list {
                        out.push_str(&format!("</{}>", prev.tag()));
                    }
                    out.push_str(&format!("<{}>", kind.tag()));
                    open_list = Some(kind);
                }
                out.push_str(&format!("<li>{}</li>", render_inline(body)));
                needs_break = false;
            }
            None => {
                if let Some(prev) = open_list.take() {
                    out.push_str(&format!("</{}>", prev.tag()));
                } else if needs_break {
                    out.push_str("<br>");
                }
                out.push_str(&render_inline(line));
                needs_break = true;
            }
        }
    }

    if let Some(prev) = open_list {
        out.push_str(&format!("</{}>", prev.tag()));
    }
    out
}

/// Inline code spans are cut out first so emphasis and links never
/// apply inside them.
fn render_inline(line: &str) -> String {
    let mut out = String::new();
    let mut last = 0;
    for caps in INLINE_CODE.captures_iter(line) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&render_spans(&escape_html(&line[last..whole.start()])));
        out.push_str(&format!(
            "<code class=\"inline-code\">{}</code>",
            escape_html(caps.get(1).map_or("", |m| m.as_str()))
        ));
        last = whole.end();
    }
    out.push_str(&render_spans(&escape_html(&line[last..])));
    out
}

fn is_safe_href(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    match lower.split_once(':') {
        // A colon after a path or query character isn't a scheme
        Some((scheme, _)) if !scheme.contains(['/', '?', '#']) => {
            matches!(scheme, "http" | "https" | "mailto")
        }
        _ => true,
    }
}

/// Links, bold and italic over already escaped text. Emphasis is
/// applied around links and to link text, never to the generated
/// anchor attributes.
fn render_spans(escaped: &str) -> String {
    let mut out = String::new();
    let mut last = 0;
    for caps in LINK.captures_iter(escaped) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&render_emphasis(&escaped[last..whole.start()]));
        let (text, href) = (render_emphasis(&caps[1]), &caps[2]);
        if is_safe_href(href) {
            out.push_str(&format!(
                "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
                href, text
            ));
        } else {
            out.push_str(&text);
        }
        last = whole.end();
    }
    out.push_str(&render_emphasis(&escaped[last..]));
    out
}

fn render_emphasis(escaped: &str) -> String {
    let html = BOLD_ITALIC.replace_all(escaped, "<strong><em>$1</em></strong>");
    let html = BOLD_STARS.replace_all(&html, "<strong>$1</strong>");
    let html = BOLD_UNDERSCORES.replace_all(&html, "<strong>$1</strong>");
    let html = ITALIC_STAR.replace_all(&html, "<em>$1</em>");
    italicize_underscores(&html)
}

fn is_word_char(c: Option<char>) -> bool {
    c.is_some_and(|c| c.is_alphanumeric() || c == '_')
}

/// `_text_` only counts when the underscores aren't inside a word, so
/// snake_case names are left alone. The neighbouring characters are
/// checked without consuming them so adjacent spans both render.
fn italicize_underscores(html: &str) -> String {
    let mut out = String::new();
    let mut last = 0;
    let mut pos = 0;
    while let Some(caps) = ITALIC_UNDERSCORE.captures_at(html, pos) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let before = html[..whole.start()].chars().next_back();
        let after = html[whole.end()..].chars().next();
        if is_word_char(before) || is_word_char(after) {
            // Retry from just past the opening underscore
            pos = whole.start() + 1;
            continue;
        }
        out.push_str(&html[last..whole.start()]);
        out.push_str("<em>");
        out.push_str(inner.as_str());
        out.push_str("</em>");
        last = whole.end();
        pos = whole.end();
    }
    out.push_str(&html[last..]);
    out
}
