//! Content normalizer: rendered markdown to plain prose.
//!
//! Two stages:
//!
//! 1. Markdown is rendered to HTML, parsed into a node tree, and only the
//!    text nodes are kept. Block elements start a new line, inline elements
//!    (emphasis, links, inline code) stay on the line they are in. Blank
//!    lines are dropped and every line is trimmed.
//! 2. Residual light-markup tokens that survive stage 1 (literal markdown
//!    inside code spans, unconverted emphasis from the renderer's own
//!    generator) are stripped with a fixed sequence of substitutions.
//!
//! Both stages are total: malformed input degrades to less-clean text, it
//! never errors.

use lazy_static::lazy_static;
use pulldown_cmark::{html, Options, Parser};
use regex::Regex;
use scraper::{ElementRef, Html};

/// Elements that begin and end a line of text.
const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "caption",
    "dd",
    "div",
    "dl",
    "dt",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "li",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "tbody",
    "td",
    "tfoot",
    "th",
    "thead",
    "tr",
    "ul",
];

/// Elements whose text is never content.
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template"];

lazy_static! {
    static ref HEADING: Regex = Regex::new(r"(?m)^#+[ \t]*").unwrap();
    static ref LINK: Regex = Regex::new(r"!?\[([^\]]+)\]\([^)]+\)").unwrap();
    static ref BOLD_STARS: Regex = Regex::new(r"\*\*(.*?)\*\*").unwrap();
    static ref BOLD_UNDERSCORES: Regex = Regex::new(r"__(.*?)__").unwrap();
    static ref EMPHASIS_STAR: Regex = Regex::new(r"\*(.*?)\*").unwrap();
    static ref EMPHASIS_UNDERSCORE: Regex = Regex::new(r"_(.*?)_").unwrap();
    static ref LIST_BULLET: Regex = Regex::new(r"(?m)^[*\-+][ \t]*").unwrap();
    static ref FENCED_CODE: Regex = Regex::new(r"(?s)```.*?```").unwrap();
    static ref INLINE_CODE: Regex = Regex::new(r"`(.*?)`").unwrap();
    static ref BLOCK_QUOTE: Regex = Regex::new(r"(?m)^>[ \t]*").unwrap();
}

/// Normalize rendered markdown into plain prose (stage 1 then stage 2).
pub fn normalize(markup: &str) -> String {
    strip_markdown_syntax(&markdown_to_text(markup))
}

/// Stage 1: render markdown and keep the text nodes, one block per line.
pub fn markdown_to_text(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut rendered = String::with_capacity(markdown.len() + markdown.len() / 2);
    html::push_html(&mut rendered, Parser::new_ext(markdown, options));

    let fragment = Html::parse_fragment(&rendered);
    let mut text = String::with_capacity(rendered.len());
    collect_text(fragment.root_element(), &mut text);

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            continue;
        }

        let Some(child_element) = ElementRef::wrap(child) else {
            continue;
        };

        let name = child_element.value().name();
        if SKIPPED_TAGS.contains(&name) {
            continue;
        }
        if name == "br" {
            out.push('\n');
            continue;
        }

        let is_block = BLOCK_TAGS.contains(&name);
        if is_block {
            out.push('\n');
        }
        collect_text(child_element, out);
        if is_block {
            out.push('\n');
        }
    }
}

/// Stage 2: strip residual markdown tokens.
///
/// Order matters: later patterns assume earlier ones already collapsed
/// (e.g. emphasis after bold, inline code after fenced blocks).
pub fn strip_markdown_syntax(text: &str) -> String {
    let text = HEADING.replace_all(text, "");
    let text = LINK.replace_all(&text, "${1}");
    let text = BOLD_STARS.replace_all(&text, "${1}");
    let text = BOLD_UNDERSCORES.replace_all(&text, "${1}");
    let text = EMPHASIS_STAR.replace_all(&text, "${1}");
    let text = EMPHASIS_UNDERSCORE.replace_all(&text, "${1}");
    let text = LIST_BULLET.replace_all(&text, "");
    let text = FENCED_CODE.replace_all(&text, "");
    let text = INLINE_CODE.replace_all(&text, "${1}");
    let text = BLOCK_QUOTE.replace_all(&text, "");

    text.trim().to_string()
}
