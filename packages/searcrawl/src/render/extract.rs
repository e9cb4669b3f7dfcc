//! Main-content extraction for static HTML.
//!
//! The page is split into leaf text blocks (headings, paragraphs, list
//! items, cells, ...). Each block gets a density score:
//!
//! ```text
//! score = 0.4 * text_density + 0.3 * (1 - link_density) + 0.2 * tag_weight + 0.1 * class_weight
//! ```
//!
//! Blocks under the threshold, or with too few words, are pruned. What is
//! left is converted to markdown block by block.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use scraper::{ElementRef, Html};
use url::Url;

use crate::types::config::RenderOptions;

const TEXT_DENSITY_WEIGHT: f32 = 0.4;
const LINK_DENSITY_WEIGHT: f32 = 0.3;
const TAG_WEIGHT: f32 = 0.2;
const CLASS_WEIGHT: f32 = 0.1;

const NEUTRAL_CLASS_WEIGHT: f32 = 0.5;

/// Elements scored as a unit when no block element is nested inside.
const LEAF_BLOCK_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "li", "pre", "blockquote", "td", "th", "dd", "dt",
    "figcaption",
];

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Never content, regardless of options.
const SKIPPED_TAGS: &[&str] = &["head", "script", "style", "noscript", "template", "svg"];

lazy_static! {
    static ref OVERLAY_HINT: Regex =
        Regex::new(r"(?i)modal|overlay|popup|cookie|consent|lightbox").unwrap();
    static ref POSITIVE_CLASS: Regex =
        Regex::new(r"(?i)article|content|main|post|entry|story|body|text").unwrap();
    static ref NEGATIVE_CLASS: Regex = Regex::new(
        r"(?i)nav|footer|header|sidebar|banner|comment|share|social|menu|related|promo|widget|\bads?\b"
    )
    .unwrap();
    static ref MARKDOWN_IMAGE: Regex = Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap();
    static ref MARKDOWN_LINK: Regex =
        Regex::new(r#"\[([^\]]*)\]\(([^)\s]*)(?:\s+"[^"]*")?\)"#).unwrap();
}

/// Result of extracting one page.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedContent {
    pub markdown: String,

    /// Mean score of the kept blocks; `None` when nothing was kept
    pub density_score: Option<f32>,

    pub kept_blocks: usize,
    pub pruned_blocks: usize,
}

struct Block {
    tag: String,
    html: String,
    word_count: usize,
    score: f32,
}

/// Extract the main content of `html` as markdown.
///
/// `page_url` is the final URL of the page (after redirects); links to other
/// hosts are judged against it.
pub fn extract_content(html: &str, page_url: &str, options: &RenderOptions) -> ExtractedContent {
    let document = Html::parse_document(html);
    let mut blocks = Vec::new();
    collect_blocks(
        document.root_element(),
        options,
        NEUTRAL_CLASS_WEIGHT,
        &mut blocks,
    );

    let total = blocks.len();
    let kept: Vec<Block> = blocks
        .into_iter()
        .filter(|block| keep_block(block, options))
        .collect();

    let page_host = Url::parse(page_url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string));

    let markdown = kept
        .iter()
        .filter_map(|block| block_to_markdown(&block.html, page_host.as_deref(), options))
        .collect::<Vec<_>>()
        .join("\n\n");

    let density_score = if kept.is_empty() {
        None
    } else {
        Some(kept.iter().map(|b| b.score).sum::<f32>() / kept.len() as f32)
    };

    ExtractedContent {
        markdown,
        density_score,
        kept_blocks: kept.len(),
        pruned_blocks: total - kept.len(),
    }
}

fn collect_blocks(
    element: ElementRef<'_>,
    options: &RenderOptions,
    inherited_weight: f32,
    out: &mut Vec<Block>,
) {
    for child in element.children() {
        let Some(child) = ElementRef::wrap(child) else {
            continue;
        };
        let name = child.value().name();

        // Frames are inlined before tag exclusion applies.
        if name == "iframe" {
            if options.process_embedded_frames {
                if let Some(srcdoc) = child.value().attr("srcdoc") {
                    let frame = Html::parse_document(srcdoc);
                    collect_blocks(frame.root_element(), options, inherited_weight, out);
                }
            }
            continue;
        }

        if SKIPPED_TAGS.contains(&name) || options.is_excluded_tag(name) {
            continue;
        }
        if options.remove_overlays && is_overlay(child) {
            continue;
        }

        let weight = class_weight(child).unwrap_or(inherited_weight);
        let is_leaf = !has_nested_block(child)
            && (LEAF_BLOCK_TAGS.contains(&name) || has_direct_text(child));

        if is_leaf {
            if let Some(block) = score_block(child, weight) {
                out.push(block);
            }
        } else {
            collect_blocks(child, options, weight, out);
        }
    }
}

fn has_nested_block(element: ElementRef<'_>) -> bool {
    element
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(|e| {
            let name = e.value().name();
            LEAF_BLOCK_TAGS.contains(&name) || name == "iframe" || name == "div"
        })
}

fn has_direct_text(element: ElementRef<'_>) -> bool {
    element
        .children()
        .filter_map(|node| node.value().as_text())
        .any(|text| !text.trim().is_empty())
}

fn is_overlay(element: ElementRef<'_>) -> bool {
    let value = element.value();

    if matches!(value.attr("role"), Some("dialog") | Some("alertdialog")) {
        return true;
    }
    if value.attr("aria-modal") == Some("true") {
        return true;
    }

    let class = value.attr("class").unwrap_or_default();
    let id = value.id().unwrap_or_default();
    OVERLAY_HINT.is_match(class) || OVERLAY_HINT.is_match(id)
}

/// Weight from the element's own class/id, if it says anything.
fn class_weight(element: ElementRef<'_>) -> Option<f32> {
    let value = element.value();
    let hints = format!(
        "{} {}",
        value.attr("class").unwrap_or_default(),
        value.id().unwrap_or_default()
    );
    if hints.trim().is_empty() {
        return None;
    }

    if NEGATIVE_CLASS.is_match(&hints) {
        Some(0.0)
    } else if POSITIVE_CLASS.is_match(&hints) {
        Some(1.0)
    } else {
        None
    }
}

fn tag_weight(tag: &str) -> f32 {
    match tag {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "p" | "pre" | "blockquote" => 1.0,
        "li" | "td" | "th" | "dd" | "dt" => 0.7,
        "figcaption" => 0.6,
        _ => 0.5,
    }
}

fn collapse_whitespace<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn score_block(element: ElementRef<'_>, class_weight: f32) -> Option<Block> {
    let text = collapse_whitespace(element.text());
    if text.is_empty() {
        return None;
    }

    let link_text_len: usize = element
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == "a")
        .map(|a| collapse_whitespace(a.text()).len())
        .sum();

    let inner_len = element.inner_html().len().max(1);
    let text_density = (text.len() as f32 / inner_len as f32).min(1.0);
    let link_density = (link_text_len as f32 / text.len() as f32).min(1.0);
    let tag = element.value().name();

    let score = TEXT_DENSITY_WEIGHT * text_density
        + LINK_DENSITY_WEIGHT * (1.0 - link_density)
        + TAG_WEIGHT * tag_weight(tag)
        + CLASS_WEIGHT * class_weight;

    Some(Block {
        tag: tag.to_string(),
        html: element.html(),
        word_count: text.split_whitespace().count(),
        score,
    })
}

fn keep_block(block: &Block, options: &RenderOptions) -> bool {
    if block.score < options.content_density_threshold {
        return false;
    }
    HEADING_TAGS.contains(&block.tag.as_str()) || block.word_count >= options.min_word_count
}

fn block_to_markdown(html: &str, page_host: Option<&str>, options: &RenderOptions) -> Option<String> {
    let markdown = htmd::convert(html).ok()?;
    let markdown = MARKDOWN_IMAGE.replace_all(&markdown, "");

    let markdown = if options.exclude_external_links {
        MARKDOWN_LINK
            .replace_all(&markdown, |caps: &Captures| {
                if is_external(&caps[2], page_host) {
                    caps[1].to_string()
                } else {
                    caps[0].to_string()
                }
            })
            .into_owned()
    } else {
        markdown.into_owned()
    };

    let markdown = markdown.trim();
    (!markdown.is_empty()).then(|| markdown.to_string())
}

fn is_external(target: &str, page_host: Option<&str>) -> bool {
    let Some(page_host) = page_host else {
        return false;
    };
    match Url::parse(target) {
        Ok(url) => url
            .host_str()
            .is_some_and(|host| strip_www(host) != strip_www(page_host)),
        // Relative link
        Err(_) => false,
    }
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_URL: &str = "https://example.com/guide";

    const LONG_SENTENCE: &str =
        "Rust gives you memory safety without a garbage collector and it does so at compile time.";

    fn page(body: &str) -> String {
        format!(
            "<html><head><title>t</title><style>p {{ color: red; }}</style></head><body>{}</body></html>",
            body
        )
    }

    #[test]
    fn test_extract_keeps_article_drops_chrome() {
        let html = page(&format!(
            r#"<nav><a href="/">Home</a><a href="/about">About</a></nav>
               <header><p>{LONG_SENTENCE} header copy</p></header>
               <article><h1>Ownership</h1><p>{LONG_SENTENCE}</p></article>
               <footer><p>{LONG_SENTENCE} footer copy</p></footer>
               <script>var tracking = "{LONG_SENTENCE}";</script>"#
        ));

        let content = extract_content(&html, PAGE_URL, &RenderOptions::default());

        assert!(content.markdown.contains("Ownership"));
        assert!(content.markdown.contains("memory safety"));
        assert!(!content.markdown.contains("header copy"));
        assert!(!content.markdown.contains("footer copy"));
        assert!(!content.markdown.contains("tracking"));
        assert!(!content.markdown.contains("About"));
        assert_eq!(content.kept_blocks, 2);
    }

    #[test]
    fn test_link_lists_and_short_blocks_pruned() {
        let html = page(&format!(
            r#"<ul><li><a href="/a">First link</a></li><li><a href="/b">Second link</a></li></ul>
               <p>Too short.</p>
               <p>{LONG_SENTENCE}</p>"#
        ));

        let content = extract_content(&html, PAGE_URL, &RenderOptions::default());

        assert_eq!(content.kept_blocks, 1);
        assert_eq!(content.pruned_blocks, 3);
        assert!(!content.markdown.contains("First link"));
        assert!(!content.markdown.contains("Too short"));
    }

    #[test]
    fn test_heading_exempt_from_word_count() {
        let html = page(&format!("<h2>Borrowing</h2><p>{LONG_SENTENCE}</p>"));

        let content = extract_content(&html, PAGE_URL, &RenderOptions::default());

        assert!(content.markdown.contains("Borrowing"));
        assert_eq!(content.kept_blocks, 2);
    }

    #[test]
    fn test_overlays_removed_only_when_asked() {
        let html = page(&format!(
            r#"<div class="cookie-banner"><p>{LONG_SENTENCE} accept cookies</p></div>
               <div role="dialog"><p>{LONG_SENTENCE} subscribe now</p></div>
               <p>{LONG_SENTENCE}</p>"#
        ));

        let removed = extract_content(&html, PAGE_URL, &RenderOptions::default());
        assert!(!removed.markdown.contains("accept cookies"));
        assert!(!removed.markdown.contains("subscribe now"));

        let options = RenderOptions {
            remove_overlays: false,
            ..RenderOptions::default()
        };
        let kept = extract_content(&html, PAGE_URL, &options);
        assert!(kept.markdown.contains("accept cookies"));
        assert!(kept.markdown.contains("subscribe now"));
    }

    #[test]
    fn test_iframe_srcdoc_processed() {
        let frame = format!("<p>{LONG_SENTENCE} framed</p>");
        let html = page(&format!(
            r#"<iframe srcdoc="{}"></iframe><iframe src="https://ads.example.net"></iframe>"#,
            frame.replace('"', "&quot;")
        ));

        let content = extract_content(&html, PAGE_URL, &RenderOptions::default());
        assert!(content.markdown.contains("framed"));

        let options = RenderOptions {
            process_embedded_frames: false,
            ..RenderOptions::default()
        };
        assert!(!extract_content(&html, PAGE_URL, &options)
            .markdown
            .contains("framed"));
    }

    #[test]
    fn test_external_links_and_images_stripped() {
        let html = page(
            r#"<p>Read the long guide at <a href="https://other.com/x">the other site</a> and
               <a href="/local">this page</a> for many more details about the language today.
               <img src="/logo.png" alt="logo"></p>"#,
        );

        let content = extract_content(&html, PAGE_URL, &RenderOptions::default());

        assert!(content.markdown.contains("the other site"));
        assert!(!content.markdown.contains("other.com"));
        assert!(content.markdown.contains("[this page](/local)"));
        assert!(!content.markdown.contains("logo.png"));
    }

    #[test]
    fn test_density_score_is_mean_of_kept() {
        let html = page(&format!("<p>{LONG_SENTENCE}</p><p>{LONG_SENTENCE} again</p>"));
        let content = extract_content(&html, PAGE_URL, &RenderOptions::default());

        let score = content.density_score.unwrap();
        assert!(score >= 0.6 && score <= 1.0);

        let empty = extract_content(&page("<div></div>"), PAGE_URL, &RenderOptions::default());
        assert!(empty.density_score.is_none());
        assert!(empty.markdown.is_empty());
    }

    #[test]
    fn test_is_external() {
        assert!(is_external("https://other.com/x", Some("example.com")));
        assert!(!is_external("https://www.example.com/x", Some("example.com")));
        assert!(!is_external("/relative", Some("example.com")));
        assert!(!is_external("https://other.com/x", None));
    }
}
