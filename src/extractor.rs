//! Section extraction over MediaWiki page HTML.
//!
//! Walks the rendered page's headings in document order and accumulates
//! each heading's following siblings into its body, stopping at the next
//! heading of the same or higher level. Nested headings get their own
//! entries named by their own heading text; their content also remains
//! part of the enclosing section's body, matching how the page reads.
//! Extraction never fails: malformed markup degrades to whatever sections
//! parsed confidently, with the map flagged partial.

use std::sync::OnceLock;

use regex::Regex;
use scraper::node::Element;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

use crate::sections::SectionMap;
use crate::RawPage;

type NodeRef<'a> = ego_tree::NodeRef<'a, Node>;

fn heading_sel() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("h1, h2, h3, h4, h5, h6").unwrap())
}

fn headline_sel() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse(".mw-headline").unwrap())
}

fn row_sel() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("tr").unwrap())
}

fn cell_sel() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("th, td").unwrap())
}

/// Parse a fetched page into its ordered section map.
pub fn extract(page: &RawPage) -> SectionMap {
    let map = extract_html(&page.html);
    debug!(title = %page.title, sections = map.len(), partial = map.is_partial(), "extracted page");
    map
}

/// Parse raw page HTML into its ordered section map.
pub fn extract_html(html: &str) -> SectionMap {
    let doc = Html::parse_document(html);
    let root = content_root(&doc);
    let mut map = SectionMap::new();

    for heading in root.select(heading_sel()) {
        let Some(level) = heading_level(heading.value()) else {
            continue;
        };
        let name = heading_name(heading);
        if name.is_empty() {
            // a heading we cannot name is a heading we cannot index
            map.mark_partial();
            continue;
        }
        let body = section_body(heading, level);
        map.push(&name, body);
    }
    map
}

/// The innermost element that holds article content: MediaWiki wraps it in
/// `.mw-parser-output` inside `#mw-content-text`; fall back to `body` for
/// fragments and non-wiki documents.
fn content_root(doc: &Html) -> ElementRef<'_> {
    static PARSER_OUTPUT: OnceLock<Selector> = OnceLock::new();
    static CONTENT_TEXT: OnceLock<Selector> = OnceLock::new();
    static BODY: OnceLock<Selector> = OnceLock::new();
    let parser_output =
        PARSER_OUTPUT.get_or_init(|| Selector::parse(".mw-parser-output").unwrap());
    let content_text =
        CONTENT_TEXT.get_or_init(|| Selector::parse("#mw-content-text").unwrap());
    let body = BODY.get_or_init(|| Selector::parse("body").unwrap());

    doc.select(parser_output)
        .next()
        .or_else(|| doc.select(content_text).next())
        .or_else(|| doc.select(body).next())
        .unwrap_or_else(|| doc.root_element())
}

fn heading_level(el: &Element) -> Option<u8> {
    match el.name() {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// Heading text as humans refer to the section: the `.mw-headline` span
/// when present, else the heading's own text, edit links stripped.
fn heading_name(heading: ElementRef<'_>) -> String {
    if let Some(headline) = heading.select(headline_sel()).next() {
        return clean_text(headline);
    }
    clean_text(heading)
}

/// If this node opens a heading (bare `h2`..`h6` or a MediaWiki
/// `div.mw-heading` wrapper), return its level.
fn boundary_level(node: NodeRef<'_>) -> Option<u8> {
    let el = match node.value() {
        Node::Element(el) => el,
        _ => return None,
    };
    if let Some(level) = heading_level(el) {
        return Some(level);
    }
    if el.name() == "div" && el.classes().any(|c| c.starts_with("mw-heading")) {
        let wrapper = ElementRef::wrap(node)?;
        return wrapper
            .select(heading_sel())
            .next()
            .and_then(|h| heading_level(h.value()));
    }
    None
}

/// Accumulate a heading's body from its following siblings.
fn section_body(heading: ElementRef<'_>, level: u8) -> String {
    // modern MediaWiki wraps headings in div.mw-heading; the content
    // siblings then hang off the wrapper, not the h-element
    let anchor: NodeRef<'_> = match heading.parent() {
        Some(parent) if boundary_level(parent).is_some() => parent,
        _ => *heading,
    };

    let mut parts: Vec<String> = Vec::new();
    for sib in anchor.next_siblings() {
        if let Some(next_level) = boundary_level(sib) {
            if next_level <= level {
                break;
            }
            // deeper heading: it opens its own section, skip its title here
            continue;
        }
        match sib.value() {
            Node::Element(el) => {
                let Some(elem) = ElementRef::wrap(sib) else {
                    continue;
                };
                let text = match el.name() {
                    "table" => table_to_text(elem),
                    "p" | "div" | "ul" | "ol" | "dl" | "blockquote" | "section" => {
                        clean_text(elem)
                    }
                    _ => String::new(),
                };
                if !text.is_empty() {
                    parts.push(text);
                }
            }
            Node::Text(t) => {
                let trimmed = t.text.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed.to_string());
                }
            }
            _ => {}
        }
    }
    parts.join("\n\n")
}

/// Flatten a table to `cell | cell | cell` rows, one line per row.
fn table_to_text(table: ElementRef<'_>) -> String {
    let mut lines: Vec<String> = Vec::new();
    for row in table.select(row_sel()) {
        let cells: Vec<String> = row.select(cell_sel()).map(clean_text).collect();
        if cells.iter().any(|c| !c.is_empty()) {
            lines.push(cells.join(" | "));
        }
    }
    lines.join("\n")
}

/// Visible text of an element: scripts, styles, edit links, and
/// `display:none` spans dropped, whitespace collapsed, footnote markers
/// stripped.
fn clean_text(el: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(*el, &mut raw);
    tidy(&raw)
}

fn collect_text(node: NodeRef<'_>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(t) => {
                out.push_str(&t.text);
                out.push(' ');
            }
            Node::Element(el) => {
                if hidden(el) {
                    continue;
                }
                collect_text(child, out);
            }
            _ => {}
        }
    }
}

fn hidden(el: &Element) -> bool {
    match el.name() {
        "script" | "style" => return true,
        _ => {}
    }
    if el.classes().any(|c| c == "mw-editsection") {
        return true;
    }
    el.attr("style")
        .is_some_and(|s| s.replace(' ', "").contains("display:none"))
}

fn tidy(s: &str) -> String {
    static FOOTNOTE: OnceLock<Regex> = OnceLock::new();
    static WS: OnceLock<Regex> = OnceLock::new();
    let footnote = FOOTNOTE.get_or_init(|| Regex::new(r"\[\s*(?:注\s*)?\d+\s*\]").unwrap());
    let ws = WS.get_or_init(|| Regex::new(r"\s+").unwrap());

    let s = footnote.replace_all(s, "");
    let s = ws.replace_all(&s, " ");
    s.trim().trim_start_matches('：').trim().to_string()
}
