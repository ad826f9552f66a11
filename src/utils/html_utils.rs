//! Text helpers over parsed `scraper` documents

use ego_tree::NodeRef;
use scraper::{ElementRef, Node};

/// Elements whose text never reaches the reader
pub const INVISIBLE_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Visible text of `element`, skipping script-like subtrees.
///
/// Text nodes are concatenated as-is; no whitespace normalization.
#[must_use]
pub fn visible_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(*element, &mut out);
    out
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => out.push_str(text),
        Node::Element(el) if INVISIBLE_TAGS.contains(&el.name()) => {}
        _ => {
            for child in node.children() {
                collect_text(child, out);
            }
        }
    }
}

/// Collapse runs of whitespace to single spaces and trim.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
