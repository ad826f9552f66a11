//! Depth-first conversion of a content root into [`ContentNode`]s
//!
//! Block elements map to nodes; inline content is gathered into
//! [`InlineRun`]s under an immutable [`StyleContext`]. Loose inline content
//! between blocks becomes an implicit paragraph.

use ego_tree::NodeRef;
use scraper::{ElementRef, Node};
use tracing::trace;

use super::nodes::{ContentNode, InlineRun, StyleContext, merge_runs};
use crate::utils::collapse_whitespace;
use crate::utils::html_utils::visible_text;
use crate::utils::string_utils::safe_truncate_chars;
use crate::utils::url_utils::absolute_url;

/// Subtrees that never carry article content
pub const PRUNED_TAGS: &[&str] = &[
    "nav", "footer", "header", "script", "style", "noscript", "template", "button", "input",
    "select", "textarea", "form", "aside", "iframe", "svg",
];

/// Platform chrome identified by `data-testid`
pub const PRUNED_TEST_IDS: &[&str] = &[
    "headerNav",
    "postMetaLockup",
    "storyFooter",
    "publicationHeader",
];

const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "br", "cite", "code", "del", "em", "i", "img", "ins", "kbd", "mark", "q",
    "s", "samp", "small", "span", "strong", "sub", "sup", "time", "u",
];

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "blockquote", "dd", "div", "dl", "dt", "figcaption", "figure", "h1",
    "h2", "h3", "h4", "h5", "h6", "hr", "li", "main", "ol", "p", "pre", "section", "table", "ul",
];

/// Nesting depth past which the walk stops descending
const MAX_DEPTH: usize = 100;

/// Cap on fallback text, in characters
pub const MAX_FALLBACK_CHARS: usize = 15_000;

/// Walk `root` and return its content in document order.
#[must_use]
pub fn walk(root: ElementRef<'_>, base_url: &str) -> Vec<ContentNode> {
    let walker = Walker { base_url };
    let mut out = Vec::new();
    walker.walk_children(*root, 0, &mut out);
    out
}

struct Walker<'u> {
    base_url: &'u str,
}

impl Walker<'_> {
    fn walk_children(&self, node: NodeRef<'_, Node>, depth: usize, out: &mut Vec<ContentNode>) {
        let mut pending = RunCollector::default();
        for child in node.children() {
            if is_pruned(child) {
                continue;
            }
            if is_inline(child) {
                self.collect_inline(child, StyleContext::default(), depth + 1, &mut pending);
                continue;
            }
            flush_paragraph(&mut pending, out);
            self.walk_block(child, depth + 1, out);
        }
        flush_paragraph(&mut pending, out);
    }

    fn walk_block(&self, node: NodeRef<'_, Node>, depth: usize, out: &mut Vec<ContentNode>) {
        if depth > MAX_DEPTH {
            trace!("Maximum nesting depth reached, skipping subtree");
            return;
        }
        let Some(element) = ElementRef::wrap(node) else {
            return;
        };

        match element.value().name() {
            tag @ ("h1" | "h2" | "h3" | "h4" | "h5" | "h6") => {
                let text = collapse_whitespace(&visible_text(element));
                if !text.is_empty() {
                    let level = tag[1..].parse::<u8>().unwrap_or(4).min(4);
                    out.push(ContentNode::Heading { level, text });
                }
            }
            "p" => {
                let runs = self.runs_of(node, depth);
                if !runs.is_empty() {
                    out.push(ContentNode::Paragraph { runs });
                }
            }
            "pre" => {
                let mut text = String::new();
                code_text(node, &mut text);
                let text = text.trim_start_matches('\n').trim_end();
                if !text.trim().is_empty() {
                    out.push(ContentNode::CodeBlock {
                        language: code_language(element),
                        text: text.to_string(),
                    });
                }
            }
            "blockquote" => {
                let mut children = Vec::new();
                self.walk_children(node, depth, &mut children);
                if !children.is_empty() {
                    out.push(ContentNode::Quote { children });
                }
            }
            list @ ("ul" | "ol") => self.walk_list(node, list == "ol", 0, depth, out),
            "figure" => {
                if let Some(text) = figure_caption(element) {
                    out.push(ContentNode::ImageCaption { text });
                }
            }
            "hr" | "img" | "br" => {}
            _ => self.walk_children(node, depth, out),
        }
    }

    fn walk_list(
        &self,
        node: NodeRef<'_, Node>,
        ordered: bool,
        nesting: u8,
        depth: usize,
        out: &mut Vec<ContentNode>,
    ) {
        if depth > MAX_DEPTH {
            return;
        }
        for item in node.children().filter(|c| element_name(*c) == Some("li")) {
            let mut collector = RunCollector::default();
            let mut nested = Vec::new();
            for child in item.children() {
                if is_pruned(child) {
                    continue;
                }
                match element_name(child) {
                    Some("ul" | "ol") => nested.push(child),
                    _ => self.collect_inline(child, StyleContext::default(), depth + 1, &mut collector),
                }
            }
            let runs = collector.finish();
            if !runs.is_empty() {
                out.push(ContentNode::ListItem {
                    ordered,
                    depth: nesting,
                    runs,
                });
            }
            for list in nested {
                let ordered = element_name(list) == Some("ol");
                self.walk_list(list, ordered, nesting.saturating_add(1), depth + 1, out);
            }
        }
    }

    fn runs_of(&self, node: NodeRef<'_, Node>, depth: usize) -> Vec<InlineRun> {
        let mut collector = RunCollector::default();
        for child in node.children() {
            self.collect_inline(child, StyleContext::default(), depth + 1, &mut collector);
        }
        collector.finish()
    }

    fn collect_inline(
        &self,
        node: NodeRef<'_, Node>,
        style: StyleContext,
        depth: usize,
        out: &mut RunCollector,
    ) {
        if depth > MAX_DEPTH {
            return;
        }
        let element = match node.value() {
            Node::Text(text) => {
                out.push(text, &style);
                return;
            }
            Node::Element(element) => element,
            _ => return,
        };
        if is_pruned(node) {
            return;
        }

        let name = element.name();
        let style = match name {
            "br" => {
                out.push(" ", &style);
                return;
            }
            "img" => return,
            "strong" | "b" => style.bold(),
            "em" | "i" => style.italic(),
            "code" | "kbd" | "samp" => style.code(),
            "a" => match element.attr("href").map(str::trim) {
                Some(href)
                    if !href.is_empty()
                        && !href.starts_with('#')
                        && !href.starts_with("javascript:") =>
                {
                    let resolved = absolute_url(self.base_url, href)
                        .map(|u| u.to_string())
                        .unwrap_or_else(|| href.to_string());
                    style.link(resolved)
                }
                _ => style,
            },
            _ => style,
        };

        let is_block = BLOCK_TAGS.contains(&name);
        if is_block {
            out.push(" ", &style);
        }
        for child in node.children() {
            self.collect_inline(child, style.clone(), depth + 1, out);
        }
        if is_block {
            out.push(" ", &style);
        }
    }
}

/// Accumulates runs with HTML whitespace collapsing across run boundaries
#[derive(Default)]
struct RunCollector {
    runs: Vec<InlineRun>,
}

impl RunCollector {
    fn push(&mut self, raw: &str, style: &StyleContext) {
        let collapsed = collapse_inline(raw);
        let after_space = self.runs.last().is_none_or(|r| r.text.ends_with(' '));
        let text = if after_space {
            collapsed.trim_start_matches(' ')
        } else {
            collapsed.as_str()
        };
        if text.is_empty() {
            return;
        }
        match self.runs.last_mut() {
            Some(last) if last.same_style(&InlineRun::styled("", style)) => last.text.push_str(text),
            _ => self.runs.push(InlineRun::styled(text, style)),
        }
    }

    fn finish(mut self) -> Vec<InlineRun> {
        while let Some(last) = self.runs.last_mut() {
            let trimmed_len = last.text.trim_end().len();
            last.text.truncate(trimmed_len);
            if last.text.is_empty() {
                self.runs.pop();
            } else {
                break;
            }
        }
        merge_runs(self.runs)
    }

    fn is_blank(&self) -> bool {
        self.runs.iter().all(|r| r.text.trim().is_empty())
    }
}

fn flush_paragraph(pending: &mut RunCollector, out: &mut Vec<ContentNode>) {
    if pending.is_blank() {
        pending.runs.clear();
        return;
    }
    let runs = std::mem::take(pending).finish();
    if !runs.is_empty() {
        out.push(ContentNode::Paragraph { runs });
    }
}

/// Map every whitespace run to one space, keeping edge spaces.
fn collapse_inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn element_name<'a>(node: NodeRef<'a, Node>) -> Option<&'a str> {
    match node.value() {
        Node::Element(el) => Some(el.name()),
        _ => None,
    }
}

fn is_pruned(node: NodeRef<'_, Node>) -> bool {
    let Node::Element(el) = node.value() else {
        return false;
    };
    if PRUNED_TAGS.contains(&el.name()) || el.attr("role") == Some("button") {
        return true;
    }
    el.attr("data-testid")
        .is_some_and(|id| PRUNED_TEST_IDS.contains(&id))
}

fn is_inline(node: NodeRef<'_, Node>) -> bool {
    match node.value() {
        Node::Element(el) => {
            INLINE_TAGS.contains(&el.name())
                && !node
                    .descendants()
                    .skip(1)
                    .any(|d| element_name(d).is_some_and(|n| BLOCK_TAGS.contains(&n)))
        }
        _ => true,
    }
}

/// Raw text of a code block; `<br>` becomes a newline.
fn code_text(node: NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if el.name() == "br" => out.push('\n'),
            Node::Element(_) => code_text(child, out),
            _ => {}
        }
    }
}

fn code_language(pre: ElementRef<'_>) -> Option<String> {
    if let Some(lang) = pre.value().attr("data-code-block-lang")
        && !lang.trim().is_empty()
    {
        return Some(lang.trim().to_string());
    }
    let code = pre
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "code");
    [Some(pre), code]
        .into_iter()
        .flatten()
        .flat_map(|el| el.value().classes())
        .find_map(|class| {
            class
                .strip_prefix("language-")
                .or_else(|| class.strip_prefix("lang-"))
                .filter(|l| !l.is_empty())
                .map(str::to_string)
        })
}

fn figure_caption(figure: ElementRef<'_>) -> Option<String> {
    let mut caption = None;
    let mut alt = None;
    for el in figure.descendants().filter_map(ElementRef::wrap) {
        match el.value().name() {
            "figcaption" if caption.is_none() => {
                let text = collapse_whitespace(&visible_text(el));
                if !text.is_empty() {
                    caption = Some(text);
                }
            }
            "img" if alt.is_none() => {
                alt = el
                    .value()
                    .attr("alt")
                    .map(collapse_whitespace)
                    .filter(|a| !a.is_empty());
            }
            _ => {}
        }
    }
    caption.or(alt)
}

/// Paragraphs built from visible text blocks when the structured walk
/// found nothing usable.
#[must_use]
pub fn fallback_paragraphs(body: ElementRef<'_>) -> Vec<ContentNode> {
    let mut blocks = Vec::new();
    fallback_text(*body, &mut blocks);

    let mut total = 0usize;
    let mut out = Vec::new();
    for block in blocks {
        if total >= MAX_FALLBACK_CHARS {
            break;
        }
        let text = safe_truncate_chars(&block, MAX_FALLBACK_CHARS - total).to_string();
        total += text.chars().count();
        out.push(ContentNode::Paragraph {
            runs: vec![InlineRun::plain(text)],
        });
    }
    out
}

fn fallback_text(node: NodeRef<'_, Node>, out: &mut Vec<String>) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => {
                let text = collapse_whitespace(text);
                if text.chars().count() > 10 {
                    out.push(text);
                }
            }
            Node::Element(el)
                if matches!(
                    el.name(),
                    "script" | "style" | "noscript" | "nav" | "footer" | "button"
                ) => {}
            Node::Element(_) => fallback_text(child, out),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn walk_body(html: &str) -> Vec<ContentNode> {
        let doc = Html::parse_document(html);
        let body = doc
            .select(&Selector::parse("body").unwrap())
            .next()
            .unwrap();
        walk(body, "https://medium.com/@a/story-abc123")
    }

    #[test]
    fn scenario_heading_paragraphs_and_list() {
        let nodes = walk_body(
            "<body><h1>Title</h1><p>First paragraph.</p><p>Use <code>cargo run</code> now.</p>\
             <ul><li>one</li><li>two</li></ul></body>",
        );
        assert_eq!(nodes.len(), 5);
        assert_eq!(
            nodes[0],
            ContentNode::Heading {
                level: 1,
                text: "Title".into()
            }
        );
        assert!(matches!(&nodes[1], ContentNode::Paragraph { runs } if runs.len() == 1));
        match &nodes[2] {
            ContentNode::Paragraph { runs } => {
                assert_eq!(runs.len(), 3);
                assert!(runs[1].code);
                assert_eq!(runs[1].text, "cargo run");
                assert_eq!(runs[0].text, "Use ");
                assert_eq!(runs[2].text, " now.");
            }
            other => panic!("expected paragraph, got {other:?}"),
        }
        assert!(matches!(&nodes[3], ContentNode::ListItem { ordered: false, .. }));
        assert!(matches!(&nodes[4], ContentNode::ListItem { ordered: false, .. }));
    }

    #[test]
    fn pruned_subtrees_are_skipped() {
        let nodes = walk_body(
            "<body><nav><p>Menu</p></nav><div data-testid='storyFooter'><p>Claps</p></div>\
             <p>Body <button>Follow</button>text</p><aside><p>Related</p></aside></body>",
        );
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].plain_text(), "Body text");
    }

    #[test]
    fn nested_styles_and_links() {
        let nodes = walk_body(
            "<body><p><a href='/p/abc'>see <strong>this <em>now</em></strong></a></p></body>",
        );
        let ContentNode::Paragraph { runs } = &nodes[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(runs.len(), 3);
        assert!(runs.iter().all(|r| r.link.as_deref() == Some("https://medium.com/p/abc")));
        assert!(!runs[0].bold);
        assert!(runs[1].bold && !runs[1].italic);
        assert!(runs[2].bold && runs[2].italic);
    }

    #[test]
    fn headings_clamp_to_four() {
        let nodes = walk_body("<body><h6>Deep</h6></body>");
        assert_eq!(
            nodes[0],
            ContentNode::Heading {
                level: 4,
                text: "Deep".into()
            }
        );
    }

    #[test]
    fn pre_keeps_line_breaks_and_language() {
        let nodes = walk_body(
            "<body><pre data-code-block-lang='rust'><span>fn main() {</span><br><span>    run();</span><br><span>}</span></pre></body>",
        );
        assert_eq!(
            nodes[0],
            ContentNode::CodeBlock {
                language: Some("rust".into()),
                text: "fn main() {\n    run();\n}".into()
            }
        );
    }

    #[test]
    fn code_class_language() {
        let nodes = walk_body("<body><pre><code class='language-python'>print(1)\n</code></pre></body>");
        assert_eq!(
            nodes[0],
            ContentNode::CodeBlock {
                language: Some("python".into()),
                text: "print(1)".into()
            }
        );
    }

    #[test]
    fn blockquote_children_are_nodes() {
        let nodes = walk_body("<body><blockquote><p>Quoted</p><p>Twice</p></blockquote></body>");
        let ContentNode::Quote { children } = &nodes[0] else {
            panic!("expected quote");
        };
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn loose_inline_text_becomes_paragraph() {
        let nodes = walk_body("<body><div>Loose <em>text</em><p>Block</p>tail</div></body>");
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].plain_text(), "Loose text");
        assert_eq!(nodes[1].plain_text(), "Block");
        assert_eq!(nodes[2].plain_text(), "tail");
    }

    #[test]
    fn figure_prefers_caption_over_alt() {
        let nodes = walk_body(
            "<body><figure><img alt='alt text'><figcaption>Photo by Ann</figcaption></figure>\
             <figure><img alt='only alt'></figure><figure><img></figure></body>",
        );
        assert_eq!(
            nodes,
            vec![
                ContentNode::ImageCaption {
                    text: "Photo by Ann".into()
                },
                ContentNode::ImageCaption {
                    text: "only alt".into()
                },
            ]
        );
    }

    #[test]
    fn ordered_list_with_nested_items() {
        let nodes = walk_body("<body><ol><li>a<ul><li>inner</li></ul></li><li>b</li></ol></body>");
        assert_eq!(
            nodes
                .iter()
                .map(|n| match n {
                    ContentNode::ListItem { ordered, depth, .. } => (*ordered, *depth, n.plain_text()),
                    other => panic!("unexpected {other:?}"),
                })
                .collect::<Vec<_>>(),
            vec![
                (true, 0, "a".to_string()),
                (false, 1, "inner".to_string()),
                (true, 0, "b".to_string())
            ]
        );
    }

    #[test]
    fn fallback_skips_short_and_chrome_text() {
        let doc = Html::parse_document(
            "<body><nav>Navigation links here</nav><div>short</div><div>This sentence is long enough.</div></body>",
        );
        let body = doc.select(&Selector::parse("body").unwrap()).next().unwrap();
        let nodes = fallback_paragraphs(body);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].plain_text(), "This sentence is long enough.");
    }
}
