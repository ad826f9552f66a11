//! Markdown rendering of extracted content
//!
//! Output is consumed verbatim by downstream stores, so the format is fixed:
//! blocks separated by one blank line, ordered items numbered from 1 within
//! each run of ordered items at the same nesting depth. Items of a nested
//! list do not interrupt the numbering of the list that encloses them.

use regex::Regex;
use std::sync::LazyLock;

use super::nodes::{ContentNode, InlineRun, merge_runs};
use crate::utils::string_utils::safe_truncate_boundary;

/// Characters that would otherwise read as inline markup
const MARKUP_CHARS: &[char] = &['\\', '*', '`', '[', ']'];

/// An escaped character, then link, bold, italic and code spans, in that
/// priority. Span bodies may contain escapes but no bare marker.
static INLINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\\([\\*`\[\]])",
        r"|\[((?:\\.|[^\]\\])+)\]\(([^)\s]+)\)",
        r"|\*\*((?:\\.|[^*\\])+?)\*\*",
        r"|\*((?:\\.|[^*\\])+?)\*",
        r"|`((?:\\.|[^`\\])+)`",
    ))
    .expect("BUG: hardcoded inline markdown regex is invalid")
});

/// Render nodes as one markdown document.
#[must_use]
pub fn render_markdown(nodes: &[ContentNode]) -> String {
    let mut blocks = Vec::with_capacity(nodes.len());
    // One counter per open list depth
    let mut ordinals: Vec<usize> = Vec::new();
    for node in nodes {
        let ordinal = match node {
            ContentNode::ListItem { ordered, depth, .. } => {
                let depth = usize::from(*depth);
                ordinals.resize(depth + 1, 0);
                if *ordered {
                    ordinals[depth] += 1;
                } else {
                    ordinals[depth] = 0;
                }
                ordinals[depth]
            }
            _ => {
                ordinals.clear();
                0
            }
        };
        blocks.push(render_block(node, ordinal));
    }
    blocks.join("\n\n")
}

fn render_block(node: &ContentNode, ordinal: usize) -> String {
    match node {
        ContentNode::Heading { level, text } => {
            let hashes = "#".repeat(usize::from((*level).clamp(1, 4)));
            format!("{hashes} {}", escape_markup(text))
        }
        ContentNode::Paragraph { runs } => render_runs(runs),
        ContentNode::ListItem { ordered, runs, .. } => {
            if *ordered {
                format!("{ordinal}. {}", render_runs(runs))
            } else {
                format!("- {}", render_runs(runs))
            }
        }
        ContentNode::CodeBlock { language, text } => {
            format!("```{}\n{text}\n```", language.as_deref().unwrap_or_default())
        }
        ContentNode::Quote { children } => render_markdown(children)
            .lines()
            .map(|line| {
                if line.is_empty() {
                    ">".to_string()
                } else {
                    format!("> {line}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n"),
        ContentNode::ImageCaption { text } => format!("*{}*", escape_markup(text)),
    }
}

/// Concatenate runs with inline markdown decoration.
#[must_use]
pub fn render_runs(runs: &[InlineRun]) -> String {
    runs.iter().map(render_run).collect()
}

fn render_run(run: &InlineRun) -> String {
    // Emphasis markers must hug non-space text, so edge whitespace stays outside
    let core = run.text.trim();
    if core.is_empty() {
        return run.text.clone();
    }
    let start = run.text.len() - run.text.trim_start().len();
    let lead = &run.text[..start];
    let trail = &run.text[start + core.len()..];

    let mut out = escape_markup(core);
    if run.code {
        out = format!("`{out}`");
    }
    if run.italic {
        out = format!("*{out}*");
    }
    if run.bold {
        out = format!("**{out}**");
    }
    if let Some(link) = &run.link {
        out = format!("[{out}]({link})");
    }
    format!("{lead}{out}{trail}")
}

fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if MARKUP_CHARS.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn unescape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(next) if MARKUP_CHARS.contains(&next) => out.push(next),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            },
            _ => out.push(c),
        }
    }
    out
}

/// Parse inline markdown back into runs.
///
/// Recognizes one style per span: `[text](url)`, `**bold**`, `*italic*` and
/// `` `code` ``. Backslash-escaped markup characters are literal text.
/// Anything else is plain text.
#[must_use]
pub fn parse_inline(text: &str) -> Vec<InlineRun> {
    let mut runs = Vec::new();
    let mut last = 0;

    for caps in INLINE_PATTERN.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > last {
            runs.push(InlineRun::plain(&text[last..whole.start()]));
        }

        let run = if let Some(escaped) = caps.get(1) {
            InlineRun::plain(escaped.as_str())
        } else if let (Some(label), Some(url)) = (caps.get(2), caps.get(3)) {
            InlineRun {
                link: Some(url.as_str().to_string()),
                ..InlineRun::plain(unescape_markup(label.as_str()))
            }
        } else if let Some(bold) = caps.get(4) {
            InlineRun {
                bold: true,
                ..InlineRun::plain(unescape_markup(bold.as_str()))
            }
        } else if let Some(italic) = caps.get(5) {
            InlineRun {
                italic: true,
                ..InlineRun::plain(unescape_markup(italic.as_str()))
            }
        } else if let Some(code) = caps.get(6) {
            InlineRun {
                code: true,
                ..InlineRun::plain(unescape_markup(code.as_str()))
            }
        } else {
            InlineRun::plain(whole.as_str())
        };
        runs.push(run);
        last = whole.end();
    }

    if last < text.len() {
        runs.push(InlineRun::plain(&text[last..]));
    }
    merge_runs(runs)
}

/// Split markdown into chunks of at most `max_chars` characters.
///
/// Breaks on blank-line paragraph boundaries; a single paragraph longer
/// than the limit is cut at the last whitespace before it.
#[must_use]
pub fn split_markdown(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();

    for paragraph in text.split("\n\n").filter(|p| !p.trim().is_empty()) {
        let joined_len = if current.is_empty() {
            paragraph.chars().count()
        } else {
            current.chars().count() + 2 + paragraph.chars().count()
        };
        if joined_len <= max_chars {
            if !current.is_empty() {
                current.push_str("\n\n");
            }
            current.push_str(paragraph);
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }

        let mut rest = paragraph;
        while rest.chars().count() > max_chars {
            let mut cut = safe_truncate_boundary(rest, max_chars, "");
            if cut == 0 {
                cut = rest
                    .char_indices()
                    .nth(max_chars)
                    .map_or(rest.len(), |(idx, _)| idx);
            }
            let (head, tail) = rest.split_at(cut);
            if !head.trim().is_empty() {
                chunks.push(head.trim_end().to_string());
            }
            rest = tail.trim_start();
        }
        if !rest.is_empty() {
            current.push_str(rest);
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
