//! Structured article content

use serde::{Deserialize, Serialize};

/// One block of article content, in document order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentNode {
    /// Level is clamped to 1..=4
    Heading { level: u8, text: String },
    Paragraph { runs: Vec<InlineRun> },
    CodeBlock {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        text: String,
    },
    Quote { children: Vec<ContentNode> },
    /// Depth 0 is a top-level list; nested lists are flattened after their parent item
    ListItem {
        ordered: bool,
        #[serde(default, skip_serializing_if = "is_top_level")]
        depth: u8,
        runs: Vec<InlineRun>,
    },
    ImageCaption { text: String },
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_top_level(depth: &u8) -> bool {
    *depth == 0
}

impl ContentNode {
    /// Plain visible text, without markdown decoration.
    #[must_use]
    pub fn plain_text(&self) -> String {
        match self {
            Self::Heading { text, .. } | Self::CodeBlock { text, .. } | Self::ImageCaption { text } => {
                text.clone()
            }
            Self::Paragraph { runs } | Self::ListItem { runs, .. } => {
                runs.iter().map(|r| r.text.as_str()).collect()
            }
            Self::Quote { children } => children
                .iter()
                .map(ContentNode::plain_text)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Maximal span of text sharing one style and link state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineRun {
    pub text: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub code: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl InlineRun {
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn styled(text: impl Into<String>, style: &StyleContext) -> Self {
        Self {
            text: text.into(),
            bold: style.bold,
            italic: style.italic,
            code: style.code,
            link: style.link.clone(),
        }
    }

    #[must_use]
    pub fn same_style(&self, other: &Self) -> bool {
        self.bold == other.bold
            && self.italic == other.italic
            && self.code == other.code
            && self.link == other.link
    }
}

/// Merge adjacent runs with identical style and drop empty ones.
#[must_use]
pub fn merge_runs(runs: Vec<InlineRun>) -> Vec<InlineRun> {
    let mut merged: Vec<InlineRun> = Vec::with_capacity(runs.len());
    for run in runs {
        if run.text.is_empty() {
            continue;
        }
        match merged.last_mut() {
            Some(last) if last.same_style(&run) => last.text.push_str(&run.text),
            _ => merged.push(run),
        }
    }
    merged
}

/// Inherited inline style during the DOM walk
///
/// Immutable: each nested element derives a new context by value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleContext {
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
    pub link: Option<String>,
}

impl StyleContext {
    #[must_use]
    pub fn bold(self) -> Self {
        Self { bold: true, ..self }
    }

    #[must_use]
    pub fn italic(self) -> Self {
        Self {
            italic: true,
            ..self
        }
    }

    #[must_use]
    pub fn code(self) -> Self {
        Self { code: true, ..self }
    }

    /// Innermost link wins.
    #[must_use]
    pub fn link(self, href: String) -> Self {
        Self {
            link: Some(href),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_joins_same_style_neighbours() {
        let bold = StyleContext::default().bold();
        let runs = vec![
            InlineRun::styled("a", &bold),
            InlineRun::styled("b", &bold),
            InlineRun::plain(""),
            InlineRun::plain("c"),
        ];
        let merged = merge_runs(runs);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].text, "ab");
        assert!(merged[0].bold);
        assert_eq!(merged[1], InlineRun::plain("c"));
    }

    #[test]
    fn style_context_is_derived_by_value() {
        let base = StyleContext::default();
        let nested = base.clone().italic().link("https://x.test".to_string());
        assert!(!base.italic);
        assert!(nested.italic);
        assert_eq!(nested.link.as_deref(), Some("https://x.test"));
    }

    #[test]
    fn node_json_is_tagged() {
        let node = ContentNode::Heading {
            level: 2,
            text: "Intro".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&node).unwrap(),
            r#"{"type":"heading","level":2,"text":"Intro"}"#
        );
    }
}
