//! Property tests for inline rendering, markdown splitting and path keys

use mediumscrape::extractor::nodes::merge_runs;
use mediumscrape::extractor::render::render_runs;
use mediumscrape::extractor::{InlineRun, parse_inline, split_markdown};
use mediumscrape::utils::url_utils::normalize_path;
use proptest::prelude::*;

const BASE: &str = "https://medium.com/me/list/reading-list";

/// Words mixing letters with markup characters, no edge whitespace
const MARKUP_TEXT: &str = r"[a-z*`\[\]\\]([a-z *`\[\]\\]{0,6}[a-z*`\[\]\\])?";

/// A run carrying at most one style
fn single_style_run() -> impl Strategy<Value = InlineRun> {
    (MARKUP_TEXT, 0u8..5, "[a-z]{1,6}").prop_map(|(text, style, slug)| {
        let mut run = InlineRun::plain(text);
        match style {
            1 => run.bold = true,
            2 => run.italic = true,
            3 => run.code = true,
            4 => run.link = Some(format!("https://example.com/{slug}")),
            _ => {}
        }
        run
    })
}

fn words_paragraph() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z]{1,12}", 1..20).prop_map(|words| words.join(" "))
}

proptest! {
    #[test]
    fn rendered_runs_parse_back(runs in prop::collection::vec(single_style_run(), 1..8)) {
        let spaced: Vec<InlineRun> = runs
            .into_iter()
            .flat_map(|run| [run, InlineRun::plain(" ")])
            .collect();
        let expected = merge_runs(spaced.clone());

        let markdown = render_runs(&spaced);
        prop_assert_eq!(parse_inline(&markdown), expected);
    }

    #[test]
    fn markers_never_wrap_edge_whitespace(text in "[a-z]{1,8}", lead in " {0,2}", trail in " {0,2}") {
        let run = InlineRun {
            bold: true,
            ..InlineRun::plain(format!("{lead}{text}{trail}"))
        };
        let rendered = render_runs(&[run]);
        prop_assert_eq!(rendered, format!("{lead}**{text}**{trail}"));
    }

    #[test]
    fn split_chunks_respect_limit_and_keep_text(
        paragraphs in prop::collection::vec(words_paragraph(), 1..6),
        max in 13usize..120,
    ) {
        let text = paragraphs.join("\n\n");
        let chunks = split_markdown(&text, max);

        for chunk in &chunks {
            prop_assert!(chunk.chars().count() <= max, "chunk over limit: {chunk:?}");
        }
        let squash = |s: &str| s.chars().filter(|c| !c.is_whitespace()).collect::<String>();
        prop_assert_eq!(squash(&chunks.concat()), squash(&text));
    }

    #[test]
    fn normalized_paths_are_stable(
        hash in "[0-9a-f]{12}",
        slash in prop::bool::ANY,
        query in prop::option::of("[a-z]{1,5}"),
    ) {
        let mut href = format!("/p/{hash}");
        if slash {
            href.push('/');
        }
        if let Some(q) = query {
            href.push_str(&format!("?source={q}"));
        }

        let once = normalize_path(BASE, &href).unwrap();
        prop_assert_eq!(&once, &format!("/p/{hash}"));
        prop_assert_eq!(normalize_path(BASE, &once).unwrap(), once);
    }
}

#[test]
fn test_adjacent_same_style_runs_merge() {
    let runs = vec![
        InlineRun::plain("a "),
        InlineRun::plain(""),
        InlineRun::plain("b"),
        InlineRun {
            bold: true,
            ..InlineRun::plain("c")
        },
    ];
    let merged = merge_runs(runs);
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].text, "a b");
    assert!(merged[1].bold);
}
