use proptest::prelude::*;
use prosa_lib::builder::segment;
use prosa_lib::config::SourceFormat;
use prosa_lib::context::{CONTEXT_FILLER, mask_context};
use prosa_lib::mask::{MASK_CHAR, mask_all, substitute};
use prosa_lib::scope::ScopeTable;
use prosa_lib::segment::SegmentKind;

const WRAPPERS: &[&str] = &["div", "section", "blockquote", "span", "em", "li"];
const INLINE: &[&str] = &["a", "em", "strong", "span", "code", "b", "i"];
const SCOPED_INLINE: &[&str] = &["strong", "em", "a", "b", "i"];

proptest! {
    #[test]
    fn masking_is_idempotent(text in "\\PC{0,60}") {
        let once = mask_all(&text, MASK_CHAR);
        prop_assert_eq!(mask_all(&once, MASK_CHAR), once.clone());
        if !once.is_empty() {
            prop_assert_eq!(substitute(&once, &once, MASK_CHAR), Some(once.clone()));
        }
    }

    #[test]
    fn context_masking_preserves_length(
        words in prop::collection::vec("[a-z]{1,8}", 1..12),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 0..4),
    ) {
        let parent = words.join(" ");
        let children: Vec<&str> = picks.iter().map(|i| words[i.index(words.len())].as_str()).collect();
        let masked = mask_context(&parent, &children);
        prop_assert_eq!(masked.chars().count(), parent.chars().count());
    }

    #[test]
    fn inline_span_is_masked_in_its_context(
        before in "[a-z]{1,8}",
        inner in "[a-z]{1,8}",
        after in "[a-z]{1,8}",
        tag in prop::sample::select(SCOPED_INLINE),
    ) {
        // The inline word also occurs earlier in the paragraph
        let html = format!("<p>{inner} {before} <{tag}>{inner}</{tag}> {after}</p>");
        let document = segment(&html, SourceFormat::Html, &ScopeTable::default());

        let block = document.iter().find(|s| s.kind == SegmentKind::Block).unwrap();
        let child = document.iter().find(|s| s.kind == SegmentKind::Inline).unwrap();
        prop_assert_eq!(&child.text, &inner);
        prop_assert_eq!(&block.text, &format!("{inner} {before} {inner} {after}"));

        let context = child.context.as_deref().unwrap();
        let start = inner.len() + 1 + before.len() + 1;
        let expected = format!(
            "{inner} {before} {} {after}",
            CONTEXT_FILLER.to_string().repeat(inner.len())
        );
        prop_assert_eq!(&context[..start], &block.text[..start]);
        prop_assert_eq!(context, expected.as_str());
    }

    #[test]
    fn script_content_never_leaks(
        depth in 0usize..6,
        wrappers in prop::collection::vec(prop::sample::select(WRAPPERS), 6),
        payload in "[a-z ]{0,20}",
    ) {
        let mut html = String::new();
        for tag in wrappers.iter().take(depth) {
            html.push_str(&format!("<{tag}>"));
        }
        html.push_str(&format!("<p>before</p><script>zzsecret {payload}</script><p>after</p>"));
        for tag in wrappers.iter().take(depth).rev() {
            html.push_str(&format!("</{tag}>"));
        }

        let document = segment(&html, SourceFormat::Html, &ScopeTable::default());
        for s in document.iter() {
            prop_assert!(!s.text.contains("zzsecret"));
            prop_assert!(s.context.as_deref().is_none_or(|c| !c.contains("zzsecret")));
        }
        prop_assert!(!document.summary.contains("zzsecret"));
    }

    #[test]
    fn table_cell_wins_over_inline_descendants(
        inline in prop::collection::vec(prop::sample::select(INLINE), 0..5),
    ) {
        let table = ScopeTable::default();
        let mut history: Vec<String> = ["table", "tbody", "tr", "td"].iter().map(|t| t.to_string()).collect();
        history.extend(inline.iter().map(|t| t.to_string()));
        prop_assert_eq!(table.resolve(&history), "text.table.cell");
    }
}
