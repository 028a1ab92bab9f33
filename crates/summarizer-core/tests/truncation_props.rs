//! Property tests for summarization input preparation

use proptest::prelude::*;
use summarizer_core::{prepare_input, truncate_chars};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn truncation_is_a_prefix(text in "\\PC{0,400}", max in 0usize..500) {
        let cut = truncate_chars(&text, max);
        prop_assert!(text.starts_with(cut));
        prop_assert_eq!(cut.chars().count(), text.chars().count().min(max));
    }

    #[test]
    fn truncation_offset_is_stable(text in "\\PC{0,400}", max in 0usize..500) {
        prop_assert_eq!(truncate_chars(&text, max).len(), truncate_chars(&text, max).len());
        prop_assert_eq!(prepare_input(&text, max), prepare_input(&text, max));
    }

    #[test]
    fn prepared_input_never_exceeds_limit(text in "\\PC{0,400}", max in 0usize..500) {
        prop_assert!(prepare_input(&text, max).chars().count() <= max);
    }

    #[test]
    fn prepared_input_has_no_stray_controls(text in ".{0,200}") {
        let prepared = prepare_input(&text, 2048);
        prop_assert!(prepared
            .chars()
            .all(|c| !c.is_control() || c == '\n' || c == '\t'));
    }
}

#[test]
fn default_limit_cuts_long_documents_at_2048_chars() {
    let text = "é".repeat(5000);
    assert_eq!(truncate_chars(&text, 2048).chars().count(), 2048);
}
