//! Property-based tests for text normalization

use proptest::prelude::*;
use shared_pdf::normalize_text;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn normalized_text_is_single_spaced(raw in "[a-z \t\r\n]{0,200}") {
        let text = normalize_text(&raw);
        prop_assert!(!text.contains("  "));
        prop_assert!(!text.contains('\n'));
        prop_assert!(!text.contains('\t'));
        prop_assert_eq!(text.trim(), text.as_str());
    }

    #[test]
    fn normalization_is_idempotent(raw in "\\PC{0,200}") {
        let once = normalize_text(&raw);
        prop_assert_eq!(normalize_text(&once), once);
    }

    #[test]
    fn normalization_keeps_every_word(words in prop::collection::vec("[a-z]{1,8}", 0..20)) {
        let raw = words.join(" \n\t ");
        prop_assert_eq!(normalize_text(&raw), words.join(" "));
    }
}
