use crate::detector::{
    ChangeDetector, DetectorOptions, DiffResult, describe_length_delta, detect_text_changes,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_texts_report_nothing() {
        for text in [
            "",
            " ",
            "Pricing",
            "Our plan costs $10 per month with basic support",
            "  Multi\nline\n\tcontent   with    gaps ",
        ] {
            assert_eq!(detect_text_changes(text, text), DiffResult::unchanged());
        }
    }

    #[test]
    fn test_case_and_whitespace_only_differences_are_unchanged() {
        let result = detect_text_changes("Hello   World\n", "  hello world");
        assert_eq!(result, DiffResult::unchanged());
    }

    #[test]
    fn test_empty_vs_empty() {
        let result = detect_text_changes("", "");
        assert!(!result.has_changes);
        assert!(result.changes.is_empty());
        assert_eq!(result.change_percentage, 0.0);
    }

    #[test]
    fn test_empty_vs_content() {
        let result = detect_text_changes("", "substantial content here");
        assert!(result.has_changes);
        assert_eq!(result.change_percentage, 100.0);
        assert_eq!(
            result.changes,
            vec![
                "Added 3 new terms: substantial, content, here",
                "Content expanded by 100%",
            ]
        );

        let result = detect_text_changes("substantial content here", "");
        assert!(result.has_changes);
        assert_eq!(result.change_percentage, 100.0);
        assert_eq!(
            result.changes,
            vec![
                "Removed 3 terms: substantial, content, here",
                "Content reduced by 100%",
            ]
        );
    }

    #[test]
    fn test_magnitude_symmetric_descriptions_swap() {
        let a = "pricing starts at forty dollars monthly";
        let b = "pricing starts at fifty dollars yearly";

        let forward = detect_text_changes(a, b);
        let backward = detect_text_changes(b, a);

        assert_eq!(forward.change_percentage, backward.change_percentage);
        assert_eq!(forward.change_percentage, 57.1);
        assert_eq!(
            forward.changes,
            vec![
                "Added 2 new terms: fifty, yearly",
                "Removed 2 terms: forty, monthly",
            ]
        );
        assert_eq!(
            backward.changes,
            vec![
                "Added 2 new terms: forty, monthly",
                "Removed 2 terms: fifty, yearly",
            ]
        );
    }

    #[test]
    fn test_pricing_scenario() {
        let result = detect_text_changes(
            "Our plan costs $10 per month with basic support",
            "Our plan costs $25 per month with priority support and analytics",
        );

        assert!(result.has_changes);
        assert_eq!(result.change_percentage, 42.9);
        assert_eq!(
            result.changes,
            vec![
                "Added 2 new terms: priority, analytics",
                "Removed 1 terms: basic",
                "Content expanded by 27%",
            ]
        );
    }

    #[test]
    fn test_descriptions_in_priority_order_and_term_list_capped() {
        let old_text = "apples bananas cherries dates elderberries figs";
        let new_text = "kiwis lemons mangoes nectarines oranges papayas quinces raspberries";

        let result = detect_text_changes(old_text, new_text);
        assert!(result.has_changes);
        assert_eq!(result.change_percentage, 100.0);
        assert_eq!(
            result.changes,
            vec![
                "Added 8 new terms: kiwis, lemons, mangoes, nectarines, oranges",
                "Removed 6 terms: apples, bananas, cherries, dates, elderberries",
                "Content expanded by 30%",
            ]
        );
    }

    #[test]
    fn test_change_list_never_exceeds_cap() {
        let old_text = "apples bananas cherries dates elderberries figs";
        let new_text = "kiwis lemons mangoes nectarines oranges papayas quinces raspberries";

        let detector = ChangeDetector::with_options(DetectorOptions {
            max_changes: 2,
            ..DetectorOptions::default()
        });
        let result = detector.detect(old_text, new_text);

        // Length entry is the lowest priority and is dropped first
        assert_eq!(result.changes.len(), 2);
        assert!(result.changes[0].starts_with("Added 8 new terms"));
        assert!(result.changes[1].starts_with("Removed 6 terms"));
        assert!(result.has_changes);
    }

    #[test]
    fn test_stop_word_only_differences() {
        let old_text = "pricing plans include unlimited seats and dedicated onboarding for every \
            growing customer team";
        let swapped = "pricing plans include unlimited seats and dedicated onboarding to every \
            growing customer team";
        let prefixed = "the pricing plans include unlimited seats and dedicated onboarding for \
            every growing customer team";

        for new_text in [swapped, prefixed] {
            let result = detect_text_changes(old_text, new_text);
            assert!(!result.has_changes, "unexpected change for {:?}", new_text);
            assert!(result.changes.is_empty());
            assert_eq!(result.change_percentage, 0.0);
        }
    }

    #[test]
    fn test_length_delta_of_exactly_ten_percent_is_ignored() {
        // 27 vs 30 characters with the same meaningful words
        let short = "pricing plans for the teams";
        let long = "so pricing plans for the teams";

        assert_eq!(detect_text_changes(short, long), DiffResult {
            has_changes: false,
            changes: Vec::new(),
            change_percentage: 0.0,
        });
        assert!(!detect_text_changes(long, short).has_changes);

        assert_eq!(describe_length_delta(&"x".repeat(100), &"x".repeat(90)), None);
        assert_eq!(describe_length_delta(&"x".repeat(90), &"x".repeat(100)), None);
    }

    #[test]
    fn test_length_delta_just_over_ten_percent_is_reported() {
        // 27 vs 31 characters
        let result = detect_text_changes(
            "pricing plans for the teams",
            "now pricing plans for the teams",
        );
        assert_eq!(result.change_percentage, 0.0);
        assert_eq!(result.changes, vec!["Content expanded by 13%"]);
        assert!(result.has_changes);

        assert_eq!(
            describe_length_delta(&"x".repeat(100), &"x".repeat(89)).as_deref(),
            Some("Content reduced by 11%")
        );
        assert_eq!(
            describe_length_delta(&"x".repeat(89), &"x".repeat(100)).as_deref(),
            Some("Content expanded by 11%")
        );
    }

    #[test]
    fn test_repeated_words_caught_by_length_only() {
        let result = detect_text_changes("launch launch launch", "launch launch");
        assert_eq!(result.change_percentage, 0.0);
        assert_eq!(result.changes, vec!["Content reduced by 35%"]);
        assert!(result.has_changes);
    }

    #[test]
    fn test_max_tokens_limits_comparison() {
        let old_text = "alpha bravo charlie";
        let new_text = "alpha bravo chapter";

        let default_result = detect_text_changes(old_text, new_text);
        assert_eq!(
            default_result.changes,
            vec!["Added 1 new terms: chapter", "Removed 1 terms: charlie"]
        );

        let detector = ChangeDetector::with_options(DetectorOptions {
            max_tokens: 2,
            ..DetectorOptions::default()
        });
        let result = detector.detect(old_text, new_text);
        assert_eq!(result.change_percentage, 0.0);
        assert!(result.changes.is_empty());
        assert!(!result.has_changes);
    }

    #[test]
    fn test_custom_stop_words() {
        let detector = ChangeDetector::with_options(DetectorOptions {
            stop_words: ["pricing", "plans"].iter().map(|w| w.to_string()).collect(),
            ..DetectorOptions::default()
        });

        assert_eq!(
            detector.meaningful_words("the pricing plans changed"),
            vec!["changed"]
        );
        assert_eq!(detector.similarity("pricing plans", "plans pricing"), 100.0);
    }

    #[test]
    fn test_custom_stop_words_match_any_case() {
        let detector = ChangeDetector::with_options(DetectorOptions {
            stop_words: ["Acme"].iter().map(|w| w.to_string()).collect(),
            ..DetectorOptions::default()
        });

        assert!(detector.options().stop_words.contains("acme"));
        assert_eq!(
            detector.meaningful_words("ACME launches Acme analytics"),
            vec!["launches", "analytics"]
        );
    }

    #[test]
    fn test_result_serializes_in_camel_case() {
        let value = serde_json::to_value(detect_text_changes("", "substantial content here"))
            .unwrap();
        assert_eq!(value["hasChanges"], true);
        assert_eq!(value["changePercentage"], 100.0);
        assert_eq!(value["changes"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: DetectorOptions = serde_json::from_str(r#"{"maxTokens": 10}"#).unwrap();
        assert_eq!(options.max_tokens, 10);
        assert_eq!(options.max_changes, 5);
        assert_eq!(options.stop_words, DetectorOptions::default().stop_words);
    }
}
