use studiolens::html_scan::visible_text;
use studiolens::readability::{analyze, count_syllables};

#[test]
fn test_simple_text_is_very_easy() {
    let report = analyze("The cat sat on the mat.");

    assert_eq!(report.sentences, 1);
    assert_eq!(report.words, 6);
    assert_eq!(report.syllables, 6);
    assert_eq!(report.average_words_per_sentence, 6.0);
    assert_eq!(report.average_syllables_per_word, 1.0);
    // 116.1 before clamping
    assert_eq!(report.flesch_reading_ease, 100.0);
    assert_eq!(report.level, "very easy");
}

#[test]
fn test_dense_text_is_very_difficult() {
    let report = analyze(
        "Comprehensive photographic documentation necessitates extraordinary organizational capabilities.",
    );

    assert_eq!(report.sentences, 1);
    assert_eq!(report.words, 7);
    assert_eq!(report.flesch_reading_ease, 0.0);
    assert_eq!(report.level, "very difficult");
}

#[test]
fn test_sentence_counting() {
    let report = analyze("Book a session. We reply fast! Ready to start?");
    assert_eq!(report.sentences, 3);
    assert_eq!(report.words, 9);
    assert_eq!(report.average_words_per_sentence, 3.0);

    // Trailing text without a terminator still counts
    let report = analyze("Book a session. Call us today");
    assert_eq!(report.sentences, 2);

    // Ellipses and repeated marks do not create empty sentences
    let report = analyze("Wait... really?!");
    assert_eq!(report.sentences, 2);
}

#[test]
fn test_empty_text() {
    for text in ["", "   ", "... !!! ???"] {
        let report = analyze(text);
        assert_eq!(report.words, 0);
        assert_eq!(report.sentences, 0);
        assert_eq!(report.flesch_reading_ease, 0.0);
        assert_eq!(report.level, "n/a");
    }
}

#[test]
fn test_score_is_bounded() {
    let texts = [
        "Go.",
        "I am. You are. We go.",
        "Our downtown studio offers portrait sessions with natural light and quick turnaround.",
        "Internationalization considerations notwithstanding, telecommunications infrastructure modernization initiatives.",
    ];

    for text in texts {
        let report = analyze(text);
        assert!(
            (0.0..=100.0).contains(&report.flesch_reading_ease),
            "{} scored {}",
            text,
            report.flesch_reading_ease
        );
    }
}

#[test]
fn test_syllables() {
    assert_eq!(count_syllables("portrait"), 2);
    assert_eq!(count_syllables("session"), 2);
    // silent trailing e
    assert_eq!(count_syllables("sunrise"), 2);
    assert_eq!(count_syllables("Headshots!"), 2);
}

#[test]
fn test_readability_of_html_page() {
    let html = r#"<html><head><style>p { margin: 0 }</style></head>
<body><p>Book a session.</p><script>var x = "ignored text here";</script><p>We reply fast.</p></body></html>"#;

    let report = analyze(&visible_text(html));

    assert_eq!(report.sentences, 2);
    assert_eq!(report.words, 6);
}
