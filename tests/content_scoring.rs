//! Content scorer integration tests

use std::io::Write;

use listing_moderation::moderation::{ContentScorer, ListingText, TermCategory, TermList};

/// Clean phrases that must never trip the default list
const CLEAN_TEXTS: &[&str] = &[
    "Spacious three-bedroom home with a large garden",
    "Walking distance to schools, parks and the train station",
    "Pet friendly. Parking included. Available from March.",
    "Recently renovated kitchen; families and students welcome",
    "",
];

#[test]
fn test_clean_texts_score_zero() {
    let scorer = ContentScorer::default();
    for text in CLEAN_TEXTS {
        for verdict in [
            scorer.score_title(Some(text)),
            scorer.score_description(Some(text)),
        ] {
            assert_eq!(verdict.moderation_score, 0, "{:?}", text);
            assert!(!verdict.flagged);
            assert!(verdict.is_approved);
        }
    }
}

#[test]
fn test_title_and_description_thresholds_differ() {
    let scorer = ContentScorer::default();
    let text = "western union payments";

    let title = scorer.score_title(Some(text));
    let description = scorer.score_description(Some(text));

    // One match: title rejects at 35, description still approves at 25
    assert_eq!(title.moderation_score, 35);
    assert!(title.flagged && !title.is_approved);
    assert_eq!(description.moderation_score, 25);
    assert!(description.flagged && description.is_approved);
}

#[test]
fn test_combined_verdict_matches_fields() {
    let scorer = ContentScorer::default();
    let cases = [
        ("Quiet flat", "Nice views"),
        ("Quiet flat", "Illegal sublet, cash under the table"),
        ("No kids allowed", "Nice views"),
        ("Drug lab conversion", "Grow house potential, guaranteed return"),
    ];

    for (title, description) in cases {
        let combined = scorer.score_listing(&ListingText::new(title, description));
        let t = scorer.score_title(Some(title));
        let d = scorer.score_description(Some(description));

        assert_eq!(combined.is_approved, t.is_approved && d.is_approved);
        assert_eq!(combined.flagged, t.flagged || d.flagged);
        assert_eq!(
            combined.moderation_score,
            t.moderation_score.max(d.moderation_score)
        );
        let union: std::collections::BTreeSet<String> = t
            .prohibited_terms
            .union(&d.prohibited_terms)
            .cloned()
            .collect();
        assert_eq!(combined.prohibited_terms, union);
    }
}

#[test]
fn test_substituted_term_list_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"{{"discriminatory": ["No Pets Owners"], "misleading": ["act now"]}}"#
    )
    .unwrap();

    let terms = TermList::from_json_file(file.path()).unwrap();
    assert_eq!(terms.terms_in(TermCategory::Illegal).count(), 0);

    let scorer = ContentScorer::new(terms);
    let verdict = scorer.score_description(Some("ACT NOW - no pets owners"));
    assert_eq!(verdict.moderation_score, 50);
    assert!(!verdict.is_approved);

    let verdict = scorer.score_description(Some("grow house"));
    assert_eq!(verdict.moderation_score, 0);
}
