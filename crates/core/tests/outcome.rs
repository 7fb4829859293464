//! Terminal page classification.

use pretty_assertions::assert_eq;
use slotwatch_core::outcome::{classify, Marker, Outcome};
use slotwatch_core::WizardConfig;

fn load_fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path, e))
}

#[test]
fn test_expected_sentence_means_no_slots() {
    let html = r#"<p class="message-error">For your selection there are unfortunately no appointments available</p>"#;
    assert_eq!(classify(html, &Marker::default()), Outcome::NoSlots);

    // Line breaks and indentation inside the block do not matter.
    assert_eq!(classify(&load_fixture("no_slots.html"), &Marker::default()), Outcome::NoSlots);
}

#[test]
fn test_different_message_is_escalated_with_text() {
    let html = r#"<p class="message-error">Service temporarily unavailable</p>"#;
    assert_eq!(
        classify(html, &Marker::default()),
        Outcome::PossibleSlots {
            detail: "Service temporarily unavailable".to_string()
        }
    );
    assert_eq!(
        classify(&load_fixture("unavailable.html"), &Marker::default()),
        Outcome::PossibleSlots {
            detail: "Service temporarily unavailable".to_string()
        }
    );
}

#[test]
fn test_absent_marker_means_possible_slots() {
    assert_eq!(
        classify(&load_fixture("slots.html"), &Marker::default()),
        Outcome::PossibleSlots {
            detail: String::new()
        }
    );
}

#[test]
fn test_marker_needs_whole_class_token() {
    let html = r#"<p class="message-error-hint">For your selection there are unfortunately no appointments available</p>"#;
    assert_eq!(
        classify(html, &Marker::default()),
        Outcome::PossibleSlots {
            detail: String::new()
        }
    );

    let html = r#"<div class="box message-error">For your selection there are unfortunately no appointments available</div>"#;
    assert_eq!(classify(html, &Marker::default()), Outcome::NoSlots);
}

#[test]
fn test_near_miss_text_is_not_no_slots() {
    let html = r#"<p class="message-error">For your selection there are unfortunately no appointments available.</p>"#;
    assert_eq!(
        classify(html, &Marker::default()),
        Outcome::PossibleSlots {
            detail: "For your selection there are unfortunately no appointments available.".to_string()
        }
    );
}

#[test]
fn test_custom_marker() {
    let marker = Marker {
        class: "alert".to_string(),
        no_slots_text: "Keine Termine verfügbar".to_string(),
    };
    let html = r#"<span class="alert"> Keine   Termine verfügbar </span>"#;
    assert_eq!(classify(html, &marker), Outcome::NoSlots);
}

#[test]
fn test_inline_markup_inside_marker_sentence() {
    let html = r#"<p class="message-error">For your selection there are unfortunately no <b>appoint</b>ments available</p>"#;
    assert_eq!(classify(html, &Marker::default()), Outcome::NoSlots);

    let html = r#"<p class="message-error">For your <em>selection</em> there are <strong>unfortunately</strong>
        no appointments <span>available</span></p>"#;
    assert_eq!(classify(html, &Marker::default()), Outcome::NoSlots);
}

#[test]
fn test_adjacent_inline_elements_keep_their_separator() {
    let html = r#"<div class="message-error"><b>Service</b> <i>closed</i></div>"#;
    assert_eq!(
        classify(html, &Marker::default()),
        Outcome::PossibleSlots {
            detail: "Service closed".to_string()
        }
    );
}

#[test]
fn test_marker_read_from_wizard_config() {
    let config: WizardConfig = serde_json::from_value(serde_json::json!({
        "marker": { "class": "alert", "no_slots_text": "Keine Termine" }
    }))
    .unwrap();
    assert_eq!(config.marker.class, "alert");
    assert_eq!(config.marker.no_slots_text, "Keine Termine");
    // Unset keys keep their defaults.
    assert_eq!(config.office_field, "Office");

    let html = r#"<p class="alert">Keine  Termine</p>"#;
    assert_eq!(classify(html, &config.marker), Outcome::NoSlots);
    assert_eq!(
        classify(html, &Marker::default()),
        Outcome::PossibleSlots {
            detail: String::new()
        }
    );
}

#[test]
fn test_unknown_config_keys_are_rejected() {
    let flat = serde_json::from_value::<WizardConfig>(serde_json::json!({
        "no_slots_marker_class": "alert"
    }));
    assert!(flat.is_err());

    let marker = serde_json::from_value::<Marker>(serde_json::json!({
        "class": "alert",
        "text": "Keine Termine"
    }));
    assert!(marker.is_err());

    let fetch = serde_json::from_value::<slotwatch_core::fetch::FetchConfig>(serde_json::json!({
        "timeout": 5
    }));
    assert!(fetch.is_err());
}

#[test]
fn test_outcome_detail_and_display() {
    let failure = Outcome::StructuralFailure {
        step: "calendar".to_string(),
        reason: "calendar field not found".to_string(),
        page_title: Some("Appointment Service".to_string()),
    };
    assert_eq!(
        failure.detail(),
        "calendar field not found (step: calendar, page: \"Appointment Service\")"
    );
    assert!(failure.is_failure());
    assert_eq!(failure.kind(), "structural_failure");

    let timeout = Outcome::TransportFailure {
        step: "entry".to_string(),
        reason: "request timed out".to_string(),
    };
    assert_eq!(timeout.to_string(), "request failed: request timed out (step: entry)");

    assert_eq!(Outcome::NoSlots.detail(), "");
    assert!(!Outcome::NoSlots.is_failure());
}

#[test]
fn test_outcome_serializes_tagged() {
    let outcome = Outcome::PossibleSlots {
        detail: "x".to_string(),
    };
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json, serde_json::json!({ "outcome": "possible_slots", "detail": "x" }));

    let json = serde_json::to_value(&Outcome::NoSlots).unwrap();
    assert_eq!(json, serde_json::json!({ "outcome": "no_slots" }));
}
