use std::time::Duration;

use form_autofill::gateway::gateway::ModelGateway;
use form_autofill::gateway::heuristic::{
    HeuristicGateway, extract_email, extract_name, extract_phone, extract_url,
};
use form_autofill::gateway::parser::parse_suggestions;
use form_autofill::gateway::prompt::build_fill_prompt;
use form_autofill::page::collector::collect;
use form_autofill::page::descriptor::describe;

use crate::common::utils::load_fixture;

mod common;

const RESUME: &str = "\
Dr. Ada Lovelace
ada.lovelace@example.org | +1 (555) 010-2030
https://example.org/ada
Software engineer, available from 2024.";

// =========================================================================
// Context probes
// =========================================================================

#[test]
fn probes_pull_contact_details_out_of_a_resume_header() {
    assert_eq!(extract_email(RESUME).as_deref(), Some("ada.lovelace@example.org"));
    assert_eq!(extract_name(RESUME), Some(("Ada".to_string(), "Lovelace".to_string())));
    assert_eq!(extract_url(RESUME).as_deref(), Some("https://example.org/ada"));

    let phone = extract_phone(RESUME).unwrap();
    assert_eq!(phone.chars().filter(char::is_ascii_digit).count(), 11);
    assert!(phone.starts_with("+1"));
}

#[test]
fn probes_return_none_when_nothing_matches() {
    let context = "no personal details in here at all";
    assert_eq!(extract_email(context), None);
    assert_eq!(extract_name(context), None);
    assert_eq!(extract_phone(context), None);
    assert_eq!(extract_url(context), None);
}

// =========================================================================
// The backend end-to-end: prompt in, suggestion JSON out
// =========================================================================

#[test]
fn answers_a_real_prompt_with_resolvable_suggestions() {
    let page = load_fixture("job_application.json");
    let fields = collect(&page);
    let descriptors: Vec<_> = fields.iter().enumerate().map(|(i, f)| describe(f, i)).collect();
    let sendable: Vec<_> = descriptors.iter().collect();

    let prompt = build_fill_prompt(&sendable, RESUME, 4000).unwrap();

    let gateway = HeuristicGateway;
    let session = gateway.create_session(&Default::default()).unwrap();
    let reply = gateway.prompt(&session, &prompt, Duration::from_secs(1)).unwrap();

    let suggestions = parse_suggestions(&reply);
    assert!(!suggestions.is_empty());

    // Every suggestion echoes a key that exists in the batch.
    for suggestion in &suggestions {
        let key = suggestion.key.as_deref().unwrap();
        assert!(descriptors.iter().any(|d| d.key == key), "unknown key {}", key);
        assert!(suggestion.value.is_some());
    }

    // The email field got the email from the resume.
    let email_key = &descriptors.iter().find(|d| d.name == "email").unwrap().key;
    let email = suggestions.iter().find(|s| s.key.as_deref() == Some(email_key)).unwrap();
    assert_eq!(email.value.as_deref(), Some("ada.lovelace@example.org"));
}
