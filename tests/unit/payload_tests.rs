//! Unit tests for interactivity payload decoding and answer flattening.

use survey_bot::models::survey::{
    Answer, INTERESTS_ACTION_ID, OTHER_ACTION_ID, PAST_FAVOURITES_ACTION_ID, TOPICS_ACTION_ID,
};
use survey_bot::slack::payload::{
    InteractionPayload, UNKNOWN_CHANNEL, UNKNOWN_TS, UNKNOWN_USER,
};
use survey_bot::AppError;

const SUBMIT_PAYLOAD: &str = include_str!("../fixtures/submit_payload.json");

#[test]
fn decodes_identity_fields() {
    let payload = InteractionPayload::from_json(SUBMIT_PAYLOAD).expect("payload decodes");

    assert_eq!(payload.user.id, "U05GCUP9PQ9");
    assert_eq!(payload.user.username, "rick");
    assert_eq!(payload.channel.id, "D07QWERTY12");
    assert_eq!(payload.message.ts, "1736441234.000100");
    assert_eq!(payload.actions.len(), 1);
}

#[test]
fn flattens_known_field_values() {
    let payload = InteractionPayload::from_json(SUBMIT_PAYLOAD).expect("payload decodes");
    let responses = payload.responses();

    assert_eq!(responses.len(), 4);
    assert_eq!(
        responses.get(INTERESTS_ACTION_ID),
        Some(&Answer::Selected(vec![
            "Participating in a hackathon".to_owned(),
            "Being on-call as a backup speaker in case someone drops out".to_owned(),
        ]))
    );
    assert_eq!(
        responses.get(TOPICS_ACTION_ID),
        Some(&Answer::Text(Some("Rust in production\nObservability".to_owned())))
    );
    assert_eq!(
        responses.get(PAST_FAVOURITES_ACTION_ID),
        Some(&Answer::Text(None))
    );
    assert_eq!(responses.text(OTHER_ACTION_ID), Some("More pizza"));
}

#[test]
fn flattened_answers_serialize_as_plain_json() {
    let payload = InteractionPayload::from_json(SUBMIT_PAYLOAD).expect("payload decodes");
    let json = serde_json::to_value(payload.responses()).expect("serialize");

    assert_eq!(json["2024"], serde_json::Value::Null);
    assert_eq!(json["other"], "More pizza");
    assert_eq!(json["checkboxes-action"][0], "Participating in a hackathon");
}

#[test]
fn submit_action_is_detected() {
    let payload = InteractionPayload::from_json(SUBMIT_PAYLOAD).expect("payload decodes");
    assert!(payload.is_submission());
    assert_eq!(payload.action_ids().collect::<Vec<_>>(), vec!["submit_survey"]);
}

#[test]
fn checkbox_click_is_not_a_submission() {
    let raw = r#"{
        "user": {"id": "U1", "username": "ana"},
        "actions": [{"action_id": "checkboxes-action", "type": "checkboxes"}]
    }"#;
    let payload = InteractionPayload::from_json(raw).expect("payload decodes");
    assert!(!payload.is_submission());
}

#[test]
fn missing_keys_fall_back_to_placeholders() {
    let payload = InteractionPayload::from_json("{}").expect("empty object decodes");

    assert_eq!(payload.user.id, UNKNOWN_USER);
    assert_eq!(payload.user.username, UNKNOWN_USER);
    assert_eq!(payload.channel.id, UNKNOWN_CHANNEL);
    assert_eq!(payload.message.ts, UNKNOWN_TS);
    assert!(payload.responses().is_empty());
    assert!(!payload.is_submission());
    assert!(payload.message_location().is_none());
}

#[test]
fn message_location_present_when_known() {
    let payload = InteractionPayload::from_json(SUBMIT_PAYLOAD).expect("payload decodes");
    assert_eq!(
        payload.message_location(),
        Some(("D07QWERTY12", "1736441234.000100"))
    );
}

#[test]
fn unsupported_element_types_are_ignored() {
    let raw = r#"{
        "state": {"values": {"b1": {
            "pick": {"type": "static_select", "selected_option": {"value": "a"}},
            "note": {"type": "plain_text_input", "value": "hi"}
        }}}
    }"#;
    let responses = InteractionPayload::from_json(raw)
        .expect("payload decodes")
        .responses();

    assert_eq!(responses.len(), 1);
    assert_eq!(responses.text("note"), Some("hi"));
    assert!(responses.get("pick").is_none());
}

#[test]
fn checkboxes_without_selection_yield_empty_list() {
    let raw = r#"{"state": {"values": {"b": {"checkboxes-action": {"type": "checkboxes"}}}}}"#;
    let responses = InteractionPayload::from_json(raw)
        .expect("payload decodes")
        .responses();
    assert_eq!(
        responses.get(INTERESTS_ACTION_ID),
        Some(&Answer::Selected(Vec::new()))
    );
}

#[test]
fn invalid_json_is_payload_error() {
    let result = InteractionPayload::from_json("payload=not-json");
    assert!(matches!(result, Err(AppError::Payload(_))));
}
