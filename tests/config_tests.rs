use post_wizard::config::{BotConfig, FlowSource};
use post_wizard::errors::{ConfigError, FlowError};
use post_wizard::flow::{FieldKind, FlowDefinition};
use post_wizard::validation::Validator;
use std::collections::HashMap;
use std::io::Write;
use teloxide::types::{ChatId, Recipient, UserId};
use tempfile::NamedTempFile;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| vars.get(key).cloned()
}

const BASE: &[(&str, &str)] = &[
    ("TELEGRAM_BOT_TOKEN", "123:abc"),
    ("TARGET_CHANNEL", "-1002625930074"),
];

#[test]
fn test_minimal_configuration() {
    let config = BotConfig::from_lookup(lookup(BASE)).expect("config");

    assert_eq!(config.token, "123:abc");
    assert_eq!(
        config.target_channel,
        Recipient::Id(ChatId(-1002625930074))
    );
    assert!(config.access.is_open());
    assert_eq!(config.audit_chat, None);
    assert_eq!(config.flow, FlowSource::Builtin("signal".to_string()));
}

#[test]
fn test_missing_token_is_fatal() {
    let result = BotConfig::from_lookup(lookup(&[("TARGET_CHANNEL", "@channel")]));
    assert_eq!(result.unwrap_err(), ConfigError::Missing("TELEGRAM_BOT_TOKEN"));

    let result = BotConfig::from_lookup(lookup(&[
        ("TELEGRAM_BOT_TOKEN", "   "),
        ("TARGET_CHANNEL", "@channel"),
    ]));
    assert_eq!(result.unwrap_err(), ConfigError::Missing("TELEGRAM_BOT_TOKEN"));
}

#[test]
fn test_channel_username_target() {
    let config = BotConfig::from_lookup(lookup(&[
        ("TELEGRAM_BOT_TOKEN", "123:abc"),
        ("TARGET_CHANNEL", "@RiyadVai_2024"),
    ]))
    .expect("config");

    assert_eq!(
        config.target_channel,
        Recipient::ChannelUsername("@RiyadVai_2024".to_string())
    );
}

#[test]
fn test_invalid_target_channel() {
    let result = BotConfig::from_lookup(lookup(&[
        ("TELEGRAM_BOT_TOKEN", "123:abc"),
        ("TARGET_CHANNEL", "my channel"),
    ]));
    assert!(matches!(
        result,
        Err(ConfigError::Invalid { key: "TARGET_CHANNEL", .. })
    ));
}

#[test]
fn test_allow_list_and_audit_chat() {
    let mut vars = BASE.to_vec();
    vars.push(("ALLOWED_USER_IDS", "11, 22,,33"));
    vars.push(("AUDIT_CHAT_ID", "-100200"));
    let config = BotConfig::from_lookup(lookup(&vars)).expect("config");

    assert_eq!(config.access.len(), 3);
    assert!(config.access.is_allowed(UserId(22)));
    assert!(!config.access.is_allowed(UserId(44)));
    assert_eq!(config.audit_chat, Some(ChatId(-100200)));
}

#[test]
fn test_invalid_user_id() {
    let mut vars = BASE.to_vec();
    vars.push(("ALLOWED_USER_IDS", "11,abc"));
    let result = BotConfig::from_lookup(lookup(&vars));
    assert_eq!(
        result.unwrap_err(),
        ConfigError::Invalid {
            key: "ALLOWED_USER_IDS",
            value: "abc".to_string()
        }
    );
}

#[test]
fn test_flow_selection() {
    let mut vars = BASE.to_vec();
    vars.push(("WIZARD_FLOW", "Redaction"));
    let config = BotConfig::from_lookup(lookup(&vars)).expect("config");
    assert_eq!(config.flow, FlowSource::Builtin("redaction".to_string()));

    vars.push(("WIZARD_FLOW_FILE", "/etc/wizard/flow.json"));
    let config = BotConfig::from_lookup(lookup(&vars)).expect("config");
    assert_eq!(
        config.flow,
        FlowSource::File("/etc/wizard/flow.json".into())
    );
}

#[test]
fn test_error_display() {
    let missing = ConfigError::Missing("TELEGRAM_BOT_TOKEN");
    assert_eq!(
        format!("{}", missing),
        "Missing configuration: TELEGRAM_BOT_TOKEN must be set"
    );
}

#[test]
fn test_load_flow_from_file() {
    let json = r#"{
        "name": "score-caption",
        "fields": [
            {"name": "caption", "label": "signal-score-label", "prompt": "signal-score-prompt", "kind": "text", "validator": "score"},
            {"name": "image", "label": "signal-image-label", "prompt": "signal-image-prompt", "kind": "image"}
        ],
        "summary": "redaction-summary",
        "post": "redaction-post",
        "redaction": {"rects": [{"x": 0, "y": 0, "width": 10, "height": 10}]}
    }"#;
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(json.as_bytes()).expect("write flow");

    let flow = FlowDefinition::from_json_file(file.path()).expect("flow");
    assert_eq!(flow.name, "score-caption");
    assert_eq!(flow.field_count(), 2);
    assert_eq!(flow.fields[0].validator, Validator::Score);
    assert_eq!(flow.fields[1].kind, FieldKind::Image);
    assert_eq!(flow.fields[1].validator, Validator::FreeText);
    assert_eq!(flow.redaction.map(|m| m.rects.len()), Some(1));
}

#[test]
fn test_builtin_flow_survives_json_round() {
    let json = serde_json::to_string(&FlowDefinition::signal()).expect("serialize");
    let flow = FlowDefinition::from_json(&json).expect("parse");
    assert_eq!(flow, FlowDefinition::signal());
}

#[test]
fn test_rejected_flow_files() {
    assert!(matches!(
        FlowDefinition::from_json(r#"{"name": "x", "fields": [], "summary": "s", "post": "p"}"#),
        Err(FlowError::Empty)
    ));

    let duplicate = r#"{"name": "x", "summary": "s", "post": "p", "fields": [
        {"name": "a", "label": "l", "prompt": "p", "kind": "text"},
        {"name": "a", "label": "l", "prompt": "p", "kind": "text"}
    ]}"#;
    assert!(matches!(
        FlowDefinition::from_json(duplicate),
        Err(FlowError::DuplicateField(name)) if name == "a"
    ));

    let image_validator = r#"{"name": "x", "summary": "s", "post": "p", "fields": [
        {"name": "a", "label": "l", "prompt": "p", "kind": "image", "validator": "url"}
    ]}"#;
    assert!(matches!(
        FlowDefinition::from_json(image_validator),
        Err(FlowError::ImageValidator(_))
    ));

    let unknown_prompt = r#"{"name": "x", "summary": "redaction-summary", "post": "redaction-post", "fields": [
        {"name": "caption", "label": "redaction-caption-label", "prompt": "venue-prompt", "kind": "text"}
    ]}"#;
    assert!(matches!(
        FlowDefinition::from_json(unknown_prompt),
        Err(FlowError::UnresolvedMessage { id, .. }) if id == "venue-prompt"
    ));

    // redaction-summary needs `$caption`, which no field provides
    let unbound_template = r#"{"name": "x", "summary": "redaction-summary", "post": "redaction-post", "fields": [
        {"name": "score", "label": "signal-score-label", "prompt": "signal-score-prompt", "kind": "text", "validator": "score"}
    ]}"#;
    assert!(matches!(
        FlowDefinition::from_json(unbound_template),
        Err(FlowError::UnresolvedMessage { id, .. }) if id == "redaction-summary"
    ));

    assert!(matches!(
        FlowDefinition::from_json("not json"),
        Err(FlowError::Parse(_))
    ));
    assert!(matches!(
        FlowDefinition::from_json_file("/nonexistent/flow.json"),
        Err(FlowError::Io(_))
    ));
}
