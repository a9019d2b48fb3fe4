//! Unit tests for `AppError` display format.

use survey_bot::AppError;

#[test]
fn each_variant_is_prefixed_with_its_kind() {
    let cases = [
        (AppError::Config("x".into()), "config: x"),
        (AppError::Slack("x".into()), "slack: x"),
        (AppError::Storage("x".into()), "storage: x"),
        (AppError::Payload("x".into()), "payload: x"),
        (AppError::Io("x".into()), "io: x"),
    ];
    for (err, expected) in cases {
        assert_eq!(err.to_string(), expected);
    }
}

#[test]
fn json_errors_convert_to_payload_errors() {
    let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let err: AppError = json_err.into();
    assert!(matches!(err, AppError::Payload(_)));
}

#[test]
fn toml_errors_convert_to_config_errors() {
    let toml_err = toml::from_str::<toml::Value>("= nope").unwrap_err();
    let err: AppError = toml_err.into();
    assert!(err.to_string().starts_with("config: invalid config"));
}

#[test]
fn app_error_implements_std_error() {
    let err: Box<dyn std::error::Error> = Box::new(AppError::Io("disk full".into()));
    assert_eq!(err.to_string(), "io: disk full");
}
