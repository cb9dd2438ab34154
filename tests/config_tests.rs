use form_autofill::cli::config::{AppConfig, load_config};
use form_autofill::fill::runner::{DEFAULT_BATCH_SIZE, DEFAULT_CONTEXT_LIMIT};

#[test]
fn missing_config_file_yields_defaults() {
    let config = load_config(Some("definitely/not/here.yaml"));

    assert_eq!(config.gateway.endpoint, "http://localhost:11434/v1/chat/completions");
    assert_eq!(config.gateway.model, "qwen2.5:1.5b");
    assert_eq!(config.gateway.api_key_env, "FORM_AUTOFILL_API_KEY");
    assert_eq!(config.fill.batch_size, DEFAULT_BATCH_SIZE);
    assert_eq!(config.fill.context_limit, DEFAULT_CONTEXT_LIMIT);
    assert_eq!(config.fill.backend, "http");
    assert!(config.defaults.is_empty());
}

#[test]
fn partial_yaml_fills_unset_sections_with_defaults() {
    let yaml = r#"
gateway:
  endpoint: "https://api.example.com/v1/chat/completions"
  model: "bigmodel-2"
defaults:
  source: ["referral"]
  country: ["United States"]
"#;
    let config: AppConfig = serde_yaml::from_str(yaml).unwrap();

    assert_eq!(config.gateway.endpoint, "https://api.example.com/v1/chat/completions");
    assert_eq!(config.gateway.model, "bigmodel-2");
    // Unset keys inside a present section still default.
    assert_eq!(config.gateway.max_tokens, 1024);
    // Whole missing section defaults.
    assert_eq!(config.fill.batch_size, DEFAULT_BATCH_SIZE);

    assert_eq!(config.defaults["source"], vec!["referral"]);
    assert_eq!(config.defaults["country"], vec!["United States"]);
}

#[test]
fn malformed_yaml_degrades_to_defaults() {
    let tmp = std::env::temp_dir().join("form-autofill-bad-config.yaml");
    std::fs::write(&tmp, ":( this is not yaml: [unclosed").unwrap();

    let config = load_config(tmp.to_str());
    assert_eq!(config.fill.batch_size, DEFAULT_BATCH_SIZE);

    let _ = std::fs::remove_file(&tmp);
}
