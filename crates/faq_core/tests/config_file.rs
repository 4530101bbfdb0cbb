use pretty_assertions::assert_eq;
use tempfile::tempdir;

use faq_core::config::AssistantConfig;
use faq_core::error::codes;

#[test]
fn config_file_overrides_selected_sections() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("faq.toml");
    std::fs::write(
        &path,
        r#"
[retrieval]
vector_top_k = 4
lexical_supplement = true

[context]
char_budget = 800

[ollama]
generate_model = "mistral"
"#,
    )
    .unwrap();

    let cfg = AssistantConfig::from_file(&path).expect("load");
    cfg.validate().expect("valid");
    assert_eq!(cfg.retrieval.vector_top_k, 4);
    assert!(cfg.retrieval.lexical_supplement);
    assert_eq!(cfg.context.char_budget, 800);
    assert_eq!(cfg.ollama.generate_model, "mistral");
    assert_eq!(cfg.ollama.embed_model, "nomic-embed-text");
    assert_eq!(cfg.answer.max_words, 200);
}

#[test]
fn missing_config_file_is_a_load_error() {
    let tmp = tempdir().unwrap();
    let err = AssistantConfig::from_file(&tmp.path().join("absent.toml")).unwrap_err();
    assert_eq!(err.code, codes::CONFIG_LOAD_FAILED);
}

#[test]
fn invalid_values_in_file_fail_validation() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("faq.toml");
    std::fs::write(&path, "[context]\nchar_budget = 0\n").unwrap();
    let err = AssistantConfig::load(Some(&path)).unwrap_err();
    assert_eq!(err.code, codes::CONFIG_INVALID);
}
