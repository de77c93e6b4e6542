use std::env;
use std::sync::{Mutex, OnceLock};

use serde_json::Value;
use warrantly_cli::commands::{ask, config, doctor};

#[test]
fn ask_answers_a_lookup_miss_offline() {
    with_env(&[("WARRANTLY_FAQ_ENABLED", "false")], || {
        let result =
            ask::run("warranty for customer CUST1001 order ORD00001 product QuantumBook Pro 15");
        assert_eq!(result.exit_code, 0, "expected successful ask turn");
        assert_eq!(result.output, "Order or Customer not found.");
    });
}

#[test]
fn ask_returns_the_serial_placeholder() {
    with_env(&[("WARRANTLY_FAQ_ENABLED", "false")], || {
        let result = ask::run("please check SN49812J");
        assert_eq!(result.exit_code, 0, "expected successful ask turn");
        assert_eq!(result.output, "Serial number lookup is not yet implemented.");
    });
}

#[test]
fn ask_without_fallback_returns_lookup_guidance() {
    with_env(&[("WARRANTLY_FAQ_ENABLED", "false")], || {
        let result = ask::run("what does the warranty cover?");
        assert_eq!(result.exit_code, 0, "expected successful ask turn");
        assert!(
            result.output.contains("serial number"),
            "guidance should explain how to phrase a lookup"
        );
        assert!(result.output.contains("customer id"));
    });
}

#[test]
fn ask_fails_fast_on_invalid_config() {
    with_env(&[("WARRANTLY_LOGGING_LEVEL", "verbose")], || {
        let result = ask::run("anything");
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "ask");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn doctor_passes_with_default_configuration() {
    with_env(&[], || {
        let output = doctor::run(true);
        let payload = parse_payload(&output);

        assert_eq!(payload["overall_status"], "pass");
        let checks = payload["checks"].as_array().expect("checks should be an array");
        let names: Vec<&str> =
            checks.iter().filter_map(|check| check["name"].as_str()).collect();
        assert_eq!(names, vec!["config_validation", "dataset_load", "faq_index", "llm_readiness"]);
    });
}

#[test]
fn doctor_skips_llm_when_nothing_needs_it() {
    with_env(&[("WARRANTLY_FAQ_ENABLED", "false")], || {
        let output = doctor::run(true);
        let payload = parse_payload(&output);

        let llm_check = payload["checks"]
            .as_array()
            .and_then(|checks| {
                checks.iter().find(|check| check["name"] == "llm_readiness").cloned()
            })
            .expect("llm readiness check present");
        assert_eq!(llm_check["status"], "skipped");
    });
}

#[test]
fn doctor_human_output_marks_passing_checks() {
    with_env(&[], || {
        let output = doctor::run(false);
        assert!(output.starts_with("doctor: all readiness checks passed"));
        assert!(output.contains("- [ok] config_validation"));
    });
}

#[test]
fn doctor_reports_config_failure_and_skips_the_rest() {
    with_env(&[("WARRANTLY_LLM_TIMEOUT_SECS", "0")], || {
        let output = doctor::run(true);
        let payload = parse_payload(&output);

        assert_eq!(payload["overall_status"], "fail");
        let checks = payload["checks"].as_array().expect("checks should be an array");
        assert_eq!(checks[0]["name"], "config_validation");
        assert_eq!(checks[0]["status"], "fail");
        assert!(checks[1..].iter().all(|check| check["status"] == "skipped"));
    });
}

#[test]
fn config_command_attributes_sources() {
    with_env(&[("WARRANTLY_LLM_MODEL", "llama3.2")], || {
        let output = config::run();

        assert!(output.starts_with("effective config"));
        assert!(output.contains("- llm.model = llama3.2 (source: env (WARRANTLY_LLM_MODEL))"));
        assert!(output.contains("- extractor.strategy = Pattern (source: default)"));
        assert!(output.contains("- llm.api_key = <unset> (source: default)"));
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "WARRANTLY_DATA_DIR",
        "WARRANTLY_EXTRACTOR_STRATEGY",
        "WARRANTLY_LLM_PROVIDER",
        "WARRANTLY_LLM_API_KEY",
        "WARRANTLY_LLM_BASE_URL",
        "WARRANTLY_LLM_MODEL",
        "WARRANTLY_LLM_TIMEOUT_SECS",
        "WARRANTLY_LLM_MAX_RETRIES",
        "WARRANTLY_FAQ_ENABLED",
        "WARRANTLY_FAQ_CHUNK_CHARS",
        "WARRANTLY_FAQ_OVERLAP_CHARS",
        "WARRANTLY_FAQ_TOP_K",
        "WARRANTLY_LOGGING_LEVEL",
        "WARRANTLY_LOGGING_FORMAT",
        "WARRANTLY_LOG_LEVEL",
        "WARRANTLY_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
