use serde::Serialize;

use warrantly_agent::faq::FaqIndex;
use warrantly_agent::llm::OpenAiChatClient;
use warrantly_core::config::{AppConfig, LoadOptions};
use warrantly_store::dataset::Dataset;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });

            let dataset = check_dataset(&config, &mut checks);
            check_faq_index(&config, dataset.as_ref(), &mut checks);
            checks.push(check_llm_readiness(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["dataset_load", "faq_index", "llm_readiness"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_ok = checks.iter().all(|check| check.status != CheckStatus::Fail);
    let overall_status = if all_ok { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_ok {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_dataset(config: &AppConfig, checks: &mut Vec<DoctorCheck>) -> Option<Dataset> {
    let (result, origin) = if config.data.dir.is_dir() {
        (Dataset::load_dir(&config.data.dir), format!("`{}`", config.data.dir.display()))
    } else {
        (Dataset::builtin(), "embedded demo dataset".to_string())
    };

    match result {
        Ok(dataset) => {
            checks.push(DoctorCheck {
                name: "dataset_load",
                status: CheckStatus::Pass,
                details: format!(
                    "{origin}: {} customers, {} products, {} orders",
                    dataset.customers.len(),
                    dataset.products.len(),
                    dataset.orders.len()
                ),
            });
            Some(dataset)
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "dataset_load",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            None
        }
    }
}

fn check_faq_index(config: &AppConfig, dataset: Option<&Dataset>, checks: &mut Vec<DoctorCheck>) {
    if !config.faq.enabled {
        checks.push(DoctorCheck {
            name: "faq_index",
            status: CheckStatus::Skipped,
            details: "faq answering is disabled".to_string(),
        });
        return;
    }

    let Some(dataset) = dataset else {
        checks.push(DoctorCheck {
            name: "faq_index",
            status: CheckStatus::Skipped,
            details: "skipped because the dataset did not load".to_string(),
        });
        return;
    };

    let index = FaqIndex::build(
        &dataset.faq_document,
        config.faq.chunk_chars,
        config.faq.overlap_chars,
        config.faq.top_k,
    );
    let status = if index.chunk_count() > 0 { CheckStatus::Pass } else { CheckStatus::Fail };
    let details = if index.chunk_count() > 0 {
        format!("{} chunks indexed", index.chunk_count())
    } else {
        "faq document produced no chunks".to_string()
    };
    checks.push(DoctorCheck { name: "faq_index", status, details });
}

fn check_llm_readiness(config: &AppConfig) -> DoctorCheck {
    if !config.needs_llm() {
        return DoctorCheck {
            name: "llm_readiness",
            status: CheckStatus::Skipped,
            details: "not required by current configuration".to_string(),
        };
    }

    match OpenAiChatClient::from_config(&config.llm) {
        Ok(_) => DoctorCheck {
            name: "llm_readiness",
            status: CheckStatus::Pass,
            details: format!(
                "client configured for {:?} with model `{}`",
                config.llm.provider, config.llm.model
            ),
        },
        Err(error) => DoctorCheck {
            name: "llm_readiness",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
