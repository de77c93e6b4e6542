use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use warrantly_agent::extract::{Extractor, PatternExtractor, ToolCallExtractor};
use warrantly_agent::faq::{FaqAnswerer, FaqIndex};
use warrantly_agent::handlers::Handlers;
use warrantly_agent::llm::{LlmClient, LlmError, OpenAiChatClient};
use warrantly_agent::runner::TurnRunner;
use warrantly_core::capabilities::{AnswerFallback, WarrantyLookup};
use warrantly_core::config::{AppConfig, ConfigError, ExtractorStrategy, LoadOptions};
use warrantly_store::dataset::{Dataset, DatasetError};
use warrantly_store::lookup::FixtureWarrantyLookup;

/// A fully wired agent for one process: configuration plus the turn runner
/// with its extractor, lookup, and optional FAQ fallback.
pub struct Session {
    pub config: AppConfig,
    pub runner: TurnRunner,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error("llm client construction failed: {0}")]
    Llm(#[from] LlmError),
}

pub fn init_logging(config: &AppConfig) {
    use tracing::Level;
    use warrantly_core::config::LogFormat::*;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    // Repeated initialization (tests, repl after ask) is harmless.
    let _ = match config.logging.format {
        Compact => builder.compact().try_init(),
        Pretty => builder.pretty().try_init(),
        Json => builder.json().try_init(),
    };
}

pub fn build_session(options: LoadOptions) -> Result<Session, BootstrapError> {
    let config = AppConfig::load(options)?;
    build_session_with_config(config)
}

pub fn build_session_with_config(config: AppConfig) -> Result<Session, BootstrapError> {
    let dataset = Arc::new(load_dataset(&config)?);
    info!(
        event_name = "system.bootstrap.dataset_loaded",
        customers = dataset.customers.len(),
        products = dataset.products.len(),
        orders = dataset.orders.len(),
        "dataset loaded"
    );

    let lookup: Arc<dyn WarrantyLookup> = Arc::new(FixtureWarrantyLookup::new(dataset.clone()));

    let llm: Option<Arc<dyn LlmClient>> = if config.needs_llm() {
        Some(Arc::new(OpenAiChatClient::from_config(&config.llm)?))
    } else {
        None
    };

    let extractor: Box<dyn Extractor> = match (config.extractor.strategy, &llm) {
        (ExtractorStrategy::Llm, Some(llm)) => Box::new(ToolCallExtractor::new(llm.clone())),
        _ => Box::new(PatternExtractor::new()),
    };

    let fallback: Option<Arc<dyn AnswerFallback>> = match (&llm, config.faq.enabled) {
        (Some(llm), true) => {
            let index = Arc::new(FaqIndex::build(
                &dataset.faq_document,
                config.faq.chunk_chars,
                config.faq.overlap_chars,
                config.faq.top_k,
            ));
            info!(
                event_name = "system.bootstrap.faq_index_built",
                chunks = index.chunk_count(),
                "faq index built"
            );
            Some(Arc::new(FaqAnswerer::new(index, llm.clone())))
        }
        _ => None,
    };

    let runner = TurnRunner::new(extractor, Handlers::new(lookup, fallback));
    Ok(Session { config, runner })
}

fn load_dataset(config: &AppConfig) -> Result<Dataset, DatasetError> {
    let dir = &config.data.dir;
    if dir.is_dir() {
        return Dataset::load_dir(dir);
    }

    info!(
        event_name = "system.bootstrap.embedded_dataset",
        dir = %dir.display(),
        "fixtures directory not found; using embedded demo dataset"
    );
    Dataset::builtin()
}
