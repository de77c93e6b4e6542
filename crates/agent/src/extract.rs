use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use warrantly_core::session::ResolvedIntent;

use crate::llm::{LlmClient, LlmError, ToolSpec};

pub const FETCH_ORDER_WARRANTY_TOOL: &str = "FetchOrderWarranty";
pub const FETCH_DETAILS_BY_SN_TOOL: &str = "FetchDetailsBySN";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Extraction strategy contract: raw query in, resolved intent out.
///
/// Ambiguity is never an error. A strategy that cannot satisfy a lookup
/// intent's full slot set falls through to `AnswerFaq`; only collaborator
/// failures (a classifier call that errors out) surface as `ExtractError`.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, query: &str) -> Result<ResolvedIntent, ExtractError>;
}

/// Structural pattern matching over the raw query, no model involved.
///
/// Identifier tokens are matched case-insensitively by prefix (`CUST`,
/// `ORD`, `SN`); the remainder must contain a digit so ordinary words like
/// "customer" or "snow" never match. The product name is the phrase that
/// follows the keyword "product".
#[derive(Clone, Copy, Debug, Default)]
pub struct PatternExtractor;

impl PatternExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Extractor for PatternExtractor {
    async fn extract(&self, query: &str) -> Result<ResolvedIntent, ExtractError> {
        Ok(extract_with_patterns(query))
    }
}

fn extract_with_patterns(query: &str) -> ResolvedIntent {
    let customer_id = find_prefixed_token(query, "cust");
    let order_id = find_prefixed_token(query, "ord");
    let product_name = extract_product_phrase(query);

    // Priority order: full order lookup, then serial lookup, then FAQ.
    // A partial order-lookup match falls through instead of erroring.
    if let (Some(customer_id), Some(order_id), Some(product_name)) =
        (customer_id, order_id, product_name)
    {
        return ResolvedIntent::FetchOrderWarranty { customer_id, order_id, product_name };
    }

    if let Some(serial) = find_prefixed_token(query, "sn") {
        return ResolvedIntent::FetchDetails { product_id: serial };
    }

    ResolvedIntent::AnswerFaq
}

fn tokens(query: &str) -> Vec<&str> {
    query.split(|c: char| !c.is_ascii_alphanumeric()).filter(|t| !t.is_empty()).collect()
}

fn find_prefixed_token(query: &str, prefix: &str) -> Option<String> {
    tokens(query).into_iter().find_map(|token| {
        let lowered = token.to_ascii_lowercase();
        let rest = lowered.strip_prefix(prefix)?;
        let is_identifier = !rest.is_empty() && rest.chars().any(|c| c.is_ascii_digit());
        is_identifier.then(|| token.to_string())
    })
}

const PHRASE_CONNECTIVES: &[&str] = &["name", "named", "called", "is"];
const PHRASE_TERMINATORS: &[&str] = &["and", "with", "for", "from", "in", "on", "please"];

fn extract_product_phrase(query: &str) -> Option<String> {
    let words: Vec<&str> = query.split_whitespace().collect();
    let keyword_index = words.iter().position(|word| normalize_word(word) == "product")?;

    let mut phrase_words: Vec<String> = Vec::new();
    for word in &words[keyword_index + 1..] {
        let normalized = normalize_word(word);
        if phrase_words.is_empty() && PHRASE_CONNECTIVES.contains(&normalized.as_str()) {
            continue;
        }
        if PHRASE_TERMINATORS.contains(&normalized.as_str()) {
            break;
        }

        let trimmed = word.trim_matches(|c: char| !c.is_ascii_alphanumeric());
        if !trimmed.is_empty() {
            phrase_words.push(trimmed.to_string());
        }

        // Sentence punctuation closes the phrase.
        if word.ends_with([',', '.', '?', '!', ';', ':']) {
            break;
        }
    }

    if phrase_words.is_empty() {
        None
    } else {
        Some(phrase_words.join(" "))
    }
}

fn normalize_word(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_ascii_alphanumeric()).to_ascii_lowercase()
}

/// Tool-calling classifier strategy: the model is offered the two extraction
/// schemas and may select at most one. Slots come exclusively from the
/// selected tool's arguments; nothing is re-derived from the query here.
pub struct ToolCallExtractor {
    llm: Arc<dyn LlmClient>,
}

impl ToolCallExtractor {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub fn tool_specs() -> [ToolSpec; 2] {
        [order_warranty_tool(), serial_number_tool()]
    }
}

fn order_warranty_tool() -> ToolSpec {
    ToolSpec {
        name: FETCH_ORDER_WARRANTY_TOOL,
        description: "Gets warranty details using customer ID, order ID, and product name.",
        parameters: json!({
            "type": "object",
            "properties": {
                "customer_id": {
                    "type": "string",
                    "description": "The customer's identifier, like 'CUST1001'"
                },
                "order_id": {
                    "type": "string",
                    "description": "The unique identifier for the order, like 'ORD98765'"
                },
                "product_name": {
                    "type": "string",
                    "description": "The name of the product to check, like 'QuantumBook Pro 15'"
                }
            },
            "required": ["customer_id", "order_id", "product_name"]
        }),
    }
}

fn serial_number_tool() -> ToolSpec {
    ToolSpec {
        name: FETCH_DETAILS_BY_SN_TOOL,
        description: "Gets warranty details using a unique product serial number.",
        parameters: json!({
            "type": "object",
            "properties": {
                "serial_number": {
                    "type": "string",
                    "description": "The product's serial number, which typically starts with 'SN'"
                }
            },
            "required": ["serial_number"]
        }),
    }
}

#[derive(Debug, Deserialize)]
struct OrderWarrantyArgs {
    customer_id: String,
    order_id: String,
    product_name: String,
}

#[derive(Debug, Deserialize)]
struct SerialNumberArgs {
    serial_number: String,
}

#[async_trait]
impl Extractor for ToolCallExtractor {
    async fn extract(&self, query: &str) -> Result<ResolvedIntent, ExtractError> {
        let specs = Self::tool_specs();
        let Some(invocation) = self.llm.select_tool(query, &specs).await? else {
            tracing::debug!(
                event_name = "extract.no_tool_selected",
                "classifier selected no tool; answering as FAQ"
            );
            return Ok(ResolvedIntent::AnswerFaq);
        };

        let tool_name = invocation.name.clone();
        let resolved = match tool_name.as_str() {
            FETCH_ORDER_WARRANTY_TOOL => {
                serde_json::from_value::<OrderWarrantyArgs>(invocation.arguments).ok().and_then(
                    |args| {
                        let customer_id = trimmed_slot(args.customer_id)?;
                        let order_id = trimmed_slot(args.order_id)?;
                        let product_name = trimmed_slot(args.product_name)?;
                        Some(ResolvedIntent::FetchOrderWarranty {
                            customer_id,
                            order_id,
                            product_name,
                        })
                    },
                )
            }
            FETCH_DETAILS_BY_SN_TOOL => serde_json::from_value::<SerialNumberArgs>(
                invocation.arguments,
            )
            .ok()
            .and_then(|args| {
                let product_id = trimmed_slot(args.serial_number)?;
                Some(ResolvedIntent::FetchDetails { product_id })
            }),
            _ => None,
        };

        match resolved {
            Some(resolved) => Ok(resolved),
            None => {
                tracing::warn!(
                    event_name = "extract.tool_arguments_rejected",
                    tool = %tool_name,
                    "classifier selection did not satisfy its schema; answering as FAQ"
                );
                Ok(ResolvedIntent::AnswerFaq)
            }
        }
    }
}

fn trimmed_slot(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
