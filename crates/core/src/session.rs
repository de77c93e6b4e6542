use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Slot keys a handler is allowed to read, per intent contract.
pub mod slot {
    pub const CUSTOMER_ID: &str = "customer_id";
    pub const ORDER_ID: &str = "order_id";
    pub const PRODUCT_NAME: &str = "product_name";
    pub const PRODUCT_ID: &str = "product_id";
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    FetchOrderWarranty,
    FetchDetails,
    #[default]
    AnswerFaq,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FetchOrderWarranty => "fetch_order_warranty",
            Self::FetchDetails => "fetch_details",
            Self::AnswerFaq => "answer_faq",
        }
    }
}

/// A classified intent carrying the slots its handler requires.
///
/// Handlers consume variants, never raw slot maps, so a routed intent with a
/// missing required slot cannot be constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolvedIntent {
    FetchOrderWarranty { customer_id: String, order_id: String, product_name: String },
    FetchDetails { product_id: String },
    AnswerFaq,
}

impl ResolvedIntent {
    pub fn intent(&self) -> Intent {
        match self {
            Self::FetchOrderWarranty { .. } => Intent::FetchOrderWarranty,
            Self::FetchDetails { .. } => Intent::FetchDetails,
            Self::AnswerFaq => Intent::AnswerFaq,
        }
    }

    /// Slot view of the resolved intent, for observability and tests.
    pub fn slots(&self) -> BTreeMap<String, String> {
        let mut slots = BTreeMap::new();
        match self {
            Self::FetchOrderWarranty { customer_id, order_id, product_name } => {
                slots.insert(slot::CUSTOMER_ID.to_string(), customer_id.clone());
                slots.insert(slot::ORDER_ID.to_string(), order_id.clone());
                slots.insert(slot::PRODUCT_NAME.to_string(), product_name.clone());
            }
            Self::FetchDetails { product_id } => {
                slots.insert(slot::PRODUCT_ID.to_string(), product_id.clone());
            }
            Self::AnswerFaq => {}
        }
        slots
    }
}

/// Turn invocation boundary: one free-text query plus the caller-owned
/// conversation history.
#[derive(Clone, Copy, Debug)]
pub struct TurnRequest<'a> {
    pub user_query: &'a str,
    pub chat_history: &'a [(String, String)],
}

/// Mutable record for a single turn, exclusively owned by the turn runner.
///
/// `intent`/`slots` are written once by extraction, `response` once by the
/// selected handler. `chat_history` is read-only to the pipeline.
#[derive(Debug)]
pub struct TurnState<'a> {
    pub user_query: String,
    pub intent: Intent,
    pub slots: BTreeMap<String, String>,
    pub response: Option<String>,
    pub chat_history: &'a [(String, String)],
}

impl<'a> TurnState<'a> {
    pub fn new(request: TurnRequest<'a>) -> Self {
        Self {
            user_query: request.user_query.to_string(),
            intent: Intent::default(),
            slots: BTreeMap::new(),
            response: None,
            chat_history: request.chat_history,
        }
    }

    pub fn resolve(&mut self, resolved: &ResolvedIntent) {
        self.intent = resolved.intent();
        self.slots = resolved.slots();
    }

    pub fn set_response(&mut self, response: String) {
        debug_assert!(self.response.is_none(), "response must be written exactly once per turn");
        self.response = Some(response);
    }
}

/// What one pass through the pipeline produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnOutcome {
    pub response: String,
    pub intent: Intent,
    pub slots: BTreeMap<String, String>,
    pub correlation_id: String,
}
