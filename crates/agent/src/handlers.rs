use std::sync::Arc;

use warrantly_core::capabilities::{AnswerFallback, OrderWarranty, WarrantyLookup};
use warrantly_core::errors::TurnError;

/// Returned by the FAQ handler when no fallback answerer is configured.
pub const LOOKUP_GUIDANCE: &str = "I can check warranty status two ways: give me a product \
serial number (it starts with SN), or a customer id, order id, and product name together.";

/// The three terminal handlers, one per intent. Each reads only the slots
/// its intent contract declares and writes the turn response exactly once.
pub struct Handlers {
    lookup: Arc<dyn WarrantyLookup>,
    fallback: Option<Arc<dyn AnswerFallback>>,
}

impl Handlers {
    pub fn new(
        lookup: Arc<dyn WarrantyLookup>,
        fallback: Option<Arc<dyn AnswerFallback>>,
    ) -> Self {
        Self { lookup, fallback }
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Order-based warranty lookup. Service misses come back verbatim;
    /// hits are rendered with the fixed response template.
    pub async fn order_warranty(
        &self,
        customer_id: &str,
        order_id: &str,
        product_name: &str,
    ) -> Result<String, TurnError> {
        match self.lookup.by_order(customer_id, order_id, product_name).await? {
            OrderWarranty::Found { status, expiry_date, .. } => Ok(format!(
                "The warranty is {status}. It expires on {}.",
                expiry_date.format("%Y-%m-%d")
            )),
            OrderWarranty::NotFound { message } => Ok(message),
        }
    }

    /// Serial-number lookup; the service message passes through unmodified.
    pub async fn serial_details(&self, product_id: &str) -> Result<String, TurnError> {
        Ok(self.lookup.by_serial(product_id).await?.message)
    }

    /// Free-text fallback, or the fixed guidance string when the system is
    /// configured without an answerer.
    pub async fn faq(&self, question: &str) -> Result<String, TurnError> {
        match &self.fallback {
            Some(fallback) => Ok(fallback.answer(question).await?),
            None => Ok(LOOKUP_GUIDANCE.to_string()),
        }
    }
}
