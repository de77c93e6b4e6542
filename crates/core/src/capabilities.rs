use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WarrantyStatus {
    Active,
    Expired,
}

impl fmt::Display for WarrantyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => f.write_str("Active"),
            Self::Expired => f.write_str("Expired"),
        }
    }
}

/// Outcome of an order-based warranty lookup. A miss is data, not an error:
/// the message travels verbatim into the turn response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OrderWarranty {
    Found { status: WarrantyStatus, expiry_date: NaiveDate, order_date: NaiveDate },
    NotFound { message: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerialLookup {
    pub message: String,
}

/// A collaborator failure. Propagates to the caller as a turn-level failure;
/// nothing in the turn pipeline retries it.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("warranty lookup failure: {0}")]
    Lookup(String),
    #[error("fallback answerer failure: {0}")]
    Fallback(String),
}

#[async_trait]
pub trait WarrantyLookup: Send + Sync {
    async fn by_order(
        &self,
        customer_id: &str,
        order_id: &str,
        product_name: &str,
    ) -> Result<OrderWarranty, CapabilityError>;

    async fn by_serial(&self, serial_number: &str) -> Result<SerialLookup, CapabilityError>;
}

/// Free-text responder for queries that match no lookup pattern. May be
/// absent; the FAQ handler then falls back to a fixed guidance string.
#[async_trait]
pub trait AnswerFallback: Send + Sync {
    async fn answer(&self, question: &str) -> Result<String, CapabilityError>;
}

/// Time source for warranty expiry decisions, injectable so tests can pin
/// "now".
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::{CapabilityError, Clock, SystemClock, WarrantyStatus};

    #[test]
    fn status_renders_in_response_casing() {
        assert_eq!(WarrantyStatus::Active.to_string(), "Active");
        assert_eq!(WarrantyStatus::Expired.to_string(), "Expired");
    }

    #[test]
    fn capability_errors_name_the_failing_collaborator() {
        let lookup = CapabilityError::Lookup("dataset unreadable".to_string());
        assert_eq!(lookup.to_string(), "warranty lookup failure: dataset unreadable");

        let fallback = CapabilityError::Fallback("model timeout".to_string());
        assert_eq!(fallback.to_string(), "fallback answerer failure: model timeout");
    }

    #[test]
    fn system_clock_advances() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
