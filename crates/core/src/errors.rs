use thiserror::Error;

use crate::capabilities::CapabilityError;
use crate::dispatch::DispatchError;

/// Turn-level failure reported to the caller. Extraction ambiguity and
/// lookup misses are not failures; they resolve inside the pipeline.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TurnError {
    #[error("intent extraction failed: {0}")]
    Extraction(String),
    #[error(transparent)]
    Capability(#[from] CapabilityError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

#[cfg(test)]
mod tests {
    use super::TurnError;
    use crate::capabilities::CapabilityError;
    use crate::dispatch::{DispatchError, DispatchEvent, DispatchState};

    #[test]
    fn capability_failures_convert_transparently() {
        let error = TurnError::from(CapabilityError::Fallback("connection refused".to_string()));
        assert_eq!(error.to_string(), "fallback answerer failure: connection refused");
    }

    #[test]
    fn dispatch_violations_surface_as_turn_failures() {
        let error = TurnError::from(DispatchError::InvalidTransition {
            state: DispatchState::Terminal,
            event: DispatchEvent::HandlerCompleted,
        });
        assert!(error.to_string().contains("invalid dispatch transition"));
    }
}
