use thiserror::Error;

use crate::session::{Intent, ResolvedIntent};

/// Dispatch is a strict two-level routing tree: extraction routes once, the
/// routed handler runs once, and the turn terminates. No cycles, no retries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchState {
    Start,
    Routed(Intent),
    Terminal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchEvent {
    IntentResolved(Intent),
    HandlerCompleted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandlerKind {
    OrderWarranty,
    SerialDetails,
    Faq,
}

impl HandlerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrderWarranty => "order_warranty",
            Self::SerialDetails => "serial_details",
            Self::Faq => "faq",
        }
    }
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("invalid dispatch transition from {state:?} on {event:?}")]
    InvalidTransition { state: DispatchState, event: DispatchEvent },
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Dispatcher;

impl Dispatcher {
    pub fn initial_state(&self) -> DispatchState {
        DispatchState::Start
    }

    pub fn apply(
        &self,
        current: &DispatchState,
        event: &DispatchEvent,
    ) -> Result<DispatchState, DispatchError> {
        match (current, event) {
            (DispatchState::Start, DispatchEvent::IntentResolved(intent)) => {
                Ok(DispatchState::Routed(*intent))
            }
            (DispatchState::Routed(_), DispatchEvent::HandlerCompleted) => {
                Ok(DispatchState::Terminal)
            }
            _ => Err(DispatchError::InvalidTransition { state: *current, event: *event }),
        }
    }

    /// Deterministic routing table. The match is exhaustive over a closed
    /// intent enum, and `Intent::default()` is `AnswerFaq`, so no turn can
    /// dead-end without a handler.
    pub fn handler_for(&self, intent: Intent) -> HandlerKind {
        match intent {
            Intent::FetchOrderWarranty => HandlerKind::OrderWarranty,
            Intent::FetchDetails => HandlerKind::SerialDetails,
            Intent::AnswerFaq => HandlerKind::Faq,
        }
    }

    /// Routing view of a resolved intent; always agrees with `handler_for`.
    pub fn route(&self, resolved: &ResolvedIntent) -> HandlerKind {
        self.handler_for(resolved.intent())
    }
}

#[cfg(test)]
mod tests {
    use super::{DispatchError, DispatchEvent, DispatchState, Dispatcher, HandlerKind};
    use crate::session::{Intent, ResolvedIntent};

    #[test]
    fn routing_table_maps_each_intent_to_exactly_one_handler() {
        let dispatcher = Dispatcher;

        assert_eq!(
            dispatcher.handler_for(Intent::FetchOrderWarranty),
            HandlerKind::OrderWarranty
        );
        assert_eq!(dispatcher.handler_for(Intent::FetchDetails), HandlerKind::SerialDetails);
        assert_eq!(dispatcher.handler_for(Intent::AnswerFaq), HandlerKind::Faq);
    }

    #[test]
    fn default_intent_routes_to_faq_handler() {
        let dispatcher = Dispatcher;
        assert_eq!(dispatcher.handler_for(Intent::default()), HandlerKind::Faq);
    }

    #[test]
    fn happy_path_walks_start_routed_terminal() {
        let dispatcher = Dispatcher;
        let start = dispatcher.initial_state();

        let routed = dispatcher
            .apply(&start, &DispatchEvent::IntentResolved(Intent::FetchDetails))
            .expect("start -> routed");
        assert_eq!(routed, DispatchState::Routed(Intent::FetchDetails));

        let terminal = dispatcher
            .apply(&routed, &DispatchEvent::HandlerCompleted)
            .expect("routed -> terminal");
        assert_eq!(terminal, DispatchState::Terminal);
    }

    #[test]
    fn start_cannot_complete_a_handler_before_routing() {
        let dispatcher = Dispatcher;
        let error = dispatcher
            .apply(&DispatchState::Start, &DispatchEvent::HandlerCompleted)
            .expect_err("handler completion requires a routed state");

        assert!(matches!(
            error,
            DispatchError::InvalidTransition { state: DispatchState::Start, .. }
        ));
    }

    #[test]
    fn terminal_state_rejects_every_event() {
        let dispatcher = Dispatcher;

        for event in [
            DispatchEvent::IntentResolved(Intent::AnswerFaq),
            DispatchEvent::HandlerCompleted,
        ] {
            let error = dispatcher
                .apply(&DispatchState::Terminal, &event)
                .expect_err("terminal must not transition");
            assert!(matches!(error, DispatchError::InvalidTransition { .. }));
        }
    }

    #[test]
    fn routed_state_cannot_be_re_routed() {
        let dispatcher = Dispatcher;
        let routed = DispatchState::Routed(Intent::AnswerFaq);

        let error = dispatcher
            .apply(&routed, &DispatchEvent::IntentResolved(Intent::FetchDetails))
            .expect_err("routing happens exactly once per turn");
        assert!(matches!(error, DispatchError::InvalidTransition { .. }));
    }

    #[test]
    fn route_agrees_with_the_intent_table() {
        let dispatcher = Dispatcher;
        let cases = [
            ResolvedIntent::FetchOrderWarranty {
                customer_id: "CUST1001".to_string(),
                order_id: "ORD98765".to_string(),
                product_name: "QuantumBook Pro 15".to_string(),
            },
            ResolvedIntent::FetchDetails { product_id: "SN1".to_string() },
            ResolvedIntent::AnswerFaq,
        ];

        for resolved in cases {
            assert_eq!(dispatcher.route(&resolved), dispatcher.handler_for(resolved.intent()));
        }
    }
}
