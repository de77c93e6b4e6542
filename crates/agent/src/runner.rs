use uuid::Uuid;

use warrantly_core::dispatch::{DispatchEvent, Dispatcher};
use warrantly_core::errors::TurnError;
use warrantly_core::session::{ResolvedIntent, TurnOutcome, TurnRequest, TurnState};

use crate::extract::Extractor;
use crate::handlers::Handlers;

/// One-pass orchestrator: extract, route, run exactly one handler, fold the
/// result into the response. No loops, no revisits; the turn state is owned
/// exclusively by `run_turn` for the turn's duration.
pub struct TurnRunner {
    extractor: Box<dyn Extractor>,
    dispatcher: Dispatcher,
    handlers: Handlers,
}

impl TurnRunner {
    pub fn new(extractor: Box<dyn Extractor>, handlers: Handlers) -> Self {
        Self { extractor, dispatcher: Dispatcher, handlers }
    }

    pub async fn run_turn(&self, request: TurnRequest<'_>) -> Result<TurnOutcome, TurnError> {
        let correlation_id = Uuid::new_v4().to_string();
        let mut state = TurnState::new(request);

        let resolved = self
            .extractor
            .extract(&state.user_query)
            .await
            .map_err(|error| TurnError::Extraction(error.to_string()))?;
        state.resolve(&resolved);
        tracing::info!(
            event_name = "turn.extracted",
            correlation_id = %correlation_id,
            intent = state.intent.as_str(),
            slot_count = state.slots.len(),
            "intent resolved"
        );

        let mut dispatch_state = self.dispatcher.initial_state();
        dispatch_state = self
            .dispatcher
            .apply(&dispatch_state, &DispatchEvent::IntentResolved(state.intent))?;
        let handler = self.dispatcher.route(&resolved);
        tracing::debug!(
            event_name = "turn.routed",
            correlation_id = %correlation_id,
            handler = handler.as_str(),
            "dispatch routed"
        );

        // Slot access is by-construction: each variant owns exactly the
        // slots its handler contract declares.
        let response = match &resolved {
            ResolvedIntent::FetchOrderWarranty { customer_id, order_id, product_name } => {
                self.handlers.order_warranty(customer_id, order_id, product_name).await?
            }
            ResolvedIntent::FetchDetails { product_id } => {
                self.handlers.serial_details(product_id).await?
            }
            ResolvedIntent::AnswerFaq => self.handlers.faq(&state.user_query).await?,
        };

        dispatch_state =
            self.dispatcher.apply(&dispatch_state, &DispatchEvent::HandlerCompleted)?;
        state.set_response(response);
        tracing::info!(
            event_name = "turn.handled",
            correlation_id = %correlation_id,
            intent = state.intent.as_str(),
            dispatch_state = ?dispatch_state,
            "turn complete"
        );

        let TurnState { intent, slots, response, .. } = state;
        let response = response.unwrap_or_default();
        Ok(TurnOutcome { response, intent, slots, correlation_id })
    }
}
