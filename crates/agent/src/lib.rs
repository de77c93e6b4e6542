//! Turn pipeline - intent extraction, dispatch, and handling
//!
//! This crate is the "brain" of the warrantly system - one pass over a user
//! query:
//! - **Intent Extraction** (`extract`) - Parse NL → `ResolvedIntent`, either
//!   with structural pattern matchers or an LLM tool-calling classifier
//! - **Dispatch** - Route the resolved intent to exactly one handler
//! - **Handling** (`handlers`) - Run the warranty lookup or FAQ fallback
//! - **Response** - Fold the result into one natural-language reply
//!
//! # Key Types
//!
//! - `TurnRunner` - Main orchestrator (see `runner` module)
//! - `Extractor` - Pluggable strategy trait; the dispatcher never knows
//!   which strategy produced the intent
//! - `LlmClient` - Pluggable trait for OpenAI-compatible chat backends
//!
//! # Safety Principle
//!
//! The LLM is strictly a translator. It classifies and extracts; it never
//! invents slot values and never decides warranty outcomes. Those are
//! deterministic decisions made by the lookup service.

pub mod extract;
pub mod faq;
pub mod handlers;
pub mod llm;
pub mod runner;
