//! UIP pipeline orchestrator.
//!
//! For each intent the [`Orchestrator`]:
//!
//! 1. walks INTENT_RECEIVED -> INTENT_PARSED -> COMPLIANCE_CHECKING
//! 2. runs the compliance rule chain, emitting one event per executed check
//!    plus an aggregate result
//! 3. moves the intent to INTENT_BLOCKED (DENY) or AWAITING_DECISIONS (ALLOW)
//! 4. optionally consults advisory knowledge through the confidence gate
//!
//! Access to one intent is serialised through its slot in the
//! [`IntentRegistry`]; different intents run fully in parallel.

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod registry;

pub use config::GateConfig;
pub use error::GateError;
pub use orchestrator::{Advancement, AdvisoryOutcome, IntentEvaluation, Orchestrator};
pub use registry::{IntentRegistry, IntentSlot};
