//! Lockstep execution engine for Nanovox build traces.
//!
//! [`Engine`] owns one [`VoxelGrid`](nanovox_grid::VoxelGrid), an energy
//! ledger, the global harmonics mode, the live bot set, and the remaining
//! trace. Each [`step()`](Engine::step) advances the whole swarm by one
//! synchronized tick: every live bot consumes exactly one command, in
//! ascending bot-id order, and multi-bot interactions (fusion pairs,
//! group fill/void) are resolved by grouping commands on their
//! interaction key before any effect is applied.
//!
//! The engine is single-threaded and deterministic. A failed `step()`
//! leaves the engine in an unspecified state; callers discard it and
//! surface the error.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod bot;
mod engine;
mod error;
mod metrics;

pub use bot::{BotId, Nanobot, MAX_BID, PRIMORDIAL_BID};
pub use engine::{Engine, Harmonics, Status};
pub use error::EngineError;
pub use metrics::StepOutcome;
