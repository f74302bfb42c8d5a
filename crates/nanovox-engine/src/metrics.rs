//! Per-tick outcome data returned by the engine.

use crate::engine::Status;

/// Energy breakdown and status for one completed tick.
///
/// The engine populates this after each `step()`; callers use it for
/// telemetry and for driving run loops without re-querying the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepOutcome {
    /// Harmonics and bot-count charge for the tick:
    /// `3R³` (Low) or `30R³` (High), plus `20` per bot alive at tick
    /// start.
    pub base_energy: i64,
    /// Net energy from the commands executed this tick. May be negative
    /// (fusion and void refund).
    pub command_energy: i64,
    /// Live bots at the start of the tick.
    pub bots_before: usize,
    /// Engine status after the tick.
    pub status: Status,
}
