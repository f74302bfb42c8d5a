//! Error types for trace execution.

use crate::BotId;
use nanovox_geom::Coordinate;
use nanovox_grid::GridError;
use std::fmt;

/// Errors from [`Engine::step()`](crate::Engine::step).
///
/// All are terminal for the engine instance: a failed step leaves the
/// state unspecified and the caller must discard it. Batch runners catch
/// per-run failures and continue with the next problem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineError {
    /// `step()` was called after the engine halted.
    AlreadyHalted,
    /// The trace holds fewer queued commands than live bots this tick.
    TraceExhausted {
        /// Commands required (one per live bot).
        needed: usize,
        /// Commands actually remaining.
        available: usize,
    },
    /// A move or fission targeted an out-of-bounds or filled voxel.
    CollisionOrBounds {
        /// The bot whose command failed.
        bid: BotId,
        /// The offending destination.
        target: Coordinate,
    },
    /// A fission requested more seeds than the bot can spend.
    InsufficientSeeds {
        /// The fissioning bot.
        bid: BotId,
        /// Seeds in its pool.
        available: usize,
        /// Seeds requested for the child (excluding the child's own id).
        requested: u8,
    },
    /// A fusion group did not resolve to exactly one mutually-adjacent
    /// primary/secondary pair.
    InvalidFusionGroup {
        /// What went wrong.
        detail: String,
    },
    /// A group fill/void had the wrong participant set for its region.
    MalformedGroupCommand {
        /// What went wrong.
        detail: String,
    },
    /// A protocol invariant failed: ungrounded voxels under Low
    /// harmonics, overlapping bots, a bot inside matter, or an invalid
    /// halt.
    InvariantViolated {
        /// The violated invariant.
        detail: String,
    },
    /// A grid mutation was rejected.
    Grid(GridError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyHalted => write!(f, "engine already halted"),
            Self::TraceExhausted { needed, available } => {
                write!(
                    f,
                    "trace exhausted: {needed} commands needed this tick, {available} remaining"
                )
            }
            Self::CollisionOrBounds { bid, target } => {
                write!(f, "bot {bid} blocked: target {target} out of bounds or filled")
            }
            Self::InsufficientSeeds {
                bid,
                available,
                requested,
            } => {
                write!(
                    f,
                    "bot {bid} has {available} seeds, cannot fission with m={requested}"
                )
            }
            Self::InvalidFusionGroup { detail } => write!(f, "invalid fusion group: {detail}"),
            Self::MalformedGroupCommand { detail } => {
                write!(f, "malformed group command: {detail}")
            }
            Self::InvariantViolated { detail } => write!(f, "invariant violated: {detail}"),
            Self::Grid(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Grid(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GridError> for EngineError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}
