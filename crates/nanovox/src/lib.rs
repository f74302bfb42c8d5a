//! Nanovox: a validator and executor for nanobot build traces.
//!
//! This is the top-level facade crate that re-exports the public API of
//! the Nanovox sub-crates. For most users, adding `nanovox` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use nanovox::prelude::*;
//!
//! // A trace that fills one floor voxel and halts.
//! let trace = vec![
//!     Command::fill(Difference::new(0, 0, 1)).unwrap(),
//!     Command::Halt,
//! ];
//!
//! let mut engine = Engine::new(VoxelGrid::new(3), trace).unwrap();
//! engine.run_to_halt().unwrap();
//!
//! let mut target = VoxelGrid::new(3);
//! target.fill(Coordinate::new(0, 0, 1)).unwrap();
//! assert!(engine.verify_target(&target));
//! assert_eq!(engine.energy(), 2 * (3 * 27 + 20) + 12);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in
//! the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`geom`] | `nanovox-geom` | Coordinates, displacements, regions |
//! | [`grid`] | `nanovox-grid` | Voxel grid with grounding tracking |
//! | [`proto`] | `nanovox-proto` | Commands and model/trace codecs |
//! | [`engine`] | `nanovox-engine` | Lockstep trace execution |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Geometry value types (`nanovox-geom`).
pub use nanovox_geom as geom;

/// The voxel grid and grounding tracker (`nanovox-grid`).
pub use nanovox_grid as grid;

/// Commands and binary codecs (`nanovox-proto`).
pub use nanovox_proto as proto;

/// The lockstep execution engine (`nanovox-engine`).
pub use nanovox_engine as engine;

/// The most commonly used types, re-exported flat.
pub mod prelude {
    pub use nanovox_engine::{BotId, Engine, EngineError, Harmonics, Nanobot, Status, StepOutcome};
    pub use nanovox_geom::{Axis, Coordinate, Difference, Region};
    pub use nanovox_grid::{GridError, VoxelGrid};
    pub use nanovox_proto::{
        read_model, read_trace, write_model, write_trace, CodecError, Command, CommandError,
    };
}
