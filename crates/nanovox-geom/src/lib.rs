//! Geometry value types for the Nanovox protocol.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! immutable value types every protocol command is built from: grid
//! [`Coordinate`]s, [`Difference`] displacements with their classification
//! predicates (linear, short/long-linear, near, far), the [`Axis`] wire
//! encoding, and axis-aligned [`Region`] boxes.
//!
//! All operations here are pure. Classification violations surface at
//! command construction time in `nanovox-proto`, never here.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod coord;
mod diff;
mod region;

pub use coord::Coordinate;
pub use diff::{Axis, Difference};
pub use region::Region;
