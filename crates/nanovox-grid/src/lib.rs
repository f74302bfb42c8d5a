//! Bounded voxel grid with incremental "grounded" connectivity tracking.
//!
//! [`VoxelGrid`] maintains two bitsets over an R×R×R cube: which voxels
//! are filled, and which filled voxels are *grounded* — transitively
//! face-adjacent-connected to the y = 0 floor plane. Grounding updates
//! incrementally on fill and is rebuilt from scratch on unfill, where a
//! single cleared voxel can disconnect an arbitrary subtree.
//!
//! The grounded set is the load-bearing invariant of the protocol's Low
//! harmonics mode: while harmonics is Low, every filled voxel must be
//! grounded.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod bitset;
mod error;
mod grid;

pub use error::GridError;
pub use grid::VoxelGrid;
