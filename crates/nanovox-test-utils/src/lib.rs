//! Test fixtures and reference oracles for Nanovox development.
//!
//! - [`reference_grounded`] — from-scratch groundedness computation,
//!   used to cross-check the grid's incremental tracker.
//! - [`random_grid`] — seeded, reproducible random fill patterns.
//! - [`solid_block_grid`] — a grounded cuboid fixture.

mod fixtures;

pub use fixtures::{random_grid, reference_all_grounded, reference_grounded, solid_block_grid};
