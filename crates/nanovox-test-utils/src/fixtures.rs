//! Reusable grid fixtures and the grounding reference oracle.

use std::collections::{HashSet, VecDeque};

use nanovox_geom::Coordinate;
use nanovox_grid::VoxelGrid;
use rand::{RngExt, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Compute the grounded set from scratch, ignoring the grid's own
/// tracker: BFS over filled voxels from every filled floor voxel.
///
/// This is the definition the incremental tracker must agree with; the
/// property tests compare the two after every mutation.
pub fn reference_grounded(grid: &VoxelGrid) -> HashSet<Coordinate> {
    let mut grounded = HashSet::new();
    let mut frontier = VecDeque::new();
    let r = grid.resolution() as i32;
    for x in 0..r {
        for z in 0..r {
            let c = Coordinate::new(x, 0, z);
            if grid.is_full(c) && grounded.insert(c) {
                frontier.push_back(c);
            }
        }
    }
    while let Some(v) = frontier.pop_front() {
        for n in v.face_neighbors() {
            if grid.is_full(n) && grounded.insert(n) {
                frontier.push_back(n);
            }
        }
    }
    grounded
}

/// Whether every filled voxel is grounded, per the reference oracle.
pub fn reference_all_grounded(grid: &VoxelGrid) -> bool {
    reference_grounded(grid).len() == grid.filled_count()
}

/// A reproducible random fill pattern: each voxel is filled with
/// probability `density`, driven by a seeded ChaCha stream.
///
/// Grounding is recomputed once after the bulk load, so the returned
/// grid's tracker state is current.
pub fn random_grid(seed: u64, resolution: u32, density: f64) -> VoxelGrid {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut grid = VoxelGrid::new(resolution);
    grid.set_track_grounded(false);
    let r = resolution as i32;
    for x in 0..r {
        for y in 0..r {
            for z in 0..r {
                if rng.random::<f64>() < density {
                    grid.fill(Coordinate::new(x, y, z))
                        .expect("loop bounds keep coordinates valid");
                }
            }
        }
    }
    grid.set_track_grounded(true);
    grid
}

/// A solid grounded block spanning `min..=max` on x/z at heights
/// `0..height`, sitting on the floor.
pub fn solid_block_grid(resolution: u32, min: i32, max: i32, height: i32) -> VoxelGrid {
    let mut grid = VoxelGrid::new(resolution);
    grid.set_track_grounded(false);
    for x in min..=max {
        for y in 0..height {
            for z in min..=max {
                grid.fill(Coordinate::new(x, y, z))
                    .expect("caller-supplied block must fit the grid");
            }
        }
    }
    grid.set_track_grounded(true);
    grid
}
