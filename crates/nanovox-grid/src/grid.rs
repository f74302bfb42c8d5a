//! The voxel grid and its grounding tracker.

use crate::bitset::VoxelSet;
use crate::GridError;
use nanovox_geom::{Coordinate, Region};
use smallvec::SmallVec;
use std::collections::VecDeque;
use std::fmt;

/// A bounded R×R×R voxel grid with filled and grounded state.
///
/// A filled voxel is *grounded* when it is connected to some filled
/// voxel on the y = 0 plane through a path of face-adjacent filled
/// voxels. The grid keeps the grounded set current across mutations:
/// [`fill`](VoxelGrid::fill) updates it incrementally (a bounded flood
/// from the new voxel), while [`unfill`](VoxelGrid::unfill) rebuilds it
/// from scratch, since clearing one voxel can strand an arbitrary
/// subtree.
///
/// Callers performing bulk mutations (model loading, batch voids) can
/// suspend tracking with [`set_track_grounded`](VoxelGrid::set_track_grounded)
/// and pay for a single recompute at the end.
///
/// Equality compares resolution and filled voxels; the grounded set is
/// derived state.
#[derive(Clone)]
pub struct VoxelGrid {
    resolution: u32,
    filled: VoxelSet,
    grounded: VoxelSet,
    track_grounded: bool,
}

impl VoxelGrid {
    /// Create an empty grid of the given resolution.
    pub fn new(resolution: u32) -> Self {
        let cells = (resolution as usize).pow(3);
        Self {
            resolution,
            filled: VoxelSet::with_capacity(cells),
            grounded: VoxelSet::with_capacity(cells),
            track_grounded: true,
        }
    }

    /// The grid resolution R.
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Whether `c` lies inside the grid.
    pub fn contains(&self, c: Coordinate) -> bool {
        c.is_valid(self.resolution)
    }

    fn index(&self, c: Coordinate) -> usize {
        let r = self.resolution as usize;
        (c.x as usize * r + c.y as usize) * r + c.z as usize
    }

    fn coordinate(&self, index: usize) -> Coordinate {
        let r = self.resolution as usize;
        let z = index % r;
        let rest = index / r;
        Coordinate::new((rest / r) as i32, (rest % r) as i32, z as i32)
    }

    fn check(&self, c: Coordinate) -> Result<usize, GridError> {
        if !self.contains(c) {
            return Err(GridError::OutOfBounds {
                coordinate: c,
                resolution: self.resolution,
            });
        }
        Ok(self.index(c))
    }

    /// Whether the voxel at `c` is filled. Out-of-bounds reads as empty.
    pub fn is_full(&self, c: Coordinate) -> bool {
        self.contains(c) && self.filled.get(self.index(c))
    }

    /// Whether the voxel at `c` is grounded. Out-of-bounds reads as
    /// ungrounded.
    pub fn is_grounded(&self, c: Coordinate) -> bool {
        self.contains(c) && self.grounded.get(self.index(c))
    }

    /// Whether every filled voxel is grounded.
    ///
    /// This is the invariant Low harmonics requires. Vacuously true for
    /// an empty grid.
    pub fn all_grounded(&self) -> bool {
        self.grounded.count() == self.filled.count()
    }

    /// Number of filled voxels.
    pub fn filled_count(&self) -> usize {
        self.filled.count()
    }

    /// Fill the voxel at `c`.
    ///
    /// Returns `Ok(true)` if the voxel was empty (state changed),
    /// `Ok(false)` if it was already filled.
    ///
    /// # Errors
    ///
    /// [`GridError::OutOfBounds`] if `c` lies outside the grid.
    pub fn fill(&mut self, c: Coordinate) -> Result<bool, GridError> {
        let index = self.check(c)?;
        if !self.filled.set(index) {
            return Ok(false);
        }
        if self.track_grounded {
            self.post_fill(c, index);
        }
        Ok(true)
    }

    /// Clear the voxel at `c`.
    ///
    /// Returns `Ok(true)` if the voxel was filled (state changed),
    /// `Ok(false)` if it was already empty. Clearing a voxel triggers a
    /// full grounding recompute when tracking is enabled.
    ///
    /// # Errors
    ///
    /// [`GridError::OutOfBounds`] if `c` lies outside the grid.
    pub fn unfill(&mut self, c: Coordinate) -> Result<bool, GridError> {
        let index = self.check(c)?;
        if !self.filled.clear(index) {
            return Ok(false);
        }
        if self.grounded.get(index) {
            self.grounded.clear(index);
        }
        if self.track_grounded {
            self.recompute_grounded();
        }
        Ok(true)
    }

    /// Enable or disable incremental grounding maintenance.
    ///
    /// While disabled, `fill`/`unfill` leave the grounded set stale.
    /// Re-enabling triggers one full recompute. Bulk loaders and batch
    /// void passes use this to avoid per-mutation recompute cost.
    pub fn set_track_grounded(&mut self, track: bool) {
        if track && !self.track_grounded {
            self.recompute_grounded();
        }
        self.track_grounded = track;
    }

    /// A freshly filled voxel is grounded iff it sits on the floor or
    /// touches a grounded neighbor; if so, grounding spreads from it to
    /// every filled-but-ungrounded voxel reachable through the fill.
    fn post_fill(&mut self, c: Coordinate, index: usize) {
        let seeded = c.y == 0 || c.face_neighbors().iter().any(|&n| self.is_grounded(n));
        if !seeded {
            return;
        }
        self.grounded.set(index);
        // Explicit worklist: an R=250 grid is ~15.6M voxels, far beyond
        // what call-stack recursion can carry.
        let mut frontier = VecDeque::new();
        frontier.push_back(c);
        while let Some(v) = frontier.pop_front() {
            let next: SmallVec<[Coordinate; 6]> = v
                .face_neighbors()
                .into_iter()
                .filter(|&n| self.is_full(n) && !self.is_grounded(n))
                .collect();
            for n in next {
                self.grounded.set(self.index(n));
                frontier.push_back(n);
            }
        }
    }

    /// Rebuild the grounded set from scratch: seed from every filled
    /// voxel on the floor plane, then flood across face adjacency to
    /// fixed point.
    fn recompute_grounded(&mut self) {
        self.grounded.clear_all();
        let r = self.resolution as i32;
        let mut frontier = VecDeque::new();
        for x in 0..r {
            for z in 0..r {
                let c = Coordinate::new(x, 0, z);
                let index = self.index(c);
                if self.filled.get(index) {
                    self.grounded.set(index);
                    frontier.push_back(c);
                }
            }
        }
        while let Some(v) = frontier.pop_front() {
            let next: SmallVec<[Coordinate; 6]> = v
                .face_neighbors()
                .into_iter()
                .filter(|&n| self.is_full(n) && !self.is_grounded(n))
                .collect();
            for n in next {
                self.grounded.set(self.index(n));
                frontier.push_back(n);
            }
        }
    }

    /// Iterate the filled voxel coordinates in canonical x-major order.
    pub fn filled(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.filled.iter().map(|i| self.coordinate(i))
    }

    /// The tight bounding box over filled voxels in the fill-eligible
    /// interior, or `None` if nothing is filled there.
    pub fn bounding_box(&self) -> Option<Region> {
        let r = self.resolution as i32;
        let mut min: Option<Coordinate> = None;
        let mut max = Coordinate::ORIGIN;
        for x in 1..r - 1 {
            for y in 0..r - 1 {
                for z in 1..r - 1 {
                    let c = Coordinate::new(x, y, z);
                    if !self.filled.get(self.index(c)) {
                        continue;
                    }
                    match min {
                        None => {
                            min = Some(c);
                            max = c;
                        }
                        Some(ref mut lo) => {
                            lo.x = lo.x.min(c.x);
                            lo.y = lo.y.min(c.y);
                            lo.z = lo.z.min(c.z);
                            max.x = max.x.max(c.x);
                            max.y = max.y.max(c.y);
                            max.z = max.z.max(c.z);
                        }
                    }
                }
            }
        }
        min.map(|lo| Region::new(lo, max))
    }
}

impl PartialEq for VoxelGrid {
    fn eq(&self, other: &Self) -> bool {
        self.resolution == other.resolution && self.filled == other.filled
    }
}

impl Eq for VoxelGrid {}

impl fmt::Debug for VoxelGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoxelGrid")
            .field("resolution", &self.resolution)
            .field("filled", &self.filled.count())
            .field("grounded", &self.grounded.count())
            .finish()
    }
}
