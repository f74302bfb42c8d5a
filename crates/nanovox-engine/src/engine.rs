//! The lockstep step state machine.

use indexmap::IndexMap;
use smallvec::SmallVec;
use std::collections::{BTreeMap, VecDeque};

use nanovox_geom::{Coordinate, Region};
use nanovox_grid::VoxelGrid;
use nanovox_proto::Command;

use crate::{BotId, EngineError, Nanobot, StepOutcome};

// ── Energy schedule ─────────────────────────────────────────────

const TICK_LOW_PER_VOXEL: i64 = 3;
const TICK_HIGH_PER_VOXEL: i64 = 30;
const TICK_PER_BOT: i64 = 20;
const SMOVE_PER_UNIT: i64 = 2;
const LMOVE_TURN: i64 = 2;
const FILL_FRESH: i64 = 12;
const FILL_REDUNDANT: i64 = 6;
const VOID_FRESH: i64 = -12;
const VOID_REDUNDANT: i64 = 3;
const FISSION_COST: i64 = 24;
const FUSION_REFUND: i64 = -24;

/// Steps between full well-formedness sweeps. The sweep also always
/// runs at construction and on the halting step.
const WELL_FORMED_INTERVAL: u64 = 4096;

/// Global harmonics mode.
///
/// Low requires every filled voxel grounded; High suspends that
/// requirement at a tenfold per-voxel tick cost.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Harmonics {
    /// Grounded-matter mode (cheap, strict).
    Low,
    /// Free-matter mode (expensive, permissive).
    High,
}

impl Harmonics {
    /// The opposite mode.
    pub fn toggled(self) -> Self {
        match self {
            Self::Low => Self::High,
            Self::High => Self::Low,
        }
    }
}

/// Engine lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Bots are live and more steps are expected.
    Running,
    /// A valid Halt was executed; the bot set is empty.
    Halted,
}

/// Interaction key: commands sharing a key are resolved together.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum GroupKey {
    Solo(BotId),
    Fusion(Coordinate),
    Region(Region),
}

type Group = SmallVec<[(BotId, Command); 8]>;

/// One synchronized trace execution over one grid.
///
/// Owns all mutable run state. `step()` advances every live bot by one
/// command; a failed step leaves the engine unusable and the caller
/// must discard it.
#[derive(Clone, Debug)]
pub struct Engine {
    grid: VoxelGrid,
    energy: i64,
    harmonics: Harmonics,
    bots: BTreeMap<BotId, Nanobot>,
    trace: VecDeque<Command>,
    steps: u64,
    status: Status,
}

impl Engine {
    /// Create an engine over a starting grid and a full trace, with the
    /// primordial bot at the origin, Low harmonics, and zero energy.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvariantViolated`] if the starting state is
    /// already ill-formed (ungrounded matter, or matter at the origin).
    pub fn new(grid: VoxelGrid, trace: Vec<Command>) -> Result<Self, EngineError> {
        let bot = Nanobot::primordial();
        let mut bots = BTreeMap::new();
        bots.insert(bot.bid(), bot);
        let engine = Self {
            grid,
            energy: 0,
            harmonics: Harmonics::Low,
            bots,
            trace: trace.into(),
            steps: 0,
            status: Status::Running,
        };
        engine.is_well_formed()?;
        Ok(engine)
    }

    // ── Accessors ───────────────────────────────────────────────

    /// Total energy spent so far.
    pub fn energy(&self) -> i64 {
        self.energy
    }

    /// Current harmonics mode.
    pub fn harmonics(&self) -> Harmonics {
        self.harmonics
    }

    /// Current lifecycle status.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Completed ticks.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Number of live bots.
    pub fn bot_count(&self) -> usize {
        self.bots.len()
    }

    /// The live bots in ascending id order.
    pub fn bots(&self) -> impl Iterator<Item = &Nanobot> {
        self.bots.values()
    }

    /// The grid in its current state.
    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    /// Commands not yet consumed.
    pub fn remaining_commands(&self) -> usize {
        self.trace.len()
    }

    // ── Stepping ────────────────────────────────────────────────

    /// Advance the swarm by exactly one synchronized tick.
    ///
    /// Consumes one command per live bot in ascending id order, groups
    /// them by interaction key, charges the tick's base energy, and
    /// applies every group. Well-formedness is re-verified periodically
    /// and on the halting step.
    ///
    /// # Errors
    ///
    /// Any [`EngineError`]; the engine is unusable afterwards.
    pub fn step(&mut self) -> Result<StepOutcome, EngineError> {
        if self.status == Status::Halted || self.bots.is_empty() {
            return Err(EngineError::AlreadyHalted);
        }
        let bots_before = self.bots.len();
        if self.trace.len() < bots_before {
            return Err(EngineError::TraceExhausted {
                needed: bots_before,
                available: self.trace.len(),
            });
        }

        let mut groups: IndexMap<GroupKey, Group> = IndexMap::new();
        let bids: Vec<BotId> = self.bots.keys().copied().collect();
        for bid in bids {
            let cmd = self
                .trace
                .pop_front()
                .expect("trace length checked against bot count");
            let pos = self.bots[&bid].pos();
            let key = match cmd {
                Command::FusionPrimary { .. } => GroupKey::Fusion(pos),
                Command::FusionSecondary { nd } => GroupKey::Fusion(pos.plus(nd)),
                Command::GroupFill { nd, fd } | Command::GroupVoid { nd, fd } => {
                    let corner = pos.plus(nd);
                    GroupKey::Region(Region::new(corner, corner.plus(fd)))
                }
                _ => GroupKey::Solo(bid),
            };
            groups.entry(key).or_default().push((bid, cmd));
        }

        let r3 = (self.grid.resolution() as i64).pow(3);
        let per_voxel = match self.harmonics {
            Harmonics::Low => TICK_LOW_PER_VOXEL,
            Harmonics::High => TICK_HIGH_PER_VOXEL,
        };
        let base_energy = per_voxel * r3 + TICK_PER_BOT * bots_before as i64;
        self.energy += base_energy;

        let mut command_energy = 0;
        for (key, members) in groups {
            command_energy += self.apply_group(key, members, bots_before)?;
        }
        self.energy += command_energy;
        self.steps += 1;

        if self.status == Status::Halted || self.steps % WELL_FORMED_INTERVAL == 0 {
            self.is_well_formed()?;
        }

        Ok(StepOutcome {
            base_energy,
            command_energy,
            bots_before,
            status: self.status,
        })
    }

    /// Step until the engine halts.
    ///
    /// # Errors
    ///
    /// The first [`EngineError`] encountered; the engine is unusable
    /// afterwards.
    pub fn run_to_halt(&mut self) -> Result<(), EngineError> {
        while self.status == Status::Running {
            self.step()?;
        }
        Ok(())
    }

    // ── Group application ───────────────────────────────────────

    fn apply_group(
        &mut self,
        key: GroupKey,
        members: Group,
        bots_before: usize,
    ) -> Result<i64, EngineError> {
        match key {
            GroupKey::Solo(bid) => {
                let (_, cmd) = members[0];
                self.apply_solo(bid, cmd, bots_before)
            }
            GroupKey::Fusion(at) => self.apply_fusion(at, members),
            GroupKey::Region(region) => self.apply_region(region, members),
        }
    }

    fn apply_solo(
        &mut self,
        bid: BotId,
        cmd: Command,
        bots_before: usize,
    ) -> Result<i64, EngineError> {
        let pos = self.bots[&bid].pos();
        match cmd {
            Command::Halt => {
                // Solitude is judged against the tick-start population so
                // the outcome cannot depend on group processing order.
                if bots_before != 1 {
                    return Err(EngineError::InvariantViolated {
                        detail: format!("halt with {bots_before} bots alive"),
                    });
                }
                if !pos.is_origin() {
                    return Err(EngineError::InvariantViolated {
                        detail: format!("halt away from origin at {pos}"),
                    });
                }
                if self.harmonics != Harmonics::Low {
                    return Err(EngineError::InvariantViolated {
                        detail: "halt under High harmonics".into(),
                    });
                }
                self.bots.clear();
                self.status = Status::Halted;
                Ok(0)
            }
            Command::Wait => Ok(0),
            Command::Flip => {
                self.harmonics = self.harmonics.toggled();
                Ok(0)
            }
            Command::SMove { lld } => {
                let target = pos.plus(lld);
                self.move_bot(bid, target)?;
                Ok(SMOVE_PER_UNIT * lld.mlen() as i64)
            }
            Command::LMove { sld1, sld2 } => {
                let target = pos.plus(sld1).plus(sld2);
                self.move_bot(bid, target)?;
                Ok(SMOVE_PER_UNIT * (sld1.mlen() as i64 + LMOVE_TURN + sld2.mlen() as i64))
            }
            Command::Fill { nd } => {
                let target = pos.plus(nd);
                if self.grid.fill(target)? {
                    Ok(FILL_FRESH)
                } else {
                    Ok(FILL_REDUNDANT)
                }
            }
            Command::Void { nd } => {
                let target = pos.plus(nd);
                if self.grid.unfill(target)? {
                    Ok(VOID_FRESH)
                } else {
                    Ok(VOID_REDUNDANT)
                }
            }
            Command::Fission { nd, m } => {
                let target = pos.plus(nd);
                if !self.grid.contains(target) || self.grid.is_full(target) {
                    return Err(EngineError::CollisionOrBounds { bid, target });
                }
                let child = self
                    .bots
                    .get_mut(&bid)
                    .expect("solo bot is live")
                    .fissure(target, m)?;
                self.bots.insert(child.bid(), child);
                Ok(FISSION_COST)
            }
            Command::FusionPrimary { .. }
            | Command::FusionSecondary { .. }
            | Command::GroupFill { .. }
            | Command::GroupVoid { .. } => {
                unreachable!("fusion and group commands never key as solo")
            }
        }
    }

    fn move_bot(&mut self, bid: BotId, target: Coordinate) -> Result<(), EngineError> {
        if !self.grid.contains(target) || self.grid.is_full(target) {
            return Err(EngineError::CollisionOrBounds { bid, target });
        }
        self.bots
            .get_mut(&bid)
            .expect("moving bot is live")
            .set_pos(target);
        Ok(())
    }

    fn apply_fusion(&mut self, at: Coordinate, members: Group) -> Result<i64, EngineError> {
        if members.len() != 2 {
            return Err(EngineError::InvalidFusionGroup {
                detail: format!("{} bots resolved to fusion point {at}", members.len()),
            });
        }
        let mut primary = None;
        let mut secondary = None;
        for &(bid, cmd) in &members {
            match cmd {
                Command::FusionPrimary { nd } => {
                    if primary.replace((bid, nd)).is_some() {
                        return Err(EngineError::InvalidFusionGroup {
                            detail: format!("two primaries at {at}"),
                        });
                    }
                }
                Command::FusionSecondary { nd } => {
                    if secondary.replace((bid, nd)).is_some() {
                        return Err(EngineError::InvalidFusionGroup {
                            detail: format!("two secondaries targeting {at}"),
                        });
                    }
                }
                _ => unreachable!("only fusion commands key to fusion points"),
            }
        }
        let (p_bid, p_nd) = primary.ok_or_else(|| EngineError::InvalidFusionGroup {
            detail: format!("secondary without primary at {at}"),
        })?;
        let (s_bid, _) = secondary.ok_or_else(|| EngineError::InvalidFusionGroup {
            detail: format!("primary without secondary at {at}"),
        })?;

        let p_pos = self.bots[&p_bid].pos();
        let s_pos = self.bots[&s_bid].pos();
        if p_pos.plus(p_nd) != s_pos {
            return Err(EngineError::InvalidFusionGroup {
                detail: format!(
                    "primary {p_bid} at {p_pos} does not point at secondary {s_bid} at {s_pos}"
                ),
            });
        }

        let absorbed = self
            .bots
            .remove(&s_bid)
            .expect("fusion secondary is live");
        self.bots
            .get_mut(&p_bid)
            .expect("fusion primary is live")
            .absorb(absorbed);
        Ok(FUSION_REFUND)
    }

    fn apply_region(&mut self, region: Region, members: Group) -> Result<i64, EngineError> {
        let filling = matches!(members[0].1, Command::GroupFill { .. });
        for &(_, cmd) in &members {
            let member_fills = matches!(cmd, Command::GroupFill { .. });
            if member_fills != filling {
                return Err(EngineError::MalformedGroupCommand {
                    detail: format!("mixed fill and void over {region}"),
                });
            }
        }

        let expected = 1usize << region.dim();
        if members.len() != expected {
            return Err(EngineError::MalformedGroupCommand {
                detail: format!(
                    "region {region} needs {expected} bots, {} participated",
                    members.len()
                ),
            });
        }
        if !region.is_valid(self.grid.resolution()) {
            return Err(EngineError::MalformedGroupCommand {
                detail: format!("region {region} leaves the grid"),
            });
        }

        let mut corners = Vec::with_capacity(members.len());
        for &(bid, cmd) in &members {
            let pos = self.bots[&bid].pos();
            if region.contains(pos) {
                return Err(EngineError::MalformedGroupCommand {
                    detail: format!("bot {bid} stands inside {region}"),
                });
            }
            let nd = match cmd {
                Command::GroupFill { nd, .. } | Command::GroupVoid { nd, .. } => nd,
                _ => unreachable!("only group commands key to regions"),
            };
            corners.push(pos.plus(nd));
        }
        corners.sort();
        if corners.windows(2).any(|w| w[0] == w[1]) {
            return Err(EngineError::MalformedGroupCommand {
                detail: format!("duplicate corner assignment over {region}"),
            });
        }
        let mut region_corners = region.corners();
        region_corners.sort();
        if corners != region_corners {
            return Err(EngineError::MalformedGroupCommand {
                detail: format!("resolved corners do not span {region}"),
            });
        }

        let mut energy = 0;
        if filling {
            for v in region.voxels() {
                energy += if self.grid.fill(v)? {
                    FILL_FRESH
                } else {
                    FILL_REDUNDANT
                };
            }
        } else {
            // Batch the deletions: one grounding recompute for the whole
            // region instead of one per voxel.
            self.grid.set_track_grounded(false);
            for v in region.voxels() {
                energy += if self.grid.unfill(v)? {
                    VOID_FRESH
                } else {
                    VOID_REDUNDANT
                };
            }
            self.grid.set_track_grounded(true);
        }
        Ok(energy)
    }

    // ── Well-formedness ─────────────────────────────────────────

    /// Verify the protocol invariants on the current state.
    ///
    /// Low harmonics requires every filled voxel grounded; bots must
    /// occupy distinct, in-bounds, empty voxels.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvariantViolated`] describing the first failure.
    pub fn is_well_formed(&self) -> Result<(), EngineError> {
        if self.harmonics == Harmonics::Low && !self.grid.all_grounded() {
            return Err(EngineError::InvariantViolated {
                detail: "ungrounded voxels under Low harmonics".into(),
            });
        }
        let mut positions: Vec<(Coordinate, BotId)> = Vec::with_capacity(self.bots.len());
        for bot in self.bots.values() {
            let pos = bot.pos();
            if !self.grid.contains(pos) {
                return Err(EngineError::InvariantViolated {
                    detail: format!("bot {} out of bounds at {pos}", bot.bid()),
                });
            }
            if self.grid.is_full(pos) {
                return Err(EngineError::InvariantViolated {
                    detail: format!("bot {} inside filled voxel {pos}", bot.bid()),
                });
            }
            positions.push((pos, bot.bid()));
        }
        positions.sort();
        for pair in positions.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(EngineError::InvariantViolated {
                    detail: format!(
                        "bots {} and {} share position {}",
                        pair[0].1, pair[1].1, pair[0].0
                    ),
                });
            }
        }
        Ok(())
    }

    // ── Final-state acceptance ──────────────────────────────────

    fn halted_clean(&self) -> bool {
        self.status == Status::Halted
            && self.bots.is_empty()
            && self.trace.is_empty()
            && self.harmonics == Harmonics::Low
    }

    /// Whether the run halted cleanly with the grid equal to `target`
    /// (assemble / reconstruct acceptance).
    pub fn verify_target(&self, target: &VoxelGrid) -> bool {
        self.halted_clean() && self.grid == *target
    }

    /// Whether the run halted cleanly with a completely empty grid
    /// (deconstruct acceptance).
    pub fn verify_empty(&self) -> bool {
        self.halted_clean() && self.grid.filled_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nanovox_geom::Difference;

    fn engine(resolution: u32, trace: Vec<Command>) -> Engine {
        Engine::new(VoxelGrid::new(resolution), trace).unwrap()
    }

    #[test]
    fn lone_halt_costs_base_energy_only() {
        let mut e = engine(3, vec![Command::Halt]);
        let outcome = e.step().unwrap();
        // 3 * 27 for Low harmonics + 20 for one bot.
        assert_eq!(outcome.base_energy, 101);
        assert_eq!(outcome.command_energy, 0);
        assert_eq!(e.energy(), 101);
        assert_eq!(e.status(), Status::Halted);
        assert_eq!(e.bot_count(), 0);
        assert!(e.verify_empty());
    }

    #[test]
    fn halt_away_from_origin_rejected() {
        let mut e = engine(
            3,
            vec![
                Command::smove(Difference::of_z(1)).unwrap(),
                Command::Halt,
            ],
        );
        e.step().unwrap();
        let err = e.step().unwrap_err();
        assert!(matches!(err, EngineError::InvariantViolated { .. }));
    }

    #[test]
    fn halt_under_high_harmonics_rejected() {
        let mut e = engine(3, vec![Command::Flip, Command::Halt]);
        e.step().unwrap();
        assert_eq!(e.harmonics(), Harmonics::High);
        let err = e.step().unwrap_err();
        assert!(matches!(err, EngineError::InvariantViolated { .. }));
    }

    #[test]
    fn step_after_halt_rejected() {
        let mut e = engine(3, vec![Command::Halt]);
        e.step().unwrap();
        assert_eq!(e.step().unwrap_err(), EngineError::AlreadyHalted);
    }

    #[test]
    fn under_supplied_trace_rejected() {
        let mut e = engine(3, vec![]);
        assert_eq!(
            e.step().unwrap_err(),
            EngineError::TraceExhausted {
                needed: 1,
                available: 0
            }
        );
    }

    #[test]
    fn flip_toggles_and_charges_high_rate() {
        let mut e = engine(3, vec![Command::Flip, Command::Flip]);
        let low_tick = e.step().unwrap();
        assert_eq!(e.harmonics(), Harmonics::High);
        let high_tick = e.step().unwrap();
        assert_eq!(e.harmonics(), Harmonics::Low);
        assert_eq!(low_tick.base_energy, 3 * 27 + 20);
        assert_eq!(high_tick.base_energy, 30 * 27 + 20);
    }

    #[test]
    fn smove_moves_and_charges_per_unit() {
        let mut e = engine(20, vec![Command::smove(Difference::of_x(15)).unwrap()]);
        let outcome = e.step().unwrap();
        assert_eq!(outcome.command_energy, 30);
        assert_eq!(e.bots().next().unwrap().pos(), Coordinate::new(15, 0, 0));
    }

    #[test]
    fn smove_out_of_bounds_rejected() {
        let mut e = engine(3, vec![Command::smove(Difference::of_x(5)).unwrap()]);
        let err = e.step().unwrap_err();
        assert_eq!(
            err,
            EngineError::CollisionOrBounds {
                bid: BotId(1),
                target: Coordinate::new(5, 0, 0)
            }
        );
    }

    #[test]
    fn smove_into_filled_voxel_rejected() {
        let mut grid = VoxelGrid::new(4);
        grid.fill(Coordinate::new(2, 0, 0)).unwrap();
        let mut e =
            Engine::new(grid, vec![Command::smove(Difference::of_x(2)).unwrap()]).unwrap();
        let err = e.step().unwrap_err();
        assert!(matches!(err, EngineError::CollisionOrBounds { .. }));
    }

    #[test]
    fn lmove_charges_both_legs_plus_turn() {
        let mut e = engine(
            10,
            vec![Command::lmove(Difference::of_x(3), Difference::of_z(4)).unwrap()],
        );
        let outcome = e.step().unwrap();
        assert_eq!(outcome.command_energy, 2 * (3 + 2 + 4));
        assert_eq!(e.bots().next().unwrap().pos(), Coordinate::new(3, 0, 4));
    }

    #[test]
    fn fill_costs_depend_on_prior_state() {
        let nd = Difference::new(0, 0, 1);
        let mut e = engine(
            3,
            vec![
                Command::fill(nd).unwrap(),
                Command::fill(nd).unwrap(),
            ],
        );
        assert_eq!(e.step().unwrap().command_energy, 12);
        assert!(e.grid().is_full(Coordinate::new(0, 0, 1)));
        assert_eq!(e.step().unwrap().command_energy, 6);
    }

    #[test]
    fn void_refunds_matter_and_charges_misses() {
        let nd = Difference::new(0, 0, 1);
        let mut e = engine(
            3,
            vec![
                Command::fill(nd).unwrap(),
                Command::void(nd).unwrap(),
                Command::void(nd).unwrap(),
            ],
        );
        e.step().unwrap();
        assert_eq!(e.step().unwrap().command_energy, -12);
        assert!(!e.grid().is_full(Coordinate::new(0, 0, 1)));
        assert_eq!(e.step().unwrap().command_energy, 3);
    }

    #[test]
    fn fission_spawns_child_with_transferred_seeds() {
        let mut e = engine(
            5,
            vec![Command::fission(Difference::new(1, 0, 0), 4).unwrap()],
        );
        let outcome = e.step().unwrap();
        assert_eq!(outcome.command_energy, 24);
        assert_eq!(e.bot_count(), 2);
        let bots: Vec<&Nanobot> = e.bots().collect();
        assert_eq!(bots[0].bid(), BotId(1));
        assert_eq!(bots[1].bid(), BotId(2));
        assert_eq!(bots[1].pos(), Coordinate::new(1, 0, 0));
        assert_eq!(bots[1].seeds().len(), 4);
    }

    #[test]
    fn fission_into_filled_voxel_rejected() {
        let mut grid = VoxelGrid::new(4);
        grid.fill(Coordinate::new(1, 0, 0)).unwrap();
        let mut e = Engine::new(
            grid,
            vec![Command::fission(Difference::new(1, 0, 0), 0).unwrap()],
        )
        .unwrap();
        assert!(matches!(
            e.step().unwrap_err(),
            EngineError::CollisionOrBounds { .. }
        ));
    }

    #[test]
    fn fusion_pair_merges_and_refunds() {
        let mut e = engine(
            5,
            vec![
                Command::fission(Difference::new(1, 0, 0), 3).unwrap(),
                // Tick 2: bot 1 is primary, bot 2 secondary.
                Command::fusion_primary(Difference::new(1, 0, 0)).unwrap(),
                Command::fusion_secondary(Difference::new(-1, 0, 0)).unwrap(),
            ],
        );
        e.step().unwrap();
        let outcome = e.step().unwrap();
        assert_eq!(outcome.command_energy, -24);
        assert_eq!(e.bot_count(), 1);
        let survivor = e.bots().next().unwrap();
        assert_eq!(survivor.bid(), BotId(1));
        assert_eq!(survivor.seeds().len(), 39);
    }

    #[test]
    fn fusion_without_partner_rejected() {
        let mut e = engine(
            5,
            vec![
                Command::fission(Difference::new(1, 0, 0), 0).unwrap(),
                Command::fusion_primary(Difference::new(1, 0, 0)).unwrap(),
                Command::Wait,
            ],
        );
        e.step().unwrap();
        assert!(matches!(
            e.step().unwrap_err(),
            EngineError::InvalidFusionGroup { .. }
        ));
    }

    #[test]
    fn mispointed_fusion_rejected() {
        let mut e = engine(
            5,
            vec![
                Command::fission(Difference::new(1, 0, 0), 0).unwrap(),
                // Secondary resolves to the primary's position, but the
                // primary points elsewhere.
                Command::fusion_primary(Difference::new(0, 1, 0)).unwrap(),
                Command::fusion_secondary(Difference::new(-1, 0, 0)).unwrap(),
            ],
        );
        e.step().unwrap();
        assert!(matches!(
            e.step().unwrap_err(),
            EngineError::InvalidFusionGroup { .. }
        ));
    }

    #[test]
    fn incomplete_group_rejected() {
        // Two bots claim a 2-dimensional region that needs 4 corners.
        let mut e = engine(
            8,
            vec![
                Command::fission(Difference::new(0, 0, 1), 0).unwrap(),
                Command::Wait,
                Command::smove(Difference::of_z(1)).unwrap(),
                Command::group_fill(Difference::new(1, 1, 0), Difference::new(0, 2, 2)).unwrap(),
                Command::group_fill(Difference::new(1, 1, 0), Difference::new(0, 2, -2)).unwrap(),
            ],
        );
        e.step().unwrap();
        e.step().unwrap();
        let err = e.step().unwrap_err();
        assert!(matches!(err, EngineError::MalformedGroupCommand { .. }));
    }

    #[test]
    fn region_fill_charges_once_per_voxel() {
        // Bots at (0,0,0) and (0,0,2) fill the line (1,0,0)-(1,0,2).
        let mut e = engine(
            8,
            vec![
                Command::fission(Difference::new(0, 0, 1), 0).unwrap(),
                Command::Wait,
                Command::smove(Difference::of_z(1)).unwrap(),
                Command::group_fill(Difference::new(1, 0, 0), Difference::new(0, 0, 2)).unwrap(),
                Command::group_fill(Difference::new(1, 0, 0), Difference::new(0, 0, -2)).unwrap(),
            ],
        );
        e.step().unwrap();
        e.step().unwrap();
        let outcome = e.step().unwrap();
        assert_eq!(outcome.command_energy, 3 * 12);
        for z in 0..=2 {
            assert!(e.grid().is_full(Coordinate::new(1, 0, z)));
        }
        assert!(e.grid().all_grounded());
    }

    #[test]
    fn group_void_clears_region_in_one_recompute() {
        let mut grid = VoxelGrid::new(8);
        for z in 0..=2 {
            grid.fill(Coordinate::new(1, 0, z)).unwrap();
        }
        let mut e = Engine::new(
            grid,
            vec![
                Command::fission(Difference::new(0, 0, 1), 0).unwrap(),
                Command::Wait,
                Command::smove(Difference::of_z(1)).unwrap(),
                Command::group_void(Difference::new(1, 0, 0), Difference::new(0, 0, 2)).unwrap(),
                Command::group_void(Difference::new(1, 0, 0), Difference::new(0, 0, -2)).unwrap(),
            ],
        )
        .unwrap();
        e.step().unwrap();
        e.step().unwrap();
        let outcome = e.step().unwrap();
        assert_eq!(outcome.command_energy, 3 * -12);
        assert_eq!(e.grid().filled_count(), 0);
    }

    #[test]
    fn group_member_inside_region_rejected() {
        // Bot 2 at (0,0,1) sits inside the region it would fill.
        let mut e = engine(
            8,
            vec![
                Command::fission(Difference::new(0, 0, 1), 0).unwrap(),
                Command::group_fill(Difference::new(0, 0, 1), Difference::new(0, 0, 1)).unwrap(),
                Command::group_fill(Difference::new(0, 0, 1), Difference::new(0, 0, -1)).unwrap(),
            ],
        );
        e.step().unwrap();
        assert!(matches!(
            e.step().unwrap_err(),
            EngineError::MalformedGroupCommand { .. }
        ));
    }

    #[test]
    fn high_harmonics_allows_transient_floaters() {
        let nd_up = Difference::new(0, 1, 1);
        let mut e = engine(
            4,
            vec![
                Command::Flip,
                // Floating voxel at (0,1,1).
                Command::fill(nd_up).unwrap(),
                // Ground it from below, then restore Low.
                Command::fill(Difference::new(0, 0, 1)).unwrap(),
                Command::Flip,
                Command::Halt,
            ],
        );
        e.step().unwrap();
        e.step().unwrap();
        assert!(!e.grid().all_grounded());
        e.step().unwrap();
        assert!(e.grid().all_grounded());
        e.step().unwrap();
        e.step().unwrap();
        assert_eq!(e.status(), Status::Halted);
    }

    #[test]
    fn ungrounded_matter_at_halt_rejected() {
        let mut e = engine(
            4,
            vec![
                Command::Flip,
                Command::fill(Difference::new(0, 1, 1)).unwrap(),
                Command::Flip,
                Command::Halt,
            ],
        );
        e.step().unwrap();
        e.step().unwrap();
        e.step().unwrap();
        // The halting step runs the mandatory well-formedness sweep.
        assert!(matches!(
            e.step().unwrap_err(),
            EngineError::InvariantViolated { .. }
        ));
    }

    #[test]
    fn construction_rejects_ungrounded_start() {
        let mut grid = VoxelGrid::new(4);
        grid.set_track_grounded(false);
        grid.fill(Coordinate::new(1, 2, 1)).unwrap();
        grid.set_track_grounded(true);
        assert!(matches!(
            Engine::new(grid, vec![Command::Halt]),
            Err(EngineError::InvariantViolated { .. })
        ));
    }
}
