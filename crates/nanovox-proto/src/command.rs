//! Protocol commands with class-validated construction.

use crate::CommandError;
use nanovox_geom::Difference;
use std::fmt;

/// One nanobot instruction.
///
/// Constructed through the validating associated functions, which reject
/// displacements of the wrong class with
/// [`CommandError::InvalidArgument`]. A constructed `Command` is
/// immutable and wire-encodable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// Terminate the run. Valid only for a sole bot at the origin under
    /// Low harmonics.
    Halt,
    /// Do nothing this tick.
    Wait,
    /// Toggle the global harmonics mode.
    Flip,
    /// Straight move by a long-linear displacement.
    SMove {
        /// Long-linear displacement (mlen ≤ 15).
        lld: Difference,
    },
    /// Two-leg move: two short-linear displacements applied in order.
    LMove {
        /// First short-linear leg (mlen ≤ 5).
        sld1: Difference,
        /// Second short-linear leg (mlen ≤ 5).
        sld2: Difference,
    },
    /// Spawn a new bot at a near-adjacent voxel, endowing it with `m`
    /// seeds.
    Fission {
        /// Near displacement to the spawn voxel.
        nd: Difference,
        /// Number of seeds transferred to the child.
        m: u8,
    },
    /// Fill the voxel at a near displacement.
    Fill {
        /// Near displacement to the target voxel.
        nd: Difference,
    },
    /// Void (clear) the voxel at a near displacement.
    Void {
        /// Near displacement to the target voxel.
        nd: Difference,
    },
    /// Primary half of a fusion pair; the surviving bot.
    FusionPrimary {
        /// Near displacement to the secondary bot.
        nd: Difference,
    },
    /// Secondary half of a fusion pair; removed and absorbed.
    FusionSecondary {
        /// Near displacement to the primary bot.
        nd: Difference,
    },
    /// Cooperative fill of a whole region, one bot per region corner.
    GroupFill {
        /// Near displacement to this bot's corner of the region.
        nd: Difference,
        /// Far displacement from that corner to the opposite corner.
        fd: Difference,
    },
    /// Cooperative void of a whole region, one bot per region corner.
    GroupVoid {
        /// Near displacement to this bot's corner of the region.
        nd: Difference,
        /// Far displacement from that corner to the opposite corner.
        fd: Difference,
    },
}

fn require(ok: bool, detail: impl FnOnce() -> String) -> Result<(), CommandError> {
    if ok {
        Ok(())
    } else {
        Err(CommandError::InvalidArgument { detail: detail() })
    }
}

impl Command {
    /// Straight move. `lld` must be long-linear.
    pub fn smove(lld: Difference) -> Result<Self, CommandError> {
        require(lld.is_long_linear(), || format!("not long-linear: {lld}"))?;
        Ok(Self::SMove { lld })
    }

    /// Two-leg move. Both operands must be short-linear.
    pub fn lmove(sld1: Difference, sld2: Difference) -> Result<Self, CommandError> {
        require(sld1.is_short_linear(), || format!("not short-linear: {sld1}"))?;
        require(sld2.is_short_linear(), || format!("not short-linear: {sld2}"))?;
        Ok(Self::LMove { sld1, sld2 })
    }

    /// Spawn a child bot. `nd` must be near.
    pub fn fission(nd: Difference, m: u8) -> Result<Self, CommandError> {
        require(nd.is_near(), || format!("not near: {nd}"))?;
        Ok(Self::Fission { nd, m })
    }

    /// Fill one voxel. `nd` must be near.
    pub fn fill(nd: Difference) -> Result<Self, CommandError> {
        require(nd.is_near(), || format!("not near: {nd}"))?;
        Ok(Self::Fill { nd })
    }

    /// Void one voxel. `nd` must be near.
    pub fn void(nd: Difference) -> Result<Self, CommandError> {
        require(nd.is_near(), || format!("not near: {nd}"))?;
        Ok(Self::Void { nd })
    }

    /// Fusion primary. `nd` must be near.
    pub fn fusion_primary(nd: Difference) -> Result<Self, CommandError> {
        require(nd.is_near(), || format!("not near: {nd}"))?;
        Ok(Self::FusionPrimary { nd })
    }

    /// Fusion secondary. `nd` must be near.
    pub fn fusion_secondary(nd: Difference) -> Result<Self, CommandError> {
        require(nd.is_near(), || format!("not near: {nd}"))?;
        Ok(Self::FusionSecondary { nd })
    }

    /// Group fill. `nd` must be near, `fd` far.
    pub fn group_fill(nd: Difference, fd: Difference) -> Result<Self, CommandError> {
        require(nd.is_near(), || format!("not near: {nd}"))?;
        require(fd.is_far(), || format!("not far: {fd}"))?;
        Ok(Self::GroupFill { nd, fd })
    }

    /// Group void. `nd` must be near, `fd` far.
    pub fn group_void(nd: Difference, fd: Difference) -> Result<Self, CommandError> {
        require(nd.is_near(), || format!("not near: {nd}"))?;
        require(fd.is_far(), || format!("not far: {fd}"))?;
        Ok(Self::GroupVoid { nd, fd })
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Halt => write!(f, "Halt"),
            Self::Wait => write!(f, "Wait"),
            Self::Flip => write!(f, "Flip"),
            Self::SMove { lld } => write!(f, "SMove {lld}"),
            Self::LMove { sld1, sld2 } => write!(f, "LMove {sld1} {sld2}"),
            Self::Fission { nd, m } => write!(f, "Fission {nd} {m}"),
            Self::Fill { nd } => write!(f, "Fill {nd}"),
            Self::Void { nd } => write!(f, "Void {nd}"),
            Self::FusionPrimary { nd } => write!(f, "FusionP {nd}"),
            Self::FusionSecondary { nd } => write!(f, "FusionS {nd}"),
            Self::GroupFill { nd, fd } => write!(f, "GFill {nd} {fd}"),
            Self::GroupVoid { nd, fd } => write!(f, "GVoid {nd} {fd}"),
        }
    }
}
