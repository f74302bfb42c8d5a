//! Model file codec: resolution byte plus bit-packed voxel payload.
//!
//! Byte 0 is the resolution R (1..=250). The remaining bytes carry
//! exactly R³ bits, MSB-first within each byte, one per voxel in
//! x-major order (x, then y, then z fastest); 1 = filled. The final
//! byte is zero-padded.

use std::io::{Read, Write};

use nanovox_geom::Coordinate;
use nanovox_grid::VoxelGrid;

use crate::CodecError;

/// Maximum legal model resolution.
pub const MAX_RESOLUTION: u32 = 250;

/// Read a model file into a [`VoxelGrid`].
///
/// Grounding is tracked in one recompute after the bulk load rather
/// than per voxel.
///
/// # Errors
///
/// [`CodecError::CorruptModel`] if the resolution byte is 0 or above
/// 250, or the stream ends before R³ bits are read.
pub fn read_model(r: &mut dyn Read) -> Result<VoxelGrid, CodecError> {
    let mut resolution_byte = [0u8; 1];
    r.read_exact(&mut resolution_byte)
        .map_err(|_| CodecError::CorruptModel {
            detail: "empty model file".into(),
        })?;
    let resolution = resolution_byte[0] as u32;
    if resolution == 0 || resolution > MAX_RESOLUTION {
        return Err(CodecError::CorruptModel {
            detail: format!("invalid resolution byte: {resolution}"),
        });
    }

    let voxel_count = (resolution as usize).pow(3);
    let mut payload = vec![0u8; voxel_count.div_ceil(8)];
    r.read_exact(&mut payload)
        .map_err(|_| CodecError::CorruptModel {
            detail: format!(
                "truncated voxel payload: expected {} bytes for resolution {resolution}",
                payload.len()
            ),
        })?;

    let mut grid = VoxelGrid::new(resolution);
    grid.set_track_grounded(false);
    let n = resolution as i32;
    let mut bit = 0usize;
    for x in 0..n {
        for y in 0..n {
            for z in 0..n {
                if payload[bit / 8] & (0x80 >> (bit % 8)) != 0 {
                    // Loop ranges keep every coordinate in bounds.
                    grid.fill(Coordinate::new(x, y, z)).unwrap();
                }
                bit += 1;
            }
        }
    }
    grid.set_track_grounded(true);
    Ok(grid)
}

/// Write a [`VoxelGrid`] in model file format. Exact inverse of
/// [`read_model`].
pub fn write_model(w: &mut dyn Write, grid: &VoxelGrid) -> Result<(), CodecError> {
    let resolution = grid.resolution();
    debug_assert!(resolution >= 1 && resolution <= MAX_RESOLUTION);
    w.write_all(&[resolution as u8])?;

    let voxel_count = (resolution as usize).pow(3);
    let mut payload = vec![0u8; voxel_count.div_ceil(8)];
    let n = resolution as i32;
    let mut bit = 0usize;
    for x in 0..n {
        for y in 0..n {
            for z in 0..n {
                if grid.is_full(Coordinate::new(x, y, z)) {
                    payload[bit / 8] |= 0x80 >> (bit % 8);
                }
                bit += 1;
            }
        }
    }
    w.write_all(&payload)?;
    Ok(())
}
