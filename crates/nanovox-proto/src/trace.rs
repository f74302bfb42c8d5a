//! Trace file codec: 1–5 byte command encodings, concatenated to EOF.
//!
//! Encoding and decoding are exact inverses. Decoding routes every
//! operand through the validating [`Command`] constructors, so any byte
//! sequence that survives decoding is a well-formed command; everything
//! else fails with [`CodecError::MalformedTrace`].

use std::io::{Read, Write};

use nanovox_geom::{Axis, Difference};

use crate::{CodecError, Command};

// ── Wire constants ──────────────────────────────────────────────

const BYTE_HALT: u8 = 0b1111_1111;
const BYTE_WAIT: u8 = 0b1111_1110;
const BYTE_FLIP: u8 = 0b1111_1101;

const OP_GROUP_VOID: u8 = 0b000;
const OP_GROUP_FILL: u8 = 0b001;
const OP_VOID: u8 = 0b010;
const OP_FILL: u8 = 0b011;
const OP_FISSION: u8 = 0b101;
const OP_FUSION_S: u8 = 0b110;
const OP_FUSION_P: u8 = 0b111;

/// Near-difference wire index: `9(dx+1) + 3(dy+1) + (dz+1)`.
fn encode_nd(nd: Difference) -> u8 {
    (9 * (nd.dx + 1) + 3 * (nd.dy + 1) + (nd.dz + 1)) as u8
}

fn decode_nd(bits: u8) -> Result<Difference, CodecError> {
    if bits > 26 {
        return Err(CodecError::MalformedTrace {
            detail: format!("near-difference index out of range: {bits}"),
        });
    }
    let i = bits as i32;
    let nd = Difference::new(i / 9 - 1, (i / 3) % 3 - 1, i % 3 - 1);
    if !nd.is_near() {
        return Err(CodecError::MalformedTrace {
            detail: format!("not a near difference: {nd}"),
        });
    }
    Ok(nd)
}

fn linear(axis: Axis, delta: i32) -> Difference {
    match axis {
        Axis::X => Difference::of_x(delta),
        Axis::Y => Difference::of_y(delta),
        Axis::Z => Difference::of_z(delta),
    }
}

// ── Primitive readers ───────────────────────────────────────────

/// Read one byte, distinguishing clean EOF (`Ok(None)`) from I/O error.
fn read_first_byte(r: &mut dyn Read) -> Result<Option<u8>, CodecError> {
    let mut buf = [0u8; 1];
    loop {
        match r.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CodecError::Io(e)),
        }
    }
}

/// Read a required operand byte; EOF here means a truncated command.
fn read_operand_byte(r: &mut dyn Read, what: &str) -> Result<u8, CodecError> {
    match read_first_byte(r)? {
        Some(b) => Ok(b),
        None => Err(CodecError::MalformedTrace {
            detail: format!("truncated command: missing {what}"),
        }),
    }
}

// ── Command encode/decode ───────────────────────────────────────

/// Encode one command in its wire form.
pub fn encode_command(w: &mut dyn Write, cmd: &Command) -> Result<(), CodecError> {
    match *cmd {
        Command::Halt => w.write_all(&[BYTE_HALT])?,
        Command::Wait => w.write_all(&[BYTE_WAIT])?,
        Command::Flip => w.write_all(&[BYTE_FLIP])?,
        Command::SMove { lld } => {
            let axis = lld.axis().expect("SMove operand is linear").to_wire();
            w.write_all(&[(axis << 4) | 0b0100, (lld.delta() + 15) as u8])?;
        }
        Command::LMove { sld1, sld2 } => {
            let a1 = sld1.axis().expect("LMove operand is linear").to_wire();
            let a2 = sld2.axis().expect("LMove operand is linear").to_wire();
            let deltas = ((sld1.delta() + 5) | ((sld2.delta() + 5) << 4)) as u8;
            w.write_all(&[(a1 << 4) | (a2 << 6) | 0b1100, deltas])?;
        }
        Command::Fission { nd, m } => {
            w.write_all(&[(encode_nd(nd) << 3) | OP_FISSION, m])?;
        }
        Command::Fill { nd } => w.write_all(&[(encode_nd(nd) << 3) | OP_FILL])?,
        Command::Void { nd } => w.write_all(&[(encode_nd(nd) << 3) | OP_VOID])?,
        Command::FusionPrimary { nd } => w.write_all(&[(encode_nd(nd) << 3) | OP_FUSION_P])?,
        Command::FusionSecondary { nd } => w.write_all(&[(encode_nd(nd) << 3) | OP_FUSION_S])?,
        Command::GroupFill { nd, fd } => {
            w.write_all(&[
                (encode_nd(nd) << 3) | OP_GROUP_FILL,
                (fd.dx + 30) as u8,
                (fd.dy + 30) as u8,
                (fd.dz + 30) as u8,
            ])?;
        }
        Command::GroupVoid { nd, fd } => {
            w.write_all(&[
                (encode_nd(nd) << 3) | OP_GROUP_VOID,
                (fd.dx + 30) as u8,
                (fd.dy + 30) as u8,
                (fd.dz + 30) as u8,
            ])?;
        }
    }
    Ok(())
}

/// Decode one command from the stream.
///
/// Returns `Ok(None)` on clean EOF (no bytes available). A byte pattern
/// matching no command, an invalid operand, or EOF inside a multi-byte
/// command fails with [`CodecError::MalformedTrace`].
pub fn decode_command(r: &mut dyn Read) -> Result<Option<Command>, CodecError> {
    let b = match read_first_byte(r)? {
        Some(b) => b,
        None => return Ok(None),
    };

    let cmd = match b {
        BYTE_HALT => Command::Halt,
        BYTE_WAIT => Command::Wait,
        BYTE_FLIP => Command::Flip,
        _ if b & 0b1100_1111 == 0b0000_0100 => {
            let axis = Axis::from_wire((b >> 4) & 0b11).ok_or_else(|| {
                CodecError::MalformedTrace {
                    detail: format!("invalid SMove axis in byte {b:#010b}"),
                }
            })?;
            let delta = read_operand_byte(r, "SMove delta")? as i32 - 15;
            Command::smove(linear(axis, delta))?
        }
        _ if b & 0b1111 == 0b1100 => {
            let axis1 = Axis::from_wire((b >> 4) & 0b11).ok_or_else(|| {
                CodecError::MalformedTrace {
                    detail: format!("invalid LMove axis in byte {b:#010b}"),
                }
            })?;
            let axis2 = Axis::from_wire((b >> 6) & 0b11).ok_or_else(|| {
                CodecError::MalformedTrace {
                    detail: format!("invalid LMove axis in byte {b:#010b}"),
                }
            })?;
            let deltas = read_operand_byte(r, "LMove deltas")?;
            let d1 = (deltas & 0b1111) as i32 - 5;
            let d2 = (deltas >> 4) as i32 - 5;
            Command::lmove(linear(axis1, d1), linear(axis2, d2))?
        }
        _ => {
            let nd_bits = b >> 3;
            match b & 0b111 {
                OP_GROUP_VOID | OP_GROUP_FILL => {
                    let nd = decode_nd(nd_bits)?;
                    let fd = Difference::new(
                        read_operand_byte(r, "far dx")? as i32 - 30,
                        read_operand_byte(r, "far dy")? as i32 - 30,
                        read_operand_byte(r, "far dz")? as i32 - 30,
                    );
                    if b & 0b111 == OP_GROUP_FILL {
                        Command::group_fill(nd, fd)?
                    } else {
                        Command::group_void(nd, fd)?
                    }
                }
                OP_VOID => Command::void(decode_nd(nd_bits)?)?,
                OP_FILL => Command::fill(decode_nd(nd_bits)?)?,
                OP_FISSION => {
                    let nd = decode_nd(nd_bits)?;
                    let m = read_operand_byte(r, "Fission seed count")?;
                    Command::fission(nd, m)?
                }
                OP_FUSION_S => Command::fusion_secondary(decode_nd(nd_bits)?)?,
                OP_FUSION_P => Command::fusion_primary(decode_nd(nd_bits)?)?,
                _ => {
                    return Err(CodecError::MalformedTrace {
                        detail: format!("unknown command byte {b:#010b}"),
                    })
                }
            }
        }
    };
    Ok(Some(cmd))
}

// ── Trace files ─────────────────────────────────────────────────

/// Read a whole trace: commands until clean EOF.
pub fn read_trace(r: &mut dyn Read) -> Result<Vec<Command>, CodecError> {
    let mut trace = Vec::new();
    while let Some(cmd) = decode_command(r)? {
        trace.push(cmd);
    }
    Ok(trace)
}

/// Write a whole trace as the concatenation of command encodings.
pub fn write_trace<'a, I>(w: &mut dyn Write, trace: I) -> Result<(), CodecError>
where
    I: IntoIterator<Item = &'a Command>,
{
    for cmd in trace {
        encode_command(w, cmd)?;
    }
    Ok(())
}
