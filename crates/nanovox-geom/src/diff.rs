//! Coordinate displacements and their protocol classification.

use crate::Coordinate;
use std::fmt;

/// A coordinate axis, carrying its wire encoding value.
///
/// The trace format encodes linear-move axes as 2-bit fields with
/// `x = 1`, `y = 2`, `z = 3` (0 is invalid).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// The x axis (wire value 1).
    X = 1,
    /// The y axis (wire value 2).
    Y = 2,
    /// The z axis (wire value 3).
    Z = 3,
}

impl Axis {
    /// Decode a 2-bit wire value. Returns `None` for 0 or values above 3.
    pub fn from_wire(v: u8) -> Option<Axis> {
        match v {
            1 => Some(Axis::X),
            2 => Some(Axis::Y),
            3 => Some(Axis::Z),
            _ => None,
        }
    }

    /// The wire encoding value (1, 2, or 3).
    pub fn to_wire(self) -> u8 {
        self as u8
    }
}

/// A displacement between two coordinates, not bound to any grid.
///
/// The protocol admits a displacement as a command argument only when it
/// satisfies the required classification: linear moves for `SMove`/`LMove`,
/// near differences for single-voxel operations, far differences for the
/// second operand of group operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Difference {
    /// X component.
    pub dx: i32,
    /// Y component.
    pub dy: i32,
    /// Z component.
    pub dz: i32,
}

impl Difference {
    /// Create a displacement from its components.
    pub const fn new(dx: i32, dy: i32, dz: i32) -> Self {
        Self { dx, dy, dz }
    }

    /// A displacement along x only.
    pub const fn of_x(dx: i32) -> Self {
        Self::new(dx, 0, 0)
    }

    /// A displacement along y only.
    pub const fn of_y(dy: i32) -> Self {
        Self::new(0, dy, 0)
    }

    /// A displacement along z only.
    pub const fn of_z(dz: i32) -> Self {
        Self::new(0, 0, dz)
    }

    /// The displacement from `from` to `to`.
    pub fn between(from: Coordinate, to: Coordinate) -> Self {
        Self::new(to.x - from.x, to.y - from.y, to.z - from.z)
    }

    /// Whether all components are zero.
    pub fn is_zero(self) -> bool {
        self.dx == 0 && self.dy == 0 && self.dz == 0
    }

    /// Manhattan length: `|dx| + |dy| + |dz|`.
    pub fn mlen(self) -> i32 {
        self.dx.abs() + self.dy.abs() + self.dz.abs()
    }

    /// Chebyshev (chessboard) length: `max(|dx|, |dy|, |dz|)`.
    pub fn clen(self) -> i32 {
        self.dx.abs().max(self.dy.abs()).max(self.dz.abs())
    }

    /// Whether exactly one axis is nonzero.
    pub fn is_linear(self) -> bool {
        (self.dx != 0 && self.dy == 0 && self.dz == 0)
            || (self.dx == 0 && self.dy != 0 && self.dz == 0)
            || (self.dx == 0 && self.dy == 0 && self.dz != 0)
    }

    /// Linear with Manhattan length at most 5 (`LMove` operand).
    pub fn is_short_linear(self) -> bool {
        self.is_linear() && self.mlen() <= 5
    }

    /// Linear with Manhattan length at most 15 (`SMove` operand).
    pub fn is_long_linear(self) -> bool {
        self.is_linear() && self.mlen() <= 15
    }

    /// A near difference: `0 < mlen ≤ 2` and `clen == 1`.
    ///
    /// These are the 18 face and edge neighbors of a voxel; corner
    /// diagonals and the zero displacement are excluded.
    pub fn is_near(self) -> bool {
        let m = self.mlen();
        0 < m && m <= 2 && self.clen() == 1
    }

    /// A far difference: `0 < clen ≤ 30` (group-command second operand).
    ///
    /// Bounded by the wire format, which carries each component biased
    /// by 30 in a single byte.
    pub fn is_far(self) -> bool {
        let c = self.clen();
        0 < c && c <= 30
    }

    /// The axis of a linear displacement, or `None` if not linear.
    pub fn axis(self) -> Option<Axis> {
        if !self.is_linear() {
            return None;
        }
        if self.dx != 0 {
            Some(Axis::X)
        } else if self.dy != 0 {
            Some(Axis::Y)
        } else {
            Some(Axis::Z)
        }
    }

    /// The signed magnitude of a linear displacement along its axis.
    ///
    /// Zero for the zero displacement; meaningless for non-linear input
    /// (returns the first nonzero component).
    pub fn delta(self) -> i32 {
        if self.dx != 0 {
            self.dx
        } else if self.dy != 0 {
            self.dy
        } else {
            self.dz
        }
    }
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}, {}, {}>", self.dx, self.dy, self.dz)
    }
}
