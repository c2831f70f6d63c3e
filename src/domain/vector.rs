/// 2D vector: positions, sizes, and velocities in tile units.
///
/// A plain `Copy` value. `plus` and `times` always build a new vector;
/// operands are never touched.

use std::ops::{Add, Mul, Neg};

use crate::error::SimError;

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub const ZERO: Vector = Vector { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Vector { x, y }
    }

    /// Like `new`, but rejects NaN and infinite components.
    pub fn try_new(x: f64, y: f64) -> Result<Self, SimError> {
        let v = Vector { x, y };
        if v.is_finite() {
            Ok(v)
        } else {
            Err(SimError::invalid(format!("vector ({x}, {y}) has a non-finite component")))
        }
    }

    pub fn plus(self, other: Vector) -> Vector {
        Vector::new(self.x + other.x, self.y + other.y)
    }

    pub fn times(self, factor: f64) -> Vector {
        Vector::new(self.x * factor, self.y * factor)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        self.plus(rhs)
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;

    fn mul(self, rhs: f64) -> Vector {
        self.times(rhs)
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        self.times(-1.0)
    }
}
