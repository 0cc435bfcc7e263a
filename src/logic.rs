use crate::error::{TbError, TbResult};
use std::fmt;

/// A single bit as seen at the device boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logic {
    Zero,
    One,
    X,
}

impl Logic {
    pub fn is_known(self) -> bool {
        !matches!(self, Logic::X)
    }

    pub fn toggled(self) -> Self {
        match self {
            Logic::Zero => Logic::One,
            Logic::One => Logic::Zero,
            Logic::X => Logic::X,
        }
    }

    fn as_char(self) -> char {
        match self {
            Logic::Zero => '0',
            Logic::One => '1',
            Logic::X => 'x',
        }
    }
}

impl From<bool> for Logic {
    fn from(b: bool) -> Self {
        if b {
            Logic::One
        } else {
            Logic::Zero
        }
    }
}

/// An 8 bit vector where every bit is 0, 1 or unknown.
///
/// Stored as a value/mask pair: a set bit in `unknown` marks the bit as X and the
/// corresponding bit in `value` is kept at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LogicVec {
    value: u8,
    unknown: u8,
}

impl LogicVec {
    pub const WIDTH: u8 = 8;

    pub const fn known(value: u8) -> Self {
        Self { value, unknown: 0 }
    }

    pub const fn unknown() -> Self {
        Self {
            value: 0,
            unknown: 0xFF,
        }
    }

    pub fn is_known(&self) -> bool {
        self.unknown == 0
    }

    pub fn known_value(&self) -> Option<u8> {
        self.is_known().then_some(self.value)
    }

    /// Two-state view of the vector. Any unknown bit makes this an error naming `pin`.
    pub fn resolve(self, pin: &'static str) -> TbResult<u8> {
        self.known_value()
            .ok_or(TbError::Unresolved { pin, value: self })
    }

    pub fn bit(&self, n: u8) -> Logic {
        debug_assert!(n < Self::WIDTH);
        if self.unknown >> n & 1 == 1 {
            Logic::X
        } else {
            Logic::from(self.value >> n & 1 == 1)
        }
    }

    #[must_use]
    pub fn with_bit(self, n: u8, b: Logic) -> Self {
        debug_assert!(n < Self::WIDTH);
        let m = 1u8 << n;
        let (value, unknown) = match b {
            Logic::Zero => (self.value & !m, self.unknown & !m),
            Logic::One => (self.value | m, self.unknown & !m),
            Logic::X => (self.value & !m, self.unknown | m),
        };
        Self { value, unknown }
    }

    /// Same bit replicated over bits `0..n`, the remaining bits 0.
    pub fn replicate(b: Logic, n: u8) -> Self {
        (0..n).fold(Self::known(0), |v, i| v.with_bit(i, b))
    }
}

impl Default for LogicVec {
    fn default() -> Self {
        Self::unknown()
    }
}

impl From<u8> for LogicVec {
    fn from(v: u8) -> Self {
        Self::known(v)
    }
}

impl fmt::Display for LogicVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0b")?;
        for n in (0..Self::WIDTH).rev() {
            write!(f, "{}", self.bit(n).as_char())?;
        }
        Ok(())
    }
}
