//! Read/write classifications and the targets they apply to.

use std::fmt;

/// How one instruction touches one register or flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ReadWrite {
    /// Leaves the target alone
    #[default]
    Untouched,
    Read,
    Written,
    /// Read, then written back with a new value (pointer increment/decrement)
    ReadModifyWrite,
}

impl ReadWrite {
    pub const fn reads(self) -> bool {
        matches!(self, Self::Read | Self::ReadModifyWrite)
    }

    pub const fn writes(self) -> bool {
        matches!(self, Self::Written | Self::ReadModifyWrite)
    }

    pub const fn is_touched(self) -> bool {
        !matches!(self, Self::Untouched)
    }

    /// Variant name used by the downstream `ReadWrite` type in generated source.
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::Untouched => "N",
            Self::Read => "R",
            Self::Written => "W",
            Self::ReadModifyWrite => "Rmw",
        }
    }
}

impl fmt::Display for ReadWrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Untouched => "untouched",
            Self::Read => "read",
            Self::Written => "written",
            Self::ReadModifyWrite => "read-modify-write",
        };
        f.write_str(s)
    }
}

/// Every flag and register component an instruction record classifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Datum {
    Zero,
    Negative,
    HalfCarry,
    Carry,
    A,
    B,
    C,
    D,
    E,
    H,
    L,
    R,
    Ixh,
    Ixl,
    Iyh,
    Iyl,
    Sp,
    I,
}

impl Datum {
    /// All targets, in the field order of the generated records.
    pub const ALL: [Self; 18] = [
        Self::Zero,
        Self::Negative,
        Self::HalfCarry,
        Self::Carry,
        Self::A,
        Self::B,
        Self::C,
        Self::D,
        Self::E,
        Self::H,
        Self::L,
        Self::R,
        Self::Ixh,
        Self::Ixl,
        Self::Iyh,
        Self::Iyl,
        Self::Sp,
        Self::I,
    ];

    /// Field name in the generated `InstructionData` struct.
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Zero => "zero",
            Self::Negative => "negative",
            Self::HalfCarry => "half_carry",
            Self::Carry => "carry",
            Self::A => "a",
            Self::B => "b",
            Self::C => "c",
            Self::D => "d",
            Self::E => "e",
            Self::H => "h",
            Self::L => "l",
            Self::R => "r",
            Self::Ixh => "ixh",
            Self::Ixl => "ixl",
            Self::Iyh => "iyh",
            Self::Iyl => "iyl",
            Self::Sp => "sp",
            Self::I => "i",
        }
    }

    pub const fn is_flag(self) -> bool {
        matches!(
            self,
            Self::Zero | Self::Negative | Self::HalfCarry | Self::Carry
        )
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}
