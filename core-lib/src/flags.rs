//! Status flag classification.
//!
//! The opcode description marks each of the four SM83 flags with `-` when the
//! instruction leaves it alone, or with `0`, `1` or the flag's own letter when
//! the instruction resets, sets or computes it. This module never produces
//! [`ReadWrite::Read`]; conditional operands upgrade flags to read later on.

use std::fmt;

use crate::access::ReadWrite;
use crate::description::FlagMarkers;
use crate::error::ClassifyError;

/// The four SM83 status flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    Zero,
    Negative,
    HalfCarry,
    Carry,
}

impl Flag {
    /// Letter used for the flag in the opcode description.
    pub const fn letter(self) -> char {
        match self {
            Self::Zero => 'Z',
            Self::Negative => 'N',
            Self::HalfCarry => 'H',
            Self::Carry => 'C',
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Classification of all four flags for one instruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FlagAccess {
    pub zero: ReadWrite,
    pub negative: ReadWrite,
    pub half_carry: ReadWrite,
    pub carry: ReadWrite,
}

impl FlagAccess {
    /// Classifies every flag marker of one opcode description.
    pub fn from_markers(markers: &FlagMarkers) -> Result<Self, ClassifyError> {
        Ok(Self {
            zero: classify_flag(Flag::Zero, &markers.zero)?,
            negative: classify_flag(Flag::Negative, &markers.negative)?,
            half_carry: classify_flag(Flag::HalfCarry, &markers.half_carry)?,
            carry: classify_flag(Flag::Carry, &markers.carry)?,
        })
    }

    pub fn get_mut(&mut self, flag: Flag) -> &mut ReadWrite {
        match flag {
            Flag::Zero => &mut self.zero,
            Flag::Negative => &mut self.negative,
            Flag::HalfCarry => &mut self.half_carry,
            Flag::Carry => &mut self.carry,
        }
    }

    /// Marks a flag as tested by a condition operand.
    ///
    /// Only an untouched flag is upgraded: no instruction both tests and
    /// computes the same flag, so a written flag keeps its classification.
    pub fn mark_tested(&mut self, flag: Flag) {
        let rw = self.get_mut(flag);
        if *rw == ReadWrite::Untouched {
            *rw = ReadWrite::Read;
        }
    }
}

/// Converts one flag-effect marker into a classification.
pub fn classify_flag(flag: Flag, marker: &str) -> Result<ReadWrite, ClassifyError> {
    let mut chars = marker.chars();
    match (chars.next(), chars.next()) {
        (Some('-'), None) => Ok(ReadWrite::Untouched),
        (Some('0' | '1'), None) => Ok(ReadWrite::Written),
        (Some(c), None) if c == flag.letter() => Ok(ReadWrite::Written),
        _ => Err(ClassifyError::UnknownFlagMarker {
            flag,
            marker: marker.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(Flag::Zero, "-", ReadWrite::Untouched)]
    #[test_case(Flag::Zero, "Z", ReadWrite::Written)]
    #[test_case(Flag::Negative, "0", ReadWrite::Written)]
    #[test_case(Flag::HalfCarry, "1", ReadWrite::Written)]
    #[test_case(Flag::HalfCarry, "H", ReadWrite::Written)]
    #[test_case(Flag::Carry, "C", ReadWrite::Written)]
    fn test_valid_markers(flag: Flag, marker: &str, expected: ReadWrite) {
        assert_eq!(classify_flag(flag, marker), Ok(expected));
    }

    #[test_case(Flag::Zero, "C")]
    #[test_case(Flag::Carry, "")]
    #[test_case(Flag::Negative, "--")]
    #[test_case(Flag::HalfCarry, "h")]
    fn test_invalid_markers(flag: Flag, marker: &str) {
        assert_eq!(
            classify_flag(flag, marker),
            Err(ClassifyError::UnknownFlagMarker {
                flag,
                marker: marker.to_owned(),
            })
        );
    }

    #[test]
    fn test_mark_tested_upgrades_only_untouched() {
        let mut flags = FlagAccess {
            carry: ReadWrite::Written,
            ..FlagAccess::default()
        };
        flags.mark_tested(Flag::Zero);
        flags.mark_tested(Flag::Carry);
        assert_eq!(flags.zero, ReadWrite::Read);
        assert_eq!(flags.carry, ReadWrite::Written);
    }
}
