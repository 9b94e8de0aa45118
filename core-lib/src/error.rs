use thiserror::Error;

use crate::description::OpcodeSpace;
use crate::flags::Flag;

/// Errors raised while classifying a single opcode description
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("unrecognised operand token: {0:?}")]
    UnknownOperand(String),
    #[error("unrecognised marker {marker:?} for flag {flag}")]
    UnknownFlagMarker { flag: Flag, marker: String },
    #[error("cycle count list is empty")]
    NoCycleCount,
}

/// Errors that abort table generation
#[derive(Debug, Error)]
pub enum GenError {
    #[error("{space} opcode {opcode:#04X} ({mnemonic}): {source}")]
    Classify {
        space: OpcodeSpace,
        opcode: u8,
        mnemonic: String,
        #[source]
        source: ClassifyError,
    },
    #[error("no description for {space} opcode {opcode:#04X}")]
    MissingOpcode { space: OpcodeSpace, opcode: u8 },
    #[error("invalid {space} opcode key: {key:?}")]
    InvalidOpcodeKey { space: OpcodeSpace, key: String },
    #[error("{space} opcode {opcode:#04X} is described more than once")]
    DuplicateOpcode { space: OpcodeSpace, opcode: u8 },
    #[error("malformed opcode description: {0}")]
    Json(#[from] serde_json::Error),
}
