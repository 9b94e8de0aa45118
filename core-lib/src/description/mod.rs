//! Serde model of the `Opcodes.json` opcode description.
//!
//! The description is produced outside this crate and is trusted to be
//! internally consistent; this module only checks that every opcode key is a
//! byte and that each byte is described once.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::error::GenError;

/// One of the two 256-entry opcode spaces the decoder dispatches into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OpcodeSpace {
    Unprefixed,
    CbPrefixed,
}

impl OpcodeSpace {
    /// Both spaces, in emission order.
    pub const ALL: [Self; 2] = [Self::Unprefixed, Self::CbPrefixed];

    /// Key of the space in the JSON description.
    pub const fn json_key(self) -> &'static str {
        match self {
            Self::Unprefixed => "unprefixed",
            Self::CbPrefixed => "cbprefixed",
        }
    }

    /// Name of the generated table constant.
    pub const fn const_name(self) -> &'static str {
        match self {
            Self::Unprefixed => "UNPREFIXED",
            Self::CbPrefixed => "CBPREFIXED",
        }
    }
}

impl fmt::Display for OpcodeSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.json_key())
    }
}

/// Flag-effect markers, one per status flag.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FlagMarkers {
    #[serde(rename = "Z")]
    pub zero: String,
    #[serde(rename = "N")]
    pub negative: String,
    #[serde(rename = "H")]
    pub half_carry: String,
    #[serde(rename = "C")]
    pub carry: String,
}

impl FlagMarkers {
    /// Markers for an instruction that leaves every flag alone.
    pub fn unaffected() -> Self {
        Self {
            zero: "-".into(),
            negative: "-".into(),
            half_carry: "-".into(),
            carry: "-".into(),
        }
    }
}

/// One operand of an opcode.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OperandDescriptor {
    pub name: String,
    /// `false` when the operand is a memory reference through `name`.
    pub immediate: bool,
    #[serde(default)]
    pub bytes: Option<u8>,
    #[serde(default)]
    pub increment: bool,
    #[serde(default)]
    pub decrement: bool,
}

impl OperandDescriptor {
    pub fn register(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            immediate: true,
            bytes: None,
            increment: false,
            decrement: false,
        }
    }

    pub fn memory(name: &str) -> Self {
        Self {
            immediate: false,
            ..Self::register(name)
        }
    }

    /// Whether the operand post-increments or post-decrements its pointer.
    pub const fn steps_pointer(&self) -> bool {
        self.increment || self.decrement
    }

    /// Operand as it appears in disassembly, e.g. `(HL+)` or `n8`.
    pub fn disassembly(&self) -> String {
        let step = if self.increment {
            "+"
        } else if self.decrement {
            "-"
        } else {
            ""
        };
        if self.immediate {
            format!("{}{step}", self.name)
        } else {
            format!("({}{step})", self.name)
        }
    }
}

/// Description of one opcode in one space.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OpcodeDescription {
    pub mnemonic: String,
    pub bytes: u8,
    pub cycles: Vec<u32>,
    #[serde(default)]
    pub operands: Vec<OperandDescriptor>,
    #[serde(default)]
    pub immediate: bool,
    pub flags: FlagMarkers,
}

#[derive(Deserialize)]
struct RawDescription {
    #[serde(deserialize_with = "map_entries")]
    unprefixed: Vec<(String, OpcodeDescription)>,
    #[serde(deserialize_with = "map_entries")]
    cbprefixed: Vec<(String, OpcodeDescription)>,
}

/// Keeps every entry of a JSON object, repeated keys included, so that
/// duplicates reach [`index_space`] instead of being merged.
fn map_entries<'de, D, V>(deserializer: D) -> Result<Vec<(String, V)>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    struct EntriesVisitor<V>(PhantomData<V>);

    impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
        type Value = Vec<(String, V)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of opcode keys to opcode descriptions")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor(PhantomData))
}

/// Both opcode spaces of a description, indexed by opcode byte.
#[derive(Debug, Clone, Default)]
pub struct OpcodeSet {
    unprefixed: BTreeMap<u8, OpcodeDescription>,
    cbprefixed: BTreeMap<u8, OpcodeDescription>,
}

impl OpcodeSet {
    /// Parses the JSON text of an opcode description.
    pub fn from_json(text: &str) -> Result<Self, GenError> {
        let raw: RawDescription = serde_json::from_str(text)?;
        let set = Self {
            unprefixed: index_space(OpcodeSpace::Unprefixed, raw.unprefixed)?,
            cbprefixed: index_space(OpcodeSpace::CbPrefixed, raw.cbprefixed)?,
        };
        debug!(
            unprefixed = set.unprefixed.len(),
            cbprefixed = set.cbprefixed.len(),
            "Loaded opcode description"
        );
        Ok(set)
    }

    /// Adds or replaces a description.
    pub fn insert(&mut self, space: OpcodeSpace, opcode: u8, description: OpcodeDescription) {
        self.space_mut(space).insert(opcode, description);
    }

    /// Description of `opcode` in `space`; absence is fatal.
    pub fn lookup(&self, space: OpcodeSpace, opcode: u8) -> Result<&OpcodeDescription, GenError> {
        self.space(space)
            .get(&opcode)
            .ok_or(GenError::MissingOpcode { space, opcode })
    }

    /// Longest operand list in `space`, illegal opcodes included.
    pub fn max_operands(&self, space: OpcodeSpace) -> usize {
        self.space(space)
            .values()
            .map(|d| d.operands.len())
            .max()
            .unwrap_or(0)
    }

    pub fn len(&self, space: OpcodeSpace) -> usize {
        self.space(space).len()
    }

    const fn space(&self, space: OpcodeSpace) -> &BTreeMap<u8, OpcodeDescription> {
        match space {
            OpcodeSpace::Unprefixed => &self.unprefixed,
            OpcodeSpace::CbPrefixed => &self.cbprefixed,
        }
    }

    fn space_mut(&mut self, space: OpcodeSpace) -> &mut BTreeMap<u8, OpcodeDescription> {
        match space {
            OpcodeSpace::Unprefixed => &mut self.unprefixed,
            OpcodeSpace::CbPrefixed => &mut self.cbprefixed,
        }
    }
}

fn index_space(
    space: OpcodeSpace,
    raw: Vec<(String, OpcodeDescription)>,
) -> Result<BTreeMap<u8, OpcodeDescription>, GenError> {
    let mut indexed = BTreeMap::new();
    for (key, description) in raw {
        let opcode = parse_opcode_key(&key).ok_or_else(|| GenError::InvalidOpcodeKey {
            space,
            key: key.clone(),
        })?;
        if indexed.insert(opcode, description).is_some() {
            return Err(GenError::DuplicateOpcode { space, opcode });
        }
    }
    Ok(indexed)
}

/// Parses keys of the form `0x3E` (either case of prefix and digits).
fn parse_opcode_key(key: &str) -> Option<u8> {
    let digits = key.strip_prefix("0x").or_else(|| key.strip_prefix("0X"))?;
    if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u8::from_str_radix(digits, 16).ok()
}
