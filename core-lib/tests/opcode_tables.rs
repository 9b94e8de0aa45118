//! End-to-end checks over a complete SM83 opcode description.
use std::collections::BTreeSet;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rwgen_core::{
    generate, ClassifyError, Datum, GenError, InstructionRecord, OpcodeSpace, ReadWrite,
    RenderOptions, TableSource,
};
use serde_json::Value;

const OPCODES_JSON: &str = include_str!("../../testdata/Opcodes.json");

fn description() -> Value {
    serde_json::from_str(OPCODES_JSON).unwrap()
}

fn entry(json: &Value, space: OpcodeSpace, opcode: u8) -> &Value {
    &json[space.json_key()][format!("0x{opcode:02X}")]
}

/// Registers an operand list names, worked out independently of the classifier.
fn mentioned_registers(entry: &Value) -> BTreeSet<&'static str> {
    let mnemonic = entry["mnemonic"].as_str().unwrap();
    let branch = matches!(mnemonic, "JP" | "JR" | "CALL" | "RET");
    let mut names = BTreeSet::new();
    for operand in entry["operands"].as_array().unwrap() {
        let halves: &[&str] = match operand["name"].as_str().unwrap() {
            "A" | "AF" => &["a"],
            "B" => &["b"],
            "C" if !branch => &["c"],
            "D" => &["d"],
            "E" => &["e"],
            "H" => &["h"],
            "L" => &["l"],
            "BC" => &["b", "c"],
            "DE" => &["d", "e"],
            "HL" => &["h", "l"],
            "SP" => &["sp"],
            _ => &[],
        };
        names.extend(halves);
    }
    names
}

fn touched_registers(record: &InstructionRecord) -> BTreeSet<&'static str> {
    record
        .touched()
        .filter(|(datum, _)| !datum.is_flag())
        .map(|(datum, _)| datum.field_name())
        .collect()
}

#[test]
fn test_slot_populated_unless_illegal_or_prefix() {
    let json = description();
    let tables = generate(OPCODES_JSON).unwrap();
    for space in OpcodeSpace::ALL {
        for opcode in 0..=u8::MAX {
            let mnemonic = entry(&json, space, opcode)["mnemonic"]
                .as_str()
                .unwrap()
                .to_owned();
            let expect_empty = mnemonic.starts_with("ILLEGAL") || mnemonic == "PREFIX";
            let record = tables.table(space).get(opcode);
            assert_eq!(
                record.is_none(),
                expect_empty,
                "{space} {opcode:#04X} {mnemonic}"
            );
            if let Some(record) = record {
                assert_eq!(record.opcode, opcode);
                assert_eq!(record.mnemonic, mnemonic.to_lowercase());
            }
        }
    }
    assert_eq!(tables.unprefixed.populated().count(), 256 - 12);
    assert_eq!(tables.cbprefixed.populated().count(), 256);
}

#[test]
fn test_no_orphan_classifications() {
    let json = description();
    let tables = generate(OPCODES_JSON).unwrap();
    for space in OpcodeSpace::ALL {
        for record in tables.table(space).populated() {
            assert_eq!(
                touched_registers(record),
                mentioned_registers(entry(&json, space, record.opcode)),
                "{space} {:#04X} {}",
                record.opcode,
                record.disassembly
            );
            assert_eq!(record.datum(Datum::I), ReadWrite::Untouched);
        }
    }
}

#[test]
fn test_register_to_register_loads() {
    // Encoding order of the r8 operand field; (HL) is not a register
    const REGS: [Option<Datum>; 8] = [
        Some(Datum::B),
        Some(Datum::C),
        Some(Datum::D),
        Some(Datum::E),
        Some(Datum::H),
        Some(Datum::L),
        None,
        Some(Datum::A),
    ];
    let tables = generate(OPCODES_JSON).unwrap();
    for opcode in 0x40..=0x7Fu8 {
        let (Some(dst), Some(src)) = (
            REGS[usize::from((opcode >> 3) & 7)],
            REGS[usize::from(opcode & 7)],
        ) else {
            continue;
        };
        if dst == src {
            continue;
        }
        let record = tables.unprefixed.get(opcode).unwrap();
        assert_eq!(record.datum(dst), ReadWrite::Written, "{}", record.disassembly);
        assert_eq!(record.datum(src), ReadWrite::Read, "{}", record.disassembly);
    }
}

#[test]
fn test_conditions_read_flags() {
    let tables = generate(OPCODES_JSON).unwrap();
    for (opcode, flag) in [
        (0x20, Datum::Zero),
        (0x28, Datum::Zero),
        (0x30, Datum::Carry),
        (0x38, Datum::Carry),
        (0xC0, Datum::Zero),
        (0xCA, Datum::Zero),
        (0xD4, Datum::Carry),
        (0xDA, Datum::Carry),
    ] {
        let record = tables.unprefixed.get(opcode).unwrap();
        assert_eq!(
            record.touched().collect::<Vec<_>>(),
            vec![(flag, ReadWrite::Read)],
            "{}",
            record.disassembly
        );
    }
}

#[test]
fn test_pointer_increment_and_decrement() {
    let tables = generate(OPCODES_JSON).unwrap();
    for opcode in [0x22, 0x2A, 0x32, 0x3A] {
        let record = tables.unprefixed.get(opcode).unwrap();
        assert_eq!(record.registers.h, ReadWrite::ReadModifyWrite);
        assert_eq!(record.registers.l, ReadWrite::ReadModifyWrite);
    }
    let inc_hl = tables.unprefixed.get(0x23).unwrap();
    assert_eq!(inc_hl.registers.h, ReadWrite::Written);
    assert_eq!(inc_hl.registers.l, ReadWrite::Written);

    assert_eq!(tables.unprefixed.get(0x2A).unwrap().registers.a, ReadWrite::Written);
    assert_eq!(tables.unprefixed.get(0x32).unwrap().disassembly, "LD (HL-), A");
}

#[test]
fn test_selected_records() {
    let tables = generate(OPCODES_JSON).unwrap();

    let ld_hl_sp = tables.unprefixed.get(0xF8).unwrap();
    assert_eq!(ld_hl_sp.disassembly, "LD HL, SP+e8");
    assert_eq!(ld_hl_sp.registers.sp, ReadWrite::Read);
    assert_eq!(ld_hl_sp.flags.zero, ReadWrite::Written);
    assert_eq!(ld_hl_sp.bytes, 2);

    let ldh = tables.unprefixed.get(0xE2).unwrap();
    assert_eq!(ldh.registers.c, ReadWrite::Written);
    assert_eq!(ldh.flags.carry, ReadWrite::Untouched);

    let ret_c = tables.unprefixed.get(0xD8).unwrap();
    assert_eq!(ret_c.registers.c, ReadWrite::Untouched);
    assert_eq!(ret_c.cycles, 20);

    let pop_af = tables.unprefixed.get(0xF1).unwrap();
    assert_eq!(pop_af.registers.a, ReadWrite::Written);
    assert!(Datum::ALL
        .iter()
        .filter(|d| d.is_flag())
        .all(|&d| pop_af.datum(d) == ReadWrite::Written));

    let bit = tables.cbprefixed.get(0x7E).unwrap();
    assert_eq!(bit.mnemonic, "bit");
    assert_eq!(bit.cycles, 12);
    assert_eq!(bit.registers.h, ReadWrite::Read);
    assert_eq!(bit.flags.carry, ReadWrite::Untouched);
}

#[test]
fn test_max_operands() {
    let tables = generate(OPCODES_JSON).unwrap();
    assert_eq!(tables.max_operands, 3);
}

#[test]
fn test_generation_is_deterministic() {
    let first = generate(OPCODES_JSON).unwrap();
    let second = generate(OPCODES_JSON).unwrap();
    assert_eq!(first, second);

    let options = RenderOptions::default();
    assert_eq!(
        TableSource::new(&first, &options).to_string(),
        TableSource::new(&second, &options).to_string()
    );
}

#[test]
fn test_missing_opcode_fails() {
    let mut json = description();
    json["cbprefixed"]
        .as_object_mut()
        .unwrap()
        .remove("0xFF");
    let err = generate(&json.to_string()).unwrap_err();
    assert!(matches!(
        err,
        GenError::MissingOpcode {
            space: OpcodeSpace::CbPrefixed,
            opcode: 0xFF
        }
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_unknown_token_fails_whole_run(
        cb in any::<bool>(),
        opcode in 0u8..=0xFF,
        token in "[QUVWXY][A-Z]{0,2}",
    ) {
        let space = if cb { OpcodeSpace::CbPrefixed } else { OpcodeSpace::Unprefixed };
        let key = format!("0x{opcode:02X}");
        let mut json = description();
        let slot = &mut json[space.json_key()][key.as_str()];
        prop_assume!(!slot["mnemonic"].as_str().unwrap().starts_with("ILLEGAL"));
        prop_assume!(slot["mnemonic"] != "PREFIX");
        slot["operands"] = serde_json::json!([{ "name": token.clone(), "immediate": true }]);

        match generate(&json.to_string()) {
            Err(GenError::Classify { space: s, opcode: o, source, .. }) => {
                prop_assert_eq!(s, space);
                prop_assert_eq!(o, opcode);
                prop_assert_eq!(source, ClassifyError::UnknownOperand(token));
            }
            other => prop_assert!(false, "expected classification failure, got {:?}", other),
        }
    }
}
