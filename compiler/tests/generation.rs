#![cfg(test)]

use std::fs;

use brine_sbe_compiler::{
    builder::{self, encoding},
    generate, generate_to_directory, generate_to_string, load_ir,
    types::{Encoding, Ir, PrimitiveType, PrimitiveValue, Signal, Token},
    GeneratorConfig, GeneratorError, MemoryOutput,
};

fn quote_message(field_name: &str) -> Vec<Token> {
    builder::message(
        "Quote",
        7,
        8,
        vec![
            builder::field(field_name, 1, 0, vec![encoding(field_name, 0, Encoding::new(PrimitiveType::Int64))]),
            builder::var_data("venue", 2, 0, builder::var_data_encoding(Some("US-ASCII"))),
        ],
    )
}

fn quote_ir(field_name: &str) -> Ir {
    let side = builder::enumeration(
        "Side",
        0,
        Encoding::new(PrimitiveType::Uint8),
        &[("Buy", PrimitiveValue::Int(1)), ("Sell", PrimitiveValue::Int(2))],
    );
    Ir::new("quotes", 3, 2, builder::message_header())
        .with_type(side)
        .with_message(quote_message(field_name))
}

#[test]
fn units_follow_header_types_messages_order() {
    let mut out = MemoryOutput::new();
    let units = generate(&quote_ir("price"), &GeneratorConfig::default(), &mut out).unwrap();

    let names: Vec<&str> = out.units().iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(
        names,
        vec!["message_header_decoder", "message_header_encoder", "side", "quote_decoder", "quote_encoder"]
    );
    assert_eq!(units, names.len());

    let decoder = out.get("quote_decoder").unwrap();
    assert!(decoder.contains("    pub const TEMPLATE_ID: u16 = 7;"));
    assert!(decoder.contains("    pub const SCHEMA_ID: u16 = 3;"));
    assert!(decoder.contains("    pub const SCHEMA_VERSION: u16 = 2;"));
    assert!(decoder.contains("    pub fn price(&self) -> i64 {"));
    assert!(decoder.contains("    pub fn venue(&mut self) -> String {"));
}

#[test]
fn display_tolerates_bytes_outside_the_schema() {
    let side = builder::enumeration(
        "Side",
        0,
        Encoding::new(PrimitiveType::Uint8),
        &[("Buy", PrimitiveValue::Int(1)), ("Sell", PrimitiveValue::Int(2))],
    );
    let message = builder::message(
        "Tick",
        4,
        2,
        vec![
            builder::field("side", 1, 0, builder::enumeration(
                "Side",
                0,
                Encoding::new(PrimitiveType::Uint8),
                &[("Buy", PrimitiveValue::Int(1)), ("Sell", PrimitiveValue::Int(2))],
            )),
            builder::field("flag", 2, 0, vec![encoding("flag", 1, Encoding::new(PrimitiveType::Char))]),
        ],
    );
    let ir = Ir::new("ticks", 1, 0, builder::message_header()).with_type(side).with_message(message);
    let code = generate_to_string(&ir, &GeneratorConfig::default()).unwrap();

    assert!(code.contains("        match self.side() {"));
    assert!(code.contains("            Err(_) => write!(out, \"{}\", self.side_raw())?,"));
    assert!(!code.contains("fmt::Error)?)?;"));
    assert!(code.contains("        write!(out, \"{}\", self.flag() as char)?;"));
}

#[test]
fn keyword_fields_need_an_append_token() {
    let ir = quote_ir("type");
    match generate_to_string(&ir, &GeneratorConfig::default()) {
        Err(GeneratorError::ReservedWord(name)) => assert_eq!(name, "type"),
        other => panic!("expected ReservedWord, got {:?}", other.map(|code| code.len())),
    }

    let config = GeneratorConfig { keyword_append_token: Some("_".to_string()), ..GeneratorConfig::default() };
    let code = generate_to_string(&ir, &config).unwrap();
    assert!(code.contains("pub fn type_(&self) -> i64 {"));
    assert!(code.contains("pub fn set_type_(&mut self, value: i64) -> &mut Self {"));
    assert!(code.contains("pub const TYPE_ID: i32 = 1;"));
}

#[test]
fn type_definitions_must_open_a_type() {
    let mut ir = quote_ir("price");
    ir.types.push(vec![Token::new(Signal::Encoding, "stray")]);
    let mut out = MemoryOutput::new();
    assert!(matches!(
        generate(&ir, &GeneratorConfig::default(), &mut out),
        Err(GeneratorError::Structure { found: Signal::Encoding, .. })
    ));
}

#[test]
fn ir_loads_from_json() {
    let json = r#"{
        "packageName": "ping",
        "id": 9,
        "version": 0,
        "header": [
            {"signal": "BEGIN_COMPOSITE", "name": "messageHeader", "encodedLength": 8, "componentTokenCount": 6},
            {"signal": "ENCODING", "name": "blockLength", "offset": 0, "encodedLength": 2, "encoding": {"primitiveType": "uint16"}},
            {"signal": "ENCODING", "name": "templateId", "offset": 2, "encodedLength": 2, "encoding": {"primitiveType": "uint16"}},
            {"signal": "ENCODING", "name": "schemaId", "offset": 4, "encodedLength": 2, "encoding": {"primitiveType": "uint16"}},
            {"signal": "ENCODING", "name": "version", "offset": 6, "encodedLength": 2, "encoding": {"primitiveType": "uint16"}},
            {"signal": "END_COMPOSITE", "name": "messageHeader", "encodedLength": 8, "componentTokenCount": 6}
        ],
        "messages": [[
            {"signal": "BEGIN_MESSAGE", "name": "Ping", "id": 1, "encodedLength": 8, "componentTokenCount": 5},
            {"signal": "BEGIN_FIELD", "name": "sentAt", "id": 1, "encodedLength": 8, "componentTokenCount": 3, "encoding": {"primitiveType": "uint64"}},
            {"signal": "ENCODING", "name": "sentAt", "encodedLength": 8, "encoding": {"primitiveType": "uint64"}},
            {"signal": "END_FIELD", "name": "sentAt", "id": 1, "encodedLength": 8, "componentTokenCount": 3},
            {"signal": "END_MESSAGE", "name": "Ping", "id": 1, "encodedLength": 8, "componentTokenCount": 5}
        ]]
    }"#;

    let ir = load_ir(json).unwrap();
    assert_eq!(ir.package_name, "ping");
    assert_eq!(ir.messages[0].len(), 5);

    let code = generate_to_string(&ir, &GeneratorConfig::default()).unwrap();
    assert!(code.contains("pub struct PingDecoder<'a> {"));
    assert!(code.contains("        self.buffer.get_u64(self.offset, ByteOrder::LittleEndian)"));
}

#[test]
fn directory_output_matches_single_file_units() {
    let dir = std::env::temp_dir().join(format!("brine-sbe-generation-{}", std::process::id()));
    let ir = quote_ir("price");
    let config = GeneratorConfig::default();

    let units = generate_to_directory(&ir, &config, &dir).unwrap();
    assert_eq!(units, 5);
    let module = fs::read_to_string(dir.join("mod.rs")).unwrap();
    assert!(module.contains("pub mod side;\n"));
    assert!(module.contains("pub use quote_encoder::*;\n"));

    let side = fs::read_to_string(dir.join("side.rs")).unwrap();
    assert!(side.starts_with("// Generated by brine-sbe. Do not edit.\n"));
    assert!(side.contains("pub enum Side {"));
    fs::remove_dir_all(&dir).unwrap();
}
