//! Rust code generation for an [`Ir`].
//!
//! Every enum becomes one unit; every set, composite and message becomes a
//! decoder unit and an encoder unit. Units are handed to an
//! [`OutputManager`] in a fixed order: the header composite, the types in
//! declaration order, then the messages.

use tracing::{debug, info};

use crate::{
    config::GeneratorConfig,
    decomposer::{decompose_message, split_fields, split_groups, split_var_data, Decomposition},
    error::GeneratorError,
    gen_fields::Property,
    literals::literal,
    naming::{flyweight_name, format_property_name, format_type_name, unit_name},
    output::OutputManager,
    types::{HeaderStructure, Ir, PrimitiveValue, Signal, Token},
    utils::quote,
};

/// Which side of the wire a generated flyweight sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Decoder,
    Encoder,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Decoder, Role::Encoder];

    pub fn suffix(self) -> &'static str {
        match self {
            Role::Decoder => "Decoder",
            Role::Encoder => "Encoder",
        }
    }

    /// The buffer alias generated code binds against.
    pub fn buffer_type(self) -> &'static str {
        match self {
            Role::Decoder => "ReadBuf",
            Role::Encoder => "WriteBuf",
        }
    }

    fn unit_suffix(self) -> &'static str {
        match self {
            Role::Decoder => "_decoder",
            Role::Encoder => "_encoder",
        }
    }
}

/// Where a property lives. Only message and group bodies are versioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Body,
    Composite,
}

pub struct RustGenerator<'g> {
    pub(crate) ir:     &'g Ir,
    pub(crate) config: &'g GeneratorConfig,
}

impl<'g> RustGenerator<'g> {
    pub fn new(ir: &'g Ir, config: &'g GeneratorConfig) -> Self {
        RustGenerator { ir, config }
    }

    pub(crate) fn property_name(&self, name: &str) -> Result<String, GeneratorError> {
        format_property_name(name, self.config)
    }

    pub(crate) fn type_name(&self, name: &str) -> Result<String, GeneratorError> {
        format_type_name(name, self.config)
    }

    /// Lines every unit starts with.
    pub(crate) fn prelude(&self) -> Vec<String> {
        vec![
            "// Generated by brine-sbe. Do not edit.".to_string(),
            "#![allow(dead_code, unused_imports, unused_variables, unused_mut, unused_assignments, unreachable_patterns, non_camel_case_types, non_snake_case, clippy::all)]".to_string(),
            String::new(),
            "use super::*;".to_string(),
            "use core::fmt;".to_string(),
            format!(
                "use {}::{{text, ByteOrder, CharacterEncoding, CodecError, Cursor, MetaAttribute}};",
                self.config.runtime_crate
            ),
            format!("use {} as ReadBuf;", self.config.read_only_buffer),
            format!("use {} as WriteBuf;", self.config.mutable_buffer),
        ]
    }

    /// `SCHEMA_ID` and `SCHEMA_VERSION`, typed like the header fields carrying them.
    pub(crate) fn schema_consts(&self) -> Result<Vec<String>, GeneratorError> {
        let header = &self.ir.header;
        let id_type = header.schema_id_type()?;
        let version_type = header.schema_version_type()?;
        Ok(vec![
            format!(
                "    pub const SCHEMA_ID: {} = {};",
                id_type.rust_type(),
                literal(id_type, &PrimitiveValue::Int(self.ir.id as i64), HeaderStructure::SCHEMA_ID)?
            ),
            format!(
                "    pub const SCHEMA_VERSION: {} = {};",
                version_type.rust_type(),
                literal(version_type, &PrimitiveValue::UInt(self.ir.version as u64), HeaderStructure::SCHEMA_VERSION)?
            ),
        ])
    }

    /// Generates every unit of the IR and returns how many were written.
    pub fn generate(&self, out: &mut dyn OutputManager) -> Result<usize, GeneratorError> {
        let mut units = 0;

        let header = &self.ir.header.tokens;
        let header_name = self.ir.header.type_name().ok_or(GeneratorError::EmptyTokens("header"))?;
        if self.ir.get_type(header_name).is_none() {
            for role in Role::ALL {
                out.write_unit(&role_unit_name(header_name, role), &self.composite_unit(header, role)?)?;
                units += 1;
            }
        }

        for tokens in &self.ir.types {
            let begin = tokens.first().ok_or(GeneratorError::EmptyTokens("type"))?;
            let name = begin.applicable_type_name();
            debug!(name, signal = ?begin.signal, "generating type");
            match begin.signal {
                Signal::BeginEnum => {
                    out.write_unit(&unit_name(name), &self.enum_unit(tokens)?)?;
                    units += 1;
                }
                Signal::BeginSet => {
                    for role in Role::ALL {
                        out.write_unit(&role_unit_name(name, role), &self.set_unit(tokens, role)?)?;
                        units += 1;
                    }
                }
                Signal::BeginComposite => {
                    for role in Role::ALL {
                        out.write_unit(&role_unit_name(name, role), &self.composite_unit(tokens, role)?)?;
                        units += 1;
                    }
                }
                found => {
                    return Err(GeneratorError::Structure {
                        expected: Signal::BeginComposite,
                        found,
                        name: begin.name.clone(),
                    })
                }
            }
        }

        for tokens in &self.ir.messages {
            let message = tokens.first().ok_or(GeneratorError::EmptyTokens("message"))?;
            debug!(name = %message.name, template_id = message.id, "generating message");
            for role in Role::ALL {
                out.write_unit(&role_unit_name(&message.name, role), &self.message_unit(tokens, role)?)?;
                units += 1;
            }
        }

        out.finish()?;
        info!(
            package = %self.ir.package_name,
            types = self.ir.types.len(),
            messages = self.ir.messages.len(),
            units,
            "generated codecs"
        );
        Ok(units)
    }

    /// Accessors for a message or group body: fixed fields, groups, then var-data.
    pub(crate) fn body_members(
        &self,
        body: &Decomposition<'_>,
        prefix: &str,
        role: Role,
        code: &mut Vec<String>,
    ) -> Result<(), GeneratorError> {
        for layout in split_fields(body.fields)? {
            self.property(&Property::from_field(&layout)?, role, Scope::Body, code)?;
        }
        for group in split_groups(body.groups)? {
            self.group_accessor(&group, prefix, role, code)?;
        }
        for var_data in split_var_data(body.var_data)? {
            self.var_data_property(&var_data, role, code)?;
        }
        if role == Role::Decoder {
            code.extend(self.render_fields(body)?);
        }
        Ok(())
    }

    fn message_unit(&self, tokens: &[Token], role: Role) -> Result<String, GeneratorError> {
        let message = &tokens[0];
        let body = decompose_message(tokens)?;
        let prefix = flyweight_name(&message.name, "");
        let type_name = flyweight_name(&message.name, role.suffix());
        let decoder_name = flyweight_name(&message.name, Role::Decoder.suffix());
        let header = &self.ir.header;
        let block_length_type = header.block_length_type()?;
        let template_id_type = header.template_id_type()?;
        let version_type = header.schema_version_type()?.rust_type();
        let block_length = literal(
            block_length_type,
            &PrimitiveValue::UInt(message.encoded_length as u64),
            HeaderStructure::BLOCK_LENGTH,
        )?;
        let template_id = literal(template_id_type, &PrimitiveValue::Int(message.id as i64), HeaderStructure::TEMPLATE_ID)?;
        let semantic_type = message.encoding.semantic_type.as_deref().unwrap_or("");

        let mut code = self.prelude();
        code.push(String::new());
        match role {
            Role::Decoder => {
                code.push("#[derive(Debug, Clone, Copy)]".to_string());
                code.push(format!("pub struct {}<'a> {{", type_name));
                code.push("    buffer: ReadBuf<'a>,".to_string());
                code.push("    offset: usize,".to_string());
                code.push(format!("    acting_block_length: {},", block_length_type.rust_type()));
                code.push("    cursor: Cursor,".to_string());
            }
            Role::Encoder => {
                code.push("#[derive(Debug)]".to_string());
                code.push(format!("pub struct {}<'a> {{", type_name));
                code.push("    buffer: WriteBuf<'a>,".to_string());
                code.push("    offset: usize,".to_string());
                code.push("    cursor: Cursor,".to_string());
            }
        }
        code.push("}".to_string());
        code.push(String::new());

        code.push(format!("impl<'a> {}<'a> {{", type_name));
        code.push(format!("    pub const BLOCK_LENGTH: {} = {};", block_length_type.rust_type(), block_length));
        code.push(format!("    pub const TEMPLATE_ID: {} = {};", template_id_type.rust_type(), template_id));
        code.extend(self.schema_consts()?);
        code.push(format!("    pub const SEMANTIC_TYPE: &'static str = {};", quote(semantic_type)));
        code.push(String::new());

        match role {
            Role::Decoder => {
                code.push(format!(
                    "    pub fn wrap(buffer: ReadBuf<'a>, offset: usize, acting_block_length: {}, acting_version: {}) -> Self {{",
                    block_length_type.rust_type(),
                    version_type
                ));
                code.push("        Self {".to_string());
                code.push("            buffer,".to_string());
                code.push("            offset,".to_string());
                code.push("            acting_block_length,".to_string());
                code.push("            cursor: Cursor::new(offset + acting_block_length as usize, u64::from(acting_version)),".to_string());
                code.push("        }".to_string());
                code.push("    }".to_string());
                code.push(String::new());
                code.push("    pub fn buffer(&self) -> ReadBuf<'a> {".to_string());
                code.push("        self.buffer".to_string());
                code.push("    }".to_string());
            }
            Role::Encoder => {
                let header_encoder = flyweight_name(header_name(header)?, Role::Encoder.suffix());
                code.push("    pub fn wrap(buffer: WriteBuf<'a>, offset: usize) -> Self {".to_string());
                code.push("        Self {".to_string());
                code.push("            buffer,".to_string());
                code.push("            offset,".to_string());
                code.push("            cursor: Cursor::new(offset + Self::BLOCK_LENGTH as usize, u64::from(Self::SCHEMA_VERSION)),".to_string());
                code.push("        }".to_string());
                code.push("    }".to_string());
                code.push(String::new());
                code.push("    /// Writes the message header at `offset` and wraps the body right after it.".to_string());
                code.push("    pub fn wrap_and_apply_header(mut buffer: WriteBuf<'a>, offset: usize) -> Self {".to_string());
                code.push(format!("        {}::wrap(buffer.reborrow(), offset)", header_encoder));
                code.push(format!("            .set_{}(Self::BLOCK_LENGTH)", self.property_name(HeaderStructure::BLOCK_LENGTH)?));
                code.push(format!("            .set_{}(Self::TEMPLATE_ID)", self.property_name(HeaderStructure::TEMPLATE_ID)?));
                code.push(format!("            .set_{}(Self::SCHEMA_ID)", self.property_name(HeaderStructure::SCHEMA_ID)?));
                code.push(format!("            .set_{}(Self::SCHEMA_VERSION);", self.property_name(HeaderStructure::SCHEMA_VERSION)?));
                code.push(format!("        Self::wrap(buffer, offset + {}::ENCODED_LENGTH)", header_encoder));
                code.push("    }".to_string());
                code.push(String::new());
                code.push("    pub fn buffer(&mut self) -> WriteBuf<'_> {".to_string());
                code.push("        self.buffer.reborrow()".to_string());
                code.push("    }".to_string());
            }
        }

        code.push(String::new());
        code.push("    pub fn offset(&self) -> usize {".to_string());
        code.push("        self.offset".to_string());
        code.push("    }".to_string());
        if role == Role::Decoder {
            code.push(String::new());
            code.push(format!("    pub fn acting_block_length(&self) -> {} {{", block_length_type.rust_type()));
            code.push("        self.acting_block_length".to_string());
            code.push("    }".to_string());
            code.push(String::new());
            code.push("    pub fn acting_version(&self) -> u64 {".to_string());
            code.push("        self.cursor.acting_version()".to_string());
            code.push("    }".to_string());
        }
        code.push(String::new());
        code.push("    pub fn encoded_length(&self) -> usize {".to_string());
        code.push("        self.cursor.limit() - self.offset".to_string());
        code.push("    }".to_string());
        code.push(String::new());
        code.push("    pub fn limit(&self) -> usize {".to_string());
        code.push("        self.cursor.limit()".to_string());
        code.push("    }".to_string());
        code.push(String::new());
        code.push("    pub fn set_limit(&mut self, limit: usize) {".to_string());
        code.push("        self.cursor.set_limit(limit);".to_string());
        code.push("    }".to_string());

        self.body_members(&body, &prefix, role, &mut code)?;
        if role == Role::Decoder {
            code.extend(self.message_render(message));
        }
        code.push("}".to_string());

        code.push(String::new());
        code.push(format!("impl fmt::Display for {}<'_> {{", type_name));
        code.push("    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {".to_string());
        match role {
            Role::Decoder => {
                code.push("        let mut decoder = *self;".to_string());
                code.push("        decoder.render(f)".to_string());
            }
            Role::Encoder => {
                code.push(format!(
                    "        {}::wrap(self.buffer.as_read(), self.offset, Self::BLOCK_LENGTH, Self::SCHEMA_VERSION).render(f)",
                    decoder_name
                ));
            }
        }
        code.push("    }".to_string());
        code.push("}".to_string());

        code.extend(self.group_units(&body, &prefix, role)?);

        if self.config.generate_interfaces {
            code.extend(self.message_interfaces(&type_name, role));
        }
        debug!(name = %type_name, lines = code.len(), "message");
        Ok(code.join("\n"))
    }

    fn message_interfaces(&self, type_name: &str, role: Role) -> Vec<String> {
        let runtime = &self.config.runtime_crate;
        let mut code = vec![
            String::new(),
            format!("impl<'a> {}::Flyweight for {}<'a> {{", runtime, type_name),
            "    fn offset(&self) -> usize {".to_string(),
            "        self.offset".to_string(),
            "    }".to_string(),
            String::new(),
            "    fn encoded_length(&self) -> usize {".to_string(),
            "        self.cursor.limit() - self.offset".to_string(),
            "    }".to_string(),
            "}".to_string(),
            String::new(),
            format!("impl<'a> {}::MessageFlyweight for {}<'a> {{", runtime, type_name),
        ];
        for (method, constant) in [
            ("sbe_block_length", "BLOCK_LENGTH"),
            ("sbe_template_id", "TEMPLATE_ID"),
            ("sbe_schema_id", "SCHEMA_ID"),
            ("sbe_schema_version", "SCHEMA_VERSION"),
        ] {
            code.push(format!("    fn {}(&self) -> u64 {{", method));
            code.push(format!("        Self::{} as u64", constant));
            code.push("    }".to_string());
            code.push(String::new());
        }
        code.extend([
            "    fn sbe_semantic_type(&self) -> &'static str {".to_string(),
            "        Self::SEMANTIC_TYPE".to_string(),
            "    }".to_string(),
            String::new(),
            "    fn limit(&self) -> usize {".to_string(),
            "        self.cursor.limit()".to_string(),
            "    }".to_string(),
            String::new(),
            "    fn set_limit(&mut self, limit: usize) {".to_string(),
            "        self.cursor.set_limit(limit);".to_string(),
            "    }".to_string(),
            "}".to_string(),
            String::new(),
        ]);
        match role {
            Role::Decoder => code.extend([
                format!("impl<'a> {}::MessageDecoderFlyweight<ReadBuf<'a>> for {}<'a> {{", runtime, type_name),
                "    fn wrap(buffer: ReadBuf<'a>, offset: usize, acting_block_length: usize, acting_version: u64) -> Self {"
                    .to_string(),
                format!(
                    "        {}::wrap(buffer, offset, acting_block_length as _, acting_version as _)",
                    type_name
                ),
                "    }".to_string(),
                "}".to_string(),
            ]),
            Role::Encoder => code.extend([
                format!("impl<'a> {}::MessageEncoderFlyweight<WriteBuf<'a>> for {}<'a> {{", runtime, type_name),
                "    fn wrap(buffer: WriteBuf<'a>, offset: usize) -> Self {".to_string(),
                format!("        {}::wrap(buffer, offset)", type_name),
                "    }".to_string(),
                "}".to_string(),
            ]),
        }
        code
    }
}

fn header_name(header: &HeaderStructure) -> Result<&str, GeneratorError> {
    header.type_name().ok_or(GeneratorError::EmptyTokens("header"))
}

/// `car_decoder`, `engine_encoder`.
fn role_unit_name(type_name: &str, role: Role) -> String {
    format!("{}{}", unit_name(type_name), role.unit_suffix())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{self, encoding};
    use crate::output::MemoryOutput;
    use crate::types::{Encoding, PrimitiveType};

    fn order_ir() -> Ir {
        let message = builder::message(
            "Order",
            1,
            4,
            vec![
                builder::field("quantity", 1, 0, vec![encoding("quantity", 0, Encoding::new(PrimitiveType::Uint32))]),
                builder::group(
                    "fills",
                    2,
                    0,
                    2,
                    builder::group_size_encoding(),
                    vec![builder::field("price", 3, 0, vec![encoding("price", 0, Encoding::new(PrimitiveType::Int16))])],
                ),
                builder::var_data("note", 4, 0, builder::var_data_encoding(Some("UTF-8"))),
            ],
        );
        Ir::new("orders", 7, 0, builder::message_header()).with_message(message)
    }

    fn generate(ir: &Ir, config: &GeneratorConfig) -> MemoryOutput {
        let mut out = MemoryOutput::new();
        RustGenerator::new(ir, config).generate(&mut out).expect("generation failed");
        out
    }

    #[test]
    fn writes_header_and_message_units_in_order() {
        let out = generate(&order_ir(), &GeneratorConfig::default());
        let names: Vec<&str> = out.units().iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(
            names,
            vec!["message_header_decoder", "message_header_encoder", "order_decoder", "order_encoder"]
        );
    }

    #[test]
    fn header_listed_among_types_is_generated_once() {
        let ir = order_ir().with_type(builder::message_header().tokens);
        let out = generate(&ir, &GeneratorConfig::default());
        let headers = out.units().iter().filter(|(name, _)| name.starts_with("message_header")).count();
        assert_eq!(headers, 2);
    }

    #[test]
    fn message_decoder_surface() {
        let out = generate(&order_ir(), &GeneratorConfig::default());
        let code = out.get("order_decoder").expect("missing decoder");
        assert!(code.starts_with("// Generated by brine-sbe. Do not edit."));
        assert!(code.contains("    pub const BLOCK_LENGTH: u16 = 4;"));
        assert!(code.contains("    pub const TEMPLATE_ID: u16 = 1;"));
        assert!(code.contains("    pub const SCHEMA_ID: u16 = 7;"));
        assert!(code.contains("pub fn wrap(buffer: ReadBuf<'a>, offset: usize, acting_block_length: u16, acting_version: u16) -> Self {"));
        assert!(code.contains("    pub fn fills(&mut self) -> OrderFillsDecoder<'_> {"));
        assert!(code.contains("pub struct OrderFillsDecoder<'a> {"));
        assert!(code.contains("    pub fn note(&mut self) -> String {"));
        assert!(code.contains("out.write_str(\"[Order](sbeTemplateId=\")?;"));
    }

    #[test]
    fn message_encoder_applies_header() {
        let out = generate(&order_ir(), &GeneratorConfig::default());
        let code = out.get("order_encoder").expect("missing encoder");
        assert!(code.contains("        MessageHeaderEncoder::wrap(buffer.reborrow(), offset)"));
        assert!(code.contains("            .set_template_id(Self::TEMPLATE_ID)"));
        assert!(code.contains("        Self::wrap(buffer, offset + MessageHeaderEncoder::ENCODED_LENGTH)"));
        assert!(code.contains("pub fn fills_count(&mut self, count: u16) -> Result<OrderFillsEncoder<'_>, CodecError> {"));
        assert!(code.contains("pub fn set_note(&mut self, value: &str) -> Result<&mut Self, CodecError> {"));
        assert!(!code.contains("acting_version()"));
    }

    #[test]
    fn interfaces_follow_configuration() {
        let plain = generate(&order_ir(), &GeneratorConfig::default());
        assert!(!plain.get("order_decoder").unwrap().contains("MessageDecoderFlyweight"));

        let config = GeneratorConfig { generate_interfaces: true, ..GeneratorConfig::default() };
        let out = generate(&order_ir(), &config);
        let decoder = out.get("order_decoder").unwrap();
        assert!(decoder.contains("impl<'a> brine_sbe::MessageDecoderFlyweight<ReadBuf<'a>> for OrderDecoder<'a> {"));
        assert!(decoder.contains("        Self::TEMPLATE_ID as u64"));
        let encoder = out.get("order_encoder").unwrap();
        assert!(encoder.contains("impl<'a> brine_sbe::MessageEncoderFlyweight<WriteBuf<'a>> for OrderEncoder<'a> {"));
    }

    #[test]
    fn configured_buffers_are_aliased() {
        let config = GeneratorConfig {
            runtime_crate:    "crate::runtime".to_string(),
            read_only_buffer: "crate::runtime::ReadBuf".to_string(),
            mutable_buffer:   "crate::runtime::WriteBuf".to_string(),
            ..GeneratorConfig::default()
        };
        let out = generate(&order_ir(), &config);
        let code = out.get("order_encoder").unwrap();
        assert!(code.contains("use crate::runtime::{text, ByteOrder, CharacterEncoding, CodecError, Cursor, MetaAttribute};"));
        assert!(code.contains("use crate::runtime::WriteBuf as WriteBuf;"));
    }

    #[test]
    fn type_definitions_must_open_a_type() {
        let ir = order_ir().with_type(vec![encoding("stray", 0, Encoding::new(PrimitiveType::Uint8))]);
        let mut out = MemoryOutput::new();
        let result = RustGenerator::new(&ir, &GeneratorConfig::default()).generate(&mut out);
        assert!(matches!(result, Err(GeneratorError::Structure { found: Signal::Encoding, .. })));
    }
}
