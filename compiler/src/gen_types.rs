//! Enumerations, bit sets and composites: the schema's named types.

use tracing::debug;

use crate::{
    error::GeneratorError,
    gen_fields::Property,
    gen_rust::{Role, RustGenerator, Scope},
    literals::{get_expr, literal, put_stmt},
    naming::flyweight_name,
    types::{PrimitiveValue, Token},
    utils::quote,
};

/// The tokens strictly inside a Begin/End pair.
fn inner(tokens: &[Token]) -> &[Token] {
    if tokens.len() < 2 {
        &[]
    } else {
        &tokens[1..tokens.len() - 1]
    }
}

/// Splits a composite's inner tokens into one slice per member.
fn members(tokens: &[Token]) -> Vec<&[Token]> {
    let mut members = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let span = if tokens[i].signal.is_begin() {
            tokens[i].component_token_count.max(1)
        } else {
            1
        };
        let end = (i + span).min(tokens.len());
        members.push(&tokens[i..end]);
        i = end;
    }
    members
}

impl RustGenerator<'_> {
    /// `pub enum` with one variant per valid value plus `NullVal`, and
    /// `SbeUnknown` when unknown values decode to a sentinel.
    pub(crate) fn enum_unit(&self, tokens: &[Token]) -> Result<String, GeneratorError> {
        let begin = &tokens[0];
        let enum_name = self.type_name(begin.applicable_type_name())?;
        let primitive_type = begin.primitive_type()?;
        if primitive_type.is_float() {
            return Err(GeneratorError::UnsupportedPrimitive {
                name: begin.name.clone(),
                primitive_type,
            });
        }
        let ty = primitive_type.rust_type();
        let null = begin
            .encoding
            .applicable_null_value()
            .unwrap_or_else(|| primitive_type.null_value());
        let null = literal(primitive_type, &null, &begin.name)?;
        let sentinel = self.config.decode_unknown_enum_values;

        let mut values = Vec::new();
        for token in inner(tokens) {
            let value = token
                .encoding
                .const_value
                .as_ref()
                .ok_or_else(|| GeneratorError::MissingConstValue(token.name.clone()))?;
            values.push((self.type_name(&token.name)?, token.name.as_str(), literal(primitive_type, value, &token.name)?));
        }
        debug!(name = %enum_name, values = values.len(), "enum");

        let mut code = self.prelude();
        code.push(String::new());
        code.push("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]".to_string());
        code.push(format!("pub enum {} {{", enum_name));
        for (variant, _, _) in &values {
            code.push(format!("    {},", variant));
        }
        if sentinel {
            code.push("    SbeUnknown,".to_string());
        }
        code.push("    NullVal,".to_string());
        code.push("}".to_string());
        code.push(String::new());

        code.push(format!("impl {} {{", enum_name));
        code.push(format!("    pub const NULL_VALUE: {} = {};", ty, null));

        code.push(String::new());
        code.push(format!("    pub const fn value(self) -> {} {{", ty));
        code.push("        match self {".to_string());
        for (variant, _, literal) in &values {
            code.push(format!("            {}::{} => {},", enum_name, variant, literal));
        }
        if sentinel {
            code.push(format!("            {}::SbeUnknown => Self::NULL_VALUE,", enum_name));
        }
        code.push(format!("            {}::NullVal => Self::NULL_VALUE,", enum_name));
        code.push("        }".to_string());
        code.push("    }".to_string());

        code.push(String::new());
        if sentinel {
            code.push(format!("    pub fn get(value: {}) -> Self {{", ty));
            code.push("        match value {".to_string());
            for (variant, _, literal) in &values {
                code.push(format!("            {} => {}::{},", literal, enum_name, variant));
            }
            code.push(format!("            Self::NULL_VALUE => {}::NullVal,", enum_name));
            code.push(format!("            _ => {}::SbeUnknown,", enum_name));
        } else {
            code.push(format!("    pub fn get(value: {}) -> Result<Self, CodecError> {{", ty));
            code.push("        match value {".to_string());
            for (variant, _, literal) in &values {
                code.push(format!("            {} => Ok({}::{}),", literal, enum_name, variant));
            }
            code.push(format!("            Self::NULL_VALUE => Ok({}::NullVal),", enum_name));
            code.push(format!(
                "            _ => Err(CodecError::UnknownEnumValue {{ type_name: {}, value: value as i64 }}),",
                quote(&enum_name)
            ));
        }
        code.push("        }".to_string());
        code.push("    }".to_string());

        code.push(String::new());
        code.push("    pub fn as_str(self) -> &'static str {".to_string());
        code.push("        match self {".to_string());
        for (variant, schema_name, _) in &values {
            code.push(format!("            {}::{} => {},", enum_name, variant, quote(schema_name)));
        }
        if sentinel {
            code.push(format!("            {}::SbeUnknown => \"SBE_UNKNOWN\",", enum_name));
        }
        code.push(format!("            {}::NullVal => \"NULL_VAL\",", enum_name));
        code.push("        }".to_string());
        code.push("    }".to_string());
        code.push("}".to_string());
        code.push(String::new());

        code.push(format!("impl fmt::Display for {} {{", enum_name));
        code.push("    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {".to_string());
        code.push("        f.write_str(self.as_str())".to_string());
        code.push("    }".to_string());
        code.push("}".to_string());

        Ok(code.join("\n"))
    }

    /// Struct, constructor and plain accessors every buffer-bound flyweight shares.
    fn flyweight_header(&self, type_name: &str, role: Role, encoded_length: usize) -> Result<Vec<String>, GeneratorError> {
        let buffer = role.buffer_type();
        let mut code = self.prelude();
        code.push(String::new());
        code.push(match role {
            Role::Decoder => "#[derive(Debug, Clone, Copy)]".to_string(),
            Role::Encoder => "#[derive(Debug)]".to_string(),
        });
        code.push(format!("pub struct {}<'a> {{", type_name));
        code.push(format!("    buffer: {}<'a>,", buffer));
        code.push("    offset: usize,".to_string());
        code.push("}".to_string());
        code.push(String::new());

        code.push(format!("impl<'a> {}<'a> {{", type_name));
        code.push(format!("    pub const ENCODED_LENGTH: usize = {};", encoded_length));
        code.extend(self.schema_consts()?);
        code.push(String::new());
        code.push(format!("    pub fn wrap(buffer: {}<'a>, offset: usize) -> Self {{", buffer));
        code.push("        Self { buffer, offset }".to_string());
        code.push("    }".to_string());
        code.push(String::new());
        match role {
            Role::Decoder => {
                code.push("    pub fn buffer(&self) -> ReadBuf<'a> {".to_string());
                code.push("        self.buffer".to_string());
            }
            Role::Encoder => {
                code.push("    pub fn buffer(&mut self) -> WriteBuf<'_> {".to_string());
                code.push("        self.buffer.reborrow()".to_string());
            }
        }
        code.push("    }".to_string());
        code.push(String::new());
        code.push("    pub fn offset(&self) -> usize {".to_string());
        code.push("        self.offset".to_string());
        code.push("    }".to_string());
        code.push(String::new());
        code.push("    pub fn encoded_length(&self) -> usize {".to_string());
        code.push("        Self::ENCODED_LENGTH".to_string());
        code.push("    }".to_string());
        Ok(code)
    }

    /// Display for a flyweight with an inherent `render`. Encoders render
    /// through a decoder over the same bytes.
    fn flyweight_display(&self, type_name: &str, decoder_name: &str, role: Role, code: &mut Vec<String>) {
        code.push(String::new());
        code.push(format!("impl fmt::Display for {}<'_> {{", type_name));
        code.push("    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {".to_string());
        match role {
            Role::Decoder => code.push("        self.render(f)".to_string()),
            Role::Encoder => code.push(format!(
                "        {}::wrap(self.buffer.as_read(), self.offset).render(f)",
                decoder_name
            )),
        }
        code.push("    }".to_string());
        code.push("}".to_string());
    }

    pub(crate) fn set_unit(&self, tokens: &[Token], role: Role) -> Result<String, GeneratorError> {
        let begin = &tokens[0];
        let type_name = flyweight_name(begin.applicable_type_name(), role.suffix());
        let decoder_name = flyweight_name(begin.applicable_type_name(), Role::Decoder.suffix());
        let primitive_type = begin.primitive_type()?;
        if !primitive_type.is_unsigned() {
            return Err(GeneratorError::UnsupportedPrimitive {
                name: begin.name.clone(),
                primitive_type,
            });
        }
        let ty = primitive_type.rust_type();
        let bits = primitive_type.size() as u64 * 8;
        let order = begin.encoding.byte_order;

        let mut choices = Vec::new();
        for token in inner(tokens) {
            let bit = token
                .encoding
                .const_value
                .as_ref()
                .and_then(PrimitiveValue::as_i128)
                .ok_or_else(|| GeneratorError::MissingConstValue(token.name.clone()))?;
            if bit < 0 || bit as u64 >= bits {
                return Err(GeneratorError::InvalidChoiceBit {
                    name: token.name.clone(),
                    bit: bit.max(0) as u64,
                    primitive_type,
                });
            }
            choices.push((self.property_name(&token.name)?, token.name.as_str(), bit));
        }
        debug!(name = %type_name, choices = choices.len(), "bit set");

        let mut code = self.flyweight_header(&type_name, role, begin.encoded_length)?;
        code.push(String::new());
        code.push(format!("    pub fn raw_value(&self) -> {} {{", ty));
        code.push(format!("        {}", get_expr(primitive_type, "self.buffer", "self.offset", order)));
        code.push("    }".to_string());

        match role {
            Role::Decoder => {
                for (accessor, _, bit) in &choices {
                    code.push(String::new());
                    code.push(format!("    pub fn {}(&self) -> bool {{", accessor));
                    code.push(format!("        Self::test_{}(self.raw_value())", accessor));
                    code.push("    }".to_string());
                    code.push(String::new());
                    code.push(format!("    pub const fn test_{}(value: {}) -> bool {{", accessor, ty));
                    code.push(format!("        0 != (value & (1{} << {}))", ty, bit));
                    code.push("    }".to_string());
                }

                code.push(String::new());
                code.push("    pub fn render<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {".to_string());
                code.push("        out.write_char('{')?;".to_string());
                code.push("        let mut at_least_one = false;".to_string());
                for (accessor, schema_name, _) in &choices {
                    code.push(format!("        if self.{}() {{", accessor));
                    code.push("            if at_least_one {".to_string());
                    code.push("                out.write_char(',')?;".to_string());
                    code.push("            }".to_string());
                    code.push(format!("            out.write_str({})?;", quote(schema_name)));
                    code.push("            at_least_one = true;".to_string());
                    code.push("        }".to_string());
                }
                code.push("        out.write_char('}')".to_string());
                code.push("    }".to_string());
            }
            Role::Encoder => {
                code.push(String::new());
                code.push("    pub fn clear(&mut self) -> &mut Self {".to_string());
                code.push(format!("        {}", put_stmt(primitive_type, "self.buffer", "self.offset", "0", order)));
                code.push("        self".to_string());
                code.push("    }".to_string());
                for (accessor, _, bit) in &choices {
                    code.push(String::new());
                    code.push(format!("    pub fn set_{}(&mut self, value: bool) -> &mut Self {{", accessor));
                    code.push(format!("        let bits = Self::apply_{}(self.raw_value(), value);", accessor));
                    code.push(format!("        {}", put_stmt(primitive_type, "self.buffer", "self.offset", "bits", order)));
                    code.push("        self".to_string());
                    code.push("    }".to_string());
                    code.push(String::new());
                    code.push(format!("    pub const fn apply_{}(bits: {}, value: bool) -> {} {{", accessor, ty, ty));
                    code.push("        if value {".to_string());
                    code.push(format!("            bits | (1{} << {})", ty, bit));
                    code.push("        } else {".to_string());
                    code.push(format!("            bits & !(1{} << {})", ty, bit));
                    code.push("        }".to_string());
                    code.push("    }".to_string());
                }
            }
        }
        code.push("}".to_string());
        self.flyweight_display(&type_name, &decoder_name, role, &mut code);
        Ok(code.join("\n"))
    }

    pub(crate) fn composite_unit(&self, tokens: &[Token], role: Role) -> Result<String, GeneratorError> {
        let begin = &tokens[0];
        let type_name = flyweight_name(begin.applicable_type_name(), role.suffix());
        let decoder_name = flyweight_name(begin.applicable_type_name(), Role::Decoder.suffix());
        let properties = members(inner(tokens))
            .into_iter()
            .map(Property::member)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(name = %type_name, members = properties.len(), "composite");

        let mut code = self.flyweight_header(&type_name, role, begin.encoded_length)?;
        for property in &properties {
            self.property(property, role, Scope::Composite, &mut code)?;
        }
        if role == Role::Decoder {
            code.push(String::new());
            code.extend(self.composite_render(&properties)?);
        }
        code.push("}".to_string());
        self.flyweight_display(&type_name, &decoder_name, role, &mut code);

        if self.config.generate_interfaces {
            code.extend(self.composite_interfaces(&type_name, role));
        }
        Ok(code.join("\n"))
    }

    fn composite_interfaces(&self, type_name: &str, role: Role) -> Vec<String> {
        let runtime = &self.config.runtime_crate;
        let buffer = role.buffer_type();
        let flyweight_trait = match role {
            Role::Decoder => "CompositeDecoderFlyweight",
            Role::Encoder => "CompositeEncoderFlyweight",
        };
        vec![
            String::new(),
            format!("impl<'a> {}::Flyweight for {}<'a> {{", runtime, type_name),
            "    fn offset(&self) -> usize {".to_string(),
            "        self.offset".to_string(),
            "    }".to_string(),
            String::new(),
            "    fn encoded_length(&self) -> usize {".to_string(),
            "        Self::ENCODED_LENGTH".to_string(),
            "    }".to_string(),
            "}".to_string(),
            String::new(),
            format!("impl<'a> {}::{}<{}<'a>> for {}<'a> {{", runtime, flyweight_trait, buffer, type_name),
            format!("    fn wrap(buffer: {}<'a>, offset: usize) -> Self {{", buffer),
            format!("        {}::wrap(buffer, offset)", type_name),
            "    }".to_string(),
            "}".to_string(),
        ]
    }
}
