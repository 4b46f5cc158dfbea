//! Length-prefixed trailing fields.

use crate::{
    decomposer::VarDataLayout,
    error::GeneratorError,
    gen_fields::{character_encoding, character_encoding_path, meta_attribute_fn, push_guard},
    gen_rust::{Role, RustGenerator},
    literals::{get_expr, put_stmt},
    naming::to_upper_snake_case,
    utils::quote,
};

impl RustGenerator<'_> {
    pub(crate) fn var_data_property(
        &self,
        var_data: &VarDataLayout<'_>,
        role: Role,
        code: &mut Vec<String>,
    ) -> Result<(), GeneratorError> {
        let token = var_data.token;
        let name = &token.name;
        let accessor = self.property_name(name)?;
        let upper = to_upper_snake_case(name);
        let since = token.version;
        let guarded = role == Role::Decoder && since > 0;

        let length_type = var_data.length.primitive_type()?;
        if length_type.is_float() {
            return Err(GeneratorError::UnsupportedPrimitive {
                name: var_data.length.name.clone(),
                primitive_type: length_type,
            });
        }
        let order = var_data.length.encoding.byte_order;
        let max_length = var_data
            .length
            .encoding
            .applicable_max_value()
            .and_then(|value| value.as_i128())
            .unwrap_or(0)
            .max(0) as u64;
        let text = match var_data.data.encoding.character_encoding {
            Some(_) => Some(character_encoding(var_data.data)?),
            None => None,
        };

        code.push(String::new());
        code.push(format!("    pub const {}_ID: i32 = {};", upper, token.id));
        code.push(format!("    pub const {}_SINCE_VERSION: u32 = {};", upper, since));
        code.push(format!("    pub const {}_HEADER_LENGTH: usize = {};", upper, var_data.length.encoded_length));
        code.push(format!("    pub const {}_MAX_LENGTH: usize = {};", upper, max_length));
        if let Some(encoding) = text {
            code.push(format!(
                "    pub const {}_CHARACTER_ENCODING: CharacterEncoding = {};",
                upper,
                character_encoding_path(encoding)
            ));
        }
        code.extend(meta_attribute_fn(&accessor, var_data.data));

        match role {
            Role::Decoder => {
                code.push(String::new());
                code.push(format!("    pub fn {}_length(&self) -> usize {{", accessor));
                if guarded {
                    push_guard(code, since, "0");
                }
                code.push("        let limit = self.cursor.limit();".to_string());
                code.push(format!("        {} as usize", get_expr(length_type, "self.buffer", "limit", order)));
                code.push("    }".to_string());

                code.push(String::new());
                code.push("    /// Steps the limit past the value and returns its length.".to_string());
                code.push(format!("    pub fn skip_{}(&mut self) -> usize {{", accessor));
                if guarded {
                    push_guard(code, since, "0");
                }
                code.push(format!("        let length = self.{}_length();", accessor));
                code.push("        let limit = self.cursor.limit();".to_string());
                code.push(format!("        self.cursor.set_limit(limit + Self::{}_HEADER_LENGTH + length);", upper));
                code.push("        length".to_string());
                code.push("    }".to_string());

                code.push(String::new());
                code.push("    /// The value's bytes, borrowed from the buffer.".to_string());
                code.push(format!("    pub fn {}_bytes(&mut self) -> &'a [u8] {{", accessor));
                if guarded {
                    push_guard(code, since, "&[]");
                }
                code.push(format!("        let length = self.{}_length();", accessor));
                code.push("        let limit = self.cursor.limit();".to_string());
                code.push(format!("        self.cursor.set_limit(limit + Self::{}_HEADER_LENGTH + length);", upper));
                code.push(format!("        self.buffer.slice(limit + Self::{}_HEADER_LENGTH, length)", upper));
                code.push("    }".to_string());

                code.push(String::new());
                code.push("    /// Copies up to `dst.len()` bytes and steps past the whole value.".to_string());
                code.push(format!("    pub fn get_{}(&mut self, dst: &mut [u8]) -> usize {{", accessor));
                code.push(format!("        let bytes = self.{}_bytes();", accessor));
                code.push("        let length = bytes.len().min(dst.len());".to_string());
                code.push("        dst[..length].copy_from_slice(&bytes[..length]);".to_string());
                code.push("        length".to_string());
                code.push("    }".to_string());

                if text.is_some() {
                    code.push(String::new());
                    code.push(format!("    pub fn {}(&mut self) -> String {{", accessor));
                    code.push(format!(
                        "        text::decode(self.{}_bytes(), Self::{}_CHARACTER_ENCODING)",
                        accessor, upper
                    ));
                    code.push("    }".to_string());
                }
            }
            Role::Encoder => {
                code.push(String::new());
                code.push(format!("    pub fn put_{}(&mut self, src: &[u8]) -> Result<&mut Self, CodecError> {{", accessor));
                code.push(format!("        if src.len() > Self::{}_MAX_LENGTH {{", upper));
                code.push("            return Err(CodecError::LengthExceedsMaximum {".to_string());
                code.push(format!("                field: {},", quote(name)));
                code.push("                length: src.len(),".to_string());
                code.push(format!("                max: Self::{}_MAX_LENGTH,", upper));
                code.push("            });".to_string());
                code.push("        }".to_string());
                code.push("        let limit = self.cursor.limit();".to_string());
                code.push(format!("        self.cursor.set_limit(limit + Self::{}_HEADER_LENGTH + src.len());", upper));
                let length = format!("src.len() as {}", length_type.rust_type());
                code.push(format!("        {}", put_stmt(length_type, "self.buffer", "limit", &length, order)));
                code.push(format!("        self.buffer.put_bytes(limit + Self::{}_HEADER_LENGTH, src);", upper));
                code.push("        Ok(self)".to_string());
                code.push("    }".to_string());

                if text.is_some() {
                    code.push(String::new());
                    code.push(format!("    pub fn set_{}(&mut self, value: &str) -> Result<&mut Self, CodecError> {{", accessor));
                    code.push(format!("        let bytes = text::encode(value, Self::{}_CHARACTER_ENCODING)?;", upper));
                    code.push(format!("        self.put_{}(&bytes)", accessor));
                    code.push("    }".to_string());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder;
    use crate::config::GeneratorConfig;
    use crate::decomposer::split_var_data;
    use crate::types::Ir;

    fn generate(tokens: Vec<crate::types::Token>, role: Role) -> Result<String, GeneratorError> {
        let ir = Ir::new("demo", 1, 0, builder::message_header());
        let config = GeneratorConfig::default();
        let layouts = split_var_data(&tokens)?;
        let mut code = Vec::new();
        RustGenerator::new(&ir, &config).var_data_property(&layouts[0], role, &mut code)?;
        Ok(code.join("\n"))
    }

    #[test]
    fn text_var_data_has_string_accessors() {
        let code = generate(builder::var_data("note", 4, 0, builder::var_data_encoding(Some("UTF-8"))), Role::Decoder).unwrap();
        assert!(code.contains("    pub const NOTE_HEADER_LENGTH: usize = 4;"));
        assert!(code.contains("    pub const NOTE_MAX_LENGTH: usize = 1073741824;"));
        assert!(code.contains("    pub const NOTE_CHARACTER_ENCODING: CharacterEncoding = CharacterEncoding::Utf8;"));
        assert!(code.contains("        self.buffer.get_u32(limit, ByteOrder::LittleEndian) as usize"));
        assert!(code.contains("        text::decode(self.note_bytes(), Self::NOTE_CHARACTER_ENCODING)"));
        assert!(!code.contains("acting_version"));
    }

    #[test]
    fn raw_var_data_has_no_text_accessors() {
        let code = generate(builder::var_data("blob", 5, 2, builder::var_data_encoding(None)), Role::Decoder).unwrap();
        assert!(!code.contains("CHARACTER_ENCODING"));
        assert!(code.contains("    pub fn blob_bytes(&mut self) -> &'a [u8] {"));
        assert!(code.contains("        if self.cursor.acting_version() < 2 {"));
        assert!(code.contains("            return &[];"));
    }

    #[test]
    fn encoder_checks_maximum_before_writing() {
        let code = generate(builder::var_data("note", 4, 0, builder::var_data_encoding(Some("ASCII"))), Role::Encoder).unwrap();
        let check = code.find("if src.len() > Self::NOTE_MAX_LENGTH").unwrap();
        let write = code.find("self.buffer.put_u32(limit, src.len() as u32, ByteOrder::LittleEndian);").unwrap();
        assert!(check < write);
        assert!(code.contains("        let bytes = text::encode(value, Self::NOTE_CHARACTER_ENCODING)?;"));
    }

    #[test]
    fn unknown_character_encoding_is_rejected() {
        let result = generate(builder::var_data("note", 4, 0, builder::var_data_encoding(Some("EBCDIC"))), Role::Decoder);
        assert!(matches!(
            result,
            Err(GeneratorError::UnsupportedCharacterEncoding { encoding, .. }) if encoding == "EBCDIC"
        ));
    }
}
