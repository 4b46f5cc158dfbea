//! Repeating groups: the parent accessor and the cursor type iterating the
//! repetitions.
//!
//! A group codec borrows the `Cursor` of the message it belongs to, so
//! `wrap` and `next` move the message's limit. Nested groups borrow the same
//! cursor again through their parent group.

use tracing::debug;

use crate::{
    decomposer::{split_groups, Decomposition, GroupLayout},
    error::GeneratorError,
    gen_fields::push_guard,
    gen_rust::{Role, RustGenerator},
    literals::{get_expr, literal, offset_expr, put_stmt},
    naming::{flyweight_name, to_upper_snake_case},
    types::{PrimitiveValue, Token},
    utils::quote,
};

fn group_type_name(prefix: &str, group: &Token, role: Role) -> String {
    format!("{}{}", prefix, flyweight_name(&group.name, role.suffix()))
}

impl RustGenerator<'_> {
    /// Constants and accessor on the parent codec for one group.
    pub(crate) fn group_accessor(
        &self,
        group: &GroupLayout<'_>,
        prefix: &str,
        role: Role,
        code: &mut Vec<String>,
    ) -> Result<(), GeneratorError> {
        let token = group.token;
        let accessor = self.property_name(&token.name)?;
        let upper = to_upper_snake_case(&token.name);
        let type_name = group_type_name(prefix, token, role);

        code.push(String::new());
        code.push(format!("    pub const {}_ID: i32 = {};", upper, token.id));
        code.push(format!("    pub const {}_SINCE_VERSION: u32 = {};", upper, token.version));
        code.push(String::new());

        match role {
            Role::Decoder => {
                code.push(format!("    pub fn {}(&mut self) -> {}<'_> {{", accessor, type_name));
                if token.version > 0 {
                    push_guard(code, token.version, &format!("{}::wrap_empty(self.buffer, &mut self.cursor)", type_name));
                }
                code.push(format!("        {}::wrap(self.buffer, &mut self.cursor)", type_name));
            }
            Role::Encoder => {
                let count_type = group.num_in_group.primitive_type()?.rust_type();
                code.push(format!(
                    "    pub fn {}_count(&mut self, count: {}) -> Result<{}<'_>, CodecError> {{",
                    accessor, count_type, type_name
                ));
                code.push(format!("        {}::wrap(self.buffer.reborrow(), &mut self.cursor, count)", type_name));
            }
        }
        code.push("    }".to_string());
        Ok(())
    }

    /// The group types declared by `body`, nested groups included, each
    /// prefixed by the path of its parents.
    pub(crate) fn group_units(
        &self,
        body: &Decomposition<'_>,
        prefix: &str,
        role: Role,
    ) -> Result<Vec<String>, GeneratorError> {
        let mut code = Vec::new();
        for group in split_groups(body.groups)? {
            code.extend(self.group_unit(&group, prefix, role)?);
        }
        Ok(code)
    }

    fn group_unit(&self, group: &GroupLayout<'_>, prefix: &str, role: Role) -> Result<Vec<String>, GeneratorError> {
        let token = group.token;
        let type_name = group_type_name(prefix, token, role);
        let nested_prefix = format!("{}{}", prefix, flyweight_name(&token.name, ""));

        let block_length_type = group.block_length.primitive_type()?;
        let num_in_group_type = group.num_in_group.primitive_type()?;
        let block_length = literal(
            block_length_type,
            &PrimitiveValue::UInt(token.encoded_length as u64),
            &group.block_length.name,
        )?;
        let block_length_at = offset_expr("limit", group.block_length.offset);
        let num_in_group_at = offset_expr("limit", group.num_in_group.offset);
        debug!(name = %type_name, block_length = token.encoded_length, "group");

        let mut code = vec![String::new()];
        match role {
            Role::Decoder => {
                code.push("#[derive(Debug)]".to_string());
                code.push(format!("pub struct {}<'a> {{", type_name));
                code.push("    buffer: ReadBuf<'a>,".to_string());
                code.push("    cursor: &'a mut Cursor,".to_string());
                code.push(format!("    block_length: {},", block_length_type.rust_type()));
            }
            Role::Encoder => {
                code.push("#[derive(Debug)]".to_string());
                code.push(format!("pub struct {}<'a> {{", type_name));
                code.push("    buffer: WriteBuf<'a>,".to_string());
                code.push("    cursor: &'a mut Cursor,".to_string());
            }
        }
        code.push("    count: usize,".to_string());
        code.push("    index: isize,".to_string());
        code.push("    offset: usize,".to_string());
        code.push("}".to_string());
        code.push(String::new());

        code.push(format!("impl<'a> {}<'a> {{", type_name));
        code.push(format!("    pub const SBE_HEADER_SIZE: usize = {};", group.dimensions.encoded_length));
        code.push(format!("    pub const SBE_BLOCK_LENGTH: {} = {};", block_length_type.rust_type(), block_length));

        match role {
            Role::Decoder => {
                code.push(String::new());
                code.push("    /// Reads the dimension header at the current limit and steps past it.".to_string());
                code.push("    pub fn wrap(buffer: ReadBuf<'a>, cursor: &'a mut Cursor) -> Self {".to_string());
                code.push("        let limit = cursor.limit();".to_string());
                code.push(format!(
                    "        let block_length = {};",
                    get_expr(block_length_type, "buffer", &block_length_at, group.block_length.encoding.byte_order)
                ));
                code.push(format!(
                    "        let count = {} as usize;",
                    get_expr(num_in_group_type, "buffer", &num_in_group_at, group.num_in_group.encoding.byte_order)
                ));
                code.push("        cursor.set_limit(limit + Self::SBE_HEADER_SIZE);".to_string());
                code.push("        Self { buffer, cursor, block_length, count, index: -1, offset: 0 }".to_string());
                code.push("    }".to_string());
                code.push(String::new());
                code.push("    /// A group with no repetitions, for messages older than the group.".to_string());
                code.push("    pub fn wrap_empty(buffer: ReadBuf<'a>, cursor: &'a mut Cursor) -> Self {".to_string());
                code.push("        Self { buffer, cursor, block_length: Self::SBE_BLOCK_LENGTH, count: 0, index: -1, offset: 0 }".to_string());
                code.push("    }".to_string());
                code.push(String::new());
                code.push("    pub fn buffer(&self) -> ReadBuf<'a> {".to_string());
                code.push("        self.buffer".to_string());
                code.push("    }".to_string());
            }
            Role::Encoder => {
                let min = group
                    .num_in_group
                    .encoding
                    .applicable_min_value()
                    .unwrap_or_else(|| num_in_group_type.min_value());
                let max = group
                    .num_in_group
                    .encoding
                    .applicable_max_value()
                    .unwrap_or_else(|| num_in_group_type.max_value());
                let count_type = num_in_group_type.rust_type();
                code.push(format!(
                    "    pub const SBE_MIN_COUNT: {} = {};",
                    count_type,
                    literal(num_in_group_type, &min, &group.num_in_group.name)?
                ));
                code.push(format!(
                    "    pub const SBE_MAX_COUNT: {} = {};",
                    count_type,
                    literal(num_in_group_type, &max, &group.num_in_group.name)?
                ));
                code.push(String::new());
                code.push("    /// Checks `count` against the inclusive bounds, then writes the dimension".to_string());
                code.push("    /// header at the current limit and steps past it.".to_string());
                code.push(format!(
                    "    pub fn wrap(mut buffer: WriteBuf<'a>, cursor: &'a mut Cursor, count: {}) -> Result<Self, CodecError> {{",
                    count_type
                ));
                code.push("        if !(Self::SBE_MIN_COUNT..=Self::SBE_MAX_COUNT).contains(&count) {".to_string());
                code.push("            return Err(CodecError::CountOutOfRange {".to_string());
                code.push(format!("                group: {},", quote(&token.name)));
                code.push("                count: count as u64,".to_string());
                code.push("                min: Self::SBE_MIN_COUNT as u64,".to_string());
                code.push("                max: Self::SBE_MAX_COUNT as u64,".to_string());
                code.push("            });".to_string());
                code.push("        }".to_string());
                code.push("        let limit = cursor.limit();".to_string());
                code.push(format!(
                    "        {}",
                    put_stmt(
                        block_length_type,
                        "buffer",
                        &block_length_at,
                        "Self::SBE_BLOCK_LENGTH",
                        group.block_length.encoding.byte_order
                    )
                ));
                code.push(format!(
                    "        {}",
                    put_stmt(num_in_group_type, "buffer", &num_in_group_at, "count", group.num_in_group.encoding.byte_order)
                ));
                code.push("        cursor.set_limit(limit + Self::SBE_HEADER_SIZE);".to_string());
                code.push("        Ok(Self { buffer, cursor, count: count as usize, index: -1, offset: 0 })".to_string());
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
            code.push("        self.block_length".to_string());
            code.push("    }".to_string());
            code.push(String::new());
            code.push("    pub fn acting_version(&self) -> u64 {".to_string());
            code.push("        self.cursor.acting_version()".to_string());
            code.push("    }".to_string());
        }
        code.push(String::new());
        code.push("    pub fn count(&self) -> usize {".to_string());
        code.push("        self.count".to_string());
        code.push("    }".to_string());
        code.push(String::new());
        code.push("    /// Position of the current repetition, -1 before the first `next`.".to_string());
        code.push("    pub fn index(&self) -> isize {".to_string());
        code.push("        self.index".to_string());
        code.push("    }".to_string());
        code.push(String::new());
        code.push("    pub fn limit(&self) -> usize {".to_string());
        code.push("        self.cursor.limit()".to_string());
        code.push("    }".to_string());
        code.push(String::new());
        code.push("    pub fn set_limit(&mut self, limit: usize) {".to_string());
        code.push("        self.cursor.set_limit(limit);".to_string());
        code.push("    }".to_string());
        code.push(String::new());
        code.push("    pub fn has_next(&self) -> bool {".to_string());
        code.push("        self.index + 1 < self.count as isize".to_string());
        code.push("    }".to_string());

        let repetition_length = match role {
            Role::Decoder => "self.block_length as usize",
            Role::Encoder => "Self::SBE_BLOCK_LENGTH as usize",
        };
        code.push(String::new());
        code.push("    /// Moves to the next repetition. The returned view is the group itself,".to_string());
        code.push("    /// so it cannot outlive the following call.".to_string());
        code.push("    pub fn next(&mut self) -> Result<&mut Self, CodecError> {".to_string());
        code.push("        if !self.has_next() {".to_string());
        code.push(format!(
            "            return Err(CodecError::GroupExhausted {{ group: {}, count: self.count }});",
            quote(&token.name)
        ));
        code.push("        }".to_string());
        code.push("        self.offset = self.cursor.limit();".to_string());
        code.push(format!("        self.cursor.set_limit(self.offset + {});", repetition_length));
        code.push("        self.index += 1;".to_string());
        code.push("        Ok(self)".to_string());
        code.push("    }".to_string());

        if role == Role::Decoder {
            code.push(String::new());
            code.push("    /// Calls `f` on every remaining repetition, stopping at the first error.".to_string());
            code.push("    pub fn try_for_each<F>(&mut self, mut f: F) -> Result<(), CodecError>".to_string());
            code.push("    where".to_string());
            code.push("        F: FnMut(&mut Self) -> Result<(), CodecError>,".to_string());
            code.push("    {".to_string());
            code.push("        while self.has_next() {".to_string());
            code.push("            f(self.next()?)?;".to_string());
            code.push("        }".to_string());
            code.push("        Ok(())".to_string());
            code.push("    }".to_string());
        }

        self.body_members(&group.body, &nested_prefix, role, &mut code)?;
        if role == Role::Decoder {
            code.extend(self.group_render());
        }
        code.push("}".to_string());

        code.extend(self.group_units(&group.body, &nested_prefix, role)?);
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{self, encoding};
    use crate::config::GeneratorConfig;
    use crate::decomposer::decompose_message;
    use crate::types::{Encoding, Ir, PrimitiveType};

    fn car_ir() -> Ir {
        let dimensions = builder::composite(
            "groupSizeEncoding",
            0,
            4,
            vec![
                vec![encoding("blockLength", 0, Encoding::new(PrimitiveType::Uint16))],
                vec![encoding(
                    "numInGroup",
                    2,
                    Encoding::new(PrimitiveType::Uint16).with_max_value(PrimitiveValue::Int(10)),
                )],
            ],
        );
        let accelerations = builder::group(
            "acceleration",
            8,
            0,
            2,
            builder::group_size_encoding(),
            vec![builder::field("mph", 9, 0, vec![encoding("mph", 0, Encoding::new(PrimitiveType::Uint16))])],
        );
        let performance = builder::group(
            "performanceFigures",
            7,
            1,
            1,
            dimensions,
            vec![
                builder::field("octaneRating", 10, 1, vec![encoding("octaneRating", 0, Encoding::new(PrimitiveType::Uint8))]),
                accelerations,
            ],
        );
        let message = builder::message("Car", 1, 0, vec![performance]);
        Ir::new("cars", 1, 1, builder::message_header()).with_message(message)
    }

    fn units(role: Role) -> String {
        let ir = car_ir();
        let config = GeneratorConfig::default();
        let generator = RustGenerator::new(&ir, &config);
        let body = decompose_message(&ir.messages[0]).unwrap();
        generator.group_units(&body, "Car", role).unwrap().join("\n")
    }

    #[test]
    fn nested_groups_are_prefixed_by_their_path() {
        let code = units(Role::Decoder);
        assert!(code.contains("pub struct CarPerformanceFiguresDecoder<'a> {"));
        assert!(code.contains("pub struct CarPerformanceFiguresAccelerationDecoder<'a> {"));
        assert!(code.contains(
            "    pub fn acceleration(&mut self) -> CarPerformanceFiguresAccelerationDecoder<'_> {"
        ));
    }

    #[test]
    fn decoder_reads_dimensions_at_limit() {
        let code = units(Role::Decoder);
        assert!(code.contains("        let block_length = buffer.get_u16(limit, ByteOrder::LittleEndian);"));
        assert!(code.contains("        let count = buffer.get_u16(limit + 2, ByteOrder::LittleEndian) as usize;"));
        assert!(code.contains("        self.index + 1 < self.count as isize"));
        assert!(code.contains("return Err(CodecError::GroupExhausted { group: \"performanceFigures\", count: self.count });"));
    }

    #[test]
    fn encoder_bounds_come_from_num_in_group() {
        let code = units(Role::Encoder);
        assert!(code.contains("    pub const SBE_MIN_COUNT: u16 = 0;"));
        assert!(code.contains("    pub const SBE_MAX_COUNT: u16 = 10;"));
        assert!(code.contains("        if !(Self::SBE_MIN_COUNT..=Self::SBE_MAX_COUNT).contains(&count) {"));
        assert!(code.contains("pub fn acceleration_count(&mut self, count: u16) -> Result<CarPerformanceFiguresAccelerationEncoder<'_>, CodecError> {"));
    }

    #[test]
    fn versioned_group_accessor_falls_back_to_empty() {
        let ir = car_ir();
        let config = GeneratorConfig::default();
        let generator = RustGenerator::new(&ir, &config);
        let body = decompose_message(&ir.messages[0]).unwrap();
        let group = &split_groups(body.groups).unwrap()[0];

        let mut code = Vec::new();
        generator.group_accessor(group, "Car", Role::Decoder, &mut code).unwrap();
        let code = code.join("\n");
        assert!(code.contains("    pub const PERFORMANCE_FIGURES_SINCE_VERSION: u32 = 1;"));
        assert!(code.contains("        if self.cursor.acting_version() < 1 {"));
        assert!(code.contains("            return CarPerformanceFiguresDecoder::wrap_empty(self.buffer, &mut self.cursor);"));
    }
}
