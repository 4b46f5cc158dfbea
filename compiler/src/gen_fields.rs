//! Accessors for fixed-block properties: message and group fields, and
//! composite members.

use brine_sbe_schema::{text, CharacterEncoding};

use crate::{
    decomposer::FieldLayout,
    error::GeneratorError,
    gen_rust::{Role, RustGenerator, Scope},
    literals::{get_expr, literal, offset_expr, put_stmt},
    naming::{flyweight_name, to_upper_snake_case},
    types::{PrimitiveType, PrimitiveValue, Signal, Token},
    utils::{byte_list, quote},
};

/// One fixed-block property. Fields carry their BeginField token; composite
/// members are described by their type tokens alone.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Property<'t> {
    pub field:       Option<&'t Token>,
    pub type_tokens: &'t [Token],
}

impl<'t> Property<'t> {
    pub fn from_field(layout: &FieldLayout<'t>) -> Result<Self, GeneratorError> {
        if layout.type_tokens.is_empty() {
            return Err(GeneratorError::EmptyTokens("field type"));
        }
        Ok(Property { field: Some(layout.field), type_tokens: layout.type_tokens })
    }

    pub fn member(type_tokens: &'t [Token]) -> Result<Self, GeneratorError> {
        if type_tokens.is_empty() {
            return Err(GeneratorError::EmptyTokens("composite member"));
        }
        Ok(Property { field: None, type_tokens })
    }

    pub fn type_token(&self) -> &'t Token {
        &self.type_tokens[0]
    }

    pub fn name(&self) -> &'t str {
        &self.field.unwrap_or(self.type_token()).name
    }

    pub fn since_version(&self) -> u32 {
        self.field.map_or(self.type_token().version, |field| field.version)
    }

    /// The token whose encoding carries the descriptive metadata.
    pub fn meta_token(&self) -> &'t Token {
        self.field.unwrap_or(self.type_token())
    }

    pub fn is_constant(&self) -> bool {
        self.type_token().is_constant_encoding() || self.field.is_some_and(Token::is_constant_encoding)
    }

    pub fn const_value(&self) -> Option<&'t PrimitiveValue> {
        self.type_token()
            .encoding
            .const_value
            .as_ref()
            .or_else(|| self.field.and_then(|field| field.encoding.const_value.as_ref()))
    }

    /// Constants and zero-length properties have nothing on the wire to show.
    pub fn is_rendered(&self) -> bool {
        !self.is_constant() && self.type_token().encoded_length > 0
    }
}

pub(crate) fn is_guarded(role: Role, scope: Scope, since_version: u32) -> bool {
    role == Role::Decoder && scope == Scope::Body && since_version > 0
}

/// Early return for decoders bound to an older version than the property.
pub(crate) fn push_guard(code: &mut Vec<String>, since_version: u32, fallback: &str) {
    code.push(format!("        if self.cursor.acting_version() < {} {{", since_version));
    code.push(format!("            return {};", fallback));
    code.push("        }".to_string());
}

pub(crate) fn character_encoding(token: &Token) -> Result<CharacterEncoding, GeneratorError> {
    let name = token.encoding.character_encoding.as_deref().unwrap_or("US-ASCII");
    CharacterEncoding::from_name(name).ok_or_else(|| GeneratorError::UnsupportedCharacterEncoding {
        name:     token.name.clone(),
        encoding: name.to_string(),
    })
}

pub(crate) fn character_encoding_path(encoding: CharacterEncoding) -> &'static str {
    match encoding {
        CharacterEncoding::Ascii  => "CharacterEncoding::Ascii",
        CharacterEncoding::Utf8   => "CharacterEncoding::Utf8",
        CharacterEncoding::Latin1 => "CharacterEncoding::Latin1",
    }
}

/// `x_meta_attribute(MetaAttribute) -> &'static str` for the metadata on `token`.
pub(crate) fn meta_attribute_fn(accessor: &str, token: &Token) -> Vec<String> {
    let encoding = &token.encoding;
    vec![
        String::new(),
        format!("    pub fn {}_meta_attribute(meta_attribute: MetaAttribute) -> &'static str {{", accessor),
        "        match meta_attribute {".to_string(),
        format!("            MetaAttribute::Epoch        => {},", quote(encoding.epoch.as_deref().unwrap_or(""))),
        format!("            MetaAttribute::TimeUnit     => {},", quote(encoding.time_unit.as_deref().unwrap_or(""))),
        format!("            MetaAttribute::SemanticType => {},", quote(encoding.semantic_type.as_deref().unwrap_or(""))),
        format!("            MetaAttribute::Presence     => {},", quote(encoding.presence.as_str())),
        "        }".to_string(),
        "    }".to_string(),
    ]
}

fn index_check(code: &mut Vec<String>, name: &str, upper: &str) {
    code.push(format!("        if index >= Self::{}_LENGTH {{", upper));
    code.push(format!(
        "            return Err(CodecError::IndexOutOfRange {{ field: {}, index, length: Self::{}_LENGTH }});",
        quote(name),
        upper
    ));
    code.push("        }".to_string());
}

impl RustGenerator<'_> {
    /// Metadata constants plus role-specific accessors for one property.
    pub(crate) fn property(
        &self,
        property: &Property<'_>,
        role: Role,
        scope: Scope,
        code: &mut Vec<String>,
    ) -> Result<(), GeneratorError> {
        self.property_metadata(property, code)?;
        let token = property.type_token();
        match token.signal {
            Signal::Encoding => self.primitive_property(property, role, scope, code),
            Signal::BeginEnum => self.enum_property(property, role, scope, code),
            Signal::BeginSet | Signal::BeginComposite => self.flyweight_property(property, role, scope, code),
            found => Err(GeneratorError::Structure {
                expected: Signal::Encoding,
                found,
                name: token.name.clone(),
            }),
        }
    }

    fn property_metadata(&self, property: &Property<'_>, code: &mut Vec<String>) -> Result<(), GeneratorError> {
        let upper = to_upper_snake_case(property.name());
        let token = property.type_token();

        code.push(String::new());
        if let Some(field) = property.field {
            code.push(format!("    pub const {}_ID: i32 = {};", upper, field.id));
            code.push(format!("    pub const {}_SINCE_VERSION: u32 = {};", upper, field.version));
        }
        code.push(format!("    pub const {}_ENCODING_OFFSET: usize = {};", upper, token.offset));
        code.push(format!("    pub const {}_ENCODING_LENGTH: usize = {};", upper, token.encoded_length));
        if property.field.is_some() {
            code.extend(meta_attribute_fn(&self.property_name(property.name())?, property.meta_token()));
        }
        Ok(())
    }

    fn primitive_property(
        &self,
        property: &Property<'_>,
        role: Role,
        scope: Scope,
        code: &mut Vec<String>,
    ) -> Result<(), GeneratorError> {
        let token = property.type_token();
        let name = property.name();
        let primitive_type = token.primitive_type()?;

        if property.is_constant() {
            return self.constant_property(property, primitive_type, role, code);
        }

        let ty = primitive_type.rust_type();
        let accessor = self.property_name(name)?;
        let upper = to_upper_snake_case(name);
        let encoding = &token.encoding;

        let null = encoding.applicable_null_value().unwrap_or_else(|| primitive_type.null_value());
        let min = encoding.applicable_min_value().unwrap_or_else(|| primitive_type.min_value());
        let max = encoding.applicable_max_value().unwrap_or_else(|| primitive_type.max_value());
        code.push(format!("    pub const {}_NULL_VALUE: {} = {};", upper, ty, literal(primitive_type, &null, name)?));
        code.push(format!("    pub const {}_MIN_VALUE: {} = {};", upper, ty, literal(primitive_type, &min, name)?));
        code.push(format!("    pub const {}_MAX_VALUE: {} = {};", upper, ty, literal(primitive_type, &max, name)?));

        let since = property.since_version();
        let guarded = is_guarded(role, scope, since);
        let order = encoding.byte_order;
        let base = offset_expr("self.offset", token.offset);

        if token.array_length() > 1 {
            return self.array_property(property, primitive_type, role, guarded, code);
        }

        code.push(String::new());
        code.push(format!("    pub fn {}(&self) -> {} {{", accessor, ty));
        if guarded {
            push_guard(code, since, &format!("Self::{}_NULL_VALUE", upper));
        }
        code.push(format!("        {}", get_expr(primitive_type, "self.buffer", &base, order)));
        code.push("    }".to_string());

        if role == Role::Encoder {
            code.push(String::new());
            code.push(format!("    pub fn set_{}(&mut self, value: {}) -> &mut Self {{", accessor, ty));
            code.push(format!("        {}", put_stmt(primitive_type, "self.buffer", &base, "value", order)));
            code.push("        self".to_string());
            code.push("    }".to_string());
        }
        Ok(())
    }

    fn array_property(
        &self,
        property: &Property<'_>,
        primitive_type: PrimitiveType,
        role: Role,
        guarded: bool,
        code: &mut Vec<String>,
    ) -> Result<(), GeneratorError> {
        let token = property.type_token();
        let name = property.name();
        let ty = primitive_type.rust_type();
        let accessor = self.property_name(name)?;
        let upper = to_upper_snake_case(name);
        let since = property.since_version();
        let order = token.encoding.byte_order;
        let base = offset_expr("self.offset", token.offset);
        let element = match primitive_type.size() {
            1 => format!("{} + index", base),
            size => format!("{} + index * {}", base, size),
        };

        code.push(format!("    pub const {}_LENGTH: usize = {};", upper, token.array_length()));

        code.push(String::new());
        code.push(format!("    pub fn {}_at(&self, index: usize) -> Result<{}, CodecError> {{", accessor, ty));
        index_check(code, name, &upper);
        if guarded {
            push_guard(code, since, &format!("Ok(Self::{}_NULL_VALUE)", upper));
        }
        code.push(format!("        Ok({})", get_expr(primitive_type, "self.buffer", &element, order)));
        code.push("    }".to_string());

        if role == Role::Encoder {
            code.push(String::new());
            code.push(format!(
                "    pub fn set_{}_at(&mut self, index: usize, value: {}) -> Result<&mut Self, CodecError> {{",
                accessor, ty
            ));
            index_check(code, name, &upper);
            code.push(format!("        {}", put_stmt(primitive_type, "self.buffer", &element, "value", order)));
            code.push("        Ok(self)".to_string());
            code.push("    }".to_string());
        }

        if primitive_type != PrimitiveType::Char {
            return Ok(());
        }

        let encoding = character_encoding(token)?;
        code.push(String::new());
        code.push(format!(
            "    pub const {}_CHARACTER_ENCODING: CharacterEncoding = {};",
            upper,
            character_encoding_path(encoding)
        ));

        match role {
            Role::Decoder => {
                code.push(String::new());
                code.push(format!("    pub fn get_{}(&self, dst: &mut [u8]) -> Result<usize, CodecError> {{", accessor));
                code.push(format!("        if dst.len() < Self::{}_LENGTH {{", upper));
                code.push(format!(
                    "            return Err(CodecError::DestinationTooSmall {{ field: {}, required: Self::{}_LENGTH, available: dst.len() }});",
                    quote(name),
                    upper
                ));
                code.push("        }".to_string());
                if guarded {
                    push_guard(code, since, "Ok(0)");
                }
                code.push(format!("        self.buffer.get_bytes({}, &mut dst[..Self::{}_LENGTH]);", base, upper));
                code.push(format!("        Ok(Self::{}_LENGTH)", upper));
                code.push("    }".to_string());

                code.push(String::new());
                code.push(format!("    pub fn {}(&self) -> String {{", accessor));
                if guarded {
                    push_guard(code, since, "String::new()");
                }
                code.push(format!("        let bytes = self.buffer.slice({}, Self::{}_LENGTH);", base, upper));
                code.push(format!(
                    "        text::decode(&bytes[..text::nul_terminated_len(bytes)], Self::{}_CHARACTER_ENCODING)",
                    upper
                ));
                code.push("    }".to_string());
            }
            Role::Encoder => {
                code.push(String::new());
                code.push(format!("    pub fn put_{}(&mut self, src: &[u8]) -> &mut Self {{", accessor));
                code.push(format!("        let length = src.len().min(Self::{}_LENGTH);", upper));
                code.push(format!("        self.buffer.put_bytes({}, &src[..length]);", base));
                code.push(format!(
                    "        self.buffer.set_memory({} + length, Self::{}_LENGTH - length, 0);",
                    base, upper
                ));
                code.push("        self".to_string());
                code.push("    }".to_string());

                code.push(String::new());
                code.push(format!("    pub fn set_{}(&mut self, value: &str) -> Result<&mut Self, CodecError> {{", accessor));
                code.push(format!("        let bytes = text::encode(value, Self::{}_CHARACTER_ENCODING)?;", upper));
                code.push(format!("        Ok(self.put_{}(&bytes))", accessor));
                code.push("    }".to_string());
            }
        }
        Ok(())
    }

    fn constant_property(
        &self,
        property: &Property<'_>,
        primitive_type: PrimitiveType,
        role: Role,
        code: &mut Vec<String>,
    ) -> Result<(), GeneratorError> {
        let name = property.name();
        let accessor = self.property_name(name)?;
        let upper = to_upper_snake_case(name);
        let value = property
            .const_value()
            .ok_or_else(|| GeneratorError::MissingConstValue(name.to_string()))?;

        if let (PrimitiveType::Char, PrimitiveValue::Text(value)) = (primitive_type, value) {
            let encoding = character_encoding(property.type_token())?;
            let bytes = text::encode(value, encoding).map_err(|_| GeneratorError::ValueOutOfRange {
                name:  name.to_string(),
                value: value.clone(),
                primitive_type,
            })?;
            code.push(format!("    pub const {}_VALUE: &'static [u8] = &{};", upper, byte_list(&bytes)));
            code.push(format!("    pub const {}_LENGTH: usize = {};", upper, bytes.len()));
            if role == Role::Encoder {
                return Ok(());
            }

            code.push(String::new());
            code.push(format!("    pub fn {}_at(&self, index: usize) -> Result<u8, CodecError> {{", accessor));
            code.push(format!("        Self::{}_VALUE.get(index).copied().ok_or(CodecError::IndexOutOfRange {{", upper));
            code.push(format!("            field: {},", quote(name)));
            code.push("            index,".to_string());
            code.push(format!("            length: Self::{}_LENGTH,", upper));
            code.push("        })".to_string());
            code.push("    }".to_string());

            code.push(String::new());
            code.push(format!("    pub fn get_{}(&self, dst: &mut [u8]) -> usize {{", accessor));
            code.push(format!("        let length = dst.len().min(Self::{}_LENGTH);", upper));
            code.push(format!("        dst[..length].copy_from_slice(&Self::{}_VALUE[..length]);", upper));
            code.push("        length".to_string());
            code.push("    }".to_string());

            code.push(String::new());
            code.push(format!("    pub fn {}(&self) -> &'static str {{", accessor));
            code.push(format!("        {}", quote(value)));
            code.push("    }".to_string());
            return Ok(());
        }

        let ty = primitive_type.rust_type();
        code.push(format!("    pub const {}_VALUE: {} = {};", upper, ty, literal(primitive_type, value, name)?));
        if role == Role::Decoder {
            code.push(String::new());
            code.push(format!("    pub fn {}(&self) -> {} {{", accessor, ty));
            code.push(format!("        Self::{}_VALUE", upper));
            code.push("    }".to_string());
        }
        Ok(())
    }

    /// The variant named by a constant enum field, e.g. `Model.C` names `C`.
    fn constant_variant(&self, property: &Property<'_>) -> Result<String, GeneratorError> {
        let name = property.name();
        let value = property
            .const_value()
            .ok_or_else(|| GeneratorError::MissingConstValue(name.to_string()))?;

        let by_value = property
            .type_tokens
            .iter()
            .find(|t| t.signal == Signal::ValidValue && t.encoding.const_value.as_ref() == Some(value))
            .map(|t| t.name.clone());
        let variant = match (value.as_text(), by_value) {
            (Some(qualified), _) if qualified.contains('.') => {
                qualified.rsplit('.').next().unwrap_or(qualified).to_string()
            }
            (_, Some(found)) => found,
            (Some(variant), None) => variant.to_string(),
            (None, None) => return Err(GeneratorError::MissingConstValue(name.to_string())),
        };
        self.type_name(&variant)
    }

    fn enum_property(
        &self,
        property: &Property<'_>,
        role: Role,
        scope: Scope,
        code: &mut Vec<String>,
    ) -> Result<(), GeneratorError> {
        let token = property.type_token();
        let accessor = self.property_name(property.name())?;
        let enum_name = self.type_name(token.applicable_type_name())?;

        if property.is_constant() {
            if role == Role::Decoder {
                let variant = self.constant_variant(property)?;
                code.push(String::new());
                code.push(format!("    pub fn {}(&self) -> {} {{", accessor, enum_name));
                code.push(format!("        {}::{}", enum_name, variant));
                code.push("    }".to_string());
            }
            return Ok(());
        }

        let primitive_type = token.primitive_type()?;
        let ty = primitive_type.rust_type();
        let order = token.encoding.byte_order;
        let base = offset_expr("self.offset", token.offset);
        let since = property.since_version();

        code.push(String::new());
        code.push(format!("    pub fn {}_raw(&self) -> {} {{", accessor, ty));
        if is_guarded(role, scope, since) {
            push_guard(code, since, &format!("{}::NULL_VALUE", enum_name));
        }
        code.push(format!("        {}", get_expr(primitive_type, "self.buffer", &base, order)));
        code.push("    }".to_string());

        match role {
            Role::Decoder => {
                let returns = if self.config.decode_unknown_enum_values {
                    enum_name.clone()
                } else {
                    format!("Result<{}, CodecError>", enum_name)
                };
                code.push(String::new());
                code.push(format!("    pub fn {}(&self) -> {} {{", accessor, returns));
                code.push(format!("        {}::get(self.{}_raw())", enum_name, accessor));
                code.push("    }".to_string());
            }
            Role::Encoder => {
                code.push(String::new());
                code.push(format!("    pub fn set_{}(&mut self, value: {}) -> &mut Self {{", accessor, enum_name));
                code.push(format!("        {}", put_stmt(primitive_type, "self.buffer", &base, "value.value()", order)));
                code.push("        self".to_string());
                code.push("    }".to_string());
            }
        }
        Ok(())
    }

    /// Sets and composites: the accessor binds the type's own flyweight at the
    /// property's offset.
    fn flyweight_property(
        &self,
        property: &Property<'_>,
        role: Role,
        scope: Scope,
        code: &mut Vec<String>,
    ) -> Result<(), GeneratorError> {
        let token = property.type_token();
        let accessor = self.property_name(property.name())?;
        let flyweight = flyweight_name(token.applicable_type_name(), role.suffix());
        let base = offset_expr("self.offset", token.offset);
        let since = property.since_version();

        code.push(String::new());
        match role {
            Role::Decoder if is_guarded(role, scope, since) => {
                code.push(format!("    pub fn {}(&self) -> Option<{}<'a>> {{", accessor, flyweight));
                push_guard(code, since, "None");
                code.push(format!("        Some({}::wrap(self.buffer, {}))", flyweight, base));
            }
            Role::Decoder => {
                code.push(format!("    pub fn {}(&self) -> {}<'a> {{", accessor, flyweight));
                code.push(format!("        {}::wrap(self.buffer, {})", flyweight, base));
            }
            Role::Encoder => {
                code.push(format!("    pub fn {}(&mut self) -> {}<'_> {{", accessor, flyweight));
                code.push(format!("        {}::wrap(self.buffer.reborrow(), {})", flyweight, base));
            }
        }
        code.push("    }".to_string());
        Ok(())
    }
}
