use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GeneratorError;

/// The kind of schema element a [`Token`] stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    BeginMessage,
    EndMessage,
    BeginComposite,
    EndComposite,
    BeginField,
    EndField,
    BeginGroup,
    EndGroup,
    BeginEnum,
    ValidValue,
    EndEnum,
    BeginSet,
    Choice,
    EndSet,
    BeginVarData,
    EndVarData,
    Encoding,
}

impl Signal {
    /// The signal closing a subtree opened by `self`, or `None` for leaf signals.
    pub fn end_signal(self) -> Option<Signal> {
        match self {
            Signal::BeginMessage   => Some(Signal::EndMessage),
            Signal::BeginComposite => Some(Signal::EndComposite),
            Signal::BeginField     => Some(Signal::EndField),
            Signal::BeginGroup     => Some(Signal::EndGroup),
            Signal::BeginEnum      => Some(Signal::EndEnum),
            Signal::BeginSet       => Some(Signal::EndSet),
            Signal::BeginVarData   => Some(Signal::EndVarData),
            _ => None,
        }
    }

    pub fn is_begin(self) -> bool {
        self.end_signal().is_some()
    }

    pub fn is_end(self) -> bool {
        matches!(
            self,
            Signal::EndMessage
                | Signal::EndComposite
                | Signal::EndField
                | Signal::EndGroup
                | Signal::EndEnum
                | Signal::EndSet
                | Signal::EndVarData
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    Char,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float,
    Double,
}

impl PrimitiveType {
    /// Size in bytes of one element.
    pub fn size(self) -> usize {
        match self {
            PrimitiveType::Char | PrimitiveType::Int8 | PrimitiveType::Uint8 => 1,
            PrimitiveType::Int16 | PrimitiveType::Uint16 => 2,
            PrimitiveType::Int32 | PrimitiveType::Uint32 | PrimitiveType::Float => 4,
            PrimitiveType::Int64 | PrimitiveType::Uint64 | PrimitiveType::Double => 8,
        }
    }

    /// The Rust type generated accessors use for this primitive.
    pub fn rust_type(self) -> &'static str {
        match self {
            PrimitiveType::Char   => "u8",
            PrimitiveType::Int8   => "i8",
            PrimitiveType::Int16  => "i16",
            PrimitiveType::Int32  => "i32",
            PrimitiveType::Int64  => "i64",
            PrimitiveType::Uint8  => "u8",
            PrimitiveType::Uint16 => "u16",
            PrimitiveType::Uint32 => "u32",
            PrimitiveType::Uint64 => "u64",
            PrimitiveType::Float  => "f32",
            PrimitiveType::Double => "f64",
        }
    }

    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            PrimitiveType::Uint8 | PrimitiveType::Uint16 | PrimitiveType::Uint32 | PrimitiveType::Uint64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, PrimitiveType::Float | PrimitiveType::Double)
    }

    /// Inclusive range of integers representable by this type, `None` for floats.
    pub fn integer_range(self) -> Option<(i128, i128)> {
        match self {
            PrimitiveType::Char | PrimitiveType::Uint8 => Some((0, u8::MAX as i128)),
            PrimitiveType::Int8   => Some((i8::MIN as i128, i8::MAX as i128)),
            PrimitiveType::Int16  => Some((i16::MIN as i128, i16::MAX as i128)),
            PrimitiveType::Int32  => Some((i32::MIN as i128, i32::MAX as i128)),
            PrimitiveType::Int64  => Some((i64::MIN as i128, i64::MAX as i128)),
            PrimitiveType::Uint16 => Some((0, u16::MAX as i128)),
            PrimitiveType::Uint32 => Some((0, u32::MAX as i128)),
            PrimitiveType::Uint64 => Some((0, u64::MAX as i128)),
            PrimitiveType::Float | PrimitiveType::Double => None,
        }
    }

    pub fn min_value(self) -> PrimitiveValue {
        match self {
            PrimitiveType::Char   => PrimitiveValue::Int(0x20),
            PrimitiveType::Int8   => PrimitiveValue::Int(i8::MIN as i64 + 1),
            PrimitiveType::Int16  => PrimitiveValue::Int(i16::MIN as i64 + 1),
            PrimitiveType::Int32  => PrimitiveValue::Int(i32::MIN as i64 + 1),
            PrimitiveType::Int64  => PrimitiveValue::Int(i64::MIN + 1),
            PrimitiveType::Uint8 | PrimitiveType::Uint16 | PrimitiveType::Uint32 | PrimitiveType::Uint64 => {
                PrimitiveValue::Int(0)
            }
            PrimitiveType::Float  => PrimitiveValue::Float(-(f32::MAX as f64)),
            PrimitiveType::Double => PrimitiveValue::Float(-f64::MAX),
        }
    }

    pub fn max_value(self) -> PrimitiveValue {
        match self {
            PrimitiveType::Char   => PrimitiveValue::Int(0x7e),
            PrimitiveType::Int8   => PrimitiveValue::Int(i8::MAX as i64),
            PrimitiveType::Int16  => PrimitiveValue::Int(i16::MAX as i64),
            PrimitiveType::Int32  => PrimitiveValue::Int(i32::MAX as i64),
            PrimitiveType::Int64  => PrimitiveValue::Int(i64::MAX),
            PrimitiveType::Uint8  => PrimitiveValue::Int(u8::MAX as i64 - 1),
            PrimitiveType::Uint16 => PrimitiveValue::Int(u16::MAX as i64 - 1),
            PrimitiveType::Uint32 => PrimitiveValue::Int(u32::MAX as i64 - 1),
            PrimitiveType::Uint64 => PrimitiveValue::UInt(u64::MAX - 1),
            PrimitiveType::Float  => PrimitiveValue::Float(f32::MAX as f64),
            PrimitiveType::Double => PrimitiveValue::Float(f64::MAX),
        }
    }

    pub fn null_value(self) -> PrimitiveValue {
        match self {
            PrimitiveType::Char   => PrimitiveValue::Int(0),
            PrimitiveType::Int8   => PrimitiveValue::Int(i8::MIN as i64),
            PrimitiveType::Int16  => PrimitiveValue::Int(i16::MIN as i64),
            PrimitiveType::Int32  => PrimitiveValue::Int(i32::MIN as i64),
            PrimitiveType::Int64  => PrimitiveValue::Int(i64::MIN),
            PrimitiveType::Uint8  => PrimitiveValue::Int(u8::MAX as i64),
            PrimitiveType::Uint16 => PrimitiveValue::Int(u16::MAX as i64),
            PrimitiveType::Uint32 => PrimitiveValue::Int(u32::MAX as i64),
            PrimitiveType::Uint64 => PrimitiveValue::UInt(u64::MAX),
            PrimitiveType::Float | PrimitiveType::Double => PrimitiveValue::Float(f64::NAN),
        }
    }
}

/// A literal carried by a token: a constant, a bound, a null sentinel or an
/// enum/choice value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimitiveValue {
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
}

impl PrimitiveValue {
    /// Integer view of the value. Single-character text yields its code point,
    /// other text is parsed as a number.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            PrimitiveValue::Int(v)  => Some(*v as i128),
            PrimitiveValue::UInt(v) => Some(*v as i128),
            PrimitiveValue::Float(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i128),
            PrimitiveValue::Float(_) => None,
            PrimitiveValue::Text(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if !c.is_ascii_digit() => Some(c as i128),
                    _ => s.trim().parse().ok(),
                }
            }
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PrimitiveValue::Int(v)   => Some(*v as f64),
            PrimitiveValue::UInt(v)  => Some(*v as f64),
            PrimitiveValue::Float(v) => Some(*v),
            PrimitiveValue::Text(s)  => s.trim().parse().ok(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PrimitiveValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveValue::Int(v)   => write!(f, "{}", v),
            PrimitiveValue::UInt(v)  => write!(f, "{}", v),
            PrimitiveValue::Float(v) => write!(f, "{}", v),
            PrimitiveValue::Text(s)  => write!(f, "{:?}", s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ByteOrder {
    #[default]
    #[serde(alias = "LITTLE_ENDIAN")]
    LittleEndian,
    #[serde(alias = "BIG_ENDIAN")]
    BigEndian,
}

impl ByteOrder {
    /// The runtime expression generated code passes to buffer accessors.
    pub fn runtime_path(self) -> &'static str {
        match self {
            ByteOrder::LittleEndian => "ByteOrder::LittleEndian",
            ByteOrder::BigEndian    => "ByteOrder::BigEndian",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    #[default]
    Required,
    Optional,
    Constant,
}

impl Presence {
    pub fn as_str(self) -> &'static str {
        match self {
            Presence::Required => "required",
            Presence::Optional => "optional",
            Presence::Constant => "constant",
        }
    }
}

/// How a token's value is laid out and interpreted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encoding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primitive_type:     Option<PrimitiveType>,
    #[serde(default)]
    pub byte_order:         ByteOrder,
    #[serde(default)]
    pub presence:           Presence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value:          Option<PrimitiveValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value:          Option<PrimitiveValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_value:         Option<PrimitiveValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub const_value:        Option<PrimitiveValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_type:      Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epoch:              Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_unit:          Option<String>,
}

impl Encoding {
    pub fn new(primitive_type: PrimitiveType) -> Self {
        Encoding { primitive_type: Some(primitive_type), ..Encoding::default() }
    }

    pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    pub fn with_presence(mut self, presence: Presence) -> Self {
        self.presence = presence;
        self
    }

    pub fn with_const_value(mut self, value: PrimitiveValue) -> Self {
        self.presence = Presence::Constant;
        self.const_value = Some(value);
        self
    }

    pub fn with_min_value(mut self, value: PrimitiveValue) -> Self {
        self.min_value = Some(value);
        self
    }

    pub fn with_max_value(mut self, value: PrimitiveValue) -> Self {
        self.max_value = Some(value);
        self
    }

    pub fn with_null_value(mut self, value: PrimitiveValue) -> Self {
        self.null_value = Some(value);
        self
    }

    pub fn with_character_encoding(mut self, name: &str) -> Self {
        self.character_encoding = Some(name.to_string());
        self
    }

    pub fn with_semantic_type(mut self, semantic_type: &str) -> Self {
        self.semantic_type = Some(semantic_type.to_string());
        self
    }

    pub fn with_epoch(mut self, epoch: &str) -> Self {
        self.epoch = Some(epoch.to_string());
        self
    }

    pub fn with_time_unit(mut self, time_unit: &str) -> Self {
        self.time_unit = Some(time_unit.to_string());
        self
    }

    /// The declared minimum, or the primitive's default minimum.
    pub fn applicable_min_value(&self) -> Option<PrimitiveValue> {
        self.min_value.clone().or_else(|| self.primitive_type.map(PrimitiveType::min_value))
    }

    pub fn applicable_max_value(&self) -> Option<PrimitiveValue> {
        self.max_value.clone().or_else(|| self.primitive_type.map(PrimitiveType::max_value))
    }

    pub fn applicable_null_value(&self) -> Option<PrimitiveValue> {
        self.null_value.clone().or_else(|| self.primitive_type.map(PrimitiveType::null_value))
    }
}

fn default_id() -> i32 {
    -1
}

fn default_component_token_count() -> usize {
    1
}

/// One element of the pre-order token stream produced by the schema compiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub signal:                Signal,
    pub name:                  String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced_name:       Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description:           Option<String>,
    #[serde(default = "default_id")]
    pub id:                    i32,
    #[serde(default)]
    pub version:               u32,
    #[serde(default)]
    pub offset:                usize,
    #[serde(default)]
    pub encoded_length:        usize,
    #[serde(default = "default_component_token_count")]
    pub component_token_count: usize,
    #[serde(default)]
    pub encoding:              Encoding,
}

impl Token {
    pub fn new(signal: Signal, name: &str) -> Self {
        Token {
            signal,
            name:                  name.to_string(),
            referenced_name:       None,
            description:           None,
            id:                    default_id(),
            version:               0,
            offset:                0,
            encoded_length:        0,
            component_token_count: default_component_token_count(),
            encoding:              Encoding::default(),
        }
    }

    pub fn with_id(mut self, id: i32) -> Self {
        self.id = id;
        self
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_encoded_length(mut self, encoded_length: usize) -> Self {
        self.encoded_length = encoded_length;
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_referenced_name(mut self, name: &str) -> Self {
        self.referenced_name = Some(name.to_string());
        self
    }

    /// The name generated code uses for the type this token introduces.
    pub fn applicable_type_name(&self) -> &str {
        self.referenced_name.as_deref().unwrap_or(&self.name)
    }

    pub fn primitive_type(&self) -> Result<PrimitiveType, GeneratorError> {
        self.encoding
            .primitive_type
            .ok_or_else(|| GeneratorError::MissingPrimitiveType(self.name.clone()))
    }

    /// Number of primitive elements in the encoded value (1 for scalars).
    pub fn array_length(&self) -> usize {
        match self.encoding.primitive_type {
            Some(primitive) if self.encoded_length > primitive.size() => {
                self.encoded_length / primitive.size()
            }
            _ => 1,
        }
    }

    pub fn is_constant_encoding(&self) -> bool {
        self.encoding.presence == Presence::Constant
    }

    pub fn is_optional_encoding(&self) -> bool {
        self.encoding.presence == Presence::Optional
    }
}

/// The fixed preamble every message starts with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderStructure {
    pub tokens: Vec<Token>,
}

impl HeaderStructure {
    pub const BLOCK_LENGTH:   &'static str = "blockLength";
    pub const TEMPLATE_ID:    &'static str = "templateId";
    pub const SCHEMA_ID:      &'static str = "schemaId";
    pub const SCHEMA_VERSION: &'static str = "version";

    pub fn new(tokens: Vec<Token>) -> Self {
        HeaderStructure { tokens }
    }

    pub fn field(&self, name: &'static str) -> Result<&Token, GeneratorError> {
        self.tokens
            .iter()
            .find(|t| t.signal == Signal::Encoding && t.name == name)
            .ok_or(GeneratorError::MissingHeaderField(name))
    }

    pub fn block_length_type(&self) -> Result<PrimitiveType, GeneratorError> {
        self.field(Self::BLOCK_LENGTH)?.primitive_type()
    }

    pub fn template_id_type(&self) -> Result<PrimitiveType, GeneratorError> {
        self.field(Self::TEMPLATE_ID)?.primitive_type()
    }

    pub fn schema_id_type(&self) -> Result<PrimitiveType, GeneratorError> {
        self.field(Self::SCHEMA_ID)?.primitive_type()
    }

    pub fn schema_version_type(&self) -> Result<PrimitiveType, GeneratorError> {
        self.field(Self::SCHEMA_VERSION)?.primitive_type()
    }

    /// Name of the header composite, e.g. `messageHeader`.
    pub fn type_name(&self) -> Option<&str> {
        self.tokens.first().map(Token::applicable_type_name)
    }
}

/// The intermediate representation handed over by the schema compiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ir {
    pub package_name:     String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace:        Option<String>,
    pub id:               i32,
    #[serde(default)]
    pub version:          u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_version: Option<String>,
    pub header:           HeaderStructure,
    #[serde(default)]
    pub types:            Vec<Vec<Token>>,
    #[serde(default)]
    pub messages:         Vec<Vec<Token>>,
}

impl Ir {
    pub fn new(package_name: &str, id: i32, version: u32, header: HeaderStructure) -> Self {
        Ir {
            package_name:     package_name.to_string(),
            namespace:        None,
            id,
            version,
            semantic_version: None,
            header,
            types:            Vec::new(),
            messages:         Vec::new(),
        }
    }

    pub fn with_type(mut self, tokens: Vec<Token>) -> Self {
        self.types.push(tokens);
        self
    }

    pub fn with_message(mut self, tokens: Vec<Token>) -> Self {
        self.messages.push(tokens);
        self
    }

    /// Looks up a type definition by its applicable name.
    pub fn get_type(&self, name: &str) -> Option<&[Token]> {
        self.types
            .iter()
            .find(|tokens| tokens.first().map(Token::applicable_type_name) == Some(name))
            .map(Vec::as_slice)
    }
}
