//! Helpers that assemble well-formed token subtrees.
//!
//! The schema compiler normally hands over a finished token stream; these
//! helpers exist for build scripts and tests that describe a schema directly
//! in Rust. They fill in `component_token_count` for every Begin/End pair but
//! never compute offsets or block lengths: callers pass those explicitly, just
//! as the schema compiler would.

use crate::types::{Encoding, HeaderStructure, PrimitiveType, PrimitiveValue, Signal, Token};

/// Surrounds `inner` with `begin` and its matching End token.
fn enclose(begin: Token, inner: Vec<Token>) -> Vec<Token> {
    let count = inner.len() + 2;
    let mut end = begin.clone();
    end.signal = begin.signal.end_signal().unwrap_or(begin.signal);

    let mut tokens = Vec::with_capacity(count);
    tokens.push(Token { component_token_count: count, ..begin });
    tokens.extend(inner);
    tokens.push(Token { component_token_count: count, ..end });
    tokens
}

fn primitive_size(encoding: &Encoding) -> usize {
    encoding.primitive_type.map(PrimitiveType::size).unwrap_or(0)
}

/// A scalar primitive at `offset`.
pub fn encoding(name: &str, offset: usize, encoding: Encoding) -> Token {
    let length = primitive_size(&encoding);
    Token::new(Signal::Encoding, name)
        .with_offset(offset)
        .with_encoded_length(length)
        .with_encoding(encoding)
}

/// A fixed-length array of `length` primitives at `offset`.
pub fn array(name: &str, offset: usize, length: usize, encoding: Encoding) -> Token {
    let size = primitive_size(&encoding) * length;
    Token::new(Signal::Encoding, name)
        .with_offset(offset)
        .with_encoded_length(size)
        .with_encoding(encoding)
}

/// A constant primitive. It occupies no bytes on the wire.
pub fn constant(name: &str, primitive_type: PrimitiveType, value: PrimitiveValue) -> Token {
    Token::new(Signal::Encoding, name)
        .with_encoding(Encoding::new(primitive_type).with_const_value(value))
}

pub fn enumeration(
    name: &str,
    offset: usize,
    encoding: Encoding,
    values: &[(&str, PrimitiveValue)],
) -> Vec<Token> {
    let primitive_type = encoding.primitive_type;
    let begin = Token::new(Signal::BeginEnum, name)
        .with_offset(offset)
        .with_encoded_length(primitive_size(&encoding))
        .with_encoding(encoding);

    let valid_values = values
        .iter()
        .map(|(value_name, value)| {
            Token::new(Signal::ValidValue, value_name).with_encoding(Encoding {
                primitive_type,
                const_value: Some(value.clone()),
                ..Encoding::default()
            })
        })
        .collect();

    enclose(begin, valid_values)
}

pub fn bit_set(name: &str, offset: usize, encoding: Encoding, choices: &[(&str, u64)]) -> Vec<Token> {
    let primitive_type = encoding.primitive_type;
    let begin = Token::new(Signal::BeginSet, name)
        .with_offset(offset)
        .with_encoded_length(primitive_size(&encoding))
        .with_encoding(encoding);

    let choice_tokens = choices
        .iter()
        .map(|(choice_name, bit)| {
            Token::new(Signal::Choice, choice_name).with_encoding(Encoding {
                primitive_type,
                const_value: Some(PrimitiveValue::UInt(*bit)),
                ..Encoding::default()
            })
        })
        .collect();

    enclose(begin, choice_tokens)
}

/// A composite whose members sit at their own offsets relative to the composite.
pub fn composite(name: &str, offset: usize, encoded_length: usize, members: Vec<Vec<Token>>) -> Vec<Token> {
    let begin = Token::new(Signal::BeginComposite, name)
        .with_offset(offset)
        .with_encoded_length(encoded_length);
    enclose(begin, members.into_iter().flatten().collect())
}

/// A message field. The field inherits the version and, for primitive fields,
/// the encoding of its type tokens.
pub fn field(name: &str, id: i32, version: u32, mut type_tokens: Vec<Token>) -> Vec<Token> {
    let (offset, encoded_length, encoding) = match type_tokens.first_mut() {
        Some(first) => {
            first.version = version;
            let encoding = if first.signal == Signal::Encoding {
                first.encoding.clone()
            } else {
                Encoding::default()
            };
            (first.offset, first.encoded_length, encoding)
        }
        None => (0, 0, Encoding::default()),
    };

    let begin = Token::new(Signal::BeginField, name)
        .with_id(id)
        .with_version(version)
        .with_offset(offset)
        .with_encoded_length(encoded_length)
        .with_encoding(encoding);
    enclose(begin, type_tokens)
}

/// A repeating group: dimension composite first, then the group's own body
/// (fields, nested groups, var-data) in declaration order.
pub fn group(
    name: &str,
    id: i32,
    version: u32,
    block_length: usize,
    dimensions: Vec<Token>,
    body: Vec<Vec<Token>>,
) -> Vec<Token> {
    let begin = Token::new(Signal::BeginGroup, name)
        .with_id(id)
        .with_version(version)
        .with_encoded_length(block_length);
    let mut inner = dimensions;
    inner.extend(body.into_iter().flatten());
    enclose(begin, inner)
}

pub fn var_data(name: &str, id: i32, version: u32, var_encoding: Vec<Token>) -> Vec<Token> {
    let begin = Token::new(Signal::BeginVarData, name)
        .with_id(id)
        .with_version(version);
    enclose(begin, var_encoding)
}

pub fn message(name: &str, template_id: i32, block_length: usize, body: Vec<Vec<Token>>) -> Vec<Token> {
    let begin = Token::new(Signal::BeginMessage, name)
        .with_id(template_id)
        .with_encoded_length(block_length);
    enclose(begin, body.into_iter().flatten().collect())
}

/// The conventional `messageHeader`: four little-endian `uint16` fields.
pub fn message_header() -> HeaderStructure {
    let u16_field = |name: &str, offset: usize| vec![encoding(name, offset, Encoding::new(PrimitiveType::Uint16))];
    HeaderStructure::new(composite(
        "messageHeader",
        0,
        8,
        vec![
            u16_field(HeaderStructure::BLOCK_LENGTH, 0),
            u16_field(HeaderStructure::TEMPLATE_ID, 2),
            u16_field(HeaderStructure::SCHEMA_ID, 4),
            u16_field(HeaderStructure::SCHEMA_VERSION, 6),
        ],
    ))
}

/// The conventional `groupSizeEncoding`: `uint16` block length and count.
pub fn group_size_encoding() -> Vec<Token> {
    composite(
        "groupSizeEncoding",
        0,
        4,
        vec![
            vec![encoding("blockLength", 0, Encoding::new(PrimitiveType::Uint16))],
            vec![encoding("numInGroup", 2, Encoding::new(PrimitiveType::Uint16))],
        ],
    )
}

/// A `uint32` length prefix followed by the variable payload. Passing a
/// character encoding marks the payload as text.
pub fn var_data_encoding(character_encoding: Option<&str>) -> Vec<Token> {
    let mut data = Encoding::new(PrimitiveType::Uint8);
    data.character_encoding = character_encoding.map(str::to_string);

    composite(
        "varDataEncoding",
        0,
        0,
        vec![
            vec![encoding(
                "length",
                0,
                Encoding::new(PrimitiveType::Uint32).with_max_value(PrimitiveValue::Int(1 << 30)),
            )],
            vec![Token::new(Signal::Encoding, "varData")
                .with_offset(4)
                .with_encoding(data)],
        ],
    )
}
