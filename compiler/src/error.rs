use thiserror::Error;

use crate::types::{PrimitiveType, Signal};

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IR decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("tokens must begin with {expected:?}: token={name} signal={found:?}")]
    Structure {
        expected: Signal,
        found:    Signal,
        name:     String,
    },

    #[error("Unbalanced token {name} ({signal:?}) at index {index}: {msg}")]
    Unbalanced {
        name:   String,
        signal: Signal,
        index:  usize,
        msg:    String,
    },

    #[error("Unexpected token {name} ({signal:?}) at index {index}")]
    UnexpectedToken {
        name:   String,
        signal: Signal,
        index:  usize,
    },

    #[error("Unsupported primitive type {primitive_type:?} for {name}")]
    UnsupportedPrimitive {
        name:           String,
        primitive_type: PrimitiveType,
    },

    #[error("Empty token list for {0}")]
    EmptyTokens(&'static str),

    #[error("Constant {0} has no value")]
    MissingConstValue(String),

    #[error("Token {0} has no primitive type")]
    MissingPrimitiveType(String),

    #[error("Invalid property name {0}: it is a reserved word, set a keyword append token")]
    ReservedWord(String),

    #[error("Invalid name {0}: not a valid identifier")]
    InvalidName(String),

    #[error("Unsupported character encoding {encoding} for {name}")]
    UnsupportedCharacterEncoding {
        name:     String,
        encoding: String,
    },

    #[error("The type {name} is not defined for {field}")]
    UnknownType {
        name:  String,
        field: String,
    },

    #[error("The type {0} is defined twice")]
    DuplicateType(String),

    #[error("Message header is missing the {0} field")]
    MissingHeaderField(&'static str),

    #[error("Value {value} is out of range for {primitive_type:?} in {name}")]
    ValueOutOfRange {
        name:           String,
        value:          String,
        primitive_type: PrimitiveType,
    },

    #[error("Choice {name} uses bit {bit}, which does not fit in {primitive_type:?}")]
    InvalidChoiceBit {
        name:           String,
        bit:            u64,
        primitive_type: PrimitiveType,
    },
}
