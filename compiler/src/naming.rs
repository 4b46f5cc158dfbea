use lazy_static::lazy_static;
use regex::Regex;

use crate::{config::GeneratorConfig, error::GeneratorError};

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// Strict and reserved keywords of Rust 2021.
pub const RUST_KEYWORDS: [&str; 51] = [
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
    "self", "Self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use", "where",
    "while", "async", "await", "dyn", "abstract", "become", "box", "do", "final", "macro",
    "override", "priv", "typeof", "unsized", "virtual", "yield", "try",
];

pub fn is_rust_keyword(s: &str) -> bool {
    RUST_KEYWORDS.contains(&s)
}

pub fn is_valid_identifier(s: &str) -> bool {
    IDENTIFIER.is_match(s)
}

/// Converts a string to PascalCase.
/// - If the string contains underscores, it splits on underscores and capitalizes each word.
/// - If the string is fully uppercase (e.g. "SIGNAL"), only the first letter stays uppercase.
/// - Otherwise only the first letter is changed, so "fuelFigures" becomes "FuelFigures".
pub fn to_pascal_case(s: &str) -> String {
    fn capitalize(word: &str, lower_rest: bool) -> String {
        let mut chars = word.chars();
        match chars.next() {
            None => String::new(),
            Some(first) if lower_rest => first.to_uppercase().to_string() + &chars.as_str().to_lowercase(),
            Some(first) => first.to_uppercase().to_string() + chars.as_str(),
        }
    }

    if s.contains('_') {
        s.split('_')
            .filter(|word| !word.is_empty())
            .map(|word| capitalize(word, word == word.to_uppercase()))
            .collect()
    } else {
        capitalize(s, s.len() > 1 && s == s.to_uppercase())
    }
}

/// Converts a string to snake_case.
/// Consecutive uppercase letters stay together, so "sessionID" becomes "session_id".
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut snake = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                let prev = chars[i - 1];
                let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
                if prev != '_' && (!prev.is_uppercase() || next_is_lower) {
                    snake.push('_');
                }
            }
            snake.extend(c.to_lowercase());
        } else {
            snake.push(c);
        }
    }
    snake
}

pub fn to_upper_snake_case(s: &str) -> String {
    to_snake_case(s).to_uppercase()
}

fn escape(formatted: String, original: &str, config: &GeneratorConfig) -> Result<String, GeneratorError> {
    if !is_rust_keyword(&formatted) {
        return Ok(formatted);
    }
    match config.keyword_append_token.as_deref() {
        Some(token) if !token.is_empty() => Ok(formatted + token),
        _ => Err(GeneratorError::ReservedWord(original.to_string())),
    }
}

/// The snake_case accessor name for a schema element. Keywords get the
/// configured append token, or fail the generation run without one.
pub fn format_property_name(name: &str, config: &GeneratorConfig) -> Result<String, GeneratorError> {
    escape(to_snake_case(name), name, config)
}

/// The PascalCase name for a type or enum variant.
pub fn format_type_name(name: &str, config: &GeneratorConfig) -> Result<String, GeneratorError> {
    escape(to_pascal_case(name), name, config)
}

/// The flyweight type generated for `type_name`, e.g. `EngineDecoder`.
pub fn flyweight_name(type_name: &str, suffix: &str) -> String {
    format!("{}{}", to_pascal_case(type_name), suffix)
}

/// Name of the generated source unit holding `type_name`.
pub fn unit_name(type_name: &str) -> String {
    to_snake_case(type_name)
}
