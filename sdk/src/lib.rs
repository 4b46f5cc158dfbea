//! brine-sbe
//!
//! Facade crate for generated SBE codecs.
//!
//! - The runtime (`ReadBuf`, `WriteBuf`, `Cursor`, `CodecError`, flyweight traits,
//!   `text`) is re-exported at the root, which is where generated code looks for it.
//! - The code generator is available as [`compiler`].

pub use brine_sbe_schema::*;

pub mod compiler {
    pub use brine_sbe_compiler::*;
}

use brine_sbe_compiler::{describe_messages, GeneratorError, Ir};

/// Describe the message layout of an IR (fields, nested groups, var-data) as
/// pretty-printed JSON.
pub fn inspect_to_json(ir: &Ir) -> Result<String, GeneratorError> {
    let layouts = describe_messages(ir)?;
    Ok(serde_json::to_string_pretty(&layouts)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use brine_sbe_compiler::builder::{self, encoding};
    use brine_sbe_compiler::types::{Encoding, PrimitiveType};

    #[test]
    fn inspect_lists_nested_layout() {
        let message = builder::message(
            "Quote",
            2,
            8,
            vec![
                builder::field("bid", 1, 0, vec![encoding("bid", 0, Encoding::new(PrimitiveType::Int64))]),
                builder::var_data("venue", 2, 0, builder::var_data_encoding(Some("ASCII"))),
            ],
        );
        let ir = Ir::new("quotes", 1, 0, builder::message_header()).with_message(message);
        let json = inspect_to_json(&ir).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["name"], "Quote");
        assert_eq!(value[0]["fields"][0], "bid");
        assert_eq!(value[0]["var_data"][0], "venue");
        assert_eq!(value[0]["block_length"], 8);
    }
}
