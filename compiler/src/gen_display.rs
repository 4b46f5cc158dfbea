//! Human-readable renderers: `render` methods and the `Display` impls built on them.

use crate::{
    decomposer::{split_fields, split_groups, split_var_data, Decomposition},
    error::GeneratorError,
    gen_fields::{is_guarded, Property},
    gen_rust::{Role, RustGenerator, Scope},
    naming::to_upper_snake_case,
    types::{PrimitiveType, Signal, Token},
    utils::quote,
};

/// Emits `entries` separated by `|`.
fn join_entries(entries: Vec<Vec<String>>, code: &mut Vec<String>) {
    for (i, entry) in entries.into_iter().enumerate() {
        if i > 0 {
            code.push("        out.write_char('|')?;".to_string());
        }
        code.extend(entry);
    }
}

fn entry_name(name: &str) -> String {
    format!("        out.write_str({})?;", quote(&format!("{}=", name)))
}

impl RustGenerator<'_> {
    /// The `name=value` entry for one property, or `None` when it is not shown.
    fn property_entry(&self, property: &Property<'_>, scope: Scope) -> Result<Option<Vec<String>>, GeneratorError> {
        if !property.is_rendered() {
            return Ok(None);
        }
        let token = property.type_token();
        let accessor = self.property_name(property.name())?;
        let mut entry = vec![entry_name(property.name())];

        match token.signal {
            Signal::Encoding if token.array_length() == 1 && token.encoding.primitive_type == Some(PrimitiveType::Char) => {
                entry.push(format!("        write!(out, \"{{}}\", self.{}() as char)?;", accessor));
            }
            Signal::Encoding if token.array_length() == 1 => {
                entry.push(format!("        write!(out, \"{{}}\", self.{}())?;", accessor));
            }
            Signal::Encoding if token.encoding.primitive_type == Some(PrimitiveType::Char) => {
                entry.push(format!("        out.write_str(&self.{}())?;", accessor));
            }
            Signal::Encoding => {
                entry.push("        out.write_char('[')?;".to_string());
                entry.push(format!("        for index in 0..Self::{}_LENGTH {{", to_upper_snake_case(property.name())));
                entry.push("            if index > 0 {".to_string());
                entry.push("                out.write_char(',')?;".to_string());
                entry.push("            }".to_string());
                entry.push(format!(
                    "            write!(out, \"{{}}\", self.{}_at(index).map_err(|_| fmt::Error)?)?;",
                    accessor
                ));
                entry.push("        }".to_string());
                entry.push("        out.write_char(']')?;".to_string());
            }
            Signal::BeginEnum if self.config.decode_unknown_enum_values => {
                entry.push(format!("        write!(out, \"{{}}\", self.{}())?;", accessor));
            }
            // Bytes outside the enum render as their raw value.
            Signal::BeginEnum => {
                entry.push(format!("        match self.{}() {{", accessor));
                entry.push("            Ok(value) => write!(out, \"{}\", value)?,".to_string());
                entry.push(format!("            Err(_) => write!(out, \"{{}}\", self.{}_raw())?,", accessor));
                entry.push("        }".to_string());
            }
            _ if is_guarded(Role::Decoder, scope, property.since_version()) => {
                entry.push(format!("        if let Some(value) = self.{}() {{", accessor));
                entry.push("            value.render(out)?;".to_string());
                entry.push("        }".to_string());
            }
            _ => {
                entry.push(format!("        self.{}().render(out)?;", accessor));
            }
        }
        Ok(Some(entry))
    }

    /// `render(&self)` for a composite decoder: `(a=1|b=2)`.
    pub(crate) fn composite_render(&self, properties: &[Property<'_>]) -> Result<Vec<String>, GeneratorError> {
        let mut entries = Vec::new();
        for property in properties {
            if let Some(entry) = self.property_entry(property, Scope::Composite)? {
                entries.push(entry);
            }
        }

        let mut code = vec![
            "    pub fn render<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {".to_string(),
            "        out.write_char('(')?;".to_string(),
        ];
        join_entries(entries, &mut code);
        code.push("        out.write_char(')')".to_string());
        code.push("    }".to_string());
        Ok(code)
    }

    /// `render_fields` for a message or group decoder: fixed fields, then every
    /// repetition of each group, then var-data, in declaration order.
    pub(crate) fn render_fields(&self, body: &Decomposition<'_>) -> Result<Vec<String>, GeneratorError> {
        let mut entries = Vec::new();

        for layout in split_fields(body.fields)? {
            if let Some(entry) = self.property_entry(&Property::from_field(&layout)?, Scope::Body)? {
                entries.push(entry);
            }
        }

        for group in split_groups(body.groups)? {
            let accessor = self.property_name(&group.token.name)?;
            entries.push(vec![
                format!("        out.write_str({})?;", quote(&format!("{}=[", group.token.name))),
                "        {".to_string(),
                format!("            let mut group = self.{}();", accessor),
                "            while group.has_next() {".to_string(),
                "                if group.index() >= 0 {".to_string(),
                "                    out.write_char(',')?;".to_string(),
                "                }".to_string(),
                "                group.next().map_err(|_| fmt::Error)?.render(out)?;".to_string(),
                "            }".to_string(),
                "        }".to_string(),
                "        out.write_char(']')?;".to_string(),
            ]);
        }

        for var_data in split_var_data(body.var_data)? {
            let accessor = self.property_name(&var_data.token.name)?;
            let mut entry = vec![entry_name(&var_data.token.name)];
            if var_data.data.encoding.character_encoding.is_some() {
                entry.push(format!("        out.write_str(&self.{}())?;", accessor));
            } else {
                entry.push(format!("        write!(out, \"{{}} raw bytes\", self.skip_{}())?;", accessor));
            }
            entries.push(entry);
        }

        let mut code = vec![
            String::new(),
            "    fn render_fields<W: fmt::Write>(&mut self, out: &mut W) -> fmt::Result {".to_string(),
        ];
        join_entries(entries, &mut code);
        code.push("        Ok(())".to_string());
        code.push("    }".to_string());
        Ok(code)
    }

    /// `render` for a message decoder. The limit is rewound to the end of the
    /// fixed block first and restored afterwards.
    pub(crate) fn message_render(&self, message: &Token) -> Vec<String> {
        vec![
            String::new(),
            "    pub fn render<W: fmt::Write>(&mut self, out: &mut W) -> fmt::Result {".to_string(),
            "        let original_limit = self.limit();".to_string(),
            "        self.set_limit(self.offset + self.acting_block_length as usize);".to_string(),
            "        let result = self.render_body(out);".to_string(),
            "        self.set_limit(original_limit);".to_string(),
            "        result".to_string(),
            "    }".to_string(),
            String::new(),
            "    fn render_body<W: fmt::Write>(&mut self, out: &mut W) -> fmt::Result {".to_string(),
            format!("        out.write_str({})?;", quote(&format!("[{}](sbeTemplateId=", message.name))),
            "        write!(out, \"{}\", Self::TEMPLATE_ID)?;".to_string(),
            "        out.write_str(\"|sbeSchemaId=\")?;".to_string(),
            "        write!(out, \"{}\", Self::SCHEMA_ID)?;".to_string(),
            "        out.write_str(\"|sbeSchemaVersion=\")?;".to_string(),
            "        if self.acting_version() != Self::SCHEMA_VERSION as u64 {".to_string(),
            "            write!(out, \"{}/\", self.acting_version())?;".to_string(),
            "        }".to_string(),
            "        write!(out, \"{}\", Self::SCHEMA_VERSION)?;".to_string(),
            "        out.write_str(\"|sbeBlockLength=\")?;".to_string(),
            "        if self.acting_block_length != Self::BLOCK_LENGTH {".to_string(),
            "            write!(out, \"{}/\", self.acting_block_length)?;".to_string(),
            "        }".to_string(),
            "        write!(out, \"{}\", Self::BLOCK_LENGTH)?;".to_string(),
            "        out.write_str(\"):\")?;".to_string(),
            "        self.render_fields(out)".to_string(),
            "    }".to_string(),
        ]
    }

    /// `render` for a group decoder: one repetition as `(…)`.
    pub(crate) fn group_render(&self) -> Vec<String> {
        vec![
            String::new(),
            "    pub fn render<W: fmt::Write>(&mut self, out: &mut W) -> fmt::Result {".to_string(),
            "        out.write_char('(')?;".to_string(),
            "        self.render_fields(out)?;".to_string(),
            "        out.write_char(')')".to_string(),
            "    }".to_string(),
        ]
    }
}
