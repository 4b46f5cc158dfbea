use serde::Serialize;

use crate::{
    error::GeneratorError,
    types::{Ir, Signal, Token},
};

/// The three ordered partitions of a message or group body.
///
/// Each partition is a contiguous slice of the body it came from, so
/// concatenating `fields`, `groups` and `var_data` gives back the tokens
/// between the starting index and `next_index`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decomposition<'t> {
    pub fields:     &'t [Token],
    pub groups:     &'t [Token],
    pub var_data:   &'t [Token],
    pub next_index: usize,
}

/// A fixed-block field: its BeginField token and the type tokens inside it.
#[derive(Debug, Clone, Copy)]
pub struct FieldLayout<'t> {
    pub field:       &'t Token,
    pub type_tokens: &'t [Token],
}

impl<'t> FieldLayout<'t> {
    /// The token describing the field's type: an Encoding token or the Begin
    /// token of an enum, set or composite.
    pub fn type_token(&self) -> &'t Token {
        self.type_tokens.first().unwrap_or(self.field)
    }
}

/// A repeating group split into dimension header and recursively decomposed body.
#[derive(Debug, Clone, Copy)]
pub struct GroupLayout<'t> {
    pub token:        &'t Token,
    pub dimensions:   &'t Token,
    pub block_length: &'t Token,
    pub num_in_group: &'t Token,
    pub body:         Decomposition<'t>,
}

#[derive(Debug, Clone, Copy)]
pub struct VarDataLayout<'t> {
    pub token:  &'t Token,
    pub length: &'t Token,
    pub data:   &'t Token,
}

fn structure_error(expected: Signal, token: &Token) -> GeneratorError {
    GeneratorError::Structure {
        expected,
        found: token.signal,
        name:  token.name.clone(),
    }
}

/// Span of the subtree starting at `index`, checked against the slice bounds.
fn subtree_len(tokens: &[Token], index: usize) -> Result<usize, GeneratorError> {
    let token = &tokens[index];
    let count = token.component_token_count;
    if count < 2 || index + count > tokens.len() {
        return Err(GeneratorError::Unbalanced {
            name:   token.name.clone(),
            signal: token.signal,
            index,
            msg:    format!("component token count {} does not fit in {} tokens", count, tokens.len()),
        });
    }
    Ok(count)
}

/// Appends whole subtrees opened by `signal`, starting at `index`, and returns
/// the index of the first token that does not open such a subtree.
fn collect(signal: Signal, tokens: &[Token], index: usize) -> Result<usize, GeneratorError> {
    let mut i = index;
    while let Some(token) = tokens.get(i) {
        if token.signal != signal {
            break;
        }
        i += subtree_len(tokens, i)?;
    }
    Ok(i)
}

pub fn collect_fields(tokens: &[Token], index: usize) -> Result<(&[Token], usize), GeneratorError> {
    let end = collect(Signal::BeginField, tokens, index)?;
    Ok((&tokens[index..end], end))
}

pub fn collect_groups(tokens: &[Token], index: usize) -> Result<(&[Token], usize), GeneratorError> {
    let end = collect(Signal::BeginGroup, tokens, index)?;
    Ok((&tokens[index..end], end))
}

pub fn collect_var_data(tokens: &[Token], index: usize) -> Result<(&[Token], usize), GeneratorError> {
    let end = collect(Signal::BeginVarData, tokens, index)?;
    Ok((&tokens[index..end], end))
}

/// Splits `tokens[index..]` into fields, then groups, then var-data.
///
/// Subtrees are taken whole without looking inside them; a group's body is
/// only decomposed when [`split_groups`] reaches it.
pub fn decompose(tokens: &[Token], index: usize) -> Result<Decomposition<'_>, GeneratorError> {
    let (fields, index)     = collect_fields(tokens, index)?;
    let (groups, index)     = collect_groups(tokens, index)?;
    let (var_data, index)   = collect_var_data(tokens, index)?;
    Ok(Decomposition { fields, groups, var_data, next_index: index })
}

/// Index of the End token closing the subtree opened at `index`.
pub fn find_end_signal(tokens: &[Token], index: usize) -> Result<usize, GeneratorError> {
    let begin = &tokens[index];
    let expected = begin.signal.end_signal().ok_or_else(|| GeneratorError::UnexpectedToken {
        name:   begin.name.clone(),
        signal: begin.signal,
        index,
    })?;
    let end = index + subtree_len(tokens, index)? - 1;
    if tokens[end].signal != expected {
        return Err(GeneratorError::Unbalanced {
            name:   begin.name.clone(),
            signal: begin.signal,
            index,
            msg:    format!("expected {:?} at index {} but found {:?}", expected, end, tokens[end].signal),
        });
    }
    Ok(end)
}

/// The tokens between BeginMessage and EndMessage.
pub fn message_body(tokens: &[Token]) -> Result<&[Token], GeneratorError> {
    match tokens.first() {
        Some(first) if first.signal == Signal::BeginMessage && tokens.len() >= 2 => {
            Ok(&tokens[1..tokens.len() - 1])
        }
        Some(first) => Err(structure_error(Signal::BeginMessage, first)),
        None => Err(GeneratorError::EmptyTokens("message")),
    }
}

/// Decomposes a body that must be consumed completely.
fn decompose_complete(body: &[Token]) -> Result<Decomposition<'_>, GeneratorError> {
    let decomposition = decompose(body, 0)?;
    if let Some(extra) = body.get(decomposition.next_index) {
        return Err(GeneratorError::UnexpectedToken {
            name:   extra.name.clone(),
            signal: extra.signal,
            index:  decomposition.next_index,
        });
    }
    Ok(decomposition)
}

pub fn decompose_message(tokens: &[Token]) -> Result<Decomposition<'_>, GeneratorError> {
    decompose_complete(message_body(tokens)?)
}

pub fn split_fields(fields: &[Token]) -> Result<Vec<FieldLayout<'_>>, GeneratorError> {
    let mut layouts = Vec::new();
    let mut i = 0;
    while i < fields.len() {
        let field = &fields[i];
        if field.signal != Signal::BeginField {
            return Err(structure_error(Signal::BeginField, field));
        }
        let end = find_end_signal(fields, i)?;
        layouts.push(FieldLayout { field, type_tokens: &fields[i + 1..end] });
        i = end + 1;
    }
    Ok(layouts)
}

pub fn split_groups(groups: &[Token]) -> Result<Vec<GroupLayout<'_>>, GeneratorError> {
    let mut layouts = Vec::new();
    let mut i = 0;
    while i < groups.len() {
        let token = &groups[i];
        if token.signal != Signal::BeginGroup {
            return Err(structure_error(Signal::BeginGroup, token));
        }
        let end = find_end_signal(groups, i)?;

        let dimensions = groups.get(i + 1).filter(|t| t.signal == Signal::BeginComposite);
        let dimensions = dimensions.ok_or_else(|| structure_error(Signal::BeginComposite, &groups[i + 1]))?;
        let dimensions_end = find_end_signal(groups, i + 1)?;
        if dimensions_end >= end {
            return Err(GeneratorError::Unbalanced {
                name:   dimensions.name.clone(),
                signal: dimensions.signal,
                index:  i + 1,
                msg:    format!("dimension header overruns group {}", token.name),
            });
        }
        let block_length = encoding_at(groups, i + 2, dimensions_end)?;
        let num_in_group = encoding_at(groups, i + 3, dimensions_end)?;

        let body = decompose_complete(&groups[dimensions_end + 1..end])?;
        layouts.push(GroupLayout { token, dimensions, block_length, num_in_group, body });
        i = end + 1;
    }
    Ok(layouts)
}

pub fn split_var_data(var_data: &[Token]) -> Result<Vec<VarDataLayout<'_>>, GeneratorError> {
    let mut layouts = Vec::new();
    let mut i = 0;
    while i < var_data.len() {
        let token = &var_data[i];
        if token.signal != Signal::BeginVarData {
            return Err(structure_error(Signal::BeginVarData, token));
        }
        let end = find_end_signal(var_data, i)?;
        let length = encoding_at(var_data, i + 2, end)?;
        let data = encoding_at(var_data, i + 3, end)?;
        layouts.push(VarDataLayout { token, length, data });
        i = end + 1;
    }
    Ok(layouts)
}

/// The Encoding token at `index`, which must sit before `limit`.
fn encoding_at(tokens: &[Token], index: usize, limit: usize) -> Result<&Token, GeneratorError> {
    match tokens.get(index) {
        Some(token) if index < limit && token.signal == Signal::Encoding => Ok(token),
        Some(token) => Err(structure_error(Signal::Encoding, token)),
        None => Err(structure_error(Signal::Encoding, &tokens[tokens.len() - 1])),
    }
}

/// Names of everything a message or group body contains, for inspection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyLayout {
    pub name:          String,
    pub id:            i32,
    pub since_version: u32,
    pub block_length:  usize,
    pub fields:        Vec<String>,
    pub groups:        Vec<BodyLayout>,
    pub var_data:      Vec<String>,
}

fn describe_body(token: &Token, body: &Decomposition<'_>) -> Result<BodyLayout, GeneratorError> {
    let fields = split_fields(body.fields)?
        .iter()
        .map(|layout| layout.field.name.clone())
        .collect();
    let groups = split_groups(body.groups)?
        .iter()
        .map(|group| describe_body(group.token, &group.body))
        .collect::<Result<Vec<_>, _>>()?;
    let var_data = split_var_data(body.var_data)?
        .iter()
        .map(|layout| layout.token.name.clone())
        .collect();

    Ok(BodyLayout {
        name:          token.name.clone(),
        id:            token.id,
        since_version: token.version,
        block_length:  token.encoded_length,
        fields,
        groups,
        var_data,
    })
}

/// Decomposes every message of `ir`, recursing into groups.
pub fn describe_messages(ir: &Ir) -> Result<Vec<BodyLayout>, GeneratorError> {
    ir.messages
        .iter()
        .map(|tokens| {
            let decomposition = decompose_message(tokens)?;
            describe_body(&tokens[0], &decomposition)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{self, encoding};
    use crate::types::{Encoding, PrimitiveType};

    fn order_message() -> Vec<Token> {
        builder::message(
            "Order",
            1,
            4,
            vec![
                builder::field("quantity", 1, 0, vec![encoding("quantity", 0, Encoding::new(PrimitiveType::Uint32))]),
                builder::group(
                    "fills",
                    2,
                    0,
                    2,
                    builder::group_size_encoding(),
                    vec![builder::field("price", 3, 0, vec![encoding("price", 0, Encoding::new(PrimitiveType::Int16))])],
                ),
                builder::var_data("note", 4, 0, builder::var_data_encoding(Some("UTF-8"))),
            ],
        )
    }

    #[test]
    fn partitions_message_body() {
        let tokens = order_message();
        let d = decompose_message(&tokens).expect("decompose failed");
        assert_eq!(d.fields.len(), 3);
        assert_eq!(d.groups.len(), 1 + 4 + 3 + 1);
        assert_eq!(d.var_data.len(), 6);
        assert_eq!(d.next_index, tokens.len() - 2);
        assert_eq!(d.fields[0].name, "quantity");
        assert_eq!(d.groups[0].name, "fills");
        assert_eq!(d.var_data[0].name, "note");
    }

    #[test]
    fn splits_groups_with_dimensions() {
        let tokens = order_message();
        let d = decompose_message(&tokens).expect("decompose failed");
        let groups = split_groups(d.groups).expect("split failed");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].dimensions.name, "groupSizeEncoding");
        assert_eq!(groups[0].block_length.name, "blockLength");
        assert_eq!(groups[0].num_in_group.name, "numInGroup");
        assert_eq!(groups[0].body.fields[0].name, "price");
        assert!(groups[0].body.groups.is_empty());
    }

    #[test]
    fn splits_var_data_into_length_and_payload() {
        let tokens = order_message();
        let d = decompose_message(&tokens).expect("decompose failed");
        let var_data = split_var_data(d.var_data).expect("split failed");
        assert_eq!(var_data[0].length.name, "length");
        assert_eq!(var_data[0].data.encoding.character_encoding.as_deref(), Some("UTF-8"));
    }

    #[test]
    fn field_after_group_is_rejected() {
        let mut tokens = order_message();
        let stray = builder::field("late", 9, 0, vec![encoding("late", 0, Encoding::new(PrimitiveType::Uint8))]);
        let at = tokens.len() - 1;
        tokens.splice(at..at, stray);
        tokens[0].component_token_count += 3;
        let count = tokens[0].component_token_count;
        let last = tokens.len() - 1;
        tokens[last].component_token_count = count;

        match decompose_message(&tokens) {
            Err(GeneratorError::UnexpectedToken { name, signal, .. }) => {
                assert_eq!(name, "late");
                assert_eq!(signal, Signal::BeginField);
            }
            other => panic!("expected UnexpectedToken, got {:?}", other),
        }
    }

    #[test]
    fn split_groups_requires_begin_group() {
        let tokens = builder::var_data("note", 4, 0, builder::var_data_encoding(None));
        let err = split_groups(&tokens).unwrap_err();
        assert_eq!(
            err.to_string(),
            "tokens must begin with BeginGroup: token=note signal=BeginVarData"
        );
    }

    #[test]
    fn oversized_component_count_is_unbalanced() {
        let mut tokens = order_message();
        tokens[1].component_token_count = 500;
        assert!(matches!(
            decompose_message(&tokens),
            Err(GeneratorError::Unbalanced { .. })
        ));
    }

    #[test]
    fn describes_nested_layout() {
        let ir = Ir::new("demo", 1, 0, builder::message_header()).with_message(order_message());
        let layouts = describe_messages(&ir).expect("describe failed");
        assert_eq!(layouts[0].name, "Order");
        assert_eq!(layouts[0].fields, vec!["quantity"]);
        assert_eq!(layouts[0].groups[0].name, "fills");
        assert_eq!(layouts[0].groups[0].fields, vec!["price"]);
        assert_eq!(layouts[0].var_data, vec!["note"]);
    }
}
