use std::collections::HashSet;

use tracing::debug;

use crate::{
    decomposer::{decompose_message, split_fields, split_groups, split_var_data, Decomposition},
    error::GeneratorError,
    naming::is_valid_identifier,
    types::{HeaderStructure, Ir, Signal, Token},
};

fn unbalanced(tokens: &[Token], index: usize, msg: String) -> GeneratorError {
    let token = &tokens[index];
    GeneratorError::Unbalanced {
        name: token.name.clone(),
        signal: token.signal,
        index,
        msg,
    }
}

/// Walks a token list once, checking spans and collecting the composite, enum
/// and set subtrees that stand for a named type.
struct SpanChecker<'t> {
    tokens:     &'t [Token],
    references: Vec<&'t Token>,
}

impl<'t> SpanChecker<'t> {
    fn check(tokens: &'t [Token], what: &'static str) -> Result<Self, GeneratorError> {
        if tokens.is_empty() {
            return Err(GeneratorError::EmptyTokens(what));
        }
        let mut checker = SpanChecker { tokens, references: Vec::new() };
        let next = checker.subtree(0, tokens.len(), None)?;
        if let Some(extra) = tokens.get(next) {
            return Err(GeneratorError::UnexpectedToken {
                name: extra.name.clone(),
                signal: extra.signal,
                index: next,
            });
        }
        Ok(checker)
    }

    /// Checks the subtree at `index`, which must end before `limit`, and
    /// returns the index just past it.
    fn subtree(&mut self, index: usize, limit: usize, parent: Option<Signal>) -> Result<usize, GeneratorError> {
        let token = &self.tokens[index];
        if token.signal.is_end() {
            return Err(unbalanced(self.tokens, index, "end signal without a matching begin".to_string()));
        }
        let expected = match token.signal.end_signal() {
            Some(expected) => expected,
            None => return Ok(index + 1),
        };

        let count = token.component_token_count;
        if count < 2 || index + count > limit {
            return Err(unbalanced(
                self.tokens,
                index,
                format!("component token count {} overruns its enclosing span", count),
            ));
        }
        let end = index + count - 1;
        let close = &self.tokens[end];
        if close.signal != expected || close.name != token.name {
            return Err(unbalanced(
                self.tokens,
                index,
                format!("expected {:?} {} at index {} but found {:?} {}", expected, token.name, end, close.signal, close.name),
            ));
        }

        let names_a_type = matches!(token.signal, Signal::BeginComposite | Signal::BeginEnum | Signal::BeginSet);
        if names_a_type && matches!(parent, Some(Signal::BeginField) | Some(Signal::BeginComposite)) {
            self.references.push(token);
        }

        let mut i = index + 1;
        while i < end {
            i = self.subtree(i, end, Some(token.signal))?;
        }
        Ok(end + 1)
    }
}

fn check_names(tokens: &[Token]) -> Result<(), GeneratorError> {
    for token in tokens {
        if !is_valid_identifier(&token.name) {
            return Err(GeneratorError::InvalidName(token.name.clone()));
        }
        if let Some(referenced) = &token.referenced_name {
            if !is_valid_identifier(referenced) {
                return Err(GeneratorError::InvalidName(referenced.clone()));
            }
        }
    }
    Ok(())
}

fn require_unsigned(token: &Token) -> Result<(), GeneratorError> {
    let primitive_type = token.primitive_type()?;
    if !primitive_type.is_unsigned() {
        return Err(GeneratorError::UnsupportedPrimitive {
            name: token.name.clone(),
            primitive_type,
        });
    }
    Ok(())
}

fn verify_header(header: &HeaderStructure) -> Result<(), GeneratorError> {
    SpanChecker::check(&header.tokens, "header")?;
    let first = &header.tokens[0];
    if first.signal != Signal::BeginComposite {
        return Err(GeneratorError::Structure {
            expected: Signal::BeginComposite,
            found: first.signal,
            name: first.name.clone(),
        });
    }
    for name in [
        HeaderStructure::BLOCK_LENGTH,
        HeaderStructure::TEMPLATE_ID,
        HeaderStructure::SCHEMA_ID,
        HeaderStructure::SCHEMA_VERSION,
    ] {
        require_unsigned(header.field(name)?)?;
    }
    check_names(&header.tokens)
}

fn verify_body(body: &Decomposition<'_>) -> Result<(), GeneratorError> {
    for field in split_fields(body.fields)? {
        if field.type_tokens.is_empty() {
            return Err(GeneratorError::EmptyTokens("field type"));
        }
    }
    for group in split_groups(body.groups)? {
        require_unsigned(group.block_length)?;
        require_unsigned(group.num_in_group)?;
        verify_body(&group.body)?;
    }
    for var_data in split_var_data(body.var_data)? {
        require_unsigned(var_data.length)?;
    }
    Ok(())
}

/// Checks an IR once after loading so the generator can rely on well-formed
/// spans, a complete header and resolvable type references.
pub fn verify_ir(ir: &Ir) -> Result<(), GeneratorError> {
    verify_header(&ir.header)?;

    let mut defined: HashSet<&str> = HashSet::new();
    let mut references = Vec::new();
    for tokens in &ir.types {
        let checker = SpanChecker::check(tokens, "type")?;
        let first = &tokens[0];
        if !matches!(first.signal, Signal::BeginComposite | Signal::BeginEnum | Signal::BeginSet) {
            return Err(GeneratorError::Structure {
                expected: Signal::BeginComposite,
                found: first.signal,
                name: first.name.clone(),
            });
        }
        if !defined.insert(first.applicable_type_name()) {
            return Err(GeneratorError::DuplicateType(first.applicable_type_name().to_string()));
        }
        check_names(tokens)?;
        references.extend(checker.references);
    }
    if let Some(header_name) = ir.header.type_name() {
        defined.insert(header_name);
    }

    for tokens in &ir.messages {
        let checker = SpanChecker::check(tokens, "message")?;
        if tokens[0].signal != Signal::BeginMessage {
            return Err(GeneratorError::Structure {
                expected: Signal::BeginMessage,
                found: tokens[0].signal,
                name: tokens[0].name.clone(),
            });
        }
        check_names(tokens)?;
        verify_body(&decompose_message(tokens)?)?;
        references.extend(checker.references);
        debug!(message = %tokens[0].name, "verified message");
    }

    for token in references {
        if !defined.contains(token.applicable_type_name()) {
            return Err(GeneratorError::UnknownType {
                name: token.applicable_type_name().to_string(),
                field: token.name.clone(),
            });
        }
    }

    debug!(types = ir.types.len(), messages = ir.messages.len(), "verified IR");
    Ok(())
}
