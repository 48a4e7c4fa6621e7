//! `@define` / `@no_default_ops` directives and the table builder they drive

use std::sync::Arc;

use crate::error::SyntaxError;
use crate::operation::{DataUse, Operation, OperationTable, Output, RegisterUse};
use crate::parser::{Item, Line};

const REG_FORM: &str = "reg=(always|never|optional)";
const DATA_FORM: &str = "data=(none|binary|address)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Define(Arc<Operation>),
    ClearDefaults,
}

/// Parse the text following `@`.
pub fn parse_directive(body: &str) -> Result<Directive, SyntaxError> {
    let body = body.trim();
    if body == "no_default_ops" {
        return Ok(Directive::ClearDefaults);
    }
    match body.split_once(char::is_whitespace) {
        Some(("define", rest)) => Ok(Directive::Define(Arc::new(parse_definition(rest)?))),
        None if body == "define" => Err(SyntaxError::MissingToken {
            expected: "operation name",
            fragment: body.to_string(),
        }),
        _ => Err(SyntaxError::UnknownDirective(body.to_string())),
    }
}

/// `<NAME> reg=... data=... [unconditional-jump] [=> OUT[,OUT...]]`
pub fn parse_definition(text: &str) -> Result<Operation, SyntaxError> {
    let (head, outputs) = match text.split_once("=>") {
        Some((head, outputs)) => (head, Some(outputs)),
        None => (text, None),
    };

    let mut tokens = head.split_whitespace();
    let name = tokens.next().ok_or_else(|| SyntaxError::MissingToken {
        expected: "operation name",
        fragment: text.trim().to_string(),
    })?;
    if !is_operation_name(name) {
        return Err(SyntaxError::InvalidToken {
            token: name.to_string(),
            expected: "an operation name (letters, digits, `_`)",
        });
    }

    let head = head.trim();
    let register = keyword(head, tokens.next(), "reg=", REG_FORM, RegisterUse::from_keyword)?;
    let data = keyword(head, tokens.next(), "data=", DATA_FORM, DataUse::from_keyword)?;
    let mut op = Operation::new(name, register, data);

    for token in tokens {
        if token == "unconditional-jump" && !op.unconditional {
            op = op.unconditional();
        } else {
            return Err(SyntaxError::InvalidToken {
                token: token.to_string(),
                expected: "`unconditional-jump` or `=>`",
            });
        }
    }

    if let Some(outputs) = outputs {
        for part in outputs.split(',') {
            op = op.output(parse_output(part)?);
        }
    }
    Ok(op)
}

fn keyword<T>(
    head: &str,
    token: Option<&str>,
    prefix: &str,
    form: &'static str,
    lookup: fn(&str) -> Option<T>,
) -> Result<T, SyntaxError> {
    let token = token.ok_or_else(|| SyntaxError::MissingToken {
        expected: form,
        fragment: head.to_string(),
    })?;
    token
        .strip_prefix(prefix)
        .and_then(lookup)
        .ok_or_else(|| SyntaxError::InvalidToken {
            token: token.to_string(),
            expected: form,
        })
}

/// `<opcode-decimal> [no-reg] [no-data]`
fn parse_output(text: &str) -> Result<Output, SyntaxError> {
    let mut tokens = text.split_whitespace();
    let opcode = tokens.next().ok_or_else(|| SyntaxError::MissingToken {
        expected: "output opcode after `=>` or `,`",
        fragment: text.to_string(),
    })?;
    if opcode.is_empty() || !opcode.chars().all(|c| c.is_ascii_digit()) {
        return Err(SyntaxError::InvalidToken {
            token: opcode.to_string(),
            expected: "a decimal opcode",
        });
    }
    let opcode = opcode.parse::<u8>().map_err(|_| SyntaxError::InvalidToken {
        token: opcode.to_string(),
        expected: "a decimal opcode",
    })?;

    let mut output = Output::new(opcode);
    for token in tokens {
        output = match token {
            "no-reg" => output.without_register(),
            "no-data" => output.without_data(),
            other => return Err(SyntaxError::MissingComma(other.to_string())),
        };
    }
    Ok(output)
}

fn is_operation_name(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Folds directives over the default table, producing the effective table.
pub struct TableBuilder<'a> {
    defaults: &'a OperationTable,
    table: OperationTable,
}

impl<'a> TableBuilder<'a> {
    pub fn new(defaults: &'a OperationTable) -> Self {
        Self {
            defaults,
            table: defaults.clone(),
        }
    }

    pub fn apply(&mut self, directive: &Directive) {
        match directive {
            Directive::Define(op) => {
                tracing::debug!(name = %op.name, words = op.word_count(), "defining operation");
                self.table.insert(Arc::clone(op));
            }
            Directive::ClearDefaults => {
                self.table.remove_identical(self.defaults);
                tracing::debug!(remaining = self.table.len(), "cleared default operations");
            }
        }
    }

    /// Apply every directive found in `lines`, in source order.
    pub fn apply_lines(mut self, lines: &[Line]) -> Self {
        for line in lines {
            if let Some(Item::Attribute(directive)) = &line.item {
                self.apply(directive);
            }
        }
        self
    }

    pub fn build(self) -> OperationTable {
        self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_definition() {
        let op = parse_definition("jsr reg=never data=address unconditional-jump => 0 no-reg, 11 no-data no-reg")
            .unwrap();
        assert_eq!(op.name, "JSR");
        assert_eq!(op.register, RegisterUse::Never);
        assert_eq!(op.data, DataUse::Address);
        assert!(op.unconditional);
        assert_eq!(
            op.outputs,
            vec![
                Output::new(0).without_register(),
                Output::new(11).without_register().without_data(),
            ]
        );
    }

    #[test]
    fn definition_without_outputs_has_no_words() {
        let op = parse_definition("PAD reg=optional data=none").unwrap();
        assert_eq!(op.word_count(), 0);
        assert!(!op.unconditional);
    }

    #[test]
    fn reports_offending_tokens() {
        assert_eq!(
            parse_definition("X reg=sometimes data=none"),
            Err(SyntaxError::InvalidToken {
                token: "reg=sometimes".into(),
                expected: REG_FORM
            })
        );
        assert_eq!(
            parse_definition("X reg=never"),
            Err(SyntaxError::MissingToken {
                expected: DATA_FORM,
                fragment: "X reg=never".into()
            })
        );
        assert_eq!(
            parse_definition("X reg=never data=none => 1 2"),
            Err(SyntaxError::MissingComma("2".into()))
        );
        assert!(matches!(
            parse_definition("X reg=never data=none => one"),
            Err(SyntaxError::InvalidToken { .. })
        ));
        assert!(matches!(
            parse_definition("X reg=never data=none =>"),
            Err(SyntaxError::MissingToken { .. })
        ));
        assert!(matches!(
            parse_definition("X Reg=never data=none"),
            Err(SyntaxError::InvalidToken { .. })
        ));
    }

    #[test]
    fn parses_directive_keywords() {
        assert_eq!(parse_directive("no_default_ops"), Ok(Directive::ClearDefaults));
        assert!(matches!(
            parse_directive("define CALL reg=never data=address => 0"),
            Ok(Directive::Define(_))
        ));
        assert_eq!(
            parse_directive("include foo"),
            Err(SyntaxError::UnknownDirective("include foo".into()))
        );
        assert_eq!(
            parse_directive("define"),
            Err(SyntaxError::MissingToken {
                expected: "operation name",
                fragment: "define".into()
            })
        );
    }

    #[test]
    fn clear_defaults_preserves_earlier_redefinition() {
        let defaults = OperationTable::defaults();
        let mut builder = TableBuilder::new(&defaults);
        builder.apply(&parse_directive("define LD reg=always data=binary => 1").unwrap());
        builder.apply(&Directive::ClearDefaults);
        builder.apply(&parse_directive("define CALL reg=never data=address => 0").unwrap());
        let table = builder.build();
        assert_eq!(table.names(), vec!["CALL", "LD"]);
    }

    #[test]
    fn redefinition_after_clear_is_kept() {
        let defaults = OperationTable::defaults();
        let mut builder = TableBuilder::new(&defaults);
        builder.apply(&Directive::ClearDefaults);
        assert!(builder.table.is_empty());
        builder.apply(&parse_directive("define b reg=never data=address => 11").unwrap());
        assert_eq!(builder.build().names(), vec!["B"]);
    }
}
