//! Comment splitting and classification of source lines

use crate::directive::{Directive, parse_directive};
use crate::error::{AsmError, SemanticError, SyntaxError};
use crate::operation::{DataUse, OperationTable};

use super::number::NumberParser;

const PRIVATE_MARKER: char = '#';
const PUBLIC_MARKER: char = ';';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    R0,
    R1,
}

impl Register {
    /// Register bit value. R1 is the second register.
    pub fn bit(self) -> bool {
        matches!(self, Register::R1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Value(u32),
    Label(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Uppercase operation name.
    pub operation: String,
    pub register: Option<Register>,
    pub operand: Option<Operand>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Label(String),
    Statement(Statement),
    Attribute(Directive),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub raw: String,
    /// Text left after both comments are removed, trimmed.
    pub code: String,
    /// Emitted next to every word this line produces.
    pub public_comment: Option<String>,
    /// Never emitted.
    pub private_comment: Option<String>,
    pub item: Option<Item>,
}

/// Which items a parse materializes.
#[derive(Debug, Clone, Copy)]
pub enum ItemFilter<'a> {
    /// Directives only; labels and statements are left unclassified.
    Attributes,
    /// Everything. Statement literals are read according to the table.
    All(&'a OperationTable),
}

/// Parse every line of `source`. Errors carry the 1-based line number.
pub fn parse_source(source: &str, filter: ItemFilter<'_>) -> Result<Vec<Line>, AsmError> {
    source
        .lines()
        .enumerate()
        .map(|(index, raw)| {
            let raw = raw.trim_end_matches('\r');
            parse_line(raw, filter).map_err(|err| err.at_line(index + 1, raw))
        })
        .collect()
}

/// Parse a single line into its comment split and optional item
pub fn parse_line(raw: &str, filter: ItemFilter<'_>) -> Result<Line, AsmError> {
    let (rest, private_comment) = split_private(raw);
    let (code, public_comment) = match rest.split_once(PUBLIC_MARKER) {
        Some((code, comment)) => (code, non_empty(comment)),
        None => (rest.as_str(), None),
    };
    let code = code.trim().to_string();

    let item = classify(&code, filter)?;
    Ok(Line {
        raw: raw.to_string(),
        code,
        public_comment,
        private_comment,
        item,
    })
}

fn classify(code: &str, filter: ItemFilter<'_>) -> Result<Option<Item>, AsmError> {
    if let Some(body) = code.strip_prefix('@') {
        return Ok(Some(Item::Attribute(parse_directive(body)?)));
    }
    let ItemFilter::All(table) = filter else {
        return Ok(None);
    };
    if let Some(name) = code.strip_prefix(':') {
        return Ok(Some(Item::Label(parse_label(code, name)?)));
    }
    if code.is_empty() {
        return Ok(None);
    }
    Ok(Some(Item::Statement(parse_statement(code, table)?)))
}

fn parse_label(code: &str, name: &str) -> Result<String, SyntaxError> {
    if name.is_empty() {
        return Err(SyntaxError::EmptyLabel(code.to_string()));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(SyntaxError::LabelWhitespace(name.to_string()));
    }
    Ok(name.to_string())
}

/// `OP [R0|R1] [:label | literal...]`
fn parse_statement(code: &str, table: &OperationTable) -> Result<Statement, AsmError> {
    let mut tokens: Vec<&str> = code.split_whitespace().collect();
    let name = tokens.remove(0);
    let op = table
        .get(name)
        .ok_or_else(|| SemanticError::UnknownOperation(name.to_ascii_uppercase()))?;

    let register = match tokens.first() {
        Some(token) => parse_register(token)?,
        None => None,
    };
    if register.is_some() {
        tokens.remove(0);
    }

    let operand = match tokens.as_slice() {
        [] => None,
        [label] if label.starts_with(':') => Some(Operand::Label(parse_label(label, &label[1..])?)),
        [first, second, ..] if first.starts_with(':') => {
            return Err(SyntaxError::UnexpectedToken(second.to_string()).into());
        }
        groups if op.data == DataUse::Binary => {
            if let Some(label) = groups.iter().find(|t| t.starts_with(':')) {
                return Err(SyntaxError::UnexpectedToken(label.to_string()).into());
            }
            Some(Operand::Value(NumberParser::parse_binary_groups(
                groups.iter().copied(),
            )?))
        }
        [literal] => Some(Operand::Value(NumberParser::parse(literal)?)),
        [_, extra, ..] => return Err(SyntaxError::UnexpectedToken(extra.to_string()).into()),
    };

    Ok(Statement {
        operation: op.name.clone(),
        register,
        operand,
    })
}

fn parse_register(token: &str) -> Result<Option<Register>, SyntaxError> {
    match token.to_ascii_uppercase().as_str() {
        "R0" => Ok(Some(Register::R0)),
        "R1" => Ok(Some(Register::R1)),
        upper => match upper.strip_prefix('R') {
            Some(digits) if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) => {
                Err(SyntaxError::InvalidRegister(token.to_string()))
            }
            _ => Ok(None),
        },
    }
}

/// Split off the private comment at the first unescaped marker. `\#` in the
/// remaining text becomes a literal `#`.
fn split_private(raw: &str) -> (String, Option<String>) {
    let mut prev = None;
    for (pos, c) in raw.char_indices() {
        if c == PRIVATE_MARKER && prev != Some('\\') {
            let rest = unescape(&raw[..pos]);
            let comment = raw[pos + c.len_utf8()..].trim().to_string();
            return (rest, Some(comment));
        }
        prev = Some(c);
    }
    (unescape(raw), None)
}

fn unescape(text: &str) -> String {
    text.replace("\\#", "#")
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
