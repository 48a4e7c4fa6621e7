//! Error types for the assembler

use thiserror::Error;

/// Malformed source text. Every variant carries the fragment that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("label `{0}` must not contain whitespace")]
    LabelWhitespace(String),
    #[error("label name is empty in `{0}`")]
    EmptyLabel(String),
    #[error("unrecognized directive `@{0}`, expected `@define ...` or `@no_default_ops`")]
    UnknownDirective(String),
    #[error("missing {expected} in `{fragment}`")]
    MissingToken {
        expected: &'static str,
        fragment: String,
    },
    #[error("invalid token `{token}`, expected {expected}")]
    InvalidToken { token: String, expected: &'static str },
    #[error("unexpected token `{0}` after opcode, missing a comma?")]
    MissingComma(String),
    #[error("unexpected token `{0}`")]
    UnexpectedToken(String),
    #[error("invalid register `{0}`, expected R0 or R1")]
    InvalidRegister(String),
    #[error("invalid {kind} literal `{text}`")]
    InvalidNumber { text: String, kind: &'static str },
}

/// Source text that parses but cannot be assembled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    #[error("Unknown operation `{0}`")]
    UnknownOperation(String),
    #[error("Label defined multiple times: `{0}`")]
    DuplicateLabel(String),
    #[error("label never defined: `{0}`")]
    UndefinedLabel(String),
    #[error("operation {0} requires a register")]
    RegisterRequired(String),
    #[error("operation {0} does not take a register")]
    RegisterForbidden(String),
    #[error("operation {0} requires an address or label")]
    AddressRequired(String),
    #[error("operation {0} requires a binary value")]
    BinaryRequired(String),
    #[error("operation {0} takes a binary value, not a label")]
    LabelNotAllowed(String),
    #[error("operation {0} does not take data")]
    DataForbidden(String),
    #[error("value {value} does not fit in the {bits}-bit {field} field")]
    FieldOverflow {
        field: &'static str,
        bits: u32,
        value: u32,
    },
    #[error("program needs {needed} words but the image only holds {capacity}")]
    ImageOverflow { needed: usize, capacity: usize },
}

#[derive(Debug, Error)]
pub enum AsmError {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Semantic(#[from] SemanticError),
    #[error("line {line}: `{text}`")]
    AtLine {
        line: usize,
        text: String,
        #[source]
        source: Box<AsmError>,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AsmError {
    /// Attach a 1-based line number and the raw line text. An error that
    /// already carries a line keeps it.
    pub fn at_line(self, line: usize, text: &str) -> Self {
        match self {
            AsmError::AtLine { .. } => self,
            other => AsmError::AtLine {
                line,
                text: text.to_string(),
                source: Box::new(other),
            },
        }
    }

    pub fn line_number(&self) -> Option<usize> {
        match self {
            AsmError::AtLine { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// The innermost error, with any line wrapping removed.
    pub fn cause(&self) -> &AsmError {
        match self {
            AsmError::AtLine { source, .. } => source.cause(),
            other => other,
        }
    }

    pub fn as_syntax(&self) -> Option<&SyntaxError> {
        match self.cause() {
            AsmError::Syntax(err) => Some(err),
            _ => None,
        }
    }

    pub fn as_semantic(&self) -> Option<&SemanticError> {
        match self.cause() {
            AsmError::Semantic(err) => Some(err),
            _ => None,
        }
    }

    /// Full message chain, outermost first.
    pub fn chain_message(&self) -> String {
        match self {
            AsmError::AtLine { source, .. } => format!("{self}: {}", source.chain_message()),
            other => other.to_string(),
        }
    }
}
