//! Main assembler implementation

use crate::directive::TableBuilder;
use crate::encoder::Image;
use crate::error::AsmError;
use crate::operation::OperationTable;
use crate::parser::{ItemFilter, Line, parse_source};
use crate::resolver::{collect_labels, encode};

/// Assembles source text into a program [`Image`].
///
/// The default operation table is built once and never mutated; every run
/// folds the file's directives over a copy of it.
pub struct Assembler {
    defaults: OperationTable,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Assembler {
    pub fn new() -> Self {
        Self::with_operations(OperationTable::defaults())
    }

    /// Use `defaults` in place of the built-in instruction set.
    pub fn with_operations(defaults: OperationTable) -> Self {
        Self { defaults }
    }

    pub fn operations(&self) -> &OperationTable {
        &self.defaults
    }

    // ===== Public API =====

    /// Assemble `src`, logging warnings.
    pub fn assemble(&self, src: &str) -> Result<Image, AsmError> {
        self.assemble_with_warnings(src, |message, index| {
            tracing::warn!(line = index + 1, "{message}");
        })
    }

    /// Assemble `src`, reporting each warning as `(message, zero-based line)`.
    pub fn assemble_with_warnings<F>(&self, src: &str, mut on_warning: F) -> Result<Image, AsmError>
    where
        F: FnMut(&str, usize),
    {
        let table = self.effective_operations(src)?;
        let lines = parse_source(src, ItemFilter::All(&table))?;
        let labels = collect_labels(&lines, &table)?;
        let instructions = encode(&lines, &table, &labels, &mut on_warning)?;
        Ok(Image::new(instructions, labels)?)
    }

    /// Assemble `src` to the 64-line text image.
    pub fn assemble_text(&self, src: &str) -> Result<String, AsmError> {
        Ok(self.assemble(src)?.to_string())
    }

    /// The operation table after applying every directive in `src`.
    pub fn effective_operations(&self, src: &str) -> Result<OperationTable, AsmError> {
        let directives: Vec<Line> = parse_source(src, ItemFilter::Attributes)?;
        let table = TableBuilder::new(&self.defaults)
            .apply_lines(&directives)
            .build();
        tracing::debug!(operations = table.len(), "operation table ready");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SemanticError;

    #[test]
    fn directives_apply_before_statements() {
        // the definition comes after its first use
        let src = "CALL :f\n:f\nHALT\n@define CALL reg=never data=address => 0";
        let image = Assembler::new().assemble(src).unwrap();
        assert_eq!(image.words()[0], 0x0001);
    }

    #[test]
    fn custom_default_table() {
        let asm = Assembler::with_operations(OperationTable::new());
        let err = asm.assemble("NOP").unwrap_err();
        assert_eq!(
            err.as_semantic(),
            Some(&SemanticError::UnknownOperation("NOP".into()))
        );
        assert!(asm.operations().is_empty());
    }

    #[test]
    fn effective_operations_reflect_directives() {
        let asm = Assembler::new();
        let table = asm
            .effective_operations("@no_default_ops\n@define PING reg=optional data=none => 9")
            .unwrap();
        assert_eq!(table.names(), vec!["PING"]);
        assert_eq!(asm.operations().len(), OperationTable::defaults().len());
    }

    #[test]
    fn zero_word_operation_emits_nothing() {
        let src = "@define MARK reg=never data=none\nMARK\nNOP";
        let image = Assembler::new().assemble(src).unwrap();
        assert_eq!(image.instructions().len(), 1);
        assert_eq!(image.instructions()[0].comment(), "(Assembly: NOP)");
    }
}
