//! Two-pass resolution: label collection, then validated encoding
//!
//! Both passes walk the parsed lines with the same routine. The pass decides
//! whether label references are resolved and statements validated. Pass 1
//! binds labels and only counts words; pass 2 reads labels and encodes.

use crate::encoder::{IMAGE_WORDS, Instruction, annotate};
use crate::error::{AsmError, SemanticError};
use crate::operation::{DataUse, Operation, OperationTable, RegisterUse};
use crate::parser::{Item, Line, Operand, Register, Statement};
use crate::symbol::LabelMap;

/// Callback for advisory warnings: `(message, zero-based line index)`.
pub type WarningSink<'a> = &'a mut dyn FnMut(&str, usize);

enum Pass<'l> {
    CollectingLabels(&'l mut LabelMap),
    Encoding(&'l LabelMap),
}

impl Pass<'_> {
    fn resolves_labels(&self) -> bool {
        matches!(self, Pass::Encoding(_))
    }

    fn validates_args(&self) -> bool {
        matches!(self, Pass::Encoding(_))
    }

    fn labels(&self) -> &LabelMap {
        match self {
            Pass::CollectingLabels(labels) => &**labels,
            Pass::Encoding(labels) => *labels,
        }
    }
}

/// Resolved data field, remembering where the value came from.
#[derive(Clone, Copy)]
enum Data {
    Literal(u32),
    Label(u32),
}

impl Data {
    fn value(self) -> u32 {
        match self {
            Data::Literal(value) | Data::Label(value) => value,
        }
    }
}

/// Pass 1: bind every label to the index of the next emitted word.
pub fn collect_labels(lines: &[Line], table: &OperationTable) -> Result<LabelMap, AsmError> {
    tracing::trace!("starting pass 1");
    let mut labels = LabelMap::new();
    let mut ignore = |_: &str, _: usize| {};
    let words = Walker::new(table, Pass::CollectingLabels(&mut labels), &mut ignore).run(lines)?;
    tracing::debug!(labels = labels.len(), words, "labels collected");
    Ok(labels)
}

/// Pass 2: validate statements and encode them against the final label map.
pub fn encode(
    lines: &[Line],
    table: &OperationTable,
    labels: &LabelMap,
    on_warning: WarningSink<'_>,
) -> Result<Vec<Instruction>, AsmError> {
    tracing::trace!("starting pass 2");
    let mut walker = Walker::new(table, Pass::Encoding(labels), on_warning);
    walker.run(lines)?;
    Ok(walker.words)
}

struct Walker<'t, 'l, 'w> {
    table: &'t OperationTable,
    pass: Pass<'l>,
    on_warning: WarningSink<'w>,
    words: Vec<Instruction>,
    emitted: usize,
    reachable: bool,
}

impl<'t, 'l, 'w> Walker<'t, 'l, 'w> {
    fn new(table: &'t OperationTable, pass: Pass<'l>, on_warning: WarningSink<'w>) -> Self {
        Self {
            table,
            pass,
            on_warning,
            words: Vec::new(),
            emitted: 0,
            reachable: true,
        }
    }

    /// Walk all lines; returns the number of emitted words.
    fn run(&mut self, lines: &[Line]) -> Result<usize, AsmError> {
        for (index, line) in lines.iter().enumerate() {
            self.line(index, line)
                .map_err(|err| err.at_line(index + 1, &line.raw))?;
        }
        Ok(self.emitted)
    }

    fn line(&mut self, index: usize, line: &Line) -> Result<(), AsmError> {
        match &line.item {
            None => Ok(()),
            Some(Item::Label(name)) => {
                self.reachable = true;
                if let Pass::CollectingLabels(labels) = &mut self.pass {
                    labels.bind(name, self.emitted)?;
                }
                Ok(())
            }
            Some(Item::Statement(stmt)) => self.statement(index, line, stmt),
            // already folded into the effective table
            Some(Item::Attribute(_)) => Ok(()),
        }
    }

    fn statement(&mut self, index: usize, line: &Line, stmt: &Statement) -> Result<(), AsmError> {
        let data = match &stmt.operand {
            Some(Operand::Value(value)) => Some(Data::Literal(*value)),
            Some(Operand::Label(name)) if self.pass.resolves_labels() => {
                let at = self
                    .pass
                    .labels()
                    .get(name)
                    .ok_or_else(|| SemanticError::UndefinedLabel(name.clone()))?;
                Some(Data::Label(u32::try_from(at).unwrap_or(u32::MAX)))
            }
            // addresses are not known yet
            Some(Operand::Label(_)) => None,
            None => None,
        };

        let table = self.table;
        let op = table
            .get(&stmt.operation)
            .ok_or_else(|| SemanticError::UnknownOperation(stmt.operation.clone()))?;

        if self.pass.validates_args() {
            self.validate(index, op, stmt, data)?;
        }

        if let Pass::Encoding(labels) = &self.pass {
            let register = stmt.register.is_some_and(Register::bit);
            let value = data.map_or(0, Data::value);
            let comment = annotate(
                line.public_comment.as_deref(),
                labels.labels_at(self.emitted),
                &line.code,
            );
            for output in &op.outputs {
                let data = if output.uses_data { value } else { 0 };
                let inst = Instruction::new(
                    u32::from(output.opcode),
                    output.uses_register && register,
                    data,
                    comment.clone(),
                )?;
                self.words.push(inst);
            }
            if self.words.len() > IMAGE_WORDS {
                return Err(SemanticError::ImageOverflow {
                    needed: self.words.len(),
                    capacity: IMAGE_WORDS,
                }
                .into());
            }
        }
        self.emitted += op.word_count();

        if op.unconditional {
            self.reachable = false;
        }
        Ok(())
    }

    fn validate(
        &mut self,
        index: usize,
        op: &Operation,
        stmt: &Statement,
        data: Option<Data>,
    ) -> Result<(), SemanticError> {
        let name = || op.name.clone();
        match (op.register, stmt.register) {
            (RegisterUse::Always, None) => return Err(SemanticError::RegisterRequired(name())),
            (RegisterUse::Never, Some(_)) => return Err(SemanticError::RegisterForbidden(name())),
            _ => {}
        }
        match (op.data, data) {
            (DataUse::Address, None) => Err(SemanticError::AddressRequired(name())),
            (DataUse::Address, Some(Data::Literal(addr))) => {
                if self.reachable {
                    let message = format!("branching to hard coded address {addr}");
                    (self.on_warning)(&message, index);
                }
                Ok(())
            }
            (DataUse::Binary, None) => Err(SemanticError::BinaryRequired(name())),
            (DataUse::Binary, Some(Data::Label(_))) => Err(SemanticError::LabelNotAllowed(name())),
            (DataUse::None, Some(_)) => Err(SemanticError::DataForbidden(name())),
            _ => Ok(()),
        }
    }
}
