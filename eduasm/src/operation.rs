//! Operation records and the name -> operation table

use std::collections::HashMap;
use std::sync::Arc;

/// How a statement may name a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterUse {
    Always,
    Optional,
    Never,
}

impl RegisterUse {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "always" => Some(Self::Always),
            "optional" => Some(Self::Optional),
            "never" => Some(Self::Never),
            _ => None,
        }
    }
}

/// What kind of value a statement carries in its data field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataUse {
    None,
    Binary,
    Address,
}

impl DataUse {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "binary" => Some(Self::Binary),
            "address" => Some(Self::Address),
            _ => None,
        }
    }
}

/// One machine word produced by an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Output {
    pub opcode: u8,
    pub uses_register: bool,
    pub uses_data: bool,
}

impl Output {
    pub const fn new(opcode: u8) -> Self {
        Self {
            opcode,
            uses_register: true,
            uses_data: true,
        }
    }

    pub const fn without_register(mut self) -> Self {
        self.uses_register = false;
        self
    }

    pub const fn without_data(mut self) -> Self {
        self.uses_data = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// Uppercase name.
    pub name: String,
    pub register: RegisterUse,
    pub data: DataUse,
    /// Code after this operation is unreachable until the next label.
    pub unconditional: bool,
    pub outputs: Vec<Output>,
}

impl Operation {
    pub fn new(name: &str, register: RegisterUse, data: DataUse) -> Self {
        Self {
            name: name.to_ascii_uppercase(),
            register,
            data,
            unconditional: false,
            outputs: Vec::new(),
        }
    }

    pub fn unconditional(mut self) -> Self {
        self.unconditional = true;
        self
    }

    pub fn output(mut self, output: Output) -> Self {
        self.outputs.push(output);
        self
    }

    pub fn word_count(&self) -> usize {
        self.outputs.len()
    }
}

/// Maps uppercase operation names to shared operation records.
///
/// Records are reference counted so a table derived from another keeps the
/// very same instances; `@no_default_ops` relies on that identity.
#[derive(Debug, Clone, Default)]
pub struct OperationTable {
    ops: HashMap<String, Arc<Operation>>,
}

impl OperationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in instruction set.
    pub fn defaults() -> Self {
        use DataUse as D;
        use RegisterUse as R;

        let ops = [
            Operation::new("NOP", R::Never, D::None).output(Output::new(0)),
            Operation::new("LD", R::Always, D::Binary).output(Output::new(1)),
            Operation::new("ADD", R::Always, D::Binary).output(Output::new(2)),
            Operation::new("SUB", R::Always, D::Binary).output(Output::new(3)),
            Operation::new("AND", R::Always, D::Binary).output(Output::new(4)),
            Operation::new("OR", R::Always, D::Binary).output(Output::new(5)),
            Operation::new("XOR", R::Always, D::Binary).output(Output::new(6)),
            Operation::new("NOT", R::Always, D::None).output(Output::new(7)),
            Operation::new("IN", R::Always, D::None).output(Output::new(8)),
            Operation::new("OUT", R::Optional, D::None).output(Output::new(9)),
            Operation::new("CMP", R::Always, D::Binary).output(Output::new(10)),
            Operation::new("B", R::Never, D::Address)
                .unconditional()
                .output(Output::new(11)),
            Operation::new("BZ", R::Always, D::Address).output(Output::new(12)),
            Operation::new("BNZ", R::Always, D::Address).output(Output::new(13)),
            Operation::new("BC", R::Never, D::Address).output(Output::new(14)),
            Operation::new("HALT", R::Never, D::None)
                .unconditional()
                .output(Output::new(15)),
            // load, then output the loaded register
            Operation::new("WRITE", R::Always, D::Binary)
                .output(Output::new(1))
                .output(Output::new(9).without_data()),
        ];

        let mut table = Self::new();
        for op in ops {
            table.insert(Arc::new(op));
        }
        table
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Operation>> {
        self.ops.get(&name.to_ascii_uppercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Insert or replace an operation under its (uppercase) name.
    pub fn insert(&mut self, op: Arc<Operation>) -> Option<Arc<Operation>> {
        self.ops.insert(op.name.to_ascii_uppercase(), op)
    }

    /// Drop every entry that is still the same instance as in `originals`.
    pub fn remove_identical(&mut self, originals: &OperationTable) {
        self.ops.retain(|name, op| {
            !originals
                .ops
                .get(name)
                .is_some_and(|original| Arc::ptr_eq(original, op))
        });
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Operation names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.ops.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let table = OperationTable::defaults();
        assert!(table.contains("ld"));
        assert!(table.contains("Ld"));
        assert_eq!(table.get("bz").map(|op| op.name.as_str()), Some("BZ"));
    }

    #[test]
    fn default_opcodes_fit_four_bits() {
        let table = OperationTable::defaults();
        for name in table.names() {
            let op = table.get(name).unwrap();
            assert!(!op.outputs.is_empty(), "{name} has no output");
            assert!(op.outputs.iter().all(|out| out.opcode <= 15));
        }
    }

    #[test]
    fn write_expands_to_load_and_output() {
        let table = OperationTable::defaults();
        let write = table.get("WRITE").unwrap();
        assert_eq!(write.word_count(), 2);
        assert_eq!(write.outputs[0], Output::new(1));
        assert_eq!(write.outputs[1], Output::new(9).without_data());
    }

    #[test]
    fn remove_identical_keeps_replacements() {
        let originals = OperationTable::defaults();
        let mut table = originals.clone();
        table.insert(Arc::new(
            Operation::new("ld", RegisterUse::Always, DataUse::Binary).output(Output::new(1)),
        ));
        table.insert(Arc::new(
            Operation::new("call", RegisterUse::Never, DataUse::Address).output(Output::new(0)),
        ));
        table.remove_identical(&originals);
        assert_eq!(table.names(), vec!["CALL", "LD"]);
    }
}
