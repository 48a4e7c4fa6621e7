//! Parser module for assembly source

pub mod line;
pub mod number;

pub use line::{
    Item, ItemFilter, Line, Operand, Register, Statement, parse_line, parse_source,
};
