//! Assembler for a small 16-bit-word educational CPU, with optional
//! human-readable listing (feature: "listing")
//!
//! Each machine word holds a 4-bit opcode, a register-select bit and a 7-bit
//! immediate or address. A program assembles to an image of exactly 64
//! words, one `HHHH;comment` line per word.
//!
//! ## Source format
//! - `:name` binds a label to the next emitted word.
//! - `OP [R0|R1] [operand]` is a statement. Binary operands may be split
//!   into groups (`LD R0 000 1010`); addresses are decimal (`B 5`) or a
//!   label reference (`B :loop`).
//! - `; text` is a public comment, copied into the output.
//! - `# text` is a private comment, dropped. `\#` is a literal `#`.
//! - **Directives**:
//!   - `@define NAME reg=... data=... [unconditional-jump] [=> OUT[,OUT...]]`
//!     adds or replaces an operation.
//!   - `@no_default_ops` drops every built-in operation not redefined so far.
//!
//! ## Optional Features
//! - `listing`: [`Image::listing`] and [`Image::write_listing`].
//!
//! ## Basic Usage
//! ```rust
//! fn main() -> Result<(), eduasm::AsmError> {
//!     let src = ":main\nLD R0 000 1010\nSUB R0 000 0001\nBZ R0 :done\nB :main\n:done";
//!     let image = eduasm::Assembler::new().assemble(src)?;
//!
//!     assert_eq!(image.words()[..4], [0x020a, 0x0601, 0x1804, 0x1600]);
//!     assert_eq!(image.labels().get("done"), Some(4));
//!     assert_eq!(image.to_string().lines().count(), 64);
//!     Ok(())
//! }
//! ```
//!
//! ## License
//! This project is released under [The Unlicense](https://unlicense.org/).
//! You are free to use it for any purpose, without restriction.

mod assembler;
mod directive;
mod encoder;
mod error;
mod operation;
mod parser;
mod resolver;
mod symbol;

// Public exports
pub use assembler::Assembler;
pub use directive::{Directive, TableBuilder, parse_definition, parse_directive};
pub use encoder::{IMAGE_WORDS, Image, Instruction, decode_word, encode_word};
pub use error::{AsmError, SemanticError, SyntaxError};
pub use operation::{DataUse, Operation, OperationTable, Output, RegisterUse};
pub use parser::{Item, ItemFilter, Line, Operand, Register, Statement, parse_line, parse_source};
pub use resolver::{WarningSink, collect_labels, encode};
pub use symbol::LabelMap;

/// Assemble `src` with the built-in instruction set and return the text
/// image. Warnings are logged.
pub fn assemble(src: &str) -> Result<String, AsmError> {
    Assembler::new().assemble_text(src)
}
