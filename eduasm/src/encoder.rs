//! Word encoding and the fixed-size program image

use std::fmt;
#[cfg(feature = "listing")]
use std::io::{self, Write};

use crate::error::SemanticError;
use crate::symbol::LabelMap;

/// Number of words in the target's instruction memory.
pub const IMAGE_WORDS: usize = 64;

pub const OPCODE_BITS: u32 = 4;
pub const DATA_BITS: u32 = 7;

const OPCODE_SHIFT: u32 = 9;
const REGISTER_SHIFT: u32 = 8;
const MAX_OPCODE: u32 = (1 << OPCODE_BITS) - 1;
const MAX_DATA: u32 = (1 << DATA_BITS) - 1;

/// Pack the fields into a word. Out-of-range fields are errors, never
/// truncated.
pub fn encode_word(opcode: u32, register: bool, data: u32) -> Result<u16, SemanticError> {
    check_field("opcode", OPCODE_BITS, opcode)?;
    check_field("data", DATA_BITS, data)?;
    let word = (opcode << OPCODE_SHIFT) | (u32::from(register) << REGISTER_SHIFT) | data;
    // at most 13 bits wide
    Ok(word as u16)
}

/// Split a word into `(opcode, register, data)`.
pub fn decode_word(word: u16) -> (u8, bool, u8) {
    let word = u32::from(word);
    let opcode = (word >> OPCODE_SHIFT) & MAX_OPCODE;
    let register = (word >> REGISTER_SHIFT) & 1 == 1;
    let data = word & MAX_DATA;
    (opcode as u8, register, data as u8)
}

fn check_field(field: &'static str, bits: u32, value: u32) -> Result<(), SemanticError> {
    if value >= 1 << bits {
        return Err(SemanticError::FieldOverflow { field, bits, value });
    }
    Ok(())
}

/// `(Assembly: <labels> <code>)`, preceded by the public comment if any.
pub fn annotate<'a, I>(public_comment: Option<&str>, labels: I, code: &str) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut parts: Vec<String> = labels.into_iter().map(|label| format!(":{label}")).collect();
    if !code.is_empty() {
        parts.push(code.to_string());
    }
    let annotation = format!("(Assembly: {})", parts.join(" "));
    match public_comment {
        Some(comment) => format!("{comment} {annotation}"),
        None => annotation,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    opcode: u8,
    register: bool,
    data: u8,
    comment: String,
}

impl Instruction {
    pub fn new(
        opcode: u32,
        register: bool,
        data: u32,
        comment: String,
    ) -> Result<Self, SemanticError> {
        let (opcode, register, data) = decode_word(encode_word(opcode, register, data)?);
        Ok(Self {
            opcode,
            register,
            data,
            comment,
        })
    }

    pub fn opcode(&self) -> u8 {
        self.opcode
    }

    pub fn register(&self) -> bool {
        self.register
    }

    pub fn data(&self) -> u8 {
        self.data
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn word(&self) -> u16 {
        (u16::from(self.opcode) << OPCODE_SHIFT)
            | (u16::from(self.register) << REGISTER_SHIFT)
            | u16::from(self.data)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x};{}", self.word(), self.comment)
    }
}

/// A complete assembled program, padded to [`IMAGE_WORDS`] on output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    instructions: Vec<Instruction>,
    labels: LabelMap,
}

impl Image {
    pub fn new(instructions: Vec<Instruction>, labels: LabelMap) -> Result<Self, SemanticError> {
        if instructions.len() > IMAGE_WORDS {
            return Err(SemanticError::ImageOverflow {
                needed: instructions.len(),
                capacity: IMAGE_WORDS,
            });
        }
        Ok(Self {
            instructions,
            labels,
        })
    }

    /// Emitted instructions, without padding.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn labels(&self) -> &LabelMap {
        &self.labels
    }

    /// All [`IMAGE_WORDS`] words, padding included.
    pub fn words(&self) -> Vec<u16> {
        let mut words: Vec<u16> = self.instructions.iter().map(Instruction::word).collect();
        words.resize(IMAGE_WORDS, 0);
        words
    }

    /// The [`IMAGE_WORDS`] output lines, `HHHH;comment` each.
    pub fn lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.instructions.iter().map(ToString::to_string).collect();
        if lines.len() < IMAGE_WORDS {
            if let Some(annotation) = self.trailing_annotation() {
                lines.push(format!("{:04x};{}", 0, annotation));
            }
        }
        lines.resize(IMAGE_WORDS, format!("{:04x};", 0));
        lines
    }

    /// Labels bound after the last instruction annotate the first filler word.
    fn trailing_annotation(&self) -> Option<String> {
        let mut labels = self.labels.labels_at(self.instructions.len()).peekable();
        labels.peek()?;
        Some(annotate(None, labels, ""))
    }

    #[cfg(feature = "listing")]
    pub fn listing(&self) -> String {
        let mut out = Vec::new();
        // writing into a Vec cannot fail
        let _ = self.write_listing(&mut out);
        String::from_utf8_lossy(&out).into_owned()
    }

    #[cfg(feature = "listing")]
    pub fn write_listing<W: Write>(&self, mut w: W) -> io::Result<()> {
        writeln!(w, "Program Listing:")?;
        writeln!(w, "Addr  Word  Op  Reg  Data     Comment")?;
        writeln!(w, "{}", "-".repeat(60))?;
        for (addr, inst) in self.instructions.iter().enumerate() {
            writeln!(
                w,
                "{:>4}  {:04x}  {:>2}  R{}   {:07b}  {}",
                addr,
                inst.word(),
                inst.opcode(),
                u8::from(inst.register()),
                inst.data(),
                inst.comment()
            )?;
        }
        let used = self.instructions.len();
        writeln!(w, "{}", "-".repeat(60))?;
        writeln!(w, "{used} of {IMAGE_WORDS} words used")?;
        for (name, at) in self.labels.iter() {
            writeln!(w, ":{name:<16} {at:>4}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
