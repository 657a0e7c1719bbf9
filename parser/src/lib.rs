//! A parser for IPPcode23, a small three-address language.
//!
//! Source text goes through a short pipeline:
//!
//! 1. [`lines`] normalizes every raw line, dropping comments and blank lines.
//! 2. [`program`] checks the `.IPPcode23` header and feeds the remaining lines, split into
//!    words by the [`lexer`], to an [`InstructionBuilder`](instruction::InstructionBuilder).
//! 3. The builder looks each opcode up in the [`catalog`] and [`classify`]s its operands.
//! 4. The resulting [`Program`] can be written out as XML by [`xml`] or summarized by [`stats`].
//!
//! ```
//! # use ippcode23_parser::{translate, LeniencyLevel};
//! # use ippcode23_parser::xml::{to_xml, XmlOptions};
//! let program = translate(".IPPcode23\nDEFVAR GF@x # counter\n", LeniencyLevel::Lenient).unwrap();
//! assert_eq!(program.len(), 1);
//!
//! let xml = to_xml(&program, &XmlOptions { declaration: false, indent: None });
//! assert_eq!(xml, r#"<program language="IPPcode23"><instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@x</arg1></instruction></program>"#);
//! ```
//!
//! The first problem found ends the run. See [`error::Error`] for what is reported.

pub mod catalog;
pub mod classify;
pub mod error;
pub mod instruction;
pub mod lexer;
pub mod lines;
pub mod program;
pub mod stats;
pub mod xml;

pub use error::{Error, ParseError};
pub use program::{Program, Translator};

/// How much of the grammar's history to accept.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LeniencyLevel {
    /// The current grammar, including octal and hexadecimal int literals.
    Lenient,
    /// Signed decimal int literals only.
    Strict,
}

impl LeniencyLevel {
    pub fn non_decimal_ints_allowed(&self) -> bool {
        match self {
            LeniencyLevel::Lenient => true,
            LeniencyLevel::Strict => false,
        }
    }
}

impl Default for LeniencyLevel {
    fn default() -> Self {
        LeniencyLevel::Lenient
    }
}

/// Translate a whole source text in one go.
pub fn translate(source: &str, leniency: LeniencyLevel) -> Result<Program, Error> {
    Translator::new(leniency).translate_str(source)
}
