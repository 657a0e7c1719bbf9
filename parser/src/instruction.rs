//! The instruction model and the builder that produces it.
//!
//! [`InstructionBuilder::build`] takes the words of one source line, looks up the opcode
//! in the [catalog](crate::catalog), checks the operand count and classifies every operand
//! against the [`OperandCategory`] expected in its position:
//!
//! ```
//! # use ippcode23_parser::LeniencyLevel;
//! # use ippcode23_parser::catalog::Opcode;
//! # use ippcode23_parser::instruction::*;
//! let mut builder = InstructionBuilder::new(LeniencyLevel::Lenient);
//! let instruction = builder.build(&["ADD", "GF@x", "int@1", "int@2"]).unwrap();
//!
//! assert_eq!(instruction.order(), 1);
//! assert_eq!(instruction.opcode(), Opcode::Add);
//! assert_eq!(instruction.operands()[0], Operand::Variable { frame: Frame::Global, name: "x".to_string() });
//! assert_eq!(instruction.operands()[1].int_value(), Some(1));
//! assert_eq!(instruction.to_string(), "ADD GF@x int@1 int@2");
//! ```
//!
//! Building is all-or-nothing. An instruction is either returned whole or not at all,
//! and only successful builds consume an order number.

use std::borrow::Cow;
use std::fmt::{Display, Formatter};

use log::trace;
use num_traits::Num;

use crate::LeniencyLevel;
use crate::catalog::{self, Opcode, OperandCategory, MAX_OPERANDS};
use crate::classify;
use crate::error::ParseError;

/// One of the three variable scopes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Frame {
    /// `GF`
    Global,
    /// `LF`
    Local,
    /// `TF`
    Temporary,
}

impl Frame {
    pub fn from_tag(tag: &str) -> Option<Frame> {
        match tag {
            "GF" => Some(Frame::Global),
            "LF" => Some(Frame::Local),
            "TF" => Some(Frame::Temporary),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Frame::Global => "GF",
            Frame::Local => "LF",
            Frame::Temporary => "TF",
        }
    }
}

/// The value types a constant (or a `READ`) can name.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ValueType {
    Int,
    Bool,
    String,
    Nil,
}

impl ValueType {
    /// Parse a case-sensitive type keyword.
    pub fn from_keyword(keyword: &str) -> Option<ValueType> {
        match keyword {
            "int" => Some(ValueType::Int),
            "bool" => Some(ValueType::Bool),
            "string" => Some(ValueType::String),
            "nil" => Some(ValueType::Nil),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            ValueType::Int => "int",
            ValueType::Bool => "bool",
            ValueType::String => "string",
            ValueType::Nil => "nil",
        }
    }
}

impl Display for ValueType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Radix {
    Decimal,
    Octal,
    Hexadecimal,
}

impl Radix {
    pub fn base(self) -> u32 {
        match self {
            Radix::Decimal => 10,
            Radix::Octal => 8,
            Radix::Hexadecimal => 16,
        }
    }
}

/// The text of an `int` constant, as written.
///
/// The text is kept because that's what gets serialized; the numeric value is derived from it.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct IntLiteral {
    pub text: String,
    pub radix: Radix,
}

impl IntLiteral {
    /// The numeric value, or `None` if it doesn't fit in an `i64`.
    pub fn value(&self) -> Option<i64> {
        let digits = match self.radix {
            Radix::Decimal => &self.text[..],
            // Skip the `0o` / `0x` prefix.
            Radix::Octal | Radix::Hexadecimal => &self.text[2..],
        };
        <i64 as Num>::from_str_radix(digits, self.radix.base()).ok()
    }
}

/// One realized operand of an instruction.
///
/// Which variants can occur depends on the [`OperandCategory`] of the operand's slot:
/// `Variable` slots only hold [`Operand::Variable`], `Type` slots only [`Operand::TypeKeyword`],
/// `Label` slots only [`Operand::Label`], and `Symbol` slots a variable or any constant.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Operand {
    Variable { frame: Frame, name: String },
    IntConstant(IntLiteral),
    BoolConstant(bool),
    NilConstant,
    /// The raw literal, escapes not decoded.
    StringConstant(String),
    /// A typed constant whose type isn't one this parser knows, passed through unvalidated.
    OtherConstant { type_tag: String, literal: String },
    TypeKeyword(ValueType),
    Label(String),
}

impl Operand {
    /// Lower-case type tag used in the XML encoding.
    pub fn type_tag(&self) -> Cow<'_, str> {
        match self {
            Operand::Variable { .. } => "var".into(),
            Operand::IntConstant(_) => "int".into(),
            Operand::BoolConstant(_) => "bool".into(),
            Operand::NilConstant => "nil".into(),
            Operand::StringConstant(_) => "string".into(),
            Operand::OtherConstant { type_tag, .. } => type_tag.to_lowercase().into(),
            Operand::TypeKeyword(_) => "type".into(),
            Operand::Label(_) => "label".into(),
        }
    }

    /// Literal text used as element content in the XML encoding.
    ///
    /// Variables keep their frame prefix; constants lose their type prefix.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Operand::Variable { frame, name } => format!("{}@{}", frame.tag(), name).into(),
            Operand::IntConstant(literal) => literal.text.as_str().into(),
            Operand::BoolConstant(value) => Cow::Borrowed(if *value { "true" } else { "false" }),
            Operand::NilConstant => "nil".into(),
            Operand::StringConstant(raw) => raw.as_str().into(),
            Operand::OtherConstant { literal, .. } => literal.as_str().into(),
            Operand::TypeKeyword(ty) => ty.keyword().into(),
            Operand::Label(name) => name.as_str().into(),
        }
    }

    pub fn int_value(&self) -> Option<i64> {
        if let Operand::IntConstant(literal) = self {
            literal.value()
        } else {
            None
        }
    }

    pub fn label(&self) -> Option<&str> {
        if let Operand::Label(name) = self {
            Some(name.as_str())
        } else {
            None
        }
    }

    /// The string constant with every `\ddd` escape replaced by the character it encodes.
    pub fn decoded_string(&self) -> Option<String> {
        if let Operand::StringConstant(raw) = self {
            Some(decode_escapes(raw))
        } else {
            None
        }
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Variable { .. } | Operand::TypeKeyword(_) | Operand::Label(_) => write!(f, "{}", self.text()),
            Operand::OtherConstant { type_tag, literal } => write!(f, "{}@{}", type_tag, literal),
            _ => write!(f, "{}@{}", self.type_tag(), self.text()),
        }
    }
}

/// Replace each `\ddd` escape in an already validated string literal.
pub fn decode_escapes(raw: &str) -> String {
    let mut decoded = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(backslash) = rest.find('\\') {
        decoded.push_str(&rest[..backslash]);
        let code = rest.get(backslash + 1..backslash + 4)
            .filter(|digits| digits.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|digits| digits.parse::<u32>().ok())
            .and_then(std::char::from_u32);
        match code {
            Some(c) => {
                decoded.push(c);
                rest = &rest[backslash + 4..];
            }
            None => {
                decoded.push('\\');
                rest = &rest[backslash + 1..];
            }
        }
    }
    decoded.push_str(rest);
    decoded
}

/// A validated instruction. Immutable once built.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Instruction {
    order: usize,
    opcode: Opcode,
    operands: Vec<Operand>,
}

impl Instruction {
    /// Position in the program, starting at 1.
    pub fn order(&self) -> usize {
        self.order
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.opcode)?;
        for operand in &self.operands {
            write!(f, " {}", operand)?;
        }
        Ok(())
    }
}

/// Builds [`Instruction`]s, numbering them in the order they're built.
///
/// One builder drives one translation run. Its counter starts at 1 and is never reset.
#[derive(Debug)]
pub struct InstructionBuilder {
    leniency: LeniencyLevel,
    next_order: usize,
}

impl InstructionBuilder {
    pub fn new(leniency: LeniencyLevel) -> Self {
        Self { leniency, next_order: 1 }
    }

    /// Order number the next successfully built instruction will get.
    pub fn next_order(&self) -> usize {
        self.next_order
    }

    pub fn build<S: AsRef<str>>(&mut self, tokens: &[S]) -> Result<Instruction, ParseError> {
        let (opcode, operands) = tokens.split_first()
            .ok_or_else(|| ParseError::Internal("instruction line without tokens".to_string()))?;

        let rule = catalog::lookup(opcode.as_ref())
            .ok_or_else(|| ParseError::UnknownOpcode { opcode: opcode.as_ref().to_string() })?;

        if rule.arity() > MAX_OPERANDS {
            return Err(ParseError::Internal(format!("{} declares {} operands", rule.mnemonic, rule.arity())));
        }

        if operands.len() != rule.arity() {
            return Err(ParseError::Arity {
                opcode: rule.opcode,
                expected: rule.arity(),
                found: operands.len(),
            });
        }

        let operands = rule.operands.iter()
            .zip(operands)
            .enumerate()
            .map(|(index, (category, token))| self.operand(index + 1, *category, token.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let instruction = Instruction {
            order: self.next_order,
            opcode: rule.opcode,
            operands,
        };
        self.next_order += 1;

        trace!("built instruction {}: {}", instruction.order, instruction);
        Ok(instruction)
    }

    fn operand(&self, slot: usize, category: OperandCategory, token: &str) -> Result<Operand, ParseError> {
        classify::classify(token, category, self.leniency)
            .map_err(|reason| ParseError::Operand {
                slot,
                expected: category,
                token: token.to_string(),
                reason,
            })
    }
}
