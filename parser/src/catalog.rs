//! The IPPcode23 instruction set.
//!
//! Every instruction is described by one [`InstructionRule`]: its mnemonic and the
//! ordered list of [`OperandCategory`]s its operands must belong to. The rules live in
//! one static table, [`RULES`], which is the only place the grammar of individual
//! instructions is spelled out.
//!
//! ```
//! # use ippcode23_parser::catalog::*;
//! let rule = lookup("jumpifeq").unwrap();
//! assert_eq!(rule.opcode, Opcode::JumpIfEq);
//! assert_eq!(rule.operands, &[OperandCategory::Label, OperandCategory::Symbol, OperandCategory::Symbol]);
//! assert!(lookup("FROB").is_none());
//! ```

use std::fmt::{Display, Formatter};

/// Most operands any instruction takes.
pub const MAX_OPERANDS: usize = 3;

/// The kind of operand an instruction expects in a given position.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OperandCategory {
    /// A variable reference, e.g. `GF@counter`.
    Variable,
    /// A variable reference or a typed constant, e.g. `int@42`.
    Symbol,
    /// A type keyword, e.g. `string`.
    Type,
    /// A label name, e.g. `loop_start`.
    Label,
}

impl OperandCategory {
    pub fn name(&self) -> &'static str {
        match self {
            OperandCategory::Variable => "var",
            OperandCategory::Symbol => "symb",
            OperandCategory::Type => "type",
            OperandCategory::Label => "label",
        }
    }
}

impl Display for OperandCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A specific IPPcode23 opcode.
///
/// Represents a *case-insensitive* mnemonic in the source code;
/// `MOVE`, `move` and `Move` all denote [`Opcode::Move`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Opcode {
    // Frames, function calls
    Move,
    CreateFrame,
    PushFrame,
    PopFrame,
    DefVar,
    Call,
    Return,

    // Data stack
    PushS,
    PopS,

    // Arithmetic, relational, boolean and conversion
    Add,
    Sub,
    Mul,
    IDiv,
    Lt,
    Gt,
    Eq,
    And,
    Or,
    Not,
    Int2Char,
    Stri2Int,

    // Input/output
    Read,
    Write,

    // Strings
    Concat,
    StrLen,
    GetChar,
    SetChar,

    // Types
    Type,

    // Program flow
    Label,
    Jump,
    JumpIfEq,
    JumpIfNeq,
    Exit,

    // Debugging
    DPrint,
    Break,
}

impl Opcode {
    /// The rule describing this opcode's operands.
    pub fn rule(self) -> &'static InstructionRule {
        &RULES[self as usize]
    }

    /// Canonical, upper-case mnemonic.
    pub fn mnemonic(self) -> &'static str {
        self.rule().mnemonic
    }

    /// Whether the instruction may transfer control elsewhere.
    pub fn is_jump(self) -> bool {
        matches!(self, Opcode::Call | Opcode::Return | Opcode::Jump | Opcode::JumpIfEq | Opcode::JumpIfNeq)
    }
}

impl Display for Opcode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

/// Template every instruction with the given opcode must follow.
#[derive(Debug, Eq, PartialEq)]
pub struct InstructionRule {
    pub opcode: Opcode,
    pub mnemonic: &'static str,
    pub operands: &'static [OperandCategory],
}

impl InstructionRule {
    pub fn arity(&self) -> usize {
        self.operands.len()
    }
}

const fn rule(opcode: Opcode, mnemonic: &'static str, operands: &'static [OperandCategory]) -> InstructionRule {
    InstructionRule { opcode, mnemonic, operands }
}

const NONE: &[OperandCategory] = &[];
const VAR: &[OperandCategory] = &[OperandCategory::Variable];
const SYMB: &[OperandCategory] = &[OperandCategory::Symbol];
const LABEL: &[OperandCategory] = &[OperandCategory::Label];
const VAR_SYMB: &[OperandCategory] = &[OperandCategory::Variable, OperandCategory::Symbol];
const VAR_TYPE: &[OperandCategory] = &[OperandCategory::Variable, OperandCategory::Type];
const VAR_SYMB_SYMB: &[OperandCategory] = &[OperandCategory::Variable, OperandCategory::Symbol, OperandCategory::Symbol];
const LABEL_SYMB_SYMB: &[OperandCategory] = &[OperandCategory::Label, OperandCategory::Symbol, OperandCategory::Symbol];

/// Every instruction of the language, in [`Opcode`] declaration order.
pub static RULES: [InstructionRule; 35] = {
    use Opcode::*;
    [
        rule(Move,        "MOVE",        VAR_SYMB),
        rule(CreateFrame, "CREATEFRAME", NONE),
        rule(PushFrame,   "PUSHFRAME",   NONE),
        rule(PopFrame,    "POPFRAME",    NONE),
        rule(DefVar,      "DEFVAR",      VAR),
        rule(Call,        "CALL",        LABEL),
        rule(Return,      "RETURN",      NONE),

        rule(PushS,       "PUSHS",       SYMB),
        rule(PopS,        "POPS",        VAR),

        rule(Add,         "ADD",         VAR_SYMB_SYMB),
        rule(Sub,         "SUB",         VAR_SYMB_SYMB),
        rule(Mul,         "MUL",         VAR_SYMB_SYMB),
        rule(IDiv,        "IDIV",        VAR_SYMB_SYMB),
        rule(Lt,          "LT",          VAR_SYMB_SYMB),
        rule(Gt,          "GT",          VAR_SYMB_SYMB),
        rule(Eq,          "EQ",          VAR_SYMB_SYMB),
        rule(And,         "AND",         VAR_SYMB_SYMB),
        rule(Or,          "OR",          VAR_SYMB_SYMB),
        rule(Not,         "NOT",         VAR_SYMB),
        rule(Int2Char,    "INT2CHAR",    VAR_SYMB),
        rule(Stri2Int,    "STRI2INT",    VAR_SYMB_SYMB),

        rule(Read,        "READ",        VAR_TYPE),
        rule(Write,       "WRITE",       SYMB),

        rule(Concat,      "CONCAT",      VAR_SYMB_SYMB),
        rule(StrLen,      "STRLEN",      VAR_SYMB),
        rule(GetChar,     "GETCHAR",     VAR_SYMB_SYMB),
        rule(SetChar,     "SETCHAR",     VAR_SYMB_SYMB),

        rule(Type,        "TYPE",        VAR_SYMB),

        rule(Label,       "LABEL",       LABEL),
        rule(Jump,        "JUMP",        LABEL),
        rule(JumpIfEq,    "JUMPIFEQ",    LABEL_SYMB_SYMB),
        rule(JumpIfNeq,   "JUMPIFNEQ",   LABEL_SYMB_SYMB),
        rule(Exit,        "EXIT",        SYMB),

        rule(DPrint,      "DPRINT",      SYMB),
        rule(Break,       "BREAK",       NONE),
    ]
};

/// Find the rule for a mnemonic, ignoring ASCII case.
pub fn lookup(mnemonic: &str) -> Option<&'static InstructionRule> {
    let mnemonic = mnemonic.to_ascii_uppercase();
    RULES.iter().find(|rule| rule.mnemonic == mnemonic)
}
