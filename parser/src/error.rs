use std::fmt::{Display, Formatter, Result};

use annotate_snippets::display_list::{DisplayList, FormatOptions};
use annotate_snippets::snippet::{Annotation, AnnotationType, Slice, Snippet, SourceAnnotation};

use crate::catalog::{OperandCategory, Opcode};
use crate::instruction::ValueType;
use crate::lexer::Span;
use crate::program::HEADER;

use ParseError::*;

/// Why a translation run was aborted.
///
/// Every variant is terminal: the first one encountered ends the run
/// and no partial [`Program`](crate::program::Program) is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The first meaningful line is not the `.IPPcode23` marker, or there is no such line.
    Header {
        found: Option<String>,
    },
    /// The first word of a line names no known instruction.
    UnknownOpcode {
        opcode: String,
    },
    /// Too few or too many operands for the instruction.
    Arity {
        opcode: Opcode,
        expected: usize,
        found: usize,
    },
    /// An operand doesn't fit the category its instruction expects in that position.
    ///
    /// `slot` is 1-based, matching the `argN` element the operand would have become.
    Operand {
        slot: usize,
        expected: OperandCategory,
        token: String,
        reason: InvalidOperandReason,
    },
    /// Something went wrong that the input can't be blamed for.
    Internal(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidOperandReason {
    MissingAt,
    UnknownFrame { actual: String },
    VariableName(InvalidLabelReason),
    Label(InvalidLabelReason),
    NotAType { actual: String },
    InvalidLiteral { ty: ValueType },
    InvalidEscape { offset: usize },
    NonDecimalInt,
}

impl Display for InvalidOperandReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        use InvalidOperandReason::*;
        match self {
            MissingAt => { write!(f, "no `@` separating prefix and value") }
            UnknownFrame { actual } => { write!(f, "frame not one of GF, LF, TF (was: {:?})", actual) }
            VariableName(reason) => { write!(f, "invalid variable name, {}", reason) }
            Label(reason) => { write!(f, "invalid label, {}", reason) }
            NotAType { actual } => { write!(f, "not one of int, bool, string, nil (was: {:?})", actual) }
            InvalidLiteral { ty } => { write!(f, "malformed {} literal", ty) }
            InvalidEscape { offset } => { write!(f, "backslash at {} not followed by three decimal digits", offset) }
            NonDecimalInt => { write!(f, "only decimal int literals are allowed in strict mode") }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidLabelReason {
    Empty,
    FirstChar { actual: char },
    OtherChars { actual: String },
}

impl Display for InvalidLabelReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        use InvalidLabelReason::*;
        match self {
            Empty => { write!(f, "empty") }
            FirstChar { actual } => { write!(f, "first char not a letter or one of _-$&%*!? (was: {:?})", actual) }
            OtherChars { actual } => { write!(f, "other chars not alphanumeric or one of _-$&%*!? (bad chars: {})", actual) }
        }
    }
}

impl ParseError {
    pub fn message(&self) -> String {
        match self {
            Header { found: None } => {
                format!("missing header, expected `{}`", HEADER)
            }
            Header { found: Some(line) } => {
                format!("invalid header, expected `{}` but found `{}`", HEADER, line)
            }
            UnknownOpcode { opcode } => {
                format!("unknown opcode `{}`", opcode)
            }
            Arity { opcode, expected, found } => {
                format!("{} takes {} operand{} but {} {} given",
                        opcode, expected, plural(*expected), found, if *found == 1 { "was" } else { "were" })
            }
            Operand { slot, expected, token, reason } => {
                format!("invalid operand {} `{}`, expected {} -- {}", slot, token, expected, reason)
            }
            Internal(message) => {
                format!("internal error: {}", message)
            }
        }
    }

    fn annotation_label(&self) -> String {
        match self {
            Header { .. } => format!("expected `{}` here", HEADER),
            UnknownOpcode { .. } => "unknown opcode here".to_string(),
            Arity { expected, .. } => format!("expected {} operand{}", expected, plural(*expected)),
            Operand { expected, .. } => format!("expected {} here", expected),
            Internal(_) => "while processing this".to_string(),
        }
    }

    /// Process exit status for command-line surfaces.
    pub fn exit_code(&self) -> i32 {
        match self {
            Header { .. } => 21,
            UnknownOpcode { .. } => 22,
            Arity { .. } | Operand { .. } => 23,
            Internal(_) => 99,
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ParseError {}

/// Where in the source a [`ParseError`] was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// 1-based line number in the input.
    pub line_number: usize,
    /// The normalized line.
    pub line: String,
    /// Byte range within `line` to point at.
    pub span: Span,
}

/// A [`ParseError`], located in the source when possible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub error: ParseError,
    pub location: Option<Location>,
}

impl Error {
    pub fn new(error: ParseError, location: Location) -> Self {
        Self { error, location: Some(location) }
    }

    pub fn exit_code(&self) -> i32 {
        self.error.exit_code()
    }

    /// Render the error as an annotated snippet of the offending line.
    ///
    /// `origin` names the source (usually a path) in the rendered output.
    pub fn render(&self, origin: Option<&str>, color: bool) -> String {
        let message = self.error.message();
        let label = self.error.annotation_label();
        let slices = match &self.location {
            None => vec![],
            Some(Location { line_number, line, span }) => {
                let start = line[..span.start].chars().count();
                let end = start + line[span.clone()].chars().count();
                vec![
                    Slice {
                        source: line.as_str(),
                        line_start: *line_number,
                        origin,
                        fold: false,
                        annotations: vec![
                            SourceAnnotation {
                                range: (start, end),
                                label: label.as_str(),
                                annotation_type: AnnotationType::Error,
                            }
                        ],
                    }
                ]
            }
        };

        let snippet = Snippet {
            title: Some(Annotation {
                label: Some(message.as_str()),
                id: None,
                annotation_type: AnnotationType::Error,
            }),
            footer: vec![],
            slices,
            opt: FormatOptions {
                color,
                ..Default::default()
            },
        };
        DisplayList::from(snippet).to_string()
    }
}

impl From<ParseError> for Error {
    fn from(error: ParseError) -> Self {
        Self { error, location: None }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match &self.location {
            Some(location) => write!(f, "line {}: {}", location.line_number, self.error),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn exit_codes() {
        assert_eq!(21, Header { found: None }.exit_code());
        assert_eq!(22, UnknownOpcode { opcode: "FROB".to_string() }.exit_code());
        assert_eq!(23, Arity { opcode: Opcode::DefVar, expected: 1, found: 0 }.exit_code());
        assert_eq!(23, Operand {
            slot: 1,
            expected: OperandCategory::Label,
            token: "1x".to_string(),
            reason: InvalidOperandReason::Label(InvalidLabelReason::FirstChar { actual: '1' }),
        }.exit_code());
        assert_eq!(99, Internal("oops".to_string()).exit_code());
    }

    #[test]
    fn arity_message() {
        assert_eq!("DEFVAR takes 1 operand but 0 were given",
                   Arity { opcode: Opcode::DefVar, expected: 1, found: 0 }.message());
        assert_eq!("ADD takes 3 operands but 1 was given",
                   Arity { opcode: Opcode::Add, expected: 3, found: 1 }.message());
    }

    #[test]
    fn operand_message_includes_reason() {
        let error = Operand {
            slot: 2,
            expected: OperandCategory::Symbol,
            token: "bool@True".to_string(),
            reason: InvalidOperandReason::InvalidLiteral { ty: ValueType::Bool },
        };
        assert_eq!("invalid operand 2 `bool@True`, expected symb -- malformed bool literal", error.message());
    }

    #[test]
    fn located_display() {
        let error = Error::new(
            UnknownOpcode { opcode: "FROB".to_string() },
            Location { line_number: 4, line: "FROB GF@x".to_string(), span: 0..4 });
        assert_eq!("line 4: unknown opcode `FROB`", error.to_string());
        assert_eq!("missing header, expected `.IPPcode23`", Error::from(Header { found: None }).to_string());
    }

    #[test]
    fn render_points_at_token() {
        let error = Error::new(
            UnknownOpcode { opcode: "FROB".to_string() },
            Location { line_number: 2, line: "FROB GF@x".to_string(), span: 0..4 });
        let rendered = error.render(Some("prog.src"), false);
        assert!(rendered.contains("unknown opcode `FROB`"), "{}", rendered);
        assert!(rendered.contains("prog.src"), "{}", rendered);
        assert!(rendered.contains("FROB GF@x"), "{}", rendered);
        assert!(rendered.contains("^^^^"), "{}", rendered);
    }

    #[test]
    fn render_without_location() {
        let rendered = Error::from(Header { found: None }).render(None, false);
        assert!(rendered.contains("missing header"), "{}", rendered);
    }
}
