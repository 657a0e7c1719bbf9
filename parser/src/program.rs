use log::debug;

use crate::LeniencyLevel;
use crate::error::{Error, Location, ParseError};
use crate::instruction::{Instruction, InstructionBuilder};
use crate::lexer::{self, Span, Token};
use crate::lines::SourceLine;

/// The marker every program must start with.
pub const HEADER: &str = ".IPPcode23";

/// Value of the `language` attribute of a serialized program.
pub const LANGUAGE: &str = "IPPcode23";

/// Whether a normalized line is the header marker. Case doesn't matter.
pub fn is_header(line: &str) -> bool {
    line.eq_ignore_ascii_case(HEADER)
}

/// A fully validated program: its instructions in source order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Program {
    instructions: Vec<Instruction>,
    comments: usize,
}

impl Program {
    pub fn language(&self) -> &'static str {
        LANGUAGE
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// How many source lines carried a comment, the header line included.
    pub fn comments(&self) -> usize {
        self.comments
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

/// Turns source lines into a [`Program`].
///
/// Each call to [`translate`](Translator::translate) is an independent run with its own
/// order numbering, starting at 1.
#[derive(Clone, Copy, Debug, Default)]
pub struct Translator {
    leniency: LeniencyLevel,
}

impl Translator {
    pub fn new(leniency: LeniencyLevel) -> Self {
        Self { leniency }
    }

    pub fn translate_str(&self, source: &str) -> Result<Program, Error> {
        self.translate(source.lines())
    }

    pub fn translate<I, S>(&self, lines: I) -> Result<Program, Error>
        where I: IntoIterator<Item=S>,
              S: AsRef<str>
    {
        let mut builder = InstructionBuilder::new(self.leniency);
        let mut program = Program::default();
        let mut header_seen = false;

        for (index, raw) in lines.into_iter().enumerate() {
            let line = SourceLine::new(index + 1, raw.as_ref());
            if line.comment {
                program.comments += 1;
            }
            let content = match line.content {
                Some(content) => content,
                None => continue,
            };

            if !header_seen {
                if !is_header(content) {
                    let error = ParseError::Header { found: Some(content.to_string()) };
                    return Err(Error::new(error, location(&line, content, 0..content.len())));
                }
                debug!("found header on line {}", line.number);
                header_seen = true;
                continue;
            }

            let tokens = lexer::tokenize(content);
            let words = tokens.iter().map(|token| token.src).collect::<Vec<_>>();
            let instruction = builder.build(&words)
                .map_err(|error| {
                    let span = error_span(&error, content, &tokens);
                    Error::new(error, location(&line, content, span))
                })?;
            program.instructions.push(instruction);
        }

        if !header_seen {
            return Err(ParseError::Header { found: None }.into());
        }

        debug!("translated {} instructions, {} comments", program.len(), program.comments);
        Ok(program)
    }
}

fn location(line: &SourceLine, content: &str, span: Span) -> Location {
    Location {
        line_number: line.number,
        line: content.to_string(),
        span,
    }
}

/// The part of `content` to blame for `error`.
fn error_span(error: &ParseError, content: &str, tokens: &[Token]) -> Span {
    let whole_line = 0..content.len();
    match error {
        ParseError::UnknownOpcode { .. } => tokens.first().map_or(whole_line, Token::span),
        ParseError::Operand { slot, .. } => tokens.get(*slot).map_or(whole_line, Token::span),
        ParseError::Arity { expected, found, .. } if found > expected => {
            // Point at the surplus operands.
            match (tokens.get(expected + 1), tokens.last()) {
                (Some(first), Some(last)) => first.start..last.end,
                _ => whole_line,
            }
        }
        ParseError::Arity { .. } | ParseError::Header { .. } | ParseError::Internal(_) => whole_line,
    }
}
