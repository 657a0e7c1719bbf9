//! Lexical classification of operands.
//!
//! Each [`OperandCategory`] has a classifier that either turns a token into an
//! [`Operand`] or explains why it can't. The `is_*` predicates are thin wrappers for
//! callers that only need a yes or no:
//!
//! ```
//! # use ippcode23_parser::classify::*;
//! assert!(is_variable("LF@a-b"));
//! assert!(!is_variable("GF@1bad"));
//! assert!(is_symbol("int@0x1F"));
//! assert!(is_symbol("string@ab\\000c"));
//! assert!(!is_symbol("string@ab\\c"));
//! assert!(!is_symbol("bool@True"));
//! ```
//!
//! A token is split into prefix and value on its *first* `@`. Any further `@`s are part of
//! the variable name or literal and are judged by that part's own grammar.

use itertools::Itertools;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::LeniencyLevel;
use crate::catalog::OperandCategory;
use crate::error::{InvalidLabelReason, InvalidOperandReason};
use crate::instruction::{Frame, IntLiteral, Operand, Radix, ValueType};

/// Characters allowed in labels besides ASCII letters, digits and `_`.
const LABEL_SPECIAL_CHARS: &str = "-$&%*!?";

// Tried in this order; the first one to match decides the radix.
// Anchoring is added when compiling, so don't use ^ or $.
const INT_PATTERNS: [(&str, Radix); 3] = [
    (r"[+-]?[0-9]+", Radix::Decimal),
    (r"0[oO]?[0-7]+", Radix::Octal),
    (r"0[xX][0-9a-fA-F]+", Radix::Hexadecimal),
];

static INT_REGEXES: Lazy<Vec<(Regex, Radix)>> = Lazy::new(|| {
    INT_PATTERNS.iter()
        .map(|(pattern, radix)| {
            let regex = Regex::new(&format!("^(?:{})$", pattern)).expect("Invalid regex");
            (regex, *radix)
        })
        .collect()
});

fn is_label_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || LABEL_SPECIAL_CHARS.contains(c)
}

fn is_label_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || LABEL_SPECIAL_CHARS.contains(c)
}

pub fn check_label(token: &str) -> Result<(), InvalidLabelReason> {
    let mut chars = token.chars();
    match chars.next() {
        None => return Err(InvalidLabelReason::Empty),
        Some(first) if !is_label_start(first) => return Err(InvalidLabelReason::FirstChar { actual: first }),
        Some(_) => {}
    }

    let bad_chars = chars.filter(|c| !is_label_char(*c)).unique().collect::<String>();
    if bad_chars.is_empty() {
        Ok(())
    } else {
        Err(InvalidLabelReason::OtherChars { actual: bad_chars })
    }
}

fn split_prefix(token: &str) -> Result<(&str, &str), InvalidOperandReason> {
    token.split_once('@').ok_or(InvalidOperandReason::MissingAt)
}

pub fn label(token: &str) -> Result<Operand, InvalidOperandReason> {
    check_label(token)
        .map(|()| Operand::Label(token.to_string()))
        .map_err(InvalidOperandReason::Label)
}

pub fn variable(token: &str) -> Result<Operand, InvalidOperandReason> {
    let (frame, name) = split_prefix(token)?;
    let frame = Frame::from_tag(frame)
        .ok_or_else(|| InvalidOperandReason::UnknownFrame { actual: frame.to_string() })?;
    check_label(name).map_err(InvalidOperandReason::VariableName)?;
    Ok(Operand::Variable { frame, name: name.to_string() })
}

pub fn type_keyword(token: &str) -> Result<Operand, InvalidOperandReason> {
    ValueType::from_keyword(token)
        .map(Operand::TypeKeyword)
        .ok_or_else(|| InvalidOperandReason::NotAType { actual: token.to_string() })
}

/// Classify a variable or typed constant.
///
/// Prefixes that aren't frames or known types are accepted as they are, so that
/// constants of types added to the language later don't make the whole program invalid.
pub fn symbol(token: &str, leniency: LeniencyLevel) -> Result<Operand, InvalidOperandReason> {
    let (prefix, literal) = split_prefix(token)?;
    if Frame::from_tag(prefix).is_some() {
        return variable(token);
    }

    let ty = match ValueType::from_keyword(prefix) {
        Some(ty) => ty,
        None => {
            debug!("passing through constant `{}` of unknown type `{}`", literal, prefix);
            return Ok(Operand::OtherConstant { type_tag: prefix.to_string(), literal: literal.to_string() });
        }
    };

    match ty {
        ValueType::Int => int_literal(literal, leniency).map(Operand::IntConstant),
        ValueType::Bool => match literal {
            "true" => Ok(Operand::BoolConstant(true)),
            "false" => Ok(Operand::BoolConstant(false)),
            _ => Err(InvalidOperandReason::InvalidLiteral { ty }),
        },
        ValueType::Nil => match literal {
            "nil" => Ok(Operand::NilConstant),
            _ => Err(InvalidOperandReason::InvalidLiteral { ty }),
        },
        ValueType::String => {
            check_escapes(literal)?;
            Ok(Operand::StringConstant(literal.to_string()))
        }
    }
}

fn int_literal(literal: &str, leniency: LeniencyLevel) -> Result<IntLiteral, InvalidOperandReason> {
    let radix = INT_REGEXES.iter()
        .find(|(regex, _)| regex.is_match(literal))
        .map(|(_, radix)| *radix)
        .ok_or(InvalidOperandReason::InvalidLiteral { ty: ValueType::Int })?;

    if radix != Radix::Decimal {
        if !leniency.non_decimal_ints_allowed() {
            return Err(InvalidOperandReason::NonDecimalInt);
        }
        debug!("int literal `{}` is only valid in the lenient grammar", literal);
    }

    Ok(IntLiteral { text: literal.to_string(), radix })
}

/// Every backslash must start a `\ddd` escape. `offset` is the backslash's byte offset in the literal.
fn check_escapes(literal: &str) -> Result<(), InvalidOperandReason> {
    let bytes = literal.as_bytes();
    for (offset, _) in literal.match_indices('\\') {
        let escape_ok = bytes.get(offset + 1..offset + 4)
            .map_or(false, |code| code.iter().all(u8::is_ascii_digit));
        if !escape_ok {
            return Err(InvalidOperandReason::InvalidEscape { offset });
        }
    }
    Ok(())
}

/// Classify `token` as an operand of the given category.
pub fn classify(token: &str, category: OperandCategory, leniency: LeniencyLevel) -> Result<Operand, InvalidOperandReason> {
    match category {
        OperandCategory::Variable => variable(token),
        OperandCategory::Symbol => symbol(token, leniency),
        OperandCategory::Type => type_keyword(token),
        OperandCategory::Label => label(token),
    }
}

pub fn is_label(token: &str) -> bool {
    check_label(token).is_ok()
}

pub fn is_variable(token: &str) -> bool {
    variable(token).is_ok()
}

pub fn is_type_keyword(token: &str) -> bool {
    type_keyword(token).is_ok()
}

/// Whether `token` is a symbol under the lenient (current) grammar.
pub fn is_symbol(token: &str) -> bool {
    symbol(token, LeniencyLevel::Lenient).is_ok()
}

pub fn is_label_category(token: &str) -> bool {
    is_label(token)
}

pub fn is_var_category(token: &str) -> bool {
    is_variable(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn labels() {
        for token in &["a", "_", "loop_1", "-x", "$", "&and", "%p", "*", "!", "?q", "Z9$&%*!?-_"] {
            assert!(is_label(token), "{:?} should be a label", token);
            assert!(is_label_category(token));
        }
        for token in &["", "1st", "@x", "a@b", "a.b", "čau", "a b", "a#"] {
            assert!(!is_label(token), "{:?} should not be a label", token);
        }
    }

    #[test]
    fn label_reasons() {
        assert_eq!(Err(InvalidLabelReason::Empty), check_label(""));
        assert_eq!(Err(InvalidLabelReason::FirstChar { actual: '1' }), check_label("1st"));
        assert_eq!(Err(InvalidLabelReason::OtherChars { actual: ".@".to_string() }), check_label("a.b@c.d"));
    }

    #[test]
    fn variables() {
        for token in &["GF@x", "TF@_1", "LF@a-b", "GF@$tmp"] {
            assert!(is_variable(token), "{:?} should be a variable", token);
            assert!(is_var_category(token));
        }
        for token in &["XX@x", "GF@", "GF@1bad", "gf@x", "GFx", "GF@a@b", "@x", ""] {
            assert!(!is_variable(token), "{:?} should not be a variable", token);
        }
    }

    #[test]
    fn variable_reasons() {
        assert_eq!(Err(InvalidOperandReason::MissingAt), variable("GFx"));
        assert_eq!(Err(InvalidOperandReason::UnknownFrame { actual: "XX".to_string() }), variable("XX@x"));
        assert_eq!(Err(InvalidOperandReason::VariableName(InvalidLabelReason::Empty)), variable("GF@"));
        assert_eq!(Ok(Operand::Variable { frame: Frame::Local, name: "a-b".to_string() }), variable("LF@a-b"));
    }

    #[test]
    fn type_keywords() {
        for token in &["int", "bool", "string", "nil"] {
            assert!(is_type_keyword(token));
        }
        for token in &["Int", "INT", "float", "", "int@1", "var"] {
            assert!(!is_type_keyword(token), "{:?} should not be a type", token);
        }
    }

    #[test]
    fn int_symbols() {
        for token in &["int@42", "int@-7", "int@+7", "int@0", "int@0x1F", "int@0XfF", "int@0o17", "int@0O17", "int@007"] {
            assert!(is_symbol(token), "{:?} should be a symbol", token);
        }
        for token in &["int@4a", "int@", "int@-", "int@0x", "int@0o8", "int@-0x1", "int@1.5", "int@ 1"] {
            assert!(!is_symbol(token), "{:?} should not be a symbol", token);
        }
    }

    #[test]
    fn int_radix() {
        let radix_of = |token| match symbol(token, LeniencyLevel::Lenient) {
            Ok(Operand::IntConstant(literal)) => Some(literal.radix),
            _ => None,
        };
        assert_eq!(Some(Radix::Decimal), radix_of("int@-12"));
        // Decimal takes precedence over the bare-zero octal form.
        assert_eq!(Some(Radix::Decimal), radix_of("int@017"));
        assert_eq!(Some(Radix::Octal), radix_of("int@0o17"));
        assert_eq!(Some(Radix::Hexadecimal), radix_of("int@0x1F"));
    }

    #[test]
    fn strict_ints() {
        assert!(symbol("int@-12", LeniencyLevel::Strict).is_ok());
        assert_eq!(Err(InvalidOperandReason::NonDecimalInt), symbol("int@0x1F", LeniencyLevel::Strict));
        assert_eq!(Err(InvalidOperandReason::NonDecimalInt), symbol("int@0o17", LeniencyLevel::Strict));
    }

    #[test]
    fn bool_and_nil_symbols() {
        assert_eq!(Ok(Operand::BoolConstant(true)), symbol("bool@true", LeniencyLevel::Lenient));
        assert_eq!(Ok(Operand::BoolConstant(false)), symbol("bool@false", LeniencyLevel::Lenient));
        assert_eq!(Ok(Operand::NilConstant), symbol("nil@nil", LeniencyLevel::Lenient));
        for token in &["bool@True", "bool@1", "bool@", "nil@", "nil@NIL", "nil@null"] {
            assert!(!is_symbol(token), "{:?} should not be a symbol", token);
        }
    }

    #[test]
    fn string_symbols() {
        for token in &["string@", "string@abc", "string@ab\\000c", "string@\\0921", "string@a@b", "string@<&>", "string@řetězec"] {
            assert!(is_symbol(token), "{:?} should be a symbol", token);
        }
        assert_eq!(Err(InvalidOperandReason::InvalidEscape { offset: 2 }), symbol("string@ab\\c", LeniencyLevel::Lenient));
        assert_eq!(Err(InvalidOperandReason::InvalidEscape { offset: 3 }), symbol("string@abc\\", LeniencyLevel::Lenient));
        assert_eq!(Err(InvalidOperandReason::InvalidEscape { offset: 0 }), symbol("string@\\12", LeniencyLevel::Lenient));
        assert_eq!(Err(InvalidOperandReason::InvalidEscape { offset: 0 }), symbol("string@\\\\000", LeniencyLevel::Lenient));
    }

    #[test]
    fn variables_are_symbols() {
        assert_eq!(Ok(Operand::Variable { frame: Frame::Temporary, name: "x".to_string() }),
                   symbol("TF@x", LeniencyLevel::Lenient));
        // A frame prefix always means a variable, so the name must be valid.
        assert!(!is_symbol("GF@1bad"));
    }

    #[test]
    fn unknown_types_pass_through() {
        assert_eq!(Ok(Operand::OtherConstant { type_tag: "float".to_string(), literal: "0x1.8p+1".to_string() }),
                   symbol("float@0x1.8p+1", LeniencyLevel::Lenient));
        assert!(is_symbol("XX@x"));
    }

    #[test]
    fn no_at_is_never_a_symbol() {
        for token in &["42", "true", "nil", "x", ""] {
            assert_eq!(Err(InvalidOperandReason::MissingAt), symbol(token, LeniencyLevel::Lenient));
        }
    }

    #[test]
    fn classify_dispatches_on_category() {
        let lenient = LeniencyLevel::Lenient;
        assert_eq!(Ok(Operand::Label("int".to_string())), classify("int", OperandCategory::Label, lenient));
        assert_eq!(Ok(Operand::TypeKeyword(ValueType::Int)), classify("int", OperandCategory::Type, lenient));
        assert!(classify("int@1", OperandCategory::Variable, lenient).is_err());
        assert!(classify("int@1", OperandCategory::Symbol, lenient).is_ok());
        assert!(classify("GF@x", OperandCategory::Type, lenient).is_err());
    }
}
