extern crate ippcode23_parser;

use pretty_assertions::assert_eq;

use ippcode23_parser::{translate, LeniencyLevel, ParseError};
use ippcode23_parser::stats::{Stat, Stats};
use ippcode23_parser::xml::{to_xml, XmlOptions};

#[test]
fn factorial() {
    test(
        include_str!("inputs/factorial.src"),
        include_str!("inputs/factorial.xml"),
    );
}

#[test]
fn functions() {
    test(
        include_str!("inputs/functions.src"),
        include_str!("inputs/functions.xml"),
    );
}

#[test]
fn factorial_stats() {
    let program = translate(include_str!("inputs/factorial.src"), LeniencyLevel::Lenient).unwrap();
    let stats = Stats::collect(&program);
    assert_eq!(
        "12\n2\n2\n2\n1\n1\n0\n",
        stats.report(&[Stat::Loc, Stat::Comments, Stat::Labels, Stat::Jumps, Stat::FwJumps, Stat::BackJumps, Stat::BadJumps]));
}

#[test]
fn functions_strict() {
    let error = translate(include_str!("inputs/functions.src"), LeniencyLevel::Strict).unwrap_err();
    assert_eq!(23, error.exit_code());
    assert_eq!(Some(14), error.location.map(|location| location.line_number));
}

#[test]
fn missing_header() {
    test_error(include_str!("inputs/missing_header.src"), 21, Some(2));
}

#[test]
fn unknown_opcode() {
    test_error(include_str!("inputs/unknown_opcode.src"), 22, Some(4));
}

#[test]
fn bad_escape() {
    test_error(include_str!("inputs/bad_escape.src"), 23, Some(3));
}

#[test]
fn too_many_operands() {
    let error = test_error(include_str!("inputs/too_many_operands.src"), 23, Some(2));
    assert!(matches!(error, ParseError::Arity { expected: 1, found: 2, .. }), "{:?}", error);
}

#[test]
fn crlf_line_endings() {
    let source = include_str!("inputs/factorial.src").replace('\n', "\r\n");
    test(&source, include_str!("inputs/factorial.xml"));
}

fn test(input: &str, expected: &str) {
    let program = translate(input, LeniencyLevel::Lenient).unwrap();
    let actual = to_xml(&program, &XmlOptions::default());
    assert_eq!(expected, actual);

    let orders = program.instructions().iter().map(|instruction| instruction.order()).collect::<Vec<_>>();
    assert_eq!((1..=program.len()).collect::<Vec<_>>(), orders);
}

fn test_error(input: &str, exit_code: i32, line_number: Option<usize>) -> ParseError {
    let error = translate(input, LeniencyLevel::Lenient).unwrap_err();
    assert_eq!(exit_code, error.exit_code());
    assert_eq!(line_number, error.location.as_ref().map(|location| location.line_number));
    assert!(!error.render(None, false).is_empty());
    error.error
}
