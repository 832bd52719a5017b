//! Integration tests for the Heptagon front end.

use heptagon_syntax::frontend::{tokenize, Lexer, SpanIndex};
use heptagon_syntax::prelude::*;

const WATCH: &str = r#"
(* A stopwatch with lap times. *)
open Lib.Clocks

type mode = | Stopped | Running | Lap
type sample = { time: int; valid: bool }
const period : int = 10
const zeros : int ^ 3 = [0, 0, 0]

fun sum<<n: int>>(t: int ^ n) returns (s: int)
let
  s = fold<<n>> (+)(0, t);
tel

node watch(start, lap: bool; tick: bool :: . on Running(m)) returns (time: int; display: int)
var m: mode; last shown: int = 0; buf: int ^ 3;
let
  automaton
    state Idle
      do time = 0; m = Stopped
      until start then Counting
    state Counting
      var prev: int;
      do
        prev = 0 fby time;
        time = prev + 1;
        m = Running
      unless start then Idle
      until lap then Frozen
    state Frozen
      do time = last shown; m = Lap
      until lap then Counting
  end;
  switch m
    | Lap do shown = time
    | Running do shown = last shown
    | Stopped do shown = 0
  end;
  present
    | lap and start do display = 0
    | lap do display = shown
    default do display = time
  end;
  reset
    buf = map<<3>> Lib.Clocks.scale<<2>>(zeros);
  every start;
  if time > period then
    var k: int;
    let k = buf[0]; tel
  else
    buf = zeros.[time] default buf
  end
tel
"#;

#[test]
fn test_simple_node() {
    let file = parse("node f(x: int) returns (y: int) let y = x + 1 tel").expect("Failed to parse");
    assert_eq!(file.definitions.len(), 1);

    let node = file.find_node("f").expect("node f");
    assert!(matches!(file.definitions[0].kind, DefinitionKind::Node(_)));
    assert_eq!(node.inputs[0].names, ["x"]);
    assert_eq!(node.inputs[0].ty, LitType::Primitive(PrimitiveType::Int));
    assert_eq!(node.outputs[0].names, ["y"]);
    assert!(node.locals.is_empty());
    assert_eq!(node.body.statements.len(), 1);

    match &node.body.statements[0].kind {
        StmtKind::Equation(eq) => assert_eq!(eq.to_string(), "y = (x + 1)"),
        other => panic!("expected equation, got {:?}", other),
    }
}

#[test]
fn test_single_precedence_level() {
    assert_eq!(parse_expression("a + b and c").unwrap().to_string(), "((a + b) and c)");
    assert_eq!(parse_expression("a and b + c").unwrap().to_string(), "((a and b) + c)");
    assert_eq!(parse_expression("not a and b").unwrap().to_string(), "(not (a and b))");
    assert_eq!(parse_expression("a = b or - c * d").unwrap().to_string(), "((a = b) or (- (c * d)))");
}

#[test]
fn test_automaton_two_states_one_until() {
    let source = "node f(c: bool) returns (y: bool)
                  let automaton
                    state Off do y = false until c then On
                    state On do y = true
                  end tel";
    let file = parse(source).unwrap();
    let node = file.find_node("f").unwrap();

    let auto = match &node.body.statements[0].kind {
        StmtKind::Automaton(auto) => auto,
        other => panic!("expected automaton, got {:?}", other),
    };
    assert_eq!(auto.states.len(), 2);
    let transitions: Vec<_> = auto.states.iter().flat_map(|s| &s.transitions).collect();
    assert_eq!(transitions.len(), 1);
    assert_eq!(transitions[0].kind, TransitionKind::Until);
    assert_eq!(transitions[0].target, "On");
}

#[test]
fn test_present_default_before_case_fails_at_pipe() {
    let source = "node f(a, b: bool) returns (y: int)
let
  present
    | a do y = 1
    default do y = 0
    | b do y = 2
  end
tel";
    let err = parse(source).unwrap_err();
    let parse_err = err.as_parse().expect("parse error");
    assert_eq!(parse_err.kind, ParseErrorKind::DefaultNotLast);
    assert_eq!(parse_err.span.start_line, 6);
    assert_eq!(parse_err.span.start_column, 5);
    assert_eq!(err.offset(), source.rfind('|').unwrap());
}

#[test]
fn test_qualified_names_in_each_position() {
    let source = "node f(x: M.t) returns (a, b: int)
                  let a = M.x.field; b = M.x(a) tel";
    let file = parse(source).unwrap();
    let node = file.find_node("f").unwrap();

    assert_eq!(
        node.inputs[0].ty,
        LitType::Named(QualifiedName { path: vec!["M".into()], name: "t".into() })
    );

    let rhs: Vec<_> = node
        .body
        .statements
        .iter()
        .map(|s| match &s.kind {
            StmtKind::Equation(eq) => &eq.rhs,
            other => panic!("expected equation, got {:?}", other),
        })
        .collect();
    assert!(matches!(&rhs[0].kind, ExprKind::Field { field, .. } if field == "field"));
    assert!(matches!(
        &rhs[1].kind,
        ExprKind::Call(FunctionCall { callee: Callee::Named(name), .. }) if name.to_string() == "M.x"
    ));
}

#[test]
fn test_full_program() {
    let file = parse(WATCH).expect("Failed to parse");
    let names: Vec<_> = file.definitions.iter().map(|d| d.kind.name()).collect();
    assert_eq!(names, ["Lib.Clocks", "mode", "sample", "period", "zeros", "sum", "watch"]);

    let watch = file.find_node("watch").unwrap();
    assert_eq!(watch.inputs.len(), 2);
    assert!(watch.inputs[1].clock.is_some());
    assert_eq!(watch.locals.len(), 3);
    assert!(watch.locals[1].is_last());

    let kinds: Vec<_> = watch
        .body
        .statements
        .iter()
        .map(|s| match s.kind {
            StmtKind::Equation(_) => "equation",
            StmtKind::Reset { .. } => "reset",
            StmtKind::Automaton(_) => "automaton",
            StmtKind::Switch(_) => "switch",
            StmtKind::Present(_) => "present",
            StmtKind::If { .. } => "if",
            StmtKind::Block { .. } => "block",
        })
        .collect();
    assert_eq!(kinds, ["automaton", "switch", "present", "reset", "if"]);

    let auto = match &watch.body.statements[0].kind {
        StmtKind::Automaton(auto) => auto,
        _ => unreachable!(),
    };
    let counting = &auto.states[1];
    assert_eq!(counting.locals.len(), 1);
    let order: Vec<_> = counting.transitions.iter().map(|t| (t.kind, t.target.as_str())).collect();
    assert_eq!(order, [(TransitionKind::Unless, "Idle"), (TransitionKind::Until, "Frozen")]);
}

#[test]
fn test_pretty_print_round_trip() {
    let file = parse(WATCH).unwrap();
    let printed = print_source_file(&file);
    let reparsed = parse(&printed).unwrap_or_else(|e| panic!("{}\n---\n{}", e, printed));
    assert_eq!(file, reparsed);
    assert_eq!(print_source_file(&reparsed), printed);
}

#[test]
fn test_json_round_trip() {
    let file = parse(WATCH).unwrap();
    let json = serde_json::to_string(&file).unwrap();
    let back: SourceFile = serde_json::from_str(&json).unwrap();
    assert_eq!(file, back);
    assert_eq!(file.span, back.span);
}

#[test]
fn test_recovery_mode_reports_each_definition() {
    let source = "node ok() returns (y: int) let y = 1 tel
node bad1() returns (y: int) let y = tel
type t = { x: int }
node bad2() returns (y: int) let y = 1 + tel";

    let fail_fast = parse_with_config(source, &ParserConfig::default()).unwrap_err();
    assert_eq!(fail_fast.len(), 1);

    let config = ParserConfig { recover: true, ..ParserConfig::default() };
    let errors = parse_with_config(source, &config).unwrap_err();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].span().start_line, 2);
    assert_eq!(errors[1].span().start_line, 4);

    // A clean file parses the same way in both modes.
    let clean = "node ok() returns (y: int) let y = 1 tel";
    assert_eq!(parse_with_config(clean, &config).unwrap(), parse(clean).unwrap());
}

#[test]
fn test_deep_nesting_is_an_error() {
    let source = format!("{}1{}", "(".repeat(500), ")".repeat(500));
    let err = parse_expression(&source).unwrap_err();
    assert_eq!(err.as_parse().unwrap().kind, ParseErrorKind::NestingTooDeep);
}

#[test]
fn test_lex_errors_surface_through_parse() {
    let err = parse("node f() returns () let (* never closed").unwrap_err();
    assert_eq!(err.as_lex().unwrap().kind, LexErrorKind::UnterminatedComment);
    assert_eq!(err.offset(), 24);
}

#[test]
fn test_diagnostic_rendering() {
    let source = "node f(x: int) returns (y: int)\nlet\n  y = x +;\ntel\n";
    let err = parse(source).unwrap_err();
    let rendered = Diagnostic::from(&err).render("f.ept", &SourceMap::new(source));

    assert!(rendered.starts_with("error: Expected expression"));
    assert!(rendered.contains("  --> f.ept:3:10"));
    assert!(rendered.contains("3 |   y = x +;"));
    assert!(rendered.contains(&format!("\n |{}^\n", " ".repeat(10))));
    assert!(rendered.contains("= note: found `;`"));
}

#[test]
fn test_span_index_over_parsed_file() {
    let source = "node f(x: int) returns (y: int) let y = g(x) tel";
    let file = parse(source).unwrap();
    let index = SpanIndex::build(&file);

    let offset = source.find("x)").unwrap();
    let entry = index.innermost_at(offset).unwrap();
    assert_eq!(entry.label, "ident x");
    assert_eq!(&source[entry.span.start_offset..entry.span.end_offset], "x");

    let call = index.entries().iter().find(|e| e.label == "call g").unwrap();
    assert_eq!(&source[call.span.start_offset..call.span.end_offset], "g(x)");
}

#[test]
fn test_tokens_and_trivia() {
    let tokens = tokenize("x = 1 (* one *)").unwrap();
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(kinds, [TokenKind::Identifier, TokenKind::Equal, TokenKind::Integer, TokenKind::Eof]);

    let trivia: Vec<_> = Lexer::with_trivia("x (* one *)")
        .map(|t| t.unwrap().kind)
        .collect();
    assert_eq!(trivia, [TokenKind::Identifier, TokenKind::Comment, TokenKind::Eof]);
}
