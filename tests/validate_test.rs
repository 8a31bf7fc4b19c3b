mod common;
use common::*;
use nextbasic::file;
use nextbasic::lang::Dialect;

#[test]
fn test_valid_lines() {
    for line in &[
        "10 PRINT BIN 00000011",
        "20 %a=1",
        "945; remark",
        "10 REM     comment with space",
        "10 FOR %i=%0 TO %3",
        "760 IF sgn{(e-a) < 0} THEN %g=%a: ELSE %g=%e",
        "20 IF %m&12 THEN ELSE %m=%m+1",
        "10 a = %4 << 1",
        "20 LET %a = % IN 254",
        "740 let %a=$10",
    ] {
        assert!(check(line, Dialect::V208).is_ok(), "{}", line);
    }
}

#[test]
fn test_invalid_lines() {
    for line in &[
        "10 PROC _foo()",
        "10 DEFPROC 5foo()",
        "10 let a(0 = 10",
        "10 let a[0 = 10",
        "10 let a{0 = 10",
        "760 IF sgn{(e-a) < 0} THEN %g=%a ELSE %g=%e",
        "945 %i = %20; ENDPROC",
        "10 PAUSE 0: DEFPROC main()",
        "760 ",
    ] {
        assert!(check(line, Dialect::V208).is_err(), "{}", line);
    }
}

#[test]
fn test_messages() {
    let detail = |line: &str, dialect| check(line, dialect).unwrap_err().detail().to_string();
    assert!(detail("10 %4 << %1", Dialect::V208).contains("Cannot redeclare integer expression"));
    assert!(detail("330 PRINT INK 2; AT 19,12; CHR$ 147; PAUSE 6", Dialect::V208)
        .contains("Unexpected PAUSE in PRINT statement"));
    assert!(detail("10 TILE 4,1 AT 0,24+%o", Dialect::V208)
        .contains("Integer expression should be the start of an argument"));
    assert!(detail("10 IF 0", Dialect::V207).contains("IF statement must have THEN"));
}

#[test]
fn test_statement_messages() {
    let detail = |line: &str| check(line, Dialect::V208).unwrap_err().detail().to_string();
    assert_eq!(detail("10 let a(0 = 10"), "Expected to see closing `)` parenthesis");
    assert_eq!(detail("10 let a[0 = 10"), "Expected to see closing `]` bracket");
    assert_eq!(detail("10 let a{0 = 10"), "Expected to see closing `}` brace");
    assert!(detail("10 20 PRINT")
        .starts_with("A line cannot start with a number, a keyword or assignment must open a statement"));
    assert!(detail("945 %i = %20; ENDPROC").starts_with(
        "Semicolons are either used at start of statement as a remark or as separator for PRINT, INPUT, PLOT and DRAW statements"
    ));
    assert!(detail("760 IF sgn{(e-a) < 0} THEN %g=%a ELSE %g=%e")
        .starts_with("Statement separator (:) expected before ELSE"));
}

#[test]
fn test_spacing_inside_statements() {
    for line in &[
        "10 LET a  =  1",
        "10 PRINT a ;  b",
        "20 LET %x = %a  +  1",
        "30 IF a  <  2 THEN  PRINT  1",
    ] {
        assert!(check(line, Dialect::V208).is_ok(), "{}", line);
    }
}

#[test]
fn test_dialects() {
    assert!(check("740 let %a=$10", Dialect::V208).is_ok());
    assert!(check("740 let %a=$10", Dialect::V207).is_err());
    assert!(check("10 PRINT @101", Dialect::V208).is_ok());
    let e = check("10 PRINT @101", Dialect::V207).unwrap_err();
    assert!(e.detail().starts_with("Binary values only allowed in integer expressions"));
    assert!(check("10 PRINT %@101", Dialect::V207).is_ok());
}

#[test]
fn test_error_columns() {
    let e = check("10 PROC _foo()", Dialect::V208).unwrap_err();
    assert_eq!(e.code(), 2);
    assert_eq!(e.line_number(), Some(10));
}

#[test]
fn test_whole_program() {
    let errors = file::validate("10 PRINT 1\n20 PRINT \"x\n30 CLS\n30 CLS", Dialect::V208);
    assert_eq!(errors.len(), 2);
    assert!(errors[0].to_string().ends_with("#2\n> 20 PRINT \"x"));
    assert_eq!(errors[1].detail(), "Duplicate line number on 30");

    let errors = file::validate("#autoline 10\nPRINT 1\nCLS\n#bank more\nCLS", Dialect::V208);
    assert!(errors.is_empty());
    assert!(file::validate("10 print \"Hello, world!\"", Dialect::V208).is_empty());
}

#[test]
fn test_carriage_return_lines() {
    let errors = file::validate("10 PRINT \"a\r20 PRINT \"b\r30 PRINT \"c", Dialect::V208);
    assert_eq!(errors.len(), 3);
    assert!(errors[1].to_string().ends_with("#2\n> 20 PRINT \"b"));
    assert!(file::validate("10 CLS\r20 CLS\r", Dialect::V208).is_empty());
}
