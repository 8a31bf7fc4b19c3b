mod common;
use common::*;
use nextbasic::lang::{codec, decode, lex, Dialect};

#[test]
fn test_header_and_terminator() {
    assert_eq!(
        bytes("10; one"),
        vec![0x00, 0x0a, 0x06, 0x00, 0x3b, 0x20, 0x6f, 0x6e, 0x65, 0x0d]
    );
    assert_eq!(
        bytes("202 IF INKEY$=\"s\" THEN"),
        vec![0x00, 0xca, 0x08, 0x00, 0xfa, 0xa6, 0x3d, 0x22, 0x73, 0x22, 0xcb, 0x0d]
    );
    assert!(bytes("10 REM one").ends_with(&[0xea, 0x6f, 0x6e, 0x65, 0x0d]));
}

#[test]
fn test_number_blocks() {
    assert_eq!(bytes("10 BEEP .01,2").len(), 23);
    assert!(bytes("10 LET %a= BIN 1")
        .ends_with(&[0xc4, 0x31, 0x0e, 0x00, 0x00, 0x01, 0x00, 0x00, 0x0d]));
}

#[test]
fn test_integer_literals_have_no_block() {
    assert!(bytes("10 LET %b=%@10").ends_with(&[0x25, 0x40, 0x31, 0x30, 0x0d]));
    assert!(!bytes("10 %a=%1").contains(&0x0e));
    assert!(bytes("10 %a=1").contains(&0x0e));
}

#[test]
fn test_private_block() {
    assert_eq!(bytes("10 PRIVATE t=0")[5], 0x0e);
}

#[test]
fn test_round_trips() {
    for line in &[
        "10 REM marker",
        "20 ELSE IF 1 < 2 PRINT \"ELSE\"",
        "220 ; IF %b<3 THEN GO TO 10",
        "220 REM IF %b<3 THEN GO TO 10",
        "9996 e$= STR$ err",
        "70  PRINT \"Hello, world!\"",
        "10 PRINT \"£\"",
    ] {
        assert_eq!(&round_trip(line), line);
    }
}

#[test]
fn test_spacing_is_normalised() {
    assert_eq!(round_trip("10 goto 20"), "10 GO TO 20");
    assert_eq!(
        round_trip("20 plot0,0:draw f,175:plot 255,0:draw -f,175"),
        "20 PLOT 0,0: DRAW f,175: PLOT 255,0: DRAW -f,175"
    );
    assert_eq!(
        round_trip("220 IF b=\"rem:;\" THEN LET %b<3"),
        "220 IF b=\"rem:;\" THEN LET %b < 3"
    );
}

#[test]
fn test_elseif_byte() {
    let record = bytes("20 ELSE IF 1 < 2 PRINT \"ELSE\"");
    assert_eq!(record[5], 0x83);
    let record = lex("20 ELSE IF 1 < 2 PRINT \"ELSE\"", Dialect::V207)
        .unwrap()
        .to_bytes()
        .unwrap();
    assert_eq!(record[5], 0xfa);
}

#[test]
fn test_udg_in_strings() {
    let data = [0x00, 0x0a, 0x05, 0x00, 0xf5, 0x22, 0x90, 0x22, 0x0d];
    assert!(decode(&data).unwrap().contains("\\A"));
}

#[test]
fn test_bank_budget() {
    let line = format!("10 PRINT \"{}\"", "x".repeat(250));
    let statement = parse(&line);
    assert!(statement.to_bytes().is_ok());
    let e = statement.to_bytes_within(codec::BANK_LINE_LIMIT).unwrap_err();
    assert_eq!(e.code(), 6);

    // exactly 256 bytes fits, one more does not
    let statement = parse(&format!("10 PRINT \"{}\"", "x".repeat(248)));
    let record = statement.to_bytes_within(codec::BANK_LINE_LIMIT).unwrap();
    assert_eq!(record.len(), 256);
    let statement = parse(&format!("10 PRINT \"{}\"", "x".repeat(249)));
    assert!(statement.to_bytes_within(codec::BANK_LINE_LIMIT).is_err());
}

#[test]
fn test_multiple_lines() {
    let mut data = bytes("10 CLS");
    data.extend(bytes("20 GO TO 10"));
    assert_eq!(decode(&data).unwrap(), "10 CLS\n20 GO TO 10");
    data.truncate(data.len() - 2);
    assert_eq!(decode(&data).unwrap_err().code(), 12);
}
