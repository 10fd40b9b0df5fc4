//! Lexer unit tests
//!
//! Tests for the line-splitting phase of the assembler.

use vm16::assembler::lexer::{split_arguments, split_line, string_literal};

#[test]
fn test_command_and_rest() {
    let line = split_line("ADDI AZ, 0x10").unwrap();
    assert_eq!(line.command, "ADDI");
    assert_eq!(line.rest, " AZ, 0x10");

    // Case is preserved; lookups are case-insensitive later
    let line = split_line("\taddi\taz,1").unwrap();
    assert_eq!(line.command, "addi");
    assert_eq!(split_arguments(line.rest), vec!["az", "1"]);
}

#[test]
fn test_blank_and_comment_lines() {
    for text in ["", "    ", "\t", "; comment", "   ;indented comment"] {
        assert!(split_line(text).is_none(), "{:?}", text);
    }
}

#[test]
fn test_arguments_trimmed_and_comment_removed() {
    assert_eq!(split_arguments("  AZ ,BZ   ; copy"), vec!["AZ", "BZ"]);
    assert_eq!(split_arguments(" 5;"), vec!["5"]);
    assert!(split_arguments("   ").is_empty());
    assert!(split_arguments(" ; nothing here").is_empty());
}

#[test]
fn test_empty_entries_dropped() {
    // Argument count is checked against what remains
    assert_eq!(split_arguments("AZ,,BZ,"), vec!["AZ", "BZ"]);
}

#[test]
fn test_string_literal() {
    assert_eq!(string_literal(" /Hello/"), Some("Hello"));
    assert_eq!(string_literal(" /a;b/ ; comment"), Some("a;b"));
    assert_eq!(string_literal(" /one/two/"), Some("one/two"));
}

#[test]
fn test_string_literal_malformed() {
    assert_eq!(string_literal(" Hello"), None);
    assert_eq!(string_literal(" /Hello"), None);
    assert_eq!(string_literal(" x/Hello/"), None);
    assert_eq!(string_literal(" /Hello/ trailing"), None);
}
