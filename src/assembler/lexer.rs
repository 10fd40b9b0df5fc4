//! Line splitting for assembly source
//!
//! The source language is line-oriented, so lexing is a matter of cutting each
//! line into its command word and raw argument text:
//!
//! ```text
//! ADDI AZ, 0x10   ; bump
//! ^^^^ ^^^^^^^^^^^^^^^^
//! command  rest
//! ```
//!
//! How the rest is split depends on the command: most take a comma-separated
//! list ([`split_arguments`]), while `STR` takes the text between two `/`
//! delimiters ([`string_literal`]).
//!
//! # Examples
//!
//! ```
//! use vm16::assembler::lexer::{split_arguments, split_line};
//!
//! let line = split_line("  movi AZ , 5 ; five").unwrap();
//! assert_eq!(line.command, "movi");
//! assert_eq!(split_arguments(line.rest), vec!["AZ", "5"]);
//!
//! assert!(split_line("   ; only a comment").is_none());
//! ```

/// Starts a comment that runs to the end of the line.
pub const COMMENT_MARKER: char = ';';

/// Delimits the text of a `STR` directive.
pub const STRING_DELIMITER: char = '/';

/// A non-blank source line cut into command and argument text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawLine<'a> {
    /// First whitespace-delimited word, case preserved
    pub command: &'a str,

    /// Everything after the command, comments not yet removed
    pub rest: &'a str,
}

/// Splits a line into command and argument text.
///
/// Returns `None` for blank lines and lines that are only a comment.
pub fn split_line(line: &str) -> Option<RawLine<'_>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(COMMENT_MARKER) {
        return None;
    }

    let (command, rest) = match line.find(char::is_whitespace) {
        Some(pos) => (&line[..pos], &line[pos..]),
        None => (line, ""),
    };

    // "STSD;halt" has no whitespace before the comment
    let command = match command.find(COMMENT_MARKER) {
        Some(pos) => return Some(RawLine { command: &command[..pos], rest: "" }),
        None => command,
    };

    Some(RawLine { command, rest })
}

/// Splits comma-separated arguments, dropping the comment, surrounding
/// whitespace and empty entries.
pub fn split_arguments(rest: &str) -> Vec<&str> {
    let text = match rest.find(COMMENT_MARKER) {
        Some(pos) => &rest[..pos],
        None => rest,
    };

    text.split(',')
        .map(str::trim)
        .filter(|arg| !arg.is_empty())
        .collect()
}

/// Extracts the text between the first and last [`STRING_DELIMITER`].
///
/// Returns `None` if there are fewer than two delimiters or anything other
/// than whitespace or a comment follows the closing delimiter.
pub fn string_literal(rest: &str) -> Option<&str> {
    let open = rest.find(STRING_DELIMITER)?;
    let close = rest.rfind(STRING_DELIMITER)?;
    if close <= open || !rest[..open].trim().is_empty() {
        return None;
    }

    let trailing = rest[close + 1..].trim_start();
    if !trailing.is_empty() && !trailing.starts_with(COMMENT_MARKER) {
        return None;
    }

    Some(&rest[open + 1..close])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_line_without_arguments() {
        let line = split_line("RET").unwrap();
        assert_eq!(line.command, "RET");
        assert_eq!(line.rest, "");
    }

    #[test]
    fn test_split_line_comment_glued_to_command() {
        let line = split_line("STSD;halt").unwrap();
        assert_eq!(line.command, "STSD");
        assert!(split_arguments(line.rest).is_empty());
    }

    #[test]
    fn test_split_line_blank() {
        assert!(split_line("").is_none());
        assert!(split_line(" \t ").is_none());
        assert!(split_line(";; header").is_none());
    }

    #[test]
    fn test_split_arguments_drops_empty() {
        assert_eq!(split_arguments(" 1, ,2,, 3 ;x, y"), vec!["1", "2", "3"]);
        assert!(split_arguments("   ").is_empty());
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(string_literal(" /Hello; world/"), Some("Hello; world"));
        assert_eq!(string_literal(" /a/b/ ; note"), Some("a/b"));
        assert_eq!(string_literal(" //"), Some(""));
        assert_eq!(string_literal(" /open"), None);
        assert_eq!(string_literal(" text /x/"), None);
        assert_eq!(string_literal(" /x/ junk"), None);
    }
}
