//! Module for splitting Lisp source into tokens.

/// A raw token along with its starting position in the input.
///
/// Tokens are only split here; the reader decides what each one means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenOffset {
    pub token: String,
    pub line: usize,
    pub column: usize,
}

impl TokenOffset {
    pub fn new(token: impl Into<String>, line: usize, column: usize) -> Self {
        TokenOffset {
            token: token.into(),
            line,
            column,
        }
    }

    /// Describe where the token is, for error messages.
    pub fn position(&self) -> String {
        format!("at line {} column {}", self.line, self.column)
    }
}

impl From<TokenOffset> for String {
    fn from(value: TokenOffset) -> Self {
        value.token
    }
}

/// Where the tokenizer is, relative to string literals and comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Code,
    /// Inside a string; `escaped` if the previous character was an unescaped backslash.
    String { escaped: bool },
    Comment,
}

/// Split the input into its constituent tokens.
///
/// - `;` starts a comment, which runs to the end of the line.
/// - Each parenthesis is a token of its own.
/// - Whitespace and commas separate tokens.
/// - A double-quoted span is part of a single token, separators and all.
///   A backslash inside a string escapes the following character, so `\"` doesn't end it.
///   A line break inside a string becomes a space.
///
/// Nothing is rejected here. A string that is never closed runs to the end of input,
/// and the reader reports it.
pub fn tokenize(input: &str) -> Vec<TokenOffset> {
    let mut result = Vec::new();
    let mut current: Option<TokenOffset> = None;
    let mut mode = Mode::Code;

    // Position info for debug messages; 1-indexed.
    let mut line = 1;
    let mut column = 0;

    for ch in input.chars() {
        if ch == '\n' {
            line += 1;
            column = 0;
        } else {
            column += 1;
        }

        match mode {
            Mode::Comment => {
                if ch == '\n' {
                    mode = Mode::Code;
                }
            }
            Mode::String { escaped } => {
                if let Some(t) = current.as_mut() {
                    t.token.push(if ch == '\n' { ' ' } else { ch });
                }
                mode = match ch {
                    _ if escaped => Mode::String { escaped: false },
                    '\\' => Mode::String { escaped: true },
                    '"' => Mode::Code,
                    _ => Mode::String { escaped: false },
                };
            }
            Mode::Code => match ch {
                ';' => {
                    result.extend(current.take());
                    mode = Mode::Comment;
                }
                '(' | ')' => {
                    result.extend(current.take());
                    result.push(TokenOffset::new(ch, line, column));
                }
                c if c.is_whitespace() || c == ',' => result.extend(current.take()),
                c => {
                    current
                        .get_or_insert_with(|| TokenOffset::new(String::new(), line, column))
                        .token
                        .push(c);
                    if c == '"' {
                        mode = Mode::String { escaped: false };
                    }
                }
            },
        }
    }
    result.extend(current.take());

    tracing::trace!("split input into {} tokens", result.len());
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<String> {
        tokenize(input).into_iter().map(String::from).collect()
    }

    #[test]
    fn tokenize_atoms() {
        let output = tokens(r#"hello "hi" world 24601 -6 true"#);
        let want = ["hello", r#""hi""#, "world", "24601", "-6", "true"];
        assert_eq!(output, want);
    }

    #[test]
    fn tokenize_parens() {
        let output = tokens("(1)( 2 ) (hello) ( hello (\"hi\") (( \"hi\" )))");
        let want = [
            "(", "1", ")", "(", "2", ")", "(", "hello", ")", "(", "hello", "(", "\"hi\"", ")",
            "(", "(", "\"hi\"", ")", ")", ")",
        ];
        assert_eq!(output, want);
    }

    #[test]
    fn tokenize_unbalanced() {
        assert_eq!(tokens(")))()("), [")", ")", ")", "(", ")", "("]);
    }

    #[test]
    fn commas_separate() {
        assert_eq!(tokens("(a,b ,, c)"), ["(", "a", "b", "c", ")"]);
    }

    #[test]
    fn comments_run_to_end_of_line() {
        let output = tokens("(a ; ignore (this)\n b) ; and this");
        assert_eq!(output, ["(", "a", "b", ")"]);
    }

    #[test]
    fn strings_keep_separators() {
        let output = tokens(r#"(print "a, (b) ; c"  d)"#);
        assert_eq!(output, ["(", "print", r#""a, (b) ; c""#, "d", ")"]);
    }

    #[test]
    fn escaped_quote_does_not_close_string() {
        let output = tokens(r#""say \"hi there\"" next"#);
        assert_eq!(output, [r#""say \"hi there\"""#, "next"]);
    }

    #[test]
    fn escaped_backslash_then_quote_closes_string() {
        let output = tokens(r#""a\\" b"#);
        assert_eq!(output, [r#""a\\""#, "b"]);
    }

    #[test]
    fn unterminated_string_runs_to_end() {
        let output = tokens("(print \"oops)\n(x)");
        assert_eq!(output, ["(", "print", "\"oops) (x)"]);
    }

    #[test]
    fn line_breaks_in_strings_are_spaces() {
        assert_eq!(tokens("\"a\nb\"\n c"), ["\"a b\"", "c"]);
        // An escaped newline is not a line break; it stays for the reader to decode.
        assert_eq!(tokens(r#""a\nb""#), [r#""a\nb""#]);
    }

    #[test]
    fn string_line_break_still_counts_lines() {
        let output = tokenize("\"a\nb\" c");
        assert_eq!(output[1], TokenOffset::new("c", 2, 4));
    }

    #[test]
    fn positions() {
        let output = tokenize("(def x\n  \"two\")");
        let want = [
            TokenOffset::new("(", 1, 1),
            TokenOffset::new("def", 1, 2),
            TokenOffset::new("x", 1, 6),
            TokenOffset::new("\"two\"", 2, 3),
            TokenOffset::new(")", 2, 8),
        ];
        assert_eq!(output, want);
    }
}
