//! Character-driven Pascal lexer with normalisation.
//!
//! Strips whitespace and comments, folds case, collapses identifiers and
//! literals, and records a 1-based source region per emitted token. No
//! recovery on malformed input: an unterminated string or comment makes the
//! whole file unanalyzable.

use crate::token::{Region, Token, TokenizedFile};
use pasplag_core::error::AnalysisError;

/// Pascal reserved words. Case-insensitive; folded to lowercase before lookup.
fn is_keyword(word: &str) -> bool {
    matches!(
        word,
        "and" | "array" | "asm" | "begin" | "case" | "const" | "constructor" | "destructor"
            | "div" | "do" | "downto" | "else" | "end" | "file" | "for" | "function" | "goto"
            | "if" | "implementation" | "in" | "inherited" | "inline" | "interface" | "label"
            | "mod" | "nil" | "not" | "object" | "of" | "operator" | "or" | "packed"
            | "procedure" | "program" | "record" | "repeat" | "set" | "shl" | "shr" | "string"
            | "then" | "to" | "type" | "unit" | "until" | "uses" | "var" | "while" | "with"
            | "xor"
    )
}

struct Lexer<'a> {
    file: &'a str,
    chars: Vec<char>,
    pos: usize,
    row: u32,
    col: u32,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(file: &'a str, text: &str) -> Self {
        Self {
            file,
            chars: text.chars().collect(),
            pos: 0,
            row: 1,
            col: 1,
            tokens: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    /// Consume one character, returning it with its (row, col).
    fn bump(&mut self) -> Option<(char, u32, u32)> {
        let ch = self.peek()?;
        let at = (ch, self.row, self.col);
        self.pos += 1;
        if ch == '\n' {
            self.row += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(at)
    }

    fn emit(&mut self, value: impl Into<String>, start: (u32, u32), end: (u32, u32)) {
        self.tokens.push(Token {
            value: value.into(),
            region: Region {
                start_row: start.0,
                start_col: start.1,
                end_row: end.0,
                end_col: end.1,
            },
        });
    }

    fn error(&self, row: u32, col: u32, message: &str) -> AnalysisError {
        AnalysisError::lex(self.file, row, col, message)
    }

    /// Skip a `{ ... }` brace comment. The opening brace is already consumed;
    /// `start` is its position, used for the unterminated-comment error.
    fn skip_brace_comment(&mut self, start: (u32, u32)) -> Result<(), AnalysisError> {
        loop {
            match self.bump() {
                Some(('}', _, _)) => return Ok(()),
                Some(_) => {}
                None => return Err(self.error(start.0, start.1, "unterminated comment")),
            }
        }
    }

    /// Skip a `(* ... *)` paren comment. Both opening characters are already
    /// consumed.
    fn skip_paren_comment(&mut self, start: (u32, u32)) -> Result<(), AnalysisError> {
        loop {
            match self.bump() {
                Some(('*', _, _)) if self.peek() == Some(')') => {
                    self.bump();
                    return Ok(());
                }
                Some(_) => {}
                None => return Err(self.error(start.0, start.1, "unterminated comment")),
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.bump();
        }
    }

    /// Lex a `'...'` string literal. The opening quote is already consumed.
    /// A doubled quote is the escape for a literal quote; a newline before
    /// the closing quote is malformed.
    fn lex_string(&mut self, start: (u32, u32)) -> Result<(), AnalysisError> {
        loop {
            match self.bump() {
                Some(('\'', row, col)) => {
                    if self.peek() == Some('\'') {
                        self.bump();
                        continue;
                    }
                    self.emit("STR", start, (row, col));
                    return Ok(());
                }
                Some(('\n', _, _)) | None => {
                    return Err(self.error(start.0, start.1, "unterminated string literal"));
                }
                Some(_) => {}
            }
        }
    }

    /// Lex a numeric literal starting with a digit. Handles decimal points
    /// (but not the `..` range operator) and exponents.
    fn lex_number(&mut self, start: (u32, u32)) {
        let mut end = (start.0, start.1);
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                let (_, row, col) = self.bump().unwrap();
                end = (row, col);
            } else if ch == '.' && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
                let (_, row, col) = self.bump().unwrap();
                end = (row, col);
            } else if (ch == 'e' || ch == 'E')
                && self
                    .peek_next()
                    .is_some_and(|c| c.is_ascii_digit() || c == '+' || c == '-')
            {
                self.bump();
                if let Some((_, row, col)) = self.bump() {
                    end = (row, col);
                }
            } else {
                break;
            }
        }
        self.emit("NUM", start, end);
    }

    /// Lex a `$FF` hex literal. The `$` is already consumed.
    fn lex_hex(&mut self, start: (u32, u32)) {
        let mut end = (start.0, start.1);
        while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
            let (_, row, col) = self.bump().unwrap();
            end = (row, col);
        }
        self.emit("NUM", start, end);
    }

    /// Lex a `#13` / `#$0D` character-code literal. The `#` is already
    /// consumed. Normalises to `STR` like quoted strings.
    fn lex_char_code(&mut self, start: (u32, u32)) {
        let mut end = (start.0, start.1);
        if self.peek() == Some('$') {
            let (_, row, col) = self.bump().unwrap();
            end = (row, col);
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                let (_, row, col) = self.bump().unwrap();
                end = (row, col);
            }
        } else {
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                let (_, row, col) = self.bump().unwrap();
                end = (row, col);
            }
        }
        self.emit("STR", start, end);
    }

    /// Lex an identifier or keyword. Pascal is case-insensitive: fold to
    /// lowercase before classifying. Identifiers collapse to `IDENT`.
    fn lex_word(&mut self, first: char, start: (u32, u32)) {
        let mut word = String::new();
        word.push(first.to_ascii_lowercase());
        let mut end = (start.0, start.1);
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                let (c, row, col) = self.bump().unwrap();
                word.push(c.to_ascii_lowercase());
                end = (row, col);
            } else {
                break;
            }
        }
        if is_keyword(&word) {
            self.emit(word, start, end);
        } else {
            self.emit("IDENT", start, end);
        }
    }

    fn run(mut self) -> Result<Vec<Token>, AnalysisError> {
        while let Some(ch) = self.peek() {
            match ch {
                ' ' | '\t' | '\r' | '\n' => {
                    self.bump();
                }
                '{' => {
                    let (_, row, col) = self.bump().unwrap();
                    self.skip_brace_comment((row, col))?;
                }
                '(' if self.peek_next() == Some('*') => {
                    let (_, row, col) = self.bump().unwrap();
                    self.bump();
                    self.skip_paren_comment((row, col))?;
                }
                '/' if self.peek_next() == Some('/') => {
                    self.bump();
                    self.bump();
                    self.skip_line_comment();
                }
                '\'' => {
                    let (_, row, col) = self.bump().unwrap();
                    self.lex_string((row, col))?;
                }
                '#' => {
                    let (_, row, col) = self.bump().unwrap();
                    self.lex_char_code((row, col));
                }
                '$' => {
                    let (_, row, col) = self.bump().unwrap();
                    if self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                        self.lex_hex((row, col));
                    }
                }
                '0'..='9' => {
                    let (_, row, col) = self.bump().unwrap();
                    self.lex_number((row, col));
                }
                'a'..='z' | 'A'..='Z' | '_' => {
                    let (c, row, col) = self.bump().unwrap();
                    self.lex_word(c, (row, col));
                }
                ':' | '<' | '>' | '.' => {
                    let (c, row, col) = self.bump().unwrap();
                    let pair = self.peek().and_then(|next| {
                        let two: String = [c, next].iter().collect();
                        matches!(two.as_str(), ":=" | "<=" | "<>" | ">=" | "..").then_some(two)
                    });
                    if let Some(two) = pair {
                        let (_, erow, ecol) = self.bump().unwrap();
                        self.emit(two, (row, col), (erow, ecol));
                    } else {
                        self.emit(c.to_string(), (row, col), (row, col));
                    }
                }
                ';' | ',' | '(' | ')' | '[' | ']' | '+' | '-' | '*' | '/' | '=' | '^' | '@' => {
                    let (c, row, col) = self.bump().unwrap();
                    self.emit(c.to_string(), (row, col), (row, col));
                }
                other => {
                    tracing::trace!(file = self.file, ch = %other, "skipping unrecognised character");
                    self.bump();
                }
            }
        }
        Ok(self.tokens)
    }
}

/// Tokenize Pascal source into a normalised, position-mapped token stream.
/// Deterministic: the same input always yields the same output.
pub fn tokenize(name: &str, text: &str) -> Result<TokenizedFile, AnalysisError> {
    let tokens = Lexer::new(name, text).run()?;
    tracing::debug!(file = name, tokens = tokens.len(), "tokenized");
    Ok(TokenizedFile::new(
        name.to_string(),
        text.to_string(),
        tokens,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(text: &str) -> Vec<String> {
        tokenize("t.pas", text)
            .unwrap()
            .tokens()
            .iter()
            .map(|t| t.value.clone())
            .collect()
    }

    #[test]
    fn test_keywords_fold_to_lowercase() {
        assert_eq!(values("BEGIN End"), vec!["begin", "end"]);
    }

    #[test]
    fn test_identifiers_collapse() {
        assert_eq!(
            values("counter := counter + delta"),
            vec!["IDENT", ":=", "IDENT", "+", "IDENT"]
        );
    }

    #[test]
    fn test_literals_collapse() {
        assert_eq!(values("x := 3.14e-2"), vec!["IDENT", ":=", "NUM"]);
        assert_eq!(values("s := 'hello'"), vec!["IDENT", ":=", "STR"]);
        assert_eq!(values("m := $FF"), vec!["IDENT", ":=", "NUM"]);
        assert_eq!(values("c := #13"), vec!["IDENT", ":=", "STR"]);
    }

    #[test]
    fn test_range_operator_vs_decimal() {
        assert_eq!(values("1..10"), vec!["NUM", "..", "NUM"]);
        assert_eq!(values("1.5"), vec!["NUM"]);
    }

    #[test]
    fn test_two_char_operators() {
        assert_eq!(
            values("a <= b <> c >= d := e"),
            vec!["IDENT", "<=", "IDENT", "<>", "IDENT", ">=", "IDENT", ":=", "IDENT"]
        );
    }

    #[test]
    fn test_comments_dropped() {
        assert_eq!(
            values("a { brace comment } + (* paren *) b // line\n- c"),
            vec!["IDENT", "+", "IDENT", "-", "IDENT"]
        );
    }

    #[test]
    fn test_doubled_quote_escape() {
        assert_eq!(values("'it''s fine'"), vec!["STR"]);
    }

    #[test]
    fn test_unterminated_string_is_error() {
        let err = tokenize("t.pas", "s := 'oops\nend.").unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Lex { row: 1, column: 6, .. }
        ));
    }

    #[test]
    fn test_unterminated_comment_is_error() {
        assert!(tokenize("t.pas", "begin { never closed").is_err());
        assert!(tokenize("t.pas", "begin (* never closed").is_err());
    }

    #[test]
    fn test_positions_are_one_based() {
        let tf = tokenize("t.pas", "program Demo;\nbegin\nend.").unwrap();
        let first = tf.region(0).unwrap();
        assert_eq!((first.start_row, first.start_col), (1, 1));
        assert_eq!((first.end_row, first.end_col), (1, 7));

        // "begin" sits on line 2
        let begin = tf.region(3).unwrap();
        assert_eq!((begin.start_row, begin.start_col), (2, 1));
    }

    #[test]
    fn test_crlf_does_not_shift_rows() {
        let tf = tokenize("t.pas", "begin\r\nend.").unwrap();
        assert_eq!(tf.region(1).unwrap().start_row, 2);
        assert_eq!(tf.line_count(), 2);
    }

    #[test]
    fn test_hello_world_stream() {
        assert_eq!(
            values("program P; begin writeln('hi'); end."),
            vec![
                "program", "IDENT", ";", "begin", "IDENT", "(", "STR", ")", ";", "end", "."
            ]
        );
    }

    #[test]
    fn test_rename_produces_identical_stream() {
        let a = values("var x: integer; begin x := 1+2; writeln(x); end.");
        let b = values("var counter: integer; begin counter := 1+2; writeln(counter); end.");
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_input_yields_no_tokens() {
        let tf = tokenize("t.pas", "   { only a comment }\n").unwrap();
        assert!(tf.is_empty());
    }
}
