//! Token and position-map types produced by the lexer.

/// Source region of a token. Rows and columns are 1-based; `end` is the
/// position of the token's last character, so `end >= start`
/// lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

/// A normalised token with the source region it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Canonical value: lowercased keyword, `IDENT`, `NUM`, `STR`, or the
    /// literal operator/punctuation form.
    pub value: String,
    pub region: Region,
}

/// A tokenized source file: the ordered token stream plus the position map
/// back into the raw text. Built once per file per run; immutable afterwards.
#[derive(Debug, Clone)]
pub struct TokenizedFile {
    name: String,
    source: String,
    tokens: Vec<Token>,
    line_count: u32,
}

impl TokenizedFile {
    pub(crate) fn new(name: String, source: String, tokens: Vec<Token>) -> Self {
        // lines() treats both LF and CRLF as terminators, which is the
        // normalisation the report layer expects.
        let line_count = source.lines().count().max(1) as u32;
        Self {
            name,
            source,
            tokens,
            line_count,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of source lines (at least 1, even for empty files).
    pub fn line_count(&self) -> u32 {
        self.line_count
    }

    /// 1-based source line of the token at `index`. Out-of-range lookups
    /// degrade to line 1 rather than panicking.
    pub fn line_of(&self, index: usize) -> u32 {
        self.tokens
            .get(index)
            .map_or(1, |t| t.region.start_row)
            .clamp(1, self.line_count)
    }

    /// Source region of the token at `index`.
    pub fn region(&self, index: usize) -> Option<&Region> {
        self.tokens.get(index).map(|t| &t.region)
    }

    /// Raw source lines `start..=end` (1-based, clamped to the file).
    pub fn snippet(&self, start_line: u32, end_line: u32) -> String {
        let start = start_line.clamp(1, self.line_count) as usize;
        let end = (end_line.max(start as u32).min(self.line_count)) as usize;
        self.source
            .lines()
            .skip(start - 1)
            .take(end + 1 - start)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
