//! Error taxonomy for the similarity engine.
//!
//! Errors are values, never control flow: lexing and empty-input failures are
//! reported per pair (the pair is zeroed), while parameter validation is fatal
//! at engine construction.

/// Errors produced while analysing source files.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    /// Malformed Pascal source (unterminated string or comment). The file is
    /// unanalyzable; no recovery is attempted.
    #[error("lex error in {file} at {row}:{column}: {message}")]
    Lex {
        file: String,
        /// 1-based source row of the offending construct.
        row: u32,
        /// 1-based source column of the offending construct.
        column: u32,
        message: String,
    },

    /// Engine parameters out of range (kgram_size < 2 or window_size < 1).
    /// Fatal at construction.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The file produced no tokens after normalisation.
    #[error("{0}: no tokens after normalisation")]
    EmptyFile(String),
}

impl AnalysisError {
    /// Shorthand for a lex error at a known position.
    pub fn lex(file: &str, row: u32, column: u32, message: impl Into<String>) -> Self {
        Self::Lex {
            file: file.to_string(),
            row,
            column,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lex_error_display() {
        let err = AnalysisError::lex("prog.pas", 3, 14, "unterminated string literal");
        assert_eq!(
            err.to_string(),
            "lex error in prog.pas at 3:14: unterminated string literal"
        );
    }

    #[test]
    fn test_empty_file_display() {
        let err = AnalysisError::EmptyFile("blank.pas".to_string());
        assert_eq!(err.to_string(), "blank.pas: no tokens after normalisation");
    }
}
