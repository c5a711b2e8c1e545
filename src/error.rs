//! Error types and reporting for parsing, validation and grouping.

use std::fmt;

/// Source location information for error reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub file: String,
    pub line: usize,
    pub col: usize,
    pub len: usize,
}

impl Span {
    /// Create a new span with file and position information.
    pub fn new(file: &str, line: usize, col: usize, len: usize) -> Self {
        Span {
            file: file.to_string(),
            line,
            col,
            len,
        }
    }
}

/// Kinds of errors that can occur while compiling an opcode table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    // Parser errors
    /// A rule line has no tokens, so no mnemonic
    MissingOperator,
    /// A constraint token is not `<range>=<value>`
    MalformedConstraint(String),
    /// The range part of a constraint is not `<high>..<low>` or `<bit>`
    InvalidRange(String),
    /// The value part of a constraint is not a decimal, hex or binary literal
    InvalidValue(String),

    // Validation errors
    /// A range has its low bit above its high bit
    InvertedRange { high: u32, low: u32 },
    /// A range reaches past the word (or parcel) width of its table
    BitOutOfRange { bit: u32, width: u32 },
    /// A constraint value needs more bits than its range holds
    ValueTooWide { value: u32, bits: u32 },
    /// Two constraints of one rule cover the same bit
    OverlappingBits { operator: String, bit: u32 },

    // Grouping errors
    /// Two rules of the same shape select the same code words
    AmbiguousEncoding { a: String, b: String },
    /// The operand names of a rule have no accessor mapping
    UnknownOperandShape { operator: String, operands: String },
}

impl ErrorKind {
    /// Process exit code for this class of error.
    ///
    /// Malformed rules exit with 1, ambiguous encodings with 2 and unknown
    /// operand shapes with 3.
    pub fn exit_code(&self) -> u8 {
        match self {
            ErrorKind::MissingOperator
            | ErrorKind::MalformedConstraint(_)
            | ErrorKind::InvalidRange(_)
            | ErrorKind::InvalidValue(_)
            | ErrorKind::InvertedRange { .. }
            | ErrorKind::BitOutOfRange { .. }
            | ErrorKind::ValueTooWide { .. }
            | ErrorKind::OverlappingBits { .. } => 1,
            ErrorKind::AmbiguousEncoding { .. } => 2,
            ErrorKind::UnknownOperandShape { .. } => 3,
        }
    }

    /// True for errors that make a rule line itself unusable.
    pub fn is_malformed_rule(&self) -> bool {
        self.exit_code() == 1
    }
}

/// An error with location and optional help text.
#[derive(Debug, Clone)]
pub struct Error {
    pub kind: ErrorKind,
    pub span: Span,
    pub help: Option<String>,
}

impl Error {
    /// Create a new error with a kind and span.
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        Error {
            kind,
            span,
            help: None,
        }
    }

    /// Add a help message to the error.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match &self.kind {
            ErrorKind::MissingOperator => "rule has no operator mnemonic".to_string(),
            ErrorKind::MalformedConstraint(t) => {
                format!("malformed bit-field constraint '{}'", t)
            }
            ErrorKind::InvalidRange(r) => format!("invalid bit range '{}'", r),
            ErrorKind::InvalidValue(v) => format!("invalid constraint value '{}'", v),
            ErrorKind::InvertedRange { high, low } => {
                format!("bit range {}..{} has its low bit above its high bit", high, low)
            }
            ErrorKind::BitOutOfRange { bit, width } => {
                format!("bit {} is outside the {}-bit code word", bit, width)
            }
            ErrorKind::ValueTooWide { value, bits } => {
                format!("value {:#x} does not fit in {} bits", value, bits)
            }
            ErrorKind::OverlappingBits { operator, bit } => {
                format!(
                    "rule '{}' constrains bit {} more than once",
                    operator, bit
                )
            }
            ErrorKind::AmbiguousEncoding { a, b } => {
                format!(
                    "rules '{}' and '{}' have the same encoding",
                    a, b
                )
            }
            ErrorKind::UnknownOperandShape { operator, operands } => {
                format!(
                    "rule '{}' has unknown operand shape '{}'",
                    operator, operands
                )
            }
        };

        write!(f, "error: {}", msg)?;
        write!(f, "\n --> {}:{}", self.span.file, self.span.line)?;

        if let Some(help) = &self.help {
            write!(f, "\n = help: {}", help)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}

/// Multiple errors collected from parsing, validation or grouping.
#[derive(Debug)]
pub struct Errors(pub Vec<Error>);

impl Errors {
    /// Exit code for the whole batch: the lowest code among its errors.
    pub fn exit_code(&self) -> u8 {
        self.0
            .iter()
            .map(|e| e.kind.exit_code())
            .min()
            .unwrap_or(1)
    }
}

impl From<Vec<Error>> for Errors {
    fn from(errors: Vec<Error>) -> Self {
        Errors(errors)
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for Errors {}
