//! Core type definitions for the intermediate representation.
//!
//! Defines the parsed rule types and the grouped IR used throughout the pipeline.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

use crate::error::Span;
use crate::operands::OperandShape;

/// Width of a code word in bits.
pub const WORD_BITS: u32 = 32;

/// An instruction-set extension, each with its own opcode table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Extension {
    /// Base integer instruction set
    I,
    /// Integer multiply and divide
    M,
    /// Single-precision floating point
    F,
    /// Compressed 16-bit instructions
    C,
}

impl Extension {
    /// All extensions in priority order (`imafdc`, minus the ones without tables).
    pub const ALL: [Extension; 4] = [Extension::I, Extension::M, Extension::F, Extension::C];

    /// Lower-case letter naming the extension.
    pub fn letter(self) -> char {
        match self {
            Extension::I => 'i',
            Extension::M => 'm',
            Extension::F => 'f',
            Extension::C => 'c',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        Extension::ALL
            .into_iter()
            .find(|ext| ext.letter() == c.to_ascii_lowercase())
    }

    /// Number of bits a rule of this extension may constrain.
    ///
    /// Compressed instructions occupy a single 16-bit parcel.
    pub fn parcel_bits(self) -> u32 {
        match self {
            Extension::C => 16,
            _ => WORD_BITS,
        }
    }

    fn flag(self) -> Extensions {
        match self {
            Extension::I => Extensions::I,
            Extension::M => Extensions::M,
            Extension::F => Extensions::F,
            Extension::C => Extensions::C,
        }
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

bitflags! {
    /// A set of enabled extensions.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Extensions: u8 {
        const I = 0b0001;
        const M = 0b0010;
        const F = 0b0100;
        const C = 0b1000;
    }
}

impl Extensions {
    /// This set plus the always-present base instruction set.
    pub fn with_base(self) -> Self {
        self | Extensions::I
    }

    /// Enabled extensions in priority order.
    pub fn enabled(self) -> impl Iterator<Item = Extension> {
        Extension::ALL
            .into_iter()
            .filter(move |ext| self.contains(ext.flag()))
    }

    /// Priority-ordered identifier string, e.g. `imfc`.
    pub fn suffix(self) -> String {
        self.enabled().map(Extension::letter).collect()
    }
}

impl From<Extension> for Extensions {
    fn from(ext: Extension) -> Self {
        ext.flag()
    }
}

/// Output language of the generated dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Rust,
    Cpp,
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rust" => Ok(Target::Rust),
            "c++" | "cpp" => Ok(Target::Cpp),
            other => Err(format!("unknown target '{}' (expected 'rust' or 'c++')", other)),
        }
    }
}

/// Settings for one dispatcher generation run.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub extensions: Extensions,
    pub target: Target,
    /// Command line echoed in the generated header
    pub invocation: String,
}

impl DispatcherConfig {
    /// Create a config; the base instruction set is always enabled.
    pub fn new(extensions: Extensions, target: Target) -> Self {
        DispatcherConfig {
            extensions: extensions.with_base(),
            target,
            invocation: "rvdispatch".to_string(),
        }
    }

    pub fn with_invocation(mut self, invocation: impl Into<String>) -> Self {
        self.invocation = invocation.into();
        self
    }
}

/// A contiguous range of hardware bits (LSB=0, high >= low).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BitRange {
    /// Most significant bit of the range
    pub high: u32,
    /// Least significant bit of the range
    pub low: u32,
}

impl BitRange {
    pub fn new(high: u32, low: u32) -> Self {
        BitRange { high, low }
    }

    /// Width of the range in bits (inclusive). Zero for an inverted range.
    pub fn width(&self) -> u32 {
        if self.high < self.low {
            0
        } else {
            self.high - self.low + 1
        }
    }

    /// Iterate over hardware bit positions from LSB to MSB.
    pub fn bits(&self) -> impl Iterator<Item = u32> {
        self.low..=self.high
    }
}

impl fmt::Display for BitRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.high == self.low {
            write!(f, "{}", self.high)
        } else {
            write!(f, "{}..{}", self.high, self.low)
        }
    }
}

/// "Bits `range` of the code word must equal `value`."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitField {
    pub range: BitRange,
    pub value: u32,
    pub span: Span,
}

/// Structured operator identity.
///
/// The mnemonic is split on `.` when the rule is parsed, so `fcvt.w.s` is
/// stored as `["fcvt", "w", "s"]`. Renderers decide how to spell it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Operator {
    pub extension: Extension,
    pub segments: Vec<String>,
}

impl Operator {
    pub fn new(mnemonic: &str, extension: Extension) -> Self {
        Operator {
            extension,
            segments: mnemonic.split('.').map(str::to_string).collect(),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// One encoding rule: an operator, its operand names and its fixed bits.
#[derive(Debug, Clone)]
pub struct Spec {
    pub operator: Operator,
    pub operands: Vec<String>,
    pub constraints: Vec<BitField>,
    pub span: Span,
}

impl Spec {
    /// Constraint ranges and values in canonical shape order.
    pub fn canonical_constraints(&self) -> (Shape, Vec<u32>) {
        let mut pairs: Vec<(BitRange, u32)> = self
            .constraints
            .iter()
            .map(|c| (c.range, c.value))
            .collect();
        pairs.sort_by(|a, b| b.0.cmp(&a.0));
        let (ranges, values) = pairs.into_iter().unzip();
        (Shape(ranges), values)
    }
}

/// The set of bit ranges a rule constrains, ordered by descending high bit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape(pub Vec<BitRange>);

impl Shape {
    pub fn ranges(&self) -> &[BitRange] {
        &self.0
    }
}

/// One rule inside a group, with its operands resolved.
#[derive(Debug, Clone)]
pub struct Member {
    pub operator: Operator,
    pub operands: OperandShape,
    /// Constraint values in the group's canonical range order
    pub values: Vec<u32>,
    pub pattern: u32,
    pub span: Span,
}

/// All rules sharing one shape, tested together by one masked comparison.
#[derive(Debug, Clone)]
pub struct Group {
    pub shape: Shape,
    pub mask: u32,
    pub width: u32,
    pub members: Vec<Member>,
}

impl Group {
    /// True if `code` falls into this group's masked comparison for `member`.
    pub fn matches(&self, member: &Member, code: u32) -> bool {
        code & self.mask == member.pattern
    }
}
