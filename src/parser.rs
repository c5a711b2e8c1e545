//! Opcode table parsing.
//!
//! Each significant line of a table describes one rule:
//!
//! ```text
//! add     rd rs1 rs2 31..25=0  14..12=0 6..2=0x0C 1..0=3
//! ```
//!
//! The first token is the operator mnemonic. Tokens containing `=` are
//! bit-field constraints (`hi..lo=value` or `bit=value`), every other token
//! names an operand. Blank lines and `#` comments are dropped before any
//! rule is tokenized.

use tracing::{debug, trace};

use crate::error::{Error, ErrorKind, Span};
use crate::types::*;

/// Parse a whole opcode table into rules.
///
/// # Arguments
///
/// * `source` - table text
/// * `filename` - name for error reporting (e.g., "rv32i.opcodes")
/// * `extension` - the extension every rule of this table belongs to
///
/// # Returns
///
/// The rules in input order, or every parse error found in the table.
pub fn parse(source: &str, filename: &str, extension: Extension) -> Result<Vec<Spec>, Vec<Error>> {
    let mut parser = Parser::new(source, filename, extension);
    parser.parse_table()
}

/// Parse a single rule line.
pub fn parse_line(line: &str, extension: Extension) -> Result<Spec, Error> {
    let parser = Parser::new(line, "<line>", extension);
    parser.parse_spec(1, line)
}

struct Parser<'a> {
    filename: String,
    extension: Extension,
    lines: Vec<(usize, &'a str)>,
    errors: Vec<Error>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, filename: &str, extension: Extension) -> Self {
        let lines = significant_lines(source);
        Parser {
            filename: filename.to_string(),
            extension,
            lines,
            errors: Vec::new(),
        }
    }

    fn span(&self, line: usize, col: usize, len: usize) -> Span {
        Span::new(&self.filename, line, col + 1, len)
    }

    fn parse_table(&mut self) -> Result<Vec<Spec>, Vec<Error>> {
        let mut specs = Vec::with_capacity(self.lines.len());

        for &(line_no, line) in &self.lines {
            match self.parse_spec(line_no, line) {
                Ok(spec) => specs.push(spec),
                Err(e) => self.errors.push(e),
            }
        }

        if !self.errors.is_empty() {
            return Err(std::mem::take(&mut self.errors));
        }

        debug!(
            file = %self.filename,
            extension = %self.extension,
            rules = specs.len(),
            "parsed opcode table"
        );
        Ok(specs)
    }

    fn parse_spec(&self, line_no: usize, line: &str) -> Result<Spec, Error> {
        let mut tokens = tokenize(line);

        let Some((_, mnemonic)) = tokens.next() else {
            return Err(Error::new(ErrorKind::MissingOperator, self.span(line_no, 0, 0))
                .with_help("a rule starts with its mnemonic"));
        };

        let mut operands = Vec::new();
        let mut constraints = Vec::new();

        for (col, token) in tokens {
            if token.contains('=') {
                let span = self.span(line_no, col, token.len());
                let field = parse_constraint(token, span).map_err(|e| {
                    let help = match &e.help {
                        Some(help) => format!("{}; in rule `{}`", help, line.trim()),
                        None => format!("in rule `{}`", line.trim()),
                    };
                    e.with_help(help)
                })?;
                constraints.push(field);
            } else {
                operands.push(token.to_string());
            }
        }

        let operator = Operator::new(mnemonic, self.extension);
        trace!(%operator, ?operands, constraints = constraints.len(), "parsed rule");

        Ok(Spec {
            operator,
            operands,
            constraints,
            span: self.span(line_no, 0, line.len()),
        })
    }
}

/// Lines that hold a rule, with their 1-based line numbers.
///
/// Lines are kept untrimmed so token columns count from the start of the line.
fn significant_lines(source: &str) -> Vec<(usize, &str)> {
    source
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(idx, line)| (idx + 1, line))
        .collect()
}

/// Split a line on whitespace, keeping each token's byte column.
fn tokenize(line: &str) -> impl Iterator<Item = (usize, &str)> {
    line.split_whitespace().map(move |token| {
        let col = token.as_ptr() as usize - line.as_ptr() as usize;
        (col, token)
    })
}

/// Parse a `<range>=<value>` token.
fn parse_constraint(token: &str, span: Span) -> Result<BitField, Error> {
    let mut parts = token.split('=');
    let (range, value) = match (parts.next(), parts.next(), parts.next()) {
        (Some(range), Some(value), None) if !range.is_empty() && !value.is_empty() => {
            (range, value)
        }
        _ => {
            return Err(Error::new(
                ErrorKind::MalformedConstraint(token.to_string()),
                span,
            ));
        }
    };

    let range = parse_range(range).ok_or_else(|| {
        Error::new(ErrorKind::InvalidRange(range.to_string()), span.clone())
    })?;

    let value = parse_value(value).ok_or_else(|| {
        Error::new(ErrorKind::InvalidValue(value.to_string()), span.clone())
            .with_help("values are decimal, hex (0x) or binary (0b)")
    })?;

    Ok(BitField { range, value, span })
}

/// Parse `<high>..<low>` or a single bit index.
fn parse_range(s: &str) -> Option<BitRange> {
    match s.split_once("..") {
        Some((high, low)) => {
            let high = high.parse::<u32>().ok()?;
            let low = low.parse::<u32>().ok()?;
            Some(BitRange::new(high, low))
        }
        None => {
            let bit = s.parse::<u32>().ok()?;
            Some(BitRange::new(bit, bit))
        }
    }
}

/// Parse an integer literal in decimal, hex (`0x`) or binary (`0b`).
pub fn parse_value(s: &str) -> Option<u32> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = s.strip_prefix("0b").or_else(|| s.strip_prefix("0B")) {
        u32::from_str_radix(bin, 2).ok()
    } else {
        s.parse::<u32>().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_addi() {
        let spec = parse_line("addi rd rs1 imm12 14..12=0 6..2=0x04 1..0=3", Extension::I).unwrap();
        assert_eq!(spec.operator.segments, vec!["addi"]);
        assert_eq!(spec.operands, vec!["rd", "rs1", "imm12"]);
        let fields: Vec<(u32, u32, u32)> = spec
            .constraints
            .iter()
            .map(|c| (c.range.high, c.range.low, c.value))
            .collect();
        assert_eq!(fields, vec![(14, 12, 0), (6, 2, 4), (1, 0, 3)]);
    }

    #[test]
    fn test_operands_interleaved_with_constraints() {
        let spec = parse_line("fence fm pred succ rs1 14..12=0 rd 6..2=0x03 1..0=3", Extension::I)
            .unwrap();
        assert_eq!(spec.operands, vec!["fm", "pred", "succ", "rs1", "rd"]);
        assert_eq!(spec.constraints.len(), 3);
    }

    #[test]
    fn test_single_bit_constraint() {
        let spec = parse_line("c.ebreak 1..0=2 15..13=4 12=1 11..2=0", Extension::C).unwrap();
        assert_eq!(spec.constraints[2].range, BitRange::new(12, 12));
        assert_eq!(spec.constraints[2].value, 1);
    }

    #[test]
    fn test_dotted_mnemonic_is_structured() {
        let spec = parse_line("fcvt.w.s rd rs1 24..20=0 31..27=0x18 rm 26..25=0 6..2=0x14 1..0=3", Extension::F)
            .unwrap();
        assert_eq!(spec.operator.extension, Extension::F);
        assert_eq!(spec.operator.segments, vec!["fcvt", "w", "s"]);
        assert_eq!(spec.operator.to_string(), "fcvt.w.s");
    }

    #[test]
    fn test_value_notations() {
        assert_eq!(parse_value("12"), Some(12));
        assert_eq!(parse_value("0x0C"), Some(12));
        assert_eq!(parse_value("0b011"), Some(3));
        assert_eq!(parse_value("0b2"), None);
        assert_eq!(parse_value("twelve"), None);
    }

    #[test]
    fn test_missing_low_bit() {
        let err = parse_line("addi rd rs1 imm12 14..=0", Extension::I).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidRange("14..".to_string()));
        assert!(err.kind.is_malformed_rule());
        assert!(err.help.unwrap().contains("addi rd rs1 imm12 14..=0"));
    }

    #[test]
    fn test_double_equals() {
        let err = parse_line("addi 14..12=0=1", Extension::I).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedConstraint("14..12=0=1".to_string()));
    }

    #[test]
    fn test_empty_value() {
        let err = parse_line("addi 14..12=", Extension::I).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedConstraint("14..12=".to_string()));
    }

    #[test]
    fn test_bad_value() {
        let err = parse_line("addi 14..12=0xZZ", Extension::I).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidValue("0xZZ".to_string()));
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let source = "\n# a comment\n   # indented comment\n\nlui rd imm20 6..2=0x0D 1..0=3\n";
        let specs = parse(source, "test.opcodes", Extension::I).unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].span.line, 5);
    }

    #[test]
    fn test_all_errors_collected() {
        let source = "a 1..=0\nb rd 6..2=0x0D 1..0=3\nc 3=x\n";
        let errors = parse(source, "test.opcodes", Extension::I).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].span.line, 1);
        assert_eq!(errors[1].span.line, 3);
    }

    #[test]
    fn test_error_column() {
        let err = parse_line("addi rd 14..=0", Extension::I).unwrap_err();
        assert_eq!(err.span.col, 9);
    }

    #[test]
    fn test_error_column_counts_indentation() {
        let source = "lui rd imm20 6..2=0x0D 1..0=3\n    addi rd 14..=0\n\taddi rd 14..=0\n";
        let errors = parse(source, "test.opcodes", Extension::I).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!((errors[0].span.line, errors[0].span.col), (2, 13));
        assert_eq!((errors[1].span.line, errors[1].span.col), (3, 10));
    }

    #[test]
    fn test_bad_value_keeps_notation_help() {
        let err = parse_line("  addi 14..12=0xZZ", Extension::I).unwrap_err();
        let help = err.help.unwrap();
        assert!(help.contains("values are decimal, hex (0x) or binary (0b)"));
        assert!(help.contains("in rule `addi 14..12=0xZZ`"));
    }

    #[test]
    fn test_empty_rule_has_no_operator() {
        let err = parse_line("   ", Extension::I).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingOperator);
        assert!(err.kind.is_malformed_rule());
        assert!(err.to_string().starts_with("error: rule has no operator mnemonic"));
    }
}
