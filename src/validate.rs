//! Semantic validation for parsed rules.
//!
//! Checks every rule for:
//! - Ranges with the low bit above the high bit
//! - Bits outside the code word (or the 16-bit parcel of compressed rules)
//! - Values too wide for their range
//! - Constraints of one rule covering the same bit twice

use crate::error::{Error, ErrorKind};
use crate::types::*;

/// Validate parsed rules, returning every problem found.
pub fn validate(specs: &[Spec]) -> Result<(), Vec<Error>> {
    let mut errors = Vec::new();

    for spec in specs {
        // Phase 1: Range bounds and value widths
        check_constraints(spec, &mut errors);

        // Phase 2: Overlaps within the rule
        check_overlaps(spec, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_constraints(spec: &Spec, errors: &mut Vec<Error>) {
    let width = spec.operator.extension.parcel_bits();

    for field in &spec.constraints {
        let range = field.range;

        if range.high < range.low {
            errors.push(
                Error::new(
                    ErrorKind::InvertedRange {
                        high: range.high,
                        low: range.low,
                    },
                    field.span.clone(),
                )
                .with_help(format!("write it as {}..{}", range.low, range.high)),
            );
            continue;
        }

        if range.high >= width {
            errors.push(Error::new(
                ErrorKind::BitOutOfRange {
                    bit: range.high,
                    width,
                },
                field.span.clone(),
            ));
            continue;
        }

        if u64::from(field.value) >> range.width() != 0 {
            errors.push(Error::new(
                ErrorKind::ValueTooWide {
                    value: field.value,
                    bits: range.width(),
                },
                field.span.clone(),
            ));
        }
    }
}

fn check_overlaps(spec: &Spec, errors: &mut Vec<Error>) {
    let mut covered = 0u64;

    for field in &spec.constraints {
        // Out-of-range fields were already reported.
        if field.range.high < field.range.low || field.range.high >= WORD_BITS {
            continue;
        }
        for bit in field.range.bits() {
            if covered & (1 << bit) != 0 {
                errors.push(Error::new(
                    ErrorKind::OverlappingBits {
                        operator: spec.operator.to_string(),
                        bit,
                    },
                    field.span.clone(),
                ));
                break;
            }
            covered |= 1 << bit;
        }
    }
}
