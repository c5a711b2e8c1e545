//! Grouping and ordering of rules for masked dispatch.
//!
//! Rules that constrain exactly the same bit ranges share one masked
//! comparison. Groups are tested from the widest discriminator down, so a
//! code word matching a highly specific rule is never captured by a coarser
//! rule tested earlier.
//!
//! The order is a priority heuristic. Two groups with unrelated masks could
//! both match one code word; that is not detected here.

use std::cmp::Reverse;
use std::collections::HashMap;

use tracing::{debug, trace};

use crate::bits::{combined_mask, combined_pattern, discriminator_width};
use crate::error::{Error, ErrorKind};
use crate::operands::OperandResolver;
use crate::types::*;

/// Bucket rules by shape and order the buckets by descending specificity.
///
/// Members keep their input order. Groups of equal width keep the order in
/// which their shape first appeared. Unknown operand shapes and duplicate
/// patterns within a group are reported together.
pub fn build_groups(specs: &[Spec], resolver: &OperandResolver) -> Result<Vec<Group>, Vec<Error>> {
    let mut errors = Vec::new();
    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<Shape, usize> = HashMap::new();

    for spec in specs {
        let operands = match resolver.resolve(spec) {
            Ok(shape) => shape,
            Err(e) => {
                errors.push(e);
                continue;
            }
        };

        let (shape, values) = spec.canonical_constraints();
        let pattern = combined_pattern(shape.ranges(), &values);

        let slot = *index.entry(shape.clone()).or_insert_with(|| {
            groups.push(Group {
                mask: combined_mask(shape.ranges()),
                width: discriminator_width(shape.ranges()),
                shape,
                members: Vec::new(),
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        if let Some(prev) = group.members.iter().find(|m| m.pattern == pattern) {
            errors.push(
                Error::new(
                    ErrorKind::AmbiguousEncoding {
                        a: prev.operator.to_string(),
                        b: spec.operator.to_string(),
                    },
                    spec.span.clone(),
                )
                .with_help(format!(
                    "both match {:#010x} under mask {:#010x}; '{}' is defined at {}:{}",
                    pattern, group.mask, prev.operator, prev.span.file, prev.span.line
                )),
            );
            continue;
        }

        group.members.push(Member {
            operator: spec.operator.clone(),
            operands,
            values,
            pattern,
            span: spec.span.clone(),
        });
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    groups.sort_by_key(|g| Reverse(g.width));

    debug!(rules = specs.len(), groups = groups.len(), "grouped rules by shape");
    for group in &groups {
        trace!(
            mask = format_args!("{:#010x}", group.mask),
            width = group.width,
            members = group.members.len(),
            "group"
        );
    }

    Ok(groups)
}

/// Evaluate the dispatch cascade for one code word.
///
/// Returns the first member whose pattern matches under its group's mask,
/// walking groups in order, exactly as the generated dispatcher does.
pub fn select(groups: &[Group], code: u32) -> Option<(&Group, &Member)> {
    groups.iter().find_map(|group| {
        group
            .members
            .iter()
            .find(|member| group.matches(member, code))
            .map(|member| (group, member))
    })
}
