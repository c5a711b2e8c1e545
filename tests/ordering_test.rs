use rvdispatch::group::select;
use rvdispatch::tables::builtin_tables;
use rvdispatch::types::WORD_BITS;
use rvdispatch::*;

/// Small deterministic generator for filler bits.
struct XorShift(u32);

impl XorShift {
    fn next(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        x
    }
}

fn all_groups() -> Vec<Group> {
    let extensions = Extensions::all();
    compile(&builtin_tables(extensions)).unwrap()
}

#[test]
fn test_builtin_tables_compile() {
    for ext in Extension::ALL {
        let tables = builtin_tables(Extensions::from(ext).with_base());
        assert!(compile(&tables).is_ok(), "table for {} failed", ext);
    }
}

#[test]
fn test_widths_never_increase() {
    let groups = all_groups();
    for pair in groups.windows(2) {
        assert!(pair[0].width >= pair[1].width);
    }
}

#[test]
fn test_patterns_unique_within_groups() {
    for group in all_groups() {
        for (i, a) in group.members.iter().enumerate() {
            for b in &group.members[i + 1..] {
                assert_ne!(a.pattern, b.pattern, "{} and {}", a.operator, b.operator);
            }
            assert_eq!(a.pattern & !group.mask, 0);
        }
    }
}

#[test]
fn test_constraints_within_word() {
    for table in builtin_tables(Extensions::all()) {
        let specs = parse_str(&table.source, &table.filename, table.extension).unwrap();
        for spec in specs {
            for field in spec.constraints {
                assert!(field.range.high >= field.range.low);
                assert!(field.range.high < WORD_BITS);
            }
        }
    }
}

#[test]
fn test_round_trip_selects_member() {
    // No rule of these tables is a special case of another, so every
    // member must win for every filler.
    let tables = builtin_tables(Extensions::M | Extensions::F);
    let groups = compile(&tables).unwrap();
    let mut rng = XorShift(0x2545_f491);

    for group in &groups {
        for member in &group.members {
            for _ in 0..64 {
                let code = member.pattern | (rng.next() & !group.mask);
                let (_, selected) = select(&groups, code).unwrap();
                assert_eq!(selected.operator, member.operator, "code {:#010x}", code);
            }
        }
    }
}

#[test]
fn test_round_trip_with_compressed_overlaps() {
    // c.nop is c.addi with rd=0, c.jr is c.mv with rs2=0 and so on: the
    // selected rule is either the member itself or one from an earlier,
    // more specific group.
    let groups = all_groups();
    let mut rng = XorShift(0x9e37_79b9);

    for (gi, group) in groups.iter().enumerate() {
        for member in &group.members {
            for _ in 0..64 {
                let code = member.pattern | (rng.next() & !group.mask);
                let (selected_group, selected) = select(&groups, code).unwrap();
                assert!(selected_group.matches(selected, code));
                if selected.operator != member.operator {
                    let sgi = groups
                        .iter()
                        .position(|g| std::ptr::eq(g, selected_group))
                        .unwrap();
                    assert!(sgi < gi, "{} shadowed by later {}", member.operator, selected.operator);
                    assert!(selected_group.width >= group.width);
                }
            }
        }
    }
}

#[test]
fn test_compressed_special_cases_win() {
    let groups = all_groups();

    // c.nop: quadrant 1, funct3 0, rd 0
    let (_, m) = select(&groups, 0x0001).unwrap();
    assert_eq!(m.operator.to_string(), "c.nop");

    // c.addi x1, 1
    let (_, m) = select(&groups, 0x0085).unwrap();
    assert_eq!(m.operator.to_string(), "c.addi");

    // c.ebreak
    let (_, m) = select(&groups, 0x9002).unwrap();
    assert_eq!(m.operator.to_string(), "c.ebreak");
}

#[test]
fn test_unknown_word_is_illegal() {
    let groups = all_groups();
    assert!(select(&groups, 0xffff_ffff).is_none());
}
