//! Rust rendering: a dispatch trait with a blanket impl over handler traits.

use super::{isa_title, Arm, CascadeRenderer};
use crate::types::*;

pub struct RustRenderer;

impl CascadeRenderer for RustRenderer {
    fn operator_name(&self, operator: &Operator) -> String {
        operator.segments.join("_")
    }

    fn accessor_call(&self, accessor: &str) -> String {
        format!("c.{}()", accessor)
    }

    fn preamble(&self, out: &mut String, config: &DispatcherConfig) {
        let suffix = config.extensions.suffix();
        let title = isa_title(config);
        let trait_name = format!("DispatchRv32{}", suffix);
        let bounds = config
            .extensions
            .enabled()
            .map(|ext| format!("HandleRv32{}<Item = U>", ext))
            .collect::<Vec<_>>()
            .join("\n        + ");

        out.push_str(&format!(
            "// This code was generated by `{invocation}`. Do not edit.

/// A dispatcher for RV32{title} instructions.
pub trait {trait_name} {{
    type Item;

    /// Decodes the input word to an RV32{title} instruction and dispatches it to a handler.
    fn dispatch(&mut self, code: u32) -> Self::Item;
}}

impl<T, U> {trait_name} for T
where
    T: {bounds},
{{
    type Item = U;

    fn dispatch(&mut self, code: u32) -> Self::Item {{
        #![allow(clippy::single_match)]

        let c = ToBits(code);

",
            invocation = config.invocation,
        ));
    }

    fn open_group(&self, out: &mut String, mask: u32) {
        if mask == u32::MAX {
            out.push_str("        match code {\n");
        } else {
            out.push_str(&format!("        match code & 0x{:08x} {{\n", mask));
        }
    }

    fn arm(&self, out: &mut String, arm: &Arm) {
        out.push_str(&format!(
            "            {} => return self.{}({}),\n",
            arm.pattern,
            arm.operator,
            arm.arguments.join(", ")
        ));
    }

    fn close_group(&self, out: &mut String) {
        out.push_str("            _ => {}\n");
        out.push_str("        }\n");
    }

    fn postamble(&self, out: &mut String) {
        out.push_str(
            "        self.illegal(code)
    }
}

// End of auto-generated code.
",
        );
    }
}
