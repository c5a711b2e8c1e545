//! C++ rendering: a handler-derived struct constrained by concepts, one
//! `switch` per group.

use super::{capitalize, isa_title, Arm, CascadeRenderer};
use crate::types::*;

pub struct CppRenderer;

impl CascadeRenderer for CppRenderer {
    fn operator_name(&self, operator: &Operator) -> String {
        capitalize(&operator.segments.join("_"))
    }

    fn accessor_call(&self, accessor: &str) -> String {
        format!("c.{}()", capitalize(accessor))
    }

    fn preamble(&self, out: &mut String, config: &DispatcherConfig) {
        let suffix = config.extensions.suffix();
        let title = isa_title(config);
        let requirements = config
            .extensions
            .enabled()
            .map(|ext| format!("IsRv32{}InstructionHandler<Handler>", ext))
            .collect::<Vec<_>>()
            .join("\n        && ");

        out.push_str(&format!(
            "// This code was generated by `{invocation}`. Do not edit.

// A dispatcher for RV32{title} instructions. BYO handler.
template<typename Handler>
    requires {requirements}
struct Rv32{suffix}Dispatcher : public Handler
{{
    using Item = typename Handler::Item;

    // Decodes the input word to an RV32{title} instruction and dispatches it to a handler.
    // clang-format off
    auto Dispatch(u32 code) -> Item
    {{
        Handler& self = static_cast<Handler&>(*this);
        Instruction c(code);

",
            invocation = config.invocation,
        ));
    }

    fn open_group(&self, out: &mut String, mask: u32) {
        if mask == u32::MAX {
            out.push_str("        switch (code) {\n");
        } else {
            out.push_str(&format!("        switch (code & 0x{:08x}) {{\n", mask));
        }
    }

    fn arm(&self, out: &mut String, arm: &Arm) {
        out.push_str(&format!(
            "            case {}: return self.{}({});\n",
            arm.pattern,
            arm.operator,
            arm.arguments.join(", ")
        ));
    }

    fn close_group(&self, out: &mut String) {
        out.push_str("        }\n");
    }

    fn postamble(&self, out: &mut String) {
        out.push_str(
            "        return self.Illegal(code);
    }
    // clang-format on
};

// End of auto-generated code.
",
        );
    }
}
