//! Dispatcher code generation.
//!
//! The cascade walk lives here once. Each output language implements
//! [`CascadeRenderer`] and only decides how the pieces are spelled.

mod cpp;
mod rust;

pub use cpp::CppRenderer;
pub use rust::RustRenderer;

use crate::types::*;

/// One handler call inside a masked comparison.
#[derive(Debug, Clone)]
pub struct Arm {
    /// Pattern literal, already padded to the instruction's parcel width
    pub pattern: String,
    pub operator: String,
    pub arguments: Vec<String>,
}

/// Surface syntax for one output language.
pub trait CascadeRenderer {
    /// Handler method name for an operator.
    fn operator_name(&self, operator: &Operator) -> String;

    /// Call expression reading one accessor from the decoded word.
    fn accessor_call(&self, accessor: &str) -> String;

    /// Dispatcher declaration up to the first comparison.
    fn preamble(&self, out: &mut String, config: &DispatcherConfig);

    /// Start a comparison of `code & mask`. A mask of all ones compares `code` directly.
    fn open_group(&self, out: &mut String, mask: u32);

    fn arm(&self, out: &mut String, arm: &Arm);

    fn close_group(&self, out: &mut String);

    /// The illegal-instruction fallback and closing boilerplate.
    fn postamble(&self, out: &mut String);
}

/// Render ordered groups with the renderer for the configured target.
pub fn generate_code(groups: &[Group], config: &DispatcherConfig) -> String {
    match config.target {
        Target::Rust => render(&RustRenderer, groups, config),
        Target::Cpp => render(&CppRenderer, groups, config),
    }
}

/// Walk the groups in order and emit one masked comparison per group.
pub fn render<R: CascadeRenderer>(renderer: &R, groups: &[Group], config: &DispatcherConfig) -> String {
    let mut out = String::new();

    renderer.preamble(&mut out, config);
    for group in groups {
        renderer.open_group(&mut out, group.mask);
        for member in &group.members {
            let arm = Arm {
                pattern: format_pattern(member.pattern, member.operator.extension),
                operator: renderer.operator_name(&member.operator),
                arguments: member
                    .operands
                    .accessors()
                    .iter()
                    .map(|a| renderer.accessor_call(a))
                    .collect(),
            };
            renderer.arm(&mut out, &arm);
        }
        renderer.close_group(&mut out);
    }
    renderer.postamble(&mut out);

    out
}

/// Hex literal for a pattern: 4 digits for 16-bit parcels, 8 otherwise.
pub fn format_pattern(pattern: u32, extension: Extension) -> String {
    let digits = (extension.parcel_bits() / 4) as usize;
    format!("0x{:0width$x}", pattern, width = digits)
}

/// Dispatcher name suffix in upper case, e.g. `IMC`.
fn isa_title(config: &DispatcherConfig) -> String {
    config.extensions.suffix().to_uppercase()
}

/// Upper-case the first character.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
