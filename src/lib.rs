//! # rvdispatch
//!
//! Generate RISC-V instruction dispatchers from opcode tables.
//!
//! Each line of an opcode table names an instruction, its operands and the
//! bits that identify it. rvdispatch groups the rules by the bit ranges they
//! constrain, orders the groups from most to least specific and emits a
//! cascade of masked comparisons that calls one handler method per
//! instruction, falling back to `illegal` when nothing matches.
//!
//! ## Usage
//!
//! ```text
//! rvdispatch -m -c rust > dispatch_rv32imc.rs
//! rvdispatch -f c++ > dispatch_rv32if.h
//! ```
//!
//! From Rust:
//!
//! ```ignore
//! use rvdispatch::{DispatcherConfig, Extensions, Target};
//!
//! let config = DispatcherConfig::new(Extensions::M | Extensions::C, Target::Rust);
//! let code = rvdispatch::generate_builtin(&config)?;
//! ```
//!
//! ## Table syntax
//!
//! ```text
//! # comment
//! add     rd rs1 rs2 31..25=0  14..12=0 6..2=0x0C 1..0=3
//! c.jr    rs1_n0     1..0=2 15..13=4 12=0 6..2=0
//! ```
//!
//! * The first token is the mnemonic. Dots separate its parts (`fcvt.w.s`).
//! * `hi..lo=value` and `bit=value` fix bits of the code word. Values are
//!   decimal, hex (`0x`) or binary (`0b`).
//! * Every other token is an operand name. The ordered operand names select
//!   the accessors passed to the handler; see [`operands::OperandShape`].
//!
//! ## Generated code
//!
//! For Rust the output is a `DispatchRv32<ext>` trait with a blanket impl over
//! `HandleRv32<x>` handler traits, one per enabled extension. For C++ it is a
//! `Rv32<ext>Dispatcher` struct template constrained by
//! `IsRv32<x>InstructionHandler` concepts. Both expect an accessor wrapper
//! around the code word (`ToBits` / `Instruction`) to exist in scope.
//!
//! ## API
//!
//! ```ignore
//! // Built-in tables for the configured extensions
//! let code = rvdispatch::generate_builtin(&config)?;
//!
//! // Custom tables
//! let tables = vec![Table::new(Extension::I, "mine.opcodes", source)];
//! let code = rvdispatch::generate(&tables, &config)?;
//!
//! // Step by step
//! let groups = rvdispatch::compile(&tables)?;
//! let code = rvdispatch::codegen::generate_code(&groups, &config);
//! ```

pub mod bits;
pub mod codegen;
pub mod error;
pub mod group;
pub mod operands;
pub mod parser;
pub mod tables;
pub mod types;
pub mod validate;

use tracing::debug;

pub use error::{Error, ErrorKind, Errors, Span};
pub use operands::{OperandResolver, OperandShape};
pub use tables::Table;
pub use types::{DispatcherConfig, Extension, Extensions, Group, Spec, Target};

/// Parse table text directly.
///
/// # Arguments
///
/// * `source`: opcode table text
/// * `filename`: name used in error messages
/// * `extension`: the extension the rules belong to
pub fn parse_str(source: &str, filename: &str, extension: Extension) -> Result<Vec<Spec>, Vec<Error>> {
    parser::parse(source, filename, extension)
}

/// Parse, validate and group the rules of several tables.
///
/// Tables are concatenated in the given order. Every error of the failing
/// stage is returned; later stages do not run.
///
/// # Errors
///
/// Returns malformed-rule, ambiguous-encoding or unknown-operand-shape errors.
pub fn compile(tables: &[Table]) -> Result<Vec<Group>, Errors> {
    let mut specs = Vec::new();
    let mut errors = Vec::new();

    for table in tables {
        match parser::parse(&table.source, &table.filename, table.extension) {
            Ok(parsed) => specs.extend(parsed),
            Err(errs) => errors.extend(errs),
        }
    }

    if !errors.is_empty() {
        return Err(Errors(errors));
    }

    validate::validate(&specs)?;

    let resolver = OperandResolver::new();
    let groups = group::build_groups(&specs, &resolver)?;

    debug!(tables = tables.len(), rules = specs.len(), groups = groups.len(), "compiled");
    Ok(groups)
}

/// Compile tables and render the dispatcher. Returns the generated code as
/// a `String`; nothing is rendered if any table fails to compile.
///
/// # Errors
///
/// Returns parse, validation or grouping errors.
pub fn generate(tables: &[Table], config: &DispatcherConfig) -> Result<String, Errors> {
    let groups = compile(tables)?;
    Ok(codegen::generate_code(&groups, config))
}

/// Render the dispatcher for the built-in tables of the configured extensions.
///
/// # Errors
///
/// Returns compile errors; the built-in tables are expected to compile cleanly.
pub fn generate_builtin(config: &DispatcherConfig) -> Result<String, Errors> {
    let tables = tables::builtin_tables(config.extensions);
    generate(&tables, config)
}
