//! Built-in opcode tables and table sources.

use std::fs;
use std::io;
use std::path::Path;

use crate::types::{Extension, Extensions};

/// Text of the built-in table for an extension.
pub fn builtin(extension: Extension) -> &'static str {
    match extension {
        Extension::I => include_str!("tables/rv32i.opcodes"),
        Extension::M => include_str!("tables/rv32m.opcodes"),
        Extension::F => include_str!("tables/rv32f.opcodes"),
        Extension::C => include_str!("tables/rv32c.opcodes"),
    }
}

/// One opcode table to compile, tagged with its extension.
#[derive(Debug, Clone)]
pub struct Table {
    pub extension: Extension,
    /// Name used in error messages
    pub filename: String,
    pub source: String,
}

impl Table {
    pub fn new(extension: Extension, filename: impl Into<String>, source: impl Into<String>) -> Self {
        Table {
            extension,
            filename: filename.into(),
            source: source.into(),
        }
    }

    /// The built-in table for an extension.
    pub fn builtin(extension: Extension) -> Self {
        Table::new(
            extension,
            format!("rv32{}.opcodes", extension.letter()),
            builtin(extension),
        )
    }

    /// Read a table from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn from_path(extension: Extension, path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;
        let filename = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("<table>")
            .to_string();
        Ok(Table::new(extension, filename, source))
    }
}

/// Built-in tables for every enabled extension, in priority order.
pub fn builtin_tables(extensions: Extensions) -> Vec<Table> {
    extensions.enabled().map(Table::builtin).collect()
}
