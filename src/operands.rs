//! Operand resolution.
//!
//! Maps the operand names a rule declares to the accessors a handler call
//! receives. Every legal combination is a variant of [`OperandShape`], and the
//! accessor list of each variant is an exhaustive `match`, so a new shape
//! cannot be added without spelling out its accessors.

use std::collections::HashMap;

use crate::error::{Error, ErrorKind};
use crate::types::Spec;

/// Every operand combination found in the supported encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandShape {
    // Base set
    NoOperands,
    Branch,
    Fence,
    RdRs1Imm12,
    Store,
    RdImm20,
    RdJimm20,
    RdRs1,
    RdRs1Rs2,
    RdRs1Shamtw,

    // Compressed
    CAddi4spn,
    CLoad,
    CStore,
    CNop,
    CAddi,
    CLi,
    CAddi16sp,
    CLui,
    CAndi,
    CArith,
    CJump,
    CBranch,
    CLwsp,
    CJr,
    CMv,
    CJalr,
    CAdd,
    CSwsp,
    CShiftRight,
    CShiftLeft,

    // Single-precision float
    RdRs1Rs2Rs3Rm,
    RdRs1Rs2Rm,
    RdRs1Rm,
}

impl OperandShape {
    pub const ALL: [OperandShape; 33] = [
        OperandShape::NoOperands,
        OperandShape::Branch,
        OperandShape::Fence,
        OperandShape::RdRs1Imm12,
        OperandShape::Store,
        OperandShape::RdImm20,
        OperandShape::RdJimm20,
        OperandShape::RdRs1,
        OperandShape::RdRs1Rs2,
        OperandShape::RdRs1Shamtw,
        OperandShape::CAddi4spn,
        OperandShape::CLoad,
        OperandShape::CStore,
        OperandShape::CNop,
        OperandShape::CAddi,
        OperandShape::CLi,
        OperandShape::CAddi16sp,
        OperandShape::CLui,
        OperandShape::CAndi,
        OperandShape::CArith,
        OperandShape::CJump,
        OperandShape::CBranch,
        OperandShape::CLwsp,
        OperandShape::CJr,
        OperandShape::CMv,
        OperandShape::CJalr,
        OperandShape::CAdd,
        OperandShape::CSwsp,
        OperandShape::CShiftRight,
        OperandShape::CShiftLeft,
        OperandShape::RdRs1Rs2Rs3Rm,
        OperandShape::RdRs1Rs2Rm,
        OperandShape::RdRs1Rm,
    ];

    /// Operand names, in declaration order, that select this shape.
    pub fn names(self) -> &'static [&'static str] {
        match self {
            OperandShape::NoOperands => &[],
            OperandShape::Branch => &["bimm12hi", "rs1", "rs2", "bimm12lo"],
            OperandShape::Fence => &["fm", "pred", "succ", "rs1", "rd"],
            OperandShape::RdRs1Imm12 => &["rd", "rs1", "imm12"],
            OperandShape::Store => &["imm12hi", "rs1", "rs2", "imm12lo"],
            OperandShape::RdImm20 => &["rd", "imm20"],
            OperandShape::RdJimm20 => &["rd", "jimm20"],
            OperandShape::RdRs1 => &["rd", "rs1"],
            OperandShape::RdRs1Rs2 => &["rd", "rs1", "rs2"],
            OperandShape::RdRs1Shamtw => &["rd", "rs1", "shamtw"],
            OperandShape::CAddi4spn => &["rd_p", "c_nzuimm10"],
            OperandShape::CLoad => &["rd_p", "rs1_p", "c_uimm7lo", "c_uimm7hi"],
            OperandShape::CStore => &["rs1_p", "rs2_p", "c_uimm7lo", "c_uimm7hi"],
            OperandShape::CNop => &["c_nzimm6hi", "c_nzimm6lo"],
            OperandShape::CAddi => &["rd_rs1_n0", "c_nzimm6lo", "c_nzimm6hi"],
            OperandShape::CLi => &["rd", "c_imm6lo", "c_imm6hi"],
            OperandShape::CAddi16sp => &["c_nzimm10hi", "c_nzimm10lo"],
            OperandShape::CLui => &["rd_n2", "c_nzimm18hi", "c_nzimm18lo"],
            OperandShape::CAndi => &["rd_rs1_p", "c_imm6hi", "c_imm6lo"],
            OperandShape::CArith => &["rd_rs1_p", "rs2_p"],
            OperandShape::CJump => &["c_imm12"],
            OperandShape::CBranch => &["rs1_p", "c_bimm9lo", "c_bimm9hi"],
            OperandShape::CLwsp => &["rd_n0", "c_uimm8sphi", "c_uimm8splo"],
            OperandShape::CJr => &["rs1_n0"],
            OperandShape::CMv => &["rd", "c_rs2_n0"],
            OperandShape::CJalr => &["c_rs1_n0"],
            OperandShape::CAdd => &["rd_rs1", "c_rs2_n0"],
            OperandShape::CSwsp => &["c_rs2", "c_uimm8sp_s"],
            OperandShape::CShiftRight => &["rd_rs1_p", "c_nzuimm6lo", "c_nzuimm6hi"],
            OperandShape::CShiftLeft => &["rd_rs1_n0", "c_nzuimm6hi", "c_nzuimm6lo"],
            OperandShape::RdRs1Rs2Rs3Rm => &["rd", "rs1", "rs2", "rs3", "rm"],
            OperandShape::RdRs1Rs2Rm => &["rd", "rs1", "rs2", "rm"],
            OperandShape::RdRs1Rm => &["rd", "rs1", "rm"],
        }
    }

    /// Accessors passed to the handler, in call order.
    ///
    /// Split immediates (`imm12hi`/`imm12lo` and friends) collapse into one
    /// accessor that reassembles the value.
    pub fn accessors(self) -> &'static [&'static str] {
        match self {
            OperandShape::NoOperands => &[],
            OperandShape::Branch => &["rs1", "rs2", "bimmediate"],
            OperandShape::Fence => &["fm", "rd", "rs1"],
            OperandShape::RdRs1Imm12 => &["rd", "rs1", "iimmediate"],
            OperandShape::Store => &["rs1", "rs2", "simmediate"],
            OperandShape::RdImm20 => &["rd", "uimmediate"],
            OperandShape::RdJimm20 => &["rd", "jimmediate"],
            OperandShape::RdRs1 => &["rd", "rs1"],
            OperandShape::RdRs1Rs2 => &["rd", "rs1", "rs2"],
            OperandShape::RdRs1Shamtw => &["rd", "rs1", "shamtw"],
            OperandShape::CAddi4spn => &["rdp", "c_nzuimm10"],
            OperandShape::CLoad => &["rdp", "rs1p", "c_uimm7"],
            OperandShape::CStore => &["rs1p", "rs2p", "c_uimm7"],
            OperandShape::CNop => &["c_nzimm6"],
            OperandShape::CAddi => &["rdrs1n0", "c_nzimm6"],
            OperandShape::CLi => &["rd", "c_imm6"],
            OperandShape::CAddi16sp => &["c_nzimm10"],
            OperandShape::CLui => &["rdn2", "c_nzimm18"],
            OperandShape::CAndi => &["rdrs1p", "c_imm6"],
            OperandShape::CArith => &["rdrs1p", "rs2p"],
            OperandShape::CJump => &["c_imm12"],
            OperandShape::CBranch => &["rs1p", "c_bimm9"],
            OperandShape::CLwsp => &["rdn0", "c_uimm8sp"],
            OperandShape::CJr => &["rs1n0"],
            OperandShape::CMv => &["rd", "rs2n0"],
            OperandShape::CJalr => &["rs1n0"],
            OperandShape::CAdd => &["rdrs1", "rs2n0"],
            OperandShape::CSwsp => &["c_rs2", "c_uimm8sp_s"],
            OperandShape::CShiftRight => &["rdrs1p", "c_nzuimm6"],
            OperandShape::CShiftLeft => &["rdrs1n0", "c_nzuimm6"],
            OperandShape::RdRs1Rs2Rs3Rm => &["rd", "rs1", "rs2", "rs3", "rm"],
            OperandShape::RdRs1Rs2Rm => &["rd", "rs1", "rs2", "rm"],
            OperandShape::RdRs1Rm => &["rd", "rs1", "rm"],
        }
    }
}

/// Canonical lookup key for a tuple of operand names.
pub fn shape_key<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|name| name.as_ref())
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Lookup table from operand-name tuples to shapes.
#[derive(Debug, Clone)]
pub struct OperandResolver {
    shapes: HashMap<String, OperandShape>,
}

impl OperandResolver {
    /// Build the table for every supported shape.
    pub fn new() -> Self {
        let shapes = OperandShape::ALL
            .into_iter()
            .map(|shape| (shape_key(shape.names()), shape))
            .collect();
        OperandResolver { shapes }
    }

    pub fn lookup<S: AsRef<str>>(&self, names: &[S]) -> Option<OperandShape> {
        self.shapes.get(&shape_key(names)).copied()
    }

    /// Resolve the operands of a rule, failing for combinations with no accessors.
    pub fn resolve(&self, spec: &Spec) -> Result<OperandShape, Error> {
        self.lookup(spec.operands.as_slice()).ok_or_else(|| {
            Error::new(
                ErrorKind::UnknownOperandShape {
                    operator: spec.operator.to_string(),
                    operands: shape_key(spec.operands.as_slice()),
                },
                spec.span.clone(),
            )
            .with_help("add the operand combination to OperandShape")
        })
    }
}

impl Default for OperandResolver {
    fn default() -> Self {
        Self::new()
    }
}
