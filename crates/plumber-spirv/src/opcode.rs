//! SPIR-V numeric constants.
//!
//! Values come from the unified SPIR-V headers (`spirv.core.grammar.json`). Only the subset the
//! reflection pass and its name table care about is defined here.

#![allow(missing_docs)]

// ---- Opcodes (subset) ----

pub const OP_NOP: u16 = 0;
pub const OP_UNDEF: u16 = 1;
pub const OP_SOURCE_CONTINUED: u16 = 2;
pub const OP_SOURCE: u16 = 3;
pub const OP_SOURCE_EXTENSION: u16 = 4;
pub const OP_NAME: u16 = 5;
pub const OP_MEMBER_NAME: u16 = 6;
pub const OP_STRING: u16 = 7;
pub const OP_LINE: u16 = 8;
pub const OP_EXTENSION: u16 = 10;
pub const OP_EXT_INST_IMPORT: u16 = 11;
pub const OP_EXT_INST: u16 = 12;
pub const OP_MEMORY_MODEL: u16 = 14;
pub const OP_ENTRY_POINT: u16 = 15;
pub const OP_EXECUTION_MODE: u16 = 16;
pub const OP_CAPABILITY: u16 = 17;
pub const OP_TYPE_VOID: u16 = 19;
pub const OP_TYPE_BOOL: u16 = 20;
pub const OP_TYPE_INT: u16 = 21;
pub const OP_TYPE_FLOAT: u16 = 22;
pub const OP_TYPE_VECTOR: u16 = 23;
pub const OP_TYPE_MATRIX: u16 = 24;
pub const OP_TYPE_IMAGE: u16 = 25;
pub const OP_TYPE_SAMPLER: u16 = 26;
pub const OP_TYPE_SAMPLED_IMAGE: u16 = 27;
pub const OP_TYPE_ARRAY: u16 = 28;
pub const OP_TYPE_RUNTIME_ARRAY: u16 = 29;
pub const OP_TYPE_STRUCT: u16 = 30;
pub const OP_TYPE_POINTER: u16 = 32;
pub const OP_TYPE_FUNCTION: u16 = 33;
pub const OP_CONSTANT_TRUE: u16 = 41;
pub const OP_CONSTANT_FALSE: u16 = 42;
pub const OP_CONSTANT: u16 = 43;
pub const OP_CONSTANT_COMPOSITE: u16 = 44;
pub const OP_FUNCTION: u16 = 54;
pub const OP_FUNCTION_PARAMETER: u16 = 55;
pub const OP_FUNCTION_END: u16 = 56;
pub const OP_FUNCTION_CALL: u16 = 57;
pub const OP_VARIABLE: u16 = 59;
pub const OP_LOAD: u16 = 61;
pub const OP_STORE: u16 = 62;
pub const OP_ACCESS_CHAIN: u16 = 65;
pub const OP_DECORATE: u16 = 71;
pub const OP_MEMBER_DECORATE: u16 = 72;
pub const OP_VECTOR_SHUFFLE: u16 = 79;
pub const OP_COMPOSITE_CONSTRUCT: u16 = 80;
pub const OP_COMPOSITE_EXTRACT: u16 = 81;
pub const OP_SAMPLED_IMAGE: u16 = 86;
pub const OP_IMAGE_SAMPLE_IMPLICIT_LOD: u16 = 87;
pub const OP_IMAGE_FETCH: u16 = 95;
pub const OP_CONVERT_F_TO_U: u16 = 109;
pub const OP_CONVERT_F_TO_S: u16 = 110;
pub const OP_CONVERT_S_TO_F: u16 = 111;
pub const OP_CONVERT_U_TO_F: u16 = 112;
pub const OP_I_ADD: u16 = 128;
pub const OP_F_ADD: u16 = 129;
pub const OP_I_SUB: u16 = 130;
pub const OP_F_SUB: u16 = 131;
pub const OP_I_MUL: u16 = 132;
pub const OP_F_MUL: u16 = 133;
pub const OP_F_DIV: u16 = 136;
pub const OP_VECTOR_TIMES_SCALAR: u16 = 142;
pub const OP_MATRIX_TIMES_VECTOR: u16 = 145;
pub const OP_MATRIX_TIMES_MATRIX: u16 = 146;
pub const OP_DOT: u16 = 148;
pub const OP_LOOP_MERGE: u16 = 246;
pub const OP_SELECTION_MERGE: u16 = 247;
pub const OP_LABEL: u16 = 248;
pub const OP_BRANCH: u16 = 249;
pub const OP_BRANCH_CONDITIONAL: u16 = 250;
pub const OP_KILL: u16 = 252;
pub const OP_RETURN: u16 = 253;
pub const OP_RETURN_VALUE: u16 = 254;
pub const OP_UNREACHABLE: u16 = 255;
pub const OP_MODULE_PROCESSED: u16 = 330;

// ---- Decorations (subset) ----

pub const DECORATION_RELAXED_PRECISION: u32 = 0;
pub const DECORATION_SPEC_ID: u32 = 1;
pub const DECORATION_BLOCK: u32 = 2;
pub const DECORATION_BUFFER_BLOCK: u32 = 3;
pub const DECORATION_ROW_MAJOR: u32 = 4;
pub const DECORATION_COL_MAJOR: u32 = 5;
pub const DECORATION_ARRAY_STRIDE: u32 = 6;
pub const DECORATION_MATRIX_STRIDE: u32 = 7;
pub const DECORATION_BUILT_IN: u32 = 11;
pub const DECORATION_NO_PERSPECTIVE: u32 = 13;
pub const DECORATION_FLAT: u32 = 14;
pub const DECORATION_PATCH: u32 = 15;
pub const DECORATION_CENTROID: u32 = 16;
pub const DECORATION_SAMPLE: u32 = 17;
pub const DECORATION_INVARIANT: u32 = 18;
pub const DECORATION_RESTRICT: u32 = 19;
pub const DECORATION_ALIASED: u32 = 20;
pub const DECORATION_VOLATILE: u32 = 21;
pub const DECORATION_CONSTANT: u32 = 22;
pub const DECORATION_COHERENT: u32 = 23;
pub const DECORATION_NON_WRITABLE: u32 = 24;
pub const DECORATION_NON_READABLE: u32 = 25;
pub const DECORATION_UNIFORM: u32 = 26;
pub const DECORATION_LOCATION: u32 = 30;
pub const DECORATION_COMPONENT: u32 = 31;
pub const DECORATION_INDEX: u32 = 32;
pub const DECORATION_BINDING: u32 = 33;
pub const DECORATION_DESCRIPTOR_SET: u32 = 34;
pub const DECORATION_OFFSET: u32 = 35;
pub const DECORATION_NO_CONTRACTION: u32 = 42;
pub const DECORATION_INPUT_ATTACHMENT_INDEX: u32 = 43;
pub const DECORATION_ALIGNMENT: u32 = 44;

// ---- Storage classes (subset) ----

pub const STORAGE_CLASS_UNIFORM_CONSTANT: u32 = 0;
pub const STORAGE_CLASS_INPUT: u32 = 1;
pub const STORAGE_CLASS_UNIFORM: u32 = 2;
pub const STORAGE_CLASS_OUTPUT: u32 = 3;
pub const STORAGE_CLASS_WORKGROUP: u32 = 4;
pub const STORAGE_CLASS_PRIVATE: u32 = 6;
pub const STORAGE_CLASS_FUNCTION: u32 = 7;
pub const STORAGE_CLASS_PUSH_CONSTANT: u32 = 9;
pub const STORAGE_CLASS_STORAGE_BUFFER: u32 = 12;

// ---- Execution models (subset) ----

pub const EXECUTION_MODEL_VERTEX: u32 = 0;
pub const EXECUTION_MODEL_FRAGMENT: u32 = 4;
pub const EXECUTION_MODEL_GL_COMPUTE: u32 = 5;
pub const EXECUTION_MODEL_KERNEL: u32 = 6;

// ---- Image dimensionality ----

pub const DIM_1D: u32 = 0;
pub const DIM_2D: u32 = 1;
pub const DIM_3D: u32 = 2;
pub const DIM_CUBE: u32 = 3;
pub const DIM_RECT: u32 = 4;
pub const DIM_BUFFER: u32 = 5;
pub const DIM_SUBPASS_DATA: u32 = 6;

/// Instructions the module pass dispatches to a handler.
///
/// Dispatch is keyed by mnemonic (as resolved through a [`NameTable`](crate::NameTable)), not by
/// number, so a grammar file can rename or extend the opcode space without touching handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    ExtInstImport,
    EntryPoint,
    Name,
    MemberName,
    Decorate,
    TypeVoid,
    TypeBool,
    TypeInt,
    TypeFloat,
    TypeVector,
    TypeMatrix,
    TypeImage,
    TypeSampler,
    TypeSampledImage,
    TypeArray,
    TypePointer,
    TypeStruct,
    Constant,
    Variable,
}

impl Op {
    /// Maps a mnemonic to a handled instruction. Accepts names with or without the `Op` prefix.
    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        let name = mnemonic.strip_prefix("Op").unwrap_or(mnemonic);
        Some(match name {
            "ExtInstImport" => Self::ExtInstImport,
            "EntryPoint" => Self::EntryPoint,
            "Name" => Self::Name,
            "MemberName" => Self::MemberName,
            "Decorate" => Self::Decorate,
            "TypeVoid" => Self::TypeVoid,
            "TypeBool" => Self::TypeBool,
            "TypeInt" => Self::TypeInt,
            "TypeFloat" => Self::TypeFloat,
            "TypeVector" => Self::TypeVector,
            "TypeMatrix" => Self::TypeMatrix,
            "TypeImage" => Self::TypeImage,
            "TypeSampler" => Self::TypeSampler,
            "TypeSampledImage" => Self::TypeSampledImage,
            "TypeArray" => Self::TypeArray,
            "TypePointer" => Self::TypePointer,
            "TypeStruct" => Self::TypeStruct,
            "Constant" => Self::Constant,
            "Variable" => Self::Variable,
            _ => return None,
        })
    }

    /// Canonical mnemonic (with the `Op` prefix).
    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::ExtInstImport => "OpExtInstImport",
            Self::EntryPoint => "OpEntryPoint",
            Self::Name => "OpName",
            Self::MemberName => "OpMemberName",
            Self::Decorate => "OpDecorate",
            Self::TypeVoid => "OpTypeVoid",
            Self::TypeBool => "OpTypeBool",
            Self::TypeInt => "OpTypeInt",
            Self::TypeFloat => "OpTypeFloat",
            Self::TypeVector => "OpTypeVector",
            Self::TypeMatrix => "OpTypeMatrix",
            Self::TypeImage => "OpTypeImage",
            Self::TypeSampler => "OpTypeSampler",
            Self::TypeSampledImage => "OpTypeSampledImage",
            Self::TypeArray => "OpTypeArray",
            Self::TypePointer => "OpTypePointer",
            Self::TypeStruct => "OpTypeStruct",
            Self::Constant => "OpConstant",
            Self::Variable => "OpVariable",
        }
    }

    /// Minimum operand words (excluding the opcode word) the handler reads.
    pub(crate) fn min_operands(self) -> usize {
        match self {
            Self::ExtInstImport => 2,
            Self::EntryPoint => 3,
            Self::Name => 2,
            Self::MemberName => 3,
            Self::Decorate => 2,
            Self::TypeVoid | Self::TypeBool | Self::TypeSampler => 1,
            Self::TypeInt => 3,
            Self::TypeFloat => 2,
            Self::TypeVector | Self::TypeMatrix | Self::TypeArray | Self::TypePointer => 3,
            Self::TypeImage => 8,
            Self::TypeSampledImage => 2,
            Self::TypeStruct => 1,
            Self::Constant => 3,
            Self::Variable => 3,
        }
    }
}
