use crate::opcode::*;

/// Maps numeric opcodes and decorations to mnemonics (and back).
///
/// A lookup miss is not an error: the decoder treats it as an unknown mnemonic and skips the
/// instruction.
pub trait NameTable {
    /// Mnemonic of `opcode`, such as `OpTypeInt`.
    fn opcode_name(&self, opcode: u16) -> Option<&str>;
    /// Mnemonic of `decoration`, such as `Location`.
    fn decoration_name(&self, decoration: u32) -> Option<&str>;
    /// Numeric opcode for a mnemonic.
    fn opcode_value(&self, name: &str) -> Option<u16>;
    /// Numeric decoration for a mnemonic.
    fn decoration_value(&self, name: &str) -> Option<u32>;
}

impl<T: NameTable + ?Sized> NameTable for &T {
    fn opcode_name(&self, opcode: u16) -> Option<&str> {
        (**self).opcode_name(opcode)
    }

    fn decoration_name(&self, decoration: u32) -> Option<&str> {
        (**self).decoration_name(decoration)
    }

    fn opcode_value(&self, name: &str) -> Option<u16> {
        (**self).opcode_value(name)
    }

    fn decoration_value(&self, name: &str) -> Option<u32> {
        (**self).decoration_value(name)
    }
}

/// Built-in name table covering the module-level opcodes and the standard decorations.
///
/// Use [`Grammar`](crate::Grammar) to load the complete tables from `spirv.json` instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoreNames;

// Sorted by value so lookups can binary search.
const CORE_OPCODES: &[(u16, &str)] = &[
    (OP_NOP, "OpNop"),
    (OP_UNDEF, "OpUndef"),
    (OP_SOURCE_CONTINUED, "OpSourceContinued"),
    (OP_SOURCE, "OpSource"),
    (OP_SOURCE_EXTENSION, "OpSourceExtension"),
    (OP_NAME, "OpName"),
    (OP_MEMBER_NAME, "OpMemberName"),
    (OP_STRING, "OpString"),
    (OP_LINE, "OpLine"),
    (OP_EXTENSION, "OpExtension"),
    (OP_EXT_INST_IMPORT, "OpExtInstImport"),
    (OP_EXT_INST, "OpExtInst"),
    (OP_MEMORY_MODEL, "OpMemoryModel"),
    (OP_ENTRY_POINT, "OpEntryPoint"),
    (OP_EXECUTION_MODE, "OpExecutionMode"),
    (OP_CAPABILITY, "OpCapability"),
    (OP_TYPE_VOID, "OpTypeVoid"),
    (OP_TYPE_BOOL, "OpTypeBool"),
    (OP_TYPE_INT, "OpTypeInt"),
    (OP_TYPE_FLOAT, "OpTypeFloat"),
    (OP_TYPE_VECTOR, "OpTypeVector"),
    (OP_TYPE_MATRIX, "OpTypeMatrix"),
    (OP_TYPE_IMAGE, "OpTypeImage"),
    (OP_TYPE_SAMPLER, "OpTypeSampler"),
    (OP_TYPE_SAMPLED_IMAGE, "OpTypeSampledImage"),
    (OP_TYPE_ARRAY, "OpTypeArray"),
    (OP_TYPE_RUNTIME_ARRAY, "OpTypeRuntimeArray"),
    (OP_TYPE_STRUCT, "OpTypeStruct"),
    (OP_TYPE_POINTER, "OpTypePointer"),
    (OP_TYPE_FUNCTION, "OpTypeFunction"),
    (OP_CONSTANT_TRUE, "OpConstantTrue"),
    (OP_CONSTANT_FALSE, "OpConstantFalse"),
    (OP_CONSTANT, "OpConstant"),
    (OP_CONSTANT_COMPOSITE, "OpConstantComposite"),
    (OP_FUNCTION, "OpFunction"),
    (OP_FUNCTION_PARAMETER, "OpFunctionParameter"),
    (OP_FUNCTION_END, "OpFunctionEnd"),
    (OP_FUNCTION_CALL, "OpFunctionCall"),
    (OP_VARIABLE, "OpVariable"),
    (OP_LOAD, "OpLoad"),
    (OP_STORE, "OpStore"),
    (OP_ACCESS_CHAIN, "OpAccessChain"),
    (OP_DECORATE, "OpDecorate"),
    (OP_MEMBER_DECORATE, "OpMemberDecorate"),
    (OP_VECTOR_SHUFFLE, "OpVectorShuffle"),
    (OP_COMPOSITE_CONSTRUCT, "OpCompositeConstruct"),
    (OP_COMPOSITE_EXTRACT, "OpCompositeExtract"),
    (OP_SAMPLED_IMAGE, "OpSampledImage"),
    (OP_IMAGE_SAMPLE_IMPLICIT_LOD, "OpImageSampleImplicitLod"),
    (OP_IMAGE_FETCH, "OpImageFetch"),
    (OP_CONVERT_F_TO_U, "OpConvertFToU"),
    (OP_CONVERT_F_TO_S, "OpConvertFToS"),
    (OP_CONVERT_S_TO_F, "OpConvertSToF"),
    (OP_CONVERT_U_TO_F, "OpConvertUToF"),
    (OP_I_ADD, "OpIAdd"),
    (OP_F_ADD, "OpFAdd"),
    (OP_I_SUB, "OpISub"),
    (OP_F_SUB, "OpFSub"),
    (OP_I_MUL, "OpIMul"),
    (OP_F_MUL, "OpFMul"),
    (OP_F_DIV, "OpFDiv"),
    (OP_VECTOR_TIMES_SCALAR, "OpVectorTimesScalar"),
    (OP_MATRIX_TIMES_VECTOR, "OpMatrixTimesVector"),
    (OP_MATRIX_TIMES_MATRIX, "OpMatrixTimesMatrix"),
    (OP_DOT, "OpDot"),
    (OP_LOOP_MERGE, "OpLoopMerge"),
    (OP_SELECTION_MERGE, "OpSelectionMerge"),
    (OP_LABEL, "OpLabel"),
    (OP_BRANCH, "OpBranch"),
    (OP_BRANCH_CONDITIONAL, "OpBranchConditional"),
    (OP_KILL, "OpKill"),
    (OP_RETURN, "OpReturn"),
    (OP_RETURN_VALUE, "OpReturnValue"),
    (OP_UNREACHABLE, "OpUnreachable"),
    (OP_MODULE_PROCESSED, "OpModuleProcessed"),
];

const CORE_DECORATIONS: &[(u32, &str)] = &[
    (DECORATION_RELAXED_PRECISION, "RelaxedPrecision"),
    (DECORATION_SPEC_ID, "SpecId"),
    (DECORATION_BLOCK, "Block"),
    (DECORATION_BUFFER_BLOCK, "BufferBlock"),
    (DECORATION_ROW_MAJOR, "RowMajor"),
    (DECORATION_COL_MAJOR, "ColMajor"),
    (DECORATION_ARRAY_STRIDE, "ArrayStride"),
    (DECORATION_MATRIX_STRIDE, "MatrixStride"),
    (DECORATION_BUILT_IN, "BuiltIn"),
    (DECORATION_NO_PERSPECTIVE, "NoPerspective"),
    (DECORATION_FLAT, "Flat"),
    (DECORATION_PATCH, "Patch"),
    (DECORATION_CENTROID, "Centroid"),
    (DECORATION_SAMPLE, "Sample"),
    (DECORATION_INVARIANT, "Invariant"),
    (DECORATION_RESTRICT, "Restrict"),
    (DECORATION_ALIASED, "Aliased"),
    (DECORATION_VOLATILE, "Volatile"),
    (DECORATION_CONSTANT, "Constant"),
    (DECORATION_COHERENT, "Coherent"),
    (DECORATION_NON_WRITABLE, "NonWritable"),
    (DECORATION_NON_READABLE, "NonReadable"),
    (DECORATION_UNIFORM, "Uniform"),
    (DECORATION_LOCATION, "Location"),
    (DECORATION_COMPONENT, "Component"),
    (DECORATION_INDEX, "Index"),
    (DECORATION_BINDING, "Binding"),
    (DECORATION_DESCRIPTOR_SET, "DescriptorSet"),
    (DECORATION_OFFSET, "Offset"),
    (DECORATION_NO_CONTRACTION, "NoContraction"),
    (DECORATION_INPUT_ATTACHMENT_INDEX, "InputAttachmentIndex"),
    (DECORATION_ALIGNMENT, "Alignment"),
];

fn lookup_by_value<K: Ord + Copy>(table: &'static [(K, &'static str)], key: K) -> Option<&'static str> {
    table
        .binary_search_by_key(&key, |&(value, _)| value)
        .ok()
        .map(|idx| table[idx].1)
}

fn lookup_by_name<K: Copy>(table: &'static [(K, &'static str)], name: &str) -> Option<K> {
    table
        .iter()
        .find(|&&(_, mnemonic)| mnemonic == name)
        .map(|&(value, _)| value)
}

impl NameTable for CoreNames {
    fn opcode_name(&self, opcode: u16) -> Option<&str> {
        lookup_by_value(CORE_OPCODES, opcode)
    }

    fn decoration_name(&self, decoration: u32) -> Option<&str> {
        lookup_by_value(CORE_DECORATIONS, decoration)
    }

    fn opcode_value(&self, name: &str) -> Option<u16> {
        lookup_by_name(CORE_OPCODES, name)
    }

    fn decoration_value(&self, name: &str) -> Option<u32> {
        lookup_by_name(CORE_DECORATIONS, name)
    }
}
