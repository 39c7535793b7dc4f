use plumber_spirv::opcode::*;
use plumber_spirv::{
    descriptor_pool_sizes, CoreNames, Decoder, DescriptorKind, ExecutionModel, Grammar,
    LayoutKind, Module, SpirvError, StreamErrorKind, VertexFormat, VertexInputLayout,
    VertexInputRequest,
};
use pretty_assertions::assert_eq;

fn string(text: &str) -> Vec<u32> {
    let mut bytes = text.as_bytes().to_vec();
    bytes.resize((bytes.len() / 4 + 1) * 4, 0);
    bytes
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

struct Asm(Vec<u32>);

impl Asm {
    fn new(bound: u32) -> Self {
        Asm(vec![0x0723_0203, 0x0001_0300, 0x0008_000B, bound, 0])
    }

    fn op(&mut self, opcode: u16, operands: &[u32]) -> &mut Self {
        self.0.push(((operands.len() as u32 + 1) << 16) | u32::from(opcode));
        self.0.extend_from_slice(operands);
        self
    }

    fn op_str(&mut self, opcode: u16, before: &[u32], text: &str, after: &[u32]) -> &mut Self {
        let mut operands = before.to_vec();
        operands.extend(string(text));
        operands.extend_from_slice(after);
        self.op(opcode, &operands)
    }
}

/// Hand-assembled equivalent of:
///
/// ```glsl
/// layout(location = 0) in vec3 in_pos;
/// layout(location = 1) in vec2 in_uv;
/// layout(location = 0) out vec2 v_uv;
/// layout(set = 0, binding = 0) uniform Transform { mat4 mvp; } ubo;
/// layout(set = 0, binding = 1) uniform sampler2D tex;
/// ```
fn vertex_shader() -> Vec<u32> {
    let mut a = Asm::new(30);
    a.op(OP_CAPABILITY, &[1])
        .op_str(OP_EXT_INST_IMPORT, &[1], "GLSL.std.450", &[])
        .op(OP_MEMORY_MODEL, &[0, 1])
        .op_str(OP_ENTRY_POINT, &[EXECUTION_MODEL_VERTEX, 4], "main", &[13, 16, 23, 25])
        .op_str(OP_SOURCE, &[2, 450], "", &[])
        .op_str(OP_NAME, &[4], "main", &[])
        .op_str(OP_NAME, &[11], "gl_PerVertex", &[])
        .op_str(OP_MEMBER_NAME, &[11, 0], "gl_Position", &[])
        .op_str(OP_MEMBER_NAME, &[11, 1], "gl_PointSize", &[])
        .op_str(OP_MEMBER_NAME, &[11, 2], "gl_ClipDistance", &[])
        .op_str(OP_NAME, &[13], "", &[])
        .op_str(OP_NAME, &[16], "in_pos", &[])
        .op_str(OP_NAME, &[18], "Transform", &[])
        .op_str(OP_MEMBER_NAME, &[18, 0], "mvp", &[])
        .op_str(OP_NAME, &[20], "ubo", &[])
        .op_str(OP_NAME, &[23], "in_uv", &[])
        .op_str(OP_NAME, &[25], "v_uv", &[])
        .op_str(OP_NAME, &[29], "tex", &[])
        .op(OP_MEMBER_DECORATE, &[11, 0, DECORATION_BUILT_IN, 0])
        .op(OP_MEMBER_DECORATE, &[11, 1, DECORATION_BUILT_IN, 1])
        .op(OP_MEMBER_DECORATE, &[11, 2, DECORATION_BUILT_IN, 3])
        .op(OP_DECORATE, &[11, DECORATION_BLOCK])
        .op(OP_DECORATE, &[16, DECORATION_LOCATION, 0])
        .op(OP_MEMBER_DECORATE, &[18, 0, DECORATION_COL_MAJOR])
        .op(OP_MEMBER_DECORATE, &[18, 0, DECORATION_OFFSET, 0])
        .op(OP_MEMBER_DECORATE, &[18, 0, DECORATION_MATRIX_STRIDE, 16])
        .op(OP_DECORATE, &[18, DECORATION_BLOCK])
        .op(OP_DECORATE, &[20, DECORATION_DESCRIPTOR_SET, 0])
        .op(OP_DECORATE, &[20, DECORATION_BINDING, 0])
        .op(OP_DECORATE, &[23, DECORATION_LOCATION, 1])
        .op(OP_DECORATE, &[25, DECORATION_LOCATION, 0])
        .op(OP_DECORATE, &[29, DECORATION_DESCRIPTOR_SET, 0])
        .op(OP_DECORATE, &[29, DECORATION_BINDING, 1])
        .op(OP_TYPE_VOID, &[2])
        .op(OP_TYPE_FUNCTION, &[3, 2])
        .op(OP_TYPE_FLOAT, &[6, 32])
        .op(OP_TYPE_VECTOR, &[7, 6, 4])
        .op(OP_TYPE_INT, &[8, 32, 0])
        .op(OP_CONSTANT, &[8, 9, 1])
        .op(OP_TYPE_ARRAY, &[10, 6, 9])
        .op(OP_TYPE_STRUCT, &[11, 7, 6, 10])
        .op(OP_TYPE_POINTER, &[12, STORAGE_CLASS_OUTPUT, 11])
        .op(OP_VARIABLE, &[12, 13, STORAGE_CLASS_OUTPUT])
        .op(OP_TYPE_VECTOR, &[14, 6, 3])
        .op(OP_TYPE_POINTER, &[15, STORAGE_CLASS_INPUT, 14])
        .op(OP_VARIABLE, &[15, 16, STORAGE_CLASS_INPUT])
        .op(OP_TYPE_MATRIX, &[17, 7, 4])
        .op(OP_TYPE_STRUCT, &[18, 17])
        .op(OP_TYPE_POINTER, &[19, STORAGE_CLASS_UNIFORM, 18])
        .op(OP_VARIABLE, &[19, 20, STORAGE_CLASS_UNIFORM])
        .op(OP_TYPE_VECTOR, &[21, 6, 2])
        .op(OP_TYPE_POINTER, &[22, STORAGE_CLASS_INPUT, 21])
        .op(OP_VARIABLE, &[22, 23, STORAGE_CLASS_INPUT])
        .op(OP_TYPE_POINTER, &[24, STORAGE_CLASS_OUTPUT, 21])
        .op(OP_VARIABLE, &[24, 25, STORAGE_CLASS_OUTPUT])
        .op(OP_TYPE_IMAGE, &[26, 6, DIM_2D, 0, 0, 0, 1, 0])
        .op(OP_TYPE_SAMPLED_IMAGE, &[27, 26])
        .op(OP_TYPE_POINTER, &[28, STORAGE_CLASS_UNIFORM_CONSTANT, 27])
        .op(OP_VARIABLE, &[28, 29, STORAGE_CLASS_UNIFORM_CONSTANT])
        .op(OP_FUNCTION, &[2, 4, 0, 3])
        .op(OP_LABEL, &[5])
        .op(OP_RETURN, &[])
        .op(OP_FUNCTION_END, &[]);
    a.0
}

#[test]
fn instruction_boundaries_cover_the_module() {
    let words = vertex_shader();
    let decoder = Decoder::new(&words, &CoreNames).unwrap();
    assert_eq!(decoder.header().version(), (1, 3));

    let mut expected = 5;
    for insn in decoder.instructions() {
        let insn = insn.unwrap();
        assert_eq!(insn.offset, expected);
        assert!(insn.mnemonic.is_some(), "unnamed opcode {}", insn.opcode);
        expected += usize::from(insn.word_count);
    }
    assert_eq!(expected, words.len());
}

#[test]
fn entry_point_interface() {
    let module = Module::parse(&vertex_shader(), &CoreNames).unwrap();
    let entries = module.entry_points(&CoreNames);
    assert_eq!(entries.len(), 1);
    let main = &entries[0];
    assert_eq!(main.name, "main");
    assert_eq!(main.execution_model, ExecutionModel::Vertex);

    let inputs: Vec<_> = main
        .inputs
        .iter()
        .map(|i| (i.name.as_deref(), i.location, i.is_builtin))
        .collect();
    assert_eq!(
        inputs,
        vec![(Some("in_pos"), Some(0), false), (Some("in_uv"), Some(1), false)]
    );

    let outputs: Vec<_> = main
        .outputs
        .iter()
        .map(|i| (i.id, i.location, i.is_builtin))
        .collect();
    assert_eq!(outputs, vec![(13, None, true), (25, Some(0), false)]);
    assert_eq!(main.outputs[1].type_string, "out *vec<Float32, 2>");
    assert_eq!(
        module.type_to_string(11),
        "{ vec<Float32, 4> gl_Position,Float32 gl_PointSize,Float32[1] gl_ClipDistance }"
    );
}

#[test]
fn builtin_block_layout() {
    let module = Module::parse(&vertex_shader(), &CoreNames).unwrap();
    let per_vertex = module.variable_layout(13).unwrap();
    assert_eq!(per_vertex.size, 16 + 4 + 4);
    let names: Vec<_> = per_vertex
        .children
        .unwrap()
        .into_iter()
        .map(|child| child.member_name)
        .collect();
    assert_eq!(names, ["gl_Position", "gl_PointSize", "gl_ClipDistance"]);
}

#[test]
fn uniform_descriptors() {
    let module = Module::parse(&vertex_shader(), &CoreNames).unwrap();
    let descriptors = module.descriptors();
    assert_eq!(descriptors.len(), 2);

    let ubo = &descriptors[0];
    assert_eq!((ubo.set, ubo.binding), (Some(0), Some(0)));
    assert_eq!(ubo.name.as_deref(), Some("ubo"));
    assert_eq!(ubo.kind(), DescriptorKind::UniformBuffer);
    let layout = ubo.layout.as_ref().unwrap();
    assert_eq!(layout.size, 64);
    let mvp = &layout.children.as_ref().unwrap()[0];
    assert_eq!(mvp.member_name, "mvp");
    assert_eq!(mvp.layout.kind, LayoutKind::Matrix);
    assert_eq!(mvp.layout.base_type, "vector");

    let tex = &descriptors[1];
    assert_eq!((tex.set, tex.binding), (Some(0), Some(1)));
    assert_eq!(tex.kind(), DescriptorKind::CombinedImageSampler);
    assert_eq!(tex.layout.as_ref().unwrap().name, "sampler2D");

    let sizes = descriptor_pool_sizes(&descriptors);
    assert_eq!(sizes.len(), 2);
    assert_eq!(sizes[&DescriptorKind::UniformBuffer], 1);
    assert_eq!(sizes[&DescriptorKind::CombinedImageSampler], 1);
}

#[test]
fn vertex_input_from_entry_layout() {
    let module = Module::parse(&vertex_shader(), &CoreNames).unwrap();
    let entry = &module.entry_layouts()[0];
    assert_eq!(entry.inputs.len(), 2);

    let request = VertexInputRequest::parse(["input=0,1"]).unwrap();
    let layout = VertexInputLayout::build(&request, entry).unwrap();
    assert_eq!(layout.bindings.len(), 1);
    assert_eq!(layout.bindings[0].stride, 20);
    let attributes: Vec<_> = layout
        .attributes
        .iter()
        .map(|a| (a.location, a.format, a.offset))
        .collect();
    assert_eq!(
        attributes,
        vec![
            (0, VertexFormat::R32G32B32Sfloat, 0),
            (1, VertexFormat::R32G32Sfloat, 12),
        ]
    );
}

#[test]
fn truncated_module_is_malformed() {
    let mut words = vertex_shader();
    // Drop the function body and the last two words of `OpFunction`.
    words.truncate(words.len() - 6);
    let err = Module::parse(&words, &CoreNames).unwrap_err();
    assert!(matches!(
        err,
        SpirvError::MalformedStream {
            opcode: Some(OP_FUNCTION),
            kind: StreamErrorKind::InstructionOutOfBounds { len: 5, .. },
            ..
        }
    ));
}

#[test]
fn dispatch_follows_the_grammar_names() {
    // A grammar that only knows `OpName`, `OpTypeFloat` and `OpTypeVector`.
    let grammar = Grammar::from_json_str(
        r#"{ "spv": { "enum": [
            { "Name": "Op", "Values": { "OpName": 5, "OpTypeFloat": 22, "OpTypeVector": 23 } },
            { "Name": "Decoration", "Values": { "Location": 30 } }
        ] } }"#,
    )
    .unwrap();
    let module = Module::parse(&vertex_shader(), &grammar).unwrap();

    assert_eq!(module.name(16), Some("in_pos"));
    assert_eq!(module.type_layout(7).unwrap().size, 16);
    // `OpVariable` and `OpEntryPoint` are unknown to this grammar.
    assert!(module.variable(16).is_none());
    assert!(module.declared_entry_points().is_empty());
}
