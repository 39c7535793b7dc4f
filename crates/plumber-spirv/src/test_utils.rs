use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::binary::MAGIC;
use crate::opcode::*;

/// Default header id-bound used by [`ModuleBuilder`].
pub const DEFAULT_BOUND: u32 = 1024;

/// Packs `text` into null-terminated little-endian words.
///
/// A string whose length is a multiple of four gets an extra all-zero word, matching what
/// compilers emit.
pub fn pack_string(text: &str) -> Vec<u32> {
    let mut bytes = text.as_bytes().to_vec();
    bytes.push(0);
    while bytes.len() % 4 != 0 {
        bytes.push(0);
    }
    bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Encodes the first word of an instruction.
pub fn opcode_word(opcode: u16, word_count: usize) -> u32 {
    let word_count = u16::try_from(word_count).expect("instruction too long for test module");
    (u32::from(word_count) << 16) | u32::from(opcode)
}

/// Runs `f` on a worker thread and returns its result, or `None` if it is still running after
/// `timeout`.
pub fn with_timeout<T, F>(timeout: Duration, f: F) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(f());
    });
    rx.recv_timeout(timeout).ok()
}

/// Builds a minimal SPIR-V module word stream instruction by instruction.
///
/// The header carries the SPIR-V 1.0 version word, a zero generator and schema, and
/// [`DEFAULT_BOUND`] unless [`ModuleBuilder::bound`] overrides it. No validation is performed:
/// tests are free to emit malformed modules.
#[derive(Debug, Clone)]
pub struct ModuleBuilder {
    bound: u32,
    body: Vec<u32>,
}

impl Default for ModuleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleBuilder {
    /// An empty module with the [`DEFAULT_BOUND`] id-bound.
    pub fn new() -> Self {
        Self {
            bound: DEFAULT_BOUND,
            body: Vec::new(),
        }
    }

    /// Overrides the header id-bound.
    pub fn bound(&mut self, bound: u32) -> &mut Self {
        self.bound = bound;
        self
    }

    /// Appends a raw instruction.
    pub fn instruction(&mut self, opcode: u16, operands: &[u32]) -> &mut Self {
        self.body.push(opcode_word(opcode, operands.len() + 1));
        self.body.extend_from_slice(operands);
        self
    }

    /// `OpCapability`.
    pub fn capability(&mut self, capability: u32) -> &mut Self {
        self.instruction(OP_CAPABILITY, &[capability])
    }

    /// `OpExtInstImport %id "set"`.
    pub fn ext_inst_import(&mut self, id: u32, set: &str) -> &mut Self {
        let mut operands = vec![id];
        operands.extend(pack_string(set));
        self.instruction(OP_EXT_INST_IMPORT, &operands)
    }

    /// `OpMemoryModel`.
    pub fn memory_model(&mut self, addressing: u32, memory: u32) -> &mut Self {
        self.instruction(OP_MEMORY_MODEL, &[addressing, memory])
    }

    /// `OpEntryPoint` with the given execution model, function and interface ids.
    pub fn entry_point(
        &mut self,
        model: u32,
        function: u32,
        name: &str,
        interface: &[u32],
    ) -> &mut Self {
        let mut operands = vec![model, function];
        operands.extend(pack_string(name));
        operands.extend_from_slice(interface);
        self.instruction(OP_ENTRY_POINT, &operands)
    }

    /// `OpName`.
    pub fn name(&mut self, target: u32, name: &str) -> &mut Self {
        let mut operands = vec![target];
        operands.extend(pack_string(name));
        self.instruction(OP_NAME, &operands)
    }

    /// `OpMemberName`.
    pub fn member_name(&mut self, target: u32, member: u32, name: &str) -> &mut Self {
        let mut operands = vec![target, member];
        operands.extend(pack_string(name));
        self.instruction(OP_MEMBER_NAME, &operands)
    }

    /// `OpDecorate` with trailing literal arguments.
    pub fn decorate(&mut self, target: u32, decoration: u32, args: &[u32]) -> &mut Self {
        let mut operands = vec![target, decoration];
        operands.extend_from_slice(args);
        self.instruction(OP_DECORATE, &operands)
    }

    /// `OpTypeVoid`.
    pub fn type_void(&mut self, id: u32) -> &mut Self {
        self.instruction(OP_TYPE_VOID, &[id])
    }

    /// `OpTypeBool`.
    pub fn type_bool(&mut self, id: u32) -> &mut Self {
        self.instruction(OP_TYPE_BOOL, &[id])
    }

    /// `OpTypeInt`.
    pub fn type_int(&mut self, id: u32, width: u32, signed: bool) -> &mut Self {
        self.instruction(OP_TYPE_INT, &[id, width, u32::from(signed)])
    }

    /// `OpTypeFloat`.
    pub fn type_float(&mut self, id: u32, width: u32) -> &mut Self {
        self.instruction(OP_TYPE_FLOAT, &[id, width])
    }

    /// `OpTypeVector`.
    pub fn type_vector(&mut self, id: u32, component: u32, count: u32) -> &mut Self {
        self.instruction(OP_TYPE_VECTOR, &[id, component, count])
    }

    /// `OpTypeMatrix`.
    pub fn type_matrix(&mut self, id: u32, column: u32, columns: u32) -> &mut Self {
        self.instruction(OP_TYPE_MATRIX, &[id, column, columns])
    }

    /// `OpTypeArray`; `length` is the id of the length constant.
    pub fn type_array(&mut self, id: u32, element: u32, length: u32) -> &mut Self {
        self.instruction(OP_TYPE_ARRAY, &[id, element, length])
    }

    /// `OpTypeStruct`.
    pub fn type_struct(&mut self, id: u32, members: &[u32]) -> &mut Self {
        let mut operands = vec![id];
        operands.extend_from_slice(members);
        self.instruction(OP_TYPE_STRUCT, &operands)
    }

    /// `OpTypePointer`.
    pub fn type_pointer(&mut self, id: u32, storage_class: u32, pointee: u32) -> &mut Self {
        self.instruction(OP_TYPE_POINTER, &[id, storage_class, pointee])
    }

    /// `OpTypeImage` with depth, multisample and format set to 0 and `sampled` set to 1.
    pub fn type_image(&mut self, id: u32, sampled_type: u32, dim: u32, arrayed: bool) -> &mut Self {
        self.instruction(
            OP_TYPE_IMAGE,
            &[id, sampled_type, dim, 0, u32::from(arrayed), 0, 1, 0],
        )
    }

    /// `OpTypeSampler`.
    pub fn type_sampler(&mut self, id: u32) -> &mut Self {
        self.instruction(OP_TYPE_SAMPLER, &[id])
    }

    /// `OpTypeSampledImage`.
    pub fn type_sampled_image(&mut self, id: u32, image: u32) -> &mut Self {
        self.instruction(OP_TYPE_SAMPLED_IMAGE, &[id, image])
    }

    /// Single-word `OpConstant`.
    pub fn constant(&mut self, result_type: u32, id: u32, value: u32) -> &mut Self {
        self.instruction(OP_CONSTANT, &[result_type, id, value])
    }

    /// `OpVariable`.
    pub fn variable(&mut self, pointer_type: u32, id: u32, storage_class: u32) -> &mut Self {
        self.instruction(OP_VARIABLE, &[pointer_type, id, storage_class])
    }

    /// Returns the module's words, header included.
    pub fn build(&self) -> Vec<u32> {
        let mut words = Vec::with_capacity(5 + self.body.len());
        words.extend_from_slice(&[MAGIC, 0x0001_0000, 0, self.bound, 0]);
        words.extend_from_slice(&self.body);
        words
    }

    /// Returns the module as a little-endian byte image, as it would be stored in a `.spv` file.
    pub fn build_bytes(&self) -> Vec<u8> {
        self.build()
            .iter()
            .flat_map(|word| word.to_le_bytes())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_string;

    #[test]
    fn pack_string_round_trips_through_decoder() {
        for text in ["", "a", "abc", "main", "longer_name"] {
            let words = pack_string(text);
            assert_eq!(decode_string(&words, 0), Some((text.to_owned(), words.len())));
        }
        assert_eq!(pack_string("main").len(), 2);
    }

    #[test]
    fn build_bytes_is_little_endian() {
        let bytes = ModuleBuilder::new().bound(7).build_bytes();
        assert_eq!(&bytes[..4], &[0x03, 0x02, 0x23, 0x07]);
        assert_eq!(&bytes[12..16], &[7, 0, 0, 0]);
    }
}
