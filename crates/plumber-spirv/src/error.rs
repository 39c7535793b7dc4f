use thiserror::Error;

use crate::binary::HEADER_WORDS;

/// Fatal errors produced while decoding a module.
///
/// Every variant aborts the decode pass. Offsets are word indices into the module; the
/// `Display` output also reports the byte offset so the failure can be located with a hex
/// viewer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpirvError {
    /// The file image length is not a whole number of words.
    #[error("module length {len} is not a multiple of 4 bytes")]
    MisalignedBytes {
        /// Length of the image in bytes.
        len: usize,
    },
    /// Fewer words than the fixed header.
    #[error("module is too short: need at least {} header words, got {words}", HEADER_WORDS)]
    TooShort {
        /// Number of words available.
        words: usize,
    },
    /// The first word is not the SPIR-V magic number.
    #[error("bad magic number {found:#010x} (expected 0x07230203)")]
    BadMagic {
        /// The word found in place of the magic number.
        found: u32,
    },
    /// The module is larger than [`ParseOptions::max_words`](crate::ParseOptions::max_words).
    #[error("module has {words} words, exceeding the maximum of {max}")]
    TooManyWords {
        /// Number of words in the module.
        words: usize,
        /// Configured maximum.
        max: usize,
    },
    /// The header id-bound is above
    /// [`ParseOptions::max_id_bound`](crate::ParseOptions::max_id_bound).
    #[error("header id-bound {bound} exceeds the maximum of {max}")]
    IdBoundTooLarge {
        /// Id-bound declared by the header.
        bound: u32,
        /// Configured maximum.
        max: u32,
    },
    /// An instruction defines or targets an id at or above the header id-bound.
    #[error("id %{id} at word {at_word} is outside the header id-bound {bound}")]
    IdOutOfBounds {
        /// The offending id.
        id: u32,
        /// Id-bound declared by the header.
        bound: u32,
        /// Word offset of the instruction.
        at_word: usize,
    },
    /// The instruction stream itself is corrupt; see [`StreamErrorKind`].
    #[error(
        "malformed instruction stream at word {at_word} (byte {}){}: {kind}",
        .at_word * 4,
        describe_opcode(.opcode)
    )]
    MalformedStream {
        /// Word offset of the failing instruction.
        at_word: usize,
        /// Opcode of the failing instruction, when its first word could be read.
        opcode: Option<u16>,
        /// What is wrong with the instruction.
        kind: StreamErrorKind,
    },
}

/// The specific way an instruction stream is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamErrorKind {
    /// A word count of zero, which would never advance the cursor.
    #[error("instruction word count is zero")]
    InstructionLengthZero,
    /// The instruction extends past the end of the module.
    #[error("instruction with word count {len} overruns the module ({available} words available)")]
    InstructionOutOfBounds {
        /// Declared word count.
        len: usize,
        /// Words left from the instruction's offset to the end of the module.
        available: usize,
    },
    /// The instruction has fewer operands than its handler reads.
    #[error("{mnemonic} needs at least {expected} operand words, found {found}")]
    MissingOperand {
        /// Mnemonic of the instruction.
        mnemonic: &'static str,
        /// Minimum operand words the handler needs.
        expected: usize,
        /// Operand words present.
        found: usize,
    },
    /// A literal string operand runs to the end of the instruction without a null byte.
    #[error("{mnemonic} has a literal string without a null terminator")]
    UnterminatedString {
        /// Mnemonic of the instruction.
        mnemonic: &'static str,
    },
}

fn describe_opcode(opcode: &Option<u16>) -> String {
    opcode.map(|op| format!(" opcode {op}")).unwrap_or_default()
}

impl SpirvError {
    pub(crate) fn malformed(at_word: usize, opcode: Option<u16>, kind: StreamErrorKind) -> Self {
        Self::MalformedStream {
            at_word,
            opcode,
            kind,
        }
    }
}

/// Errors produced by layout and reflection queries.
///
/// These are scoped to a single query: a failed descriptor or entry-point input does not
/// invalidate the rest of the module.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// An id that must be a type has no definition.
    #[error("%{id} (referenced from %{referenced_from}) has no type definition")]
    UnresolvedReference {
        /// The undefined id.
        id: u32,
        /// The variable or type that refers to it.
        referenced_from: u32,
    },
    /// The id is not a module-scope variable.
    #[error("%{id} is not a variable")]
    UnknownVariable {
        /// The queried id.
        id: u32,
    },
    /// A variable's declared type is not a pointer.
    #[error("variable %{variable} has type %{type_id}, which is not a pointer type")]
    NotAPointer {
        /// The variable id.
        variable: u32,
        /// Its declared type.
        type_id: u32,
    },
    /// A pointer type was reached directly.
    #[error("pointer type %{id} cannot be laid out directly; resolve its pointee instead")]
    PointerType {
        /// The pointer type id.
        id: u32,
    },
    /// A size does not fit in `u32`.
    #[error("size of %{id} overflows u32")]
    SizeOverflow {
        /// The type whose size overflowed.
        id: u32,
    },
    /// The type graph nests deeper than [`MAX_LAYOUT_DEPTH`](crate::limits::MAX_LAYOUT_DEPTH).
    #[error("type graph below %{id} nests deeper than {max} levels")]
    TooDeep {
        /// The type at which the limit was hit.
        id: u32,
        /// The depth limit.
        max: u32,
    },
    /// The expanded type tree visits more than
    /// [`MAX_TYPE_NODES`](crate::limits::MAX_TYPE_NODES) nodes or copies more than
    /// [`MAX_TYPE_NAME_BYTES`](crate::limits::MAX_TYPE_NAME_BYTES) of member names.
    #[error("type graph reached at %{id} expands past the node or member-name limits")]
    TooComplex {
        /// The type at which the limit was hit.
        id: u32,
    },
}
