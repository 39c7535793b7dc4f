use crate::error::{SpirvError, StreamErrorKind};

/// SPIR-V magic number, as read from a little-endian word stream.
pub const MAGIC: u32 = 0x0723_0203;

/// Number of words in the fixed module header (magic, version, generator, bound, schema).
pub const HEADER_WORDS: usize = 5;

const WORD_COUNT_SHIFT: u32 = 16;
const OPCODE_MASK: u32 = 0xFFFF;

/// The fixed header of a SPIR-V module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Must be [`MAGIC`].
    pub magic: u32,
    /// Version word (`0x00MMmm00`).
    pub version: u32,
    /// Generator magic number of the producing tool.
    pub generator: u32,
    /// Exclusive upper bound on every id in the module.
    pub bound: u32,
    /// Reserved instruction schema word.
    pub schema: u32,
}

impl Header {
    /// Reads the header from the first [`HEADER_WORDS`] words of `words`.
    pub fn parse(words: &[u32]) -> Result<Self, SpirvError> {
        let Some(&[magic, version, generator, bound, schema]) = words.get(..HEADER_WORDS) else {
            return Err(SpirvError::TooShort { words: words.len() });
        };
        if magic != MAGIC {
            return Err(SpirvError::BadMagic { found: magic });
        }
        Ok(Self {
            magic,
            version,
            generator,
            bound,
            schema,
        })
    }

    /// Returns the `(major, minor)` SPIR-V version encoded in the version word.
    pub fn version(&self) -> (u8, u8) {
        (
            ((self.version >> 16) & 0xFF) as u8,
            ((self.version >> 8) & 0xFF) as u8,
        )
    }
}

/// Reinterprets a module file image as little-endian words.
pub fn words_from_le_bytes(bytes: &[u8]) -> Result<Vec<u32>, SpirvError> {
    if bytes.len() % 4 != 0 {
        return Err(SpirvError::MisalignedBytes { len: bytes.len() });
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// A single instruction borrowed from the module's word array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction<'a> {
    /// Word index of the instruction's first word.
    pub offset: usize,
    /// Low 16 bits of the first word.
    pub opcode: u16,
    /// Total length in words, including the opcode word.
    pub word_count: u16,
    /// Mnemonic resolved from the name table; `None` for opcodes the table does not know.
    pub mnemonic: Option<&'a str>,
    /// The `word_count - 1` words following the opcode word.
    pub operands: &'a [u32],
}

impl Instruction<'_> {
    /// Byte offset of the instruction within the module.
    pub fn byte_offset(&self) -> usize {
        self.offset * 4
    }
}

/// Walks a module instruction-by-instruction using the size-prefixed encoding.
///
/// The cursor starts right after the header. It never yields an instruction that extends past
/// the end of the word array, and a zero word count is reported as an error instead of looping.
#[derive(Debug, Clone)]
pub struct WordCursor<'a> {
    words: &'a [u32],
    offset: usize,
}

impl<'a> WordCursor<'a> {
    /// A cursor positioned at the first instruction after the header.
    pub fn new(words: &'a [u32]) -> Self {
        Self {
            words,
            offset: HEADER_WORDS,
        }
    }

    /// Word index of the current instruction.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns `true` while the current offset points inside the word array.
    pub fn in_bounds(&self) -> bool {
        self.offset < self.words.len()
    }

    /// Word count of the current instruction (bits 16..=31 of its first word).
    ///
    /// Returns 0 when the cursor is past the end of the module.
    pub fn current_size(&self) -> usize {
        self.words
            .get(self.offset)
            .map_or(0, |word| (word >> WORD_COUNT_SHIFT) as usize)
    }

    /// Returns the instruction at the current offset.
    pub fn current(&self) -> Result<Instruction<'a>, SpirvError> {
        let Some(&first) = self.words.get(self.offset) else {
            return Err(SpirvError::malformed(
                self.offset,
                None,
                StreamErrorKind::InstructionOutOfBounds {
                    len: 0,
                    available: self.words.len(),
                },
            ));
        };
        let opcode = (first & OPCODE_MASK) as u16;
        let len = (first >> WORD_COUNT_SHIFT) as usize;
        if len == 0 {
            return Err(SpirvError::malformed(
                self.offset,
                Some(opcode),
                StreamErrorKind::InstructionLengthZero,
            ));
        }
        let end = self.offset + len;
        let Some(words) = self.words.get(self.offset..end) else {
            return Err(SpirvError::malformed(
                self.offset,
                Some(opcode),
                StreamErrorKind::InstructionOutOfBounds {
                    len,
                    available: self.words.len() - self.offset,
                },
            ));
        };
        Ok(Instruction {
            offset: self.offset,
            opcode,
            word_count: len as u16,
            mnemonic: None,
            operands: &words[1..],
        })
    }

    /// Moves to the next instruction.
    ///
    /// Returns whether the new offset is still inside the module; callers stop consuming once it
    /// returns `false`.
    pub fn advance(&mut self) -> Result<bool, SpirvError> {
        let size = self.current_size();
        if size == 0 {
            let opcode = self.words.get(self.offset).map(|w| (w & OPCODE_MASK) as u16);
            return Err(SpirvError::malformed(
                self.offset,
                opcode,
                StreamErrorKind::InstructionLengthZero,
            ));
        }
        self.offset += size;
        Ok(self.in_bounds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(body: &[u32]) -> Vec<u32> {
        let mut words = vec![MAGIC, 0x0001_0000, 0, 16, 0];
        words.extend_from_slice(body);
        words
    }

    #[test]
    fn header_rejects_short_and_bad_magic() {
        assert_eq!(
            Header::parse(&[MAGIC, 0, 0]),
            Err(SpirvError::TooShort { words: 3 })
        );
        assert_eq!(
            Header::parse(&[0x0302_2307, 0, 0, 1, 0]),
            Err(SpirvError::BadMagic { found: 0x0302_2307 })
        );
    }

    #[test]
    fn header_version_fields() {
        let header = Header::parse(&module(&[])).unwrap();
        assert_eq!(header.version(), (1, 0));
        assert_eq!(header.bound, 16);
    }

    #[test]
    fn words_from_bytes_requires_alignment() {
        assert_eq!(
            words_from_le_bytes(&[1, 2, 3]),
            Err(SpirvError::MisalignedBytes { len: 3 })
        );
        assert_eq!(
            words_from_le_bytes(&[0x03, 0x02, 0x23, 0x07]).unwrap(),
            vec![MAGIC]
        );
    }

    #[test]
    fn cursor_walks_size_prefixed_records() {
        // OpCapability Shader; OpMemoryModel Logical GLSL450; OpNop
        let words = module(&[0x0002_0011, 1, 0x0003_000E, 0, 1, 0x0001_0000]);
        let mut cursor = WordCursor::new(&words);
        assert_eq!(cursor.offset(), HEADER_WORDS);
        assert_eq!(cursor.current_size(), 2);

        let first = cursor.current().unwrap();
        assert_eq!(first.opcode, 17);
        assert_eq!(first.operands, &[1]);
        assert_eq!(first.byte_offset(), 20);

        assert!(cursor.advance().unwrap());
        let second = cursor.current().unwrap();
        assert_eq!(second.opcode, 14);
        assert_eq!(second.operands, &[0, 1]);
        assert_eq!(second.byte_offset(), 28);

        assert!(cursor.advance().unwrap());
        let third = cursor.current().unwrap();
        assert_eq!(third.word_count, 1);
        assert!(third.operands.is_empty());

        assert!(!cursor.advance().unwrap());
    }

    #[test]
    fn cursor_rejects_zero_size() {
        let words = module(&[0x0000_0011, 1]);
        let mut cursor = WordCursor::new(&words);
        let err = cursor.advance().unwrap_err();
        assert_eq!(
            err,
            SpirvError::MalformedStream {
                at_word: 5,
                opcode: Some(17),
                kind: StreamErrorKind::InstructionLengthZero,
            }
        );
        assert!(cursor.current().is_err());
    }

    #[test]
    fn cursor_rejects_overrun() {
        let words = module(&[0x0004_0005, 1]);
        let cursor = WordCursor::new(&words);
        assert_eq!(
            cursor.current().unwrap_err(),
            SpirvError::MalformedStream {
                at_word: 5,
                opcode: Some(5),
                kind: StreamErrorKind::InstructionOutOfBounds {
                    len: 4,
                    available: 2,
                },
            }
        );
    }
}
