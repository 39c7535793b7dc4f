use crate::binary::{Header, Instruction, WordCursor};
use crate::error::SpirvError;
use crate::names::NameTable;

/// Decodes a literal string packed into operand words starting at `start`.
///
/// Each word holds four bytes in little-endian order; the first zero byte terminates the string.
/// Returns the text and the index of the first word after the word containing the terminator,
/// or `None` if no terminator is found.
pub fn decode_string(words: &[u32], start: usize) -> Option<(String, usize)> {
    let mut bytes = Vec::new();
    for (idx, word) in words.iter().enumerate().skip(start) {
        for byte in word.to_le_bytes() {
            if byte == 0 {
                return Some((String::from_utf8_lossy(&bytes).into_owned(), idx + 1));
            }
            bytes.push(byte);
        }
    }
    None
}

/// Resolves mnemonics for the instructions of a module.
pub struct Decoder<'a, N: NameTable + ?Sized> {
    words: &'a [u32],
    header: Header,
    names: &'a N,
}

impl<'a, N: NameTable + ?Sized> Decoder<'a, N> {
    /// Validates the module header and prepares to iterate its instructions.
    pub fn new(words: &'a [u32], names: &'a N) -> Result<Self, SpirvError> {
        let header = Header::parse(words)?;
        Ok(Self {
            words,
            header,
            names,
        })
    }

    /// The validated module header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Iterates over every instruction after the header, in stream order.
    ///
    /// The iterator yields at most one error, after which it is exhausted.
    pub fn instructions(&self) -> Instructions<'a, N> {
        Instructions {
            cursor: WordCursor::new(self.words),
            names: self.names,
            done: false,
        }
    }
}

/// Iterator over decoded instructions; see [`Decoder::instructions`].
pub struct Instructions<'a, N: NameTable + ?Sized> {
    cursor: WordCursor<'a>,
    names: &'a N,
    done: bool,
}

impl<'a, N: NameTable + ?Sized> Iterator for Instructions<'a, N> {
    type Item = Result<Instruction<'a>, SpirvError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || !self.cursor.in_bounds() {
            return None;
        }
        let mut insn = match self.cursor.current() {
            Ok(insn) => insn,
            Err(err) => {
                self.done = true;
                return Some(Err(err));
            }
        };
        insn.mnemonic = self.names.opcode_name(insn.opcode);
        tracing::trace!(
            offset = insn.offset,
            opcode = insn.opcode,
            mnemonic = insn.mnemonic.unwrap_or("<unknown>"),
            word_count = insn.word_count,
            "decoded instruction"
        );

        // `current()` already rejected zero-length records, so this cannot fail.
        if let Err(err) = self.cursor.advance() {
            self.done = true;
            return Some(Err(err));
        }
        Some(Ok(insn))
    }
}
