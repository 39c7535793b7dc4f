//! Limits for SPIR-V decoding.
//!
//! These are intentionally generous for real shaders while still rejecting pathological inputs
//! (huge id bounds, multi-gigabyte word arrays) before any per-id work is done.

use crate::error::LayoutError;

/// Maximum accepted header id-bound.
///
/// The SPIR-V universal limits cap result ids at `0x3F_FFFF`, so the exclusive bound never needs
/// to exceed `0x40_0000`.
pub const MAX_ID_BOUND: u32 = 0x40_0000;

/// Maximum number of words accepted for a single module (64 MiB of bytecode).
pub const MAX_MODULE_WORDS: usize = 16 * 1024 * 1024;

/// Maximum nesting depth the layout resolver follows before giving up.
///
/// Type graphs in valid modules are acyclic; this only bounds recursion on hostile input.
pub const MAX_LAYOUT_DEPTH: u32 = 64;

/// Maximum number of type nodes a single layout query or type rendering visits.
///
/// Shared subtypes are expanded at every use, so a small acyclic graph can describe an
/// exponentially large tree.
pub const MAX_TYPE_NODES: u32 = 8192;

/// Maximum total bytes of member names a single layout query or type rendering copies.
pub const MAX_TYPE_NAME_BYTES: usize = 1024 * 1024;

/// Options for a single decode pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Reject modules whose header declares an id-bound above this value.
    pub max_id_bound: u32,
    /// Reject modules with more words than this.
    pub max_words: usize,
    /// Reject instructions that define or target ids at or above the header's id-bound.
    pub check_id_bound: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_id_bound: MAX_ID_BOUND,
            max_words: MAX_MODULE_WORDS,
            check_id_bound: true,
        }
    }
}

/// Counts the type nodes one query visits against [`MAX_TYPE_NODES`] and the member-name bytes
/// it copies against [`MAX_TYPE_NAME_BYTES`].
#[derive(Debug, Default)]
pub(crate) struct NodeBudget {
    visited: u32,
    name_bytes: usize,
}

impl NodeBudget {
    /// Records a visit to `id`; fails once more than [`MAX_TYPE_NODES`] nodes were visited.
    pub(crate) fn visit(&mut self, id: u32) -> Result<(), LayoutError> {
        self.visited = self.visited.saturating_add(1);
        if self.visited > MAX_TYPE_NODES {
            return Err(LayoutError::TooComplex { id });
        }
        Ok(())
    }

    /// Records copying a member name of struct `id`.
    pub(crate) fn copy_name(&mut self, id: u32, len: usize) -> Result<(), LayoutError> {
        self.name_bytes = self.name_bytes.saturating_add(len);
        if self.name_bytes > MAX_TYPE_NAME_BYTES {
            return Err(LayoutError::TooComplex { id });
        }
        Ok(())
    }

    pub(crate) fn is_exhausted(&self) -> bool {
        self.visited >= MAX_TYPE_NODES || self.name_bytes >= MAX_TYPE_NAME_BYTES
    }
}
