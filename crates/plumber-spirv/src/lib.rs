//! A bounds-checked reflection front end for SPIR-V shader modules.
//!
//! The crate walks a module's word stream once, dispatching the instructions that matter for
//! reflection (debug names, decorations, type declarations, global variables and entry points)
//! into a [`Module`]. Everything else is derived lazily from that frozen model:
//!
//! - [`Module::type_layout`] turns a type id into a [`TypeLayout`] tree (sizes, element counts,
//!   struct members, image kinds).
//! - [`Module::entry_points`] partitions each entry point's interface into inputs and outputs.
//! - [`Module::entry_layouts`] keys an entry point's input layouts by `Location`.
//! - [`Module::descriptors`] lists uniform resources ordered by `(set, binding)`.
//!
//! Input is treated as **untrusted**: malformed streams are reported as
//! [`SpirvError::MalformedStream`] and never cause out-of-bounds reads or non-terminating loops.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod binary;
mod decode;
mod error;
/// Loader for the machine-readable SPIR-V header grammar (`spirv.json`).
pub mod grammar;
mod layout;
/// Hard limits applied while decoding untrusted modules.
pub mod limits;
mod module;
/// Opcode and decoration name tables.
pub mod names;
/// Numeric SPIR-V constants (opcodes, decorations, storage classes) used by the decoder.
pub mod opcode;
mod reflect;
mod render;
mod types;
/// Vertex-input binding/attribute derivation from an entry point's input layout.
pub mod vertex_input;

/// Helpers for building synthetic SPIR-V modules in tests.
///
/// Only available when compiling this crate's own tests, or when the `test-utils` feature is
/// enabled. It is **not** considered part of the stable parsing API.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use crate::binary::{words_from_le_bytes, Header, Instruction, WordCursor};
pub use crate::decode::{decode_string, Decoder, Instructions};
pub use crate::error::{LayoutError, SpirvError, StreamErrorKind};
pub use crate::grammar::{Grammar, GrammarError};
pub use crate::layout::{ImageLayout, LayoutKind, MemberLayout, TypeLayout};
pub use crate::limits::ParseOptions;
pub use crate::module::{Constant, Decoration, EntryPoint, ExecutionModel, Module, Variable};
pub use crate::names::{CoreNames, NameTable};
pub use crate::opcode::Op;
pub use crate::reflect::{
    descriptor_pool_sizes, is_builtin_heuristic, Descriptor, DescriptorKind, EntryLayout,
    EntryPointInfo, InterfaceVariable, LocationLayout,
};
pub use crate::types::{Dim, ImageType, SpirvType, StorageClass, TypeKind};
pub use crate::vertex_input::{
    VertexAttribute, VertexBinding, VertexFormat, VertexInputError, VertexInputLayout,
    VertexInputRate, VertexInputRequest,
};
