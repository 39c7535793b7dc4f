//! Derives vertex-buffer bindings and attributes from an entry point's located inputs.
//!
//! A [`VertexInputRequest`] groups input locations into vertex buffers; each buffer becomes one
//! binding whose attributes are packed back to back in request order.

use core::fmt;

use thiserror::Error;

use crate::error::LayoutError;
use crate::reflect::EntryLayout;

/// Errors produced while parsing a vertex-input request or building its layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VertexInputError {
    /// An argument does not start with `input=`.
    #[error("unrecognised vertex input argument `{arg}` (expected `input=<location>[,<location>...]`)")]
    UnknownArgument {
        /// The argument as given.
        arg: String,
    },
    /// A location in the list is not a `u32`.
    #[error("invalid location `{value}` in `{arg}`")]
    InvalidLocation {
        /// The argument as given.
        arg: String,
        /// The unparsable location.
        value: String,
    },
    /// The entry point has no input at a requested location.
    #[error("entry point `{entry}` has no input at location {location}")]
    MissingLocation {
        /// Entry point name.
        entry: String,
        /// The requested location.
        location: u32,
    },
    /// The input's layout could not be resolved.
    #[error("input at location {location} has layout error: {source}")]
    Layout {
        /// The requested location.
        location: u32,
        /// Why the layout failed.
        #[source]
        source: LayoutError,
    },
    /// The input's type has no matching [`VertexFormat`].
    #[error("input at location {location} ({base_type} x{count}) has no vertex format")]
    UnsupportedFormat {
        /// The requested location.
        location: u32,
        /// Base type of the input's layout.
        base_type: String,
        /// Number of base-type elements.
        count: u32,
    },
    /// A buffer's stride does not fit in `u32`.
    #[error("vertex buffer {binding} exceeds u32 bytes")]
    StrideOverflow {
        /// Index of the buffer.
        binding: u32,
    },
}

/// Input locations grouped into vertex buffers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexInputRequest {
    /// One entry per vertex buffer, listing its locations in attribute order.
    pub buffers: Vec<Vec<u32>>,
}

impl VertexInputRequest {
    /// Parses `input=0,1`-style arguments; each argument describes one vertex buffer.
    pub fn parse<I, S>(args: I) -> Result<Self, VertexInputError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut buffers = Vec::new();
        for arg in args {
            let arg = arg.as_ref();
            let Some(list) = arg.strip_prefix("input=") else {
                return Err(VertexInputError::UnknownArgument {
                    arg: arg.to_owned(),
                });
            };
            buffers.push(parse_locations(arg, list)?);
        }
        Ok(Self { buffers })
    }

    /// Whether no vertex buffers were requested.
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}

fn parse_locations(arg: &str, list: &str) -> Result<Vec<u32>, VertexInputError> {
    list.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| {
            value
                .parse::<u32>()
                .map_err(|_| VertexInputError::InvalidLocation {
                    arg: arg.to_owned(),
                    value: value.to_owned(),
                })
        })
        .collect()
}

/// 32-bit-per-component vertex attribute formats.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    R32Sfloat,
    R32G32Sfloat,
    R32G32B32Sfloat,
    R32G32B32A32Sfloat,
    R32Sint,
    R32G32Sint,
    R32G32B32Sint,
    R32G32B32A32Sint,
    R32Uint,
    R32G32Uint,
    R32G32B32Uint,
    R32G32B32A32Uint,
}

impl VertexFormat {
    /// Maps a layout's base type and element count to a format.
    pub fn from_base(base_type: &str, count: u32) -> Option<Self> {
        use VertexFormat::*;
        Some(match (base_type, count) {
            ("Float32", 1) => R32Sfloat,
            ("Float32", 2) => R32G32Sfloat,
            ("Float32", 3) => R32G32B32Sfloat,
            ("Float32", 4) => R32G32B32A32Sfloat,
            ("Int32", 1) => R32Sint,
            ("Int32", 2) => R32G32Sint,
            ("Int32", 3) => R32G32B32Sint,
            ("Int32", 4) => R32G32B32A32Sint,
            ("UInt32", 1) => R32Uint,
            ("UInt32", 2) => R32G32Uint,
            ("UInt32", 3) => R32G32B32Uint,
            ("UInt32", 4) => R32G32B32A32Uint,
            _ => return None,
        })
    }

    /// Vulkan `VkFormat` name.
    pub fn vk_name(self) -> &'static str {
        match self {
            Self::R32Sfloat => "VK_FORMAT_R32_SFLOAT",
            Self::R32G32Sfloat => "VK_FORMAT_R32G32_SFLOAT",
            Self::R32G32B32Sfloat => "VK_FORMAT_R32G32B32_SFLOAT",
            Self::R32G32B32A32Sfloat => "VK_FORMAT_R32G32B32A32_SFLOAT",
            Self::R32Sint => "VK_FORMAT_R32_SINT",
            Self::R32G32Sint => "VK_FORMAT_R32G32_SINT",
            Self::R32G32B32Sint => "VK_FORMAT_R32G32B32_SINT",
            Self::R32G32B32A32Sint => "VK_FORMAT_R32G32B32A32_SINT",
            Self::R32Uint => "VK_FORMAT_R32_UINT",
            Self::R32G32Uint => "VK_FORMAT_R32G32_UINT",
            Self::R32G32B32Uint => "VK_FORMAT_R32G32B32_UINT",
            Self::R32G32B32A32Uint => "VK_FORMAT_R32G32B32A32_UINT",
        }
    }
}

impl fmt::Display for VertexFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.vk_name())
    }
}

/// How often a binding advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexInputRate {
    /// Once per vertex.
    Vertex,
    /// Once per instance.
    Instance,
}

/// One vertex buffer binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexBinding {
    /// Binding index, in request order.
    pub binding: u32,
    /// Total bytes of the buffer's attributes.
    pub stride: u32,
    /// Always [`VertexInputRate::Vertex`] for derived layouts.
    pub input_rate: VertexInputRate,
}

/// One vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Shader input location.
    pub location: u32,
    /// Binding the attribute is read from.
    pub binding: u32,
    /// Attribute format.
    pub format: VertexFormat,
    /// Byte offset within the binding's vertex.
    pub offset: u32,
}

/// Vertex-input state for a pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexInputLayout {
    /// One binding per requested buffer.
    pub bindings: Vec<VertexBinding>,
    /// Attributes in request order.
    pub attributes: Vec<VertexAttribute>,
}

impl VertexInputLayout {
    /// Builds the bindings and attributes `request` describes from `entry`'s located inputs.
    pub fn build(
        request: &VertexInputRequest,
        entry: &EntryLayout,
    ) -> Result<Self, VertexInputError> {
        let mut out = Self::default();
        for (binding, locations) in (0u32..).zip(&request.buffers) {
            let mut offset = 0u32;
            for &location in locations {
                let input = entry.inputs.get(&location).ok_or_else(|| {
                    VertexInputError::MissingLocation {
                        entry: entry.name.clone(),
                        location,
                    }
                })?;
                let layout = input
                    .layout
                    .as_ref()
                    .map_err(|err| VertexInputError::Layout {
                        location,
                        source: err.clone(),
                    })?;
                let format = VertexFormat::from_base(&layout.base_type, layout.base_count)
                    .ok_or_else(|| VertexInputError::UnsupportedFormat {
                        location,
                        base_type: layout.base_type.clone(),
                        count: layout.base_count,
                    })?;
                out.attributes.push(VertexAttribute {
                    location,
                    binding,
                    format,
                    offset,
                });
                offset = layout
                    .base_size
                    .checked_mul(layout.base_count)
                    .and_then(|size| offset.checked_add(size))
                    .ok_or(VertexInputError::StrideOverflow { binding })?;
            }
            out.bindings.push(VertexBinding {
                binding,
                stride: offset,
                input_rate: VertexInputRate::Vertex,
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::CoreNames;
    use crate::opcode::*;
    use crate::test_utils::ModuleBuilder;
    use crate::Module;
    use pretty_assertions::assert_eq;

    fn entry_layout() -> EntryLayout {
        let mut b = ModuleBuilder::new();
        b.entry_point(EXECUTION_MODEL_VERTEX, 1, "main", &[20, 21, 22, 23])
            .decorate(20, DECORATION_LOCATION, &[0])
            .decorate(21, DECORATION_LOCATION, &[1])
            .decorate(22, DECORATION_LOCATION, &[2])
            .decorate(23, DECORATION_LOCATION, &[3])
            .type_float(2, 32)
            .type_vector(3, 2, 3)
            .type_vector(4, 2, 2)
            .type_int(5, 32, false)
            .type_matrix(6, 3, 3)
            .type_pointer(7, STORAGE_CLASS_INPUT, 3)
            .type_pointer(8, STORAGE_CLASS_INPUT, 4)
            .type_pointer(9, STORAGE_CLASS_INPUT, 5)
            .type_pointer(10, STORAGE_CLASS_INPUT, 6)
            .variable(7, 20, STORAGE_CLASS_INPUT)
            .variable(8, 21, STORAGE_CLASS_INPUT)
            .variable(9, 22, STORAGE_CLASS_INPUT)
            .variable(10, 23, STORAGE_CLASS_INPUT);
        let module = Module::parse(&b.build(), &CoreNames).unwrap();
        module.entry_layouts().remove(0)
    }

    #[test]
    fn parses_buffer_groups() {
        let request = VertexInputRequest::parse(["input=0,1", "input=2"]).unwrap();
        assert_eq!(request.buffers, vec![vec![0, 1], vec![2]]);
        assert!(VertexInputRequest::parse(Vec::<String>::new()).unwrap().is_empty());

        assert_eq!(
            VertexInputRequest::parse(["output=1"]).unwrap_err(),
            VertexInputError::UnknownArgument {
                arg: "output=1".to_owned()
            }
        );
        assert!(matches!(
            VertexInputRequest::parse(["input=0,x"]).unwrap_err(),
            VertexInputError::InvalidLocation { value, .. } if value == "x"
        ));
    }

    #[test]
    fn packs_attributes_per_buffer() {
        let entry = entry_layout();
        let request = VertexInputRequest::parse(["input=0,1", "input=2"]).unwrap();
        let layout = VertexInputLayout::build(&request, &entry).unwrap();

        assert_eq!(
            layout.bindings,
            vec![
                VertexBinding {
                    binding: 0,
                    stride: 20,
                    input_rate: VertexInputRate::Vertex
                },
                VertexBinding {
                    binding: 1,
                    stride: 4,
                    input_rate: VertexInputRate::Vertex
                },
            ]
        );
        assert_eq!(
            layout.attributes,
            vec![
                VertexAttribute {
                    location: 0,
                    binding: 0,
                    format: VertexFormat::R32G32B32Sfloat,
                    offset: 0
                },
                VertexAttribute {
                    location: 1,
                    binding: 0,
                    format: VertexFormat::R32G32Sfloat,
                    offset: 12
                },
                VertexAttribute {
                    location: 2,
                    binding: 1,
                    format: VertexFormat::R32Uint,
                    offset: 0
                },
            ]
        );
    }

    #[test]
    fn rejects_missing_and_unsupported_inputs() {
        let entry = entry_layout();

        let request = VertexInputRequest::parse(["input=0,7"]).unwrap();
        assert_eq!(
            VertexInputLayout::build(&request, &entry).unwrap_err(),
            VertexInputError::MissingLocation {
                entry: "main".to_owned(),
                location: 7
            }
        );

        let request = VertexInputRequest::parse(["input=3"]).unwrap();
        assert_eq!(
            VertexInputLayout::build(&request, &entry).unwrap_err(),
            VertexInputError::UnsupportedFormat {
                location: 3,
                base_type: "vector".to_owned(),
                count: 3
            }
        );
    }
}
