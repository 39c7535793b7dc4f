use core::fmt;
use std::collections::BTreeMap;

use crate::error::LayoutError;
use crate::layout::TypeLayout;
use crate::module::{ExecutionModel, Module};
use crate::names::NameTable;
use crate::opcode::{DECORATION_BINDING, DECORATION_DESCRIPTOR_SET};
use crate::types::StorageClass;

/// One interface variable of an entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceVariable {
    /// Variable id.
    pub id: u32,
    /// Debug name, if the module has one.
    pub name: Option<String>,
    /// Rendered with [`Module::variable_to_string`].
    pub type_string: String,
    /// Rendered with [`Module::decorations_to_string`].
    pub decorations: String,
    /// The `Location` decoration.
    pub location: Option<u32>,
    /// See [`is_builtin_heuristic`].
    pub is_builtin: bool,
}

/// An entry point with its interface split into inputs and outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPointInfo {
    /// Entry point name.
    pub name: String,
    /// Id of the entry function.
    pub function_id: u32,
    /// Stage the entry point runs in.
    pub execution_model: ExecutionModel,
    /// `Input` interface variables in declaration order.
    pub inputs: Vec<InterfaceVariable>,
    /// `Output` interface variables in declaration order.
    pub outputs: Vec<InterfaceVariable>,
}

/// The resolved layout of one located input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationLayout {
    /// The `Location` decoration.
    pub location: u32,
    /// Debug name of the variable.
    pub var_name: Option<String>,
    /// Variable id.
    pub variable_id: u32,
    /// Layout of the pointee type, or why it could not be resolved.
    pub layout: Result<TypeLayout, LayoutError>,
}

/// An entry point's input layouts keyed by `Location`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLayout {
    /// Entry point name.
    pub name: String,
    /// Stage the entry point runs in.
    pub execution_model: ExecutionModel,
    /// Inputs without a `Location` decoration are absent.
    pub inputs: BTreeMap<u32, LocationLayout>,
}

/// A uniform resource binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    /// `None` when the variable has no `DescriptorSet` decoration.
    pub set: Option<u32>,
    /// `None` when the variable has no `Binding` decoration.
    pub binding: Option<u32>,
    /// Debug name of the variable.
    pub name: Option<String>,
    /// Variable id.
    pub variable_id: u32,
    /// Layout of the pointee type, or why it could not be resolved.
    pub layout: Result<TypeLayout, LayoutError>,
}

impl Descriptor {
    /// Descriptor type; [`DescriptorKind::Unknown`] when the layout failed.
    pub fn kind(&self) -> DescriptorKind {
        match &self.layout {
            Ok(layout) => DescriptorKind::from_base_type(&layout.base_type),
            Err(_) => DescriptorKind::Unknown,
        }
    }
}

/// Descriptor type derived from a descriptor's layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DescriptorKind {
    /// A struct block.
    UniformBuffer,
    /// `OpTypeSampledImage`.
    CombinedImageSampler,
    /// A `SubpassData` image.
    InputAttachment,
    /// Any other image.
    SampledImage,
    /// `OpTypeSampler`.
    Sampler,
    /// Anything else, including failed layouts.
    Unknown,
}

impl DescriptorKind {
    /// Maps a [`TypeLayout::base_type`] to a descriptor type.
    pub fn from_base_type(base_type: &str) -> Self {
        match base_type {
            "struct" => Self::UniformBuffer,
            "sampledimage" => Self::CombinedImageSampler,
            "subpassInput" => Self::InputAttachment,
            "image" => Self::SampledImage,
            "sampler" => Self::Sampler,
            _ => Self::Unknown,
        }
    }

    /// Vulkan descriptor type name.
    pub fn vk_name(self) -> &'static str {
        match self {
            Self::UniformBuffer => "VK_DESCRIPTOR_TYPE_UNIFORM_BUFFER",
            Self::CombinedImageSampler => "VK_DESCRIPTOR_TYPE_COMBINED_IMAGE_SAMPLER",
            Self::InputAttachment => "VK_DESCRIPTOR_TYPE_INPUT_ATTACHMENT",
            Self::SampledImage => "VK_DESCRIPTOR_TYPE_SAMPLED_IMAGE",
            Self::Sampler => "VK_DESCRIPTOR_TYPE_SAMPLER",
            Self::Unknown => "<unknown descriptor type>",
        }
    }
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.vk_name())
    }
}

/// Counts descriptors per kind.
pub fn descriptor_pool_sizes(descriptors: &[Descriptor]) -> BTreeMap<DescriptorKind, u32> {
    let mut sizes = BTreeMap::new();
    for descriptor in descriptors {
        *sizes.entry(descriptor.kind()).or_insert(0) += 1;
    }
    sizes
}

/// Treats an interface variable as a builtin when it carries no decorations at all.
///
/// This is an approximation: builtins normally carry a `BuiltIn` decoration, and a
/// user-defined variable may legitimately have none.
pub fn is_builtin_heuristic(module: &Module, id: u32) -> bool {
    module.decorations(id).is_empty()
}

impl Module {
    /// Every entry point with its interface partitioned by storage class.
    ///
    /// Interface ids that are not `Input` or `Output` variables are skipped.
    pub fn entry_points<N: NameTable + ?Sized>(&self, names: &N) -> Vec<EntryPointInfo> {
        self.declared_entry_points()
            .iter()
            .map(|entry| {
                let mut inputs = Vec::new();
                let mut outputs = Vec::new();
                for &id in &entry.interface {
                    let Some(variable) = self.variable(id) else {
                        tracing::warn!(entry = %entry.name, id, "interface id is not a variable");
                        continue;
                    };
                    let bucket = match variable.storage_class {
                        StorageClass::Input => &mut inputs,
                        StorageClass::Output => &mut outputs,
                        _ => continue,
                    };
                    bucket.push(InterfaceVariable {
                        id,
                        name: self.name(id).map(str::to_owned),
                        type_string: self.variable_to_string(id),
                        decorations: self.decorations_to_string(id, names),
                        location: self.location(id),
                        is_builtin: is_builtin_heuristic(self, id),
                    });
                }
                EntryPointInfo {
                    name: entry.name.clone(),
                    function_id: entry.function_id,
                    execution_model: entry.execution_model,
                    inputs,
                    outputs,
                }
            })
            .collect()
    }

    /// Input layouts of every entry point, keyed by `Location`.
    ///
    /// A failed layout is kept in its slot; other inputs and entry points are unaffected.
    pub fn entry_layouts(&self) -> Vec<EntryLayout> {
        self.declared_entry_points()
            .iter()
            .map(|entry| {
                let mut inputs = BTreeMap::new();
                for &id in &entry.interface {
                    let is_input = self
                        .variable(id)
                        .is_some_and(|variable| variable.storage_class == StorageClass::Input);
                    if !is_input {
                        continue;
                    }
                    let Some(location) = self.location(id) else {
                        continue;
                    };
                    let layout = self.variable_layout(id);
                    if let Err(err) = &layout {
                        tracing::warn!(entry = %entry.name, id, location, "input layout failed: {err}");
                    }
                    inputs.insert(
                        location,
                        LocationLayout {
                            location,
                            var_name: self.name(id).map(str::to_owned),
                            variable_id: id,
                            layout,
                        },
                    );
                }
                EntryLayout {
                    name: entry.name.clone(),
                    execution_model: entry.execution_model,
                    inputs,
                }
            })
            .collect()
    }

    /// Uniform resources ordered by `(set, binding)`.
    ///
    /// The sort is stable, so ties keep declaration order; missing coordinates sort first.
    pub fn descriptors(&self) -> Vec<Descriptor> {
        let mut descriptors: Vec<Descriptor> = self
            .uniform_variables()
            .iter()
            .map(|&id| {
                let layout = self.variable_layout(id);
                if let Err(err) = &layout {
                    tracing::warn!(id, "descriptor layout failed: {err}");
                }
                Descriptor {
                    set: self.decoration_value(id, DECORATION_DESCRIPTOR_SET),
                    binding: self.decoration_value(id, DECORATION_BINDING),
                    name: self.name(id).map(str::to_owned),
                    variable_id: id,
                    layout,
                }
            })
            .collect();
        descriptors.sort_by_key(|descriptor| (descriptor.set, descriptor.binding));
        descriptors
    }
}
