//! Type layout resolution.
//!
//! Layouts are derived on demand from the frozen [`Module`]. Sizes are plain byte counts with no
//! alignment or padding rules applied: a struct is the sum of its members, a vector/array/matrix
//! is its element size times its element count.

use crate::error::LayoutError;
use crate::limits::{NodeBudget, MAX_LAYOUT_DEPTH};
use crate::module::Module;
use crate::types::{Dim, ImageType, TypeKind};

/// Shape of a [`TypeLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    /// `void`, `bool`, integer or float.
    Scalar,
    /// `n` components of a scalar.
    Vector,
    /// `n` elements of any type.
    Array,
    /// `n` column vectors.
    Matrix,
    /// Members laid out back to back.
    Struct,
    /// An image with a known dimensionality.
    Image,
    /// An image whose dimensionality has no layout entry.
    UnknownImage,
    /// An image combined with a sampler.
    SampledImage,
    /// A standalone sampler.
    Sampler,
    /// The id has no type definition.
    Unknown,
}

/// Image details carried by image and sampled-image layouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageLayout {
    /// `1D`, `2D`, `3D`, `Cube` or `Subpass`, plus `Array` for arrayed images.
    pub suffix: String,
    /// Dimensionality operand of the image type.
    pub dim: Dim,
    /// Raw image format operand.
    pub format: u32,
    /// Whether the image is arrayed.
    pub arrayed: bool,
    /// Whether the image is multisampled.
    pub multisampled: bool,
}

/// A struct member's layout, tagged with its debug name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberLayout {
    /// Empty when the member has no `OpMemberName`.
    pub member_name: String,
    /// Declared member type.
    pub type_id: u32,
    /// Shape of the member type.
    pub ty: TypeKind,
    /// Resolved layout of the member.
    pub layout: TypeLayout,
}

/// The resolved shape of a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeLayout {
    /// Shape of the layout.
    pub kind: LayoutKind,
    /// `Float32`, `vector`, `struct`, `image2D`, `sampler2D`, ...
    pub name: String,
    /// Total size in bytes.
    pub size: u32,
    /// Size of one element.
    pub base_size: u32,
    /// Name of the element type; matrices always report `vector`.
    pub base_type: String,
    /// Number of `base_type` elements.
    pub base_count: u32,
    /// Struct members in declaration order.
    pub children: Option<Vec<MemberLayout>>,
    /// Set for image and sampled-image layouts.
    pub image: Option<ImageLayout>,
}

impl TypeLayout {
    /// Placeholder for an id without a type definition.
    pub fn unknown() -> Self {
        Self {
            kind: LayoutKind::Unknown,
            name: String::new(),
            size: 0,
            base_size: 0,
            base_type: String::new(),
            base_count: 0,
            children: None,
            image: None,
        }
    }

    /// Whether this is the [`TypeLayout::unknown`] placeholder.
    pub fn is_unknown(&self) -> bool {
        self.kind == LayoutKind::Unknown
    }
}

impl Module {
    /// Resolves the layout of type `id`.
    ///
    /// An id with no type definition yields [`TypeLayout::unknown`], except when it is reached
    /// through a struct member, which is an [`LayoutError::UnresolvedReference`]. Pointer types
    /// are rejected; use [`Module::variable_layout`] to follow a variable's pointer.
    ///
    /// A query that expands more than [`MAX_TYPE_NODES`](crate::limits::MAX_TYPE_NODES) type
    /// nodes fails with [`LayoutError::TooComplex`].
    pub fn type_layout(&self, id: u32) -> Result<TypeLayout, LayoutError> {
        self.layout_at(id, 0, &mut NodeBudget::default())
    }

    /// Resolves the layout of the type variable `id` points to.
    pub fn variable_layout(&self, id: u32) -> Result<TypeLayout, LayoutError> {
        let variable = self
            .variable(id)
            .ok_or(LayoutError::UnknownVariable { id })?;
        let type_id = variable.type_id;
        let pointer = self.ty(type_id).ok_or(LayoutError::UnresolvedReference {
            id: type_id,
            referenced_from: id,
        })?;
        let &TypeKind::Pointer { pointee, .. } = &pointer.kind else {
            return Err(LayoutError::NotAPointer {
                variable: id,
                type_id,
            });
        };
        if self.ty(pointee).is_none() {
            return Err(LayoutError::UnresolvedReference {
                id: pointee,
                referenced_from: type_id,
            });
        }
        self.layout_at(pointee, 1, &mut NodeBudget::default())
    }

    fn layout_at(
        &self,
        id: u32,
        depth: u32,
        budget: &mut NodeBudget,
    ) -> Result<TypeLayout, LayoutError> {
        if depth > MAX_LAYOUT_DEPTH {
            return Err(LayoutError::TooDeep {
                id,
                max: MAX_LAYOUT_DEPTH,
            });
        }
        budget.visit(id)?;
        let Some(ty) = self.ty(id) else {
            tracing::debug!(id, "layout of undefined type");
            return Ok(TypeLayout::unknown());
        };

        match &ty.kind {
            TypeKind::Void | TypeKind::Bool | TypeKind::Int { .. } | TypeKind::Float { .. } => {
                let size = ty.kind.stored_size().unwrap_or(0);
                Ok(TypeLayout {
                    kind: LayoutKind::Scalar,
                    name: ty.name.clone(),
                    size,
                    base_size: size,
                    base_type: ty.name.clone(),
                    base_count: 1,
                    children: None,
                    image: None,
                })
            }
            &TypeKind::Vector { component, count } => {
                let base = self.layout_at(component, depth + 1, budget)?;
                let base_type = base.name.clone();
                repeated(id, LayoutKind::Vector, "vector", &base, base_type, count)
            }
            &TypeKind::Array { element, length } => {
                let base = self.layout_at(element, depth + 1, budget)?;
                let base_type = base.name.clone();
                let count = self.array_length(length);
                repeated(id, LayoutKind::Array, "array", &base, base_type, count)
            }
            &TypeKind::Matrix { column, columns } => {
                let base = self.layout_at(column, depth + 1, budget)?;
                repeated(id, LayoutKind::Matrix, "matrix", &base, "vector".to_owned(), columns)
            }
            TypeKind::Struct { members } => self.struct_layout(id, members, depth, budget),
            TypeKind::Pointer { .. } => Err(LayoutError::PointerType { id }),
            TypeKind::Image(image) => Ok(image_layout(image)),
            TypeKind::Sampler => Ok(TypeLayout {
                kind: LayoutKind::Sampler,
                name: "sampler".to_owned(),
                size: 0,
                base_size: 0,
                base_type: "sampler".to_owned(),
                base_count: 1,
                children: None,
                image: None,
            }),
            &TypeKind::SampledImage { image } => {
                let base = self.layout_at(image, depth + 1, budget)?;
                let suffix = base.image.as_ref().map_or("", |image| image.suffix.as_str());
                Ok(TypeLayout {
                    kind: LayoutKind::SampledImage,
                    name: format!("sampler{suffix}"),
                    size: base.size,
                    base_size: base.base_size,
                    base_type: "sampledimage".to_owned(),
                    base_count: 1,
                    children: None,
                    image: base.image,
                })
            }
        }
    }

    fn struct_layout(
        &self,
        id: u32,
        members: &[u32],
        depth: u32,
        budget: &mut NodeBudget,
    ) -> Result<TypeLayout, LayoutError> {
        let mut size = 0u32;
        let mut children = Vec::with_capacity(members.len());
        for (idx, &member) in members.iter().enumerate() {
            let Some(member_ty) = self.ty(member) else {
                return Err(LayoutError::UnresolvedReference {
                    id: member,
                    referenced_from: id,
                });
            };
            let layout = self.layout_at(member, depth + 1, budget)?;
            let member_name = self.member_name(id, idx as u32).unwrap_or_default();
            budget.copy_name(id, member_name.len())?;
            size = size
                .checked_add(layout.size)
                .ok_or(LayoutError::SizeOverflow { id })?;
            children.push(MemberLayout {
                member_name: member_name.to_owned(),
                type_id: member,
                ty: member_ty.kind.clone(),
                layout,
            });
        }
        Ok(TypeLayout {
            kind: LayoutKind::Struct,
            name: "struct".to_owned(),
            size,
            base_size: size,
            base_type: "struct".to_owned(),
            base_count: 1,
            children: Some(children),
            image: None,
        })
    }
}

fn repeated(
    id: u32,
    kind: LayoutKind,
    name: &str,
    base: &TypeLayout,
    base_type: String,
    count: u32,
) -> Result<TypeLayout, LayoutError> {
    let size = base
        .size
        .checked_mul(count)
        .ok_or(LayoutError::SizeOverflow { id })?;
    Ok(TypeLayout {
        kind,
        name: name.to_owned(),
        size,
        base_size: base.size,
        base_type,
        base_count: count,
        children: None,
        image: None,
    })
}

fn image_layout(image: &ImageType) -> TypeLayout {
    // (size, base size, base count, base type, suffix)
    let entry = match image.dim {
        Dim::Dim1D => Some((1, 1, 1, "image", "1D")),
        Dim::Dim2D => Some((2, 2, 1, "image", "2D")),
        Dim::Dim3D => Some((3, 3, 1, "image", "3D")),
        Dim::Cube => Some((6, 1, 6, "image", "Cube")),
        Dim::SubpassData => Some((1, 1, 1, "subpassInput", "Subpass")),
        Dim::Rect | Dim::Buffer | Dim::Unknown(_) => None,
    };
    let (kind, (size, base_size, base_count, base_type, suffix)) = match entry {
        Some(entry) => (LayoutKind::Image, entry),
        None => {
            tracing::debug!(dim = %image.dim, "image dimensionality has no layout");
            (LayoutKind::UnknownImage, (0, 0, 1, "image", "<unknown img>"))
        }
    };
    let mut suffix = suffix.to_owned();
    if image.arrayed {
        suffix.push_str("Array");
    }
    TypeLayout {
        kind,
        name: format!("image{suffix}"),
        size,
        base_size,
        base_type: base_type.to_owned(),
        base_count,
        children: None,
        image: Some(ImageLayout {
            suffix,
            dim: image.dim,
            format: image.format,
            arrayed: image.arrayed,
            multisampled: image.multisampled,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::CoreNames;
    use crate::opcode::*;
    use crate::test_utils::{with_timeout, ModuleBuilder};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn parse(builder: &ModuleBuilder) -> Module {
        Module::parse(&builder.build(), &CoreNames).unwrap()
    }

    #[test]
    fn struct_of_two_floats() {
        let mut b = ModuleBuilder::new();
        b.name(2, "Point")
            .member_name(2, 0, "x")
            .member_name(2, 1, "y")
            .type_float(1, 32)
            .type_struct(2, &[1, 1]);
        let module = parse(&b);

        let layout = module.type_layout(2).unwrap();
        assert_eq!(layout.kind, LayoutKind::Struct);
        assert_eq!(layout.size, 8);
        assert_eq!(layout.base_type, "struct");
        let children = layout.children.unwrap();
        assert_eq!(children[0].member_name, "x");
        assert_eq!(children[1].member_name, "y");
        assert_eq!(children[1].ty, TypeKind::Float { width: 32 });
        assert_eq!(children[1].layout.size, 4);
    }

    #[test]
    fn composite_sizes_are_element_size_times_count() {
        let mut b = ModuleBuilder::new();
        b.type_float(1, 32)
            .type_vector(2, 1, 3)
            .type_matrix(3, 2, 4)
            .type_int(4, 32, false)
            .constant(4, 5, 7)
            .type_array(6, 2, 5)
            .type_array(7, 3, 2);
        let module = parse(&b);

        let vec3 = module.type_layout(2).unwrap();
        assert_eq!((vec3.size, vec3.base_size, vec3.base_count), (12, 4, 3));
        assert_eq!(vec3.base_type, "Float32");

        let mat = module.type_layout(3).unwrap();
        assert_eq!((mat.size, mat.base_size, mat.base_count), (48, 12, 4));
        assert_eq!(mat.base_type, "vector");

        let array = module.type_layout(6).unwrap();
        assert_eq!(array.kind, LayoutKind::Array);
        assert_eq!((array.size, array.base_count), (84, 7));
        assert_eq!(array.base_type, "vector");

        // No constant %2, so the raw operand is the length.
        let mats = module.type_layout(7).unwrap();
        assert_eq!((mats.size, mats.base_count), (96, 2));
    }

    #[test]
    fn struct_sizes_sum_nested_members() {
        let mut b = ModuleBuilder::new();
        b.type_float(1, 32)
            .type_vector(2, 1, 4)
            .type_int(3, 32, true)
            .type_struct(4, &[2, 3])
            .type_struct(5, &[4, 1, 2]);
        let module = parse(&b);
        let inner = module.type_layout(4).unwrap();
        let outer = module.type_layout(5).unwrap();
        assert_eq!(inner.size, 20);
        assert_eq!(outer.size, 20 + 4 + 16);
        let children = outer.children.unwrap();
        assert_eq!(children[0].member_name, "");
        assert_eq!(children[0].layout.children.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn undefined_struct_member_is_an_error() {
        let mut b = ModuleBuilder::new();
        b.type_float(1, 32).type_struct(2, &[1, 9]);
        let module = parse(&b);
        assert_eq!(
            module.type_layout(2).unwrap_err(),
            LayoutError::UnresolvedReference {
                id: 9,
                referenced_from: 2
            }
        );
    }

    #[test]
    fn undefined_top_level_type_is_tolerated() {
        let module = parse(&ModuleBuilder::new());
        assert!(module.type_layout(77).unwrap().is_unknown());

        let mut b = ModuleBuilder::new();
        b.type_vector(2, 1, 4);
        let module = parse(&b);
        let layout = module.type_layout(2).unwrap();
        assert_eq!(layout.size, 0);
        assert_eq!(layout.base_count, 4);
    }

    #[test]
    fn image_table() {
        let mut b = ModuleBuilder::new();
        b.type_float(1, 32)
            .type_image(2, 1, DIM_2D, false)
            .type_image(3, 1, DIM_CUBE, true)
            .type_image(4, 1, DIM_SUBPASS_DATA, false)
            .type_image(5, 1, DIM_BUFFER, false)
            .type_image(6, 1, DIM_3D, false)
            .type_sampled_image(7, 3);
        let module = parse(&b);

        let image2d = module.type_layout(2).unwrap();
        assert_eq!(image2d.name, "image2D");
        assert_eq!((image2d.size, image2d.base_count), (2, 1));

        let cube = module.type_layout(3).unwrap();
        assert_eq!(cube.name, "imageCubeArray");
        assert_eq!((cube.size, cube.base_size, cube.base_count), (6, 1, 6));

        let subpass = module.type_layout(4).unwrap();
        assert_eq!(subpass.base_type, "subpassInput");
        assert_eq!(subpass.name, "imageSubpass");

        let buffer = module.type_layout(5).unwrap();
        assert_eq!(buffer.kind, LayoutKind::UnknownImage);
        assert_eq!(buffer.name, "image<unknown img>");

        assert_eq!(module.type_layout(6).unwrap().name, "image3D");

        let sampled = module.type_layout(7).unwrap();
        assert_eq!(sampled.kind, LayoutKind::SampledImage);
        assert_eq!(sampled.name, "samplerCubeArray");
        assert_eq!(sampled.base_type, "sampledimage");
        assert_eq!(sampled.size, 6);
    }

    #[test]
    fn sampler_layout() {
        let mut b = ModuleBuilder::new();
        b.type_sampler(1);
        let module = parse(&b);
        let layout = module.type_layout(1).unwrap();
        assert_eq!(layout.kind, LayoutKind::Sampler);
        assert_eq!(layout.base_type, "sampler");
        assert_eq!(layout.size, 0);
    }

    #[test]
    fn variable_layout_follows_pointer() {
        let mut b = ModuleBuilder::new();
        b.type_float(1, 32)
            .type_vector(2, 1, 4)
            .type_pointer(3, STORAGE_CLASS_INPUT, 2)
            .type_pointer(4, STORAGE_CLASS_INPUT, 50)
            .variable(3, 10, STORAGE_CLASS_INPUT)
            .variable(2, 11, STORAGE_CLASS_INPUT)
            .variable(4, 12, STORAGE_CLASS_INPUT);
        let module = parse(&b);

        assert_eq!(module.variable_layout(10).unwrap().size, 16);
        assert_eq!(
            module.variable_layout(11).unwrap_err(),
            LayoutError::NotAPointer {
                variable: 11,
                type_id: 2
            }
        );
        assert_eq!(
            module.variable_layout(12).unwrap_err(),
            LayoutError::UnresolvedReference {
                id: 50,
                referenced_from: 4
            }
        );
        assert_eq!(
            module.variable_layout(99).unwrap_err(),
            LayoutError::UnknownVariable { id: 99 }
        );
        assert_eq!(
            module.type_layout(3).unwrap_err(),
            LayoutError::PointerType { id: 3 }
        );
    }

    #[test]
    fn bool_members_are_four_byte_scalars() {
        let mut b = ModuleBuilder::new();
        b.member_name(3, 0, "enabled")
            .type_bool(1)
            .type_float(2, 32)
            .type_struct(3, &[1, 2]);
        let module = parse(&b);

        let layout = module.type_layout(3).unwrap();
        assert_eq!(layout.size, 8);
        let children = layout.children.unwrap();
        assert_eq!(children[0].member_name, "enabled");
        assert_eq!(children[0].ty, TypeKind::Bool);
        assert_eq!(children[0].layout.kind, LayoutKind::Scalar);
        assert_eq!(children[0].layout.size, 4);
        assert_eq!(children[0].layout.base_type, "Bool");
    }

    /// `%100 = { float }`, then `%(100 + i) = { %(99 + i), %(99 + i) }`: a small acyclic graph
    /// whose expanded tree doubles with every level.
    fn shared_members(levels: u32) -> Module {
        let mut b = ModuleBuilder::new();
        b.type_float(1, 32).type_struct(100, &[1]);
        for level in 1..=levels {
            b.type_struct(100 + level, &[99 + level, 99 + level]);
        }
        parse(&b)
    }

    #[test]
    fn shared_members_are_expanded_at_each_use() {
        let module = shared_members(5);
        let layout = module.type_layout(105).unwrap();
        assert_eq!(layout.size, 4 << 5);
        assert_eq!(layout.children.map(|children| children.len()), Some(2));
    }

    #[test]
    fn exponential_type_tree_is_rejected() {
        let module = shared_members(39);
        let result = with_timeout(Duration::from_secs(10), move || module.type_layout(139));
        assert!(matches!(
            result,
            Some(Err(LayoutError::TooComplex { .. }))
        ));
    }

    #[test]
    fn self_referential_struct_fails_fast() {
        let mut b = ModuleBuilder::new();
        b.type_struct(3, &[3, 3])
            .type_pointer(4, STORAGE_CLASS_INPUT, 3)
            .variable(4, 10, STORAGE_CLASS_INPUT);
        let module = parse(&b);

        let result = with_timeout(Duration::from_secs(10), move || module.variable_layout(10));
        assert!(matches!(result, Some(Err(LayoutError::TooDeep { .. }))));
    }

    #[test]
    fn size_overflow_and_cycles_are_errors() {
        let mut b = ModuleBuilder::new();
        b.type_float(1, 32)
            .type_vector(2, 1, u32::MAX)
            // %3 is a struct whose only member is an array of %3.
            .type_array(4, 3, 1)
            .type_struct(3, &[4]);
        let module = parse(&b);

        assert_eq!(
            module.type_layout(2).unwrap_err(),
            LayoutError::SizeOverflow { id: 2 }
        );
        assert!(matches!(
            module.type_layout(3).unwrap_err(),
            LayoutError::TooDeep { .. }
        ));
    }
}
