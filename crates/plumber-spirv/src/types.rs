use core::fmt;

use crate::opcode::*;

/// Storage class of a pointer type or variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageClass {
    /// Opaque resources such as images and samplers.
    UniformConstant,
    /// Stage inputs.
    Input,
    /// Uniform buffer blocks.
    Uniform,
    /// Stage outputs.
    Output,
    /// Function-local variables.
    Function,
    /// Any storage class the reflection views do not partition on.
    Other(u32),
}

impl StorageClass {
    /// Maps a storage class operand word.
    pub fn from_word(word: u32) -> Self {
        match word {
            STORAGE_CLASS_UNIFORM_CONSTANT => Self::UniformConstant,
            STORAGE_CLASS_INPUT => Self::Input,
            STORAGE_CLASS_UNIFORM => Self::Uniform,
            STORAGE_CLASS_OUTPUT => Self::Output,
            STORAGE_CLASS_FUNCTION => Self::Function,
            other => Self::Other(other),
        }
    }

    /// The operand word for this storage class.
    pub fn to_word(self) -> u32 {
        match self {
            Self::UniformConstant => STORAGE_CLASS_UNIFORM_CONSTANT,
            Self::Input => STORAGE_CLASS_INPUT,
            Self::Uniform => STORAGE_CLASS_UNIFORM,
            Self::Output => STORAGE_CLASS_OUTPUT,
            Self::Function => STORAGE_CLASS_FUNCTION,
            Self::Other(word) => word,
        }
    }

    /// `UniformConstant` and `Uniform` variables are descriptor candidates.
    pub fn is_uniform(self) -> bool {
        matches!(self, Self::UniformConstant | Self::Uniform)
    }
}

/// Image dimensionality (`OpTypeImage` operand 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dim {
    /// One-dimensional.
    Dim1D,
    /// Two-dimensional.
    Dim2D,
    /// Three-dimensional.
    Dim3D,
    /// Cube map.
    Cube,
    /// Rectangle texture.
    Rect,
    /// Texel buffer.
    Buffer,
    /// Input attachment.
    SubpassData,
    /// A dimensionality this crate does not name.
    Unknown(u32),
}

impl Dim {
    /// Maps the `Dim` operand word.
    pub fn from_word(word: u32) -> Self {
        match word {
            DIM_1D => Self::Dim1D,
            DIM_2D => Self::Dim2D,
            DIM_3D => Self::Dim3D,
            DIM_CUBE => Self::Cube,
            DIM_RECT => Self::Rect,
            DIM_BUFFER => Self::Buffer,
            DIM_SUBPASS_DATA => Self::SubpassData,
            other => Self::Unknown(other),
        }
    }
}

/// Operands of `OpTypeImage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageType {
    /// Id of the component type read from the image.
    pub sampled_type: u32,
    /// Dimensionality.
    pub dim: Dim,
    /// 0 = not a depth image, 1 = depth image, 2 = unknown.
    pub depth: u32,
    /// Whether the image is an array of layers.
    pub arrayed: bool,
    /// Whether the image is multisampled.
    pub multisampled: bool,
    /// 1 = sampled, 2 = storage, 0 = known only at run time.
    pub sampled: u32,
    /// Raw image format operand.
    pub format: u32,
}

/// The closed set of type shapes the module model records.
///
/// Composite kinds store raw ids only; nothing is resolved until a layout query runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    /// `OpTypeVoid`.
    Void,
    /// `OpTypeBool`.
    Bool,
    /// `OpTypeInt`.
    Int {
        /// Declared width in bits.
        width: u32,
        /// Signedness operand.
        signed: bool,
    },
    /// `OpTypeFloat`.
    Float {
        /// Declared width in bits.
        width: u32,
    },
    /// `OpTypeVector`.
    Vector {
        /// Component type id.
        component: u32,
        /// Number of components.
        count: u32,
    },
    /// `OpTypeArray`.
    Array {
        /// Element type id.
        element: u32,
        /// The raw length operand; [`Module::array_length`](crate::Module::array_length)
        /// resolves it through the recorded constants.
        length: u32,
    },
    /// `OpTypeMatrix`.
    Matrix {
        /// Column type id.
        column: u32,
        /// Number of columns.
        columns: u32,
    },
    /// `OpTypePointer`.
    Pointer {
        /// Storage class of the pointee.
        storage_class: StorageClass,
        /// Pointee type id.
        pointee: u32,
    },
    /// `OpTypeStruct`.
    Struct {
        /// Member type ids in declaration order.
        members: Vec<u32>,
    },
    /// `OpTypeImage`.
    Image(ImageType),
    /// `OpTypeSampler`.
    Sampler,
    /// `OpTypeSampledImage`.
    SampledImage {
        /// The underlying image type id.
        image: u32,
    },
}

impl TypeKind {
    /// Byte size known at declaration time. Composite sizes are only known after layout.
    ///
    /// Integer and float types always report 4 bytes regardless of their declared width.
    pub fn stored_size(&self) -> Option<u32> {
        match self {
            Self::Void => Some(0),
            Self::Bool | Self::Int { .. } | Self::Float { .. } => Some(4),
            _ => None,
        }
    }

    /// Short display name used for scalar layouts and diagnostics (`Int32`, `Float32`, ...).
    pub fn display_name(&self) -> String {
        match self {
            Self::Void => "Void".to_owned(),
            Self::Bool => "Bool".to_owned(),
            Self::Int { width, signed: true } => format!("Int{width}"),
            Self::Int { width, signed: false } => format!("UInt{width}"),
            Self::Float { width } => format!("Float{width}"),
            Self::Vector { .. } => "Vector".to_owned(),
            Self::Array { .. } => "Array".to_owned(),
            Self::Matrix { .. } => "Matrix".to_owned(),
            Self::Pointer { .. } => "Pointer".to_owned(),
            Self::Struct { .. } => "Struct".to_owned(),
            Self::Image(_) => "Image".to_owned(),
            Self::Sampler => "Sampler".to_owned(),
            Self::SampledImage { .. } => "SampledImage".to_owned(),
        }
    }
}

/// A registered type: its result id, display name and shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpirvType {
    /// Result id of the declaring instruction.
    pub id: u32,
    /// [`TypeKind::display_name`] of `kind`.
    pub name: String,
    /// Shape of the type.
    pub kind: TypeKind,
}

impl SpirvType {
    /// Registers `kind` under `id`, deriving its display name.
    pub fn new(id: u32, kind: TypeKind) -> Self {
        Self {
            id,
            name: kind.display_name(),
            kind,
        }
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dim1D => f.write_str("1D"),
            Self::Dim2D => f.write_str("2D"),
            Self::Dim3D => f.write_str("3D"),
            Self::Cube => f.write_str("Cube"),
            Self::Rect => f.write_str("Rect"),
            Self::Buffer => f.write_str("Buffer"),
            Self::SubpassData => f.write_str("SubpassData"),
            Self::Unknown(word) => write!(f, "Dim({word})"),
        }
    }
}
