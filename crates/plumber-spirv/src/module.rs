use core::fmt;
use std::collections::{BTreeMap, HashMap};

use crate::binary::{words_from_le_bytes, Header, Instruction};
use crate::decode::{decode_string, Decoder};
use crate::error::{SpirvError, StreamErrorKind};
use crate::limits::ParseOptions;
use crate::names::NameTable;
use crate::opcode::*;
use crate::types::{Dim, ImageType, SpirvType, StorageClass, TypeKind};

/// Shader stage an entry point runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionModel {
    /// Vertex shader.
    Vertex,
    /// Fragment shader.
    Fragment,
    /// OpenCL kernel.
    Kernel,
    /// Any other execution model word.
    Unknown(u32),
}

impl ExecutionModel {
    /// Maps an execution model operand word.
    pub fn from_word(word: u32) -> Self {
        match word {
            EXECUTION_MODEL_VERTEX => Self::Vertex,
            EXECUTION_MODEL_FRAGMENT => Self::Fragment,
            EXECUTION_MODEL_KERNEL => Self::Kernel,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for ExecutionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => f.write_str("Vertex"),
            Self::Fragment => f.write_str("Fragment"),
            Self::Kernel => f.write_str("Kernel"),
            Self::Unknown(word) => write!(f, "<unknown mode {word}>"),
        }
    }
}

/// One `OpDecorate` applied to an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    /// Numeric decoration kind.
    pub kind: u32,
    /// Mnemonic from the name table used while parsing, if it knew the kind.
    pub name: Option<String>,
    /// Literal arguments following the kind.
    pub args: Vec<u32>,
}

/// An `OpConstant`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constant {
    /// Result id.
    pub id: u32,
    /// Id of the constant's type.
    pub result_type: u32,
    /// Value words, low-order word first.
    pub words: Vec<u32>,
}

impl Constant {
    /// The low-order value word.
    pub fn value(&self) -> Option<u32> {
        self.words.first().copied()
    }
}

/// A module-scope `OpVariable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variable {
    /// Result id.
    pub id: u32,
    /// Declared type; for well-formed modules this is an `OpTypePointer`.
    pub type_id: u32,
    /// Storage class operand of the `OpVariable`.
    pub storage_class: StorageClass,
}

/// An `OpEntryPoint` as declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    /// Entry point name as written in the module.
    pub name: String,
    /// Id of the entry function.
    pub function_id: u32,
    /// Stage the entry point runs in.
    pub execution_model: ExecutionModel,
    /// Interface variable ids in declaration order.
    pub interface: Vec<u32>,
}

/// The reflection model of a SPIR-V module.
///
/// Built by one forward pass over the instruction stream. Handlers only store the raw ids they
/// read; forward references are legal and are resolved later by the layout queries. Once
/// [`Module::parse`] returns, the model is never mutated.
#[derive(Debug, Clone)]
pub struct Module {
    header: Header,
    names: HashMap<u32, String>,
    member_names: HashMap<u32, BTreeMap<u32, String>>,
    decorations: HashMap<u32, Vec<Decoration>>,
    types: HashMap<u32, SpirvType>,
    constants: HashMap<u32, Constant>,
    variables: HashMap<u32, Variable>,
    entry_points: Vec<EntryPoint>,
    uniform_variables: Vec<u32>,
}

impl Module {
    /// Parses a module with the default [`ParseOptions`].
    pub fn parse<N: NameTable + ?Sized>(words: &[u32], names: &N) -> Result<Self, SpirvError> {
        Self::parse_with_options(words, names, &ParseOptions::default())
    }

    /// Parses a module from its little-endian file image.
    pub fn parse_bytes<N: NameTable + ?Sized>(bytes: &[u8], names: &N) -> Result<Self, SpirvError> {
        let words = words_from_le_bytes(bytes)?;
        Self::parse(&words, names)
    }

    /// Parses a module with explicit limits.
    ///
    /// The word count is checked against `options` before any instruction is read.
    pub fn parse_with_options<N: NameTable + ?Sized>(
        words: &[u32],
        names: &N,
        options: &ParseOptions,
    ) -> Result<Self, SpirvError> {
        if words.len() > options.max_words {
            return Err(SpirvError::TooManyWords {
                words: words.len(),
                max: options.max_words,
            });
        }
        let decoder = Decoder::new(words, names)?;
        let header = *decoder.header();
        if header.bound > options.max_id_bound {
            return Err(SpirvError::IdBoundTooLarge {
                bound: header.bound,
                max: options.max_id_bound,
            });
        }

        let mut module = Module {
            header,
            names: HashMap::new(),
            member_names: HashMap::new(),
            decorations: HashMap::new(),
            types: HashMap::new(),
            constants: HashMap::new(),
            variables: HashMap::new(),
            entry_points: Vec::new(),
            uniform_variables: Vec::new(),
        };
        let mut pass = Pass {
            module: &mut module,
            names,
            options,
        };
        for insn in decoder.instructions() {
            let insn = insn?;
            let Some(mnemonic) = insn.mnemonic else {
                tracing::debug!(offset = insn.offset, opcode = insn.opcode, "unknown opcode");
                continue;
            };
            if let Some(op) = Op::from_mnemonic(mnemonic) {
                pass.apply(op, &insn)?;
            }
        }

        tracing::debug!(
            types = module.types.len(),
            variables = module.variables.len(),
            entry_points = module.entry_points.len(),
            "parsed SPIR-V module"
        );
        Ok(module)
    }

    /// The module header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Debug name of `id` (`OpName`).
    pub fn name(&self, id: u32) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Debug name of member `member` of struct type `id` (`OpMemberName`).
    pub fn member_name(&self, id: u32, member: u32) -> Option<&str> {
        self.member_names
            .get(&id)
            .and_then(|members| members.get(&member))
            .map(String::as_str)
    }

    /// Decorations applied to `id`, in application order.
    pub fn decorations(&self, id: u32) -> &[Decoration] {
        self.decorations.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Arguments of the last decoration of `kind` applied to `id`.
    pub fn decoration_args(&self, id: u32, kind: u32) -> Option<&[u32]> {
        self.decorations(id)
            .iter()
            .rev()
            .find(|decoration| decoration.kind == kind)
            .map(|decoration| decoration.args.as_slice())
    }

    /// First argument of the last decoration of `kind` applied to `id`.
    pub fn decoration_value(&self, id: u32, kind: u32) -> Option<u32> {
        self.decoration_args(id, kind)
            .and_then(|args| args.first().copied())
    }

    /// The `Location` decoration of `id`, if any.
    pub fn location(&self, id: u32) -> Option<u32> {
        self.decorations(id)
            .iter()
            .find(|decoration| decoration.kind == DECORATION_LOCATION)
            .and_then(|decoration| decoration.args.first().copied())
    }

    /// The type declared with result id `id`.
    pub fn ty(&self, id: u32) -> Option<&SpirvType> {
        self.types.get(&id)
    }

    /// Every declared type, in no particular order.
    pub fn types(&self) -> impl Iterator<Item = &SpirvType> {
        self.types.values()
    }

    /// The `OpConstant` with result id `id`.
    pub fn constant(&self, id: u32) -> Option<&Constant> {
        self.constants.get(&id)
    }

    /// The module-scope variable with result id `id`.
    pub fn variable(&self, id: u32) -> Option<&Variable> {
        self.variables.get(&id)
    }

    /// Entry points in declaration order.
    pub fn declared_entry_points(&self) -> &[EntryPoint] {
        &self.entry_points
    }

    /// `UniformConstant` and `Uniform` variables, in declaration order.
    pub fn uniform_variables(&self) -> &[u32] {
        &self.uniform_variables
    }

    /// Element count of an `OpTypeArray` given its raw length operand.
    ///
    /// The operand names an `OpConstant`; when no such constant was recorded the operand itself
    /// is taken as the count.
    pub fn array_length(&self, length: u32) -> u32 {
        self.constant(length)
            .and_then(Constant::value)
            .unwrap_or(length)
    }
}

/// State of a single decode pass.
struct Pass<'m, 'n, N: ?Sized> {
    module: &'m mut Module,
    names: &'n N,
    options: &'n ParseOptions,
}

impl<N: NameTable + ?Sized> Pass<'_, '_, N> {
    fn apply(&mut self, op: Op, insn: &Instruction<'_>) -> Result<(), SpirvError> {
        let ops = insn.operands;
        let expected = op.min_operands();
        if ops.len() < expected {
            return Err(SpirvError::malformed(
                insn.offset,
                Some(insn.opcode),
                StreamErrorKind::MissingOperand {
                    mnemonic: op.mnemonic(),
                    expected,
                    found: ops.len(),
                },
            ));
        }

        match op {
            Op::ExtInstImport => {
                self.check_id(ops[0], insn)?;
                let (set, _) = string_operand(op, insn, 1)?;
                tracing::debug!(offset = insn.offset, "%{} = OpExtInstImport '{set}'", ops[0]);
            }
            Op::EntryPoint => {
                let function_id = ops[1];
                self.check_id(function_id, insn)?;
                let (name, next) = string_operand(op, insn, 2)?;
                let interface = ops.get(next..).unwrap_or_default().to_vec();
                for &id in &interface {
                    self.check_id(id, insn)?;
                }
                let execution_model = ExecutionModel::from_word(ops[0]);
                tracing::debug!(
                    offset = insn.offset,
                    "OpEntryPoint {execution_model} %{function_id} '{name}' interfaces: {interface:?}"
                );
                self.module.entry_points.push(EntryPoint {
                    name,
                    function_id,
                    execution_model,
                    interface,
                });
            }
            Op::Name => {
                let target = ops[0];
                self.check_id(target, insn)?;
                let (name, _) = string_operand(op, insn, 1)?;
                tracing::debug!(offset = insn.offset, "OpName %{target} == '{name}'");
                self.module.names.insert(target, name);
            }
            Op::MemberName => {
                let (target, member) = (ops[0], ops[1]);
                self.check_id(target, insn)?;
                let (name, _) = string_operand(op, insn, 2)?;
                tracing::debug!(offset = insn.offset, "OpMemberName %{target}[{member}] == '{name}'");
                self.module
                    .member_names
                    .entry(target)
                    .or_default()
                    .insert(member, name);
            }
            Op::Decorate => {
                let (target, kind) = (ops[0], ops[1]);
                self.check_id(target, insn)?;
                let name = self.names.decoration_name(kind).map(str::to_owned);
                if name.is_none() {
                    tracing::debug!(offset = insn.offset, kind, "unknown decoration");
                }
                let args = ops[2..].to_vec();
                tracing::debug!(offset = insn.offset, "OpDecorate %{target} {kind} {args:?}");
                self.module
                    .decorations
                    .entry(target)
                    .or_default()
                    .push(Decoration { kind, name, args });
            }
            Op::TypeVoid => self.define_type(insn, ops[0], TypeKind::Void)?,
            Op::TypeBool => self.define_type(insn, ops[0], TypeKind::Bool)?,
            Op::TypeInt => self.define_type(
                insn,
                ops[0],
                TypeKind::Int {
                    width: ops[1],
                    signed: ops[2] != 0,
                },
            )?,
            Op::TypeFloat => self.define_type(insn, ops[0], TypeKind::Float { width: ops[1] })?,
            Op::TypeVector => self.define_type(
                insn,
                ops[0],
                TypeKind::Vector {
                    component: ops[1],
                    count: ops[2],
                },
            )?,
            Op::TypeMatrix => self.define_type(
                insn,
                ops[0],
                TypeKind::Matrix {
                    column: ops[1],
                    columns: ops[2],
                },
            )?,
            Op::TypeArray => self.define_type(
                insn,
                ops[0],
                TypeKind::Array {
                    element: ops[1],
                    length: ops[2],
                },
            )?,
            Op::TypeImage => {
                let dim = Dim::from_word(ops[2]);
                if let Dim::Unknown(word) = dim {
                    tracing::debug!(offset = insn.offset, dim = word, "unknown image dimensionality");
                }
                self.define_type(
                    insn,
                    ops[0],
                    TypeKind::Image(ImageType {
                        sampled_type: ops[1],
                        dim,
                        depth: ops[3],
                        arrayed: ops[4] != 0,
                        multisampled: ops[5] != 0,
                        sampled: ops[6],
                        format: ops[7],
                    }),
                )?
            }
            Op::TypeSampler => self.define_type(insn, ops[0], TypeKind::Sampler)?,
            Op::TypeSampledImage => {
                self.define_type(insn, ops[0], TypeKind::SampledImage { image: ops[1] })?
            }
            Op::TypePointer => self.define_type(
                insn,
                ops[0],
                TypeKind::Pointer {
                    storage_class: StorageClass::from_word(ops[1]),
                    pointee: ops[2],
                },
            )?,
            Op::TypeStruct => self.define_type(
                insn,
                ops[0],
                TypeKind::Struct {
                    members: ops[1..].to_vec(),
                },
            )?,
            Op::Constant => {
                let (result_type, id) = (ops[0], ops[1]);
                self.check_id(id, insn)?;
                let words = ops[2..].to_vec();
                tracing::debug!(offset = insn.offset, "%{id} = OpConstant %{result_type} {words:?}");
                self.module.constants.insert(
                    id,
                    Constant {
                        id,
                        result_type,
                        words,
                    },
                );
            }
            Op::Variable => {
                let (type_id, id) = (ops[0], ops[1]);
                self.check_id(id, insn)?;
                let storage_class = StorageClass::from_word(ops[2]);
                tracing::debug!(offset = insn.offset, "%{id} = OpVariable %{type_id} {}", ops[2]);
                if self.module.variables.contains_key(&id) {
                    tracing::warn!(offset = insn.offset, id, "variable redefined; keeping the first definition");
                    return Ok(());
                }
                self.module.variables.insert(
                    id,
                    Variable {
                        id,
                        type_id,
                        storage_class,
                    },
                );
                if storage_class.is_uniform() {
                    self.module.uniform_variables.push(id);
                }
            }
        }
        Ok(())
    }

    fn define_type(
        &mut self,
        insn: &Instruction<'_>,
        id: u32,
        kind: TypeKind,
    ) -> Result<(), SpirvError> {
        self.check_id(id, insn)?;
        let ty = SpirvType::new(id, kind);
        tracing::debug!(offset = insn.offset, "%{id} = {} {:?}", ty.name, ty.kind);
        if self.module.types.contains_key(&id) {
            tracing::warn!(offset = insn.offset, id, "type redefined; keeping the first definition");
            return Ok(());
        }
        self.module.types.insert(id, ty);
        Ok(())
    }

    fn check_id(&self, id: u32, insn: &Instruction<'_>) -> Result<(), SpirvError> {
        let bound = self.module.header.bound;
        if self.options.check_id_bound && id >= bound {
            return Err(SpirvError::IdOutOfBounds {
                id,
                bound,
                at_word: insn.offset,
            });
        }
        Ok(())
    }
}

fn string_operand(
    op: Op,
    insn: &Instruction<'_>,
    start: usize,
) -> Result<(String, usize), SpirvError> {
    decode_string(insn.operands, start).ok_or_else(|| {
        SpirvError::malformed(
            insn.offset,
            Some(insn.opcode),
            StreamErrorKind::UnterminatedString {
                mnemonic: op.mnemonic(),
            },
        )
    })
}
