//! Human-readable renderings of the type graph, used for diagnostics and dumps.

use crate::limits::{NodeBudget, MAX_LAYOUT_DEPTH};
use crate::module::Module;
use crate::names::NameTable;
use crate::types::{StorageClass, TypeKind};

impl Module {
    /// Renders type `id`: `*T`, `vec<T, n>`, `T[n]`, `mat<T, n>`, `{ T a,U b }`, or a scalar's
    /// display name.
    ///
    /// A type that contains itself renders as `<cycle %id>` at the repeat. Rendering stops with
    /// `...` once the nesting or the number of visited nodes exceeds the layout limits.
    pub fn type_to_string(&self, id: u32) -> String {
        TypePrinter {
            module: self,
            open: Vec::new(),
            budget: NodeBudget::default(),
        }
        .print(id)
    }

    /// Renders variable `id` as its type, prefixed with `in` or `out` for interface variables.
    pub fn variable_to_string(&self, id: u32) -> String {
        let Some(variable) = self.variable(id) else {
            return "<unknown variable>".to_owned();
        };
        let ty = self.type_to_string(variable.type_id);
        match variable.storage_class {
            StorageClass::Input => format!("in {ty}"),
            StorageClass::Output => format!("out {ty}"),
            _ => ty,
        }
    }

    /// Renders the decorations of `id` as `Name arg arg`, separated by `, `.
    ///
    /// Names come from the table recorded at parse time, falling back to `names`, then to
    /// `Decoration(<n>)`.
    pub fn decorations_to_string<N: NameTable + ?Sized>(&self, id: u32, names: &N) -> String {
        let decorations = self.decorations(id);
        if decorations.is_empty() {
            return "<no decorations>".to_owned();
        }
        decorations
            .iter()
            .map(|decoration| {
                let mut text = match (&decoration.name, names.decoration_name(decoration.kind)) {
                    (Some(name), _) => name.clone(),
                    (None, Some(name)) => name.to_owned(),
                    (None, None) => format!("Decoration({})", decoration.kind),
                };
                for arg in &decoration.args {
                    text.push(' ');
                    text.push_str(&arg.to_string());
                }
                text
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One `type_to_string` walk.
struct TypePrinter<'m> {
    module: &'m Module,
    /// Ids currently being rendered, outermost first.
    open: Vec<u32>,
    budget: NodeBudget,
}

impl TypePrinter<'_> {
    fn print(&mut self, id: u32) -> String {
        if self.budget.visit(id).is_err() {
            return "...".to_owned();
        }
        if self.open.contains(&id) {
            return format!("<cycle %{id}>");
        }
        if self.open.len() as u32 > MAX_LAYOUT_DEPTH {
            return "...".to_owned();
        }
        let module = self.module;
        let Some(ty) = module.ty(id) else {
            return "<unknown type>".to_owned();
        };

        self.open.push(id);
        let text = match &ty.kind {
            TypeKind::Void
            | TypeKind::Bool
            | TypeKind::Int { .. }
            | TypeKind::Float { .. }
            | TypeKind::Sampler => ty.name.clone(),
            &TypeKind::Pointer { pointee, .. } => format!("*{}", self.print(pointee)),
            &TypeKind::Vector { component, count } => {
                format!("vec<{}, {count}>", self.print(component))
            }
            &TypeKind::Array { element, length } => {
                format!("{}[{}]", self.print(element), module.array_length(length))
            }
            &TypeKind::Matrix { column, columns } => {
                format!("mat<{}, {columns}>", self.print(column))
            }
            TypeKind::Struct { members } => {
                let mut items = Vec::with_capacity(members.len());
                for (idx, &member) in members.iter().enumerate() {
                    if self.budget.is_exhausted() {
                        items.push("...".to_owned());
                        break;
                    }
                    let member_ty = self.print(member);
                    match module.member_name(id, idx as u32) {
                        Some(name) if !name.is_empty() => {
                            if self.budget.copy_name(id, name.len()).is_err() {
                                items.push("...".to_owned());
                                break;
                            }
                            items.push(format!("{member_ty} {name}"));
                        }
                        _ => items.push(member_ty),
                    }
                }
                format!("{{ {} }}", items.join(","))
            }
            TypeKind::Image(image) => {
                let array = if image.arrayed { "Array" } else { "" };
                format!("Image{}{array}", image.dim)
            }
            &TypeKind::SampledImage { image } => format!("SampledImage<{}>", self.print(image)),
        };
        self.open.pop();
        text
    }
}
