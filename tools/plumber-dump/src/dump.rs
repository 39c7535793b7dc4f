//! Plain-text renderings of the reflection views.

use std::io::{self, Write};

use plumber_spirv::{
    descriptor_pool_sizes, Descriptor, Module, NameTable, VertexInputLayout, VertexInputRate,
};

pub fn header(out: &mut impl Write, module: &Module) -> io::Result<()> {
    let header = module.header();
    let (major, minor) = header.version();
    writeln!(
        out,
        "SPIR-V {major}.{minor} (generator {:#010x}, id bound {})",
        header.generator, header.bound
    )
}

/// Inputs are listed in full; outputs skip variables the builtin heuristic flags.
pub fn entry_points(out: &mut impl Write, module: &Module, names: &dyn NameTable) -> io::Result<()> {
    for entry in module.entry_points(names) {
        writeln!(out, "Entry: '{}' [{}]", entry.name, entry.execution_model)?;
        writeln!(out, " Function: %{}", entry.function_id)?;
        writeln!(out, " Interface:")?;
        writeln!(out, "  Input:")?;
        for input in &entry.inputs {
            writeln!(
                out,
                "   {}: {} {}",
                input.decorations,
                input.type_string,
                input.name.as_deref().unwrap_or("<unnamed>")
            )?;
        }
        writeln!(out, "  Output:")?;
        for output in entry.outputs.iter().filter(|output| !output.is_builtin) {
            writeln!(
                out,
                "   {}: {} {}",
                output.decorations,
                output.type_string,
                output.name.as_deref().unwrap_or("<unnamed>")
            )?;
        }
    }
    Ok(())
}

pub fn uniforms(out: &mut impl Write, module: &Module) -> io::Result<()> {
    writeln!(out, "Uniforms:")?;
    for descriptor in module.descriptors() {
        let coords = coordinates(&descriptor);
        let var_name = descriptor.name.as_deref().unwrap_or("<unnamed>");
        let layout = match &descriptor.layout {
            Ok(layout) => layout,
            Err(err) => {
                writeln!(out, " {coords} <layout error: {err}> varName: {var_name}")?;
                continue;
            }
        };
        writeln!(
            out,
            " {coords} {} varName: {var_name} (size: {})",
            layout.name, layout.size
        )?;
        if let Some(children) = &layout.children {
            writeln!(out, "   {{")?;
            for child in children {
                writeln!(
                    out,
                    "        {} {},",
                    module.type_to_string(child.type_id),
                    child.member_name
                )?;
            }
            writeln!(out, "   }}")?;
        }
    }
    Ok(())
}

pub fn vertex_input(out: &mut impl Write, entry: &str, layout: &VertexInputLayout) -> io::Result<()> {
    writeln!(out, "Vertex input for '{entry}':")?;
    for binding in &layout.bindings {
        let rate = match binding.input_rate {
            VertexInputRate::Vertex => "vertex",
            VertexInputRate::Instance => "instance",
        };
        writeln!(
            out,
            " binding {}: stride {}, input rate {rate}",
            binding.binding, binding.stride
        )?;
    }
    for attribute in &layout.attributes {
        writeln!(
            out,
            " location {}: binding {}, format {}, offset {}",
            attribute.location, attribute.binding, attribute.format, attribute.offset
        )?;
    }
    Ok(())
}

pub fn descriptors(out: &mut impl Write, descriptors: &[Descriptor]) -> io::Result<()> {
    writeln!(out, "Descriptor pool sizes:")?;
    for (kind, count) in descriptor_pool_sizes(descriptors) {
        writeln!(out, " {kind}: {count}")?;
    }
    writeln!(out, "Descriptor bindings:")?;
    for descriptor in descriptors {
        writeln!(
            out,
            " {} {} {}",
            coordinates(descriptor),
            descriptor.kind(),
            descriptor.name.as_deref().unwrap_or("<unnamed>")
        )?;
    }
    Ok(())
}

fn coordinates(descriptor: &Descriptor) -> String {
    let show = |value: Option<u32>| value.map_or_else(|| "-".to_owned(), |v| v.to_string());
    format!(
        "(set: {} binding: {})",
        show(descriptor.set),
        show(descriptor.binding)
    )
}
