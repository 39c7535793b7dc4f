#![no_main]

use libfuzzer_sys::fuzz_target;
use plumber_spirv::{CoreNames, Module, VertexInputLayout, VertexInputRequest};

/// Max fuzz input size to keep per-iteration cost bounded.
const MAX_INPUT_SIZE_BYTES: usize = 1024 * 1024; // 1 MiB
/// Max number of types laid out and rendered per input.
const MAX_TYPES_VISITED: usize = 1024;

fuzz_target!(|data: &[u8]| {
    if data.len() > MAX_INPUT_SIZE_BYTES {
        return;
    }

    // All decode errors are acceptable; panics and hangs are not.
    let Ok(module) = Module::parse_bytes(data, &CoreNames) else {
        return;
    };

    let _ = module.entry_points(&CoreNames);
    let _ = module.descriptors();

    // Drive the vertex-input packer over every located input of each entry point.
    for entry in module.entry_layouts() {
        let request = VertexInputRequest {
            buffers: vec![entry.inputs.keys().copied().collect()],
        };
        let _ = VertexInputLayout::build(&request, &entry);
    }

    for ty in module.types().take(MAX_TYPES_VISITED) {
        let _ = module.type_layout(ty.id);
        let _ = module.type_to_string(ty.id);
    }
});
