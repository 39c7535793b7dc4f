use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use plumber_spirv::{CoreNames, Grammar, Module, NameTable, VertexInputLayout, VertexInputRequest};
use tracing_subscriber::EnvFilter;

mod dump;

#[derive(Parser, Debug)]
#[command(
    name = "plumber-dump",
    about = "Print the entry points, uniforms and vertex-input layout reflected from a SPIR-V module."
)]
struct Args {
    /// SPIR-V module (.spv)
    input: PathBuf,

    /// SPIR-V header grammar (spirv.json) used for opcode and decoration names
    #[arg(long, value_name = "PATH", env = "PLUMBER_GRAMMAR")]
    grammar: Option<PathBuf>,

    /// Group input locations into a vertex buffer, e.g. `--input 0,1 --input 2`
    #[arg(long = "input", value_name = "LOCATIONS")]
    inputs: Vec<String>,

    /// Print descriptor pool sizes and per-binding descriptor types
    #[arg(long, action = clap::ArgAction::SetTrue)]
    descriptors: bool,

    /// Log every decoded instruction to stderr
    #[arg(long, action = clap::ArgAction::SetTrue)]
    trace: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.trace);
    run(args)
}

fn init_tracing(trace: bool) {
    let filter = if trace {
        EnvFilter::new("plumber_spirv=trace,plumber_dump=trace")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: Args) -> anyhow::Result<()> {
    let grammar = args.grammar.as_deref().map(load_grammar).transpose()?;
    let names: &dyn NameTable = match &grammar {
        Some(grammar) => grammar,
        None => &CoreNames,
    };

    let bytes =
        fs::read(&args.input).with_context(|| format!("read {}", args.input.display()))?;
    let module = Module::parse_bytes(&bytes, names)
        .with_context(|| format!("parse SPIR-V module {}", args.input.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    dump::header(&mut out, &module)?;
    dump::entry_points(&mut out, &module, names)?;
    dump::uniforms(&mut out, &module)?;

    if !args.inputs.is_empty() {
        let request = VertexInputRequest::parse(args.inputs.iter().map(|list| {
            if list.starts_with("input=") {
                list.clone()
            } else {
                format!("input={list}")
            }
        }))
        .context("parse --input")?;
        let entries = module.entry_layouts();
        let entry = entries.first().context("module has no entry points")?;
        let layout = VertexInputLayout::build(&request, entry)
            .with_context(|| format!("derive vertex input for entry point '{}'", entry.name))?;
        dump::vertex_input(&mut out, &entry.name, &layout)?;
    }

    if args.descriptors {
        dump::descriptors(&mut out, &module.descriptors())?;
    }

    out.flush().context("flush stdout")?;
    Ok(())
}

fn load_grammar(path: &Path) -> anyhow::Result<Grammar> {
    let file = fs::File::open(path).with_context(|| format!("open grammar {}", path.display()))?;
    Grammar::from_reader(io::BufReader::new(file))
        .with_context(|| format!("load grammar {}", path.display()))
}
