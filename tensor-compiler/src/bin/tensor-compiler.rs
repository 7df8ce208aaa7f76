//! `tensor-compiler`: load an ONNX model, dump its graph and print the
//! execution order.
//!
//! Usage:
//!   tensor-compiler model.onnx
//!   tensor-compiler model.onnx --inputs values.json --no-dump

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use tensor_compiler::parse::onnx;
use tensor_compiler::{dump, Error, Executor, Result};

const USAGE: &str = "Usage: tensor-compiler <model.onnx> [--inputs <FILE>] [--no-dump]";

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut model_path: Option<PathBuf> = None;
    let mut inputs_path: Option<PathBuf> = None;
    let mut show_dump = true;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--inputs" => {
                i += 1;
                inputs_path = Some(PathBuf::from(args.get(i).unwrap_or_else(|| {
                    eprintln!("{USAGE}");
                    process::exit(1);
                })));
            }
            "--no-dump" => show_dump = false,
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            _ => {
                if model_path.is_none() {
                    model_path = Some(PathBuf::from(&args[i]));
                } else {
                    eprintln!("Unexpected argument: {}", args[i]);
                    eprintln!("{USAGE}");
                    process::exit(1);
                }
            }
        }
        i += 1;
    }

    let model_path = model_path.unwrap_or_else(|| {
        eprintln!("{USAGE}");
        process::exit(1);
    });

    if let Err(err) = run(&model_path, inputs_path.as_deref(), show_dump) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn print_usage() {
    eprintln!("tensor-compiler: ONNX graph loader and scheduler");
    eprintln!();
    eprintln!("{USAGE}");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --inputs <FILE>  JSON object mapping graph-input names to f32 arrays");
    eprintln!("  --no-dump        Do not print tensors and nodes");
}

fn run(model_path: &Path, inputs_path: Option<&Path>, show_dump: bool) -> Result<()> {
    let graph = onnx::load_model(model_path)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if show_dump {
        dump::write_graph(&graph, &mut out).map_err(Error::Write)?;
    }

    let mut exec = Executor::new(&graph);
    let order = exec.order()?;
    dump::write_order(&order, &mut out).map_err(Error::Write)?;

    if let Some(path) = inputs_path {
        let values = read_inputs(path)?;
        exec.load_inputs(&values)?;
        for name in graph.inputs() {
            if let Some(t) = exec.value(name) {
                let bytes = t.data().map_or(0, <[u8]>::len);
                writeln!(out, "input {}: shape={:?}, {} bytes", name, t.shape(), bytes)
                    .map_err(Error::Write)?;
            }
        }
    }

    out.flush().map_err(Error::Write)
}

fn read_inputs(path: &Path) -> Result<HashMap<String, Vec<f32>>> {
    let bytes = fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes)
        .map_err(|e| Error::InvalidInputs(format!("{}: {e}", path.display())))
}
