#![deny(clippy::expect_used)]
//! Inspect the operator table
//!
//! Lists every runtime type name, or dumps the whole registry as JSON.
//!
//! Usage:
//!   typeinfo                       # one type name per line
//!   typeinfo --dump                # registry as JSON
//!   typeinfo --config vm.toml ...  # apply a config first

use std::env;
use std::path::PathBuf;

use subset_octave_vm::config::VmConfig;
use subset_octave_vm::ops;

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut dump = false;
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--dump" => dump = true,
            "--config" => {
                i += 1;
                match args.get(i) {
                    Some(path) => config_path = Some(PathBuf::from(path)),
                    None => {
                        eprintln!("Error: --config requires a file");
                        std::process::exit(1);
                    }
                }
            }
            "-h" | "--help" => {
                println!("Usage: typeinfo [--dump] [--config <file>]");
                return;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let config = match config_path {
        Some(path) => VmConfig::from_file(&path).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }),
        None => VmConfig::from_env(),
    };
    if let Err(e) = config.apply() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let registry = ops::global().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    });

    if dump {
        match serde_json::to_string_pretty(&registry.dump()) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: failed to serialize registry: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        for name in registry.type_names() {
            println!("{}", name);
        }
    }
}
