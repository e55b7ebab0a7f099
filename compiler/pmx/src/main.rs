//! pmx CLI
//!
//! Offline tools for proc-macro expander traffic: decode flat trees, dump
//! request streams, show the effective expander configuration.

mod commands;

use commands::{decode_file, inspect_file, parse_version_flag, show_config};

fn main() {
    pmx_expand::init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];
    let result = match command.as_str() {
        "decode" => {
            if args.len() < 3 {
                eprintln!("Usage: pmx decode <flat.json> [--version=N]");
                std::process::exit(1);
            }
            parse_version_flag(&args[3..]).and_then(|version| decode_file(&args[2], version))
        }
        "inspect" => {
            if args.len() < 3 {
                eprintln!("Usage: pmx inspect <requests.jsonl> [--version=N]");
                std::process::exit(1);
            }
            parse_version_flag(&args[3..]).and_then(|version| inspect_file(&args[2], version))
        }
        "config" => Ok(show_config()),
        "help" | "--help" | "-h" => {
            print_usage();
            return;
        }
        "version" | "--version" | "-v" => {
            println!("pmx {}", env!("CARGO_PKG_VERSION"));
            return;
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    match result {
        Ok(output) => print!("{output}"),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("pmx: proc-macro expander tools");
    println!();
    println!("Usage: pmx <command> [options]");
    println!();
    println!("Commands:");
    println!("  decode <flat.json>        Decode a flat token tree and render it as text");
    println!("  inspect <requests.jsonl>  Summarize newline-delimited expander requests");
    println!("  config                    Show the expander configuration from the environment");
    println!("  help                      Show this help message");
    println!("  version                   Show version information");
    println!();
    println!("Options:");
    println!("  --version=N   Protocol version to decode with (default: latest)");
    println!();
    println!("Set RUST_LOG=pmx_expand=trace for debug output, PMX_LOG_TREE=1 for tree output.");
}
