//! MobileCLI build automation tasks.
//!
//! Usage: `cargo xtask <command>`

mod pack;

use std::env;
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();

    match args.first().map(|s| s.as_str()) {
        Some("pack-bootstrap") => {
            let (Some(source), Some(output)) = (args.get(1), args.get(2)) else {
                eprintln!("Usage: cargo xtask pack-bootstrap <dir> <out.zip>");
                return ExitCode::FAILURE;
            };
            match pack::pack_bootstrap(Path::new(source), Path::new(output)) {
                Ok(summary) => {
                    println!(
                        "Packed {} files and {} symlinks into {}",
                        summary.files, summary.symlinks, output
                    );
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("pack-bootstrap failed: {:#}", e);
                    ExitCode::FAILURE
                }
            }
        }
        Some(cmd) => {
            eprintln!("Unknown command: {cmd}");
            print_help();
            ExitCode::FAILURE
        }
        None => {
            print_help();
            ExitCode::SUCCESS
        }
    }
}

fn print_help() {
    println!("MobileCLI xtask");
    println!();
    println!("USAGE:");
    println!("    cargo xtask <COMMAND>");
    println!();
    println!("COMMANDS:");
    println!("    pack-bootstrap <dir> <out.zip>    Build a bootstrap archive from a prefix tree");
}
