//! Simple conversion example: convert KiCad exports and print the outcome.

use fabprep::prelude::*;
use fabprep::FileStatus;
use std::path::PathBuf;

fn main() -> Result<(), FabPrepError> {
    let paths: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();

    if paths.is_empty() {
        eprintln!("Usage: cargo run --example simple_conversion <board-bom.csv> <board-all-pos.csv>");
        std::process::exit(1);
    }

    let options = ConvertOptions {
        group_components: true,
        ..ConvertOptions::default()
    };

    let summary = FabPrepCore::convert_paths(&paths, &options)?;

    for file in &summary.files {
        match &file.status {
            FileStatus::Written(output) => {
                println!("{} -> {} ({} rows)", file.input.display(), output.display(), file.rows_written)
            }
            FileStatus::Skipped(reason) => println!("{} skipped: {}", file.input.display(), reason),
        }
        for diagnostic in &file.diagnostics {
            println!("  {}", diagnostic);
        }
    }

    println!();
    println!("Produced: {}", summary.produced().as_str());
    Ok(())
}
