//! fabprep CLI - convert KiCad BOM and position exports to JLCPCB format.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use fabprep::schema::AliasRegistry;
use fabprep::table::delimiter_name;
use fabprep::{
    ConvertOptions, FabPrepCore, FileReport, FileStatus, Inspection, OutputFormat, RunSummary,
    TableKind,
};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(name = "fabprep")]
#[command(about = "Convert KiCad BOM and placement files to JLCPCB assembly format", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert BOM and position files (or directories of them)
    Convert {
        /// Input .csv files or directories to search
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,

        /// Directory for output files (defaults to next to each input)
        #[arg(short, long, value_name = "DIR")]
        out_dir: Option<PathBuf>,

        /// Decimal places for placement coordinates (0-4)
        #[arg(short, long, default_value_t = 2)]
        precision: u32,

        /// Merge BOM lines with identical value, footprint and part number
        #[arg(short, long)]
        group: bool,

        /// Output file format
        #[arg(long, value_enum, default_value = "csv")]
        output_format: FileFormat,

        /// Report format
        #[arg(short, long, value_enum, default_value = "human")]
        format: ReportFormat,

        /// Skip re-reading written files to check their headers
        #[arg(long)]
        no_verify: bool,
    },

    /// Show how a file would be classified and mapped, without converting it
    Inspect {
        /// Path to a .csv export
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Report format
        #[arg(short, long, value_enum, default_value = "human")]
        format: ReportFormat,
    },

    /// List canonical fields and the column names accepted for each
    Fields {
        /// Only show one table kind
        #[arg(short, long, value_enum)]
        kind: Option<KindArg>,
    },
}

#[derive(Clone, ValueEnum)]
enum ReportFormat {
    /// Human-readable output
    Human,
    /// JSON output for scripts
    Json,
}

#[derive(Clone, ValueEnum)]
enum FileFormat {
    Csv,
    Xlsx,
}

#[derive(Clone, ValueEnum)]
enum KindArg {
    Bom,
    Placement,
}

impl From<FileFormat> for OutputFormat {
    fn from(format: FileFormat) -> Self {
        match format {
            FileFormat::Csv => OutputFormat::Csv,
            FileFormat::Xlsx => OutputFormat::Xlsx,
        }
    }
}

impl From<KindArg> for TableKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Bom => TableKind::Bom,
            KindArg::Placement => TableKind::Placement,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match cli.command {
        Commands::Convert {
            paths,
            out_dir,
            precision,
            group,
            output_format,
            format,
            no_verify,
        } => {
            let options = ConvertOptions {
                precision,
                group_components: group,
                output_format: output_format.into(),
                output_dir: out_dir,
                verify_outputs: !no_verify,
            };
            handle_convert(&paths, &options, format)
        }
        Commands::Inspect { file, format } => handle_inspect(&file, format),
        Commands::Fields { kind } => {
            handle_fields(kind.map(TableKind::from));
            0
        }
    };

    process::exit(exit_code);
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_convert(paths: &[PathBuf], options: &ConvertOptions, format: ReportFormat) -> i32 {
    match FabPrepCore::convert_paths(paths, options) {
        Ok(summary) => {
            match format {
                ReportFormat::Human => output_human(&summary),
                ReportFormat::Json => output_json(&summary),
            }
            if summary.any_written() && !summary.diagnostics.has_errors() {
                0
            } else {
                1
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn output_human(summary: &RunSummary) {
    for file in &summary.files {
        println!("\nFile: {}", file.input.display());
        println!("{}", "─".repeat(60));

        match &file.status {
            FileStatus::Written(output) => {
                let kind = file.kind.map(|k| k.as_str()).unwrap_or("table");
                println!(
                    "  Converted {} ({} rows) -> {}",
                    kind,
                    file.rows_written,
                    output.display()
                );
            }
            FileStatus::Skipped(reason) => println!("  Skipped: {}", reason),
        }

        for diagnostic in &file.diagnostics {
            println!("    - {}", diagnostic);
        }
    }

    if !summary.diagnostics.is_empty() {
        println!();
        for diagnostic in &summary.diagnostics {
            println!("  {}", diagnostic);
        }
    }

    println!("\nSummary:");
    println!("  Files:    {}", summary.files.len());
    println!("  Skipped:  {}", summary.skipped().count());
    match summary.produced() {
        fabprep::Produced::Neither => println!("  No output files were produced"),
        produced => println!("  Conversion to JLCPCB {} files completed", produced.as_str()),
    }
}

fn file_to_json(file: &FileReport) -> serde_json::Value {
    let (status, output, reason) = match &file.status {
        FileStatus::Written(path) => ("written", Some(path.display().to_string()), None),
        FileStatus::Skipped(e) => ("skipped", None, Some(e.to_string())),
    };
    serde_json::json!({
        "input": file.input.display().to_string(),
        "kind": file.kind,
        "status": status,
        "output": output,
        "reason": reason,
        "rows_written": file.rows_written,
        "diagnostics": file.diagnostics,
    })
}

fn output_json(summary: &RunSummary) {
    let output = serde_json::json!({
        "files": summary.files.iter().map(file_to_json).collect::<Vec<_>>(),
        "diagnostics": summary.diagnostics,
        "summary": {
            "total_files": summary.files.len(),
            "skipped": summary.skipped().count(),
            "produced": summary.produced().as_str(),
        }
    });
    match serde_json::to_string_pretty(&output) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Error: {}", e),
    }
}

fn handle_inspect(file: &Path, format: ReportFormat) -> i32 {
    match FabPrepCore::inspect(file) {
        Ok(inspection) => {
            match format {
                ReportFormat::Human => inspect_human(&inspection),
                ReportFormat::Json => inspect_json(&inspection),
            }
            if inspection.kind.is_some() && inspection.missing_required().is_empty() {
                0
            } else {
                1
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn inspect_human(inspection: &Inspection) {
    println!("\nFile: {}", inspection.input.display());
    println!("{}", "─".repeat(60));
    println!("  Delimiter: {}", delimiter_name(inspection.delimiter));
    println!("  Rows:      {}", inspection.rows);

    let source = if inspection.kind_from_name.is_some() {
        "file name"
    } else {
        "headers"
    };
    match inspection.kind {
        Some(kind) => println!("  Type:      {} (from {})", kind, source),
        None => println!("  Type:      unknown"),
    }

    if let Some(mapping) = &inspection.mapping {
        println!("\n  Mapping:");
        for (field, index) in mapping.mapped() {
            println!("    {:<12} <- {}", field.as_str(), inspection.columns[*index]);
        }
        if !mapping.unmapped().is_empty() {
            println!("\n  Ignored columns: {}", mapping.unmapped().join(", "));
        }
    }

    let missing = inspection.missing_required();
    if !missing.is_empty() {
        let names: Vec<_> = missing.iter().map(|f| f.as_str()).collect();
        println!("\n  Missing required: {}", names.join(", "));
    }
}

fn inspect_json(inspection: &Inspection) {
    let mapping: serde_json::Map<String, serde_json::Value> = inspection
        .mapping
        .iter()
        .flat_map(|m| m.mapped().iter())
        .map(|(field, index)| {
            (
                field.as_str().to_string(),
                serde_json::Value::String(inspection.columns[*index].clone()),
            )
        })
        .collect();

    let output = serde_json::json!({
        "input": inspection.input.display().to_string(),
        "delimiter": delimiter_name(inspection.delimiter),
        "rows": inspection.rows,
        "columns": inspection.columns,
        "kind": inspection.kind,
        "kind_from_name": inspection.kind_from_name,
        "mapping": mapping,
        "ignored": inspection.mapping.as_ref().map(|m| m.unmapped().to_vec()).unwrap_or_default(),
        "missing_required": inspection.missing_required(),
    });
    match serde_json::to_string_pretty(&output) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Error: {}", e),
    }
}

fn handle_fields(kind: Option<TableKind>) {
    let kinds: Vec<TableKind> = match kind {
        Some(k) => vec![k],
        None => TableKind::all().to_vec(),
    };

    for kind in kinds {
        println!("{} fields:\n", kind);
        for (field, aliases) in AliasRegistry::for_kind(kind).fields() {
            let marker = if field.is_required_for(kind) { " (required)" } else { "" };
            println!("  {}{}", field, marker);
            println!("    {}", aliases.join(", "));
        }
        println!();
    }
}
