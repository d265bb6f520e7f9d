//! Batch Conversion Example
//!
//! Converts several files to one target format, cleaning each table on the way,
//! and writes the results into an output directory. Files that cannot be
//! converted are reported and skipped.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example batch_convert -- <target> <output-dir> <file>... [options]
//! ```
//!
//! Set `RUST_LOG=datasweeper=debug` to see every cleaning step.

use std::path::{Path, PathBuf};
use std::process;

use datasweeper::{CleanOp, FileFormat, PipelineBuilder, UploadedFile};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logger() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("datasweeper=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact(),
        )
        .init();
}

fn print_usage(program: &str) {
    eprintln!(
        "Usage: {} <target> <output-dir> <file>... [options]",
        program
    );
    eprintln!("\nTargets: csv, xlsx, docx, pptx, pdf");
    eprintln!("\nOptions:");
    eprintln!("  --dedup              Remove duplicate rows");
    eprintln!("  --fill               Fill missing numeric values with the column mean");
    eprintln!("  --select <a,b,...>   Keep only the listed columns");
    eprintln!("  --text-column <name> Column used as text for docx/pptx/pdf (default: Text)");
    eprintln!("\nExample:");
    eprintln!("  {} xlsx out/ sales.csv notes.docx --dedup --fill", program);
}

fn main() {
    init_logger();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        print_usage(&args[0]);
        process::exit(1);
    }

    let target = match FileFormat::from_extension(&args[1]) {
        Some(target) => target,
        None => {
            eprintln!("Error: Unsupported target format '{}'", args[1]);
            process::exit(1);
        }
    };
    let output_dir = PathBuf::from(&args[2]);

    let mut inputs = Vec::new();
    let mut operations = Vec::new();
    let mut builder = PipelineBuilder::new();

    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--dedup" => operations.push(CleanOp::RemoveDuplicates),
            "--fill" => operations.push(CleanOp::FillMissingNumeric),
            "--select" => {
                i += 1;
                let Some(list) = args.get(i) else {
                    eprintln!("Error: --select requires a comma-separated column list");
                    process::exit(1);
                };
                let columns = list.split(',').map(|c| c.trim().to_string()).collect();
                operations.push(CleanOp::SelectColumns(columns));
            }
            "--text-column" => {
                i += 1;
                let Some(column) = args.get(i) else {
                    eprintln!("Error: --text-column requires a column name");
                    process::exit(1);
                };
                builder = builder.with_text_column(column.as_str());
            }
            path => inputs.push(PathBuf::from(path)),
        }
        i += 1;
    }

    let pipeline = match builder.build() {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let mut files = Vec::with_capacity(inputs.len());
    for path in &inputs {
        match std::fs::read(path) {
            Ok(bytes) => files.push(UploadedFile::new(file_name(path), bytes)),
            Err(e) => eprintln!("Warning: Could not read '{}': {}", path.display(), e),
        }
    }

    if let Err(e) = std::fs::create_dir_all(&output_dir) {
        eprintln!(
            "Error: Could not create output directory '{}': {}",
            output_dir.display(),
            e
        );
        process::exit(1);
    }

    let report = pipeline.convert_all(&files, &operations, target);

    for converted in &report.converted {
        let path = output_dir.join(&converted.file_name);
        match std::fs::write(&path, &converted.bytes) {
            Ok(()) => println!("{} ({})", path.display(), converted.mime_type),
            Err(e) => eprintln!("Error: Could not write '{}': {}", path.display(), e),
        }
    }

    for failure in &report.failures {
        eprintln!("Failed: {}: {}", failure.name, failure.error);
    }

    println!(
        "\n{} converted, {} failed",
        report.converted.len(),
        report.failures.len()
    );

    if !report.is_complete() {
        process::exit(2);
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
