//! Batch processing command for multiple statement files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use payrec_core::{ExtractionResult, PayoutStatementParser};

use super::config::load_config;
use super::process::{format_result, process_file, resolve_fidelity, FidelityArg, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Whitespace fidelity of the inputs (default: from config, else auto per file)
    #[arg(long, value_enum)]
    fidelity: Option<FidelityArg>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    extraction: Option<ExtractionResult>,
    error: Option<String>,
    processing_time_ms: u64,
}

impl ProcessResult {
    fn status(&self) -> &'static str {
        match &self.extraction {
            Some(extraction) if extraction.validate().is_err() => "mismatch",
            Some(_) => "success",
            None => "error",
        }
    }
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let parser = PayoutStatementParser::from_config(&config)?;
    let fidelity = resolve_fidelity(args.fidelity, &config);
    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let result = process_file(&path, &parser, fidelity);
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match result {
            Ok(extraction) => {
                results.push(ProcessResult {
                    path,
                    extraction: Some(extraction),
                    error: None,
                    processing_time_ms,
                });
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(ProcessResult {
                        path,
                        extraction: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed for {}: {}", path.display(), error_msg);
                }
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_with_message("Complete");

    if let Some(output_dir) = &args.output_dir {
        for result in &results {
            if let Some(extraction) = &result.extraction {
                let output_path = output_path_for(&result.path, output_dir, args.format);
                fs::write(&output_path, format_result(extraction, args.format)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let reconciled = results.iter().filter(|r| r.status() == "success").count();
    let mismatched: Vec<_> = results.iter().filter(|r| r.status() == "mismatch").collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} reconciled, {} mismatched, {} failed",
        style(reconciled).green(),
        style(mismatched.len()).yellow(),
        style(failed.len()).red()
    );

    if !mismatched.is_empty() {
        println!();
        println!("{}", style("Totals mismatch:").yellow());
        for result in &mismatched {
            println!("  - {}", result.path.display());
        }
    }

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn output_path_for(input: &Path, output_dir: &Path, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("statement");

    output_dir.join(format!("{}.report.{}", stem, format.extension()))
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "fidelity",
        "rows",
        "sum_gross",
        "sum_commission",
        "sum_fee",
        "sum_net",
        "totals_match",
        "diagnostics",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        if let Some(extraction) = &result.extraction {
            let report = &extraction.report;
            let totals_match = match report.totals_line_match {
                Some(true) => "true",
                Some(false) => "false",
                None => "",
            };

            wtr.write_record([
                filename,
                result.status(),
                extraction.fidelity.as_str(),
                &report.row_count.to_string(),
                &report.sum_gross.to_string(),
                &report.sum_commission.to_string(),
                &report.sum_fee.to_string(),
                &report.sum_net.to_string(),
                totals_match,
                &extraction.diagnostics.len().to_string(),
                &result.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                result.status(),
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_keeps_stem() {
        let path = output_path_for(
            Path::new("/in/2024-01.txt"),
            Path::new("/out"),
            OutputFormat::Text,
        );
        assert_eq!(path, PathBuf::from("/out/2024-01.report.txt"));
    }

    #[test]
    fn test_status_reflects_totals_check() {
        let parser = PayoutStatementParser::new().unwrap();
        let result = |text: &str| ProcessResult {
            path: PathBuf::from("a.txt"),
            extraction: Some(parser.parse_text(text, None).unwrap()),
            error: None,
            processing_time_ms: 0,
        };

        assert_eq!(result("JPY 100 -10 -5 85 合計 100 -10 -5 85").status(), "success");
        assert_eq!(result("JPY 100 -10 -5 85 合計 100 -10 -5 86").status(), "mismatch");
        // No totals line is not a mismatch
        assert_eq!(result("JPY 100 -10 -5 85").status(), "success");

        let failed = ProcessResult {
            path: PathBuf::from("b.txt"),
            extraction: None,
            error: Some("no statement data found".to_string()),
            processing_time_ms: 0,
        };
        assert_eq!(failed.status(), "error");
    }
}
