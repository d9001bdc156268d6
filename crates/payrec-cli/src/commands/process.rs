//! Process command - extract and reconcile a single statement.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use payrec_core::models::config::PayrecConfig;
use payrec_core::statement::rules::format_amount;
use payrec_core::{Amounts, ExtractionResult, Fidelity, PayoutStatementParser};

use super::config::load_config;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (text extracted from a payout statement PDF)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Whitespace fidelity of the input (default: from config, else auto)
    #[arg(long, value_enum)]
    fidelity: Option<FidelityArg>,

    /// Exit successfully even when the totals line disagrees with the rows
    #[arg(long)]
    allow_mismatch: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one line per row
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum FidelityArg {
    /// Detect from the text
    Auto,
    /// Fields separated by whitespace
    Delimited,
    /// Whitespace collapsed between fields
    Concatenated,
}

/// Fidelity to parse with: the flag wins over the config; `None` means detect.
pub fn resolve_fidelity(arg: Option<FidelityArg>, config: &PayrecConfig) -> Option<Fidelity> {
    match arg {
        Some(FidelityArg::Auto) => None,
        Some(FidelityArg::Delimited) => Some(Fidelity::Delimited),
        Some(FidelityArg::Concatenated) => Some(Fidelity::Concatenated),
        None => config.segment.default_fidelity,
    }
}

/// Read a statement and run the extraction pipeline on it.
pub fn process_file(
    path: &Path,
    parser: &PayoutStatementParser,
    fidelity: Option<Fidelity>,
) -> anyhow::Result<ExtractionResult> {
    let text = fs::read_to_string(path)?;
    Ok(parser.parse_text(&text, fidelity)?)
}

pub fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message("Extracting rows...");

    let parser = PayoutStatementParser::from_config(&config)?;
    let fidelity = resolve_fidelity(args.fidelity, &config);
    let result = process_file(&args.input, &parser, fidelity)?;

    pb.finish_and_clear();

    if !result.diagnostics.is_empty() {
        eprintln!("{}", style("Diagnostics:").yellow());
        for diagnostic in &result.diagnostics {
            eprintln!("  - {}", diagnostic);
        }
    }

    let output = format_result(&result, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    if let Err(e) = result.validate() {
        if args.allow_mismatch {
            eprintln!("{} {}", style("⚠").yellow(), e);
        } else {
            anyhow::bail!(e);
        }
    }

    Ok(())
}

pub fn format_result(result: &ExtractionResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_csv(result: &ExtractionResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["row", "start", "end", "gross", "commission", "fee", "net"])?;

    for (index, row) in result.rows.iter().enumerate() {
        wtr.write_record([
            &index.to_string(),
            &row.span.start.to_string(),
            &row.span.end.to_string(),
            &row.gross().to_string(),
            &row.commission().to_string(),
            &row.fee().to_string(),
            &row.net().to_string(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn amounts_line(label: &str, amounts: &Amounts) -> String {
    format!(
        "  {:<10}{:>16}{:>16}{:>16}{:>16}\n",
        label,
        format_amount(amounts.gross),
        format_amount(amounts.commission),
        format_amount(amounts.fee),
        format_amount(amounts.net)
    )
}

fn format_text(result: &ExtractionResult) -> String {
    let report = &result.report;
    let mut output = String::new();

    output.push_str(&format!(
        "Statement: {} rows ({} fidelity)\n\n",
        report.row_count, result.fidelity
    ));

    output.push_str(&format!(
        "  {:<10}{:>16}{:>16}{:>16}{:>16}\n",
        "", "Gross", "Commission", "Fee", "Net"
    ));
    output.push_str(&amounts_line("Rows", &report.sums()));
    if let Some(totals) = &result.totals {
        output.push_str(&amounts_line("Printed", &totals.amounts));
    }
    if let Some(delta) = &report.totals_delta {
        output.push_str(&amounts_line("Delta", delta));
    }
    output.push('\n');

    let totals_status = match report.totals_line_match {
        Some(true) => style("matches").green().to_string(),
        Some(false) => style("MISMATCH").red().to_string(),
        None => style("absent").yellow().to_string(),
    };
    output.push_str(&format!("Totals line: {}\n", totals_status));

    let arithmetic_status = if report.arithmetic_mismatch {
        style(format!("residual {}", report.aggregate_residual)).red().to_string()
    } else {
        style("balanced").green().to_string()
    };
    output.push_str(&format!("Arithmetic:  {}\n", arithmetic_status));

    if !report.mismatched_rows.is_empty() {
        let rows: Vec<String> = report.mismatched_rows.iter().map(|i| i.to_string()).collect();
        output.push_str(&format!("Unbalanced rows: {}\n", rows.join(", ")));
    }

    output.push_str(&format!("Tolerance:   {}\n", report.epsilon));

    output
}
