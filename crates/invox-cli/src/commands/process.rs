//! Process command - extract data from a single OCR text file.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use invox_core::{HeuristicInvoiceParser, InvoiceParser};

use super::config;
use super::output::{format_explanation, format_invoice, OutputFormat};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input text file produced by OCR ("-" reads stdin)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show where each field came from and any warnings
    #[arg(long)]
    explain: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = config::load(config_path)?;
    let text = read_input(&args.input)?;

    info!("Processing {} ({} bytes)", args.input.display(), text.len());

    let parser = HeuristicInvoiceParser::from_config(config);
    let report = parser.parse(&text);

    let output = format_invoice(&report.invoice, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output.trim_end());
    }

    // Keep stdout machine-readable
    if args.explain {
        eprintln!();
        eprint!("{}", format_explanation(&report));
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn read_input(input: &Path) -> anyhow::Result<String> {
    if input.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    fs::read_to_string(input)
        .map_err(|e| anyhow::anyhow!("Failed to read {} as UTF-8 text: {}", input.display(), e))
}
